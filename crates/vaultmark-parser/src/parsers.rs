//! Line-level grammars and the vault-aware [`Parser`].

use std::path::{Path, PathBuf};
use vaultmark_core::{ParsedDocument, VaultConfig};

use crate::document::{ParseOptions, parse_document};

pub mod fences;
pub mod frontmatter_parser;
pub mod traits;
pub mod typedecl;
pub mod wikilinks;

pub use self::frontmatter_parser::{Frontmatter, FrontmatterBlock, parse_frontmatter, split_frontmatter};

/// Parser bound to a vault root and its directory layout.
#[derive(Debug, Clone)]
pub struct Parser {
    vault_root: PathBuf,
    options: ParseOptions,
}

impl Parser {
    /// Create a new parser for the given vault root
    pub fn new(vault_root: PathBuf) -> Self {
        Self::with_options(vault_root, ParseOptions::default())
    }

    pub fn with_options(vault_root: PathBuf, options: ParseOptions) -> Self {
        Self {
            vault_root,
            options,
        }
    }

    /// Parser using the directory roots from a vault configuration.
    pub fn from_config(vault_root: PathBuf, config: &VaultConfig) -> Self {
        Self::with_options(
            vault_root,
            ParseOptions::new(config.objects_root(), config.pages_root()),
        )
    }

    pub fn vault_root(&self) -> &Path {
        &self.vault_root
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse a file given its path (absolute or vault-relative) and content.
    pub fn parse_file(&self, path: &Path, content: &str) -> ParsedDocument {
        let relative = path.strip_prefix(&self.vault_root).unwrap_or(path);
        let relative = relative.to_string_lossy().replace('\\', "/");
        parse_document(content, &relative, &self.options)
    }
}
