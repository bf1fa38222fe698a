//! A vault on disk: configuration, schema and every markdown file under the
//! root, parsed and checked as one snapshot.

use log::{debug, info, warn};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Instant;
use vaultmark_check::{CheckReport, Issue, IssueKind, ObjectInfo, Validator};
use vaultmark_core::{Error, ParsedDocument, Result, Schema, VaultConfig};
use vaultmark_parser::Parser;
use vaultmark_resolver::ResolverOptions;
use walkdir::WalkDir;

/// Frontmatter key naming an alternative name for an object.
pub const ALIAS_FIELD: &str = "alias";

/// An opened vault.
#[derive(Debug)]
pub struct Vault {
    root: PathBuf,
    config: VaultConfig,
    schema: Schema,
    parser: Parser,
}

/// Every document of a vault plus the lookup tables the resolver needs.
#[derive(Debug, Default)]
pub struct VaultSnapshot {
    /// Parsed documents, sorted by file path
    pub documents: Vec<ParsedDocument>,
    /// Files that could not be read, as parse-error issues
    pub unreadable: Vec<Issue>,
    /// Alias to the first object claiming it
    pub aliases: HashMap<String, String>,
    /// Aliases claimed by more than one object, with every claimant
    pub duplicate_aliases: BTreeMap<String, Vec<String>>,
    /// Display-name field values to their objects
    pub name_fields: HashMap<String, String>,
}

impl VaultSnapshot {
    pub fn objects(&self) -> Vec<ObjectInfo> {
        self.documents
            .iter()
            .flat_map(|doc| doc.objects.iter().map(ObjectInfo::from))
            .collect()
    }

    pub fn document(&self, file_path: &str) -> Option<&ParsedDocument> {
        self.documents.iter().find(|d| d.file_path == file_path)
    }

    pub fn files(&self) -> usize {
        self.documents.len() + self.unreadable.len()
    }
}

impl Vault {
    /// Open a vault root, loading `vaultmark.yaml` and `schema.yaml` when present.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(Error::file_not_found(root));
        }

        let config = VaultConfig::load(&root)?;
        let schema = Schema::load(&root)?;
        Ok(Self::with_parts(root, config, schema))
    }

    /// A vault with an explicit configuration and schema.
    pub fn with_parts(root: PathBuf, config: VaultConfig, schema: Schema) -> Self {
        let parser = Parser::from_config(root.clone(), &config);
        Self {
            root,
            config,
            schema,
            parser,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Markdown files under the root, excluded directories skipped, sorted.
    pub fn markdown_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || !(e.file_type().is_dir()
                        && self.config.is_excluded(&e.file_name().to_string_lossy()))
            })
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!("Skipping unreadable entry: {}", err);
                    None
                }
            })
            .filter(|e| e.file_type().is_file() && is_markdown_file(e.path()))
            .map(|e| e.into_path())
            .collect();
        files.sort();
        files
    }

    /// Parse every markdown file and collect aliases and display names.
    pub fn load(&self) -> VaultSnapshot {
        let start = Instant::now();
        let mut snapshot = VaultSnapshot::default();

        for path in self.markdown_files() {
            match std::fs::read_to_string(&path) {
                Ok(content) => snapshot
                    .documents
                    .push(self.parser.parse_file(&path, &content)),
                Err(e) => {
                    let relative = self.relative_path(&path);
                    warn!("Failed to read {}: {}", relative, e);
                    snapshot.unreadable.push(
                        Issue::error(
                            IssueKind::ParseError,
                            relative,
                            1,
                            format!("failed to read file: {}", e),
                        )
                        .with_fix_hint("Check the file's permissions and encoding"),
                    );
                }
            }
        }

        self.collect_names(&mut snapshot);

        debug!(
            "Loaded {} documents ({} unreadable) in {:?}",
            snapshot.documents.len(),
            snapshot.unreadable.len(),
            start.elapsed()
        );
        snapshot
    }

    fn collect_names(&self, snapshot: &mut VaultSnapshot) {
        let mut alias_owners: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for object in snapshot.documents.iter().flat_map(|d| &d.objects) {
            if let Some(alias) = object.field(ALIAS_FIELD).and_then(|v| v.as_str())
                && !alias.trim().is_empty()
            {
                alias_owners
                    .entry(alias.trim().to_string())
                    .or_default()
                    .push(object.id.clone());
            }

            let name_field = self
                .schema
                .type_def(&object.object_type)
                .and_then(|def| def.name_field.as_deref());
            if let Some(field) = name_field
                && let Some(name) = object.field(field).and_then(|v| v.as_str())
                && !name.is_empty()
            {
                snapshot
                    .name_fields
                    .entry(name.to_string())
                    .or_insert_with(|| object.id.clone());
            }
        }

        for (alias, owners) in alias_owners {
            snapshot.aliases.insert(alias.clone(), owners[0].clone());
            if owners.len() > 1 {
                snapshot.duplicate_aliases.insert(alias, owners);
            }
        }
    }

    /// Resolver settings for a snapshot of this vault.
    pub fn resolver_options(&self, snapshot: &VaultSnapshot) -> ResolverOptions {
        ResolverOptions::new()
            .with_daily_directory(self.config.daily_dir())
            .with_aliases(snapshot.aliases.clone())
            .with_name_fields(snapshot.name_fields.clone())
    }

    /// Load the vault and check it against the schema.
    pub fn check(&self) -> CheckReport {
        let snapshot = self.load();
        self.check_snapshot(&snapshot)
    }

    pub fn check_snapshot(&self, snapshot: &VaultSnapshot) -> CheckReport {
        let objects = snapshot.objects();
        let mut validator = Validator::new(&self.schema, &objects, self.resolver_options(snapshot))
            .with_duplicate_aliases(snapshot.duplicate_aliases.clone());

        let mut report = validator.check_all(&snapshot.documents);
        for issue in &snapshot.unreadable {
            report.add_file(vec![issue.clone()]);
        }

        info!(
            "Checked {} files: {} errors, {} warnings",
            report.files_checked, report.error_count, report.warning_count
        );
        report
    }

    fn relative_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

fn is_markdown_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "md")
}
