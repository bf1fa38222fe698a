//! # Vaultmark
//!
//! Checks a markdown knowledge vault against its schema.
//!
//! A vault is a directory of markdown files with an optional `schema.yaml`
//! (types, fields, traits) and `vaultmark.yaml` (directory layout). Files
//! become typed objects through frontmatter `type:` keys and `::type(...)`
//! declarations under headings; `@trait(value)` annotations and `[[refs]]`
//! tie them together.
//!
//! [`Vault`] walks the directory, parses every file and runs the validator
//! over the whole snapshot; the `vaultmark` binary prints the resulting
//! [`CheckReport`].
//!
//! ```no_run
//! use vaultmark::{OutputFormat, ReportFormatter, Vault};
//!
//! # fn main() -> vaultmark::Result<()> {
//! let vault = Vault::open("/path/to/vault")?;
//! let report = vault.check();
//! print!("{}", ReportFormatter::format(&report, OutputFormat::Human));
//! # Ok(())
//! # }
//! ```

mod output;
mod vault;

pub use output::{OutputFormat, ReportFormatter};
pub use vault::{ALIAS_FIELD, Vault, VaultSnapshot};

pub use vaultmark_check::{CheckReport, Issue, IssueKind, SchemaIssue};
pub use vaultmark_core::{Error, Result};

pub mod prelude {
    pub use crate::{OutputFormat, ReportFormatter, Vault, VaultSnapshot};
    pub use vaultmark_check::prelude::*;
}
