//! # Reference Resolution
//!
//! Turns the raw text of a `[[reference]]` into an object ID, built once per
//! vault snapshot from every known object ID plus optional alias and
//! display-name tables.
//!
//! Provides:
//! - Candidate collection across every strategy (alias, display name, date
//!   shorthand, exact and slugged paths, short names, suffix matches)
//! - Ambiguity detection with the strategy behind each candidate
//! - Short-name and alias collision reports
//!
//! ## Quick Start
//!
//! ```
//! use vaultmark_resolver::{MatchSource, Resolver, ResolverOptions};
//!
//! let resolver = Resolver::new(
//!     ["people/freya", "projects/bifrost", "projects/bifrost#bifrost"],
//!     ResolverOptions::new().with_alias("The Queen", "people/freya"),
//! );
//!
//! assert_eq!(resolver.resolve("freya").target_id.as_deref(), Some("people/freya"));
//! assert_eq!(resolver.resolve("The Queen").target_id.as_deref(), Some("people/freya"));
//!
//! // A file wins over its own same-named section
//! assert_eq!(resolver.resolve("bifrost").target_id.as_deref(), Some("projects/bifrost"));
//!
//! // Dates resolve to the daily note whether or not it exists yet
//! let today = resolver.resolve("2025-02-01");
//! assert_eq!(today.target_id.as_deref(), Some("daily/2025-02-01"));
//! assert_eq!(today.source_of("daily/2025-02-01"), Some(MatchSource::Date));
//! ```
//!
//! ## Ambiguity
//!
//! ```
//! use vaultmark_resolver::{Resolver, ResolverOptions};
//!
//! let resolver = Resolver::new(["people/thor", "gods/thor"], ResolverOptions::default());
//! let result = resolver.resolve("thor");
//! assert!(result.ambiguous);
//! assert_eq!(
//!     result.labeled_matches(),
//!     vec!["gods/thor (short name)", "people/thor (short name)"]
//! );
//! ```

mod collisions;
mod resolver;

pub use collisions::{AliasCollision, AliasConflict, IdCollision};
pub use resolver::{
    DEFAULT_DAILY_DIRECTORY, MatchSource, ResolveResult, Resolver, ResolverOptions,
};

pub mod prelude {
    pub use crate::{MatchSource, ResolveResult, Resolver, ResolverOptions};
    pub use vaultmark_core::prelude::*;
}
