//! Reference resolution over a snapshot of object IDs.

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use vaultmark_core::dates::is_valid_date;
use vaultmark_core::paths::{parse_embedded_id, short_name_from_id};
use vaultmark_core::slugs::{component_slug, path_slug};

/// Daily notes directory used when none is configured.
pub const DEFAULT_DAILY_DIRECTORY: &str = "daily";

/// Inputs beyond the object IDs themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    pub daily_directory: String,
    /// Alias text to the object ID it stands for
    pub aliases: HashMap<String, String>,
    /// Display-name field values to the object ID carrying them
    pub name_fields: HashMap<String, String>,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            daily_directory: DEFAULT_DAILY_DIRECTORY.to_string(),
            aliases: HashMap::new(),
            name_fields: HashMap::new(),
        }
    }
}

impl ResolverOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_daily_directory(mut self, dir: impl Into<String>) -> Self {
        self.daily_directory = dir.into();
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>, id: impl Into<String>) -> Self {
        self.aliases.insert(alias.into(), id.into());
        self
    }

    pub fn with_aliases(mut self, aliases: HashMap<String, String>) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_name_field(mut self, name: impl Into<String>, id: impl Into<String>) -> Self {
        self.name_fields.insert(name.into(), id.into());
        self
    }

    pub fn with_name_fields(mut self, name_fields: HashMap<String, String>) -> Self {
        self.name_fields = name_fields;
        self
    }
}

/// The strategy that produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    Alias,
    NameField,
    Date,
    ObjectId,
    ShortName,
    SuffixMatch,
}

impl MatchSource {
    /// Machine-readable name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alias => "alias",
            Self::NameField => "name_field",
            Self::Date => "date",
            Self::ObjectId => "object_id",
            Self::ShortName => "short_name",
            Self::SuffixMatch => "suffix_match",
        }
    }

    /// Label used in diagnostics
    pub fn label(&self) -> &'static str {
        match self {
            Self::Alias => "alias",
            Self::NameField => "name field",
            Self::Date => "date",
            Self::ObjectId => "object id",
            Self::ShortName => "short name",
            Self::SuffixMatch => "suffix match",
        }
    }
}

impl fmt::Display for MatchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of resolving one raw reference.
///
/// Exactly one of three shapes:
/// - unresolved: `target_id` is `None`, `matches` is empty, `error` is set
/// - resolved: `target_id` is set and `matches` holds that single ID
/// - ambiguous: `ambiguous` is true and `matches` holds two or more IDs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveResult {
    pub target_id: Option<String>,
    pub ambiguous: bool,
    pub matches: Vec<String>,
    pub match_sources: BTreeMap<String, MatchSource>,
    pub error: Option<String>,
}

impl ResolveResult {
    fn not_found() -> Self {
        Self {
            error: Some("reference not found".to_string()),
            ..Default::default()
        }
    }

    fn resolved(id: String, source: MatchSource) -> Self {
        Self {
            target_id: Some(id.clone()),
            matches: vec![id.clone()],
            match_sources: BTreeMap::from([(id, source)]),
            ..Default::default()
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.target_id.is_some()
    }

    pub fn source_of(&self, id: &str) -> Option<MatchSource> {
        self.match_sources.get(id).copied()
    }

    /// Each match with the label of the strategy that found it, e.g.
    /// `people/freya (alias)`.
    pub fn labeled_matches(&self) -> Vec<String> {
        self.matches
            .iter()
            .map(|id| match self.source_of(id) {
                Some(source) => format!("{} ({})", id, source.label()),
                None => id.clone(),
            })
            .collect()
    }
}

/// First-source-wins candidate set.
#[derive(Default)]
struct Candidates {
    ids: Vec<String>,
    sources: BTreeMap<String, MatchSource>,
}

impl Candidates {
    fn add(&mut self, id: &str, source: MatchSource) {
        if id.is_empty() || self.sources.contains_key(id) {
            return;
        }
        trace!("candidate {} via {}", id, source);
        self.ids.push(id.to_string());
        self.sources.insert(id.to_string(), source);
    }

    fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Resolves raw reference text to object IDs.
///
/// Built once per vault snapshot; read-only afterwards.
pub struct Resolver {
    pub(crate) object_ids: BTreeSet<String>,
    pub(crate) short_map: HashMap<String, Vec<String>>,
    slug_map: HashMap<String, String>,
    /// Aliases plus their slugged forms
    pub(crate) alias_map: BTreeMap<String, String>,
    name_field_map: HashMap<String, Vec<String>>,
    daily_directory: String,
}

impl Resolver {
    pub fn new<I, S>(object_ids: I, options: ResolverOptions) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let object_ids: BTreeSet<String> = object_ids.into_iter().map(Into::into).collect();

        let mut short_map: HashMap<String, Vec<String>> = HashMap::new();
        let mut slug_map = HashMap::new();
        for id in &object_ids {
            short_map
                .entry(short_name_from_id(id).to_string())
                .or_default()
                .push(id.clone());
            slug_map.entry(path_slug(id)).or_insert_with(|| id.clone());
        }

        let mut alias_map = BTreeMap::new();
        for (alias, target) in &options.aliases {
            if alias.is_empty() {
                continue;
            }
            alias_map.insert(alias.clone(), target.clone());
        }
        for (alias, target) in &options.aliases {
            let slug = component_slug(alias);
            if !slug.is_empty() && slug != *alias {
                alias_map.entry(slug).or_insert_with(|| target.clone());
            }
        }

        let mut names: Vec<_> = options
            .name_fields
            .iter()
            .filter(|(name, _)| !name.is_empty())
            .collect();
        names.sort();

        let mut name_field_map: HashMap<String, Vec<String>> = HashMap::new();
        for (name, id) in names {
            name_field_map.entry(name.clone()).or_default().push(id.clone());
            let slug = component_slug(name);
            if !slug.is_empty() && slug != *name {
                name_field_map.entry(slug.clone()).or_default().push(id.clone());
            }
            let lower = name.to_lowercase();
            if lower != *name && lower != slug {
                name_field_map.entry(lower).or_default().push(id.clone());
            }
        }

        let daily_directory = match options.daily_directory.trim_end_matches('/') {
            "" => DEFAULT_DAILY_DIRECTORY.to_string(),
            dir => dir.to_string(),
        };

        debug!(
            "Built resolver: {} objects, {} aliases, {} name values",
            object_ids.len(),
            options.aliases.len(),
            options.name_fields.len()
        );

        Self {
            object_ids,
            short_map,
            slug_map,
            alias_map,
            name_field_map,
            daily_directory,
        }
    }

    /// Resolve a raw reference.
    ///
    /// Every applicable strategy contributes candidates before a verdict is
    /// reached; a file and its own sections matching together resolve to the
    /// file.
    pub fn resolve(&self, raw: &str) -> ResolveResult {
        let raw = raw.trim();
        if raw.is_empty() {
            return ResolveResult::not_found();
        }
        let slug = component_slug(raw);
        let lower = raw.to_lowercase();

        let mut candidates = Candidates::default();
        self.add_alias_matches(&mut candidates, raw, &slug);
        self.add_name_field_matches(&mut candidates, raw, &slug, &lower);

        if is_valid_date(raw) {
            let date_id = format!("{}/{}", self.daily_directory, raw);
            if candidates.is_empty() {
                trace!("resolved {:?} as date shorthand", raw);
                return ResolveResult::resolved(date_id, MatchSource::Date);
            }
            candidates.add(&date_id, MatchSource::Date);
        }

        if is_path_like(raw) {
            self.add_path_matches(&mut candidates, raw);
        } else {
            self.add_short_matches(&mut candidates, raw, &slug);
        }

        let mut matches = candidates.ids;
        if matches.len() > 1 {
            matches = prefer_parent_over_sections(matches);
        }

        match matches.len() {
            0 => {
                trace!("no candidates for {:?}", raw);
                ResolveResult::not_found()
            }
            1 => {
                let id = matches.remove(0);
                let source = candidates.sources[&id];
                ResolveResult::resolved(id, source)
            }
            _ => {
                let match_sources = matches
                    .iter()
                    .map(|id| (id.clone(), candidates.sources[id]))
                    .collect();
                ResolveResult {
                    target_id: None,
                    ambiguous: true,
                    matches,
                    match_sources,
                    error: Some("ambiguous reference, multiple matches found".to_string()),
                }
            }
        }
    }

    fn add_alias_matches(&self, candidates: &mut Candidates, raw: &str, slug: &str) {
        if let Some(target) = self.alias_map.get(raw).or_else(|| self.alias_map.get(slug)) {
            candidates.add(target, MatchSource::Alias);
        }
    }

    fn add_name_field_matches(
        &self,
        candidates: &mut Candidates,
        raw: &str,
        slug: &str,
        lower: &str,
    ) {
        let ids = self
            .name_field_map
            .get(raw)
            .or_else(|| self.name_field_map.get(slug))
            .or_else(|| self.name_field_map.get(lower));
        for id in ids.into_iter().flatten() {
            candidates.add(id, MatchSource::NameField);
        }
    }

    fn add_path_matches(&self, candidates: &mut Candidates, raw: &str) {
        if self.object_ids.contains(raw) {
            candidates.add(raw, MatchSource::ObjectId);
        }

        if let Some((base, fragment)) = parse_embedded_id(raw) {
            let full = format!("{}#{}", base.strip_suffix(".md").unwrap_or(base), fragment);
            if self.object_ids.contains(&full) {
                candidates.add(&full, MatchSource::ObjectId);
            }
        }

        let slugged = path_slug(raw);
        if let Some(id) = self.slug_map.get(&slugged) {
            candidates.add(id, MatchSource::ObjectId);
        }

        // Tolerates a directory prefix the writer left out
        if candidates.is_empty() {
            let suffix = format!("/{}", raw);
            let slugged_suffix = format!("/{}", slugged);
            for id in &self.object_ids {
                if id.ends_with(&suffix) || id.ends_with(&slugged_suffix) {
                    candidates.add(id, MatchSource::SuffixMatch);
                }
            }
        }
    }

    fn add_short_matches(&self, candidates: &mut Candidates, raw: &str, slug: &str) {
        let direct = self
            .short_map
            .get(raw)
            .filter(|ids| !ids.is_empty())
            .or_else(|| self.short_map.get(slug));

        if let Some(ids) = direct {
            for id in ids {
                candidates.add(id, MatchSource::ShortName);
            }
            return;
        }

        let suffix = format!("/{}", raw);
        let slugged_suffix = format!("/{}", slug);
        for id in &self.object_ids {
            let short = short_name_from_id(id);
            if short == raw || short == slug || id.ends_with(&suffix) || id.ends_with(&slugged_suffix)
            {
                candidates.add(id, MatchSource::ShortName);
            }
        }
    }

    /// Resolve several references at once, keyed by raw text.
    pub fn resolve_all<'a, I>(&self, refs: I) -> BTreeMap<String, ResolveResult>
    where
        I: IntoIterator<Item = &'a str>,
    {
        refs.into_iter()
            .map(|raw| (raw.to_string(), self.resolve(raw)))
            .collect()
    }

    pub fn exists(&self, id: &str) -> bool {
        self.object_ids.contains(id)
    }

    /// All known object IDs, sorted.
    pub fn object_ids(&self) -> impl Iterator<Item = &str> {
        self.object_ids.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.object_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.object_ids.is_empty()
    }

    pub fn daily_directory(&self) -> &str {
        &self.daily_directory
    }

    pub fn short_name_of(id: &str) -> &str {
        short_name_from_id(id)
    }
}

/// Embedded references (`file#fragment`) and `#fragment` count as paths.
fn is_path_like(raw: &str) -> bool {
    raw.contains('/') || raw.contains('#')
}

/// Drop every section whose parent file is also a candidate.
fn prefer_parent_over_sections(matches: Vec<String>) -> Vec<String> {
    let parents: BTreeSet<&str> = matches
        .iter()
        .filter(|id| !id.contains('#'))
        .map(String::as_str)
        .collect();
    if parents.is_empty() {
        return matches;
    }

    let keep: Vec<bool> = matches
        .iter()
        .map(|id| match parse_embedded_id(id) {
            Some((parent, _)) => !parents.contains(parent),
            None => true,
        })
        .collect();

    matches
        .into_iter()
        .zip(keep)
        .filter_map(|(id, keep)| keep.then_some(id))
        .collect()
}
