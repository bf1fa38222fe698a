//! Vault-wide naming conflicts: short names shared by several objects and
//! aliases that shadow other names.

use crate::resolver::Resolver;
use serde::{Deserialize, Serialize};
use std::fmt;
use vaultmark_core::paths::parse_embedded_id;

/// Several objects sharing one short name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdCollision {
    pub short_name: String,
    pub object_ids: Vec<String>,
}

/// What an alias clashes with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AliasConflict {
    ShortName,
    ObjectId,
}

impl AliasConflict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShortName => "short_name",
            Self::ObjectId => "object_id",
        }
    }
}

impl fmt::Display for AliasConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An alias that also names some other object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasCollision {
    pub alias: String,
    /// The alias target first, then the objects it clashes with
    pub object_ids: Vec<String>,
    pub conflicts_with: AliasConflict,
}

impl Resolver {
    /// Short names mapping to two or more objects, sorted by short name.
    ///
    /// A file sharing its short name only with its own sections is not a
    /// collision: references to that name resolve to the file.
    pub fn find_collisions(&self) -> Vec<IdCollision> {
        let mut collisions: Vec<IdCollision> = self
            .short_map
            .iter()
            .filter(|(_, ids)| ids.len() > 1 && !is_file_section_collision_only(ids))
            .map(|(short_name, ids)| IdCollision {
                short_name: short_name.clone(),
                object_ids: ids.clone(),
            })
            .collect();
        collisions.sort_by(|a, b| a.short_name.cmp(&b.short_name));
        collisions
    }

    /// Aliases that equal another object's short name or object ID, sorted
    /// by alias.
    pub fn find_alias_collisions(&self) -> Vec<AliasCollision> {
        let mut collisions = Vec::new();

        for (alias, target) in &self.alias_map {
            if let Some(ids) = self.short_map.get(alias) {
                let conflicts: Vec<&String> = ids.iter().filter(|id| *id != target).collect();
                if !conflicts.is_empty() {
                    let mut object_ids = vec![target.clone()];
                    object_ids.extend(conflicts.into_iter().cloned());
                    collisions.push(AliasCollision {
                        alias: alias.clone(),
                        object_ids,
                        conflicts_with: AliasConflict::ShortName,
                    });
                }
            }

            if alias != target && self.object_ids.contains(alias) {
                collisions.push(AliasCollision {
                    alias: alias.clone(),
                    object_ids: vec![target.clone(), alias.clone()],
                    conflicts_with: AliasConflict::ObjectId,
                });
            }
        }

        collisions
    }
}

fn is_file_section_collision_only(ids: &[String]) -> bool {
    let mut files = ids.iter().filter(|id| !id.contains('#'));
    let (Some(file), None) = (files.next(), files.next()) else {
        return false;
    };

    ids.iter().all(|id| match parse_embedded_id(id) {
        Some((parent, _)) => parent == file,
        None => true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ResolverOptions;

    #[test]
    fn test_find_collisions() {
        let r = Resolver::new(
            [
                "people/freya",
                "people/freya#freya",
                "people/thor",
                "gods/thor",
                "daily/2025-02-01#standup",
                "daily/2025-02-02#standup",
            ],
            ResolverOptions::default(),
        );

        let collisions = r.find_collisions();
        let names: Vec<_> = collisions.iter().map(|c| c.short_name.as_str()).collect();
        assert_eq!(names, vec!["standup", "thor"]);
        assert_eq!(collisions[1].object_ids, vec!["gods/thor", "people/thor"]);
    }

    #[test]
    fn test_two_sections_of_same_file_collide() {
        let r = Resolver::new(["notes/a#intro", "notes/b#intro"], ResolverOptions::default());
        assert_eq!(r.find_collisions().len(), 1);
    }

    #[test]
    fn test_find_alias_collisions() {
        let r = Resolver::new(
            ["people/freya", "people/thor", "thor", "gods/odin"],
            ResolverOptions::new()
                .with_alias("freya", "people/freya")
                .with_alias("thor", "gods/odin")
                .with_alias("Allfather", "gods/odin"),
        );

        let collisions = r.find_alias_collisions();
        let summary: Vec<_> = collisions
            .iter()
            .map(|c| (c.alias.as_str(), c.conflicts_with, c.object_ids.clone()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (
                    "thor",
                    AliasConflict::ShortName,
                    vec![
                        "gods/odin".to_string(),
                        "people/thor".to_string(),
                        "thor".to_string()
                    ]
                ),
                (
                    "thor",
                    AliasConflict::ObjectId,
                    vec!["gods/odin".to_string(), "thor".to_string()]
                ),
            ]
        );
    }
}
