//! Conversions between vault-relative file paths and object IDs.
//!
//! `objects/people/freya.md` with an objects root of `objects/` has the ID
//! `people/freya`; a heading inside it has the ID `people/freya#fragment`.

/// Normalize a directory root to `"dir/"` form (empty stays empty).
pub fn normalize_dir_root(root: &str) -> String {
    let root = root.replace('\\', "/");
    let root = root.trim_matches('/');
    if root.is_empty() {
        String::new()
    } else {
        format!("{}/", root)
    }
}

fn normalize_rel_path(path: &str) -> String {
    let mut p = path.replace('\\', "/");
    if let Some(rest) = p.strip_prefix("./") {
        p = rest.to_string();
    }
    if let Some(rest) = p.strip_prefix('/') {
        p = rest.to_string();
    }
    while p.contains("//") {
        p = p.replace("//", "/");
    }
    p
}

/// Convert a vault-relative file path to an object ID.
///
/// Strips `.md`, then the objects root, or failing that the pages root.
pub fn file_path_to_object_id(file_path: &str, objects_root: &str, pages_root: &str) -> String {
    let normalized = normalize_rel_path(file_path);
    let id = normalized.strip_suffix(".md").unwrap_or(&normalized);

    let objects_root = normalize_dir_root(objects_root);
    let pages_root = normalize_dir_root(pages_root);

    if !objects_root.is_empty()
        && let Some(rest) = id.strip_prefix(&objects_root)
    {
        return rest.to_string();
    }
    if !pages_root.is_empty()
        && let Some(rest) = id.strip_prefix(&pages_root)
    {
        return rest.to_string();
    }
    id.to_string()
}

/// Split `file#fragment` into its parts. `None` when there is no fragment or no file part.
pub fn parse_embedded_id(id: &str) -> Option<(&str, &str)> {
    match id.split_once('#') {
        Some((base, fragment)) if !base.is_empty() => Some((base, fragment)),
        _ => None,
    }
}

/// The short name of an object ID: the fragment after the last `#`, or else
/// the final path segment.
pub fn short_name_from_id(id: &str) -> &str {
    if let Some(idx) = id.rfind('#') {
        return &id[idx + 1..];
    }
    match id.rfind('/') {
        Some(idx) => &id[idx + 1..],
        None => id,
    }
}
