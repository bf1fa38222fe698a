//! Slug helpers.
//!
//! Two strategies exist side by side:
//! - heading slugs, used for section and embedded-object fragments
//! - path slugs, used to match loosely written references against object IDs

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Convert heading text to a fragment slug.
///
/// Letters and digits are kept (lowercased); space, `-`, `_` and `:` become a
/// single dash; everything else is dropped. The result never starts or ends
/// with a dash.
pub fn heading_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut prev_dash = false;

    for ch in text.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            slug.push(ch);
            prev_dash = false;
        } else if matches!(ch, ' ' | '-' | '_' | ':') && !prev_dash && !slug.is_empty() {
            slug.push('-');
            prev_dash = true;
        }
    }

    if slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Lowercase and fold Latin letters to ASCII: accents are dropped after
/// NFKD decomposition, and letters without a decomposition go through a
/// small table (`æ` to `ae`, `ø` to `o`, `þ` to `th`). Other scripts pass through.
fn fold_to_ascii(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.nfkd().flat_map(char::to_lowercase) {
        if is_combining_mark(ch) {
            continue;
        }
        match ch {
            'æ' => out.push_str("ae"),
            'œ' => out.push_str("oe"),
            'ß' => out.push_str("ss"),
            'þ' => out.push_str("th"),
            'ø' => out.push('o'),
            'đ' | 'ð' => out.push('d'),
            'ł' => out.push('l'),
            'ħ' => out.push('h'),
            'ı' => out.push('i'),
            'ŧ' => out.push('t'),
            _ => out.push(ch),
        }
    }
    out
}

/// Slug for a single path component (file name or directory name).
///
/// A trailing `.md` is ignored and Latin letters are folded to ASCII
/// (`Ærøskøbing` becomes `aeroskobing`). Runs of anything other than letters,
/// digits, `-` and `_` collapse into one dash.
pub fn component_slug(s: &str) -> String {
    let s = s.strip_suffix(".md").unwrap_or(s);
    let mut slug = String::with_capacity(s.len());
    let mut pending_dash = false;

    for ch in fold_to_ascii(s).chars() {
        if ch.is_alphanumeric() || ch == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }

    let slug = slug.trim_matches(|c| c == '-' || c == '_').to_string();
    if slug.is_empty() {
        return s.replace(' ', "-").to_lowercase();
    }
    slug
}

/// Slug every `/`-separated component of a path; both sides of an embedded
/// `file#fragment` component are slugged.
pub fn path_slug(path: &str) -> String {
    let path = path.strip_suffix(".md").unwrap_or(path);
    path.split('/')
        .map(|part| match part.split_once('#') {
            Some((file, fragment)) => {
                format!("{}#{}", component_slug(file), component_slug(fragment))
            }
            None => component_slug(part),
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_slug() {
        assert_eq!(heading_slug("Weekly Standup"), "weekly-standup");
        assert_eq!(heading_slug("Q1: Planning"), "q1-planning");
        assert_eq!(heading_slug("  --Leading"), "leading");
        assert_eq!(heading_slug("C++ & Rust!"), "c-rust");
        assert_eq!(heading_slug("snake_case_name"), "snake-case-name");
        assert_eq!(heading_slug("Trailing -"), "trailing");
        assert_eq!(heading_slug("!!!"), "");
    }

    #[test]
    fn test_component_slug() {
        assert_eq!(component_slug("Freya Goddess"), "freya-goddess");
        assert_eq!(component_slug("The Prose Edda.md"), "the-prose-edda");
        assert_eq!(component_slug("2025-02-01"), "2025-02-01");
        assert_eq!(component_slug("Sif"), "sif");
        assert_eq!(component_slug("under_score"), "under_score");
    }

    #[test]
    fn test_component_slug_folds_latin_letters() {
        assert_eq!(component_slug("Ærøskøbing"), "aeroskobing");
        assert_eq!(component_slug("Þórr Óðinsson"), "thorr-odinsson");
        assert_eq!(component_slug("Café Noir.md"), "cafe-noir");
        assert_eq!(component_slug("Straße"), "strasse");
        assert_eq!(component_slug("Москва"), "москва");
        assert_eq!(path_slug("people/Sigrún#Æsir Lore"), "people/sigrun#aesir-lore");
    }

    #[test]
    fn test_path_slug() {
        assert_eq!(path_slug("people/Sif"), "people/sif");
        assert_eq!(
            path_slug("daily/2025-02-01#Team Sync"),
            "daily/2025-02-01#team-sync"
        );
        assert_eq!(path_slug("Projects/Big Launch.md"), "projects/big-launch");
    }
}
