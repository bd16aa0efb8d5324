//! Centralized slug derivation for city and item names.
//!
//! Every URL segment the generator emits (city directories, item page
//! filenames) comes from [`slugify`]. The folding is deliberately narrow:
//! only the accented Latin vowels and `ç` listed below are mapped to their
//! base letter. Anything else outside `[a-z0-9]` becomes a separator.
//!
//! ```text
//! "Café du Parc"  → "cafe-du-parc"
//! "  A -- B  "    → "a-b"
//! "!!!"           → "x"
//! ```

/// Returned when a name has no slug-able characters at all.
pub const FALLBACK_SLUG: &str = "x";

fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ä' => 'a',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ò' | 'ó' | 'ô' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        other => other,
    }
}

/// Map an arbitrary display string to a URL-safe path segment.
///
/// Total over all inputs: the result always matches `[a-z0-9]+(-[a-z0-9]+)*`
/// or equals [`FALLBACK_SLUG`].
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.to_lowercase().chars().map(fold_accent) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// True if `slug` is lowercase kebab-case with no empty segments.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
