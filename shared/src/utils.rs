pub const MAX_SLUG_LEN: usize = 80;

use deunicode::deunicode;

/// Turns free text into a filesystem-safe slug.
///
/// Input is transliterated to ASCII first (`é` becomes `e`). Letters and
/// digits are kept (lowercased); every other run of characters collapses into
/// a single `-`. Leading and trailing separators are
/// dropped and the result is capped at [`MAX_SLUG_LEN`] bytes. Input with no
/// usable characters yields `"untitled"`.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_separator = false;

    for c in deunicode(input).chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
        let trimmed = slug.trim_end_matches('-').len();
        slug.truncate(trimmed);
    }

    if slug.is_empty() {
        return "untitled".to_string();
    }
    slug
}
