use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Longest label a domain name may carry.
pub const MAX_LABEL_LENGTH: usize = 63;

lazy_static! {
    static ref DISCARDED: Regex = Regex::new(r"[^a-z0-9\s_-]").expect("valid regex");
    static ref SEPARATORS: Regex = Regex::new(r"[\s_-]+").expect("valid regex");
}

/// Normalize a keyword phrase into a domain label.
///
/// `"Thë Best Sitè"` becomes `"the-best-site"`. Accents are folded to ASCII,
/// other non-ASCII text is dropped, runs of whitespace, `-` and `_` collapse to
/// one hyphen and remaining punctuation is removed. Applying it to its own
/// output returns the same string.
pub fn slugify(keyword: &str) -> String {
    let ascii: String = keyword.nfkd().filter(char::is_ascii).collect();
    let lowered = ascii.to_ascii_lowercase();
    let stripped = DISCARDED.replace_all(&lowered, "");
    let collapsed = SEPARATORS.replace_all(&stripped, "-");
    let slug = collapsed.trim_matches('-');

    // ASCII only at this point, so byte slicing stays on char boundaries.
    let slug = &slug[..slug.len().min(MAX_LABEL_LENGTH)];
    slug.trim_end_matches('-').to_string()
}
