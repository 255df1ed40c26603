//! Helpers for image uploads on the chat endpoint

use unicode_normalization::UnicodeNormalization;

/// Image extensions the vision path accepts
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "bmp"];

/// True if `filename` has an extension in [`ALLOWED_EXTENSIONS`] (case-insensitive).
pub fn allowed_file(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
        None => false,
    }
}

/// Reduce a client-supplied file name to a safe, flat ASCII name.
///
/// Accents are folded away (NFKD, combining marks and other non-ASCII
/// characters dropped), directory components are discarded, whitespace
/// runs become `_`, characters outside `[A-Za-z0-9._-]` are removed and
/// dots or underscores are trimmed from both ends.
pub fn secure_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();

    let ascii: String = base.nfkd().filter(char::is_ascii).collect();
    let cleaned: String = ascii
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    let trimmed = cleaned.trim_matches(['.', '_']).to_string();
    if trimmed.is_empty() { "image".to_string() } else { trimmed }
}
