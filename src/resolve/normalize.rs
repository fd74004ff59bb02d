//! Address and place-name normalization.
//!
//! Both sides of every comparison go through [`fold_name`]: gazetteer
//! names at load time, address text at request time. Addresses
//! additionally get split into segments and run through the token
//! rewrite tables.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::rewrites::TokenRewrites;

/// Fold one name to its comparable form: lowercase, diacritics stripped,
/// punctuation removed, whitespace collapsed.
///
/// Apostrophes are deleted rather than replaced ("O'Neill" and "ONeill"
/// fold to the same string); every other non-alphanumeric character
/// becomes a word break.
pub fn fold_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_space = false;

    for ch in name.nfd() {
        if is_combining_mark(ch) || ch == '\'' || ch == '\u{2019}' {
            continue;
        }
        if ch.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_space = true;
        }
    }

    out
}

/// Normalize a raw address into an ordered list of candidate segments.
///
/// Segments are delimited by commas, semicolons, and newlines; each
/// segment is folded and then rewritten (county markers dropped,
/// abbreviations expanded). Empty and pure-punctuation segments
/// disappear. The operation is idempotent: re-normalizing any output
/// segment returns it unchanged.
pub fn normalize(raw: &str, rewrites: &TokenRewrites) -> Vec<String> {
    raw.split([',', ';', '\n'])
        .map(fold_name)
        .map(|segment| rewrites.apply(&segment))
        .filter(|segment| !segment.is_empty())
        .collect()
}
