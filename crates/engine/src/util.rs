//! Internal helpers for name normalization.
//!
//! These utilities are **not** part of the public API.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Turn a free-form expense label into a single ledger account component.
///
/// Accents are stripped, every run of characters that are not ASCII
/// alphanumerics splits words, and words are joined in CamelCase:
/// `"comida rápida"` becomes `ComidaRapida`. Returns `None` when nothing is
/// left.
pub(crate) fn account_component(label: &str) -> Option<String> {
    let mut out = String::new();
    let mut word_start = true;
    for ch in label.trim().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_ascii_alphanumeric() {
            if word_start {
                out.push(ch.to_ascii_uppercase());
            } else {
                out.push(ch);
            }
            word_start = false;
        } else {
            word_start = true;
        }
    }
    if out.is_empty() { None } else { Some(out) }
}
