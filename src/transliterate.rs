//! Cyrillic to Latin file name normalization.
//!
//! Only the part of a file name before its first `.` is rewritten: Cyrillic
//! letters are replaced through a fixed table and any remaining non-word
//! character becomes `_`. Everything after the first `.` is kept verbatim.
//!
//! # Examples
//!
//! ```
//! use clean_folder::transliterate::normalize;
//!
//! assert_eq!(normalize("Привіт світ.txt"), "Pryvit_svit.txt");
//! assert_eq!(normalize("backup.tar.gz"), "backup.tar.gz");
//! ```

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

const CYRILLIC_SYMBOLS: &str = "абвгґдеєжзиіїйклмнопрстуфхцчшщьюя";

const TRANSLATION: [&str; 33] = [
    "a", "b", "v", "g", "g", "d", "e", "je", "zh", "z", "y", "i", "ji", "j", "k", "l", "m", "n",
    "o", "p", "r", "s", "t", "u", "f", "h", "ts", "ch", "sh", "sch", "", "ju", "ja",
];

static TRANSLATION_TABLE: LazyLock<HashMap<char, String>> = LazyLock::new(|| {
    let mut table = HashMap::with_capacity(CYRILLIC_SYMBOLS.chars().count() * 2);
    for (symbol, latin) in CYRILLIC_SYMBOLS.chars().zip(TRANSLATION) {
        table.insert(symbol, latin.to_string());
        for upper in symbol.to_uppercase() {
            table.insert(upper, latin.to_uppercase());
        }
    }
    table
});

/// Anything that is not a letter, a digit or `_`. Combining marks count as
/// non-word, so decomposed Cyrillic never leaves a stray accent behind.
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}_]").expect("static non-word pattern"));

/// Replaces every mapped Cyrillic letter of `text` with its Latin spelling.
///
/// Characters that have no table entry are passed through untouched.
pub fn transliterate(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match TRANSLATION_TABLE.get(&c) {
            Some(latin) => out.push_str(latin),
            None => out.push(c),
        }
    }
    out
}

/// Produces the normalized form of a file name.
///
/// The name is split on its first `.`; the base is transliterated and every
/// non-word character in it is replaced with `_`, then the untouched remainder
/// is reattached. A name with no `.` at all stays without one.
pub fn normalize(file_name: &str) -> String {
    let (base, rest) = match file_name.split_once('.') {
        Some((base, rest)) => (base, Some(rest)),
        None => (file_name, None),
    };

    let base = NON_WORD.replace_all(&transliterate(base), "_").into_owned();

    match rest {
        Some(rest) => format!("{}.{}", base, rest),
        None => base,
    }
}
