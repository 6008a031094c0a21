//! Text normalizer.
//!
//! A deterministic char map (identity, with Latin diacritic folding
//! overrides) plus whitespace collapsing. Returns the input unchanged
//! (no allocation) when nothing would change.

use std::borrow::Cow;

use once_cell::sync::Lazy;

const CHAR_MAP_SIZE: usize = 0x1_0000;

static CHAR_MAP: Lazy<Box<[char]>> = Lazy::new(build_char_map);

fn build_char_map() -> Box<[char]> {
    let mut map: Vec<char> = (0..CHAR_MAP_SIZE)
        .map(|c| char::from_u32(c as u32).unwrap_or('\u{FFFD}'))
        .collect();

    // Latin-1 Supplement diacritic folding, the common case for search queries.
    let folds: &[(char, char)] = &[
        ('À', 'A'), ('Á', 'A'), ('Â', 'A'), ('Ã', 'A'), ('Ä', 'A'), ('Å', 'A'),
        ('à', 'a'), ('á', 'a'), ('â', 'a'), ('ã', 'a'), ('ä', 'a'), ('å', 'a'),
        ('È', 'E'), ('É', 'E'), ('Ê', 'E'), ('Ë', 'E'),
        ('è', 'e'), ('é', 'e'), ('ê', 'e'), ('ë', 'e'),
        ('Ì', 'I'), ('Í', 'I'), ('Î', 'I'), ('Ï', 'I'),
        ('ì', 'i'), ('í', 'i'), ('î', 'i'), ('ï', 'i'),
        ('Ò', 'O'), ('Ó', 'O'), ('Ô', 'O'), ('Õ', 'O'), ('Ö', 'O'),
        ('ò', 'o'), ('ó', 'o'), ('ô', 'o'), ('õ', 'o'), ('ö', 'o'),
        ('Ù', 'U'), ('Ú', 'U'), ('Û', 'U'), ('Ü', 'U'),
        ('ù', 'u'), ('ú', 'u'), ('û', 'u'), ('ü', 'u'),
        ('Ñ', 'N'), ('ñ', 'n'),
        ('Ç', 'C'), ('ç', 'c'),
        ('Ý', 'Y'), ('ý', 'y'), ('ÿ', 'y'),
    ];
    for &(from, to) in folds {
        map[from as usize] = to;
    }
    map.into_boxed_slice()
}

fn mapped(c: char) -> char {
    let idx = c as usize;
    if idx < CHAR_MAP_SIZE {
        CHAR_MAP[idx]
    } else {
        c
    }
}

/// True for the common default whitespace pattern: runs of plain spaces, plus
/// bare tabs/newlines/carriage-returns that collapse to a single space.
fn is_default_whitespace_run(text: &str) -> bool {
    text.chars().any(|c| c == '\t' || c == '\n' || c == '\r' || c == ' ')
}

/// Normalize `text`: fold diacritics via the char map and collapse whitespace
/// runs to single spaces. Returns `Cow::Borrowed(text)` when nothing changes.
pub fn normalize(text: &str) -> Cow<'_, str> {
    let needs_change = text.chars().any(|c| {
        mapped(c) != c || c == '\t' || c == '\n' || c == '\r'
    }) || has_multi_space_run(text);

    if !needs_change {
        return Cow::Borrowed(text);
    }

    if is_default_whitespace_run(text) {
        return Cow::Owned(single_pass_collapse(text));
    }

    Cow::Owned(text.chars().map(mapped).collect())
}

fn has_multi_space_run(text: &str) -> bool {
    let mut prev_space = false;
    for c in text.chars() {
        if c == ' ' {
            if prev_space {
                return true;
            }
            prev_space = true;
        } else {
            prev_space = false;
        }
    }
    false
}

fn single_pass_collapse(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for c in text.chars() {
        if c == ' ' || c == '\t' || c == '\n' || c == '\r' {
            pending_space = true;
            continue;
        }
        if pending_space {
            out.push(' ');
        }
        pending_space = false;
        out.push(mapped(c));
    }
    if pending_space {
        out.push(' ');
    }
    out
}
