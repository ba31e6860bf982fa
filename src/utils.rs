//! Utility functions.

/// Byte offset of char `char_idx` in `s`, or `s.len()` past the end.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices().nth(char_idx).map_or(s.len(), |(bi, _)| bi)
}

/// Clamp an `i64` (which may be negative) into a `[lo, hi]` range and return `usize`.
pub fn clamp_usize_i64(v: i64, lo: usize, hi: usize) -> usize {
    let lo_i = i64::try_from(lo).unwrap_or(i64::MAX);
    let hi_i = i64::try_from(hi).unwrap_or(i64::MAX);
    if v < lo_i {
        lo
    } else if v > hi_i {
        hi
    } else {
        usize::try_from(v).unwrap_or(lo)
    }
}

/// Shift a column by a signed delta, clamping at zero.
pub fn shift_col(x: usize, delta: isize) -> usize {
    x.saturating_add_signed(delta)
}

/// Edit distance between two strings, counted in chars.
///
/// Used for "did you mean?" suggestions on unknown commands.
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let b: Vec<char> = s2.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in s1.chars().enumerate() {
        let mut row = Vec::with_capacity(b.len() + 1);
        row.push(i + 1);
        for (j, &cb) in b.iter().enumerate() {
            let substitute = prev[j] + usize::from(ca != cb);
            row.push(substitute.min(prev[j + 1] + 1).min(row[j] + 1));
        }
        prev = row;
    }
    prev[b.len()]
}
