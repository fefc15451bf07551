//! Deterministic text canonicalization.
//!
//! Every string that enters the engine (queries, document patterns, entity
//! fields) passes through [`normalize`] before it is compared, vectorized,
//! or pattern-matched.
//!
//! # Algorithm
//!
//! 1. Lowercase each character (Unicode-aware).
//! 2. Fold accented Latin letters to their base letter via a fixed table
//!    (Vietnamese tone marks, `đ` → `d`, common Western European accents).
//! 3. Replace every non-alphanumeric character with a space.
//! 4. Collapse whitespace runs to a single space and trim.
//!
//! The function is idempotent: `normalize(normalize(x)) == normalize(x)`.
//!
//! # Example
//!
//! ```rust
//! use taskpilot_core::text::normalize;
//!
//! assert_eq!(normalize("Đã Xong!"), "da xong");
//! assert_eq!(normalize("  Hello,   World "), "hello world");
//! ```

/// Canonicalize text for matching and vectorization.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars() {
        for lower in c.to_lowercase() {
            let folded = fold_diacritic(lower);
            if folded.is_alphanumeric() {
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.push(folded);
            } else {
                pending_space = true;
            }
        }
    }

    out
}

/// Map an accented lowercase Latin letter to its unaccented base letter.
///
/// Characters outside the table are returned unchanged.
pub fn fold_diacritic(c: char) -> char {
    match c {
        'à' | 'á' | 'ạ' | 'ả' | 'ã' | 'â' | 'ầ' | 'ấ' | 'ậ' | 'ẩ' | 'ẫ' | 'ă' | 'ằ' | 'ắ'
        | 'ặ' | 'ẳ' | 'ẵ' | 'ä' | 'å' | 'ā' => 'a',
        'è' | 'é' | 'ẹ' | 'ẻ' | 'ẽ' | 'ê' | 'ề' | 'ế' | 'ệ' | 'ể' | 'ễ' | 'ë' | 'ē' => 'e',
        'ì' | 'í' | 'ị' | 'ỉ' | 'ĩ' | 'î' | 'ï' | 'ī' => 'i',
        'ò' | 'ó' | 'ọ' | 'ỏ' | 'õ' | 'ô' | 'ồ' | 'ố' | 'ộ' | 'ổ' | 'ỗ' | 'ơ' | 'ờ' | 'ớ'
        | 'ợ' | 'ở' | 'ỡ' | 'ö' | 'ø' | 'ō' => 'o',
        'ù' | 'ú' | 'ụ' | 'ủ' | 'ũ' | 'ư' | 'ừ' | 'ứ' | 'ự' | 'ử' | 'ữ' | 'û' | 'ü' | 'ū' => {
            'u'
        }
        'ỳ' | 'ý' | 'ỵ' | 'ỷ' | 'ỹ' | 'ÿ' => 'y',
        'đ' => 'd',
        'ç' => 'c',
        'ñ' => 'n',
        _ => c,
    }
}

/// Split normalized text into whitespace-separated tokens.
pub fn tokens(normalized: &str) -> impl Iterator<Item = &str> {
    normalized.split_whitespace()
}

/// Return at most `max_chars` characters of `text`, appending `…` when cut.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let mut cut: String = trimmed.chars().take(max_chars).collect();
    cut.push('…');
    cut
}
