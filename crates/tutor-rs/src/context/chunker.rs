//! Fixed-size text chunking.
//!
//! Splits on character boundaries with no regard for words or sentences.
//! Chunks are contiguous and in order, so concatenating them gives back the
//! input exactly.

/// Default chunk size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 80_000;

/// Split `text` into chunks of at most `max_chunk_size` characters.
///
/// An empty input yields no chunks. Every other input yields
/// `ceil(chars / max_chunk_size)` non-empty chunks; only the last may be
/// shorter than `max_chunk_size`. Sizes count Unicode scalar values, and
/// a chunk never splits a multi-byte character.
///
/// # Panics
///
/// Panics if `max_chunk_size` is 0.
pub fn split(text: &str, max_chunk_size: usize) -> Vec<String> {
    assert!(max_chunk_size > 0, "max_chunk_size must be positive");

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;
    for c in text.chars() {
        current.push(c);
        count += 1;
        if count == max_chunk_size {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(split("", 10).is_empty());
    }

    #[test]
    fn short_input_is_one_chunk() {
        assert_eq!(split("hello", 10), vec!["hello"]);
    }

    #[test]
    fn exact_multiple_has_no_trailing_empty_chunk() {
        assert_eq!(split("abcdef", 3), vec!["abc", "def"]);
    }

    #[test]
    fn splits_mid_word() {
        assert_eq!(split("hello world", 4), vec!["hell", "o wo", "rld"]);
    }

    #[test]
    fn two_hundred_thousand_chars_make_three_chunks() {
        let text = "x".repeat(200_000);
        let chunks = split(&text, DEFAULT_CHUNK_SIZE);
        let sizes: Vec<usize> = chunks.iter().map(|c| c.chars().count()).collect();
        assert_eq!(sizes, vec![80_000, 80_000, 40_000]);
    }

    #[test]
    fn join_reconstructs_input_and_respects_limit() {
        let samples = [
            "",
            "a",
            "The quick brown fox jumps over the lazy dog.",
            "ñandú ß 漢字 and emoji 🦀🦀🦀 mixed in",
            "line one\nline two\r\nline three\n",
        ];
        for text in samples {
            for size in [1, 2, 3, 7, 64, 1000] {
                let chunks = split(text, size);
                assert_eq!(chunks.concat(), text, "size {size}");
                assert!(chunks.iter().all(|c| c.chars().count() <= size));
                assert!(chunks.iter().all(|c| !c.is_empty()));
                let expected = text.chars().count().div_ceil(size);
                assert_eq!(chunks.len(), expected, "size {size}");
            }
        }
    }

    #[test]
    fn multibyte_characters_are_not_split() {
        let chunks = split("ééé", 2);
        assert_eq!(chunks, vec!["éé", "é"]);
    }

    #[test]
    #[should_panic(expected = "max_chunk_size must be positive")]
    fn zero_size_panics() {
        split("abc", 0);
    }
}
