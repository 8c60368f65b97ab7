//! Transcript normalization before extraction.
//!
//! Speech-to-text output arrives with hesitation fillers ("um", "you
//! know"), uneven spacing between fragments, and stretched words
//! ("Jimmyyy"). Extraction quality improves noticeably when those are
//! stripped first, so every transcript passes through [`normalize`]
//! before it reaches the extraction client.

use crate::defaults::FILLER_TOKENS;

/// Normalize a raw transcript for extraction.
///
/// Steps, in order: collapse runs of 3+ identical characters to one,
/// remove standalone filler tokens, collapse whitespace, trim.
///
/// Repetition collapse runs first so that stretched fillers ("ummm",
/// "uhhh") reduce to their dictionary form and are then removed; the
/// reverse order would leak them back into the output.
///
/// Pure and total; never fails.
pub fn normalize(text: &str) -> String {
    let collapsed = collapse_repeats(text);
    let stripped = strip_fillers(&collapsed);
    collapse_whitespace(&stripped)
}

/// Collapse any character repeated 3+ times consecutively to a single
/// occurrence. Double characters are left alone.
///
/// This is a blunt heuristic: it applies to any character, so a
/// legitimate triple letter would be corrupted too. English has no
/// common triple-letter words, and recognizer output stretches letters
/// far more often than it produces them legitimately.
fn collapse_repeats(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run_char: Option<char> = None;
    let mut run_len = 0usize;

    for ch in text.chars() {
        if run_char == Some(ch) {
            run_len += 1;
            // Keep up to two occurrences; drop the rest of the run.
            if run_len < 3 {
                out.push(ch);
            } else if run_len == 3 {
                // Run just crossed the threshold: reduce to one occurrence.
                out.pop();
            }
        } else {
            run_char = Some(ch);
            run_len = 1;
            out.push(ch);
        }
    }

    out
}

/// Remove standalone filler tokens, case-insensitively.
///
/// A token only matches at word boundaries: the character before must be
/// start-of-text or non-alphanumeric, and likewise after. "periodic"
/// style partial matches are therefore impossible ("liked" keeps its
/// "like"). Surrounding whitespace is left in place for the whitespace
/// collapse that follows.
fn strip_fillers(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < len {
        let mut matched = false;

        // FILLER_TOKENS is ordered longest phrase first so "you know"
        // wins over any single-word candidate at the same position.
        for phrase in FILLER_TOKENS {
            let phrase_chars: Vec<char> = phrase.chars().collect();
            let plen = phrase_chars.len();

            if i + plen > len {
                continue;
            }

            let chars_match = chars[i..i + plen]
                .iter()
                .zip(phrase_chars.iter())
                .all(|(src, phr)| src.to_lowercase().eq(phr.to_lowercase()));
            if !chars_match {
                continue;
            }

            let before_ok = i == 0 || !chars[i - 1].is_alphanumeric();
            let after_pos = i + plen;
            let after_ok = after_pos == len || !chars[after_pos].is_alphanumeric();

            if before_ok && after_ok {
                i += plen;
                matched = true;
                break;
            }
        }

        if !matched {
            out.push(chars[i]);
            i += 1;
        }
    }

    out
}

/// Collapse whitespace runs to a single space and trim both ends.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
