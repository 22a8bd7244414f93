//! Canonical form of person names for equality-style comparison.
//!
//! The pipeline, applied per character cluster:
//!
//! 1. Unicode NFKC.
//! 2. Non-breaking, zero-width and BOM-like spaces become a plain space.
//! 3. Latin letters that look like Cyrillic ones are folded to the Cyrillic
//!    letter, in both cases, so mixed-script spellings compare equal.
//! 4. Apostrophes and hyphens are dropped (`О'Браєн` == `ОБраєн`), and so
//!    are combining marks NFKC could not compose (stress marks: `Пе́тренко`).
//! 5. Remaining punctuation becomes a space.
//! 6. Whitespace runs collapse to one space; the ends are trimmed.
//! 7. Lowercase.
//!
//! The output is only meant for comparison, never for display.
//! [`MappedText`] keeps, for every byte of the canonical form, the byte
//! offset of the source character it came from, so hits found in the
//! canonical form can be reported against the source text.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

const SPACE_VARIANTS: &[char] = &[
    '\u{00A0}', // NO-BREAK SPACE
    '\u{2007}', // FIGURE SPACE
    '\u{202F}', // NARROW NO-BREAK SPACE
    '\u{200B}', // ZERO WIDTH SPACE
    '\u{200C}', // ZERO WIDTH NON-JOINER
    '\u{200D}', // ZERO WIDTH JOINER
    '\u{2060}', // WORD JOINER
    '\u{180E}', // MONGOLIAN VOWEL SEPARATOR
    '\u{FEFF}', // ZERO WIDTH NO-BREAK SPACE (BOM)
];

const APOSTROPHES_AND_HYPHENS: &[char] = &[
    '\'',
    '`',
    '\u{00B4}', // ACUTE ACCENT
    '\u{02B9}', // MODIFIER LETTER PRIME
    '\u{02BC}', // MODIFIER LETTER APOSTROPHE
    '\u{2018}', // LEFT SINGLE QUOTATION MARK
    '\u{2019}', // RIGHT SINGLE QUOTATION MARK
    '\u{2032}', // PRIME
    '-',
    '\u{00AD}', // SOFT HYPHEN
    '\u{2010}', // HYPHEN
    '\u{2011}', // NON-BREAKING HYPHEN
    '\u{2012}', // FIGURE DASH
    '\u{2013}', // EN DASH
    '\u{2014}', // EM DASH
    '\u{2015}', // HORIZONTAL BAR
    '\u{2212}', // MINUS SIGN
];

/// Latin letters folded onto their Cyrillic look-alikes.
///
/// Both cases of a letter map to the matching case of the same Cyrillic
/// letter, which keeps the fold compatible with lowercasing.
const fn fold_confusable(c: char) -> char {
    match c {
        'A' => '\u{0410}',
        'a' => '\u{0430}',
        'B' => '\u{0412}',
        'b' => '\u{0432}',
        'C' => '\u{0421}',
        'c' => '\u{0441}',
        'E' => '\u{0415}',
        'e' => '\u{0435}',
        'H' => '\u{041D}',
        'h' => '\u{043D}',
        'I' => '\u{0406}',
        'i' => '\u{0456}',
        'J' => '\u{0408}',
        'j' => '\u{0458}',
        'K' => '\u{041A}',
        'k' => '\u{043A}',
        'M' => '\u{041C}',
        'm' => '\u{043C}',
        'O' => '\u{041E}',
        'o' => '\u{043E}',
        'P' => '\u{0420}',
        'p' => '\u{0440}',
        'S' => '\u{0405}',
        's' => '\u{0455}',
        'T' => '\u{0422}',
        't' => '\u{0442}',
        'X' => '\u{0425}',
        'x' => '\u{0445}',
        'Y' => '\u{0423}',
        'y' => '\u{0443}',
        other => other,
    }
}

/// Steps 2 to 5 for one NFKC character. `None` drops the character.
fn canonical_char(c: char) -> Option<char> {
    if SPACE_VARIANTS.contains(&c) {
        return Some(' ');
    }
    let c = fold_confusable(c);
    if APOSTROPHES_AND_HYPHENS.contains(&c) || is_combining_mark(c) {
        return None;
    }
    Some(keep_or_space(c))
}

fn keep_or_space(c: char) -> char {
    if c.is_alphanumeric() || c.is_whitespace() {
        c
    } else {
        ' '
    }
}

/// Canonical form of a name (or of any text a name is searched in).
///
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`.
#[must_use]
pub fn normalize(text: &str) -> String {
    MappedText::normalized(text).into_string()
}

/// A transformed text that remembers where each byte came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappedText {
    text: String,
    /// Source byte offset for every byte of `text`.
    origins: Vec<usize>,
}

impl MappedText {
    /// The canonical name form of `raw` (see module docs).
    #[must_use]
    pub fn normalized(raw: &str) -> Self {
        let mut builder = Builder::collapsing();
        for (origin, cluster) in clusters(raw) {
            for c in cluster.nfkc() {
                let Some(c) = canonical_char(c) else {
                    continue;
                };
                // Lowercasing can yield combining marks (İ -> i + U+0307) or
                // fresh Latin letters, so they go through the fold again.
                for lower in c.to_lowercase().filter_map(canonical_char) {
                    builder.push(lower, origin);
                }
            }
        }
        builder.finish()
    }

    /// `raw` lowercased, nothing else.
    #[must_use]
    pub fn lowercased(raw: &str) -> Self {
        let mut builder = Builder::verbatim();
        for (origin, c) in raw.char_indices() {
            for lower in c.to_lowercase() {
                builder.push(lower, origin);
            }
        }
        builder.finish()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.text
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Source offset of a byte position in the transformed text.
    #[must_use]
    pub fn origin(&self, position: usize) -> Option<usize> {
        self.origins.get(position).copied()
    }

    /// Positions (in the transformed text) of non-overlapping occurrences.
    #[must_use]
    pub fn positions(&self, needle: &str) -> Vec<usize> {
        if needle.is_empty() {
            return Vec::new();
        }
        self.text.match_indices(needle).map(|(i, _)| i).collect()
    }

    /// Source offsets of non-overlapping occurrences, in text order.
    #[must_use]
    pub fn find_all(&self, needle: &str) -> Vec<usize> {
        self.positions(needle)
            .into_iter()
            .filter_map(|p| self.origin(p))
            .collect()
    }

    /// Number of non-overlapping occurrences.
    #[must_use]
    pub fn count(&self, needle: &str) -> usize {
        if needle.is_empty() {
            return 0;
        }
        self.text.matches(needle).count()
    }

    /// The transformed text around a match, widened by `margin` bytes on
    /// each side and snapped to character boundaries.
    #[must_use]
    pub fn window(&self, position: usize, len: usize, margin: usize) -> &str {
        let mut start = position.saturating_sub(margin);
        while !self.text.is_char_boundary(start) {
            start -= 1;
        }
        let mut end = position
            .saturating_add(len)
            .saturating_add(margin)
            .min(self.text.len());
        while !self.text.is_char_boundary(end) {
            end += 1;
        }
        &self.text[start..end]
    }
}

/// Base characters with their trailing combining marks, so NFKC can compose
/// them, paired with the source offset of the base.
fn clusters(raw: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut start: Option<usize> = None;
    for (offset, c) in raw.char_indices() {
        if is_combining_mark(c) && start.is_some() {
            continue;
        }
        if let Some(previous) = start.replace(offset) {
            out.push((previous, &raw[previous..offset]));
        }
    }
    if let Some(previous) = start {
        out.push((previous, &raw[previous..]));
    }
    out
}

struct Builder {
    text: String,
    origins: Vec<usize>,
    collapse: bool,
    pending_space: Option<usize>,
}

impl Builder {
    const fn collapsing() -> Self {
        Self {
            text: String::new(),
            origins: Vec::new(),
            collapse: true,
            pending_space: None,
        }
    }

    const fn verbatim() -> Self {
        Self {
            text: String::new(),
            origins: Vec::new(),
            collapse: false,
            pending_space: None,
        }
    }

    fn push(&mut self, c: char, origin: usize) {
        if self.collapse && c.is_whitespace() {
            if !self.text.is_empty() && self.pending_space.is_none() {
                self.pending_space = Some(origin);
            }
            return;
        }
        if let Some(space_origin) = self.pending_space.take() {
            self.push_raw(' ', space_origin);
        }
        self.push_raw(c, origin);
    }

    fn push_raw(&mut self, c: char, origin: usize) {
        self.text.push(c);
        self.origins.extend(std::iter::repeat_n(origin, c.len_utf8()));
    }

    fn finish(self) -> MappedText {
        MappedText {
            text: self.text,
            origins: self.origins,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_apostrophe_hyphen_and_case_variants_agree() {
        assert_eq!(
            normalize("O'Brien-Смiт"),
            normalize("ОʼBRIEN\u{2010}СМІТ")
        );
        assert_eq!(normalize("О'Браєн"), normalize("ОʼБРАЄН"));
        assert_eq!(normalize("Нечуй-Левицький"), normalize("нечуй‐левицький"));
    }

    #[test]
    fn test_hyphen_is_dropped_not_spaced() {
        assert_eq!(normalize("Нечуй-Левицький"), "нечуйлевицький");
    }

    #[test]
    fn test_mixed_script_spoofing_is_folded() {
        // Latin "P", "e", "o" against Cyrillic look-alikes.
        assert_eq!(normalize("Petrenko"), normalize("Реtrеnkо"));
        assert_eq!(normalize("СОКОЛ"), normalize("COKOЛ"));
    }

    #[test]
    fn test_space_variants_and_punctuation() {
        assert_eq!(
            normalize("  Шевченко,\u{00A0}Тарас\u{202F}Григорович.\u{FEFF} "),
            "шевченко тарас григорович"
        );
        assert_eq!(normalize("Пет\u{200B}ренко"), "пет ренко");
    }

    #[test]
    fn test_compatibility_forms() {
        // Fullwidth letters decompose under NFKC and then fold.
        assert_eq!(normalize("ＰＥＴＲＥＮＫＯ"), normalize("petrenko"));
    }

    #[test]
    fn test_decomposed_marks_compose() {
        assert_eq!(normalize("И\u{0306}ван"), normalize("Йван"));
    }

    #[test]
    fn test_uncomposable_marks_are_dropped() {
        assert_eq!(normalize("Пе\u{0301}тренко"), "петренко");
        assert_eq!(normalize("İванов"), normalize("iванов"));

        let raw = "свідок Пе\u{0301}тренко";
        let hits = MappedText::normalized(raw).find_all("петренко");
        assert_eq!(hits, vec![raw.find('П').unwrap_or_default()]);
    }

    #[test]
    fn test_empty_and_blank() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" -'- "), "");
    }

    #[test]
    fn test_mapped_offsets_point_into_source() {
        let raw = "Звіт: ПЕТРЕНКО та Petrenko.";
        let mapped = MappedText::normalized(raw);
        let needle = normalize("Петренко");
        let hits = mapped.find_all(&needle);
        assert_eq!(hits.len(), 1);
        assert_eq!(&raw[hits[0]..hits[0] + "ПЕТРЕНКО".len()], "ПЕТРЕНКО");
    }

    #[test]
    fn test_lowercased_keeps_offsets_for_growing_chars() {
        let raw = "İ 12345 İ 12345";
        let mapped = MappedText::lowercased(raw);
        let hits = mapped.find_all("12345");
        assert_eq!(hits.len(), 2);
        for hit in hits {
            assert_eq!(&raw[hit..hit + 5], "12345");
        }
    }

    #[test]
    fn test_count_is_non_overlapping() {
        let mapped = MappedText::lowercased("aaaa");
        assert_eq!(mapped.count("aa"), 2);
        assert_eq!(mapped.count(""), 0);
    }

    #[test]
    fn test_window_snaps_to_char_boundaries() {
        let mapped = MappedText::normalized("петренко 01.01.1990");
        let window = mapped.window(0, 2, 3);
        assert!(window.starts_with('п'));
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(raw in "[a-zA-Zа-яА-ЯіІїЇєЄґҐ'ʼ’ .,\u{00A0}\u{2010}\u{0301}-]{0,32}") {
            let once = normalize(&raw);
            prop_assert_eq!(normalize(&once), once);
        }
    }
}
