//! Display-width measurement and width-bounded truncation.
//!
//! Terminal renderers lay glyphs out on a fixed column grid: most characters
//! occupy one column, East-Asian-wide characters and emoji occupy two.
//! Widths are defined over UTF-16 code units so that surrogate pairs are
//! always consumed atomically - [`measure_unit`] is the single decode step
//! everything else is built on.

/// Ellipsis appended by the truncation functions.
pub const ELLIPSIS: &str = "...";

const ELLIPSIS_WIDTH: usize = 3;

const HIGH_SURROGATE_START: u16 = 0xD800;
const HIGH_SURROGATE_END: u16 = 0xDBFF;
const LOW_SURROGATE_START: u16 = 0xDC00;
const LOW_SURROGATE_END: u16 = 0xDFFF;

/// Two-column code point ranges within the Basic Multilingual Plane:
/// CJK ideographs, Hangul, fullwidth forms, CJK punctuation, and the
/// BMP emoji blocks. Astral code points are all treated as wide and are
/// handled by the surrogate-pair path, not this table.
fn is_wide_bmp(cp: u32) -> bool {
    matches!(cp,
        0x1100..=0x115F          // Hangul Jamo
        | 0x2600..=0x27BF        // Misc Symbols, Dingbats (BMP emoji)
        | 0x2E80..=0x303E        // CJK Radicals .. CJK punctuation
        | 0x3041..=0x33FF        // Hiragana .. CJK Compatibility
        | 0x3400..=0x4DBF        // CJK Extension A
        | 0x4E00..=0x9FFF        // CJK Unified Ideographs
        | 0xA000..=0xA4CF        // Yi Syllables
        | 0xAC00..=0xD7A3        // Hangul Syllables
        | 0xF900..=0xFAFF        // CJK Compatibility Ideographs
        | 0xFE30..=0xFE4F        // CJK Compatibility Forms
        | 0xFF00..=0xFF60        // Fullwidth Forms
        | 0xFFE0..=0xFFE6)
}

fn is_high_surrogate(unit: u16) -> bool {
    (HIGH_SURROGATE_START..=HIGH_SURROGATE_END).contains(&unit)
}

fn is_low_surrogate(unit: u16) -> bool {
    (LOW_SURROGATE_START..=LOW_SURROGATE_END).contains(&unit)
}

/// Decode one display unit from the front of a UTF-16 code-unit slice,
/// returning `(width, units_consumed)`.
///
/// A well-formed surrogate pair is consumed as a single unit of width 2 -
/// it is never split. An unpaired high surrogate defensively counts as
/// width 2; an orphaned low surrogate is invisible (width 0). Both consume
/// exactly one code unit so that scanning always makes progress.
pub fn measure_unit(units: &[u16]) -> (usize, usize) {
    let Some(&first) = units.first() else {
        return (0, 0);
    };

    if is_high_surrogate(first) {
        if units.get(1).is_some_and(|&u| is_low_surrogate(u)) {
            return (2, 2);
        }
        return (2, 1);
    }
    if is_low_surrogate(first) {
        return (0, 1);
    }

    if is_wide_bmp(u32::from(first)) { (2, 1) } else { (1, 1) }
}

/// Display width of a single scalar value. Astral code points (anything
/// encoded as a surrogate pair in UTF-16) are always wide.
fn scalar_width(c: char) -> usize {
    let cp = c as u32;
    if cp > 0xFFFF || is_wide_bmp(cp) { 2 } else { 1 }
}

/// Display width of the first display unit of `grapheme`; 0 for empty input.
pub fn char_width(grapheme: &str) -> usize {
    match grapheme.chars().next() {
        Some(c) => scalar_width(c),
        None => 0,
    }
}

/// Total display width of `s`.
pub fn string_width(s: &str) -> usize {
    s.chars().map(scalar_width).sum()
}

/// Longest prefix of `s` (on scalar boundaries, so surrogate pairs stay
/// intact) whose display width does not exceed `budget`.
fn width_bounded_prefix(s: &str, budget: usize) -> &str {
    let mut used = 0;
    for (idx, c) in s.char_indices() {
        let w = scalar_width(c);
        if used + w > budget {
            return &s[..idx];
        }
        used += w;
    }
    s
}

/// Truncate `s` so that the kept prefix plus a trailing [`ELLIPSIS`] fits in
/// `max_width` columns. Returns `s` unchanged if it already fits, and the
/// ellipsis alone if not even the first display unit fits.
///
/// The total width may exceed `max_width` only when `max_width` is smaller
/// than the ellipsis itself; use [`truncate_to_width_strict`] when the bound
/// must hold for every input.
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if string_width(s) <= max_width {
        return s.to_string();
    }
    let prefix = width_bounded_prefix(s, max_width.saturating_sub(ELLIPSIS_WIDTH));
    format!("{prefix}{ELLIPSIS}")
}

/// Like [`truncate_to_width`], but the returned width never exceeds
/// `max_width` for any input: when `max_width` is smaller than the
/// ellipsis, the result degrades to as many dots as fit.
pub fn truncate_to_width_strict(s: &str, max_width: usize) -> String {
    if string_width(s) <= max_width {
        return s.to_string();
    }
    if max_width < ELLIPSIS_WIDTH {
        return ELLIPSIS[..max_width].to_string();
    }
    let prefix = width_bounded_prefix(s, max_width - ELLIPSIS_WIDTH);
    format!("{prefix}{ELLIPSIS}")
}
