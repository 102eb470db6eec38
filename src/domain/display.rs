use ar_reshaper::ArabicReshaper;
use unicode_bidi::BidiInfo;

/// Prepare translated text for visual rendering.
///
/// Two passes, in this order:
/// 1. join positional letterforms so connected scripts render with the
///    correct contextual glyphs ([`reshape_letterforms`]);
/// 2. reorder for correct bidirectional visual display ([`reorder_visual`]).
///
/// Running the passes the other way round yields textually "valid" but
/// visually wrong output, since contextual forms depend on logical order.
pub fn shape_for_display(text: &str) -> String {
    let reshaped = reshape_letterforms(text);
    reorder_visual(&reshaped)
}

/// Join letterforms into their connected positional glyph forms.
/// Text without positional scripts passes through unchanged.
pub fn reshape_letterforms(text: &str) -> String {
    ArabicReshaper::default().reshape(text)
}

/// Reorder mixed-direction text into visual order (UAX #9).
pub fn reorder_visual(text: &str) -> String {
    let bidi = BidiInfo::new(text, None);
    bidi.paragraphs
        .iter()
        .map(|para| bidi.reorder_line(para, para.range.clone()))
        .collect()
}
