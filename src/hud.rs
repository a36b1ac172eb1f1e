use crate::prefs::Preferences;

/// Height of a line of HUD text in pixels, before scaling.
const LINE_HEIGHT: i32 = 16;
/// Gap between lines in pixels, before scaling.
const LINE_SPACING: i32 = 10;

/// One line of text to draw on screen, at a position in pixels measured from
/// the bottom left corner of the viewport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HudLine {
    pub text: String,
    pub x: i32,
    pub y: i32,
    /// Text height in pixels.
    pub size: i32,
}

/// A value shown in the HUD along with the key that changes it.
pub(crate) struct HudEntry {
    pub label: &'static str,
    pub value: String,
    pub hint: &'static str,
}

/// Saturates instead of wrapping for huge scales.
fn scaled(value: i32, percent: u32) -> i32 {
    let scaled = value as i64 * percent as i64 / 100;
    i32::try_from(scaled).unwrap_or(if scaled < 0 { i32::MIN } else { i32::MAX })
}

/// Lay the entries out one above the other, starting at the offset in the
/// preferences.
pub(crate) fn layout(entries: &[HudEntry], prefs: &Preferences) -> Vec<HudLine> {
    if !prefs.show_hud {
        return Vec::new();
    }
    let mut texts: Vec<String> = entries
        .iter()
        .map(|e| {
            if prefs.show_keys {
                format!("{}: {} {}", e.label, e.value, e.hint)
            } else {
                format!("{}: {}", e.label, e.value)
            }
        })
        .collect();
    if prefs.show_keys {
        texts.push("Accept (Enter) Cancel (ESC)".to_string());
    }
    let pitch = scaled(LINE_HEIGHT + LINE_SPACING, prefs.hud_scale_percent);
    let size = scaled(LINE_HEIGHT, prefs.hud_scale_percent);
    texts
        .into_iter()
        .enumerate()
        .map(|(i, text)| HudLine {
            text,
            x: prefs.hud_offset_x,
            y: prefs
                .hud_offset_y
                .saturating_add((i as i32).saturating_mul(pitch)),
            size,
        })
        .collect()
}
