//! The retro terminal palette.
//!
//! Nesti is unconditionally dark: phosphor green on near-black, matching the
//! original front-end's scanline aesthetic.

use std::sync::OnceLock;

use ratatui::style::Color;

pub(crate) const PRIMARY_GREEN_RGB: &str = "#4ADE80";
pub(crate) const ACCENT_GREEN_RGB: &str = "#22C55E";
pub(crate) const DIM_GRAY_RGB: &str = "#71717A";
pub(crate) const ALERT_RED_RGB: &str = "#EF4444";

#[derive(Clone, Copy)]
struct UiRgbConstants {
    primary: (u8, u8, u8),
    accent: (u8, u8, u8),
    dim: (u8, u8, u8),
    alert: (u8, u8, u8),
}

fn ui_rgb_constants() -> &'static UiRgbConstants {
    static CONSTANTS: OnceLock<UiRgbConstants> = OnceLock::new();
    CONSTANTS.get_or_init(|| UiRgbConstants {
        primary: parse_hex_rgb(PRIMARY_GREEN_RGB)
            .unwrap_or_else(|| panic!("PRIMARY_GREEN_RGB must be #RRGGBB: {PRIMARY_GREEN_RGB}")),
        accent: parse_hex_rgb(ACCENT_GREEN_RGB)
            .unwrap_or_else(|| panic!("ACCENT_GREEN_RGB must be #RRGGBB: {ACCENT_GREEN_RGB}")),
        dim: parse_hex_rgb(DIM_GRAY_RGB)
            .unwrap_or_else(|| panic!("DIM_GRAY_RGB must be #RRGGBB: {DIM_GRAY_RGB}")),
        alert: parse_hex_rgb(ALERT_RED_RGB)
            .unwrap_or_else(|| panic!("ALERT_RED_RGB must be #RRGGBB: {ALERT_RED_RGB}")),
    })
}

fn parse_hex_rgb(value: &str) -> Option<(u8, u8, u8)> {
    let value = value.strip_prefix('#').unwrap_or(value);
    if value.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(&value[0..2], 16).ok()?;
    let g = u8::from_str_radix(&value[2..4], 16).ok()?;
    let b = u8::from_str_radix(&value[4..6], 16).ok()?;
    Some((r, g, b))
}

fn rgb(parts: (u8, u8, u8)) -> Color {
    Color::Rgb(parts.0, parts.1, parts.2)
}

pub(crate) fn primary_color() -> Color {
    rgb(ui_rgb_constants().primary)
}

pub(crate) fn accent_color() -> Color {
    rgb(ui_rgb_constants().accent)
}

pub(crate) fn dim_color() -> Color {
    rgb(ui_rgb_constants().dim)
}

pub(crate) fn alert_color() -> Color {
    rgb(ui_rgb_constants().alert)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_hex_rgb_parses_rrggbb() {
        assert_eq!(parse_hex_rgb("#000000"), Some((0, 0, 0)));
        assert_eq!(parse_hex_rgb("#4ADE80"), Some((0x4A, 0xDE, 0x80)));
        assert_eq!(parse_hex_rgb("EF4444"), Some((0xEF, 0x44, 0x44)));
        assert_eq!(parse_hex_rgb("#nope"), None);
        assert_eq!(parse_hex_rgb("#12345"), None);
    }

    #[test]
    fn all_palette_constants_parse() {
        // Touches the OnceLock init path so a bad constant fails loudly here
        // instead of at first render.
        let _ = primary_color();
        let _ = accent_color();
        let _ = dim_color();
        let _ = alert_color();
    }
}
