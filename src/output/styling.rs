use console::{style, Style, StyledObject};

/// Styling helpers for terminal output
pub fn bright_red(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).bright().red()
}

pub fn dim(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).dim()
}

pub fn bold(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).bold()
}

pub fn magenta_bold(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).magenta().bold()
}

/// Paints `text` with a `#rrggbb` theme colour, unstyled when the colour is invalid.
pub fn paint(text: impl std::fmt::Display, hex: &str) -> StyledObject<String> {
    hex_style(hex).apply_to(text.to_string())
}

pub fn hex_style(hex: &str) -> Style {
    match parse_hex(hex) {
        Some((r, g, b)) => Style::new().color256(ansi256(r, g, b)),
        None => Style::new(),
    }
}

/// Parses `#rrggbb` (the leading `#` is optional).
pub fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Nearest entry of the xterm 256-colour cube or grey ramp.
pub fn ansi256(r: u8, g: u8, b: u8) -> u8 {
    if r == g && g == b {
        return match r {
            0..=7 => 16,
            249..=255 => 231,
            _ => 232 + ((u16::from(r) - 8) * 24 / 247) as u8,
        };
    }

    let level = |channel: u8| -> u8 {
        match channel {
            0..=47 => 0,
            48..=114 => 1,
            _ => ((u16::from(channel) - 35) / 40) as u8,
        }
    };
    16 + 36 * level(r) + 6 * level(g) + level(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#cba6f7"), Some((0xcb, 0xa6, 0xf7)));
        assert_eq!(parse_hex("A6E3A1"), Some((0xa6, 0xe3, 0xa1)));
        assert_eq!(parse_hex("#fff"), None);
        assert_eq!(parse_hex("#gggggg"), None);
        assert_eq!(parse_hex(""), None);
    }

    #[test]
    fn test_ansi256_cube_corners() {
        assert_eq!(ansi256(0, 0, 0), 16);
        assert_eq!(ansi256(255, 255, 255), 231);
        assert_eq!(ansi256(255, 0, 0), 196);
        assert_eq!(ansi256(0, 255, 0), 46);
        assert_eq!(ansi256(0, 0, 255), 21);
    }

    #[test]
    fn test_ansi256_grey_ramp() {
        let grey = ansi256(128, 128, 128);
        assert!((232..=255).contains(&grey));
    }
}
