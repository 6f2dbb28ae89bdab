//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use crate::pieces::TetrominoKind;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// One Dark palette and UI colours loaded from a theme file.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Piece colours indexed by `TetrominoKind::color_index`: I, O, T, S, Z, J, L.
    pub pieces: [Color; 7],
    /// Playfield background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (score, level).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Secondary text and disabled hold slot.
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

const ONEDARK_PIECES: [Color; 7] = [
    Color::Rgb(0x56, 0xB6, 0xC2), // I: cyan
    Color::Rgb(0xE5, 0xC0, 0x7B), // O: yellow
    Color::Rgb(0xC6, 0x78, 0xDD), // T: magenta
    Color::Rgb(0x98, 0xC3, 0x79), // S: green
    Color::Rgb(0xE0, 0x6C, 0x75), // Z: red
    Color::Rgb(0x61, 0xAF, 0xEF), // J: blue
    Color::Rgb(0xD1, 0x9A, 0x66), // L: orange
];

impl Theme {
    /// Hardcoded One Dark defaults.
    pub fn onedark_default() -> Self {
        Self {
            pieces: ONEDARK_PIECES,
            bg: Color::Rgb(0x28, 0x2C, 0x34),
            div_line: Color::Rgb(0x3F, 0x44, 0x4F),
            main_fg: Color::Rgb(0xAB, 0xB2, 0xBF),
            title: Color::Rgb(0xE5, 0xC0, 0x7B),
            inactive_fg: Color::Rgb(0x5C, 0x63, 0x70),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to One Dark defaults if path is None or the file is missing.
    /// `palette` selects colour variant: Normal (theme), HighContrast, or Colorblind.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            Some(p) => {
                log::warn!("theme file {} not found, using defaults", p.display());
                return Ok(Self::default_for_palette(palette));
            }
            None => return Ok(Self::default_for_palette(palette)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::from_map(&map);
        theme.apply_palette(palette);
        Ok(theme)
    }

    /// Default theme for a palette when no file is loaded.
    fn default_for_palette(palette: crate::Palette) -> Self {
        let mut t = Self::onedark_default();
        t.apply_palette(palette);
        t
    }

    /// Override piece colours for high-contrast or colorblind.
    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => {
                self.pieces = [
                    Color::Rgb(0x00, 0xFF, 0xFF),
                    Color::Rgb(0xFF, 0xFF, 0x00),
                    Color::Rgb(0xFF, 0x00, 0xFF),
                    Color::Rgb(0x00, 0xFF, 0x00),
                    Color::Rgb(0xFF, 0x00, 0x00),
                    Color::Rgb(0x00, 0x88, 0xFF),
                    Color::Rgb(0xFF, 0x88, 0x00),
                ];
            }
            crate::Palette::Colorblind => {
                // Paul Tol's bright/vibrant set; no red/green pair carries meaning alone
                self.pieces = [
                    Color::Rgb(0x33, 0xBB, 0xEE),
                    Color::Rgb(0xCC, 0xBB, 0x44),
                    Color::Rgb(0xEE, 0x33, 0x77),
                    Color::Rgb(0x00, 0x99, 0x88),
                    Color::Rgb(0xCC, 0x33, 0x11),
                    Color::Rgb(0x00, 0x77, 0xBB),
                    Color::Rgb(0xEE, 0x77, 0x33),
                ];
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| {
            map.get(key)
                .and_then(|v| parse_hex(v.trim_matches('"').trim_matches('\'').trim()).ok())
        };
        let d = Self::onedark_default();
        // Keys follow btop theme names; each falls back to the One Dark value.
        Self {
            pieces: [
                get("hi_fg").or_else(|| get("proc_misc")).unwrap_or(d.pieces[0]),
                get("title").or_else(|| get("cpu_mid")).unwrap_or(d.pieces[1]),
                get("net_box").unwrap_or(d.pieces[2]),
                get("mem_box").or_else(|| get("cpu_start")).unwrap_or(d.pieces[3]),
                get("cpu_end").or_else(|| get("temp_end")).unwrap_or(d.pieces[4]),
                get("cpu_box").unwrap_or(d.pieces[5]),
                get("temp_mid").or_else(|| get("used_mid")).unwrap_or(d.pieces[6]),
            ],
            bg: get("main_bg").or_else(|| get("meter_bg")).unwrap_or(d.bg),
            div_line: get("div_line").unwrap_or(d.div_line),
            main_fg: get("main_fg").unwrap_or(d.main_fg),
            title: get("title").unwrap_or(d.title),
            inactive_fg: get("inactive_fg").unwrap_or(d.inactive_fg),
        }
    }

    /// Colour of a piece kind.
    #[inline]
    pub fn piece(&self, kind: TetrominoKind) -> Color {
        self.pieces[kind.color_index()]
    }

    /// Ghost colour: the piece colour dimmed halfway toward the background.
    pub fn ghost(&self, kind: TetrominoKind) -> Color {
        match (self.piece(kind), self.bg) {
            (Color::Rgb(r, g, b), Color::Rgb(br, bgg, bb)) => Color::Rgb(
                ((u16::from(r) + u16::from(br)) / 2) as u8,
                ((u16::from(g) + u16::from(bgg)) / 2) as u8,
                ((u16::from(b) + u16::from(bb)) / 2) as u8,
            ),
            _ => self.inactive_fg,
        }
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(stripped) = line.strip_prefix("theme[") {
            if let Some(end) = stripped.find(']') {
                let key = stripped[..end].trim();
                let rest = stripped[end + 1..].trim();
                if let Some(eq) = rest.find('=') {
                    let value = rest[eq + 1..]
                        .trim()
                        .trim_matches('"')
                        .trim_matches('\'')
                        .to_string();
                    if !value.is_empty() {
                        map.insert(key.to_string(), value);
                    }
                }
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let (r, g, b) = if s.len() == 6 {
        let r =
            u8::from_str_radix(&s[0..2], 16).map_err(|_| ThemeError::InvalidHex(s.to_string()))?;
        let g =
            u8::from_str_radix(&s[2..4], 16).map_err(|_| ThemeError::InvalidHex(s.to_string()))?;
        let b =
            u8::from_str_radix(&s[4..6], 16).map_err(|_| ThemeError::InvalidHex(s.to_string()))?;
        (r, g, b)
    } else if s.len() == 3 {
        let r = u8::from_str_radix(&s[0..1], 16)
            .map_err(|_| ThemeError::InvalidHex(s.to_string()))?
            * 17;
        let g = u8::from_str_radix(&s[1..2], 16)
            .map_err(|_| ThemeError::InvalidHex(s.to_string()))?
            * 17;
        let b = u8::from_str_radix(&s[2..3], 16)
            .map_err(|_| ThemeError::InvalidHex(s.to_string()))?
            * 17;
        (r, g, b)
    } else {
        return Err(ThemeError::InvalidHex(s.to_string()));
    };
    Ok(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#98C379").unwrap();
        assert!(matches!(c, Color::Rgb(0x98, 0xC3, 0x79)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(matches!(parse_hex("#12"), Err(ThemeError::InvalidHex(_))));
        assert!(matches!(parse_hex("#GGHHII"), Err(ThemeError::InvalidHex(_))));
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(r##"theme[meter_bg]="#31353F""##);
        assert_eq!(map.get("meter_bg"), Some(&"#31353F".to_string()));
    }

    #[test]
    fn test_theme_keys_override_defaults() {
        let map = parse_theme_file(
            r##"
# comment
theme[main_bg]="#000000"
theme[cpu_box]='#0000FF'
"##,
        );
        let t = Theme::from_map(&map);
        assert_eq!(t.bg, Color::Rgb(0, 0, 0));
        assert_eq!(t.piece(TetrominoKind::J), Color::Rgb(0, 0, 0xFF));
        assert_eq!(t.piece(TetrominoKind::I), ONEDARK_PIECES[0]);
    }

    #[test]
    fn test_ghost_is_between_piece_and_background() {
        let mut t = Theme::default();
        t.bg = Color::Rgb(0, 0, 0);
        t.pieces[1] = Color::Rgb(200, 100, 50);
        assert_eq!(t.ghost(TetrominoKind::O), Color::Rgb(100, 50, 25));
    }

    #[test]
    fn test_missing_theme_file_falls_back() {
        let t = Theme::load(Some(Path::new("/nonexistent/bagtris.theme")), crate::Palette::Normal)
            .unwrap();
        assert_eq!(t.pieces, ONEDARK_PIECES);
    }
}
