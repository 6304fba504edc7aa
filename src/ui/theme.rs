use std::fs;

use ratatui::style::Color;
use rust_embed::Embed;
use serde::{Deserialize, Deserializer};

pub const DEFAULT_THEME: &str = "paper";

#[derive(Embed)]
#[folder = "assets/themes/"]
struct BundledThemes;

#[derive(Clone, Debug, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

/// Palette roles used by the widgets. Theme files spell each one as `#rrggbb`.
#[derive(Clone, Debug, Deserialize)]
pub struct ThemeColors {
    #[serde(deserialize_with = "hex")]
    bg: Color,
    #[serde(deserialize_with = "hex")]
    fg: Color,
    #[serde(deserialize_with = "hex")]
    text_correct: Color,
    #[serde(deserialize_with = "hex")]
    text_incorrect: Color,
    #[serde(deserialize_with = "hex")]
    text_incorrect_bg: Color,
    #[serde(deserialize_with = "hex")]
    text_pending: Color,
    #[serde(deserialize_with = "hex")]
    text_cursor_bg: Color,
    #[serde(deserialize_with = "hex")]
    text_cursor_fg: Color,
    #[serde(deserialize_with = "hex")]
    accent: Color,
    #[serde(deserialize_with = "hex")]
    border: Color,
    #[serde(deserialize_with = "hex")]
    border_focused: Color,
    #[serde(deserialize_with = "hex")]
    header_bg: Color,
    #[serde(deserialize_with = "hex")]
    header_fg: Color,
    #[serde(deserialize_with = "hex")]
    error: Color,
    #[serde(deserialize_with = "hex")]
    warning: Color,
    #[serde(deserialize_with = "hex")]
    success: Color,
}

pub fn parse_hex(s: &str) -> Option<Color> {
    let digits = s.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

fn hex<'de, D: Deserializer<'de>>(de: D) -> Result<Color, D::Error> {
    let raw = String::deserialize(de)?;
    parse_hex(&raw).ok_or_else(|| serde::de::Error::custom(format!("not a #rrggbb colour: {raw}")))
}

impl Theme {
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// A theme from `<config_dir>/shine/themes/`, else the bundled one.
    pub fn load(name: &str) -> Option<Self> {
        if let Some(path) = dirs::config_dir().map(|d| d.join("shine").join("themes").join(format!("{name}.toml"))) {
            if let Ok(content) = fs::read_to_string(&path) {
                match Self::from_toml(&content) {
                    Ok(theme) => return Some(theme),
                    Err(e) => tracing::warn!(path = %path.display(), error = %e, "ignoring user theme"),
                }
            }
        }
        Self::bundled(name)
    }

    pub fn bundled(name: &str) -> Option<Self> {
        let file = BundledThemes::get(&format!("{name}.toml"))?;
        let content = std::str::from_utf8(file.data.as_ref()).ok()?;
        match Self::from_toml(content) {
            Ok(theme) => Some(theme),
            Err(e) => {
                tracing::error!(theme = name, error = %e, "bundled theme is invalid");
                None
            }
        }
    }

    pub fn available_themes() -> Vec<String> {
        BundledThemes::iter()
            .filter_map(|f| f.strip_suffix(".toml").map(str::to_string))
            .collect()
    }

    /// Terminal colours only, for when no theme file can be read.
    pub fn plain() -> Self {
        Self {
            name: "plain".to_string(),
            colors: ThemeColors {
                bg: Color::Reset,
                fg: Color::Reset,
                text_correct: Color::Green,
                text_incorrect: Color::Red,
                text_incorrect_bg: Color::Reset,
                text_pending: Color::DarkGray,
                text_cursor_bg: Color::White,
                text_cursor_fg: Color::Black,
                accent: Color::Blue,
                border: Color::DarkGray,
                border_focused: Color::Blue,
                header_bg: Color::Reset,
                header_fg: Color::Reset,
                error: Color::Red,
                warning: Color::Yellow,
                success: Color::Green,
            },
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::bundled(DEFAULT_THEME).unwrap_or_else(Self::plain)
    }
}

impl ThemeColors {
    pub fn bg(&self) -> Color { self.bg }
    pub fn fg(&self) -> Color { self.fg }
    pub fn text_correct(&self) -> Color { self.text_correct }
    pub fn text_incorrect(&self) -> Color { self.text_incorrect }
    pub fn text_incorrect_bg(&self) -> Color { self.text_incorrect_bg }
    pub fn text_pending(&self) -> Color { self.text_pending }
    pub fn text_cursor_bg(&self) -> Color { self.text_cursor_bg }
    pub fn text_cursor_fg(&self) -> Color { self.text_cursor_fg }
    pub fn accent(&self) -> Color { self.accent }
    pub fn border(&self) -> Color { self.border }
    pub fn border_focused(&self) -> Color { self.border_focused }
    pub fn header_bg(&self) -> Color { self.header_bg }
    pub fn header_fg(&self) -> Color { self.header_fg }
    pub fn error(&self) -> Color { self.error }
    pub fn warning(&self) -> Color { self.warning }
    pub fn success(&self) -> Color { self.success }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_themes_parse() {
        let names = Theme::available_themes();
        assert!(names.contains(&"paper".to_string()));
        assert!(names.contains(&"ink".to_string()));
        for name in names {
            assert!(Theme::bundled(&name).is_some(), "theme {name} should parse");
        }
    }

    #[test]
    fn test_default_is_paper() {
        let theme = Theme::default();
        assert_eq!(theme.name, "paper");
        assert_eq!(theme.colors.bg(), Color::Rgb(0xfb, 0xf8, 0xf1));
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#ff0080"), Some(Color::Rgb(255, 0, 128)));
        assert_eq!(parse_hex("ff0080"), None);
        assert_eq!(parse_hex("#ff00"), None);
        assert_eq!(parse_hex("#gg0000"), None);
    }

    #[test]
    fn test_bad_colour_rejects_theme() {
        let paper = BundledThemes::get("paper.toml").unwrap();
        let content = std::str::from_utf8(paper.data.as_ref()).unwrap();
        let broken = content.replace("#c0392b", "crimson");
        assert!(Theme::from_toml(&broken).is_err());
    }
}
