//! Host-supplied widget configuration.
//!
//! The host page hands over a JSON object where every field is optional.
//! [`HostConfig`] mirrors that object; [`WidgetConfig`] is the resolved form
//! with every default filled in.

use serde::{ Deserialize, Serialize };
use std::fmt;
use thiserror::Error;

pub const DEFAULT_AGENT_NAME: &str = "HelperBot";
pub const DEFAULT_PRIMARY_COLOR: &str = "#4f46e5";
pub const DEFAULT_BACKGROUND_COLOR: &str = "#ffffff";
pub const DEFAULT_TEXT_COLOR: &str = "#111827";
pub const DEFAULT_FONT_FAMILY: &str = "system-ui, -apple-system, \"Segoe UI\", Roboto, sans-serif";
pub const DEFAULT_LANGUAGES: [&str; 3] = ["en", "hi", "es"];
pub const FALLBACK_LANGUAGE: &str = "en";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed widget configuration: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    #[default]
    BottomRight,
    BottomLeft,
    TopRight,
    TopLeft,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::BottomRight => "bottom-right",
            Position::BottomLeft => "bottom-left",
            Position::TopRight => "top-right",
            Position::TopLeft => "top-left",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostTheme {
    pub primary_color: Option<String>,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub font_family: Option<String>,
}

/// Raw configuration exactly as the host page supplies it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostConfig {
    pub position: Option<Position>,
    pub theme: Option<HostTheme>,
    pub agent_name: Option<String>,
    pub avatar_url: Option<String>,
    pub enable_voice: Option<bool>,
    pub languages: Option<Vec<String>>,
    pub context: Option<String>,
}

impl HostConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub primary_color: String,
    pub background_color: String,
    pub text_color: String,
    pub font_family: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            text_color: DEFAULT_TEXT_COLOR.to_string(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    pub position: Position,
    pub theme: Theme,
    pub agent_name: String,
    pub avatar_url: Option<String>,
    pub enable_voice: bool,
    pub languages: Vec<String>,
    pub context: Option<String>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            position: Position::default(),
            theme: Theme::default(),
            agent_name: DEFAULT_AGENT_NAME.to_string(),
            avatar_url: None,
            enable_voice: true,
            languages: DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect(),
            context: None,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl WidgetConfig {
    pub fn resolve(host: HostConfig) -> Self {
        let defaults = Self::default();
        let theme = host.theme.unwrap_or_default();

        let languages: Vec<String> = host.languages
            .map(|langs| {
                langs
                    .into_iter()
                    .filter_map(|l| non_blank(Some(l)))
                    .collect::<Vec<_>>()
            })
            .filter(|langs| !langs.is_empty())
            .unwrap_or(defaults.languages);

        Self {
            position: host.position.unwrap_or(defaults.position),
            theme: Theme {
                primary_color: non_blank(theme.primary_color).unwrap_or(defaults.theme.primary_color),
                background_color: non_blank(theme.background_color).unwrap_or(
                    defaults.theme.background_color
                ),
                text_color: non_blank(theme.text_color).unwrap_or(defaults.theme.text_color),
                font_family: non_blank(theme.font_family).unwrap_or(defaults.theme.font_family),
            },
            agent_name: non_blank(host.agent_name).unwrap_or(defaults.agent_name),
            avatar_url: non_blank(host.avatar_url),
            enable_voice: host.enable_voice.unwrap_or(defaults.enable_voice),
            languages,
            context: non_blank(host.context),
        }
    }

    pub fn default_language(&self) -> &str {
        self.languages.first().map(String::as_str).unwrap_or(FALLBACK_LANGUAGE)
    }

    pub fn supports_language(&self, lang: &str) -> bool {
        self.languages.iter().any(|l| l == lang)
    }
}

impl From<HostConfig> for WidgetConfig {
    fn from(host: HostConfig) -> Self {
        WidgetConfig::resolve(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_host_config_yields_documented_defaults() {
        let config = WidgetConfig::resolve(HostConfig::default());
        assert_eq!(config.position, Position::BottomRight);
        assert_eq!(config.theme.primary_color, DEFAULT_PRIMARY_COLOR);
        assert_eq!(config.theme.background_color, DEFAULT_BACKGROUND_COLOR);
        assert_eq!(config.theme.text_color, DEFAULT_TEXT_COLOR);
        assert_eq!(config.theme.font_family, DEFAULT_FONT_FAMILY);
        assert_eq!(config.agent_name, "HelperBot");
        assert!(config.enable_voice);
        assert_eq!(config.languages, vec!["en", "hi", "es"]);
        assert_eq!(config.context, None);
        assert_eq!(config.avatar_url, None);
    }

    #[test]
    fn parses_camel_case_host_json() {
        let host = HostConfig::from_json(
            r##"{
                "position": "top-left",
                "theme": { "primaryColor": "#ff0000" },
                "agentName": "Ava",
                "avatarUrl": "https://cdn.example/ava.png",
                "enableVoice": false,
                "languages": ["fr", "de"],
                "context": "We sell bikes"
            }"##
        ).unwrap();
        let config = WidgetConfig::from(host);

        assert_eq!(config.position, Position::TopLeft);
        assert_eq!(config.theme.primary_color, "#ff0000");
        assert_eq!(config.theme.text_color, DEFAULT_TEXT_COLOR);
        assert_eq!(config.agent_name, "Ava");
        assert_eq!(config.avatar_url.as_deref(), Some("https://cdn.example/ava.png"));
        assert!(!config.enable_voice);
        assert_eq!(config.default_language(), "fr");
        assert_eq!(config.context.as_deref(), Some("We sell bikes"));
    }

    #[test]
    fn blank_values_fall_back() {
        let host = HostConfig {
            agent_name: Some("  ".into()),
            languages: Some(vec![" ".into()]),
            context: Some("".into()),
            ..Default::default()
        };
        let config = WidgetConfig::resolve(host);
        assert_eq!(config.agent_name, DEFAULT_AGENT_NAME);
        assert_eq!(config.languages, vec!["en", "hi", "es"]);
        assert_eq!(config.context, None);
    }

    #[test]
    fn unknown_position_is_malformed() {
        assert!(HostConfig::from_json(r#"{"position":"center"}"#).is_err());
        assert_eq!(HostConfig::from_json("").unwrap(), HostConfig::default());
    }
}
