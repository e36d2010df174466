use serde::Serialize;

use super::config::{ Position, Theme };
use super::message::Message;
use super::state::{ Listening, Mode, Visibility, Widget };

pub const ROOT_CLASS: &str = "embed-assistant";

/// Everything a renderer needs for one frame, detached from the widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetView {
    pub visibility: Visibility,
    pub position: Position,
    pub theme: Theme,
    pub agent_name: String,
    pub avatar_url: Option<String>,
    pub mode: Mode,
    pub show_mode_toggle: bool,
    pub listening: Listening,
    pub microphone_available: bool,
    pub languages: Vec<String>,
    pub language: String,
    pub input: String,
    pub loading: bool,
    pub send_enabled: bool,
    pub messages: Vec<Message>,
}

impl From<&Widget> for WidgetView {
    fn from(widget: &Widget) -> Self {
        let config = widget.config();
        Self {
            visibility: widget.visibility(),
            position: config.position,
            theme: config.theme.clone(),
            agent_name: config.agent_name.clone(),
            avatar_url: config.avatar_url.clone(),
            mode: widget.mode(),
            show_mode_toggle: widget.voice_available(),
            listening: widget.listening(),
            microphone_available: widget.microphone_available(),
            languages: config.languages.clone(),
            language: widget.language().to_string(),
            input: widget.input().to_string(),
            loading: widget.is_loading(),
            send_enabled: widget.can_send(),
            messages: widget.messages().to_vec(),
        }
    }
}

impl Theme {
    /// Custom properties for the widget's isolated root.
    pub fn css_variables(&self) -> String {
        format!(
            ":host {{\n  --ea-primary: {};\n  --ea-background: {};\n  --ea-text: {};\n  --ea-font: {};\n}}",
            self.primary_color,
            self.background_color,
            self.text_color,
            self.font_family
        )
    }
}

impl Position {
    /// Fixed-position anchor offsets for the launcher corner.
    pub fn css_anchor(&self) -> &'static str {
        match self {
            Position::BottomRight => "bottom: 20px; right: 20px;",
            Position::BottomLeft => "bottom: 20px; left: 20px;",
            Position::TopRight => "top: 20px; right: 20px;",
            Position::TopLeft => "top: 20px; left: 20px;",
        }
    }
}

impl WidgetView {
    pub fn stylesheet(&self) -> String {
        format!(
            "{}\n.{} {{ position: fixed; {} font-family: var(--ea-font); color: var(--ea-text); }}",
            self.theme.css_variables(),
            ROOT_CLASS,
            self.position.css_anchor()
        )
    }
}
