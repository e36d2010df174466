//! The widget's state machine.
//!
//! ```text
//! closed <-> open
//!            open: chat <-> voice        (voice only when enabled)
//!                         voice: idle <-> listening
//! ```
//!
//! Everything here is synchronous. A turn is split in two so the network
//! call can happen without holding the widget: [`Widget::begin_turn`]
//! appends the user message and yields the wire request, and
//! [`Widget::complete_turn`] appends the reply or the fallback.

use log::{ debug, warn };
use serde::Serialize;

use crate::models::chat::ConversationRequest;
use super::config::{ HostConfig, WidgetConfig };
use super::message::{ Message, FALLBACK_REPLY };
use super::speech::{ best_transcript, Capabilities, RecognitionResult };
use super::transport::WidgetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Chat,
    Voice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Listening {
    Idle,
    Listening,
}

pub struct Widget {
    config: WidgetConfig,
    capabilities: Capabilities,
    visibility: Visibility,
    mode: Mode,
    listening: Listening,
    language: String,
    input: String,
    loading: bool,
    /// Language the in-flight turn was sent in.
    turn_language: Option<String>,
    messages: Vec<Message>,
    config_refreshed: bool,
}

impl Widget {
    pub fn new(config: WidgetConfig, capabilities: Capabilities) -> Self {
        let mode = if config.enable_voice { Mode::Voice } else { Mode::Chat };
        let language = config.default_language().to_string();

        Self {
            config,
            capabilities,
            visibility: Visibility::Closed,
            mode,
            listening: Listening::Idle,
            language,
            input: String::new(),
            loading: false,
            turn_language: None,
            messages: Vec::new(),
            config_refreshed: false,
        }
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_open(&self) -> bool {
        self.visibility == Visibility::Open
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn listening(&self) -> Listening {
        self.listening
    }

    pub fn is_listening(&self) -> bool {
        self.listening == Listening::Listening
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn voice_available(&self) -> bool {
        self.config.enable_voice
    }

    pub fn microphone_available(&self) -> bool {
        self.config.enable_voice && self.capabilities.recognizer.is_available()
    }

    /// Applies a re-read of the host configuration. Only the first call after
    /// mount has any effect.
    pub fn refresh_config(&mut self, host: HostConfig) -> bool {
        if self.config_refreshed {
            debug!("Ignoring repeated configuration refresh");
            return false;
        }
        self.config_refreshed = true;
        self.config = WidgetConfig::resolve(host);

        if !self.config.supports_language(&self.language) {
            self.language = self.config.default_language().to_string();
        }
        if !self.config.enable_voice && self.mode == Mode::Voice {
            self.stop_listening();
            self.mode = Mode::Chat;
        }
        true
    }

    // --- visibility ---

    pub fn open(&mut self) {
        self.visibility = Visibility::Open;
    }

    pub fn close(&mut self) {
        if !self.is_open() {
            return;
        }
        self.stop_listening();
        self.capabilities.synthesizer.cancel();
        self.visibility = Visibility::Closed;
    }

    pub fn toggle(&mut self) {
        if self.is_open() { self.close() } else { self.open() }
    }

    // --- mode ---

    /// Returns false when voice mode is requested but disabled.
    pub fn set_mode(&mut self, mode: Mode) -> bool {
        if mode == Mode::Voice && !self.voice_available() {
            return false;
        }
        if mode == Mode::Chat {
            self.stop_listening();
        }
        self.mode = mode;
        true
    }

    pub fn toggle_mode(&mut self) -> bool {
        match self.mode {
            Mode::Chat => self.set_mode(Mode::Voice),
            Mode::Voice => self.set_mode(Mode::Chat),
        }
    }

    /// Takes effect for the next turn and the next recognition session; a
    /// session already listening keeps its language.
    pub fn select_language(&mut self, lang: &str) -> bool {
        if !self.config.supports_language(lang) {
            warn!("Ignoring unsupported language '{}'", lang);
            return false;
        }
        self.language = lang.to_string();
        true
    }

    // --- input ---

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn can_send(&self) -> bool {
        if self.loading {
            return false;
        }
        match self.mode {
            Mode::Chat => true,
            Mode::Voice => !self.input.trim().is_empty(),
        }
    }

    /// Enter without shift submits, and only in chat mode.
    pub fn is_submit_shortcut(&self, key: &str, shift: bool) -> bool {
        self.mode == Mode::Chat && key == "Enter" && !shift
    }

    // --- turns ---

    /// Appends the user message and returns the request to relay, or `None`
    /// when the input is blank or a turn is already in flight.
    pub fn begin_turn(&mut self) -> Option<ConversationRequest> {
        let text = self.input.trim();
        if text.is_empty() {
            return None;
        }
        if self.loading {
            debug!("Turn already in flight, keeping input");
            return None;
        }

        let message = Message::user(text, self.language.clone());
        self.messages.push(message);
        self.input.clear();
        self.loading = true;
        self.turn_language = Some(self.language.clone());

        Some(self.conversation_request())
    }

    /// The reply is tagged and spoken in the language the turn was sent in,
    /// even if the selector changed while it was in flight.
    pub fn complete_turn(&mut self, outcome: Result<String, WidgetError>) {
        self.loading = false;
        let lang = self.turn_language.take().unwrap_or_else(|| self.language.clone());

        match outcome {
            Ok(reply) => {
                if self.mode == Mode::Voice && self.config.enable_voice {
                    self.capabilities.synthesizer.speak(&reply, &lang);
                }
                self.messages.push(Message::assistant(reply, lang));
            }
            Err(e) => {
                warn!("Relay turn failed: {}", e);
                self.messages.push(Message::assistant(FALLBACK_REPLY, lang));
            }
        }
    }

    /// The full displayed history plus current language and host context.
    pub fn conversation_request(&self) -> ConversationRequest {
        ConversationRequest {
            messages: self.messages.iter().map(Message::to_wire).collect(),
            context: self.config.context.clone(),
            lang: Some(self.language.clone()),
        }
    }

    // --- speech capture ---

    pub fn start_listening(&mut self) -> bool {
        if self.is_listening() {
            return true;
        }
        if !self.is_open() || self.mode != Mode::Voice || !self.microphone_available() {
            return false;
        }

        match self.capabilities.recognizer.start(&self.language) {
            Ok(()) => {
                self.listening = Listening::Listening;
                true
            }
            Err(e) => {
                warn!("Speech recognition did not start: {}", e);
                self.listening = Listening::Idle;
                false
            }
        }
    }

    pub fn stop_listening(&mut self) {
        if self.is_listening() {
            self.capabilities.recognizer.stop();
        }
        self.listening = Listening::Idle;
    }

    pub fn toggle_listening(&mut self) -> bool {
        if self.is_listening() {
            self.stop_listening();
            false
        } else {
            self.start_listening()
        }
    }

    pub fn on_recognition_result(&mut self, results: &[RecognitionResult]) {
        self.input = best_transcript(results);
    }

    /// The engine ended the session on its own.
    pub fn on_recognition_end(&mut self) {
        self.listening = Listening::Idle;
    }

    pub fn shutdown(&mut self) {
        self.stop_listening();
        self.capabilities.synthesizer.cancel();
        self.visibility = Visibility::Closed;
    }
}
