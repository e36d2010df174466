//! End-to-end widget behaviour through the host-facing handle, with the
//! relay replaced by a scripted transport.

use std::collections::VecDeque;
use std::sync::{ Arc, Mutex };

use async_trait::async_trait;

use embed_assistant::models::chat::{ ChatRole, ConversationRequest };
use embed_assistant::widget::{
    Capabilities,
    HostConfig,
    Mode,
    MountOptions,
    Position,
    RecognitionResult,
    RelayTransport,
    Role,
    SpeechRecognizer,
    SpeechSynthesizer,
    Visibility,
    WidgetError,
    WidgetHandle,
    FALLBACK_REPLY,
};
use embed_assistant::widget::speech::SpeechError;

// =============================================================================
// Helpers
// =============================================================================

#[derive(Default)]
struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<ConversationRequest>>,
}

impl ScriptedTransport {
    fn new(replies: Vec<Result<&str, &str>>) -> Arc<Self> {
        let replies = replies
            .into_iter()
            .map(|r| r.map(str::to_string).map_err(str::to_string))
            .collect();
        Arc::new(Self { replies: Mutex::new(replies), requests: Mutex::new(Vec::new()) })
    }

    fn requests(&self) -> Vec<ConversationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RelayTransport for ScriptedTransport {
    async fn send(&self, request: &ConversationRequest) -> Result<String, WidgetError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(e)) => Err(WidgetError::Relay(e)),
            None => Err(WidgetError::Status { status: 500, message: "script exhausted".into() }),
        }
    }
}

#[derive(Clone, Default)]
struct SpeechLog(Arc<Mutex<Vec<String>>>);

impl SpeechLog {
    fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl SpeechRecognizer for SpeechLog {
    fn start(&mut self, lang: &str) -> Result<(), SpeechError> {
        self.0.lock().unwrap().push(format!("start:{}", lang));
        Ok(())
    }

    fn stop(&mut self) {
        self.0.lock().unwrap().push("stop".into());
    }
}

impl SpeechSynthesizer for SpeechLog {
    fn speak(&mut self, text: &str, lang: &str) {
        self.0.lock().unwrap().push(format!("speak:{}:{}", lang, text));
    }

    fn cancel(&mut self) {
        self.0.lock().unwrap().push("cancel".into());
    }
}

fn mount(config: HostConfig, transport: Arc<ScriptedTransport>) -> WidgetHandle {
    WidgetHandle::mount_with_transport(config, Capabilities::unavailable(), transport)
}

fn mount_with_speech(transport: Arc<ScriptedTransport>) -> (WidgetHandle, SpeechLog) {
    let log = SpeechLog::default();
    let caps = Capabilities::new(Box::new(log.clone()), Box::new(log.clone()));
    (WidgetHandle::mount_with_transport(HostConfig::default(), caps, transport), log)
}

// =============================================================================
// Turns
// =============================================================================

#[tokio::test]
async fn test_messages_keep_append_order() {
    let transport = ScriptedTransport::new(vec![Ok("first reply"), Err("down"), Ok("third reply")]);
    let widget = mount(HostConfig::default(), transport.clone());
    widget.open().await;

    assert!(widget.send_text("one").await);
    assert!(widget.send_text("two").await);
    assert!(widget.send_text("three").await);

    let texts: Vec<String> = widget.messages().await.into_iter().map(|m| m.text).collect();
    assert_eq!(
        texts,
        vec!["one", "first reply", "two", FALLBACK_REPLY, "three", "third reply"]
    );

    let requests = transport.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].messages.len(), 1);
    assert_eq!(requests[1].messages.len(), 3);
    assert_eq!(requests[2].messages.len(), 5);
    assert_eq!(requests[2].messages[3].role, ChatRole::Assistant);
    assert_eq!(requests[2].messages[3].content, FALLBACK_REPLY);
}

#[tokio::test]
async fn test_blank_submissions_do_nothing() {
    let transport = ScriptedTransport::new(vec![]);
    let widget = mount(HostConfig::default(), transport.clone());

    assert!(!widget.send_text("").await);
    assert!(!widget.send_text("   ").await);

    assert!(widget.messages().await.is_empty());
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_failed_fetch_appends_single_fallback() {
    let transport = ScriptedTransport::new(vec![Err("connection refused")]);
    let widget = mount(HostConfig::default(), transport);

    widget.send_text("Hi").await;

    let messages = widget.messages().await;
    let assistant: Vec<_> = messages.iter().filter(|m| m.role == Role::Assistant).collect();
    assert_eq!(assistant.len(), 1);
    assert_eq!(assistant[0].text, "Sorry, something went wrong.");
    assert!(!widget.view().await.unwrap().loading);
}

#[tokio::test]
async fn test_request_carries_context_and_language() {
    let transport = ScriptedTransport::new(vec![Ok("नमस्ते")]);
    let config = HostConfig { context: Some("You are a front-end expert".into()), ..Default::default() };
    let widget = mount(config, transport.clone());

    assert!(widget.select_language("hi").await);
    widget.send_text("hello").await;

    let request = &transport.requests()[0];
    assert_eq!(request.context.as_deref(), Some("You are a front-end expert"));
    assert_eq!(request.lang.as_deref(), Some("hi"));
    let messages = widget.messages().await;
    assert!(messages.iter().all(|m| m.lang == "hi"));
}

#[tokio::test]
async fn test_enter_submits_only_in_chat_mode() {
    let transport = ScriptedTransport::new(vec![Ok("reply")]);
    let widget = mount(HostConfig::default(), transport.clone());

    widget.set_input("question").await;
    assert!(!widget.key_down("Enter", false).await, "voice mode has no Enter shortcut");

    widget.set_mode(Mode::Chat).await;
    assert!(!widget.key_down("Enter", true).await);
    assert!(widget.key_down("Enter", false).await);
    assert_eq!(transport.requests().len(), 1);
}

// =============================================================================
// Configuration and visibility
// =============================================================================

#[tokio::test]
async fn test_defaults_without_host_config() {
    let widget = mount(HostConfig::default(), ScriptedTransport::new(vec![]));
    let view = widget.view().await.unwrap();

    assert_eq!(view.visibility, Visibility::Closed);
    assert_eq!(view.position, Position::BottomRight);
    assert_eq!(view.agent_name, "HelperBot");
    assert!(view.show_mode_toggle);
    assert_eq!(view.languages, vec!["en", "hi", "es"]);
    assert_eq!(view.theme.primary_color, "#4f46e5");
    assert_eq!(view.theme.background_color, "#ffffff");
    assert_eq!(view.theme.text_color, "#111827");
}

#[tokio::test]
async fn test_voice_disabled_from_host_json() {
    let config = HostConfig::from_json(r#"{ "enableVoice": false }"#).unwrap();
    let widget = mount(config, ScriptedTransport::new(vec![]));

    let view = widget.view().await.unwrap();
    assert!(!view.show_mode_toggle);
    assert_eq!(view.mode, Mode::Chat);
    assert!(!widget.set_mode(Mode::Voice).await);
}

#[tokio::test]
async fn test_open_close_toggle_any_order() {
    let widget = mount(HostConfig::default(), ScriptedTransport::new(vec![]));

    widget.close().await;
    widget.open().await;
    widget.open().await;
    assert_eq!(widget.view().await.unwrap().visibility, Visibility::Open);
    widget.toggle().await;
    assert_eq!(widget.view().await.unwrap().visibility, Visibility::Closed);
    widget.close().await;
    assert_eq!(widget.view().await.unwrap().visibility, Visibility::Closed);
}

#[tokio::test]
async fn test_unmount_turns_handle_inert() {
    let transport = ScriptedTransport::new(vec![Ok("never")]);
    let widget = mount(HostConfig::default(), transport.clone());
    let other = widget.clone();

    widget.unmount().await;
    assert!(!other.is_mounted().await);
    other.open().await;
    assert!(!other.send_text("hello").await);
    assert!(other.view().await.is_none());
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_mount_rejects_bad_base_url() {
    let options = MountOptions { base_url: Some("::not-a-url::".into()), ..Default::default() };
    assert!(WidgetHandle::mount(options).is_err());
}

// =============================================================================
// Speech
// =============================================================================

#[tokio::test]
async fn test_voice_turn_uses_transcript_and_speaks_reply() {
    let transport = ScriptedTransport::new(vec![Ok("We open at nine")]);
    let (widget, log) = mount_with_speech(transport.clone());
    widget.open().await;

    assert!(widget.start_listening().await);
    widget.on_recognition_result(&[
        RecognitionResult::new("when do", true),
        RecognitionResult::new("you open", false),
    ]).await;
    widget.on_recognition_end().await;

    let view = widget.view().await.unwrap();
    assert_eq!(view.input, "when do you open");
    assert!(view.send_enabled);

    assert!(widget.submit().await);
    assert_eq!(transport.requests()[0].messages[0].content, "when do you open");
    assert_eq!(
        log.entries(),
        vec!["start:en".to_string(), "speak:en:We open at nine".to_string()]
    );
}

#[tokio::test]
async fn test_microphone_inert_without_recognizer() {
    let widget = mount(HostConfig::default(), ScriptedTransport::new(vec![]));
    widget.open().await;

    assert!(!widget.start_listening().await);
    let view = widget.view().await.unwrap();
    assert!(!view.microphone_available);
    assert_eq!(view.mode, Mode::Voice);
}
