//! Speech capture and playback capabilities.
//!
//! The widget never talks to a platform speech engine directly. It drives a
//! [`SpeechRecognizer`] and a [`SpeechSynthesizer`] and receives recognition
//! results back through its own callbacks. Platforms without these engines
//! get the [`Unavailable`] implementation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech capability is not available on this platform")]
    Unavailable,
    #[error("speech engine failed to start: {0}")]
    Start(String),
}

/// One recognition segment. `alternatives` is ordered best-first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecognitionResult {
    pub alternatives: Vec<String>,
    pub is_final: bool,
}

impl RecognitionResult {
    pub fn new(best: impl Into<String>, is_final: bool) -> Self {
        Self { alternatives: vec![best.into()], is_final }
    }

    pub fn best(&self) -> Option<&str> {
        self.alternatives.first().map(String::as_str)
    }
}

/// Best alternative of every current result, space-joined and trimmed.
/// Interim and final segments are treated alike.
pub fn best_transcript(results: &[RecognitionResult]) -> String {
    results
        .iter()
        .filter_map(RecognitionResult::best)
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

pub trait SpeechRecognizer: Send {
    fn is_available(&self) -> bool {
        true
    }

    /// Begins a continuous session returning interim and final results.
    fn start(&mut self, lang: &str) -> Result<(), SpeechError>;

    fn stop(&mut self);
}

pub trait SpeechSynthesizer: Send {
    fn is_available(&self) -> bool {
        true
    }

    fn speak(&mut self, text: &str, lang: &str);

    fn cancel(&mut self);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Unavailable;

impl SpeechRecognizer for Unavailable {
    fn is_available(&self) -> bool {
        false
    }

    fn start(&mut self, _lang: &str) -> Result<(), SpeechError> {
        Err(SpeechError::Unavailable)
    }

    fn stop(&mut self) {}
}

impl SpeechSynthesizer for Unavailable {
    fn is_available(&self) -> bool {
        false
    }

    fn speak(&mut self, _text: &str, _lang: &str) {}

    fn cancel(&mut self) {}
}

pub struct Capabilities {
    pub recognizer: Box<dyn SpeechRecognizer>,
    pub synthesizer: Box<dyn SpeechSynthesizer>,
}

impl Capabilities {
    pub fn new(
        recognizer: Box<dyn SpeechRecognizer>,
        synthesizer: Box<dyn SpeechSynthesizer>
    ) -> Self {
        Self { recognizer, synthesizer }
    }

    pub fn unavailable() -> Self {
        Self::new(Box::new(Unavailable), Box::new(Unavailable))
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::unavailable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_joins_best_alternatives() {
        let results = vec![
            RecognitionResult {
                alternatives: vec!["hello".into(), "yellow".into()],
                is_final: true,
            },
            RecognitionResult::new(" there ", false),
            RecognitionResult::default()
        ];
        assert_eq!(best_transcript(&results), "hello  there");
    }

    #[test]
    fn empty_results_give_empty_transcript() {
        assert_eq!(best_transcript(&[]), "");
    }

    #[test]
    fn unavailable_engines_refuse_to_start() {
        let mut caps = Capabilities::unavailable();
        assert!(!caps.recognizer.is_available());
        assert!(!caps.synthesizer.is_available());
        assert!(matches!(caps.recognizer.start("en"), Err(SpeechError::Unavailable)));
        caps.synthesizer.speak("ignored", "en");
    }
}
