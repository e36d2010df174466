//! Embeddable chat/voice widget core.
//!
//! [`WidgetHandle::mount`] takes the host configuration, the relay base URL
//! and the platform speech capabilities, and returns the handle the host
//! page drives (`open`, `close`, `toggle`, ...). Rendering is left to the
//! embedding layer through [`WidgetView`].

pub mod config;
pub mod handle;
pub mod message;
pub mod speech;
pub mod state;
pub mod transport;
pub mod view;

pub use config::{ HostConfig, Position, Theme, WidgetConfig };
pub use handle::{ MountOptions, WidgetHandle };
pub use message::{ Message, Role, FALLBACK_REPLY };
pub use speech::{ Capabilities, RecognitionResult, SpeechRecognizer, SpeechSynthesizer };
pub use state::{ Listening, Mode, Visibility, Widget };
pub use transport::{ HttpTransport, RelayTransport, WidgetError };
pub use view::WidgetView;
