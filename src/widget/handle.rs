use log::{ debug, info };
use std::sync::Arc;
use tokio::sync::Mutex;

use super::config::{ HostConfig, WidgetConfig };
use super::message::Message;
use super::speech::{ Capabilities, RecognitionResult };
use super::state::{ Mode, Widget };
use super::transport::{ HttpTransport, RelayTransport, WidgetError };
use super::view::WidgetView;

/// What the host passes at mount time.
#[derive(Default)]
pub struct MountOptions {
    pub config: HostConfig,
    /// Prefix for the relay path; `None` uses the default relay.
    pub base_url: Option<String>,
    pub capabilities: Capabilities,
}

/// Host-facing control surface. Cheap to clone; every clone drives the same
/// widget. Once unmounted, every operation is a no-op.
#[derive(Clone)]
pub struct WidgetHandle {
    widget: Arc<Mutex<Option<Widget>>>,
    transport: Arc<dyn RelayTransport>,
}

impl WidgetHandle {
    pub fn mount(options: MountOptions) -> Result<Self, WidgetError> {
        let transport = HttpTransport::new(options.base_url.as_deref())?;
        info!("Widget mounted, relay endpoint {}", transport.endpoint());
        Ok(Self::mount_with_transport(options.config, options.capabilities, Arc::new(transport)))
    }

    pub fn mount_with_transport(
        config: HostConfig,
        capabilities: Capabilities,
        transport: Arc<dyn RelayTransport>
    ) -> Self {
        let widget = Widget::new(WidgetConfig::resolve(config), capabilities);
        Self {
            widget: Arc::new(Mutex::new(Some(widget))),
            transport,
        }
    }

    async fn with<R>(&self, default: R, f: impl FnOnce(&mut Widget) -> R) -> R {
        let mut guard = self.widget.lock().await;
        match guard.as_mut() {
            Some(widget) => f(widget),
            None => default,
        }
    }

    pub async fn is_mounted(&self) -> bool {
        let guard = self.widget.lock().await;
        guard.is_some()
    }

    pub async fn open(&self) {
        self.with((), Widget::open).await
    }

    pub async fn close(&self) {
        self.with((), Widget::close).await
    }

    pub async fn toggle(&self) {
        self.with((), Widget::toggle).await
    }

    pub async fn set_mode(&self, mode: Mode) -> bool {
        self.with(false, |w| w.set_mode(mode)).await
    }

    pub async fn select_language(&self, lang: &str) -> bool {
        self.with(false, |w| w.select_language(lang)).await
    }

    pub async fn set_input(&self, text: &str) {
        self.with((), |w| w.set_input(text)).await
    }

    pub async fn refresh_config(&self, host: HostConfig) -> bool {
        self.with(false, |w| w.refresh_config(host)).await
    }

    /// Runs one turn with the current input. Returns false when nothing was
    /// sent (blank input, a turn in flight, or unmounted).
    pub async fn submit(&self) -> bool {
        let request = match self.with(None, Widget::begin_turn).await {
            Some(request) => request,
            None => return false,
        };

        // The widget stays usable while the relay call is outstanding.
        let outcome = self.transport.send(&request).await;

        let delivered = self.with(false, |w| {
            w.complete_turn(outcome);
            true
        }).await;
        if !delivered {
            debug!("Widget unmounted before the reply arrived");
        }
        true
    }

    pub async fn send_text(&self, text: &str) -> bool {
        self.set_input(text).await;
        self.submit().await
    }

    /// Keyboard handler for the input field.
    pub async fn key_down(&self, key: &str, shift: bool) -> bool {
        if !self.with(false, |w| w.is_submit_shortcut(key, shift)).await {
            return false;
        }
        self.submit().await
    }

    pub async fn start_listening(&self) -> bool {
        self.with(false, Widget::start_listening).await
    }

    pub async fn stop_listening(&self) {
        self.with((), Widget::stop_listening).await
    }

    pub async fn toggle_listening(&self) -> bool {
        self.with(false, Widget::toggle_listening).await
    }

    pub async fn on_recognition_result(&self, results: &[RecognitionResult]) {
        self.with((), |w| w.on_recognition_result(results)).await
    }

    pub async fn on_recognition_end(&self) {
        self.with((), Widget::on_recognition_end).await
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.with(Vec::new(), |w| w.messages().to_vec()).await
    }

    pub async fn view(&self) -> Option<WidgetView> {
        self.with(None, |w| Some(WidgetView::from(&*w))).await
    }

    pub async fn unmount(&self) {
        if let Some(mut widget) = self.widget.lock().await.take() {
            widget.shutdown();
            info!("Widget unmounted");
        }
    }
}
