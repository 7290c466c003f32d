use tokio::sync::mpsc::UnboundedSender;

use crate::app_event::AppEvent;

/// Cloneable handle for emitting [`AppEvent`]s from background tasks.
///
/// Sends can only fail when the receiver has been dropped (i.e. the app is
/// shutting down), so failures are logged rather than propagated.
#[derive(Clone, Debug)]
pub(crate) struct AppEventSender {
    tx: UnboundedSender<AppEvent>,
}

impl AppEventSender {
    pub(crate) fn new(tx: UnboundedSender<AppEvent>) -> Self {
        Self { tx }
    }

    pub(crate) fn send(&self, event: AppEvent) {
        if let Err(err) = self.tx.send(event) {
            tracing::debug!("app event dropped during shutdown: {err}");
        }
    }
}
