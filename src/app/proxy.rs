//! Abstraction over how backend events reach the UI thread.

use super::events::UserEvent;
use tao::event_loop::EventLoopProxy;

/// Sends [`UserEvent`]s towards the WebView, fire-and-forget.
///
/// Commands, the review controller's tasks, and tests all talk to the UI
/// through this trait, so none of them ever needs a real event loop.
pub trait EventProxy: Send + Sync + Clone + 'static {
    fn send_event(&self, event: UserEvent);
}

impl EventProxy for EventLoopProxy<UserEvent> {
    fn send_event(&self, event: UserEvent) {
        // Delivery only fails once the event loop is gone, at which point
        // there is no UI left to update; log and move on.
        if let Err(e) = self.send_event(event) {
            tracing::warn!("Event loop is gone, dropping event: {}", e);
        }
    }
}
