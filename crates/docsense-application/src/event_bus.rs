use docsense_core::event::AppEvent;
use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 256;

/// Fan-out of [`AppEvent`]s to every subscribed view.
///
/// Publishing never blocks and never fails; events sent while nobody is
/// subscribed are dropped. A subscriber that falls more than the channel
/// capacity behind sees `RecvError::Lagged` and skips ahead.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, event: AppEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("[EventBus] No subscribers, event dropped");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
