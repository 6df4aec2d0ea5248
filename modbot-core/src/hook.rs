use modbot::model::{Member, Message, Reaction};

use tokio::sync::broadcast;

const QUEUE_SIZE: usize = 32;

/// An event distributed to all hook subscribers.
#[derive(Clone, Debug)]
pub enum Event {
    /// A module passed all checks and is about to be called.
    CommandUse {
        module: &'static str,
        message: Message,
    },
    MemberJoin(Member),
    ReactionAdd(Reaction),
}

#[derive(Debug)]
pub struct HookController {
    tx: broadcast::Sender<Event>,
}

impl HookController {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(QUEUE_SIZE);

        Self { tx }
    }

    /// Returns a receiver for all events dispatched after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Dispatches `event` to all current subscribers. Events without
    /// subscribers are dropped.
    pub fn dispatch_event(&self, event: Event) {
        let _ = self.tx.send(event);
    }
}

impl Default for HookController {
    fn default() -> Self {
        Self::new()
    }
}
