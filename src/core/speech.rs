//! Speech output seam. The engine decides what to say; a sink renders it.
//!
//! Sinks must never block the frame loop.

use tokio::sync::broadcast;

use crate::types::{FeedbackMessage, SpeechCommand};

pub trait SpeechSink: Send + Sync {
    /// Queue a message for speech, fire-and-forget
    fn say(&self, message: &FeedbackMessage);

    /// Drop anything queued or playing
    fn cancel_all(&self);
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl SpeechSink for NullSink {
    fn say(&self, _message: &FeedbackMessage) {}

    fn cancel_all(&self) {}
}

/// Publishes speech commands on a broadcast channel.
/// Sends never wait; with no subscribers the command is dropped.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: broadcast::Sender<SpeechCommand>,
}

impl ChannelSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SpeechCommand> {
        self.tx.subscribe()
    }
}

impl SpeechSink for ChannelSink {
    fn say(&self, message: &FeedbackMessage) {
        let _ = self.tx.send(SpeechCommand::Say { message: message.clone() });
    }

    fn cancel_all(&self) {
        let _ = self.tx.send(SpeechCommand::CancelAll);
    }
}
