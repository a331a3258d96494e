//! Feedback Dispatcher: decides whether a cue is spoken now
//!
//! - A cooldown since the last spoken message of any priority:
//!   1.5s before a high-priority message, 3s before a normal one.
//! - The same text is never repeated within 0.5s.
//! - Suppressed messages are dropped, never queued.

use tracing::trace;

use crate::types::{DispatchOutcome, FeedbackMessage, Priority};
use crate::EngineConfig;

#[derive(Debug, Clone)]
pub struct FeedbackDispatcher {
    high_cooldown_ms: u64,
    normal_cooldown_ms: u64,
    duplicate_window_ms: u64,
    last_spoken_ms: Option<u64>,
    last_text: Option<String>,
    dispatched: u64,
    suppressed: u64,
}

impl Default for FeedbackDispatcher {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl FeedbackDispatcher {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            high_cooldown_ms: config.high_cooldown_ms,
            normal_cooldown_ms: config.normal_cooldown_ms,
            duplicate_window_ms: config.duplicate_window_ms,
            last_spoken_ms: None,
            last_text: None,
            dispatched: 0,
            suppressed: 0,
        }
    }

    /// Offer a message at `now_ms`
    pub fn offer(&mut self, message: &FeedbackMessage, now_ms: u64) -> DispatchOutcome {
        let outcome = self.decide(message, now_ms);

        if outcome.is_dispatched() {
            self.last_spoken_ms = Some(now_ms);
            self.last_text = Some(message.text.clone());
            self.dispatched += 1;
        } else {
            self.suppressed += 1;
            trace!(text = %message.text, ?outcome, "feedback suppressed");
        }
        outcome
    }

    fn decide(&self, message: &FeedbackMessage, now_ms: u64) -> DispatchOutcome {
        let Some(last) = self.last_spoken_ms else {
            return DispatchOutcome::Dispatched;
        };
        let elapsed = now_ms.saturating_sub(last);

        if self.last_text.as_deref() == Some(message.text.as_str()) && elapsed < self.duplicate_window_ms {
            return DispatchOutcome::Duplicate;
        }

        let cooldown = match message.priority {
            Priority::High => self.high_cooldown_ms,
            Priority::Normal => self.normal_cooldown_ms,
        };
        if elapsed < cooldown {
            return DispatchOutcome::Cooldown;
        }
        DispatchOutcome::Dispatched
    }

    pub fn last_spoken_ms(&self) -> Option<u64> {
        self.last_spoken_ms
    }

    pub fn dispatched_count(&self) -> u64 {
        self.dispatched
    }

    pub fn suppressed_count(&self) -> u64 {
        self.suppressed
    }
}
