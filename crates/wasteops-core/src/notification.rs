//! Single-slot toast channel.
//!
//! Each [`NotificationQueue::push`] cancels the outstanding hide task before
//! scheduling its own, so an older push can never hide a newer message. The
//! queue never reads the clock itself: callers pass `now` and drive
//! [`NotificationQueue::poll`] from their event loop, sleeping until
//! [`NotificationQueue::next_deadline`].

use std::time::{Duration, Instant};

pub const NOTIFICATION_TTL: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HideTask {
    ticket: u64,
    due: Instant,
}

#[derive(Debug, Clone)]
pub struct NotificationQueue {
    current: Notification,
    pending: Option<HideTask>,
    next_ticket: u64,
    ttl: Duration,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(NOTIFICATION_TTL)
    }
}

impl NotificationQueue {
    pub fn new(ttl: Duration) -> Self {
        Self {
            current: Notification::default(),
            pending: None,
            next_ticket: 0,
            ttl,
        }
    }

    /// Replaces the message, makes it visible and reschedules the hide task.
    /// Returns the ticket of the newly scheduled task.
    pub fn push(&mut self, message: impl Into<String>, now: Instant) -> u64 {
        self.cancel_pending();
        self.next_ticket += 1;
        self.current = Notification {
            message: message.into(),
            visible: true,
        };
        self.pending = Some(HideTask {
            ticket: self.next_ticket,
            due: now + self.ttl,
        });
        self.next_ticket
    }

    /// Drops the scheduled hide task, if any, and returns its ticket.
    pub fn cancel_pending(&mut self) -> Option<u64> {
        self.pending.take().map(|task| task.ticket)
    }

    pub fn pending_ticket(&self) -> Option<u64> {
        self.pending.map(|task| task.ticket)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.map(|task| task.due)
    }

    /// Runs the hide task when it is due. Only the visible flag is cleared;
    /// the text stays in memory. Returns true when something was hidden.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(task) if task.due <= now => {
                self.pending = None;
                self.current.visible = false;
                true
            }
            _ => false,
        }
    }

    pub fn current(&self) -> &Notification {
        &self.current
    }

    pub fn visible_message(&self) -> Option<&str> {
        self.current
            .visible
            .then_some(self.current.message.as_str())
    }
}
