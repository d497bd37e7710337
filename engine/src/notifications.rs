//! Transient user-facing notifications ("toasts").
//!
//! Failures and confirmations from the project controller are reported here
//! rather than stored in domain state. A toast lives until it is dismissed
//! explicitly or its display time runs out; nothing else reads it back.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

const SUCCESS_TTL: Duration = Duration::from_secs(2);
const ERROR_TTL: Duration = Duration::from_secs(4);

/// Oldest toasts are dropped once the stack is this deep.
const MAX_TOASTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToastId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
}

impl ToastLevel {
    #[must_use]
    pub const fn ttl(self) -> Duration {
        match self {
            Self::Success => SUCCESS_TTL,
            Self::Error => ERROR_TTL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    id: ToastId,
    level: ToastLevel,
    message: String,
    raised_at: Instant,
}

impl Toast {
    #[must_use]
    pub fn id(&self) -> ToastId {
        self.id
    }

    #[must_use]
    pub fn level(&self) -> ToastLevel {
        self.level
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) >= self.level.ttl()
    }
}

/// Stack of visible toasts, oldest first.
#[derive(Debug, Default)]
pub struct Notifications {
    toasts: VecDeque<Toast>,
    next_id: u64,
}

impl Notifications {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: ToastLevel, message: impl Into<String>) -> ToastId {
        self.push_at(level, message, Instant::now())
    }

    pub fn push_at(
        &mut self,
        level: ToastLevel,
        message: impl Into<String>,
        now: Instant,
    ) -> ToastId {
        let id = ToastId(self.next_id);
        self.next_id += 1;
        if self.toasts.len() == MAX_TOASTS {
            self.toasts.pop_front();
        }
        self.toasts.push_back(Toast {
            id,
            level,
            message: message.into(),
            raised_at: now,
        });
        id
    }

    pub fn success(&mut self, message: impl Into<String>) -> ToastId {
        self.push(ToastLevel::Success, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> ToastId {
        self.push(ToastLevel::Error, message)
    }

    /// Returns `false` if the toast was already gone.
    pub fn dismiss(&mut self, id: ToastId) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|toast| toast.id != id);
        self.toasts.len() != before
    }

    pub fn dismiss_latest(&mut self) -> Option<Toast> {
        self.toasts.pop_back()
    }

    /// Drop every toast whose display time has elapsed.
    pub fn expire(&mut self, now: Instant) {
        self.toasts.retain(|toast| !toast.is_expired(now));
    }

    #[must_use]
    pub fn latest(&self) -> Option<&Toast> {
        self.toasts.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.toasts.len()
    }
}
