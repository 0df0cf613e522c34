//! Optional observers of planning decisions.
//!
//! Sinks are notified with a `(tag, message)` event at each gate. They are
//! separate from `tracing` logs and never influence a planning outcome.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticEvent {
    pub tag: String,
    pub message: String,
}

impl DiagnosticEvent {
    pub fn new(tag: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            message: message.into(),
        }
    }
}

pub trait DiagnosticsSink: Send + Sync {
    fn capture(&self, event: DiagnosticEvent);
}

impl<T: DiagnosticsSink + ?Sized> DiagnosticsSink for Arc<T> {
    fn capture(&self, event: DiagnosticEvent) {
        (**self).capture(event)
    }
}

/// Bounded ring buffer of the most recent events.
#[derive(Debug)]
pub struct InMemoryDiagnostics {
    capacity: usize,
    enabled: AtomicBool,
    events: Mutex<VecDeque<DiagnosticEvent>>,
}

impl InMemoryDiagnostics {
    /// Capacity below 1 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            enabled: AtomicBool::new(true),
            events: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Oldest first.
    pub fn snapshot(&self) -> Vec<DiagnosticEvent> {
        self.events.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl Default for InMemoryDiagnostics {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl DiagnosticsSink for InMemoryDiagnostics {
    fn capture(&self, event: DiagnosticEvent) {
        if !self.is_enabled() {
            return;
        }
        let mut events = self.events.lock();
        if events.len() == self.capacity {
            events.pop_front();
        }
        events.push_back(event);
    }
}

/// Case-insensitive tag allowlist in front of another sink.
/// An empty allowlist passes every tag.
#[derive(Debug)]
pub struct DiagnosticsFilter<S> {
    inner: S,
    allow: HashSet<String>,
}

impl<S: DiagnosticsSink> DiagnosticsFilter<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            allow: HashSet::new(),
        }
    }

    pub fn allow_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.allow = tags
            .into_iter()
            .map(|t| t.as_ref().trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        self
    }

    pub fn should_capture(&self, tag: &str) -> bool {
        self.allow.is_empty() || self.allow.contains(&tag.to_ascii_lowercase())
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: DiagnosticsSink> DiagnosticsSink for DiagnosticsFilter<S> {
    fn capture(&self, event: DiagnosticEvent) {
        if self.should_capture(&event.tag) {
            self.inner.capture(event);
        }
    }
}
