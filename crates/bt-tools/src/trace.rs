#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::VecDeque;

use bt_core::Blackboard;

/// A small trace event recorded during evaluation.
///
/// `pass` is the tree-wide root evaluation count at the time of the event, `slug` the node that
/// produced it. `a` carries an event-specific number (for node events, the node's run count).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceEvent {
    pub pass: u64,
    pub tag: Cow<'static, str>,
    pub slug: Option<String>,
    pub a: u64,
}

impl TraceEvent {
    pub fn new(pass: u64, tag: impl Into<Cow<'static, str>>) -> Self {
        Self {
            pass,
            tag: tag.into(),
            slug: None,
            a: 0,
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn with_a(mut self, a: u64) -> Self {
        self.a = a;
        self
    }
}

pub trait TraceSink: Send + Sync {
    fn emit(&mut self, event: TraceEvent);
}

#[derive(Debug, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn emit(&mut self, _event: TraceEvent) {}
}

#[derive(Debug, Default)]
pub struct VecTraceSink {
    pub events: Vec<TraceEvent>,
}

impl TraceSink for VecTraceSink {
    fn emit(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}

/// In-memory event log. Unbounded unless built with [`TraceLog::bounded`], in which case the
/// oldest events are dropped to make room.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceLog {
    pub events: VecDeque<TraceEvent>,
    #[cfg_attr(feature = "serde", serde(default))]
    max_events: Option<usize>,
}

impl TraceLog {
    pub fn bounded(max_events: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_events.min(1024)),
            max_events: Some(max_events),
        }
    }

    pub fn max_events(&self) -> Option<usize> {
        self.max_events
    }

    pub fn push(&mut self, event: TraceEvent) {
        if let Some(max) = self.max_events {
            if max == 0 {
                return;
            }
            while self.events.len() >= max {
                self.events.pop_front();
            }
        }
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events produced by one node, in emission order.
    pub fn for_slug<'a>(&'a self, slug: &'a str) -> impl Iterator<Item = &'a TraceEvent> + 'a {
        self.events
            .iter()
            .filter(move |e| e.slug.as_deref() == Some(slug))
    }
}

/// Blackboard path for collecting events in-memory.
pub const TRACE_LOG: &str = "bt.trace.log";
/// Blackboard path for streaming events into a user-provided sink.
pub const TRACE_SINK: &str = "bt.trace.sink";

pub fn emit(blackboard: &mut Blackboard, event: TraceEvent) {
    if let Some(log) = blackboard.fetch_mut::<TraceLog>(TRACE_LOG) {
        log.push(event.clone());
    }
    if let Some(sink) = blackboard.fetch_mut::<Box<dyn TraceSink>>(TRACE_SINK) {
        sink.emit(event);
    }
}
