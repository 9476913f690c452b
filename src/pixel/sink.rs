//! Tracking sinks receive formatted events from [`PixelTracker`](crate::pixel::PixelTracker).
//!
//! A sink is the only place that knows where events go. The tracker treats every sink the same
//! way: one `track` call per event, errors swallowed.

use std::fmt;
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};

use crate::pixel::error::PixelResult;

pub trait TrackingSink: Send + Sync {
    /// Forwards a single event. A sink that is not ready to receive events returns `Ok(())`.
    fn track(&self, event_name: &str, payload: &Map<String, Value>) -> PixelResult<()>;

    /// Short identifier used in log records.
    fn name(&self) -> &'static str;
}

/// Sink used when nothing is configured. Every event is dropped.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TrackingSink for NoopSink {
    fn track(&self, _event_name: &str, _payload: &Map<String, Value>) -> PixelResult<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordedCall {
    pub event_name: String,
    pub payload: Map<String, Value>,
}

/// Keeps every event in memory. Clones share the same buffer, so a clone can be handed to a
/// tracker while the original is used for inspection.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl TrackingSink for RecordingSink {
    fn track(&self, event_name: &str, payload: &Map<String, Value>) -> PixelResult<()> {
        self.calls.lock().unwrap().push(RecordedCall {
            event_name: event_name.to_string(),
            payload: payload.clone(),
        });
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

type TrackCallback = dyn Fn(&str, &Map<String, Value>) -> PixelResult<()> + Send + Sync;

/// Adapts a closure into a sink.
#[derive(Clone)]
pub struct CallbackSink {
    callback: Arc<TrackCallback>,
}

impl fmt::Debug for CallbackSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackSink").finish_non_exhaustive()
    }
}

impl TrackingSink for CallbackSink {
    fn track(&self, event_name: &str, payload: &Map<String, Value>) -> PixelResult<()> {
        (self.callback)(event_name, payload)
    }

    fn name(&self) -> &'static str {
        "callback"
    }
}

pub fn callback_sink<F>(callback: F) -> CallbackSink
where
    F: Fn(&str, &Map<String, Value>) -> PixelResult<()> + Send + Sync + 'static,
{
    CallbackSink {
        callback: Arc::new(callback),
    }
}
