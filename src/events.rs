//! Emitted event enum and the sink the context delivers them to.

use serde::{Deserialize, Serialize};

/// Every event the core can emit, in the order a tick's handlers produce
/// them (§5's ordering guarantee: events from one tick arrive in the
/// program order of the handlers that produced them). `Serialize`/
/// `Deserialize` so a host can forward emitted events across a process
/// boundary (e.g. to a UI client) rather than only observe them in-process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    Pause,
    Unpause,
    Seek,
    Tick,
    PlaybackRestart,
    ChapterChange,
    CoreIdle,
    CacheUpdate,
    Idle,
    VideoReconfig,
    WinResize,
    WinState,
}

/// Receives events emitted by the context. A no-op implementation is
/// provided for callers that don't care (and for tests that only assert on
/// context state).
pub trait EventSink: Send {
    fn on_event(&mut self, event: Event);
}

/// Collects every emitted event in order, the simplest useful sink and the
/// one the test suite asserts against.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<Event>,
}

impl EventSink for RecordingSink {
    fn on_event(&mut self, event: Event) {
        self.events.push(event);
    }
}
