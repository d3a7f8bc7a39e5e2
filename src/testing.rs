//! Fake collaborators for driving the core deterministically in tests.
//!
//! Each fake records calls it receives and returns whatever was scripted,
//! the way a fixture double is usually built for this kind of seam — never
//! a real demuxer/decoder/output.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::collaborators::{
    AudioOutput, CacheInfo, ComplexFilterGraph, Demuxer, DemuxerProperties, DispatchQueue, Encoder,
    Input, ReaderState, VideoOutput, VoEvents,
};
use crate::error::CoreError;
use crate::events::{Event, EventSink};
use crate::seek::SeekFlags;
use crate::status::ChainStatus;

/// An event sink a test keeps a handle to, so it can assert on what was
/// emitted after driving the context.
#[derive(Clone, Default)]
pub struct SharedSink(pub Arc<Mutex<Vec<Event>>>);

impl SharedSink {
    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }
}

impl EventSink for SharedSink {
    fn on_event(&mut self, event: Event) {
        self.0.lock().unwrap().push(event);
    }
}

#[derive(Default)]
pub struct FakeDemuxer {
    pub seeks: Vec<(f64, SeekFlags)>,
    pub reject_seeks: bool,
    pub reader_state: ReaderState,
    pub cache_info: CacheInfo,
    pub properties: DemuxerProperties,
    pub chapters: Vec<(f64, String)>,
}

impl Demuxer for FakeDemuxer {
    fn seek(&mut self, pts: f64, flags: SeekFlags) -> Result<(), CoreError> {
        if self.reject_seeks {
            return Err(CoreError::SeekRejected { target: pts });
        }
        self.seeks.push((pts, flags));
        Ok(())
    }

    fn control_reader_state(&self) -> ReaderState {
        self.reader_state
    }

    fn stream_control_cache_info(&self) -> CacheInfo {
        self.cache_info
    }

    fn properties(&self) -> DemuxerProperties {
        self.properties
    }

    fn chapters(&self) -> Vec<(f64, String)> {
        self.chapters.clone()
    }
}

#[derive(Default)]
pub struct FakeAudioOutput {
    pub paused: bool,
    pub cleared: u32,
    pub status: ChainStatus,
    pub pts: Option<f64>,
}

impl AudioOutput for FakeAudioOutput {
    fn pause(&mut self) {
        self.paused = true;
    }

    fn resume(&mut self) {
        self.paused = false;
    }

    fn clear_buffers(&mut self) {
        self.cleared += 1;
    }

    fn status(&self) -> ChainStatus {
        self.status
    }

    fn pts(&self) -> Option<f64> {
        self.pts
    }
}

#[derive(Default)]
pub struct FakeVideoOutput {
    pub paused: bool,
    pub redraws: u32,
    pub cursor_visible: bool,
    pub screensaver_suspended: bool,
    pub events: VoEvents,
    pub has_frame: bool,
    pub want_redraw: bool,
    pub status: ChainStatus,
    pub reconfigs: u32,
    pub pts: Option<f64>,
}

impl VideoOutput for FakeVideoOutput {
    fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    fn redraw(&mut self) {
        self.redraws += 1;
    }

    fn set_cursor_visibility(&mut self, visible: bool) {
        self.cursor_visible = visible;
    }

    fn kill_screensaver(&mut self) {
        self.screensaver_suspended = true;
    }

    fn restore_screensaver(&mut self) {
        self.screensaver_suspended = false;
    }

    fn query_and_reset_events(&mut self) -> VoEvents {
        std::mem::take(&mut self.events)
    }

    fn reconfig(&mut self, _width: u32, _height: u32) -> Result<(), CoreError> {
        self.reconfigs += 1;
        Ok(())
    }

    fn has_frame(&self) -> bool {
        self.has_frame
    }

    fn want_redraw(&self) -> bool {
        self.want_redraw
    }

    fn status(&self) -> ChainStatus {
        self.status
    }

    fn pts(&self) -> Option<f64> {
        self.pts
    }
}

#[derive(Default)]
pub struct FakeInput {
    pub commands: Vec<String>,
    pub delay: Option<Duration>,
    pub mouse_counter: u64,
}

impl Input for FakeInput {
    fn read_cmd(&mut self) -> Option<String> {
        if self.commands.is_empty() {
            None
        } else {
            Some(self.commands.remove(0))
        }
    }

    fn get_delay(&self) -> Option<Duration> {
        self.delay
    }

    fn get_mouse_event_counter(&self) -> u64 {
        self.mouse_counter
    }
}

#[derive(Default)]
pub struct FakeDispatchQueue {
    pub interrupts: u32,
}

impl DispatchQueue for FakeDispatchQueue {
    fn process(&mut self, _timeout: Option<Duration>) {}

    fn interrupt(&self) {}
}

#[derive(Default)]
pub struct FakeEncoder {
    pub failed: bool,
    pub discontinuities: u32,
}

impl Encoder for FakeEncoder {
    fn failed(&self) -> bool {
        self.failed
    }

    fn notify_discontinuity(&mut self) {
        self.discontinuities += 1;
    }
}

#[derive(Default)]
pub struct FakeFilterGraph {
    pub push_accepts: bool,
    pub pump_fails: bool,
}

impl ComplexFilterGraph for FakeFilterGraph {
    fn push_decoder_frames(&mut self) -> bool {
        self.push_accepts
    }

    fn pump(&mut self) -> Result<(), ()> {
        if self.pump_fails {
            Err(())
        } else {
            Ok(())
        }
    }
}
