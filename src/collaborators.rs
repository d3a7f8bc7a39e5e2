//! Trait-object seams for every external collaborator the core drives.
//!
//! None of these are implemented here: decoding, demuxing, rendering, and
//! input handling live on the other side of these traits. The context only
//! ever holds `Box<dyn Trait>` and calls through it.

use std::time::Duration;

use bitflags::bitflags;

use crate::error::CoreError;
use crate::seek::SeekFlags;
use crate::status::ChainStatus;

/// Demuxer-reported reader-ahead state (`GET_READER_STATE`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ReaderState {
    pub idle: bool,
    pub underrun: bool,
    pub eof: bool,
    pub ts_duration: f64,
}

/// Demuxer-reported stream cache state (`GET_CACHE_INFO`).
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheInfo {
    pub idle: bool,
    pub size: i64,
}

/// Snapshot of demuxer-exposed properties, refreshed once per tick
/// (play loop driver step 2) rather than queried ad hoc.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemuxerProperties {
    pub duration: Option<f64>,
    pub seekable: bool,
    pub ts_resets_possible: bool,
    pub is_network: bool,
    pub filepos: u64,
    pub stream_size: Option<u64>,
}

/// An external (sidecar) track with its own demuxer, seekable independently
/// of the primary one.
pub struct ExternalTrack {
    pub id: u64,
    pub offset: f64,
    pub is_external_source: bool,
    pub demuxer: Box<dyn Demuxer>,
}

pub trait Demuxer: Send {
    fn seek(&mut self, pts: f64, flags: SeekFlags) -> Result<(), CoreError>;
    fn control_reader_state(&self) -> ReaderState;
    fn stream_control_cache_info(&self) -> CacheInfo;
    fn properties(&self) -> DemuxerProperties;
    fn chapters(&self) -> Vec<(f64, String)>;
}

pub trait AudioOutput: Send {
    fn pause(&mut self);
    fn resume(&mut self);
    fn clear_buffers(&mut self);
    fn status(&self) -> ChainStatus;
    /// Presentation timestamp of the sample currently at the output, or
    /// `None` if nothing has played yet.
    fn pts(&self) -> Option<f64>;
}

bitflags! {
    /// Events drained from `query_and_reset_events`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct VoEvents: u8 {
        const RESIZE = 0b0000_0001;
        const STATE_CHANGE = 0b0000_0010;
        const REDRAW_REQUEST = 0b0000_0100;
    }
}

pub trait VideoOutput: Send {
    fn set_paused(&mut self, paused: bool);
    fn redraw(&mut self);
    fn set_cursor_visibility(&mut self, visible: bool);
    fn kill_screensaver(&mut self);
    fn restore_screensaver(&mut self);
    fn query_and_reset_events(&mut self) -> VoEvents;
    fn reconfig(&mut self, width: u32, height: u32) -> Result<(), CoreError>;
    fn has_frame(&self) -> bool;
    fn want_redraw(&self) -> bool;
    fn status(&self) -> ChainStatus;
    /// Presentation timestamp of the frame currently displayed, or `None` if
    /// nothing has been shown yet.
    fn pts(&self) -> Option<f64>;
}

pub trait Input: Send {
    fn read_cmd(&mut self) -> Option<String>;
    fn get_delay(&self) -> Option<Duration>;
    fn get_mouse_event_counter(&self) -> u64;
}

pub trait DispatchQueue: Send {
    /// Block until `timeout` elapses or `interrupt` is called from any
    /// thread. `None` means wait indefinitely.
    fn process(&mut self, timeout: Option<Duration>);
    fn interrupt(&self);
}

pub trait Encoder: Send {
    fn failed(&self) -> bool;
    fn notify_discontinuity(&mut self);
}

/// Complex filter graph: decoders push frames in, the loop pumps it, video
/// output and audio output pull from it. Out of scope for this crate beyond
/// the two control points the play loop driver touches.
pub trait ComplexFilterGraph: Send {
    /// Returns `false` if an input pad was full and a frame was left queued
    /// for the next tick.
    fn push_decoder_frames(&mut self) -> bool;
    /// Returns `Err(())` if the graph reports failure; treated as EOF.
    fn pump(&mut self) -> Result<(), ()>;
}
