//! The player context: the single mutable state owned by the loop thread.

use std::time::Instant;

use crate::collaborators::{
    AudioOutput, ComplexFilterGraph, Demuxer, DispatchQueue, Encoder, ExternalTrack, Input,
    VideoOutput,
};
use crate::error::CoreError;
use crate::events::{Event, EventSink};
use crate::options::Options;
use crate::seek::{SeekFlags, SeekRequest};
use crate::status::{ChainStatus, StopPlay};
use crate::time::Pts;

/// Process-lifetime playback state, exclusively owned by the loop thread.
/// External producers never touch these fields directly; they enqueue
/// closures on the dispatch queue or set flags that only interrupt sleep.
pub struct PlayerContext {
    pub(crate) sleeptime: Option<std::time::Duration>,
    pub(crate) in_dispatch: bool,
    pub(crate) last_time: Instant,

    pub(crate) paused: bool,
    pub opts: Options,
    pub(crate) paused_for_cache: bool,
    pub(crate) playback_active: bool,

    pub(crate) restart_complete: bool,
    pub(crate) video_status: ChainStatus,
    pub(crate) audio_status: ChainStatus,

    pub(crate) stop_play: StopPlay,

    pub(crate) playback_pts: Pts,
    pub(crate) last_seek_pts: Pts,
    pub(crate) last_vo_pts: Pts,
    pub(crate) video_pts: Pts,
    pub(crate) audio_pts: Pts,

    pub(crate) seek: SeekRequest,
    pub(crate) current_seek: SeekRequest,

    pub(crate) hrseek_active: bool,
    pub(crate) hrseek_framedrop: bool,
    pub(crate) hrseek_backstep: bool,
    pub(crate) hrseek_lastframe: bool,
    pub(crate) hrseek_pts: Pts,

    pub(crate) step_frames: u32,
    pub(crate) step_dir: i8,

    pub(crate) cache_buffer: f64,
    pub(crate) cache_stop_time: Option<Instant>,
    pub(crate) next_cache_update: Option<Instant>,

    pub(crate) mouse_event_ts: u64,
    pub(crate) mouse_timer: Option<Instant>,
    pub(crate) mouse_cursor_visible: bool,

    pub(crate) last_chapter: i64,
    pub(crate) last_chapter_seek: i64,
    pub(crate) last_chapter_pts: Pts,

    pub(crate) ab_loop_clip: bool,
    pub(crate) playing_msg_shown: bool,

    pub(crate) start_timestamp: Option<Instant>,
    pub(crate) audio_allow_second_chance_seek: bool,
    pub(crate) screensaver_suspended: bool,
    pub(crate) force_window_active: bool,
    pub(crate) quit_requested: bool,
    pub(crate) last_frame_seeked: bool,
    pub(crate) last_dummy_tick: Instant,

    // demuxer-exposed properties, refreshed once per tick (step 2).
    pub(crate) duration: Option<f64>,
    pub(crate) seekable: bool,
    pub(crate) ts_resets_possible: bool,
    pub(crate) is_network: bool,
    pub(crate) filepos: u64,
    pub(crate) stream_size: Option<u64>,
    pub(crate) max_frames_remaining: Option<u64>,
    pub(crate) intrinsic_track_offset: f64,

    pub(crate) chapters: Vec<f64>,
    pub(crate) chapter_names: Vec<String>,
    pub(crate) external_track_offsets: Vec<ExternalTrack>,

    pub(crate) demuxer: Option<Box<dyn Demuxer>>,
    pub(crate) audio_output: Option<Box<dyn AudioOutput>>,
    pub(crate) video_output: Option<Box<dyn VideoOutput>>,
    pub(crate) input: Option<Box<dyn Input>>,
    pub(crate) encoder: Option<Box<dyn Encoder>>,
    pub(crate) filter_graph: Option<Box<dyn ComplexFilterGraph>>,
    pub(crate) dispatch_queue: Box<dyn DispatchQueue>,
    pub(crate) event_sink: Box<dyn EventSink>,
}

impl PlayerContext {
    /// Build a context around its collaborators. Every collaborator besides
    /// the dispatch queue and event sink is optional: a playlist entry with
    /// no video track, for instance, simply never sets `video_output`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        demuxer: Option<Box<dyn Demuxer>>,
        audio_output: Option<Box<dyn AudioOutput>>,
        video_output: Option<Box<dyn VideoOutput>>,
        input: Option<Box<dyn Input>>,
        dispatch_queue: Box<dyn DispatchQueue>,
        event_sink: Box<dyn EventSink>,
        opts: Options,
    ) -> Self {
        let now = Instant::now();
        Self {
            sleeptime: None,
            in_dispatch: false,
            last_time: now,
            paused: opts.pause,
            opts,
            paused_for_cache: false,
            playback_active: false,
            restart_complete: false,
            video_status: ChainStatus::None,
            audio_status: ChainStatus::None,
            stop_play: StopPlay::KeepPlaying,
            playback_pts: Pts::NOPTS,
            last_seek_pts: Pts::NOPTS,
            last_vo_pts: Pts::NOPTS,
            video_pts: Pts::NOPTS,
            audio_pts: Pts::NOPTS,
            seek: SeekRequest::none(),
            current_seek: SeekRequest::none(),
            hrseek_active: false,
            hrseek_framedrop: false,
            hrseek_backstep: false,
            hrseek_lastframe: false,
            hrseek_pts: Pts::NOPTS,
            step_frames: 0,
            step_dir: 0,
            cache_buffer: 100.0,
            cache_stop_time: None,
            next_cache_update: None,
            mouse_event_ts: 0,
            mouse_timer: None,
            mouse_cursor_visible: true,
            last_chapter: -2,
            last_chapter_seek: -2,
            last_chapter_pts: Pts::NOPTS,
            ab_loop_clip: true,
            playing_msg_shown: false,
            start_timestamp: None,
            audio_allow_second_chance_seek: false,
            screensaver_suspended: false,
            force_window_active: false,
            quit_requested: false,
            last_frame_seeked: false,
            last_dummy_tick: now,
            duration: None,
            seekable: true,
            ts_resets_possible: false,
            is_network: false,
            filepos: 0,
            stream_size: None,
            max_frames_remaining: None,
            intrinsic_track_offset: 0.0,
            chapters: Vec::new(),
            chapter_names: Vec::new(),
            external_track_offsets: Vec::new(),
            demuxer,
            audio_output,
            video_output,
            input,
            encoder: None,
            filter_graph: None,
            dispatch_queue,
            event_sink,
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.event_sink.on_event(event);
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_playback_active(&self) -> bool {
        self.playback_active
    }

    pub fn stop_reason(&self) -> StopPlay {
        self.stop_play
    }

    pub(crate) fn demuxer_seek(&mut self, pts: f64, flags: SeekFlags) -> Result<(), CoreError> {
        match self.demuxer.as_mut() {
            Some(demuxer) => demuxer.seek(pts, flags),
            None => Ok(()),
        }
    }

    pub(crate) fn demuxer_seek_track(&mut self, track_id: u64, pts: f64) -> Result<(), CoreError> {
        if let Some(track) = self
            .external_track_offsets
            .iter_mut()
            .find(|t| t.id == track_id)
        {
            return track.demuxer.seek(pts, SeekFlags::empty());
        }
        Ok(())
    }

    pub(crate) fn clear_audio_buffers(&mut self) {
        if let Some(audio) = self.audio_output.as_mut() {
            audio.clear_buffers();
        }
    }

    pub(crate) fn notify_encoder_discontinuity(&mut self) {
        if let Some(encoder) = self.encoder.as_mut() {
            encoder.notify_discontinuity();
        }
    }

    /// Placeholder for filter-graph/decoder/subsystem reset: out of scope
    /// collaborators own their own reset behavior; the core only needs to
    /// know that it happened before the restart barrier can re-arm.
    pub(crate) fn reset_decoders_and_filters(&mut self) {}

    /// Re-derive `playback_active` (§2 invariant 2) and emit `CoreIdle` on
    /// change. Called from the seek planner, the pause arbiter, and the
    /// EOF/loop policy, all of which can affect the inputs to this formula.
    pub fn update_core_idle_state(&mut self) -> bool {
        let active = !self.paused
            && self.restart_complete
            && self.stop_play == StopPlay::KeepPlaying
            && !(self.audio_status == ChainStatus::Eof && self.video_status == ChainStatus::Eof);
        let changed = active != self.playback_active;
        self.playback_active = active;
        if changed {
            self.emit(Event::CoreIdle);
        }
        changed
    }
}

#[cfg(test)]
impl PlayerContext {
    /// A context wired to no-op/fake collaborators, for unit tests that only
    /// exercise state transitions rather than collaborator interaction.
    pub fn new_for_test() -> Self {
        use crate::events::RecordingSink;
        use crate::testing::FakeDispatchQueue;

        Self::new(
            None,
            None,
            None,
            None,
            Box::new(FakeDispatchQueue::default()),
            Box::new(RecordingSink::default()),
            Options::default(),
        )
    }

    /// Like `new_for_test`, but returns a handle to the events emitted so
    /// far so a test can assert on emission order and counts.
    pub fn new_for_test_with_sink() -> (Self, crate::testing::SharedSink) {
        use crate::testing::{FakeDispatchQueue, SharedSink};

        let sink = SharedSink::default();
        let ctx = Self::new(
            None,
            None,
            None,
            None,
            Box::new(FakeDispatchQueue::default()),
            Box::new(sink.clone()),
            Options::default(),
        );
        (ctx, sink)
    }
}
