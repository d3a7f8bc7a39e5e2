//! Play loop driver: the fixed per-tick handler order (§4.9) plus the
//! periodic housekeeping handlers it calls along the way.

use std::time::{Duration, Instant};

use crate::collaborators::VoEvents;
use crate::context::PlayerContext;
use crate::events::Event;
use crate::status::{ChainStatus, StopPlay};

const DUMMY_TICK_INTERVAL: Duration = Duration::from_millis(50);
const OSD_REDRAW_SEEK_DEFER: Duration = Duration::from_millis(100);

impl PlayerContext {
    /// Run a single tick. Handlers observe each other's state within the
    /// tick; this order is a contract, not an aesthetic choice.
    pub fn run_tick(&mut self) {
        if self.encoder.as_ref().map(|e| e.failed()).unwrap_or(false) {
            self.stop_play = StopPlay::PtQuit;
            self.quit_requested = true;
            return;
        }

        self.refresh_demuxer_properties();
        self.handle_complex_filter_decoders();
        self.handle_cursor_autohide();
        self.handle_vo_events();
        self.process_input();
        self.pump_complex_filter();

        // Filling audio/video buffers and writing frames is owned entirely
        // by the decoder/output collaborators; the core has no control
        // point here beyond what restart/eof already observe.

        self.handle_playback_restart();
        self.update_playback_time();
        self.handle_dummy_ticks();

        if self.video_status == ChainStatus::Eof {
            self.advance_subtitles_to(self.playback_pts);
        }

        self.handle_eof_loop_keep_open();

        if self.stop_play != StopPlay::KeepPlaying {
            return;
        }

        self.handle_osd_redraw();
        self.wait_events();
        self.handle_pause_on_low_cache();
        self.process_input();
        self.handle_chapter_change();
        self.handle_force_window(false);
        self.execute_queued_seek().ok();
    }

    fn refresh_demuxer_properties(&mut self) {
        let Some(demuxer) = self.demuxer.as_ref() else {
            return;
        };
        let props = demuxer.properties();
        self.duration = props.duration;
        self.seekable = props.seekable;
        self.ts_resets_possible = props.ts_resets_possible;
        self.is_network = props.is_network;
        self.filepos = props.filepos;
        self.stream_size = props.stream_size;
    }

    fn handle_complex_filter_decoders(&mut self) {
        if let Some(graph) = self.filter_graph.as_mut() {
            graph.push_decoder_frames();
        }
    }

    fn pump_complex_filter(&mut self) {
        if let Some(graph) = self.filter_graph.as_mut() {
            if graph.pump().is_err() {
                self.audio_status = ChainStatus::Eof;
                self.video_status = ChainStatus::Eof;
            }
        }
    }

    /// Refresh `playback_pts` from whichever chain is actively driving
    /// presentation: video while it is between PLAYING and EOF, else audio
    /// in the same range. Neither chain active leaves `playback_pts`
    /// wherever the last seek or reset left it.
    pub(crate) fn update_playback_time(&mut self) {
        let in_range = |status: ChainStatus| status >= ChainStatus::Playing && status < ChainStatus::Eof;

        if self.video_output.is_some() && in_range(self.video_status) {
            self.video_pts = self
                .video_output
                .as_ref()
                .and_then(|vo| vo.pts())
                .map(crate::time::Pts::known)
                .unwrap_or(crate::time::Pts::NOPTS);
            self.playback_pts = self.video_pts;
        } else if self.audio_output.is_some() && in_range(self.audio_status) {
            self.audio_pts = self
                .audio_output
                .as_ref()
                .and_then(|ao| ao.pts())
                .map(crate::time::Pts::known)
                .unwrap_or(crate::time::Pts::NOPTS);
            self.playback_pts = self.audio_pts;
        }
    }

    fn advance_subtitles_to(&mut self, _pts: crate::time::Pts) {
        // Subtitle rasterization is out of scope; this is the control point
        // where a host would be told to advance.
    }

    /// Emit a dummy TICK if idle/paused and more than 50ms have passed since
    /// the last one, so UI-facing position displays keep advancing during a
    /// pure pause with no decoder activity.
    pub fn handle_dummy_ticks(&mut self) {
        if !self.paused && self.playback_active {
            return;
        }
        if self.last_dummy_tick.elapsed() >= DUMMY_TICK_INTERVAL {
            self.last_dummy_tick = Instant::now();
            self.emit(Event::Tick);
        }
    }

    pub fn handle_cursor_autohide(&mut self) {
        let Some(input) = self.input.as_ref() else {
            return;
        };
        let counter = input.get_mouse_event_counter();
        if counter != self.mouse_event_ts {
            self.mouse_event_ts = counter;
            self.mouse_timer = Some(Instant::now());
            if !self.mouse_cursor_visible {
                self.mouse_cursor_visible = true;
                if let Some(vo) = self.video_output.as_mut() {
                    vo.set_cursor_visibility(true);
                }
            }
            return;
        }

        if self.mouse_cursor_visible {
            if let Some(started) = self.mouse_timer {
                if started.elapsed() >= self.opts.mouse_autohide_delay {
                    self.mouse_cursor_visible = false;
                    if let Some(vo) = self.video_output.as_mut() {
                        vo.set_cursor_visibility(false);
                    }
                }
            }
        }
    }

    pub fn handle_vo_events(&mut self) {
        let Some(vo) = self.video_output.as_mut() else {
            return;
        };
        let events = vo.query_and_reset_events();
        if events.contains(VoEvents::RESIZE) {
            self.emit(Event::WinResize);
        }
        if events.contains(VoEvents::STATE_CHANGE) {
            self.emit(Event::WinState);
        }
        // REDRAW_REQUEST just schedules a redraw on the next OSD-redraw
        // step; `want_redraw()` already reflects it without extra state.
    }

    /// Redraw the OSD unless a seek is in flight and less than 100ms has
    /// passed since it started (same anti-thrash rationale as the 300ms
    /// continuous-seek defer), or unless nothing changed and no redraw was
    /// explicitly requested.
    pub fn handle_osd_redraw(&mut self) {
        let Some(vo) = self.video_output.as_mut() else {
            return;
        };

        if let Some(started) = self.start_timestamp {
            if started.elapsed() < OSD_REDRAW_SEEK_DEFER && !self.seek.is_none() {
                return;
            }
        }

        if !vo.want_redraw() {
            return;
        }
        vo.redraw();
    }

    /// Issue `KILL_SCREENSAVER`/`RESTORE_SCREENSAVER` only on actual change.
    pub fn update_screensaver_state(&mut self) {
        let desired = self.playback_active;
        if desired == self.screensaver_suspended {
            return;
        }
        self.screensaver_suspended = desired;
        let Some(vo) = self.video_output.as_mut() else {
            return;
        };
        if desired {
            vo.kill_screensaver();
        } else {
            vo.restore_screensaver();
        }
    }

    pub fn handle_chapter_change(&mut self) {
        let current = self.current_chapter();
        if current != self.last_chapter {
            self.last_chapter = current;
            self.emit(Event::ChapterChange);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::context::PlayerContext;
    use crate::events::Event;
    use crate::status::ChainStatus;
    use crate::testing::{FakeAudioOutput, FakeInput, FakeVideoOutput};

    #[test]
    fn update_playback_time_prefers_video_pts_while_playing() {
        let mut ctx = PlayerContext::new_for_test();
        ctx.video_output = Some(Box::new(FakeVideoOutput {
            pts: Some(12.0),
            ..Default::default()
        }));
        ctx.audio_output = Some(Box::new(FakeAudioOutput {
            pts: Some(99.0),
            ..Default::default()
        }));
        ctx.video_status = ChainStatus::Playing;
        ctx.audio_status = ChainStatus::Playing;
        ctx.update_playback_time();
        assert_eq!(ctx.playback_pts.get(), Some(12.0));
    }

    #[test]
    fn update_playback_time_falls_back_to_audio_pts_without_video() {
        let mut ctx = PlayerContext::new_for_test();
        ctx.audio_output = Some(Box::new(FakeAudioOutput {
            pts: Some(7.5),
            ..Default::default()
        }));
        ctx.audio_status = ChainStatus::Playing;
        ctx.update_playback_time();
        assert_eq!(ctx.playback_pts.get(), Some(7.5));
    }

    #[test]
    fn update_playback_time_leaves_pts_untouched_when_neither_chain_active() {
        let mut ctx = PlayerContext::new_for_test();
        ctx.playback_pts = crate::time::Pts::known(3.0);
        ctx.update_playback_time();
        assert_eq!(ctx.playback_pts.get(), Some(3.0));
    }

    #[test]
    fn cursor_autohide_hides_after_delay() {
        let mut ctx = PlayerContext::new_for_test();
        ctx.opts.mouse_autohide_delay = std::time::Duration::from_millis(0);
        ctx.input = Some(Box::new(FakeInput {
            mouse_counter: 1,
            ..Default::default()
        }));
        ctx.mouse_event_ts = 1;
        ctx.mouse_timer = Some(std::time::Instant::now() - std::time::Duration::from_millis(1));
        ctx.handle_cursor_autohide();
        assert!(!ctx.mouse_cursor_visible);
    }

    #[test]
    fn chapter_change_emits_event_on_transition() {
        let (mut ctx, sink) = PlayerContext::new_for_test_with_sink();
        ctx.chapters = vec![10.0, 20.0];
        ctx.last_chapter_seek = -2;
        ctx.playback_pts = crate::time::Pts::known(15.0);
        ctx.handle_chapter_change();
        assert_eq!(ctx.last_chapter, 0);
        assert_eq!(
            sink.events()
                .iter()
                .filter(|e| **e == Event::ChapterChange)
                .count(),
            1
        );
    }

    #[test]
    fn dummy_tick_only_fires_when_idle_or_paused() {
        let mut ctx = PlayerContext::new_for_test();
        ctx.paused = true;
        ctx.last_dummy_tick = std::time::Instant::now() - std::time::Duration::from_millis(60);
        ctx.handle_dummy_ticks();
        // no panic, and state advanced: last_dummy_tick reset.
        assert!(ctx.last_dummy_tick.elapsed() < std::time::Duration::from_millis(50));
    }
}
