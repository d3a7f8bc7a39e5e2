//! EOF detector, A-B/file loop, keep-open policy, and single-step handling.

use crate::context::PlayerContext;
use crate::options::{KeepOpen, LoopFile};
use crate::seek::{Exactness, SeekFlags, SeekType};
use crate::status::{ChainStatus, StopPlay};

impl PlayerContext {
    /// Run each tick, in order: EOF detection, A-B loop, file loop,
    /// keep-open, then single-step, then a core-idle recompute.
    pub fn handle_eof_loop_keep_open(&mut self) {
        self.detect_eof();
        if !self.handle_ab_loop() {
            self.handle_file_loop();
        }
        self.handle_keep_open();
        self.handle_sstep();
        self.update_core_idle_state();
    }

    fn detect_eof(&mut self) {
        let has_audio = self.audio_output.is_some();
        let has_video = self.video_output.is_some();
        if !has_audio && !has_video {
            return;
        }

        let prevent_eof = self.paused
            && self
                .video_output
                .as_ref()
                .map(|vo| vo.has_frame())
                .unwrap_or(false);
        if prevent_eof {
            return;
        }

        let audio_eof = !has_audio || self.audio_status == ChainStatus::Eof;
        let video_eof = !has_video || self.video_status == ChainStatus::Eof;
        if audio_eof && video_eof {
            self.stop_play = StopPlay::AtEndOfFile;
        }
    }

    /// Returns `true` if an A-B loop seek was queued (so file-loop is
    /// skipped this tick).
    fn handle_ab_loop(&mut self) -> bool {
        if self.stop_play != StopPlay::AtEndOfFile {
            return false;
        }
        if self.opts.ab_loop_a.is_none() && self.opts.ab_loop_b.is_none() {
            return false;
        }
        let target = self.opts.ab_loop_a.unwrap_or(0.0);
        self.queue_seek(
            SeekType::Absolute,
            target,
            Exactness::Exact,
            SeekFlags::NOFLUSH,
        );
        self.stop_play = StopPlay::KeepPlaying;
        true
    }

    fn handle_file_loop(&mut self) {
        if self.stop_play != StopPlay::AtEndOfFile {
            return;
        }
        match self.opts.loop_file {
            LoopFile::None => {}
            LoopFile::Infinite => {
                self.queue_seek(SeekType::Absolute, 0.0, Exactness::Default, SeekFlags::NOFLUSH);
            }
            LoopFile::Finite(remaining) => {
                self.queue_seek(SeekType::Absolute, 0.0, Exactness::Default, SeekFlags::NOFLUSH);
                self.opts.loop_file = if remaining > 1 {
                    LoopFile::Finite(remaining - 1)
                } else {
                    LoopFile::None
                };
            }
        }
    }

    fn handle_keep_open(&mut self) {
        if self.stop_play != StopPlay::AtEndOfFile {
            return;
        }
        let keep_open_applies = match self.opts.keep_open {
            KeepOpen::Always => true,
            KeepOpen::Yes => !self.opts.has_next_playlist_entry,
            KeepOpen::No => false,
        };
        if !keep_open_applies {
            return;
        }

        self.stop_play = StopPlay::KeepPlaying;

        let has_frame = self
            .video_output
            .as_ref()
            .map(|vo| vo.has_frame())
            .unwrap_or(true);
        if !has_frame {
            self.seek_to_last_frame();
        }
        self.playback_pts = self.last_vo_pts;

        if self.opts.keep_open_pause {
            self.set_pause_state(true);
        }
    }

    /// Seek to the last frame so keep-open has something to freeze on.
    /// Guarded to run at most once per load.
    fn seek_to_last_frame(&mut self) {
        if self.last_frame_seeked {
            return;
        }
        self.last_frame_seeked = true;

        let target = self.opts.play_end.or(self.duration).unwrap_or(0.0);
        self.queue_seek(
            SeekType::Absolute,
            target,
            Exactness::VeryExact,
            SeekFlags::empty(),
        );
        self.execute_queued_seek().ok();

        if self.hrseek_active {
            self.hrseek_pts = crate::time::Pts::known(f64::INFINITY);
            self.hrseek_lastframe = true;
        }
    }

    /// `step_sec > 0` and unpaused: queue a relative seek of that size
    /// (auto-advance single-stepping through a file).
    fn handle_sstep(&mut self) {
        if self.stop_play != StopPlay::KeepPlaying || !self.restart_complete {
            return;
        }

        if self.opts.step_sec > 0.0 && !self.paused {
            self.queue_seek(
                SeekType::Relative,
                self.opts.step_sec,
                Exactness::Default,
                SeekFlags::empty(),
            );
        }

        let frames_remain_in_budget = self.opts.play_frames.is_some()
            && self.max_frames_remaining.unwrap_or(0) > 0;
        if self.video_status == ChainStatus::Eof && frames_remain_in_budget {
            self.stop_play = StopPlay::AtEndOfFile;
        }
        if self.step_frames > 0 && !self.paused {
            self.set_pause_state(true);
        }
    }

    /// Accumulate a pending single-step in `dir`'s direction; a reversal
    /// discards the previous count rather than partially offsetting it.
    pub fn add_step_frame(&mut self, dir: i8) {
        if self.step_dir != 0 && self.step_dir != dir.signum() {
            self.step_frames = 0;
        }
        self.step_dir = dir.signum();
        self.step_frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use crate::context::PlayerContext;
    use crate::seek::SeekType;
    use crate::status::{ChainStatus, StopPlay};
    use crate::testing::{FakeAudioOutput, FakeVideoOutput};

    fn ctx_at_eof() -> PlayerContext {
        let mut ctx = PlayerContext::new_for_test();
        ctx.audio_output = Some(Box::new(FakeAudioOutput::default()));
        ctx.video_output = Some(Box::new(FakeVideoOutput {
            has_frame: true,
            ..Default::default()
        }));
        ctx.audio_status = ChainStatus::Eof;
        ctx.video_status = ChainStatus::Eof;
        ctx
    }

    #[test]
    fn ab_loop_wraps_to_a_endpoint() {
        let mut ctx = ctx_at_eof();
        ctx.opts.ab_loop_a = Some(30.0);
        ctx.opts.ab_loop_b = Some(60.0);
        ctx.handle_eof_loop_keep_open();
        assert_eq!(ctx.stop_play, StopPlay::KeepPlaying);
        assert_eq!(ctx.seek.kind, SeekType::Absolute);
        assert_eq!(ctx.seek.amount, 30.0);
    }

    #[test]
    fn keep_open_always_freezes_at_eof() {
        let mut ctx = ctx_at_eof();
        ctx.opts.keep_open = crate::options::KeepOpen::Always;
        ctx.opts.keep_open_pause = true;
        ctx.handle_eof_loop_keep_open();
        assert_eq!(ctx.stop_play, StopPlay::KeepPlaying);
        assert!(ctx.paused);
    }

    #[test]
    fn plain_eof_without_loop_or_keep_open_stops() {
        let mut ctx = ctx_at_eof();
        ctx.handle_eof_loop_keep_open();
        assert_eq!(ctx.stop_play, StopPlay::AtEndOfFile);
    }

    #[test]
    fn sstep_does_not_resurrect_unresolved_eof() {
        let mut ctx = PlayerContext::new_for_test();
        ctx.stop_play = StopPlay::AtEndOfFile;
        ctx.opts.step_sec = 1.0;
        ctx.handle_sstep();
        assert!(ctx.seek.is_none());
        assert_eq!(ctx.stop_play, StopPlay::AtEndOfFile);
    }

    #[test]
    fn sstep_coerces_eof_only_with_frame_budget_remaining() {
        let mut ctx = PlayerContext::new_for_test();
        ctx.restart_complete = true;
        ctx.video_status = ChainStatus::Eof;
        ctx.step_frames = 3;
        ctx.handle_sstep();
        assert_eq!(ctx.stop_play, StopPlay::KeepPlaying);

        ctx.opts.play_frames = Some(10);
        ctx.max_frames_remaining = Some(4);
        ctx.handle_sstep();
        assert_eq!(ctx.stop_play, StopPlay::AtEndOfFile);
    }

    #[test]
    fn add_step_frame_reversal_resets_count() {
        let mut ctx = PlayerContext::new_for_test();
        ctx.add_step_frame(1);
        ctx.add_step_frame(1);
        assert_eq!(ctx.step_frames, 2);
        ctx.add_step_frame(-1);
        assert_eq!(ctx.step_frames, 1);
    }
}
