//! Seek planner: queue coalescing, the execution gate, and the inner seek.

use std::time::{Duration, Instant};

use bitflags::bitflags;
use log::warn;

use crate::context::PlayerContext;
use crate::error::CoreError;
use crate::events::Event;
use crate::status::StopPlay;
use crate::time::Pts;

/// Kind of seek request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeekType {
    #[default]
    None,
    Absolute,
    Relative,
    Factor,
    Backstep,
}

/// Precision requested for a seek, ordered weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Exactness {
    Keyframe,
    #[default]
    Default,
    Exact,
    VeryExact,
}

bitflags! {
    /// Flags accompanying a seek request. `HR` and `FORWARD` are mutually
    /// exclusive by construction; the demuxer trait is never asked to
    /// reconcile the two itself.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SeekFlags: u8 {
        const DELAY = 0b0000_0001;
        const NOFLUSH = 0b0000_0010;
        const FORWARD = 0b0000_0100;
        const HR = 0b0000_1000;
        const FACTOR = 0b0001_0000;
        const CACHED = 0b0010_0000;
    }
}

/// A pending or active seek request.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SeekRequest {
    pub kind: SeekType,
    pub amount: f64,
    pub exact: Exactness,
    pub flags: SeekFlags,
}

impl SeekRequest {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_none(&self) -> bool {
        self.kind == SeekType::None
    }
}

const CONTINUOUS_SEEK_DEFER: Duration = Duration::from_millis(300);
/// Empirical floor for the hr-seek demuxer offset at `VeryExact` precision.
const VERY_EXACT_HR_OFFSET_FLOOR: f64 = 0.5;

impl PlayerContext {
    /// Merge a seek request into the pending one per the coalescing rules.
    ///
    /// Relative-into-factor is intentionally dropped: not common enough to
    /// warrant a defined merge.
    pub fn queue_seek(&mut self, kind: SeekType, amount: f64, exact: Exactness, flags: SeekFlags) {
        match kind {
            SeekType::None => {
                self.seek = SeekRequest::none();
            }
            SeekType::Relative => match self.seek.kind {
                SeekType::Factor => {
                    // dropped: relative-into-factor is not a defined merge.
                }
                SeekType::Absolute | SeekType::Relative => {
                    self.seek.amount += amount;
                    self.seek.exact = self.seek.exact.max(exact);
                    self.seek.flags |= flags;
                }
                SeekType::None | SeekType::Backstep => {
                    self.seek = SeekRequest {
                        kind: SeekType::Relative,
                        amount,
                        exact,
                        flags,
                    };
                }
            },
            SeekType::Absolute | SeekType::Factor | SeekType::Backstep => {
                self.seek = SeekRequest {
                    kind,
                    amount,
                    exact,
                    flags,
                };
            }
        }

        if self.stop_play == StopPlay::AtEndOfFile {
            self.stop_play = StopPlay::KeepPlaying;
        }
        self.wakeup();
    }

    /// Run at the end of a tick iff a seek is pending. May defer rather than
    /// commit, per the continuous-seek heuristics.
    pub fn execute_queued_seek(&mut self) -> Result<(), CoreError> {
        if self.seek.is_none() {
            return Ok(());
        }

        if self.seek.exact == Exactness::Keyframe && self.hrseek_active {
            self.start_timestamp = None;
        }

        if self.seek.flags.contains(SeekFlags::DELAY)
            && self.video_status < crate::status::ChainStatus::Playing
        {
            if let Some(started) = self.start_timestamp {
                if started.elapsed() < CONTINUOUS_SEEK_DEFER {
                    return Ok(());
                }
            }
        }

        let request = self.seek;
        self.seek = SeekRequest::none();
        self.perform_seek(request)
    }

    /// The inner seek algorithm, given a fully-formed request.
    fn perform_seek(&mut self, request: SeekRequest) -> Result<(), CoreError> {
        if self.demuxer.is_none() || request.is_none() {
            return Ok(());
        }

        let current_time = match self.current_time().get() {
            Some(t) => Some(t),
            None if request.kind == SeekType::Relative => return Ok(()),
            None => None,
        };
        if request.amount.is_nan() {
            return Ok(());
        }

        let mut flags = request.flags;
        let seek_pts = match request.kind {
            SeekType::Absolute => request.amount,
            SeekType::Backstep => current_time.unwrap_or(0.0),
            SeekType::Relative => {
                if request.amount > 0.0 {
                    flags |= SeekFlags::FORWARD;
                }
                current_time.unwrap_or(0.0) + request.amount
            }
            SeekType::Factor => match self.duration {
                Some(d) if d >= 0.0 => request.amount * d,
                _ => f64::NAN,
            },
            SeekType::None => unreachable!("guarded above"),
        };

        let mut exact = request.exact;
        if request.kind == SeekType::Backstep {
            exact = exact.max(Exactness::VeryExact);
        }

        let hr_seek = self.opts.correct_pts
            && exact != Exactness::Keyframe
            && (self.opts.hr_seek == crate::options::HrSeek::Always
                || exact >= Exactness::Exact
                || (self.opts.hr_seek == crate::options::HrSeek::Absolute
                    && request.kind == SeekType::Absolute))
            && !seek_pts.is_nan();

        let target = if request.kind == SeekType::Factor
            && !hr_seek
            && (self.ts_resets_possible || seek_pts.is_nan())
        {
            flags |= SeekFlags::FACTOR;
            request.amount
        } else {
            seek_pts
        };

        let mut demux_target = target;
        if hr_seek {
            let mut offset = self.opts.hr_seek_demuxer_offset;
            if exact == Exactness::VeryExact {
                offset = offset.max(VERY_EXACT_HR_OFFSET_FLOOR);
            }
            offset += self.intrinsic_track_offset;
            demux_target -= offset;
            flags |= SeekFlags::HR;
            flags.remove(SeekFlags::FORWARD);
        }

        if !self.seekable {
            flags |= SeekFlags::CACHED;
        }

        if let Err(rejected) = self.demuxer_seek(demux_target, flags) {
            warn!("seek to {demux_target} rejected by demuxer");
            return Err(rejected);
        }

        for track in &self.external_track_offsets {
            let pts = if hr_seek && !track.is_external_source {
                demux_target
            } else if flags.contains(SeekFlags::FACTOR) {
                request.amount
            } else {
                demux_target + track.offset
            };
            let _ = self.demuxer_seek_track(track.id, pts);
        }

        if !flags.contains(SeekFlags::NOFLUSH) {
            self.clear_audio_buffers();
        }

        self.reset_playback_state();
        self.notify_encoder_discontinuity();

        self.last_seek_pts = if seek_pts.is_nan() {
            Pts::NOPTS
        } else {
            Pts::known(seek_pts)
        };
        if hr_seek {
            self.hrseek_active = true;
            self.hrseek_pts = Pts::known(seek_pts);
            self.hrseek_framedrop = exact != Exactness::VeryExact && self.opts.framedrop;
            self.hrseek_backstep = request.kind == SeekType::Backstep;
        }

        if self.stop_play == StopPlay::AtEndOfFile {
            self.stop_play = StopPlay::KeepPlaying;
        }

        self.start_timestamp = Some(Instant::now());
        self.wakeup();
        self.emit(Event::Seek);
        self.emit(Event::Tick);

        self.audio_allow_second_chance_seek = !hr_seek && !flags.contains(SeekFlags::FORWARD);

        let ab_end = self.opts.ab_loop_b.unwrap_or(f64::INFINITY);
        self.ab_loop_clip = seek_pts < ab_end;

        self.current_seek = request;

        Ok(())
    }

    /// Clear filters/decoders/subsystems and every hr-seek sub-flag, the way
    /// a fresh load or seek must before the restart barrier can re-arm.
    pub fn reset_playback_state(&mut self) {
        self.hrseek_active = false;
        self.hrseek_framedrop = false;
        self.hrseek_backstep = false;
        self.hrseek_lastframe = false;
        self.hrseek_pts = Pts::NOPTS;
        self.current_seek = SeekRequest::none();

        self.playback_pts = Pts::NOPTS;
        self.last_seek_pts = Pts::NOPTS;
        self.step_frames = 0;
        self.ab_loop_clip = true;
        self.restart_complete = false;

        self.reset_decoders_and_filters();
        self.update_core_idle_state();
    }
}

#[cfg(test)]
mod tests {
    use crate::context::PlayerContext;
    use crate::seek::{Exactness, SeekFlags, SeekType};
    use crate::testing::FakeDemuxer;
    use crate::time::Pts;

    #[test]
    fn factor_seek_with_unknown_duration_keeps_last_seek_pts_nopts() {
        let mut ctx = PlayerContext::new_for_test();
        ctx.demuxer = Some(Box::new(FakeDemuxer::default()));
        ctx.duration = None;

        ctx.queue_seek(SeekType::Factor, 0.5, Exactness::Default, SeekFlags::empty());
        ctx.execute_queued_seek().unwrap();

        assert_eq!(ctx.last_seek_pts, Pts::NOPTS);
    }

    #[test]
    fn absolute_seek_records_last_seek_pts() {
        let mut ctx = PlayerContext::new_for_test();
        ctx.demuxer = Some(Box::new(FakeDemuxer::default()));

        ctx.queue_seek(SeekType::Absolute, 10.0, Exactness::Default, SeekFlags::empty());
        ctx.execute_queued_seek().unwrap();

        assert_eq!(ctx.last_seek_pts.get(), Some(10.0));
    }
}
