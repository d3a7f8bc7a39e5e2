//! Presentation-timestamp sentinel type and the time/position service.

use std::time::Instant;

use crate::context::PlayerContext;

/// A presentation timestamp, or the sentinel "unknown" value.
///
/// Kept distinct from `Option<f64>` at the API boundary so call sites read
/// the same way the source material does (`pts == NOPTS` rather than
/// `pts.is_none()`), while still giving us `Option`'s combinators internally.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pts(Option<f64>);

impl Pts {
    pub const NOPTS: Pts = Pts(None);

    pub fn known(value: f64) -> Self {
        Pts(Some(value))
    }

    pub fn is_known(self) -> bool {
        self.0.is_some()
    }

    pub fn get(self) -> Option<f64> {
        self.0
    }

    pub fn or(self, fallback: Pts) -> Pts {
        if self.is_known() {
            self
        } else {
            fallback
        }
    }

    /// Clamp into `[0, duration]` if both self and duration are known.
    pub fn clamp_to(self, duration: Pts) -> Pts {
        match (self.0, duration.0) {
            (Some(v), Some(d)) => Pts(Some(v.clamp(0.0, d))),
            _ => self,
        }
    }
}

impl Default for Pts {
    fn default() -> Self {
        Pts::NOPTS
    }
}

impl PlayerContext {
    /// Seconds elapsed since the previous call; advances `last_time`.
    pub fn relative_time(&mut self) -> f64 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_time).as_secs_f64();
        self.last_time = now;
        delta
    }

    /// `playback_pts` if known, else `last_seek_pts`, else `NOPTS`.
    pub fn current_time(&self) -> Pts {
        self.playback_pts.or(self.last_seek_pts)
    }

    /// Like `current_time`, but clamps into `[0, duration]` while a seek is
    /// in flight and `playback_pts` hasn't landed yet, for display continuity.
    pub fn playback_time(&self) -> Pts {
        if !self.playback_pts.is_known() {
            return self.current_time().clamp_to(self.get_time_length());
        }
        self.current_time()
    }

    /// Demuxer-reported duration, or `NOPTS` if unknown or non-positive.
    pub fn get_time_length(&self) -> Pts {
        match self.duration {
            Some(d) if d > 0.0 => Pts::known(d),
            _ => Pts::NOPTS,
        }
    }

    /// Position ratio in `[0, 1]`, or `-1.0` if unknown.
    ///
    /// With `use_range`, clamps against the configured play-start/play-end
    /// window instead of the full duration. Falls back to a byte-position
    /// ratio when time-based positioning is unavailable.
    pub fn current_pos_ratio(&self, use_range: bool) -> f64 {
        let (start, end) = if use_range {
            (
                self.opts.play_start.unwrap_or(0.0),
                self.opts.play_end.unwrap_or_else(|| self.duration.unwrap_or(0.0)),
            )
        } else {
            (0.0, self.duration.unwrap_or(0.0))
        };

        let time_ratio = match (self.current_time().get(), self.duration) {
            (Some(pts), Some(duration)) if duration > start => {
                Some(((pts - start) / (end - start)).clamp(0.0, 1.0))
            }
            _ => None,
        };

        // A byte-based position is preferred when timestamps can reset
        // mid-stream, but only once it actually resolves; a failed byte
        // lookup still falls back to a valid time-based ratio rather than
        // discarding it.
        let ratio = if self.ts_resets_possible {
            self.byte_pos_ratio().or(time_ratio)
        } else {
            time_ratio.or_else(|| self.byte_pos_ratio())
        };

        let mut ratio = match ratio {
            Some(r) => r,
            None => return -1.0,
        };

        if let (Some(play_frames), Some(max_frames_remaining)) =
            (self.opts.play_frames, self.max_frames_remaining)
        {
            if play_frames > 0 {
                let floor = 1.0 - (max_frames_remaining as f64 / play_frames as f64);
                ratio = ratio.max(floor);
            }
        }

        ratio
    }

    fn byte_pos_ratio(&self) -> Option<f64> {
        let size = self.stream_size?;
        if size == 0 {
            return None;
        }
        Some((self.filepos as f64 / size as f64).clamp(0.0, 1.0))
    }

    /// `current_pos_ratio(true) * 100`, rounded, or `-1` if unknown.
    pub fn percent_pos(&self) -> i64 {
        let ratio = self.current_pos_ratio(true);
        if ratio < 0.0 {
            -1
        } else {
            (ratio * 100.0).round() as i64
        }
    }

    /// Greatest chapter index whose start PTS is `<=` current time, never
    /// less than `last_chapter_seek`. `-2` if there are no chapters, `-1` if
    /// before the first chapter.
    pub fn current_chapter(&self) -> i64 {
        if self.chapters.is_empty() {
            return -2;
        }
        let now = match self.current_time().get() {
            Some(pts) => pts,
            None => return self.last_chapter_seek.max(-1),
        };
        let mut found = -1i64;
        for (idx, chapter_start) in self.chapters.iter().enumerate() {
            if *chapter_start <= now {
                found = idx as i64;
            } else {
                break;
            }
        }
        self.last_chapter_seek.max(found)
    }

    pub fn chapter_start_time(&self, index: i64) -> Pts {
        if index < 0 {
            return Pts::NOPTS;
        }
        self.chapters
            .get(index as usize)
            .copied()
            .map(Pts::known)
            .unwrap_or(Pts::NOPTS)
    }

    pub fn chapter_display_name(&self, index: i64) -> Option<String> {
        if index < 0 {
            return None;
        }
        self.chapter_names.get(index as usize).cloned()
    }

    pub fn get_chapter_count(&self) -> usize {
        self.chapters.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::PlayerContext;

    #[test]
    fn current_time_falls_back_to_last_seek_pts() {
        let mut ctx = PlayerContext::new_for_test();
        ctx.playback_pts = Pts::NOPTS;
        ctx.last_seek_pts = Pts::known(12.5);
        assert_eq!(ctx.current_time(), Pts::known(12.5));
    }

    #[test]
    fn chapter_lookup_before_first() {
        let mut ctx = PlayerContext::new_for_test();
        ctx.chapters = vec![10.0, 20.0, 30.0];
        ctx.playback_pts = Pts::known(5.0);
        assert_eq!(ctx.current_chapter(), -1);
    }

    #[test]
    fn chapter_lookup_picks_latest_reached() {
        let mut ctx = PlayerContext::new_for_test();
        ctx.chapters = vec![10.0, 20.0, 30.0];
        ctx.playback_pts = Pts::known(25.0);
        assert_eq!(ctx.current_chapter(), 1);
    }

    #[test]
    fn chapter_count_with_no_chapters_is_sentinel() {
        let ctx = PlayerContext::new_for_test();
        assert_eq!(ctx.current_chapter(), -2);
    }

    #[test]
    fn percent_pos_unknown_without_duration() {
        let ctx = PlayerContext::new_for_test();
        assert_eq!(ctx.percent_pos(), -1);
    }

    #[test]
    fn chapter_index_still_advances_past_an_explicit_chapter_seek() {
        let mut ctx = PlayerContext::new_for_test();
        ctx.chapters = vec![10.0, 20.0, 30.0];
        ctx.last_chapter_seek = 0;
        ctx.playback_pts = Pts::known(25.0);
        assert_eq!(ctx.current_chapter(), 1);
    }

    #[test]
    fn chapter_seek_floor_holds_until_playback_catches_up() {
        let mut ctx = PlayerContext::new_for_test();
        ctx.chapters = vec![10.0, 20.0, 30.0];
        ctx.last_chapter_seek = 2;
        ctx.playback_pts = Pts::known(5.0);
        assert_eq!(ctx.current_chapter(), 2);
    }

    #[test]
    fn pos_ratio_falls_back_to_time_when_byte_position_unavailable() {
        let mut ctx = PlayerContext::new_for_test();
        ctx.duration = Some(100.0);
        ctx.ts_resets_possible = true;
        ctx.stream_size = None;
        ctx.playback_pts = Pts::known(25.0);
        assert_eq!(ctx.current_pos_ratio(false), 0.25);
    }

    #[test]
    fn pos_ratio_prefers_byte_position_when_ts_resets_possible() {
        let mut ctx = PlayerContext::new_for_test();
        ctx.duration = Some(100.0);
        ctx.ts_resets_possible = true;
        ctx.stream_size = Some(1000);
        ctx.filepos = 250;
        ctx.playback_pts = Pts::known(25.0);
        assert_eq!(ctx.current_pos_ratio(false), 0.25);

        ctx.filepos = 500;
        assert_eq!(ctx.current_pos_ratio(false), 0.5);
    }
}
