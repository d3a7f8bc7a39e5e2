//! Restart synchronizer: the audio/video ready barrier.

use log::info;

use crate::context::PlayerContext;
use crate::events::Event;
use crate::status::ChainStatus;

impl PlayerContext {
    /// Run once per tick (play loop driver step 7). Gates on both chains
    /// reaching at least READY, then PLAYING, before `restart_complete`
    /// can be set and `PLAYBACK_RESTART` emitted.
    pub fn handle_playback_restart(&mut self) {
        let has_audio = self.audio_output.is_some();
        let has_video = self.video_output.is_some();

        let audio_ready = ChainStatus::at_least(has_audio, self.audio_status, ChainStatus::Ready);
        let video_ready = ChainStatus::at_least(has_video, self.video_status, ChainStatus::Ready);
        if !audio_ready || !video_ready {
            return;
        }

        if self.opts.cache_pause_initial
            && ((has_audio && self.audio_status == ChainStatus::Ready)
                || (has_video && self.video_status == ChainStatus::Ready))
        {
            self.paused_for_cache = true;
            self.cache_buffer = 0.0;
            self.update_internal_pause_state();
        }

        if has_video && self.video_status == ChainStatus::Ready {
            self.video_status = ChainStatus::Playing;
            let _ = self.relative_time();
        }

        if has_audio && self.audio_status == ChainStatus::Ready {
            if !self.seek.is_none() && has_video && self.video_status == ChainStatus::Playing {
                self.update_playback_time();
                self.execute_queued_seek().ok();
                return;
            }
            self.audio_status = ChainStatus::Playing;
        }

        let audio_playing = ChainStatus::at_least(has_audio, self.audio_status, ChainStatus::Playing);
        let video_playing = ChainStatus::at_least(has_video, self.video_status, ChainStatus::Playing);

        if audio_playing && video_playing && !self.restart_complete {
            self.hrseek_active = false;
            self.restart_complete = true;
            self.current_seek = crate::seek::SeekRequest::none();
            self.audio_allow_second_chance_seek = false;
            self.emit(Event::PlaybackRestart);

            if !self.playing_msg_shown {
                self.playing_msg_shown = true;
                info!("playback restarted");
            }

            self.wakeup();
            let ab_end = self.opts.ab_loop_b.unwrap_or(f64::INFINITY);
            self.ab_loop_clip = self.last_seek_pts.get().unwrap_or(f64::NEG_INFINITY) < ab_end;
        }
    }
}
