//! Pause arbiter: combines user intent and cache-driven pause.

use log::debug;

use crate::context::PlayerContext;
use crate::events::Event;

impl PlayerContext {
    /// Apply a user pause/resume request, re-arbitrate the effective paused
    /// state against `paused_for_cache`, and propagate to the outputs.
    pub fn set_pause_state(&mut self, user_pause: bool) {
        let opts_pause_changed = self.opts.pause != user_pause;
        self.opts.pause = user_pause;

        self.update_internal_pause_state();

        if opts_pause_changed {
            self.emit(if user_pause {
                Event::Pause
            } else {
                Event::Unpause
            });
        }
    }

    /// Idempotent re-arbitration, used directly whenever `paused_for_cache`
    /// changes without a user-facing pause/resume request.
    pub fn update_internal_pause_state(&mut self) {
        let effective = self.opts.pause || self.paused_for_cache;
        if effective != self.paused {
            self.paused = effective;
            debug!("paused -> {effective}");

            if let Some(audio) = self.audio_output.as_mut() {
                if effective {
                    audio.pause();
                } else {
                    audio.resume();
                }
            }
            if let Some(video) = self.video_output.as_mut() {
                video.set_paused(effective);
                video.redraw();
            }

            if effective {
                self.step_frames = 0;
                self.step_dir = 0;
            } else {
                let _ = self.relative_time();
            }

            self.wakeup();
        }

        if self.update_core_idle_state() {
            self.update_screensaver_state();
        }
    }
}
