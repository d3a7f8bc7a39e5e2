//! Force-window / idle-mode video output management.

use log::error;

use crate::context::PlayerContext;
use crate::error::CoreError;
use crate::events::Event;
use crate::options::ForceVo;

const FORCE_WINDOW_WIDTH: u32 = 960;
const FORCE_WINDOW_HEIGHT: u32 = 480;

impl PlayerContext {
    /// Create or tear down a window-only video output for states with no
    /// real video, per the configured `force_vo` mode.
    pub fn handle_force_window(&mut self, force: bool) {
        let real_video_live = self.video_output.is_some() && !self.force_window_active;
        // A track is selected but no frame has ever arrived.
        let stalled = self.video_output.is_some()
            && self.video_status == crate::status::ChainStatus::None
            && self.video_pts == crate::time::Pts::NOPTS;

        if real_video_live && !stalled {
            return;
        }

        let act_moment = !self.playback_active || !self.restart_complete || force || stalled;
        if !act_moment {
            return;
        }

        match self.opts.force_vo {
            ForceVo::Off => {
                if self.force_window_active {
                    self.tear_down_force_window();
                }
            }
            ForceVo::WhenIdle | ForceVo::Always => {
                if let Err(err) = self.create_force_window() {
                    error!("force-window init failed: {err}");
                    self.opts.force_vo = ForceVo::Off;
                    self.tear_down_force_window();
                }
            }
        }
    }

    fn create_force_window(&mut self) -> Result<(), CoreError> {
        let video = self
            .video_output
            .as_mut()
            .ok_or_else(|| CoreError::ForceWindowInit("no video output collaborator".into()))?;
        video.reconfig(FORCE_WINDOW_WIDTH, FORCE_WINDOW_HEIGHT)?;
        video.set_paused(true);
        video.redraw();
        self.force_window_active = true;
        self.emit(Event::VideoReconfig);
        Ok(())
    }

    fn tear_down_force_window(&mut self) {
        self.force_window_active = false;
    }

    /// Reduced idle loop: uninit audio on first entry, force the window up,
    /// emit `IDLE`, then tick the housekeeping handlers until a playlist
    /// entry becomes current or quit is requested.
    pub fn idle_loop(&mut self) {
        if self.audio_output.is_some() {
            self.audio_output = None;
        }
        self.handle_force_window(true);
        self.emit(Event::Idle);
        self.mp_idle();
    }

    /// One reduced-loop tick while idle: dummy ticks, wait, input, cursor
    /// autohide, VO events, OSD update/redraw.
    fn mp_idle(&mut self) {
        self.handle_dummy_ticks();
        self.wait_events();
        self.process_input();
        self.handle_cursor_autohide();
        self.handle_vo_events();
        self.handle_osd_redraw();
    }
}

#[cfg(test)]
mod tests {
    use crate::context::PlayerContext;
    use crate::options::ForceVo;
    use crate::testing::FakeVideoOutput;

    #[test]
    fn force_vo_always_creates_window_on_blank_collaborator() {
        let mut ctx = PlayerContext::new_for_test();
        ctx.video_output = Some(Box::new(FakeVideoOutput::default()));
        ctx.force_window_active = false;
        ctx.opts.force_vo = ForceVo::Always;
        ctx.handle_force_window(true);
        assert!(ctx.force_window_active);
    }

    #[test]
    fn force_vo_init_failure_without_collaborator_disables_force_vo() {
        let mut ctx = PlayerContext::new_for_test();
        ctx.opts.force_vo = ForceVo::Always;
        ctx.handle_force_window(true);
        assert_eq!(ctx.opts.force_vo, ForceVo::Off);
        assert!(!ctx.force_window_active);
    }

    #[test]
    fn force_vo_off_tears_down() {
        let mut ctx = PlayerContext::new_for_test();
        ctx.video_output = Some(Box::new(FakeVideoOutput::default()));
        ctx.force_window_active = true;
        ctx.opts.force_vo = ForceVo::Off;
        ctx.handle_force_window(true);
        assert!(!ctx.force_window_active);
    }
}
