//! The core's own tunable parameter set.
//!
//! This is not configuration-file loading: it is the parameter bag a caller
//! populates on a `PlayerContext` the way a caller configures any stateful
//! library object, mirroring the one-struct-many-setters shape of the
//! teacher's buffer/fade tuning settings. `Options` is `Serialize`/
//! `Deserialize` so a host process can hand it across an IPC boundary
//! (a config file or socket) rather than build it field by field in-process.

use serde::{Deserialize, Serialize};

/// Hr-seek activation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HrSeek {
    Never,
    #[default]
    Absolute,
    Always,
}

/// File-loop policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoopFile {
    #[default]
    None,
    Finite(u32),
    Infinite,
}

/// Keep-open policy at end-of-file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KeepOpen {
    #[default]
    No,
    Yes,
    Always,
}

/// Force-window activation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ForceVo {
    #[default]
    Off,
    WhenIdle,
    Always,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub pause: bool,
    pub hr_seek: HrSeek,
    pub hr_seek_demuxer_offset: f64,
    pub correct_pts: bool,
    pub framedrop: bool,
    pub cache_pause: bool,
    pub cache_pause_initial: bool,
    pub cache_pause_wait: f64,
    pub loop_file: LoopFile,
    pub ab_loop_a: Option<f64>,
    pub ab_loop_b: Option<f64>,
    pub keep_open: KeepOpen,
    pub keep_open_pause: bool,
    pub force_vo: ForceVo,
    pub step_sec: f64,
    pub mouse_autohide_delay: std::time::Duration,
    pub has_next_playlist_entry: bool,
    pub play_start: Option<f64>,
    pub play_end: Option<f64>,
    pub play_frames: Option<u64>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            pause: false,
            hr_seek: HrSeek::default(),
            hr_seek_demuxer_offset: 0.0,
            correct_pts: true,
            framedrop: false,
            cache_pause: true,
            cache_pause_initial: false,
            cache_pause_wait: 1.0,
            loop_file: LoopFile::default(),
            ab_loop_a: None,
            ab_loop_b: None,
            keep_open: KeepOpen::default(),
            keep_open_pause: true,
            force_vo: ForceVo::default(),
            step_sec: 0.0,
            mouse_autohide_delay: std::time::Duration::from_secs(1),
            has_next_playlist_entry: false,
            play_start: None,
            play_end: None,
            play_frames: None,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_hr_seek(&mut self, mode: HrSeek) -> &mut Self {
        self.hr_seek = mode;
        self
    }

    pub fn set_hr_seek_demuxer_offset(&mut self, offset: f64) -> &mut Self {
        self.hr_seek_demuxer_offset = offset.max(0.0);
        self
    }

    pub fn set_cache_pause(&mut self, enabled: bool) -> &mut Self {
        self.cache_pause = enabled;
        self
    }

    pub fn set_cache_pause_initial(&mut self, enabled: bool) -> &mut Self {
        self.cache_pause_initial = enabled;
        self
    }

    pub fn set_cache_pause_wait(&mut self, seconds: f64) -> &mut Self {
        self.cache_pause_wait = seconds.max(0.0);
        self
    }

    pub fn set_loop_file(&mut self, mode: LoopFile) -> &mut Self {
        self.loop_file = mode;
        self
    }

    pub fn set_ab_loop(&mut self, a: Option<f64>, b: Option<f64>) -> &mut Self {
        self.ab_loop_a = a;
        self.ab_loop_b = b;
        self
    }

    pub fn set_keep_open(&mut self, mode: KeepOpen) -> &mut Self {
        self.keep_open = mode;
        self
    }

    pub fn set_keep_open_pause(&mut self, enabled: bool) -> &mut Self {
        self.keep_open_pause = enabled;
        self
    }

    pub fn set_force_vo(&mut self, mode: ForceVo) -> &mut Self {
        self.force_vo = mode;
        self
    }

    pub fn set_step_sec(&mut self, seconds: f64) -> &mut Self {
        self.step_sec = seconds.max(0.0);
        self
    }

    pub fn set_mouse_autohide_delay(&mut self, delay: std::time::Duration) -> &mut Self {
        self.mouse_autohide_delay = delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let mut opts = Options::new();
        opts.set_hr_seek(HrSeek::Always)
            .set_cache_pause_wait(2.5)
            .set_keep_open(KeepOpen::Always);

        let json = serde_json::to_string(&opts).unwrap();
        let restored: Options = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.hr_seek, HrSeek::Always);
        assert_eq!(restored.cache_pause_wait, 2.5);
        assert_eq!(restored.keep_open, KeepOpen::Always);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let restored: Options = serde_json::from_str("{}").unwrap();
        assert_eq!(restored.hr_seek, HrSeek::default());
        assert_eq!(restored.cache_pause_wait, Options::default().cache_pause_wait);
    }
}
