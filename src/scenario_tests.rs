//! End-to-end scenario tests exercising full context + fake collaborators,
//! one per documented scenario rather than a mechanical round-trip grid.

#![cfg(test)]

use crate::collaborators::{CacheInfo, DemuxerProperties, ReaderState};
use crate::context::PlayerContext;
use crate::options::{HrSeek, KeepOpen};
use crate::seek::{Exactness, SeekFlags, SeekType};
use crate::status::{ChainStatus, StopPlay};
use crate::testing::{FakeAudioOutput, FakeDemuxer, FakeVideoOutput};

#[test]
fn absolute_exact_seek_triggers_hr_seek_with_offset() {
    let mut ctx = PlayerContext::new_for_test();
    ctx.opts.correct_pts = true;
    ctx.opts.hr_seek = HrSeek::Absolute;
    ctx.opts.hr_seek_demuxer_offset = 0.1;
    ctx.demuxer = Some(Box::new(FakeDemuxer::default()));
    ctx.playback_pts = crate::time::Pts::known(10.0);

    ctx.queue_seek(SeekType::Absolute, 42.0, Exactness::Exact, SeekFlags::empty());
    ctx.execute_queued_seek().unwrap();

    assert!(ctx.hrseek_active);
    assert_eq!(ctx.hrseek_pts.get(), Some(42.0));
    assert!(!ctx.restart_complete);
}

#[test]
fn coalesced_relative_seeks_accumulate_before_execution() {
    let mut ctx = PlayerContext::new_for_test();
    ctx.queue_seek(SeekType::Relative, 5.0, Exactness::Default, SeekFlags::empty());
    ctx.queue_seek(SeekType::Relative, 3.0, Exactness::Exact, SeekFlags::empty());

    assert_eq!(ctx.seek.kind, SeekType::Relative);
    assert_eq!(ctx.seek.amount, 8.0);
    assert_eq!(ctx.seek.exact, Exactness::Exact);
}

#[test]
fn cache_buffering_cycle_pauses_then_resumes() {
    let mut ctx = PlayerContext::new_for_test();
    ctx.restart_complete = true;
    ctx.audio_output = Some(Box::new(FakeAudioOutput::default()));
    ctx.opts.cache_pause = true;
    ctx.opts.cache_pause_wait = 1.0;
    ctx.demuxer = Some(Box::new(FakeDemuxer {
        reader_state: ReaderState {
            underrun: true,
            ..Default::default()
        },
        cache_info: CacheInfo { idle: false, size: 1 },
        properties: DemuxerProperties::default(),
        ..Default::default()
    }));

    ctx.handle_pause_on_low_cache();
    assert!(ctx.paused_for_cache);
    assert!(ctx.paused);

    ctx.demuxer = Some(Box::new(FakeDemuxer {
        reader_state: ReaderState {
            underrun: false,
            ts_duration: 2.0,
            ..Default::default()
        },
        cache_info: CacheInfo { idle: true, size: 1 },
        properties: DemuxerProperties::default(),
        ..Default::default()
    }));
    ctx.handle_pause_on_low_cache();
    assert!(!ctx.paused_for_cache);
    assert!(!ctx.paused);
}

#[test]
fn keep_open_at_eof_freezes_on_last_frame() {
    let mut ctx = PlayerContext::new_for_test();
    ctx.audio_output = Some(Box::new(FakeAudioOutput::default()));
    ctx.video_output = Some(Box::new(FakeVideoOutput {
        has_frame: true,
        ..Default::default()
    }));
    ctx.audio_status = ChainStatus::Eof;
    ctx.video_status = ChainStatus::Eof;
    ctx.opts.keep_open = KeepOpen::Always;
    ctx.opts.keep_open_pause = true;
    ctx.last_vo_pts = crate::time::Pts::known(120.0);

    ctx.handle_eof_loop_keep_open();

    assert_eq!(ctx.stop_play, StopPlay::KeepPlaying);
    assert_eq!(ctx.playback_pts.get(), Some(120.0));
    assert!(ctx.paused);
}

#[test]
fn ab_loop_wraps_at_end() {
    let mut ctx = PlayerContext::new_for_test();
    ctx.audio_output = Some(Box::new(FakeAudioOutput::default()));
    ctx.video_output = Some(Box::new(FakeVideoOutput {
        has_frame: true,
        ..Default::default()
    }));
    ctx.audio_status = ChainStatus::Eof;
    ctx.video_status = ChainStatus::Eof;
    ctx.opts.ab_loop_a = Some(30.0);
    ctx.opts.ab_loop_b = Some(60.0);

    ctx.handle_eof_loop_keep_open();

    assert_eq!(ctx.stop_play, StopPlay::KeepPlaying);
    assert_eq!(ctx.seek.kind, SeekType::Absolute);
    assert_eq!(ctx.seek.amount, 30.0);
    assert!(ctx.seek.flags.contains(SeekFlags::NOFLUSH));
}

#[test]
fn delayed_continuous_seek_is_deferred() {
    let mut ctx = PlayerContext::new_for_test();
    ctx.demuxer = Some(Box::new(FakeDemuxer::default()));
    ctx.video_status = ChainStatus::Ready;
    ctx.queue_seek(
        SeekType::Relative,
        1.0,
        Exactness::Default,
        SeekFlags::DELAY,
    );
    ctx.start_timestamp = Some(std::time::Instant::now() - std::time::Duration::from_millis(100));

    ctx.execute_queued_seek().unwrap();

    assert!(!ctx.seek.is_none());
    assert_eq!(ctx.seek.kind, SeekType::Relative);
}
