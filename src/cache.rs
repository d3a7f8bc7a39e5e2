//! Cache / buffering controller.

use std::time::{Duration, Instant};

use crate::context::PlayerContext;
use crate::events::Event;

const CACHE_PAUSE_REPOLL: Duration = Duration::from_millis(200);
const CACHE_UPDATE_INTERVAL: Duration = Duration::from_millis(250);

impl PlayerContext {
    /// Per-tick cache/buffering handler. Only engages once the restart
    /// barrier has completed and the source is cache-capable.
    pub fn handle_pause_on_low_cache(&mut self) {
        let Some(demuxer) = self.demuxer.as_ref() else {
            return;
        };
        let reader = demuxer.control_reader_state();
        let cache = demuxer.stream_control_cache_info();

        let cache_capable = cache.size > 0 || self.is_network;

        if self.restart_complete && cache_capable {
            if self.paused_for_cache {
                let should_exit = !reader.underrun
                    && (!self.opts.cache_pause
                        || reader.idle
                        || reader.ts_duration >= self.opts.cache_pause_wait);
                if should_exit {
                    self.paused_for_cache = false;
                    self.update_internal_pause_state();
                } else {
                    self.set_timeout(CACHE_PAUSE_REPOLL);
                }
            } else if self.opts.cache_pause && reader.underrun {
                self.paused_for_cache = true;
                self.cache_stop_time = Some(Instant::now());
                self.update_internal_pause_state();
            }

            self.cache_buffer = if self.paused_for_cache {
                100.0 * (reader.ts_duration / self.opts.cache_pause_wait).clamp(0.0, 0.99)
            } else {
                100.0
            };
        }

        let busy = !cache.idle || !reader.idle;
        let due = match self.next_cache_update {
            Some(at) => Instant::now() >= at,
            None => true,
        };
        if busy || due {
            self.set_timeout(CACHE_UPDATE_INTERVAL);
            self.next_cache_update = Some(Instant::now() + CACHE_UPDATE_INTERVAL);
            self.emit(Event::CacheUpdate);
        }

        if reader.eof && cache.idle && reader.idle {
            self.prefetch_next_entry();
        }
    }

    fn prefetch_next_entry(&mut self) {
        log::debug!("reader at eof and idle; prefetching next playlist entry");
    }
}
