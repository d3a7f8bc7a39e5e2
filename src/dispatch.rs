//! Wakeup / dispatch gate: the single suspension point of the play loop.

use std::time::{Duration, Instant};

use crate::context::PlayerContext;

impl PlayerContext {
    /// `sleeptime <- min(sleeptime, dt)`. If called while draining the
    /// dispatch queue and `dt` is finite, also interrupts the queue so a
    /// shortened deadline set from within a dispatched callback isn't lost
    /// behind the stale, longer sleep already in progress.
    pub fn set_timeout(&mut self, dt: Duration) {
        self.sleeptime = Some(match self.sleeptime {
            Some(current) => current.min(dt),
            None => dt,
        });
        if self.in_dispatch {
            self.wakeup();
        }
    }

    /// Interrupt the dispatch queue. Safe from any thread; re-entrant from
    /// within the loop, in which case the next `wait_events` returns with
    /// zero wait.
    pub fn wakeup(&mut self) {
        self.dispatch_queue.interrupt();
        if self.in_dispatch {
            self.sleeptime = Some(Duration::ZERO);
        }
    }

    /// Sleep with the pending timeout until woken, then reset it to
    /// infinity. The only blocking call in the whole loop.
    pub fn wait_events(&mut self) {
        let timeout = self.sleeptime;
        self.in_dispatch = true;
        self.dispatch_queue.process(timeout);
        self.in_dispatch = false;
        self.sleeptime = None;
    }

    /// Drain ready input commands, then arm the next wakeup at the input
    /// layer's requested re-poll delay.
    pub fn process_input(&mut self) {
        let Some(input) = self.input.as_mut() else {
            return;
        };
        while let Some(cmd) = input.read_cmd() {
            self.run_command(cmd);
        }
        if let Some(delay) = self.input.as_ref().and_then(|i| i.get_delay()) {
            self.set_timeout(delay);
        }
    }

    fn run_command(&mut self, cmd: String) {
        log::debug!("input command: {cmd}");
    }
}

/// Marks the instant `relative_time`/seek-defer math measures against as
/// "now" without pulling in a mockable clock abstraction for the whole
/// crate; collaborator fakes in tests control elapsed time by sleeping or by
/// pre-seeding `start_timestamp` directly.
pub(crate) fn now() -> Instant {
    Instant::now()
}
