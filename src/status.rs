//! Ordered chain-status enum and the stop-play reason code.

/// Status of an audio or video decode chain, on a partial order where gates
/// are commonly phrased as `status >= PLAYING`. Do not reorder the variants;
/// derive order depends on declaration order matching {NONE < READY <
/// PLAYING < DRAINING < EOF}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ChainStatus {
    #[default]
    None,
    Ready,
    Playing,
    Draining,
    Eof,
}

impl ChainStatus {
    /// A missing chain is trivially ready/playing for barrier purposes.
    pub fn at_least(present: bool, status: ChainStatus, threshold: ChainStatus) -> bool {
        !present || status >= threshold
    }
}

/// Reason the play loop should stop driving the current file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopPlay {
    #[default]
    KeepPlaying,
    AtEndOfFile,
    PtQuit,
    PtError,
    PtNextEntry,
    PtCurrentEntry,
}

impl StopPlay {
    pub fn is_quit(self) -> bool {
        matches!(self, StopPlay::PtQuit | StopPlay::PtError)
    }
}
