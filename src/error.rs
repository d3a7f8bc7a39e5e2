//! Error type for the playback control core.

use std::fmt::{Display, Formatter};

/// Failure surfaced by a collaborator operation the core cannot recover from
/// in place (see the error handling table for the full policy per kind).
///
/// Most failure conditions in the core are not represented here at all: they
/// flow through status fields (`StopPlay`, chain statuses) and are handled
/// by the next tick rather than propagated as a `Result::Err`.
#[derive(Debug)]
pub enum CoreError {
    /// The demuxer rejected a seek to `target` (unseekable medium, closed
    /// stream, etc). The planner logs this and leaves the pending seek
    /// cleared; playback continues from wherever it already was.
    SeekRejected { target: f64 },
    /// Force-window video output initialization failed with the given
    /// collaborator-supplied message. `force_vo` is disabled and the window
    /// is torn down.
    ForceWindowInit(String),
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SeekRejected { target } => write!(f, "seek to {target} rejected by demuxer"),
            Self::ForceWindowInit(msg) => write!(f, "force-window init failed: {msg}"),
        }
    }
}

impl std::error::Error for CoreError {}
