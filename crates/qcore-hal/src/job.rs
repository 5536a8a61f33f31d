//! Provider-facing job types: the opaque handle a provider hands back from
//! `submit`, the state it reports from `poll`, and the result shape.
//! The dispatcher's own `Job`/`JobId` (keyed by a core-wide `Uuid`)
//! live in `qcore-sched`; a provider only ever sees its own `JobHandle`.

use qcore_types::Counts;

/// An opaque, provider-defined handle to a submitted job. Providers are free
/// to use whatever their underlying API returns (a UUID, a numeric ticket,
/// an ARN) — the dispatcher never interprets the contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobHandle(pub String);

impl JobHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }
}

impl std::fmt::Display for JobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The state a provider reports for a job it owns (`JobState`, minus
/// the dispatcher-level payload — `error`/`result` travel alongside it,
/// not inside it, so `poll` stays a plain observation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobState {
    /// Terminal states are permanent; `poll` must never observe a
    /// transition backward out of one.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed | JobState::Cancelled)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobState::Pending => "pending",
            JobState::Queued => "queued",
            JobState::Running => "running",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
            JobState::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

/// The outcome of a completed job: bitstring keys are ASCII over
/// the classical register, MSB = classical bit 0; `Σ counts == shots_executed`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobResult {
    pub counts: Counts,
    pub shots_executed: u32,
    pub execution_time_ms: u64,
    pub raw_metadata: Option<Vec<u8>>,
}
