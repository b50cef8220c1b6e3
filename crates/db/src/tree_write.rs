//! Time budgets and errors for transactional track tree writes.
//!
//! A tree write runs inside one transaction split into a delete phase and a
//! recreate phase. Each phase gets its own deadline; every statement of the
//! phase is raced against that deadline. When a deadline passes or a statement
//! fails, the caller drops the transaction and PostgreSQL rolls the whole
//! write back.
//!
//! Missing a deadline only abandons the future; a statement already running
//! on the server keeps going until `statement_timeout` cancels it.

use std::future::Future;
use std::time::Duration;

use pixelperfect_core::track_tree::{
    TreePhase, DEFAULT_DELETE_PHASE_TIMEOUT, DEFAULT_RECREATE_PHASE_TIMEOUT,
};
use pixelperfect_core::types::DbId;
use tokio::time::Instant;

/// Per-phase time budgets for a tree write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseBudgets {
    pub delete: Duration,
    pub recreate: Duration,
}

impl PhaseBudgets {
    /// Combined budget, used as the per-statement `statement_timeout` of a
    /// replace transaction.
    pub fn total(&self) -> Duration {
        self.delete + self.recreate
    }
}

impl Default for PhaseBudgets {
    fn default() -> Self {
        Self {
            delete: DEFAULT_DELETE_PHASE_TIMEOUT,
            recreate: DEFAULT_RECREATE_PHASE_TIMEOUT,
        }
    }
}

/// Failure of a transactional tree write. Nothing is committed in any case.
#[derive(Debug, thiserror::Error)]
pub enum TreeWriteError {
    #[error("Track {0} not found")]
    TrackNotFound(DbId),

    #[error("Track version conflict: expected {expected}, found {actual}")]
    VersionConflict { expected: i32, actual: i32 },

    #[error("{phase} phase exceeded its {}ms budget", .budget.as_millis())]
    Timeout { phase: TreePhase, budget: Duration },

    #[error("{phase} phase failed: {source}")]
    Database {
        phase: TreePhase,
        #[source]
        source: sqlx::Error,
    },
}

impl TreeWriteError {
    /// The phase that was running when the write failed, if any.
    pub fn phase(&self) -> Option<TreePhase> {
        match self {
            Self::Timeout { phase, .. } | Self::Database { phase, .. } => Some(*phase),
            Self::TrackNotFound(_) | Self::VersionConflict { .. } => None,
        }
    }
}

/// Deadline tracker for one phase of a tree write.
#[derive(Debug, Clone, Copy)]
pub struct PhaseClock {
    phase: TreePhase,
    budget: Duration,
    deadline: Instant,
}

impl PhaseClock {
    /// Start the clock for `phase`; the deadline is `now + budget`.
    pub fn start(phase: TreePhase, budget: Duration) -> Self {
        Self {
            phase,
            budget,
            deadline: Instant::now() + budget,
        }
    }

    /// Run one database step against the phase deadline.
    pub async fn run<T, F>(&self, step: F) -> Result<T, TreeWriteError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout_at(self.deadline, step).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => Err(TreeWriteError::Database {
                phase: self.phase,
                source,
            }),
            Err(_) => Err(TreeWriteError::Timeout {
                phase: self.phase,
                budget: self.budget,
            }),
        }
    }
}
