//! Mutation transaction lifecycle.
//!
//! # Responsibility
//! - Track each read-write transaction through
//!   `Idle -> Opened -> (Success | Error) -> Complete`.
//! - Turn engine failures into `TransactionError` tagged with the phase
//!   they interrupted.
//!
//! # Invariants
//! - `Complete` is only reachable from `Success`.
//! - `Error` and `Complete` are terminal.

use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type TxResult<T> = Result<T, TransactionError>;

/// Mutation carried by a read-write transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Insert,
    Delete,
}

impl MutationKind {
    fn event_name(self) -> &'static str {
        match self {
            Self::Insert => "todo_insert",
            Self::Delete => "todo_delete",
        }
    }
}

impl Display for MutationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Insert => write!(f, "insert"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Transaction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxPhase {
    /// Not yet begun.
    Idle,
    /// `BEGIN` succeeded; the request has not resolved.
    Opened,
    /// The add/delete request itself succeeded; commit still pending.
    Success,
    /// Terminal failure; nothing was committed.
    Error,
    /// Commit finished; the effect is durable and visible to new scans.
    Complete,
}

impl TxPhase {
    /// Whether `self -> next` is a legal transition.
    pub fn can_advance_to(self, next: TxPhase) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Opened)
                | (Self::Idle, Self::Error)
                | (Self::Opened, Self::Success)
                | (Self::Opened, Self::Error)
                | (Self::Success, Self::Complete)
                | (Self::Success, Self::Error)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Error | Self::Complete)
    }
}

impl Display for TxPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Opened => "opened",
            Self::Success => "success",
            Self::Error => "error",
            Self::Complete => "complete",
        };
        write!(f, "{name}")
    }
}

/// An insert/delete failed to commit. Store state is unchanged.
#[derive(Debug)]
pub struct TransactionError {
    pub kind: MutationKind,
    /// Phase the transaction was in when it failed: `Idle` means it could
    /// not be opened, `Success` means the commit itself failed.
    pub phase: TxPhase,
    pub source: rusqlite::Error,
}

impl Display for TransactionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} transaction failed in phase `{}`: {}",
            self.kind, self.phase, self.source
        )
    }
}

impl Error for TransactionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Phase tracker for one read-write transaction.
#[derive(Debug)]
pub(crate) struct TxLifecycle {
    kind: MutationKind,
    phase: TxPhase,
    started_at: Instant,
}

impl TxLifecycle {
    pub(crate) fn begin(kind: MutationKind) -> Self {
        Self {
            kind,
            phase: TxPhase::Idle,
            started_at: Instant::now(),
        }
    }

    pub(crate) fn phase(&self) -> TxPhase {
        self.phase
    }

    pub(crate) fn opened(&mut self) {
        self.advance(TxPhase::Opened);
    }

    pub(crate) fn request_succeeded(&mut self) {
        self.advance(TxPhase::Success);
    }

    /// Marks the commit as finished. `detail` is appended to the log line.
    pub(crate) fn complete(mut self, detail: std::fmt::Arguments<'_>) {
        self.advance(TxPhase::Complete);
        info!(
            "event={} module=repo status=ok duration_ms={} {}",
            self.kind.event_name(),
            self.started_at.elapsed().as_millis(),
            detail
        );
    }

    /// Converts an engine error into a terminal `TransactionError`.
    pub(crate) fn fail(mut self, source: rusqlite::Error) -> TransactionError {
        let failed_in = self.mark_failed();
        error!(
            "event={} module=repo status=error phase={} duration_ms={} error={}",
            self.kind.event_name(),
            failed_in,
            self.started_at.elapsed().as_millis(),
            source
        );
        TransactionError {
            kind: self.kind,
            phase: failed_in,
            source,
        }
    }

    /// Moves to `Error` and returns the phase that was interrupted.
    fn mark_failed(&mut self) -> TxPhase {
        let interrupted = self.phase;
        self.advance(TxPhase::Error);
        interrupted
    }

    fn advance(&mut self, next: TxPhase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "illegal transaction transition {} -> {}",
            self.phase,
            next
        );
        debug!(
            "event=tx_phase module=repo kind={} from={} to={}",
            self.kind, self.phase, next
        );
        self.phase = next;
    }
}

#[cfg(test)]
mod tests {
    use super::{MutationKind, TxLifecycle, TxPhase};

    #[test]
    fn complete_is_only_reachable_through_success() {
        assert!(TxPhase::Success.can_advance_to(TxPhase::Complete));
        assert!(!TxPhase::Opened.can_advance_to(TxPhase::Complete));
        assert!(!TxPhase::Idle.can_advance_to(TxPhase::Complete));
        assert!(!TxPhase::Error.can_advance_to(TxPhase::Complete));
    }

    #[test]
    fn terminal_phases_have_no_exit() {
        for next in [
            TxPhase::Idle,
            TxPhase::Opened,
            TxPhase::Success,
            TxPhase::Error,
            TxPhase::Complete,
        ] {
            assert!(!TxPhase::Error.can_advance_to(next));
            assert!(!TxPhase::Complete.can_advance_to(next));
        }
        assert!(TxPhase::Error.is_terminal());
        assert!(TxPhase::Complete.is_terminal());
        assert!(!TxPhase::Success.is_terminal());
    }

    #[test]
    fn failure_moves_lifecycle_into_error_from_every_live_phase() {
        let mut idle = TxLifecycle::begin(MutationKind::Insert);
        assert_eq!(idle.mark_failed(), TxPhase::Idle);
        assert_eq!(idle.phase(), TxPhase::Error);

        let mut opened = TxLifecycle::begin(MutationKind::Insert);
        opened.opened();
        assert_eq!(opened.mark_failed(), TxPhase::Opened);
        assert_eq!(opened.phase(), TxPhase::Error);
        assert!(opened.phase().is_terminal());
    }

    #[test]
    fn failure_reports_the_interrupted_phase() {
        let mut lifecycle = TxLifecycle::begin(MutationKind::Delete);
        lifecycle.opened();
        lifecycle.request_succeeded();
        assert_eq!(lifecycle.phase(), TxPhase::Success);

        let err = lifecycle.fail(rusqlite::Error::InvalidQuery);
        assert_eq!(err.kind, MutationKind::Delete);
        assert_eq!(err.phase, TxPhase::Success);
        assert!(err.to_string().contains("delete transaction failed"));
    }
}
