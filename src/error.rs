//! The recoverable error taxonomy surfaced by this crate's public API.

use thiserror::Error;

/// `Result` alias for fallible operations on this crate's public API.
pub type SignalResult<T> = Result<T, SignalError>;

/// Errors this crate's public API can return.
///
/// Programmer mistakes that are not meaningfully recoverable (for example, calling an internal
/// invariant-violating path) remain panics, as in the rest of this crate; everything here is a
/// condition a caller might reasonably want to handle or report.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalError {
	/// A write tried to change a signal that already has a different value scheduled for the
	/// same tick.
	#[error("new value conflicts with a value already scheduled for this signal")]
	ConflictingScheduledValue,

	/// Propagation did not reach quiescence within the configured runaway threshold, indicating a
	/// cyclic dependency between signals and computations.
	#[error("runaway clock: propagation did not converge within the configured tick threshold")]
	RunawayClock,

	/// A computation was created without a current owner scope installed.
	#[error("computations must be created from within a `Root` (or another computation)")]
	OrphanComputation,
}
