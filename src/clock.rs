//! The per-thread propagation engine.

use std::{
	cell::{Cell, RefCell},
	collections::VecDeque,
	rc::{Rc, Weak},
};

use scopeguard::guard;

use crate::{
	error::{SignalError, SignalResult},
	node::Node,
};

/// Default ceiling on ticks per [`Clock::event`] run, matching the original implementation's
/// `LIBSIG_RUNAWAYTHRESH`.
pub const DEFAULT_RUNAWAY_THRESHOLD: u64 = 1000;

/// The propagation engine for one thread's reactive graph.
///
/// A [`Clock`] is strictly per-execution-context: it is never shared across threads (see
/// [`crate::system`]). It owns the pending queue, the current logical time, and the freeze depth
/// counter, and is responsible for draining any number of cascading writes down to a single fixed
/// point per [`Clock::event`] call.
pub(crate) struct Clock {
	time: Cell<u64>,
	frozen: Cell<u32>,
	scheduled: RefCell<VecDeque<Weak<dyn Node>>>,
	runaway_threshold: Cell<u64>,
}

impl Clock {
	pub(crate) fn new() -> Self {
		Self {
			// Time starts at 1 since computations are considered fresh (never yet run) at time 0.
			time: Cell::new(1),
			frozen: Cell::new(0),
			scheduled: RefCell::new(VecDeque::new()),
			runaway_threshold: Cell::new(DEFAULT_RUNAWAY_THRESHOLD),
		}
	}

	/// Current logical time. Opaque and monotonically increasing except across overflow, which
	/// is not a practical concern at one increment per tick.
	pub(crate) fn time(&self) -> u64 {
		self.time.get()
	}

	pub(crate) fn runaway_threshold(&self) -> u64 {
		self.runaway_threshold.get()
	}

	pub(crate) fn set_runaway_threshold(&self, threshold: u64) {
		self.runaway_threshold.set(threshold);
	}

	/// Appends `n` to the pending queue, then drives propagation.
	pub(crate) fn schedule_one(&self, n: Weak<dyn Node>) -> SignalResult<()> {
		self.scheduled.borrow_mut().push_back(n);
		self.event()
	}

	/// Marks every still-live node in `observers` stale, moves the whole list (draining it) into
	/// the pending queue, then drives propagation.
	///
	/// `observers` is drained regardless of whether any entry still resolves, matching the
	/// original's unconditional `splice`: stale subscriptions must not accumulate.
	pub(crate) fn consume_and_schedule_all(
		&self,
		observers: &mut Vec<Weak<dyn Node>>,
	) -> SignalResult<()> {
		for observer in observers.iter() {
			if let Some(node) = observer.upgrade() {
				node.node_state().set_stale(true);
			}
		}
		self.scheduled.borrow_mut().extend(observers.drain(..));
		self.event()
	}

	/// Runs `f` with the freeze depth incremented; when the outermost freeze releases, drains the
	/// queue.
	///
	/// The depth is always decremented on scope exit, including during a panic unwinding through
	/// `f` (via [`scopeguard::guard`]), matching the original's destructor-based freeze guard. The
	/// drain itself is attempted on reaching zero depth even mid-unwind, but its `Result` is only
	/// surfaced to the caller along the normal, non-panicking return path: a second panic raised
	/// while already unwinding would abort the process rather than propagate usefully.
	pub(crate) fn freeze<R>(&self, f: impl FnOnce() -> R) -> SignalResult<R> {
		let drain_result: Rc<Cell<Option<SignalResult<()>>>> = Rc::new(Cell::new(None));
		self.frozen.set(self.frozen.get() + 1);
		let _guard = guard((self, Rc::clone(&drain_result)), |(clock, drain_result)| {
			let depth = clock.frozen.get() - 1;
			clock.frozen.set(depth);
			if depth == 0 {
				drain_result.set(Some(clock.event()));
			}
		});

		let value = f();
		drop(_guard);

		match drain_result.take() {
			None | Some(Ok(())) => Ok(value),
			Some(Err(error)) => Err(error),
		}
	}

	/// Drains the pending queue to a fixed point, or fails with [`SignalError::RunawayClock`].
	///
	/// Returns immediately while a freeze is active; the outermost freeze's release will call
	/// this again.
	fn event(&self) -> SignalResult<()> {
		if self.frozen.get() > 0 {
			return Ok(());
		}

		// An internal, non-raising freeze: recursive scheduling performed by the updates below
		// (e.g. a computation writing another signal) must not re-enter `event` while this run is
		// still draining.
		self.frozen.set(self.frozen.get() + 1);
		let _internal_freeze = guard(self, |clock| {
			clock.frozen.set(clock.frozen.get() - 1);
		});

		let start_time = self.time.get();

		loop {
			let batch: Vec<_> = self.scheduled.borrow_mut().drain(..).collect();
			if batch.is_empty() {
				break;
			}

			let tick = self.time.get() + 1;
			self.time.set(tick);
			if tick - start_time > self.runaway_threshold.get() {
				return Err(SignalError::RunawayClock);
			}

			for weak in batch {
				if let Some(node) = weak.upgrade() {
					node.run();
				}
			}
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::cell::RefCell as StdRefCell;

	struct Counter {
		state: crate::node::NodeState,
		runs: StdRefCell<u32>,
	}

	impl Node for Counter {
		fn node_state(&self) -> &crate::node::NodeState {
			&self.state
		}

		fn run(self: Rc<Self>) {
			*self.runs.borrow_mut() += 1;
		}
	}

	#[test]
	fn schedule_one_drains_to_quiescence() {
		let clock = Clock::new();
		let counter = Rc::new(Counter {
			state: crate::node::NodeState::new(),
			runs: StdRefCell::new(0),
		});
		clock
			.schedule_one(Rc::downgrade(&counter) as Weak<dyn Node>)
			.unwrap();
		assert_eq!(*counter.runs.borrow(), 1);
		assert_eq!(clock.time(), 2);
	}

	#[test]
	fn runaway_clock_is_detected() {
		let clock = Clock::new();
		clock.set_runaway_threshold(3);

		struct SelfRescheduling<'c> {
			state: crate::node::NodeState,
			clock: &'c Clock,
		}
		impl Node for SelfRescheduling<'_> {
			fn node_state(&self) -> &crate::node::NodeState {
				&self.state
			}
			fn run(self: Rc<Self>) {
				// Reschedule unconditionally: this never reaches quiescence.
				let weak = Rc::downgrade(&self) as Weak<dyn Node>;
				self.clock.scheduled.borrow_mut().push_back(weak);
			}
		}

		let node = Rc::new(SelfRescheduling {
			state: crate::node::NodeState::new(),
			clock: &clock,
		});
		let result = clock.schedule_one(Rc::downgrade(&node) as Weak<dyn Node>);
		assert!(matches!(result, Err(SignalError::RunawayClock)));
	}

	#[test]
	fn nested_freeze_only_drains_on_outermost_release() {
		let clock = Clock::new();
		let counter = Rc::new(Counter {
			state: crate::node::NodeState::new(),
			runs: StdRefCell::new(0),
		});

		clock
			.freeze(|| {
				clock
					.freeze(|| {
						clock
							.schedule_one(Rc::downgrade(&counter) as Weak<dyn Node>)
							.unwrap();
						assert_eq!(*counter.runs.borrow(), 0);
					})
					.unwrap();
				assert_eq!(*counter.runs.borrow(), 0);
			})
			.unwrap();
		assert_eq!(*counter.runs.borrow(), 1);
	}
}
