//! The public facade: [`Root`] and [`S`].

use std::rc::Rc;

use crate::{
	computation::Computation,
	error::SignalResult,
	owner::{Owner, Owning},
	system,
};

pub(crate) struct RootOwner {
	owner: Owner,
}

impl RootOwner {
	pub(crate) fn new() -> Self {
		Self {
			owner: Owner::new(),
		}
	}
}

impl Owning for RootOwner {
	fn owner(&self) -> &Owner {
		&self.owner
	}
}

/// The top-level owner scope. Computations may only be created within a `Root` (or, transitively,
/// within another computation).
///
/// A `Root`'s body runs exactly once, immediately, with the root installed as the current owner
/// but with **no** current observer: writes performed directly inside a root (outside any
/// computation) are not tracked as a dependency of anything, and the root itself is never
/// re-entered on a signal change. Dropping the `Root` releases every computation it (transitively)
/// owns.
pub struct Root {
	#[allow(dead_code)]
	inner: Rc<RootOwner>,
}

impl Root {
	/// Runs `body` once with a fresh root installed as the current owner, then returns the root.
	pub fn new(body: impl FnOnce()) -> Self {
		let inner = Rc::new(RootOwner::new());
		{
			let _guard = system::push_owner(Rc::clone(&inner) as Rc<dyn Owning>);
			body();
		}
		Self { inner }
	}

	/// Overrides this thread's runaway-tick threshold (default
	/// [`DEFAULT_RUNAWAY_THRESHOLD`](crate::clock::DEFAULT_RUNAWAY_THRESHOLD)).
	///
	/// The threshold is a property of the thread's [`Clock`](crate::clock::Clock), not of any one
	/// `Root`, since there is exactly one clock per thread; this is exposed here because a `Root`
	/// is this crate's usual entry point, and tests in particular want to tighten it before
	/// constructing anything.
	pub fn set_runaway_threshold(threshold: u64) {
		system::with_clock(|clock| clock.set_runaway_threshold(threshold));
	}
}

/// The facade through which computations are declared and writes are batched.
///
/// Stable Rust has no way to make a value directly callable the way the original `S(fn)` call
/// syntax does without the unstable `Fn` traits, so `S` is a marker type with associated
/// functions instead.
pub struct S;

impl S {
	/// Creates a [`Computation`] running `body` in the current owner scope.
	///
	/// See [`Computation::new`].
	pub fn new(body: impl FnMut() + 'static) -> SignalResult<Computation> {
		Computation::new(body)
	}

	/// Runs `body` under a raising freeze: every write inside `body` (and every write performed
	/// by computations it triggers, transitively) propagates as a single combined tick once this
	/// call returns, instead of one tick per write.
	pub fn freeze<R>(body: impl FnOnce() -> R) -> SignalResult<R> {
		system::with_clock(|clock| clock.freeze(body))
	}
}
