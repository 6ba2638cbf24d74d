//! Per-thread system state: the current clock, owner scope, and observer.
//!
//! Each thread that uses this runtime has its own [`Clock`], current owner, and current observer,
//! held in a `thread_local!`. None of this crate's handle types are `Send`; sharing a signal
//! across threads is not supported (see the crate's concurrency notes).

use std::{cell::RefCell, rc::Rc};

use scopeguard::guard;

use crate::{
	clock::Clock,
	node::Node,
	owner::Owning,
};

struct SystemState {
	clock: Clock,
	current_owner: RefCell<Option<Rc<dyn Owning>>>,
	current_observer: RefCell<Option<std::rc::Weak<dyn Node>>>,
}

impl SystemState {
	fn new() -> Self {
		Self {
			clock: Clock::new(),
			current_owner: RefCell::new(None),
			current_observer: RefCell::new(None),
		}
	}
}

thread_local! {
	static SYSTEM: SystemState = SystemState::new();
}

/// Runs `f` with access to this thread's [`Clock`].
pub(crate) fn with_clock<R>(f: impl FnOnce(&Clock) -> R) -> R {
	SYSTEM.with(|system| f(&system.clock))
}

/// Runs `f` with the current owner scope, if any is installed.
pub(crate) fn with_current_owner<R>(f: impl FnOnce(Option<&Rc<dyn Owning>>) -> R) -> R {
	SYSTEM.with(|system| f(system.current_owner.borrow().as_ref()))
}

/// Runs `f` with the current observer, if any is installed.
pub(crate) fn with_current_observer<R>(
	f: impl FnOnce(Option<&std::rc::Weak<dyn Node>>) -> R,
) -> R {
	SYSTEM.with(|system| f(system.current_observer.borrow().as_ref()))
}

/// Installs `owner` as the current owner for the duration of the returned guard's lifetime,
/// restoring the previous owner (even across a panic unwinding through the guarded scope) when it
/// drops.
pub(crate) fn push_owner(owner: Rc<dyn Owning>) -> impl Drop {
	let previous = SYSTEM.with(|system| system.current_owner.replace(Some(owner)));
	guard(previous, |previous| {
		SYSTEM.with(|system| *system.current_owner.borrow_mut() = previous);
	})
}

/// Installs `observer` as the current observer for the duration of the returned guard's
/// lifetime, restoring the previous observer on drop.
pub(crate) fn push_observer(observer: std::rc::Weak<dyn Node>) -> impl Drop {
	let previous = SYSTEM.with(|system| system.current_observer.replace(Some(observer)));
	guard(previous, |previous| {
		SYSTEM.with(|system| *system.current_observer.borrow_mut() = previous);
	})
}
