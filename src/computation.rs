//! Derived reactions: computations are both observers of the signals they read and owners of the
//! computations they create.

use std::{
	any::Any,
	cell::RefCell,
	rc::{Rc, Weak},
};

use crate::{
	error::SignalResult,
	node::{Node, NodeState},
	owner::{Owner, Owning},
	system,
};

struct ComputationInner {
	state: NodeState,
	self_weak: Weak<Self>,
	owner: Owner,
	observers: RefCell<Vec<Weak<dyn Node>>>,
	body: RefCell<Box<dyn FnMut()>>,
}

impl Owning for ComputationInner {
	fn owner(&self) -> &Owner {
		&self.owner
	}
}

impl Node for ComputationInner {
	fn node_state(&self) -> &NodeState {
		&self.state
	}

	fn run(self: Rc<Self>) {
		self.recompute();
	}
}

impl ComputationInner {
	fn recompute(self: Rc<Self>) {
		if !self.state.is_stale() {
			return;
		}
		self.state.set_stale(false);

		// Release last run's nested computations (and anything else they owned) before this run
		// starts, so re-registration below begins from a clean slate.
		self.owner.clear();

		let owner_guard = system::push_owner(self.clone() as Rc<dyn Owning>);
		let observer_guard = system::push_observer(self.self_weak.clone() as Weak<dyn Node>);

		// A panic from `body` propagates through here (and through `Clock::event`'s caller)
		// unchanged; `owner_guard`/`observer_guard` still restore the previous scope during the
		// unwind, since they are plain drop guards.
		(self.body.borrow_mut())();

		drop(observer_guard);
		drop(owner_guard);

		let mut observers = self.observers.borrow_mut();
		let result = system::with_clock(|clock| clock.consume_and_schedule_all(&mut observers));
		// As with a signal's swap, there is nowhere further to report a `RunawayClock` raised by
		// this drain from inside a scheduled update; the external call driving the clock already
		// observes it.
		let _ = result;
	}
}

/// A derived reaction: a user function re-run whenever any signal it reads changes.
///
/// Dropping the last [`Computation`] handle does not stop it from running — it remains owned (and
/// scheduled) by whichever [`Root`](crate::api::Root) or parent computation created it, exactly
/// as in the original this is grounded on, where a computation is not meant to be held onto
/// directly so much as declared.
pub struct Computation {
	#[allow(dead_code)]
	inner: Rc<ComputationInner>,
}

impl Clone for Computation {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl Computation {
	/// Creates a computation running `body` in the current owner scope.
	///
	/// The computation is attached as a child of the current owner (so it is disposed when that
	/// owner re-runs or is dropped) and scheduled to run once on the next clock tick. Fails with
	/// [`SignalError::OrphanComputation`](crate::error::SignalError::OrphanComputation) if no
	/// owner scope is currently installed.
	pub(crate) fn new(body: impl FnMut() + 'static) -> SignalResult<Self> {
		let current_owner = system::with_current_owner(|owner| owner.cloned());
		let Some(current_owner) = current_owner else {
			return Err(crate::error::SignalError::OrphanComputation);
		};

		let inner = Rc::new_cyclic(|self_weak| ComputationInner {
			state: NodeState::new(),
			self_weak: self_weak.clone(),
			owner: Owner::new(),
			observers: RefCell::new(Vec::new()),
			body: RefCell::new(Box::new(body)),
		});

		current_owner.owner().attach(Rc::clone(&inner) as Rc<dyn Any>);
		system::with_clock(|clock| {
			clock.schedule_one(Rc::downgrade(&inner) as Weak<dyn Node>)
		})?;

		Ok(Self { inner })
	}
}
