//! Reactive cells: [`Signal<T>`] (plain) and [`Value<T>`] (equality-suppressed).

use std::{
	any::Any,
	cell::RefCell,
	fmt,
	marker::PhantomData,
	rc::{Rc, Weak},
};

use crate::{
	error::{SignalError, SignalResult},
	node::{Node, NodeState},
	system,
};

/// Marks a [`Signal`] as always notifying on write, even when the new value equals the current
/// one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Plain;

/// Marks a [`Signal`] as suppressing writes that would not change its current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValueMode;

mod sealed {
	pub trait Sealed {}
	impl Sealed for super::Plain {}
	impl Sealed for super::ValueMode {}
}

/// The write-suppression behavior of a [`Signal`], implemented only by [`Plain`] and
/// [`ValueMode`].
pub trait Mode: sealed::Sealed + 'static {
	/// Whether writes that would not change the current value are suppressed.
	const SUPPRESSES_EQUAL_WRITES: bool;
}

impl Mode for Plain {
	const SUPPRESSES_EQUAL_WRITES: bool = false;
}

impl Mode for ValueMode {
	const SUPPRESSES_EQUAL_WRITES: bool = true;
}

struct SignalInner<T> {
	state: NodeState,
	self_weak: Weak<Self>,
	current: RefCell<T>,
	scheduled: RefCell<Option<T>>,
	observers: RefCell<Vec<Weak<dyn Node>>>,
}

impl<T: 'static> Node for SignalInner<T> {
	fn node_state(&self) -> &NodeState {
		&self.state
	}

	fn run(self: Rc<Self>) {
		self.swap();
	}
}

impl<T: 'static> SignalInner<T> {
	/// Records a dependency on this signal: attaches it to the current owner (if new to it) and
	/// appends the current observer (if any) to its observer list.
	fn depend(self: &Rc<Self>) {
		system::with_current_owner(|owner| {
			if let Some(owner) = owner {
				owner.owner().attach(self.clone() as Rc<dyn Any>);
			}
		});
		system::with_current_observer(|observer| {
			if let Some(observer) = observer {
				self.observers.borrow_mut().push(observer.clone());
			}
		});
	}

	fn schedule_self(self: &Rc<Self>) -> SignalResult<()> {
		system::with_clock(|clock| clock.schedule_one(self.self_weak.clone() as Weak<dyn Node>))
	}

	/// The signal's scheduled update: moves `scheduled` into `current` and notifies observers.
	fn swap(self: Rc<Self>) {
		let new_value = self.scheduled.borrow_mut().take();
		if let Some(new_value) = new_value {
			*self.current.borrow_mut() = new_value;
			let mut observers = self.observers.borrow_mut();
			let result = system::with_clock(|clock| clock.consume_and_schedule_all(&mut observers));
			// A downstream `RunawayClock` during this drain would already have been raised to
			// whichever external call is driving the clock; there is nowhere further to report it
			// from inside a scheduled update, so it is ignored here exactly as the original's
			// `schedule_all_observers` (which cannot fail) would.
			let _ = result;
		}
	}
}

/// A reactive cell.
///
/// `Signal<T>` is the plain flavor: every [`set`](Signal::set) schedules an update and re-runs
/// dependents, even if the new value equals the current one. [`Value<T>`] is the equality-
/// suppressing flavor.
pub struct Signal<T, M: Mode = Plain> {
	inner: Rc<SignalInner<T>>,
	_mode: PhantomData<M>,
}

/// A [`Signal`] that suppresses writes which would not change its current value.
pub type Value<T> = Signal<T, ValueMode>;

impl<T, M: Mode> Clone for Signal<T, M> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
			_mode: PhantomData,
		}
	}
}

impl<T: Default + 'static, M: Mode> Signal<T, M> {
	/// Creates a signal holding `T`'s default value, with nothing scheduled.
	pub fn new() -> Self {
		Self::with_value(T::default())
	}
}

impl<T: Default + 'static, M: Mode> Default for Signal<T, M> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: 'static, M: Mode> Signal<T, M> {
	/// Creates a signal holding `v`, with nothing scheduled.
	pub fn with_value(v: T) -> Self {
		Self {
			inner: Rc::new_cyclic(|self_weak| SignalInner {
				state: NodeState::new(),
				self_weak: self_weak.clone(),
				current: RefCell::new(v),
				scheduled: RefCell::new(None),
				observers: RefCell::new(Vec::new()),
			}),
			_mode: PhantomData,
		}
	}

	/// Returns a clone of the current value without recording a dependency.
	pub fn sample(&self) -> T
	where
		T: Clone,
	{
		self.inner.current.borrow().clone()
	}

	/// Returns a clone of the current value, recording a dependency on the current observer (if
	/// any).
	pub fn get(&self) -> T
	where
		T: Clone,
	{
		self.inner.depend();
		self.inner.current.borrow().clone()
	}

	/// Runs `f` against a borrow of the current value, recording a dependency.
	pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
		self.inner.depend();
		f(&self.inner.current.borrow())
	}

	/// Schedules `v` to become the current value at the next clock step.
	///
	/// For [`Value`] signals, a write that would not change the current value is a no-op and
	/// nothing is scheduled. For both flavors, a write that disagrees with a value already
	/// scheduled for this tick fails with [`SignalError::ConflictingScheduledValue`].
	pub fn set(&self, v: T) -> SignalResult<()>
	where
		T: PartialEq,
	{
		let mut scheduled = self.inner.scheduled.borrow_mut();
		if let Some(pending) = scheduled.as_ref() {
			if *pending != v {
				return Err(SignalError::ConflictingScheduledValue);
			}
			return Ok(());
		}
		if M::SUPPRESSES_EQUAL_WRITES && *self.inner.current.borrow() == v {
			return Ok(());
		}
		*scheduled = Some(v);
		drop(scheduled);
		self.inner.schedule_self()
	}

	/// Records a dependency, then compares the current value against `other`.
	pub fn eq(&self, other: &T) -> bool
	where
		T: PartialEq,
	{
		self.with(|v| v == other)
	}

	/// Records a dependency, then compares the current value against `other`.
	pub fn ne(&self, other: &T) -> bool
	where
		T: PartialEq,
	{
		!self.eq(other)
	}
}

macro_rules! signal_binary_op {
	($name:ident, $trait:ident, $method:ident) => {
		impl<T: 'static, M: Mode> Signal<T, M> {
			#[doc = concat!(
				"Records a dependency, then applies `",
				stringify!($method),
				"` between the current value and `other`."
			)]
			pub fn $name<U>(&self, other: U) -> <T as std::ops::$trait<U>>::Output
			where
				T: Clone + std::ops::$trait<U>,
			{
				self.inner.depend();
				self.inner.current.borrow().clone().$method(other)
			}
		}
	};
}

signal_binary_op!(add, Add, add);
signal_binary_op!(sub, Sub, sub);
signal_binary_op!(mul, Mul, mul);
signal_binary_op!(div, Div, div);
signal_binary_op!(rem, Rem, rem);
signal_binary_op!(bitand, BitAnd, bitand);
signal_binary_op!(bitor, BitOr, bitor);
signal_binary_op!(bitxor, BitXor, bitxor);

impl<T: fmt::Display + 'static, M: Mode> fmt::Display for Signal<T, M> {
	/// Writes the current value to `f`, recording a dependency — so a computation that formats a
	/// signal is correctly re-run when it changes.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.inner.depend();
		fmt::Display::fmt(&*self.inner.current.borrow(), f)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn plain_signal_reschedules_on_equal_write() {
		let s = Signal::<i32>::with_value(5);
		assert!(s.set(5).is_ok());
		assert_eq!(s.inner.scheduled.borrow().as_ref(), Some(&5));
	}

	#[test]
	fn value_signal_suppresses_equal_write() {
		let v = Value::<i32>::with_value(5);
		assert!(v.set(5).is_ok());
		assert!(v.inner.scheduled.borrow().is_none());
	}

	#[test]
	fn conflicting_scheduled_value_is_rejected() {
		let s = Signal::<i32>::with_value(0);
		*s.inner.scheduled.borrow_mut() = Some(10);
		let result = s.set(40);
		assert!(matches!(result, Err(SignalError::ConflictingScheduledValue)));
	}

	#[test]
	fn same_scheduled_value_is_idempotent() {
		let s = Signal::<i32>::with_value(0);
		*s.inner.scheduled.borrow_mut() = Some(10);
		assert!(s.set(10).is_ok());
	}
}
