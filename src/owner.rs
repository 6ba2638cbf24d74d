//! Scopes that own child nodes and dispose them on re-entry or destruction.

use std::{
	any::Any,
	cell::RefCell,
	collections::HashSet,
	rc::Rc,
};

/// A collection of child nodes (signals, computations, or any other value a computation body
/// allocates) kept alive as long as this owner holds them.
///
/// Children are identity-keyed: attaching the same child twice is a no-op, matching the original
/// `std::set<std::shared_ptr<node>>`. [`Owner::clear`] drops every strong reference at once; if
/// that was a child's last strong reference, its `Drop` runs there and then, which is how nested
/// computations (and any resource they allocated) are disposed on refresh.
#[derive(Default)]
pub(crate) struct Owner {
	seen: RefCell<HashSet<usize>>,
	children: RefCell<Vec<Rc<dyn Any>>>,
}

impl Owner {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	/// Adds `child` to this owner's children, unless an identical `Rc` is already attached.
	pub(crate) fn attach(&self, child: Rc<dyn Any>) {
		let identity = Rc::as_ptr(&child).cast::<()>() as usize;
		if self.seen.borrow_mut().insert(identity) {
			self.children.borrow_mut().push(child);
		}
	}

	/// Releases every child this owner holds.
	pub(crate) fn clear(&self) {
		self.seen.borrow_mut().clear();
		// Dropped in insertion order, same as the original's ordered `std::set`/`std::list`
		// disposal.
		self.children.borrow_mut().clear();
	}
}

/// Anything that can serve as the current owner scope: [`Root`](crate::api::Root) and
/// [`Computation`](crate::computation::Computation) both hold an [`Owner`] and implement this so
/// [`crate::system`] can treat them uniformly.
pub(crate) trait Owning: Any {
	fn owner(&self) -> &Owner;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn attach_is_idempotent_by_identity() {
		let owner = Owner::new();
		let child: Rc<dyn Any> = Rc::new(42_i32);
		owner.attach(Rc::clone(&child));
		owner.attach(Rc::clone(&child));
		assert_eq!(owner.children.borrow().len(), 1);
	}

	#[test]
	fn clear_drops_children() {
		use std::rc::Weak;

		let owner = Owner::new();
		let child = Rc::new(7_i32);
		let weak: Weak<i32> = Rc::downgrade(&child);
		owner.attach(child as Rc<dyn Any>);
		assert!(weak.upgrade().is_some());
		owner.clear();
		assert!(weak.upgrade().is_none());
	}
}
