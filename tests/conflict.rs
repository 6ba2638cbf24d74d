use std::{cell::RefCell, rc::Rc};

use xylem::{Root, Signal, SignalError, SignalResult, S};

#[test]
fn a_second_disagreeing_write_in_the_same_tick_conflicts() {
	let s = Signal::<i32>::new();
	let outcome = Rc::new(RefCell::new(None::<SignalResult<()>>));
	let outcome_in_body = Rc::clone(&outcome);

	let _root = Root::new(|| {
		S::new(move || {
			s.set(10).unwrap();
			s.set(10).unwrap(); // agrees with what's already scheduled: fine
			*outcome_in_body.borrow_mut() = Some(s.set(40)); // disagrees: conflict
		})
		.unwrap();
	});

	assert!(matches!(
		outcome.borrow_mut().take(),
		Some(Err(SignalError::ConflictingScheduledValue))
	));
}
