use xylem::{Root, SignalError, Signal, S};

#[test]
fn mutually_dependent_plain_computations_are_runaway() {
	// Kept low so this test does not spend a real 1000 ticks proving divergence.
	Root::set_runaway_threshold(50);

	let i = Signal::<i32>::new();
	let j = Signal::<i32>::new();

	let _root = Root::new(|| {
		let i1 = i.clone();
		let j1 = j.clone();
		S::new(move || i1.set(j1.get()).unwrap()).unwrap();
		// Completing the cycle: plain signals reschedule on every write, even one that doesn't
		// change the value, so from here on `i` and `j` retrigger each other without end.
		let result = S::new(move || j.set(i.get()).unwrap());
		assert!(matches!(result, Err(SignalError::RunawayClock)));
	});
}
