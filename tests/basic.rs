mod support;
use support::Validator;

use std::rc::Rc;
use xylem::{Root, Signal, S};

#[test]
fn write_then_read() {
	let s = Signal::<i32>::new();
	s.set(10).unwrap();
	assert_eq!(s.sample(), 10);
	s.set(15).unwrap();
	assert_eq!(s.sample(), 15);
}

#[test]
fn chained_computation() {
	let x = Rc::new(Validator::new());

	let i = Signal::<i32>::new();
	let i10 = Signal::<i32>::new();
	let res = Signal::<String>::new();

	let _root = Root::new(|| {
		let x1 = Rc::clone(&x);
		let i1 = i.clone();
		let i10_1 = i10.clone();
		S::new(move || {
			x1.push("i10");
			i10_1.set(i1.get() * 10).unwrap();
		})
		.unwrap();
		let x2 = Rc::clone(&x);
		let i10_2 = i10.clone();
		let res2 = res.clone();
		S::new(move || {
			x2.push("res");
			res2.set(format!("result: {}", i10_2.get())).unwrap();
		})
		.unwrap();
	});
	x.expect(["i10", "res"]);
	assert_eq!(i10.sample(), 0);
	assert_eq!(res.sample(), "result: 0");

	i.set(14).unwrap();
	assert_eq!(i10.sample(), 140);
	assert_eq!(res.sample(), "result: 140");

	i.set(-150).unwrap();
	assert_eq!(res.sample(), "result: -1500");
}
