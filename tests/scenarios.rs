use range_automata::operations::{
    concatenate, determinize, get_common_prefix, get_singleton, DEFAULT_DETERMINIZE_WORK_LIMIT,
};
use range_automata::{primitives, run, run_bytes, ErrorKind, RegExp};

const WORK: usize = DEFAULT_DETERMINIZE_WORK_LIMIT;

fn compile(pattern: &str) -> range_automata::Automaton {
    RegExp::new(pattern).unwrap().to_automaton(WORK).unwrap()
}

#[test]
fn regex_with_alternating_repeats() {
    let a = compile("a(b+|c+)d");
    assert!(run(&a, "abbbbbd"));
    assert!(run(&a, "acd"));
    assert!(!run(&a, "ad"));
    assert!(!run(&a, ""));
    assert!(!run(&a, "abcd"));
}

#[test]
fn regex_capitalized_word() {
    let a = compile("[A-Z][a-z]*");
    assert!(run(&a, "A"));
    assert!(run(&a, "Hello"));
    assert!(!run(&a, "hello"));
    assert!(!run(&a, ""));
}

#[test]
fn exponential_determinization_hits_work_limit() {
    let re = RegExp::new("[ac]*a[ac]{50,200}").unwrap();
    let err = re.to_automaton(10_000).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::TooComplex { .. }));
}

#[test]
fn oversized_repetition_hits_work_limit() {
    let re = RegExp::new("a{50001}").unwrap();
    let err = re.to_automaton(50_000).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::TooComplex { .. }));
}

#[test]
fn binary_interval_members() {
    let a = primitives::binary_interval(Some(b"\x00"), true, Some(b"\x10\x00"), true).unwrap();
    for b in 0u8..=0xFF {
        assert_eq!(b <= 0x0F, run_bytes(&a, &[b]), "single byte {:#04x}", b);
    }
    assert!(run_bytes(&a, b"\x10\x00"));
    assert!(!run_bytes(&a, b"\x10\x01"));
    assert!(!run_bytes(&a, b"\x11"));
    assert!(!run_bytes(&a, b""));
}

#[test]
fn interleaved_any_string_concatenation() {
    let a = concatenate(&[
        &primitives::string("m"),
        &primitives::any_string(),
        &primitives::string("n"),
        &primitives::any_string(),
    ]);
    let a = determinize(a, WORK).unwrap();
    assert!(run(&a, "mn"));
    assert!(run(&a, "mone"));
    assert!(!run(&a, "m"));
}

#[test]
fn common_prefix_of_open_ended_literal() {
    let a = concatenate(&[&primitives::string("foo"), &primitives::any_string()]);
    assert_eq!("foo", get_common_prefix(&a).unwrap());
}

#[test]
fn singleton_extraction() {
    let xyz = primitives::string("xyz");
    assert_eq!(
        Some(vec!['x' as u32, 'y' as u32, 'z' as u32]),
        get_singleton(&xyz).unwrap()
    );
    assert_eq!(None, get_singleton(&primitives::any_string()).unwrap());
}
