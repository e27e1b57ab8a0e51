/*!
Primitive automaton constructors.

Everything here returns a small, deterministic, finished automaton:
the empty language, single characters and ranges, literal strings over
code points or bytes, the binary lexicographic interval, and the decimal
numeric interval. The regex compiler lowers its leaf nodes through these.
*/

use crate::automaton::{Automaton, MAX_CODE_POINT};
use crate::builder::Builder;
use crate::error::{Error, Result};

/// Returns a new automaton accepting no strings.
pub fn empty() -> Automaton {
    let mut a = Automaton::new();
    a.finish_state();
    a
}

/// Returns a new automaton accepting only the empty string.
pub fn empty_string() -> Automaton {
    let mut a = Automaton::new();
    let s = a.create_state();
    a.set_accept(s, true);
    a.finish_state();
    a
}

/// Returns a new automaton accepting all strings of code points.
pub fn any_string() -> Automaton {
    let mut a = Automaton::new();
    let s = a.create_state();
    a.set_accept(s, true);
    a.push_transition(s, s, 0, MAX_CODE_POINT);
    a.finish_state();
    a
}

/// Returns a new automaton accepting all byte strings.
pub fn any_binary() -> Automaton {
    let mut a = Automaton::new();
    let s = a.create_state();
    a.set_accept(s, true);
    a.push_transition(s, s, 0, 0xFF);
    a.finish_state();
    a
}

/// Returns a new automaton accepting all byte strings except the empty
/// one.
pub fn non_empty_binary() -> Automaton {
    let mut a = Automaton::new();
    let s1 = a.create_state();
    let s2 = a.create_state();
    a.set_accept(s2, true);
    a.push_transition(s1, s2, 0, 0xFF);
    a.push_transition(s2, s2, 0, 0xFF);
    a.finish_state();
    a
}

/// Returns a new automaton accepting any single code point.
pub fn any_char() -> Automaton {
    char_range(0, MAX_CODE_POINT)
}

/// Returns a new automaton accepting only the single label `c`.
pub fn char(c: u32) -> Automaton {
    char_range(c, c)
}

/// Returns a new automaton accepting any single label in `[min, max]`.
/// An inverted range yields the empty language.
pub fn char_range(min: u32, max: u32) -> Automaton {
    if min > max {
        return empty();
    }
    let mut a = Automaton::new();
    let s1 = a.create_state();
    let s2 = a.create_state();
    a.set_accept(s2, true);
    a.push_transition(s1, s2, min, max);
    a.finish_state();
    a
}

/// Returns a new automaton accepting exactly the given string of code
/// points.
pub fn string(s: &str) -> Automaton {
    let mut a = Automaton::new();
    let mut last = a.create_state();
    for c in s.chars() {
        let state = a.create_state();
        a.push_transition(last, state, c as u32, c as u32);
        last = state;
    }
    a.set_accept(last, true);
    a.finish_state();
    a
}

/// Returns a new automaton accepting exactly the given byte string.
pub fn binary(term: &[u8]) -> Automaton {
    let mut a = Automaton::new();
    let mut last = a.create_state();
    for &b in term {
        let state = a.create_state();
        a.push_transition(last, state, u32::from(b), u32::from(b));
        last = state;
    }
    a.set_accept(last, true);
    a.finish_state();
    a
}

/// Returns a new automaton accepting every byte string between `min` and
/// `max` in lexicographic order. `None` endpoints are unbounded and must
/// be inclusive (`OpenEndedBoundary` otherwise).
pub fn binary_interval(
    min: Option<&[u8]>,
    min_inclusive: bool,
    max: Option<&[u8]>,
    max_inclusive: bool,
) -> Result<Automaton> {
    if min.is_none() && !min_inclusive {
        return Err(Error::open_ended_boundary());
    }
    if max.is_none() && !max_inclusive {
        return Err(Error::open_ended_boundary());
    }
    let min_bytes = min.unwrap_or(&[]);

    let cmp = match max {
        Some(max_bytes) => min_bytes.cmp(max_bytes),
        None => {
            if min_bytes.is_empty() {
                return Ok(if min_inclusive { any_binary() } else { non_empty_binary() });
            }
            std::cmp::Ordering::Less
        }
    };
    match cmp {
        std::cmp::Ordering::Equal => {
            return Ok(if !min_inclusive || !max_inclusive {
                empty()
            } else {
                binary(min_bytes)
            });
        }
        std::cmp::Ordering::Greater => return Ok(empty()),
        std::cmp::Ordering::Less => {}
    }

    if let Some(max_bytes) = max {
        if max_bytes.starts_with(min_bytes) && suffix_is_zeros(max_bytes, min_bytes.len()) {
            // Finite case, no sink state: the upper bound only appends
            // zero bytes to the lower bound (bar <= x <= bar\0\0).
            let mut max_length = max_bytes.len();
            if !max_inclusive {
                max_length -= 1;
            }
            if max_length == min_bytes.len() {
                return Ok(if !min_inclusive { empty() } else { binary(min_bytes) });
            }

            let mut a = Automaton::new();
            let mut last = a.create_state();
            for &b in min_bytes {
                let state = a.create_state();
                a.push_transition(last, state, u32::from(b), u32::from(b));
                last = state;
            }
            if min_inclusive {
                a.set_accept(last, true);
            }
            for _ in min_bytes.len()..max_length {
                let state = a.create_state();
                a.push_transition(last, state, 0, 0);
                a.set_accept(state, true);
                last = state;
            }
            a.finish_state();
            return Ok(a);
        }
    }

    let mut a = Automaton::new();
    let start = a.create_state();
    let sink = a.create_state();
    a.set_accept(sink, true);
    // The sink accepts all suffixes.
    a.push_transition(sink, sink, 0, 0xFF);

    let mut equal_prefix = true;
    let mut last = start;
    let mut first_max_state = None;
    let mut shared_prefix_length = 0;
    for i in 0..min_bytes.len() {
        let min_label = u32::from(min_bytes[i]);
        let max_label = match max {
            Some(max_bytes) if equal_prefix && i < max_bytes.len() => {
                Some(u32::from(max_bytes[i]))
            }
            _ => None,
        };

        let next = if min_inclusive
            && i == min_bytes.len() - 1
            && (!equal_prefix || Some(min_label) != max_label)
        {
            sink
        } else {
            a.create_state()
        };

        if equal_prefix {
            match max_label {
                Some(max_label) if min_label == max_label => {
                    // Still in the shared prefix.
                    a.push_transition(last, next, min_label, min_label);
                }
                None => {
                    equal_prefix = false;
                    shared_prefix_length = 0;
                    a.push_transition(last, sink, min_label + 1, 0xFF);
                    a.push_transition(last, next, min_label, min_label);
                }
                Some(max_label) => {
                    // The first point where min and max diverge.
                    a.push_transition(last, next, min_label, min_label);
                    if max_label > min_label + 1 {
                        a.push_transition(last, sink, min_label + 1, max_label - 1);
                    }
                    // Fork off the path that tracks max.
                    let max_len = max.map_or(0, <[u8]>::len);
                    if max_inclusive || i < max_len - 1 {
                        let fork = a.create_state();
                        if i < max_len - 1 {
                            a.set_accept(fork, true);
                        }
                        a.push_transition(last, fork, max_label, max_label);
                        first_max_state = Some(fork);
                    }
                    equal_prefix = false;
                    shared_prefix_length = i;
                }
            }
        } else {
            // Already diverged.
            a.push_transition(last, next, min_label, min_label);
            if min_label < 0xFF {
                a.push_transition(last, sink, min_label + 1, 0xFF);
            }
        }
        last = next;
    }

    // Accept any suffix appended to the min term.
    if !equal_prefix && last != sink && last != start {
        a.push_transition(last, sink, 0, 0xFF);
    }
    if min_inclusive {
        // Accept exactly the min term.
        a.set_accept(last, true);
    }

    if let Some(max_bytes) = max {
        match first_max_state {
            None => {
                // Min was a full prefix of max.
                shared_prefix_length = min_bytes.len();
            }
            Some(fork) => {
                last = fork;
                shared_prefix_length += 1;
            }
        }
        for i in shared_prefix_length..max_bytes.len() {
            let max_label = u32::from(max_bytes[i]);
            if max_label > 0 {
                a.push_transition(last, sink, 0, max_label - 1);
            }
            if max_inclusive || i < max_bytes.len() - 1 {
                let next = a.create_state();
                if i < max_bytes.len() - 1 {
                    a.set_accept(next, true);
                }
                a.push_transition(last, next, max_label, max_label);
                last = next;
            }
        }
        if max_inclusive {
            a.set_accept(last, true);
        }
    }

    a.finish_state();
    Ok(a)
}

fn suffix_is_zeros(bytes: &[u8], from: usize) -> bool {
    bytes[from..].iter().all(|&b| b == 0)
}

/// Returns a new automaton accepting the decimal representations of the
/// integers in `[min, max]`.
///
/// With `digits > 0` the representation is zero-padded to exactly that
/// width; with `digits == 0` any width is accepted, including redundant
/// leading zeros. `min > max` is an `InvalidRange` error.
pub fn decimal_interval(min: u32, max: u32, digits: u32) -> Result<Automaton> {
    if min > max {
        return Err(Error::invalid_range(min, max));
    }
    let x = min.to_string();
    let y = max.to_string();
    let width = if digits > 0 { digits as usize } else { y.len() };
    let x = format!("{:0>width$}", x, width = width);
    let y = format!("{:0>width$}", y, width = width);

    let mut builder = Builder::new();
    if digits == 0 {
        // A sink for arbitrarily many leading zeros.
        builder.create_state();
    }
    let mut initials = Vec::new();
    between(&mut builder, x.as_bytes(), y.as_bytes(), 0, &mut initials, digits == 0);
    let mut a = builder.finish();

    if digits == 0 {
        a.push_transition(0, 0, u32::from(b'0'), u32::from(b'0'));
        for &p in &initials {
            a.push_epsilon(0, p);
        }
        a.finish_state();
    }
    Ok(a)
}

/// Accepts the digit strings d with `x[n..] <= d <= y[n..]`, assuming the
/// prefixes before `n` matched and `x[n] != y[n]` never flipped order.
/// States on an all-zeros prefix are recorded as alternative entry points
/// when `zeros` is set.
fn between(
    builder: &mut Builder,
    x: &[u8],
    y: &[u8],
    n: usize,
    initials: &mut Vec<u32>,
    zeros: bool,
) -> u32 {
    let s = builder.create_state();
    if x.len() == n {
        builder.set_accept(s, true);
    } else {
        if zeros {
            initials.push(s);
        }
        let cx = x[n];
        let cy = y[n];
        if cx == cy {
            let state = between(builder, x, y, n + 1, initials, zeros && cx == b'0');
            builder.push(s, state, u32::from(cx), u32::from(cx));
        } else {
            // cx < cy: fork into the lower edge, the upper edge, and the
            // free digits strictly between them.
            let state = at_least(builder, x, n + 1, initials, zeros && cx == b'0');
            builder.push(s, state, u32::from(cx), u32::from(cx));
            let state = at_most(builder, y, n + 1);
            builder.push(s, state, u32::from(cy), u32::from(cy));
            if cx + 1 < cy {
                let state = any_of_right_length(builder, x, n + 1);
                builder.push(s, state, u32::from(cx + 1), u32::from(cy - 1));
            }
        }
    }
    s
}

/// Accepts the digit strings d of the right length with `d >= x[n..]`.
fn at_least(
    builder: &mut Builder,
    x: &[u8],
    n: usize,
    initials: &mut Vec<u32>,
    zeros: bool,
) -> u32 {
    let s = builder.create_state();
    if x.len() == n {
        builder.set_accept(s, true);
    } else {
        if zeros {
            initials.push(s);
        }
        let c = x[n];
        let state = at_least(builder, x, n + 1, initials, zeros && c == b'0');
        builder.push(s, state, u32::from(c), u32::from(c));
        if c < b'9' {
            let state = any_of_right_length(builder, x, n + 1);
            builder.push(s, state, u32::from(c + 1), u32::from(b'9'));
        }
    }
    s
}

/// Accepts the digit strings d of the right length with `d <= x[n..]`.
fn at_most(builder: &mut Builder, x: &[u8], n: usize) -> u32 {
    let s = builder.create_state();
    if x.len() == n {
        builder.set_accept(s, true);
    } else {
        let c = x[n];
        let state = at_most(builder, x, n + 1);
        builder.push(s, state, u32::from(c), u32::from(c));
        if c > b'0' {
            let state = any_of_right_length(builder, x, n + 1);
            builder.push(s, state, u32::from(b'0'), u32::from(c - 1));
        }
    }
    s
}

/// Accepts any digit string as long as `x[n..]`.
fn any_of_right_length(builder: &mut Builder, x: &[u8], n: usize) -> u32 {
    let s = builder.create_state();
    if x.len() == n {
        builder.set_accept(s, true);
    } else {
        let state = any_of_right_length(builder, x, n + 1);
        builder.push(s, state, u32::from(b'0'), u32::from(b'9'));
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::determinize::{determinize, DEFAULT_DETERMINIZE_WORK_LIMIT};
    use crate::error::ErrorKind;
    use crate::run::{run, run_bytes};

    fn det(a: Automaton) -> Automaton {
        determinize(a, DEFAULT_DETERMINIZE_WORK_LIMIT).unwrap()
    }

    #[test]
    fn empty_accepts_nothing() {
        let a = empty();
        assert_eq!(0, a.num_states());
    }

    #[test]
    fn empty_string_accepts_only_empty() {
        let a = empty_string();
        assert!(run(&a, ""));
        assert!(!run(&a, "a"));
    }

    #[test]
    fn any_string_accepts_everything() {
        let a = any_string();
        assert!(run(&a, ""));
        assert!(run(&a, "abc"));
        assert!(run(&a, "\u{10FFFF}"));
    }

    #[test]
    fn char_and_range() {
        let a = char('x' as u32);
        assert!(run(&a, "x"));
        assert!(!run(&a, "y"));
        assert!(!run(&a, "xx"));

        let r = char_range('b' as u32, 'd' as u32);
        assert!(!run(&r, "a"));
        assert!(run(&r, "b"));
        assert!(run(&r, "d"));
        assert!(!run(&r, "e"));

        assert_eq!(0, char_range(5, 3).num_states());
    }

    #[test]
    fn string_accepts_exactly_itself() {
        let a = string("hello");
        assert!(a.is_deterministic());
        assert!(run(&a, "hello"));
        assert!(!run(&a, "hell"));
        assert!(!run(&a, "hello!"));
        assert!(run(&string(""), ""));
    }

    #[test]
    fn binary_accepts_exactly_itself() {
        let a = binary(b"\x00\xFF");
        assert!(run_bytes(&a, b"\x00\xFF"));
        assert!(!run_bytes(&a, b"\x00"));
        assert!(!run_bytes(&a, b"\x00\xFE"));
    }

    #[test]
    fn binary_interval_small_range() {
        // The lexicographic interval 00 <= x <= 10 00.
        let a = binary_interval(Some(b"\x00"), true, Some(b"\x10\x00"), true).unwrap();
        for b in 0u8..=0xFF {
            assert_eq!(b <= 0x0F, run_bytes(&a, &[b]), "byte {:#x}", b);
        }
        assert!(run_bytes(&a, b"\x10\x00"));
        assert!(run_bytes(&a, b"\x0F\xFF\xFF"));
        assert!(!run_bytes(&a, b"\x10\x01"));
        assert!(!run_bytes(&a, b"\x10\x00\x00"));
        assert!(!run_bytes(&a, b"\x11"));
        assert!(!run_bytes(&a, b""));
    }

    #[test]
    fn binary_interval_open_ended() {
        let all = binary_interval(None, true, None, true).unwrap();
        assert!(run_bytes(&all, b""));
        assert!(run_bytes(&all, b"\xFF\x00"));

        let from = binary_interval(Some(b"m"), true, None, true).unwrap();
        assert!(run_bytes(&from, b"m"));
        assert!(run_bytes(&from, b"z"));
        assert!(run_bytes(&from, b"ma"));
        assert!(!run_bytes(&from, b"l"));
        assert!(!run_bytes(&from, b""));

        let err = binary_interval(None, false, Some(b"x"), true).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::OpenEndedBoundary));
    }

    #[test]
    fn binary_interval_degenerate_bounds() {
        let point = binary_interval(Some(b"ab"), true, Some(b"ab"), true).unwrap();
        assert!(run_bytes(&point, b"ab"));
        assert!(!run_bytes(&point, b"aa"));

        let hollow = binary_interval(Some(b"ab"), false, Some(b"ab"), true).unwrap();
        assert_eq!(0, hollow.num_states());

        let inverted = binary_interval(Some(b"b"), true, Some(b"a"), true).unwrap();
        assert_eq!(0, inverted.num_states());
    }

    #[test]
    fn binary_interval_zero_padded_upper_bound() {
        // bar <= x <= bar\0\0 has a finite language.
        let a = binary_interval(Some(b"bar"), true, Some(b"bar\x00\x00"), true).unwrap();
        assert!(run_bytes(&a, b"bar"));
        assert!(run_bytes(&a, b"bar\x00"));
        assert!(run_bytes(&a, b"bar\x00\x00"));
        assert!(!run_bytes(&a, b"bar\x00\x00\x00"));
        assert!(!run_bytes(&a, b"bar\x01"));
    }

    #[test]
    fn binary_interval_exclusive_bounds() {
        let a = binary_interval(Some(b"aa"), false, Some(b"ac"), false).unwrap();
        let a = det(a);
        assert!(!run_bytes(&a, b"aa"));
        assert!(run_bytes(&a, b"aaa"));
        assert!(run_bytes(&a, b"ab"));
        assert!(run_bytes(&a, b"abzzz"));
        assert!(!run_bytes(&a, b"ac"));
        assert!(!run_bytes(&a, b"a"));
    }

    #[test]
    fn decimal_interval_variable_width() {
        let a = det(decimal_interval(5, 27, 0).unwrap());
        assert!(run(&a, "5"));
        assert!(run(&a, "05"));
        assert!(run(&a, "0017"));
        assert!(run(&a, "27"));
        assert!(!run(&a, "4"));
        assert!(!run(&a, "28"));
        assert!(!run(&a, ""));
        assert!(!run(&a, "270"));
    }

    #[test]
    fn decimal_interval_fixed_width() {
        let a = det(decimal_interval(5, 27, 3).unwrap());
        assert!(run(&a, "005"));
        assert!(run(&a, "017"));
        assert!(run(&a, "027"));
        assert!(!run(&a, "5"));
        assert!(!run(&a, "05"));
        assert!(!run(&a, "028"));
        assert!(!run(&a, "0005"));
    }

    #[test]
    fn decimal_interval_single_value() {
        let a = det(decimal_interval(42, 42, 0).unwrap());
        assert!(run(&a, "42"));
        assert!(run(&a, "042"));
        assert!(!run(&a, "41"));
        assert!(!run(&a, "43"));
    }

    #[test]
    fn decimal_interval_inverted_is_an_error() {
        let err = decimal_interval(7, 3, 0).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidRange { min: 7, max: 3 }));
    }
}
