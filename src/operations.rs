/*!
Automata transformations and queries.

Every transformation returns a fresh automaton and leaves its inputs
untouched. Pure compositions (`union`, `concatenate`, `intersection`,
repetition, `reverse`, `totalize`, dead-state removal) are infallible;
operations that embed a powerset construction (`determinize`,
`complement`, `minimize`) take an effort budget and can fail with
`TooComplex`.

Epsilon transitions are never stored: where a construction needs one, it
structurally absorbs the target's transitions into the source (see
[`Automaton::add_epsilon`]), so inputs must already be fully built.
*/

use std::collections::{HashMap, VecDeque};
use std::ptr;

use bit_set::BitSet;

use crate::automaton::{Automaton, Transition, MAX_CODE_POINT};
use crate::builder::Builder;
use crate::error::{Error, Result};
use crate::primitives;

pub use crate::determinize::{determinize, DEFAULT_DETERMINIZE_WORK_LIMIT};
pub use crate::minimize::minimize;

/// Returns an automaton accepting the union of the given languages.
///
/// A new initial state reaches every input's former initial state through
/// an absorbed epsilon; dead states are removed from the result.
pub fn union(automata: &[&Automaton]) -> Automaton {
    let mut result = Automaton::new();
    result.create_state();

    for a in automata {
        result.copy(a);
    }

    let mut state_offset = 1u32;
    for a in automata {
        if a.num_states() == 0 {
            continue;
        }
        result.push_epsilon(0, state_offset);
        state_offset += a.num_states();
    }

    result.finish_state();
    remove_dead_states(&result)
}

/// Returns an automaton accepting the concatenation of the given
/// languages, in order.
///
/// Every accept state of one input mirrors the next input's initial-state
/// transitions; when that next initial state itself accepts the empty
/// string, the mirror chain continues into the input after it, and so on.
/// Only the final input's accept states remain accepting.
pub fn concatenate(automata: &[&Automaton]) -> Automaton {
    let mut result = Automaton::new();

    // First pass: allocate all states up front so the transition pass can
    // point across input boundaries.
    for a in automata {
        if a.num_states() == 0 {
            // Concatenating the empty language yields the empty language.
            result.finish_state();
            return result;
        }
        for _ in 0..a.num_states() {
            result.create_state();
        }
    }

    let mut state_offset = 0u32;
    let mut t = Transition::new();
    for (i, a) in automata.iter().enumerate() {
        let num_states = a.num_states();
        for s in 0..num_states {
            let count = a.init_transition(s, &mut t);
            for _ in 0..count {
                a.get_next_transition(&mut t);
                result.push_transition(state_offset + s, state_offset + t.dest, t.min, t.max);
            }

            if a.is_accept(s) {
                let mut upto = i + 1;
                let mut follow = automata.get(upto);
                let mut follow_offset = state_offset;
                loop {
                    match follow {
                        Some(f) => {
                            let follow_count = f.init_transition(0, &mut t);
                            for _ in 0..follow_count {
                                f.get_next_transition(&mut t);
                                result.push_transition(
                                    state_offset + s,
                                    follow_offset + num_states + t.dest,
                                    t.min,
                                    t.max,
                                );
                            }
                            if f.is_accept(0) {
                                // Keep chaining while the next automaton
                                // accepts the empty string.
                                follow_offset += f.num_states();
                                upto += 1;
                                follow = automata.get(upto);
                            } else {
                                break;
                            }
                        }
                        None => {
                            result.set_accept(state_offset + s, true);
                            break;
                        }
                    }
                }
            }
        }
        state_offset += num_states;
    }

    if result.num_states() == 0 {
        result.create_state();
    }
    result.finish_state();
    result
}

/// Returns an automaton accepting the intersection of the two languages:
/// the classical product construction over sorted transitions. Dead
/// states are removed from the result.
pub fn intersection(a1: &Automaton, a2: &Automaton) -> Automaton {
    if ptr::eq(a1, a2) {
        return a1.clone();
    }
    if a1.num_states() == 0 {
        return a1.clone();
    }
    if a2.num_states() == 0 {
        return a2.clone();
    }

    let mut c = Automaton::new();
    c.create_state();
    let mut worklist: VecDeque<(u32, u32, u32)> = VecDeque::new();
    let mut pairs: HashMap<(u32, u32), u32> = HashMap::new();
    worklist.push_back((0, 0, 0));
    pairs.insert((0, 0), 0);

    while let Some((s, s1, s2)) = worklist.pop_front() {
        c.set_accept(s, a1.is_accept(s1) && a2.is_accept(s2));
        let t1 = a1.edges(s1);
        let t2 = a2.edges(s2);
        let mut b2 = 0;
        for e1 in t1 {
            while b2 < t2.len() && t2[b2].max < e1.min {
                b2 += 1;
            }
            let mut n2 = b2;
            while n2 < t2.len() && e1.max >= t2[n2].min {
                let e2 = t2[n2];
                if e2.max >= e1.min {
                    let q = match pairs.get(&(e1.dest, e2.dest)) {
                        Some(&q) => q,
                        None => {
                            let q = c.create_state();
                            worklist.push_back((q, e1.dest, e2.dest));
                            pairs.insert((e1.dest, e2.dest), q);
                            q
                        }
                    };
                    c.push_transition(s, q, e1.min.max(e2.min), e1.max.min(e2.max));
                }
                n2 += 1;
            }
        }
    }
    c.finish_state();
    remove_dead_states(&c)
}

/// Returns an automaton accepting the given language plus the empty
/// string.
pub fn optional(a: &Automaton) -> Automaton {
    let mut result = Automaton::new();
    result.create_state();
    result.set_accept(0, true);
    if a.num_states() > 0 {
        result.copy(a);
        result.push_epsilon(0, 1);
    }
    result.finish_state();
    result
}

/// Returns an automaton accepting the Kleene closure of the given
/// language: zero or more concatenated repetitions.
pub fn repeat(a: &Automaton) -> Automaton {
    if a.num_states() == 0 {
        // Repeating the empty language still accepts only the empty
        // language.
        return a.clone();
    }
    let mut builder = Builder::new();
    builder.create_state();
    builder.set_accept(0, true);
    builder.copy(a);

    let mut t = Transition::new();
    let count = a.init_transition(0, &mut t);
    for _ in 0..count {
        a.get_next_transition(&mut t);
        builder.push(0, t.dest + 1, t.min, t.max);
    }

    for s in 0..a.num_states() {
        if a.is_accept(s) {
            let count = a.init_transition(0, &mut t);
            for _ in 0..count {
                a.get_next_transition(&mut t);
                builder.push(s + 1, t.dest + 1, t.min, t.max);
            }
        }
    }
    builder.finish()
}

/// Returns an automaton accepting `count` or more concatenated
/// repetitions of the given language.
pub fn repeat_count(a: &Automaton, count: u32) -> Automaton {
    if count == 0 {
        return repeat(a);
    }
    let closure = repeat(a);
    let mut list: Vec<&Automaton> = vec![a; count as usize];
    list.push(&closure);
    concatenate(&list)
}

/// Returns an automaton accepting between `min` and `max` (inclusive)
/// concatenated repetitions of the given language. `min > max` yields the
/// empty language.
pub fn repeat_range(a: &Automaton, min: u32, max: u32) -> Automaton {
    if min > max {
        return primitives::empty();
    }

    let base = match min {
        0 => primitives::empty_string(),
        1 => {
            let mut b = Automaton::new();
            b.copy(a);
            b
        }
        _ => {
            let list: Vec<&Automaton> = vec![a; min as usize];
            concatenate(&list)
        }
    };

    let mut prev_accepts = accept_states_at(&base, 0);
    let mut builder = Builder::new();
    builder.copy(&base);
    for _ in min..max {
        let offset = builder.num_states();
        builder.copy(a);
        for &s in &prev_accepts {
            builder.add_epsilon(s, offset);
        }
        prev_accepts = accept_states_at(a, offset);
    }
    builder.finish()
}

fn accept_states_at(a: &Automaton, offset: u32) -> Vec<u32> {
    a.accept_states().map(|s| offset + s).collect()
}

/// Returns a total automaton for the same language: a dedicated
/// non-accepting sink with a self-loop over the full alphabet absorbs
/// every label gap of every state.
pub fn totalize(a: &Automaton) -> Automaton {
    let mut result = Automaton::new();
    let num_states = a.num_states();
    for s in 0..num_states {
        result.create_state();
        result.set_accept(s, a.is_accept(s));
    }
    let dead = result.create_state();
    result.push_transition(dead, dead, 0, MAX_CODE_POINT);

    let mut t = Transition::new();
    for s in 0..num_states {
        let mut next_label = 0u32;
        let count = a.init_transition(s, &mut t);
        for _ in 0..count {
            a.get_next_transition(&mut t);
            result.push_transition(s, t.dest, t.min, t.max);
            if t.min > next_label {
                result.push_transition(s, dead, next_label, t.min - 1);
            }
            if t.max + 1 > next_label {
                next_label = t.max + 1;
            }
        }
        if next_label <= MAX_CODE_POINT {
            result.push_transition(s, dead, next_label, MAX_CODE_POINT);
        }
    }
    result.finish_state();
    result
}

/// Returns an automaton accepting the complement of the given language
/// over the full code-point alphabet: determinize, totalize, flip every
/// accept bit, drop dead states. `work_limit` bounds the embedded
/// determinization.
pub fn complement(a: Automaton, work_limit: usize) -> Result<Automaton> {
    let a = determinize(a, work_limit)?;
    let mut a = totalize(&a);
    for s in 0..a.num_states() {
        let accept = a.is_accept(s);
        a.set_accept(s, !accept);
    }
    Ok(remove_dead_states(&a))
}

/// Returns an automaton accepting the reversed strings of the given
/// language.
pub fn reverse(a: &Automaton) -> Automaton {
    if is_empty(a) {
        return Automaton::new();
    }
    let num_states = a.num_states();

    // Build a new automaton with all edges reversed; state s maps to
    // s + 1, leaving room for the fresh initial state.
    let mut builder = Builder::new();
    builder.create_state();
    for _ in 0..num_states {
        builder.create_state();
    }
    // The old initial state becomes the accept state.
    builder.set_accept(1, true);

    let mut t = Transition::new();
    for s in 0..num_states {
        let count = a.init_transition(s, &mut t);
        for _ in 0..count {
            a.get_next_transition(&mut t);
            builder.push(t.dest + 1, s + 1, t.min, t.max);
        }
    }
    let mut result = builder.finish();

    // The old accept states seed the new initial state.
    for s in a.accept_states() {
        result.push_epsilon(0, s + 1);
    }
    result.finish_state();
    result
}

/// Returns an automaton with only live states: states reachable from the
/// initial state from which some accept state is reachable. Transitions
/// into dead states are dropped.
pub fn remove_dead_states(a: &Automaton) -> Automaton {
    let num_states = a.num_states();
    let live = get_live_states(a);

    let mut map = vec![0u32; num_states as usize];
    let mut result = Automaton::new();
    for s in 0..num_states {
        if live.contains(s as usize) {
            map[s as usize] = result.create_state();
            result.set_accept(map[s as usize], a.is_accept(s));
        }
    }

    let mut t = Transition::new();
    for s in 0..num_states {
        if !live.contains(s as usize) {
            continue;
        }
        let count = a.init_transition(s, &mut t);
        for _ in 0..count {
            a.get_next_transition(&mut t);
            if live.contains(t.dest as usize) {
                result.push_transition(map[s as usize], map[t.dest as usize], t.min, t.max);
            }
        }
    }
    result.finish_state();
    result
}

/// The live states: reachable from the initial state and able to reach
/// an accept state.
pub fn get_live_states(a: &Automaton) -> BitSet {
    let mut live = get_live_states_from_initial(a);
    live.intersect_with(&get_live_states_to_accept(a));
    live
}

/// The states reachable from the initial state.
pub fn get_live_states_from_initial(a: &Automaton) -> BitSet {
    let num_states = a.num_states();
    let mut live = BitSet::with_capacity(num_states as usize);
    if num_states == 0 {
        return live;
    }
    let mut worklist = VecDeque::new();
    live.insert(0);
    worklist.push_back(0u32);

    let mut t = Transition::new();
    while let Some(s) = worklist.pop_front() {
        let count = a.init_transition(s, &mut t);
        for _ in 0..count {
            a.get_next_transition(&mut t);
            if !live.contains(t.dest as usize) {
                live.insert(t.dest as usize);
                worklist.push_back(t.dest);
            }
        }
    }
    live
}

/// The states from which some accept state is reachable, found by a
/// breadth-first pass over the reversed transition graph.
pub fn get_live_states_to_accept(a: &Automaton) -> BitSet {
    let num_states = a.num_states();

    let mut builder = Builder::new();
    let mut t = Transition::new();
    for _ in 0..num_states {
        builder.create_state();
    }
    for s in 0..num_states {
        let count = a.init_transition(s, &mut t);
        for _ in 0..count {
            a.get_next_transition(&mut t);
            builder.push(t.dest, s, t.min, t.max);
        }
    }
    let reversed = builder.finish();

    let mut live = BitSet::with_capacity(num_states as usize);
    let mut worklist = VecDeque::new();
    for s in a.accept_states() {
        live.insert(s as usize);
        worklist.push_back(s);
    }
    while let Some(s) = worklist.pop_front() {
        let count = reversed.init_transition(s, &mut t);
        for _ in 0..count {
            reversed.get_next_transition(&mut t);
            if !live.contains(t.dest as usize) {
                live.insert(t.dest as usize);
                worklist.push_back(t.dest);
            }
        }
    }
    live
}

/// Returns true if some state is reachable from the initial state but
/// cannot reach an accept state.
pub fn has_dead_states_from_initial(a: &Automaton) -> bool {
    let mut reachable = get_live_states_from_initial(a);
    reachable.difference_with(&get_live_states_to_accept(a));
    !reachable.is_empty()
}

/// Returns true if the given automaton accepts no strings.
pub fn is_empty(a: &Automaton) -> bool {
    if a.num_states() == 0 {
        // Common case: no states.
        return true;
    }
    if !a.is_accept(0) && a.num_transitions_of(0) == 0 {
        // Common case: just one initial state.
        return true;
    }
    if a.is_accept(0) {
        // It accepts at least the empty string.
        return false;
    }

    let mut worklist = VecDeque::new();
    let mut seen = BitSet::with_capacity(a.num_states() as usize);
    worklist.push_back(0u32);
    seen.insert(0);

    let mut t = Transition::new();
    while let Some(state) = worklist.pop_front() {
        if a.is_accept(state) {
            return false;
        }
        let count = a.init_transition(state, &mut t);
        for _ in 0..count {
            a.get_next_transition(&mut t);
            if !seen.contains(t.dest as usize) {
                worklist.push_back(t.dest);
                seen.insert(t.dest as usize);
            }
        }
    }
    true
}

/// Returns true if the given automaton accepts all strings over the full
/// code-point alphabet. The automaton must be minimized.
pub fn is_total(a: &Automaton) -> bool {
    is_total_range(a, 0, MAX_CODE_POINT)
}

/// Returns true if the given automaton accepts all strings over the
/// `[min_alphabet, max_alphabet]` label range. The automaton must be
/// minimized.
pub fn is_total_range(a: &Automaton, min_alphabet: u32, max_alphabet: u32) -> bool {
    if a.num_states() == 0 {
        return false;
    }
    if a.is_accept(0) && a.num_transitions_of(0) == 1 {
        let mut t = Transition::new();
        a.get_transition(0, 0, &mut t);
        return t.dest == 0 && t.min == min_alphabet && t.max == max_alphabet;
    }
    false
}

/// Returns true if the given automaton accepts a finite language. The
/// automaton must be free of dead states; a cycle reachable from the
/// initial state then implies infinitely many accepted strings.
pub fn is_finite(a: &Automaton) -> bool {
    if a.num_states() == 0 {
        return true;
    }
    let num_states = a.num_states() as usize;
    let mut path = BitSet::with_capacity(num_states);
    let mut visited = BitSet::with_capacity(num_states);

    // Depth-first search over (state, next transition index) frames; a
    // transition back into the current path closes a cycle.
    let mut stack: Vec<(u32, usize)> = vec![(0, 0)];
    path.insert(0);
    let mut t = Transition::new();
    while let Some(&(state, index)) = stack.last() {
        if index < a.num_transitions_of(state) {
            if let Some(frame) = stack.last_mut() {
                frame.1 += 1;
            }
            a.get_transition(state, index, &mut t);
            if path.contains(t.dest as usize) {
                return false;
            }
            if !visited.contains(t.dest as usize) {
                path.insert(t.dest as usize);
                stack.push((t.dest, 0));
            }
        } else {
            path.remove(state as usize);
            visited.insert(state as usize);
            stack.pop();
        }
    }
    true
}

/// If the given automaton accepts exactly one string, returns its labels;
/// otherwise returns `None`. Fails with `NonDeterministicInput` when the
/// automaton is not deterministic.
pub fn get_singleton(a: &Automaton) -> Result<Option<Vec<u32>>> {
    if !a.is_deterministic() {
        return Err(Error::non_deterministic_input());
    }
    if a.num_states() == 0 {
        return Ok(None);
    }

    let mut labels = Vec::new();
    let mut visited = BitSet::with_capacity(a.num_states() as usize);
    let mut s = 0u32;
    let mut t = Transition::new();
    loop {
        visited.insert(s as usize);
        if !a.is_accept(s) {
            if a.num_transitions_of(s) == 1 {
                a.get_transition(s, 0, &mut t);
                if t.min == t.max && !visited.contains(t.dest as usize) {
                    labels.push(t.min);
                    s = t.dest;
                    continue;
                }
            }
        } else if a.num_transitions_of(s) == 0 {
            return Ok(Some(labels));
        }
        // The automaton accepts zero or more than one string.
        return Ok(None);
    }
}

/// The longest label sequence that prefixes every accepted string.
///
/// Fails with `DeadStates` if the automaton has states reachable from the
/// initial state that cannot reach an accept state; those would let the
/// level-by-level walk below run off into strings the automaton never
/// accepts.
fn common_prefix_labels(a: &Automaton) -> Result<Vec<u32>> {
    if has_dead_states_from_initial(a) {
        return Err(Error::dead_states());
    }
    if is_empty(a) {
        return Ok(Vec::new());
    }
    let num_states = a.num_states() as usize;
    let mut labels = Vec::new();
    let mut current = BitSet::with_capacity(num_states);
    let mut next = BitSet::with_capacity(num_states);
    current.insert(0);

    let mut t = Transition::new();
    'walk: loop {
        let mut label: Option<u32> = None;
        for state in current.iter() {
            let state = state as u32;
            // Reaching an accept state ends the shared prefix.
            if a.is_accept(state) {
                break 'walk;
            }
            for i in 0..a.num_transitions_of(state) {
                a.get_transition(state, i, &mut t);
                if label.is_none() {
                    label = Some(t.min);
                }
                // Either a range of labels, or a label that disagrees with
                // the other paths this round.
                if t.min != t.max || label != Some(t.min) {
                    break 'walk;
                }
                next.insert(t.dest as usize);
            }
        }
        match label {
            Some(label) => labels.push(label),
            None => break,
        }
        std::mem::swap(&mut current, &mut next);
        next.clear();
    }
    Ok(labels)
}

/// Returns the longest string that is a prefix of all accepted strings.
///
/// The automaton must be free of dead states (`DeadStates` otherwise).
/// Labels outside the Unicode scalar range end the prefix, since no
/// string can continue through them.
pub fn get_common_prefix(a: &Automaton) -> Result<String> {
    let labels = common_prefix_labels(a)?;
    let mut prefix = String::new();
    for label in labels {
        match char::from_u32(label) {
            Some(c) => prefix.push(c),
            None => break,
        }
    }
    Ok(prefix)
}

/// Returns the longest byte sequence that is a prefix of all accepted
/// byte strings. Fails with `NotBinary` when a prefix label exceeds
/// `0xFF`, and with `DeadStates` like [`get_common_prefix`].
pub fn get_common_prefix_bytes(a: &Automaton) -> Result<Vec<u8>> {
    let labels = common_prefix_labels(a)?;
    labels
        .into_iter()
        .map(|label| if label > 0xFF { Err(Error::not_binary(label)) } else { Ok(label as u8) })
        .collect()
}

/// Returns the longest byte sequence that is a suffix of all accepted
/// byte strings: the common prefix of the reversed language, reversed.
pub fn get_common_suffix_bytes(a: &Automaton) -> Result<Vec<u8>> {
    let reversed = remove_dead_states(&reverse(a));
    let mut suffix = get_common_prefix_bytes(&reversed)?;
    suffix.reverse();
    Ok(suffix)
}
