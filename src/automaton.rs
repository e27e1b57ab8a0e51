use std::collections::BTreeSet;

use bit_set::BitSet;

use crate::error::{Error, Result};

/// The largest label usable in a character automaton (the maximum Unicode
/// code point). Binary automata restrict themselves to `[0, 255]`, but the
/// representation does not track which alphabet is in use; callers must be
/// consistent.
pub const MAX_CODE_POINT: u32 = 0x10FFFF;

/// Sentinel offset for a state that has not received any transitions yet.
const UNSET: u32 = u32::MAX;

/// One packed transition: every label in `[min, max]` leads to `dest`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Edge {
    pub(crate) dest: u32,
    pub(crate) min: u32,
    pub(crate) max: u32,
}

/// Per-state header into the packed transition table.
#[derive(Clone, Copy, Debug)]
struct StateHeader {
    /// Index of this state's first transition, or `UNSET`.
    offset: u32,
    /// Number of transitions leaving this state.
    count: u32,
}

/// A cursor over the transitions leaving one state.
///
/// `init_transition` positions the cursor on a state; each
/// `get_next_transition` fills in `dest`, `min` and `max` for the next
/// transition. The same struct doubles as a plain transition record for
/// `get_transition` and as the resumable lookup handle for [`Automaton::next`].
/// Reusing one cursor across loops avoids any per-transition allocation.
#[derive(Clone, Copy, Debug, Default)]
pub struct Transition {
    pub source: u32,
    pub dest: u32,
    pub min: u32,
    pub max: u32,
    /// Cursor position. Absolute transition index during iteration;
    /// state-relative index for resumable lookups via `next`.
    upto: usize,
}

impl Transition {
    /// A cursor positioned nowhere. Use [`Automaton::init_transition`] to
    /// point it at a state.
    pub fn new() -> Transition {
        Transition::default()
    }
}

/// A finite-state automaton over integer-labeled transitions.
///
/// States are dense `u32` indices created with `create_state`; state 0 is
/// always the initial state. Transitions are label ranges `(dest, min, max)`
/// kept in one packed table, with a per-state `(offset, count)` header, so
/// traversal is cache-friendly and allocation-free.
///
/// All transitions leaving a state must be added together: as soon as a
/// transition is added for a different source (or [`Automaton::finish_state`]
/// is called), the previous state is frozen — its transitions are sorted
/// (by min, then max, then dest) and reduced (ranges with adjacent labels
/// going to the same dest are combined). Adding to a frozen state is an
/// error. Callers that cannot group transitions by source should use
/// [`crate::Builder`] instead.
#[derive(Clone, Debug)]
pub struct Automaton {
    states: Vec<StateHeader>,
    transitions: Vec<Edge>,
    accept: BitSet,
    /// True while no state has two transitions leaving on the same label.
    deterministic: bool,
    /// The state currently receiving transitions, if any.
    cur_state: Option<u32>,
}

impl Automaton {
    /// Create an empty automaton with no states.
    pub fn new() -> Automaton {
        Automaton::with_capacity(2, 2)
    }

    /// Create an empty automaton with storage reserved for approximately
    /// `num_states` states and `num_transitions` transitions.
    pub fn with_capacity(num_states: usize, num_transitions: usize) -> Automaton {
        Automaton {
            states: Vec::with_capacity(num_states),
            transitions: Vec::with_capacity(num_transitions),
            accept: BitSet::with_capacity(num_states),
            deterministic: true,
            cur_state: None,
        }
    }

    /// Create a new state and return its id.
    pub fn create_state(&mut self) -> u32 {
        let state = self.states.len() as u32;
        self.states.push(StateHeader { offset: UNSET, count: 0 });
        state
    }

    /// Set or clear `state` as an accept state.
    pub fn set_accept(&mut self, state: u32, accept: bool) {
        if accept {
            self.accept.insert(state as usize);
        } else {
            self.accept.remove(state as usize);
        }
    }

    /// Returns true if `state` is an accept state.
    pub fn is_accept(&self, state: u32) -> bool {
        self.accept.contains(state as usize)
    }

    /// Returns true if no state has two transitions leaving on the same
    /// label.
    pub fn is_deterministic(&self) -> bool {
        self.deterministic
    }

    /// How many states this automaton has.
    pub fn num_states(&self) -> u32 {
        self.states.len() as u32
    }

    /// How many transitions this automaton has in total.
    pub fn num_transitions(&self) -> usize {
        self.transitions.len()
    }

    /// How many transitions leave `state`.
    pub fn num_transitions_of(&self, state: u32) -> usize {
        self.states[state as usize].count as usize
    }

    /// Add a new transition on every label in `[min, max]` from `source` to
    /// `dest`.
    ///
    /// Fails with `InvalidRange` when `min > max`, and with `BuilderOrder`
    /// when `source` was already frozen.
    pub fn add_transition(&mut self, source: u32, dest: u32, min: u32, max: u32) -> Result<()> {
        if min > max {
            return Err(Error::invalid_range(min, max));
        }
        if self.cur_state != Some(source) && self.states[source as usize].offset != UNSET {
            return Err(Error::builder_order(source));
        }
        self.push_transition(source, dest, min, max);
        Ok(())
    }

    /// Add a new transition with `min == max == label`.
    pub fn add_transition_label(&mut self, source: u32, dest: u32, label: u32) -> Result<()> {
        self.add_transition(source, dest, label, label)
    }

    /// Append a transition whose ordering and range are guaranteed correct
    /// by the caller. Transformations and the replay in `Builder::finish`
    /// construct sources in grouped order, so the public checks cannot fire
    /// for them.
    pub(crate) fn push_transition(&mut self, source: u32, dest: u32, min: u32, max: u32) {
        debug_assert!(min <= max, "transition range {}..={} is inverted", min, max);
        debug_assert!((dest as usize) < self.states.len());
        if self.cur_state != Some(source) {
            if let Some(cur) = self.cur_state.take() {
                self.finish_current_state(cur);
            }
            debug_assert!(
                self.states[source as usize].offset == UNSET,
                "state {} already frozen",
                source
            );
            self.cur_state = Some(source);
            self.states[source as usize].offset = self.transitions.len() as u32;
        }
        self.transitions.push(Edge { dest, min, max });
        self.states[source as usize].count += 1;
    }

    /// Add a "virtual" epsilon transition between `source` and `dest`:
    /// every outgoing transition of `dest` is copied onto `source`, and
    /// `dest`'s accept bit propagates to `source`. `dest` must already have
    /// all of its transitions added.
    pub fn add_epsilon(&mut self, source: u32, dest: u32) -> Result<()> {
        if self.cur_state != Some(source) && self.states[source as usize].offset != UNSET {
            return Err(Error::builder_order(source));
        }
        self.push_epsilon(source, dest);
        Ok(())
    }

    pub(crate) fn push_epsilon(&mut self, source: u32, dest: u32) {
        // Settle any pending state so that dest's transitions are in their
        // canonical, stable positions before we copy them.
        if let Some(cur) = self.cur_state {
            if cur != source {
                self.cur_state = None;
                self.finish_current_state(cur);
            }
        }
        let header = self.states[dest as usize];
        if header.offset != UNSET {
            let offset = header.offset as usize;
            for i in 0..header.count as usize {
                let e = self.transitions[offset + i];
                self.push_transition(source, e.dest, e.min, e.max);
            }
        }
        if self.is_accept(dest) {
            self.set_accept(source, true);
        }
    }

    /// Finishes the current state; call this once you are done adding
    /// transitions for a state. This happens automatically when you start
    /// adding transitions to a new source state, but the last state touched
    /// needs an explicit call.
    pub fn finish_state(&mut self) {
        if let Some(cur) = self.cur_state.take() {
            self.finish_current_state(cur);
        }
    }

    /// Freezes `state`: sorts its transitions by (dest, min, max), merges
    /// ranges with adjacent labels going to the same dest, re-sorts by
    /// (min, max, dest) and re-checks determinism.
    fn finish_current_state(&mut self, state: u32) {
        let offset = self.states[state as usize].offset as usize;
        let count = self.states[state as usize].count as usize;
        debug_assert_eq!(offset + count, self.transitions.len());

        self.transitions[offset..offset + count]
            .sort_unstable_by_key(|e| (e.dest, e.min, e.max));

        // Reduce any "adjacent" transitions.
        let mut upto = 0;
        let mut acc: Option<Edge> = None;
        for i in 0..count {
            let e = self.transitions[offset + i];
            match acc {
                Some(ref mut a) if a.dest == e.dest && e.min <= a.max.saturating_add(1) => {
                    if e.max > a.max {
                        a.max = e.max;
                    }
                }
                _ => {
                    if let Some(a) = acc {
                        self.transitions[offset + upto] = a;
                        upto += 1;
                    }
                    acc = Some(e);
                }
            }
        }
        if let Some(a) = acc {
            self.transitions[offset + upto] = a;
            upto += 1;
        }
        self.transitions.truncate(offset + upto);
        self.states[state as usize].count = upto as u32;

        self.transitions[offset..offset + upto]
            .sort_unstable_by_key(|e| (e.min, e.max, e.dest));

        if self.deterministic && upto > 1 {
            let mut last_max = self.transitions[offset].max;
            for i in 1..upto {
                let e = self.transitions[offset + i];
                if e.min <= last_max {
                    self.deterministic = false;
                    break;
                }
                last_max = e.max;
            }
        }
    }

    /// Copies over all states and transitions from `other`, appending them
    /// with sequentially reassigned state ids. `other` must be finished.
    pub fn copy(&mut self, other: &Automaton) {
        self.finish_state();
        let state_offset = self.num_states();
        let edge_offset = self.transitions.len() as u32;

        for header in &other.states {
            let offset =
                if header.offset == UNSET { UNSET } else { header.offset + edge_offset };
            self.states.push(StateHeader { offset, count: header.count });
        }
        for s in other.accept.iter() {
            self.accept.insert(state_offset as usize + s);
        }
        self.transitions.extend(
            other.transitions.iter().map(|e| Edge { dest: e.dest + state_offset, ..*e }),
        );
        if !other.deterministic {
            self.deterministic = false;
        }
    }

    /// Position `t` to iterate through all transitions leaving `state`,
    /// returning how many there are. Call `get_next_transition` once per
    /// transition.
    pub fn init_transition(&self, state: u32, t: &mut Transition) -> usize {
        t.source = state;
        let header = self.states[state as usize];
        t.upto = if header.offset == UNSET { 0 } else { header.offset as usize };
        header.count as usize
    }

    /// Advance `t` to the next transition of its state.
    pub fn get_next_transition(&self, t: &mut Transition) {
        let e = self.transitions[t.upto];
        t.dest = e.dest;
        t.min = e.min;
        t.max = e.max;
        t.upto += 1;
    }

    /// Fill `t` with the `index`'th transition leaving `state`.
    pub fn get_transition(&self, state: u32, index: usize, t: &mut Transition) {
        let offset = self.states[state as usize].offset as usize;
        let e = self.transitions[offset + index];
        t.source = state;
        t.dest = e.dest;
        t.min = e.min;
        t.max = e.max;
    }

    /// The packed transitions leaving `state`. Empty until the state has
    /// received transitions; canonical once the state is finished.
    pub(crate) fn edges(&self, state: u32) -> &[Edge] {
        let header = self.states[state as usize];
        if header.offset == UNSET {
            return &[];
        }
        let offset = header.offset as usize;
        &self.transitions[offset..offset + header.count as usize]
    }

    /// Looks up the destination for `label` out of `state`, assuming
    /// determinism: binary search over the state's sorted transition ranges.
    /// Returns `None` if no outgoing transition matches.
    pub fn step(&self, state: u32, label: u32) -> Option<u32> {
        self.lookup(state, 0, label, None)
    }

    /// Like [`Automaton::step`], but resumes the binary search from the
    /// transition index recorded in `t` by the previous call, which is
    /// cheaper when looking up several ascending labels from one source
    /// state. `t.source` selects the state; the matched transition is
    /// written back into `t`.
    pub fn next(&self, t: &mut Transition, label: u32) -> Option<u32> {
        self.lookup(t.source, t.upto, label, Some(t))
    }

    fn lookup(
        &self,
        state: u32,
        from: usize,
        label: u32,
        mut t: Option<&mut Transition>,
    ) -> Option<u32> {
        let header = self.states[state as usize];
        let offset = header.offset as usize;

        let mut low = from;
        let mut high = header.count as usize;
        while low < high {
            let mid = (low + high) / 2;
            let e = self.transitions[offset + mid];
            if e.min > label {
                high = mid;
            } else if e.max < label {
                low = mid + 1;
            } else {
                if let Some(ref mut t) = t {
                    t.dest = e.dest;
                    t.min = e.min;
                    t.max = e.max;
                    t.upto = mid;
                }
                return Some(e.dest);
            }
        }
        if let Some(t) = t {
            t.upto = low;
        }
        None
    }

    /// Returns the sorted array of all interval start points: for every
    /// transition, its `min` and `max + 1` (when below the alphabet
    /// maximum), plus 0.
    pub fn get_start_points(&self) -> Vec<u32> {
        let mut points = BTreeSet::new();
        points.insert(0);
        for e in &self.transitions {
            points.insert(e.min);
            if e.max < MAX_CODE_POINT {
                points.insert(e.max + 1);
            }
        }
        points.into_iter().collect()
    }

    /// Iterate over the accept states in ascending order.
    pub(crate) fn accept_states(&self) -> impl Iterator<Item = u32> + '_ {
        self.accept.iter().map(|s| s as u32)
    }
}

impl Default for Automaton {
    fn default() -> Automaton {
        Automaton::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn canonical_sort_and_merge() {
        let mut a = Automaton::new();
        let s0 = a.create_state();
        let s1 = a.create_state();
        let s2 = a.create_state();
        // Unordered, with mergeable ranges to the same dest.
        a.add_transition(s0, s2, 30, 40).unwrap();
        a.add_transition(s0, s1, 10, 15).unwrap();
        a.add_transition(s0, s1, 16, 20).unwrap();
        a.add_transition(s0, s1, 18, 19).unwrap();
        a.finish_state();

        assert_eq!(2, a.num_transitions_of(s0));
        let mut t = Transition::new();
        a.get_transition(s0, 0, &mut t);
        assert_eq!((s1, 10, 20), (t.dest, t.min, t.max));
        a.get_transition(s0, 1, &mut t);
        assert_eq!((s2, 30, 40), (t.dest, t.min, t.max));
        assert!(a.is_deterministic());
    }

    #[test]
    fn abutting_ranges_to_different_dests_stay_separate() {
        let mut a = Automaton::new();
        let s0 = a.create_state();
        let s1 = a.create_state();
        let s2 = a.create_state();
        a.add_transition(s0, s1, 10, 20).unwrap();
        a.add_transition(s0, s2, 21, 30).unwrap();
        a.finish_state();
        assert_eq!(2, a.num_transitions_of(s0));
        assert!(a.is_deterministic());
    }

    #[test]
    fn overlap_clears_determinism() {
        let mut a = Automaton::new();
        let s0 = a.create_state();
        let s1 = a.create_state();
        let s2 = a.create_state();
        a.add_transition(s0, s1, 10, 20).unwrap();
        a.add_transition(s0, s2, 15, 25).unwrap();
        a.finish_state();
        assert!(!a.is_deterministic());
    }

    #[test]
    fn frozen_state_rejects_transitions() {
        let mut a = Automaton::new();
        let s0 = a.create_state();
        let s1 = a.create_state();
        a.add_transition(s0, s1, b'a' as u32, b'a' as u32).unwrap();
        a.add_transition(s1, s1, b'b' as u32, b'b' as u32).unwrap();
        let err = a.add_transition(s0, s1, b'c' as u32, b'c' as u32).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::BuilderOrder { state: 0 }));
    }

    #[test]
    fn inverted_range_rejected() {
        let mut a = Automaton::new();
        let s0 = a.create_state();
        let err = a.add_transition(s0, s0, 5, 3).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidRange { min: 5, max: 3 }));
    }

    #[test]
    fn step_binary_search() {
        let mut a = Automaton::new();
        let s0 = a.create_state();
        let s1 = a.create_state();
        let s2 = a.create_state();
        let s3 = a.create_state();
        a.add_transition(s0, s1, 10, 19).unwrap();
        a.add_transition(s0, s2, 30, 39).unwrap();
        a.add_transition(s0, s3, 50, 59).unwrap();
        a.finish_state();

        assert_eq!(Some(s1), a.step(s0, 10));
        assert_eq!(Some(s1), a.step(s0, 19));
        assert_eq!(Some(s2), a.step(s0, 35));
        assert_eq!(Some(s3), a.step(s0, 59));
        assert_eq!(None, a.step(s0, 9));
        assert_eq!(None, a.step(s0, 25));
        assert_eq!(None, a.step(s0, 60));
        assert_eq!(None, a.step(s1, 10));
    }

    #[test]
    fn next_resumes_from_cursor() {
        let mut a = Automaton::new();
        let s0 = a.create_state();
        let s1 = a.create_state();
        let s2 = a.create_state();
        a.add_transition(s0, s1, 10, 19).unwrap();
        a.add_transition(s0, s2, 30, 39).unwrap();
        a.finish_state();

        let mut t = Transition::new();
        t.source = s0;
        assert_eq!(Some(s1), a.next(&mut t, 12));
        assert_eq!(Some(s2), a.next(&mut t, 33));
        assert_eq!(None, a.next(&mut t, 40));
    }

    #[test]
    fn epsilon_copies_transitions_and_accept() {
        let mut a = Automaton::new();
        let s0 = a.create_state();
        let s1 = a.create_state();
        let s2 = a.create_state();
        a.set_accept(s2, true);
        a.add_transition(s1, s2, b'x' as u32, b'z' as u32).unwrap();
        a.finish_state();
        a.set_accept(s1, true);
        a.add_epsilon(s0, s1).unwrap();
        a.finish_state();

        assert!(a.is_accept(s0));
        assert_eq!(Some(s2), a.step(s0, b'y' as u32));
    }

    #[test]
    fn copy_fixes_up_state_ids() {
        let mut a = Automaton::new();
        let s0 = a.create_state();
        let s1 = a.create_state();
        a.set_accept(s1, true);
        a.add_transition(s0, s1, b'a' as u32, b'a' as u32).unwrap();
        a.finish_state();

        let mut b = Automaton::new();
        b.create_state();
        b.copy(&a);
        b.finish_state();

        assert_eq!(3, b.num_states());
        assert!(b.is_accept(2));
        assert_eq!(Some(2), b.step(1, b'a' as u32));
    }

    #[test]
    fn start_points_include_zero_and_range_bounds() {
        let mut a = Automaton::new();
        let s0 = a.create_state();
        let s1 = a.create_state();
        a.add_transition(s0, s1, b'a' as u32, b'c' as u32).unwrap();
        a.add_transition(s1, s1, b'b' as u32, b'b' as u32).unwrap();
        a.finish_state();

        let points = a.get_start_points();
        assert_eq!(
            vec![0, b'a' as u32, b'b' as u32, b'c' as u32, b'c' as u32 + 1],
            points
        );
    }

    #[test]
    fn start_points_skip_past_alphabet_max() {
        let mut a = Automaton::new();
        let s0 = a.create_state();
        a.add_transition(s0, s0, 5, MAX_CODE_POINT).unwrap();
        a.finish_state();
        assert_eq!(vec![0, 5], a.get_start_points());
    }
}
