use bit_set::BitSet;

use crate::automaton::{Automaton, Transition};
use crate::error::{Error, Result};

/// One buffered transition, waiting for [`Builder::finish`].
#[derive(Clone, Copy, Debug)]
struct Quad {
    source: u32,
    dest: u32,
    min: u32,
    max: u32,
}

/// Records new states and transitions in any order, then `finish` creates
/// the [`Automaton`].
///
/// Use this when you cannot build the automaton directly because it is too
/// restrictive to have to add all transitions leaving each state at once.
/// Transitions are buffered unsorted; `finish` sorts them by
/// `(source, dest, min, max)` and replays them grouped by source, which is
/// exactly the order the automaton's incremental API requires.
#[derive(Clone, Debug)]
pub struct Builder {
    next_state: u32,
    accept: BitSet,
    transitions: Vec<Quad>,
}

impl Builder {
    /// Create a builder with no states.
    pub fn new() -> Builder {
        Builder::with_capacity(16, 16)
    }

    /// Create a builder with storage reserved for approximately
    /// `num_states` states and `num_transitions` transitions.
    pub fn with_capacity(num_states: usize, num_transitions: usize) -> Builder {
        Builder {
            next_state: 0,
            accept: BitSet::with_capacity(num_states),
            transitions: Vec::with_capacity(num_transitions),
        }
    }

    /// Create a new state and return its id.
    pub fn create_state(&mut self) -> u32 {
        let state = self.next_state;
        self.next_state += 1;
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

    /// How many states this builder has.
    pub fn num_states(&self) -> u32 {
        self.next_state
    }

    /// Buffer a new transition on every label in `[min, max]` from `source`
    /// to `dest`. Unlike the automaton's own build API, sources may arrive
    /// in any order.
    pub fn add_transition(&mut self, source: u32, dest: u32, min: u32, max: u32) -> Result<()> {
        if min > max {
            return Err(Error::invalid_range(min, max));
        }
        self.push(source, dest, min, max);
        Ok(())
    }

    /// Buffer a new transition with `min == max == label`.
    pub fn add_transition_label(&mut self, source: u32, dest: u32, label: u32) -> Result<()> {
        self.add_transition(source, dest, label, label)
    }

    pub(crate) fn push(&mut self, source: u32, dest: u32, min: u32, max: u32) {
        debug_assert!(min <= max);
        self.transitions.push(Quad { source, dest, min, max });
    }

    /// Add a "virtual" epsilon transition between `source` and `dest`:
    /// every buffered transition leaving `dest` is mirrored onto `source`,
    /// and `dest`'s accept bit propagates to `source`.
    pub fn add_epsilon(&mut self, source: u32, dest: u32) {
        let buffered = self.transitions.len();
        for i in 0..buffered {
            let q = self.transitions[i];
            if q.source == dest {
                self.push(source, q.dest, q.min, q.max);
            }
        }
        if self.is_accept(dest) {
            self.set_accept(source, true);
        }
    }

    /// Copies over all states and transitions from `other`, appending them
    /// with sequentially reassigned state ids.
    pub fn copy(&mut self, other: &Automaton) {
        let offset = self.num_states();
        self.copy_states(other);

        let mut t = Transition::new();
        for s in 0..other.num_states() {
            let count = other.init_transition(s, &mut t);
            for _ in 0..count {
                other.get_next_transition(&mut t);
                self.push(offset + s, offset + t.dest, t.min, t.max);
            }
        }
    }

    /// Copies over all states (and their accept bits) from `other`.
    pub fn copy_states(&mut self, other: &Automaton) {
        for s in 0..other.num_states() {
            let new_state = self.create_state();
            self.set_accept(new_state, other.is_accept(s));
        }
    }

    /// Materialize the buffered states and transitions into an
    /// [`Automaton`], with every state finished and canonicalized.
    pub fn finish(mut self) -> Automaton {
        let num_states = self.next_state;
        let mut a = Automaton::with_capacity(num_states as usize, self.transitions.len());
        for _ in 0..num_states {
            a.create_state();
        }
        for s in self.accept.iter() {
            a.set_accept(s as u32, true);
        }

        self.transitions.sort_unstable_by_key(|q| (q.source, q.dest, q.min, q.max));
        for q in &self.transitions {
            a.push_transition(q.source, q.dest, q.min, q.max);
        }
        a.finish_state();
        a
    }
}

impl Default for Builder {
    fn default() -> Builder {
        Builder::new()
    }
}
