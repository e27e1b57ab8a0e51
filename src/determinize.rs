/*!
Powerset determinization with interval splitting.

A DFA state is an ordered set of NFA states. Because transitions carry
label *ranges* that may overlap arbitrarily, each subset is expanded by a
sweep over the boundary points of its outgoing ranges: every range
contributes a start at `min` and an end at `max + 1`, the boundaries are
sorted, and a multiset of currently-active destinations is maintained
left-to-right. Every maximal interval between boundaries maps the subset
to one successor subset.

Work is bounded: each popped subset costs its cardinality, and the run
fails with `TooComplex` once the accumulated effort reaches
`work_limit × 10`.
*/

use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use log::{debug, trace};

use crate::automaton::{Automaton, Transition};
use crate::builder::Builder;
use crate::error::{Error, Result};
use crate::int_set::{FrozenIntSet, StateSet};

/// A decent default effort budget for determinization when the caller has
/// no better number.
pub const DEFAULT_DETERMINIZE_WORK_LIMIT: usize = 10_000;

/// Destinations of the transitions starting and ending at one boundary
/// label.
#[derive(Debug, Default)]
struct PointTransitions {
    point: u32,
    starts: Vec<u32>,
    ends: Vec<u32>,
}

/// The boundary labels of the current subset's outgoing transitions,
/// each with its starting and ending destinations. Storage is reused
/// across worklist iterations.
#[derive(Debug, Default)]
struct PointTransitionSet {
    points: Vec<PointTransitions>,
    /// Maps a boundary label to its index in `points`. Stale once `sort`
    /// has run; `reset` clears it together with the points.
    index: HashMap<u32, usize>,
}

impl PointTransitionSet {
    fn new() -> PointTransitionSet {
        PointTransitionSet::default()
    }

    fn find(&mut self, point: u32) -> &mut PointTransitions {
        let i = *self.index.entry(point).or_insert_with(|| {
            self.points.push(PointTransitions { point, ..PointTransitions::default() });
            self.points.len() - 1
        });
        &mut self.points[i]
    }

    fn add(&mut self, t: &Transition) {
        self.find(t.min).starts.push(t.dest);
        self.find(t.max + 1).ends.push(t.dest);
    }

    fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn sort(&mut self) {
        self.points.sort_by_key(|p| p.point);
    }

    fn reset(&mut self) {
        self.points.clear();
        self.index.clear();
    }
}

/// Determinizes the given automaton via powerset construction.
///
/// Returns the input unchanged if it is already marked deterministic or
/// has at most one state. Worst case the construction is exponential in
/// the number of states; `work_limit` bounds the effort spent (measured
/// as the cumulative size of the subsets explored, against a budget of
/// `work_limit × 10`) and the operation fails with `TooComplex` beyond
/// it. Use [`DEFAULT_DETERMINIZE_WORK_LIMIT`] as a decent default.
pub fn determinize(a: Automaton, work_limit: usize) -> Result<Automaton> {
    if a.is_deterministic() || a.num_states() <= 1 {
        return Ok(a);
    }

    // Subset construction.
    let mut b = Builder::new();
    b.create_state();
    b.set_accept(0, a.is_accept(0));

    // The same initial subset always freezes to the same hash.
    let initial = {
        let mut set = StateSet::new();
        set.incr(0);
        Rc::new(set.freeze(0))
    };

    let mut worklist: VecDeque<Rc<FrozenIntSet>> = VecDeque::new();
    let mut subsets: HashMap<Rc<FrozenIntSet>, u32> = HashMap::new();
    worklist.push_back(initial.clone());
    subsets.insert(initial, 0);

    let mut points = PointTransitionSet::new();
    let mut active = StateSet::new();
    let mut t = Transition::new();

    let mut effort_spent = 0usize;
    let effort_limit = work_limit.saturating_mul(10);

    while let Some(s) = worklist.pop_front() {
        effort_spent += s.len();
        if effort_spent >= effort_limit {
            debug!(
                "determinization aborted: effort {} reached limit {}",
                effort_spent, effort_limit
            );
            return Err(Error::too_complex(work_limit));
        }

        // Collate all outgoing transitions by min / 1+max.
        for &q in s.values() {
            let count = a.init_transition(q, &mut t);
            for _ in 0..count {
                a.get_next_transition(&mut t);
                points.add(&t);
            }
        }
        if points.is_empty() {
            // No outgoing transitions -- skip it.
            continue;
        }
        points.sort();

        let mut last_point = 0u32;
        let mut acc_count = 0i64;
        let r = s.state();

        for i in 0..points.points.len() {
            let point = points.points[i].point;

            if !active.is_empty() {
                let frozen = active.freeze(0);
                let q = match subsets.get(&frozen) {
                    Some(&q) => q,
                    None => {
                        let q = b.create_state();
                        let p = Rc::new(frozen.with_state(q));
                        trace!("new dfa state {} for {} nfa states", q, p.len());
                        worklist.push_back(p.clone());
                        b.set_accept(q, acc_count > 0);
                        subsets.insert(p, q);
                        q
                    }
                };
                b.push(r, q, last_point, point - 1);
            }

            // Close the intervals ending at this point.
            for &dest in &points.points[i].ends {
                active.decr(dest);
                if a.is_accept(dest) {
                    acc_count -= 1;
                }
            }
            // Open the intervals starting at this point.
            for &dest in &points.points[i].starts {
                active.incr(dest);
                if a.is_accept(dest) {
                    acc_count += 1;
                }
            }
            last_point = point;
        }
        points.reset();
        debug_assert!(active.is_empty());
        debug_assert_eq!(0, acc_count);
    }

    let result = b.finish();
    debug!(
        "determinized {} states into {} states with {} effort",
        a.num_states(),
        result.num_states(),
        effort_spent
    );
    debug_assert!(result.is_deterministic());
    Ok(result)
}
