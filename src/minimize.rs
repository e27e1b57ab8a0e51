/*!
DFA minimization via Hopcroft partition refinement.

The refinement alphabet is not the raw label space (which would be the
full code-point range) but the automaton's interval start points: within
one maximal interval between start points, every state behaves uniformly,
so one representative label per interval is enough.

The input is determinized and totalized first; refinement then splits the
accept/non-accept partition against the incoming-transition sets of each
waiting block, always keeping the smaller half on the waiting list. The
result is rebuilt from one representative state per block and stripped of
dead states (which removes the totalization sink again).
*/

use std::mem;

use log::debug;

use crate::automaton::{Automaton, Transition, MAX_CODE_POINT};
use crate::determinize::determinize;
use crate::error::Result;
use crate::operations::remove_dead_states;

/// Minimizes (and determinizes, if necessary) the given automaton.
///
/// An empty or trivially-empty input yields a fresh empty automaton;
/// otherwise the result is the unique minimal DFA for the input's
/// language, free of dead states. `work_limit` bounds the embedded
/// determinization.
pub fn minimize(a: Automaton, work_limit: usize) -> Result<Automaton> {
    if a.num_states() == 0 || (!a.is_accept(0) && a.num_transitions_of(0) == 0) {
        // Fast path for the common trivially-empty case.
        return Ok(Automaton::new());
    }
    let a = determinize(a, work_limit)?;
    if a.num_transitions_of(0) == 1 {
        let mut t = Transition::new();
        a.get_transition(0, 0, &mut t);
        if t.dest == 0 && t.min == 0 && t.max == MAX_CODE_POINT && a.is_accept(0) {
            // Accepts all strings; already minimal.
            return Ok(a);
        }
    }
    if a.accept_states().next().is_none() {
        // No accept states at all: the language is empty.
        return Ok(Automaton::new());
    }

    let a = crate::operations::totalize(&a);
    let num_states = a.num_states() as usize;
    let sigma = a.get_start_points();

    // incoming[d][x] lists the states that step to d on sigma[x]. The
    // totalized DFA makes step a total function.
    let mut incoming: Vec<Vec<Vec<u32>>> = vec![vec![Vec::new(); sigma.len()]; num_states];
    for q in 0..num_states as u32 {
        for (x, &label) in sigma.iter().enumerate() {
            if let Some(d) = a.step(q, label) {
                incoming[d as usize][x].push(q);
            }
        }
    }

    // Initial partition: accept vs. non-accept, smaller block first on the
    // waiting list.
    let mut accepting = Vec::new();
    let mut rejecting = Vec::new();
    for q in 0..num_states as u32 {
        if a.is_accept(q) {
            accepting.push(q);
        } else {
            rejecting.push(q);
        }
    }
    let mut partitions = vec![accepting, rejecting];
    partitions.retain(|p| !p.is_empty());
    partitions.sort_by_key(|p| p.len());
    let mut waiting = vec![partitions[0].clone()];

    let mut scratch: Vec<u32> = Vec::new();
    while let Some(splitter) = waiting.pop() {
        for x in 0..sigma.len() {
            // States with a sigma[x] transition into the splitter block.
            scratch.clear();
            for &q in &splitter {
                scratch.extend_from_slice(&incoming[q as usize][x]);
            }
            scratch.sort_unstable();
            scratch.dedup();
            if scratch.is_empty() {
                continue;
            }

            let mut refined = Vec::with_capacity(partitions.len());
            for p in 0..partitions.len() {
                let inside = intersect_sorted(&partitions[p], &scratch);
                if inside.is_empty() {
                    refined.push(mem::take(&mut partitions[p]));
                    continue;
                }
                let outside = subtract_sorted(&partitions[p], &scratch);
                if outside.is_empty() {
                    refined.push(mem::take(&mut partitions[p]));
                    continue;
                }
                match waiting.iter().position(|w| w == &partitions[p]) {
                    Some(i) => {
                        waiting[i] = inside.clone();
                        waiting.push(outside.clone());
                    }
                    None => {
                        if inside.len() <= outside.len() {
                            waiting.push(inside.clone());
                        } else {
                            waiting.push(outside.clone());
                        }
                    }
                }
                refined.push(inside);
                refined.push(outside);
            }
            partitions = refined;
        }
    }

    // One state per equivalence class; the block holding the old initial
    // state becomes state 0.
    let mut block = vec![0usize; num_states];
    for (i, p) in partitions.iter().enumerate() {
        for &q in p {
            block[q as usize] = i;
        }
    }
    let initial_block = block[0];
    let mut new_id = vec![0u32; partitions.len()];
    let mut block_of = vec![0usize; partitions.len()];
    let mut next = 1u32;
    for i in 0..partitions.len() {
        let id = if i == initial_block {
            0
        } else {
            let id = next;
            next += 1;
            id
        };
        new_id[i] = id;
        block_of[id as usize] = i;
    }

    let mut result = Automaton::with_capacity(partitions.len(), a.num_transitions());
    for _ in 0..partitions.len() {
        result.create_state();
    }
    let mut t = Transition::new();
    for ns in 0..partitions.len() as u32 {
        let p = &partitions[block_of[ns as usize]];
        let representative = p[0];
        result.set_accept(ns, a.is_accept(representative));
        let count = a.init_transition(representative, &mut t);
        for _ in 0..count {
            a.get_next_transition(&mut t);
            result.push_transition(ns, new_id[block[t.dest as usize]], t.min, t.max);
        }
    }
    result.finish_state();

    debug!("minimized {} states into {} blocks", num_states, partitions.len());
    Ok(remove_dead_states(&result))
}

/// Intersection of two sorted, deduplicated state lists.
fn intersect_sorted(a: &[u32], b: &[u32]) -> Vec<u32> {
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i] == b[j] {
            out.push(a[i]);
            i += 1;
            j += 1;
        } else if a[i] < b[j] {
            i += 1;
        } else {
            j += 1;
        }
    }
    out
}

/// Elements of sorted `a` not present in sorted `b`.
fn subtract_sorted(a: &[u32], b: &[u32]) -> Vec<u32> {
    let mut out = Vec::new();
    let mut j = 0;
    for &v in a {
        while j < b.len() && b[j] < v {
            j += 1;
        }
        if j >= b.len() || b[j] != v {
            out.push(v);
        }
    }
    out
}
