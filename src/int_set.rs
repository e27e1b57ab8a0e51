/*!
Integer-set identities for the powerset construction.

Determinization names each DFA state by the set of NFA states it stands
for. Two representations share one identity: a mutable [`StateSet`]
(a multiset accumulated during the boundary sweep) and a [`FrozenIntSet`]
snapshot used as the key of the subset registry. Identity is by content,
not allocation: the hash is `count + Σ mix32(element)` over the distinct
elements, so a frozen snapshot and the multiset it came from always agree.
*/

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// The 32-bit MurmurHash3 finalization step. Spreads entropy of a single
/// key across all bits so the summed set hash stays well distributed.
pub(crate) fn mix32(v: u32) -> u32 {
    let mut k = v;
    k = (k ^ (k >> 16)).wrapping_mul(0x85eb_ca6b);
    k = (k ^ (k >> 13)).wrapping_mul(0xc2b2_ae35);
    k ^ (k >> 16)
}

/// An immutable sorted set of NFA states, tagged with the DFA state that
/// represents it and carrying its hash precomputed.
#[derive(Clone, Debug)]
pub(crate) struct FrozenIntSet {
    values: Vec<u32>,
    state: u32,
    hash: u64,
}

impl FrozenIntSet {
    pub(crate) fn values(&self) -> &[u32] {
        &self.values
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    /// The DFA state this set is the subset image of.
    pub(crate) fn state(&self) -> u32 {
        self.state
    }

    /// Re-tag with the DFA state id that ended up representing this set.
    /// Content identity (values and hash) is unchanged.
    pub(crate) fn with_state(mut self, state: u32) -> FrozenIntSet {
        self.state = state;
        self
    }
}

impl PartialEq for FrozenIntSet {
    fn eq(&self, other: &FrozenIntSet) -> bool {
        self.hash == other.hash && self.values == other.values
    }
}

impl Eq for FrozenIntSet {}

impl Hash for FrozenIntSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

/// A mutable multiset of NFA states (state → occurrence count) with an
/// incrementally maintained content hash.
///
/// The hash covers the *support* only: a key contributes when its count
/// leaves zero and stops contributing when it returns to zero, updated
/// symmetrically in both directions so the `count + Σ mix32(element)`
/// invariant holds at every step.
#[derive(Clone, Debug, Default)]
pub(crate) struct StateSet {
    counts: HashMap<u32, u32>,
    hash: u64,
}

impl StateSet {
    pub(crate) fn new() -> StateSet {
        StateSet::default()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.counts.len()
    }

    /// Increment `state`'s occurrence count.
    pub(crate) fn incr(&mut self, state: u32) {
        let count = self.counts.entry(state).or_insert(0);
        *count += 1;
        if *count == 1 {
            self.hash = self.hash.wrapping_add(1 + u64::from(mix32(state)));
        }
    }

    /// Decrement `state`'s occurrence count, dropping the key when it
    /// reaches zero. Decrementing an absent key is a no-op.
    pub(crate) fn decr(&mut self, state: u32) {
        if let Some(count) = self.counts.get_mut(&state) {
            if *count == 1 {
                self.counts.remove(&state);
                self.hash = self.hash.wrapping_sub(1 + u64::from(mix32(state)));
            } else {
                *count -= 1;
            }
        }
    }

    /// Snapshot the support into a [`FrozenIntSet`] tagged with `state`.
    pub(crate) fn freeze(&self, state: u32) -> FrozenIntSet {
        let mut values: Vec<u32> = self.counts.keys().copied().collect();
        values.sort_unstable();
        FrozenIntSet { values, state, hash: self.hash }
    }
}
