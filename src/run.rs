use crate::automaton::Automaton;
use crate::determinize::determinize;
use crate::error::Result;

/// Returns true if the given string of code points is accepted by the
/// automaton, which must be deterministic.
pub fn run(a: &Automaton, s: &str) -> bool {
    if a.num_states() == 0 {
        return false;
    }
    let mut state = 0;
    for c in s.chars() {
        match a.step(state, c as u32) {
            Some(next) => state = next,
            None => return false,
        }
    }
    a.is_accept(state)
}

/// Returns true if the given byte string is accepted by the automaton,
/// which must be deterministic and binary (labels in `[0, 255]`).
pub fn run_bytes(a: &Automaton, s: &[u8]) -> bool {
    if a.num_states() == 0 {
        return false;
    }
    let mut state = 0;
    for &b in s {
        match a.step(state, u32::from(b)) {
            Some(next) => state = next,
            None => return false,
        }
    }
    a.is_accept(state)
}

/// An execution wrapper for matching byte strings: determinizes a binary
/// automaton once up front, then steps bytes through it.
#[derive(Clone, Debug)]
pub struct ByteRunAutomaton {
    automaton: Automaton,
}

impl ByteRunAutomaton {
    /// Prepare `a` for byte matching, spending at most `work_limit`
    /// effort on determinization.
    pub fn new(a: Automaton, work_limit: usize) -> Result<ByteRunAutomaton> {
        Ok(ByteRunAutomaton { automaton: determinize(a, work_limit)? })
    }

    /// Returns true if the given byte string is accepted.
    pub fn run(&self, s: &[u8]) -> bool {
        run_bytes(&self.automaton, s)
    }

    /// The prepared deterministic automaton.
    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::{union, DEFAULT_DETERMINIZE_WORK_LIMIT};
    use crate::primitives;

    #[test]
    fn empty_automaton_rejects_everything() {
        let a = primitives::empty();
        assert!(!run(&a, ""));
        assert!(!run(&a, "a"));
        assert!(!run_bytes(&a, b"\x00"));
    }

    #[test]
    fn byte_runner_determinizes_up_front() {
        let nfa = union(&[&primitives::binary(b"ka"), &primitives::binary(b"kb")]);
        assert!(!nfa.is_deterministic());
        let runner = ByteRunAutomaton::new(nfa, DEFAULT_DETERMINIZE_WORK_LIMIT).unwrap();
        assert!(runner.automaton().is_deterministic());
        assert!(runner.run(b"ka"));
        assert!(runner.run(b"kb"));
        assert!(!runner.run(b"k"));
        assert!(!runner.run(b"kc"));
    }
}
