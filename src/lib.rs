/*!
Finite-state automata over integer-labeled alphabets, built for
query-matching components: wildcard, prefix, range and regular-expression
predicates all lower into the same packed automaton representation.

Labels are plain integers: Unicode code points in `[0, 0x10FFFF]` for
character automata, byte values in `[0, 255]` for binary automata. A
transition covers an inclusive label range, so even `.*` is a single
self-loop edge.

# Building blocks

* [`Automaton`] — the packed representation with its incremental build
  API. States are dense indices, state 0 is initial, and each state's
  transitions are canonicalized (sorted and merged) when the state is
  finished.
* [`Builder`] — order-free construction for callers that cannot add
  transitions grouped by source state.
* [`primitives`] — constructors for the empty language, characters,
  ranges, literal strings, binary and decimal intervals.
* [`operations`] — union, concatenation, intersection, complement,
  repetition, reverse, determinization, minimization, dead-state removal
  and the related queries.
* [`regexp`] — a regular-expression front end producing an operator tree
  that compiles through the pieces above.
* [`run`]/[`run_bytes`]/[`ByteRunAutomaton`] — executing a deterministic
  automaton over an input.

# Example

```
use range_automata::operations::DEFAULT_DETERMINIZE_WORK_LIMIT;
use range_automata::{run, RegExp};

# fn example() -> range_automata::Result<()> {
let re = RegExp::new("a(b+|c+)d")?;
let a = re.to_automaton(DEFAULT_DETERMINIZE_WORK_LIMIT)?;
assert!(run(&a, "abbbd"));
assert!(!run(&a, "ad"));
# Ok(()) }
# example().unwrap();
```

# Costs and limits

Composition is cheap; determinization is not. Every operation that embeds
a powerset construction takes a `work_limit` effort budget and fails with
[`ErrorKind::TooComplex`] instead of running away on pathological inputs
like `[ac]*a[ac]{50,200}`. Automata are single-threaded during
construction and immutable afterwards, so finished automata can be shared
read-only between threads.
*/

pub use crate::automaton::{Automaton, Transition, MAX_CODE_POINT};
pub use crate::builder::Builder;
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::regexp::{AutomatonProvider, RegExp};
pub use crate::run::{run, run_bytes, ByteRunAutomaton};

mod automaton;
mod builder;
mod determinize;
mod error;
mod int_set;
mod minimize;
pub mod operations;
pub mod primitives;
pub mod regexp;
mod run;
