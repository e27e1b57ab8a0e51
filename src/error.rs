use std::error;
use std::fmt;
use std::result;

pub type Result<T> = result::Result<T, Error>;

/// An error that occurred while building, transforming or compiling an
/// automaton.
#[derive(Clone, Debug)]
pub struct Error {
    kind: ErrorKind,
}

/// The kind of error that occurred.
#[derive(Clone, Debug)]
pub enum ErrorKind {
    /// A transition was added to a state that was already frozen. A state
    /// freezes as soon as transitions are added to a different source state,
    /// so all of a state's transitions must be added together.
    BuilderOrder {
        /// The frozen state.
        state: u32,
    },
    /// A transition or character range with `min > max`.
    InvalidRange {
        /// The lower bound of the offending range.
        min: u32,
        /// The upper bound of the offending range.
        max: u32,
    },
    /// A binary interval with an absent endpoint marked exclusive. An absent
    /// endpoint means "unbounded on this side" and is only meaningful when
    /// inclusive.
    OpenEndedBoundary,
    /// A regular expression failed to parse.
    Parse {
        /// 0-based position in the pattern where parsing failed.
        position: usize,
        /// A short description of what went wrong.
        message: String,
    },
    /// A `<name>` reference in a regular expression did not resolve to any
    /// supplied automaton.
    UnknownAutomatonName {
        /// The unresolved name.
        name: String,
    },
    /// A byte-oriented query was run on an automaton carrying labels greater
    /// than `0xFF`.
    NotBinary {
        /// The first offending label.
        label: u32,
    },
    /// An operation that requires a deterministic automaton was given a
    /// non-deterministic one.
    NonDeterministicInput,
    /// An operation that requires a dead-state-free automaton was given one
    /// with states reachable from the initial state but unable to reach an
    /// accept state.
    DeadStates,
    /// Determinization or repetition expansion exceeded the caller-provided
    /// effort budget.
    TooComplex {
        /// The amount of work the operation would have needed.
        work: usize,
    },
}

impl Error {
    /// Return the kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub(crate) fn builder_order(state: u32) -> Error {
        Error { kind: ErrorKind::BuilderOrder { state } }
    }

    pub(crate) fn invalid_range(min: u32, max: u32) -> Error {
        Error { kind: ErrorKind::InvalidRange { min, max } }
    }

    pub(crate) fn open_ended_boundary() -> Error {
        Error { kind: ErrorKind::OpenEndedBoundary }
    }

    pub(crate) fn parse(position: usize, message: impl Into<String>) -> Error {
        Error { kind: ErrorKind::Parse { position, message: message.into() } }
    }

    pub(crate) fn unknown_automaton_name(name: &str) -> Error {
        Error { kind: ErrorKind::UnknownAutomatonName { name: name.to_string() } }
    }

    pub(crate) fn not_binary(label: u32) -> Error {
        Error { kind: ErrorKind::NotBinary { label } }
    }

    pub(crate) fn non_deterministic_input() -> Error {
        Error { kind: ErrorKind::NonDeterministicInput }
    }

    pub(crate) fn dead_states() -> Error {
        Error { kind: ErrorKind::DeadStates }
    }

    pub(crate) fn too_complex(work: usize) -> Error {
        Error { kind: ErrorKind::TooComplex { work } }
    }
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            ErrorKind::BuilderOrder { state } => {
                write!(f, "state {} already had transitions added", state)
            }
            ErrorKind::InvalidRange { min, max } => {
                write!(f, "invalid label range: min {} > max {}", min, max)
            }
            ErrorKind::OpenEndedBoundary => {
                write!(f, "an open-ended binary interval endpoint must be inclusive")
            }
            ErrorKind::Parse { position, ref message } => {
                write!(f, "{} at position {}", message, position)
            }
            ErrorKind::UnknownAutomatonName { ref name } => {
                write!(f, "named automaton '{}' not found", name)
            }
            ErrorKind::NotBinary { label } => {
                write!(f, "automaton is not binary: label {:#x} exceeds 0xFF", label)
            }
            ErrorKind::NonDeterministicInput => {
                write!(f, "input automaton must be deterministic")
            }
            ErrorKind::DeadStates => write!(f, "input automaton has dead states"),
            ErrorKind::TooComplex { work } => {
                write!(f, "too complex to determinize: requires more than {} effort", work)
            }
        }
    }
}
