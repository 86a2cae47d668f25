//! Expectations over captured pipeline output.
//!
//! An expectation names one stream and a set of substrings; it holds when the
//! stream contains any of them. An optional exit constraint is checked after
//! the text, so a text mismatch is always reported first.

use serde::Serialize;
use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::logging::excerpt;
use crate::runner::InvocationResult;

/// Characters of captured output kept in mismatch messages.
const EXCERPT_CHARS: usize = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stream {
    Stdout,
    Stderr,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::Stdout => f.write_str("stdout"),
            Stream::Stderr => f.write_str("stderr"),
        }
    }
}

/// Constraint on how the process terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitExpectation {
    /// Any termination is acceptable.
    #[default]
    Any,
    /// Exit code 0.
    Success,
    /// Anything but exit code 0, including termination by signal.
    Failure,
}

impl ExitExpectation {
    pub fn is_satisfied_by(self, result: &InvocationResult) -> bool {
        match self {
            ExitExpectation::Any => true,
            ExitExpectation::Success => result.success(),
            ExitExpectation::Failure => !result.success(),
        }
    }
}

impl fmt::Display for ExitExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitExpectation::Any => f.write_str("any"),
            ExitExpectation::Success => f.write_str("zero"),
            ExitExpectation::Failure => f.write_str("non-zero"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expectation {
    pub stream: Stream,
    pub any_of: Vec<String>,
    pub exit: ExitExpectation,
}

impl Expectation {
    pub fn new<I, S>(stream: Stream, any_of: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            stream,
            any_of: any_of.into_iter().map(Into::into).collect(),
            exit: ExitExpectation::Any,
        }
    }

    pub fn stdout_contains(needle: impl Into<String>) -> Self {
        Self::new(Stream::Stdout, [needle])
    }

    pub fn stderr_contains_any<I, S>(needles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Stream::Stderr, needles)
    }

    pub fn with_exit(mut self, exit: ExitExpectation) -> Self {
        self.exit = exit;
        self
    }

    /// Returns the first expected substring found in the captured stream.
    pub fn matched<'a>(&'a self, result: &InvocationResult) -> Option<&'a str> {
        let haystack = result.stream(self.stream);
        self.any_of
            .iter()
            .map(String::as_str)
            .find(|needle| haystack.contains(needle))
    }

    /// Human-readable form of the substrings, e.g. `"a" or "b"`.
    pub fn describe(&self) -> String {
        self.any_of
            .iter()
            .map(|s| format!("{:?}", s))
            .collect::<Vec<_>>()
            .join(" or ")
    }

    /// Checks `result` against this expectation on behalf of `case`.
    pub fn check(&self, case: &str, result: &InvocationResult) -> CoreResult<()> {
        if self.matched(result).is_none() {
            return Err(CoreError::ExpectationMismatch {
                case: case.to_string(),
                stream: self.stream,
                expected: self.describe(),
                excerpt: excerpt(result.stream(self.stream), EXCERPT_CHARS),
            });
        }

        if !self.exit.is_satisfied_by(result) {
            return Err(CoreError::UnexpectedExitStatus {
                case: case.to_string(),
                expected: self.exit.to_string(),
                actual: result.describe_exit(),
            });
        }

        Ok(())
    }
}
