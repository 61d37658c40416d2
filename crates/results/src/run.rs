// Copyright 2025 perf-graphs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Test run identifiers and inclusive run ranges.

use std::fmt;
use std::str::FromStr;

/// Identifier of one execution of the benchmark harness.
pub type RunId = u64;

/// Command-line spelling of an unbounded range end.
pub const UNBOUNDED_SENTINEL: &str = "_";

/// Upper end of a run range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunBound {
    /// No upper limit.
    Unbounded,
    /// Runs up to and including this id.
    Inclusive(RunId),
}

impl FromStr for RunBound {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == UNBOUNDED_SENTINEL {
            return Ok(RunBound::Unbounded);
        }
        s.parse::<RunId>().map(RunBound::Inclusive).map_err(|_| {
            format!("expected a run number or `{UNBOUNDED_SENTINEL}` for no upper bound, got {s:?}")
        })
    }
}

impl fmt::Display for RunBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunBound::Unbounded => f.write_str(UNBOUNDED_SENTINEL),
            RunBound::Inclusive(id) => write!(f, "{id}"),
        }
    }
}

/// Inclusive range of run ids, optionally open at the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunRange {
    /// First accepted run id.
    pub start: RunId,
    /// Last accepted run id.
    pub end: RunBound,
}

impl RunRange {
    /// Create a new range.
    pub fn new(start: RunId, end: RunBound) -> Self {
        Self { start, end }
    }

    /// Closed range `[start, end]`.
    pub fn inclusive(start: RunId, end: RunId) -> Self {
        Self::new(start, RunBound::Inclusive(end))
    }

    /// Whether `id` falls inside the range.
    pub fn contains(&self, id: RunId) -> bool {
        id >= self.start
            && match self.end {
                RunBound::Unbounded => true,
                RunBound::Inclusive(end) => id <= end,
            }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bound() {
        assert_eq!("_".parse::<RunBound>().unwrap(), RunBound::Unbounded);
        assert_eq!("42".parse::<RunBound>().unwrap(), RunBound::Inclusive(42));
        assert!("forty".parse::<RunBound>().is_err());
        assert!("-1".parse::<RunBound>().is_err());
    }

    #[test]
    fn test_range_contains() {
        let closed = RunRange::inclusive(10, 20);
        assert!(closed.contains(10));
        assert!(closed.contains(20));
        assert!(!closed.contains(9));
        assert!(!closed.contains(21));

        let open = RunRange::new(10, RunBound::Unbounded);
        assert!(open.contains(u64::MAX));
        assert!(!open.contains(3));
    }
}
