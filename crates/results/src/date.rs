// Copyright 2025 perf-graphs Contributors
// SPDX-License-Identifier: Apache-2.0

//! The harness' date format.
//!
//! Dates are written as `Y-M-DTH:M:S` without zero padding
//! (`2021-3-7T9:5:0`). Parsing accepts both padded and unpadded components.

use chrono::{Datelike, NaiveDateTime, Timelike};

/// `strptime`-style pattern of harness dates.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const DATE_FORMAT_FRACTIONAL: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Parse a harness date.
pub fn parse_date(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, DATE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, DATE_FORMAT_FRACTIONAL))
}

/// Format a date the way the result store writes it.
pub fn format_date(dt: &NaiveDateTime) -> String {
    format!(
        "{}-{}-{}T{}:{}:{}",
        dt.year(),
        dt.month(),
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second()
    )
}
