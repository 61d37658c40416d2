// Copyright 2025 perf-graphs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Extraction of plottable numbers from raw result values.
//!
//! Result values changed shape over the harness' history (plain numbers,
//! numeric strings, per-stage or per-clock objects), so every extractor
//! accepts all of them and returns `None` for anything else.

use crate::project::ResultEntry;
use serde_json::Value;
use std::collections::BTreeMap;

/// A finite number, or a string holding one.
pub fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    n.filter(|n: &f64| n.is_finite())
}

/// Total runtime: a number, or the `total` member of a per-stage object.
///
/// Objects without a usable `total` fall back to the sum of their numeric
/// stages.
pub fn runtime_total(value: &Value) -> Option<f64> {
    match value {
        Value::Object(stages) => stages.get("total").and_then(number).or_else(|| {
            let timed: Vec<f64> = stages.values().filter_map(number).collect();
            (!timed.is_empty()).then(|| timed.iter().sum())
        }),
        other => number(other),
    }
}

/// Highest achieved clock frequency.
///
/// Accepts a number, or an object of clocks each being a number or an
/// object with an `actual` member.
pub fn max_frequency(value: &Value) -> Option<f64> {
    match value {
        Value::Object(clocks) => clocks
            .values()
            .filter_map(|clock| match clock {
                Value::Object(fields) => fields.get("actual").and_then(number),
                other => number(other),
            })
            .fold(None, |best: Option<f64>, f| Some(best.map_or(f, |b| b.max(f)))),
        other => number(other),
    }
}

/// Numeric members of a resource utilisation object.
pub fn resources(value: &Value) -> BTreeMap<String, f64> {
    value
        .as_object()
        .map(|kinds| {
            kinds
                .iter()
                .filter_map(|(kind, count)| number(count).map(|n| (kind.clone(), n)))
                .collect()
        })
        .unwrap_or_default()
}

/// A plotted quantity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Metric {
    /// Total toolchain runtime.
    Runtime,
    /// Highest achieved clock frequency.
    MaxFreq,
    /// Peak memory use of the toolchain.
    MaxMemory,
    /// Total routed wirelength.
    Wirelength,
    /// Utilisation of one resource kind.
    Resource(String),
}

impl Metric {
    /// Metrics shown for every board, before the resource charts.
    pub const FIXED: [Metric; 4] = [
        Metric::Runtime,
        Metric::MaxFreq,
        Metric::MaxMemory,
        Metric::Wirelength,
    ];

    /// Chart title.
    pub fn title(&self) -> String {
        match self {
            Metric::Runtime => "Runtime [s]".to_string(),
            Metric::MaxFreq => "Max frequency [MHz]".to_string(),
            Metric::MaxMemory => "Maximum memory use [MiB]".to_string(),
            Metric::Wirelength => "Wirelength".to_string(),
            Metric::Resource(kind) => format!("{kind} utilization"),
        }
    }

    /// Value of this metric in one result entry.
    pub fn value(&self, entry: &ResultEntry) -> Option<f64> {
        match self {
            Metric::Runtime => entry.runtime,
            Metric::MaxFreq => entry.max_freq,
            Metric::MaxMemory => entry.maximum_memory_use,
            Metric::Wirelength => entry.wirelength,
            Metric::Resource(kind) => entry.resources.get(kind).copied(),
        }
    }
}
