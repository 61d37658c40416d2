// Copyright 2025 perf-graphs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Chart.js dataset fragments embedded into the pages' scripts.

use chrono::NaiveDateTime;

/// Line colours, assigned to toolchains in sorted order.
pub const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Colour of the `index`-th toolchain.
pub fn color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// A JavaScript string literal safe to embed in a `<script>` element.
pub fn js_string(text: &str) -> String {
    serde_json::Value::String(text.to_string())
        .to_string()
        .replace("</", "<\\/")
}

/// One line of a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Legend label.
    pub label: String,
    /// Line colour.
    pub color: &'static str,
    /// Points in time order.
    pub points: Vec<(NaiveDateTime, f64)>,
}

impl Dataset {
    fn to_js(&self) -> String {
        let points: Vec<String> = self
            .points
            .iter()
            .map(|(date, value)| format!("{{x: \"{}\", y: {}}}", date.format("%Y-%m-%dT%H:%M:%S"), value))
            .collect();
        format!(
            "    {{\n        data: [ {} ],\n        label: {},\n        borderColor: \"{}\",\n        fill: false\n    }},\n",
            points.join(", "),
            js_string(&self.label),
            self.color
        )
    }
}

/// Chart.js `datasets` array for `datasets`.
pub fn datasets_js(datasets: &[Dataset]) -> String {
    let body: String = datasets.iter().map(Dataset::to_js).collect();
    format!("[\n{body}]")
}
