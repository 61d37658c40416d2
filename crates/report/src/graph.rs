// Copyright 2025 perf-graphs Contributors
// SPDX-License-Identifier: Apache-2.0

//! The per-project graph page.
//!
//! One section per board, one line chart per metric, one line per toolchain.

use crate::html::{color, datasets_js, js_string, Dataset};
use crate::metrics::Metric;
use crate::project::ProjectResults;
use crate::site::ZOOM_PLUGIN_PATH;
use maud::{html, Markup, PreEscaped, DOCTYPE};
use tracing::info;

const CHART_JS_URL: &str = "https://cdn.jsdelivr.net/npm/chart.js@2.9.4/dist/Chart.bundle.min.js";
const HAMMER_JS_URL: &str = "https://cdn.jsdelivr.net/npm/hammerjs@2.0.8/hammer.min.js";

const STYLE: &str = "body { font-family: sans-serif; margin: 2em; }
.charts { display: flex; flex-wrap: wrap; }
.chart { width: 560px; height: 320px; margin: 0 1em 2em 0; }";

/// One line chart of one metric on one board.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    /// Canvas element id, unique within the page.
    pub id: String,
    /// Chart title.
    pub title: String,
    /// One line per toolchain.
    pub datasets: Vec<Dataset>,
}

impl Chart {
    fn script(&self) -> String {
        format!(
            r#"new Chart(document.getElementById({id}), {{
  type: "line",
  data: {{ datasets: {datasets} }},
  options: {{
    maintainAspectRatio: false,
    title: {{ display: true, text: {title} }},
    scales: {{ xAxes: [{{ type: "time", time: {{ unit: "day" }} }}] }},
    plugins: {{ zoom: {{ pan: {{ enabled: true, mode: "x" }}, zoom: {{ enabled: true, mode: "x" }} }} }}
  }}
}});"#,
            id = js_string(&self.id),
            datasets = datasets_js(&self.datasets),
            title = js_string(&self.title),
        )
    }
}

/// Render the graph page of one project.
pub fn generate_graph_html(project: &ProjectResults) -> String {
    info!(project = %project.project_name, "Generating graph page");
    graph_page(project).into_string()
}

/// Datasets of `metric` on `board`, one per toolchain with at least one point.
pub fn board_datasets(project: &ProjectResults, board: &str, metric: &Metric) -> Vec<Dataset> {
    let toolchain_order: Vec<&str> = project.toolchains().into_iter().collect();
    let Some(toolchains) = project.entries.get(board) else {
        return Vec::new();
    };

    toolchains
        .iter()
        .filter_map(|(toolchain, entries)| {
            let points: Vec<_> = entries
                .iter()
                .filter_map(|entry| metric.value(entry).map(|v| (entry.date, v)))
                .collect();
            if points.is_empty() {
                return None;
            }
            let index = toolchain_order
                .iter()
                .position(|t| *t == toolchain.as_str())
                .unwrap_or_default();
            Some(Dataset {
                label: toolchain.clone(),
                color: color(index),
                points,
            })
        })
        .collect()
}

/// Charts of every board, in board order. Metrics without data are left out.
pub fn board_charts(project: &ProjectResults) -> Vec<(&str, Vec<Chart>)> {
    let mut chart_no = 0usize;
    let mut boards = Vec::with_capacity(project.entries.len());

    for board in project.entries.keys() {
        let resources = project
            .resource_kinds(board)
            .into_iter()
            .map(|kind| Metric::Resource(kind.to_string()));
        let mut charts = Vec::new();
        for metric in Metric::FIXED.into_iter().chain(resources) {
            let datasets = board_datasets(project, board, &metric);
            if datasets.is_empty() {
                continue;
            }
            chart_no += 1;
            charts.push(Chart {
                id: format!("chart-{chart_no}"),
                title: metric.title(),
                datasets,
            });
        }
        boards.push((board.as_str(), charts));
    }
    boards
}

/// The graph page of one project.
pub fn graph_page(project: &ProjectResults) -> Markup {
    let zoom_plugin = format!("../{ZOOM_PLUGIN_PATH}");
    let boards = board_charts(project);

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { (project.project_name) " - tool performance" }
                script src=(CHART_JS_URL) {}
                script src=(HAMMER_JS_URL) {}
                script src=(zoom_plugin) {}
                style { (PreEscaped(STYLE)) }
            }
            body {
                p { a href="../index.html" { "\u{2190} All projects" } }
                h1 { (project.project_name) }
                @if project.is_empty() {
                    p { "No results." }
                }
                @for (board, charts) in &boards {
                    section {
                        h2 { (board) }
                        div.charts {
                            @for chart in charts {
                                div.chart { canvas id=(chart.id) {} }
                                script { (PreEscaped(chart.script())) }
                            }
                        }
                    }
                }
            }
        }
    }
}
