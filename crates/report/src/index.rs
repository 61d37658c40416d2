// Copyright 2025 perf-graphs Contributors
// SPDX-License-Identifier: Apache-2.0

//! The index page: which toolchains ran on which boards, per project.

use crate::project::ProjectResults;
use crate::site::graph_page_href;
use maud::{html, Markup, PreEscaped, DOCTYPE};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

const STYLE: &str = "body { font-family: sans-serif; margin: 2em; }
table { border-collapse: collapse; }
th, td { border: 1px solid #ccc; padding: 0.3em 0.6em; vertical-align: top; }";

/// Project name to board name to the toolchains that ran on it.
pub type ProjectBoards<'a> = BTreeMap<&'a str, BTreeMap<&'a str, Vec<&'a str>>>;

/// Collect the index data: boards and toolchains per project, plus every
/// toolchain seen in any project.
pub fn index_data(results: &[ProjectResults]) -> (ProjectBoards<'_>, BTreeSet<&str>) {
    let mut projects = ProjectBoards::new();
    let mut all_toolchains = BTreeSet::new();

    for project in results {
        let boards = projects.entry(project.project_name.as_str()).or_default();
        for (board, toolchains) in &project.entries {
            let names: Vec<&str> = toolchains.keys().map(String::as_str).collect();
            all_toolchains.extend(names.iter().copied());
            boards.insert(board.as_str(), names);
        }
    }

    (projects, all_toolchains)
}

/// Render the index page.
pub fn generate_index_html(results: &[ProjectResults]) -> String {
    info!(projects = results.len(), "Generating index page");
    index_page(results).into_string()
}

/// The index page: one row per project, one column per toolchain.
pub fn index_page(results: &[ProjectResults]) -> Markup {
    let (projects, toolchains) = index_data(results);

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { "Tool performance" }
                style { (PreEscaped(STYLE)) }
            }
            body {
                h1 { "Tool performance" }
                table {
                    thead {
                        tr {
                            th { "Project" }
                            @for toolchain in &toolchains {
                                th { (toolchain) }
                            }
                        }
                    }
                    tbody {
                        @for (project, boards) in &projects {
                            tr {
                                td { a href=(graph_page_href(project)) { (project) } }
                                @for toolchain in &toolchains {
                                    td {
                                        @for (i, board) in boards_running(boards, toolchain).enumerate() {
                                            @if i > 0 { br; }
                                            (board)
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn boards_running<'a>(
    boards: &'a BTreeMap<&'a str, Vec<&'a str>>,
    toolchain: &'a str,
) -> impl Iterator<Item = &'a str> + 'a {
    boards
        .iter()
        .filter(move |(_, used)| used.contains(&toolchain))
        .map(|(board, _)| *board)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::Entries;

    fn project(name: &str, boards: &[(&str, &[&str])]) -> ProjectResults {
        let mut entries = Entries::new();
        for (board, toolchains) in boards {
            let by_toolchain = entries.entry(board.to_string()).or_default();
            for toolchain in *toolchains {
                by_toolchain.insert(toolchain.to_string(), Vec::new());
            }
        }
        ProjectResults {
            project_name: name.to_string(),
            entries,
        }
    }

    #[test]
    fn test_index_data_collects_all_toolchains() {
        let results = vec![
            project("picorv32", &[("arty", &["vivado"])]),
            project("blinky", &[("arty", &["vivado", "nextpnr"]), ("basys3", &["vivado"])]),
        ];
        let (projects, toolchains) = index_data(&results);

        assert_eq!(projects.keys().copied().collect::<Vec<_>>(), vec!["blinky", "picorv32"]);
        assert_eq!(projects["blinky"]["arty"], vec!["nextpnr", "vivado"]);
        assert_eq!(toolchains.into_iter().collect::<Vec<_>>(), vec!["nextpnr", "vivado"]);
    }

    #[test]
    fn test_index_page_links_projects() {
        let results = vec![
            project("blinky", &[("arty", &["vivado", "nextpnr"]), ("basys3", &["vivado"])]),
            project("picorv32", &[("arty", &["vivado"])]),
        ];
        let html = generate_index_html(&results);

        assert!(html.contains("<a href=\"graphs/blinky.html\">blinky</a>"));
        assert!(html.contains("<th>nextpnr</th><th>vivado</th>"));
        assert!(html.contains("<td>arty<br>basys3</td>"));
        let blinky_row = html.find("graphs/blinky.html").unwrap();
        let picorv_row = html.find("graphs/picorv32.html").unwrap();
        assert!(blinky_row < picorv_row);
    }

    #[test]
    fn test_index_page_encodes_project_links() {
        let results = vec![project("a b#<1>", &[("arty", &["vivado"])])];
        let html = generate_index_html(&results);
        assert!(html.contains("<a href=\"graphs/a%20b%23%3C1%3E.html\">a b#&lt;1&gt;</a>"));
    }
}
