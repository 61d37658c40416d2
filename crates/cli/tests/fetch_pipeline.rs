// Copyright 2025 perf-graphs Contributors
// SPDX-License-Identifier: Apache-2.0

//! End-to-end fetch, cleanup and report runs over an in-memory object store.

use flate2::write::GzEncoder;
use flate2::Compression;
use perf_graphs_cli::cleanup::{remove_entries, CleanupArgs};
use perf_graphs_cli::report::build_site;
use perf_graphs_cli::{FetchPipeline, FetchSummary};
use perf_graphs_remote::{ListPage, ListQuery, ObjectStore, RemoteConfig, RemoteError, ResultLocator};
use perf_graphs_results::{ResultStore, RunBound, RunRange};
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Write;
use std::path::Path;

const RUNS: &str = "artifacts/prod/foss-fpga-tools/fpga-tool-perf/continuous/install";
const PAGE_SIZE: usize = 2;

/// Object store emulating prefix/delimiter listing with small pages.
#[derive(Default)]
struct MemoryStore {
    objects: BTreeMap<String, Vec<u8>>,
}

impl MemoryStore {
    fn put(&mut self, path: String, content: impl Into<Vec<u8>>) {
        self.objects.insert(path, content.into());
    }
}

impl ObjectStore for MemoryStore {
    fn list_page(&self, query: &ListQuery, page_token: Option<String>) -> perf_graphs_remote::Result<ListPage> {
        let prefixes: BTreeSet<String> = self
            .objects
            .keys()
            .filter_map(|key| {
                let rest = key.strip_prefix(&query.prefix)?;
                let end = rest.find(&query.delimiter)? + query.delimiter.len();
                Some(format!("{}{}", query.prefix, &rest[..end]))
            })
            .collect();
        let prefixes: Vec<String> = prefixes.into_iter().collect();

        let start: usize = page_token.map_or(0, |t| t.parse().unwrap());
        let end = (start + PAGE_SIZE).min(prefixes.len());
        Ok(ListPage {
            prefixes: prefixes[start..end].to_vec(),
            next_page_token: (end < prefixes.len()).then(|| end.to_string()),
        })
    }

    fn download(&self, path: &str) -> perf_graphs_remote::Result<Vec<u8>> {
        self.objects.get(path).cloned().ok_or_else(|| RemoteError::Status {
            url: path.to_string(),
            status: 404,
        })
    }
}

fn gzip(value: &Value) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(value.to_string().as_bytes()).unwrap();
    encoder.finish().unwrap()
}

fn compound(date: &str, rows: &[(&str, &str, &str)]) -> Value {
    let n = rows.len();
    json!({
        "date": date,
        "results": {
            "project": rows.iter().map(|r| r.0).collect::<Vec<_>>(),
            "board": rows.iter().map(|r| r.1).collect::<Vec<_>>(),
            "toolchain": rows.iter().map(|r| r.2).collect::<Vec<_>>(),
            "runtime": vec![json!({"total": 12.5}); n],
            "resources": vec![json!({"LUT": 100, "FF": 40}); n],
            "maximum_memory_use": vec![json!(512.0); n],
            "max_freq": vec![json!({"clk": {"actual": 95.5}}); n],
            "device": vec!["xc7a35t"; n]
        }
    })
}

fn legacy(project: &str, build: &str, date: &str) -> String {
    json!({
        "build_type": "generic-all",
        "build": build,
        "project": project,
        "date": date,
        "board": "arty",
        "toolchain": "vivado",
        "runtime": {"total": 30.0},
        "resources": {"LUT": 120},
        "maximum_memory_use": 600.0,
        "max_freq": 80.0,
        "device": "xc7a35t"
    })
    .to_string()
}

/// Runs 7 (compound), 8 (legacy), 9 (corrupt compound), 10 (empty legacy
/// run dir with a non-result object) and 40 (compound, out of most ranges).
fn remote() -> MemoryStore {
    let mut store = MemoryStore::default();
    store.put(
        format!("{RUNS}/7/results-generic-all.json.gz"),
        gzip(&compound(
            "2021-01-01T00:00:00",
            &[("blinky", "arty", "vivado"), ("blinky", "basys3", "nextpnr"), ("picorv32", "arty", "vivado")],
        )),
    );
    store.put(format!("{RUNS}/8/a/meta.json"), legacy("blinky", "000", "2020-12-2T10:0:0"));
    store.put(format!("{RUNS}/8/b/meta.json"), legacy("blinky", "001", "2020-12-1T10:0:0"));
    store.put(format!("{RUNS}/8/c/meta.json"), "{ truncated");
    store.put(format!("{RUNS}/9/results-generic-all.json.gz"), "not gzip");
    store.put(format!("{RUNS}/10/log.txt"), "nothing here");
    store.put(format!("{RUNS}/latest/readme"), "not a run");
    store.put(
        format!("{RUNS}/40/results-generic-all.json.gz"),
        gzip(&compound("2021-02-01T00:00:00", &[("blinky", "arty", "vivado")])),
    );
    store
}

fn pipeline(out: &Path) -> FetchPipeline<MemoryStore> {
    let locator = ResultLocator::new(remote(), RemoteConfig::default(), "continuous/install");
    FetchPipeline::new(locator, ResultStore::open(out).unwrap())
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_fetch_range_skips_failing_runs() {
    let out = tempfile::tempdir().unwrap();
    let summary = pipeline(out.path()).run(RunRange::inclusive(7, 20)).unwrap();

    assert_eq!(
        summary,
        FetchSummary {
            runs_stored: 2,
            runs_empty: 1,
            runs_failed: 1,
            files_written: 3,
        }
    );

    let blinky = read_json(&out.path().join("blinky/meta-7.json"));
    assert_eq!(blinky["date"], "2021-01-01T00:00:00");
    assert_eq!(blinky["results"]["board"], json!(["arty", "basys3"]));
    assert_eq!(blinky["results"]["toolchain"], json!(["vivado", "nextpnr"]));
    let picorv = read_json(&out.path().join("picorv32/meta-7.json"));
    assert_eq!(picorv["results"]["device"], json!(["xc7a35t"]));

    // Only the canonical build variant of run 8 is kept.
    let legacy = read_json(&out.path().join("blinky/meta-8.json"));
    assert_eq!(legacy["results"]["board"], json!(["arty"]));
    assert_eq!(legacy["date"], "2020-12-2T10:0:0");
    assert!(legacy["results"].get("wirelength").is_none());

    assert_eq!(
        fs::read_to_string(out.path().join("faulty_json-8-0.json")).unwrap(),
        "{ truncated"
    );
    assert!(!out.path().join("blinky/meta-9.json").exists());
    assert!(!out.path().join("blinky/meta-40.json").exists());
}

#[test]
fn test_fetch_is_idempotent() {
    let out = tempfile::tempdir().unwrap();
    let pipeline = pipeline(out.path());
    pipeline.fetch_run(7).unwrap();
    let first = fs::read(out.path().join("blinky/meta-7.json")).unwrap();
    pipeline.fetch_run(7).unwrap();
    let second = fs::read(out.path().join("blinky/meta-7.json")).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_fetch_unbounded_range() {
    let out = tempfile::tempdir().unwrap();
    let summary = pipeline(out.path())
        .run(RunRange::new(40, RunBound::Unbounded))
        .unwrap();
    assert_eq!(summary.runs_stored, 1);
    assert!(out.path().join("blinky/meta-40.json").is_file());
}

#[test]
fn test_cleanup_removes_range_only() {
    let out = tempfile::tempdir().unwrap();
    pipeline(out.path()).run(RunRange::new(7, RunBound::Unbounded)).unwrap();
    fs::write(out.path().join("blinky/notes.txt"), "keep").unwrap();

    let removed = remove_entries(&CleanupArgs {
        meta_dir: out.path().to_path_buf(),
        from_no: 8,
        to_no: 40,
    })
    .unwrap();

    assert_eq!(removed, 2);
    assert!(out.path().join("blinky/meta-7.json").is_file());
    assert!(out.path().join("picorv32/meta-7.json").is_file());
    assert!(!out.path().join("blinky/meta-8.json").exists());
    assert!(!out.path().join("blinky/meta-40.json").exists());
    assert!(out.path().join("blinky/notes.txt").is_file());
}

#[test]
fn test_report_from_fetched_store() {
    let out = tempfile::tempdir().unwrap();
    pipeline(out.path()).run(RunRange::new(7, RunBound::Unbounded)).unwrap();

    let site = build_site(out.path(), &out.path().join("no-plugin.js")).unwrap();
    let pages: Vec<&str> = site.pages().keys().map(String::as_str).collect();
    assert_eq!(pages, vec!["graphs/blinky.html", "graphs/picorv32.html", "index.html"]);

    let index = &site.pages()["index.html"];
    assert!(index.contains("<th>nextpnr</th><th>vivado</th>"));
    let blinky = &site.pages()["graphs/blinky.html"];
    assert!(blinky.contains("<h2>basys3</h2>"));
    assert!(blinky.contains("Runtime [s]"));
}
