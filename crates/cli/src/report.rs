// Copyright 2025 perf-graphs Contributors
// SPDX-License-Identifier: Apache-2.0

//! The report tool: render the result store into HTML pages, write them
//! out and optionally publish them.

use anyhow::{Context, Result};
use clap::Parser;
use perf_graphs_publish::{deploy_pages, PublishMode};
use perf_graphs_report::site::ZOOM_PLUGIN_PATH;
use perf_graphs_report::{load_projects, Site};
use perf_graphs_results::ResultStore;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Commit message of published pages.
pub const DEPLOY_MESSAGE: &str = "auto-deploy";

/// Generate (and deploy) fpga-tool-perf result pages.
#[derive(Parser, Debug)]
#[command(name = "perf-graphs")]
#[command(author, version, about, long_about = None)]
pub struct ReportArgs {
    /// Result store directory, one subdirectory per project.
    pub data_dir: PathBuf,

    /// Write the generated pages to this directory.
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Publish the pages using this deploy configuration file.
    #[arg(short, long, value_name = "CONFIG")]
    pub deploy: Option<PathBuf>,

    /// Replace the branch tip instead of adding a commit.
    #[arg(short, long, requires = "deploy")]
    pub amend: bool,

    /// Chart.js zoom plugin to ship with the pages.
    #[arg(long, value_name = "PATH", default_value = ZOOM_PLUGIN_PATH)]
    pub zoom_plugin: PathBuf,
}

/// Build every page from the result store at `data_dir`.
pub fn build_site(data_dir: &Path, zoom_plugin: &Path) -> Result<Site> {
    let store = ResultStore::open(data_dir).context("Invalid data directory")?;
    let projects = load_projects(&store).context("Can't load results")?;
    info!(projects = projects.len(), "Loaded result store");

    let plugin = match fs::read_to_string(zoom_plugin) {
        Ok(script) => Some(script),
        Err(e) => {
            warn!(
                path = %zoom_plugin.display(),
                error = %e,
                "Can't read the zoom plugin, pages will be generated without it"
            );
            None
        }
    };
    Ok(Site::build(&projects, plugin))
}

/// Run the report tool.
pub fn run(args: ReportArgs) -> Result<()> {
    let site = build_site(&args.data_dir, &args.zoom_plugin)?;

    if let Some(out_dir) = &args.out_dir {
        site.write_to(out_dir)
            .with_context(|| format!("Can't write pages to {}", out_dir.display()))?;
    }

    if let Some(config) = &args.deploy {
        let sha = deploy_pages(config, site.pages(), DEPLOY_MESSAGE, PublishMode::from_amend(args.amend))
            .context("Deploy failed")?;
        info!(commit = %sha, "Pages deployed");
    }

    if args.out_dir.is_none() && args.deploy.is_none() {
        warn!("Neither an output directory nor a deploy configuration was given, nothing written");
    }
    Ok(())
}
