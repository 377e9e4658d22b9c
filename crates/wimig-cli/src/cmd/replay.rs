use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use wimig_core::config::load_config;
use wimig_core::model::export::load_export;
use wimig_core::plan::ExecutionPlan;
use wimig_core::replay::replay;

use crate::output::{OutputMode, render};

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Export JSON file with work items and their revision histories.
    #[arg(long, value_name = "PATH")]
    pub input: PathBuf,

    /// Migration config (TOML, or JSON when the file ends in `.json`).
    #[arg(long, value_name = "PATH")]
    pub config: PathBuf,
}

pub fn run_replay(args: &ReplayArgs, output: OutputMode) -> Result<()> {
    let config = load_config(&args.config)?;
    let mut ctx = load_export(&args.input)?;

    let mut plan = ExecutionPlan::from_context(&mut ctx);
    let report = replay(&mut plan, &config)?;

    render(output, &report, |report, w| {
        for step in &report.steps {
            for link in &step.links {
                writeln!(w, "{link} @rev {}", step.rev_index)?;
            }
        }
        writeln!(
            w,
            "replayed {} revisions across {} items: {} added, {} removed",
            report.revisions, report.items_finalized, report.links_added, report.links_removed
        )
    })
}
