use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use wimig_core::model::export::load_export;
use wimig_core::plan::order_revisions;

use crate::output::{OutputMode, render};

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Export JSON file with work items and their revision histories.
    #[arg(long, value_name = "PATH")]
    pub input: PathBuf,
}

pub fn run_plan(args: &PlanArgs, output: OutputMode) -> Result<()> {
    let ctx = load_export(&args.input)?;
    let references = order_revisions(&ctx);
    tracing::debug!(
        items = ctx.len(),
        revisions = references.len(),
        "built replay order"
    );

    render(output, &references, |refs, w| {
        for reference in refs {
            writeln!(w, "{reference}")?;
        }
        Ok(())
    })
}
