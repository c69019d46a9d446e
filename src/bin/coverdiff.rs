//! coverdiff main binary

use anyhow::Context as _;
use clap::Parser as _;
use coverdiff::{CompareStatus, cl, compare_files};

#[tokio::main]
async fn main() -> anyhow::Result<CompareStatus> {
    // Parse CL args
    let cl_args = cl::CoverdiffArgs::parse();

    // Init logger
    simple_logger::init_with_level(cl_args.verbosity).context("Failed to setup logger")?;

    // Run
    let report = compare_files(&cl_args.image_a, &cl_args.image_b, &cl_args.scoring).await?;

    // Output
    if cl_args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{} ({})",
            report.score,
            if report.is_match { "match" } else { "no match" }
        );
    }

    Ok(report.status())
}
