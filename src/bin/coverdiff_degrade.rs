//! Write degraded variants of an image, to build test corpora

use anyhow::Context as _;
use clap::Parser as _;
use coverdiff::{cl, degrade};

fn main() -> anyhow::Result<()> {
    // Parse CL args
    let cl_args = cl::DegradeArgs::parse();

    // Init logger
    simple_logger::init_with_level(cl_args.verbosity).context("Failed to setup logger")?;

    // Run
    let outputs =
        degrade::write_variants(&cl_args.input, &cl_args.output_dir, &cl_args.degradations)?;
    for output in outputs {
        println!("{}", output.display());
    }

    Ok(())
}
