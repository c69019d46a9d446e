//! Recursively de-duplicate candidate artwork, optionally matching a reference

use std::{
    num::NonZeroUsize,
    path::PathBuf,
    sync::{Arc, atomic::Ordering},
    thread,
    time::Duration,
};

use anyhow::Context as _;
use async_channel::Receiver;
use clap::Parser as _;
use coverdiff::{
    cl, load_candidate, select_candidates,
    selection::Candidate,
    walk::{ImageFileIterator, Stats},
};
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;

/// Worker entry point
async fn worker(
    work_rx: Receiver<PathBuf>,
    candidates: Arc<Mutex<Vec<Candidate>>>,
    stats: Arc<Stats>,
    progress_bar: ProgressBar,
) -> anyhow::Result<()> {
    while let Ok(path) = work_rx.recv().await {
        if let Some(candidate) = load_candidate(path, &stats).await? {
            candidates.lock().push(candidate);
        }
        update_progress_bar(&stats, &progress_bar);
    }
    Ok(())
}

/// Update the progress bar message from current stats
fn update_progress_bar(stats: &Stats, progress_bar: &ProgressBar) {
    let image_files = stats.image_files.load(Ordering::Relaxed);
    let decoded = stats.decoded.load(Ordering::Relaxed);
    let decode_errors = stats.decode_errors.load(Ordering::Relaxed);
    let walk_errors = stats.walk_errors.load(Ordering::Relaxed);

    progress_bar.set_length(image_files.try_into().unwrap_or(u64::MAX));
    progress_bar.set_position(stats.processed().try_into().unwrap_or(u64::MAX));
    progress_bar.set_message(format!(
        "files:{image_files} decoded:{decoded} errs:{decode_errors} walk_errs:{walk_errors}"
    ));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CL args
    let cl_args = cl::CoverdiffRecursiveArgs::parse();

    // Init logger
    simple_logger::init_with_level(cl_args.verbosity).context("Failed to setup logger")?;

    // Create progress bar
    let stats: Arc<Stats> = Arc::default();
    let progress_bar = ProgressBar::new(0);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner} [{elapsed_precise}/{duration_precise}] [{bar}] {pos}/{len} {percent}% {wide_msg}")?,
    );
    progress_bar.enable_steady_tick(Duration::from_millis(300));
    update_progress_bar(&stats, &progress_bar);

    // Start workers, decoding is CPU bound
    let worker_count = thread::available_parallelism().map_or(4, NonZeroUsize::get);
    let candidates = Arc::new(Mutex::new(Vec::new()));
    let (work_tx, work_rx) = async_channel::bounded::<PathBuf>(1024);
    let mut workers = Vec::with_capacity(worker_count);
    for _ in 0..worker_count {
        let worker_work_rx = work_rx.clone();
        let worker_candidates = Arc::clone(&candidates);
        let worker_stats = Arc::clone(&stats);
        let worker_progress_bar = progress_bar.clone();
        let worker = tokio::spawn(async {
            if let Err(err) = worker(
                worker_work_rx,
                worker_candidates,
                worker_stats,
                worker_progress_bar,
            )
            .await
            {
                log::error!("Worker errored: {err}");
            }
        });
        workers.push(worker);
    }

    // Walk candidates tree
    for path in ImageFileIterator::new(&cl_args.candidates_dir, Arc::clone(&stats)) {
        update_progress_bar(&stats, &progress_bar);
        work_tx.send(path).await?;
    }

    drop(work_tx);
    for worker in workers {
        let _ = worker.await;
    }
    progress_bar.finish();

    // Select
    let candidates = std::mem::take(&mut *candidates.lock());
    let report = select_candidates(
        candidates,
        cl_args.reference.as_deref(),
        Arc::new(cl_args.selection),
    )
    .await?;
    stats.kept.store(report.kept.len(), Ordering::Relaxed);

    // Output
    if cl_args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for kept in &report.kept {
            println!("{}", kept.path.display());
        }
    }

    log::info!(
        "{} image file(s), {} decoded, {} kept, {} decode error(s), {} walk error(s)",
        stats.image_files.load(Ordering::Relaxed),
        stats.decoded.load(Ordering::Relaxed),
        stats.kept.load(Ordering::Relaxed),
        stats.decode_errors.load(Ordering::Relaxed),
        stats.walk_errors.load(Ordering::Relaxed)
    );

    Ok(())
}
