//! Code to walk candidate image trees

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use crate::artwork::Format;

/// Real time stats of global processing
#[derive(Default)]
pub struct Stats {
    /// Count of files identified as images
    pub image_files: AtomicUsize,
    /// Count of images successfully decoded
    pub decoded: AtomicUsize,
    /// Count of image files that failed to decode
    pub decode_errors: AtomicUsize,
    /// Count of images kept after selection
    pub kept: AtomicUsize,
    /// Count of directories or entries that could not be read
    pub walk_errors: AtomicUsize,
}

impl Stats {
    /// Count of image files whose decoding is done, successfully or not
    #[must_use]
    pub fn processed(&self) -> usize {
        self.decoded.load(Ordering::Relaxed) + self.decode_errors.load(Ordering::Relaxed)
    }
}

/// Iterator that recursively yields paths of image files
pub struct ImageFileIterator {
    dirs: Vec<PathBuf>,
    pending: Vec<PathBuf>,
    stats: Arc<Stats>,
}

impl ImageFileIterator {
    /// Create an iterator that recursively yields paths of image files under `dir`
    pub fn new(dir: &Path, stats: Arc<Stats>) -> Self {
        Self {
            dirs: vec![dir.to_owned()],
            pending: Vec::new(),
            stats,
        }
    }

    fn is_image_file(path: &Path) -> bool {
        Format::from_path(path).is_some()
    }

    /// Read one directory, queuing subdirectories and image files
    fn read_dir(&mut self, dir: &Path) {
        let dir_it = match fs::read_dir(dir) {
            Ok(dir_it) => dir_it,
            Err(err) => {
                self.stats.walk_errors.fetch_add(1, Ordering::Relaxed);
                log::warn!("Failed to read dir {dir:?}: {err}");
                return;
            }
        };
        let mut image_files = Vec::new();
        for entry_res in dir_it {
            let entry = match entry_res {
                Ok(entry) => entry,
                Err(err) => {
                    self.stats.walk_errors.fetch_add(1, Ordering::Relaxed);
                    log::warn!("Failed to read dir {dir:?} entry: {err}");
                    continue;
                }
            };
            let ftype = match entry.file_type() {
                Ok(ftype) => ftype,
                Err(err) => {
                    self.stats.walk_errors.fetch_add(1, Ordering::Relaxed);
                    log::warn!("Failed to read dir {dir:?} entry: {err}");
                    continue;
                }
            };
            let path = entry.path();
            if ftype.is_dir() {
                self.dirs.push(path);
            } else if ftype.is_file() && Self::is_image_file(&path) {
                image_files.push(path);
            }
        }
        self.stats
            .image_files
            .fetch_add(image_files.len(), Ordering::Relaxed);
        // reversed, pop yields sorted paths
        image_files.sort_unstable_by(|a, b| b.cmp(a));
        self.pending = image_files;
    }
}

impl Iterator for ImageFileIterator {
    type Item = PathBuf;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(path) = self.pending.pop() {
                return Some(path);
            }
            let dir = self.dirs.pop()?;
            self.read_dir(&dir);
        }
    }
}
