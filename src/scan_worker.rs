//! Background thread for dataset scanning and statistics.
//!
//! The worker walks a dataset folder, resolves every image's label file and
//! decodes it, then posts one [`ScanResult`] back through a channel. It only
//! reads files and never touches an editing session.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::constants::CLASSES_FILENAME;
use crate::format::{DecodeError, decode_document, label_path_for};
use crate::model::{ImageSize, ShapeKind};
use crate::project::discover_images;

/// Dataset split, guessed from the directory path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Split {
    Train,
    Val,
    Test,
    Uncategorized,
}

impl Split {
    /// Classify by the image's directory path (case-insensitive).
    ///
    /// Pass the path relative to the dataset root so that the root's own
    /// name does not decide the split.
    pub fn of(image_path: &Path) -> Split {
        let dir = image_path
            .parent()
            .map(|p| p.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if dir.contains("train") {
            Split::Train
        } else if dir.contains("val") {
            Split::Val
        } else if dir.contains("test") {
            Split::Test
        } else {
            Split::Uncategorized
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::Test => "test",
            Split::Uncategorized => "uncategorized",
        }
    }
}

/// Image and object counts of one split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitCounts {
    pub images: usize,
    pub objects: usize,
}

/// Statistics gathered for a dataset folder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanReport {
    pub root: PathBuf,
    /// All images found, sorted
    pub images: Vec<PathBuf>,
    /// Total annotations across all readable label files
    pub objects: usize,
    pub boxes: usize,
    pub polygons: usize,
    /// Annotation count per class id
    pub class_counts: BTreeMap<u32, usize>,
    pub splits: BTreeMap<Split, SplitCounts>,
    /// Images without any annotation (no file, or an empty one)
    pub images_without_labels: Vec<PathBuf>,
    /// Label files whose stem matches no image
    pub labels_without_images: Vec<PathBuf>,
    /// Label files that failed to decode
    pub corrupted: Vec<(PathBuf, DecodeError)>,
}

/// Outcome of one scan request.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanResult {
    Done(ScanReport),
    Failed { root: PathBuf, error: String },
}

/// Scan a dataset folder on the current thread.
pub fn scan_dataset(root: &Path) -> Result<ScanReport, crate::format::FormatError> {
    let images = discover_images(root)?;
    let mut report = ScanReport {
        root: root.to_path_buf(),
        ..ScanReport::default()
    };

    for image in &images {
        let split = Split::of(image.strip_prefix(root).unwrap_or(image));
        let counts = report.splits.entry(split).or_default();
        counts.images += 1;

        let label_path = label_path_for(image);
        let text = match std::fs::read_to_string(&label_path) {
            Ok(text) => text,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Failed to read {:?}: {}", label_path, e);
                }
                report.images_without_labels.push(image.clone());
                continue;
            }
        };

        // Counts only need normalized coordinates
        match decode_document(&text, ImageSize::new(1, 1)) {
            Ok(annotations) => {
                if annotations.is_empty() {
                    report.images_without_labels.push(image.clone());
                }
                counts.objects += annotations.len();
                report.objects += annotations.len();
                for ann in &annotations {
                    *report.class_counts.entry(ann.class_id()).or_default() += 1;
                    match ann.kind() {
                        ShapeKind::Box => report.boxes += 1,
                        ShapeKind::Polygon => report.polygons += 1,
                    }
                }
            }
            Err(e) => {
                log::warn!("Corrupted label file {:?}: {}", label_path, e);
                report.corrupted.push((label_path, e));
            }
        }
    }

    let stems: HashSet<String> = images
        .iter()
        .filter_map(|p| p.file_stem())
        .map(|s| s.to_string_lossy().into_owned())
        .collect();
    collect_orphan_labels(root, &stems, &mut report.labels_without_images);
    report.labels_without_images.sort();
    report.images = images;

    Ok(report)
}

fn collect_orphan_labels(folder: &Path, stems: &HashSet<String>, orphans: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(folder) else {
        return;
    };
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.is_dir() {
            collect_orphan_labels(&path, stems, orphans);
            continue;
        }
        let is_label = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
        let is_classes = path
            .file_name()
            .is_some_and(|name| name.eq_ignore_ascii_case(CLASSES_FILENAME));
        if !is_label || is_classes {
            continue;
        }
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !stems.contains(&stem) {
            orphans.push(path);
        }
    }
}

/// Message sent to the scan thread.
enum ThreadMessage {
    /// Scan a dataset root
    Scan(PathBuf),
    /// Shutdown the thread
    Shutdown,
}

/// Manages the single background thread used for dataset scanning.
pub struct ScanWorker {
    /// Sender for requests to the background thread
    request_tx: Sender<ThreadMessage>,
    /// Receiver for results from the background thread
    result_rx: Receiver<ScanResult>,
    /// Handle to the background thread (for joining on drop)
    thread_handle: Option<JoinHandle<()>>,
    /// Number of requests without a result yet
    pending: usize,
}

impl ScanWorker {
    /// Spawn the scan thread.
    pub fn spawn() -> std::io::Result<Self> {
        let (request_tx, request_rx) = mpsc::channel::<ThreadMessage>();
        let (result_tx, result_rx) = mpsc::channel::<ScanResult>();

        let thread_handle = thread::Builder::new()
            .name("dataset-scan".to_string())
            .spawn(move || {
                log::debug!("Dataset scan thread started");
                Self::thread_loop(request_rx, result_tx);
                log::debug!("Dataset scan thread exiting");
            })?;

        Ok(Self {
            request_tx,
            result_rx,
            thread_handle: Some(thread_handle),
            pending: 0,
        })
    }

    /// Background thread main loop.
    fn thread_loop(request_rx: Receiver<ThreadMessage>, result_tx: Sender<ScanResult>) {
        loop {
            match request_rx.recv() {
                Ok(ThreadMessage::Scan(root)) => {
                    let result = match scan_dataset(&root) {
                        Ok(report) => {
                            log::info!(
                                "🔎 Scanned {:?}: {} images, {} objects",
                                root,
                                report.images.len(),
                                report.objects
                            );
                            ScanResult::Done(report)
                        }
                        Err(e) => {
                            log::error!("Scan of {:?} failed: {}", root, e);
                            ScanResult::Failed {
                                root,
                                error: e.to_string(),
                            }
                        }
                    };
                    if result_tx.send(result).is_err() {
                        log::warn!("Result channel closed, scan thread exiting");
                        break;
                    }
                }
                Ok(ThreadMessage::Shutdown) => {
                    log::debug!("Received shutdown signal");
                    break;
                }
                Err(_) => {
                    // Channel closed, exit
                    break;
                }
            }
        }
    }

    /// Queue a scan of `root`. The result arrives through [`ScanWorker::try_recv`].
    pub fn request_scan(&mut self, root: PathBuf) {
        if self.request_tx.send(ThreadMessage::Scan(root)).is_err() {
            log::error!("Failed to send scan request: channel closed");
        } else {
            self.pending += 1;
        }
    }

    /// Take one finished result, if any. Non-blocking.
    pub fn try_recv(&mut self) -> Option<ScanResult> {
        match self.result_rx.try_recv() {
            Ok(result) => {
                self.pending = self.pending.saturating_sub(1);
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                log::warn!("Scan thread disconnected");
                None
            }
        }
    }

    /// Wait up to `timeout` for one finished result.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<ScanResult> {
        match self.result_rx.recv_timeout(timeout) {
            Ok(result) => {
                self.pending = self.pending.saturating_sub(1);
                Some(result)
            }
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                log::warn!("Scan thread disconnected");
                None
            }
        }
    }

    /// Get the number of pending requests.
    pub fn pending_count(&self) -> usize {
        self.pending
    }
}

impl Drop for ScanWorker {
    fn drop(&mut self) {
        log::debug!("Shutting down scan thread");

        // Send shutdown signal
        let _ = self.request_tx.send(ThreadMessage::Shutdown);

        // Wait for thread to finish
        if let Some(handle) = self.thread_handle.take() {
            if let Err(e) = handle.join() {
                log::warn!("Scan thread panicked: {:?}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn sample_dataset() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("classes.txt"), "car\nperson\n");
        write(&root.join("train/images/a.jpg"), "");
        write(&root.join("train/images/b.jpg"), "");
        write(&root.join("val/images/c.jpg"), "");
        write(&root.join("val/images/d.jpg"), "");
        write(
            &root.join("train/labels/a.txt"),
            "0 0.5 0.5 0.2 0.2\n1 0.1 0.1 0.3 0.1 0.2 0.3\n",
        );
        write(&root.join("train/labels/ghost.txt"), "0 0.5 0.5 0.1 0.1");
        write(&root.join("val/labels/c.txt"), "1 0.5 0.5 0.2 0.2\n0 1 2 3\n");
        write(&root.join("val/labels/d.txt"), "\n");
        dir
    }

    #[test]
    fn test_split_of() {
        assert_eq!(Split::of(Path::new("ds/train/images/a.jpg")), Split::Train);
        assert_eq!(Split::of(Path::new("ds/valid/a.jpg")), Split::Val);
        assert_eq!(Split::of(Path::new("ds/Test/a.jpg")), Split::Test);
        assert_eq!(Split::of(Path::new("ds/a.jpg")), Split::Uncategorized);
    }

    #[test]
    fn test_scan_dataset_statistics() {
        let dir = sample_dataset();
        let root = dir.path();
        let report = scan_dataset(root).unwrap();

        assert_eq!(report.images.len(), 4);
        assert_eq!(report.objects, 2);
        assert_eq!((report.boxes, report.polygons), (1, 1));
        assert_eq!(report.class_counts.get(&0), Some(&1));
        assert_eq!(report.class_counts.get(&1), Some(&1));
        assert_eq!(
            report.splits.get(&Split::Train),
            Some(&SplitCounts {
                images: 2,
                objects: 2
            })
        );
        assert_eq!(report.splits.get(&Split::Val).map(|s| s.images), Some(2));

        assert_eq!(
            report.images_without_labels,
            vec![
                root.join("train/images/b.jpg"),
                root.join("val/images/d.jpg")
            ]
        );
        assert_eq!(
            report.labels_without_images,
            vec![root.join("train/labels/ghost.txt")]
        );
        assert_eq!(report.corrupted.len(), 1);
        assert_eq!(report.corrupted[0].0, root.join("val/labels/c.txt"));
        assert_eq!(report.corrupted[0].1.line, 2);
    }

    #[test]
    fn test_worker_posts_result() {
        let dir = sample_dataset();
        let mut worker = ScanWorker::spawn().unwrap();
        worker.request_scan(dir.path().to_path_buf());
        assert_eq!(worker.pending_count(), 1);

        match worker.recv_timeout(Duration::from_secs(10)) {
            Some(ScanResult::Done(report)) => assert_eq!(report.images.len(), 4),
            other => panic!("Expected a report, got {:?}", other),
        }
        assert_eq!(worker.pending_count(), 0);
        assert!(worker.try_recv().is_none());
    }

    #[test]
    fn test_worker_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut worker = ScanWorker::spawn().unwrap();
        worker.request_scan(dir.path().join("missing"));

        match worker.recv_timeout(Duration::from_secs(10)) {
            Some(ScanResult::Failed { error, .. }) => assert!(error.contains("not a directory")),
            other => panic!("Expected a failure, got {:?}", other),
        }
    }
}
