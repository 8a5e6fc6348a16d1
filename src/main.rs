//! `yolo-lint`: scan a YOLO dataset folder and report its label files.
//!
//! Usage: `yolo-lint <dataset-folder>`
//!
//! Exits with status 1 if any label file fails to decode.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use yolo_editor::config::EditorConfig;
use yolo_editor::constants::CLASSES_FILENAME;
use yolo_editor::model::ClassList;
use yolo_editor::scan_worker::{ScanReport, ScanResult, ScanWorker};

/// Upper bound on how long a single scan may take.
const SCAN_TIMEOUT: Duration = Duration::from_secs(600);

fn main() -> ExitCode {
    let config = EditorConfig::load_from_default_path();

    // RUST_LOG overrides the configured level
    env_logger::Builder::new()
        .filter_level(config.preferences.log_level.to_level_filter())
        .parse_default_env()
        .init();

    let Some(root) = std::env::args_os().nth(1).map(PathBuf::from) else {
        eprintln!("usage: yolo-lint <dataset-folder>");
        return ExitCode::from(2);
    };

    let mut worker = match ScanWorker::spawn() {
        Ok(worker) => worker,
        Err(e) => {
            log::error!("Failed to spawn scan thread: {}", e);
            return ExitCode::FAILURE;
        }
    };
    worker.request_scan(root.clone());

    match worker.recv_timeout(SCAN_TIMEOUT) {
        Some(ScanResult::Done(report)) => {
            let classes = match ClassList::load(&root.join(CLASSES_FILENAME)) {
                Ok(classes) => classes,
                Err(e) => {
                    log::warn!("Could not read class list: {}", e);
                    ClassList::default()
                }
            };
            print_report(&report, &classes);
            if report.corrupted.is_empty() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Some(ScanResult::Failed { root, error }) => {
            eprintln!("Failed to scan {}: {}", root.display(), error);
            ExitCode::FAILURE
        }
        None => {
            eprintln!("Scan of {} did not finish", root.display());
            ExitCode::FAILURE
        }
    }
}

fn relative<'a>(path: &'a Path, root: &Path) -> std::path::Display<'a> {
    path.strip_prefix(root).unwrap_or(path).display()
}

fn print_report(report: &ScanReport, classes: &ClassList) {
    println!("Dataset: {}", report.root.display());
    println!(
        "Images: {}  Objects: {}  (boxes {}, polygons {})",
        report.images.len(),
        report.objects,
        report.boxes,
        report.polygons
    );

    if !report.class_counts.is_empty() {
        println!("\nClasses:");
        for (class_id, count) in &report.class_counts {
            let pct = *count as f64 / report.objects.max(1) as f64 * 100.0;
            println!(
                "  {:<24} {:>7}  {:>6.2}%",
                classes.display_label(*class_id),
                count,
                pct
            );
        }
    }

    println!("\nSplits:");
    for (split, counts) in &report.splits {
        println!(
            "  {:<14} {:>6} images {:>7} objects",
            split.name(),
            counts.images,
            counts.objects
        );
    }

    if !report.images_without_labels.is_empty() {
        println!(
            "\nImages without annotations: {}",
            report.images_without_labels.len()
        );
        for path in &report.images_without_labels {
            println!("  {}", relative(path, &report.root));
        }
    }

    if !report.labels_without_images.is_empty() {
        println!(
            "\nLabel files without an image: {}",
            report.labels_without_images.len()
        );
        for path in &report.labels_without_images {
            println!("  {}", relative(path, &report.root));
        }
    }

    if report.corrupted.is_empty() {
        println!("\nAll label files decoded cleanly.");
    } else {
        println!("\nCorrupted label files: {}", report.corrupted.len());
        for (path, error) in &report.corrupted {
            println!("  {}: {}", relative(path, &report.root), error);
        }
    }
}
