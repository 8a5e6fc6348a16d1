//! Label file persistence and path resolution.
//!
//! Saving is write-through: the editor calls [`LabelStore::save`] after every
//! committed change. An empty annotation set removes the file instead of
//! writing an empty one.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::error::{FormatError, PersistAction, PersistError};
use super::yolo;
use crate::constants::LABELS_DIR_NAME;
use crate::model::{Annotation, ImageSize};

/// Resolve the label file for an image.
///
/// If the image's directory has a sibling `labels/` directory (the
/// `images/` + `labels/` layout), the label lives there. Otherwise it sits
/// next to the image. Either way it is `<stem>.txt`.
pub fn label_path_for(image_path: &Path) -> PathBuf {
    let image_dir = image_path.parent().unwrap_or_else(|| Path::new(""));
    let stem = image_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = format!("{}.txt", stem);

    if let Some(parent) = image_dir.parent() {
        let labels_dir = parent.join(LABELS_DIR_NAME);
        if labels_dir.is_dir() {
            return labels_dir.join(file_name);
        }
    }
    image_dir.join(file_name)
}

/// Where annotation sets are read from and written to.
pub trait LabelStore {
    /// Load the annotation set stored at `path`. A missing file is an empty set.
    fn load(&self, path: &Path, image_size: ImageSize) -> Result<Vec<Annotation>, FormatError>;

    /// Replace the content at `path` with `lines`. No lines removes the file.
    fn save(&mut self, path: &Path, lines: &[String]) -> Result<(), PersistError>;

    /// Remove the file at `path`. Removing a missing file is not an error.
    fn remove(&mut self, path: &Path) -> Result<(), PersistError>;
}

/// Encode every annotation (refreshing stale lines) and collect the lines to save.
pub fn encode_set(annotations: &mut [Annotation], image_size: ImageSize) -> Vec<String> {
    annotations
        .iter_mut()
        .map(|ann| ann.encoded_line(image_size).to_string())
        .collect()
}

/// Label store backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLabelStore;

impl LabelStore for FsLabelStore {
    fn load(&self, path: &Path, image_size: ImageSize) -> Result<Vec<Annotation>, FormatError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let annotations =
            yolo::decode_document(&text, image_size).map_err(|error| FormatError::Decode {
                path: path.to_path_buf(),
                error,
            })?;
        log::debug!("Loaded {} annotations from {:?}", annotations.len(), path);
        Ok(annotations)
    }

    fn save(&mut self, path: &Path, lines: &[String]) -> Result<(), PersistError> {
        if lines.is_empty() {
            return self.remove(path);
        }
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .map_err(|e| PersistError::new(path, PersistAction::CreateDir, e))?;
        }
        std::fs::write(path, yolo::encode_document(lines))
            .map_err(|e| PersistError::new(path, PersistAction::Write, e))?;
        log::trace!("Wrote {} lines to {:?}", lines.len(), path);
        Ok(())
    }

    fn remove(&mut self, path: &Path) -> Result<(), PersistError> {
        match std::fs::remove_file(path) {
            Ok(()) => {
                log::info!("🗑️ Removed label file {:?}", path);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PersistError::new(path, PersistAction::Remove, e)),
        }
    }
}

/// Label store kept in memory, for headless hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryLabelStore {
    files: HashMap<PathBuf, String>,
    fail_writes: bool,
    writes: usize,
}

impl MemoryLabelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file with raw content.
    pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }

    /// Raw content of a stored file.
    pub fn content(&self, path: &Path) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    /// Make every subsequent save/remove fail, to exercise error paths.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Number of successful saves and removals so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    fn check_writable(&self, path: &Path, action: PersistAction) -> Result<(), PersistError> {
        if self.fail_writes {
            return Err(PersistError::new(
                path,
                action,
                std::io::Error::new(ErrorKind::PermissionDenied, "store is read-only"),
            ));
        }
        Ok(())
    }
}

impl LabelStore for MemoryLabelStore {
    fn load(&self, path: &Path, image_size: ImageSize) -> Result<Vec<Annotation>, FormatError> {
        let Some(text) = self.files.get(path) else {
            return Ok(Vec::new());
        };
        yolo::decode_document(text, image_size).map_err(|error| FormatError::Decode {
            path: path.to_path_buf(),
            error,
        })
    }

    fn save(&mut self, path: &Path, lines: &[String]) -> Result<(), PersistError> {
        if lines.is_empty() {
            return self.remove(path);
        }
        self.check_writable(path, PersistAction::Write)?;
        self.files
            .insert(path.to_path_buf(), yolo::encode_document(lines));
        self.writes += 1;
        Ok(())
    }

    fn remove(&mut self, path: &Path) -> Result<(), PersistError> {
        self.check_writable(path, PersistAction::Remove)?;
        self.files.remove(path);
        self.writes += 1;
        Ok(())
    }
}
