//! Dataset folder: image discovery, navigation and the class list.

use std::path::{Path, PathBuf};

use crate::constants::{CLASSES_FILENAME, IMAGE_EXTENSIONS, LABELS_DIR_NAME};
use crate::editor::EditorSession;
use crate::format::{FormatError, LabelStore, label_path_for};
use crate::model::{ClassList, ImageSize};

/// Check if a path has a supported image extension (case-insensitive).
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Read the pixel size of an image from its header.
pub fn image_dimensions(path: &Path) -> Result<ImageSize, FormatError> {
    let (width, height) = image::image_dimensions(path)?;
    Ok(ImageSize::new(width, height))
}

/// Find all images under `root`, sorted by full path.
///
/// Directories whose name contains `labels` are not entered.
pub fn discover_images(root: &Path) -> Result<Vec<PathBuf>, FormatError> {
    if !root.is_dir() {
        return Err(FormatError::invalid_dataset(format!(
            "{:?} is not a directory",
            root
        )));
    }
    let mut images = Vec::new();
    scan_folder_recursive(root, &mut images)?;
    images.sort();
    Ok(images)
}

fn scan_folder_recursive(folder: &Path, images: &mut Vec<PathBuf>) -> Result<(), FormatError> {
    for entry in std::fs::read_dir(folder)?.filter_map(|e| e.ok()) {
        let path = entry.path();

        if path.is_file() && is_image_file(&path) {
            images.push(path);
        } else if path.is_dir() {
            let is_label_dir = path
                .file_name()
                .is_some_and(|name| name.to_string_lossy().contains(LABELS_DIR_NAME));
            if is_label_dir {
                continue;
            }
            if let Err(e) = scan_folder_recursive(&path, images) {
                log::warn!("Failed to scan subdirectory {:?}: {}", path, e);
                // Continue scanning other directories
            }
        }
    }
    Ok(())
}

fn remove_if_exists(path: &Path) -> Result<(), FormatError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// An opened dataset folder.
#[derive(Clone, Debug)]
pub struct Project {
    /// Dataset root
    root: PathBuf,
    /// Image files, sorted
    images: Vec<PathBuf>,
    current_index: usize,
    classes: ClassList,
}

impl Project {
    /// Open a dataset folder: discover images and read `classes.txt`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, FormatError> {
        let root = root.into();
        let images = discover_images(&root)?;
        if images.is_empty() {
            return Err(FormatError::invalid_dataset(format!(
                "no images found in {:?}",
                root
            )));
        }
        let classes = ClassList::load(&root.join(CLASSES_FILENAME))?;

        log::info!(
            "📂 Opened dataset {:?}: {} images, {} classes",
            root,
            images.len(),
            classes.len()
        );

        Ok(Self {
            root,
            images,
            current_index: 0,
            classes,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn classes(&self) -> &ClassList {
        &self.classes
    }

    pub fn classes_path(&self) -> PathBuf {
        self.root.join(CLASSES_FILENAME)
    }

    /// Replace the class list and write it to `classes.txt`.
    pub fn set_classes(&mut self, classes: ClassList) -> Result<(), FormatError> {
        classes.save(&self.classes_path())?;
        self.classes = classes;
        Ok(())
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_image(&self) -> Option<&Path> {
        self.images.get(self.current_index).map(PathBuf::as_path)
    }

    /// Label file of the current image.
    pub fn current_label_path(&self) -> Option<PathBuf> {
        self.current_image().map(label_path_for)
    }

    /// Current image path relative to the dataset root, for display.
    pub fn current_name(&self) -> String {
        let Some(path) = self.current_image() else {
            return "Unknown".to_string();
        };
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned()
    }

    /// Move to the next image. Returns false at the last image.
    pub fn next(&mut self) -> bool {
        if self.current_index + 1 < self.images.len() {
            self.current_index += 1;
            true
        } else {
            false
        }
    }

    /// Move to the previous image. Returns false at the first image.
    pub fn previous(&mut self) -> bool {
        if self.current_index > 0 {
            self.current_index -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to an image by index. Out-of-range indices are ignored.
    pub fn go_to(&mut self, index: usize) -> bool {
        if index < self.images.len() {
            self.current_index = index;
            true
        } else {
            false
        }
    }

    /// Delete the current image and its label file from disk.
    ///
    /// The project then points at the image that took its place, or the new
    /// last image. Returns the deleted image path.
    pub fn delete_current(&mut self) -> Result<PathBuf, FormatError> {
        let Some(image) = self.current_image().map(Path::to_path_buf) else {
            return Err(FormatError::invalid_dataset("no current image"));
        };
        let label = label_path_for(&image);

        remove_if_exists(&image)?;
        remove_if_exists(&label)?;

        self.images.remove(self.current_index);
        self.current_index = self.current_index.min(self.images.len().saturating_sub(1));
        log::info!(
            "🗑️ Deleted image {:?} ({} images left)",
            image,
            self.images.len()
        );
        Ok(image)
    }

    /// Progress string like "3/15".
    pub fn progress(&self) -> String {
        format!("{}/{}", self.current_index + 1, self.images.len())
    }

    /// Open the current image in `session`, reading its size from the file header.
    pub fn open_current<S: LabelStore>(
        &self,
        session: &mut EditorSession<S>,
    ) -> Result<(), FormatError> {
        let Some(path) = self.current_image() else {
            return Err(FormatError::invalid_dataset("no current image"));
        };
        let size = image_dimensions(path)?;
        session.set_class_list(self.classes.clone());
        session.open_image(path, size);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorPreferences;
    use crate::format::FsLabelStore;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("a/b.PNG")));
        assert!(is_image_file(Path::new("x.jpeg")));
        assert!(!is_image_file(Path::new("x.txt")));
        assert!(!is_image_file(Path::new("jpg")));
    }

    #[test]
    fn test_discovery_skips_label_dirs_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("train/images/b.jpg"));
        touch(&root.join("train/images/a.png"));
        touch(&root.join("train/labels/a.txt"));
        touch(&root.join("train/labels/stray.png"));
        touch(&root.join("val/c.BMP"));
        touch(&root.join("notes.md"));

        let images = discover_images(root).unwrap();
        assert_eq!(
            images,
            vec![
                root.join("train/images/a.png"),
                root.join("train/images/b.jpg"),
                root.join("val/c.BMP"),
            ]
        );
    }

    #[test]
    fn test_open_rejects_empty_or_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Project::open(dir.path()),
            Err(FormatError::InvalidDataset { .. })
        ));
        assert!(Project::open(dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_navigation_does_not_wrap() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("1.png"));
        touch(&dir.path().join("2.png"));

        let mut project = Project::open(dir.path()).unwrap();
        assert_eq!(project.progress(), "1/2");
        assert!(!project.previous());
        assert!(project.next());
        assert_eq!(project.current_name(), "2.png");
        assert!(!project.next());
        assert!(!project.go_to(5));
        assert!(project.go_to(0));
        assert_eq!(project.current_label_path(), Some(dir.path().join("1.txt")));
    }

    #[test]
    fn test_delete_current_removes_image_and_label() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("images/a.png"));
        touch(&root.join("images/b.png"));
        touch(&root.join("images/c.png"));
        std::fs::create_dir_all(root.join("labels")).unwrap();
        std::fs::write(root.join("labels/b.txt"), "0 0.5 0.5 0.1 0.1").unwrap();

        let mut project = Project::open(root).unwrap();
        assert!(project.go_to(1));
        let deleted = project.delete_current().unwrap();
        assert_eq!(deleted, root.join("images/b.png"));
        assert!(!deleted.exists());
        assert!(!root.join("labels/b.txt").exists());
        // The next image moves into the freed slot
        assert_eq!(project.current_image(), Some(root.join("images/c.png").as_path()));

        // Deleting the last image steps back; no label file is fine
        project.delete_current().unwrap();
        assert_eq!(project.current_image(), Some(root.join("images/a.png").as_path()));
        project.delete_current().unwrap();
        assert!(project.is_empty());
        assert!(project.current_image().is_none());
        assert!(matches!(
            project.delete_current(),
            Err(FormatError::InvalidDataset { .. })
        ));
    }

    #[test]
    fn test_classes_file() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("1.png"));
        std::fs::write(dir.path().join("classes.txt"), "car\n\nperson\n").unwrap();

        let mut project = Project::open(dir.path()).unwrap();
        assert_eq!(project.classes().name(1), Some("person"));

        project
            .set_classes(ClassList::new(vec!["dog".into()]))
            .unwrap();
        let reloaded = Project::open(dir.path()).unwrap();
        assert_eq!(reloaded.classes().iter().collect::<Vec<_>>(), vec!["dog"]);
    }

    #[test]
    fn test_open_current_reads_image_size() {
        let dir = tempfile::tempdir().unwrap();
        image::RgbImage::new(64, 48)
            .save(dir.path().join("frame.png"))
            .unwrap();
        std::fs::write(dir.path().join("frame.txt"), "0 0.5 0.5 0.5 0.5\n").unwrap();

        let project = Project::open(dir.path()).unwrap();
        assert_eq!(
            image_dimensions(project.current_image().unwrap()).unwrap(),
            ImageSize::new(64, 48)
        );

        let mut session = EditorSession::new(FsLabelStore, &EditorPreferences::default());
        project.open_current(&mut session).unwrap();
        assert_eq!(session.image_size(), ImageSize::new(64, 48));
        assert_eq!(session.annotations().len(), 1);
        assert_eq!(
            session.annotations()[0].bounding_rect(),
            crate::model::Rect::new(16.0, 12.0, 48.0, 36.0)
        );
    }
}
