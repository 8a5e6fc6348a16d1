//! Class name list, read from `classes.txt` at the dataset root.

use std::path::Path;

use crate::format::FormatError;

/// Label shown for class ids that have no name in the list.
pub const UNKNOWN_CLASS_LABEL: &str = "ID?";

/// Ordered class names, addressed by class id.
///
/// The editor only reads this list. Ids outside the list are tolerated
/// everywhere and render as [`UNKNOWN_CLASS_LABEL`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList {
    names: Vec<String>,
}

impl ClassList {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Parse one name per line, skipping blank lines and trimming whitespace.
    pub fn from_text(text: &str) -> Self {
        let names = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self { names }
    }

    /// Load from a file. A missing file gives an empty list.
    pub fn load(path: &Path) -> Result<Self, FormatError> {
        if !path.exists() {
            log::debug!("No class list at {:?}", path);
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let list = Self::from_text(&text);
        log::info!("Loaded {} class names from {:?}", list.len(), path);
        Ok(list)
    }

    /// Write one name per line.
    pub fn save(&self, path: &Path) -> Result<(), FormatError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.names.join("\n"))?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, class_id: u32) -> bool {
        (class_id as usize) < self.names.len()
    }

    pub fn name(&self, class_id: u32) -> Option<&str> {
        self.names.get(class_id as usize).map(String::as_str)
    }

    /// Index of a class name, if present.
    pub fn id_of(&self, name: &str) -> Option<u32> {
        self.names
            .iter()
            .position(|n| n == name)
            .and_then(|i| u32::try_from(i).ok())
    }

    /// `"<id>: <name>"` for known ids, [`UNKNOWN_CLASS_LABEL`] otherwise.
    pub fn display_label(&self, class_id: u32) -> String {
        match self.name(class_id) {
            Some(name) => format!("{}: {}", class_id, name),
            None => UNKNOWN_CLASS_LABEL.to_string(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
