//! Editing session for the currently open image.
//!
//! [`EditorSession`] owns everything that changes while an image is being
//! annotated: the annotation set, the selection, the undo history, the
//! pointer interaction state and the viewport. The host forwards pointer and
//! key input to it and drains [`EditorEvent`]s afterwards.
//!
//! Every committed change is written through to the [`LabelStore`]
//! immediately.

mod event;
mod interaction;


use std::path::{Path, PathBuf};

pub use event::{DrawMode, EditorEvent, EditorKey, Nudge, PointerButton, Side};
pub use interaction::Interaction;

use crate::config::EditorPreferences;
use crate::constants::MIN_FINE_RESIZE_EXTENT;
use crate::format::{FsLabelStore, LabelStore, PersistError, encode_set, label_path_for};
use crate::hit_test::{self, HitTarget, HitTestParams};
use crate::model::{Annotation, ClassList, Geometry, HandleRef, ImageSize, Point};
use crate::undo::History;
use crate::viewport::Viewport;

/// Asks the user for the class of a freshly drawn shape. `None` cancels the shape.
pub type ClassPrompt = Box<dyn FnMut() -> Option<u32>>;

// ============================================================================
// Session
// ============================================================================

/// Editing state of one open image.
pub struct EditorSession<S: LabelStore = FsLabelStore> {
    store: S,
    label_path: Option<PathBuf>,
    image_size: ImageSize,
    annotations: Vec<Annotation>,
    selected: Option<usize>,
    history: History<Vec<Annotation>>,
    interaction: Interaction,
    draw_mode: Option<DrawMode>,
    viewport: Viewport,
    hit_params: HitTestParams,
    auto_disable_draw_mode: bool,
    min_draw_extent: f64,
    /// False after a label file failed to decode, so it is not overwritten
    safe_to_save: bool,
    classes: ClassList,
    active_class: u32,
    class_prompt: Option<ClassPrompt>,
    events: Vec<EditorEvent>,
}

impl<S: LabelStore> EditorSession<S> {
    /// Create a session with no image open.
    pub fn new(store: S, preferences: &EditorPreferences) -> Self {
        Self {
            store,
            label_path: None,
            image_size: ImageSize::default(),
            annotations: Vec::new(),
            selected: None,
            history: History::new(preferences.undo_limit),
            interaction: Interaction::Idle,
            draw_mode: None,
            viewport: Viewport::new(
                preferences.fit_margin,
                preferences.zoom_step,
                preferences.zoom_anchor,
            ),
            hit_params: preferences.hit_test_params(),
            auto_disable_draw_mode: preferences.auto_disable_draw_mode,
            min_draw_extent: preferences.min_draw_extent,
            safe_to_save: true,
            classes: ClassList::default(),
            active_class: 0,
            class_prompt: None,
            events: Vec::new(),
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_annotation(&self) -> Option<&Annotation> {
        self.selected.and_then(|i| self.annotations.get(i))
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn draw_mode(&self) -> Option<DrawMode> {
        self.draw_mode
    }

    pub fn image_size(&self) -> ImageSize {
        self.image_size
    }

    pub fn label_path(&self) -> Option<&Path> {
        self.label_path.as_deref()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Whether edits are currently written to the label file.
    pub fn is_safe_to_save(&self) -> bool {
        self.safe_to_save
    }

    pub fn classes(&self) -> &ClassList {
        &self.classes
    }

    /// Display label (`"<id>: <name>"` or `"ID?"`) of an annotation.
    pub fn class_label(&self, index: usize) -> Option<String> {
        self.annotations
            .get(index)
            .map(|ann| self.classes.display_label(ann.class_id()))
    }

    /// Drain the events emitted since the last call.
    pub fn take_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------------
    // Setup
    // ------------------------------------------------------------------------

    pub fn set_class_list(&mut self, classes: ClassList) {
        self.classes = classes;
    }

    /// Class given to new shapes when no prompt is installed.
    pub fn set_active_class(&mut self, class_id: u32) {
        self.active_class = class_id;
    }

    pub fn active_class(&self) -> u32 {
        self.active_class
    }

    /// Install a callback asked for the class of every new shape.
    pub fn set_class_prompt<F>(&mut self, prompt: F)
    where
        F: FnMut() -> Option<u32> + 'static,
    {
        self.class_prompt = Some(Box::new(prompt));
    }

    pub fn clear_class_prompt(&mut self) {
        self.class_prompt = None;
    }

    /// Record the size of the drawing surface and refit the image.
    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.viewport.set_viewport_size(width, height);
    }

    // ------------------------------------------------------------------------
    // Image lifecycle
    // ------------------------------------------------------------------------

    /// Open an image, loading its labels from the resolved label path.
    pub fn open_image(&mut self, image_path: &Path, image_size: ImageSize) {
        self.open_labels(label_path_for(image_path), image_size);
    }

    /// Open the annotation set stored at `label_path` for an image of `image_size`.
    ///
    /// Any transient interaction, the selection and the undo history of the
    /// previous image are discarded. A label file that fails to decode opens
    /// as an empty set with saving blocked until
    /// [`EditorSession::discard_corrupted_labels`] is called.
    pub fn open_labels(&mut self, label_path: PathBuf, image_size: ImageSize) {
        self.interaction = Interaction::Idle;
        self.selected = None;
        self.history.clear();
        self.image_size = image_size;
        self.viewport.set_image_size(image_size);

        match self.store.load(&label_path, image_size) {
            Ok(annotations) => {
                self.safe_to_save = true;
                self.annotations = annotations;
                self.warn_unknown_classes(&label_path);
                log::debug!(
                    "Opened {:?} with {} annotations",
                    label_path,
                    self.annotations.len()
                );
            }
            Err(e) => {
                log::warn!("⚠️ Could not load labels {:?}: {}", label_path, e);
                self.safe_to_save = false;
                self.annotations = Vec::new();
                self.events.push(EditorEvent::LoadFailed {
                    path: label_path.clone(),
                    message: e.to_string(),
                });
            }
        }
        self.label_path = Some(label_path);
    }

    /// Delete a label file that failed to decode and resume saving.
    pub fn discard_corrupted_labels(&mut self) -> Result<(), PersistError> {
        if self.safe_to_save {
            return Ok(());
        }
        if let Some(path) = &self.label_path {
            self.store.remove(path)?;
            log::info!("🗑️ Discarded corrupted label file {:?}", path);
        }
        self.safe_to_save = true;
        Ok(())
    }

    fn warn_unknown_classes(&self, label_path: &Path) {
        if self.classes.is_empty() {
            return;
        }
        for ann in &self.annotations {
            if !self.classes.contains(ann.class_id()) {
                log::warn!(
                    "Class id {} in {:?} is not in the class list",
                    ann.class_id(),
                    label_path
                );
            }
        }
    }

    // ------------------------------------------------------------------------
    // Selection & history
    // ------------------------------------------------------------------------

    /// Select an annotation. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) {
        if index >= self.annotations.len() {
            log::debug!("Ignoring selection of out-of-range index {}", index);
            return;
        }
        if self.selected != Some(index) {
            self.selected = Some(index);
            log::debug!("Selected annotation {}", index);
            self.events.push(EditorEvent::ShapeSelected { index });
        }
    }

    pub fn deselect(&mut self) {
        if self.selected.take().is_some() {
            log::debug!("Deselected annotation");
            self.events.push(EditorEvent::ShapeDeselected);
        }
    }

    /// Snapshot the annotation set before a mutation.
    fn push_history(&mut self) {
        self.history.push(self.annotations.clone());
    }

    /// Restore the most recent snapshot. Returns false if there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.pop() else {
            log::debug!("Nothing to undo");
            return false;
        };
        self.interaction = Interaction::Idle;
        self.annotations = snapshot;
        if self.selected.is_some_and(|i| i >= self.annotations.len()) {
            self.deselect();
        }
        log::info!("↩️ Undo ({} steps left)", self.history.len());
        self.persist();
        self.events.push(EditorEvent::HistoryRestored);
        true
    }

    // ------------------------------------------------------------------------
    // Draw mode
    // ------------------------------------------------------------------------

    /// Enter or leave draw mode. Clears the selection and any drawing in progress.
    pub fn set_draw_mode(&mut self, mode: Option<DrawMode>) {
        if mode.is_some() && self.label_path.is_none() {
            log::debug!("No image open, draw mode stays off");
            return;
        }
        if self.interaction.is_drawing() {
            self.interaction = Interaction::Idle;
        }
        self.deselect();
        if self.draw_mode != mode {
            self.draw_mode = mode;
            log::debug!("Draw mode: {}", mode.map_or("off", |m| m.name()));
            self.events.push(EditorEvent::ModeToggled { mode });
        }
    }

    /// Turn `mode` on, or off if it is already active.
    pub fn toggle_draw_mode(&mut self, mode: DrawMode) {
        if self.draw_mode == Some(mode) {
            self.set_draw_mode(None);
        } else {
            self.set_draw_mode(Some(mode));
        }
    }

    // ------------------------------------------------------------------------
    // Pointer input
    // ------------------------------------------------------------------------

    /// What lies under a view-space point.
    pub fn hit_test(&self, view: Point) -> HitTarget {
        hit_test::resolve(
            view,
            &self.annotations,
            self.selected,
            &self.viewport,
            &self.hit_params,
        )
    }

    /// Pointer pressed at a view-space position.
    pub fn press(&mut self, view: Point, button: PointerButton) {
        if button == PointerButton::Secondary {
            self.right_click();
            return;
        }
        let world = self.viewport.view_to_world(view);
        log::trace!("Press at view {:?} / world {:?}", view, world);

        match self.draw_mode {
            Some(DrawMode::Box) => {
                if self.interaction.is_idle() {
                    self.interaction = Interaction::DrawingBox {
                        anchor: world,
                        current: world,
                    };
                }
            }
            Some(DrawMode::Polygon) => {
                if let Interaction::DrawingPolygon { vertices } = &mut self.interaction {
                    vertices.push(world);
                } else if self.interaction.is_idle() {
                    self.interaction = Interaction::DrawingPolygon {
                        vertices: vec![world],
                    };
                }
            }
            None => {
                if self.interaction.is_idle() {
                    self.press_select(view, world);
                }
            }
        }
    }

    fn press_select(&mut self, view: Point, world: Point) {
        match self.hit_test(view) {
            HitTarget::Handle { index, handle } => {
                self.push_history();
                self.select(index);
                let original = self.annotations[index].geometry().clone();
                log::debug!("Resizing annotation {} via {:?}", index, handle);
                self.interaction = Interaction::Resizing {
                    index,
                    original,
                    handle,
                    anchor: world,
                };
            }
            HitTarget::Shape { index } => {
                self.push_history();
                self.select(index);
                let original = self.annotations[index].geometry().clone();
                log::debug!("Moving annotation {}", index);
                self.interaction = Interaction::Moving {
                    index,
                    original,
                    anchor: world,
                };
            }
            HitTarget::None => self.deselect(),
        }
    }

    /// Pointer moved with the button held.
    pub fn drag(&mut self, view: Point) {
        let world = self.viewport.view_to_world(view);
        match &mut self.interaction {
            Interaction::DrawingBox { current, .. } => {
                *current = world;
            }
            Interaction::Moving {
                index,
                original,
                anchor,
            } => {
                let (dx, dy) = (world.x - anchor.x, world.y - anchor.y);
                if let Some(ann) = self.annotations.get_mut(*index) {
                    ann.set_geometry(original.translated(dx, dy));
                }
            }
            Interaction::Resizing {
                index,
                original,
                handle,
                anchor,
            } => {
                let (dx, dy) = (world.x - anchor.x, world.y - anchor.y);
                if let Some(ann) = self.annotations.get_mut(*index) {
                    apply_handle_drag(ann, original, *handle, dx, dy);
                }
            }
            Interaction::Idle | Interaction::DrawingPolygon { .. } => {}
        }
        log::trace!("Drag to world {:?} ({})", world, self.interaction.name());
    }

    /// Pointer released. Commits a drawn box or a move/resize.
    pub fn release(&mut self, view: Point) {
        self.drag(view);
        match std::mem::take(&mut self.interaction) {
            state @ Interaction::DrawingBox { .. } => {
                match state.to_shape(self.min_draw_extent) {
                    Some(geometry) => self.commit_new_shape(geometry),
                    None => log::debug!("Box below minimum size, discarded"),
                }
                if self.auto_disable_draw_mode {
                    self.set_draw_mode(None);
                }
            }
            Interaction::Moving { index, .. } | Interaction::Resizing { index, .. } => {
                self.commit_edit(index);
            }
            // Polygon vertices are added on press; keep collecting
            state @ Interaction::DrawingPolygon { .. } => self.interaction = state,
            Interaction::Idle => {}
        }
    }

    /// Secondary click: closes the polygon being drawn.
    ///
    /// Three or more vertices commit a polygon; fewer discard the buffer.
    pub fn right_click(&mut self) {
        if !matches!(self.interaction, Interaction::DrawingPolygon { .. }) {
            return;
        }
        let state = std::mem::take(&mut self.interaction);
        match state.to_shape(self.min_draw_extent) {
            Some(geometry) => {
                self.commit_new_shape(geometry);
                if self.auto_disable_draw_mode {
                    self.set_draw_mode(None);
                }
            }
            None => log::debug!("Polygon with fewer than 3 vertices discarded"),
        }
    }

    /// Abandon whatever the pointer is doing without committing.
    ///
    /// A move or resize in progress is rolled back to its press-time geometry.
    pub fn cancel(&mut self) {
        match std::mem::take(&mut self.interaction) {
            Interaction::Moving {
                index, original, ..
            }
            | Interaction::Resizing {
                index, original, ..
            } => {
                if let Some(ann) = self.annotations.get_mut(index) {
                    ann.set_geometry(original);
                    ann.refresh_encoding(self.image_size);
                }
                log::debug!("Cancelled edit of annotation {}", index);
            }
            Interaction::DrawingBox { .. } | Interaction::DrawingPolygon { .. } => {
                log::debug!("Cancelled drawing");
            }
            Interaction::Idle => {}
        }
    }

    // ------------------------------------------------------------------------
    // Keyboard edits
    // ------------------------------------------------------------------------

    /// Route a key. Returns false if the key was not consumed.
    pub fn handle_key(&mut self, key: EditorKey) -> bool {
        match key {
            EditorKey::Escape => {
                self.cancel();
                true
            }
            EditorKey::Delete => self.delete_selected(),
            EditorKey::Undo => {
                self.undo();
                true
            }
            EditorKey::Arrow(nudge) => self.nudge_selected(nudge),
            EditorKey::ToggleBoxMode => {
                self.toggle_draw_mode(DrawMode::Box);
                true
            }
            EditorKey::TogglePolygonMode => {
                self.toggle_draw_mode(DrawMode::Polygon);
                true
            }
        }
    }

    /// Move the selected annotation by one world pixel.
    pub fn nudge_selected(&mut self, nudge: Nudge) -> bool {
        let Some(index) = self.editable_selection() else {
            return false;
        };
        let (dx, dy) = nudge.delta();
        self.push_history();
        self.annotations[index].translate(dx, dy);
        self.commit_edit(index);
        true
    }

    /// Grow or shrink the right or bottom edge of the selected box.
    ///
    /// The edge must stay more than one pixel beyond the opposite edge.
    /// Polygons are left alone.
    pub fn resize_selected_side(&mut self, side: Side, amount: f64) -> bool {
        let Some(index) = self.editable_selection() else {
            return false;
        };
        let Geometry::Box(rect) = self.annotations[index].geometry() else {
            return false;
        };
        let (near, far) = match side {
            Side::Right => (rect.x1, rect.x2),
            Side::Bottom => (rect.y1, rect.y2),
        };
        let new_far = far + amount;
        if new_far <= near + MIN_FINE_RESIZE_EXTENT {
            log::debug!("Fine resize would collapse the box, ignored");
            return false;
        }
        self.push_history();
        self.annotations[index].set_far_edge(side == Side::Right, new_far);
        self.commit_edit(index);
        true
    }

    /// Remove the selected annotation.
    pub fn delete_selected(&mut self) -> bool {
        let Some(index) = self.editable_selection() else {
            return false;
        };
        self.push_history();
        self.annotations.remove(index);
        self.deselect();
        log::info!("🗑️ Deleted annotation {}", index);
        self.events.push(EditorEvent::ShapeDeleted { index });
        self.persist();
        true
    }

    /// Change the class of the selected annotation.
    pub fn set_selected_class(&mut self, class_id: u32) -> bool {
        let Some(index) = self.editable_selection() else {
            return false;
        };
        if self.annotations[index].class_id() == class_id {
            return false;
        }
        self.push_history();
        self.annotations[index].set_class(class_id);
        self.commit_edit(index);
        true
    }

    /// Pan the view by a view-pixel delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.viewport.pan_by(dx, dy);
    }

    /// Zoom by wheel notches around `cursor` (view space).
    pub fn zoom_by_wheel(&mut self, notches: i32, cursor: Point) {
        self.viewport.zoom_by_wheel(notches, cursor);
    }

    // ------------------------------------------------------------------------
    // Commit path
    // ------------------------------------------------------------------------

    /// Selected index, if any, while no pointer interaction is running.
    fn editable_selection(&self) -> Option<usize> {
        if !self.interaction.is_idle() {
            return None;
        }
        self.selected.filter(|&i| i < self.annotations.len())
    }

    fn commit_new_shape(&mut self, geometry: Geometry) {
        let class_id = match self.class_prompt.as_mut() {
            Some(prompt) => match prompt() {
                Some(id) => id,
                None => {
                    log::debug!("Class prompt cancelled, shape discarded");
                    return;
                }
            },
            None => self.active_class,
        };

        self.push_history();
        let kind = geometry.kind();
        self.annotations
            .push(Annotation::encoded(class_id, geometry, self.image_size));
        let index = self.annotations.len() - 1;
        log::info!(
            "➕ Added {} annotation {} (class {})",
            kind.name(),
            index,
            class_id
        );
        self.events.push(EditorEvent::ShapeAdded { index });
        self.persist();
        self.select(index);
    }

    fn commit_edit(&mut self, index: usize) {
        let Some(ann) = self.annotations.get_mut(index) else {
            return;
        };
        ann.normalize();
        ann.refresh_encoding(self.image_size);
        log::info!("✏️ Committed annotation {}", index);
        self.persist();
        self.events.push(EditorEvent::ShapeCommitted { index });
    }

    /// Write the annotation set through to the label store.
    fn persist(&mut self) -> bool {
        if !self.safe_to_save {
            log::warn!("⚠️ Label file is corrupted, not saving until it is discarded");
            return false;
        }
        let Some(path) = self.label_path.clone() else {
            return false;
        };
        if self.image_size.is_degenerate() {
            log::warn!("⚠️ Image size unknown, not saving {:?}", path);
            self.events.push(EditorEvent::PersistFailed {
                path,
                message: format!(
                    "image size {}x{} cannot be used to normalize coordinates",
                    self.image_size.width, self.image_size.height
                ),
            });
            return false;
        }

        let lines = encode_set(&mut self.annotations, self.image_size);
        match self.store.save(&path, &lines) {
            Ok(()) => {
                log::trace!("Saved {} annotations to {:?}", lines.len(), path);
                true
            }
            Err(e) => {
                log::warn!("⚠️ {}", e);
                self.events.push(EditorEvent::PersistFailed {
                    path,
                    message: e.to_string(),
                });
                false
            }
        }
    }
}

/// Apply a press-to-current world delta to one handle of `original`.
fn apply_handle_drag(
    annotation: &mut Annotation,
    original: &Geometry,
    handle: HandleRef,
    dx: f64,
    dy: f64,
) {
    let Some(start) = original.handle_position(handle) else {
        return;
    };
    annotation.set_geometry(original.clone());
    match handle {
        HandleRef::Corner(corner) => {
            annotation.set_corner(corner, start.x + dx, start.y + dy);
        }
        HandleRef::Vertex(i) => {
            annotation.set_vertex(i, start.x + dx, start.y + dy);
        }
    }
}
