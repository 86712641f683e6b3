//! The session's shape collection.
//!
//! Holds every completed shape — hand-drawn and imported alike — in
//! insertion order. Grouping by kind is a display concern and never
//! reorders the underlying collection.

use std::collections::BTreeMap;
use tracing::debug;

use super::types::{DrawnShape, ImportedFileSet, ShapeId, ShapeKind, ShapeSource};

/// Ordered collection of annotation shapes.
#[derive(Debug, Default)]
pub struct ShapeCollection {
    shapes: Vec<DrawnShape>,
    imports: Vec<ImportedFileSet>,
}

impl ShapeCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completed shape.
    pub fn add(&mut self, shape: DrawnShape) -> ShapeId {
        let id = shape.id;
        debug!(id = %id, kind = %shape.kind, "Shape added");
        self.shapes.push(shape);
        id
    }

    /// Append the shapes of one file import and record the file set.
    pub fn add_imported(&mut self, file_name: &str, shapes: Vec<DrawnShape>) -> ImportedFileSet {
        let set = ImportedFileSet {
            file_name: file_name.to_string(),
            shape_ids: shapes.iter().map(|s| s.id).collect(),
            imported_at: chrono::Utc::now(),
        };
        self.shapes.extend(shapes);
        self.imports.push(set.clone());
        set
    }

    /// Remove one shape.
    pub fn remove(&mut self, id: ShapeId) -> Option<DrawnShape> {
        let index = self.shapes.iter().position(|s| s.id == id)?;
        let shape = self.shapes.remove(index);
        for set in &mut self.imports {
            set.shape_ids.retain(|s| *s != id);
        }
        self.imports.retain(|set| !set.shape_ids.is_empty());
        debug!(id = %id, "Shape removed");
        Some(shape)
    }

    /// Remove every shape that came from one imported file.
    pub fn remove_import(&mut self, file_name: &str) -> usize {
        let Some(index) = self.imports.iter().position(|s| s.file_name == file_name) else {
            return 0;
        };
        let set = self.imports.remove(index);
        let before = self.shapes.len();
        self.shapes.retain(|s| !set.shape_ids.contains(&s.id));
        before - self.shapes.len()
    }

    /// Remove all shapes and import records.
    pub fn clear(&mut self) {
        debug!(count = self.shapes.len(), "Clearing all shapes");
        self.shapes.clear();
        self.imports.clear();
    }

    pub fn get(&self, id: ShapeId) -> Option<&DrawnShape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrawnShape> {
        self.shapes.iter()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn imports(&self) -> &[ImportedFileSet] {
        &self.imports
    }

    /// Shapes grouped by kind for display. Insertion order is preserved
    /// within each group.
    pub fn grouped_by_kind(&self) -> BTreeMap<ShapeKind, Vec<&DrawnShape>> {
        let mut groups: BTreeMap<ShapeKind, Vec<&DrawnShape>> = BTreeMap::new();
        for shape in &self.shapes {
            groups.entry(shape.kind).or_default().push(shape);
        }
        groups
    }

    /// Shapes of one kind, in insertion order.
    pub fn of_kind(&self, kind: ShapeKind) -> Vec<&DrawnShape> {
        self.shapes.iter().filter(|s| s.kind == kind).collect()
    }

    /// Imported shapes only.
    pub fn imported(&self) -> Vec<&DrawnShape> {
        self.shapes
            .iter()
            .filter(|s| s.source.is_imported())
            .collect()
    }
}
