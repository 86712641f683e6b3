//! The interactive drawing session.
//!
//! A session is a small state machine: `Idle → Drawing(kind) → Idle`. At
//! most one drawing is active at a time; starting a new one cancels the
//! previous. While drawing, [`DrawingSession::preview`] produces the dashed
//! preview geometry and running measurement label for the current cursor
//! position.

use thiserror::Error;
use tracing::debug;

use super::types::{DrawnShape, ShapeGeometry, ShapeKind};
use crate::geom::{self, LatLng};

/// Errors from drawing-session operations.
#[derive(Debug, Error, PartialEq)]
pub enum DrawError {
    /// An operation requiring an active drawing arrived while idle.
    #[error("No drawing in progress")]
    NotDrawing,

    /// Completion was requested before enough vertices were placed.
    #[error("A {kind} needs at least {needed} points, got {got}")]
    TooFewVertices {
        kind: ShapeKind,
        needed: usize,
        got: usize,
    },

    /// A circle was completed without a radius.
    #[error("Circle has no radius")]
    MissingRadius,
}

/// Live preview of an in-progress drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewFrame {
    /// Vertices of the dashed preview overlay, cursor included.
    pub outline: Vec<LatLng>,
    /// Whether the outline should be closed into a polygon.
    pub closed: bool,
    /// Measurement label to float next to the cursor.
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
enum SessionState {
    Idle,
    Drawing {
        kind: ShapeKind,
        vertices: Vec<LatLng>,
        radius_m: Option<f64>,
    },
}

/// Per-session drawing manager.
#[derive(Debug, Default)]
pub struct DrawingSession {
    state: SessionState,
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Idle
    }
}

impl DrawingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin drawing a shape of the given kind.
    ///
    /// Any in-progress drawing is cancelled first.
    pub fn start(&mut self, kind: ShapeKind) {
        if let SessionState::Drawing { kind: previous, .. } = &self.state {
            debug!(previous = %previous, next = %kind, "Cancelling in-progress drawing");
        }
        self.state = SessionState::Drawing {
            kind,
            vertices: Vec::new(),
            radius_m: None,
        };
    }

    /// Whether a drawing is active.
    pub fn is_drawing(&self) -> bool {
        matches!(self.state, SessionState::Drawing { .. })
    }

    /// The kind currently being drawn.
    pub fn current_kind(&self) -> Option<ShapeKind> {
        match &self.state {
            SessionState::Drawing { kind, .. } => Some(*kind),
            SessionState::Idle => None,
        }
    }

    /// Vertices placed so far.
    pub fn vertices(&self) -> &[LatLng] {
        match &self.state {
            SessionState::Drawing { vertices, .. } => vertices,
            SessionState::Idle => &[],
        }
    }

    /// Place a vertex at the cursor.
    ///
    /// Rectangles take two opposite corners; circles take their center;
    /// markers take a single position. Extra vertices for those kinds are
    /// ignored.
    pub fn add_vertex(&mut self, point: LatLng) -> Result<(), DrawError> {
        match &mut self.state {
            SessionState::Idle => Err(DrawError::NotDrawing),
            SessionState::Drawing {
                kind, vertices, ..
            } => {
                let limit = match kind {
                    ShapeKind::Polyline | ShapeKind::Polygon => usize::MAX,
                    ShapeKind::Rectangle => 2,
                    ShapeKind::Circle | ShapeKind::Marker => 1,
                };
                if vertices.len() < limit {
                    vertices.push(point);
                }
                Ok(())
            }
        }
    }

    /// Set the radius of an in-progress circle, in meters.
    pub fn set_radius(&mut self, meters: f64) -> Result<(), DrawError> {
        match &mut self.state {
            SessionState::Drawing {
                kind: ShapeKind::Circle,
                radius_m,
                ..
            } => {
                *radius_m = Some(meters);
                Ok(())
            }
            SessionState::Drawing { .. } | SessionState::Idle => Err(DrawError::NotDrawing),
        }
    }

    /// Compute the live preview for the current cursor position.
    ///
    /// Polylines preview the running distance; polygons preview distance
    /// until three points exist, then area + perimeter. Other kinds have no
    /// pointer-move preview.
    pub fn preview(&self, cursor: LatLng) -> Option<PreviewFrame> {
        let SessionState::Drawing { kind, vertices, .. } = &self.state else {
            return None;
        };
        if vertices.is_empty() {
            return None;
        }

        let mut outline = vertices.clone();
        outline.push(cursor);

        match kind {
            ShapeKind::Polyline => Some(PreviewFrame {
                label: format!(
                    "Distance: {}",
                    geom::format_distance(geom::line_distance(&outline))
                ),
                closed: false,
                outline,
            }),
            ShapeKind::Polygon => {
                if outline.len() >= 3 {
                    let area = geom::polygon_area(&outline);
                    let perimeter = geom::perimeter(&outline);
                    Some(PreviewFrame {
                        label: format!(
                            "Area: {} | Perimeter: {}",
                            geom::format_area(area),
                            geom::format_distance(perimeter)
                        ),
                        closed: true,
                        outline,
                    })
                } else {
                    Some(PreviewFrame {
                        label: format!(
                            "Distance: {}",
                            geom::format_distance(geom::line_distance(&outline))
                        ),
                        closed: false,
                        outline,
                    })
                }
            }
            ShapeKind::Rectangle | ShapeKind::Circle | ShapeKind::Marker => None,
        }
    }

    /// Finish the drawing, returning the measured shape.
    ///
    /// The session returns to idle on success; on a validation error the
    /// drawing stays active so the user can keep placing vertices.
    pub fn complete(&mut self) -> Result<DrawnShape, DrawError> {
        let SessionState::Drawing {
            kind,
            vertices,
            radius_m,
        } = &self.state
        else {
            return Err(DrawError::NotDrawing);
        };

        let geometry = match kind {
            ShapeKind::Polyline => {
                if vertices.len() < 2 {
                    return Err(DrawError::TooFewVertices {
                        kind: *kind,
                        needed: 2,
                        got: vertices.len(),
                    });
                }
                ShapeGeometry::Polyline(vertices.clone())
            }
            ShapeKind::Polygon => {
                if vertices.len() < 3 {
                    return Err(DrawError::TooFewVertices {
                        kind: *kind,
                        needed: 3,
                        got: vertices.len(),
                    });
                }
                ShapeGeometry::Polygon(vertices.clone())
            }
            ShapeKind::Rectangle => {
                if vertices.len() < 2 {
                    return Err(DrawError::TooFewVertices {
                        kind: *kind,
                        needed: 2,
                        got: vertices.len(),
                    });
                }
                let (a, b) = (vertices[0], vertices[1]);
                ShapeGeometry::Rectangle {
                    south_west: LatLng::new(a.lat.min(b.lat), a.lon.min(b.lon)),
                    north_east: LatLng::new(a.lat.max(b.lat), a.lon.max(b.lon)),
                }
            }
            ShapeKind::Circle => {
                let center = *vertices.first().ok_or(DrawError::TooFewVertices {
                    kind: *kind,
                    needed: 1,
                    got: 0,
                })?;
                let radius = radius_m.ok_or(DrawError::MissingRadius)?;
                ShapeGeometry::Circle {
                    center,
                    radius_m: radius,
                }
            }
            ShapeKind::Marker => {
                let point = *vertices.first().ok_or(DrawError::TooFewVertices {
                    kind: *kind,
                    needed: 1,
                    got: 0,
                })?;
                ShapeGeometry::Marker(point)
            }
        };

        let shape = DrawnShape::drawn(geometry);
        debug!(id = %shape.id, kind = %shape.kind, "Drawing completed");
        self.state = SessionState::Idle;
        Ok(shape)
    }

    /// Discard the in-progress drawing without adding a shape.
    pub fn cancel(&mut self) {
        self.state = SessionState::Idle;
    }
}
