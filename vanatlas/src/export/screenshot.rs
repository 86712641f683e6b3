//! PNG screenshot export.
//!
//! Renders the current view — base tiles, boundary layers, and annotation
//! shapes — to a static PNG using OpenStreetMap tiles as the base map.
//! Marker shapes are drawn as plain filled dots; the interactive marker
//! icons do not survive rasterization.

use std::f64::consts::PI;
use std::path::Path;

use geojson::{FeatureCollection, Value as GeoValue};
use staticmap::tools::Tool;
use staticmap::{lat_to_y, lon_to_x, Bounds, StaticMapBuilder};
use tiny_skia::{Color, FillRule, Paint, PathBuilder, PixmapMut, Shader, Stroke, Transform};
use tracing::info;

use super::ExportError;
use crate::draw::{DrawnShape, ShapeGeometry};
use crate::geom::LatLng;

/// Map style/theme for the base layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapStyle {
    /// Standard OpenStreetMap tiles (light theme).
    #[default]
    Light,
    /// CartoDB Dark Matter tiles (dark theme).
    Dark,
}

impl MapStyle {
    /// Get the tile server URL template for this style.
    pub fn url_template(&self) -> &'static str {
        match self {
            MapStyle::Light => "https://a.tile.osm.org/{z}/{x}/{y}.png",
            MapStyle::Dark => "https://a.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}.png",
        }
    }
}

/// Configuration for screenshot rendering.
#[derive(Debug, Clone)]
pub struct ScreenshotConfig {
    /// Width of the output image in pixels.
    pub width: u32,
    /// Height of the output image in pixels.
    pub height: u32,
    /// Padding around the content in pixels (horizontal, vertical).
    pub padding: (u32, u32),
    /// Boundary outline color (RGBA).
    pub boundary_color: (u8, u8, u8, u8),
    /// Shape outline color (RGBA).
    pub shape_color: (u8, u8, u8, u8),
    /// Shape fill color (RGBA).
    pub shape_fill: (u8, u8, u8, u8),
    /// Marker dot color (RGBA).
    pub marker_color: (u8, u8, u8, u8),
    /// Marker dot radius in pixels.
    pub marker_radius: f32,
    /// Line width in pixels.
    pub line_width: f32,
    /// Map style (light or dark theme).
    pub style: MapStyle,
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            padding: (20, 20),
            boundary_color: (51, 136, 255, 255),
            shape_color: (255, 107, 107, 255),
            shape_fill: (255, 107, 107, 70),
            marker_color: (51, 136, 255, 255),
            marker_radius: 6.0,
            line_width: 2.0,
            style: MapStyle::default(),
        }
    }
}

/// A polyline/polygon overlay tool for staticmap.
struct OutlineTool {
    points: Vec<LatLng>,
    closed: bool,
    stroke_paint: Paint<'static>,
    fill_paint: Option<Paint<'static>>,
    line_width: f32,
}

impl OutlineTool {
    fn new(
        points: Vec<LatLng>,
        closed: bool,
        stroke_rgba: (u8, u8, u8, u8),
        fill_rgba: Option<(u8, u8, u8, u8)>,
        line_width: f32,
    ) -> Self {
        let stroke_color =
            Color::from_rgba8(stroke_rgba.0, stroke_rgba.1, stroke_rgba.2, stroke_rgba.3);
        Self {
            points,
            closed,
            stroke_paint: Paint {
                shader: Shader::SolidColor(stroke_color),
                anti_alias: true,
                ..Default::default()
            },
            fill_paint: fill_rgba.map(|(r, g, b, a)| Paint {
                shader: Shader::SolidColor(Color::from_rgba8(r, g, b, a)),
                anti_alias: true,
                ..Default::default()
            }),
            line_width,
        }
    }
}

impl Tool for OutlineTool {
    fn extent(&self, _zoom: u8, _tile_size: f64) -> (f64, f64, f64, f64) {
        extent_of(&self.points)
    }

    fn draw(&self, bounds: &Bounds, mut pixmap: PixmapMut) {
        if self.points.len() < 2 {
            return;
        }

        let mut path_builder = PathBuilder::new();
        for (i, point) in self.points.iter().enumerate() {
            let x = bounds.x_to_px(lon_to_x(point.lon, bounds.zoom)) as f32;
            let y = bounds.y_to_px(lat_to_y(point.lat, bounds.zoom)) as f32;
            if i == 0 {
                path_builder.move_to(x, y);
            } else {
                path_builder.line_to(x, y);
            }
        }
        if self.closed {
            path_builder.close();
        }

        if let Some(path) = path_builder.finish() {
            if let Some(fill) = &self.fill_paint {
                pixmap.fill_path(&path, fill, FillRule::Winding, Transform::default(), None);
            }
            pixmap.stroke_path(
                &path,
                &self.stroke_paint,
                &Stroke {
                    width: self.line_width,
                    ..Default::default()
                },
                Transform::default(),
                None,
            );
        }
    }
}

/// A filled dot tool standing in for marker icons.
struct DotTool {
    position: LatLng,
    radius: f32,
    fill_paint: Paint<'static>,
}

impl DotTool {
    fn new(position: LatLng, radius: f32, rgba: (u8, u8, u8, u8)) -> Self {
        Self {
            position,
            radius,
            fill_paint: Paint {
                shader: Shader::SolidColor(Color::from_rgba8(rgba.0, rgba.1, rgba.2, rgba.3)),
                anti_alias: true,
                ..Default::default()
            },
        }
    }
}

impl Tool for DotTool {
    fn extent(&self, _zoom: u8, _tile_size: f64) -> (f64, f64, f64, f64) {
        (
            self.position.lon,
            self.position.lat,
            self.position.lon,
            self.position.lat,
        )
    }

    fn draw(&self, bounds: &Bounds, mut pixmap: PixmapMut) {
        let x = bounds.x_to_px(lon_to_x(self.position.lon, bounds.zoom)) as f32;
        let y = bounds.y_to_px(lat_to_y(self.position.lat, bounds.zoom)) as f32;

        let mut path_builder = PathBuilder::new();
        path_builder.push_circle(x, y, self.radius);
        if let Some(path) = path_builder.finish() {
            pixmap.fill_path(
                &path,
                &self.fill_paint,
                FillRule::Winding,
                Transform::default(),
                None,
            );
        }
    }
}

fn extent_of(points: &[LatLng]) -> (f64, f64, f64, f64) {
    let mut lon_min = f64::MAX;
    let mut lat_min = f64::MAX;
    let mut lon_max = f64::MIN;
    let mut lat_max = f64::MIN;
    for p in points {
        lon_min = lon_min.min(p.lon);
        lat_min = lat_min.min(p.lat);
        lon_max = lon_max.max(p.lon);
        lat_max = lat_max.max(p.lat);
    }
    (lon_min, lat_min, lon_max, lat_max)
}

/// Approximate a geographic circle as a polygon ring.
fn circle_ring(center: LatLng, radius_m: f64, segments: usize) -> Vec<LatLng> {
    // Meters per degree of latitude; longitude shrinks with cos(lat).
    const METERS_PER_DEGREE: f64 = 111_320.0;
    let dlat = radius_m / METERS_PER_DEGREE;
    let dlon = radius_m / (METERS_PER_DEGREE * center.lat.to_radians().cos().max(1e-9));

    (0..segments)
        .map(|i| {
            let theta = 2.0 * PI * (i as f64) / (segments as f64);
            LatLng::new(
                center.lat + dlat * theta.sin(),
                center.lon + dlon * theta.cos(),
            )
        })
        .collect()
}

/// Extract drawable outlines from a boundary feature geometry.
fn boundary_outlines(value: &GeoValue) -> Vec<(Vec<LatLng>, bool)> {
    fn ring_points(ring: &[Vec<f64>]) -> Vec<LatLng> {
        ring.iter().filter_map(|p| LatLng::from_position(p)).collect()
    }

    match value {
        GeoValue::LineString(positions) => vec![(ring_points(positions), false)],
        GeoValue::Polygon(rings) => rings
            .first()
            .map(|outer| vec![(ring_points(outer), true)])
            .unwrap_or_default(),
        GeoValue::MultiPolygon(polygons) => polygons
            .iter()
            .filter_map(|rings| rings.first())
            .map(|outer| (ring_points(outer), true))
            .collect(),
        _ => Vec::new(),
    }
}

/// Render boundary layers and shapes over base tiles and save as PNG.
///
/// # Arguments
///
/// * `boundaries` - Boundary FeatureCollections to outline
/// * `shapes` - Annotation shapes to draw
/// * `config` - Size, colors and base style
/// * `output_path` - Destination PNG path
pub fn render_screenshot(
    boundaries: &[&FeatureCollection],
    shapes: &[&DrawnShape],
    config: &ScreenshotConfig,
    output_path: &Path,
) -> Result<(), ExportError> {
    let mut map = StaticMapBuilder::default()
        .width(config.width)
        .height(config.height)
        .padding(config.padding)
        .url_template(config.style.url_template())
        .build()
        .map_err(|e| ExportError::Render(format!("Failed to create map: {}", e)))?;

    let mut drawn_anything = false;

    for collection in boundaries {
        for feature in &collection.features {
            let Some(geometry) = &feature.geometry else {
                continue;
            };
            for (points, closed) in boundary_outlines(&geometry.value) {
                if points.len() < 2 {
                    continue;
                }
                map.add_tool(OutlineTool::new(
                    points,
                    closed,
                    config.boundary_color,
                    None,
                    config.line_width,
                ));
                drawn_anything = true;
            }
        }
    }

    for shape in shapes {
        match &shape.geometry {
            ShapeGeometry::Polyline(points) => {
                map.add_tool(OutlineTool::new(
                    points.clone(),
                    false,
                    config.shape_color,
                    None,
                    config.line_width,
                ));
            }
            ShapeGeometry::Polygon(points) => {
                map.add_tool(OutlineTool::new(
                    points.clone(),
                    true,
                    config.shape_color,
                    Some(config.shape_fill),
                    config.line_width,
                ));
            }
            ShapeGeometry::Rectangle {
                south_west,
                north_east,
            } => {
                map.add_tool(OutlineTool::new(
                    ShapeGeometry::rectangle_ring(*south_west, *north_east),
                    true,
                    config.shape_color,
                    Some(config.shape_fill),
                    config.line_width,
                ));
            }
            ShapeGeometry::Circle { center, radius_m } => {
                map.add_tool(OutlineTool::new(
                    circle_ring(*center, *radius_m, 64),
                    true,
                    config.shape_color,
                    Some(config.shape_fill),
                    config.line_width,
                ));
            }
            ShapeGeometry::Marker(position) => {
                map.add_tool(DotTool::new(
                    *position,
                    config.marker_radius,
                    config.marker_color,
                ));
            }
        }
        drawn_anything = true;
    }

    if !drawn_anything {
        return Err(ExportError::NothingToExport(
            "No boundaries or shapes in view".to_string(),
        ));
    }

    map.save_png(output_path)
        .map_err(|e| ExportError::Render(format!("Failed to save PNG: {}", e)))?;

    info!(path = %output_path.display(), "Screenshot saved");
    Ok(())
}
