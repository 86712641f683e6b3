//! vanatlas - Map navigation and annotation engine for a Forest Rights Act
//! claims atlas.
//!
//! This library implements the engine behind a map-centric claims viewer:
//! administrative boundary drilldown (country → state → district →
//! subdistrict → village) with cached single-flight fetches, freehand shape
//! drawing with geodesic measurement, KML/KMZ import/export, boundary
//! GeoJSON export, and PNG screenshot rendering.
//!
//! # High-Level API
//!
//! For most use cases, the [`service`] module provides a simplified facade:
//!
//! ```ignore
//! use vanatlas::config::AtlasConfig;
//! use vanatlas::region::AdminLevel;
//! use vanatlas::service::DefaultAtlasService;
//!
//! let service = DefaultAtlasService::new(AtlasConfig::default())?;
//!
//! // Enable boundaries (loads the states layer), then drill down.
//! service.set_boundaries_enabled(true).await?;
//! service.select_region(AdminLevel::State, "Odisha").await?;
//! ```

pub mod boundary;
pub mod claims;
pub mod config;
pub mod draw;
pub mod export;
pub mod geom;
pub mod kml;
pub mod logging;
pub mod nav;
pub mod region;
pub mod service;

/// Version of the vanatlas library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
