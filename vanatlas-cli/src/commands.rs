//! Command implementations.

use std::path::{Path, PathBuf};

use geojson::FeatureCollection;
use vanatlas::boundary::BoundaryKey;
use vanatlas::claims::ClaimsClient;
use vanatlas::draw::DrawnShape;
use vanatlas::export::{render_screenshot, shapes_to_feature_collection, MapStyle, ScreenshotConfig};
use vanatlas::geom::{self, LatLng};
use vanatlas::kml::{parse_kml, parse_kmz, write_kml};
use vanatlas::service::DefaultAtlasService;

use crate::error::CliError;

/// Download a boundary FeatureCollection and write it as pretty JSON.
pub async fn fetch(
    service: &DefaultAtlasService,
    key: BoundaryKey,
    output: &Path,
) -> Result<(), CliError> {
    let data = service.load_boundary(&key).await?;
    let rendered = serde_json::to_string_pretty(data.as_ref()).map_err(|e| {
        CliError::InvalidArgument(format!("Failed to serialize boundary data: {}", e))
    })?;
    std::fs::write(output, rendered).map_err(|error| CliError::File {
        path: output.to_path_buf(),
        error,
    })?;

    println!(
        "Wrote {} features to {}",
        data.features.len(),
        output.display()
    );
    Ok(())
}

/// Print a state's district names, one per line.
pub async fn districts(service: &DefaultAtlasService, state: &str) -> Result<(), CliError> {
    let names = service.district_names(state).await?;
    for name in &names {
        println!("{}", name);
    }
    eprintln!("{} districts in {}", names.len(), state);
    Ok(())
}

/// Print one district's subdistrict names.
pub async fn subdistricts(
    service: &DefaultAtlasService,
    state: &str,
    district: &str,
) -> Result<(), CliError> {
    let names = service.subdistrict_names(state, district).await?;
    for name in &names {
        println!("{}", name);
    }
    eprintln!("{} subdistricts in {}, {}", names.len(), district, state);
    Ok(())
}

/// Parse `lat,lon` command-line points.
pub fn parse_points(raw: &[String]) -> Result<Vec<LatLng>, CliError> {
    raw.iter()
        .map(|pair| {
            let mut parts = pair.split(',');
            let lat = parts
                .next()
                .and_then(|p| p.trim().parse::<f64>().ok());
            let lon = parts
                .next()
                .and_then(|p| p.trim().parse::<f64>().ok());
            match (lat, lon) {
                (Some(lat), Some(lon)) => Ok(LatLng::new(lat, lon)),
                _ => Err(CliError::InvalidArgument(format!(
                    "Invalid point '{}': expected lat,lon",
                    pair
                ))),
            }
        })
        .collect()
}

/// Measure a coordinate sequence as a line.
pub fn measure_line(points: &[LatLng]) -> Result<(), CliError> {
    if points.len() < 2 {
        return Err(CliError::InvalidArgument(
            "A line needs at least 2 points".to_string(),
        ));
    }
    let distance = geom::line_distance(points);
    println!("Distance: {}", geom::format_distance(distance));
    Ok(())
}

/// Measure a coordinate sequence as a polygon ring.
pub fn measure_polygon(points: &[LatLng]) -> Result<(), CliError> {
    if points.len() < 3 {
        return Err(CliError::InvalidArgument(
            "A polygon needs at least 3 points".to_string(),
        ));
    }
    let area = geom::polygon_area(points);
    let perimeter = geom::perimeter(points);
    println!("Area: {}", geom::format_area(area));
    println!("Perimeter: {}", geom::format_distance(perimeter));
    Ok(())
}

/// Convert between KML/KMZ and GeoJSON, by file extension.
pub fn convert(input: &Path, output: &Path) -> Result<(), CliError> {
    let input_ext = extension_of(input);
    let output_ext = extension_of(output);

    match (input_ext.as_str(), output_ext.as_str()) {
        ("kml" | "kmz", "geojson" | "json") => {
            let import = if input_ext == "kmz" {
                let bytes = std::fs::read(input).map_err(|error| CliError::File {
                    path: input.to_path_buf(),
                    error,
                })?;
                parse_kmz(&bytes)
            } else {
                let content = std::fs::read_to_string(input).map_err(|error| CliError::File {
                    path: input.to_path_buf(),
                    error,
                })?;
                parse_kml(&content)
            }
            .map_err(vanatlas::service::ServiceError::from)?;

            let file_name = input
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let shapes: Vec<DrawnShape> = import
                .features
                .into_iter()
                .map(|f| f.into_shape(&file_name))
                .collect();
            let fc = shapes_to_feature_collection(shapes.iter());
            let rendered = serde_json::to_string_pretty(&fc).map_err(|e| {
                CliError::InvalidArgument(format!("Failed to serialize GeoJSON: {}", e))
            })?;
            std::fs::write(output, rendered).map_err(|error| CliError::File {
                path: output.to_path_buf(),
                error,
            })?;
            println!(
                "Converted {} features ({} placemarks skipped)",
                shapes.len(),
                import.skipped
            );
            Ok(())
        }

        ("geojson" | "json", "kml") => {
            let content = std::fs::read_to_string(input).map_err(|error| CliError::File {
                path: input.to_path_buf(),
                error,
            })?;
            let fc: FeatureCollection = content.parse().map_err(|e: geojson::Error| {
                CliError::InvalidArgument(format!("Invalid GeoJSON: {}", e))
            })?;
            let title = output
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "Exported Data".to_string());
            let kml =
                write_kml(&fc, &title).map_err(vanatlas::service::ServiceError::from)?;
            std::fs::write(output, kml).map_err(|error| CliError::File {
                path: output.to_path_buf(),
                error,
            })?;
            println!("Converted {} features to KML", fc.features.len());
            Ok(())
        }

        _ => Err(CliError::InvalidArgument(format!(
            "Unsupported conversion: {} -> {}",
            input.display(),
            output.display()
        ))),
    }
}

/// Render a state's district boundaries to a PNG.
pub async fn screenshot(
    service: &DefaultAtlasService,
    state: &str,
    output: &Path,
    width: u32,
    height: u32,
    dark: bool,
) -> Result<(), CliError> {
    let data = service
        .load_boundary(&BoundaryKey::districts(state))
        .await?;

    let config = ScreenshotConfig {
        width,
        height,
        style: if dark { MapStyle::Dark } else { MapStyle::Light },
        ..ScreenshotConfig::default()
    };

    let shapes: Vec<&DrawnShape> = Vec::new();
    render_screenshot(&[data.as_ref()], &shapes, &config, output)
        .map_err(vanatlas::service::ServiceError::from)?;

    println!("Saved screenshot to {}", output.display());
    Ok(())
}

/// List claims from the claims API.
pub async fn claims_list(client: &ClaimsClient) -> Result<(), CliError> {
    let claims = client.list_claims().await?;
    for claim in &claims {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            claim.id.map(|id| id.to_string()).unwrap_or_default(),
            claim.claimant_name,
            claim.village_name.as_deref().unwrap_or("-"),
            claim.district,
            claim.status.as_deref().unwrap_or("Pending"),
        );
    }
    eprintln!("{} claims", claims.len());
    Ok(())
}

/// Search claims by free text.
pub async fn claims_search(client: &ClaimsClient, query: &str) -> Result<(), CliError> {
    let claims = client.search_claims(query).await?;
    for claim in &claims {
        println!(
            "{}\t{}\t{}",
            claim.id.map(|id| id.to_string()).unwrap_or_default(),
            claim.claimant_name,
            claim.district,
        );
    }
    eprintln!("{} matches for '{}'", claims.len(), query);
    Ok(())
}

/// Probe the claims API health endpoint.
pub async fn claims_health(client: &ClaimsClient) -> Result<(), CliError> {
    let health = client.health().await?;
    println!(
        "{}{}",
        health.status,
        health
            .version
            .map(|v| format!(" (version {})", v))
            .unwrap_or_default()
    );
    Ok(())
}

/// Build the boundary key for a fetch request.
pub fn fetch_key(level: &str, state: Option<&str>) -> Result<BoundaryKey, CliError> {
    match (level, state) {
        ("states", _) => Ok(BoundaryKey::States),
        ("districts", Some(s)) => Ok(BoundaryKey::districts(s)),
        ("subdistricts", Some(s)) => Ok(BoundaryKey::subdistricts(s)),
        ("villages", Some(s)) => Ok(BoundaryKey::villages(s)),
        ("cfr-potential", Some(s)) => Ok(BoundaryKey::cfr_potential(s)),
        (level, None) => Err(CliError::InvalidArgument(format!(
            "--state is required for level '{}'",
            level
        ))),
        (level, _) => Err(CliError::InvalidArgument(format!(
            "Unknown level '{}'",
            level
        ))),
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}
