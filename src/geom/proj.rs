use geo::{Coord, MapCoords, MultiPolygon};
use proj4rs::{proj::Proj as Proj4, transform::transform};

use crate::{error::{Error, Result}, geom::Crs};

/// Build a proj4rs projection for `crs`.
fn build_proj(crs: &Crs) -> Result<Proj4> {
    let proj_string = crs.proj4()?;
    Proj4::from_proj_string(&proj_string)
        .map_err(|e| Error::Crs(format!("failed to build PROJ.4 {proj_string}: {e:?}")))
}

/// Reproject shapes from `from` to `to`. Geographic systems are lon/lat degrees.
pub(crate) fn reproject(shapes: Vec<MultiPolygon<f64>>, from: &Crs, to: &Crs) -> Result<Vec<MultiPolygon<f64>>> {
    if from == to { return Ok(shapes) }

    let (src, dst) = (build_proj(from)?, build_proj(to)?);
    let (src_deg, dst_deg) = (from.is_geographic(), to.is_geographic());

    // Map coords → radians in for lon/lat sources, degrees out for lon/lat targets.
    shapes.iter()
        .map(|shape| shape.try_map_coords(|coord: Coord<f64>| {
            let mut point = if src_deg {
                (coord.x.to_radians(), coord.y.to_radians(), 0.0)
            } else {
                (coord.x, coord.y, 0.0)
            };
            transform(&src, &dst, &mut point)
                .map_err(|e| Error::Crs(format!("CRS transform {from} -> {to} failed at ({}, {}): {e:?}", coord.x, coord.y)))?;
            Ok(if dst_deg {
                Coord { x: point.0.to_degrees(), y: point.1.to_degrees() }
            } else {
                Coord { x: point.0, y: point.1 }
            })
        }))
        .collect()
}
