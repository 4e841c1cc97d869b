//! Spherical Web Mercator projection and slippy-map tile addressing.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

/// Earth radius used by the spherical Web Mercator projection (meters).
pub const EARTH_RADIUS_M: f64 = 6378137.0;

/// Edge length of a raster tile in pixels.
pub const TILE_SIZE: u32 = 256;

/// Project geographic coordinates (WGS84 degrees) to planar meters.
#[inline]
pub fn to_planar(lon: f64, lat: f64) -> (f64, f64) {
    let x = EARTH_RADIUS_M * lon.to_radians();
    let y = EARTH_RADIUS_M * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

/// Unproject planar meters back to geographic coordinates (lon, lat degrees).
#[inline]
pub fn to_geographic(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / EARTH_RADIUS_M).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS_M).exp().atan() - FRAC_PI_2).to_degrees();
    (lon, lat)
}

/// Identifies one tile of the raster pyramid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileId {
    pub z: u8,
    pub x: i64,
    pub y: i64,
}

/// A tile plus the pixel offset of a coordinate inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileAddress {
    pub tile: TileId,
    pub px: u32,
    pub py: u32,
}

/// Resolve the tile containing (lon, lat) at the given zoom, along with the
/// in-tile pixel offset, using the standard slippy-map convention.
pub fn tile_address(lon: f64, lat: f64, zoom: u8) -> TileAddress {
    let n = (1u64 << zoom) as f64;
    let xf = (lon + 180.0) / 360.0 * n;
    let lat_rad = lat.to_radians();
    let yf = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n;

    let xtile = xf.floor();
    let ytile = yf.floor();
    let size = TILE_SIZE as f64;
    TileAddress {
        tile: TileId { z: zoom, x: xtile as i64, y: ytile as i64 },
        px: (((xf - xtile) * size).floor()).clamp(0.0, size - 1.0) as u32,
        py: (((yf - ytile) * size).floor()).clamp(0.0, size - 1.0) as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_projects_to_origin() {
        let (x, y) = to_planar(0.0, 0.0);
        assert!(x.abs() < 1e-9);
        assert!(y.abs() < 1e-9);
    }

    #[test]
    fn round_trip_is_exact_within_tolerance() {
        for &lon in &[-179.9, -79.383, 0.0, 13.4, 179.9] {
            for &lat in &[-85.0, -43.6, 0.0, 43.653, 85.0] {
                let (x, y) = to_planar(lon, lat);
                let (lon2, lat2) = to_geographic(x, y);
                assert!((lon - lon2).abs() < 1e-6, "lon {lon} -> {lon2}");
                assert!((lat - lat2).abs() < 1e-6, "lat {lat} -> {lat2}");
            }
        }
    }

    #[test]
    fn equator_tile_address() {
        // (0, 0) at zoom 10 sits at the corner of tile (512, 512).
        let addr = tile_address(0.0, 0.0, 10);
        assert_eq!(addr.tile, TileId { z: 10, x: 512, y: 512 });
        assert_eq!((addr.px, addr.py), (0, 0));
    }

    #[test]
    fn pixel_offsets_stay_in_range() {
        for i in 0..100 {
            let lon = -79.6 + 0.007 * i as f64;
            let lat = 43.5 + 0.003 * i as f64;
            let addr = tile_address(lon, lat, 14);
            assert!(addr.px < TILE_SIZE);
            assert!(addr.py < TILE_SIZE);
        }
    }
}
