// Great-circle distance on a spherical Earth.

/// Mean Earth radius (IUGG), kilometres
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Haversine distance in kilometres between two `(latitude, longitude)` points in degrees
#[inline]
pub fn haversine_km(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lat1, lon1) = (a.0.to_radians(), a.1.to_radians());
    let (lat2, lon2) = (b.0.to_radians(), b.1.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push h slightly above 1 for antipodal points
    let h = h.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Divide each distance by the largest one.
///
/// When the maximum is zero (or not finite) every value maps to 0.
pub fn normalize_by_max(distances: &[f64]) -> Vec<f64> {
    let max = distances.iter().copied().fold(0.0_f64, f64::max);
    if max > 0.0 && max.is_finite() {
        distances.iter().map(|d| d / max).collect()
    } else {
        vec![0.0; distances.len()]
    }
}
