//! Spatial helpers: H3 cell distances used by matching and routing.
//!
//! Pickup/dropoff coordinates snap to resolution-9 cells (~240m), which is
//! plenty for urban dispatch radii. Distances are haversine between cell
//! centers, cached process-wide since the same origin is compared against
//! many drivers during a search.

use std::num::NonZeroUsize;
use std::sync::{Mutex, OnceLock};

use h3o::{CellIndex, LatLng, Resolution};
use lru::LruCache;

/// Resolution every pickup/dropoff coordinate snaps to.
pub const DISPATCH_RESOLUTION: Resolution = Resolution::Nine;

fn distance_km_between_cells_uncached(a: CellIndex, b: CellIndex) -> f64 {
    let a: LatLng = a.into();
    let b: LatLng = b.into();
    let (lat1, lon1) = (a.lat().to_radians(), a.lng().to_radians());
    let (lat2, lon2) = (b.lat().to_radians(), b.lng().to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlon = (dlon * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    6371.0 * c
}

/// Global distance cache (50,000 entries).
fn get_distance_cache() -> &'static Mutex<LruCache<(CellIndex, CellIndex), f64>> {
    static CACHE: OnceLock<Mutex<LruCache<(CellIndex, CellIndex), f64>>> = OnceLock::new();
    CACHE.get_or_init(|| {
        Mutex::new(LruCache::new(
            NonZeroUsize::new(50_000).expect("cache size must be non-zero"),
        ))
    })
}

/// Haversine distance in kilometres between two H3 cell centers, cached.
pub fn distance_km_between_cells(a: CellIndex, b: CellIndex) -> f64 {
    if a == b {
        return 0.0;
    }
    // Normalize the key so (a, b) and (b, a) share an entry.
    let key = if u64::from(a) <= u64::from(b) {
        (a, b)
    } else {
        (b, a)
    };
    if let Ok(mut cache) = get_distance_cache().lock() {
        if let Some(d) = cache.get(&key) {
            return *d;
        }
        let d = distance_km_between_cells_uncached(key.0, key.1);
        cache.put(key, d);
        return d;
    }
    distance_km_between_cells_uncached(a, b)
}

/// Same distance expressed in metres, handy for radius checks.
pub fn distance_m_between_cells(a: CellIndex, b: CellIndex) -> f64 {
    distance_km_between_cells(a, b) * 1000.0
}
