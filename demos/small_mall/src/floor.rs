//! A synthetic single-floor mall.
//!
//! Eight units along a 120 m concourse with a food court at the east end.
//! Units are placed on a plane; every pair is connected by a straight walk.

use mall_core::Vec2;
use mall_spatial::{Location, MatrixEnvironment, MatrixEnvironmentBuilder, SpatialResult};

/// `(name, store id, x, y)` in metres.
const UNITS: [(&str, Option<u32>, f64, f64); 8] = [
    ("North entrance", None,      0.0,  0.0),
    ("Bookshop",       Some(101), 20.0, 12.0),
    ("Pharmacy",       Some(102), 20.0, -12.0),
    ("Electronics",    Some(103), 55.0, 12.0),
    ("Fashion",        Some(104), 55.0, -12.0),
    ("Toy store",      Some(105), 90.0, 12.0),
    ("Supermarket",    Some(106), 90.0, -12.0),
    ("Food court",     None,      120.0, 0.0),
];

/// Build the floor.  Directions are unit vectors from one unit to the other.
pub fn build_floor() -> SpatialResult<MatrixEnvironment> {
    let mut b = MatrixEnvironmentBuilder::new();
    let ids: Vec<_> = UNITS
        .iter()
        .map(|&(name, store, _, _)| match store {
            Some(id) => b.add_location(Location::store(name, id)),
            None     => b.add_location(Location::new(name)),
        })
        .collect();

    for (i, &(_, _, xi, yi)) in UNITS.iter().enumerate() {
        for (j, &(_, _, xj, yj)) in UNITS.iter().enumerate().skip(i + 1) {
            let delta = Vec2::new(xj - xi, yj - yi);
            let distance = delta.length();
            let direction = Vec2::new(delta.x / distance, delta.y / distance);
            b.connect(ids[i], ids[j], distance, direction);
        }
    }
    b.build()
}
