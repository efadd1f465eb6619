//! The environment contract consumed by the movement model.

use mall_core::{AgentId, LocationId, Vec2};

use crate::{SpatialError, SpatialResult};

// ── Read side ─────────────────────────────────────────────────────────────────

/// Read-only mall geometry.
///
/// Implementations promise, for every `i, j < location_count()`:
///
/// - `distance(i, j) == distance(j, i)`, `distance(i, i) == 0`, and
///   `distance(i, j) >= 0`;
/// - `direction(i, j) == -direction(j, i)`; `direction(i, i)` is unused.
///
/// `distance_dim` / `direction_dim` report the dimension of the underlying
/// matrices so a mismatch with `location_count` is caught by
/// [`check_geometry`] instead of surfacing as an out-of-bounds index.
///
/// # Thread safety
///
/// The decision phase may read geometry from many threads at once, so
/// implementations must be `Send + Sync`.
pub trait MallGeometry: Send + Sync {
    /// Number of locations in the ordered location sequence.
    fn location_count(&self) -> usize;

    /// Dimension of the (square) distance matrix.
    fn distance_dim(&self) -> usize {
        self.location_count()
    }

    /// Dimension of the (square) direction matrix.
    fn direction_dim(&self) -> usize {
        self.location_count()
    }

    /// Distance between two locations.  Both ids must be in range.
    fn distance(&self, from: LocationId, to: LocationId) -> f64;

    /// Direction vector from `from` to `to`.  Both ids must be in range.
    fn direction(&self, from: LocationId, to: LocationId) -> Vec2;
}

/// Validate the geometry's shape and return its location count.
///
/// Fails if there are no locations or either matrix dimension disagrees with
/// the location count.
pub fn check_geometry<G: MallGeometry + ?Sized>(geometry: &G) -> SpatialResult<usize> {
    let n = geometry.location_count();
    if n == 0 {
        return Err(SpatialError::NoLocations);
    }
    let distance_dim = geometry.distance_dim();
    if distance_dim != n {
        return Err(SpatialError::DimensionMismatch { matrix: "distance", expected: n, got: distance_dim });
    }
    let direction_dim = geometry.direction_dim();
    if direction_dim != n {
        return Err(SpatialError::DimensionMismatch { matrix: "direction", expected: n, got: direction_dim });
    }
    Ok(n)
}

/// All locations whose distance from `from` is strictly less than `radius`,
/// in ascending index order.
///
/// `from` itself is always a member for any positive radius (its
/// self-distance is zero), so an empty result means the geometry or the
/// radius is broken and is reported as [`SpatialError::EmptyReachableSet`].
pub fn reachable_within<G: MallGeometry + ?Sized>(
    geometry: &G,
    from:     LocationId,
    radius:   f64,
) -> SpatialResult<Vec<LocationId>> {
    let n = check_geometry(geometry)?;
    if from.index() >= n {
        return Err(SpatialError::LocationNotFound(from));
    }

    let reachable: Vec<LocationId> = (0..n as u32)
        .map(LocationId)
        .filter(|&to| geometry.distance(from, to) < radius)
        .collect();

    if reachable.is_empty() {
        return Err(SpatialError::EmptyReachableSet { from, radius });
    }
    Ok(reachable)
}

// ── Write side ────────────────────────────────────────────────────────────────

/// One realized change of a shopper's location.
///
/// - `from == None`: the shopper just entered the mall (first placement).
/// - `to == None`: the shopper left the mall.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveNotice {
    pub agent: AgentId,
    pub from:  Option<LocationId>,
    pub to:    Option<LocationId>,
}

impl MoveNotice {
    #[inline]
    pub fn is_entry(&self) -> bool {
        self.from.is_none() && self.to.is_some()
    }

    #[inline]
    pub fn is_departure(&self) -> bool {
        self.to.is_none()
    }
}

/// Receiver of move notifications (occupancy bookkeeping, logging, …).
///
/// Called exactly once per realized relocation and once per departure of a
/// shopper that had a location.  The sink is shared by every shopper, so the
/// caller serializes calls; implementations need no internal locking.
pub trait MoveSink {
    fn notify_move(&mut self, notice: &MoveNotice);
}

/// Recording sink: keeps every notice in arrival order.
impl MoveSink for Vec<MoveNotice> {
    fn notify_move(&mut self, notice: &MoveNotice) {
        self.push(*notice);
    }
}

/// A complete environment: readable geometry plus a notification sink.
pub trait Environment: MallGeometry + MoveSink {}

impl<T: MallGeometry + MoveSink> Environment for T {}
