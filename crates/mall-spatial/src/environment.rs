//! Matrix-backed mall environment and builder.
//!
//! # Data layout
//!
//! Both matrices are stored flattened in row-major order, indexed by
//! `from * n + to`.  A shopper's candidate scan reads one contiguous row.
//!
//! # Occupancy
//!
//! The environment doubles as the default [`MoveSink`]: every notice moves
//! one unit of occupancy from `from` to `to`.  Counts never go below zero; a
//! notice that references an unknown location is logged and ignored.

use mall_core::{LocationId, Vec2};

use crate::{MallGeometry, MoveNotice, MoveSink, SpatialError, SpatialResult};

/// Tolerance for the symmetry / antisymmetry checks at construction.
const MATRIX_TOLERANCE: f64 = 1e-9;

// ── Location ──────────────────────────────────────────────────────────────────

/// A point of interest in the mall.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub name:     String,
    /// Store identifier from the sensor feed, when the location is a store.
    pub store_id: Option<u32>,
}

impl Location {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), store_id: None }
    }

    pub fn store(name: impl Into<String>, store_id: u32) -> Self {
        Self { name: name.into(), store_id: Some(store_id) }
    }
}

// ── MatrixEnvironment ─────────────────────────────────────────────────────────

/// Static distance/direction matrices plus live occupancy counts.
///
/// Construct with [`MatrixEnvironment::from_matrices`] or
/// [`MatrixEnvironmentBuilder`]; both validate the geometry invariants.
pub struct MatrixEnvironment {
    /// Ordered location sequence.  Indexed by `LocationId`.
    pub locations: Vec<Location>,

    distance:  Vec<f64>,
    direction: Vec<Vec2>,

    occupancy:      Vec<u32>,
    moves_notified: u64,
}

impl MatrixEnvironment {
    /// An environment with no locations.
    ///
    /// Useful for exercising degenerate-configuration handling; any movement
    /// attempt against it fails with [`SpatialError::NoLocations`].
    pub fn empty() -> Self {
        Self {
            locations:      Vec::new(),
            distance:       Vec::new(),
            direction:      Vec::new(),
            occupancy:      Vec::new(),
            moves_notified: 0,
        }
    }

    /// Build from explicit row-major matrices.
    ///
    /// # Errors
    ///
    /// - [`SpatialError::NoLocations`] if `locations` is empty;
    /// - [`SpatialError::DimensionMismatch`] if either matrix is not `n × n`;
    /// - [`SpatialError::NonZeroDiagonal`], [`SpatialError::InvalidDistance`],
    ///   [`SpatialError::NotSymmetric`] for a malformed distance matrix;
    /// - [`SpatialError::NotAntisymmetric`] for a malformed direction matrix.
    pub fn from_matrices(
        locations: Vec<Location>,
        distance:  Vec<Vec<f64>>,
        direction: Vec<Vec<Vec2>>,
    ) -> SpatialResult<Self> {
        let n = locations.len();
        if n == 0 {
            return Err(SpatialError::NoLocations);
        }
        check_square("distance", &distance, n)?;
        check_square("direction", &direction, n)?;

        for i in 0..n {
            let a = LocationId(i as u32);
            if distance[i][i] != 0.0 {
                return Err(SpatialError::NonZeroDiagonal(a));
            }
            for j in (i + 1)..n {
                let b = LocationId(j as u32);
                let (dij, dji) = (distance[i][j], distance[j][i]);
                if dij.is_nan() || dji.is_nan() || dij < 0.0 || dji < 0.0 {
                    return Err(SpatialError::InvalidDistance { a, b });
                }
                // Equal infinities mark an unreachable pair and are symmetric.
                if dij != dji && (dij - dji).abs() > MATRIX_TOLERANCE {
                    return Err(SpatialError::NotSymmetric { a, b });
                }
                if !direction[i][j].approx_eq(-direction[j][i], MATRIX_TOLERANCE) {
                    return Err(SpatialError::NotAntisymmetric { a, b });
                }
            }
        }

        Ok(Self {
            occupancy:      vec![0; n],
            moves_notified: 0,
            distance:       distance.into_iter().flatten().collect(),
            direction:      direction.into_iter().flatten().collect(),
            locations,
        })
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// The location record for `id`, if it exists.
    pub fn location(&self, id: LocationId) -> Option<&Location> {
        self.locations.get(id.index())
    }

    /// Look up a location by name (linear scan; intended for setup code).
    pub fn find(&self, name: &str) -> Option<LocationId> {
        self.locations
            .iter()
            .position(|l| l.name == name)
            .map(|i| LocationId(i as u32))
    }

    // ── Occupancy ─────────────────────────────────────────────────────────

    /// Shoppers currently at `id` (0 for unknown ids).
    pub fn occupancy(&self, id: LocationId) -> u32 {
        self.occupancy.get(id.index()).copied().unwrap_or(0)
    }

    /// Per-location occupancy, indexed by `LocationId`.
    pub fn occupancy_counts(&self) -> &[u32] {
        &self.occupancy
    }

    /// Shoppers currently inside the mall.
    pub fn total_present(&self) -> u64 {
        self.occupancy.iter().map(|&c| c as u64).sum()
    }

    /// Notifications received since construction.
    pub fn moves_notified(&self) -> u64 {
        self.moves_notified
    }

    /// Zero every occupancy count (e.g. between independent runs).
    pub fn reset_occupancy(&mut self) {
        self.occupancy.iter_mut().for_each(|c| *c = 0);
        self.moves_notified = 0;
    }

    #[inline]
    fn cell(&self, from: LocationId, to: LocationId) -> usize {
        from.index() * self.len() + to.index()
    }
}

fn check_square<T>(matrix: &'static str, rows: &[Vec<T>], n: usize) -> SpatialResult<()> {
    if rows.len() != n {
        return Err(SpatialError::DimensionMismatch { matrix, expected: n, got: rows.len() });
    }
    match rows.iter().find(|row| row.len() != n) {
        Some(row) => Err(SpatialError::DimensionMismatch { matrix, expected: n, got: row.len() }),
        None => Ok(()),
    }
}

impl MallGeometry for MatrixEnvironment {
    #[inline]
    fn location_count(&self) -> usize {
        self.locations.len()
    }

    #[inline]
    fn distance(&self, from: LocationId, to: LocationId) -> f64 {
        self.distance[self.cell(from, to)]
    }

    #[inline]
    fn direction(&self, from: LocationId, to: LocationId) -> Vec2 {
        self.direction[self.cell(from, to)]
    }
}

impl MoveSink for MatrixEnvironment {
    fn notify_move(&mut self, notice: &MoveNotice) {
        self.moves_notified += 1;
        if let Some(from) = notice.from {
            match self.occupancy.get_mut(from.index()) {
                Some(count) => *count = count.saturating_sub(1),
                None => tracing::warn!(agent = %notice.agent, %from, "move notice from unknown location"),
            }
        }
        if let Some(to) = notice.to {
            match self.occupancy.get_mut(to.index()) {
                Some(count) => *count += 1,
                None => tracing::warn!(agent = %notice.agent, %to, "move notice to unknown location"),
            }
        }
    }
}

// ── MatrixEnvironmentBuilder ──────────────────────────────────────────────────

/// Construct a [`MatrixEnvironment`] pair by pair, then call
/// [`build`](Self::build).
///
/// [`connect`](Self::connect) writes both `(a, b)` and `(b, a)`, so symmetry
/// and antisymmetry hold by construction.  Pairs never connected are
/// unreachable (infinite distance, zero direction).
///
/// # Example
///
/// ```
/// use mall_core::Vec2;
/// use mall_spatial::{Location, MallGeometry, MatrixEnvironmentBuilder};
///
/// let mut b = MatrixEnvironmentBuilder::new();
/// let cafe  = b.add_location(Location::new("cafe"));
/// let books = b.add_location(Location::new("books"));
/// b.connect(cafe, books, 12.0, Vec2::new(1.0, 0.0));
/// let env = b.build().unwrap();
/// assert_eq!(env.distance(books, cafe), 12.0);
/// assert_eq!(env.direction(books, cafe), Vec2::new(-1.0, 0.0));
/// ```
pub struct MatrixEnvironmentBuilder {
    locations: Vec<Location>,
    pairs:     Vec<RawPair>,
}

struct RawPair {
    a:         LocationId,
    b:         LocationId,
    distance:  f64,
    direction: Vec2,
}

impl MatrixEnvironmentBuilder {
    pub fn new() -> Self {
        Self { locations: Vec::new(), pairs: Vec::new() }
    }

    /// Add a location and return its `LocationId` (sequential from 0).
    pub fn add_location(&mut self, location: Location) -> LocationId {
        let id = LocationId(self.locations.len() as u32);
        self.locations.push(location);
        id
    }

    /// Record the distance between `a` and `b` and the direction from `a`
    /// to `b`.  A later call for the same pair overwrites the earlier one.
    pub fn connect(&mut self, a: LocationId, b: LocationId, distance: f64, direction: Vec2) {
        self.pairs.push(RawPair { a, b, distance, direction });
    }

    pub fn location_count(&self) -> usize {
        self.locations.len()
    }

    /// Consume the builder and produce a validated [`MatrixEnvironment`].
    pub fn build(self) -> SpatialResult<MatrixEnvironment> {
        let n = self.locations.len();
        let mut distance = vec![vec![f64::INFINITY; n]; n];
        let mut direction = vec![vec![Vec2::ZERO; n]; n];
        for (i, row) in distance.iter_mut().enumerate() {
            row[i] = 0.0;
        }

        for p in &self.pairs {
            let (i, j) = (p.a.index(), p.b.index());
            if i >= n {
                return Err(SpatialError::LocationNotFound(p.a));
            }
            if j >= n {
                return Err(SpatialError::LocationNotFound(p.b));
            }
            if i == j {
                continue;
            }
            distance[i][j] = p.distance;
            distance[j][i] = p.distance;
            direction[i][j] = p.direction;
            direction[j][i] = -p.direction;
        }

        MatrixEnvironment::from_matrices(self.locations, distance, direction)
    }
}

impl Default for MatrixEnvironmentBuilder {
    fn default() -> Self {
        Self::new()
    }
}
