//! Grid geometry and the periodic neighbor table.

use crate::d2q9::{Direction, E, Q};
use crate::error::{LbmError, Result};

/// Fixed `width × height` grid with row-major site indices `x + y * width`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
}

impl Grid {
    /// Create a grid. Both dimensions must be non-zero.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let valid = width > 0
            && height > 0
            && width
                .checked_mul(height)
                .and_then(|n| n.checked_mul(Q))
                .is_some();
        if !valid {
            return Err(LbmError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn num_sites(&self) -> usize {
        self.width * self.height
    }

    pub fn contains(&self, [x, y]: [usize; 2]) -> bool {
        x < self.width && y < self.height
    }

    /// Site index → [x, y].
    pub fn coord_of(&self, site: usize) -> Result<[usize; 2]> {
        if site >= self.num_sites() {
            return Err(LbmError::SiteOutOfBounds {
                site,
                num_sites: self.num_sites(),
            });
        }
        Ok(self.coord(site))
    }

    /// [x, y] → site index.
    pub fn index_of(&self, coord: [usize; 2]) -> Result<usize> {
        if !self.contains(coord) {
            return Err(LbmError::CoordinateOutOfBounds {
                x: coord[0],
                y: coord[1],
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.index(coord))
    }

    #[inline]
    pub(crate) fn coord(&self, site: usize) -> [usize; 2] {
        [site % self.width, site / self.width]
    }

    #[inline]
    pub(crate) fn index(&self, [x, y]: [usize; 2]) -> usize {
        x + y * self.width
    }

    /// Site reached from `site` by offset `[dx, dy]`, wrapping each axis
    /// with its own dimension.
    pub fn wrapped_step(&self, site: usize, [dx, dy]: [i32; 2]) -> usize {
        let [x, y] = self.coord(site);
        let xp = (x as i64 + dx as i64).rem_euclid(self.width as i64) as usize;
        let yp = (y as i64 + dy as i64).rem_euclid(self.height as i64) as usize;
        self.index([xp, yp])
    }
}

/// Immutable `(site, direction) → neighbor site` lookup, built once.
///
/// Stored flat as `site * Q + k`.
#[derive(Debug, Clone)]
pub struct NeighborTable {
    neighbors: Vec<usize>,
}

impl NeighborTable {
    pub fn build(grid: &Grid) -> Self {
        let mut neighbors = Vec::with_capacity(grid.num_sites() * Q);
        for site in 0..grid.num_sites() {
            for e in E.iter() {
                neighbors.push(grid.wrapped_step(site, *e));
            }
        }
        Self { neighbors }
    }

    #[inline]
    pub fn neighbor(&self, site: usize, direction: Direction) -> usize {
        self.neighbors[site * Q + direction.index()]
    }

    /// Neighbor by 0-based storage index.
    #[inline]
    pub(crate) fn neighbor_at(&self, site: usize, k: usize) -> usize {
        self.neighbors[site * Q + k]
    }

    /// All nine neighbors of `site` in direction order.
    pub fn neighbors_of(&self, site: usize) -> &[usize] {
        &self.neighbors[site * Q..(site + 1) * Q]
    }

    pub fn num_sites(&self) -> usize {
        self.neighbors.len() / Q
    }
}
