//! D2Q9 discrete velocity model.
//!
//! Nine velocity directions on a 2D square lattice, numbered 1..=9 by a
//! row-major scan of `dy ∈ {-1, 0, 1}`, `dx ∈ {-1, 0, 1}` (y grows upward):
//! ```text
//!   7   8   9
//!    \  |  /
//!   4 - 5 - 6
//!    /  |  \
//!   1   2   3
//! ```
//! Direction 5 is the rest velocity. Opposite directions pair up as
//! `reverse(n) = 10 - n`, which bounce-back relies on.

use crate::error::{LbmError, Result};

/// Number of discrete velocities.
pub const Q: usize = 9;

/// D2Q9 discrete velocities: [dx, dy], indexed by `n - 1`.
pub const E: [[i32; 2]; Q] = [
    [-1, -1], // 1: southwest
    [0, -1],  // 2: south
    [1, -1],  // 3: southeast
    [-1, 0],  // 4: west
    [0, 0],   // 5: rest
    [1, 0],   // 6: east
    [-1, 1],  // 7: northwest
    [0, 1],   // 8: north
    [1, 1],   // 9: northeast
];

/// D2Q9 weights, indexed by `n - 1`.
pub const W: [f64; Q] = [
    1.0 / 36.0,
    1.0 / 9.0,
    1.0 / 36.0,
    1.0 / 9.0,
    4.0 / 9.0,
    1.0 / 9.0,
    1.0 / 36.0,
    1.0 / 9.0,
    1.0 / 36.0,
];

/// Opposite storage index for bounce-back: `OPP[k] = Q - 1 - k`.
pub const OPP: [usize; Q] = [8, 7, 6, 5, 4, 3, 2, 1, 0];

/// One of the nine lattice directions, stored by its 1-based number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Direction(u8);

impl Direction {
    /// The zero-velocity direction.
    pub const REST: Direction = Direction(5);

    /// Checked constructor from the 1-based direction number.
    pub fn new(n: usize) -> Result<Self> {
        if (1..=Q).contains(&n) {
            Ok(Self(n as u8))
        } else {
            Err(LbmError::DirectionOutOfBounds(n))
        }
    }

    /// 1-based direction number.
    #[inline]
    pub fn number(self) -> usize {
        self.0 as usize
    }

    /// 0-based storage index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize - 1
    }

    /// Lattice offset [dx, dy].
    #[inline]
    pub fn steps(self) -> [i32; 2] {
        E[self.index()]
    }

    #[inline]
    pub fn weight(self) -> f64 {
        W[self.index()]
    }

    /// 180° rotated direction, `10 - n`.
    #[inline]
    pub fn reverse(self) -> Self {
        Self((Q + 1) as u8 - self.0)
    }

    /// All nine directions in numbering order.
    pub fn all() -> impl Iterator<Item = Direction> {
        (1..=Q as u8).map(Direction)
    }

    /// Equilibrium population for this direction.
    #[inline]
    pub fn equilibrium(self, rho: f64, u: [f64; 2]) -> f64 {
        equilibrium(self.index(), rho, u)
    }
}

impl TryFrom<usize> for Direction {
    type Error = LbmError;

    fn try_from(n: usize) -> Result<Self> {
        Self::new(n)
    }
}

/// Offset for direction number `n`, failing for `n` outside 1..=9.
pub fn direction_to_steps(n: usize) -> Result<[i32; 2]> {
    Direction::new(n).map(Direction::steps)
}

/// Compute equilibrium distribution f_k^eq.
///
/// f_k^eq = w_k ρ [1 + 3(e_k·u) + 9/2(e_k·u)² - 3/2(u·u)]
#[inline]
pub(crate) fn equilibrium(k: usize, rho: f64, u: [f64; 2]) -> f64 {
    let ex = E[k][0] as f64;
    let ey = E[k][1] as f64;
    let eu = ex * u[0] + ey * u[1];
    let uu = u[0] * u[0] + u[1] * u[1];
    W[k] * rho * (1.0 + 3.0 * eu + 4.5 * eu * eu - 1.5 * uu)
}

/// Density and velocity of one site's populations.
///
/// A site with exactly zero density reports zero velocity instead of NaN.
#[inline]
pub fn macroscopic(f: &[f64]) -> (f64, [f64; 2]) {
    let mut rho = 0.0;
    let mut u = [0.0, 0.0];
    for (fk, e) in f.iter().zip(E.iter()) {
        rho += fk;
        u[0] += fk * e[0] as f64;
        u[1] += fk * e[1] as f64;
    }
    if rho != 0.0 {
        u[0] /= rho;
        u[1] /= rho;
    }
    (rho, u)
}

/// Relaxation time τ = 3ν + 0.5 for kinematic viscosity ν.
pub fn tau_from_viscosity(nu: f64) -> f64 {
    3.0 * nu + 0.5
}

/// Kinematic viscosity ν = (τ - 0.5) / 3.
pub fn viscosity_from_tau(tau: f64) -> f64 {
    (tau - 0.5) / 3.0
}
