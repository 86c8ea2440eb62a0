//! D2Q9 lattice state and the stream/collide update.

use crate::config::LatticeConfig;
use crate::d2q9::{self, Direction, OPP, Q, W};
use crate::error::{LbmError, Result};
use crate::topology::{Grid, NeighborTable};
use rayon::prelude::*;

/// Whether a site takes part in streaming or acts as a bounce-back wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SiteState {
    #[default]
    Active,
    Inactive,
}

/// D2Q9 lattice Boltzmann grid with periodic wraparound.
#[derive(Debug, Clone)]
pub struct Lattice {
    grid: Grid,
    neighbors: NeighborTable,
    states: Vec<SiteState>,
    /// Relaxation time τ
    tau: f64,
    /// Distribution functions, site-major: `f[site * Q + k]`
    f: Vec<f64>,
    /// Streaming target, swapped with `f` after each stream
    f_next: Vec<f64>,
}

impl Lattice {
    /// Create an all-active lattice at rest equilibrium with τ = 1.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let grid = Grid::new(width, height)?;
        let neighbors = NeighborTable::build(&grid);
        let size = grid.num_sites() * Q;
        let mut lattice = Self {
            grid,
            neighbors,
            states: vec![SiteState::Active; grid.num_sites()],
            tau: 1.0,
            f: vec![0.0; size],
            f_next: vec![0.0; size],
        };
        lattice.initialize_rest();
        log::debug!(
            "built {}x{} D2Q9 lattice ({} sites)",
            width,
            height,
            grid.num_sites()
        );
        Ok(lattice)
    }

    /// Build a lattice from a validated configuration.
    ///
    /// Obstacles are marked before the rest state is written, so they start
    /// empty; the perturbation is applied last.
    pub fn from_config(config: &LatticeConfig) -> Result<Self> {
        config.validate()?;
        let mut lattice = Self::new(config.width, config.height)?;
        lattice.set_tau(config.tau)?;
        for &coord in &config.obstacles {
            lattice.set_obstacle(coord)?;
        }
        lattice.initialize_rest();
        if let Some(p) = &config.perturbation {
            let site = lattice.grid.index_of(p.site)?;
            lattice.perturb(site, Direction::new(p.direction)?, p.factor)?;
        }
        Ok(lattice)
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn neighbors(&self) -> &NeighborTable {
        &self.neighbors
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.grid.height()
    }

    #[inline]
    pub fn num_sites(&self) -> usize {
        self.grid.num_sites()
    }

    pub fn coord_of(&self, site: usize) -> Result<[usize; 2]> {
        self.grid.coord_of(site)
    }

    pub fn index_of(&self, coord: [usize; 2]) -> Result<usize> {
        self.grid.index_of(coord)
    }

    pub fn tau(&self) -> f64 {
        self.tau
    }

    /// Set the relaxation time. τ must be finite and positive.
    pub fn set_tau(&mut self, tau: f64) -> Result<()> {
        if !(tau.is_finite() && tau > 0.0) {
            return Err(LbmError::InvalidRelaxationTime(tau));
        }
        self.tau = tau;
        Ok(())
    }

    /// Kinematic viscosity implied by τ.
    pub fn viscosity(&self) -> f64 {
        d2q9::viscosity_from_tau(self.tau)
    }

    fn check_site(&self, site: usize) -> Result<()> {
        if site >= self.num_sites() {
            return Err(LbmError::SiteOutOfBounds {
                site,
                num_sites: self.num_sites(),
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Activity
    // -----------------------------------------------------------------

    /// # Panics
    /// If `site` is not a valid index.
    pub fn state(&self, site: usize) -> SiteState {
        self.states[site]
    }

    pub fn states(&self) -> &[SiteState] {
        &self.states
    }

    pub fn set_state(&mut self, site: usize, state: SiteState) -> Result<()> {
        self.check_site(site)?;
        self.states[site] = state;
        Ok(())
    }

    /// Replace the whole activity map.
    pub fn set_activity(&mut self, states: &[SiteState]) -> Result<()> {
        if states.len() != self.num_sites() {
            return Err(LbmError::ActivityMapSize {
                expected: self.num_sites(),
                actual: states.len(),
            });
        }
        self.states.copy_from_slice(states);
        Ok(())
    }

    /// Mark the site at `coord` inactive.
    pub fn set_obstacle(&mut self, coord: [usize; 2]) -> Result<()> {
        let site = self.grid.index_of(coord)?;
        self.states[site] = SiteState::Inactive;
        Ok(())
    }

    pub fn active_sites(&self) -> usize {
        self.states
            .iter()
            .filter(|&&s| s == SiteState::Active)
            .count()
    }

    // -----------------------------------------------------------------
    // Initialization
    // -----------------------------------------------------------------

    /// Rest equilibrium (ρ = 1, u = 0) at active sites, zero at inactive ones.
    pub fn initialize_rest(&mut self) {
        for (site_f, state) in self.f.chunks_exact_mut(Q).zip(&self.states) {
            match state {
                SiteState::Active => site_f.copy_from_slice(&W),
                SiteState::Inactive => site_f.fill(0.0),
            }
        }
    }

    /// Equilibrium for uniform density and velocity at every active site.
    pub fn initialize_uniform(&mut self, rho: f64, u: [f64; 2]) {
        let feq: [f64; Q] = std::array::from_fn(|k| d2q9::equilibrium(k, rho, u));
        for (site_f, state) in self.f.chunks_exact_mut(Q).zip(&self.states) {
            match state {
                SiteState::Active => site_f.copy_from_slice(&feq),
                SiteState::Inactive => site_f.fill(0.0),
            }
        }
    }

    /// Multiply one population by `factor`.
    pub fn perturb(&mut self, site: usize, direction: Direction, factor: f64) -> Result<()> {
        self.check_site(site)?;
        self.f[site * Q + direction.index()] *= factor;
        Ok(())
    }

    /// Overwrite all nine populations at `site`.
    pub fn set_distribution(&mut self, site: usize, values: [f64; Q]) -> Result<()> {
        self.check_site(site)?;
        self.f[site * Q..(site + 1) * Q].copy_from_slice(&values);
        Ok(())
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    /// The nine populations at `site` in direction order.
    ///
    /// # Panics
    /// If `site` is not a valid index.
    #[inline]
    pub fn distribution(&self, site: usize) -> &[f64] {
        &self.f[site * Q..(site + 1) * Q]
    }

    /// # Panics
    /// If `site` is not a valid index.
    #[inline]
    pub fn value(&self, site: usize, direction: Direction) -> f64 {
        self.distribution(site)[direction.index()]
    }

    /// Macroscopic density: sum of the nine populations.
    ///
    /// # Panics
    /// If `site` is not a valid index.
    pub fn density(&self, site: usize) -> f64 {
        self.distribution(site).iter().sum()
    }

    /// Macroscopic velocity; zero at sites with zero density.
    ///
    /// # Panics
    /// If `site` is not a valid index.
    pub fn velocity(&self, site: usize) -> [f64; 2] {
        d2q9::macroscopic(self.distribution(site)).1
    }

    /// Sum of density over every site.
    pub fn total_mass(&self) -> f64 {
        self.f.iter().sum()
    }

    /// Sum of ρu over every site.
    pub fn total_momentum(&self) -> [f64; 2] {
        let mut p = [0.0, 0.0];
        for site_f in self.f.chunks_exact(Q) {
            let (rho, u) = d2q9::macroscopic(site_f);
            p[0] += rho * u[0];
            p[1] += rho * u[1];
        }
        p
    }

    /// Compute total kinetic energy.
    pub fn kinetic_energy(&self) -> f64 {
        self.f
            .chunks_exact(Q)
            .map(|site_f| {
                let (rho, u) = d2q9::macroscopic(site_f);
                0.5 * rho * (u[0] * u[0] + u[1] * u[1])
            })
            .sum()
    }

    /// Maximum velocity magnitude in domain.
    pub fn max_velocity(&self) -> f64 {
        self.f
            .chunks_exact(Q)
            .map(|site_f| {
                let u = d2q9::macroscopic(site_f).1;
                (u[0] * u[0] + u[1] * u[1]).sqrt()
            })
            .fold(0.0, f64::max)
    }

    // -----------------------------------------------------------------
    // Update
    // -----------------------------------------------------------------

    /// Move every population one site along its direction.
    ///
    /// Populations heading into an inactive site are reflected back into
    /// the opposite direction of their own site. Inactive sites neither
    /// send nor receive and keep their stored values. Every site reads only
    /// pre-step values; the buffers swap once all sites are written.
    pub fn stream(&mut self) {
        let neighbors = &self.neighbors;
        let states = &self.states;
        let f = &self.f;

        self.f_next
            .par_chunks_exact_mut(Q)
            .enumerate()
            .for_each(|(site, next)| {
                let own = &f[site * Q..(site + 1) * Q];
                if states[site] == SiteState::Inactive {
                    next.copy_from_slice(own);
                    return;
                }
                for (k, slot) in next.iter_mut().enumerate() {
                    let opp = OPP[k];
                    let source = neighbors.neighbor_at(site, opp);
                    *slot = match states[source] {
                        SiteState::Inactive => own[opp],
                        SiteState::Active => f[source * Q + k],
                    };
                }
            });

        std::mem::swap(&mut self.f, &mut self.f_next);
    }

    /// Relax every active site toward local equilibrium (BGK operator).
    pub fn collide(&mut self) {
        let omega = 1.0 / self.tau;
        self.f
            .par_chunks_exact_mut(Q)
            .zip(self.states.par_iter())
            .filter(|(_, state)| **state == SiteState::Active)
            .for_each(|(site_f, _)| collide_site(site_f, omega));
    }

    /// One full step: streaming, then collision.
    pub fn step(&mut self) {
        self.stream();
        self.collide();
        log::trace!("step complete, total mass {:.12}", self.total_mass());
    }
}

/// BGK relaxation of one site's populations with ω = 1/τ.
#[inline]
fn collide_site(site_f: &mut [f64], omega: f64) {
    let (rho, u) = d2q9::macroscopic(site_f);
    for (k, fk) in site_f.iter_mut().enumerate() {
        let feq = d2q9::equilibrium(k, rho, u);
        *fk -= omega * (*fk - feq);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_lattice(width: usize, height: usize, seed: u64) -> Lattice {
        let mut lattice = Lattice::new(width, height).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        for site in 0..lattice.num_sites() {
            let values: [f64; Q] = std::array::from_fn(|k| W[k] * rng.random_range(0.5..1.5));
            lattice.set_distribution(site, values).unwrap();
        }
        lattice
    }

    #[test]
    fn test_new_rejects_empty_grid() {
        assert!(matches!(
            Lattice::new(0, 5),
            Err(LbmError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_rest_initialization() {
        let lattice = Lattice::new(4, 3).unwrap();
        for site in 0..lattice.num_sites() {
            assert_eq!(lattice.state(site), SiteState::Active);
            for (k, d) in Direction::all().enumerate() {
                assert_eq!(lattice.value(site, d), W[k]);
            }
            assert_relative_eq!(lattice.density(site), 1.0, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_streaming_moves_populations() {
        let mut lattice = Lattice::new(5, 4).unwrap();
        let east = Direction::new(6).unwrap();
        let site = lattice.index_of([2, 1]).unwrap();
        lattice.perturb(site, east, 2.0).unwrap();

        lattice.stream();

        let target = lattice.index_of([3, 1]).unwrap();
        assert_relative_eq!(lattice.value(target, east), 2.0 * east.weight());
        assert_relative_eq!(lattice.value(site, east), east.weight());
    }

    #[test]
    fn test_streaming_conserves_mass() {
        let mut lattice = random_lattice(7, 5, 11);
        let mass0 = lattice.total_mass();
        lattice.stream();
        assert_relative_eq!(lattice.total_mass(), mass0, max_relative = 1e-13);
    }

    #[test]
    fn test_bounce_back_at_obstacle() {
        let mut lattice = Lattice::new(5, 5).unwrap();
        lattice.set_obstacle([3, 2]).unwrap();
        lattice.initialize_rest();

        let east = Direction::new(6).unwrap();
        let site = lattice.index_of([2, 2]).unwrap();
        lattice.perturb(site, east, 3.0).unwrap();
        let mass0 = lattice.total_mass();

        lattice.stream();

        // Eastward mass hits the wall and returns westward at the same site.
        assert_relative_eq!(lattice.value(site, east.reverse()), 3.0 * east.weight());
        let wall = lattice.index_of([3, 2]).unwrap();
        assert_eq!(lattice.density(wall), 0.0);
        assert_relative_eq!(lattice.total_mass(), mass0, max_relative = 1e-13);
    }

    #[test]
    fn test_inactive_sites_frozen() {
        let mut lattice = random_lattice(4, 4, 3);
        lattice.set_state(5, SiteState::Inactive).unwrap();
        let stored = lattice.distribution(5).to_vec();
        for _ in 0..5 {
            lattice.step();
        }
        assert_eq!(lattice.distribution(5), stored.as_slice());
        assert_eq!(lattice.state(5), SiteState::Inactive);
    }

    #[test]
    fn test_equilibrium_fixed_point() {
        let mut lattice = Lattice::new(6, 4).unwrap();
        lattice.step();
        for site in 0..lattice.num_sites() {
            assert_relative_eq!(lattice.density(site), 1.0, epsilon = 1e-14);
            for (k, &fk) in lattice.distribution(site).iter().enumerate() {
                assert_relative_eq!(fk, W[k], epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn test_zero_density_site_stays_finite() {
        let mut lattice = Lattice::new(3, 3).unwrap();
        let site = lattice.index_of([1, 1]).unwrap();
        lattice.set_distribution(site, [0.0; Q]).unwrap();
        lattice.collide();
        assert_eq!(lattice.velocity(site), [0.0, 0.0]);
        assert_eq!(lattice.density(site), 0.0);
        assert!(lattice.distribution(site).iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_unit_tau_relaxes_to_equilibrium() {
        let mut lattice = random_lattice(3, 3, 5);
        let (rho, u) = d2q9::macroscopic(lattice.distribution(4));
        lattice.collide();
        for (k, &fk) in lattice.distribution(4).iter().enumerate() {
            assert_relative_eq!(fk, d2q9::equilibrium(k, rho, u), epsilon = 1e-14);
        }
    }

    #[test]
    fn test_collision_conserves_moments() {
        let mut lattice = random_lattice(4, 4, 9);
        lattice.set_tau(0.7).unwrap();
        let mass0 = lattice.total_mass();
        let p0 = lattice.total_momentum();
        lattice.collide();
        let p1 = lattice.total_momentum();
        assert_relative_eq!(lattice.total_mass(), mass0, max_relative = 1e-13);
        assert_relative_eq!(p1[0], p0[0], epsilon = 1e-13);
        assert_relative_eq!(p1[1], p0[1], epsilon = 1e-13);
    }

    #[test]
    fn test_density_conservation_many_steps() {
        let mut lattice = Lattice::new(32, 16).unwrap();
        lattice.set_tau(0.8).unwrap();
        lattice.initialize_uniform(1.0, [0.01, 0.0]);
        let mass0 = lattice.total_mass();
        for _ in 0..100 {
            lattice.step();
        }
        assert!(
            (lattice.total_mass() - mass0).abs() / mass0 < 1e-10,
            "Density not conserved: {} vs {}",
            mass0,
            lattice.total_mass()
        );
        assert!(lattice.max_velocity() > 0.009);
    }

    #[test]
    fn test_viscous_dissipation() {
        let mut lattice = Lattice::new(32, 32).unwrap();
        lattice.set_tau(tau_for_test()).unwrap();

        // Shear layer: +u in the lower half, -u in the upper half
        for site in 0..lattice.num_sites() {
            let [_, y] = lattice.coord_of(site).unwrap();
            let u_x = if y < 16 { 0.1 } else { -0.1 };
            let feq = std::array::from_fn(|k| d2q9::equilibrium(k, 1.0, [u_x, 0.0]));
            lattice.set_distribution(site, feq).unwrap();
        }

        let ke0 = lattice.kinetic_energy();
        for _ in 0..1000 {
            lattice.step();
        }
        let ke1 = lattice.kinetic_energy();
        assert!(ke1 < ke0 * 0.9, "KE should decrease: {} -> {}", ke0, ke1);
    }

    fn tau_for_test() -> f64 {
        d2q9::tau_from_viscosity(0.1)
    }

    #[test]
    fn test_set_tau_rejects_non_positive() {
        let mut lattice = Lattice::new(2, 2).unwrap();
        assert!(lattice.set_tau(0.0).is_err());
        assert!(lattice.set_tau(f64::NAN).is_err());
        assert!(lattice.set_tau(0.6).is_ok());
        assert_relative_eq!(lattice.viscosity(), 0.1 / 3.0);
    }

    #[test]
    fn test_activity_map_size() {
        let mut lattice = Lattice::new(2, 2).unwrap();
        assert!(matches!(
            lattice.set_activity(&[SiteState::Active; 3]),
            Err(LbmError::ActivityMapSize { expected: 4, actual: 3 })
        ));
        let map = [
            SiteState::Active,
            SiteState::Inactive,
            SiteState::Active,
            SiteState::Active,
        ];
        lattice.set_activity(&map).unwrap();
        assert_eq!(lattice.active_sites(), 3);
    }

    #[test]
    fn test_from_config_reference_seed() {
        let config = LatticeConfig::reference(4, 4);
        let lattice = Lattice::from_config(&config).unwrap();
        let site = lattice.index_of([1, 1]).unwrap();
        assert_eq!(site, 4 + 1);
        let d3 = Direction::new(3).unwrap();
        assert_relative_eq!(lattice.value(site, d3), 1.1 * d3.weight());
        assert_relative_eq!(lattice.density(site), 1.0 + 0.1 / 36.0, epsilon = 1e-14);
    }

    #[test]
    fn test_from_config_obstacles_start_empty() {
        let config = LatticeConfig::new(4, 4).with_obstacle([2, 2]);
        let lattice = Lattice::from_config(&config).unwrap();
        let wall = lattice.index_of([2, 2]).unwrap();
        assert_eq!(lattice.state(wall), SiteState::Inactive);
        assert_eq!(lattice.density(wall), 0.0);
        assert_relative_eq!(lattice.total_mass(), 15.0, epsilon = 1e-12);
    }
}
