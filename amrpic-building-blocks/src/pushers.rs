//! Relativistic position update of macro-particles.
//!
//! Momenta are stored as `u = gamma * v` in units of m/s.
//! Both updates only advance the position components which are active for the chosen
//! [SpaceDim]; inactive components are left untouched.
use amrpic_concepts::SpaceDim;
use serde::{Deserialize, Serialize};

use crate::constants::INV_C2;

/// Lorentz factor $\gamma = \sqrt{1 + u^2/c^2}$ of a particle with momentum `u`.
#[inline]
pub fn lorentz_factor(ux: f64, uy: f64, uz: f64) -> f64 {
    (1.0 + (ux * ux + uy * uy + uz * uz) * INV_C2).sqrt()
}

/// Explicit leapfrog update
/// \\begin{equation}
///     x^{n+1} - x^n = \Delta t \frac{u^{n+1/2}}{\gamma^{n+1/2}}
/// \\end{equation}
/// where $\gamma$ is calculated from the same momentum which moves the particle.
///
/// ```
/// # use amrpic_building_blocks::pushers::update_position;
/// # use amrpic_concepts::SpaceDim;
/// let mut pos = [0.0, 0.0, 0.0];
/// update_position(&mut pos, [0.0, 0.0, 0.0], 1e-9, SpaceDim::ThreeD);
/// assert_eq!(pos, [0.0; 3]);
/// ```
#[inline]
pub fn update_position(pos: &mut [f64; 3], u: [f64; 3], dt: f64, dim: SpaceDim) {
    let inv_gamma = 1.0 / lorentz_factor(u[0], u[1], u[2]);
    advance(pos, u, inv_gamma * dt, dim);
}

/// Implicit Crank-Nicolson update
/// \\begin{equation}
///     x^{n+1} - x^n = \Delta t \frac{2 u^{n+1/2}}{\gamma^n + \gamma^{n+1}}
/// \\end{equation}
/// with $u^{n+1} = 2u^{n+1/2} - u^n$.
///
/// The averaged inverse Lorentz factor keeps the particle energy consistent with
/// implicit field solvers.
/// It must not be replaced by the single-$\gamma$ formula of [update_position].
#[inline]
pub fn update_position_implicit(
    pos: &mut [f64; 3],
    u_n: [f64; 3],
    u: [f64; 3],
    dt: f64,
    dim: SpaceDim,
) {
    let u_np1 = [2.0 * u[0] - u_n[0], 2.0 * u[1] - u_n[1], 2.0 * u[2] - u_n[2]];
    let gamma_n = lorentz_factor(u_n[0], u_n[1], u_n[2]);
    let gamma_np1 = lorentz_factor(u_np1[0], u_np1[1], u_np1[2]);
    let inv_gamma = 2.0 / (gamma_n + gamma_np1);
    advance(pos, u, inv_gamma * dt, dim);
}

#[inline(always)]
fn advance(pos: &mut [f64; 3], u: [f64; 3], factor: f64, dim: SpaceDim) {
    let active = dim.active_axes();
    for i in 0..3 {
        if active[i] {
            pos[i] += u[i] * factor;
        }
    }
}

/// Integration rule used to advance particle positions.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub enum PushScheme {
    /// See [update_position].
    #[default]
    Explicit,
    /// See [update_position_implicit].
    /// Requires the momentum at the previous full step.
    Implicit,
}
