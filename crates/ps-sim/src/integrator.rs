//! Fixed-step time integrators.

use crate::error::SimResult;
use crate::model::TransientModel;

/// Trait for time integrators.
pub trait Integrator {
    /// Advance state by one time step using the transient model.
    fn step<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> SimResult<M::State>;
}

/// Classical RK4 (Runge-Kutta 4th order) integrator.
#[derive(Clone, Debug)]
pub struct RK4;

impl Integrator for RK4 {
    fn step<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> SimResult<M::State> {
        let half = 0.5 * dt;
        let k1 = model.rhs(t, x)?;
        let x2 = offset(model, x, &k1, half);
        let k2 = model.rhs(t + half, &x2)?;
        let x3 = offset(model, x, &k2, half);
        let k3 = model.rhs(t + half, &x3)?;
        let x4 = offset(model, x, &k3, dt);
        let k4 = model.rhs(t + dt, &x4)?;

        let mid = model.add(&k2, &k3);
        let weighted = model.add(&model.add(&k1, &k4), &model.scale(&mid, 2.0));
        Ok(offset(model, x, &weighted, dt / 6.0))
    }
}

/// `x + h * slope`
fn offset<M: TransientModel>(model: &M, x: &M::State, slope: &M::State, h: f64) -> M::State {
    model.add(x, &model.scale(slope, h))
}

/// Explicit first-order Euler. One rhs evaluation per step.
#[derive(Clone, Debug)]
pub struct ForwardEuler;

impl Integrator for ForwardEuler {
    fn step<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> SimResult<M::State> {
        let slope = model.rhs(t, x)?;
        Ok(offset(model, x, &slope, dt))
    }
}
