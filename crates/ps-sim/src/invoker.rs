//! The seam between the sweep and a simulation engine.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::compartment::CompartmentModel;
use crate::config::SimConfig;
use crate::error::InvokeError;
use crate::overrides::ModelOverrideSet;
use crate::sim::{SimOptions, run_sim};
use crate::trajectory::{NamedSeries, TrajectoryMetadata, TrajectoryResult};

/// Executes one simulation of `model` under `config` with `overrides`
/// applied. Blocks until the trajectory is available.
///
/// Implementations report cancellation as [`InvokeError::Interrupted`]; every
/// other failure is treated as a per-iteration failure by the sweep.
pub trait SimulationInvoker {
    type Model: ?Sized;
    type Config: ?Sized;

    fn invoke(
        &mut self,
        model: &Self::Model,
        config: &Self::Config,
        overrides: &ModelOverrideSet,
    ) -> Result<TrajectoryResult, InvokeError>;
}

impl<T: SimulationInvoker + ?Sized> SimulationInvoker for &mut T {
    type Model = T::Model;
    type Config = T::Config;

    fn invoke(
        &mut self,
        model: &Self::Model,
        config: &Self::Config,
        overrides: &ModelOverrideSet,
    ) -> Result<TrajectoryResult, InvokeError> {
        (**self).invoke(model, config, overrides)
    }
}

/// Shared flag used to interrupt a running simulation from another thread
/// or a signal handler.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Fixed-step ODE engine for [`CompartmentModel`]s.
#[derive(Debug, Default)]
pub struct OdeSimulator {
    cancel: Option<CancelToken>,
    invocations: usize,
}

impl OdeSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancel_token(token: CancelToken) -> Self {
        Self {
            cancel: Some(token),
            invocations: 0,
        }
    }

    /// Number of invocations started so far, including failed ones.
    pub fn invocations(&self) -> usize {
        self.invocations
    }
}

impl SimulationInvoker for OdeSimulator {
    type Model = CompartmentModel;
    type Config = SimConfig;

    fn invoke(
        &mut self,
        model: &CompartmentModel,
        config: &SimConfig,
        overrides: &ModelOverrideSet,
    ) -> Result<TrajectoryResult, InvokeError> {
        self.invocations += 1;
        let mut dynamics = model.instantiate(overrides)?;

        let (t_end, dt) = config.model_time_span();
        let opts = SimOptions {
            dt,
            t_end,
            max_steps: config.max_steps,
            record_every: config.record_every,
            integrator: config.integrator,
        };
        debug!(
            model = model.name(),
            overrides = overrides.name(),
            t_end,
            dt,
            "simulating"
        );
        let record = run_sim(&mut dynamics, &opts, self.cancel.as_ref())?;

        let time = record.t.iter().map(|t| config.report_time(*t)).collect();
        let series = model
            .series_names()
            .enumerate()
            .map(|(i, name)| NamedSeries::new(name, record.x.iter().map(|x| x[i]).collect()))
            .collect();
        // Raw model time carries no unit.
        let metadata = TrajectoryMetadata {
            name: model.name().to_string(),
            time_unit: config.unit_conversion.then_some(config.time_unit),
            unit_conversion: config.unit_conversion,
        };
        Ok(TrajectoryResult::new(time, series, metadata)?)
    }
}
