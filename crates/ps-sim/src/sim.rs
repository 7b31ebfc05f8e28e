//! Simulation runner and result recording.

use crate::config::IntegratorType;
use crate::error::{SimError, SimResult};
use crate::integrator::{ForwardEuler, Integrator, RK4};
use crate::invoker::CancelToken;
use crate::model::TransientModel;

/// Options for simulation runs, in model time.
#[derive(Clone, Debug)]
pub struct SimOptions {
    /// Fixed time step
    pub dt: f64,
    /// Final simulation time
    pub t_end: f64,
    /// Maximum number of steps (safety limit)
    pub max_steps: usize,
    /// Record every N-th step (decimation)
    pub record_every: usize,
    /// Integrator type (default: RK4)
    pub integrator: IntegratorType,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            dt: 1e-3,
            t_end: 1.0,
            max_steps: 100_000,
            record_every: 10,
            integrator: IntegratorType::default(),
        }
    }
}

/// Record of simulation results.
#[derive(Clone, Debug)]
pub struct SimRecord<S> {
    /// Time points
    pub t: Vec<f64>,
    /// State snapshots
    pub x: Vec<S>,
}

/// Run a fixed-step transient simulation up to `t_end`.
///
/// The last step is shortened so the final sample lands on `t_end`. When a
/// cancel token is supplied it is polled before every step.
pub fn run_sim<M: TransientModel>(
    model: &mut M,
    opts: &SimOptions,
    cancel: Option<&CancelToken>,
) -> SimResult<SimRecord<M::State>> {
    if !opts.dt.is_finite() || opts.dt <= 0.0 {
        return Err(SimError::InvalidArg {
            what: "dt must be positive",
        });
    }
    if !opts.t_end.is_finite() || opts.t_end < 0.0 {
        return Err(SimError::InvalidArg {
            what: "t_end must be non-negative",
        });
    }
    if opts.max_steps == 0 {
        return Err(SimError::InvalidArg {
            what: "max_steps must be positive",
        });
    }
    if opts.record_every == 0 {
        return Err(SimError::InvalidArg {
            what: "record_every must be positive",
        });
    }

    let mut t = 0.0;
    let mut x = model.initial_state();
    model.check(t, &x)?;

    let mut t_record = vec![t];
    let mut x_record = vec![x.clone()];

    // Treat anything within a tiny fraction of dt as having arrived.
    let eps = opts.dt * 1e-9;
    let mut step = 0;
    while opts.t_end - t > eps {
        if step >= opts.max_steps {
            return Err(SimError::StepLimit {
                max_steps: opts.max_steps,
                t_end: opts.t_end,
            });
        }
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(SimError::Cancelled { t });
        }

        let h = opts.dt.min(opts.t_end - t);
        x = match opts.integrator {
            IntegratorType::RK4 => RK4.step(model, t, &x, h)?,
            IntegratorType::ForwardEuler => ForwardEuler.step(model, t, &x, h)?,
        };
        t += h;
        step += 1;
        model.check(t, &x)?;

        if step % opts.record_every == 0 {
            t_record.push(t);
            x_record.push(x.clone());
        }
    }

    // Always record final state
    if step % opts.record_every != 0 {
        t_record.push(t);
        x_record.push(x);
    }

    Ok(SimRecord {
        t: t_record,
        x: x_record,
    })
}
