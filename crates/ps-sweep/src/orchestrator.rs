//! Sequential sweep driver.

use ps_core::{AccumulatingTimer, ConfigAccess, ConfigOverrides, ScopedConfigOverride, Timer};
use ps_sim::{ModelOverrideSet, SimulationInvoker};
use tracing::{debug, info, warn};

use crate::error::{SweepError, SweepResult};
use crate::progress::{SweepProgressEvent, SweepStage};
use crate::report::ScanReport;
use crate::spec::SweepSpecification;

/// Name given to the override set built for each iteration.
const OVERRIDE_SET_NAME: &str = "sweep";

/// Drives one invocation per candidate value, strictly in order.
///
/// Each iteration gets a fresh override set holding only the current value,
/// so nothing from an earlier iteration leaks into a later one. A failed
/// iteration is recorded and skipped; an interrupt stops the sweep.
pub struct SweepOrchestrator<I> {
    invoker: I,
}

impl<I: SimulationInvoker> SweepOrchestrator<I> {
    pub fn new(invoker: I) -> Self {
        Self { invoker }
    }

    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    pub fn run_sweep(
        &mut self,
        model: &I::Model,
        config: &I::Config,
        spec: &SweepSpecification,
    ) -> SweepResult<ScanReport> {
        self.run_sweep_with_progress(model, config, spec, None)
    }

    /// Run the sweep and stream progress events to `progress_cb`.
    pub fn run_sweep_with_progress(
        &mut self,
        model: &I::Model,
        config: &I::Config,
        spec: &SweepSpecification,
        mut progress_cb: Option<&mut dyn FnMut(SweepProgressEvent)>,
    ) -> SweepResult<ScanReport> {
        if spec.is_empty() {
            return Err(SweepError::InvalidSpecification(
                "no candidate values".to_string(),
            ));
        }

        let total = spec.len();
        let wall = Timer::start();
        let mut invoke_time = AccumulatingTimer::new();
        let mut report = ScanReport::new(spec);

        info!(
            target_path = %spec.target(),
            attribute = %spec.attribute(),
            values = total,
            "starting sweep"
        );
        emit_progress(&mut progress_cb, SweepStage::Started, None, None, total, &wall, None);

        for (index, &value) in spec.values().iter().enumerate() {
            let overrides = ModelOverrideSet::single(
                OVERRIDE_SET_NAME,
                spec.target().clone(),
                spec.attribute(),
                value,
            );

            emit_progress(
                &mut progress_cb,
                SweepStage::Invoking,
                Some(index),
                Some(value),
                total,
                &wall,
                None,
            );

            let iteration = Timer::start();
            let outcome = self.invoker.invoke(model, config, &overrides);
            invoke_time.record(iteration.stop());

            match outcome {
                Ok(trajectory) => {
                    debug!(index, value, samples = trajectory.len(), "sweep iteration ok");
                    report.record_success(value, trajectory);
                    emit_progress(
                        &mut progress_cb,
                        SweepStage::Succeeded,
                        Some(index),
                        Some(value),
                        total,
                        &wall,
                        None,
                    );
                }
                Err(err) if err.is_interrupt() => {
                    info!(index, value, "sweep interrupted");
                    emit_progress(
                        &mut progress_cb,
                        SweepStage::Interrupted,
                        Some(index),
                        Some(value),
                        total,
                        &wall,
                        Some(err.to_string()),
                    );
                    return Err(SweepError::Interrupted {
                        value,
                        completed: index,
                        total,
                        source: err,
                    });
                }
                Err(err) => {
                    debug!(index, value, error = %err, "sweep iteration failed");
                    report.record_failure(value);
                    emit_progress(
                        &mut progress_cb,
                        SweepStage::Failed,
                        Some(index),
                        Some(value),
                        total,
                        &wall,
                        Some(err.to_string()),
                    );
                }
            }
        }

        let warning = report.finish();
        if let Some(warning) = warning {
            warn!(
                errored = warning.errored,
                attempted = warning.attempted,
                values = ?report.errored_values(),
                "{warning}"
            );
        }

        info!(
            runs = report.len(),
            errored = report.errored_values().len(),
            invoke_s = invoke_time.total_seconds(),
            avg_invoke_s = invoke_time.average_seconds(),
            wall_s = wall.elapsed_s(),
            "sweep finished"
        );
        emit_progress(
            &mut progress_cb,
            SweepStage::Finished,
            None,
            None,
            total,
            &wall,
            warning.map(|w| w.to_string()),
        );

        Ok(report)
    }

    /// Run the sweep with `overrides` applied to `config` for its duration.
    ///
    /// The configuration is restored before this returns, whether the sweep
    /// completes, is interrupted, or unwinds.
    pub fn run_scoped_sweep(
        &mut self,
        model: &I::Model,
        config: &mut I::Config,
        overrides: ConfigOverrides,
        spec: &SweepSpecification,
        progress_cb: Option<&mut dyn FnMut(SweepProgressEvent)>,
    ) -> SweepResult<ScanReport>
    where
        I::Config: ConfigAccess + Sized,
    {
        let scope = ScopedConfigOverride::acquire(config, overrides);
        self.run_sweep_with_progress(model, &*scope, spec, progress_cb)
    }
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(SweepProgressEvent)>,
    stage: SweepStage,
    index: Option<usize>,
    value: Option<f64>,
    total: usize,
    wall: &Timer,
    message: Option<String>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(SweepProgressEvent {
            stage,
            index,
            value,
            total,
            elapsed_wall_s: wall.elapsed_s(),
            message,
        });
    }
}
