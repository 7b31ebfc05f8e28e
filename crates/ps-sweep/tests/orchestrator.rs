//! Sweep orchestration against a scripted invoker and the reference engine.

use std::cell::RefCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use proptest::prelude::*;
use ps_core::{ConfigOverrides, TimeUnit};
use ps_sim::{
    CompartmentModel, InvokeError, ModelOverrideSet, NamedSeries, OdeSimulator,
    OverrideAttribute, Quantity, RunSet, SimConfig, SimulationInvoker, TargetPath,
    TrajectoryMetadata, TrajectoryResult, Transfer,
};
use ps_sweep::{
    Spacing, SweepError, SweepOrchestrator, SweepProgressEvent, SweepRange, SweepSpecification,
    SweepStage,
};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::{Layer, registry};

fn path(s: &str) -> TargetPath {
    s.parse().expect("valid path")
}

/// Fails on chosen values, interrupts at a chosen call, and records what it
/// was handed.
#[derive(Default)]
struct ScriptedInvoker {
    fail_on: Vec<f64>,
    interrupt_at: Option<usize>,
    seen_overrides: Vec<ModelOverrideSet>,
    seen_stop_times: Vec<f64>,
}

impl SimulationInvoker for ScriptedInvoker {
    type Model = ();
    type Config = SimConfig;

    fn invoke(
        &mut self,
        _model: &(),
        config: &SimConfig,
        overrides: &ModelOverrideSet,
    ) -> Result<TrajectoryResult, InvokeError> {
        let call = self.seen_overrides.len();
        self.seen_overrides.push(overrides.clone());
        self.seen_stop_times.push(config.stop_time);

        if self.interrupt_at == Some(call) {
            return Err(InvokeError::Interrupted);
        }
        let value = overrides.iter().next().map(|o| o.value).unwrap_or(f64::NAN);
        if self.fail_on.contains(&value) {
            return Err(InvokeError::failed("integration tolerance not met"));
        }
        Ok(TrajectoryResult::new(
            vec![0.0, 1.0],
            vec![NamedSeries::new("Plasma", vec![0.0, value])],
            TrajectoryMetadata::default(),
        )
        .expect("trajectory"))
    }
}

fn dose_spec(values: Vec<f64>) -> SweepSpecification {
    SweepSpecification::new(path("GI_Tract/Drug"), values).expect("spec")
}

#[test]
fn failed_iteration_is_recorded_and_skipped() {
    let spec = dose_spec(vec![0.5, 0.72, 0.94, 1.17, 1.5]);
    let invoker = ScriptedInvoker {
        fail_on: vec![0.72],
        ..Default::default()
    };
    let mut orchestrator = SweepOrchestrator::new(invoker);

    let report = orchestrator
        .run_sweep(&(), &SimConfig::default(), &spec)
        .expect("sweep completes");

    assert_eq!(report.values(), &[0.5, 0.94, 1.17, 1.5]);
    assert_eq!(report.errored_values(), &[0.72]);
    assert_eq!(report.len(), 4);
    assert!(!report.is_complete());
    let warning = report.warning().expect("warning");
    assert_eq!(warning.errored, 1);
    assert_eq!(warning.attempted, 5);

    // Trajectory i came from value i.
    for (value, trajectory) in report.iter() {
        assert_eq!(trajectory.get("Plasma").expect("series").values()[1], value);
    }
    // Every candidate was attempted exactly once.
    assert_eq!(orchestrator.invoker().seen_overrides.len(), 5);
}

/// Counts WARN events seen by the subscriber.
struct WarnCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

fn count_warnings(values: Vec<f64>, fail_on: Vec<f64>) -> usize {
    let count = Arc::new(AtomicUsize::new(0));
    let subscriber = registry().with(WarnCounter(Arc::clone(&count)));
    let spec = dose_spec(values);
    let mut orchestrator = SweepOrchestrator::new(ScriptedInvoker {
        fail_on,
        ..Default::default()
    });

    tracing::subscriber::with_default(subscriber, || {
        orchestrator
            .run_sweep(&(), &SimConfig::default(), &spec)
            .expect("sweep completes");
    });
    count.load(Ordering::SeqCst)
}

#[test]
fn incomplete_sweep_warns_once() {
    assert_eq!(count_warnings(vec![0.5, 0.72, 0.94, 1.17, 1.5], vec![0.72, 1.17]), 1);
    assert_eq!(count_warnings(vec![0.5, 0.94], vec![]), 0);
}

#[test]
fn all_successful_sweep_has_no_warning() {
    let spec = dose_spec(vec![1.0, 2.0, 3.0]);
    let mut orchestrator = SweepOrchestrator::new(ScriptedInvoker::default());

    let report = orchestrator
        .run_sweep(&(), &SimConfig::default(), &spec)
        .expect("sweep completes");

    assert_eq!(report.values(), &[1.0, 2.0, 3.0]);
    assert!(report.errored_values().is_empty());
    assert!(report.warning().is_none());
    assert_eq!(report.runs().len(), 3);
}

#[test]
fn each_iteration_gets_a_fresh_single_entry_override_set() {
    let spec = dose_spec(vec![1.0, 2.0, 3.0]).with_attribute(OverrideAttribute::InitialValue);
    let mut orchestrator = SweepOrchestrator::new(ScriptedInvoker::default());
    orchestrator
        .run_sweep(&(), &SimConfig::default(), &spec)
        .expect("sweep completes");

    let seen = &orchestrator.invoker().seen_overrides;
    for (set, expected) in seen.iter().zip([1.0, 2.0, 3.0]) {
        assert_eq!(set.len(), 1);
        let entry = set.iter().next().expect("entry");
        assert_eq!(entry.target, path("GI_Tract/Drug"));
        assert_eq!(entry.attribute, OverrideAttribute::InitialValue);
        assert_eq!(entry.value, expected);
    }
}

#[test]
fn interrupt_aborts_remaining_iterations() {
    let spec = dose_spec(vec![1.0, 2.0, 3.0, 4.0]);
    let invoker = ScriptedInvoker {
        interrupt_at: Some(1),
        ..Default::default()
    };
    let mut orchestrator = SweepOrchestrator::new(invoker);

    let err = orchestrator
        .run_sweep(&(), &SimConfig::default(), &spec)
        .expect_err("interrupt propagates");

    match err {
        SweepError::Interrupted {
            value,
            completed,
            total,
            source,
        } => {
            assert_eq!(value, 2.0);
            assert_eq!(completed, 1);
            assert_eq!(total, 4);
            assert_eq!(source, InvokeError::Interrupted);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(orchestrator.invoker().seen_overrides.len(), 2);
}

#[test]
fn scoped_sweep_applies_then_restores_config() {
    let spec = dose_spec(vec![1.0, 2.0]);
    let mut config = SimConfig {
        stop_time: 10.0,
        ..Default::default()
    };
    let mut orchestrator = SweepOrchestrator::new(ScriptedInvoker::default());

    orchestrator
        .run_scoped_sweep(
            &(),
            &mut config,
            ConfigOverrides::new()
                .stop_time(48.0)
                .time_unit(TimeUnit::Hour)
                .unit_conversion(true),
            &spec,
            None,
        )
        .expect("sweep completes");

    assert_eq!(orchestrator.invoker().seen_stop_times, vec![48.0, 48.0]);
    assert_eq!(config.stop_time, 10.0);
    assert_eq!(config.time_unit, TimeUnit::Second);
    assert!(!config.unit_conversion);
}

#[test]
fn scoped_sweep_restores_config_after_interrupt() {
    let spec = dose_spec(vec![1.0, 2.0]);
    let mut config = SimConfig::default();
    let original = config.clone();
    let invoker = ScriptedInvoker {
        interrupt_at: Some(0),
        ..Default::default()
    };
    let mut orchestrator = SweepOrchestrator::new(invoker);

    let result = orchestrator.run_scoped_sweep(
        &(),
        &mut config,
        ConfigOverrides::new().stop_time(5.0).unit_conversion(true),
        &spec,
        None,
    );

    assert!(matches!(result, Err(SweepError::Interrupted { .. })));
    assert_eq!(orchestrator.invoker().seen_stop_times, vec![5.0]);
    assert_eq!(config, original);
}

#[test]
fn rejected_config_override_is_skipped_and_sweep_still_runs() {
    let spec = dose_spec(vec![1.0]);
    let mut config = SimConfig::default();
    let mut orchestrator = SweepOrchestrator::new(ScriptedInvoker::default());

    let report = orchestrator
        .run_scoped_sweep(
            &(),
            &mut config,
            ConfigOverrides::new().stop_time(-1.0),
            &spec,
            None,
        )
        .expect("sweep completes");

    assert_eq!(report.len(), 1);
    assert_eq!(orchestrator.invoker().seen_stop_times, vec![10.0]);
    assert_eq!(config.stop_time, 10.0);
}

#[test]
fn progress_events_follow_iteration_order() {
    let spec = dose_spec(vec![1.0, 2.0]);
    let invoker = ScriptedInvoker {
        fail_on: vec![2.0],
        ..Default::default()
    };
    let mut orchestrator = SweepOrchestrator::new(invoker);
    let events = RefCell::new(Vec::<SweepProgressEvent>::new());
    let mut cb = |e: SweepProgressEvent| events.borrow_mut().push(e);

    orchestrator
        .run_sweep_with_progress(&(), &SimConfig::default(), &spec, Some(&mut cb))
        .expect("sweep completes");

    let events = events.into_inner();
    let stages: Vec<SweepStage> = events.iter().map(|e| e.stage).collect();
    assert_eq!(
        stages,
        vec![
            SweepStage::Started,
            SweepStage::Invoking,
            SweepStage::Succeeded,
            SweepStage::Invoking,
            SweepStage::Failed,
            SweepStage::Finished,
        ]
    );
    assert_eq!(events[4].value, Some(2.0));
    assert!(events[4].message.is_some());
    assert!(events[5].message.is_some());
    assert_eq!(events[5].fraction_complete(), 1.0);
    assert!(events.iter().all(|e| e.total == 2));
}

fn oral_model() -> CompartmentModel {
    let mut model = CompartmentModel::new("oral");
    model
        .add_quantity(Quantity {
            name: "GI_Tract".to_string(),
            path: path("GI_Tract/Drug"),
            initial_value: 1.0,
        })
        .expect("gi");
    model
        .add_quantity(Quantity {
            name: "Plasma".to_string(),
            path: path("Plasma/Drug"),
            initial_value: 0.0,
        })
        .expect("plasma");
    model
        .add_transfer(Transfer {
            name: "absorption".to_string(),
            from: path("GI_Tract/Drug"),
            to: Some(path("Plasma/Drug")),
            rate: 0.02,
        })
        .expect("absorption");
    model
        .add_transfer(Transfer {
            name: "elimination".to_string(),
            from: path("Plasma/Drug"),
            to: None,
            rate: 0.005,
        })
        .expect("elimination");
    model
}

#[test]
fn dose_sweep_through_reference_engine() {
    let model = oral_model();
    let range = SweepRange {
        start: 0.5,
        end: 1.5,
        points: 5,
        spacing: Spacing::Linear,
    };
    let spec = SweepSpecification::from_range(path("GI_Tract/Drug"), &range).expect("spec");
    let mut config = SimConfig {
        stop_time: 1.0,
        step_size: 0.5,
        ..Default::default()
    };
    let mut orchestrator = SweepOrchestrator::new(OdeSimulator::new());

    let report = orchestrator
        .run_scoped_sweep(
            &model,
            &mut config,
            ConfigOverrides::new()
                .time_unit(TimeUnit::Minute)
                .unit_conversion(true),
            &spec,
            None,
        )
        .expect("sweep completes");

    assert!(report.is_complete());
    assert_eq!(report.len(), 5);
    assert_eq!(orchestrator.invoker().invocations(), 5);
    for (dose, trajectory) in report.iter() {
        let gi = trajectory.get("GI_Tract").expect("gi series");
        assert_eq!(gi.values()[0], dose);
        assert_eq!(trajectory.metadata().time_unit, Some(TimeUnit::Minute));
        assert!(trajectory.metadata().unit_conversion);
        assert!((trajectory.time().last().copied().unwrap_or_default() - 1.0).abs() < 1e-9);
    }
    // The model's own initial value is untouched.
    assert_eq!(model.quantities()[0].initial_value, 1.0);
}

proptest! {
    #[test]
    fn scanned_and_errored_partition_the_candidates(
        flags in prop::collection::vec(any::<bool>(), 1..12),
    ) {
        let values: Vec<f64> = (0..flags.len()).map(|i| i as f64 + 0.5).collect();
        let fail_on: Vec<f64> = values
            .iter()
            .zip(&flags)
            .filter(|(_, fail)| **fail)
            .map(|(v, _)| *v)
            .collect();
        let spec = dose_spec(values.clone());
        let mut orchestrator = SweepOrchestrator::new(ScriptedInvoker {
            fail_on: fail_on.clone(),
            ..Default::default()
        });

        let report = orchestrator
            .run_sweep(&(), &SimConfig::default(), &spec)
            .expect("no interrupts");

        prop_assert_eq!(report.values().len() + report.errored_values().len(), values.len());
        prop_assert_eq!(report.errored_values(), fail_on.as_slice());
        prop_assert_eq!(report.values().len(), report.trajectories().len());
        for v in report.values() {
            prop_assert!(!report.errored_values().contains(v));
        }
        prop_assert_eq!(report.warning().is_some(), !fail_on.is_empty());
    }
}
