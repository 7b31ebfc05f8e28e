//! Render entry point: picks the single-run or multi-run path.

use std::fmt;
use std::str::FromStr;

use ps_sim::{RunSet, TrajectoryResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::backend::{AxesCell, AxesId, PlotBackend, SeriesHandle};
use crate::error::{DataSelectionError, PlotError, PlotResult};
use crate::labels::{DEFAULT_Y_LABEL, LabelOverrides, LabelResolver, Labels};
use crate::render::{OverlayRenderer, RunRenderer, TrellisRenderer, draw_run};
use crate::selection::{SeriesSelection, SeriesSelector};
use crate::style::{AxisProperty, Palette, TextInterpreter};

const DEFAULT_SINGLE_TITLE: &str = "Simulation results";
const DEFAULT_SCAN_TITLE: &str = "Parameter scan";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Overlay,
    Trellis,
}

impl Layout {
    fn renderer(self) -> &'static dyn RunRenderer {
        match self {
            Layout::Overlay => &OverlayRenderer,
            Layout::Trellis => &TrellisRenderer,
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::Overlay => f.write_str("overlay"),
            Layout::Trellis => f.write_str("trellis"),
        }
    }
}

impl FromStr for Layout {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overlay" | "one axes" | "one" => Ok(Layout::Overlay),
            "trellis" | "grid" => Ok(Layout::Trellis),
            other => Err(PlotError::InvalidArg {
                what: format!("unknown layout '{other}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlotRequest {
    pub series: SeriesSelection,
    pub layout: Layout,
    pub labels: LabelOverrides,
    pub axis_properties: Vec<AxisProperty>,
    /// Per-run titles for trellis cells; missing entries fall back to `Run <n>`.
    pub run_labels: Vec<String>,
}

impl PlotRequest {
    pub fn new(series: SeriesSelection) -> Self {
        Self {
            series,
            ..Default::default()
        }
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_labels(mut self, labels: LabelOverrides) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_axis_property(mut self, property: AxisProperty) -> Self {
        self.axis_properties.push(property);
        self
    }

    pub fn with_run_labels(mut self, run_labels: Vec<String>) -> Self {
        self.run_labels = run_labels;
        self
    }

    fn run_label(&self, run: usize) -> String {
        self.run_labels
            .get(run)
            .cloned()
            .unwrap_or_else(|| format!("Run {}", run + 1))
    }
}

/// What a render call produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutput {
    pub axes: Vec<AxesId>,
    pub handles: Vec<SeriesHandle>,
    pub series: Vec<String>,
    pub labels: Labels,
    /// Legend entries, set on the single-run path only.
    pub legend: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct PlotDispatcher {
    palette: Palette,
}

impl PlotDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_palette(palette: Palette) -> Self {
        Self { palette }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Render a single trajectory or a set of runs.
    ///
    /// The selection, every run and every axis property are checked before
    /// the first backend call, so a failing request leaves the backend
    /// untouched.
    pub fn render<R: RunSet + ?Sized>(
        &self,
        backend: &mut dyn PlotBackend,
        data: &R,
        request: &PlotRequest,
    ) -> PlotResult<RenderOutput> {
        let runs = data.runs();
        let series = SeriesSelector::resolve_runs(runs, &request.series)?;
        if let Some(run) = runs.iter().position(TrajectoryResult::is_empty) {
            return Err(DataSelectionError::EmptyRun { run }.into());
        }
        AxisProperty::validate_all(&request.axis_properties)?;

        let xlabel = LabelResolver::infer_time_label(runs);
        debug!(runs = runs.len(), series = ?series, layout = %request.layout, "rendering");

        let output = if let [trajectory] = runs {
            self.render_single(backend, trajectory, series, &xlabel, request)?
        } else {
            self.render_multi(backend, runs, series, &xlabel, request)?
        };

        for &axes in &output.axes {
            for property in &request.axis_properties {
                backend.set_axis_property(axes, property)?;
            }
        }

        info!(
            axes = output.axes.len(),
            lines = output.handles.len(),
            "plot rendered"
        );
        Ok(output)
    }

    fn render_single(
        &self,
        backend: &mut dyn PlotBackend,
        trajectory: &TrajectoryResult,
        series: Vec<String>,
        xlabel: &str,
        request: &PlotRequest,
    ) -> PlotResult<RenderOutput> {
        let axes = backend.create_axes(AxesCell::single());
        let handles = draw_run(backend, axes, 0, trajectory, &series, |i| {
            self.palette.color(i)
        })?;

        let name = trajectory.metadata().name.as_str();
        let default_title = if name.is_empty() {
            DEFAULT_SINGLE_TITLE
        } else {
            name
        };
        let labels = LabelResolver::resolve(&request.labels, default_title, xlabel, DEFAULT_Y_LABEL);
        backend.set_labels(axes, &labels)?;

        // Resolved names double as legend entries: for a named request these
        // are exactly the requested names in request order.
        backend.set_legend(axes, &series, TextInterpreter::Literal)?;

        Ok(RenderOutput {
            axes: vec![axes],
            handles,
            legend: Some(series.clone()),
            series,
            labels,
        })
    }

    fn render_multi(
        &self,
        backend: &mut dyn PlotBackend,
        runs: &[TrajectoryResult],
        series: Vec<String>,
        xlabel: &str,
        request: &PlotRequest,
    ) -> PlotResult<RenderOutput> {
        let rendered = request
            .layout
            .renderer()
            .render(backend, runs, &series, &self.palette)?;

        let labels =
            LabelResolver::resolve(&request.labels, DEFAULT_SCAN_TITLE, xlabel, DEFAULT_Y_LABEL);
        match request.layout {
            Layout::Overlay => {
                for &axes in &rendered.axes {
                    backend.set_labels(axes, &labels)?;
                }
            }
            Layout::Trellis => {
                for (run, &axes) in rendered.axes.iter().enumerate() {
                    let cell = Labels {
                        title: request.run_label(run),
                        ..labels.clone()
                    };
                    backend.set_labels(axes, &cell)?;
                }
            }
        }

        Ok(RenderOutput {
            axes: rendered.axes,
            handles: rendered.handles,
            series,
            labels,
            legend: None,
        })
    }
}
