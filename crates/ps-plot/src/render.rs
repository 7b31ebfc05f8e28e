//! Multi-run layout strategies and the single-run drawing primitive.

use ps_sim::TrajectoryResult;
use tracing::trace;

use crate::backend::{AxesCell, AxesId, PlotBackend, SeriesHandle, SeriesLine};
use crate::error::{DataSelectionError, PlotResult};
use crate::style::{Palette, Rgb};

/// Axes created by a renderer and the lines drawn on them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub axes: Vec<AxesId>,
    pub handles: Vec<SeriesHandle>,
}

pub trait RunRenderer {
    fn render(
        &self,
        backend: &mut dyn PlotBackend,
        runs: &[TrajectoryResult],
        series: &[String],
        palette: &Palette,
    ) -> PlotResult<Rendered>;
}

/// Draw `series` of one run on `axes`. `color_of` maps the series position
/// within the selection to its line color.
pub fn draw_run(
    backend: &mut dyn PlotBackend,
    axes: AxesId,
    run: usize,
    trajectory: &TrajectoryResult,
    series: &[String],
    color_of: impl Fn(usize) -> Rgb,
) -> PlotResult<Vec<SeriesHandle>> {
    if trajectory.is_empty() {
        return Err(DataSelectionError::EmptyRun { run }.into());
    }

    let mut columns = Vec::with_capacity(series.len());
    for name in series {
        let column = trajectory
            .get(name)
            .ok_or_else(|| DataSelectionError::MissingSeries {
                name: name.clone(),
                run,
            })?;
        columns.push(column);
    }
    if columns.is_empty() {
        return Err(DataSelectionError::EmptySelection.into());
    }

    let mut handles = Vec::with_capacity(columns.len());
    for (i, column) in columns.into_iter().enumerate() {
        let color = color_of(i);
        trace!(run, series = column.name(), %color, "drawing series");
        handles.push(backend.draw_series(
            axes,
            SeriesLine {
                run,
                series: column.name().to_string(),
                x: trajectory.time().to_vec(),
                y: column.values().to_vec(),
                color,
            },
        )?);
    }
    Ok(handles)
}

/// All runs on one axes.
///
/// With a single selected series each run gets its own palette color so the
/// runs can be told apart. With several series the colors restart at the
/// first palette entry for every run.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlayRenderer;

impl RunRenderer for OverlayRenderer {
    fn render(
        &self,
        backend: &mut dyn PlotBackend,
        runs: &[TrajectoryResult],
        series: &[String],
        palette: &Palette,
    ) -> PlotResult<Rendered> {
        let axes = backend.create_axes(AxesCell::single());
        let mut handles = Vec::new();
        for (run, trajectory) in runs.iter().enumerate() {
            let drawn = if series.len() == 1 {
                draw_run(backend, axes, run, trajectory, series, |_| palette.color(run))?
            } else {
                draw_run(backend, axes, run, trajectory, series, |i| palette.color(i))?
            };
            handles.extend(drawn);
        }
        Ok(Rendered {
            axes: vec![axes],
            handles,
        })
    }
}

/// One axes per run, laid out in a near-square grid.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrellisRenderer;

impl TrellisRenderer {
    /// `(rows, cols)` for `n` cells.
    pub fn grid(n: usize) -> (usize, usize) {
        if n == 0 {
            return (0, 0);
        }
        let mut cols = (n as f64).sqrt().ceil() as usize;
        // Guard against sqrt rounding below an exact square root.
        while cols * cols < n {
            cols += 1;
        }
        let rows = n.div_ceil(cols);
        (rows, cols)
    }
}

impl RunRenderer for TrellisRenderer {
    fn render(
        &self,
        backend: &mut dyn PlotBackend,
        runs: &[TrajectoryResult],
        series: &[String],
        palette: &Palette,
    ) -> PlotResult<Rendered> {
        let (rows, cols) = Self::grid(runs.len());
        let mut rendered = Rendered::default();
        for (run, trajectory) in runs.iter().enumerate() {
            let axes = backend.create_axes(AxesCell::in_grid(run, rows, cols));
            let drawn = draw_run(backend, axes, run, trajectory, series, |i| palette.color(i))?;
            rendered.axes.push(axes);
            rendered.handles.extend(drawn);
        }
        Ok(rendered)
    }
}
