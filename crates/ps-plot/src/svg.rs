//! SVG output through plotters.

use std::fs;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::info;

use crate::backend::{AxesCell, AxesId, PlotBackend, SeriesHandle, SeriesLine};
use crate::error::{PlotError, PlotResult};
use crate::labels::Labels;
use crate::style::{AxisProperty, Scale, TextInterpreter};

const DEFAULT_FONT_SIZE: u32 = 14;
const LINE_WIDTH: u32 = 2;

#[derive(Debug, Clone)]
struct AxesState {
    cell: AxesCell,
    lines: Vec<SeriesLine>,
    labels: Labels,
    x_limits: Option<(f64, f64)>,
    y_limits: Option<(f64, f64)>,
    x_scale: Scale,
    y_scale: Scale,
    grid: bool,
    font_size: u32,
    legend: Option<Vec<String>>,
}

impl AxesState {
    fn new(cell: AxesCell) -> Self {
        Self {
            cell,
            lines: Vec::new(),
            labels: Labels::default(),
            x_limits: None,
            y_limits: None,
            x_scale: Scale::Linear,
            y_scale: Scale::Linear,
            grid: true,
            font_size: DEFAULT_FONT_SIZE,
            legend: None,
        }
    }

    /// Line points in plot coordinates. Log axes plot `log10` of the data
    /// and drop non-positive samples.
    fn points(&self, line: &SeriesLine) -> Vec<(f64, f64)> {
        line.x
            .iter()
            .zip(&line.y)
            .filter_map(|(&x, &y)| Some((project(x, self.x_scale)?, project(y, self.y_scale)?)))
            .collect()
    }

    fn ranges(&self) -> ((f64, f64), (f64, f64)) {
        let mut x = (f64::INFINITY, f64::NEG_INFINITY);
        let mut y = (f64::INFINITY, f64::NEG_INFINITY);
        for line in &self.lines {
            for (px, py) in self.points(line) {
                x = (x.0.min(px), x.1.max(px));
                y = (y.0.min(py), y.1.max(py));
            }
        }
        let x = self
            .x_limits
            .and_then(|(lo, hi)| Some((project(lo, self.x_scale)?, project(hi, self.x_scale)?)))
            .unwrap_or_else(|| padded(x, 0.0));
        let y = self
            .y_limits
            .and_then(|(lo, hi)| Some((project(lo, self.y_scale)?, project(hi, self.y_scale)?)))
            .unwrap_or_else(|| padded(y, 0.05));
        (x, y)
    }

    fn axis_desc(label: &str, scale: Scale) -> String {
        match scale {
            Scale::Linear => label.to_string(),
            Scale::Log => format!("log10 {label}"),
        }
    }
}

fn project(value: f64, scale: Scale) -> Option<f64> {
    let projected = match scale {
        Scale::Linear => value,
        Scale::Log if value > 0.0 => value.log10(),
        Scale::Log => return None,
    };
    projected.is_finite().then_some(projected)
}

/// Pad a data range by `fraction` of its span; widen degenerate ranges.
fn padded((lo, hi): (f64, f64), fraction: f64) -> (f64, f64) {
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let span = hi - lo;
    if span <= f64::EPSILON * lo.abs().max(hi.abs()).max(1.0) {
        let half = (lo.abs() * 0.1).max(0.5);
        return (lo - half, hi + half);
    }
    (lo - fraction * span, hi + fraction * span)
}

/// Collects axes and lines, then writes them as one SVG document.
#[derive(Debug, Clone)]
pub struct SvgBackend {
    width: u32,
    height: u32,
    axes: Vec<AxesState>,
}

impl Default for SvgBackend {
    fn default() -> Self {
        Self::new(1024, 768)
    }
}

impl SvgBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            axes: Vec::new(),
        }
    }

    pub fn axes_count(&self) -> usize {
        self.axes.len()
    }

    /// Render everything drawn so far into an SVG string.
    pub fn render_to_string(&self) -> PlotResult<String> {
        let mut buffer = String::new();
        {
            let root =
                SVGBackend::with_string(&mut buffer, (self.width, self.height)).into_drawing_area();
            root.fill(&WHITE).map_err(PlotError::backend)?;

            let (rows, cols) = self.grid();
            if rows > 0 && cols > 0 {
                let areas = root.split_evenly((rows, cols));
                for state in &self.axes {
                    let index = state.cell.row * cols + state.cell.col;
                    let area = areas.get(index).ok_or_else(|| PlotError::InvalidArg {
                        what: format!(
                            "axes cell ({}, {}) outside a {rows}x{cols} grid",
                            state.cell.row, state.cell.col
                        ),
                    })?;
                    draw_axes(area, state)?;
                }
            }
            root.present().map_err(PlotError::backend)?;
        }
        Ok(buffer)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> PlotResult<()> {
        let path = path.as_ref();
        let svg = self.render_to_string()?;
        fs::write(path, svg).map_err(PlotError::backend)?;
        info!(path = %path.display(), axes = self.axes.len(), "wrote SVG plot");
        Ok(())
    }

    fn grid(&self) -> (usize, usize) {
        self.axes.iter().fold((0, 0), |(rows, cols), state| {
            (
                rows.max(state.cell.rows).max(state.cell.row + 1),
                cols.max(state.cell.cols).max(state.cell.col + 1),
            )
        })
    }

    fn state_mut(&mut self, axes: AxesId) -> PlotResult<&mut AxesState> {
        self.axes
            .get_mut(axes.0)
            .ok_or(PlotError::UnknownAxes(axes.0))
    }
}

fn draw_axes<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    state: &AxesState,
) -> PlotResult<()> {
    let ((x0, x1), (y0, y1)) = state.ranges();
    let font = f64::from(state.font_size);

    let mut chart = ChartBuilder::on(area)
        .caption(&state.labels.title, ("sans-serif", font + 4.0))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(PlotError::backend)?;

    let mut mesh = chart.configure_mesh();
    mesh.x_desc(AxesState::axis_desc(&state.labels.xlabel, state.x_scale))
        .y_desc(AxesState::axis_desc(&state.labels.ylabel, state.y_scale))
        .label_style(("sans-serif", font));
    if !state.grid {
        mesh.disable_mesh();
    }
    mesh.draw().map_err(PlotError::backend)?;

    let legend = state.legend.as_deref().unwrap_or(&[]);
    for (i, line) in state.lines.iter().enumerate() {
        let color = RGBColor(line.color.r, line.color.g, line.color.b);
        let drawn = chart
            .draw_series(LineSeries::new(
                state.points(line),
                color.stroke_width(LINE_WIDTH),
            ))
            .map_err(PlotError::backend)?;
        if let Some(entry) = legend.get(i) {
            drawn.label(entry.as_str()).legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(LINE_WIDTH))
            });
        }
    }

    if !legend.is_empty() {
        chart
            .configure_series_labels()
            .label_font(("sans-serif", font))
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(PlotError::backend)?;
    }
    Ok(())
}

impl PlotBackend for SvgBackend {
    fn create_axes(&mut self, cell: AxesCell) -> AxesId {
        self.axes.push(AxesState::new(cell));
        AxesId(self.axes.len() - 1)
    }

    fn draw_series(&mut self, axes: AxesId, line: SeriesLine) -> PlotResult<SeriesHandle> {
        let state = self.state_mut(axes)?;
        let handle = SeriesHandle {
            axes,
            index: state.lines.len(),
            run: line.run,
            series: line.series.clone(),
        };
        state.lines.push(line);
        Ok(handle)
    }

    fn set_labels(&mut self, axes: AxesId, labels: &Labels) -> PlotResult<()> {
        self.state_mut(axes)?.labels = labels.clone();
        Ok(())
    }

    fn set_axis_property(&mut self, axes: AxesId, property: &AxisProperty) -> PlotResult<()> {
        let state = self.state_mut(axes)?;
        match *property {
            AxisProperty::XLimits { min, max } => state.x_limits = Some((min, max)),
            AxisProperty::YLimits { min, max } => state.y_limits = Some((min, max)),
            AxisProperty::XScale { scale } => state.x_scale = scale,
            AxisProperty::YScale { scale } => state.y_scale = scale,
            AxisProperty::Grid { visible } => state.grid = visible,
            AxisProperty::FontSize { size } => state.font_size = size,
        }
        Ok(())
    }

    /// SVG text is always emitted verbatim, so every interpreter renders
    /// the entries literally.
    fn set_legend(
        &mut self,
        axes: AxesId,
        entries: &[String],
        _interpreter: TextInterpreter,
    ) -> PlotResult<()> {
        self.state_mut(axes)?.legend = Some(entries.to_vec());
        Ok(())
    }
}
