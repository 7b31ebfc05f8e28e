//! Drawing primitives and the in-memory recording backend.

use serde::Serialize;

use crate::error::{PlotError, PlotResult};
use crate::labels::Labels;
use crate::style::{AxisProperty, Rgb, TextInterpreter};

/// Index of an axes within one backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct AxesId(pub usize);

/// Position of an axes in a `rows x cols` grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AxesCell {
    pub row: usize,
    pub col: usize,
    pub rows: usize,
    pub cols: usize,
}

impl AxesCell {
    /// The whole canvas.
    pub const fn single() -> Self {
        Self {
            row: 0,
            col: 0,
            rows: 1,
            cols: 1,
        }
    }

    /// Cell `index` of a grid filled row by row.
    pub fn in_grid(index: usize, rows: usize, cols: usize) -> Self {
        Self {
            row: index / cols,
            col: index % cols,
            rows,
            cols,
        }
    }
}

/// One line to draw, with its color already chosen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesLine {
    pub run: usize,
    pub series: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub color: Rgb,
}

/// Returned for every drawn line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesHandle {
    pub axes: AxesId,
    pub index: usize,
    pub run: usize,
    pub series: String,
}

pub trait PlotBackend {
    fn create_axes(&mut self, cell: AxesCell) -> AxesId;

    fn draw_series(&mut self, axes: AxesId, line: SeriesLine) -> PlotResult<SeriesHandle>;

    fn set_labels(&mut self, axes: AxesId, labels: &Labels) -> PlotResult<()>;

    fn set_axis_property(&mut self, axes: AxesId, property: &AxisProperty) -> PlotResult<()>;

    /// Legend entries label the axes' lines in drawing order.
    fn set_legend(
        &mut self,
        axes: AxesId,
        entries: &[String],
        interpreter: TextInterpreter,
    ) -> PlotResult<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    CreateAxes(AxesCell),
    DrawSeries {
        axes: AxesId,
        line: SeriesLine,
    },
    SetLabels {
        axes: AxesId,
        labels: Labels,
    },
    SetAxisProperty {
        axes: AxesId,
        property: AxisProperty,
    },
    SetLegend {
        axes: AxesId,
        entries: Vec<String>,
        interpreter: TextInterpreter,
    },
}

/// Backend that records every call and draws nothing.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Vec<BackendCall>,
    axes: usize,
    lines_per_axes: Vec<usize>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    pub fn axes_count(&self) -> usize {
        self.axes
    }

    pub fn lines(&self) -> impl Iterator<Item = (AxesId, &SeriesLine)> {
        self.calls.iter().filter_map(|c| match c {
            BackendCall::DrawSeries { axes, line } => Some((*axes, line)),
            _ => None,
        })
    }

    /// Most recent legend set on `axes`.
    pub fn legend(&self, axes: AxesId) -> Option<(&[String], TextInterpreter)> {
        self.calls.iter().rev().find_map(|c| match c {
            BackendCall::SetLegend {
                axes: a,
                entries,
                interpreter,
            } if *a == axes => Some((entries.as_slice(), *interpreter)),
            _ => None,
        })
    }

    pub fn labels(&self, axes: AxesId) -> Option<&Labels> {
        self.calls.iter().rev().find_map(|c| match c {
            BackendCall::SetLabels { axes: a, labels } if *a == axes => Some(labels),
            _ => None,
        })
    }

    pub fn axis_properties(&self, axes: AxesId) -> Vec<&AxisProperty> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                BackendCall::SetAxisProperty { axes: a, property } if *a == axes => Some(property),
                _ => None,
            })
            .collect()
    }

    fn check(&self, axes: AxesId) -> PlotResult<()> {
        if axes.0 < self.axes {
            Ok(())
        } else {
            Err(PlotError::UnknownAxes(axes.0))
        }
    }
}

impl PlotBackend for RecordingBackend {
    fn create_axes(&mut self, cell: AxesCell) -> AxesId {
        self.calls.push(BackendCall::CreateAxes(cell));
        self.lines_per_axes.push(0);
        self.axes += 1;
        AxesId(self.axes - 1)
    }

    fn draw_series(&mut self, axes: AxesId, line: SeriesLine) -> PlotResult<SeriesHandle> {
        self.check(axes)?;
        let index = self.lines_per_axes[axes.0];
        self.lines_per_axes[axes.0] += 1;
        let handle = SeriesHandle {
            axes,
            index,
            run: line.run,
            series: line.series.clone(),
        };
        self.calls.push(BackendCall::DrawSeries { axes, line });
        Ok(handle)
    }

    fn set_labels(&mut self, axes: AxesId, labels: &Labels) -> PlotResult<()> {
        self.check(axes)?;
        self.calls.push(BackendCall::SetLabels {
            axes,
            labels: labels.clone(),
        });
        Ok(())
    }

    fn set_axis_property(&mut self, axes: AxesId, property: &AxisProperty) -> PlotResult<()> {
        self.check(axes)?;
        self.calls.push(BackendCall::SetAxisProperty {
            axes,
            property: property.clone(),
        });
        Ok(())
    }

    fn set_legend(
        &mut self,
        axes: AxesId,
        entries: &[String],
        interpreter: TextInterpreter,
    ) -> PlotResult<()> {
        self.check(axes)?;
        self.calls.push(BackendCall::SetLegend {
            axes,
            entries: entries.to_vec(),
            interpreter,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_cells_fill_row_major() {
        let cell = AxesCell::in_grid(4, 2, 3);
        assert_eq!((cell.row, cell.col), (1, 1));
    }

    #[test]
    fn unknown_axes_rejected() {
        let mut backend = RecordingBackend::new();
        let err = backend
            .set_labels(AxesId(0), &Labels::default())
            .unwrap_err();
        assert_eq!(err, PlotError::UnknownAxes(0));
    }

    #[test]
    fn handles_count_lines_per_axes() {
        let mut backend = RecordingBackend::new();
        let a = backend.create_axes(AxesCell::single());
        let line = SeriesLine {
            run: 0,
            series: "A".to_string(),
            x: vec![0.0],
            y: vec![1.0],
            color: Rgb::new(0, 0, 0),
        };
        let first = backend.draw_series(a, line.clone()).unwrap();
        let second = backend.draw_series(a, line).unwrap();
        assert_eq!((first.index, second.index), (0, 1));
        assert_eq!(backend.lines().count(), 2);
    }
}
