//! ps-plot: rendering single trajectories and scan reports.
//!
//! Series selection and validation happen before anything is drawn. Drawing
//! goes through the [`PlotBackend`] primitives, so the same dispatch logic
//! drives the SVG writer and the recording backend used in tests.

pub mod backend;
pub mod dispatch;
pub mod error;
pub mod labels;
pub mod render;
pub mod selection;
pub mod style;
pub mod svg;

pub use backend::{
    AxesCell, AxesId, BackendCall, PlotBackend, RecordingBackend, SeriesHandle, SeriesLine,
};
pub use dispatch::{Layout, PlotDispatcher, PlotRequest, RenderOutput};
pub use error::{DataSelectionError, PlotError, PlotResult};
pub use labels::{LabelOverrides, LabelResolver, Labels};
pub use render::{OverlayRenderer, Rendered, RunRenderer, TrellisRenderer};
pub use selection::{SeriesSelection, SeriesSelector};
pub use style::{AxisProperty, Palette, Rgb, Scale, TextInterpreter};
pub use svg::SvgBackend;
