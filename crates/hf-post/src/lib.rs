//! Post-processing service layer for stored fracture simulation runs.
//!
//! Loads snapshots from a run store, selects them by time, extracts fields,
//! samples them at points and along lines, and builds figure descriptions
//! for an external renderer.

pub mod config;
pub mod error;
pub mod fields;
pub mod figure;
pub mod loader;
pub mod sampling;
pub mod selector;

pub use config::PostConfig;
pub use error::{PostError, PostResult};
pub use fields::{EdgeSelect, FieldKind, FieldShape, cell_values, scalar_value, time_series};
pub use figure::{Figure, FigureData, Projection, plot_at_point, plot_field, plot_series, plot_slice};
pub use loader::{LoadRequest, LoadedRun, Selection, load_snapshots};
pub use sampling::{
    CellSlice, Orientation, SliceProfile, field_at_point, slice_cell_center, slice_interpolated,
    value_at_point,
};
pub use selector::{Timed, select_indices, select_snapshots};
