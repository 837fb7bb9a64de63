// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::str_to_string)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Configuration producer for browser-based 3D visualization of atomistic
//! simulation data.
//!
//! Atomlens converts simulation inputs — structure snapshots, multi-frame
//! trajectories, raw tabular arrays, pre-existing data files — into the
//! JSON configuration document (plus optional delimited side-car files) a
//! browser-based visualizer consumes, and can drive an embedded browser
//! window to display it.
//!
//! # Key entry points
//!
//! - [`Plot`] - the top-level aggregate; builds, saves, and renders the
//!   configuration document
//! - [`ThreeDView`] / [`TwoDHeatmap`] - views added to a plot
//! - [`MolecularSchema`] / [`SpatiallyResolvedSchema`] / [`FramedSchema`] -
//!   user-declared property schemas validated at construction
//! - `BrowserShell` (feature `gui`) - embedded browser window implementing
//!   [`RenderShell`]
//!
//! # Architecture
//!
//! Data flows leaf to root: an input is converted against its schema into an
//! immutable fragment (geometry blocks, data payload, plot-setup
//! contribution), a view merges its fragments under shared spatial
//! metadata, and the plot concatenates view configurations and folds the
//! plot setups into one [`Document`]. Bulk per-row data is either inlined
//! into the document or streamed to a delimited side-car file — never both.

pub mod config;
pub mod convert;
pub mod error;
pub mod plot;
pub mod schema;
pub mod shell;
pub mod structure;
pub mod view;

pub use config::{
    AxisValues, CellValue, DataPayload, DataRow, Document, GridPoints, JsonMap, LatticeVectors,
    PlotSetup, SpatiallyResolvedBlock, ViewConfig,
};
pub use convert::{DataInput, TargetKind};
pub use error::AtomlensError;
pub use plot::{Plot, PlotSchemas};
pub use schema::{FramedSchema, MolecularSchema, SpatiallyResolvedSchema};
#[cfg(feature = "gui")]
pub use shell::BrowserShell;
pub use shell::RenderShell;
pub use structure::{Atom, Lattice, StructureSnapshot, StructureTrajectory, TabularArray};
pub use view::{MolecularData, PlotView, SpatiallyResolvedData, ThreeDView, TwoDHeatmap};
