//! Input-to-configuration conversion layer.
//!
//! One [`convert`] call maps an input datum plus the schemas describing it
//! to an immutable [`ConfigFragment`]: the derived geometry blocks, the data
//! payload (inline rows or a side-car file reference), and the plot-setup
//! contribution. Fragments are merged upward by the view and plot layers;
//! nothing in here mutates shared state.
//!
//! Supported (input, target) combinations are enumerated in one dispatch
//! table; anything unmapped is rejected explicitly.

mod geometry;
mod molecular;
mod sink;
mod table;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::{AxisValues, DataPayload, LatticeVectors, PlotSetup};
use crate::error::AtomlensError;
use crate::schema::{FramedSchema, MolecularSchema, SpatiallyResolvedSchema};
use crate::structure::{Lattice, StructureSnapshot, StructureTrajectory, TabularArray};

pub(crate) use geometry::derive_geometry;
pub(crate) use sink::RowSink;

/// An input datum for conversion, dispatched by variant.
#[derive(Debug, Clone, PartialEq)]
pub enum DataInput {
    /// A single structure snapshot.
    Snapshot(StructureSnapshot),
    /// An ordered multi-frame trajectory.
    Trajectory(StructureTrajectory),
    /// A raw tabular array with out-of-band geometry.
    Table(TabularArray),
    /// A pre-existing data file, referenced without transformation.
    File(PathBuf),
}

impl DataInput {
    /// Short name of the input variant, used in diagnostics.
    pub(crate) fn tag(&self) -> &'static str {
        match self {
            Self::Snapshot(_) => "snapshot",
            Self::Trajectory(_) => "trajectory",
            Self::Table(_) => "tabular array",
            Self::File(_) => "file",
        }
    }
}

impl From<StructureSnapshot> for DataInput {
    fn from(snapshot: StructureSnapshot) -> Self {
        Self::Snapshot(snapshot)
    }
}

impl From<StructureTrajectory> for DataInput {
    fn from(trajectory: StructureTrajectory) -> Self {
        Self::Trajectory(trajectory)
    }
}

impl From<TabularArray> for DataInput {
    fn from(table: TabularArray) -> Self {
        Self::Table(table)
    }
}

impl From<PathBuf> for DataInput {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

impl From<&Path> for DataInput {
    fn from(path: &Path) -> Self {
        Self::File(path.to_path_buf())
    }
}

/// Target data format of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Discrete per-atom molecular data.
    Molecular,
    /// Volumetric/grid-sampled scalar field data.
    SpatiallyResolved,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Molecular => f.write_str("molecular"),
            Self::SpatiallyResolved => f.write_str("spatially resolved"),
        }
    }
}

/// Geometry blocks derived from a lattice matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Geometry {
    /// Row-wise Euclidean lengths of the lattice vectors.
    pub dimension: AxisValues,
    /// Lattice matrix with each row normalized to unit length.
    pub lattice_vectors: LatticeVectors,
}

/// The unit produced per conversion and merged upward.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ConfigFragment {
    /// Derived geometry, when the input carried a lattice.
    pub geometry: Option<Geometry>,
    /// Per-entity data, inline or externalized.
    pub payload: DataPayload,
    /// Plot-setup contribution of the schemas used.
    pub plot_setup: PlotSetup,
}

/// The schema governing a conversion's columns.
#[derive(Debug, Clone, Copy)]
pub(crate) enum SchemaRef<'a> {
    Molecular(&'a MolecularSchema),
    SpatiallyResolved(&'a SpatiallyResolvedSchema),
}

impl SchemaRef<'_> {
    /// Declared columns with the species column appended if absent.
    fn property_list(&self) -> Vec<String> {
        match self {
            Self::Molecular(schema) => schema.property_list(),
            Self::SpatiallyResolved(schema) => schema.property_list(),
        }
    }

    /// Declared columns, in order, without the appended species column.
    fn declared_columns(&self) -> &[String] {
        match self {
            Self::Molecular(schema) => schema.columns(),
            Self::SpatiallyResolved(schema) => schema.columns(),
        }
    }
}

/// One conversion request: the input, the target format, the governing
/// schemas, and the out-of-band data a tabular input needs.
pub(crate) struct Conversion<'a> {
    pub input: &'a DataInput,
    pub target: TargetKind,
    pub schema: SchemaRef<'a>,
    pub framed: Option<&'a FramedSchema>,
    /// Per-row species labels for tabular input.
    pub species: Option<&'a [String]>,
    /// Cell matrix for tabular input.
    pub lattice: Option<&'a Lattice>,
    /// When set, rows are streamed to this file instead of inlined.
    pub output_file: Option<&'a Path>,
}

impl Conversion<'_> {
    /// Plot-setup contribution of the schemas driving this conversion.
    fn plot_setup(&self) -> PlotSetup {
        let mut setup = PlotSetup::default();
        match self.schema {
            SchemaRef::Molecular(schema) => schema.apply_plot_setup(&mut setup),
            SchemaRef::SpatiallyResolved(schema) => schema.apply_plot_setup(&mut setup),
        }
        if let Some(framed) = self.framed {
            framed.apply_plot_setup(&mut setup);
        }
        setup
    }
}

/// Convert one input into a [`ConfigFragment`].
///
/// The dispatch table over (input variant, target format); unmapped
/// combinations fail with [`AtomlensError::UnsupportedConversion`].
pub(crate) fn convert(request: &Conversion<'_>) -> Result<ConfigFragment, AtomlensError> {
    match (request.input, request.target) {
        (DataInput::Snapshot(snapshot), TargetKind::Molecular) => {
            molecular::convert_snapshot(snapshot, request)
        }
        (DataInput::Trajectory(trajectory), TargetKind::Molecular) => {
            molecular::convert_trajectory(trajectory, request)
        }
        (DataInput::Table(array), TargetKind::Molecular) => table::convert_table(array, request),
        (DataInput::File(path), _) => convert_file(path, request),
        (input, target) => Err(AtomlensError::UnsupportedConversion {
            input: input.tag(),
            target,
        }),
    }
}

/// Reference a pre-existing data file: no transformation, the fragment
/// carries the file's absolute path and no geometry.
fn convert_file(path: &Path, request: &Conversion<'_>) -> Result<ConfigFragment, AtomlensError> {
    let _ = std::fs::metadata(path).map_err(|e| AtomlensError::io(path, e))?;
    Ok(ConfigFragment {
        geometry: None,
        payload: DataPayload::File(sink::portable_absolute(path)?),
        plot_setup: request.plot_setup(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn molecular_schema() -> MolecularSchema {
        MolecularSchema::new(["x", "y", "z", "atom"]).unwrap()
    }

    #[test]
    fn trajectory_to_spatially_resolved_is_rejected() {
        let spatial = SpatiallyResolvedSchema::default();
        let input = DataInput::Trajectory(StructureTrajectory::new(vec![]));
        let err = convert(&Conversion {
            input: &input,
            target: TargetKind::SpatiallyResolved,
            schema: SchemaRef::SpatiallyResolved(&spatial),
            framed: None,
            species: None,
            lattice: None,
            output_file: None,
        })
        .unwrap_err();
        assert!(matches!(
            err,
            AtomlensError::UnsupportedConversion {
                input: "trajectory",
                target: TargetKind::SpatiallyResolved,
            }
        ));
    }

    #[test]
    fn table_to_spatially_resolved_is_rejected() {
        let spatial = SpatiallyResolvedSchema::default();
        let input = DataInput::Table(TabularArray::from_rows(vec![]).unwrap());
        let err = convert(&Conversion {
            input: &input,
            target: TargetKind::SpatiallyResolved,
            schema: SchemaRef::SpatiallyResolved(&spatial),
            framed: None,
            species: None,
            lattice: None,
            output_file: None,
        })
        .unwrap_err();
        assert!(matches!(err, AtomlensError::UnsupportedConversion { .. }));
    }

    #[test]
    fn missing_input_file_is_an_io_error() {
        let schema = molecular_schema();
        let input = DataInput::File(PathBuf::from("/definitely/not/here.csv"));
        let err = convert(&Conversion {
            input: &input,
            target: TargetKind::Molecular,
            schema: SchemaRef::Molecular(&schema),
            framed: None,
            species: None,
            lattice: None,
            output_file: None,
        })
        .unwrap_err();
        assert!(matches!(err, AtomlensError::Io { .. }));
    }

    #[test]
    fn existing_file_passes_through_as_absolute_reference() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.csv");
        std::fs::write(&path, "x,y,z,atom\n").unwrap();

        let schema = molecular_schema();
        let input = DataInput::File(path.clone());
        let fragment = convert(&Conversion {
            input: &input,
            target: TargetKind::Molecular,
            schema: SchemaRef::Molecular(&schema),
            framed: None,
            species: None,
            lattice: None,
            output_file: None,
        })
        .unwrap();

        assert!(fragment.geometry.is_none());
        let DataPayload::File(reference) = fragment.payload else {
            unreachable!("file input must not inline rows")
        };
        assert!(reference.ends_with("rows.csv"));
        assert!(!reference.contains('\\'));
        assert!(fragment.plot_setup.molecule_property_list.is_some());
    }
}
