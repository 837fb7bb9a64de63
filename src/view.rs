//! Views: one or more data sources merged under shared spatial metadata.
//!
//! A [`ThreeDView`] owns at most one molecular and one spatially resolved
//! data source plus optional user-supplied geometry. Building a view
//! configuration converts each source to a fragment and merges them;
//! user-supplied geometry wins over converter-derived geometry, which wins
//! over the defaults.

use std::path::PathBuf;

use crate::config::{
    AxisValues, GridPoints, JsonMap, LatticeVectors, PlotSetup, SpatiallyResolvedBlock, ViewConfig,
};
use crate::convert::{self, Conversion, DataInput, Geometry, SchemaRef, TargetKind};
use crate::error::AtomlensError;
use crate::plot::PlotSchemas;
use crate::structure::Lattice;

/// A molecular data source attached to a view.
#[derive(Debug, Clone, PartialEq)]
pub struct MolecularData {
    input: DataInput,
    species: Option<Vec<String>>,
    lattice: Option<Lattice>,
    output_file: Option<PathBuf>,
}

impl MolecularData {
    /// Molecular data over the given input.
    pub fn new(input: impl Into<DataInput>) -> Self {
        Self {
            input: input.into(),
            species: None,
            lattice: None,
            output_file: None,
        }
    }

    /// Per-row species labels for tabular input.
    #[must_use]
    pub fn with_species(mut self, species: Vec<String>) -> Self {
        self.species = Some(species);
        self
    }

    /// Cell matrix for tabular input.
    #[must_use]
    pub fn with_lattice(mut self, lattice: Lattice) -> Self {
        self.lattice = Some(lattice);
        self
    }

    /// Externalize rows to this file instead of inlining them into the
    /// configuration document.
    #[must_use]
    pub fn with_output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = Some(path.into());
        self
    }
}

/// A spatially resolved (volumetric) data source attached to a view.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatiallyResolvedData {
    input: DataInput,
    grid_points: Option<GridPoints>,
    grid_spacing: Option<AxisValues>,
}

impl SpatiallyResolvedData {
    /// Spatially resolved data over the given input.
    pub fn new(input: impl Into<DataInput>) -> Self {
        Self {
            input: input.into(),
            grid_points: None,
            grid_spacing: None,
        }
    }

    /// Grid point counts per axis.
    #[must_use]
    pub fn with_grid_points(mut self, points: impl Into<GridPoints>) -> Self {
        self.grid_points = Some(points.into());
        self
    }

    /// Grid spacing per axis.
    #[must_use]
    pub fn with_grid_spacing(mut self, spacing: impl Into<AxisValues>) -> Self {
        self.grid_spacing = Some(spacing.into());
        self
    }
}

/// A 3D view of molecular and/or spatially resolved data.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreeDView {
    name: String,
    dimensions: Option<AxisValues>,
    lattice_vectors: Option<LatticeVectors>,
    molecular: Option<MolecularData>,
    spatially_resolved: Option<SpatiallyResolvedData>,
}

impl ThreeDView {
    /// New view named after the system or molecule it shows.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dimensions: None,
            lattice_vectors: None,
            molecular: None,
            spatially_resolved: None,
        }
    }

    /// Explicit bounding box edge lengths, overriding derived geometry.
    #[must_use]
    pub fn with_dimensions(mut self, dimensions: impl Into<AxisValues>) -> Self {
        self.dimensions = Some(dimensions.into());
        self
    }

    /// Explicit lattice vectors, overriding derived geometry.
    #[must_use]
    pub fn with_lattice_vectors(mut self, vectors: impl Into<LatticeVectors>) -> Self {
        self.lattice_vectors = Some(vectors.into());
        self
    }

    /// Attach the molecular data source. Replaces any previous one.
    ///
    /// An output data file cannot be combined with an input that is already
    /// a file — there is nothing to externalize.
    pub fn set_molecular_data(&mut self, data: MolecularData) -> Result<(), AtomlensError> {
        if matches!(data.input, DataInput::File(_)) && data.output_file.is_some() {
            return Err(AtomlensError::InvalidOperation(
                "an output data file is not supported when the input is already a file".to_owned(),
            ));
        }
        self.molecular = Some(data);
        Ok(())
    }

    /// Attach the spatially resolved data source. Replaces any previous one.
    pub fn set_spatially_resolved_data(&mut self, data: SpatiallyResolvedData) {
        self.spatially_resolved = Some(data);
    }

    /// Build this view's configuration fragment pair.
    ///
    /// Deterministic and safe to call repeatedly: stored sources are only
    /// read, never mutated.
    pub(crate) fn configuration(
        &self,
        schemas: &PlotSchemas,
    ) -> Result<(ViewConfig, PlotSetup), AtomlensError> {
        let mut config = ViewConfig::new("3DView");
        config.molecule_name = Some(self.name.clone());
        let mut setup = PlotSetup::default();
        let mut derived: Option<Geometry> = None;

        if let Some(source) = &self.spatially_resolved {
            let schema = schemas.spatially_resolved.as_ref().ok_or_else(|| {
                AtomlensError::InvalidOperation(format!(
                    "view '{}' has spatially resolved data but the plot declares no \
                     spatially resolved schema",
                    self.name
                ))
            })?;
            let fragment = convert::convert(&Conversion {
                input: &source.input,
                target: TargetKind::SpatiallyResolved,
                schema: SchemaRef::SpatiallyResolved(schema),
                framed: schemas.framed.as_ref(),
                species: None,
                lattice: None,
                output_file: None,
            })?;
            config.spatially_resolved_data = Some(SpatiallyResolvedBlock {
                payload: Some(fragment.payload),
                num_grid_points: source.grid_points,
                grid_spacing: source.grid_spacing,
                extra: JsonMap::new(),
            });
            self.keep_first_geometry(&mut derived, fragment.geometry);
            setup.merge(fragment.plot_setup);
        }

        if let Some(source) = &self.molecular {
            let schema = schemas.molecular.as_ref().ok_or_else(|| {
                AtomlensError::InvalidOperation(format!(
                    "view '{}' has molecular data but the plot declares no molecular schema",
                    self.name
                ))
            })?;
            let fragment = convert::convert(&Conversion {
                input: &source.input,
                target: TargetKind::Molecular,
                schema: SchemaRef::Molecular(schema),
                framed: schemas.framed.as_ref(),
                species: source.species.as_deref(),
                lattice: source.lattice.as_ref(),
                output_file: source.output_file.as_deref(),
            })?;
            config.molecule_data = Some(fragment.payload);
            self.keep_first_geometry(&mut derived, fragment.geometry);
            setup.merge(fragment.plot_setup);
        }

        // Geometry priority: user-supplied, then converter-derived, then
        // the defaults.
        config.system_dimension = Some(match self.dimensions {
            Some(user) => {
                if derived.is_some() {
                    log::warn!("{}: system dimensions are overridden by user-provided values", self.name);
                }
                user
            }
            None => derived.map_or(AxisValues::uniform(10.0), |g| g.dimension),
        });
        config.system_lattice_vectors = Some(match self.lattice_vectors {
            Some(user) => {
                if derived.is_some() {
                    log::warn!("{}: system lattice vectors are overridden by user-provided values", self.name);
                }
                user
            }
            None => derived.map_or(LatticeVectors::IDENTITY, |g| g.lattice_vectors),
        });

        Ok((config, setup))
    }

    fn keep_first_geometry(&self, current: &mut Option<Geometry>, candidate: Option<Geometry>) {
        match (current.is_some(), candidate) {
            (false, Some(geometry)) => *current = Some(geometry),
            (true, Some(_)) => {
                log::warn!("{}: multiple data sources derived geometry; keeping the first", self.name);
            }
            _ => {}
        }
    }
}

/// A 2D heatmap over two properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwoDHeatmap {
    plot_x: String,
    plot_y: String,
    plot_x_transform: String,
    plot_y_transform: String,
}

impl TwoDHeatmap {
    /// Heatmap over the given axis properties and transforms.
    pub fn new(
        plot_x: impl Into<String>,
        plot_y: impl Into<String>,
        plot_x_transform: impl Into<String>,
        plot_y_transform: impl Into<String>,
    ) -> Self {
        Self {
            plot_x: plot_x.into(),
            plot_y: plot_y.into(),
            plot_x_transform: plot_x_transform.into(),
            plot_y_transform: plot_y_transform.into(),
        }
    }

    pub(crate) fn configuration(&self) -> (ViewConfig, PlotSetup) {
        let mut config = ViewConfig::new("2DHeatmap");
        config.plot_x = Some(self.plot_x.clone());
        config.plot_y = Some(self.plot_y.clone());
        config.plot_x_transform = Some(self.plot_x_transform.clone());
        config.plot_y_transform = Some(self.plot_y_transform.clone());
        (config, PlotSetup::default())
    }
}

/// Any view a plot can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum PlotView {
    /// A 3D structure/density view.
    ThreeD(ThreeDView),
    /// A 2D heatmap view.
    Heatmap(TwoDHeatmap),
}

impl PlotView {
    pub(crate) fn configuration(
        &self,
        schemas: &PlotSchemas,
    ) -> Result<(ViewConfig, PlotSetup), AtomlensError> {
        match self {
            Self::ThreeD(view) => view.configuration(schemas),
            Self::Heatmap(view) => Ok(view.configuration()),
        }
    }
}

impl From<ThreeDView> for PlotView {
    fn from(view: ThreeDView) -> Self {
        Self::ThreeD(view)
    }
}

impl From<TwoDHeatmap> for PlotView {
    fn from(view: TwoDHeatmap) -> Self {
        Self::Heatmap(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DataPayload;
    use crate::schema::{MolecularSchema, SpatiallyResolvedSchema};
    use crate::structure::{Atom, Lattice, StructureSnapshot};

    fn molecular_schemas() -> PlotSchemas {
        PlotSchemas::default()
            .with_molecular(MolecularSchema::new(["x", "y", "z", "atom"]).unwrap())
    }

    fn snapshot() -> StructureSnapshot {
        StructureSnapshot::new(vec![Atom::new([1.0, 2.0, 3.0], "Cu")], Lattice::cubic(4.0))
    }

    #[test]
    fn file_source_gets_default_geometry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("atoms.csv");
        std::fs::write(&path, "x,y,z,atom\n").unwrap();

        let mut view = ThreeDView::new("Cu");
        view.set_molecular_data(MolecularData::new(path.as_path())).unwrap();

        let (config, _) = view.configuration(&molecular_schemas()).unwrap();
        assert_eq!(config.system_dimension, Some(AxisValues::uniform(10.0)));
        assert_eq!(config.system_lattice_vectors, Some(LatticeVectors::IDENTITY));
        assert!(matches!(config.molecule_data, Some(DataPayload::File(_))));
    }

    #[test]
    fn user_geometry_wins_over_derived() {
        let mut view = ThreeDView::new("Cu").with_dimensions([5.0, 6.0, 7.0]);
        view.set_molecular_data(MolecularData::new(snapshot())).unwrap();

        let (config, _) = view.configuration(&molecular_schemas()).unwrap();
        assert_eq!(
            config.system_dimension,
            Some(AxisValues { x: 5.0, y: 6.0, z: 7.0 })
        );
        // Lattice vectors were not overridden, so the derived ones stay.
        assert_eq!(config.system_lattice_vectors, Some(LatticeVectors::IDENTITY));
    }

    #[test]
    fn derived_geometry_fills_both_blocks() {
        let mut view = ThreeDView::new("Cu");
        view.set_molecular_data(MolecularData::new(snapshot())).unwrap();

        let (config, _) = view.configuration(&molecular_schemas()).unwrap();
        assert_eq!(config.system_dimension, Some(AxisValues::uniform(4.0)));
        assert_eq!(config.molecule_name.as_deref(), Some("Cu"));
    }

    #[test]
    fn output_file_with_file_input_is_rejected() {
        let mut view = ThreeDView::new("Cu");
        let data = MolecularData::new(std::path::Path::new("existing.csv"))
            .with_output_file("copy.csv");
        let err = view.set_molecular_data(data).unwrap_err();
        assert!(matches!(err, AtomlensError::InvalidOperation(_)));
    }

    #[test]
    fn missing_molecular_schema_is_rejected() {
        let mut view = ThreeDView::new("Cu");
        view.set_molecular_data(MolecularData::new(snapshot())).unwrap();

        let err = view.configuration(&PlotSchemas::default().with_spatially_resolved(
            SpatiallyResolvedSchema::default(),
        ))
        .unwrap_err();
        assert!(matches!(err, AtomlensError::InvalidOperation(_)));
    }

    #[test]
    fn spatially_resolved_block_carries_payload_and_grid_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rho.csv");
        std::fs::write(&path, "x,y,z,rho\n").unwrap();

        let mut view = ThreeDView::new("C6H6");
        view.set_spatially_resolved_data(
            SpatiallyResolvedData::new(path.as_path())
                .with_grid_points([30, 30, 30])
                .with_grid_spacing([0.4, 0.3, 0.3]),
        );

        let schemas =
            PlotSchemas::default().with_spatially_resolved(SpatiallyResolvedSchema::default());
        let (config, setup) = view.configuration(&schemas).unwrap();

        let block = config.spatially_resolved_data.unwrap();
        assert!(matches!(block.payload, Some(DataPayload::File(_))));
        assert_eq!(block.num_grid_points, Some([30, 30, 30].into()));
        assert_eq!(setup.pointcloud_density.as_deref(), Some("rho"));
    }

    #[test]
    fn configuration_is_idempotent() {
        let mut view = ThreeDView::new("Cu");
        view.set_molecular_data(MolecularData::new(snapshot())).unwrap();

        let schemas = molecular_schemas();
        let first = view.configuration(&schemas).unwrap();
        let second = view.configuration(&schemas).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn heatmap_configuration_shape() {
        let view = TwoDHeatmap::new("x", "rho", "linear", "log");
        let (config, setup) = view.configuration();
        assert_eq!(config.view_type, "2DHeatmap");
        assert_eq!(config.plot_x.as_deref(), Some("x"));
        assert_eq!(config.plot_y_transform.as_deref(), Some("log"));
        assert_eq!(setup, PlotSetup::default());
    }
}
