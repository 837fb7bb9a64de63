//! User-declared property schemas.
//!
//! A schema declares, per data kind, the ordered list of named columns the
//! visualizer should expose, and contributes the derived property lists to
//! the shared plot setup. Schemas are validated at construction and
//! immutable afterwards.

use crate::config::PlotSetup;
use crate::error::AtomlensError;

/// Columns every schema must declare.
const REQUIRED_COLUMNS: [&str; 3] = ["x", "y", "z"];

/// Column name carrying the species label; appended to derived property
/// lists when not user-declared.
pub(crate) const SPECIES_COLUMN: &str = "atom";

fn validate_columns(kind: &str, columns: &[String]) -> Result<(), AtomlensError> {
    for (i, column) in columns.iter().enumerate() {
        if columns[..i].contains(column) {
            return Err(AtomlensError::Schema(format!(
                "duplicate column '{column}' in {kind} schema"
            )));
        }
    }
    for required in REQUIRED_COLUMNS {
        if !columns.iter().any(|c| c == required) {
            return Err(AtomlensError::Schema(format!(
                "{kind} schema columns must include 'x', 'y' and 'z' (got [{}])",
                columns.join(", ")
            )));
        }
    }
    Ok(())
}

fn collect_columns<I, S>(columns: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    columns.into_iter().map(Into::into).collect()
}

/// Appends the species column if absent, preserving declared order.
fn with_species_column(columns: &[String]) -> Vec<String> {
    let mut list = columns.to_vec();
    if !list.iter().any(|c| c == SPECIES_COLUMN) {
        list.push(SPECIES_COLUMN.to_owned());
    }
    list
}

/// Ordered column declaration for per-atom molecular data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MolecularSchema {
    columns: Vec<String>,
}

impl MolecularSchema {
    /// Schema over the given columns. Columns must be unique and include
    /// `x`, `y` and `z`.
    pub fn new<I, S>(columns: I) -> Result<Self, AtomlensError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = collect_columns(columns);
        validate_columns("molecular", &columns)?;
        Ok(Self { columns })
    }

    /// Declared columns, in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Declared columns with the species column appended if absent.
    pub(crate) fn property_list(&self) -> Vec<String> {
        with_species_column(&self.columns)
    }

    pub(crate) fn apply_plot_setup(&self, setup: &mut PlotSetup) {
        setup.molecule_property_list = Some(self.property_list());
    }
}

impl Default for MolecularSchema {
    /// The minimal schema: exactly `x`, `y`, `z`.
    fn default() -> Self {
        Self {
            columns: REQUIRED_COLUMNS.map(str::to_owned).to_vec(),
        }
    }
}

/// Ordered column declaration for spatially resolved (volumetric) data,
/// with one designated density column and its clamp bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatiallyResolvedSchema {
    columns: Vec<String>,
    density_property: String,
    density_cutoff_low: f64,
    density_cutoff_up: f64,
}

impl SpatiallyResolvedSchema {
    /// Schema over the given columns. Columns must be unique, include
    /// `x`, `y` and `z`, and contain `density_property`; the clamp bounds
    /// must satisfy `low < up`.
    pub fn new<I, S>(
        columns: I,
        density_property: impl Into<String>,
        density_cutoff_low: f64,
        density_cutoff_up: f64,
    ) -> Result<Self, AtomlensError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = collect_columns(columns);
        let density_property = density_property.into();
        validate_columns("spatially resolved", &columns)?;
        if !columns.iter().any(|c| *c == density_property) {
            return Err(AtomlensError::Schema(format!(
                "density property '{density_property}' is not in the declared \
                 spatially resolved columns [{}]",
                columns.join(", ")
            )));
        }
        if density_cutoff_low >= density_cutoff_up {
            return Err(AtomlensError::Schema(format!(
                "density cutoff bounds are inverted: low ({density_cutoff_low}) \
                 must be less than up ({density_cutoff_up})"
            )));
        }
        Ok(Self {
            columns,
            density_property,
            density_cutoff_low,
            density_cutoff_up,
        })
    }

    /// Declared columns, in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The designated density column.
    #[must_use]
    pub fn density_property(&self) -> &str {
        &self.density_property
    }

    /// Lower and upper density clamp bounds.
    #[must_use]
    pub fn density_cutoffs(&self) -> (f64, f64) {
        (self.density_cutoff_low, self.density_cutoff_up)
    }

    /// Declared columns with the species column appended if absent.
    pub(crate) fn property_list(&self) -> Vec<String> {
        with_species_column(&self.columns)
    }

    pub(crate) fn apply_plot_setup(&self, setup: &mut PlotSetup) {
        setup.spatially_resolved_property_list = Some(self.property_list());
        setup.pointcloud_density = Some(self.density_property.clone());
        setup.density_cutoff_low = Some(self.density_cutoff_low);
        setup.density_cutoff_up = Some(self.density_cutoff_up);
    }
}

impl Default for SpatiallyResolvedSchema {
    /// The minimal schema: `x`, `y`, `z` plus a `rho` density column
    /// clamped to `[1e-3, 1e6]`.
    fn default() -> Self {
        Self {
            columns: vec![
                "x".to_owned(),
                "y".to_owned(),
                "z".to_owned(),
                "rho".to_owned(),
            ],
            density_property: "rho".to_owned(),
            density_cutoff_low: 1e-3,
            density_cutoff_up: 1e6,
        }
    }
}

/// Declaration of the frame-index column for multi-frame data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramedSchema {
    frame_column: String,
}

impl FramedSchema {
    /// Framed schema with the given frame column name.
    #[must_use]
    pub fn new(frame_column: impl Into<String>) -> Self {
        Self {
            frame_column: frame_column.into(),
        }
    }

    /// The declared frame column.
    #[must_use]
    pub fn frame_column(&self) -> &str {
        &self.frame_column
    }

    pub(crate) fn apply_plot_setup(&self, setup: &mut PlotSetup) {
        setup.frame_property = Some(self.frame_column.clone());
    }
}

impl Default for FramedSchema {
    /// Frame column `"frame"`.
    fn default() -> Self {
        Self {
            frame_column: "frame".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn molecular_schema_requires_xyz() {
        let err = MolecularSchema::new(["x", "y"]).unwrap_err();
        assert!(matches!(err, AtomlensError::Schema(_)));
    }

    #[test]
    fn molecular_schema_rejects_duplicates() {
        let err = MolecularSchema::new(["x", "y", "z", "x"]).unwrap_err();
        assert!(matches!(err, AtomlensError::Schema(_)));
    }

    #[test]
    fn plot_setup_gets_species_column_exactly_once() {
        let schema = MolecularSchema::new(["x", "y", "z"]).unwrap();
        let mut setup = PlotSetup::default();
        schema.apply_plot_setup(&mut setup);
        assert_eq!(
            setup.molecule_property_list.as_deref(),
            Some(["x", "y", "z", "atom"].map(str::to_owned).as_slice())
        );

        // Already-declared species column is not duplicated.
        let schema = MolecularSchema::new(["x", "y", "z", "atom"]).unwrap();
        let mut setup = PlotSetup::default();
        schema.apply_plot_setup(&mut setup);
        let list = setup.molecule_property_list.unwrap();
        assert_eq!(list.iter().filter(|c| *c == "atom").count(), 1);
    }

    #[test]
    fn spatially_resolved_schema_requires_density_column() {
        let err = SpatiallyResolvedSchema::new(["x", "y", "z"], "rho", 1e-3, 1e6).unwrap_err();
        assert!(matches!(err, AtomlensError::Schema(_)));
    }

    #[test]
    fn spatially_resolved_schema_rejects_inverted_cutoffs() {
        let err =
            SpatiallyResolvedSchema::new(["x", "y", "z", "rho"], "rho", 1e6, 1e-3).unwrap_err();
        assert!(matches!(err, AtomlensError::Schema(_)));
    }

    #[test]
    fn spatially_resolved_plot_setup_carries_density_clamp() {
        let schema =
            SpatiallyResolvedSchema::new(["x", "y", "z", "rho", "gamma"], "rho", 1e-5, 1e6)
                .unwrap();
        let mut setup = PlotSetup::default();
        schema.apply_plot_setup(&mut setup);
        assert_eq!(setup.pointcloud_density.as_deref(), Some("rho"));
        assert_eq!(setup.density_cutoff_low, Some(1e-5));
        assert_eq!(setup.density_cutoff_up, Some(1e6));
        assert_eq!(
            setup.spatially_resolved_property_list.unwrap().last().map(String::as_str),
            Some("atom")
        );
    }

    #[test]
    fn default_schemas_synthesize_required_columns() {
        assert_eq!(MolecularSchema::default().columns(), ["x", "y", "z"]);
        let spatial = SpatiallyResolvedSchema::default();
        assert_eq!(spatial.columns(), ["x", "y", "z", "rho"]);
        assert_eq!(spatial.density_property(), "rho");
        assert_eq!(FramedSchema::default().frame_column(), "frame");
    }
}
