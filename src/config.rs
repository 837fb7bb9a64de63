//! Serializable configuration document model.
//!
//! These types define the JSON contract consumed by the browser-side
//! visualizer: a [`Document`] of view configurations plus a shared
//! [`PlotSetup`]. Wire names are camelCase. Unknown keys encountered when
//! replaying an externally authored document are captured in `extra` maps so
//! a replayed document round-trips losslessly.

use glam::DVec3;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Captured unknown keys of a replayed document node.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// One ordered column-name → cell-value record of per-entity data.
pub type DataRow = IndexMap<String, CellValue>;

/// A single cell of per-entity data.
///
/// Integers are kept distinct from floats so frame indices serialize without
/// a decimal point; text covers species labels and declared-but-unpopulated
/// columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum CellValue {
    /// Integer value (frame index).
    Int(i64),
    /// Floating point value (coordinates, scalar properties).
    Float(f64),
    /// Text value (species label, empty placeholder).
    Text(String),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Per-axis scalar triple, e.g. `systemDimension` or `gridSpacing`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AxisValues {
    /// Value along x.
    pub x: f64,
    /// Value along y.
    pub y: f64,
    /// Value along z.
    pub z: f64,
}

impl AxisValues {
    /// The same value on every axis.
    #[must_use]
    pub fn uniform(v: f64) -> Self {
        Self { x: v, y: v, z: v }
    }
}

impl From<DVec3> for AxisValues {
    fn from(v: DVec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

impl From<[f64; 3]> for AxisValues {
    fn from(v: [f64; 3]) -> Self {
        Self {
            x: v[0],
            y: v[1],
            z: v[2],
        }
    }
}

/// Grid point counts per axis (`numGridPoints`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GridPoints {
    /// Points along x.
    pub x: u32,
    /// Points along y.
    pub y: u32,
    /// Points along z.
    pub z: u32,
}

impl From<[u32; 3]> for GridPoints {
    fn from(v: [u32; 3]) -> Self {
        Self {
            x: v[0],
            y: v[1],
            z: v[2],
        }
    }
}

/// Row-normalized lattice vectors (`systemLatticeVectors`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[allow(missing_docs)]
pub struct LatticeVectors {
    pub u11: f64,
    pub u12: f64,
    pub u13: f64,
    pub u21: f64,
    pub u22: f64,
    pub u23: f64,
    pub u31: f64,
    pub u32: f64,
    pub u33: f64,
}

impl LatticeVectors {
    /// Identity vectors (axis-aligned unit cell).
    pub const IDENTITY: Self = Self {
        u11: 1.0,
        u12: 0.0,
        u13: 0.0,
        u21: 0.0,
        u22: 1.0,
        u23: 0.0,
        u31: 0.0,
        u32: 0.0,
        u33: 1.0,
    };

    /// Vectors from three rows.
    #[must_use]
    pub fn from_rows(rows: [DVec3; 3]) -> Self {
        Self {
            u11: rows[0].x,
            u12: rows[0].y,
            u13: rows[0].z,
            u21: rows[1].x,
            u22: rows[1].y,
            u23: rows[1].z,
            u31: rows[2].x,
            u32: rows[2].y,
            u33: rows[2].z,
        }
    }
}

impl From<[[f64; 3]; 3]> for LatticeVectors {
    fn from(rows: [[f64; 3]; 3]) -> Self {
        Self::from_rows([rows[0].into(), rows[1].into(), rows[2].into()])
    }
}

/// Per-entity data, inline or externalized to a side-car file.
///
/// The two representations are mutually exclusive by construction — a view
/// node carries either a `data` array or a `dataFilename` string, never
/// both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub enum DataPayload {
    /// Rows inlined into the configuration document.
    #[serde(rename = "data")]
    Inline(Vec<DataRow>),
    /// Absolute path of the delimited side-car file holding the rows.
    #[serde(rename = "dataFilename")]
    File(String),
}

/// The `spatiallyResolvedData` node: optional data payload plus optional
/// grid metadata, merged into one object on the wire.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "SpatialBlockWire", into = "SpatialBlockWire")]
pub struct SpatiallyResolvedBlock {
    /// Data payload, when the view carries spatially resolved data rows or
    /// a data file reference.
    pub payload: Option<DataPayload>,
    /// Grid point counts per axis.
    pub num_grid_points: Option<GridPoints>,
    /// Grid spacing per axis.
    pub grid_spacing: Option<AxisValues>,
    /// Unknown keys preserved from a replayed document.
    pub extra: JsonMap,
}

/// Wire shape of [`SpatiallyResolvedBlock`]: the payload enum is spread
/// into sibling keys next to the grid metadata.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct SpatialBlockWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Vec<DataRow>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data_filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    num_grid_points: Option<GridPoints>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    grid_spacing: Option<AxisValues>,
    #[serde(flatten)]
    extra: JsonMap,
}

impl TryFrom<SpatialBlockWire> for SpatiallyResolvedBlock {
    type Error = String;

    fn try_from(wire: SpatialBlockWire) -> Result<Self, Self::Error> {
        let payload = match (wire.data, wire.data_filename) {
            (Some(_), Some(_)) => {
                return Err(
                    "spatiallyResolvedData carries both 'data' and 'dataFilename'".to_owned()
                );
            }
            (Some(rows), None) => Some(DataPayload::Inline(rows)),
            (None, Some(path)) => Some(DataPayload::File(path)),
            (None, None) => None,
        };
        Ok(Self {
            payload,
            num_grid_points: wire.num_grid_points,
            grid_spacing: wire.grid_spacing,
            extra: wire.extra,
        })
    }
}

impl From<SpatiallyResolvedBlock> for SpatialBlockWire {
    fn from(block: SpatiallyResolvedBlock) -> Self {
        let (data, data_filename) = match block.payload {
            Some(DataPayload::Inline(rows)) => (Some(rows), None),
            Some(DataPayload::File(path)) => (None, Some(path)),
            None => (None, None),
        };
        Self {
            data,
            data_filename,
            num_grid_points: block.num_grid_points,
            grid_spacing: block.grid_spacing,
            extra: block.extra,
        }
    }
}

/// Configuration of a single view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ViewConfig {
    /// View kind: `"3DView"` or `"2DHeatmap"`.
    pub view_type: String,
    /// System or molecule name shown by the visualizer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub molecule_name: Option<String>,
    /// Bounding box edge lengths.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_dimension: Option<AxisValues>,
    /// Row-normalized lattice vectors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_lattice_vectors: Option<LatticeVectors>,
    /// Per-atom molecular data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub molecule_data: Option<DataPayload>,
    /// Volumetric/grid-sampled data plus grid metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spatially_resolved_data: Option<SpatiallyResolvedBlock>,
    /// Heatmap x-axis property.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot_x: Option<String>,
    /// Heatmap y-axis property.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot_y: Option<String>,
    /// Heatmap x-axis transform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot_x_transform: Option<String>,
    /// Heatmap y-axis transform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot_y_transform: Option<String>,
    /// Unknown keys preserved from a replayed document.
    #[serde(flatten)]
    pub extra: JsonMap,
}

impl ViewConfig {
    /// Empty view configuration of the given kind.
    #[must_use]
    pub fn new(view_type: impl Into<String>) -> Self {
        Self {
            view_type: view_type.into(),
            molecule_name: None,
            system_dimension: None,
            system_lattice_vectors: None,
            molecule_data: None,
            spatially_resolved_data: None,
            plot_x: None,
            plot_y: None,
            plot_x_transform: None,
            plot_y_transform: None,
            extra: JsonMap::new(),
        }
    }
}

/// Shared plot-level setup: property lists, frame column, density clamp.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PlotSetup {
    /// Ordered molecular property names exposed to the visualizer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub molecule_property_list: Option<Vec<String>>,
    /// Column carrying the frame index for framed data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_property: Option<String>,
    /// Ordered spatially resolved property names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spatially_resolved_property_list: Option<Vec<String>>,
    /// Column rendered as point-cloud density.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pointcloud_density: Option<String>,
    /// Lower density clamp bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub density_cutoff_low: Option<f64>,
    /// Upper density clamp bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub density_cutoff_up: Option<f64>,
    /// Unknown keys preserved from a replayed document.
    #[serde(flatten)]
    pub extra: JsonMap,
}

impl PlotSetup {
    /// Merge `other` into `self`, key union with last-applied-wins: every
    /// key `other` sets overwrites the value already present.
    pub fn merge(&mut self, other: Self) {
        if other.molecule_property_list.is_some() {
            self.molecule_property_list = other.molecule_property_list;
        }
        if other.frame_property.is_some() {
            self.frame_property = other.frame_property;
        }
        if other.spatially_resolved_property_list.is_some() {
            self.spatially_resolved_property_list = other.spatially_resolved_property_list;
        }
        if other.pointcloud_density.is_some() {
            self.pointcloud_density = other.pointcloud_density;
        }
        if other.density_cutoff_low.is_some() {
            self.density_cutoff_low = other.density_cutoff_low;
        }
        if other.density_cutoff_up.is_some() {
            self.density_cutoff_up = other.density_cutoff_up;
        }
        self.extra.extend(other.extra);
    }
}

/// The complete configuration document handed to the visualizer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// View configurations, in insertion order.
    #[serde(default)]
    pub views: Vec<ViewConfig>,
    /// Shared plot-level setup.
    #[serde(default)]
    pub plot_setup: PlotSetup,
    /// Unknown top-level keys preserved from a replayed document.
    #[serde(flatten)]
    pub extra: JsonMap,
}

impl Document {
    /// Generate a JSON Schema describing the document surface.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_payload_serializes_under_data_key() {
        let mut row = DataRow::new();
        let _ = row.insert("x".to_owned(), CellValue::Float(0.5));
        let _ = row.insert("atom".to_owned(), CellValue::from("Fe"));
        let payload = DataPayload::Inline(vec![row]);

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["data"][0]["x"], 0.5);
        assert_eq!(value["data"][0]["atom"], "Fe");
        assert!(value.get("dataFilename").is_none());
    }

    #[test]
    fn file_payload_serializes_under_data_filename_key() {
        let payload = DataPayload::File("/tmp/rows.csv".to_owned());
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["dataFilename"], "/tmp/rows.csv");
        assert!(value.get("data").is_none());
    }

    #[test]
    fn spatial_block_merges_payload_and_grid_metadata() {
        let block = SpatiallyResolvedBlock {
            payload: Some(DataPayload::File("/tmp/rho.csv".to_owned())),
            num_grid_points: Some([30, 30, 30].into()),
            grid_spacing: Some([0.4, 0.3, 0.3].into()),
            extra: JsonMap::new(),
        };
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value["dataFilename"], "/tmp/rho.csv");
        assert_eq!(value["numGridPoints"]["x"], 30);
        assert_eq!(value["gridSpacing"]["z"], 0.3);

        let parsed: SpatiallyResolvedBlock = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, block);
    }

    #[test]
    fn spatial_block_rejects_both_payload_forms() {
        let raw = serde_json::json!({
            "data": [],
            "dataFilename": "/tmp/rho.csv"
        });
        assert!(serde_json::from_value::<SpatiallyResolvedBlock>(raw).is_err());
    }

    #[test]
    fn plot_setup_merge_is_last_wins() {
        let mut base = PlotSetup {
            pointcloud_density: Some("rho".to_owned()),
            density_cutoff_low: Some(1e-3),
            ..Default::default()
        };
        let other = PlotSetup {
            pointcloud_density: Some("psi".to_owned()),
            frame_property: Some("frame".to_owned()),
            ..Default::default()
        };
        base.merge(other);
        assert_eq!(base.pointcloud_density.as_deref(), Some("psi"));
        assert_eq!(base.frame_property.as_deref(), Some("frame"));
        assert_eq!(base.density_cutoff_low, Some(1e-3));
    }

    #[test]
    fn document_round_trips_with_unknown_keys() {
        let raw = serde_json::json!({
            "views": [{
                "viewType": "3DView",
                "moleculeName": "Cu",
                "futureKey": {"nested": true}
            }],
            "plotSetup": {"moleculePropertyList": ["x", "y", "z", "atom"]},
            "topLevelExtra": 7
        });
        let doc: Document = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(doc.views.len(), 1);
        assert_eq!(doc.views[0].extra["futureKey"]["nested"], true);
        assert_eq!(doc.extra["topLevelExtra"], 7);

        let back = serde_json::to_value(&doc).unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value = serde_json::to_value(Document::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();
        assert!(props.contains_key("views"));
        assert!(props.contains_key("plotSetup"));
    }
}
