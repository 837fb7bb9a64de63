//! Snapshot and trajectory conversion to molecular data.

use crate::config::CellValue;
use crate::error::AtomlensError;
use crate::schema::SPECIES_COLUMN;
use crate::structure::{Atom, StructureSnapshot, StructureTrajectory};

use super::{derive_geometry, ConfigFragment, Conversion, RowSink};

/// One row aligned to `columns`: coordinates, species, optionally the frame
/// index under its declared column. Declared columns with no source value
/// are left empty.
fn atom_row(columns: &[String], atom: &Atom, frame: Option<(&str, i64)>) -> Vec<CellValue> {
    columns
        .iter()
        .map(|column| match column.as_str() {
            "x" => CellValue::Float(atom.position.x),
            "y" => CellValue::Float(atom.position.y),
            "z" => CellValue::Float(atom.position.z),
            SPECIES_COLUMN => CellValue::from(atom.species.as_str()),
            name => match frame {
                Some((frame_column, index)) if name == frame_column => CellValue::Int(index),
                _ => CellValue::Text(String::new()),
            },
        })
        .collect()
}

/// Convert a single snapshot: one row per atom, geometry from its lattice.
pub(crate) fn convert_snapshot(
    snapshot: &StructureSnapshot,
    request: &Conversion<'_>,
) -> Result<ConfigFragment, AtomlensError> {
    if request.framed.is_some() {
        return Err(AtomlensError::UnsupportedConversion {
            input: "framed snapshot",
            target: request.target,
        });
    }

    let mut sink = RowSink::create(request.schema.property_list(), request.output_file)?;
    for atom in snapshot.atoms() {
        let row = atom_row(sink.columns(), atom, None);
        sink.push(row)?;
    }

    Ok(ConfigFragment {
        geometry: Some(derive_geometry(snapshot.lattice())),
        payload: sink.finish()?,
        plot_setup: request.plot_setup(),
    })
}

/// Convert a trajectory: one row per atom per frame, the frame index under
/// the declared frame column. Geometry is derived from frame 0 only; later
/// frames are assumed geometrically consistent.
pub(crate) fn convert_trajectory(
    trajectory: &StructureTrajectory,
    request: &Conversion<'_>,
) -> Result<ConfigFragment, AtomlensError> {
    let first = trajectory.first().ok_or_else(|| {
        AtomlensError::MissingAuxiliaryData(
            "trajectory contains no frames; geometry is derived from frame 0".to_owned(),
        )
    })?;

    let columns = request.schema.property_list();
    if let Some(framed) = request.framed {
        if !columns.iter().any(|c| c == framed.frame_column()) {
            return Err(AtomlensError::Schema(format!(
                "frame column '{}' is not declared in the schema columns [{}]",
                framed.frame_column(),
                columns.join(", ")
            )));
        }
    }

    let geometry = derive_geometry(first.lattice());
    let mut sink = RowSink::create(columns, request.output_file)?;
    for (index, frame) in trajectory.frames().iter().enumerate() {
        let frame_tag = request
            .framed
            .map(|f| (f.frame_column(), i64::try_from(index).unwrap_or(i64::MAX)));
        for atom in frame.atoms() {
            let row = atom_row(sink.columns(), atom, frame_tag);
            sink.push(row)?;
        }
    }

    Ok(ConfigFragment {
        geometry: Some(geometry),
        payload: sink.finish()?,
        plot_setup: request.plot_setup(),
    })
}
