//! Tabular array conversion to molecular data.
//!
//! A raw array carries no geometry or species labels, so both arrive as
//! out-of-band side data on the conversion request. Schema columns are
//! looked up positionally: declared column `i` reads array column `i`.

use crate::config::CellValue;
use crate::error::AtomlensError;
use crate::schema::SPECIES_COLUMN;
use crate::structure::TabularArray;

use super::{derive_geometry, ConfigFragment, Conversion, RowSink};

pub(crate) fn convert_table(
    array: &TabularArray,
    request: &Conversion<'_>,
) -> Result<ConfigFragment, AtomlensError> {
    let lattice = request.lattice.ok_or_else(|| {
        AtomlensError::MissingAuxiliaryData(
            "tabular input carries no geometry; supply a lattice matrix alongside the data"
                .to_owned(),
        )
    })?;

    let declared = request.schema.declared_columns();
    if declared.len() > array.num_columns() {
        return Err(AtomlensError::MissingAuxiliaryData(format!(
            "declared column '{}' has no matching column in the {}-column array",
            declared[array.num_columns()],
            array.num_columns()
        )));
    }

    // Species come from the array itself when 'atom' is a declared column;
    // otherwise a parallel label list is required and appended last.
    let species = if declared.iter().any(|c| c == SPECIES_COLUMN) {
        None
    } else {
        let labels = request.species.ok_or_else(|| {
            AtomlensError::MissingAuxiliaryData(format!(
                "supply per-row species labels when '{SPECIES_COLUMN}' is not a declared column"
            ))
        })?;
        if labels.len() != array.num_rows() {
            return Err(AtomlensError::MissingAuxiliaryData(format!(
                "species label count ({}) does not match row count ({})",
                labels.len(),
                array.num_rows()
            )));
        }
        Some(labels)
    };

    let mut sink = RowSink::create(request.schema.property_list(), request.output_file)?;
    for index in 0..array.num_rows() {
        let entity = array.row(index);
        let mut row: Vec<CellValue> = entity[..declared.len()]
            .iter()
            .map(|&value| CellValue::Float(value))
            .collect();
        if let Some(labels) = species {
            row.push(CellValue::from(labels[index].as_str()));
        }
        sink.push(row)?;
    }

    Ok(ConfigFragment {
        geometry: Some(derive_geometry(lattice)),
        payload: sink.finish()?,
        plot_setup: request.plot_setup(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AxisValues, DataPayload};
    use crate::convert::{DataInput, SchemaRef, TargetKind};
    use crate::schema::MolecularSchema;
    use crate::structure::Lattice;

    fn request<'a>(
        input: &'a DataInput,
        schema: &'a MolecularSchema,
        species: Option<&'a [String]>,
        lattice: Option<&'a Lattice>,
    ) -> Conversion<'a> {
        Conversion {
            input,
            target: TargetKind::Molecular,
            schema: SchemaRef::Molecular(schema),
            framed: None,
            species,
            lattice,
            output_file: None,
        }
    }

    fn two_row_table() -> TabularArray {
        TabularArray::from_rows(vec![vec![0.0, 0.0, 0.0], vec![1.5, 1.5, 1.5]]).unwrap()
    }

    #[test]
    fn missing_lattice_is_rejected() {
        let schema = MolecularSchema::new(["x", "y", "z"]).unwrap();
        let labels = ["Fe", "Cu"].map(str::to_owned);
        let input = DataInput::Table(two_row_table());
        let DataInput::Table(array) = &input else {
            unreachable!()
        };

        let err = convert_table(array, &request(&input, &schema, Some(&labels), None)).unwrap_err();
        assert!(matches!(err, AtomlensError::MissingAuxiliaryData(_)));
    }

    #[test]
    fn missing_species_is_rejected_without_declared_atom_column() {
        let schema = MolecularSchema::new(["x", "y", "z"]).unwrap();
        let lattice = Lattice::cubic(4.0);
        let input = DataInput::Table(two_row_table());
        let DataInput::Table(array) = &input else {
            unreachable!()
        };

        let err = convert_table(array, &request(&input, &schema, None, Some(&lattice))).unwrap_err();
        assert!(matches!(err, AtomlensError::MissingAuxiliaryData(_)));
    }

    #[test]
    fn species_count_must_match_row_count() {
        let schema = MolecularSchema::new(["x", "y", "z"]).unwrap();
        let lattice = Lattice::cubic(4.0);
        let labels = ["Fe"].map(str::to_owned);
        let input = DataInput::Table(two_row_table());
        let DataInput::Table(array) = &input else {
            unreachable!()
        };

        let err = convert_table(array, &request(&input, &schema, Some(&labels), Some(&lattice)))
            .unwrap_err();
        assert!(matches!(err, AtomlensError::MissingAuxiliaryData(_)));
    }

    #[test]
    fn declared_column_beyond_array_width_is_rejected() {
        let schema = MolecularSchema::new(["x", "y", "z", "charge"]).unwrap();
        let lattice = Lattice::cubic(4.0);
        let labels = ["Fe", "Cu"].map(str::to_owned);
        let input = DataInput::Table(two_row_table());
        let DataInput::Table(array) = &input else {
            unreachable!()
        };

        let err = convert_table(array, &request(&input, &schema, Some(&labels), Some(&lattice)))
            .unwrap_err();
        let AtomlensError::MissingAuxiliaryData(message) = err else {
            unreachable!()
        };
        assert!(message.contains("charge"));
    }

    #[test]
    fn species_labels_are_appended_as_the_final_field() {
        let schema = MolecularSchema::new(["x", "y", "z"]).unwrap();
        let lattice = Lattice::cubic(4.0);
        let labels = ["Fe", "Cu"].map(str::to_owned);
        let input = DataInput::Table(two_row_table());
        let DataInput::Table(array) = &input else {
            unreachable!()
        };

        let fragment =
            convert_table(array, &request(&input, &schema, Some(&labels), Some(&lattice))).unwrap();

        assert_eq!(fragment.geometry.unwrap().dimension, AxisValues::uniform(4.0));
        let DataPayload::Inline(rows) = fragment.payload else {
            unreachable!()
        };
        assert_eq!(rows.len(), 2);
        let last_key = rows[0].keys().last().map(String::as_str);
        assert_eq!(last_key, Some("atom"));
        assert_eq!(rows[1]["atom"], CellValue::from("Cu"));
        assert_eq!(rows[1]["x"], CellValue::Float(1.5));
    }

    #[test]
    fn declared_atom_column_reads_numeric_values_positionally() {
        let schema = MolecularSchema::new(["x", "y", "z", "atom"]).unwrap();
        let lattice = Lattice::cubic(4.0);
        let array =
            TabularArray::from_rows(vec![vec![0.0, 0.0, 0.0, 26.0], vec![1.0, 1.0, 1.0, 29.0]])
                .unwrap();
        let input = DataInput::Table(array);
        let DataInput::Table(array) = &input else {
            unreachable!()
        };

        let fragment =
            convert_table(array, &request(&input, &schema, None, Some(&lattice))).unwrap();
        let DataPayload::Inline(rows) = fragment.payload else {
            unreachable!()
        };
        assert_eq!(rows[0]["atom"], CellValue::Float(26.0));
    }
}
