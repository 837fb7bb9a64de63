//! Input data model for conversion.
//!
//! These types are the read-only inputs a caller hands to the converter
//! layer: a single structure snapshot, an ordered trajectory of snapshots,
//! or a raw tabular array with no embedded geometry. Parsing simulation
//! output files into these types is the caller's concern — atomlens only
//! consumes them.

use glam::DVec3;

use crate::error::AtomlensError;

/// One atom: a position in Cartesian space plus a species label.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Cartesian position in the cell's coordinate system.
    pub position: DVec3,
    /// Species label, e.g. `"Cu"` or `"H"`.
    pub species: String,
}

impl Atom {
    /// Atom at `position` with the given species label.
    pub fn new(position: impl Into<DVec3>, species: impl Into<String>) -> Self {
        Self {
            position: position.into(),
            species: species.into(),
        }
    }
}

/// 3x3 cell matrix of row vectors defining periodic bounding geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lattice {
    rows: [DVec3; 3],
}

impl Lattice {
    /// Identity cell (unit vectors along each axis).
    pub const IDENTITY: Self = Self {
        rows: [DVec3::X, DVec3::Y, DVec3::Z],
    };

    /// Lattice from three row vectors.
    #[must_use]
    pub fn new(rows: [[f64; 3]; 3]) -> Self {
        Self {
            rows: [rows[0].into(), rows[1].into(), rows[2].into()],
        }
    }

    /// Cubic cell with edge length `a`.
    #[must_use]
    pub fn cubic(a: f64) -> Self {
        Self {
            rows: [
                DVec3::new(a, 0.0, 0.0),
                DVec3::new(0.0, a, 0.0),
                DVec3::new(0.0, 0.0, a),
            ],
        }
    }

    /// The three row vectors.
    #[must_use]
    pub fn rows(&self) -> [DVec3; 3] {
        self.rows
    }

    /// Euclidean length of each row vector.
    #[must_use]
    pub fn lengths(&self) -> DVec3 {
        DVec3::new(
            self.rows[0].length(),
            self.rows[1].length(),
            self.rows[2].length(),
        )
    }

    /// Rows normalized to unit length. A zero row is left as zeros.
    #[must_use]
    pub fn unit_rows(&self) -> [DVec3; 3] {
        self.rows.map(|row| {
            let len = row.length();
            if len == 0.0 {
                DVec3::ZERO
            } else {
                row / len
            }
        })
    }
}

/// One static set of atoms plus the cell they live in.
///
/// Immutable once constructed: the converter layer only reads from it.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureSnapshot {
    atoms: Vec<Atom>,
    lattice: Lattice,
}

impl StructureSnapshot {
    /// Snapshot over the given atoms and cell.
    #[must_use]
    pub fn new(atoms: Vec<Atom>, lattice: Lattice) -> Self {
        Self { atoms, lattice }
    }

    /// The atom sequence, in input order.
    #[must_use]
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// The periodic cell.
    #[must_use]
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Number of atoms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    /// Whether the snapshot contains no atoms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}

/// An ordered, indexable sequence of snapshots representing simulation
/// frames. All frames are assumed to share frame 0's lattice.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureTrajectory {
    frames: Vec<StructureSnapshot>,
}

impl StructureTrajectory {
    /// Trajectory over the given frames, in simulation order.
    #[must_use]
    pub fn new(frames: Vec<StructureSnapshot>) -> Self {
        Self { frames }
    }

    /// The frame sequence.
    #[must_use]
    pub fn frames(&self) -> &[StructureSnapshot] {
        &self.frames
    }

    /// First frame, if any. Geometry is derived from this frame only.
    #[must_use]
    pub fn first(&self) -> Option<&StructureSnapshot> {
        self.frames.first()
    }

    /// Number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the trajectory contains no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// A 2D numeric matrix: rows are entities, columns are declared properties.
///
/// Carries no geometry or species labels of its own — those are supplied
/// out-of-band when the array is attached to a view.
#[derive(Debug, Clone, PartialEq)]
pub struct TabularArray {
    rows: Vec<Vec<f64>>,
    num_columns: usize,
}

impl TabularArray {
    /// Array from row vectors. All rows must have the same width.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, AtomlensError> {
        let num_columns = rows.first().map_or(0, Vec::len);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != num_columns {
                return Err(AtomlensError::InvalidOperation(format!(
                    "tabular row {i} has {} columns, expected {num_columns}",
                    row.len()
                )));
            }
        }
        Ok(Self { rows, num_columns })
    }

    /// Number of entity rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of property columns.
    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.num_columns
    }

    /// One entity row.
    #[must_use]
    pub fn row(&self, index: usize) -> &[f64] {
        &self.rows[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lattice_lengths_and_unit_rows() {
        let lattice = Lattice::new([[3.0, 4.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 1.0]]);
        let lengths = lattice.lengths();
        assert_eq!(lengths, DVec3::new(5.0, 2.0, 1.0));

        let unit = lattice.unit_rows();
        assert!((unit[0] - DVec3::new(0.6, 0.8, 0.0)).length() < 1e-12);
        assert_eq!(unit[1], DVec3::Y);
        assert_eq!(unit[2], DVec3::Z);
    }

    #[test]
    fn zero_row_normalizes_to_zero() {
        let lattice = Lattice::new([[2.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 2.0]]);
        let unit = lattice.unit_rows();
        assert_eq!(unit[1], DVec3::ZERO);
    }

    #[test]
    fn tabular_rejects_ragged_rows() {
        let err = TabularArray::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, AtomlensError::InvalidOperation(_)));
    }

    #[test]
    fn tabular_row_access() {
        let table = TabularArray::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.num_columns(), 2);
        assert_eq!(table.row(1), &[3.0, 4.0]);
    }
}
