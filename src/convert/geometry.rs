//! Geometry blocks derived from a lattice matrix.

use crate::config::LatticeVectors;
use crate::structure::Lattice;

use super::Geometry;

/// Derive the `systemDimension` and `systemLatticeVectors` blocks.
///
/// Dimensions are the row-wise Euclidean lengths of the lattice vectors;
/// the vectors block is the lattice with each row normalized to unit
/// length (a zero row stays zero).
pub(crate) fn derive_geometry(lattice: &Lattice) -> Geometry {
    Geometry {
        dimension: lattice.lengths().into(),
        lattice_vectors: LatticeVectors::from_rows(lattice.unit_rows()),
    }
}
