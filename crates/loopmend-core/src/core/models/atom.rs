use super::ids::ResidueId;
use nalgebra::Point3;

/// Represents an atom in a protein structure with its coordinates and
/// crystallographic attributes.
///
/// This struct encapsulates the information carried by a single coordinate
/// record of a structure file. It is deliberately lean: the preparation
/// pipeline moves and copies atoms wholesale, so only the fields that must
/// survive a read-modify-write cycle are stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The name of the atom (e.g., "CA", "N", "O").
    pub name: String,
    /// The ID of the parent residue this atom belongs to.
    pub residue_id: ResidueId,
    /// The element symbol (e.g., "C", "N", "FE"). Empty when the source file
    /// did not provide one.
    pub element: String,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
    /// The crystallographic occupancy.
    pub occupancy: f64,
    /// The isotropic temperature factor (B-factor).
    pub temp_factor: f64,
}

impl Atom {
    /// Creates a new `Atom` with default values for the crystallographic fields.
    ///
    /// This constructor initializes an atom with the provided name, residue ID,
    /// and position. Occupancy defaults to 1.0 and the temperature factor to
    /// 0.0; both can be modified afterward as needed.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the atom.
    /// * `residue_id` - The ID of the residue this atom belongs to.
    /// * `position` - The 3D coordinates of the atom.
    pub fn new(name: &str, residue_id: ResidueId, position: Point3<f64>) -> Self {
        Self {
            name: name.to_string(),
            residue_id,
            element: String::new(),
            position,
            occupancy: 1.0,
            temp_factor: 0.0,
        }
    }

    /// Sets the element symbol, consuming and returning the atom.
    ///
    /// Convenience for construction sites that know the element up front,
    /// such as the structure file parser.
    pub fn with_element(mut self, element: &str) -> Self {
        self.element = element.to_string();
        self
    }
}
