use super::ids::{AtomId, ChainId};
use crate::core::utils::identifiers::one_letter_code;
use std::collections::HashMap;
use std::fmt;

/// Chemical classification of a residue, partitioning the polymer from the
/// non-polymer entities that accompany it in a deposited structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResidueKind {
    /// Part of the polypeptide chain.
    Polymer,
    /// A bound small molecule or cofactor.
    Ligand,
    /// A monoatomic ion.
    Ion,
    /// A solvent water molecule.
    Water,
}

impl ResidueKind {
    /// Returns `true` for residues that belong to the polypeptide itself.
    ///
    /// Gap detection, merging, and renumbering address residues by sequence
    /// position; only polymer residues participate in that numbering space.
    pub fn is_polymer(&self) -> bool {
        matches!(self, ResidueKind::Polymer)
    }
}

impl fmt::Display for ResidueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResidueKind::Polymer => "polymer",
            ResidueKind::Ligand => "ligand",
            ResidueKind::Ion => "ion",
            ResidueKind::Water => "water",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Residue {
    pub number: isize,                      // Residue sequence number from source file
    pub icode: Option<char>,                // Insertion code, if any
    pub name: String,                       // Name of the residue (e.g., "ALA", "HOH")
    pub kind: ResidueKind,                  // Polymer vs. non-polymer classification
    pub chain_id: ChainId,                  // ID of the parent chain
    pub(crate) atoms: Vec<AtomId>,          // Indices of atoms belonging to this residue
    atom_name_map: HashMap<String, AtomId>, // Map from atom name to its stable ID
}

impl Residue {
    pub(crate) fn new(
        number: isize,
        icode: Option<char>,
        name: &str,
        kind: ResidueKind,
        chain_id: ChainId,
    ) -> Self {
        Self {
            number,
            icode,
            name: name.to_string(),
            kind,
            chain_id,
            atoms: Vec::new(),
            atom_name_map: HashMap::new(),
        }
    }

    pub(crate) fn add_atom(&mut self, atom_name: &str, atom_id: AtomId) {
        self.atoms.push(atom_id);
        self.atom_name_map.insert(atom_name.to_string(), atom_id);
    }

    pub(crate) fn remove_atom(&mut self, atom_name: &str, atom_id: AtomId) {
        self.atoms.retain(|&id| id != atom_id);
        self.atom_name_map.remove(atom_name);
    }

    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }

    pub fn get_atom_id_by_name(&self, name: &str) -> Option<AtomId> {
        self.atom_name_map.get(name).copied()
    }

    /// Returns the one-letter code for this residue's name, if it names a
    /// known amino acid (standard or common variant).
    pub fn one_letter(&self) -> Option<char> {
        one_letter_code(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ids::{AtomId, ChainId};
    use slotmap::KeyData;
    use std::collections::HashSet;

    fn dummy_atom_id(n: u64) -> AtomId {
        AtomId::from(KeyData::from_ffi(n))
    }

    fn dummy_chain_id(n: u64) -> ChainId {
        ChainId::from(KeyData::from_ffi(n))
    }

    #[test]
    fn new_residue_initializes_fields_correctly() {
        let chain_id = dummy_chain_id(1);
        let residue = Residue::new(10, None, "GLY", ResidueKind::Polymer, chain_id);
        assert_eq!(residue.number, 10);
        assert_eq!(residue.icode, None);
        assert_eq!(residue.name, "GLY");
        assert_eq!(residue.kind, ResidueKind::Polymer);
        assert_eq!(residue.chain_id, chain_id);
        assert!(residue.atoms().is_empty());
        assert!(residue.get_atom_id_by_name("CA").is_none());
    }

    #[test]
    fn add_atom_adds_atom_and_maps_name() {
        let chain_id = dummy_chain_id(2);
        let mut residue = Residue::new(5, None, "ALA", ResidueKind::Polymer, chain_id);
        let atom_id = dummy_atom_id(42);
        residue.add_atom("CA", atom_id);
        assert_eq!(residue.atoms(), &[atom_id]);
        assert_eq!(residue.get_atom_id_by_name("CA"), Some(atom_id));
    }

    #[test]
    fn add_atom_allows_multiple_atoms_with_different_names() {
        let chain_id = dummy_chain_id(3);
        let mut residue = Residue::new(7, None, "SER", ResidueKind::Polymer, chain_id);
        let atom_id1 = dummy_atom_id(1);
        let atom_id2 = dummy_atom_id(2);
        residue.add_atom("CA", atom_id1);
        residue.add_atom("CB", atom_id2);
        let atom_set: HashSet<_> = residue.atoms().iter().copied().collect();
        assert!(atom_set.contains(&atom_id1));
        assert!(atom_set.contains(&atom_id2));
        assert_eq!(residue.get_atom_id_by_name("CA"), Some(atom_id1));
        assert_eq!(residue.get_atom_id_by_name("CB"), Some(atom_id2));
    }

    #[test]
    fn remove_atom_removes_atom_and_name_mapping() {
        let chain_id = dummy_chain_id(4);
        let mut residue = Residue::new(8, None, "THR", ResidueKind::Polymer, chain_id);
        let atom_id = dummy_atom_id(100);
        residue.add_atom("OG1", atom_id);
        residue.remove_atom("OG1", atom_id);
        assert!(residue.atoms().is_empty());
        assert!(residue.get_atom_id_by_name("OG1").is_none());
    }

    #[test]
    fn one_letter_maps_standard_and_variant_names() {
        let chain_id = dummy_chain_id(5);
        let met = Residue::new(1, None, "MET", ResidueKind::Polymer, chain_id);
        let mse = Residue::new(2, None, "MSE", ResidueKind::Polymer, chain_id);
        let hoh = Residue::new(3, None, "HOH", ResidueKind::Water, chain_id);
        assert_eq!(met.one_letter(), Some('M'));
        assert_eq!(mse.one_letter(), Some('M'));
        assert_eq!(hoh.one_letter(), None);
    }

    #[test]
    fn kind_partitions_polymer_from_heteroatoms() {
        assert!(ResidueKind::Polymer.is_polymer());
        assert!(!ResidueKind::Ligand.is_polymer());
        assert!(!ResidueKind::Ion.is_polymer());
        assert!(!ResidueKind::Water.is_polymer());
    }

    #[test]
    fn kind_display_is_lowercase() {
        assert_eq!(ResidueKind::Ligand.to_string(), "ligand");
        assert_eq!(ResidueKind::Water.to_string(), "water");
    }
}
