use super::atom::Atom;
use super::chain::Chain;
use super::ids::{AtomId, ChainId, ResidueId};
use super::residue::{Residue, ResidueKind};
use slotmap::SlotMap;
use std::collections::HashMap;

/// Represents a complete protein structure with chains, residues, and atoms.
///
/// This struct serves as the central data structure for structure preparation,
/// providing efficient storage and access to all components of a deposited
/// entry. It maintains internal lookup maps for addressing chains by their
/// author identifier and polymer residues by their sequence position.
///
/// Non-polymer residues (ligands, ions, waters) are stored alongside the
/// polymer but live in a separate numbering space: they are never registered
/// in the position lookup map and are never addressed by sequence position.
#[derive(Debug, Clone, Default)]
pub struct Structure {
    /// Identifier of the entry this structure was derived from (e.g., a PDB accession).
    id: String,
    /// Primary storage for atoms using a slot map for efficient ID management.
    atoms: SlotMap<AtomId, Atom>,
    /// Primary storage for residues using a slot map for efficient ID management.
    residues: SlotMap<ResidueId, Residue>,
    /// Primary storage for chains using a slot map for efficient ID management.
    chains: SlotMap<ChainId, Chain>,
    /// Lookup map for finding polymer residues by chain, number, and insertion code.
    residue_id_map: HashMap<(ChainId, isize, Option<char>), ResidueId>,
    /// Lookup map for finding chains by their single-character identifier.
    chain_id_map: HashMap<char, ChainId>,
}

impl Structure {
    /// Creates a new, empty structure carrying the given source identifier.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Self::default()
        }
    }

    /// Returns the source identifier of this structure.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Replaces the source identifier.
    pub fn set_id(&mut self, id: &str) {
        self.id = id.to_string();
    }

    /// Retrieves an immutable reference to an atom by its ID.
    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    /// Retrieves a mutable reference to an atom by its ID.
    pub fn atom_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.atoms.get_mut(id)
    }

    /// Returns an iterator over all atoms in the structure.
    ///
    /// # Return
    ///
    /// An iterator yielding `(AtomId, &Atom)` pairs.
    pub fn atoms_iter(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.atoms.iter()
    }

    /// Retrieves an immutable reference to a residue by its ID.
    pub fn residue(&self, id: ResidueId) -> Option<&Residue> {
        self.residues.get(id)
    }

    /// Retrieves a mutable reference to a residue by its ID.
    pub fn residue_mut(&mut self, id: ResidueId) -> Option<&mut Residue> {
        self.residues.get_mut(id)
    }

    /// Returns an iterator over all residues in the structure.
    ///
    /// # Return
    ///
    /// An iterator yielding `(ResidueId, &Residue)` pairs.
    pub fn residues_iter(&self) -> impl Iterator<Item = (ResidueId, &Residue)> {
        self.residues.iter()
    }

    /// Retrieves an immutable reference to a chain by its ID.
    pub fn chain(&self, id: ChainId) -> Option<&Chain> {
        self.chains.get(id)
    }

    /// Returns an iterator over all chains in the structure.
    ///
    /// Chains are yielded in insertion order, which the file parser arranges
    /// to be the order of appearance in the source.
    ///
    /// # Return
    ///
    /// An iterator yielding `(ChainId, &Chain)` pairs.
    pub fn chains_iter(&self) -> impl Iterator<Item = (ChainId, &Chain)> {
        self.chains.iter()
    }

    /// Finds a chain ID by its single-character identifier.
    ///
    /// # Return
    ///
    /// Returns `Some(ChainId)` if the chain exists, otherwise `None`.
    pub fn find_chain_by_id(&self, id: char) -> Option<ChainId> {
        self.chain_id_map.get(&id).copied()
    }

    /// Finds a polymer residue ID by its chain, sequence number, and insertion code.
    ///
    /// Non-polymer residues are not addressable by position; looking up a
    /// number that only a heteroatom residue carries returns `None`.
    ///
    /// # Arguments
    ///
    /// * `chain_id` - The ID of the chain containing the residue.
    /// * `number` - The sequence number of the residue.
    /// * `icode` - The insertion code, if any.
    ///
    /// # Return
    ///
    /// Returns `Some(ResidueId)` if the residue exists, otherwise `None`.
    pub fn find_residue_by_id(
        &self,
        chain_id: ChainId,
        number: isize,
        icode: Option<char>,
    ) -> Option<ResidueId> {
        self.residue_id_map.get(&(chain_id, number, icode)).copied()
    }

    /// Adds a new chain to the structure or returns the existing one.
    ///
    /// This method is idempotent; if a chain with the given ID already exists,
    /// it returns the existing chain ID without creating a duplicate.
    ///
    /// # Return
    ///
    /// The ID of the chain (new or existing).
    pub fn add_chain(&mut self, id: char) -> ChainId {
        *self.chain_id_map.entry(id).or_insert_with(|| {
            let chain = Chain::new(id);
            self.chains.insert(chain)
        })
    }

    /// Adds a new residue to the given chain.
    ///
    /// For polymer residues this method is idempotent on (chain, number,
    /// insertion code); an existing residue at that position is returned
    /// unchanged. Non-polymer residues are appended unconditionally, since
    /// their numbering is author data the structure does not arbitrate.
    ///
    /// # Arguments
    ///
    /// * `chain_id` - The ID of the chain to add the residue to.
    /// * `number` - The sequence number of the residue.
    /// * `icode` - The insertion code, if any.
    /// * `name` - The residue name (e.g., "ALA", "HOH").
    /// * `kind` - Polymer or heteroatom classification.
    ///
    /// # Return
    ///
    /// Returns `Some(ResidueId)` if successful, otherwise `None` (e.g., if the
    /// chain doesn't exist).
    pub fn add_residue(
        &mut self,
        chain_id: ChainId,
        number: isize,
        icode: Option<char>,
        name: &str,
        kind: ResidueKind,
    ) -> Option<ResidueId> {
        let chain = self.chains.get_mut(chain_id)?;

        let residue_id = if kind.is_polymer() {
            let key = (chain_id, number, icode);
            *self.residue_id_map.entry(key).or_insert_with(|| {
                let residue = Residue::new(number, icode, name, kind, chain_id);
                self.residues.insert(residue)
            })
        } else {
            let residue = Residue::new(number, icode, name, kind, chain_id);
            self.residues.insert(residue)
        };

        if !chain.residues.contains(&residue_id) {
            chain.residues.push(residue_id);
        }

        Some(residue_id)
    }

    /// Adds an atom to a specific residue.
    ///
    /// This method inserts the atom into the structure and registers it with
    /// the given residue.
    ///
    /// # Return
    ///
    /// Returns `Some(AtomId)` if successful, otherwise `None` (e.g., if the
    /// residue doesn't exist).
    pub fn add_atom_to_residue(&mut self, residue_id: ResidueId, atom: Atom) -> Option<AtomId> {
        if !self.residues.contains_key(residue_id) {
            return None;
        }

        let name = atom.name.clone();
        let atom_id = self.atoms.insert(atom);

        let residue = self.residues.get_mut(residue_id)?;
        residue.add_atom(&name, atom_id);

        Some(atom_id)
    }

    /// Removes an atom from the structure, updating its parent residue.
    ///
    /// # Return
    ///
    /// Returns `Some(Atom)` if the atom existed and was removed, otherwise `None`.
    pub fn remove_atom(&mut self, atom_id: AtomId) -> Option<Atom> {
        let atom = self.atoms.remove(atom_id)?;

        if let Some(residue) = self.residues.get_mut(atom.residue_id) {
            residue.remove_atom(&atom.name, atom_id);
        }

        Some(atom)
    }

    /// Removes a residue and all its atoms, updating the parent chain and
    /// the position lookup map.
    ///
    /// # Return
    ///
    /// Returns `Some(Residue)` if the residue existed and was removed, otherwise `None`.
    pub fn remove_residue(&mut self, residue_id: ResidueId) -> Option<Residue> {
        let residue = self.residues.get(residue_id)?.clone();

        for atom_id in residue.atoms().to_vec() {
            self.remove_atom(atom_id);
        }

        if let Some(chain) = self.chains.get_mut(residue.chain_id) {
            chain.residues.retain(|&id| id != residue_id);
        }

        if residue.kind.is_polymer() {
            self.residue_id_map
                .remove(&(residue.chain_id, residue.number, residue.icode));
        }

        self.residues.remove(residue_id)
    }

    /// Removes a chain and everything it contains.
    ///
    /// # Return
    ///
    /// Returns `Some(Chain)` if the chain existed and was removed, otherwise `None`.
    pub fn remove_chain(&mut self, chain_id: ChainId) -> Option<Chain> {
        let chain = self.chains.get(chain_id)?.clone();

        for residue_id in chain.residues().to_vec() {
            self.remove_residue(residue_id);
        }

        self.chain_id_map.remove(&chain.id);
        self.chains.remove(chain_id)
    }

    /// Returns the number of non-polymer residues in the structure.
    pub fn non_polymer_residue_count(&self) -> usize {
        self.residues
            .iter()
            .filter(|(_, r)| !r.kind.is_polymer())
            .count()
    }

    /// Returns the number of polymer residues in the structure.
    pub fn polymer_residue_count(&self) -> usize {
        self.residues
            .iter()
            .filter(|(_, r)| r.kind.is_polymer())
            .count()
    }

    /// Copies a residue and its atoms from another structure into a chain of
    /// this one, under possibly different numbering.
    pub(crate) fn copy_residue_from(
        &mut self,
        chain_id: ChainId,
        source: &Structure,
        source_residue: &Residue,
        number: isize,
        icode: Option<char>,
    ) -> Option<ResidueId> {
        let residue_id = self.add_residue(
            chain_id,
            number,
            icode,
            &source_residue.name,
            source_residue.kind,
        )?;
        for &atom_id in source_residue.atoms() {
            if let Some(atom) = source.atom(atom_id) {
                let mut copy = atom.clone();
                copy.residue_id = residue_id;
                self.add_atom_to_residue(residue_id, copy);
            }
        }
        Some(residue_id)
    }

    /// Builds a copy of this structure containing only polymer residues.
    ///
    /// Ligands, ions, and waters are left behind; chains that contain nothing
    /// but heteroatoms disappear entirely. This is the form handed to a
    /// conformational-search engine, which has no use for the solvent and
    /// would misinterpret it as protein density.
    pub fn strip_non_polymer(&self) -> Structure {
        let mut stripped = Structure::new(&self.id);

        for (_, chain) in self.chains_iter() {
            let polymer: Vec<&Residue> = chain
                .residues()
                .iter()
                .filter_map(|&rid| self.residue(rid))
                .filter(|r| r.kind.is_polymer())
                .collect();

            if polymer.is_empty() {
                continue;
            }

            let new_chain_id = stripped.add_chain(chain.id);
            for residue in polymer {
                stripped
                    .copy_residue_from(new_chain_id, self, residue, residue.number, residue.icode)
                    .expect("chain was just created");
            }
        }

        stripped
    }
}
