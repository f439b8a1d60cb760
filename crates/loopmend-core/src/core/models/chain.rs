use super::ids::ResidueId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    pub id: char,                        // Chain identifier (e.g., 'A', 'B')
    pub(crate) residues: Vec<ResidueId>, // Residue IDs in order of appearance in the source
}

impl Chain {
    pub(crate) fn new(id: char) -> Self {
        Self {
            id,
            residues: Vec::new(),
        }
    }

    /// Returns the residues of this chain in author order.
    ///
    /// Author order is the order of appearance in the deposited file, which
    /// for well-formed entries matches ascending sequence number for the
    /// polymer followed by the chain's heteroatoms.
    pub fn residues(&self) -> &[ResidueId] {
        &self.residues
    }
}
