//! Rewrites residue numbering into a contiguous, insertion-code-free form.
//!
//! Each chain's polymer residues are renumbered 1, 2, 3, ... in author
//! order, which makes the operation idempotent: renumbering an already
//! contiguous chain changes nothing. Heteroatoms either restart from 1 in
//! their own per-chain counter or keep their deposited numbers, depending on
//! [`HeteroNumbering`]; they never join the polymer numbering space.

use crate::core::models::structure::Structure;
use tracing::{debug, instrument};

/// How heteroatom residues are numbered during renumbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeteroNumbering {
    /// Heteroatoms restart from 1 in a counter separate from the polymer.
    Independent,
    /// Heteroatoms keep their deposited numbers and insertion codes.
    Preserve,
}

/// Builds a renumbered copy of the structure.
#[instrument(skip_all, fields(structure = %structure.id(), policy = ?hetero))]
pub fn renumber(structure: &Structure, hetero: HeteroNumbering) -> Structure {
    let mut renumbered = Structure::new(structure.id());

    for (_, chain) in structure.chains_iter() {
        let new_chain = renumbered.add_chain(chain.id);
        let mut next_polymer: isize = 1;
        let mut next_hetero: isize = 1;

        for &residue_id in chain.residues() {
            let Some(residue) = structure.residue(residue_id) else {
                continue;
            };

            let (number, icode) = if residue.kind.is_polymer() {
                let number = next_polymer;
                next_polymer += 1;
                (number, None)
            } else {
                match hetero {
                    HeteroNumbering::Independent => {
                        let number = next_hetero;
                        next_hetero += 1;
                        (number, None)
                    }
                    HeteroNumbering::Preserve => (residue.number, residue.icode),
                }
            };

            renumbered
                .copy_residue_from(new_chain, structure, residue, number, icode)
                .expect("chain was just created");
        }

        debug!(
            chain = %chain.id,
            polymer = next_polymer - 1,
            "Renumbered chain"
        );
    }

    renumbered
}
