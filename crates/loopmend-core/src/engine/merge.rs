//! Splices modeled gap residues back into the heteroatom-bearing original.
//!
//! The merged structure is built fresh: original residues are copied over
//! verbatim (heteroatoms included), and each gap position is filled from the
//! decoy at its numeric place in the chain, so author order ends up sorted
//! wherever a gap was repaired. Gap positions compete only with polymer
//! residues; ligand, ion, and water numbering never collides with them. Any
//! contradiction between original, decoy, and gap list is a
//! [`EngineError::MergeConflict`] naming the attempt, chain, and position.

use super::decoys::Decoy;
use super::error::EngineError;
use super::gaps::Gap;
use crate::core::models::ids::ChainId;
use crate::core::models::structure::Structure;
use crate::core::utils::identifiers::UNKNOWN_RESIDUE_LETTER;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, instrument};

/// Grafts the decoy's modeled gap residues into a copy of the original.
#[instrument(skip_all, fields(structure = %original.id(), attempt = decoy.attempt))]
pub fn merge(original: &Structure, decoy: &Decoy, gaps: &[Gap]) -> Result<Structure, EngineError> {
    let mut pending_by_chain: HashMap<char, BTreeMap<isize, char>> = HashMap::new();
    for gap in gaps {
        let positions = pending_by_chain.entry(gap.chain_id).or_default();
        for (offset, letter) in gap.sequence.chars().enumerate() {
            positions.insert(gap.start + offset as isize, letter);
        }
    }

    let mut merged = Structure::new(original.id());
    let mut spliced = 0usize;

    for (_, chain) in original.chains_iter() {
        let merged_chain = merged.add_chain(chain.id);
        let mut pending = pending_by_chain
            .remove(&chain.id)
            .unwrap_or_default()
            .into_iter()
            .peekable();

        for &residue_id in chain.residues() {
            let Some(residue) = original.residue(residue_id) else {
                continue;
            };

            if residue.kind.is_polymer() {
                while let Some(&(position, expected)) = pending.peek() {
                    if position >= residue.number {
                        break;
                    }
                    splice_gap_residue(&mut merged, merged_chain, chain.id, position, expected, decoy)?;
                    spliced += 1;
                    pending.next();
                }
                if merged
                    .find_residue_by_id(merged_chain, residue.number, residue.icode)
                    .is_some()
                {
                    return Err(EngineError::MergeConflict {
                        attempt: decoy.attempt,
                        chain_id: chain.id,
                        position: residue.number,
                        reason: "position is already occupied by a modeled residue".to_string(),
                    });
                }
            }

            merged
                .copy_residue_from(merged_chain, original, residue, residue.number, residue.icode)
                .ok_or_else(|| {
                    EngineError::Internal("merged chain disappeared during copying".to_string())
                })?;
        }

        for (position, expected) in pending {
            splice_gap_residue(&mut merged, merged_chain, chain.id, position, expected, decoy)?;
            spliced += 1;
        }
    }

    if let Some(&chain_id) = pending_by_chain.keys().min() {
        let position = pending_by_chain
            .get(&chain_id)
            .and_then(|positions| positions.keys().next().copied())
            .unwrap_or_default();
        return Err(EngineError::MergeConflict {
            attempt: decoy.attempt,
            chain_id,
            position,
            reason: "gap refers to a chain the original structure does not contain".to_string(),
        });
    }

    debug!(
        spliced,
        heteroatoms = merged.non_polymer_residue_count(),
        "Merged decoy into original structure"
    );
    Ok(merged)
}

fn splice_gap_residue(
    merged: &mut Structure,
    merged_chain: ChainId,
    chain_id: char,
    position: isize,
    expected: char,
    decoy: &Decoy,
) -> Result<(), EngineError> {
    let conflict = |reason: String| EngineError::MergeConflict {
        attempt: decoy.attempt,
        chain_id,
        position,
        reason,
    };

    if merged
        .find_residue_by_id(merged_chain, position, None)
        .is_some()
    {
        return Err(conflict(
            "position is already occupied in the original structure".to_string(),
        ));
    }
    let decoy_chain = decoy
        .structure
        .find_chain_by_id(chain_id)
        .ok_or_else(|| conflict(format!("decoy does not contain chain {chain_id}")))?;
    let residue_id = decoy
        .structure
        .find_residue_by_id(decoy_chain, position, None)
        .ok_or_else(|| conflict("decoy has no modeled residue at this position".to_string()))?;
    let residue = decoy.structure.residue(residue_id).ok_or_else(|| {
        EngineError::Internal("decoy residue lookup desynchronized".to_string())
    })?;
    if !residue.kind.is_polymer() {
        return Err(conflict(format!(
            "decoy residue '{}' is not a polymer residue",
            residue.name
        )));
    }
    if expected != UNKNOWN_RESIDUE_LETTER {
        if let Some(observed) = residue.one_letter() {
            if observed != expected {
                return Err(conflict(format!(
                    "modeled residue '{}' is '{observed}' but the reference expects '{expected}'",
                    residue.name
                )));
            }
        }
    }

    merged
        .copy_residue_from(merged_chain, &decoy.structure, residue, position, None)
        .ok_or_else(|| {
            EngineError::Internal("merged chain disappeared during splicing".to_string())
        })?;
    Ok(())
}
