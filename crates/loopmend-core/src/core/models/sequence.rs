use crate::core::utils::identifiers::is_sequence_letter;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors arising from constructing or validating a reference sequence.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SequenceError {
    /// A symbol outside the accepted one-letter alphabet was encountered.
    #[error("chain {chain_id}: invalid sequence symbol '{symbol}' at position {position}")]
    InvalidSymbol {
        chain_id: char,
        position: usize,
        symbol: char,
    },
    /// A chain was registered with an empty sequence.
    #[error("chain {chain_id}: reference sequence is empty")]
    EmptyChain { chain_id: char },
}

/// The full per-chain sequence a structure was determined from, independent
/// of which residues actually have coordinates.
///
/// This is the yardstick gaps are measured against: position `p` (1-based)
/// of a chain's reference sequence is *missing* when no coordinate-bearing
/// polymer residue is numbered `p`. Sequences are stored uppercase in the
/// one-letter alphabet (the 20 standard amino acids plus `X` for unknown)
/// and are validated on insertion; a `ReferenceSequence` is never mutated by
/// the pipeline once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceSequence {
    sequences: BTreeMap<char, String>,
}

impl ReferenceSequence {
    /// Creates an empty reference with no chains registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the full sequence of a chain.
    ///
    /// The sequence is uppercased before validation, so `"mktay"` and
    /// `"MKTAY"` are equivalent inputs.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::EmptyChain`] for an empty sequence and
    /// [`SequenceError::InvalidSymbol`] for any character outside the
    /// accepted alphabet, reporting its 1-based position.
    pub fn set_chain(&mut self, chain_id: char, sequence: &str) -> Result<(), SequenceError> {
        let normalized = sequence.trim().to_ascii_uppercase();
        if normalized.is_empty() {
            return Err(SequenceError::EmptyChain { chain_id });
        }
        for (index, symbol) in normalized.chars().enumerate() {
            if !is_sequence_letter(symbol) {
                return Err(SequenceError::InvalidSymbol {
                    chain_id,
                    position: index + 1,
                    symbol,
                });
            }
        }
        self.sequences.insert(chain_id, normalized);
        Ok(())
    }

    /// Returns the full sequence registered for a chain, if any.
    pub fn chain(&self, chain_id: char) -> Option<&str> {
        self.sequences.get(&chain_id).map(String::as_str)
    }

    /// Returns the reference length of a chain, if registered.
    pub fn chain_length(&self, chain_id: char) -> Option<usize> {
        self.sequences.get(&chain_id).map(String::len)
    }

    /// Returns the expected subsequence spanning 1-based positions
    /// `start..=end` of a chain, or `None` when the chain is unknown or the
    /// range falls outside it.
    pub fn subsequence(&self, chain_id: char, start: usize, end: usize) -> Option<&str> {
        let sequence = self.sequences.get(&chain_id)?;
        if start == 0 || start > end || end > sequence.len() {
            return None;
        }
        Some(&sequence[start - 1..end])
    }

    /// Iterates over registered chains in ascending chain-identifier order.
    pub fn chains(&self) -> impl Iterator<Item = (char, &str)> {
        self.sequences.iter().map(|(&id, seq)| (id, seq.as_str()))
    }

    /// Returns `true` when no chain has been registered.
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_chain_stores_uppercased_sequence() {
        let mut reference = ReferenceSequence::new();
        reference.set_chain('A', "mktay").unwrap();
        assert_eq!(reference.chain('A'), Some("MKTAY"));
        assert_eq!(reference.chain_length('A'), Some(5));
    }

    #[test]
    fn set_chain_rejects_empty_sequence() {
        let mut reference = ReferenceSequence::new();
        let err = reference.set_chain('A', "  ").unwrap_err();
        assert_eq!(err, SequenceError::EmptyChain { chain_id: 'A' });
        assert!(reference.is_empty());
    }

    #[test]
    fn set_chain_rejects_symbols_outside_alphabet() {
        let mut reference = ReferenceSequence::new();
        let err = reference.set_chain('B', "MK*AY").unwrap_err();
        assert_eq!(
            err,
            SequenceError::InvalidSymbol {
                chain_id: 'B',
                position: 3,
                symbol: '*',
            }
        );
    }

    #[test]
    fn set_chain_accepts_unknown_placeholder() {
        let mut reference = ReferenceSequence::new();
        reference.set_chain('A', "MKXAY").unwrap();
        assert_eq!(reference.chain('A'), Some("MKXAY"));
    }

    #[test]
    fn subsequence_returns_one_based_inclusive_range() {
        let mut reference = ReferenceSequence::new();
        reference.set_chain('A', "MKTAYIAKQR").unwrap();
        assert_eq!(reference.subsequence('A', 1, 3), Some("MKT"));
        assert_eq!(reference.subsequence('A', 4, 4), Some("A"));
        assert_eq!(reference.subsequence('A', 8, 10), Some("KQR"));
    }

    #[test]
    fn subsequence_rejects_out_of_range_queries() {
        let mut reference = ReferenceSequence::new();
        reference.set_chain('A', "MKTAY").unwrap();
        assert_eq!(reference.subsequence('A', 0, 2), None);
        assert_eq!(reference.subsequence('A', 3, 2), None);
        assert_eq!(reference.subsequence('A', 4, 6), None);
        assert_eq!(reference.subsequence('B', 1, 2), None);
    }

    #[test]
    fn chains_iterates_in_identifier_order() {
        let mut reference = ReferenceSequence::new();
        reference.set_chain('B', "AAA").unwrap();
        reference.set_chain('A', "GGG").unwrap();
        let ids: Vec<char> = reference.chains().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!['A', 'B']);
    }
}
