use crate::error::{CliError, Result};
use loopmend::core::io::pdb::PdbMetadata;
use loopmend::core::models::sequence::ReferenceSequence;

/// Splits a `CHAIN=SEQUENCE` command-line override into its parts.
///
/// Only the shape is checked here; the sequence alphabet is validated when
/// the pair is registered on a [`ReferenceSequence`].
pub fn parse_sequence_override(entry: &str) -> Result<(char, String)> {
    let Some((chain_part, sequence)) = entry.split_once('=') else {
        return Err(CliError::Argument(format!(
            "invalid sequence override '{entry}': expected CHAIN=SEQUENCE (e.g. 'A=MKTAYIA')"
        )));
    };

    let chain_part = chain_part.trim();
    let mut chars = chain_part.chars();
    let (Some(chain), None) = (chars.next(), chars.next()) else {
        return Err(CliError::Argument(format!(
            "invalid chain identifier '{chain_part}': expected a single character"
        )));
    };

    Ok((chain, sequence.trim().to_string()))
}

/// Builds the reference sequences for a run: the SEQRES records of the input
/// file, overlaid with any `--sequence` overrides.
pub fn build_reference(metadata: &PdbMetadata, overrides: &[String]) -> Result<ReferenceSequence> {
    let mut reference = metadata.reference_sequence()?;
    for entry in overrides {
        let (chain, sequence) = parse_sequence_override(entry)?;
        reference.set_chain(chain, &sequence)?;
    }
    Ok(reference)
}
