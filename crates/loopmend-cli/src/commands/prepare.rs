use crate::cli::PrepareArgs;
use crate::error::{CliError, Result};
use crate::output;
use crate::utils::parser;
use crate::utils::progress::CliProgressHandler;
use loopmend::{
    core::{
        io::{
            pdb::{PdbFile, PdbMetadata},
            traits::StructureFile,
        },
        models::{residue::ResidueKind, sequence::ReferenceSequence, structure::Structure},
        utils::identifiers::three_letter_code,
    },
    engine::{config::RepairConfig, progress::ProgressReporter, search::SearchCapabilities},
    workflows,
    workflows::prepare::{PrepareResult, RepairOutcome},
};
use std::collections::HashSet;
use tracing::{info, warn};

pub fn run(args: PrepareArgs) -> Result<()> {
    let config = build_config(&args)?;

    info!("Loading input structure from {:?}", &args.input);
    let (structure, mut metadata) =
        PdbFile::read_from_path(&args.input).map_err(|e| CliError::FileParsing {
            path: args.input.clone(),
            source: e.into(),
        })?;

    let structure = clean_structure(structure, &args)?;

    let reference = parser::build_reference(&metadata, &args.sequences)?;
    if reference.is_empty() {
        return Err(CliError::Argument(
            "no reference sequence available: the input has no SEQRES records and no --sequence overrides were given"
                .to_string(),
        ));
    }

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.callback());

    // The CLI ships without a conformational search engine; one can be
    // injected through the library API. Gapped inputs therefore surface the
    // manual-repair fallback below.
    let capabilities = SearchCapabilities::none();

    println!("Preparing {}...", structure.id());
    info!("Invoking the core preparation workflow...");

    let result =
        workflows::prepare::run(&structure, &reference, &capabilities, &config, &reporter)?;

    if let RepairOutcome::ManualRepairRequested { reason } = &result.outcome {
        warn!(%reason, "Automatic repair unavailable; writing the structure unchanged");
    }

    print_summary(&result);

    sync_seqres(&mut metadata, &reference, &result.structure);

    let requested = args
        .output
        .clone()
        .unwrap_or_else(|| output::default_output_path(&args.input));
    let output_path = output::versioned_path(&requested);

    info!("Writing prepared structure to {:?}", &output_path);
    PdbFile::write_to_path(&result.structure, &metadata, &output_path).map_err(|e| {
        CliError::FileParsing {
            path: output_path.clone(),
            source: e.into(),
        }
    })?;

    println!("✓ Prepared structure written to: {}", output_path.display());

    Ok(())
}

/// Folds the command-line overrides into the file-backed (or default)
/// configuration, then re-validates the combined result.
fn build_config(args: &PrepareArgs) -> Result<RepairConfig> {
    let mut config = match &args.config {
        Some(path) => RepairConfig::load(path)?,
        None => RepairConfig::default(),
    };

    if let Some(target) = args.target_success_count {
        config.target_success_count = target;
    }
    if let Some(max) = args.max_attempts {
        config.max_attempts = Some(max);
    }
    if let Some(weight) = args.statistical_weight {
        config.statistical_weight = weight;
    }
    if let Some(seconds) = args.attempt_timeout {
        config.attempt_timeout_secs = Some(seconds);
    }
    if args.no_renumber {
        config.renumber = false;
    }
    if args.keep_hetero_numbering {
        config.renumber_heteroatoms_independently = false;
    }

    config
        .validate()
        .map_err(|e| CliError::Argument(e.to_string()))?;
    Ok(config)
}

/// Applies the input-cleaning flags: chain selection first, then solvent or
/// full heteroatom removal.
fn clean_structure(mut structure: Structure, args: &PrepareArgs) -> Result<Structure> {
    if !args.chains.is_empty() {
        let keep: HashSet<char> = args.chains.iter().copied().collect();
        for &chain_id in &keep {
            if structure.find_chain_by_id(chain_id).is_none() {
                return Err(CliError::Argument(format!(
                    "chain {chain_id} is not present in the input structure"
                )));
            }
        }

        let drop: Vec<_> = structure
            .chains_iter()
            .filter(|(_, chain)| !keep.contains(&chain.id))
            .map(|(chain_id, _)| chain_id)
            .collect();
        for chain_id in drop {
            structure.remove_chain(chain_id);
        }
    }

    if args.drop_hetero || args.drop_waters {
        let drop: Vec<_> = structure
            .residues_iter()
            .filter(|(_, residue)| match residue.kind {
                ResidueKind::Water => true,
                ResidueKind::Ligand | ResidueKind::Ion => args.drop_hetero,
                ResidueKind::Polymer => false,
            })
            .map(|(residue_id, _)| residue_id)
            .collect();

        info!(removed = drop.len(), "Removing heteroatoms during cleanup");
        for residue_id in drop {
            structure.remove_residue(residue_id);
        }
    }

    Ok(structure)
}

/// Rewrites the SEQRES metadata from the reference the repair actually ran
/// against, restricted to chains present in the output structure.
fn sync_seqres(metadata: &mut PdbMetadata, reference: &ReferenceSequence, structure: &Structure) {
    metadata.seqres = reference
        .chains()
        .filter(|&(chain_id, _)| structure.find_chain_by_id(chain_id).is_some())
        .map(|(chain_id, sequence)| {
            let names = sequence
                .chars()
                .map(|letter| three_letter_code(letter).unwrap_or("UNK").to_string())
                .collect();
            (chain_id, names)
        })
        .collect();
}

fn print_summary(result: &PrepareResult) {
    let before = &result.before;
    println!();
    println!(
        "Completeness before repair: {}/100 ({} gap(s), {} discontinuity(ies), {} missing residue(s))",
        before.score, before.gap_count, before.discontinuity_count, before.missing_residues
    );
    for gap in &result.gaps {
        println!(
            "  chain {} {:>5}-{:<5} {} gap of {} residue(s): {}",
            gap.chain_id,
            gap.start,
            gap.end,
            gap.kind,
            gap.residue_count(),
            gap.sequence
        );
    }

    match &result.outcome {
        RepairOutcome::AlreadyComplete => {
            println!("✓ Structure is already complete; nothing to repair.");
        }
        RepairOutcome::Repaired {
            attempt,
            combined_score,
        } => {
            println!(
                "✓ Repaired with the decoy from attempt {} (combined score {:.4}).",
                attempt, combined_score
            );
            println!(
                "Completeness after repair: {}/100 ({} attempt(s) made, {} failed)",
                result.after.score,
                result.attempts_made,
                result.failures.len()
            );
        }
        RepairOutcome::ManualRepairRequested { reason } => {
            println!("⚠ Automatic repair was not possible: {}", reason);
            println!("  The structure is written unchanged; close the listed gaps manually.");
        }
    }

    if !result.failures.is_empty() {
        println!("Attempt failures:");
        for failure in &result.failures {
            println!(
                "  attempt {:>3} failed during {}: {}",
                failure.attempt, failure.stage, failure.message
            );
        }
    }
}
