use crate::cli::InspectArgs;
use crate::error::{CliError, Result};
use crate::utils::parser;
use loopmend::{
    core::{
        io::{pdb::PdbFile, traits::StructureFile},
        models::structure::Structure,
    },
    engine::{gaps, quality},
};
use tracing::info;

pub fn run(args: InspectArgs) -> Result<()> {
    info!("Loading input structure from {:?}", &args.input);
    let (structure, metadata) =
        PdbFile::read_from_path(&args.input).map_err(|e| CliError::FileParsing {
            path: args.input.clone(),
            source: e.into(),
        })?;

    print_inventory(&structure);

    let reference = parser::build_reference(&metadata, &args.sequences)?;
    if reference.is_empty() {
        println!();
        println!(
            "No reference sequence available (no SEQRES records, no --sequence overrides); \
             completeness cannot be assessed."
        );
        return Ok(());
    }

    let report = gaps::detect(&structure, &reference)?;
    let score = quality::score(&report);

    println!();
    println!(
        "Completeness score: {}/100 ({} gap(s), {} discontinuity(ies), {} missing residue(s))",
        score.score, score.gap_count, score.discontinuity_count, score.missing_residues
    );
    for gap in &report.gaps {
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
    for discontinuity in &report.discontinuities {
        println!(
            "  chain {}: numbering does not increase between residues {} and {}",
            discontinuity.chain_id, discontinuity.before, discontinuity.after
        );
    }
    for chain_id in &report.unmodeled_chains {
        println!("  chain {chain_id}: no reference sequence entry; not assessed");
    }
    if score.is_complete() {
        println!("✓ Structure is complete.");
    }

    Ok(())
}

fn print_inventory(structure: &Structure) {
    println!("Structure: {}", structure.id());
    for (_, chain) in structure.chains_iter() {
        let mut polymer = 0usize;
        let mut hetero = 0usize;
        let mut span: Option<(isize, isize)> = None;

        for &residue_id in chain.residues() {
            let Some(residue) = structure.residue(residue_id) else {
                continue;
            };
            if residue.kind.is_polymer() {
                polymer += 1;
                span = Some(match span {
                    Some((lo, hi)) => (lo.min(residue.number), hi.max(residue.number)),
                    None => (residue.number, residue.number),
                });
            } else {
                hetero += 1;
            }
        }

        match span {
            Some((lo, hi)) => println!(
                "  chain {}: {} polymer residue(s) spanning {}-{}, {} heteroatom record(s)",
                chain.id, polymer, lo, hi, hetero
            ),
            None => println!(
                "  chain {}: no polymer residues, {} heteroatom record(s)",
                chain.id, hetero
            ),
        }
    }
}
