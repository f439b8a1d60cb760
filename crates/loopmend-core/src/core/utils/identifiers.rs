use crate::core::models::residue::ResidueKind;
use phf::{Map, Set, phf_map, phf_set};

static THREE_TO_ONE: Map<&'static str, char> = phf_map! {
    "ALA" => 'A', "ARG" => 'R', "ASN" => 'N', "ASP" => 'D', "CYS" => 'C',
    "GLN" => 'Q', "GLU" => 'E', "GLY" => 'G', "HIS" => 'H', "ILE" => 'I',
    "LEU" => 'L', "LYS" => 'K', "MET" => 'M', "PHE" => 'F', "PRO" => 'P',
    "SER" => 'S', "THR" => 'T', "TRP" => 'W', "TYR" => 'Y', "VAL" => 'V',
    // Common variants normalized to their parent residue.
    "MSE" => 'M', "HSD" => 'H', "HSE" => 'H', "HSP" => 'H', "CYX" => 'C',
};

static ONE_TO_THREE: Map<char, &'static str> = phf_map! {
    'A' => "ALA", 'R' => "ARG", 'N' => "ASN", 'D' => "ASP", 'C' => "CYS",
    'Q' => "GLN", 'E' => "GLU", 'G' => "GLY", 'H' => "HIS", 'I' => "ILE",
    'L' => "LEU", 'K' => "LYS", 'M' => "MET", 'F' => "PHE", 'P' => "PRO",
    'S' => "SER", 'T' => "THR", 'W' => "TRP", 'Y' => "TYR", 'V' => "VAL",
};

static WATER_RES_NAMES: Set<&'static str> = phf_set! {
    "HOH", "WAT", "H2O", "DOD", "TIP", "TIP3", "SPC",
};

static ION_RES_NAMES: Set<&'static str> = phf_set! {
    "NA", "CL", "K", "MG", "CA", "ZN", "FE", "FE2", "MN", "CU", "CU1",
    "NI", "CO", "CD", "HG", "BR", "IOD", "F", "LI", "SR", "CS", "BA",
};

/// The placeholder letter used when a reference position's residue type is
/// unknown (e.g., a nonstandard SEQRES entry with no parent amino acid).
pub const UNKNOWN_RESIDUE_LETTER: char = 'X';

pub fn one_letter_code(residue_name: &str) -> Option<char> {
    THREE_TO_ONE.get(residue_name.trim()).copied()
}

pub fn three_letter_code(one_letter: char) -> Option<&'static str> {
    ONE_TO_THREE
        .get(&one_letter.to_ascii_uppercase())
        .copied()
}

pub fn is_sequence_letter(c: char) -> bool {
    c == UNKNOWN_RESIDUE_LETTER || ONE_TO_THREE.contains_key(&c)
}

/// Classifies a heteroatom-record residue name into its non-polymer kind.
///
/// Anything that is neither a recognized water nor a monoatomic ion is
/// treated as a ligand. Names arriving from fixed-column formats are trimmed
/// before lookup.
pub fn classify_het_residue(residue_name: &str) -> ResidueKind {
    let name = residue_name.trim();
    if WATER_RES_NAMES.contains(name) {
        ResidueKind::Water
    } else if ION_RES_NAMES.contains(name) {
        ResidueKind::Ion
    } else {
        ResidueKind::Ligand
    }
}
