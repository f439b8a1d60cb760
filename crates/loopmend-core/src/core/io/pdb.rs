use crate::core::io::traits::StructureFile;
use crate::core::models::atom::Atom;
use crate::core::models::ids::ResidueId;
use crate::core::models::residue::ResidueKind;
use crate::core::models::sequence::{ReferenceSequence, SequenceError};
use crate::core::models::structure::Structure;
use crate::core::utils::identifiers::{
    UNKNOWN_RESIDUE_LETTER, classify_het_residue, one_letter_code,
};
use nalgebra::Point3;
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Metadata carried alongside the coordinates of a PDB entry.
///
/// Only the records the preparation pipeline consumes are retained: the
/// accession code from `HEADER` and the per-chain `SEQRES` residue names,
/// which yield the reference sequences gap detection runs against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdbMetadata {
    /// The four-character accession from the HEADER record, if present.
    pub id_code: Option<String>,
    /// Three-letter residue names per chain, in SEQRES order.
    pub seqres: BTreeMap<char, Vec<String>>,
}

impl PdbMetadata {
    /// Builds the per-chain reference sequences declared by the SEQRES
    /// records.
    ///
    /// Residue names with no known parent amino acid are recorded as the
    /// unknown placeholder rather than dropped, so positions stay aligned
    /// with the declared sequence length.
    ///
    /// # Errors
    ///
    /// Returns a [`SequenceError`] if a chain declares an empty sequence.
    pub fn reference_sequence(&self) -> Result<ReferenceSequence, SequenceError> {
        let mut reference = ReferenceSequence::new();
        for (&chain_id, names) in &self.seqres {
            let sequence: String = names
                .iter()
                .map(|name| one_letter_code(name).unwrap_or(UNKNOWN_RESIDUE_LETTER))
                .collect();
            reference.set_chain(chain_id, &sequence)?;
        }
        Ok(reference)
    }
}

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: PdbParseErrorKind,
    },
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: String },
    #[error("Line is too short for a coordinate record (must reach column 54)")]
    LineTooShort,
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

fn parse_float(line: &str, line_num: usize, start: usize, end: usize) -> Result<f64, PdbError> {
    let raw = slice_and_trim(line, start, end);
    raw.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: raw.into(),
        },
    })
}

/// Pads an atom name into its four-column field.
///
/// Names shorter than four characters start in the second column of the
/// field so that the element-symbol alignment convention of the format is
/// preserved (" CA " vs. "HG11").
fn format_atom_name(name: &str) -> String {
    if name.len() >= 4 {
        name.chars().take(4).collect()
    } else {
        format!(" {:<3}", name)
    }
}

fn write_ter(
    writer: &mut impl Write,
    serial: usize,
    chain_id: char,
    residue: &(String, isize, Option<char>),
) -> Result<(), io::Error> {
    writeln!(
        writer,
        "TER   {:>5}      {:>3} {}{:>4}{}",
        serial,
        residue.0,
        chain_id,
        residue.1,
        residue.2.unwrap_or(' '),
    )
}

/// Reader/writer for the PDB format.
///
/// Reading keeps the first model of multi-model entries, skips alternate
/// locations other than blank or 'A', and classifies HETATM records into
/// waters, ions, and ligands. HETATM records naming a known amino acid
/// (e.g., selenomethionine deposited as MSE) are kept in the polymer so that
/// modified residues do not masquerade as gaps. Writing regenerates serials
/// and emits TER after each chain's polymer run.
pub struct PdbFile;

impl StructureFile for PdbFile {
    type Metadata = PdbMetadata;
    type Error = PdbError;

    fn read_from(reader: &mut impl BufRead) -> Result<(Structure, Self::Metadata), Self::Error> {
        let mut structure = Structure::new("");
        let mut metadata = PdbMetadata::default();

        let mut current_chain = '\0';
        let mut current_residue: Option<(isize, Option<char>, String)> = None;
        let mut current_residue_id: Option<ResidueId> = None;
        let mut atom_count: usize = 0;

        for (line_index, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            let line_num = line_index + 1;
            let record_type = slice_and_trim(&line, 0, 6);

            match record_type {
                "HEADER" => {
                    let id_code = slice_and_trim(&line, 62, 66);
                    if !id_code.is_empty() {
                        metadata.id_code = Some(id_code.to_string());
                        structure.set_id(id_code);
                    }
                }
                "SEQRES" => {
                    let chain_str = slice_and_trim(&line, 11, 12);
                    let Some(chain_id) = chain_str.chars().next() else {
                        return Err(PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::MissingRequiredField {
                                columns: "12-12".into(),
                            },
                        });
                    };
                    let names = line.get(19..).unwrap_or("");
                    metadata
                        .seqres
                        .entry(chain_id)
                        .or_default()
                        .extend(names.split_whitespace().map(str::to_string));
                }
                "ATOM" | "HETATM" => {
                    if line.len() < 54 {
                        return Err(PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::LineTooShort,
                        });
                    }

                    let alt_loc = line.as_bytes()[16] as char;
                    if alt_loc != ' ' && alt_loc != 'A' {
                        continue;
                    }

                    let name = slice_and_trim(&line, 12, 16);
                    if name.is_empty() {
                        return Err(PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::MissingRequiredField {
                                columns: "13-16".into(),
                            },
                        });
                    }
                    let res_name = slice_and_trim(&line, 17, 20);
                    let chain_id = line.as_bytes()[21] as char;
                    let number_str = slice_and_trim(&line, 22, 26);
                    let number: isize = number_str.parse().map_err(|_| PdbError::Parse {
                        line: line_num,
                        kind: PdbParseErrorKind::InvalidInt {
                            columns: "23-26".into(),
                            value: number_str.into(),
                        },
                    })?;
                    let icode = match line.as_bytes()[26] as char {
                        ' ' => None,
                        c => Some(c),
                    };
                    let x = parse_float(&line, line_num, 30, 38)?;
                    let y = parse_float(&line, line_num, 38, 46)?;
                    let z = parse_float(&line, line_num, 46, 54)?;

                    let occupancy = match slice_and_trim(&line, 54, 60) {
                        "" => 1.0,
                        _ => parse_float(&line, line_num, 54, 60)?,
                    };
                    let temp_factor = match slice_and_trim(&line, 60, 66) {
                        "" => 0.0,
                        _ => parse_float(&line, line_num, 60, 66)?,
                    };
                    let element = slice_and_trim(&line, 76, 78);

                    // Modified amino acids are often deposited as HETATM but
                    // still belong to the polymer.
                    let kind = if record_type == "ATOM" || one_letter_code(res_name).is_some() {
                        ResidueKind::Polymer
                    } else {
                        classify_het_residue(res_name)
                    };

                    if chain_id != current_chain {
                        structure.add_chain(chain_id);
                        current_chain = chain_id;
                        current_residue = None;
                        current_residue_id = None;
                    }

                    let residue_key = (number, icode, res_name.to_string());
                    if current_residue.as_ref() != Some(&residue_key) {
                        let chain = structure
                            .find_chain_by_id(chain_id)
                            .ok_or_else(|| PdbError::MissingRecord("chain".into()))?;
                        current_residue_id =
                            structure.add_residue(chain, number, icode, res_name, kind);
                        current_residue = Some(residue_key);
                    }

                    if let Some(residue_id) = current_residue_id {
                        let mut atom =
                            Atom::new(name, residue_id, Point3::new(x, y, z)).with_element(element);
                        atom.occupancy = occupancy;
                        atom.temp_factor = temp_factor;
                        structure.add_atom_to_residue(residue_id, atom);
                        atom_count += 1;
                    }
                }
                "TER" => {
                    current_residue = None;
                    current_residue_id = None;
                }
                "ENDMDL" | "END" => break,
                _ => {}
            }
        }

        if atom_count == 0 {
            return Err(PdbError::MissingRecord("ATOM/HETATM records".into()));
        }
        Ok((structure, metadata))
    }

    fn write_to(
        structure: &Structure,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        for (&chain_id, names) in &metadata.seqres {
            for (record_index, chunk) in names.chunks(13).enumerate() {
                writeln!(
                    writer,
                    "SEQRES {:>3} {} {:>4}  {}",
                    record_index + 1,
                    chain_id,
                    names.len(),
                    chunk.join(" ")
                )?;
            }
        }
        Self::write_structure_to(structure, writer)
    }

    fn write_structure_to(
        structure: &Structure,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        let mut serial: usize = 0;

        for (_, chain) in structure.chains_iter() {
            // The TER record closes the polymer run, so it has to land before
            // the chain's heteroatoms.
            let mut pending_ter: Option<(String, isize, Option<char>)> = None;

            for &residue_id in chain.residues() {
                let Some(residue) = structure.residue(residue_id) else {
                    continue;
                };

                if !residue.kind.is_polymer() {
                    if let Some(ter) = pending_ter.take() {
                        serial += 1;
                        write_ter(writer, serial, chain.id, &ter)?;
                    }
                }

                let record_type = if residue.kind.is_polymer() {
                    "ATOM"
                } else {
                    "HETATM"
                };

                for &atom_id in residue.atoms() {
                    let Some(atom) = structure.atom(atom_id) else {
                        continue;
                    };
                    serial += 1;
                    writeln!(
                        writer,
                        "{:<6}{:>5} {} {:>3} {}{:>4}{}   {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}          {:>2}",
                        record_type,
                        serial,
                        format_atom_name(&atom.name),
                        residue.name,
                        chain.id,
                        residue.number,
                        residue.icode.unwrap_or(' '),
                        atom.position.x,
                        atom.position.y,
                        atom.position.z,
                        atom.occupancy,
                        atom.temp_factor,
                        atom.element,
                    )?;
                }

                if residue.kind.is_polymer() {
                    pending_ter = Some((residue.name.clone(), residue.number, residue.icode));
                }
            }

            if let Some(ter) = pending_ter {
                serial += 1;
                write_ter(writer, serial, chain.id, &ter)?;
            }
        }

        writeln!(writer, "END")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;
    use tempfile::tempdir;

    const SAMPLE_PDB: &str = "\
HEADER    HYDROLASE                               20-APR-99   1ABC
SEQRES   1 A    5  MET LYS THR ALA TYR
ATOM      1  N   MET A   1      27.340  24.430   2.614  1.00  9.67           N
ATOM      2  CA  MET A   1      26.266  25.413   2.842  1.00 10.38           C
ATOM      3  CA ALYS A   2      26.850  29.021   3.898  0.60 10.00           C
ATOM      4  CA BLYS A   2      26.900  29.100   3.950  0.40 10.00           C
ATOM      5  CA  THR A   3      27.100  32.500   4.200  1.00 11.20           C
HETATM    6 ZN    ZN A 101      25.000  25.000   5.000  1.00 20.00          ZN
HETATM    7  O   HOH A 201      22.000  21.000   1.000  1.00 30.00           O
TER
END
";

    fn read_sample() -> (Structure, PdbMetadata) {
        let mut reader = BufReader::new(SAMPLE_PDB.as_bytes());
        PdbFile::read_from(&mut reader).unwrap()
    }

    #[test]
    fn read_parses_header_and_coordinates() {
        let (structure, metadata) = read_sample();

        assert_eq!(structure.id(), "1ABC");
        assert_eq!(metadata.id_code.as_deref(), Some("1ABC"));
        assert_eq!(structure.chains_iter().count(), 1);
        assert_eq!(structure.polymer_residue_count(), 3);
        assert_eq!(structure.non_polymer_residue_count(), 2);

        let chain_a = structure.find_chain_by_id('A').unwrap();
        let met_id = structure.find_residue_by_id(chain_a, 1, None).unwrap();
        let met = structure.residue(met_id).unwrap();
        assert_eq!(met.name, "MET");
        assert_eq!(met.atoms().len(), 2);

        let ca = structure
            .atom(met.get_atom_id_by_name("CA").unwrap())
            .unwrap();
        assert_eq!(ca.position, Point3::new(26.266, 25.413, 2.842));
        assert_eq!(ca.element, "C");
        assert_eq!(ca.temp_factor, 10.38);
    }

    #[test]
    fn read_keeps_only_primary_altloc() {
        let (structure, _) = read_sample();
        let chain_a = structure.find_chain_by_id('A').unwrap();
        let lys_id = structure.find_residue_by_id(chain_a, 2, None).unwrap();
        let lys = structure.residue(lys_id).unwrap();
        assert_eq!(lys.atoms().len(), 1);

        let ca = structure.atom(lys.atoms()[0]).unwrap();
        assert_eq!(ca.occupancy, 0.60);
    }

    #[test]
    fn read_classifies_heteroatom_records() {
        let (structure, _) = read_sample();
        let kinds: Vec<(String, ResidueKind)> = structure
            .residues_iter()
            .filter(|(_, r)| !r.kind.is_polymer())
            .map(|(_, r)| (r.name.clone(), r.kind))
            .collect();
        assert!(kinds.contains(&("ZN".to_string(), ResidueKind::Ion)));
        assert!(kinds.contains(&("HOH".to_string(), ResidueKind::Water)));
    }

    #[test]
    fn read_keeps_modified_amino_acid_hetatm_in_polymer() {
        let pdb = "\
ATOM      1  CA  ALA A   1       1.000   0.000   0.000  1.00  0.00           C
HETATM    2  CA  MSE A   2       2.000   0.000   0.000  1.00  0.00           C
";
        let mut reader = BufReader::new(pdb.as_bytes());
        let (structure, _) = PdbFile::read_from(&mut reader).unwrap();
        assert_eq!(structure.polymer_residue_count(), 2);
        assert_eq!(structure.non_polymer_residue_count(), 0);
    }

    #[test]
    fn read_stops_at_first_model() {
        let pdb = "\
ATOM      1  CA  ALA A   1       1.000   0.000   0.000  1.00  0.00           C
ENDMDL
ATOM      2  CA  GLY A   2       2.000   0.000   0.000  1.00  0.00           C
";
        let mut reader = BufReader::new(pdb.as_bytes());
        let (structure, _) = PdbFile::read_from(&mut reader).unwrap();
        assert_eq!(structure.polymer_residue_count(), 1);
    }

    #[test]
    fn seqres_converts_to_reference_sequence() {
        let (_, metadata) = read_sample();
        let reference = metadata.reference_sequence().unwrap();
        assert_eq!(reference.chain('A'), Some("MKTAY"));
    }

    #[test]
    fn seqres_maps_unknown_names_to_placeholder() {
        let pdb = "\
SEQRES   1 A    3  MET UNK LYS
ATOM      1  CA  MET A   1       1.000   0.000   0.000  1.00  0.00           C
";
        let mut reader = BufReader::new(pdb.as_bytes());
        let (_, metadata) = PdbFile::read_from(&mut reader).unwrap();
        let reference = metadata.reference_sequence().unwrap();
        assert_eq!(reference.chain('A'), Some("MXK"));
    }

    #[test]
    fn read_rejects_malformed_coordinates() {
        let pdb = "ATOM      1  CA  ALA A   1       1.000   x.xxx   0.000\n";
        let mut reader = BufReader::new(pdb.as_bytes());
        let err = PdbFile::read_from(&mut reader).unwrap_err();
        match err {
            PdbError::Parse { line, kind } => {
                assert_eq!(line, 1);
                assert!(matches!(kind, PdbParseErrorKind::InvalidFloat { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn read_rejects_truncated_coordinate_record() {
        let pdb = "ATOM      1  CA  ALA A   1       1.000\n";
        let mut reader = BufReader::new(pdb.as_bytes());
        let err = PdbFile::read_from(&mut reader).unwrap_err();
        assert!(matches!(
            err,
            PdbError::Parse {
                line: 1,
                kind: PdbParseErrorKind::LineTooShort,
            }
        ));
    }

    #[test]
    fn read_rejects_file_without_coordinates() {
        let pdb = "HEADER    HYDROLASE                               20-APR-99   1ABC\n";
        let mut reader = BufReader::new(pdb.as_bytes());
        let err = PdbFile::read_from(&mut reader).unwrap_err();
        assert!(matches!(err, PdbError::MissingRecord(_)));
    }

    #[test]
    fn write_then_read_round_trips_structure() {
        let (structure, metadata) = read_sample();

        let mut buffer = Vec::new();
        PdbFile::write_to(&structure, &metadata, &mut buffer).unwrap();

        let mut reader = BufReader::new(buffer.as_slice());
        let (reparsed, remeta) = PdbFile::read_from(&mut reader).unwrap();

        assert_eq!(reparsed.polymer_residue_count(), 3);
        assert_eq!(reparsed.non_polymer_residue_count(), 2);
        assert_eq!(remeta.seqres, metadata.seqres);

        let chain_a = reparsed.find_chain_by_id('A').unwrap();
        let met_id = reparsed.find_residue_by_id(chain_a, 1, None).unwrap();
        let met = reparsed.residue(met_id).unwrap();
        let ca = reparsed
            .atom(met.get_atom_id_by_name("CA").unwrap())
            .unwrap();
        assert_eq!(ca.position, Point3::new(26.266, 25.413, 2.842));
    }

    #[test]
    fn write_emits_ter_after_polymer_run() {
        let (structure, _) = read_sample();
        let mut buffer = Vec::new();
        PdbFile::write_structure_to(&structure, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        let ter_index = lines.iter().position(|l| l.starts_with("TER")).unwrap();
        assert!(lines[ter_index - 1].starts_with("ATOM"));
        assert!(lines[ter_index + 1].starts_with("HETATM"));
        assert_eq!(lines.last(), Some(&"END"));
    }

    #[test]
    fn path_helpers_round_trip_through_disk() {
        let (structure, metadata) = read_sample();
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.pdb");

        PdbFile::write_to_path(&structure, &metadata, &path).unwrap();
        let (reparsed, remeta) = PdbFile::read_from_path(&path).unwrap();

        assert_eq!(reparsed.polymer_residue_count(), 3);
        assert_eq!(remeta.seqres.get(&'A').map(Vec::len), Some(5));
    }
}
