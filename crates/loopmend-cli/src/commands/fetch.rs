use crate::cli::FetchArgs;
use crate::error::{CliError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, File};
use std::io;
use tracing::info;

const DOWNLOAD_URL_BASE: &str = "https://files.rcsb.org/download";

pub fn run(args: FetchArgs) -> Result<()> {
    let id = normalize_accession(&args.id)?;
    let target = args.dir.join(format!("{id}.pdb"));

    if target.exists() && !args.force {
        return Err(CliError::Argument(format!(
            "'{}' already exists; pass --force to overwrite it",
            target.display()
        )));
    }
    fs::create_dir_all(&args.dir)?;

    let url = format!("{DOWNLOAD_URL_BASE}/{id}.pdb");
    info!(url = %url, "Downloading structure");
    println!("Fetching {id} from RCSB...");

    let response = reqwest::blocking::get(&url)?.error_for_status()?;

    let pb = match response.content_length() {
        Some(length) => ProgressBar::new(length).with_style(byte_style()),
        None => ProgressBar::new_spinner().with_message("Downloading..."),
    };
    pb.set_draw_target(indicatif::ProgressDrawTarget::stderr_with_hz(2));

    let mut reader = pb.wrap_read(response);
    let mut file = File::create(&target)?;
    let result = io::copy(&mut reader, &mut file);
    match result {
        Ok(bytes) => {
            pb.finish_and_clear();
            println!("✓ Saved {id} ({bytes} bytes) to: {}", target.display());
            Ok(())
        }
        Err(e) => {
            pb.finish_with_message("✗ Download failed.");
            Err(e.into())
        }
    }
}

/// Validates and normalizes a PDB accession code (four alphanumerics,
/// case-insensitive).
fn normalize_accession(raw: &str) -> Result<String> {
    let id = raw.trim().to_ascii_uppercase();
    if id.len() == 4 && id.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(id)
    } else {
        Err(CliError::Argument(format!(
            "'{raw}' is not a valid PDB accession code"
        )))
    }
}

fn byte_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
    )
    .expect("Failed to create byte style template")
    .progress_chars("#>-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn accession_codes_are_uppercased() {
        assert_eq!(normalize_accession("1abc").unwrap(), "1ABC");
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(normalize_accession(" 2XYZ ").unwrap(), "2XYZ");
    }

    #[test]
    fn malformed_accession_codes_are_rejected() {
        for raw in ["", "1AB", "12345", "1AB!"] {
            assert!(matches!(
                normalize_accession(raw),
                Err(CliError::Argument(_))
            ));
        }
    }

    #[test]
    fn existing_target_requires_force() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("1ABC.pdb");
        std::fs::write(&target, "dummy").unwrap();

        let args = FetchArgs {
            id: "1abc".to_string(),
            dir: dir.path().to_path_buf(),
            force: false,
        };

        assert!(matches!(run(args), Err(CliError::Argument(_))));
    }
}
