use std::path::{Path, PathBuf};

/// Derives the default output path for a prepared structure: the input's
/// stem with a `_prepared` suffix, alongside the input file.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("structure");
    input.with_file_name(format!("{stem}_prepared.pdb"))
}

/// Returns the first variant of `path` that does not exist yet.
///
/// An occupied path is versioned by inserting a counter before the extension
/// (`model_prepared.pdb`, `model_prepared.2.pdb`, ...), so earlier results
/// are never overwritten.
pub fn versioned_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("pdb");

    let mut version = 2;
    loop {
        let candidate = path.with_file_name(format!("{stem}.{version}.{extension}"));
        if !candidate.exists() {
            return candidate;
        }
        version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn default_output_adds_the_prepared_suffix() {
        let path = default_output_path(Path::new("/data/structures/1abc.pdb"));
        assert_eq!(path, PathBuf::from("/data/structures/1abc_prepared.pdb"));
    }

    #[test]
    fn free_path_is_returned_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model_prepared.pdb");

        assert_eq!(versioned_path(&path), path);
    }

    #[test]
    fn occupied_path_gets_a_version_counter() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model_prepared.pdb");
        File::create(&path).unwrap();

        assert_eq!(
            versioned_path(&path),
            dir.path().join("model_prepared.2.pdb")
        );
    }

    #[test]
    fn version_counter_skips_every_occupied_variant() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model_prepared.pdb");
        File::create(&path).unwrap();
        File::create(dir.path().join("model_prepared.2.pdb")).unwrap();
        File::create(dir.path().join("model_prepared.3.pdb")).unwrap();

        assert_eq!(
            versioned_path(&path),
            dir.path().join("model_prepared.4.pdb")
        );
    }
}
