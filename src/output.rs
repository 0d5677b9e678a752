use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use geocentrality_core::assembly::ScoredGeometryCollection;
use geocentrality_core::providers::ResultWriter;
use tracing::{info, warn};

/// Files of one run, inside `<root>/<run name>/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    pub folder: PathBuf,
    pub image: PathBuf,
    pub vector: PathBuf,
}

impl RunPaths {
    pub fn new(root: &Path, run_name: &str) -> Self {
        let folder = root.join(run_name);
        Self {
            image: folder.join(format!("{run_name}.png")),
            vector: folder.join(format!("{run_name}.geojson")),
            folder,
        }
    }

    /// Creates the output root and the run folder unless they exist.
    pub fn create_folders(&self) -> Result<()> {
        if let Some(root) = self.folder.parent() {
            ensure_folder(root)?;
        }
        ensure_folder(&self.folder)
    }

    /// Writes the map and then the GeoJSON of `result`. On failure neither
    /// file is left behind.
    pub fn write_results(
        &self,
        writer: &impl ResultWriter,
        result: &ScoredGeometryCollection,
        title: &str,
    ) -> Result<()> {
        if let Err(err) = writer.write_image(result, title, &self.image) {
            self.discard_files();
            return Err(err).with_context(|| format!("Failed to write {}", self.image.display()));
        }
        if let Err(err) = writer.write_vector_file(result, &self.vector) {
            self.discard_files();
            return Err(err).with_context(|| format!("Failed to write {}", self.vector.display()));
        }
        Ok(())
    }

    fn discard_files(&self) {
        for path in [&self.image, &self.vector] {
            if !path.is_file() {
                continue;
            }
            match fs::remove_file(path) {
                Ok(()) => info!("Removed incomplete output {}", path.display()),
                Err(e) => warn!("Failed to remove incomplete output {}: {e}", path.display()),
            }
        }
    }
}

fn ensure_folder(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Ok(());
    }
    if path.is_dir() {
        info!("Folder {} already exists", path.display());
        return Ok(());
    }
    fs::create_dir_all(path)
        .with_context(|| format!("Failed to create folder {}", path.display()))?;
    info!("Folder {} created", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geocentrality_core::Error;
    use geocentrality_core::centrality::Strategy;

    /// Writes placeholder bytes where the real writer would render
    struct PlainWriter;

    impl ResultWriter for PlainWriter {
        fn write_image(
            &self,
            _records: &ScoredGeometryCollection,
            _title: &str,
            path: &Path,
        ) -> Result<(), Error> {
            Ok(fs::write(path, b"png")?)
        }

        fn write_vector_file(
            &self,
            _records: &ScoredGeometryCollection,
            path: &Path,
        ) -> Result<(), Error> {
            Ok(fs::write(path, b"{}")?)
        }
    }

    fn empty_result() -> ScoredGeometryCollection {
        ScoredGeometryCollection {
            strategy: Strategy::Empirical,
            records: Vec::new(),
        }
    }

    fn run_paths(dir: &Path) -> RunPaths {
        let paths = RunPaths::new(&dir.join("output"), "Town_geographical_length_10");
        paths.create_folders().unwrap();
        paths
    }

    #[test]
    fn paths_are_named_after_the_run() {
        let paths = RunPaths::new(Path::new("output"), "Heidelberg_networkx_length_1");
        assert_eq!(
            paths.folder,
            PathBuf::from("output/Heidelberg_networkx_length_1")
        );
        assert_eq!(
            paths.image,
            PathBuf::from("output/Heidelberg_networkx_length_1/Heidelberg_networkx_length_1.png")
        );
        assert_eq!(
            paths.vector,
            PathBuf::from(
                "output/Heidelberg_networkx_length_1/Heidelberg_networkx_length_1.geojson"
            )
        );
    }

    #[test]
    fn creates_missing_folders_and_keeps_existing_ones() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("output");
        let paths = RunPaths::new(&root, "Town_geographical_length_10");

        paths.create_folders().unwrap();
        assert!(paths.folder.is_dir());

        fs::write(paths.folder.join("keep.txt"), "x").unwrap();
        paths.create_folders().unwrap();
        assert!(paths.folder.join("keep.txt").exists());
    }

    #[test]
    fn file_in_the_way_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("output");
        fs::write(&root, "not a folder").unwrap();
        assert!(RunPaths::new(&root, "run").create_folders().is_err());
    }

    #[test]
    fn writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = run_paths(dir.path());
        paths.write_results(&PlainWriter, &empty_result(), "title").unwrap();
        assert!(paths.image.is_file());
        assert!(paths.vector.is_file());
    }

    #[test]
    fn failed_vector_write_leaves_no_map() {
        let dir = tempfile::tempdir().unwrap();
        let paths = run_paths(dir.path());
        fs::create_dir(&paths.vector).unwrap();

        let result = paths.write_results(&PlainWriter, &empty_result(), "title");
        assert!(result.is_err());
        assert!(!paths.image.exists());
        assert!(paths.vector.is_dir());
    }
}
