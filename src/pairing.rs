//! File pairing: discover images and pair each OCR output with its ground truth.
//!
//! Images only define the unit ids; they are never opened here. For an image
//! `dir/<stem>.<ext>` the resolver reads `dir/<stem>.gt.txt` and
//! `dir/<stem>.<model>.txt`. Both must exist.

use crate::config::EvaluationConfig;
use crate::error::{EvalError, Result};
use crate::unit::{EvaluationUnit, SkippedUnit};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Outcome of pairing a data directory.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Units ready for scoring, in discovery order.
    pub units: Vec<EvaluationUnit>,
    /// Units excluded because their ground truth was blank.
    pub skipped: Vec<SkippedUnit>,
}

impl Resolution {
    /// Number of images discovered.
    pub fn discovered(&self) -> usize {
        self.units.len() + self.skipped.len()
    }
}

/// List images in the data directory whose extension is accepted.
///
/// Only the top level is scanned. Results are grouped by the configured
/// extension order and sorted by path within each group.
pub fn discover_images(config: &EvaluationConfig) -> Result<Vec<PathBuf>> {
    let dir = &config.data_dir;
    if !dir.is_dir() {
        return Err(EvalError::DataDirNotFound(dir.clone()));
    }

    let mut found: Vec<(usize, PathBuf)> = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.clone());
            EvalError::io(path, e.into())
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.into_path();
        if let Some(rank) = extension_rank(&path, &config.accepted_extensions) {
            found.push((rank, path));
        }
    }

    found.sort();
    Ok(found.into_iter().map(|(_, path)| path).collect())
}

fn extension_rank(path: &Path, accepted: &[String]) -> Option<usize> {
    let ext = path.extension()?.to_str()?;
    accepted.iter().position(|a| a.eq_ignore_ascii_case(ext))
}

/// Pair every discovered image with its ground truth and OCR output.
///
/// A missing file aborts the whole resolution. A blank ground truth only
/// excludes its unit and is logged with its absolute path.
pub fn resolve_units(config: &EvaluationConfig) -> Result<Resolution> {
    let images = discover_images(config)?;
    log::info!(
        "Discovered {} images in {}",
        images.len(),
        config.data_dir.display()
    );

    let mut resolution = Resolution::default();
    for image in images {
        let unit_id = unit_id_for(&image);

        let reference_path = config.reference_path(&image);
        if !reference_path.is_file() {
            return Err(EvalError::MissingReference {
                image,
                expected: reference_path,
            });
        }

        let hypothesis_path = config.hypothesis_path(&image);
        if !hypothesis_path.is_file() {
            return Err(EvalError::MissingHypothesis {
                image,
                expected: hypothesis_path,
            });
        }

        let reference = read_text(&reference_path)?;
        let hypothesis = read_text(&hypothesis_path)?;

        match EvaluationUnit::new(
            unit_id.clone(),
            &config.crop_separator,
            image,
            reference,
            hypothesis,
        ) {
            Some(unit) => {
                log::debug!("Paired {} -> {}", unit.unit_id, unit.parent_document_id);
                resolution.units.push(unit);
            }
            None => {
                let absolute = std::path::absolute(&reference_path).unwrap_or(reference_path);
                log::warn!(
                    "Ground-truth file '{}' is empty; skipping unit '{}'",
                    absolute.display(),
                    unit_id
                );
                resolution.skipped.push(SkippedUnit {
                    unit_id,
                    reference_path: absolute,
                    reason: "ground-truth file has no non-whitespace content".to_string(),
                });
            }
        }
    }

    Ok(resolution)
}

/// Unit id of an image: its file stem, with invalid UTF-8 replaced.
fn unit_id_for(image: &Path) -> String {
    image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| EvalError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    fn config_for(dir: &TempDir) -> EvaluationConfig {
        Config::for_model(dir.path(), "por_ft").evaluation
    }

    #[test]
    fn test_discover_filters_and_orders_by_extension() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "b.png", "");
        write(dir.path(), "a.png", "");
        write(dir.path(), "c.jpg", "");
        write(dir.path(), "c.gt.txt", "");
        write(dir.path(), "notes.md", "");
        fs::create_dir(dir.path().join("nested.png")).unwrap();

        let images = discover_images(&config_for(&dir)).unwrap();
        let names: Vec<_> = images
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["c.jpg", "a.png", "b.png"]);
    }

    #[test]
    fn test_discover_missing_dir() {
        let config = Config::for_model("/nonexistent/segments", "por_ft").evaluation;
        assert!(matches!(
            discover_images(&config),
            Err(EvalError::DataDirNotFound(_))
        ));
    }

    #[test]
    fn test_resolve_pairs_files() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "page1_crop_0.png", "");
        write(dir.path(), "page1_crop_0.gt.txt", "the cat sat\n");
        write(dir.path(), "page1_crop_0.por_ft.txt", "the dog sat\n");
        write(dir.path(), "page2.tif", "");
        write(dir.path(), "page2.gt.txt", "abc");
        write(dir.path(), "page2.por_ft.txt", "");

        let resolution = resolve_units(&config_for(&dir)).unwrap();
        assert_eq!(resolution.units.len(), 2);
        assert!(resolution.skipped.is_empty());

        let crop = &resolution.units[0];
        assert_eq!(crop.unit_id, "page1_crop_0");
        assert_eq!(crop.parent_document_id, "page1");
        assert_eq!(crop.hypothesis_text, "the dog sat\n");

        let page = &resolution.units[1];
        assert_eq!(page.parent_document_id, "page2");
        assert!(page.hypothesis_text.is_empty());
    }

    #[test]
    fn test_blank_reference_is_skipped() {
        let dir = TempDir::new().unwrap();
        for (name, gt) in [("a", "one"), ("b", "   \n"), ("c", "three")] {
            write(dir.path(), &format!("{}.png", name), "");
            write(dir.path(), &format!("{}.gt.txt", name), gt);
            write(dir.path(), &format!("{}.por_ft.txt", name), "x");
        }

        let resolution = resolve_units(&config_for(&dir)).unwrap();
        assert_eq!(resolution.units.len(), 2);
        assert_eq!(resolution.skipped.len(), 1);
        assert_eq!(resolution.discovered(), 3);

        let skipped = &resolution.skipped[0];
        assert_eq!(skipped.unit_id, "b");
        assert!(skipped.reference_path.is_absolute());
        assert!(skipped.reference_path.ends_with("b.gt.txt"));
    }

    #[test]
    fn test_missing_hypothesis_is_fatal() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.png", "");
        write(dir.path(), "a.gt.txt", "one");

        let err = resolve_units(&config_for(&dir)).unwrap_err();
        assert!(matches!(err, EvalError::MissingHypothesis { .. }));
        assert!(err.is_missing_input());
    }

    #[test]
    fn test_missing_reference_is_fatal() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.png", "");
        write(dir.path(), "a.por_ft.txt", "one");

        let err = resolve_units(&config_for(&dir)).unwrap_err();
        assert!(matches!(err, EvalError::MissingReference { .. }));
    }

    #[test]
    fn test_unit_id_is_file_stem() {
        assert_eq!(unit_id_for(Path::new("/data/page1_crop_0.png")), "page1_crop_0");
        assert_eq!(unit_id_for(Path::new("scan.v2.tif")), "scan.v2");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_stem_is_replaced_not_dropped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        for stem in [&b"p\xe1gina"[..], &b"p\xe9gina"[..]] {
            let stem = OsStr::from_bytes(stem).to_os_string();
            for suffix in [".png", ".gt.txt", ".por_ft.txt"] {
                let mut name = stem.clone();
                name.push(suffix);
                fs::write(dir.path().join(name), "one").unwrap();
            }
        }

        let resolution = resolve_units(&config_for(&dir)).unwrap();
        assert_eq!(resolution.units.len(), 2);
        for unit in &resolution.units {
            assert_eq!(unit.unit_id, "p\u{FFFD}gina");
            assert_eq!(unit.parent_document_id, "p\u{FFFD}gina");
        }
    }
}
