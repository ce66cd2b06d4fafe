use crate::catalog::{Catalog, Topic};
use crate::error::DossierError;
use crate::report::Composer;
use std::path::{Path, PathBuf};

/// Result of generating one topic's artifact during a batch run.
pub struct BatchEntry {
    pub topic: Topic,
    pub artifact: PathBuf,
    pub result: Result<usize, DossierError>,
}

/// Regenerate every catalog artifact under `out_dir`. A write failure is
/// fatal to that single artifact only; the remaining topics still generate.
/// There is no partial-selection mode and nothing is retried.
pub fn generate_all(composer: &Composer, catalog: &Catalog, out_dir: &Path) -> Vec<BatchEntry> {
    catalog
        .iter()
        .map(|(topic, spec)| {
            let artifact = out_dir.join(topic.artifact_file_name());
            let result = composer.compose_to_file(spec, &artifact);
            BatchEntry {
                topic,
                artifact,
                result,
            }
        })
        .collect()
}

/// Host-facing artifact read for the download surface. A report that was
/// never generated (or was deleted) surfaces as an explicit
/// `ArtifactNotFound`, never a silent no-op.
pub fn load_artifact(dir: &Path, topic: Topic) -> Result<Vec<u8>, DossierError> {
    let path = dir.join(topic.artifact_file_name());
    if !path.is_file() {
        return Err(DossierError::ArtifactNotFound(topic.artifact_file_name()));
    }
    Ok(std::fs::read(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdfinspect::inspect_pdf_bytes;

    fn temp_dir(tag: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let dir = std::env::temp_dir().join(format!(
            "dossier_batch_{tag}_{}_{}",
            std::process::id(),
            nanos
        ));
        std::fs::create_dir_all(&dir).expect("mkdir");
        dir
    }

    #[test]
    fn batch_produces_all_six_artifacts_against_a_missing_store() {
        let out_dir = temp_dir("empty_store");
        let composer = Composer::builder()
            .asset_root(out_dir.join("no_such_store"))
            .build()
            .expect("composer");
        let catalog = Catalog::load();

        let entries = generate_all(&composer, &catalog, &out_dir);
        assert_eq!(entries.len(), 6);
        for entry in &entries {
            let bytes = entry.result.as_ref().expect("artifact generates");
            assert!(*bytes > 0);
            let data = std::fs::read(&entry.artifact).expect("artifact exists");
            let report = inspect_pdf_bytes(&data).expect("artifact parses");
            assert!(report.page_count >= 1);
        }

        let _ = std::fs::remove_dir_all(&out_dir);
    }

    #[test]
    fn one_unwritable_artifact_does_not_abort_the_batch() {
        let out_dir = temp_dir("isolated_failure");
        // Occupy one artifact name with a directory so its File::create fails.
        std::fs::create_dir_all(out_dir.join(Topic::Sales.artifact_file_name()))
            .expect("blocker");
        let composer = Composer::builder()
            .asset_root(&out_dir)
            .build()
            .expect("composer");
        let catalog = Catalog::load();

        let entries = generate_all(&composer, &catalog, &out_dir);
        let failed: Vec<Topic> = entries
            .iter()
            .filter(|e| e.result.is_err())
            .map(|e| e.topic)
            .collect();
        assert_eq!(failed, vec![Topic::Sales]);
        assert_eq!(entries.iter().filter(|e| e.result.is_ok()).count(), 5);
        match &entries.iter().find(|e| e.topic == Topic::Sales).unwrap().result {
            Err(DossierError::Io(_)) => {}
            other => panic!("expected an io error, got {:?}", other.as_ref().err()),
        }

        let _ = std::fs::remove_dir_all(&out_dir);
    }

    #[test]
    fn load_artifact_round_trips_generated_bytes() {
        let out_dir = temp_dir("round_trip");
        let composer = Composer::builder()
            .asset_root(&out_dir)
            .build()
            .expect("composer");
        let catalog = Catalog::load();
        generate_all(&composer, &catalog, &out_dir);

        let bytes = load_artifact(&out_dir, Topic::Financial).expect("load");
        assert!(bytes.starts_with(b"%PDF-"));

        let _ = std::fs::remove_dir_all(&out_dir);
    }

    #[test]
    fn absent_artifact_is_an_explicit_error() {
        let out_dir = temp_dir("absent");
        match load_artifact(&out_dir, Topic::Sports) {
            Err(DossierError::ArtifactNotFound(name)) => {
                assert_eq!(name, "Sports_Analysis.pdf");
            }
            _ => panic!("expected ArtifactNotFound"),
        }
        let _ = std::fs::remove_dir_all(&out_dir);
    }
}
