use dossier::{Catalog, Composer, generate_all};
use std::path::Path;
use std::process::ExitCode;

/// Batch entry point: regenerate every report artifact in the working
/// directory, resolving figures from ./visualizations. Takes no arguments
/// and has no partial-selection mode.
fn main() -> ExitCode {
    if std::env::args().len() > 1 {
        eprintln!("usage: generate_reports");
        eprintln!("Regenerates all report artifacts in the current directory.");
        return ExitCode::from(2);
    }

    let composer = match Composer::builder()
        .asset_root(".")
        .header_text("Data Science Professional Portfolio | 2026")
        .build()
    {
        Ok(composer) => composer,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    let catalog = Catalog::load();

    let mut failures = 0usize;
    for entry in generate_all(&composer, &catalog, Path::new(".")) {
        match entry.result {
            Ok(bytes) => {
                println!("generated: {} ({} bytes)", entry.artifact.display(), bytes);
            }
            Err(err) => {
                failures += 1;
                eprintln!("failed: {}: {}", entry.artifact.display(), err);
            }
        }
    }

    if failures > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
