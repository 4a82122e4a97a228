use profile_export::config::ExportConfig;
use profile_export::error::ExportResult;
use profile_export::{export, logging};

fn run() -> ExportResult<()> {
    let (mut config, origin) = ExportConfig::load_or_default()?;
    config.apply_env_overrides();
    config.validate()?;
    logging::init_logging(&config.logging)?;

    match origin {
        Some(path) => tracing::info!(target: "profile_export", "Loaded config from {}", path.display()),
        None => tracing::info!(target: "profile_export", "Using default configuration"),
    }

    let summary = export::export_capture(&config)?;
    tracing::info!(
        target: "profile_export",
        first = summary.range.first,
        last = summary.range.last,
        "Wrote {} files to {}",
        summary.files.len(),
        config.output_dir.display()
    );
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Profile export failed: {}", e);
        std::process::exit(1);
    }
}
