mod bootstrap;
mod display;

use anyhow::{Context, Result};
use impact_core::settings::Settings;
use impact_data::analysis::{analyze_storm_data, PipelineOptions};

fn main() -> Result<()> {
    let settings = Settings::load()?;

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("storm-impact v{} starting", env!("CARGO_PKG_VERSION"));

    let data_file = match settings.data_file.clone() {
        Some(path) => path,
        None => bootstrap::discover_data_file().context(
            "no StormData.csv found in ./, ./data/ or ~/.storm-impact/; pass --data-file <PATH>",
        )?,
    };
    tracing::info!("Reading storm events from {}", data_file.display());

    let options = PipelineOptions {
        window: settings.window(),
        apply_patches: !settings.skip_patches,
    };
    let result = analyze_storm_data(&data_file, &options)
        .with_context(|| format!("failed to analyse {}", data_file.display()))?;

    let top = settings.top as usize;
    if settings.json_output() {
        println!("{}", display::render_json(&result, top)?);
    } else {
        print!("{}", display::render_report(&result, top));
    }

    tracing::info!(
        "Done in {:.2}s (load {:.2}s)",
        result.metadata.load_time_seconds + result.metadata.transform_time_seconds,
        result.metadata.load_time_seconds
    );
    Ok(())
}
