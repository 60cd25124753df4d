use std::io;

use anyhow::{Context, Result};
use log::info;

use model_pipeline::{PipelineConfig, run};

fn main() -> Result<()> {
    env_logger::init();

    let config = PipelineConfig::from_env().context("reading configuration")?;
    info!(max_iters = config.max_iters.get(); "publishing to bucket {}", config.bucket);

    let store = config.open_store().context("opening the object store")?;
    let mut out = io::stdout().lock();
    run(&config, store, &mut out).context("running the pipeline")?;

    Ok(())
}
