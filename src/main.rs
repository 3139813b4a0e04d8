mod calibrate;
mod cli;
mod clock;
mod config;
mod error;
mod logging;
mod measure;
mod memlock;
mod output;
mod stats;
mod topology;

use std::path::Path;
use std::process;

use clap::Parser;

use cli::Cli;
use clock::{Clock, MonotonicClock};
use config::RunConfig;
use error::Error;
use measure::Engine;

/// Build a RunConfig by layering: defaults → TOML file → CLI overrides.
///
/// A missing config file falls back to defaults; an unreadable or malformed one is an error.
fn build_run_config(config_file: Option<&Path>, cli: &Cli) -> Result<RunConfig, Error> {
    let mut cfg = match config::load_config(config_file) {
        Ok(c) => c.run,
        Err(e @ Error::ConfigNotFound(_)) => {
            log::warn!("{}", e);
            RunConfig::default()
        }
        Err(e) => return Err(e),
    };

    if let Some(v) = cli.runtime {
        cfg.runtime = v;
    }
    if let Some(v) = cli.threshold {
        cfg.threshold_ns = Some(v);
    }
    if let Some(v) = cli.samples {
        cfg.samples = Some(v);
    }
    Ok(cfg)
}

fn run(cli: &Cli, cfg: &RunConfig) -> Result<(), Error> {
    cfg.validate()?;

    let cpus = topology::allowed_cpus()?;
    log::info!("measuring {} cpus: {:?}", cpus.len(), cpus);

    let threshold = match cfg.threshold_ns {
        Some(t) => t,
        None => {
            let t = calibrate::calibrate_threshold(&mut MonotonicClock);
            log::info!("calibrated threshold: {}ns", t);
            t
        }
    };

    let mut stores = measure::reserve(&cpus, cfg.sample_capacity())?;
    if !memlock::lock_all() {
        log::info!("continuing with unlocked memory, page faults may appear as hiccups");
    }

    let deadline = MonotonicClock.now().saturating_add(cfg.runtime_ns());
    log::info!(
        "sampling for {}s, threshold={}ns capacity={}",
        cfg.runtime,
        threshold,
        cfg.sample_capacity(),
    );
    Engine::new(threshold).run(&mut stores, deadline, |_| MonotonicClock)?;

    for (cpu, store) in &stores {
        if store.overflows() > 0 {
            log::warn!(
                "cpu {}: recorded {} hiccups, outgrew reserved sample space {} times",
                cpu,
                store.len(),
                store.overflows()
            );
        } else if store.is_empty() {
            log::info!("cpu {}: no hiccups above {}ns", cpu, threshold);
        }
    }

    let reports: Vec<_> = stores
        .into_iter()
        .map(|(cpu, store)| stats::summarize(cpu, threshold, store))
        .collect();
    output::write_report(&reports, &cli.format, cli.output_file.as_deref())?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    logging::init(&cli.log);

    let result = build_run_config(cli.config_file.as_deref(), &cli).and_then(|cfg| run(&cli, &cfg));
    if let Err(e) = result {
        log::error!("{}", e);
        process::exit(1);
    }
}
