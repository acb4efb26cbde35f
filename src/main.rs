// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod cli;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context as _;
use clap::Parser;

use rigging::backends::ProcessRunner;
use rigging::config::{load_and_validate_config, RuntimeBuilder};
use rigging::engine::{Context, ParallelDriver};
use rigging::observability::init_tracing;

use crate::cli::Args;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args.log_level);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = load_and_validate_config(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    let (registry, mut driver) = RuntimeBuilder::from_config(&config, Arc::new(ProcessRunner));
    if let Some(jobs) = args.jobs {
        driver = ParallelDriver::new(jobs).with_policy(driver.policy());
    }
    if let Some(policy) = args.policy {
        driver = driver.with_policy(policy.into());
    }

    let ctx = Context::new();
    let interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let units = ParallelDriver::build_units(registry.select(args.unit.as_deref())?, &ctx)?;
    ParallelDriver::validate(&units, &ctx)?;

    if args.validate_only {
        println!("✅ {} unit(s) valid", units.len());
        return Ok(());
    }

    let start = Instant::now();
    let report = driver.run(units, &ctx).await?;

    println!(
        "✅ {} unit(s) converged in {:.2?}: {} applied, {} already satisfied, {} visited",
        report.succeeded,
        start.elapsed(),
        report.totals.applied,
        report.totals.satisfied,
        report.totals.visited
    );
    Ok(())
}
