#![deny(warnings)]

//! Headless driver: restore the factory, run it for a while, save and report.

mod format;

use anyhow::{bail, Context, Result};
use format::{format_duration, format_number, format_rate};
use persistence::{FileStore, LoadSource};
use sim_core::{validate_config, EconConfig, Stage, SystemClock, TimeSource};
use sim_runtime::{EconomyEvent, OfflineReport, PriceSheet, Session};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct Args {
    save_dir: PathBuf,
    config: Option<PathBuf>,
    seconds: u32,
    clicks: u32,
    autobuy: bool,
    reset: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        save_dir: PathBuf::from("saves"),
        config: None,
        seconds: 10,
        clicks: 0,
        autobuy: false,
        reset: false,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--save-dir" => args.save_dir = it.next().context("--save-dir needs a path")?.into(),
            "--config" => args.config = Some(it.next().context("--config needs a path")?.into()),
            "--seconds" => args.seconds = number(&mut it, "--seconds")?,
            "--clicks" => args.clicks = number(&mut it, "--clicks")?,
            "--autobuy" => args.autobuy = true,
            "--reset" => args.reset = true,
            other => bail!("unknown argument {other:?}"),
        }
    }
    Ok(args)
}

fn number(it: &mut impl Iterator<Item = String>, flag: &str) -> Result<u32> {
    let raw = it.next().with_context(|| format!("{flag} needs a value"))?;
    raw.parse()
        .with_context(|| format!("{flag}: {raw:?} is not a whole number"))
}

fn load_config(path: Option<&Path>) -> Result<EconConfig> {
    let Some(path) = path else {
        return Ok(EconConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: EconConfig = serde_yaml::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    validate_config(&config).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(config)
}

/// Settle, then keep buying the cheapest affordable upgrade.
fn autobuy(session: &mut Session) -> u32 {
    session.settle();
    let mut bought = 0;
    while let Some((upgrade, _)) = session.price_sheet().cheapest_affordable() {
        match session.buy(upgrade) {
            Ok(_) => bought += 1,
            Err(e) => {
                warn!(error = %e, ?upgrade, "autobuy stopped");
                break;
            }
        }
    }
    bought
}

fn print_offline(report: &OfflineReport) {
    if report.applied_ms == 0 {
        return;
    }
    let away = format_duration(report.elapsed_ms as f64 / 1000.0);
    let credited = format_duration(report.applied_ms as f64 / 1000.0);
    if report.capped {
        println!(
            "Welcome back after {away}: credited {credited} (cap reached), {} units dispatched",
            format_number(report.dispatched, 1)
        );
    } else {
        println!(
            "Welcome back after {away}: {} units dispatched",
            format_number(report.dispatched, 1)
        );
    }
}

fn print_summary(sheet: &PriceSheet) {
    println!(
        "Currency {} | sell price {} | brand L{} (next {})",
        format_number(sheet.currency, 1),
        format_number(sheet.sell_price, 2),
        sheet.brand_level,
        format_number(sheet.brand_cost, 1),
    );
    for stage in Stage::ALL {
        let q = &sheet.stages[stage];
        let marker = if stage == sheet.bottleneck { " <- bottleneck" } else { "" };
        println!(
            "  {:<8} stock {:>7} | {:>9} | workers {:>3} (next {}) | facility L{} (next {}){marker}",
            stage.name(),
            format_number(q.stock, 1),
            format_rate(q.rate),
            q.workers,
            format_number(q.hire_cost, 1),
            q.facility_level,
            format_number(q.facility_cost, 1),
        );
    }
    let ready = if sheet.can_settle { "ready to sell" } else { "nothing to sell" };
    println!("Sell queue {} ({ready})", format_number(sheet.sell_queue, 2));
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = parse_args()?;
    info!(
        git_sha = env!("GIT_SHA"),
        build_date = env!("BUILD_DATE"),
        ?args,
        "starting CLI"
    );
    let config = load_config(args.config.as_deref())?;

    let clock = SystemClock;
    let mut store = FileStore::new(&args.save_dir);
    let (mut session, restored) = Session::restore(config, &store, clock.now_ms());
    if restored.source == LoadSource::Discarded {
        println!("Save could not be read; starting a new factory.");
    }
    print_offline(&restored.offline);

    if args.reset && !session.reset(&mut store, clock.now_ms()) {
        warn!("reset did not fully persist");
    }

    let events = session.events().subscribe_channel();
    let mut bought = 0;
    for _ in 0..args.seconds {
        for _ in 0..args.clicks {
            session.click();
        }
        session.advance(1000.0);
        if args.autobuy {
            bought += autobuy(&mut session);
        }
        session.maybe_autosave(&mut store, clock.now_ms());
    }
    session.settle();

    let mut produced_steps = 0u64;
    let mut earned = 0.0;
    for event in events.try_iter() {
        match event {
            EconomyEvent::Produced { steps, .. } => produced_steps += u64::from(steps),
            EconomyEvent::Settled { earned: e, .. } => earned += e,
            _ => {}
        }
    }
    debug!(produced_steps, bought, "simulation finished");

    if !session.save(&mut store, clock.now_ms()) {
        warn!(dir = %store.dir().display(), "final save failed");
    }

    println!(
        "Ran {} | {produced_steps} steps | {bought} upgrades | earned {}",
        format_duration(f64::from(args.seconds)),
        format_number(earned, 1),
    );
    print_summary(&session.price_sheet());
    Ok(())
}
