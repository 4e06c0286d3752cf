use std::{path::PathBuf, sync::Arc, time::Duration};

use alternation_core::{
    load_settings, load_settings_from, AlternationOptions, TransitionDescriptor, TransitionEffect,
    ViewPair,
};
use anyhow::{bail, Result};
use async_trait::async_trait;
use clap::Parser;
use serde::Serialize;
use shared::domain::{RoutePath, SlotRole};
use tracing::{debug, info};

const BACKWARDS_PREFIX: &str = "back:";

/// Replays a scripted list of navigations against an alternating view pair.
#[derive(Parser, Debug)]
struct Args {
    /// Settings file; defaults to ./alternation.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    forget_state: bool,
    #[arg(long)]
    transition_ms: Option<u64>,
    /// How long the simulated transition effect takes.
    #[arg(long, default_value_t = 0)]
    effect_ms: u64,
    #[arg(long, default_value = "/")]
    initial: String,
    /// Route paths to visit in order; prefix with `back:` for a backwards navigation.
    steps: Vec<String>,
}

struct TimedTransition {
    duration: Duration,
}

#[async_trait]
impl TransitionEffect<RoutePath> for TimedTransition {
    async fn invoke_transition(&self, descriptor: &TransitionDescriptor<RoutePath>) -> Result<()> {
        info!(
            into = ?descriptor.into_view.as_ref().map(RoutePath::as_str),
            out_of = ?descriptor.out_of_view.as_ref().map(RoutePath::as_str),
            backwards = descriptor.backwards,
            first_render = descriptor.first_render,
            "navigator: transition started"
        );
        tokio::time::sleep(self.duration).await;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct SlotReport {
    step: usize,
    slot: SlotRole,
    is_active: bool,
    transition: Option<TransitionDescriptor<RoutePath>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    route: RoutePath,
    backwards: bool,
}

fn parse_step(raw: &str) -> Result<Step> {
    let (path, backwards) = match raw.strip_prefix(BACKWARDS_PREFIX) {
        Some(path) => (path.trim(), true),
        None => (raw.trim(), false),
    };
    if path.is_empty() {
        bail!("navigation step '{raw}' has no route path");
    }
    Ok(Step {
        route: RoutePath::new(path),
        backwards,
    })
}

fn resolve_options(args: &Args) -> Result<AlternationOptions> {
    let loaded = match &args.config {
        Some(path) => load_settings_from(path)?,
        None => load_settings(),
    };
    Ok(apply_flags(args, loaded))
}

fn apply_flags(args: &Args, mut options: AlternationOptions) -> AlternationOptions {
    if args.forget_state {
        options.forget_state_on_transition = true;
    }
    if let Some(ms) = args.transition_ms {
        options.transition_duration_milliseconds = ms;
    }
    options
}

async fn report(pair: &ViewPair<RoutePath>, step: usize) -> Vec<SlotReport> {
    let mut reports = Vec::with_capacity(2);
    for role in [SlotRole::Primary, SlotRole::Secondary] {
        let slot = pair.slot(role);
        reports.push(SlotReport {
            step,
            slot: role,
            is_active: slot.is_active().await,
            transition: slot.transition().await,
        });
    }
    reports
}

async fn run(args: Args, options: AlternationOptions) -> Result<Vec<SlotReport>> {
    let steps = args
        .steps
        .iter()
        .map(|raw| parse_step(raw))
        .collect::<Result<Vec<_>>>()?;

    let pair = ViewPair::<RoutePath>::new(
        options,
        Arc::new(|slot: SlotRole| -> Result<()> {
            debug!(slot = %slot, "navigator: rerender requested");
            Ok(())
        }),
        Arc::new(TimedTransition {
            duration: Duration::from_millis(args.effect_ms),
        }),
    )
    .await;

    pair.mount(RoutePath::new(args.initial.clone())).await?;
    let mut reports = report(&pair, 0).await;

    for (index, step) in steps.into_iter().enumerate() {
        info!(
            step = index + 1,
            route = %step.route,
            backwards = step.backwards,
            "navigator: navigating"
        );
        pair.route_changed(step.route, step.backwards).await?;
        reports.extend(report(&pair, index + 1).await);
    }

    Ok(reports)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();
    let options = resolve_options(&args)?;

    for report in run(args, options).await? {
        println!("{}", serde_json::to_string(&report)?);
    }
    Ok(())
}
