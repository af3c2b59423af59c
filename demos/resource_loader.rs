//! Resource Loader
//!
//! This example demonstrates asynchronous loading with cancellation and
//! staleness reporting.
//!
//! Key concepts:
//! - A trigger that performs async work and can fail
//! - Observing the cancellation token inside the trigger future
//! - Detached triggers whose stale results are reported, not applied
//! - Recording notifications with `EventLog`
//!
//! Run with: cargo run --example resource_loader

use settle::builder::{EngineBuilder, TransitionBuilder};
use settle::core::{State, Step};
use settle::engine::{TriggerError, TriggerTask};
use settle::events::{Event, EventLog};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Clone, PartialEq, Debug)]
enum Resource {
    Idle,
    Loading { url: String },
    Prefetching { url: String },
    Ready { bytes: usize },
    Failed { reason: String },
}

impl State for Resource {
    fn name(&self) -> &str {
        match self {
            Self::Idle => "idle",
            Self::Loading { .. } => "loading",
            Self::Prefetching { .. } => "prefetching",
            Self::Ready { .. } => "ready",
            Self::Failed { .. } => "failed",
        }
    }
}

async fn fetch(url: String, cancel: CancellationToken) -> Result<Step<Resource>, TriggerError> {
    tokio::select! {
        _ = cancel.cancelled() => {
            tracing::info!(%url, "fetch abandoned");
            Ok(Step::Unchanged)
        }
        _ = tokio::time::sleep(Duration::from_millis(200)) => {
            if url.ends_with(".missing") {
                Err(TriggerError::failed(format!("{} not found", url)))
            } else {
                Ok(Step::Next(Resource::Ready { bytes: url.len() * 128 }))
            }
        }
    }
}

fn loaders(state: &Resource, cancel: &CancellationToken) -> Option<TriggerTask<Resource>> {
    match state {
        Resource::Loading { url } => {
            let url = url.clone();
            Some(
                TriggerTask::new(fetch(url.clone(), cancel.clone()))
                    .on_cancel(move || tracing::info!(%url, "load cancelled")),
            )
        }
        Resource::Prefetching { url } => {
            Some(TriggerTask::new(fetch(url.clone(), cancel.clone())).detached())
        }
        Resource::Idle | Resource::Ready { .. } | Resource::Failed { .. } => None,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== Resource Loader ===\n");

    let log = EventLog::new();
    let engine = EngineBuilder::new()
        .initial(Resource::Idle)
        .transition(
            TransitionBuilder::new()
                .name("load")
                .from_any()
                .to(|_, url: &String| Resource::Loading { url: url.clone() }),
        )?
        .transition(
            TransitionBuilder::new()
                .name("prefetch")
                .from(["idle", "ready"])
                .to(|_, url: &String| Resource::Prefetching { url: url.clone() }),
        )?
        .transition(
            TransitionBuilder::new()
                .name("reset")
                .from_any()
                .apply(|state: &Resource, _: &String| match state {
                    Resource::Idle => Step::Unchanged,
                    _ => Step::Next(Resource::Idle),
                }),
        )?
        .triggers(loaders)
        .events(log.clone())
        .build()?;

    let (state, transitions) = engine.start();
    let url = |s: &str| s.to_string();

    println!("1. Load, then change our mind halfway through");
    transitions.invoke_with("load", &state.state(), &url("https://example.com/a.bin"))?;
    tokio::time::sleep(Duration::from_millis(100)).await;
    transitions.invoke_with("load", &state.state(), &url("https://example.com/b.bin"))?;
    tokio::time::sleep(Duration::from_millis(300)).await;
    println!("   state: {:?}", state.state());

    println!("2. Load something that does not exist");
    transitions.invoke_with("load", &state.state(), &url("https://example.com/c.missing"))?;
    tokio::time::sleep(Duration::from_millis(300)).await;
    println!("   state: {:?}", state.state());

    println!("3. Prefetch, then reset before it lands");
    transitions.invoke_with("reset", &state.state(), &String::new())?;
    transitions.invoke_with("prefetch", &state.state(), &url("https://example.com/d.bin"))?;
    transitions.invoke_with("reset", &state.state(), &String::new())?;
    tokio::time::sleep(Duration::from_millis(300)).await;
    println!("   state: {:?}", state.state());

    println!("\nEvents:");
    for event in log.events() {
        match event {
            Event::StateChanged(snapshot) => {
                println!("  changed  -> {} ({})", snapshot.state.name(), snapshot.id)
            }
            Event::TriggerIgnored(ignored) => println!(
                "  ignored  {:?} armed for {}, live is {}",
                ignored.discarded, ignored.expected.id, ignored.actual.id
            ),
            Event::TriggerFailed(message) => println!("  failed   {}", message),
        }
    }

    Ok(())
}
