//! Traffic Light
//!
//! This example demonstrates a cyclic engine driven entirely by triggers.
//!
//! Key concepts:
//! - Timed triggers armed on state entry
//! - Manual `stop` preempting the outstanding trigger
//! - Parameters passed to `start`
//! - Logging through `tracing` (set `RUST_LOG=settle=trace` for detail)
//!
//! Run with: cargo run --example traffic_light

use settle::builder::{EngineBuilder, TransitionBuilder};
use settle::core::State;
use settle::engine::TriggerTask;
use settle::events::Events;
use settle::state_enum;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

state_enum! {
    enum Light {
        Disabled as "disabled",
        Red { cycle: u32 } as "red",
        Green { cycle: u32 } as "green",
        Yellow { cycle: u32 } as "yellow",
    }
}

#[derive(Default)]
struct StartParams {
    first_cycle: u32,
}

fn lights(state: &Light, _cancel: &CancellationToken) -> Option<TriggerTask<Light>> {
    let (millis, next) = match state {
        Light::Green { cycle } => (400, Light::Yellow { cycle: *cycle }),
        Light::Yellow { cycle } => (150, Light::Red { cycle: *cycle }),
        Light::Red { cycle } => (300, Light::Green { cycle: cycle + 1 }),
        Light::Disabled => return None,
    };
    Some(TriggerTask::after(Duration::from_millis(millis), next))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== Traffic Light ===\n");

    let engine = EngineBuilder::new()
        .initial(Light::Disabled)
        .transition(
            TransitionBuilder::new()
                .name("start")
                .from(["disabled"])
                .to(|_, params: &StartParams| Light::Green {
                    cycle: params.first_cycle,
                }),
        )?
        .transition(
            TransitionBuilder::new()
                .name("stop")
                .from(["red", "yellow"])
                .to(|_, _: &StartParams| Light::Disabled),
        )?
        .triggers(lights)
        .events(Events::new().state_change(|light: &Light, id| {
            println!("  {:>8}  ({})", light.name(), id);
        }))
        .build()?;

    let (state, transitions) = engine.start();
    println!("Initial state: {:?}", state.state());

    transitions.invoke_with("start", &state.state(), &StartParams { first_cycle: 1 })?;
    tokio::time::sleep(Duration::from_millis(2000)).await;

    // `stop` only applies to red and yellow; wait for one of them.
    loop {
        let current = state.state();
        match transitions.invoke("stop", &current) {
            Ok(_) => break,
            Err(error) => {
                println!("  not yet: {}", error);
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }
    }

    println!("\nFinal state: {:?}", state.state());
    println!("Path: {}", state.history().names().join(" -> "));

    Ok(())
}
