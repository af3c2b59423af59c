//! Traffic light scenarios: timed triggers interleaved with manual stops.
//!
//! Durations are green 150ms, yellow 50ms, red 100ms. The tokio clock is
//! paused, so timer-driven settlements happen in a deterministic order.

mod common;

use common::{traffic_light, Light, LightParams};
use settle::engine::{EngineError, EngineStatus, Invocation};
use std::time::Duration;
use tokio::time::sleep;

#[tokio::test(start_paused = true)]
async fn triggers_cycle_the_light_until_stopped() {
    let light = traffic_light(Light::Green { a: 1 });
    assert_eq!(light.status(), "green");

    sleep(Duration::from_millis(550)).await;
    assert_eq!(light.log.names(), vec!["yellow", "red", "green", "yellow", "red"]);
    assert_eq!(light.status(), "red");

    let stopped = light
        .transitions
        .invoke("stop", &light.state.state())
        .unwrap();
    assert!(matches!(stopped, Invocation::Accepted(_)));
    assert_eq!(light.state.state(), Light::Disabled);
    assert_eq!(light.state.status(), EngineStatus::Idle);

    sleep(Duration::from_millis(200)).await;
    assert_eq!(
        light.log.names(),
        vec!["yellow", "red", "green", "yellow", "red", "disabled"]
    );
    assert!(light.log.ignored().is_empty());
    assert!(light.log.failures().is_empty());
}

#[tokio::test(start_paused = true)]
async fn stopping_the_initial_state_cancels_its_trigger() {
    let light = traffic_light(Light::Red { a: 1 });
    assert_eq!(light.status(), "red");
    assert!(matches!(light.state.status(), EngineStatus::Armed(_)));

    light
        .transitions
        .invoke("stop", &light.state.state())
        .unwrap();
    assert_eq!(light.state.state(), Light::Disabled);
    assert_eq!(light.cancellations(), 1);

    sleep(Duration::from_millis(200)).await;
    assert_eq!(light.state.state(), Light::Disabled);
    assert_eq!(light.log.names(), vec!["disabled"]);
    assert!(light.log.ignored().is_empty());
}

#[tokio::test(start_paused = true)]
async fn stopping_a_later_state_cancels_its_trigger() {
    let light = traffic_light(Light::Red { a: 1 });

    sleep(Duration::from_millis(275)).await;
    assert_eq!(light.status(), "yellow");

    light
        .transitions
        .invoke("stop", &light.state.state())
        .unwrap();
    assert_eq!(light.state.state(), Light::Disabled);

    sleep(Duration::from_millis(300)).await;
    assert_eq!(light.log.names(), vec!["green", "yellow", "disabled"]);
    assert!(light.log.ignored().is_empty());
}

#[tokio::test(start_paused = true)]
async fn double_stop_records_a_single_change() {
    let light = traffic_light(Light::Red { a: 1 });

    sleep(Duration::from_millis(275)).await;
    assert_eq!(light.status(), "yellow");

    let stop = light.transitions.invoker("stop").unwrap();
    let first = stop.call(&light.state.state());
    let second = stop.call(&light.state.state());

    assert!(matches!(first, Ok(Invocation::Accepted(_))));
    assert_eq!(
        second,
        Err(EngineError::InvalidSource {
            transition: "stop".to_string(),
            state: "disabled".to_string(),
        })
    );
    assert_eq!(light.state.state(), Light::Disabled);

    sleep(Duration::from_millis(300)).await;
    assert_eq!(light.log.names(), vec!["green", "yellow", "disabled"]);
    assert!(light.log.ignored().is_empty());
    assert_eq!(light.cancellations(), 1);
}

#[tokio::test(start_paused = true)]
async fn start_passes_parameters_into_the_cycle() {
    let light = traffic_light(Light::Disabled);
    assert_eq!(light.state.status(), EngineStatus::Idle);

    light
        .transitions
        .invoke_with(
            "start",
            &light.state.state(),
            &LightParams {
                additional_info: 7,
            },
        )
        .unwrap();
    assert_eq!(light.state.state(), Light::Green { a: 7 });

    sleep(Duration::from_millis(160)).await;
    assert_eq!(light.state.state(), Light::Yellow { a: 7 });
    assert_eq!(light.state.state().payload(), 7);
}

#[tokio::test(start_paused = true)]
async fn declined_transition_leaves_the_trigger_armed() {
    let light = traffic_light(Light::Green { a: 1 });
    let before = light.state.snapshot();
    let status = light.state.status();

    let held = light
        .transitions
        .invoke("hold", &light.state.state())
        .unwrap();

    assert_eq!(held, Invocation::Unchanged);
    assert_eq!(light.state.snapshot(), before);
    assert_eq!(light.state.status(), status);
    assert_eq!(light.cancellations(), 0);
    assert!(light.log.is_empty());

    sleep(Duration::from_millis(160)).await;
    assert_eq!(light.log.names(), vec!["yellow"]);
}

#[tokio::test(start_paused = true)]
async fn stop_is_rejected_outside_its_sources() {
    let light = traffic_light(Light::Green { a: 1 });

    let result = light.transitions.invoke("stop", &light.state.state());

    assert_eq!(
        result,
        Err(EngineError::InvalidSource {
            transition: "stop".to_string(),
            state: "green".to_string(),
        })
    );
    assert_eq!(light.state.id().generation(), 0);
    assert_eq!(light.cancellations(), 0);
}

#[tokio::test(start_paused = true)]
async fn history_tracks_the_cycle() {
    let light = traffic_light(Light::Green { a: 3 });

    sleep(Duration::from_millis(310)).await;

    let history = light.state.history();
    assert_eq!(history.names(), vec!["green", "yellow", "red", "green"]);
    assert_eq!(
        history.transitions().map(|t| t.generation).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
}
