//! Traffic light fixture shared by the integration tests.

#![allow(dead_code)]

use settle::builder::{EngineBuilder, TransitionBuilder};
use settle::core::State;
use settle::engine::{Invokers, StateAccessor, TriggerTask, Triggers};
use settle::events::EventLog;
use settle::state_enum;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

state_enum! {
    pub enum Light {
        Disabled as "disabled",
        Red { a: u32 } as "red",
        Green { a: u32 } as "green",
        Yellow { a: u32 } as "yellow",
    }
}

impl Light {
    pub fn payload(&self) -> u32 {
        match self {
            Light::Red { a } | Light::Green { a } | Light::Yellow { a } => *a,
            Light::Disabled => 0,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct LightParams {
    pub additional_info: u32,
}

pub struct Durations {
    pub green: Duration,
    pub yellow: Duration,
    pub red: Duration,
}

impl Default for Durations {
    fn default() -> Self {
        Self {
            green: Duration::from_millis(150),
            yellow: Duration::from_millis(50),
            red: Duration::from_millis(100),
        }
    }
}

pub struct LightTriggers {
    durations: Durations,
    cancelled: Arc<AtomicUsize>,
}

impl Triggers<Light> for LightTriggers {
    fn trigger(&self, state: &Light, _cancel: &CancellationToken) -> Option<TriggerTask<Light>> {
        let (delay, next) = match state {
            Light::Green { a } => (self.durations.green, Light::Yellow { a: *a }),
            Light::Yellow { a } => (self.durations.yellow, Light::Red { a: *a }),
            Light::Red { a } => (self.durations.red, Light::Green { a: *a }),
            Light::Disabled => return None,
        };

        let cancelled = Arc::clone(&self.cancelled);
        Some(TriggerTask::after(delay, next).on_cancel(move || {
            cancelled.fetch_add(1, Ordering::SeqCst);
        }))
    }
}

pub struct TrafficLight {
    pub state: StateAccessor<Light, LightParams>,
    pub transitions: Invokers<Light, LightParams>,
    pub log: EventLog<Light>,
    pub cancelled: Arc<AtomicUsize>,
}

impl TrafficLight {
    pub fn cancellations(&self) -> usize {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> String {
        self.state.state().name().to_string()
    }
}

/// Build and start a traffic light. Must run inside a tokio runtime.
pub fn traffic_light(initial: Light) -> TrafficLight {
    let log = EventLog::new();
    let cancelled = Arc::new(AtomicUsize::new(0));

    let engine = EngineBuilder::new()
        .initial(initial)
        .transition(
            TransitionBuilder::new()
                .name("start")
                .from(["disabled"])
                .to(|_, params: &LightParams| Light::Green {
                    a: params.additional_info,
                }),
        )
        .unwrap()
        .transition(
            TransitionBuilder::new()
                .name("stop")
                .from(["red", "yellow"])
                .to(|_, _: &LightParams| Light::Disabled),
        )
        .unwrap()
        .transition(
            TransitionBuilder::new()
                .name("hold")
                .from_any()
                .apply(|_, _: &LightParams| settle::Step::Unchanged),
        )
        .unwrap()
        .triggers(LightTriggers {
            durations: Durations::default(),
            cancelled: Arc::clone(&cancelled),
        })
        .events(log.clone())
        .build()
        .unwrap();

    let (state, transitions) = engine.start();
    TrafficLight {
        state,
        transitions,
        log,
        cancelled,
    }
}
