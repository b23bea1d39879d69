// src/source.rs

use sensorring_core::{SensorError, SensorResult};
use std::collections::VecDeque;

/// Highest value of the 12-bit ADC the light sensor is wired to.
pub const ADC_MAX: i32 = 4095;

/// Something that produces one integer reading per sampling tick.
pub trait SampleSource: Send {
    fn name(&self) -> &str;
    fn read(&mut self) -> SensorResult<i32>;
}

/// Deterministic stand-in for a light-dependent resistor: sweeps up and down
/// the ADC range in fixed steps.
#[derive(Debug, Clone)]
pub struct SimulatedLdr {
    level: i32,
    step: i32,
}

impl SimulatedLdr {
    pub fn new(step: i32) -> Self {
        Self {
            level: 0,
            step: step.clamp(1, ADC_MAX),
        }
    }
}

impl Default for SimulatedLdr {
    fn default() -> Self {
        Self::new(137)
    }
}

impl SampleSource for SimulatedLdr {
    fn name(&self) -> &str {
        "simulated-ldr"
    }

    fn read(&mut self) -> SensorResult<i32> {
        let value = self.level;

        let next = self.level + self.step;
        if !(0..=ADC_MAX).contains(&next) {
            self.step = -self.step;
        }
        self.level = (self.level + self.step).clamp(0, ADC_MAX);

        Ok(value)
    }
}

/// Replays a fixed list of readings, optionally looping.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    script: Vec<i32>,
    pending: VecDeque<i32>,
    repeat: bool,
}

impl ScriptedSource {
    pub fn new(script: Vec<i32>) -> Self {
        Self {
            pending: script.iter().copied().collect(),
            script,
            repeat: false,
        }
    }

    pub fn repeating(script: Vec<i32>) -> Self {
        Self {
            repeat: true,
            ..Self::new(script)
        }
    }
}

impl SampleSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    fn read(&mut self) -> SensorResult<i32> {
        if self.pending.is_empty() && self.repeat {
            self.pending.extend(self.script.iter().copied());
        }

        self.pending
            .pop_front()
            .ok_or_else(|| SensorError::Source("scripted source exhausted".to_string()))
    }
}
