use std::collections::BTreeMap;

use sceneconfig::ClockSpec;

/// Logical clock advanced by a fixed step once per tick.
///
/// `t` is derived from the tick count rather than summed so that long sessions
/// stay exact to the step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clock {
    start: f64,
    step: f64,
    ticks: u64,
}

impl Clock {
    pub fn new(step: f64) -> Self {
        Self::starting_at(0.0, step)
    }

    pub fn starting_at(start: f64, step: f64) -> Self {
        Self {
            start,
            step,
            ticks: 0,
        }
    }

    pub fn advance(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    pub fn t(&self) -> f64 {
        self.start + self.ticks as f64 * self.step
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl From<&ClockSpec> for Clock {
    fn from(spec: &ClockSpec) -> Self {
        Clock::starting_at(spec.start, spec.step)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClockId(usize);

/// Named set of independent clocks owned by one driver.
#[derive(Debug, Clone, Default)]
pub struct Clocks {
    names: Vec<String>,
    clocks: Vec<Clock>,
}

impl Clocks {
    pub fn from_specs(specs: &BTreeMap<String, ClockSpec>) -> Self {
        let mut clocks = Self::default();
        for (name, spec) in specs {
            clocks.insert(name.clone(), Clock::from(spec));
        }
        clocks
    }

    pub fn insert(&mut self, name: impl Into<String>, clock: Clock) -> ClockId {
        let name = name.into();
        if let Some(id) = self.id(&name) {
            self.clocks[id.0] = clock;
            return id;
        }
        self.names.push(name);
        self.clocks.push(clock);
        ClockId(self.clocks.len() - 1)
    }

    pub fn id(&self, name: &str) -> Option<ClockId> {
        self.names.iter().position(|n| n == name).map(ClockId)
    }

    pub fn get(&self, name: &str) -> Option<&Clock> {
        self.id(name).map(|id| &self.clocks[id.0])
    }

    pub fn t(&self, id: ClockId) -> f64 {
        self.clocks[id.0].t()
    }

    pub fn advance_all(&mut self) {
        for clock in &mut self.clocks {
            clock.advance();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Clock)> {
        self.names.iter().map(String::as_str).zip(self.clocks.iter())
    }

    pub fn len(&self) -> usize {
        self.clocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clocks.is_empty()
    }
}
