//! Mission scenarios and the forward-cycling selection over them.

use serde::{Deserialize, Serialize};

use crate::fixed::{Fixed64, checked_f64_to_fixed64, f64_to_fixed64};

/// Base resource rates a scenario yields per processed item (before the
/// pairing multiplier).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioOutputs {
    pub water: Fixed64,
    pub tools: u32,
    pub fuel: Fixed64,
    pub shield: Fixed64,
}

impl ScenarioOutputs {
    pub fn new(water: f64, tools: u32, fuel: f64, shield: f64) -> Self {
        Self {
            water: f64_to_fixed64(water),
            tools,
            fuel: f64_to_fixed64(fuel),
            shield: f64_to_fixed64(shield),
        }
    }

    /// Like [`ScenarioOutputs::new`], but `None` if a rate does not fit in
    /// [`Fixed64`].
    pub fn try_new(water: f64, tools: u32, fuel: f64, shield: f64) -> Option<Self> {
        Some(Self {
            water: checked_f64_to_fixed64(water)?,
            tools,
            fuel: checked_f64_to_fixed64(fuel)?,
            shield: checked_f64_to_fixed64(shield)?,
        })
    }
}

/// A named mission context that sets the base outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub title: String,
    pub description: String,
    pub outputs: ScenarioOutputs,
}

/// The three scenarios shipped with the page, in cycling order.
pub fn builtin_scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            id: "daily".into(),
            title: "Daily Operations".into(),
            description: "Process routine daily waste from 8 astronauts".into(),
            outputs: ScenarioOutputs::new(1.1, 2, 0.8, 1.5),
        },
        Scenario {
            id: "emergency".into(),
            title: "Emergency Repair".into(),
            description: "Fabricate critical spare parts for life support system".into(),
            outputs: ScenarioOutputs::new(0.5, 12, 0.2, 0.8),
        },
        Scenario {
            id: "propellant".into(),
            title: "Propellant Production".into(),
            description: "Generate fuel for return journey preparation".into(),
            outputs: ScenarioOutputs::new(2.0, 1, 15.0, 3.2),
        },
    ]
}

/// A non-empty ordered list of scenarios with a current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioCycle {
    scenarios: Vec<Scenario>,
    index: usize,
}

impl ScenarioCycle {
    /// Build a cycle starting at the first scenario. `None` if empty.
    pub fn new(scenarios: Vec<Scenario>) -> Option<Self> {
        if scenarios.is_empty() {
            return None;
        }
        Some(Self {
            scenarios,
            index: 0,
        })
    }

    /// The built-in daily / emergency / propellant cycle.
    pub fn builtin() -> Self {
        Self {
            scenarios: builtin_scenarios(),
            index: 0,
        }
    }

    pub fn current(&self) -> &Scenario {
        &self.scenarios[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Step to the next scenario, wrapping after the last.
    pub fn advance(&mut self) -> &Scenario {
        self.index = (self.index + 1) % self.scenarios.len();
        self.current()
    }
}

impl Default for ScenarioCycle {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outputs_reject_unrepresentable_rates() {
        assert_eq!(ScenarioOutputs::try_new(0.5, 1, 0.4, 0.2), Some(ScenarioOutputs::new(0.5, 1, 0.4, 0.2)));
        assert_eq!(ScenarioOutputs::try_new(1.0e12, 1, 1.0, 1.0), None);
        assert_eq!(ScenarioOutputs::try_new(1.0, 1, f64::NAN, 1.0), None);
    }

    #[test]
    fn builtin_order() {
        let cycle = ScenarioCycle::builtin();
        let ids: Vec<&str> = cycle.scenarios().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["daily", "emergency", "propellant"]);
        assert_eq!(cycle.current().title, "Daily Operations");
    }

    #[test]
    fn advance_wraps() {
        let mut cycle = ScenarioCycle::builtin();
        assert_eq!(cycle.advance().id, "emergency");
        assert_eq!(cycle.advance().id, "propellant");
        assert_eq!(cycle.advance().id, "daily");
        assert_eq!(cycle.index(), 0);
    }

    #[test]
    fn empty_list_is_rejected() {
        assert!(ScenarioCycle::new(Vec::new()).is_none());
    }

    #[test]
    fn single_scenario_cycles_to_itself() {
        let only = builtin_scenarios().remove(1);
        let mut cycle = ScenarioCycle::new(vec![only]).unwrap();
        assert_eq!(cycle.advance().id, "emergency");
        assert_eq!(cycle.index(), 0);
    }
}
