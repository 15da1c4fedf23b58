//! Waste-processing simulation: machine slots, resource tally, scenarios.
//!
//! # Slot state machine
//!
//! Each machine slot runs `Idle -> Processing -> Complete -> Idle`:
//!
//! 1. [`SimulationEngine::start`] moves the slot to `Processing` and arms a
//!    `Complete` transition `processing_ms` later.
//! 2. On `Complete` the outputs are applied to the tally, the mission day
//!    advances, and a `Settle` transition is armed `settle_ms` later.
//! 3. On `Settle` the slot returns to `Idle`.
//!
//! A slot holds at most one pending transition. Starting a new action on a
//! busy slot cancels it (the superseded action yields nothing), and
//! [`SimulationEngine::reset`] cancels every pending transition and batch
//! dispatch, so no stale timer can overwrite a freshly reset slot.
//!
//! # Output rule
//!
//! Outputs are the current scenario's base rates scaled by the pairing's
//! [`Efficiency`]: 20% for a recognized match, 10% otherwise. Water, fuel,
//! and shield accumulate as fixed-point reals; tools accumulate the floor.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::fixed::{Fixed64, Millis, floor_percent, format_one_decimal, scale_percent};
use crate::id::{MachineKey, TimerId, WasteKind};
use crate::scenario::{Scenario, ScenarioCycle, ScenarioOutputs};
use crate::scheduler::Scheduler;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Timing of the simulation state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    /// Time a machine spends processing before outputs are applied.
    pub processing_ms: Millis,
    /// Time a machine shows "Complete" before returning to idle.
    pub settle_ms: Millis,
    /// Spacing between items dispatched by "process all".
    pub batch_stagger_ms: Millis,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            processing_ms: 2000,
            settle_ms: 2000,
            batch_stagger_ms: 800,
        }
    }
}

/// Destination rotation used by "process all", indexed by item position.
pub const BATCH_ROTATION: [MachineKey; 4] = [
    MachineKey::Ai,
    MachineKey::Refab,
    MachineKey::Oscar,
    MachineKey::Hmc,
];

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Display state of a machine slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineStatus {
    #[default]
    Idle,
    Processing,
    Complete,
}

impl MachineStatus {
    /// Status text shown on the machine.
    pub fn label(self) -> &'static str {
        match self {
            MachineStatus::Idle => "Ready",
            MachineStatus::Processing => "Processing...",
            MachineStatus::Complete => "Complete",
        }
    }

    /// Full class attribute of the status element.
    pub fn class_name(self) -> &'static str {
        match self {
            MachineStatus::Idle => "machine-status idle",
            MachineStatus::Processing => "machine-status processing",
            MachineStatus::Complete => "machine-status complete",
        }
    }
}

// ---------------------------------------------------------------------------
// Efficiency & yield
// ---------------------------------------------------------------------------

/// Pairing multiplier as an integer percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Efficiency {
    pub percent: u32,
}

impl Efficiency {
    /// Recognized match: 0.2.
    pub const HIGH: Efficiency = Efficiency { percent: 20 };
    /// Anything else: 0.1.
    pub const BASE: Efficiency = Efficiency { percent: 10 };

    /// `plastic+refab`, `metal+ai`, and anything sent to `oscar` or `hmc`
    /// are high-efficiency pairings.
    pub fn for_pairing(waste: &WasteKind, machine: MachineKey) -> Self {
        let matched = matches!(
            (waste, machine),
            (WasteKind::Plastic, MachineKey::Refab)
                | (WasteKind::Metal, MachineKey::Ai)
                | (_, MachineKey::Oscar)
                | (_, MachineKey::Hmc)
        );
        if matched { Self::HIGH } else { Self::BASE }
    }
}

/// Resources produced by one completed action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingYield {
    pub water: Fixed64,
    pub tools: u32,
    pub fuel: Fixed64,
    pub shield: Fixed64,
}

impl ProcessingYield {
    pub fn compute(base: &ScenarioOutputs, efficiency: Efficiency) -> Self {
        let pct = efficiency.percent;
        Self {
            water: scale_percent(base.water, pct),
            tools: floor_percent(base.tools, pct),
            fuel: scale_percent(base.fuel, pct),
            shield: scale_percent(base.shield, pct),
        }
    }
}

// ---------------------------------------------------------------------------
// Tally
// ---------------------------------------------------------------------------

/// Accumulated resources since the last reset. Never decreases in between.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationTally {
    pub water: Fixed64,
    pub tools: u32,
    pub fuel: Fixed64,
    pub shield: Fixed64,
}

impl SimulationTally {
    pub fn add(&mut self, y: &ProcessingYield) {
        self.water = self.water.saturating_add(y.water);
        self.tools = self.tools.saturating_add(y.tools);
        self.fuel = self.fuel.saturating_add(y.fuel);
        self.shield = self.shield.saturating_add(y.shield);
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// `(element id, text)` pairs for the output readouts.
    pub fn readouts(&self) -> [(&'static str, String); 4] {
        [
            ("water-output", format_one_decimal(self.water)),
            ("tools-output", self.tools.to_string()),
            ("fuel-output", format_one_decimal(self.fuel)),
            ("shield-output", format_one_decimal(self.shield)),
        ]
    }
}

// ---------------------------------------------------------------------------
// Tasks & updates
// ---------------------------------------------------------------------------

/// A timed simulation transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimTask {
    /// Processing finished: apply outputs.
    Complete { machine: MachineKey, waste: WasteKind },
    /// Completion display elapsed: return to idle.
    Settle { machine: MachineKey },
    /// A staggered "process all" item is due.
    Dispatch {
        waste: WasteKind,
        machine: MachineKey,
    },
}

/// What a simulation call or transition changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimUpdate {
    Started {
        machine: MachineKey,
        waste: WasteKind,
        /// A previous action on this slot was cancelled.
        superseded: bool,
    },
    Completed {
        machine: MachineKey,
        waste: WasteKind,
        yielded: ProcessingYield,
        mission_day: u32,
    },
    Idle {
        machine: MachineKey,
    },
    /// A batch item is due; the caller decides whether to start it.
    Dispatch {
        waste: WasteKind,
        machine: MachineKey,
    },
}

#[derive(Debug, Clone, Copy, Default)]
struct MachineSlot {
    status: MachineStatus,
    pending: Option<TimerId>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Owner of the tally, mission day, scenario selection, and machine slots.
#[derive(Debug, Clone)]
pub struct SimulationEngine {
    settings: SimSettings,
    tally: SimulationTally,
    mission_day: u32,
    scenarios: ScenarioCycle,
    slots: [MachineSlot; MachineKey::COUNT],
    /// Pending "process all" dispatches.
    batch: Vec<TimerId>,
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::new(ScenarioCycle::builtin(), SimSettings::default())
    }
}

impl SimulationEngine {
    pub fn new(scenarios: ScenarioCycle, settings: SimSettings) -> Self {
        Self {
            settings,
            tally: SimulationTally::default(),
            mission_day: 1,
            scenarios,
            slots: [MachineSlot::default(); MachineKey::COUNT],
            batch: Vec::new(),
        }
    }

    pub fn tally(&self) -> &SimulationTally {
        &self.tally
    }

    pub fn mission_day(&self) -> u32 {
        self.mission_day
    }

    pub fn status(&self, machine: MachineKey) -> MachineStatus {
        self.slots[machine.index()].status
    }

    /// Whether the slot has a transition armed.
    pub fn is_busy(&self, machine: MachineKey) -> bool {
        self.slots[machine.index()].pending.is_some()
    }

    pub fn scenario(&self) -> &Scenario {
        self.scenarios.current()
    }

    pub fn scenario_index(&self) -> usize {
        self.scenarios.index()
    }

    pub fn scenarios(&self) -> &ScenarioCycle {
        &self.scenarios
    }

    pub fn settings(&self) -> &SimSettings {
        &self.settings
    }

    /// Number of "process all" items still waiting to dispatch.
    pub fn pending_batch(&self) -> usize {
        self.batch.len()
    }

    /// Begin processing `waste` on `machine`.
    pub fn start<T: From<SimTask>>(
        &mut self,
        sched: &mut Scheduler<T>,
        waste: WasteKind,
        machine: MachineKey,
    ) -> SimUpdate {
        let slot = &mut self.slots[machine.index()];
        let superseded = slot.pending.take().is_some_and(|t| sched.cancel(t))
            && slot.status == MachineStatus::Processing;
        slot.status = MachineStatus::Processing;
        slot.pending = Some(sched.schedule(
            self.settings.processing_ms,
            T::from(SimTask::Complete {
                machine,
                waste: waste.clone(),
            }),
        ));
        debug!(%machine, %waste, superseded, "processing started");
        SimUpdate::Started {
            machine,
            waste,
            superseded,
        }
    }

    /// Queue one action per item, `batch_stagger_ms` apart, rotating the
    /// destination through [`BATCH_ROTATION`]. Returns the number queued.
    pub fn process_all<T: From<SimTask>>(
        &mut self,
        sched: &mut Scheduler<T>,
        wastes: &[WasteKind],
    ) -> usize {
        for (i, waste) in wastes.iter().enumerate() {
            let machine = BATCH_ROTATION[i % BATCH_ROTATION.len()];
            let delay = self.settings.batch_stagger_ms.saturating_mul(i as Millis);
            let id = sched.schedule(
                delay,
                T::from(SimTask::Dispatch {
                    waste: waste.clone(),
                    machine,
                }),
            );
            self.batch.push(id);
        }
        debug!(items = wastes.len(), "batch queued");
        wastes.len()
    }

    /// Apply a fired transition.
    pub fn handle<T: From<SimTask>>(
        &mut self,
        sched: &mut Scheduler<T>,
        id: TimerId,
        task: SimTask,
    ) -> SimUpdate {
        match task {
            SimTask::Complete { machine, waste } => {
                let efficiency = Efficiency::for_pairing(&waste, machine);
                let yielded =
                    ProcessingYield::compute(&self.scenarios.current().outputs, efficiency);
                self.tally.add(&yielded);
                self.mission_day = self.mission_day.saturating_add(1);

                let settle = sched.schedule(
                    self.settings.settle_ms,
                    T::from(SimTask::Settle { machine }),
                );
                let slot = &mut self.slots[machine.index()];
                slot.status = MachineStatus::Complete;
                slot.pending = Some(settle);
                debug!(%machine, %waste, percent = efficiency.percent, day = self.mission_day, "processing complete");
                SimUpdate::Completed {
                    machine,
                    waste,
                    yielded,
                    mission_day: self.mission_day,
                }
            }
            SimTask::Settle { machine } => {
                let slot = &mut self.slots[machine.index()];
                slot.status = MachineStatus::Idle;
                slot.pending = None;
                SimUpdate::Idle { machine }
            }
            SimTask::Dispatch { waste, machine } => {
                self.batch.retain(|&t| t != id);
                SimUpdate::Dispatch { waste, machine }
            }
        }
    }

    /// Select the next scenario, wrapping after the last.
    pub fn change_scenario(&mut self) -> &Scenario {
        let scenario = self.scenarios.advance();
        debug!(id = %scenario.id, "scenario changed");
        scenario
    }

    /// Zero the tally, return to day 1, idle every slot, and cancel every
    /// pending transition and batch dispatch. Returns the number cancelled.
    pub fn reset<T>(&mut self, sched: &mut Scheduler<T>) -> usize {
        let mut cancelled = 0;
        for slot in &mut self.slots {
            if let Some(t) = slot.pending.take() {
                cancelled += usize::from(sched.cancel(t));
            }
            slot.status = MachineStatus::Idle;
        }
        for t in self.batch.drain(..) {
            cancelled += usize::from(sched.cancel(t));
        }
        self.tally = SimulationTally::default();
        self.mission_day = 1;
        debug!(cancelled, "simulation reset");
        cancelled
    }

    /// Drive a standalone engine up to `until`, starting batch items
    /// immediately when they come due.
    pub fn advance(&mut self, sched: &mut Scheduler<SimTask>, until: Millis) -> Vec<SimUpdate> {
        let mut updates = Vec::new();
        while let Some(fired) = sched.pop_due(until) {
            match self.handle(sched, fired.id, fired.task) {
                SimUpdate::Dispatch { waste, machine } => {
                    updates.push(self.start(sched, waste, machine));
                }
                other => updates.push(other),
            }
        }
        sched.set_now(until);
        updates
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::fixed64_to_f64;

    fn engine() -> (SimulationEngine, Scheduler<SimTask>) {
        (SimulationEngine::default(), Scheduler::new())
    }

    fn close(a: Fixed64, b: f64) -> bool {
        (fixed64_to_f64(a) - b).abs() < 1e-6
    }

    #[test]
    fn efficiency_pairings() {
        use MachineKey::*;
        assert_eq!(Efficiency::for_pairing(&WasteKind::Plastic, Refab), Efficiency::HIGH);
        assert_eq!(Efficiency::for_pairing(&WasteKind::Metal, Ai), Efficiency::HIGH);
        assert_eq!(Efficiency::for_pairing(&WasteKind::Paper, Oscar), Efficiency::HIGH);
        assert_eq!(Efficiency::for_pairing(&WasteKind::Foam, Hmc), Efficiency::HIGH);
        assert_eq!(Efficiency::for_pairing(&WasteKind::Paper, Ai), Efficiency::BASE);
        assert_eq!(Efficiency::for_pairing(&WasteKind::Plastic, Ai), Efficiency::BASE);
        assert_eq!(Efficiency::for_pairing(&WasteKind::Metal, Facm), Efficiency::BASE);
    }

    #[test]
    fn huge_rates_saturate_instead_of_panicking() {
        let y = ProcessingYield::compute(&ScenarioOutputs::new(2.0e8, 1, 1.0, 1.0), Efficiency::HIGH);
        assert!(close(y.water, 4.0e7));
        let y = ProcessingYield::compute(&ScenarioOutputs::new(1.0e12, 1, 1.0, 1.0), Efficiency::HIGH);
        assert_eq!(y.water, scale_percent(Fixed64::MAX, 20));

        let mut tally = SimulationTally {
            water: Fixed64::MAX,
            ..SimulationTally::default()
        };
        tally.add(&y);
        assert_eq!(tally.water, Fixed64::MAX);
        assert_eq!(tally.tools, 0);
    }

    #[test]
    fn metal_on_ai_in_daily() {
        let (mut sim, mut sched) = engine();
        sim.start(&mut sched, WasteKind::Metal, MachineKey::Ai);
        assert_eq!(sim.status(MachineKey::Ai), MachineStatus::Processing);

        sim.advance(&mut sched, 1999);
        assert!(sim.tally().is_zero());

        let updates = sim.advance(&mut sched, 2000);
        assert_eq!(updates.len(), 1);
        let t = sim.tally();
        assert!(close(t.water, 0.22));
        assert!(close(t.fuel, 0.16));
        assert!(close(t.shield, 0.30));
        assert_eq!(t.tools, 0);
        assert_eq!(sim.mission_day(), 2);
        assert_eq!(sim.status(MachineKey::Ai), MachineStatus::Complete);

        sim.advance(&mut sched, 4000);
        assert_eq!(sim.status(MachineKey::Ai), MachineStatus::Idle);
        assert!(!sim.is_busy(MachineKey::Ai));
    }

    #[test]
    fn unmatched_pairing_yields_half() {
        let (mut sim, mut sched) = engine();
        sim.start(&mut sched, WasteKind::Paper, MachineKey::Ai);
        sim.advance(&mut sched, 2000);
        let t = sim.tally();
        assert!(close(t.water, 0.11));
        assert!(close(t.fuel, 0.08));
        assert!(close(t.shield, 0.15));
        assert_eq!(t.tools, 0);
        assert_eq!(sim.mission_day(), 2);
    }

    #[test]
    fn tools_floor_in_emergency() {
        let (mut sim, mut sched) = engine();
        sim.change_scenario();
        assert_eq!(sim.scenario().id, "emergency");
        sim.start(&mut sched, WasteKind::Plastic, MachineKey::Refab);
        sim.start(&mut sched, WasteKind::Paper, MachineKey::Ai);
        sim.advance(&mut sched, 2000);
        // floor(12 * 0.2) + floor(12 * 0.1)
        assert_eq!(sim.tally().tools, 3);
        assert_eq!(sim.mission_day(), 3);
    }

    #[test]
    fn restart_on_busy_slot_supersedes() {
        let (mut sim, mut sched) = engine();
        sim.start(&mut sched, WasteKind::Metal, MachineKey::Ai);
        sched.set_now(1000);
        let update = sim.start(&mut sched, WasteKind::Paper, MachineKey::Ai);
        assert!(matches!(update, SimUpdate::Started { superseded: true, .. }));

        sim.advance(&mut sched, 2999);
        assert!(sim.tally().is_zero());
        sim.advance(&mut sched, 3000);
        assert!(close(sim.tally().water, 0.11));
        assert_eq!(sim.mission_day(), 2);
    }

    #[test]
    fn restart_while_complete_is_not_superseded() {
        let (mut sim, mut sched) = engine();
        sim.start(&mut sched, WasteKind::Metal, MachineKey::Ai);
        sim.advance(&mut sched, 2500);
        let update = sim.start(&mut sched, WasteKind::Metal, MachineKey::Ai);
        assert!(matches!(update, SimUpdate::Started { superseded: false, .. }));
        // The pending settle was cancelled; the slot must stay processing.
        sim.advance(&mut sched, 4000);
        assert_eq!(sim.status(MachineKey::Ai), MachineStatus::Processing);
        sim.advance(&mut sched, 4500);
        assert_eq!(sim.status(MachineKey::Ai), MachineStatus::Complete);
    }

    #[test]
    fn process_all_rotates_and_staggers() {
        let (mut sim, mut sched) = engine();
        let wastes = vec![
            WasteKind::Plastic,
            WasteKind::Metal,
            WasteKind::Paper,
            WasteKind::Fabric,
            WasteKind::Organic,
        ];
        assert_eq!(sim.process_all(&mut sched, &wastes), 5);
        assert_eq!(sim.pending_batch(), 5);

        let started: Vec<MachineKey> = sim
            .advance(&mut sched, 3200)
            .into_iter()
            .filter_map(|u| match u {
                SimUpdate::Started { machine, .. } => Some(machine),
                _ => None,
            })
            .collect();
        use MachineKey::*;
        assert_eq!(started, vec![Ai, Refab, Oscar, Hmc, Ai]);
        assert_eq!(sim.pending_batch(), 0);
    }

    #[test]
    fn reset_cancels_everything() {
        let (mut sim, mut sched) = engine();
        sim.start(&mut sched, WasteKind::Metal, MachineKey::Ai);
        sim.advance(&mut sched, 2000);
        sim.process_all(&mut sched, &[WasteKind::Plastic, WasteKind::Metal]);
        sim.start(&mut sched, WasteKind::Metal, MachineKey::Hmc);
        assert!(!sim.tally().is_zero());

        let cancelled = sim.reset(&mut sched);
        assert_eq!(cancelled, 4);
        assert!(sched.is_empty());
        assert!(sim.tally().is_zero());
        assert_eq!(sim.mission_day(), 1);
        for key in MachineKey::ALL {
            assert_eq!(sim.status(key), MachineStatus::Idle);
        }

        // Nothing stale fires later.
        assert!(sim.advance(&mut sched, 60_000).is_empty());
        assert_eq!(sim.mission_day(), 1);
    }

    #[test]
    fn reset_keeps_scenario_selection() {
        let (mut sim, mut sched) = engine();
        sim.change_scenario();
        sim.reset(&mut sched);
        assert_eq!(sim.scenario_index(), 1);
    }

    #[test]
    fn status_strings() {
        assert_eq!(MachineStatus::Idle.label(), "Ready");
        assert_eq!(MachineStatus::Processing.label(), "Processing...");
        assert_eq!(
            MachineStatus::Complete.class_name(),
            "machine-status complete"
        );
    }

    #[test]
    fn readouts_format() {
        let mut tally = SimulationTally::default();
        tally.add(&ProcessingYield::compute(
            &ScenarioOutputs::new(2.0, 1, 15.0, 3.2),
            Efficiency::HIGH,
        ));
        let readouts = tally.readouts();
        assert_eq!(readouts[0], ("water-output", "0.4".to_string()));
        assert_eq!(readouts[1], ("tools-output", "0".to_string()));
        assert_eq!(readouts[2], ("fuel-output", "3.0".to_string()));
        assert_eq!(readouts[3], ("shield-output", "0.6".to_string()));
    }
}
