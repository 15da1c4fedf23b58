//! Property-based tests for the page engine.
//!
//! Uses proptest to generate timer schedules and input sequences, then
//! verify ordering, population, and tally invariants hold.

use orbitcycle_core::config::PageConfig;
use orbitcycle_core::fixed::Fixed64;
use orbitcycle_core::id::{MachineKey, WasteKind};
use orbitcycle_core::layout::SIM_MACHINES;
use orbitcycle_core::scenario::ScenarioCycle;
use orbitcycle_core::scheduler::Scheduler;
use orbitcycle_core::simulation::{SimTask, SimulationEngine};
use orbitcycle_core::test_utils::*;
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

#[derive(Debug, Clone)]
enum Op {
    Drop { waste: usize, machine: usize },
    ProcessAll,
    ChangeScenario,
    Advance(u64),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..WasteKind::KNOWN.len(), 0..SIM_MACHINES.len())
            .prop_map(|(waste, machine)| Op::Drop { waste, machine }),
        1 => Just(Op::ProcessAll),
        1 => Just(Op::ChangeScenario),
        4 => (0..5_000u64).prop_map(Op::Advance),
    ]
}

// ===========================================================================
// Scheduler
// ===========================================================================

proptest! {
    #[test]
    fn timers_fire_in_due_then_arm_order(delays in proptest::collection::vec(0..1_000u64, 1..64)) {
        let mut sched: Scheduler<usize> = Scheduler::new();
        for (i, &d) in delays.iter().enumerate() {
            sched.schedule(d, i);
        }
        let mut last: Option<(u64, usize)> = None;
        let mut fired = 0;
        while let Some(f) = sched.pop_due(u64::MAX) {
            let key = (f.due, f.task);
            if let Some(prev) = last {
                prop_assert!(prev < key);
            }
            prop_assert_eq!(f.due, delays[f.task]);
            last = Some(key);
            fired += 1;
        }
        prop_assert_eq!(fired, delays.len());
    }

    #[test]
    fn cancelled_timers_never_fire(
        delays in proptest::collection::vec(0..1_000u64, 1..64),
        cancel_mask in proptest::collection::vec(any::<bool>(), 64),
    ) {
        let mut sched: Scheduler<usize> = Scheduler::new();
        let ids: Vec<_> = delays.iter().enumerate().map(|(i, &d)| sched.schedule(d, i)).collect();
        for (i, id) in ids.iter().enumerate() {
            if cancel_mask[i] {
                prop_assert!(sched.cancel(*id));
            }
        }
        while let Some(f) = sched.pop_due(u64::MAX) {
            prop_assert!(!cancel_mask[f.task]);
        }
    }
}

// ===========================================================================
// Scenarios
// ===========================================================================

proptest! {
    #[test]
    fn scenario_index_wraps(n in 0usize..100) {
        let mut cycle = ScenarioCycle::builtin();
        for _ in 0..n {
            cycle.advance();
        }
        prop_assert_eq!(cycle.index(), n % cycle.len());
    }
}

// ===========================================================================
// Simulation
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn tally_never_decreases(ops in proptest::collection::vec(arb_op(), 1..40)) {
        let mut page = standard();
        let mut last = *page.tally();
        let mut last_day = page.mission_day();
        for op in ops {
            match op {
                Op::Drop { waste, machine } => {
                    drop_waste(&mut page, WasteKind::KNOWN[waste].as_str(), SIM_MACHINES[machine]);
                }
                Op::ProcessAll => {
                    page.process_all();
                }
                Op::ChangeScenario => page.change_scenario(),
                Op::Advance(ms) => {
                    page.advance(ms);
                }
            }
            let tally = *page.tally();
            prop_assert!(tally.water >= last.water);
            prop_assert!(tally.tools >= last.tools);
            prop_assert!(tally.fuel >= last.fuel);
            prop_assert!(tally.shield >= last.shield);
            prop_assert!(page.mission_day() >= last_day);
            last = tally;
            last_day = page.mission_day();
        }
    }

    #[test]
    fn reset_always_zeroes(ops in proptest::collection::vec(arb_op(), 0..30), after in 0..30_000u64) {
        let mut page = standard();
        for op in ops {
            match op {
                Op::Drop { waste, machine } => {
                    drop_waste(&mut page, WasteKind::KNOWN[waste].as_str(), SIM_MACHINES[machine]);
                }
                Op::ProcessAll => {
                    page.process_all();
                }
                Op::ChangeScenario => page.change_scenario(),
                Op::Advance(ms) => {
                    page.advance(ms);
                }
            }
        }
        page.reset_simulation();
        prop_assert!(page.tally().is_zero());
        prop_assert_eq!(page.mission_day(), 1);

        // Nothing armed before the reset may complete afterwards.
        page.advance(after);
        prop_assert!(page.tally().is_zero());
        prop_assert_eq!(page.mission_day(), 1);
    }

    #[test]
    fn completions_match_mission_day(
        pairs in proptest::collection::vec((0..WasteKind::KNOWN.len(), 0..MachineKey::COUNT), 1..20),
    ) {
        let mut sim = SimulationEngine::default();
        let mut sched: Scheduler<SimTask> = Scheduler::new();
        // Space the actions out so none supersedes another.
        for (i, &(waste, machine)) in pairs.iter().enumerate() {
            sched.set_now(i as u64 * 5_000);
            sim.start(&mut sched, WasteKind::KNOWN[waste].clone(), MachineKey::ALL[machine]);
            sim.advance(&mut sched, i as u64 * 5_000 + 4_999);
        }
        prop_assert_eq!(sim.mission_day() as usize, pairs.len() + 1);
        prop_assert!(sim.tally().water > Fixed64::ZERO);
    }
}

// ===========================================================================
// Particles
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn particle_population_is_bounded(
        seed in any::<u64>(),
        resizes in proptest::collection::vec((0..3_000u64, 200.0..2_000.0f64), 0..6),
    ) {
        let config = PageConfig { seed, ..PageConfig::default() };
        let max = config.particles.max_particles;
        let mut page = with_config(config);
        for (gap, width) in resizes {
            page.advance(gap);
            prop_assert!(page.particles().count() <= max);
            page.resize(width, 800.0);
        }
        for _ in 0..40 {
            page.advance(1_000);
            prop_assert!(page.particles().count() <= max);
        }
        prop_assert_eq!(page.particles().count(), max);
    }
}
