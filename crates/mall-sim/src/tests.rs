//! Integration tests for mall-sim.

use mall_agent::{PopulationBuilder, Shopper, ShopperRngs};
use mall_behavior::{MomentumNoveltyModel, MovementParams, StationaryModel};
use mall_core::{AgentId, LocationId, SimConfig, Tick, Vec2};
use mall_spatial::{Location, MatrixEnvironment, MatrixEnvironmentBuilder};

use crate::{MoveLog, NoopObserver, SimBuilder, SimObserver, TickSummary};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn test_config(total_ticks: u64) -> SimConfig {
    SimConfig {
        minutes_per_iteration:   1.0,
        total_ticks,
        seed:                    42,
        num_threads:             Some(1),
        snapshot_interval_ticks: 0,
    }
}

/// Four shops in a 20 × 10 strip; every pair is within one minute's walk.
///
/// ```text
/// D (0,10)
/// A (0,0) ── B (10,0) ── C (20,0)
/// ```
fn strip_mall() -> MatrixEnvironment {
    let mut b = MatrixEnvironmentBuilder::new();
    for name in ["A", "B", "C", "D"] {
        b.add_location(Location::new(name));
    }
    let (a, bb, c, d) = (LocationId(0), LocationId(1), LocationId(2), LocationId(3));
    let east = Vec2::new(1.0, 0.0);
    b.connect(a, bb, 10.0, east);
    b.connect(bb, c, 10.0, east);
    b.connect(a, c, 20.0, east);
    b.connect(a, d, 10.0, Vec2::new(0.0, 1.0));
    let h = std::f64::consts::FRAC_1_SQRT_2;
    b.connect(bb, d, 200f64.sqrt(), Vec2::new(-h, h));
    let l = 500f64.sqrt();
    b.connect(c, d, l, Vec2::new(-20.0 / l, 10.0 / l));
    b.build().unwrap()
}

fn population(n: usize, stay: f64) -> (Vec<Shopper>, ShopperRngs) {
    PopulationBuilder::new(n, 42).fixed_max_stay(stay).build().unwrap()
}

fn busy_model() -> MomentumNoveltyModel {
    let params = MovementParams { relocate_probability: 0.5, ..Default::default() };
    MomentumNoveltyModel::new(params).unwrap()
}

// ── SimBuilder validation ─────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;
    use crate::SimError;

    #[test]
    fn builds_successfully() {
        let (shoppers, rngs) = population(3, 60.0);
        let sim = SimBuilder::new(test_config(10), shoppers, rngs, strip_mall(), StationaryModel)
            .build()
            .unwrap();
        assert_eq!(sim.shoppers.len(), 3);
        assert_eq!(sim.clock.current_tick, Tick::ZERO);
    }

    #[test]
    fn rng_count_mismatch_errors() {
        let (shoppers, _) = population(3, 60.0);
        let rngs = ShopperRngs::new(2, 42);
        let result = SimBuilder::new(test_config(10), shoppers, rngs, strip_mall(), StationaryModel).build();
        assert!(matches!(
            result,
            Err(SimError::AgentCountMismatch { expected: 3, got: 2, .. })
        ));
    }

    #[test]
    fn ids_must_match_indices() {
        let shoppers = vec![Shopper::new(AgentId(1), "x", 10.0)];
        let rngs = ShopperRngs::new(1, 0);
        let result = SimBuilder::new(test_config(10), shoppers, rngs, strip_mall(), StationaryModel).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn invalid_config_rejected() {
        let (shoppers, rngs) = population(1, 60.0);
        let config = SimConfig { minutes_per_iteration: 0.0, ..test_config(10) };
        let result = SimBuilder::new(config, shoppers, rngs, strip_mall(), StationaryModel).build();
        assert!(matches!(result, Err(SimError::Core(_))));
    }
}

// ── Basic run ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod run_tests {
    use super::*;

    /// Observer that counts hooks and sums summaries.
    #[derive(Default)]
    struct Counter {
        starts:   usize,
        ends:     usize,
        ended_at: Option<Tick>,
        moved:    usize,
        departed: usize,
    }

    impl<E> SimObserver<E> for Counter {
        fn on_tick_start(&mut self, _t: Tick) { self.starts += 1; }
        fn on_tick_end(&mut self, _t: Tick, s: &TickSummary) {
            self.ends += 1;
            self.moved += s.moved;
            self.departed += s.departed;
        }
        fn on_sim_end(&mut self, t: Tick) { self.ended_at = Some(t); }
    }

    #[test]
    fn runs_to_end_tick() {
        let (shoppers, rngs) = population(5, 1_000.0);
        let mut sim = SimBuilder::new(test_config(10), shoppers, rngs, strip_mall(), StationaryModel)
            .build()
            .unwrap();
        let mut obs = Counter::default();
        sim.run(&mut obs).unwrap();

        assert_eq!(sim.clock.current_tick, Tick(10));
        assert_eq!(obs.starts, 10);
        assert_eq!(obs.ends, 10);
        assert_eq!(obs.ended_at, Some(Tick(10)));
        // Stationary shoppers enter on tick 0 and never move again.
        assert_eq!(obs.moved, 5);
        assert_eq!(sim.present_count(), 5);
        assert_eq!(sim.env.total_present(), 5);
    }

    #[test]
    fn stops_once_everyone_has_departed() {
        // Stay 2 at 1 min/tick: elapsed 0, 1, 2 → browse; elapsed 3 → depart on tick 3.
        let (shoppers, rngs) = population(4, 2.0);
        let mut sim = SimBuilder::new(test_config(100), shoppers, rngs, strip_mall(), busy_model())
            .build()
            .unwrap();
        let mut obs = Counter::default();
        sim.run(&mut obs).unwrap();

        assert!(sim.all_departed());
        assert_eq!(sim.clock.current_tick, Tick(4));
        assert_eq!(obs.departed, 4);
        assert_eq!(sim.totals().departures, 4);
        assert_eq!(sim.totals().ticks, 4);
        assert_eq!(sim.env.total_present(), 0);
        assert!(sim.shoppers.iter().all(|s| s.iterations() == 3));
    }

    #[test]
    fn empty_population_finishes_immediately() {
        let (shoppers, rngs) = population(0, 10.0);
        let mut sim = SimBuilder::new(test_config(50), shoppers, rngs, strip_mall(), StationaryModel)
            .build()
            .unwrap();
        sim.run(&mut NoopObserver).unwrap();
        assert_eq!(sim.clock.current_tick, Tick::ZERO);
    }

    #[test]
    fn run_ticks_advances_clock() {
        let (shoppers, rngs) = population(2, 1.0);
        let mut sim = SimBuilder::new(test_config(100), shoppers, rngs, strip_mall(), StationaryModel)
            .build()
            .unwrap();
        sim.run_ticks(5, &mut NoopObserver).unwrap();
        assert_eq!(sim.clock.current_tick, Tick(5));
        // Everyone departed on tick 2, but run_ticks keeps stepping.
        sim.run_ticks(3, &mut NoopObserver).unwrap();
        assert_eq!(sim.clock.current_tick, Tick(8));
        assert!(sim.all_departed());
    }

    #[test]
    fn late_arrivals_wait_for_their_start_tick() {
        let shoppers = vec![
            Shopper::new(AgentId(0), "early", 100.0),
            Shopper::new(AgentId(1), "late", 100.0).with_start_tick(Tick(5)),
        ];
        let rngs = ShopperRngs::new(2, 42);
        let mut sim = SimBuilder::new(test_config(10), shoppers, rngs, strip_mall(), StationaryModel)
            .build()
            .unwrap();
        let mut log = MoveLog::default();
        sim.run(&mut log).unwrap();

        let entries: Vec<_> = log.moves.iter().filter(|(_, n)| n.is_entry()).collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, Tick(0));
        assert_eq!(entries[0].1.agent, AgentId(0));
        assert_eq!(entries[1].0, Tick(5));
        assert_eq!(entries[1].1.agent, AgentId(1));
        assert_eq!(sim.shoppers[1].iterations(), 5);
    }
}

// ── Notifications & snapshots ─────────────────────────────────────────────────

#[cfg(test)]
mod notification_tests {
    use mall_spatial::MoveNotice;

    use super::*;

    #[test]
    fn notices_are_ordered_by_agent_within_a_tick() {
        let (shoppers, rngs) = population(20, 30.0);
        let mut sim = SimBuilder::new(test_config(60), shoppers, rngs, strip_mall(), busy_model())
            .build()
            .unwrap();
        let mut log = MoveLog::default();
        sim.run(&mut log).unwrap();

        for pair in log.moves.windows(2) {
            let ((t0, a), (t1, b)) = (pair[0], pair[1]);
            assert!(t0 <= t1);
            if t0 == t1 {
                assert!(a.agent < b.agent, "at {t0}: {} before {}", a.agent, b.agent);
            }
        }
    }

    #[test]
    fn notices_match_shopper_histories() {
        let (shoppers, rngs) = population(10, 20.0);
        let mut sim = SimBuilder::new(test_config(200), shoppers, rngs, strip_mall(), busy_model())
            .build()
            .unwrap();
        let mut log = MoveLog::default();
        sim.run(&mut log).unwrap();
        assert!(sim.all_departed());

        for s in &sim.shoppers {
            let mine: Vec<MoveNotice> = log
                .moves
                .iter()
                .filter(|(_, n)| n.agent == s.id())
                .map(|&(_, n)| n)
                .collect();
            assert_eq!(mine.len(), s.visited().len() + 1);
            for (n, &to) in mine.iter().zip(s.visited()) {
                assert_eq!(n.to, Some(to));
            }
            let last = mine.last().unwrap();
            assert!(last.is_departure());
            assert_eq!(last.from, s.previous());
            assert!(s.check_invariants().is_ok());
        }
        assert_eq!(sim.env.moves_notified(), log.moves.len() as u64);
    }

    #[test]
    fn snapshots_see_consistent_occupancy() {
        struct Snapshots {
            taken: Vec<Tick>,
        }
        impl SimObserver<MatrixEnvironment> for Snapshots {
            fn on_snapshot(&mut self, tick: Tick, shoppers: &[Shopper], env: &MatrixEnvironment) {
                let present = shoppers.iter().filter(|s| s.current().is_some()).count();
                assert_eq!(env.total_present() as usize, present);
                for (i, &count) in env.occupancy_counts().iter().enumerate() {
                    let here = shoppers
                        .iter()
                        .filter(|s| s.current() == Some(LocationId(i as u32)))
                        .count();
                    assert_eq!(count as usize, here);
                }
                self.taken.push(tick);
            }
        }

        let (shoppers, rngs) = PopulationBuilder::new(30, 3)
            .max_stay_range(20.0, 25.0)
            .arrival_window(10)
            .build()
            .unwrap();
        let config = SimConfig { snapshot_interval_ticks: 5, ..test_config(20) };
        let mut sim = SimBuilder::new(config, shoppers, rngs, strip_mall(), busy_model())
            .build()
            .unwrap();
        let mut obs = Snapshots { taken: Vec::new() };
        sim.run(&mut obs).unwrap();
        assert_eq!(obs.taken, vec![Tick(0), Tick(5), Tick(10), Tick(15)]);
    }
}

// ── Errors & determinism ──────────────────────────────────────────────────────

#[cfg(test)]
mod error_tests {
    use super::*;
    use crate::SimError;

    #[test]
    fn empty_environment_aborts_before_mutation() {
        let (shoppers, rngs) = population(3, 10.0);
        let before = shoppers.clone();
        let mut sim = SimBuilder::new(test_config(10), shoppers, rngs, MatrixEnvironment::empty(), busy_model())
            .build()
            .unwrap();
        let mut log = MoveLog::default();

        let err = sim.run(&mut log).unwrap_err();
        match &err {
            SimError::Agent(e) => assert!(e.is_invalid_environment()),
            other => panic!("expected an agent error, got {other:?}"),
        }
        assert_eq!(sim.shoppers, before);
        assert!(log.moves.is_empty());
        assert_eq!(sim.clock.current_tick, Tick::ZERO);
    }

    fn trajectory(seed: u64) -> Vec<(Tick, mall_spatial::MoveNotice)> {
        let (shoppers, rngs) = PopulationBuilder::new(25, seed)
            .max_stay_range(10.0, 40.0)
            .arrival_window(5)
            .build()
            .unwrap();
        let config = SimConfig { seed, ..test_config(60) };
        let mut sim = SimBuilder::new(config, shoppers, rngs, strip_mall(), busy_model())
            .build()
            .unwrap();
        let mut log = MoveLog::default();
        sim.run(&mut log).unwrap();
        log.moves
    }

    #[test]
    fn same_seed_same_trajectories() {
        assert_eq!(trajectory(7), trajectory(7));
        assert_ne!(trajectory(7), trajectory(8));
    }
}

// ── Parallel decision phase ───────────────────────────────────────────────────

#[cfg(all(test, feature = "parallel"))]
mod parallel_tests {
    use mall_core::RandomSource;
    use mall_spatial::{MallGeometry, MoveNotice, MoveSink};

    use super::*;

    /// Sink that stamps each notice with the tick it was sent on.
    struct Stamped {
        env:   MatrixEnvironment,
        tick:  Tick,
        moves: Vec<(Tick, MoveNotice)>,
    }

    impl MallGeometry for Stamped {
        fn location_count(&self) -> usize { self.env.location_count() }
        fn distance(&self, from: LocationId, to: LocationId) -> f64 { self.env.distance(from, to) }
        fn direction(&self, from: LocationId, to: LocationId) -> Vec2 { self.env.direction(from, to) }
    }

    impl MoveSink for Stamped {
        fn notify_move(&mut self, notice: &MoveNotice) {
            self.env.notify_move(notice);
            self.moves.push((self.tick, *notice));
        }
    }

    fn crowd(seed: u64) -> (Vec<Shopper>, ShopperRngs) {
        PopulationBuilder::new(64, seed)
            .max_stay_range(10.0, 40.0)
            .arrival_window(8)
            .build()
            .unwrap()
    }

    /// One shopper at a time, ascending id, straight through `advance`.
    fn serial_moves(seed: u64, ticks: u64) -> Vec<(Tick, MoveNotice)> {
        let (mut shoppers, mut rngs) = crowd(seed);
        let model = busy_model();
        let mut sink = Stamped { env: strip_mall(), tick: Tick::ZERO, moves: Vec::new() };
        for t in 0..ticks {
            sink.tick = Tick(t);
            for s in shoppers.iter_mut().filter(|s| s.is_active_at(Tick(t))) {
                let rng: &mut dyn RandomSource = rngs.get_mut(s.id()).unwrap();
                s.advance(&mut sink, &model, 1.0, rng).unwrap();
            }
        }
        sink.moves
    }

    fn parallel_moves(seed: u64, ticks: u64, num_threads: Option<usize>) -> Vec<(Tick, MoveNotice)> {
        let (shoppers, rngs) = crowd(seed);
        let config = SimConfig { seed, num_threads, ..test_config(ticks) };
        let mut sim = SimBuilder::new(config, shoppers, rngs, strip_mall(), busy_model())
            .build()
            .unwrap();
        let mut log = MoveLog::default();
        sim.run_ticks(ticks, &mut log).unwrap();
        log.moves
    }

    #[test]
    fn parallel_run_matches_serial_order() {
        let expected = serial_moves(11, 60);
        assert!(!expected.is_empty());
        assert_eq!(parallel_moves(11, 60, Some(4)), expected);
        assert_eq!(parallel_moves(11, 60, None), expected);
    }

    #[test]
    fn thread_count_does_not_change_trajectories() {
        assert_eq!(parallel_moves(3, 40, Some(1)), parallel_moves(3, 40, Some(3)));
    }
}

// ── MallConfig ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod config_tests {
    use std::io::Write;

    use super::*;
    use crate::{MallConfig, SimError};

    #[test]
    fn empty_document_is_all_defaults() {
        let config = MallConfig::from_toml_str("").unwrap();
        assert_eq!(config, MallConfig::default());
        assert_eq!(config.movement.walking_speed, 83.0);
        assert_eq!(config.movement.relocate_probability, 0.05);
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config = MallConfig::from_toml_str(
            r#"
            [sim]
            minutes_per_iteration = 2.5
            seed = 9

            [movement]
            relocate_probability = 0.2

            [population]
            count = 12
            arrival_window_ticks = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.sim.minutes_per_iteration, 2.5);
        assert_eq!(config.sim.seed, 9);
        assert_eq!(config.sim.total_ticks, SimConfig::default().total_ticks);
        assert_eq!(config.movement.relocate_probability, 0.2);
        assert_eq!(config.movement.forward_weight, 0.9);
        assert_eq!(config.population.count, 12);
        assert_eq!(config.population.max_stay_minutes, 180.0);
    }

    #[test]
    fn invalid_values_rejected() {
        let bad_minutes = MallConfig::from_toml_str("[sim]\nminutes_per_iteration = -1.0\n");
        assert!(matches!(bad_minutes, Err(SimError::Core(_))));

        let bad_probability = MallConfig::from_toml_str("[movement]\nrelocate_probability = 2.0\n");
        assert!(matches!(bad_probability, Err(SimError::Behavior(_))));

        let bad_range = MallConfig::from_toml_str(
            "[population]\nmin_stay_minutes = 90.0\nmax_stay_minutes = 10.0\n",
        );
        assert!(matches!(bad_range, Err(SimError::Config(_))));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let result = MallConfig::from_toml_str("[sim\nseed = ");
        assert!(matches!(result, Err(SimError::Parse(_))));

        let wrong_type = MallConfig::from_toml_str("[sim]\nseed = \"forty-two\"\n");
        assert!(matches!(wrong_type, Err(SimError::Parse(_))));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[sim]\ntotal_ticks = 30\n\n[population]\ncount = 7").unwrap();

        let config = MallConfig::load(file.path()).unwrap();
        assert_eq!(config.sim.total_ticks, 30);

        let (shoppers, rngs) = config.population_builder().build().unwrap();
        assert_eq!(shoppers.len(), 7);
        assert_eq!(rngs.len(), 7);
        assert!(shoppers.iter().all(|s| (30.0..=180.0).contains(&s.max_stay())));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = MallConfig::load(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(SimError::Io { .. })));
    }

    #[test]
    fn config_drives_a_full_run() {
        let config = MallConfig::from_toml_str(
            "[sim]\ntotal_ticks = 120\nseed = 5\n\n[population]\ncount = 15\nmin_stay_minutes = 5.0\nmax_stay_minutes = 15.0\n",
        )
        .unwrap();
        let (shoppers, rngs) = config.population_builder().build().unwrap();
        let mut sim = SimBuilder::new(config.sim.clone(), shoppers, rngs, strip_mall(), config.model().unwrap())
            .build()
            .unwrap();
        sim.run(&mut NoopObserver).unwrap();
        assert!(sim.all_departed());
        assert!(sim.clock.current_tick < Tick(120));
    }
}
