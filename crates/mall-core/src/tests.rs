//! Unit tests for mall-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentId, LocationId};

    #[test]
    fn index_roundtrip() {
        let id = AgentId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(AgentId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn ordering() {
        assert!(AgentId(0) < AgentId(1));
        assert!(LocationId(100) > LocationId(99));
    }

    #[test]
    fn display() {
        assert_eq!(AgentId(7).to_string(), "AgentId(7)");
        assert_eq!(LocationId(2).to_string(), "LocationId(2)");
    }
}

#[cfg(test)]
mod geo {
    use crate::Vec2;

    #[test]
    fn dot_sign() {
        let east = Vec2::new(1.0, 0.0);
        assert!(east.dot(Vec2::new(3.0, 1.0)) > 0.0);
        assert!(east.dot(Vec2::new(-2.0, 5.0)) < 0.0);
        assert_eq!(east.dot(Vec2::new(0.0, 4.0)), 0.0);
    }

    #[test]
    fn zero_momentum_is_orthogonal_to_everything() {
        assert!(Vec2::ZERO.is_zero());
        assert_eq!(Vec2::ZERO.dot(Vec2::new(-7.5, 2.0)), 0.0);
    }

    #[test]
    fn negation_and_length() {
        let v = Vec2::new(3.0, -4.0);
        assert_eq!(-v, Vec2::new(-3.0, 4.0));
        assert!((v.length() - 5.0).abs() < 1e-12);
        assert!((v + (-v)).is_zero());
        assert!((v - v).approx_eq(Vec2::ZERO, 0.0));
    }
}

#[cfg(test)]
mod time {
    use crate::{SimClock, SimConfig, Tick};

    #[test]
    fn tick_ordering_and_display() {
        assert!(Tick::ZERO < Tick(1));
        assert_eq!(Tick(42).to_string(), "T42");
    }

    #[test]
    fn clock_elapsed_minutes() {
        let mut clock = SimClock::new(2.5);
        assert_eq!(clock.elapsed_minutes(), 0.0);
        clock.advance();
        clock.advance();
        assert_eq!(clock.elapsed_minutes(), 5.0);
    }

    #[test]
    fn clock_hm() {
        let mut clock = SimClock::new(1.0);
        for _ in 0..125 {
            clock.advance();
        }
        assert_eq!(clock.elapsed_hm(), (2, 5));
        assert_eq!(clock.to_string(), "T125 (+02:05)");
    }

    #[test]
    fn config_validation() {
        assert!(SimConfig::default().validate().is_ok());

        let bad = SimConfig { minutes_per_iteration: 0.0, ..SimConfig::default() };
        assert!(bad.validate().is_err());

        let nan = SimConfig { minutes_per_iteration: f64::NAN, ..SimConfig::default() };
        assert!(nan.validate().is_err());

        let threads = SimConfig { num_threads: Some(0), ..SimConfig::default() };
        assert!(threads.validate().is_err());
    }

    #[test]
    fn end_tick() {
        let cfg = SimConfig { total_ticks: 600, ..SimConfig::default() };
        assert_eq!(cfg.end_tick(), Tick(600));
        assert_eq!(cfg.make_clock().current_tick, Tick::ZERO);
    }
}

#[cfg(test)]
mod rng {
    use crate::{AgentId, AgentRng, Draw, RandomSource, ScriptedRandom, SimRng};

    #[test]
    fn deterministic_same_seed() {
        let mut r1 = AgentRng::new(12345, AgentId(0));
        let mut r2 = AgentRng::new(12345, AgentId(0));
        for _ in 0..100 {
            assert_eq!(r1.uniform_index(1000), r2.uniform_index(1000));
            assert_eq!(r1.bernoulli(0.5), r2.bernoulli(0.5));
        }
    }

    #[test]
    fn different_agents_differ() {
        let mut r0 = AgentRng::new(1, AgentId(0));
        let mut r1 = AgentRng::new(1, AgentId(1));
        let a: Vec<_> = (0..16).map(|_| r0.uniform_index(1 << 20)).collect();
        let b: Vec<_> = (0..16).map(|_| r1.uniform_index(1 << 20)).collect();
        assert_ne!(a, b, "seeds for adjacent agents should diverge");
    }

    #[test]
    fn uniform_index_bounds() {
        let mut rng = AgentRng::new(0, AgentId(0));
        assert_eq!(rng.uniform_index(0), None);
        for _ in 0..1000 {
            let i = rng.uniform_index(3).unwrap();
            assert!(i < 3);
        }
    }

    #[test]
    fn bernoulli_extremes() {
        let mut rng = SimRng::new(7);
        assert!(!rng.bernoulli(0.0));
        assert!(rng.bernoulli(1.0));
        // Out-of-range probabilities are clamped, not rejected.
        assert!(rng.bernoulli(4.0));
        assert!(!rng.bernoulli(-1.0));
    }

    #[test]
    fn weighted_index_rejects_degenerate_weights() {
        let mut rng = AgentRng::new(0, AgentId(0));
        assert_eq!(rng.weighted_index(&[]), None);
        assert_eq!(rng.weighted_index(&[0.0, 0.0]), None);
        assert_eq!(rng.weighted_index(&[1.0, -1.0]), None);
    }

    #[test]
    fn weighted_index_never_picks_zero_weight() {
        let mut rng = AgentRng::new(3, AgentId(9));
        for _ in 0..500 {
            assert_eq!(rng.weighted_index(&[0.0, 2.0, 0.0]), Some(1));
        }
    }

    #[test]
    fn weighted_index_follows_weights() {
        let mut rng = SimRng::new(99);
        let mut hits = [0usize; 2];
        for _ in 0..10_000 {
            hits[rng.weighted_index(&[1.0, 3.0]).unwrap()] += 1;
        }
        let share = hits[1] as f64 / 10_000.0;
        assert!((share - 0.75).abs() < 0.03, "got {share}");
    }

    #[test]
    fn child_rngs_diverge() {
        let mut root = SimRng::new(5);
        let mut a = root.child(0);
        let mut b = root.child(1);
        let xa: Vec<_> = (0..8).map(|_| a.uniform_index(1 << 20)).collect();
        let xb: Vec<_> = (0..8).map(|_| b.uniform_index(1 << 20)).collect();
        assert_ne!(xa, xb);
    }

    #[test]
    fn scripted_replays_in_order() {
        let mut rng = ScriptedRandom::new([
            Draw::Uniform(2),
            Draw::Bernoulli(true),
            Draw::Weighted(1),
        ]);
        assert_eq!(rng.uniform_index(3), Some(2));
        assert!(rng.bernoulli(0.05));
        assert_eq!(rng.weighted_index(&[0.5, 1.5]), Some(1));
        assert_eq!(rng.last_weights(), Some(&[0.5, 1.5][..]));
        assert_eq!(rng.remaining(), 0);
        assert_eq!(rng.consumed().len(), 3);
    }

    #[test]
    #[should_panic(expected = "expected a Bernoulli draw")]
    fn scripted_rejects_wrong_call_kind() {
        let mut rng = ScriptedRandom::new([Draw::Uniform(0)]);
        rng.bernoulli(0.5);
    }
}
