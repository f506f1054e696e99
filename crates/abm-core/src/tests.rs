//! Unit tests for abm-core primitives.

#[cfg(test)]
mod ids {
    use crate::AgentId;

    #[test]
    fn index_roundtrip() {
        let id = AgentId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(AgentId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn ids_order_and_widen() {
        assert!(AgentId(2) < AgentId(10));
        assert_eq!(u64::from(AgentId(u32::MAX)), u64::from(u32::MAX));
    }

    #[test]
    fn display() {
        assert_eq!(AgentId(7).to_string(), "AgentId(7)");
    }
}

#[cfg(test)]
mod pos {
    use crate::{Heading, Position};

    #[test]
    fn distances() {
        let a = Position::new(1, 1);
        let b = Position::new(4, -1);
        assert_eq!(a.manhattan(b), 5);
        assert_eq!(a.chebyshev(b), 3);
        assert_eq!(a.offset(3, -2), b);
    }

    #[test]
    fn ordering_is_row_major_on_x_then_y() {
        assert!(Position::new(0, 5) < Position::new(1, 0));
        assert!(Position::new(2, 1) < Position::new(2, 3));
    }

    #[test]
    fn advance_snaps_to_grid() {
        let p = Position::new(5, 5);
        assert_eq!(p.advance(Heading::new(1.0, 0.0), 1.0), Position::new(6, 5));
        assert_eq!(p.advance(Heading::new(0.0, -3.0), 2.0), Position::new(5, 3));
        // Diagonal unit vector (0.707, 0.707) rounds to (1, 1).
        assert_eq!(p.advance(Heading::new(2.0, 2.0), 1.0), Position::new(6, 6));
        assert_eq!(p.advance(Heading::ZERO, 4.0), p);
    }

    #[test]
    fn heading_math() {
        let h = Heading::new(3.0, 4.0);
        assert_eq!(h.length(), 5.0);
        let n = h.normalized();
        assert!((n.length() - 1.0).abs() < 1e-12);
        assert!(Heading::ZERO.normalized().is_zero());
        let sum: Heading = [Heading::new(1.0, 0.0), Heading::new(0.0, 2.0)].into_iter().sum();
        assert_eq!(sum, Heading::new(1.0, 2.0));
        assert_eq!(h.reversed().scale(2.0), Heading::new(-6.0, -8.0));
    }

    #[test]
    fn display() {
        assert_eq!(Position::new(3, -2).to_string(), "(3, -2)");
    }
}

#[cfg(test)]
mod time {
    use crate::Tick;

    #[test]
    fn tick_arithmetic() {
        let t = Tick(10);
        assert_eq!(t.next(), Tick(11));
        assert_eq!(Tick(15).since(t), 5);
        assert_eq!(Tick(3).since(Tick(9)), 0);
        assert_eq!(Tick(4).to_string(), "T4");
    }
}

#[cfg(test)]
mod value {
    use crate::{CoreError, Value};

    #[test]
    fn numeric_access() {
        assert_eq!(Value::Int(3).as_f64(), Ok(3.0));
        assert_eq!(Value::Float(2.5).as_f64(), Ok(2.5));
        assert_eq!(Value::Int(3).as_i64(), Ok(3));
        assert!(Value::Float(1.0).as_i64().is_err());
    }

    #[test]
    fn type_mismatch_names_both_sides() {
        let err = Value::from("abc").as_f64().unwrap_err();
        assert_eq!(err, CoreError::TypeMismatch { expected: "numeric", got: "text" });
    }

    #[test]
    fn addition_promotes_only_when_needed() {
        assert_eq!(Value::Int(1).checked_add(&Value::Int(2)), Ok(Value::Int(3)));
        assert_eq!(Value::Int(1).checked_add(&Value::Float(0.5)), Ok(Value::Float(1.5)));
        assert!(Value::Bool(true).checked_add(&Value::Int(1)).is_err());
    }

    #[test]
    fn display_and_from() {
        assert_eq!(Value::from(7i64).to_string(), "7");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from(String::from("red")).as_str(), Ok("red"));
    }
}

#[cfg(test)]
mod rng {
    use crate::{AgentRng, SimRng, Tick};

    #[test]
    fn unit_rng_depends_on_unit_and_tick() {
        let draw = |unit, tick| -> u64 { AgentRng::for_unit(9, unit, Tick(tick)).random() };
        assert_eq!(draw(3, 5), draw(3, 5));
        assert_ne!(draw(3, 5), draw(4, 5));
        assert_ne!(draw(3, 5), draw(3, 6));
        assert_ne!(draw(0, 0), draw(AgentRng::cell_unit(0), 0));
    }

    #[test]
    fn gen_bool_clamps() {
        let mut rng = AgentRng::for_unit(1, 0, Tick::ZERO);
        assert!(rng.gen_bool(2.0));
        assert!(!rng.gen_bool(-1.0));
    }

    #[test]
    fn sim_rng_replays_from_seed() {
        let draws = |seed| -> Vec<u32> {
            let mut rng = SimRng::new(seed);
            (0..8).map(|_| rng.gen_range(0..1000)).collect()
        };
        assert_eq!(draws(99), draws(99));
        assert_ne!(draws(99), draws(100));
    }
}
