//! Unit tests for abm-models.

use abm_model::{ModelRegistry, ParamSet};
use abm_sim::{Run, RunBuilder, RunConfig};

use crate::register_builtin_models;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn registry() -> ModelRegistry {
    let mut r = ModelRegistry::new();
    register_builtin_models(&mut r).unwrap();
    r
}

fn run(model: &str, params: ParamSet, seed: u64) -> Run {
    let model = registry().create(model, &params).unwrap();
    RunBuilder::new(model).config(RunConfig::with_seed(seed)).build().unwrap()
}

fn stat(run: &Run, name: &str) -> f64 {
    run.current()
        .statistic(name)
        .unwrap_or_else(|| panic!("missing statistic {name}"))
}

// ── Registry ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builtins {
    use abm_model::{ModelError, ParamSet};
    use abm_sim::{Engine, RunConfig, SimError};

    use super::*;

    #[test]
    fn all_models_registered_in_name_order() {
        let names: Vec<String> = registry().list().into_iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            vec!["diffusion", "epidemic", "fire", "flock", "predator_prey", "schelling", "sugarscape"]
        );
    }

    #[test]
    fn registering_twice_fails() {
        let mut r = registry();
        assert_eq!(
            register_builtin_models(&mut r).unwrap_err(),
            ModelError::DuplicateModelName("flock".into())
        );
    }

    #[test]
    fn every_model_builds_with_defaults() {
        let r = registry();
        for d in r.list() {
            let model = r.create(&d.name, &ParamSet::new()).unwrap();
            assert_eq!(model.name(), d.name);
            let mut run = RunBuilder::new(model).seed(1).build().unwrap();
            run.advance(1).unwrap();
        }
    }

    #[test]
    fn flock_rejects_text_cohesion() {
        let engine = Engine::new(registry());
        let params = ParamSet::new().with("cohesion", "not-a-number");
        match engine.start_run("flock", &params, RunConfig::default()).unwrap_err() {
            SimError::Model(ModelError::InvalidParameter { key, .. }) => assert_eq!(key, "cohesion"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(engine.runs().is_empty());
    }

    #[test]
    fn overcrowded_grid_is_a_parameter_error() {
        let params = ParamSet::new().with("size", 3i64).with("group_a", 5i64).with("group_b", 5i64);
        assert!(matches!(
            registry().create("schelling", &params),
            Err(ModelError::InvalidParameter { .. })
        ));
    }
}

// ── Models ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod flock {
    use super::*;

    #[test]
    fn birds_keep_unit_headings() {
        let mut r = run("flock", ParamSet::new().with("size", 20i64).with("birds", 30i64), 7);
        for snap in r.advance(15).unwrap() {
            snap.world().check_consistency().unwrap();
            for bird in snap.world().agents().iter() {
                let len = bird.state.heading().length();
                assert!((len - 1.0).abs() < 1e-9, "heading length {len}");
            }
        }
        assert_eq!(stat(&r, "birds"), 30.0);
        let p = stat(&r, "polarization");
        assert!((0.0..=1.0 + 1e-9).contains(&p), "polarization {p}");
    }

    #[test]
    fn same_seed_same_flock_across_threads() {
        let params = ParamSet::new().with("size", 16i64).with("birds", 25i64);
        let model = || registry().create("flock", &params).unwrap();
        let mut a = RunBuilder::new(model())
            .config(RunConfig { seed: 3, num_threads: Some(1), region_rows: 1, ..RunConfig::default() })
            .build()
            .unwrap();
        let mut b = RunBuilder::new(model())
            .config(RunConfig { seed: 3, num_threads: Some(3), region_rows: 5, ..RunConfig::default() })
            .build()
            .unwrap();
        a.advance(20).unwrap();
        b.advance(20).unwrap();
        assert_eq!(a.current().world(), b.current().world());
    }
}

#[cfg(test)]
mod schelling {
    use abm_agent::AgentBuilder;
    use abm_core::{AgentId, Position};
    use abm_space::{Bounds, CapacityPolicy, World};

    use super::*;
    use crate::Schelling;
    use crate::schelling::{GROUP_A, GROUP_B};

    #[test]
    fn tolerant_agents_settle_immediately() {
        let mut r = run(
            "schelling",
            ParamSet::new().with("size", 10i64).with("group_a", 30i64).with("group_b", 30i64).with("threshold", 0.0),
            1,
        );
        let snaps = r.advance(5).unwrap();
        assert_eq!(snaps.len(), 1);
        assert!(r.is_complete());
        assert_eq!(stat(&r, "satisfied"), 1.0);
    }

    #[test]
    fn assess_counts_alike_neighbors() {
        let mut w = World::new(Bounds::new(3, 3), CapacityPolicy::Exclusive);
        w.spawn(AgentBuilder::new(GROUP_A).at(Position::new(0, 0))).unwrap();
        w.spawn(AgentBuilder::new(GROUP_B).at(Position::new(1, 0))).unwrap();
        w.spawn(AgentBuilder::new(GROUP_A).at(Position::new(0, 1))).unwrap();
        w.spawn(AgentBuilder::new(GROUP_B).at(Position::new(2, 2))).unwrap();

        let model = Schelling::new(3, 2, 2, 0.6, 1);
        assert_eq!(model.assess(w.agent(AgentId(0)).unwrap(), &w), (0.5, false));
        assert_eq!(model.assess(w.agent(AgentId(3)).unwrap(), &w), (0.0, true));
    }

    #[test]
    fn segregation_run_stays_consistent() {
        let mut r = run("schelling", ParamSet::new().with("size", 12i64).with("group_a", 50i64).with("group_b", 50i64), 11);
        let snaps = r.advance(30).unwrap();
        for s in &snaps {
            s.world().check_consistency().unwrap();
            assert_eq!(s.world().agents().len(), 100);
        }
        if r.is_complete() {
            let n = snaps.len();
            assert!(n < 2 || crate::common::unmoved(snaps[n - 2].world(), snaps[n - 1].world()));
        }
    }
}

#[cfg(test)]
mod epidemic {
    use super::*;

    #[test]
    fn certain_recovery_ends_the_outbreak() {
        let params = ParamSet::new()
            .with("size", 10i64)
            .with("susceptible", 20i64)
            .with("infected", 4i64)
            .with("infection_rate", 0.0)
            .with("recovery_rate", 1.0);
        let mut r = run("epidemic", params, 2);
        assert_eq!(r.advance(10).unwrap().len(), 1);
        assert!(r.is_complete());
        assert_eq!(stat(&r, "infected"), 0.0);
        assert_eq!(stat(&r, "recovered"), 4.0);
        assert_eq!(stat(&r, "susceptible"), 20.0);
    }

    #[test]
    fn contact_infects_with_certainty() {
        // On a 2x2 grid every agent touches every other.
        let params = ParamSet::new()
            .with("size", 2i64)
            .with("susceptible", 3i64)
            .with("infected", 1i64)
            .with("infection_rate", 1.0)
            .with("recovery_rate", 0.0);
        let mut r = run("epidemic", params, 5);
        r.advance(1).unwrap();
        assert_eq!(stat(&r, "susceptible"), 0.0);
        assert_eq!(stat(&r, "infected"), 4.0);
        assert!(!r.is_complete());
    }

    #[test]
    fn without_immunity_recovered_become_susceptible() {
        let params = ParamSet::new()
            .with("size", 10i64)
            .with("susceptible", 0i64)
            .with("infected", 3i64)
            .with("recovery_rate", 1.0)
            .with("immunity", false);
        let mut r = run("epidemic", params, 9);
        r.advance(1).unwrap();
        assert_eq!(stat(&r, "susceptible"), 3.0);
        assert_eq!(stat(&r, "recovered"), 0.0);
    }
}

#[cfg(test)]
mod fire {
    use abm_model::ModelError;
    use abm_sim::SimError;

    use super::*;

    #[test]
    fn dense_forest_burns_out_completely() {
        let params = ParamSet::new()
            .with("size", 5i64)
            .with("density", 1.0)
            .with("flammability", 1.0)
            .with("consumption", 1.0);
        let mut r = run("fire", params, 4);
        assert_eq!(stat(&r, "trees"), 24.0);
        assert_eq!(stat(&r, "fires"), 1.0);

        r.advance(100).unwrap();
        assert!(r.is_complete());
        assert_eq!(stat(&r, "trees"), 0.0);
        assert_eq!(stat(&r, "burnt"), 25.0);
        assert_eq!(stat(&r, "burnt_share"), 1.0);
        assert!(r.current().world().agents().is_empty());
    }

    #[test]
    fn fires_burn_their_fuel_down() {
        let params = ParamSet::new()
            .with("size", 4i64)
            .with("density", 1.0)
            .with("flammability", 0.0)
            .with("fuel", 1.0)
            .with("consumption", 0.25);
        let mut r = run("fire", params, 1);
        let snaps = r.advance(10).unwrap();
        // Fuel 1.0 lasts three ticks at 0.25; the fire goes out on the fourth.
        assert_eq!(snaps.len(), 4);
        assert!(r.is_complete());
        assert_eq!(stat(&r, "trees"), 15.0);
        assert_eq!(stat(&r, "burnt"), 1.0);
    }

    #[test]
    fn too_many_ignitions_fail_initialization() {
        let params = ParamSet::new().with("density", 0.0).with("ignitions", 1i64);
        let model = registry().create("fire", &params).unwrap();
        assert!(matches!(
            RunBuilder::new(model).build(),
            Err(SimError::Model(ModelError::Init(_)))
        ));
    }
}

#[cfg(test)]
mod predator_prey {
    use super::*;

    #[test]
    fn lone_prey_is_caught() {
        let params = ParamSet::new()
            .with("size", 3i64)
            .with("prey", 1i64)
            .with("predators", 1i64);
        let mut r = run("predator_prey", params, 8);
        r.advance(50).unwrap();
        assert!(r.is_complete());
        assert_eq!(stat(&r, "prey"), 0.0);
        assert_eq!(stat(&r, "predators"), 1.0);
    }

    #[test]
    fn no_predators_means_immediate_end() {
        let params = ParamSet::new().with("size", 6i64).with("prey", 5i64).with("predators", 0i64);
        let mut r = run("predator_prey", params, 1);
        assert_eq!(r.advance(10).unwrap().len(), 1);
        assert!(r.is_complete());
    }
}

#[cfg(test)]
mod diffusion {
    use super::*;

    fn heat_only(diffusion: f64, decay: f64) -> ParamSet {
        ParamSet::new()
            .with("size", 9i64)
            .with("emitters", 0i64)
            .with("emission", 0.0)
            .with("diffusion", diffusion)
            .with("decay", decay)
            .with("initial_heat", 100.0)
    }

    #[test]
    fn diffusion_conserves_heat_without_decay() {
        let mut r = run("diffusion", heat_only(0.3, 0.0), 1);
        r.advance(10).unwrap();
        assert!((stat(&r, "total_heat") - 100.0).abs() < 1e-6);
        assert!(stat(&r, "hot_cells") > 1.0);
        assert!(stat(&r, "max_heat") < 100.0);
    }

    #[test]
    fn decay_compounds_per_tick() {
        let mut r = run("diffusion", heat_only(0.0, 0.5), 1);
        let snaps = r.advance(2).unwrap();
        assert_eq!(snaps[0].statistic("total_heat"), Some(50.0));
        assert_eq!(snaps[1].statistic("total_heat"), Some(25.0));
        assert_eq!(stat(&r, "hot_cells"), 1.0);
    }

    #[test]
    fn fully_decayed_cells_are_not_hot() {
        let params = heat_only(0.0, 1.0).with("initial_heat", 1.0);
        let mut r = run("diffusion", params, 1);
        assert_eq!(stat(&r, "hot_cells"), 1.0);
        r.advance(1).unwrap();
        assert_eq!(stat(&r, "total_heat"), 0.0);
        assert_eq!(stat(&r, "hot_cells"), 0.0);
        assert_eq!(stat(&r, "max_heat"), 0.0);
    }

    #[test]
    fn emitters_add_heat_every_tick() {
        let params = ParamSet::new()
            .with("size", 8i64)
            .with("emitters", 4i64)
            .with("emission", 1.0)
            .with("diffusion", 0.25)
            .with("decay", 0.0);
        let mut r = run("diffusion", params, 3);
        r.advance(5).unwrap();
        assert!((stat(&r, "total_heat") - 20.0).abs() < 1e-6);
        r.current().world().check_consistency().unwrap();
    }
}

#[cfg(test)]
mod sugarscape {
    use abm_core::Position;

    use crate::sugarscape::{CAPACITY, SUGAR, WEALTH};

    use super::*;

    fn foragers(agents: i64, max_sugar: i64, regrowth: f64) -> ParamSet {
        ParamSet::new()
            .with("size", 8i64)
            .with("agents", agents)
            .with("max_sugar", max_sugar)
            .with("regrowth", regrowth)
    }

    #[test]
    fn barren_land_starves_everyone() {
        let params = foragers(10, 0, 1.0)
            .with("initial_wealth", 2.0)
            .with("max_metabolism", 1i64);
        let mut r = run("sugarscape", params, 4);
        assert_eq!(stat(&r, "total_sugar"), 0.0);

        r.advance(1).unwrap();
        assert_eq!(stat(&r, "foragers"), 10.0);
        assert_eq!(stat(&r, "mean_wealth"), 1.0);
        assert!(!r.is_complete());

        r.advance(1).unwrap();
        assert_eq!(stat(&r, "foragers"), 0.0);
        assert!(r.is_complete());
    }

    #[test]
    fn sugar_stays_within_capacity() {
        let mut r = run("sugarscape", foragers(20, 4, 1.0), 11);
        let capacity = r.current().world().env().fields().total(CAPACITY);
        assert_eq!(stat(&r, "total_sugar"), capacity);

        for _ in 0..15 {
            r.advance(1).unwrap();
            let snap = r.current();
            let fields = snap.world().env().fields();
            for cell in snap.world().bounds().cells() {
                let sugar = fields.get_f64(SUGAR, cell);
                assert!(sugar >= 0.0, "{cell} has {sugar}");
                assert!(sugar <= fields.get_f64(CAPACITY, cell), "{cell} overflows");
            }
            assert!(stat(&r, "total_sugar") <= capacity);
            snap.world().check_consistency().unwrap();
        }
    }

    #[test]
    fn harvest_moves_sugar_into_wealth() {
        let params = foragers(1, 4, 0.0)
            .with("initial_wealth", 10.0)
            .with("max_metabolism", 1i64);
        let mut r = run("sugarscape", params, 2);
        let before = r.current();
        let start: Position = before.world().agents().iter().map(|a| a.position).next().unwrap();
        let on_cell = before.world().env().fields().get_f64(SUGAR, start);

        r.advance(1).unwrap();
        let after = r.current();
        let forager = after.world().agents().iter().next().unwrap();
        assert_eq!(forager.state.get_f64(WEALTH), Some(10.0 + on_cell - 1.0));
        assert_eq!(after.world().env().fields().get_f64(SUGAR, start), 0.0);
        assert_eq!(stat(&r, "total_sugar"), before.statistic("total_sugar").unwrap() - on_cell);
    }
}
