//! Unit tests for abm-model.

#[cfg(test)]
mod params {
    use abm_core::Value;

    use crate::{ModelError, ParamSchema, ParamSet, ParamSpec};

    fn schema() -> ParamSchema {
        ParamSchema::new()
            .param(ParamSpec::int("agents", "population size").range(1.0, 1_000.0))
            .param(ParamSpec::float("cohesion", "pull towards neighbors").default(1.0).range(0.0, 5.0))
            .param(ParamSpec::bool("wrap", "toroidal grid").default(true))
            .param(ParamSpec::choice("shape", &["moore", "von_neumann"], "neighborhood").default("moore"))
    }

    fn key_of(err: ModelError) -> String {
        match err {
            ModelError::InvalidParameter { key, .. } => key,
            other => panic!("expected InvalidParameter, got {other:?}"),
        }
    }

    #[test]
    fn defaults_fill_missing_optional_keys() {
        let v = schema().validate(&ParamSet::new().with("agents", 10i64)).unwrap();
        assert_eq!(v.i64("agents"), Ok(10));
        assert_eq!(v.f64("cohesion"), Ok(1.0));
        assert_eq!(v.bool("wrap"), Ok(true));
        assert_eq!(v.str("shape"), Ok("moore"));
    }

    #[test]
    fn missing_required_key() {
        let err = schema().validate(&ParamSet::new()).unwrap_err();
        assert_eq!(key_of(err), "agents");
    }

    #[test]
    fn unknown_key() {
        let p = ParamSet::new().with("agents", 5i64).with("colour", "red");
        assert_eq!(key_of(schema().validate(&p).unwrap_err()), "colour");
    }

    #[test]
    fn text_that_does_not_parse_names_the_key() {
        let p = ParamSet::new().with("agents", 5i64).with("cohesion", "not-a-number");
        let err = schema().validate(&p).unwrap_err();
        match err {
            ModelError::InvalidParameter { key, reason } => {
                assert_eq!(key, "cohesion");
                assert!(reason.contains("float"), "reason: {reason}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn int_widens_to_float_and_text_parses() {
        let p = ParamSet::new()
            .with("agents", "12")
            .with("cohesion", 2i64)
            .with("wrap", "no");
        let v = schema().validate(&p).unwrap();
        assert_eq!(v.get("cohesion"), Ok(&Value::Float(2.0)));
        assert_eq!(v.i64("agents"), Ok(12));
        assert_eq!(v.bool("wrap"), Ok(false));
    }

    #[test]
    fn wrong_type_range_and_choice() {
        let bad_type = ParamSet::new().with("agents", true);
        assert_eq!(key_of(schema().validate(&bad_type).unwrap_err()), "agents");

        let out_of_range = ParamSet::new().with("agents", 0i64);
        assert_eq!(key_of(schema().validate(&out_of_range).unwrap_err()), "agents");

        let bad_choice = ParamSet::new().with("agents", 3i64).with("shape", "hex");
        assert_eq!(key_of(schema().validate(&bad_choice).unwrap_err()), "shape");
    }

    #[test]
    fn spec_parse() {
        let spec = ParamSpec::float("rate", "").range(0.0, 1.0);
        assert_eq!(spec.parse(" 0.25 "), Ok(Value::Float(0.25)));
        assert!(spec.parse("1.5").is_err());
        assert!(spec.parse("NaN").is_err());
        assert_eq!(ParamSpec::bool("b", "").parse("ON"), Ok(Value::Bool(true)));
        assert!(ParamSpec::int("n", "").parse("3.0").is_err());
    }

    #[test]
    fn rejects_nan_parameter() {
        let nan = ParamSet::new().with("agents", 5i64).with("cohesion", f64::NAN);
        assert_eq!(key_of(schema().validate(&nan).unwrap_err()), "cohesion");

        let unranged = ParamSpec::float("scale", "");
        assert!(unranged.check(Value::Float(f64::INFINITY)).is_err());
        assert!(unranged.check(Value::Float(f64::NEG_INFINITY)).is_err());
        assert_eq!(unranged.check(Value::Float(-3.5)), Ok(Value::Float(-3.5)));
    }

    #[test]
    fn redeclared_key_replaces() {
        let s = ParamSchema::new()
            .param(ParamSpec::int("n", "first"))
            .param(ParamSpec::int("n", "second").default(1i64));
        assert_eq!(s.len(), 1);
        assert!(!s.get("n").unwrap().is_required());
    }

    #[test]
    fn u32_narrowing() {
        let s = ParamSchema::new().param(ParamSpec::int("n", "").default(-1i64));
        let v = s.validate(&ParamSet::new()).unwrap();
        assert!(v.u32("n").is_err());
    }
}

#[cfg(test)]
mod policy {
    use crate::{ConflictPolicy, MergePolicy, MovePolicy};

    #[test]
    fn per_key_override() {
        let p = MergePolicy::new(MovePolicy::LowestIdWins, ConflictPolicy::LastWriter)
            .with_key("heat", ConflictPolicy::Sum);
        assert_eq!(p.for_key("heat"), ConflictPolicy::Sum);
        assert_eq!(p.for_key("energy"), ConflictPolicy::LastWriter);
    }
}

#[cfg(test)]
mod registry {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use abm_core::{Position, SimRng};
    use abm_space::{Bounds, CapacityPolicy, World};

    use crate::{
        IdleModel, Model, ModelError, ModelFactory, ModelRegistry, ModelResult, ParamSchema,
        ParamSet, ParamSpec, ValidatedParams,
    };

    /// Factory that counts how often `build` runs.
    struct Counting {
        builds: Arc<AtomicUsize>,
    }

    impl ModelFactory for Counting {
        fn description(&self) -> &str {
            "empty grid"
        }

        fn schema(&self) -> ParamSchema {
            ParamSchema::new().param(ParamSpec::int("width", "grid width").default(4i64).range(1.0, 64.0))
        }

        fn build(&self, params: &ValidatedParams) -> ModelResult<Box<dyn Model>> {
            self.builds.fetch_add(1, Ordering::SeqCst);
            let w = params.u32("width")?;
            Ok(Box::new(IdleModel::new(World::new(Bounds::new(w, w), CapacityPolicy::Exclusive))))
        }
    }

    fn registry() -> (ModelRegistry, Arc<AtomicUsize>) {
        let builds = Arc::new(AtomicUsize::new(0));
        let mut r = ModelRegistry::new();
        r.register("grid", Counting { builds: Arc::clone(&builds) }).unwrap();
        r.register("another", Counting { builds: Arc::clone(&builds) }).unwrap();
        (r, builds)
    }

    #[test]
    fn duplicate_name_rejected() {
        let (mut r, builds) = registry();
        let err = r.register("grid", Counting { builds }).unwrap_err();
        assert_eq!(err, ModelError::DuplicateModelName("grid".into()));
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn unknown_model() {
        let (r, _) = registry();
        let err = r.create("nope", &ParamSet::new()).err().unwrap();
        assert_eq!(err, ModelError::UnknownModel("nope".into()));
    }

    #[test]
    fn list_is_sorted_by_name() {
        let (r, _) = registry();
        let names: Vec<String> = r.list().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["another", "grid"]);
        assert_eq!(r.list()[0].schema.len(), 1);
    }

    #[test]
    fn invalid_params_never_reach_build() {
        let (r, builds) = registry();
        let bad = ParamSet::new().with("width", "wide");
        assert!(matches!(r.create("grid", &bad), Err(ModelError::InvalidParameter { .. })));
        assert_eq!(builds.load(Ordering::SeqCst), 0);

        let model = r.create("grid", &ParamSet::new().with("width", 3i64)).unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        let world = model.initialize(&mut SimRng::new(0)).unwrap();
        assert_eq!(world.bounds().width, 3);
        assert!(world.is_free(Position::new(0, 0)));
    }
}
