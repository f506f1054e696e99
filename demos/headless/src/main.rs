//! headless: run any built-in rust_abm model from the command line.
//!
//! ```text
//! headless list
//! headless <model> [ticks] [key=value ...]
//! ```
//!
//! Parameters are passed as raw text and parsed against the model's schema.
//! Agent rows, tick summaries, and statistics are written as CSV to
//! `output/<model>/`, together with a `run.json` summary.  Set `RUST_LOG`
//! (e.g. `RUST_LOG=abm_sim=debug`) for per-tick logging.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use serde_json::json;
use tracing::info;

use abm_core::Value;
use abm_model::{ModelRegistry, ParamSet};
use abm_models::register_builtin_models;
use abm_output::{CsvWriter, SnapshotExporter};
use abm_sim::{Engine, Retention, RunConfig};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:                  u64 = 42;
const DEFAULT_TICKS:         u64 = 200;
const OUTPUT_INTERVAL_TICKS: u64 = 10;  // agent rows every 10 ticks
const RETAINED_SNAPSHOTS:    usize = 16;

// ── Arguments ─────────────────────────────────────────────────────────────────

fn parse_params(args: &[String]) -> Result<ParamSet> {
    let mut params = ParamSet::new();
    for arg in args {
        let Some((key, raw)) = arg.split_once('=') else {
            bail!("expected key=value, got {arg:?}");
        };
        params.insert(key, raw);
    }
    Ok(params)
}

fn print_models(registry: &ModelRegistry) {
    for model in registry.list() {
        println!("{:<14} {}", model.name, model.description);
        for spec in model.schema.iter() {
            let default = spec.default.as_ref().map(Value::to_string).unwrap_or_else(|| "-".into());
            println!("    {:<16} {:<8} {}", spec.key, default, spec.description);
        }
    }
}

fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Int(i)   => json!(i),
        Value::Float(f) => json!(f),
        Value::Bool(b)  => json!(b),
        Value::Text(s)  => json!(s),
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let mut registry = ModelRegistry::new();
    register_builtin_models(&mut registry)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(model) = args.first() else {
        bail!("usage: headless list | headless <model> [ticks] [key=value ...]");
    };
    if model == "list" {
        print_models(&registry);
        return Ok(());
    }

    let (ticks, rest) = match args.get(1).map(|a| a.parse::<u64>()) {
        Some(Ok(n)) => (n, &args[2..]),
        _ => (DEFAULT_TICKS, &args[1..]),
    };
    let params = parse_params(rest)?;

    // 1. Start the run.
    let engine = Engine::new(registry);
    let config = RunConfig {
        seed:      SEED,
        retention: Retention::LastN(RETAINED_SNAPSHOTS),
        ..RunConfig::default()
    };
    let handle = engine
        .start_run(model, &params, config)
        .with_context(|| format!("starting {model}"))?;

    // 2. Set up output.
    let dir = Path::new("output").join(model);
    std::fs::create_dir_all(&dir)?;
    let mut exporter = SnapshotExporter::new(CsvWriter::new(&dir)?).every(OUTPUT_INTERVAL_TICKS);
    exporter.record(&*engine.current_snapshot(handle)?);

    // 3. Run.
    println!("=== headless: {model} ({handle}) ===");
    println!("Ticks: {ticks}  |  Seed: {SEED}  |  Output: {}", dir.display());
    let t0 = Instant::now();
    let published = engine.advance_with(handle, ticks, &mut exporter)?;
    let elapsed = t0.elapsed();

    exporter.finish()?;
    if let Some(e) = exporter.take_error() {
        eprintln!("output error: {e}");
    }

    // 4. Summary.
    let last = engine.current_snapshot(handle)?;
    let complete = engine.is_complete(handle)?;
    info!(%handle, ticks = published.len(), complete, "run finished");
    println!(
        "Published {} ticks in {:.3} s{}",
        published.len(),
        elapsed.as_secs_f64(),
        if complete { " (model reached a terminal state)" } else { "" }
    );
    println!();
    println!("{:<16} {:>12}", "Statistic", "Value");
    println!("{}", "-".repeat(29));
    for stat in last.statistics() {
        println!("{:<16} {:>12.4}", stat.name, stat.value);
    }

    let params: serde_json::Map<String, serde_json::Value> =
        params.iter().map(|(k, v)| (k.to_owned(), to_json(v))).collect();
    let statistics: serde_json::Map<String, serde_json::Value> =
        last.statistics().iter().map(|s| (s.name.clone(), json!(s.value))).collect();
    let summary = json!({
        "model":      model,
        "seed":       SEED,
        "final_tick": last.tick().0,
        "complete":   complete,
        "agents":     last.world().agents().len(),
        "params":     params,
        "statistics": statistics,
    });
    std::fs::write(dir.join("run.json"), serde_json::to_string_pretty(&summary)?)?;

    engine.stop(handle);
    Ok(())
}
