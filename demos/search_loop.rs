//! Random search over a toy model, with the trial log saved and reloaded.
//!
//! Defines a spec with a log-scaled learning rate, a stepped depth and a
//! categorical activation, evaluates 30 sampled configurations, then writes
//! the trials to CSV and the whole spec to JSON and reads both back.
//!
//! Run with: `cargo run --example search_loop`

use trialspec::prelude::*;

fn relu(args: &[Value]) -> Value {
    Value::Float(args.first().and_then(Value::as_f64).unwrap_or(0.0).max(0.0))
}

fn tanh(args: &[Value]) -> Value {
    Value::Float(args.first().and_then(Value::as_f64).unwrap_or(0.0).tanh())
}

/// A made-up loss surface with its optimum near lr = 0.01, depth = 4.
fn loss(fit: &Callable, params: &Mapping) -> f64 {
    let lr = params.get("lr").and_then(Value::as_f64).unwrap_or(1.0);
    let depth = params.get("depth").and_then(Value::as_f64).unwrap_or(1.0);
    let act = params.get("activation").and_then(Value::as_callable);

    let fitted = fit.call(&[Value::Float(lr), Value::Float(depth)]);
    let base = fitted.as_f64().unwrap_or(f64::INFINITY);
    let penalty = act.map_or(1.0, |a| a.call(&[Value::Float(-1.0)]).as_f64().unwrap_or(1.0).abs());
    base + 0.1 * penalty
}

fn main() -> Result<()> {
    let callables: Callables = [
        Callable::new("fit", |args: &[Value]| {
            let lr = args[0].as_f64().unwrap_or(1.0);
            let depth = args[1].as_f64().unwrap_or(1.0);
            Value::Float((lr.log10() + 2.0).powi(2) + (depth - 4.0).powi(2) / 10.0)
        }),
        Callable::new("relu", relu),
        Callable::new("tanh", tanh),
    ]
    .into_iter()
    .collect();
    let fit = callables.resolve("fit")?;

    let mut spec = Spec::builder()
        .name("toy-mlp")
        .fit(fit.clone())
        .param(FloatDist::builder("lr", 1e-4, 1.0).log_scale().seed(1).build()?)
        .param(FloatDist::builder("depth", 1.0, 8.0).step(1.0).seed(2).build()?)
        .param(CatDist::with_seed(
            "activation",
            vec![
                Value::Callable(callables.resolve("relu")?),
                Value::Callable(callables.resolve("tanh")?),
            ],
            3,
        )?)
        .fit_param("epochs", 10)
        .build();

    // Every depth at least once, then random draws for the rest.
    let depths = spec
        .param("depth")
        .map(|d| d.sample_unique(8))
        .transpose()?
        .unwrap_or_else(|| UniqueSample::complete(Vec::new()));
    for advisory in &depths.advisories {
        println!("note: {advisory}");
    }

    for i in 0..30 {
        let mut trial = spec.sample_params()?;
        if let Some(depth) = depths.values.get(i) {
            trial.insert("depth", depth.clone());
        }
        let value = loss(&fit, &trial);
        trial.insert("loss", value);
        spec.add_trial(trial);
    }

    let best = spec
        .trials()
        .iter()
        .min_by(|a, b| {
            let la = a.get("loss").and_then(Value::as_f64).unwrap_or(f64::INFINITY);
            let lb = b.get("loss").and_then(Value::as_f64).unwrap_or(f64::INFINITY);
            la.total_cmp(&lb)
        })
        .ok_or(Error::Internal("no trials"))?;
    println!("best of {} trials: {best:?}", spec.trials().len());

    let dir = tempfile::tempdir()?;
    let csv_path = dir.path().join("trials.csv");
    let json_path = dir.path().join("spec.json");

    let status = spec.trials_to_csv(&csv_path, IfExists::Overwrite)?;
    println!("csv: {status:?} at {}", csv_path.display());
    spec.save_spec(&json_path)?;

    let mut from_csv = Spec::new();
    from_csv.trials_from_csv(&csv_path, true)?;
    println!("reloaded {} trials from csv", from_csv.trials().len());

    let mut restored = Spec::new();
    restored.load_spec(&json_path, &callables, &DistributionRegistry::with_builtins())?;
    println!(
        "restored '{}' with {} params and {} trials",
        restored.spec_name.as_deref().unwrap_or("?"),
        restored.params.as_ref().map_or(0, Vec::len),
        restored.trials().len()
    );
    Ok(())
}
