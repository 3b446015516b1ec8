use std::collections::HashSet;

use trialspec::distribution::{Advisory, CatDist, Distribution};
use trialspec::{Callable, Error, Value};

fn letters() -> Vec<Value> {
    vec!["a".into(), "b".into(), "c".into()]
}

#[test]
fn test_sample_exact_count_is_identity() {
    let c = CatDist::with_seed("c", letters(), 1).unwrap();
    for _ in 0..20 {
        assert_eq!(c.sample(3).unwrap(), letters());
    }
}

#[test]
fn test_oversample_keeps_every_option_at_the_end() {
    let c = CatDist::with_seed("c", letters(), 7).unwrap();
    let out = c.sample(5).unwrap();
    assert_eq!(out.len(), 5);
    assert_eq!(&out[2..], letters().as_slice());
    assert!(out[..2].iter().all(|v| letters().contains(v)));
}

#[test]
fn test_undersample_draws_with_replacement() {
    let c = CatDist::with_seed("c", letters(), 3).unwrap();
    let mut seen = HashSet::new();
    let mut repeated = false;
    for _ in 0..200 {
        let out = c.sample(2).unwrap();
        repeated |= out[0] == out[1];
        for v in out {
            seen.insert(v.as_str().map(str::to_owned));
        }
    }
    assert!(repeated, "sampling with replacement should repeat sometimes");
    assert_eq!(seen.len(), 3);
}

#[test]
fn test_unique_is_a_subset_without_repeats() {
    let c = CatDist::with_seed("c", (0..10).map(Value::from).collect(), 5).unwrap();
    for n in 1..=10 {
        let out = c.sample_unique(n).unwrap();
        assert!(out.is_complete());
        let ints: HashSet<i64> = out.values.iter().filter_map(Value::as_i64).collect();
        assert_eq!(ints.len(), n);
        assert!(ints.iter().all(|i| (0..10).contains(i)));
    }
}

#[test]
fn test_unique_over_request_returns_all_options_once() {
    let c = CatDist::new("c", letters()).unwrap();
    let out = c.sample_unique(4).unwrap();
    assert_eq!(out.values, letters());
    assert_eq!(
        out.advisories,
        [Advisory::CardinalityExceeded {
            name: "c".to_owned(),
            requested: 4,
            available: 3,
        }]
    );
}

#[test]
fn test_unique_counts_repeated_options_once() {
    let options: Vec<Value> = vec!["a".into(), "a".into(), "b".into()];
    let c = CatDist::with_seed("c", options, 11).unwrap();
    for _ in 0..100 {
        let out = c.sample_unique(2).unwrap();
        assert!(out.is_complete());
        let mut values = out.values;
        values.sort_by_key(|v| v.as_str().map(str::to_owned));
        assert_eq!(values, [Value::from("a"), Value::from("b")]);
    }

    let out = c.sample_unique(3).unwrap();
    assert_eq!(out.values, [Value::from("a"), Value::from("b")]);
    assert_eq!(
        out.advisories,
        [Advisory::CardinalityExceeded {
            name: "c".to_owned(),
            requested: 3,
            available: 2,
        }]
    );
}

#[test]
fn test_mixed_option_types() {
    let relu = Callable::new("relu", |args: &[Value]| {
        Value::Float(args.first().and_then(Value::as_f64).unwrap_or(0.0).max(0.0))
    });
    let options = vec![
        Value::Callable(relu),
        Value::Tuple(vec![Value::Int(64), Value::Int(32)]),
        Value::Null,
        Value::Bool(false),
    ];
    let c = CatDist::new("layer", options.clone()).unwrap();
    assert_eq!(c.sample(4).unwrap(), options);

    let act = c.options()[0].as_callable().unwrap();
    assert_eq!(act.call(&[Value::Float(-2.0)]), Value::Float(0.0));
}

#[test]
fn test_empty_options_rejected() {
    assert!(matches!(
        CatDist::new("c", Vec::new()),
        Err(Error::EmptyOptions(name)) if name == "c"
    ));
}
