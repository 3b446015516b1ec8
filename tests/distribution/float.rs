use trialspec::Error;
use trialspec::distribution::{Advisory, Distribution, FloatDist};

fn sorted(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(f64::total_cmp);
    values
}

#[test]
fn test_linear_samples_stay_in_bounds() {
    for (lo, hi) in [(0.0, 1.0), (-5.0, 5.0), (1e-6, 2e-6), (-1e9, -1e8)] {
        let d = FloatDist::builder("x", lo, hi).seed(11).build().unwrap();
        for v in d.sample_f64(500).unwrap() {
            assert!((lo..=hi).contains(&v), "sample {v} out of range [{lo}, {hi}]");
        }
    }
}

#[test]
fn test_linear_samples_roughly_uniform() {
    let d = FloatDist::builder("x", 0.0, 1.0).seed(42).build().unwrap();
    let samples = sorted(d.sample_f64(2000).unwrap());
    let q1 = samples[500];
    let q2 = samples[1000];
    let q3 = samples[1500];
    assert!((q1 - 0.25).abs() < 0.1, "Q1 {q1} should be close to 0.25");
    assert!((q2 - 0.5).abs() < 0.1, "median {q2} should be close to 0.5");
    assert!((q3 - 0.75).abs() < 0.1, "Q3 {q3} should be close to 0.75");
}

#[test]
fn test_log_samples_are_log_uniform() {
    let d = FloatDist::builder("lr", 1e-4, 1.0)
        .log_scale()
        .seed(5)
        .build()
        .unwrap();
    let samples = d.sample_f64(2000).unwrap();
    assert!(samples.iter().all(|v| (1e-4..=1.0).contains(v)));
    // Half the mass of a log-uniform over four decades lies below 1e-2.
    let below = samples.iter().filter(|&&v| v < 1e-2).count();
    assert!((800..1200).contains(&below), "{below} of 2000 below 1e-2");
}

#[test]
fn test_log_requires_positive_bounds() {
    for (lo, hi) in [(0.0, 1.0), (-1.0, 1.0), (-2.0, -1.0)] {
        let err = FloatDist::builder("lr", lo, hi).log_scale().build();
        assert!(
            matches!(err, Err(Error::InvalidBounds { .. })),
            "log over [{lo}, {hi}] should fail"
        );
    }
}

#[test]
fn test_stepped_unique_values_are_step_apart() {
    let d = FloatDist::builder("x", 0.0, 5.0)
        .step(0.25)
        .seed(8)
        .build()
        .unwrap();
    let unique = sorted(d.sample_unique_f64(15).unwrap().values);
    assert_eq!(unique.len(), 15);
    for pair in unique.windows(2) {
        assert!(
            pair[1] - pair[0] >= 0.25 - 1e-9,
            "{} and {} closer than one step",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn test_stepped_values_lie_on_grid() {
    let d = FloatDist::builder("x", -1.0, 1.0)
        .step(0.5)
        .seed(2)
        .build()
        .unwrap();
    for v in d.sample_f64(300).unwrap() {
        let k = (v + 1.0) / 0.5;
        assert!((k - k.round()).abs() < 1e-9, "{v} is off the grid");
        assert!((-1.0..=1.0).contains(&v));
    }
}

#[test]
fn test_stepped_log_values_stay_in_bounds() {
    let d = FloatDist::builder("units", 1.0, 100.0)
        .step(10.0)
        .log_scale()
        .seed(4)
        .build()
        .unwrap();
    assert_eq!(d.cardinality(), Some(10));
    for v in d.sample_f64(300).unwrap() {
        assert!((1.0..=100.0).contains(&v));
    }
}

#[test]
fn test_unique_never_repeats() {
    let d = FloatDist::builder("x", 0.0, 1.0).seed(1).build().unwrap();
    let out = d.sample_unique_f64(200).unwrap();
    assert!(out.is_complete());
    let values = sorted(out.values);
    assert_eq!(values.len(), 200);
    assert!(values.windows(2).all(|w| w[0] != w[1]));
}

#[test]
fn test_unique_over_grid_returns_whole_grid() {
    let d = FloatDist::builder("x", 1.0, 10.0)
        .step(1.0)
        .seed(9)
        .build()
        .unwrap();
    assert_eq!(d.cardinality(), Some(10));

    let out = d.sample_unique_f64(15).unwrap();
    assert_eq!(sorted(out.values), (1..=10).map(f64::from).collect::<Vec<_>>());
    assert_eq!(
        out.advisories,
        [Advisory::CardinalityExceeded {
            name: "x".to_owned(),
            requested: 15,
            available: 10,
        }]
    );
}

#[test]
fn test_unique_reports_exhausted_attempts() {
    let d = FloatDist::builder("x", 0.0, 999.0)
        .step(1.0)
        .max_attempts(1)
        .seed(3)
        .build()
        .unwrap();
    let out = d.sample_unique_f64(900).unwrap();
    assert!(out.len() < 900);
    assert!(out.advisories.iter().any(|a| matches!(
        a,
        Advisory::AttemptsExhausted { requested: 900, attempts: 1, .. }
    )));
}

#[test]
fn test_trait_object_sampling() {
    let d: Box<dyn Distribution> =
        Box::new(FloatDist::builder("x", 2.0, 3.0).seed(6).build().unwrap());
    let values = d.sample(4).unwrap();
    assert_eq!(values.len(), 4);
    assert!(values.iter().all(|v| v.as_f64().is_some_and(|f| (2.0..=3.0).contains(&f))));
    assert!(matches!(d.sample(0), Err(Error::InvalidSampleSize)));
    assert!(d.sample_unique(0).unwrap().is_empty());
}
