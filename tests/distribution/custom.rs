use std::sync::atomic::{AtomicUsize, Ordering};

use trialspec::codec::{DistributionRegistry, decode_distribution, encode_distribution};
use trialspec::distribution::{AttributeReader, Distribution, FromAttributes, UniqueSample};
use trialspec::{Callables, Error, Mapping, Result, Value};

/// Walks its values in order, wrapping around.
#[derive(Debug)]
struct Cycle {
    name: String,
    values: Vec<i64>,
    cursor: AtomicUsize,
}

impl Cycle {
    fn new(name: &str, values: Vec<i64>) -> Self {
        Self {
            name: name.to_owned(),
            values,
            cursor: AtomicUsize::new(0),
        }
    }
}

impl Distribution for Cycle {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &str {
        Self::KIND
    }

    fn sample(&self, n: usize) -> Result<Vec<Value>> {
        if n == 0 {
            return Err(Error::InvalidSampleSize);
        }
        Ok((0..n)
            .map(|_| {
                let i = self.cursor.fetch_add(1, Ordering::Relaxed) % self.values.len();
                Value::Int(self.values[i])
            })
            .collect())
    }

    fn sample_unique(&self, n: usize) -> Result<UniqueSample> {
        Ok(UniqueSample::complete(
            self.values.iter().take(n).map(|&v| Value::Int(v)).collect(),
        ))
    }

    fn attributes(&self) -> Mapping {
        let values = self.values.iter().map(|&v| Value::Int(v)).collect();
        [
            ("name", Value::from(self.name.as_str())),
            ("values", Value::List(values)),
        ]
        .into_iter()
        .collect()
    }
}

impl FromAttributes for Cycle {
    const KIND: &'static str = "Cycle";

    fn from_attributes(attributes: &Mapping) -> Result<Self> {
        let reader = AttributeReader::new(Self::KIND, attributes);
        let values = reader
            .list("values")?
            .iter()
            .map(|v| {
                v.as_i64().ok_or(Error::InvalidAttribute {
                    kind: Self::KIND.to_owned(),
                    attribute: "values".to_owned(),
                    expected: "a list of integers",
                })
            })
            .collect::<Result<Vec<_>>>()?;
        if values.is_empty() {
            return Err(Error::EmptyOptions(reader.str("name")?.to_owned()));
        }
        Ok(Self::new(reader.str("name")?, values))
    }
}

#[test]
fn test_custom_distribution_round_trips_through_registry() {
    let d = Cycle::new("batch", vec![16, 32, 64]);
    let mut registry = DistributionRegistry::with_builtins();
    registry.register::<Cycle>();

    let encoded = encode_distribution(&d);
    assert_eq!(encoded["kind"], "Cycle");

    let decoded = decode_distribution(&encoded, &registry, &Callables::new()).unwrap();
    assert_eq!(decoded.name(), "batch");
    assert_eq!(decoded.attributes(), d.attributes());
    assert_eq!(
        decoded.sample(4).unwrap(),
        [16, 32, 64, 16].map(Value::Int).to_vec()
    );
}

#[test]
fn test_custom_distribution_needs_registration() {
    let encoded = encode_distribution(&Cycle::new("batch", vec![1]));
    let err = decode_distribution(
        &encoded,
        &DistributionRegistry::with_builtins(),
        &Callables::new(),
    );
    assert!(matches!(err, Err(Error::UnknownDistributionKind(k)) if k == "Cycle"));
}

#[test]
fn test_register_fn_under_display_name() {
    let mut encoded = encode_distribution(&Cycle::new("batch", vec![8, 9]));
    encoded["kind"] = "Legacy batch sizes".into();

    let mut registry = DistributionRegistry::new();
    registry.register_fn("Legacy batch sizes", |attrs| {
        Cycle::from_attributes(attrs).map(|d| Box::new(d) as Box<dyn Distribution>)
    });
    let decoded = decode_distribution(&encoded, &registry, &Callables::new()).unwrap();
    assert_eq!(decoded.sample_unique(5).unwrap().values, [Value::Int(8), Value::Int(9)]);
}

#[test]
fn test_constructor_validation_surfaces() {
    let attrs: Mapping = [
        ("name", Value::from("batch")),
        ("values", Value::List(vec![Value::from("big")])),
    ]
    .into_iter()
    .collect();
    assert!(matches!(
        Cycle::from_attributes(&attrs),
        Err(Error::InvalidAttribute { attribute, .. }) if attribute == "values"
    ));
}
