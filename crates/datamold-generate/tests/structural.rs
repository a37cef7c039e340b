use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::{Map, Value, json};

use datamold_core::Schema;
use datamold_generate::errors::GenerationError;
use datamold_generate::generators::{GeneratedValue, Generator, GeneratorContext};
use datamold_generate::params::ParamSpec;
use datamold_generate::{DataGenerator, GenerationSettings, GeneratorRegistry};

fn sample_schema() -> Value {
    json!({
        "id": {"type": "integer", "min": 1, "max": 100},
        "profile": {
            "name": {"type": "string", "content": "name"},
            "tags": {"type": "string", "options": ["a", "b"]},
            "location": {
                "type": "dict",
                "zip": {"type": "string", "min_length": 5, "max_length": 5}
            }
        },
        "score": {"type": "float", "min": 0, "max": 1},
        "joined": {"type": "date", "min_date": "-1y"}
    })
}

#[test]
fn record_has_the_shape_of_its_schema() {
    let generator = DataGenerator::new(sample_schema()).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(21);
    let record = generator.generate_with_rng(&mut rng).unwrap();

    assert_eq!(record.shape(), generator.schema().shape());
    let keys: Vec<&str> = record.keys().collect();
    assert_eq!(keys, vec!["id", "profile", "score", "joined"]);
    let location = record.get("profile").unwrap().as_object().unwrap();
    let zip = location.get("location").unwrap().as_object().unwrap();
    assert_eq!(zip.get("zip").unwrap().as_str().unwrap().len(), 5);
}

#[test]
fn json_text_and_value_inputs_agree() {
    let text = serde_json::to_string(&sample_schema()).unwrap();
    let from_text = DataGenerator::new(text.as_str()).unwrap();
    let from_value = DataGenerator::new(sample_schema()).unwrap();
    let from_wrapped = DataGenerator::new(Value::String(text)).unwrap();
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    let a = from_text
        .generate_at(now, &mut ChaCha8Rng::seed_from_u64(3))
        .unwrap();
    let b = from_value
        .generate_at(now, &mut ChaCha8Rng::seed_from_u64(3))
        .unwrap();
    let c = from_wrapped
        .generate_at(now, &mut ChaCha8Rng::seed_from_u64(3))
        .unwrap();
    assert_eq!(a, b);
    assert_eq!(b, c);
}

#[test]
fn serialized_schema_round_trips_to_the_same_shape() {
    let schema = Schema::from_value(sample_schema()).unwrap();
    let reparsed = DataGenerator::new(schema.to_json_string().unwrap()).unwrap();
    let record = reparsed.generate().unwrap();
    assert_eq!(record.shape(), schema.shape());
}

#[test]
fn unknown_type_fails_the_whole_record() {
    let generator = DataGenerator::new(json!({
        "ok": {"type": "integer", "min": 0, "max": 10},
        "x": {"type": "nope"}
    }))
    .unwrap();
    match generator.generate() {
        Err(GenerationError::UnknownGeneratorType(tag)) => assert_eq!(tag, "nope"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn malformed_inputs_are_rejected() {
    assert!(matches!(
        DataGenerator::new(json!([1, 2])),
        Err(GenerationError::MalformedSchema(_))
    ));
    assert!(matches!(
        DataGenerator::new("{not json"),
        Err(GenerationError::Json(_))
    ));

    let generator = DataGenerator::new(json!({"x": {"type": 5}})).unwrap();
    assert!(matches!(
        generator.generate(),
        Err(GenerationError::MalformedSchema(_))
    ));
}

#[test]
fn empty_schema_yields_empty_record() {
    let generator = DataGenerator::new(json!({})).unwrap();
    assert!(generator.generate().unwrap().is_empty());
}

#[test]
fn seeded_batches_are_reproducible() {
    let schema = json!({
        "code": {"type": "string", "min_length": 4, "max_length": 12},
        "qty": {"type": "integer", "min": 0, "max": 1000}
    });
    let generator = DataGenerator::new(schema).unwrap();
    let first = generator.generate_batch(5, Some(99)).unwrap();
    let second = generator.generate_batch(5, Some(99)).unwrap();
    assert_eq!(first.len(), 5);
    assert_eq!(first, second);
}

#[test]
fn shared_generator_works_across_threads() {
    let generator = Arc::new(DataGenerator::new(sample_schema()).unwrap());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let generator = Arc::clone(&generator);
            std::thread::spawn(move || generator.generate().map(|record| record.shape()))
        })
        .collect();
    for handle in handles {
        let shape = handle.join().unwrap().unwrap();
        assert_eq!(shape, generator.schema().shape());
    }
}

struct DiceGenerator;

impl Generator for DiceGenerator {
    fn id(&self) -> &'static str {
        "dice"
    }

    fn params(&self) -> &'static [ParamSpec] {
        &[]
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        _spec: &Map<String, Value>,
        rng: &mut dyn RngCore,
    ) -> Result<GeneratedValue, GenerationError> {
        Ok(GeneratedValue::Int(rng.random_range(1..7)))
    }
}

#[test]
fn custom_generators_extend_the_registry() {
    let mut registry = GeneratorRegistry::new();
    registry.register_generator(Box::new(DiceGenerator)).unwrap();
    assert!(registry.contains("dice"));

    let generator = DataGenerator::new(json!({"roll": {"type": "dice"}}))
        .unwrap()
        .with_registry(Arc::new(registry));
    let record = generator.generate().unwrap();
    let roll = record.get("roll").unwrap().as_i64().unwrap();
    assert!((1..7).contains(&roll));
}

#[test]
fn duplicate_and_reserved_tags_are_refused() {
    let mut registry = GeneratorRegistry::new();
    registry.register_generator(Box::new(DiceGenerator)).unwrap();
    assert!(matches!(
        registry.register_generator(Box::new(DiceGenerator)),
        Err(GenerationError::DuplicateGenerator(_))
    ));

    struct Shadow;
    impl Generator for Shadow {
        fn id(&self) -> &'static str {
            "dict"
        }
        fn params(&self) -> &'static [ParamSpec] {
            &[]
        }
        fn generate(
            &self,
            _ctx: &GeneratorContext<'_>,
            _spec: &Map<String, Value>,
            _rng: &mut dyn RngCore,
        ) -> Result<GeneratedValue, GenerationError> {
            Ok(GeneratedValue::Int(0))
        }
    }
    assert!(matches!(
        registry.register_generator(Box::new(Shadow)),
        Err(GenerationError::DuplicateGenerator(_))
    ));
}

#[test]
fn string_max_length_setting_caps_default_strings() {
    let settings = GenerationSettings {
        string_max_length: 4,
        ..GenerationSettings::default()
    };
    let generator =
        DataGenerator::with_settings(json!({"s": {"type": "string"}}), settings).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    for _ in 0..50 {
        let record = generator.generate_with_rng(&mut rng).unwrap();
        assert!(record.get("s").unwrap().as_str().unwrap().len() < 4);
    }
}
