use datamold_generate::DataGenerator;
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let schema = json!({
        "id": {"type": "integer", "min": 1, "max": 1_000_000},
        "profile": {
            "name": {"type": "string", "content": "name"},
            "bio": {"type": "string", "content": "text", "max_length": 120},
            "born": {"type": "date", "min_date": "-80y", "max_date": "-18y"}
        },
        "plan": {"type": "string", "options": ["free", "pro", "team"]},
        "score": {"type": "float", "min": 0.0, "max": 5.0}
    });

    let generator = DataGenerator::new(schema)?;
    let record = generator.generate()?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
