use mockweave_core::DatasetSchema;
use mockweave_generate::{GenerateOptions, GenerationEngine};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let schema: DatasetSchema = serde_json::from_value(serde_json::json!({
        "entities": {
            "customers": {"count": 3, "archetype": "person", "fields": ["full_name", "email"]},
            "orders": {
                "count": 5,
                "archetype": "custom",
                "fields": ["total", "placed_at"],
                "relationships": {"customer_id": {"references": "customers"}},
                "patterns": {"total": {"type": "range", "value": {"min": 5, "max": 250, "precision": 2}}}
            }
        }
    }))?;

    let engine = GenerationEngine::new(GenerateOptions::default());
    let result = engine.generate_dataset(&schema, Some(2024), Some("en_US"))?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
