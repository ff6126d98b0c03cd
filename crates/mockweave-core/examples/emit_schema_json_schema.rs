use mockweave_core::dataset_json_schema;

fn main() {
    let json = serde_json::to_string_pretty(&dataset_json_schema()).expect("serialize json schema");
    println!("{json}");
}
