//! services/api/src/bin/openapi.rs
//!
//! Writes the OpenAPI 3 document for the lending API to `openapi.json`.

use api_lib::web::ApiDoc;
use utoipa::OpenApi;

fn generate_spec(
    api_doc: utoipa::openapi::OpenApi,
    path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let spec_json = api_doc.to_pretty_json()?;
    std::fs::write(path, spec_json)?;
    println!("OpenAPI document written to {}", path);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    generate_spec(ApiDoc::openapi(), "openapi.json")
}
