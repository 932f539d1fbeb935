use anyhow::{Context, Result};
use rempo_api::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "openapi.json".to_string());

    println!("Generating OpenAPI specification...");

    let openapi = ApiDoc::openapi();
    let json = openapi
        .to_pretty_json()
        .context("Failed to serialize OpenAPI specification")?;

    println!("Endpoints found: {}", openapi.paths.paths.len());
    println!("API Title: {}", openapi.info.title);
    println!("API Version: {}", openapi.info.version);

    std::fs::write(&path, &json).with_context(|| format!("Failed to write {}", path))?;
    println!("OpenAPI specification saved to {}", path);

    Ok(())
}
