//! services/api/src/bin/openapi.rs
//!
//! Dumps the portal API document as pretty-printed JSON, for client generators
//! and review. Usage: `openapi [OUTPUT]`, defaulting to `openapi.json`.

use portal_api_lib::web::ApiDoc;
use std::path::PathBuf;
use utoipa::OpenApi;

const DEFAULT_OUTPUT: &str = "openapi.json";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let doc = ApiDoc::openapi();
    let route_count = doc.paths.paths.len();
    std::fs::write(&output, doc.to_pretty_json()?)?;

    println!("Wrote {} routes to {}", route_count, output.display());
    Ok(())
}
