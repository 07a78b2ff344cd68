use proposal_blink::ApiDoc;
use utoipa::OpenApi;

// Prints the OpenAPI document to stdout; `cargo xtask openapi` captures it.
fn main() -> anyhow::Result<()> {
    let spec = ApiDoc::openapi().to_pretty_json()?;
    print!("{}", spec);
    Ok(())
}
