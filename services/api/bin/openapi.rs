use clap::Parser;
use utoipa::OpenApi;
use vocabot_api::router::ApiDoc;

/// Writes the OpenAPI description of the service to a file.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Output path.
    #[arg(long, default_value = "openapi.json")]
    out: String,
}

/// Generates the OpenAPI specification and writes it to a file.
fn generate_spec(
    api_doc: utoipa::openapi::OpenApi,
    path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let spec_json = api_doc.to_pretty_json()?;
    std::fs::write(path, spec_json)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    generate_spec(ApiDoc::openapi(), &args.out)?;
    Ok(())
}
