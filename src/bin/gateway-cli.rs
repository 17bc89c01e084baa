use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Send authenticated requests through the booking gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Bearer token forwarded to the upstream API.
    #[arg(short, long, env = "GATEWAY_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway status
    Status,
    /// GET a gateway path, e.g. /api/rooms
    Get { path: String },
    /// DELETE a gateway path
    Delete { path: String },
    /// POST a JSON body to a gateway path
    Post { path: String, body: String },
    /// PUT a JSON body to a gateway path
    Put { path: String, body: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(token) = &cli.token {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))?,
        );
    }

    let (method, path, body) = match cli.command {
        Commands::Status => (Method::GET, "/gateway/status".to_string(), None),
        Commands::Get { path } => (Method::GET, path, None),
        Commands::Delete { path } => (Method::DELETE, path, None),
        Commands::Post { path, body } => (Method::POST, path, Some(body)),
        Commands::Put { path, body } => (Method::PUT, path, Some(body)),
    };

    let mut request = client
        .request(method, format!("{}{}", cli.url.trim_end_matches('/'), path))
        .headers(headers);
    if let Some(body) = body {
        let json: Value = serde_json::from_str(&body)?;
        request = request.json(&json);
    }

    print_response(request.send().await?).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let gateway_error = res
        .headers()
        .get("x-gateway-error")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let text = res.text().await?;

    if !status.is_success() {
        match gateway_error {
            Some(kind) => eprintln!("Error: gateway returned {} ({})", status, kind),
            None => eprintln!("Error: gateway returned {}", status),
        }
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
