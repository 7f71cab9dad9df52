use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Management CLI for the CRM gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000", env = "CRM_GATEWAY_URL")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered services
    List,
    /// Show one service by id
    Show { id: String },
    /// Register a new service
    Register {
        name: String,
        url: String,
        #[arg(long)]
        health_check_endpoint: Option<String>,
        #[arg(long)]
        retry_attempts: Option<u32>,
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Register the service as inactive
        #[arg(long)]
        inactive: bool,
    },
    /// Enable or disable a service
    SetActive {
        id: String,
        #[arg(action = clap::ArgAction::Set)]
        active: bool,
    },
    /// Remove a service by id
    Delete { id: String },
    /// Probe a service's health endpoint through the gateway
    Health { service: String },
    /// Forward a request to a service
    Forward {
        service: String,
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,
        #[arg(short, long, default_value = "")]
        path: String,
        /// JSON request body
        #[arg(short, long)]
        data: Option<String>,
    },
    /// Call a JSON-RPC method
    Call {
        method: String,
        /// JSON params object
        #[arg(default_value = "{}")]
        params: String,
    },
    /// List the JSON-RPC tool catalogue
    Tools,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::List => {
            let res = client.get(format!("{}/services", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Show { id } => {
            let res = client.get(format!("{}/services/{}", base, id)).send().await?;
            print_response(res).await?;
        }
        Commands::Register {
            name,
            url,
            health_check_endpoint,
            retry_attempts,
            timeout_ms,
            inactive,
        } => {
            let mut body = Map::new();
            body.insert("name".into(), json!(name));
            body.insert("url".into(), json!(url));
            body.insert("isActive".into(), json!(!inactive));
            if let Some(endpoint) = health_check_endpoint {
                body.insert("healthCheckEndpoint".into(), json!(endpoint));
            }
            if let Some(retries) = retry_attempts {
                body.insert("retryAttempts".into(), json!(retries));
            }
            if let Some(ms) = timeout_ms {
                body.insert("timeoutMs".into(), json!(ms));
            }
            let res = client.post(format!("{}/services", base)).json(&body).send().await?;
            print_response(res).await?;
        }
        Commands::SetActive { id, active } => {
            let res = client
                .put(format!("{}/services/{}", base, id))
                .json(&json!({ "isActive": active }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Delete { id } => {
            let res = client.delete(format!("{}/services/{}", base, id)).send().await?;
            print_response(res).await?;
        }
        Commands::Health { service } => {
            let res = client.get(format!("{}/health/{}", base, service)).send().await?;
            print_response(res).await?;
        }
        Commands::Forward {
            service,
            method,
            path,
            data,
        } => {
            let data: Value = match data {
                Some(raw) => serde_json::from_str(&raw)?,
                None => Value::Null,
            };
            let res = client
                .post(format!("{}/forward/{}", base, service))
                .json(&json!({ "method": method, "path": path, "data": data }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Call { method, params } => {
            let params: Value = serde_json::from_str(&params)?;
            let res = client
                .post(format!("{}/mcp", base))
                .json(&json!({ "jsonrpc": "2.0", "method": method, "params": params, "id": 1 }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Tools => {
            let res = client.get(format!("{}/mcp/tools", base)).send().await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if !text.is_empty() {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    if text.is_empty() {
        println!("{}", status);
        return Ok(());
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
