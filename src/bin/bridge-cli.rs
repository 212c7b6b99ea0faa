use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "bridge-cli")]
#[command(about = "Command-line client for the line bridge HTTP API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List connected clients and their remote addresses
    Clients,
    /// Send a message to one client and print its reply
    Send {
        /// Client ID as shown by `clients`
        id: String,
        /// Message to write to the client
        message: String,
        /// Append a newline to the message
        #[arg(short = 'n', long)]
        newline: bool,
    },
    /// Check bridge health
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let res = match cli.command {
        Commands::Clients => client.get(format!("{}/clients", cli.url)).send().await?,
        Commands::Send { id, mut message, newline } => {
            if newline {
                message.push('\n');
            }
            client
                .post(format!("{}/send/{}", cli.url, id))
                .form(&[("message", message)])
                .send()
                .await?
        }
        Commands::Health => client.get(format!("{}/health", cli.url)).send().await?,
    };
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let json: Value = res.json().await?;

    if status.is_success() {
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        eprintln!("Error: bridge returned status {}", status);
        eprintln!("{}", serde_json::to_string_pretty(&json)?);
        std::process::exit(1);
    }
    Ok(())
}
