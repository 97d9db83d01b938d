use clap::{Parser, Subcommand};
use reqwest::Method;
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "contact-cli")]
#[command(about = "Command-line client for the contact API", long_about = None)]
struct Cli {
    /// Contacts endpoint URL.
    #[arg(short, long, default_value = "http://localhost:8000/api/contacts")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search contacts by name (all contacts when TEXT is omitted)
    Search { text: Option<String> },
    /// Add a contact
    Add {
        nama: String,
        telepon: String,
        email: String,
    },
    /// Replace the fields of an existing contact
    Update {
        id: u64,
        nama: String,
        telepon: String,
        email: String,
    },
    /// Delete a contact
    Delete { id: u64 },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let request = match cli.command {
        Commands::Search { text } => {
            let mut req = client.get(&cli.url);
            if let Some(text) = text {
                req = req.query(&[("search", text)]);
            }
            req
        }
        Commands::Add {
            nama,
            telepon,
            email,
        } => client
            .post(&cli.url)
            .json(&json!({ "nama": nama, "telepon": telepon, "email": email })),
        Commands::Update {
            id,
            nama,
            telepon,
            email,
        } => client
            .put(&cli.url)
            .json(&json!({ "id": id, "nama": nama, "telepon": telepon, "email": email })),
        Commands::Delete { id } => client
            .request(Method::DELETE, &cli.url)
            .json(&json!({ "id": id })),
    };

    print_response(request.send().await?).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => {
            println!("{}", serde_json::to_string_pretty(&json)?);
            if json["status"] != "success" {
                std::process::exit(1);
            }
        }
        Err(_) => {
            eprintln!("Error: API returned non-JSON response with status {}", status);
            eprintln!("Response: {}", text);
            std::process::exit(1);
        }
    }
    Ok(())
}
