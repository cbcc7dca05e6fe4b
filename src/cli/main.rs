use clap::{Parser, Subcommand};
use llm_dictionary::indexing::{divide_into_batches, make_combinations, MAX_ARRAY_QUERY_VALUES};
use llm_dictionary::models::Phrase;
use reqwest::Client;
use serde_json::json;
use std::error::Error;

#[derive(Parser)]
#[command(name = "llm-dict-cli")]
#[command(about = "LLM Dictionary CLI", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080", env = "LLM_DICT_ENDPOINT")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a word or phrase
    Lookup {
        #[arg(value_name = "WORDS", num_args = 1.., required = true)]
        words: Vec<String>,

        /// Send the request wrapped in a `data` object
        #[arg(short, long)]
        wrapped: bool,
    },

    /// Show the normalized phrase and the combinations it is indexed by
    Combinations {
        #[arg(value_name = "WORDS", num_args = 1.., required = true)]
        words: Vec<String>,
    },

    /// Check server health
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let client = Client::new();

    match cli.command {
        Commands::Lookup { words, wrapped } => {
            let words = words.join(" ");
            let body = if wrapped {
                json!({ "data": { "words": words } })
            } else {
                json!({ "words": words })
            };

            let response = client
                .post(format!("{}/v1/lookup", cli.endpoint))
                .json(&body)
                .send()
                .await?;

            let body: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }

        Commands::Combinations { words } => {
            let phrase = Phrase::normalize(&words.join(" "));
            let combinations = make_combinations(phrase.as_str());
            let batches = divide_into_batches(&combinations, MAX_ARRAY_QUERY_VALUES);

            println!("{}", serde_json::to_string_pretty(&json!({
                "phrase": phrase,
                "wordCount": phrase.word_count(),
                "combinations": combinations,
                "batches": batches.len(),
            }))?);
        }

        Commands::Health => {
            let response = client
                .get(format!("{}/health", cli.endpoint))
                .send()
                .await?;

            let body: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }

    Ok(())
}
