//! Minimal research assistant: chat completions and messages providers only,
//! no conversation memory and no web search.

use clap::Parser;
use clap_derive::Parser;
use config::{Credentials, load_env_file};
use llm::{ProviderId, ProviderRegistry};
use research_core::logging::init_file_logging;
use std::io::{self, BufRead, Write};

const LITE_PROVIDERS: [ProviderId; 3] = [ProviderId::DeepSeek, ProviderId::OpenAI, ProviderId::Anthropic];

#[derive(Parser, Debug)]
#[command(name = "research-lite", author, version, about = "Personal research assistant (lite)", long_about = None)]
struct Args {
    /// Provider to start with (deepseek, openai, anthropic)
    #[arg(long, default_value = "deepseek")]
    provider: String,
}

fn available_names(registry: &ProviderRegistry) -> String {
    registry
        .list_available()
        .iter()
        .map(ProviderId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Answer for one query, or the lite "not available" text listing the alternatives.
async fn research(registry: &ProviderRegistry, provider: &str, query: &str) -> String {
    if !registry.is_available(provider) {
        return format!(
            "Provider '{}' is not available. Available providers: {}",
            provider,
            available_names(registry)
        );
    }
    registry.query(provider, query, "").await
}

fn prompt(lines: &mut impl Iterator<Item = io::Result<String>>, text: &str) -> io::Result<Option<String>> {
    print!("{}", text);
    io::stdout().flush()?;
    lines.next().transpose()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_env_file();
    let args = Args::parse();
    init_file_logging();

    let registry = ProviderRegistry::configure_only(&Credentials::from_env(), &LITE_PROVIDERS);
    if let Err(e) = registry.ensure_any_available() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let rule = "=".repeat(50);
    println!("{}", rule);
    println!("Personal Research Assistant");
    println!("{}", rule);
    println!("Available AI providers: {}", available_names(&registry));
    println!("Type 'quit' to exit");
    println!("Type 'switch' to change AI provider");
    println!("{}", rule);

    let mut current = args.provider.to_lowercase();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let Some(query) = prompt(&mut lines, "\nWhat would you like to research? ")? else {
            println!();
            println!("Goodbye!");
            break;
        };
        let query = query.trim();

        if query.eq_ignore_ascii_case("quit") {
            println!("Goodbye!");
            break;
        }

        if query.eq_ignore_ascii_case("switch") {
            println!("Available providers: {}", available_names(&registry));
            let choice = prompt(&mut lines, "Which provider would you like to use? ")?
                .unwrap_or_default()
                .trim()
                .to_lowercase();
            if registry.is_available(&choice) {
                println!("Switched to {}", choice);
                current = choice;
            } else {
                println!("Provider '{}' not available.", choice);
            }
            continue;
        }

        if query.is_empty() {
            continue;
        }

        let title = current
            .parse::<ProviderId>()
            .map(|id| id.display_name().to_string())
            .unwrap_or_else(|_| current.clone());
        println!("Researching with {}...", title);
        let response = research(&registry, &current, query).await;

        println!();
        println!("{}", rule);
        println!("Research Results ({}):", title);
        println!("{}", rule);
        println!("{}", response);
        println!("{}", rule);
    }

    Ok(())
}
