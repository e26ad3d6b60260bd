use clap::Parser;
use clap_derive::Parser;
use config::{Credentials, Settings, load_env_file};
use llm::ProviderId;
use research_core::logging::{init_file_logging, init_stderr_logging};
use research_core::pipeline::new_session_id;
use research_core::{DocumentRequest, QueryOutcome, QueryPipeline, QueryRequest, SearchEngine, SearchResult};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

const RULE_WIDTH: usize = 60;

#[derive(Parser, Debug)]
#[command(name = "research", author, version, about = "Terminal research assistant", long_about = None)]
struct Args {
    /// Default AI provider (deepseek, openai, anthropic, gemini, huggingface)
    #[arg(long, env = "AI_PROVIDER")]
    provider: Option<String>,

    /// Enable web search by default
    #[arg(long)]
    web_search: bool,

    /// Search backend: auto, serpapi or google-pse
    #[arg(long, default_value = "auto")]
    search_engine: SearchEngine,

    /// Process a single query and exit
    #[arg(long, short)]
    query: Option<String>,

    /// Analyze a document file and exit
    #[arg(long, short)]
    file: Option<PathBuf>,

    /// Query for document analysis (used with --file)
    #[arg(long, short, default_value = research_core::document::DEFAULT_DOCUMENT_QUERY)]
    document_query: String,

    /// Log to stderr instead of the log file
    #[arg(long, short)]
    tracing: bool,
}

struct AppState {
    pipeline: QueryPipeline,
    session_id: String,
    current_provider: ProviderId,
    web_search: bool,
    search_engine: SearchEngine,
}

impl AppState {
    fn available_names(&self) -> String {
        self.pipeline
            .registry()
            .list_available()
            .iter()
            .map(ProviderId::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    async fn process_query(&mut self, query: &str) {
        if query.trim().is_empty() {
            return;
        }
        if self.web_search {
            println!("Searching the web and querying {}...", self.current_provider);
        } else {
            println!("Querying {}...", self.current_provider);
        }

        let request = QueryRequest::new(query)
            .provider(self.current_provider.as_str())
            .session(self.session_id.clone())
            .web_search(self.web_search)
            .search_engine(self.search_engine);
        let outcome = self.pipeline.handle(request).await;
        print_outcome(&outcome);
    }

    async fn analyze_document(&mut self, path: PathBuf, query: String) {
        println!("Analyzing {} with {}...", path.display(), self.current_provider);
        let mut request = DocumentRequest::new(path);
        request.query = Some(query);
        request.provider = Some(self.current_provider.as_str().to_string());
        request.session_id = Some(self.session_id.clone());

        match self.pipeline.analyze_document(request).await {
            Ok(outcome) => print_outcome(&outcome),
            Err(e) => println!("Error: {}", e),
        }
    }
}

fn rule(c: char) -> String {
    c.to_string().repeat(RULE_WIDTH)
}

fn print_outcome(outcome: &QueryOutcome) {
    println!();
    println!("{}", rule('-'));
    println!("RESPONSE:");
    println!("{}", rule('-'));
    println!("{}", outcome.response);

    if !outcome.search_results.is_empty() {
        print_search_results(&outcome.search_results);
    }
    println!("{}", rule('-'));
}

fn print_search_results(results: &[SearchResult]) {
    println!();
    println!("{}", rule('-'));
    println!("SEARCH RESULTS:");
    println!("{}", rule('-'));
    for (i, result) in results.iter().enumerate() {
        println!();
        println!("{}. {}", i + 1, result.title);
        println!("   {}", result.snippet);
        println!("   URL: {}", result.link);
        println!("   Source: {}", result.source);
    }
}

fn print_welcome(state: &AppState) {
    println!();
    println!("{}", rule('='));
    println!("{:^width$}", "TERMINAL RESEARCH ASSISTANT", width = RULE_WIDTH);
    println!("{}", rule('='));
    println!("Session ID: {}", state.session_id);
    println!("Current AI Provider: {}", state.current_provider);
    println!(
        "Web Search: {}",
        if state.web_search { "Enabled" } else { "Disabled" }
    );
    println!("Available Providers: {}", state.available_names());
    println!("{}", rule('='));
    commands::print_help();
    println!();
    println!("Enter your research question to begin.");
    println!("{}", rule('='));
}

// Slash command parsing and handling
mod commands {
    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    pub enum Command {
        Quit,
        Help,
        Clear,
        SetProvider(String),
        /// `None` toggles.
        WebSearch(Option<bool>),
        Upload { path: PathBuf, query: String },
    }

    pub enum CommandResult {
        Continue,
        Exit,
    }

    fn parse_switch(arg: &str) -> Option<bool> {
        match arg.to_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => Some(true),
            "off" | "no" | "false" | "0" => Some(false),
            _ => None,
        }
    }

    impl Command {
        pub fn parse(input: &str) -> Result<Self, String> {
            let Some(rest) = input.strip_prefix('/') else {
                return Err("Not a command".to_string());
            };

            let parts: Vec<&str> = rest.split_whitespace().collect();
            let Some(name) = parts.first() else {
                return Err("Empty command".to_string());
            };

            match name.to_lowercase().as_str() {
                "quit" | "exit" | "q" => Ok(Command::Quit),
                "help" => Ok(Command::Help),
                "clear" | "reset" => Ok(Command::Clear),
                "provider" => match parts.get(1) {
                    Some(provider) => Ok(Command::SetProvider(provider.to_lowercase())),
                    None => Err("Usage: /provider <name>".to_string()),
                },
                "websearch" => match parts.get(1) {
                    None => Ok(Command::WebSearch(None)),
                    Some(arg) => parse_switch(arg)
                        .map(|on| Command::WebSearch(Some(on)))
                        .ok_or_else(|| "Usage: /websearch <on|off>".to_string()),
                },
                "upload" => match parts.get(1) {
                    Some(path) => {
                        let query = if parts.len() > 2 {
                            parts[2..].join(" ")
                        } else {
                            research_core::document::DEFAULT_DOCUMENT_QUERY.to_string()
                        };
                        Ok(Command::Upload {
                            path: PathBuf::from(path),
                            query,
                        })
                    }
                    None => Err("Usage: /upload <file> [query]".to_string()),
                },
                _ => Err("Unknown command. Type /help for available commands.".to_string()),
            }
        }

        pub async fn execute(self, state: &mut AppState) -> CommandResult {
            let command = match self {
                Command::WebSearch(None) => Command::WebSearch(Some(!state.web_search)),
                other => other,
            };
            match command {
                Command::Quit => {
                    println!("Goodbye!");
                    CommandResult::Exit
                }
                Command::Help => {
                    print_welcome(state);
                    CommandResult::Continue
                }
                Command::Clear => {
                    state.pipeline.memory().clear_session(&state.session_id);
                    println!("Conversation history cleared.");
                    CommandResult::Continue
                }
                Command::SetProvider(name) => {
                    match name.parse::<ProviderId>() {
                        Ok(id) if state.pipeline.registry().is_available(id.as_str()) => {
                            state.current_provider = id;
                            println!("Switched to provider: {}", id);
                        }
                        _ => println!(
                            "Provider '{}' not available. Available providers: {}",
                            name,
                            state.available_names()
                        ),
                    }
                    CommandResult::Continue
                }
                Command::WebSearch(Some(true)) => {
                    if state.pipeline.search().is_available() {
                        state.web_search = true;
                        println!("Web search enabled.");
                    } else {
                        println!("Web search is not available. Check your API keys.");
                    }
                    CommandResult::Continue
                }
                Command::WebSearch(_) => {
                    state.web_search = false;
                    println!("Web search disabled.");
                    CommandResult::Continue
                }
                Command::Upload { path, query } => {
                    state.analyze_document(path, query).await;
                    CommandResult::Continue
                }
            }
        }
    }

    pub fn print_help() {
        println!();
        println!("Commands:");
        println!("  /provider <name>        - Switch AI provider");
        println!("  /websearch [on|off]     - Toggle web search");
        println!("  /upload <file> [query]  - Upload and analyze a document");
        println!("  /clear, /reset          - Clear conversation history");
        println!("  /quit, /exit, /q        - Exit the program");
        println!("  /help                   - Show this help message");
        println!("  Ctrl+D                  - Exit the program");
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_commands() {
            assert_eq!(Command::parse("/q"), Ok(Command::Quit));
            assert_eq!(Command::parse("/RESET"), Ok(Command::Clear));
            assert_eq!(
                Command::parse("/provider Anthropic"),
                Ok(Command::SetProvider("anthropic".to_string()))
            );
            assert!(Command::parse("/provider").is_err());
            assert!(Command::parse("/frobnicate").is_err());
            assert!(Command::parse("hello").is_err());
        }

        #[test]
        fn test_parse_websearch() {
            assert_eq!(Command::parse("/websearch"), Ok(Command::WebSearch(None)));
            assert_eq!(Command::parse("/websearch yes"), Ok(Command::WebSearch(Some(true))));
            assert_eq!(Command::parse("/websearch OFF"), Ok(Command::WebSearch(Some(false))));
            assert!(Command::parse("/websearch maybe").is_err());
        }

        #[test]
        fn test_parse_upload() {
            assert_eq!(
                Command::parse("/upload paper.pdf"),
                Ok(Command::Upload {
                    path: PathBuf::from("paper.pdf"),
                    query: "Analyze this document".to_string(),
                })
            );
            assert_eq!(
                Command::parse("/upload notes.txt what are the key dates?"),
                Ok(Command::Upload {
                    path: PathBuf::from("notes.txt"),
                    query: "what are the key dates?".to_string(),
                })
            );
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_env_file();
    let args = Args::parse();

    if args.tracing {
        init_stderr_logging("debug,traffic=debug");
    } else {
        init_file_logging();
    }

    let settings = Settings::load();
    let credentials = Credentials::from_env();
    let pipeline = QueryPipeline::from_credentials(&credentials, &settings);

    if let Err(e) = pipeline.registry().ensure_any_available() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let preferred = args
        .provider
        .clone()
        .or_else(|| settings.default_provider.clone())
        .unwrap_or_else(|| ProviderId::DeepSeek.as_str().to_string());
    let Some(current_provider) = pipeline.registry().default_provider(Some(&preferred)) else {
        anyhow::bail!("No AI providers configured. Please check your API keys.");
    };

    let web_search = (args.web_search || settings.web_search) && pipeline.search().is_available();
    let mut state = AppState {
        pipeline,
        session_id: new_session_id(),
        current_provider,
        web_search,
        search_engine: args.search_engine,
    };

    if let Some(query) = args.query.as_deref() {
        state.process_query(query).await;
        return Ok(());
    }

    if let Some(file) = args.file {
        state.analyze_document(file, args.document_query).await;
        return Ok(());
    }

    print_welcome(&state);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!(
            "\n[{}, Web: {}] > ",
            state.current_provider,
            if state.web_search { "ON" } else { "OFF" }
        );
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
            None => {
                println!();
                println!("Goodbye!");
                break;
            }
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        if input.starts_with('/') {
            match commands::Command::parse(input) {
                Ok(cmd) => match cmd.execute(&mut state).await {
                    commands::CommandResult::Exit => break,
                    commands::CommandResult::Continue => continue,
                },
                Err(err) => {
                    println!("{}", err);
                    continue;
                }
            }
        }

        state.process_query(input).await;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_engine_flag() {
        let args = Args::try_parse_from(["research", "--search-engine", "google-pse"]).unwrap();
        assert_eq!(args.search_engine, SearchEngine::GooglePse);

        let args = Args::try_parse_from(["research"]).unwrap();
        assert_eq!(args.search_engine, SearchEngine::Auto);

        assert!(Args::try_parse_from(["research", "--search-engine", "bing"]).is_err());
    }
}
