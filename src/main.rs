//! maf-router - interactive front end for the query router.
//!
//! Usage:
//!   maf-router                  interactive session
//!   maf-router --query "<text>" route one query and exit

use std::io::Write;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use maf_router::adapters::{
    AzureOpenAIChatModel, HttpBackendClient, TokioSleeper, WebSocketActivityStream,
};
use maf_router::application::{BackendRegistry, ChatOracle, Router, Transports};
use maf_router::config::AppConfig;
use maf_router::domain::RoutingError;
use maf_router::ports::ChatModel;

const RULE_WIDTH: usize = 60;

#[derive(Debug, Parser)]
#[command(name = "maf-router")]
#[command(version)]
#[command(about = "Routes queries to conversational backends", long_about = None)]
struct Cli {
    /// Route a single query and exit instead of starting a session
    #[arg(short, long)]
    query: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    config.validate()?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.app.log_level.clone().into());
    if config.app.log_json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let router = build_router(&config)?;

    match cli.query {
        Some(query) => {
            println!("User: {}", query);
            run_turn(&router, &query).await;
            Ok(())
        }
        None => interactive(&router).await,
    }
}

fn build_router(config: &AppConfig) -> Result<Router, Box<dyn std::error::Error>> {
    let model: Arc<dyn ChatModel> =
        Arc::new(AzureOpenAIChatModel::new(config.chat.to_adapter_config())?);
    let provider = model.provider_info();

    let settings = config.acquisition.to_settings();
    let http = Arc::new(HttpBackendClient::new(settings.direct_timeout)?);
    let transports = Transports {
        answers: http.clone(),
        direct_line: http,
        streams: Arc::new(WebSocketActivityStream::new()),
        sleeper: Arc::new(TokioSleeper),
    };

    let registry = BackendRegistry::build(
        config.backend_descriptors()?,
        transports,
        settings,
        Some(Arc::clone(&model)),
    );
    let oracle = ChatOracle::new(model, config.orchestrator.instruction.clone());
    info!(
        provider = %provider.name,
        model = %provider.model,
        backends = registry.len(),
        "router ready"
    );

    Ok(Router::new(Arc::new(oracle), registry))
}

async fn interactive(router: &Router) -> Result<(), Box<dyn std::error::Error>> {
    print_banner(router);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        println!("\n{}", "-".repeat(RULE_WIDTH));
        print!("You: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!("\nExiting... Goodbye!");
            return Ok(());
        };
        let input = line.trim();

        if input.is_empty() {
            continue;
        }
        match input.to_lowercase().as_str() {
            "quit" | "exit" | "q" => {
                println!("\nExiting... Goodbye!");
                return Ok(());
            }
            "clear" => {
                print!("\x1B[2J\x1B[1;1H");
                continue;
            }
            _ => run_turn(router, input).await,
        }
    }
}

fn print_banner(router: &Router) {
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("ORCHESTRATOR INTERACTIVE CLI");
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("\nAvailable agents:");
    for agent in router.registry().iter() {
        match agent.backend().description() {
            Some(description) => println!("  - {}: {}", agent.key(), description),
            None => println!("  - {}", agent.key()),
        }
    }
    println!("\nCommands:");
    println!("  'quit' or 'exit' - Exit the CLI");
    println!("  'clear' - Clear screen");
    println!("{}", "=".repeat(RULE_WIDTH));
}

async fn run_turn(router: &Router, input: &str) {
    let result = router
        .route(input, |chunk| {
            print!("{}", chunk);
            let _ = std::io::stdout().flush();
        })
        .await;

    match result {
        Ok(outcome) => println!("\n\n[{}]", outcome.label),
        Err(err) => report(&err),
    }
}

fn report(err: &RoutingError) {
    println!("\n[ERROR] {}", err);
    println!("{}", err.to_record());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn query(args: &[&str]) -> Option<String> {
        Cli::try_parse_from(args).unwrap().query
    }

    #[test]
    fn query_flag_forms() {
        assert_eq!(query(&["maf-router", "--query", "halo"]), Some("halo".into()));
        assert_eq!(query(&["maf-router", "--query=apa kabar"]), Some("apa kabar".into()));
        assert_eq!(query(&["maf-router", "-q", "x"]), Some("x".into()));
        assert_eq!(query(&["maf-router"]), None);
    }

    #[test]
    fn rejects_missing_value_and_unknown_flags() {
        assert!(Cli::try_parse_from(["maf-router", "--query"]).is_err());

        let err = Cli::try_parse_from(["maf-router", "--verbose"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
