use clap::{Parser, Subcommand};
use std::process::ExitCode;

use health_aggregator::health::{AggregateView, Condition, PENDING_KEY};

#[derive(Parser)]
#[command(name = "health-cli")]
#[command(about = "Query a running health aggregator", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Aggregate endpoint path
    #[arg(short, long, default_value = "/health")]
    path: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full check pass and print the aggregate
    Check {
        /// Print one line per probe instead of raw JSON
        #[arg(long)]
        summary: bool,
    },
    /// Hit the liveness endpoint
    Live,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();
    let base = endpoint(&cli.url, &cli.path);

    match cli.command {
        Commands::Check { summary } => {
            let res = client.get(&base).send().await?;
            let status = res.status();
            let body: serde_json::Value = res.json().await?;

            if summary {
                let view: AggregateView = serde_json::from_value(body)?;
                print_summary(&view);
            } else {
                println!("{}", serde_json::to_string_pretty(&body)?);
            }

            Ok(if status.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Live => {
            let res = client.get(format!("{}/live", base)).send().await?;
            let status = res.status();
            println!("{} {}", status.as_u16(), res.text().await?);
            Ok(if status.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

/// Join server URL and aggregate path without doubled or trailing slashes.
fn endpoint(url: &str, path: &str) -> String {
    let path = path.trim_matches('/');
    if path.is_empty() {
        url.trim_end_matches('/').to_string()
    } else {
        format!("{}/{}", url.trim_end_matches('/'), path)
    }
}

fn print_summary(view: &AggregateView) {
    println!("status: {} (version {})", view.status, view.version);
    let mut names: Vec<&String> = view.checks.keys().collect();
    names.sort();
    for name in names {
        let check = &view.checks[name];
        let marker = match check.status {
            Condition::Healthy => "ok  ",
            Condition::Degraded => "warn",
            Condition::Unhealthy => "FAIL",
        };
        println!(
            "  [{}] {:<20} {:>8.1} ms  {}",
            marker, name, check.duration_ms, check.message
        );
    }
    if let Some(pending) = view.metadata.get(PENDING_KEY) {
        println!("  timed out waiting for: {}", pending);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_cleanly() {
        assert_eq!(endpoint("http://h:8080", "/health"), "http://h:8080/health");
        assert_eq!(endpoint("http://h:8080/", "/health/"), "http://h:8080/health");
        assert_eq!(endpoint("http://h:8080", "health"), "http://h:8080/health");
        assert_eq!(endpoint("http://h:8080", "/"), "http://h:8080");
        assert_eq!(format!("{}/live", endpoint("http://h", "/health/")), "http://h/health/live");
    }
}
