use std::sync::Arc;

mod ai;
mod calendar;
mod config;
mod error;
mod models;
mod remote;
mod scratch;
mod session;
mod store;
mod summary;
#[cfg(test)]
mod testutil;

use ai::ChatCompletionClient;
use calendar::EventDisplay;
use config::Config;
use error::{AppError, Result};
use models::UserId;
use remote::{RestBlobs, RestRows};
use scratch::FileScratch;
use session::Session;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    let user = match args.iter().position(|a| a == "--user") {
        Some(i) if i + 1 < args.len() => UserId::from(args[i + 1].as_str()),
        _ => {
            eprintln!("Usage: daybook --user <id> [--narrow] [--summarize <month> <year>] [--search <query> [--desc]]");
            return Err(AppError::Config("missing --user argument".to_string()));
        }
    };
    let narrow = args.iter().any(|a| a == "--narrow");

    // Load configuration
    let config = Config::load()?;

    let rows = Arc::new(RestRows::new(
        config.service_url.clone(),
        config.service_key.clone(),
    ));
    let blobs = Arc::new(RestBlobs::new(
        config.service_url.clone(),
        config.service_key.clone(),
        config.attachments_bucket.clone(),
    ));
    let wants_summary = args.iter().any(|a| a == "--summarize");
    let completion = Arc::new(ChatCompletionClient::new(completion_api_key(
        &config,
        wants_summary,
    )?));
    let scratch = Arc::new(FileScratch::new(std::path::PathBuf::from(
        &config.scratch_path,
    )));

    let session = Session::sign_in(user, rows, blobs, completion, scratch, narrow).await?;

    // Check for --summarize flag (print the month's summary and exit)
    if let Some(i) = args.iter().position(|a| a == "--summarize") {
        if i + 2 >= args.len() {
            return Err(AppError::Config(
                "--summarize needs a month and a year".to_string(),
            ));
        }
        let month: u32 = args[i + 1]
            .parse()
            .map_err(|_| AppError::Config(format!("bad month: {}", args[i + 1])))?;
        let year: i32 = args[i + 2]
            .parse()
            .map_err(|_| AppError::Config(format!("bad year: {}", args[i + 2])))?;

        let outcome = session.get_or_generate_summary(month, year).await?;
        println!("{}\n", outcome.parsed.narrative);
        println!("Highlights:");
        for highlight in &outcome.parsed.highlights {
            println!("  - {}", highlight);
        }
        if let Some(avg) = outcome.summary.average_rating {
            println!("\nAverage rating: {:.2}", avg);
        }
        session.sign_out();
        return Ok(());
    }

    // Check for --search flag (print matching entries and exit)
    if let Some(i) = args.iter().position(|a| a == "--search") {
        if i + 1 >= args.len() {
            return Err(AppError::Config("--search needs a query".to_string()));
        }
        let ascending = !args.iter().any(|a| a == "--desc");
        for entry in session.search(&args[i + 1], ascending) {
            println!("{}  [{}]  {}", entry.date, entry.rating, entry.text);
        }
        session.sign_out();
        return Ok(());
    }

    // Default: print the projected calendar
    for event in session.calendar_events() {
        let marker = match event.display {
            EventDisplay::Foreground => "*",
            EventDisplay::Background => " ",
        };
        let star = if event.starred { "★" } else { " " };
        println!(
            "{} {}{} {}  {}",
            event.date,
            marker,
            star,
            event.color,
            event.title.as_deref().unwrap_or(""),
        );
    }
    session.sign_out();

    Ok(())
}

/// The completion key is only required when a summary is actually requested;
/// every other command runs without one.
fn completion_api_key(config: &Config, wants_summary: bool) -> Result<String> {
    match &config.openai_api_key {
        Some(key) => Ok(key.clone()),
        None if wants_summary => Err(AppError::Config(
            "openai_api_key must be set to generate summaries".to_string(),
        )),
        None => Ok(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(key: Option<&str>) -> Config {
        Config {
            openai_api_key: key.map(String::from),
            ..Config::default()
        }
    }

    #[test]
    fn missing_completion_key_fails_only_when_summarizing() {
        let err = completion_api_key(&config(None), true).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        assert_eq!(completion_api_key(&config(None), false).unwrap(), "");
        assert_eq!(
            completion_api_key(&config(Some("sk-test")), true).unwrap(),
            "sk-test"
        );
    }
}
