//! One-shot manual search.

use console::style;
use tokio::sync::mpsc;

use crate::config::Settings;
use crate::search::{SearchEvent, SearchProgress, SearchQuery};
use crate::server::AppState;

use super::super::helpers::print_result;

/// Run the search orchestrator once and print what it found.
pub async fn cmd_search(
    settings: &Settings,
    tm: Option<&str>,
    model: Option<&str>,
    limit: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let query = SearchQuery::new(tm, model);
    if query.is_empty() {
        anyhow::bail!("Provide --tm and/or --model");
    }

    let mut settings = settings.clone();
    if let Some(limit) = limit {
        settings.search.max_results = limit.max(1);
    }
    let searcher = AppState::from_settings(&settings)?.searcher;

    let results = if json {
        searcher.search(&query, &SearchProgress::silent()).await?
    } else {
        println!(
            "{} {} ({})",
            style("→").cyan(),
            style(query.label().unwrap_or_default()).bold(),
            query.strategy()
        );

        let (tx, mut rx) = mpsc::channel(32);
        let printer = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if let SearchEvent::Status(message) = event {
                    println!("  {}", style(message).dim());
                }
            }
        });

        let progress = SearchProgress::channel(tx);
        let results = searcher.search(&query, &progress).await;
        drop(progress);
        let _ = printer.await;
        results?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    println!();
    println!("{}", style(format!("{} result(s)", results.len())).bold());
    println!("{}", "-".repeat(60));
    for (i, result) in results.iter().enumerate() {
        print_result(i + 1, result);
    }

    Ok(())
}
