//! Shared helper functions for CLI commands.

use console::style;

use crate::search::SearchResult;

/// Truncate to at most `max` characters, marking the cut with an ellipsis.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Print one search result as an indented block.
pub fn print_result(rank: usize, result: &SearchResult) {
    let badge = if result.verified {
        style("✓ verified").green()
    } else {
        style("? unverified").yellow()
    };

    println!(
        "{:>2}. {} [{}%] {}",
        rank,
        style(truncate(&result.title, 70)).bold(),
        result.confidence,
        badge
    );
    if let Some(suffix) = &result.title_suffix {
        println!("    {}", style(suffix).yellow());
    }
    println!("    {}", style(&result.url).cyan());
    println!(
        "    {} · {}",
        result.site,
        style(result.display_description()).dim()
    );
}
