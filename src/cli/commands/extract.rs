//! Nameplate OCR command.

use std::path::Path;
use std::time::Instant;

use console::style;

use crate::config::Settings;
use crate::extract::extract_fields;
use crate::http_client::HttpClient;
use crate::ocr::{AzureReadBackend, OcrBackend};

/// OCR an image file and print the extracted model and TM number.
pub async fn cmd_extract(settings: &Settings, image: &Path, json: bool) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(image)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", image.display(), e))?;
    if bytes.is_empty() {
        anyhow::bail!("{} is empty", image.display());
    }

    let http = HttpClient::new(settings.search.user_agent.as_deref())?;
    let ocr = AzureReadBackend::from_settings(http.inner().clone(), settings);
    let started = Instant::now();
    let text = ocr.recognize(bytes).await?;
    let fields = extract_fields(&text.text);
    let elapsed = started.elapsed().as_secs_f64();

    if json {
        let output = serde_json::json!({
            "found": fields.found(),
            "model": fields.model,
            "tm": fields.tm,
            "ocr_text": text.text,
            "engine": text.engine,
            "processing_time": (elapsed * 100.0).round() / 100.0,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("\n{}", style("OCR text").bold());
    println!("{}", "-".repeat(60));
    for line in text.text.lines() {
        println!("  {}", style(line).dim());
    }
    println!("{}", "-".repeat(60));

    let show = |label: &str, value: &Option<String>| match value {
        Some(v) => println!("{} {:<6} {}", style("✓").green(), label, style(v).bold()),
        None => println!("{} {:<6} {}", style("✗").red(), label, style("not found").dim()),
    };
    show("Model", &fields.model);
    show("TM", &fields.tm);
    println!(
        "\n{} via {} in {:.2}s",
        style("→").cyan(),
        text.engine,
        elapsed
    );

    if fields.found() {
        let mut hint = String::from("tmscout search");
        if let Some(tm) = &fields.tm {
            hint.push_str(&format!(" --tm {}", tm));
        }
        if let Some(model) = &fields.model {
            hint.push_str(&format!(" --model {}", model));
        }
        println!("  Next: {}", style(hint).cyan());
    }

    Ok(())
}
