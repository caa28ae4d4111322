//! Web server command.

use console::style;

use crate::config::Settings;
use crate::server::{self, AppState};

/// Start the web server.
pub async fn cmd_serve(settings: &Settings, bind: Option<&str>) -> anyhow::Result<()> {
    let (host, port) = match bind {
        Some(bind) => parse_bind_address(bind, &settings.server.host, settings.server.port)?,
        None => (settings.server.host.clone(), settings.server.port),
    };

    let state = AppState::from_settings(settings)?;

    println!(
        "{} Starting tmscout at http://{}:{}",
        style("→").cyan(),
        host,
        port
    );
    println!(
        "  {} sites, {} model mappings",
        state.searcher.catalog().sites().len(),
        state.searcher.mappings().len()
    );
    if state.ocr.is_available() {
        println!("  {} Azure OCR configured", style("✓").green());
    } else {
        println!(
            "  {} Azure OCR not configured, /extract disabled (set AZURE_VISION_KEY and AZURE_VISION_ENDPOINT)",
            style("!").yellow()
        );
    }
    println!("  Press Ctrl+C to stop");

    server::serve(state, &host, port).await
}

/// Parse a bind address that can be:
/// - Just a port: "3030" -> default_host:3030
/// - Just a host: "127.0.0.1" -> 127.0.0.1:default_port
/// - Host and port: "127.0.0.1:3030"
fn parse_bind_address(
    bind: &str,
    default_host: &str,
    default_port: u16,
) -> anyhow::Result<(String, u16)> {
    let bind = bind.trim();
    if bind.is_empty() {
        anyhow::bail!("Empty bind address");
    }

    if let Ok(port) = bind.parse::<u16>() {
        return Ok((default_host.to_string(), port));
    }

    if let Some((host, port_str)) = bind.rsplit_once(':') {
        let port = port_str
            .parse::<u16>()
            .map_err(|_| anyhow::anyhow!("Invalid port in bind address: {}", bind))?;
        let host = if host.is_empty() { default_host } else { host };
        return Ok((host.to_string(), port));
    }

    Ok((bind.to_string(), default_port))
}
