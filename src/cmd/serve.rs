//! Dashboard server command: `folio serve`.

use anyhow::Result;

use folio::config::Config;
use folio::dashboard::server::{ServerConfig, start_server};

pub async fn cmd_serve(
    config: &Config,
    port: Option<u16>,
    host: Option<String>,
    dev: bool,
    open: bool,
) -> Result<()> {
    let server = ServerConfig {
        host: host.unwrap_or_else(|| config.host.clone()),
        port: port.unwrap_or(config.port),
        dev_mode: dev,
    };

    // The browser is opened after a short delay so the listener is bound first.
    if open {
        let url = format!("http://{}:{}", browser_host(&server.host), server.port);
        tokio::spawn(async move {
            tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;
            if let Err(e) = open::that(&url) {
                eprintln!("Failed to open browser: {}", e);
            }
        });
    }

    start_server(config, server).await
}

fn browser_host(host: &str) -> &str {
    match host {
        "0.0.0.0" | "::" => "localhost",
        other => other,
    }
}
