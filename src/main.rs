//! sasa-forms - replay page interactions against the form layer
//!
//! Loads a page description and an optional event script, binds the form
//! layer with the HTTP transport, and prints the resulting page state as
//! JSON.

use anyhow::{Context, Result};
use sasa_forms::state::{Alert, DropArea, Form, Preview};
use sasa_forms::{FormContext, FormsConfig, HttpTransport, Page, PageEvent};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

const USAGE: &str = "usage: sasa-forms <page.json> [script.json]";

/// Final page state printed on stdout
#[derive(Serialize)]
struct Report<'a> {
    location: &'a Url,
    alerts: &'a [Alert],
    forms: &'a [Form],
    previews: &'a BTreeMap<String, Option<Preview>>,
    drop_areas: &'a [DropArea],
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sasa_forms=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let mut args = std::env::args().skip(1);
    let Some(page_path) = args.next() else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };
    let script_path = args.next();

    let config = FormsConfig::load().context("failed to load configuration")?;
    let page: Page = read_json(Path::new(&page_path)).await?;
    let events: Vec<PageEvent> = match script_path {
        Some(path) => read_json(Path::new(&path)).await?,
        None => Vec::new(),
    };

    let transport = HttpTransport::new(config.request_timeout())?;
    let mut ctx = FormContext::bind(page, config, transport);

    if let Err(err) = run_script(&mut ctx, events).await {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }

    let page = ctx.page();
    let report = Report {
        location: &page.location,
        alerts: ctx.alerts().alerts(),
        forms: &page.forms,
        previews: &page.previews,
        drop_areas: &page.drop_areas,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

/// Replay every event, ticking after each, then wait out a pending redirect
async fn run_script(
    ctx: &mut FormContext<HttpTransport>,
    events: Vec<PageEvent>,
) -> Result<()> {
    for mut event in events {
        if let Some(files) = event.files_mut() {
            for file in files.iter_mut() {
                file.fill_metadata()
                    .await
                    .with_context(|| format!("failed to inspect {}", file.name))?;
            }
        }

        // Unknown references are logged by dispatch; keep replaying
        let _ = ctx.dispatch(event).await;
        ctx.tick(Instant::now());
    }

    while let Some(due) = ctx.page().pending_navigation().map(|n| n.due) {
        tokio::time::sleep_until(tokio::time::Instant::from_std(due)).await;
        ctx.tick(Instant::now());
    }
    Ok(())
}
