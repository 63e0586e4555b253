//! `brandlink-search` -- search the brand portal from a terminal.
//!
//! Runs the same paged search as the field's search dialog and prints
//! the loaded results as JSON. With `--select <id>` it closes the dialog
//! on that result and prints the field value the selection would store.
//!
//! ```text
//! brandlink-search <keyword> [--pages <n>] [--select <id>]
//! ```
//!
//! # Environment variables
//!
//! | Variable              | Required | Default | Description                         |
//! |-----------------------|----------|---------|-------------------------------------|
//! | `BYNDER_TOKEN`        | yes      | --      | Permanent API token                 |
//! | `BYNDER_DOMAIN`       | yes      | --      | Portal base URL, e.g. `https://brand.example.com` |
//! | `BYNDER_PAGE_SIZE`    | no       | `20`    | Results per page                    |
//! | `BYNDER_TIMEOUT_SECS` | no       | `10`    | Per-request timeout                 |
//! | `LOG_FORMAT`          | no       | `text`  | `json` for structured log lines     |

use std::sync::Arc;

use brandlink_bynder::{BynderApi, SearchDialog, SearchStatus};
use brandlink_core::config::BynderConfig;
use brandlink_core::notice::MSG_NO_EXTERNAL_SELECTION;
use brandlink_core::{field_value, SearchResult, UnifiedAsset};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: brandlink-search <keyword> [--pages <n>] [--select <id>]";

/// Parsed command line.
#[derive(Debug, PartialEq, Eq)]
struct Args {
    keyword: String,
    pages: u32,
    select: Option<String>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args, String> {
    let mut keyword = None;
    let mut pages = 1;
    let mut select = None;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--pages" => {
                let raw = args.next().ok_or("--pages needs a value")?;
                pages = raw
                    .parse()
                    .ok()
                    .filter(|n| *n >= 1)
                    .ok_or_else(|| format!("--pages must be a positive integer, got '{raw}'"))?;
            }
            "--select" => {
                select = Some(args.next().ok_or("--select needs a media id")?);
            }
            flag if flag.starts_with("--") => return Err(format!("unknown option '{flag}'")),
            _ if keyword.is_none() => keyword = Some(arg),
            _ => return Err(format!("unexpected argument '{arg}'")),
        }
    }

    Ok(Args {
        keyword: keyword.unwrap_or_default(),
        pages,
        select,
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Listing<'a> {
    keyword: &'a str,
    has_more: bool,
    results: &'a [SearchResult],
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "brandlink_cli=info,brandlink_bynder=info,brandlink_field=info".into()
    });
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    // Logs go to stderr so stdout stays valid JSON.
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(out) => println!("{out}"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize output");
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args = parse_args(std::env::args().skip(1)).unwrap_or_else(|e| {
        eprintln!("{e}\n{USAGE}");
        std::process::exit(2);
    });

    init_tracing();

    let config = BynderConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid brand portal configuration");
        std::process::exit(1);
    });

    tracing::info!(
        domain = %config.domain,
        page_size = config.page_size,
        pages = args.pages,
        "Starting brandlink-search",
    );

    let api = BynderApi::new(&config).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to build HTTP client");
        std::process::exit(1);
    });

    let (mut dialog, closed) = SearchDialog::open(Arc::new(api), config.page_size);

    let mut status = dialog.search(&args.keyword).await;
    let mut loaded = 1;
    while loaded < args.pages && matches!(status, SearchStatus::Loaded { has_more: true, .. }) {
        status = dialog.load_more().await;
        loaded += 1;
    }

    if let SearchStatus::Failed(failure) = status {
        tracing::error!(?failure, "{}", failure.message());
        std::process::exit(1);
    }
    if dialog.shows_no_results() {
        tracing::warn!(keyword = %args.keyword, "No results found");
    }

    let Some(media_id) = args.select else {
        print_json(&Listing {
            keyword: dialog.keyword(),
            has_more: dialog.has_more(),
            results: dialog.results(),
        });
        dialog.cancel();
        return;
    };

    if dialog.select(&media_id).is_none() {
        tracing::error!(media_id = %media_id, "No loaded result has this id");
        std::process::exit(1);
    }

    let Some(selected) = closed.selection().await else {
        tracing::error!("Search dialog closed without a selection");
        std::process::exit(1);
    };
    if selected.source_url.trim().is_empty() {
        tracing::error!(media_id = %selected.id, "{MSG_NO_EXTERNAL_SELECTION}");
        std::process::exit(1);
    }

    print_json(&field_value::encode(&UnifiedAsset::from_search_result(&selected)));
}
