#![deny(
    unused_import_braces,
    unused_lifetimes,
    unreachable_pub,
    trivial_numeric_casts,
    missing_debug_implementations,
    missing_copy_implementations,
    deprecated_in_future,
    meta_variable_misuse,
    non_ascii_idents,
    rust_2018_compatibility,
    rust_2018_idioms,
    future_incompatible,
    nonstandard_style,
    clippy::all
)]
#![warn(variant_size_differences, let_underscore_drop)]

//! # DeviantArt Downloader

pub mod cli_options;
pub mod commands;
pub mod config;
pub mod cookies;
pub mod download;
pub mod logger;
pub mod report;
pub mod setup;
#[cfg(test)]
pub mod test_util;
pub mod util;

use crate::{
    cli_options::CliOptions,
    commands::Target,
    config::Config,
    download::Downloader,
    report::DownloadReport,
};
use anyhow::{
    bail,
    ensure,
    Context,
};
use deviantart::{
    Client,
    CookieStoreMutex,
};
use std::{
    io::Write,
    sync::Arc,
};
use tokio::runtime::Builder as RuntimeBuilder;
use tracing::{
    error,
    info,
};
use tracing_appender::non_blocking::WorkerGuard;
use url::Url;

/// Data from the setup function
struct SetupData {
    tokio_rt: tokio::runtime::Runtime,
    config: Config,
    url: String,
    worker_guard: WorkerGuard,
}

/// Ask for a url on the stdin.
fn prompt_url() -> anyhow::Result<String> {
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(b"Enter URL: ")
        .and_then(|_| stdout.flush())
        .context("failed to write prompt")?;

    let mut url = String::new();
    std::io::stdin()
        .read_line(&mut url)
        .context("failed to read url")?;

    Ok(url.trim().to_string())
}

/// Pre-main setup
fn setup(cli_options: CliOptions) -> anyhow::Result<SetupData> {
    eprintln!("starting tokio runtime...");
    let tokio_rt = RuntimeBuilder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;

    let config = setup::load_config(&cli_options.config).context("failed to load config")?;

    std::fs::create_dir_all(config.log_dir()).context("failed to create log dir")?;

    // Everything past here is assumed to need tokio
    let _enter_guard = tokio_rt.handle().enter();

    eprintln!("setting up logger...");
    let worker_guard = logger::setup(&config).context("failed to initialize logger")?;

    let url = match cli_options.url {
        Some(url) => url.trim().to_string(),
        None => prompt_url()?,
    };
    ensure!(!url.is_empty(), "No URL provided.");

    eprintln!();
    Ok(SetupData {
        tokio_rt,
        config,
        url,
        worker_guard,
    })
}

/// The main entry.
///
/// Sets up the program and calls `real_main`.
/// This also calls setup operations like loading config and setting up the tokio runtime,
/// logging errors to the stderr instead of the loggers, which are not initialized yet.
fn main() -> anyhow::Result<()> {
    // This line MUST run first.
    // It is needed to exit early if the options are invalid,
    // and this will NOT run destructors if it does so.
    let cli_options = argh::from_env();

    let setup_data = setup(cli_options)?;
    real_main(setup_data)?;
    Ok(())
}

/// The actual entry point
fn real_main(setup_data: SetupData) -> anyhow::Result<()> {
    let ret = setup_data
        .tokio_rt
        .block_on(async_main(setup_data.config, setup_data.url));

    if let Err(e) = ret.as_ref() {
        error!("{e:?}");
    }
    info!("shutting down...");
    drop(setup_data.tokio_rt);

    // Logging no longer reliable past this point
    drop(setup_data.worker_guard);

    ret
}

/// Returns `true` if an error came from the site logging the session out.
fn is_session_expired(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<deviantart::Error>()
        .map_or(false, |e| e.is_session_expired())
}

/// The async entry
async fn async_main(config: Config, url: String) -> anyhow::Result<()> {
    let cookies = cookies::load(config.cookie_file()).await?;
    ensure!(!cookies.is_empty(), "No cookies found. Please log in first.");

    let url = Url::parse(&url).with_context(|| format!("invalid url '{url}'"))?;
    let target = match Target::from_url(&url) {
        Some(target) => target,
        None => bail!("'{url}' is not a gallery or deviation url"),
    };

    let cookie_store = Arc::new(CookieStoreMutex::new(Default::default()));
    let client = Client::with_cookie_store(cookie_store, config.site_policy(), config.user_agent())
        .context("failed to build client")?;
    client
        .load_cookies(&cookies)
        .context("failed to load cookies")?;
    info!("loaded {} cookies", cookies.len());

    let downloader = Downloader::new(config.download_dir().as_std_path());
    let mut report = DownloadReport::default();
    let result = match target {
        Target::Gallery => commands::gallery::run(&client, &downloader, &url, &mut report).await,
        Target::Deviation => {
            commands::deviation::run(&client, &downloader, &url, &mut report).await
        }
    };

    // A logged out session would overwrite good cookies with dead ones.
    if result.as_ref().err().map_or(false, is_session_expired) {
        error!("the session was logged out, log in again and refresh the cookie file");
    } else if let Err(e) = cookies::save(config.cookie_file(), &client.cookies()).await {
        error!("{e:?}");
    }

    print!("{}", report.summary());

    result
}
