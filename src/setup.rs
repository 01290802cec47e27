use crate::config::{
    Config,
    Severity,
};
use anyhow::{
    ensure,
    Context,
};
use camino::Utf8Path;

/// Load the config at `path` and check it, falling back to defaults if there is no file.
///
/// Loggers are not set up yet when this runs, so problems are printed to the stderr.
pub(crate) fn load_config(path: &Utf8Path) -> anyhow::Result<Config> {
    let config = if path.exists() {
        eprintln!("loading config from `{path}`...");
        Config::load_from_path(path).with_context(|| format!("failed to load `{path}`"))?
    } else {
        eprintln!("no config at `{path}`, using defaults");
        Config::default()
    };

    let (errors, warnings): (Vec<_>, Vec<_>) = config
        .validate()
        .into_iter()
        .partition(|message| message.severity() == Severity::Error);

    for message in warnings.iter() {
        eprintln!("config warning: {}", message.error());
    }
    for message in errors.iter() {
        eprintln!("config error: {}", message.error());
    }
    ensure!(
        errors.is_empty(),
        "`{path}` has {} invalid settings",
        errors.len()
    );

    Ok(config)
}
