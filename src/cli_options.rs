use camino::Utf8PathBuf;

/// CLI Options
#[derive(Debug, argh::FromArgs)]
#[argh(description = "download images from a deviantart gallery or deviation")]
pub struct CliOptions {
    #[argh(
        option,
        description = "the path to the config",
        default = "Utf8PathBuf::from(\"./config.toml\")"
    )]
    pub config: Utf8PathBuf,

    #[argh(
        positional,
        description = "a gallery or deviation url, prompted for if missing"
    )]
    pub url: Option<String>,
}
