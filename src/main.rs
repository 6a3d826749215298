use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use goalpost::{AppConfig, Color, logging};

/// A soccer goal and a ball you can spin, shrink and view in wireframe.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Window title
    #[arg(long, default_value = "Goalpost")]
    title: String,

    /// Window width in logical pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Window height in logical pixels
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Background color as #rrggbb
    #[arg(long, value_parser = parse_color)]
    background: Option<Color>,

    /// Image file to show on the flag
    #[arg(long)]
    flag: Option<PathBuf>,

    /// Show the axes helper, optionally with a custom length
    #[arg(long, num_args = 0..=1, default_missing_value = "100")]
    axes: Option<f32>,
}

fn parse_color(s: &str) -> Result<Color, String> {
    Color::from_hex(s).ok_or_else(|| format!("expected #rrggbb, got {s:?}"))
}

impl From<Cli> for AppConfig {
    fn from(cli: Cli) -> Self {
        let mut config = AppConfig::new()
            .title(cli.title)
            .size(cli.width, cli.height);
        if let Some(color) = cli.background {
            config = config.background(color);
        }
        if let Some(path) = cli.flag {
            config = config.flag_texture(path);
        }
        if let Some(length) = cli.axes {
            config = config.axes(length);
        }
        config
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init();

    match goalpost::run(cli.into()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "goalpost exited with an error");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_match_config_defaults() {
        let config: AppConfig = Cli::parse_from(["goalpost"]).into();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn bare_axes_flag_uses_default_length() {
        let config: AppConfig = Cli::parse_from(["goalpost", "--axes"]).into();
        assert_eq!(config.axes, Some(AppConfig::DEFAULT_AXES_LENGTH));

        let config: AppConfig = Cli::parse_from(["goalpost", "--axes", "40"]).into();
        assert_eq!(config.axes, Some(40.0));
    }

    #[test]
    fn background_and_flag_are_parsed() {
        let cli = Cli::parse_from([
            "goalpost",
            "--background",
            "#000000",
            "--flag",
            "flags/home.png",
        ]);
        let config: AppConfig = cli.into();
        assert_eq!(config.background, Color::BLACK);
        assert_eq!(config.flag_texture, Some(PathBuf::from("flags/home.png")));
    }

    #[test]
    fn bad_color_is_rejected() {
        assert!(Cli::try_parse_from(["goalpost", "--background", "green"]).is_err());
    }
}
