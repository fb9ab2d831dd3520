use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use docktop_client::{
    config::{lookup_color_scheme, ColorScheme, Config},
    log::{flush_logger, log_dir, setup_logger},
    metrics::{DockerClient, HostProbe},
    ui::{colors::Theme, run_dashboard, Dashboard},
    widgets::Sources,
};

/// Terminal dashboard for docker containers and host metrics.
#[derive(Debug, Parser)]
#[command(name = "docktop", version, about)]
struct Cli {
    /// Config file (defaults to <config_dir>/docktop/docktop.yaml)
    #[arg(short, long, env = "DOCKTOP_CONFIG")]
    config: Option<PathBuf>,

    /// Inline layout, e.g. "cpu\nvolumes network"
    #[arg(short, long, conflicts_with = "layout_file")]
    layout: Option<String>,

    /// File holding the layout
    #[arg(long)]
    layout_file: Option<PathBuf>,

    /// Color scheme name
    #[arg(long)]
    colorscheme: Option<String>,

    /// Redraw interval in milliseconds
    #[arg(short, long)]
    interval: Option<u64>,

    /// Graph columns per sample
    #[arg(short, long)]
    scale: Option<u16>,

    /// Log level used when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,

    /// Path to the docker binary
    #[arg(long)]
    docker: Option<String>,

    /// Print the normalized layout and exit
    #[arg(long)]
    print_layout: bool,
}

impl Cli {
    fn merge_into(self, mut config: Config) -> Config {
        if let Some(layout) = self.layout {
            config.layout = Some(layout);
            config.layout_file = None;
        }
        if let Some(path) = self.layout_file {
            config.layout_file = Some(path);
            config.layout = None;
        }
        if let Some(name) = self.colorscheme {
            config.colorscheme = name;
        }
        if let Some(ms) = self.interval {
            config.update_interval_ms = ms;
        }
        if let Some(scale) = self.scale {
            config.graph_horizontal_scale = scale;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if let Some(docker) = self.docker {
            config.docker_binary = docker;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let print_layout = cli.print_layout;

    let config = Config::load_or_default(cli.config.as_deref()).context("loading config")?;
    let config = cli.merge_into(config);
    let layout = config.load_layout().context("loading layout")?;

    if print_layout {
        print!("{layout}");
        return Ok(());
    }

    let dir = log_dir();
    setup_logger(&dir, &config.log_level)
        .with_context(|| format!("setting up logging in {}", dir.display()))?;
    info!(version = env!("CARGO_PKG_VERSION"), "docktop starting");

    let scheme = lookup_color_scheme(&config.colorscheme).unwrap_or_else(|e| {
        warn!(error = %e, "falling back to the default color scheme");
        ColorScheme::default()
    });
    let theme = Theme::from(&scheme);

    let dashboard = Dashboard::new(&layout, &config, theme);
    let sources = Sources {
        docker: DockerClient::new(config.docker_binary.clone()),
        host: HostProbe::new(),
    };

    let res = run_dashboard(dashboard, sources).await;
    info!("docktop stopped");
    flush_logger();
    res.context("running dashboard")
}
