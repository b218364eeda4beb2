//! ci-action - Run CI build steps with classified, real-time tool output.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ci_action::actions::{Action, ActionContext};
use ci_action::config::ConfigLoader;
use ci_action::log::{stdout_sink, LogSink, SinkKind};
use ci_action::run::Severity;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SinkArg {
    Auto,
    Console,
    Teamcity,
}

impl From<SinkArg> for SinkKind {
    fn from(arg: SinkArg) -> Self {
        match arg {
            SinkArg::Auto => SinkKind::Auto,
            SinkArg::Console => SinkKind::Console,
            SinkArg::Teamcity => SinkKind::TeamCity,
        }
    }
}

#[derive(Parser)]
#[command(name = "ci-action", about = "CI Action Selector", version)]
struct Cli {
    /// The CI action to perform.
    #[arg(value_enum)]
    action: Action,

    /// The preset to use.
    preset: String,

    /// Project root containing the CMake presets.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Config file (defaults to <root>/.ci-action.toml, then the user config).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output renderer (auto picks TeamCity when running on an agent).
    #[arg(long, value_enum)]
    sink: Option<SinkArg>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let root = std::fs::canonicalize(&cli.root).unwrap_or(cli.root);
    let loader = match cli.config {
        Some(path) => ConfigLoader::with_path(path),
        None => ConfigLoader::new(&root),
    };
    let mut config = match loader.load() {
        Ok(config) => config,
        Err(err) => {
            stdout_sink(SinkKind::Auto, Severity::Info).error(&err.to_string());
            std::process::exit(1);
        }
    };
    if let Some(sink) = cli.sink {
        config.sink = sink.into();
    }
    if cli.verbose > 0 {
        config.min_severity = Severity::Debug;
    }

    let sink = stdout_sink(config.sink, config.min_severity);
    let action = cli.action;
    tracing::info!(
        action = %action,
        preset = %cli.preset,
        root = %root.display(),
        "Starting CI action"
    );

    let ctx = ActionContext::new(root, config, sink.clone());
    let result = action.run(&ctx, &cli.preset).await;
    if result == 0 {
        sink.info(&format!("Action '{action}' completed with result: {result}"));
    } else {
        sink.error(&format!("Action '{action}' failed with exit code: {result}"));
    }
    std::process::exit(result);
}
