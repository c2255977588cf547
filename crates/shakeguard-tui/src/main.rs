//! Shakeguard TUI entry point.

use std::{fs::File, path::PathBuf, sync::Mutex};

use clap::{Parser, ValueEnum};
use shakeguard_core::Platform;
use shakeguard_tui::{
    App, Runtime, ShakeSettings, SystemEnv, TerminalDriver, TerminalKeys, panic_hook, platform,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Platform the demo pretends to run on.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum PlatformArg {
    /// Browser-like: keyboard simulation
    Web,
    /// Native iOS shell
    Ios,
    /// Native Android shell
    Android,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Web => Self::Web,
            PlatformArg::Ios => Self::Ios,
            PlatformArg::Android => Self::Android,
        }
    }
}

/// Shake-to-logout terminal demo
#[derive(Parser, Debug)]
#[command(name = "shakeguard-tui")]
#[command(about = "Terminal demo of shake detection and shake-to-logout")]
#[command(version)]
struct Args {
    /// Platform reported to the shake capability
    #[arg(long, value_enum, default_value = "web")]
    platform: PlatformArg,

    /// Start without a logged-in user
    #[arg(long)]
    anonymous: bool,

    /// Keep detecting shakes while nobody is logged in
    #[arg(long)]
    detect_anonymous: bool,

    /// Log out on shake without asking first
    #[arg(long)]
    no_prompt: bool,

    /// Write logs to this file (the terminal belongs to the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
        let file = File::create(path)?;
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
            .with(filter)
            .init();
    }

    let platform = Platform::from(args.platform);
    let settings = ShakeSettings {
        enabled_for_unauthenticated: args.detect_anonymous,
        show_logout_prompt_on_shake: !args.no_prompt,
    };
    tracing::info!(?platform, ?settings, "shakeguard starting");

    let env = SystemEnv::new();
    let keys = TerminalKeys::new();
    let shake = platform::register(&env, platform, &keys);

    let driver = TerminalDriver::new(env, platform, shake.clone(), keys)?;
    panic_hook::route_to_tracing();
    let result = Runtime::new(driver, shake, App::new(settings, !args.anonymous)).run().await;
    panic_hook::restore();
    let app = result?;

    tracing::info!(shakes = app.shake_count(), "shakeguard stopped");
    Ok(())
}
