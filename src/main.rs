use clap::Parser;
use console::style;
use ssh_manager::errors::exit_codes;
use ssh_manager::{App, AppConfig, AppError, Cli, CommandHandler};
use tracing_subscriber::EnvFilter;

/// Initialize the logging system; RUST_LOG wins over -v
fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "ssh_manager=info,warn",
        2 => "ssh_manager=debug,info",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(path) = &cli.profiles {
        config = config.with_profiles_file(path);
    }
    tracing::debug!(profiles = %config.profiles_file.display(), "using profiles file");

    let app = App::bootstrap(config).await?;
    let handler = CommandHandler::new(
        app.profile_service,
        app.connection_service,
        app.backup_service,
        app.config,
    );
    handler.handle_command(cli.command).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }
    init_logging(cli.verbose);

    let code = match run(cli).await {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("✗").red().bold(), e);
            e.exit_code()
        }
    };

    std::process::exit(code);
}
