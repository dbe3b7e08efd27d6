//! CEV CLI - Main entry point

use cev_cli::commands::{self, auth, datasets, report, upload, AppContext};
use cev_cli::{Cli, Commands, ConfigCommand};
use cev_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use clap::Parser;
use std::process;
use tracing::{debug, error};

#[tokio::main]
async fn main() {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Verbose mode logs debug output; otherwise only warnings reach stderr
    let log_config = LogConfig::builder()
        .level(if cli.verbose { LogLevel::Debug } else { LogLevel::Warn })
        .output(LogOutput::Console)
        .log_file_prefix("cev")
        .build();

    // LOG_* variables take precedence; a malformed one is ignored
    let log_config = log_config.clone().overlay_env().unwrap_or(log_config);

    // The CLI works without logging, so a failed init is only reported
    let _guard = match init_logging(&log_config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {}", e);
            None
        },
    };

    if let Err(e) = execute_command(&cli).await {
        error!(error = %e, source = ?std::error::Error::source(&e), "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> cev_cli::Result<()> {
    if let Commands::Config { command } = &cli.command {
        return match command {
            ConfigCommand::Get { key } => commands::config::get(key),
            ConfigCommand::Set { key, value } => commands::config::set(key, value),
            ConfigCommand::Show => commands::config::show(),
        };
    }

    let ctx = AppContext::new(cli.server_url.as_deref())?;
    debug!(server = %ctx.config.server_url, "Using server");

    match &cli.command {
        Commands::Login { username, password } => auth::login(&ctx, username.clone(), password.clone()).await,

        Commands::Register {
            username,
            email,
            first_name,
            last_name,
            password,
            password_confirm,
        } => {
            auth::register(
                &ctx,
                auth::RegisterArgs {
                    username: username.clone(),
                    email: email.clone(),
                    first_name: first_name.clone(),
                    last_name: last_name.clone(),
                    password: password.clone(),
                    password_confirm: password_confirm.clone(),
                },
            )
            .await
        },

        Commands::Logout => auth::logout(&ctx).await,

        Commands::Whoami { format } => auth::whoami(&ctx, format).await,

        Commands::List { format } => datasets::list(&ctx, format).await,

        Commands::Show { id, format } => datasets::show(&ctx, *id, format).await,

        Commands::Summary { id, format } => datasets::summary(&ctx, *id, format).await,

        Commands::Upload {
            file,
            name,
            dropped,
            no_open,
        } => {
            upload::run(
                &ctx,
                upload::UploadArgs {
                    file,
                    name: name.clone(),
                    dropped: *dropped,
                    no_open: *no_open,
                },
            )
            .await
        },

        Commands::Report { id, output_dir } => report::run(&ctx, *id, output_dir.clone()).await,

        Commands::Delete { id, yes } => datasets::delete(&ctx, *id, *yes).await,

        Commands::Config { .. } => Ok(()),
    }
}
