//! deskshell - a theme-driven replacement desktop shell
//!
//! Runs the live configuration core: loads the app config and the selected
//! theme, builds the taskbar, desktop and power menu containers, and
//! hot-reloads them as their files change on disk.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use deskshell::cli::{
    ConfigSubcommand, ThemesSubcommand, WidgetsSubcommand, display_version, handle_config_command,
    handle_themes_command, handle_widgets_command, init_logging,
};
use deskshell::config::paths;
use deskshell::config::{FileWatcher, NotifyWatcher, NullWatcher};
use deskshell::{ScreenSize, Shell, ShellPaths, ThemeLayout, WidgetRegistry};
use std::path::PathBuf;
use tokio::sync::mpsc::UnboundedReceiver;

/// deskshell - a theme-driven replacement desktop shell
#[derive(Parser, Debug)]
#[command(name = "deskshell")]
#[command(about = "A theme-driven desktop shell with live-reloading configuration", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    /// Installation base directory
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,

    /// Built-in themes live in `themes/` instead of `app/themes/`
    #[arg(long, global = true)]
    simple_layout: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Run the shell (default)
    Run {
        /// Screen size to lay out on
        #[arg(long, default_value = "1920x1080")]
        screen: ScreenSize,

        /// Do not watch config files for changes
        #[arg(long)]
        no_watch: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
    /// Theme management
    Themes {
        #[command(subcommand)]
        subcommand: ThemesSubcommand,
    },
    /// Widget inspection
    Widgets {
        #[command(subcommand)]
        subcommand: WidgetsSubcommand,
    },
    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let command = args.command.unwrap_or(Command::Run {
        screen: ScreenSize::default(),
        no_watch: false,
    });
    if let Command::Version = command {
        display_version();
        return Ok(());
    }

    let log_file = init_logging(args.debug)?;
    if let Some(ref log_path) = log_file {
        eprintln!(
            "Debug logging enabled. Logs written to: {}",
            log_path.display()
        );
    }

    let base = paths::base_dir(args.base_dir.as_deref())
        .context("Cannot locate the deskshell installation directory")?;
    let layout = if args.simple_layout {
        ThemeLayout::Simple
    } else {
        ThemeLayout::Standard
    };
    let shell_paths = ShellPaths::new(base, layout);
    tracing::debug!(base = %shell_paths.base().display(), ?layout, "Resolved paths");

    match command {
        Command::Run { screen, no_watch } => run(shell_paths, screen, !no_watch).await,
        Command::Config { subcommand } => handle_config_command(subcommand, &shell_paths),
        Command::Themes { subcommand } => handle_themes_command(subcommand, &shell_paths),
        Command::Widgets { subcommand } => {
            handle_widgets_command(subcommand, &shell_paths, &WidgetRegistry::builtin())
        }
        Command::Version => Ok(()),
    }
}

/// Owner loop: file notifications are marshaled here before touching any store
async fn run(paths: ShellPaths, screen: ScreenSize, watch: bool) -> Result<()> {
    let (watcher, mut changes): (Box<dyn FileWatcher>, Option<UnboundedReceiver<PathBuf>>) =
        if watch {
            let (watcher, rx) = NotifyWatcher::new().context("Failed to start file watcher")?;
            (Box::new(watcher), Some(rx))
        } else {
            (Box::new(NullWatcher::default()), None)
        };

    let mut shell = Shell::new(paths, WidgetRegistry::builtin(), screen, watcher);
    shell.initialize();
    eprintln!(
        "deskshell running on {} with theme '{}'. Press Ctrl-C to exit.",
        screen,
        shell.config().theme().name()
    );

    loop {
        tokio::select! {
            Some(path) = next_change(&mut changes) => {
                shell.on_file_changed(&path);
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                tracing::info!("Interrupted, shutting down");
                break;
            }
        }
    }

    shell.shutdown();
    Ok(())
}

async fn next_change(changes: &mut Option<UnboundedReceiver<PathBuf>>) -> Option<PathBuf> {
    match changes {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
