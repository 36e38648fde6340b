use anyhow::Result;
use clap::{ArgAction, Parser};
use softserve::config::InstallMode;
use tracing_subscriber::EnvFilter;

mod commands;

const ISSUES_URL: &str = "https://github.com/wking-io/softserve-cli/issues/new";

#[derive(Parser)]
#[command(
    name = "softserve",
    version = env!("CARGO_PKG_VERSION"),
    about = "Create a new WordPress theme",
    disable_help_flag = true,
    after_help = format!(
        "Only <theme-name> is required.\n\n\
         If you have any problems, do not hesitate to file an issue:\n  {ISSUES_URL}"
    )
)]
struct Cli {
    /// Name of the theme directory and package
    #[arg(value_name = "theme-name")]
    theme_name: Option<String>,

    /// Print additional logs
    #[arg(long)]
    verbose: bool,

    /// Print environment debug info
    #[arg(long)]
    info: bool,

    /// Output --info as JSON
    #[arg(long, requires = "info")]
    json: bool,

    /// Install with npm even when yarn is available
    #[arg(long)]
    use_npm: bool,

    /// Run from a WordPress root; the theme goes into wp-content/themes
    #[arg(short, long)]
    root: bool,

    /// Run from inside a themes directory
    #[arg(short = 'h', long, conflicts_with = "root")]
    here: bool,

    /// Pin the softserve-scripts version
    #[arg(long, value_name = "semver")]
    scripts_version: Option<String>,

    /// Skip creating a git repository
    #[arg(long)]
    no_git: bool,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}

impl Cli {
    fn mode(&self) -> InstallMode {
        if self.root {
            InstallMode::Root
        } else if self.here {
            InstallMode::Here
        } else {
            InstallMode::Default
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "softserve=debug"
    } else {
        "softserve=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.info {
        return commands::info::execute(cli.json);
    }

    let mode = cli.mode();
    let Some(name) = cli.theme_name else {
        eprintln!("Please specify the theme name:");
        eprintln!("  softserve <theme-name>");
        eprintln!();
        eprintln!("For example:");
        eprintln!("  softserve my-wp-theme");
        eprintln!();
        eprintln!("Run softserve --help to see all options.");
        std::process::exit(1);
    };

    let exit_code = commands::theme::execute(commands::theme::ThemeOptions {
        name,
        mode,
        verbose: cli.verbose,
        use_npm: cli.use_npm,
        scripts_version: cli.scripts_version,
        no_git: cli.no_git,
    })?;
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}
