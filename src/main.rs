use clap::{Parser, Subcommand};
use partial_pages::{config, favicon, output, update};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "partial-pages")]
#[command(about = "Refresh shared partials in a static HTML site")]
#[command(long_about = "\
Refresh shared partials in a static HTML site

Partials live in the site's _partials/ directory, one per file. A file named
_footer.html defines the partial 'footer'; its root element is the first one
carrying a data-partial attribute.

  site/
  ├── _partials/
  │   ├── _head.html          # <head data-partial>...</head>
  │   └── _footer.html        # <footer data-partial>...</footer>
  ├── index.html              # <head data-partial=\"head\"></head>
  └── blog/index.html

Every element in a page with data-partial=\"<name>\" is replaced by a copy of
that partial. When the 'head' partial is inserted, og:title, og:url and
og:description are filled from the page's title, first <h1> and first <p>.

Run 'partial-pages gen-config' to generate a documented partial-pages.toml.")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Site root to update
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Write pages as serialized, without running the formatter
    #[arg(long)]
    no_format: bool,

    /// Config file (default: partial-pages.toml next to the executable)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print a stock partial-pages.toml with all options documented
    GenConfig,
    /// Print the light/dark favicon script for the configured icons
    FaviconScript,
}

fn setup_logging(verbosity: u8, quiet: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match (quiet, verbosity) {
        (true, _) => tracing::Level::WARN,
        (false, 0) => tracing::Level::INFO,
        (false, 1) => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_names(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::GenConfig) => {
            print!("{}", config::stock_config_toml());
        }
        Some(Command::FaviconScript) => {
            let loaded = config::load_config(cli.config.as_deref())?;
            print!("{}", favicon::script(&loaded.config.favicon));
        }
        None => {
            setup_logging(cli.verbose, cli.quiet);

            let loaded = config::load_config(cli.config.as_deref())?;
            match &loaded.source {
                Some(path) => info!("using config {}", path.display()),
                None => info!("using stock config"),
            }

            info!("updating pages in {}", cli.root.display());
            let formatter = update::formatter_for(&loaded, cli.no_format);
            let summary = update::run(&cli.root, &loaded, formatter.as_ref())?;
            output::print_summary(&summary, &cli.root);
        }
    }

    Ok(())
}
