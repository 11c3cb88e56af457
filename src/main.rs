use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use clientfirst_site::contact::Enquiry;
use clientfirst_site::{Dictionary, Document, FileStore, Locale, Preferences, Site, SiteConfig};

#[derive(Parser)]
#[command(name = "clientfirst-site")]
#[command(version)]
#[command(about = "Run the Client-First Digital site's interactive layer over page snapshots")]
struct Cli {
    /// Load dictionaries from this directory instead of the built-in ones
    #[arg(long, global = true, value_name = "DIR")]
    dictionary: Option<PathBuf>,

    /// Keep preferences in memory instead of the preference file
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that every locale carries the same message keys
    Check,

    /// Print one message
    Lookup {
        /// Locale tag, e.g. `en` or `pt-PT`
        locale: String,
        key: String,
    },

    /// Load a page snapshot, run it and print the resulting HTML
    Render {
        #[arg(value_name = "PAGE")]
        page: PathBuf,

        /// Switch to this locale after load
        #[arg(short, long)]
        locale: Option<String>,

        /// Click the theme toggle once
        #[arg(long)]
        toggle_theme: bool,

        /// Let this many milliseconds of timers run before printing
        #[arg(short, long, default_value = "0")]
        advance: u64,
    },

    /// Compose the mailto link the contact form would open
    Mailto {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        service: String,
        #[arg(long, default_value = "")]
        message: String,
    },

    /// Run a page in real time, logging carousel and timer activity
    Preview {
        #[arg(value_name = "PAGE")]
        page: PathBuf,

        #[arg(short, long, default_value = "10")]
        seconds: u64,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_directive = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = SiteConfig::from_env().context("invalid site configuration")?;
    let dictionary = load_dictionary(cli.dictionary.as_deref())?;

    match cli.command {
        Commands::Check => {
            let report = dictionary.check_symmetry();
            for locale in dictionary.locales() {
                let count = dictionary.messages_for(locale).map_or(0, |m| m.len());
                println!("{locale}: {count} messages");
            }
            if !report.is_symmetric() {
                for missing in &report.missing {
                    println!("missing in {}: {}", missing.locale, missing.key);
                }
                bail!("{} keys are missing", report.missing.len());
            }
            println!("all locales carry the same keys");
        }
        Commands::Lookup { locale, key } => {
            let locale: Locale = locale.parse()?;
            let message = dictionary
                .get_message(locale, &key)
                .with_context(|| format!("no message '{key}' for {locale}"))?;
            println!("{message}");
        }
        Commands::Render {
            page,
            locale,
            toggle_theme,
            advance,
        } => {
            let mut site = load_site(&page, dictionary, &config, cli.ephemeral)?;
            if let Some(tag) = locale {
                let locale: Locale = tag.parse()?;
                site.set_locale(locale);
            }
            if toggle_theme {
                let toggle = site.theme_toggle().context("page has no theme toggle")?;
                site.click(toggle);
            }
            site.advance(Duration::from_millis(advance));
            print!("{}", site.document().to_html());
        }
        Commands::Mailto {
            name,
            email,
            service,
            message,
        } => {
            let enquiry = Enquiry {
                name,
                email,
                service,
                message,
            };
            println!("{}", enquiry.mailto_uri(&config.contact_recipient));
        }
        Commands::Preview { page, seconds } => {
            let mut site = load_site(&page, dictionary, &config, cli.ephemeral)?;
            for second in 1..=seconds {
                site.run_for(Duration::from_secs(1)).await;
                let slide = site.carousel().map(|carousel| carousel.current());
                info!(second, ?slide, location = %site.document().location(), "tick");
            }
            println!("{}", site.document().location());
        }
    }

    Ok(())
}

fn load_dictionary(dir: Option<&Path>) -> Result<Arc<Dictionary>> {
    match dir {
        Some(dir) => {
            let dictionary = Dictionary::from_dir(dir)
                .with_context(|| format!("failed to load dictionaries from {}", dir.display()))?;
            Ok(Arc::new(dictionary))
        }
        None => Ok(Dictionary::builtin()),
    }
}

fn load_site(page: &Path, dictionary: Arc<Dictionary>, config: &SiteConfig, ephemeral: bool) -> Result<Site> {
    let document = Document::from_file(page).with_context(|| format!("failed to load page {}", page.display()))?;
    let preferences = open_preferences(config, ephemeral);
    Ok(Site::load(document, dictionary, preferences, config.clone()))
}

/// A broken preference file must not stop the page from running.
fn open_preferences(config: &SiteConfig, ephemeral: bool) -> Preferences {
    let Some(path) = config.preferences_path.as_deref().filter(|_| !ephemeral) else {
        return Preferences::in_memory();
    };
    match FileStore::open(path) {
        Ok(store) => Preferences::new(store),
        Err(err) => {
            warn!(path = %path.display(), %err, "preference file unusable, keeping preferences in memory");
            Preferences::in_memory()
        }
    }
}
