//! Fitting Room CLI - browse the storefront and try garments on.
//!
//! # Usage
//!
//! ```bash
//! # Create an account and log in
//! fr signup -e jane@example.com
//! fr login -e jane@example.com
//!
//! # Set date of birth, gender and the face photo used for try-on
//! fr profile update --dob 05-03-1994 --gender female --picture https://cdn.example.com/me.jpg
//!
//! # Open a category; recommendations are tried on, Ctrl-C cancels
//! fr category handbags --save-dir ./tryon
//!
//! # One-off try-on
//! fr try-on --garment https://cdn.example.com/dress.jpg --out dress.png
//! ```
//!
//! Passwords are read from `--password` or `FITTING_ROOM_PASSWORD`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fitting_room_storefront::config::ClientConfig;
use fitting_room_storefront::error::AppError;
use fitting_room_storefront::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "fr")]
#[command(author, version, about = "Fitting Room storefront and virtual try-on")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Signup {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "FITTING_ROOM_PASSWORD", hide_env_values = true)]
        password: String,

        /// Repeat the password
        #[arg(short, long, env = "FITTING_ROOM_PASSWORD", hide_env_values = true)]
        confirm: String,
    },
    /// Log in and fetch the profile
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "FITTING_ROOM_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log out and clear all local data
    Logout,
    /// Show or change the profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Show the home page
    Home,
    /// Open a category page
    Category {
        /// `handbags`, `wallets`, `watches`, `jewellery` or `clothing`
        slug: String,

        /// Write generated images into this directory
        #[arg(long)]
        save_dir: Option<PathBuf>,
    },
    /// Try one garment on the profile picture
    TryOn {
        /// Garment image URL
        #[arg(short, long)]
        garment: String,

        /// Where to write the generated image
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Inspect or clear cached try-on results
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Show the stored profile
    Show,
    /// Fetch the profile from the server
    Refresh,
    /// Update date of birth, gender and profile picture
    Update {
        /// Date of birth, `DD-MM-YYYY`
        #[arg(long)]
        dob: String,

        #[arg(long)]
        gender: String,

        /// Face photo URL used as the try-on model
        #[arg(long)]
        picture: Option<String>,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Show which categories have usable results
    Status,
    /// Drop cached results for one category, or all of them
    Clear {
        #[arg(short, long)]
        category: Option<String>,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // Logs go to stderr so command output stays clean
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fitting_room_storefront=info,fitting_room_cli=info".into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter));

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load configuration from environment (needed for Sentry init)
    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            fail(&AppError::from(e));
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    let result = match AppState::new(config) {
        Ok(state) => run(cli, &state).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        fail(&e);
    }
}

fn fail(error: &AppError) -> ! {
    error.report();
    let _ = writeln!(std::io::stderr().lock(), "Error: {}", error.user_message());
    std::process::exit(1);
}

async fn run(cli: Cli, state: &AppState) -> Result<(), AppError> {
    match cli.command {
        Commands::Signup {
            email,
            password,
            confirm,
        } => commands::auth::signup(state, &email, &password, &confirm).await,
        Commands::Login { email, password } => {
            commands::auth::login(state, &email, &password).await
        }
        Commands::Logout => commands::auth::logout(state),
        Commands::Profile { action } => match action {
            ProfileAction::Show => commands::profile::show(state),
            ProfileAction::Refresh => commands::profile::refresh(state).await,
            ProfileAction::Update {
                dob,
                gender,
                picture,
            } => commands::profile::update(state, &dob, &gender, picture.as_deref()).await,
        },
        Commands::Home => commands::browse::home(state),
        Commands::Category { slug, save_dir } => {
            commands::browse::category(state, &slug, save_dir.as_deref()).await
        }
        Commands::TryOn { garment, out } => commands::tryon::single(state, &garment, &out).await,
        Commands::Cache { action } => match action {
            CacheAction::Status => commands::tryon::cache_status(state),
            CacheAction::Clear { category } => {
                commands::tryon::cache_clear(state, category.as_deref())
            }
        },
    }
}
