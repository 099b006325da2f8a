use std::sync::Arc;

use clap::{Parser, Subcommand};
use sessiongate::api::{ApiClient, ApiError};
use sessiongate::config::{AuthConfig, ConfigError};
use sessiongate::guard::{self, Guarded, Location, Resolution};
use sessiongate::provider::{CognitoProvider, ProviderError};
use sessiongate::{AuthOutcome, FileSlot, KeyValueSlot, SessionStore};

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("output encode failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "sessiongate", about = "Sign in against the configured user pool and walk the guarded views")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report whether a session was restored at startup.
    Status,
    /// Sign in, as the login view does.
    Login {
        #[arg(long, env = "AUTH_USERNAME")]
        username: String,
        #[arg(long, env = "AUTH_PASSWORD", hide_env_values = true)]
        password: String,
        /// Page that sent the user to sign in.
        #[arg(long)]
        from: Option<String>,
    },
    /// Sign out, as the dashboard does.
    Logout,
    /// Resolve a path through the route guards.
    Visit { path: String },
    /// Fetch the dashboard's user table.
    Users,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = AuthConfig::from_env()?;

    let slot: Arc<dyn KeyValueSlot> = Arc::new(FileSlot::new(&config.storage_dir));
    let provider = Arc::new(CognitoProvider::new(&config, slot.clone())?);
    let store = SessionStore::start(provider, slot).await;
    tracing::info!(authenticated = store.is_authenticated(), "session store ready");

    match cli.command {
        Command::Status => run_status(&store),
        Command::Login { username, password, from } => run_login(&store, &username, &password, from.as_deref()).await,
        Command::Logout => run_logout(&store).await,
        Command::Visit { path } => {
            run_visit(&store, &path);
            Ok(())
        }
        Command::Users => run_users(&config, &store).await,
    }
}

fn run_status(store: &SessionStore) -> Result<(), AppError> {
    match store.session() {
        Some(session) => println!("signed in as {}", session.subject_identifier()),
        None => println!("signed out"),
    }
    println!("{}", serde_json::to_string(&store.state())?);
    Ok(())
}

/// Print the redirect and return true when the guard refuses `path`.
fn redirected(store: &SessionStore, path: &str) -> bool {
    match guard::resolve(store.state(), &Location::parse(path)) {
        Resolution::Guarded(Guarded::Redirect(redirect)) => {
            println!("redirect {} (from {})", redirect.to, redirect.from.href());
            true
        }
        _ => false,
    }
}

async fn run_login(store: &SessionStore, username: &str, password: &str, from: Option<&str>) -> Result<(), AppError> {
    if redirected(store, guard::LOGIN_PATH) {
        return Ok(());
    }
    let outcome = AuthOutcome::from(store.sign_in(username, password).await);
    println!("{}", serde_json::to_string(&outcome)?);
    if outcome.success {
        let from = from.map(Location::parse);
        println!("navigate {}", guard::return_path(from.as_ref()));
    }
    Ok(())
}

async fn run_logout(store: &SessionStore) -> Result<(), AppError> {
    if redirected(store, guard::DASHBOARD_PATH) {
        return Ok(());
    }
    let outcome = AuthOutcome::from(store.sign_out().await);
    println!("{}", serde_json::to_string(&outcome)?);
    if outcome.success {
        println!("navigate {}", guard::HOME_PATH);
    }
    Ok(())
}

fn run_visit(store: &SessionStore, path: &str) {
    let location = Location::parse(path);
    match guard::resolve(store.state(), &location) {
        Resolution::NotFound => println!("not found {}", location.href()),
        Resolution::Guarded(Guarded::Render(view)) => println!("render {view:?}"),
        Resolution::Guarded(Guarded::Redirect(redirect)) => {
            println!("redirect {} (from {})", redirect.to, redirect.from.href());
        }
    }
}

async fn run_users(config: &AuthConfig, store: &Arc<SessionStore>) -> Result<(), AppError> {
    if redirected(store, guard::DASHBOARD_PATH) {
        return Ok(());
    }
    let client = ApiClient::private(config, store.clone())?;
    let rows = client.fetch_users().await?;
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}
