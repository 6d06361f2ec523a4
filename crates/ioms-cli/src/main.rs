//! ioms - command line client for the inventory and order dashboard.
//!
//! Restores the saved session on startup, then signs in, signs up, signs out,
//! opens a dashboard view or changes customers, products and orders. Every
//! screen except sign-in/sign-up goes through the auth gate.

mod format;
mod manage;
mod render;

use std::io::{self, Write};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ioms_core::api::ApiClient;
use ioms_core::auth::{self, AuthGate, Guarded, SessionStore};
use ioms_core::config::Config;
use ioms_core::models::{SignInCredentials, SignUpData};
use ioms_core::Route;

use manage::{CustomerCommand, OrderCommand, ProductCommand};

#[derive(Parser)]
#[command(name = "ioms", about = "Inventory and order management from the terminal")]
struct Cli {
    #[arg(long, env = "IOMS_API_URL", help = "API base URL (overrides config)")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and start a 15-minute session
    Login {
        #[arg(long, env = "IOMS_EMAIL")]
        email: Option<String>,
    },
    /// Register a new account
    Signup {
        #[arg(long, env = "IOMS_EMAIL")]
        email: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// End the current session
    Logout,
    /// Show whether a session is active
    Status {
        #[arg(long, help = "Stay running and report when the session ends")]
        follow: bool,
    },
    /// Open a view by path, e.g. `/customers/3` or `/orders`
    Open { path: String },
    /// Shortcut for `open /`
    Dashboard,
    /// Create, update or delete customers
    Customer {
        #[command(subcommand)]
        command: CustomerCommand,
    },
    /// Create, update or delete products
    Product {
        #[command(subcommand)]
        command: ProductCommand,
    },
    /// Create, update or delete orders
    Order {
        #[command(subcommand)]
        command: OrderCommand,
    },
}

/// Initialize the tracing subscriber for logging
fn init_tracing() -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (writer, guard) = tracing_appender::non_blocking(io::stderr());
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer))
        .with(filter)
        .init();
    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _log_guard = init_tracing();
    let cli = Cli::parse();

    let mut config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    };

    let session = SessionStore::new(config.open_storage()?);
    session.rehydrate();

    let api_url = cli.api_url.clone().unwrap_or_else(|| config.api_url());
    let api = ApiClient::new(api_url, session.clone())?;
    let mut gate = AuthGate::new(session.clone());

    match cli.command {
        Command::Login { email } => login(&api, &session, &mut config, email).await,
        Command::Signup {
            email,
            first_name,
            last_name,
            phone,
        } => {
            enter(&mut gate, Route::SignUp).await?;
            let data = SignUpData {
                email: or_prompt(email, "Email")?,
                password: new_password()?,
                first_name: or_prompt(first_name, "First name")?,
                last_name: or_prompt(last_name, "Last name")?,
                phone_number: or_prompt(phone, "Phone number")?,
            };
            signup(&api, &mut config, data).await
        }
        Command::Logout => {
            let next = auth::sign_out(&session);
            println!("Signed out. Continue at {}", next);
            Ok(())
        }
        Command::Status { follow } => status(&session, follow).await,
        Command::Open { path } => {
            let route: Route = path.parse()?;
            open(&api, &mut gate, route).await
        }
        Command::Dashboard => open(&api, &mut gate, Route::Dashboard).await,
        Command::Customer { command } => manage::customer(&api, &mut gate, command).await,
        Command::Product { command } => manage::product(&api, &mut gate, command).await,
        Command::Order { command } => manage::order(&api, &mut gate, command).await,
    }
}

async fn login(
    api: &ApiClient,
    session: &SessionStore,
    config: &mut Config,
    email: Option<String>,
) -> Result<()> {
    let email = match (email, config.last_email.as_deref()) {
        (Some(email), _) if !email.is_empty() => email,
        (_, Some(last)) if !last.is_empty() => prompt_with_default("Email", last)?,
        _ => prompt("Email")?,
    };
    let password = match std::env::var("IOMS_PASSWORD") {
        Ok(password) if !password.is_empty() => password,
        _ => rpassword::prompt_password("Password: ")?,
    };

    let credentials = SignInCredentials::new(email.clone(), password);
    match auth::sign_in(api, session, &credentials).await {
        Ok(user) => {
            config.last_email = Some(email);
            if let Err(e) = config.save() {
                warn!(error = %e, "Failed to save config");
            }
            println!(
                "Signed in as {}. Session expires in {} minutes.",
                user.email,
                session.minutes_until_expiry()
            );
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!(auth::login_error_message(&e))),
    }
}

async fn signup(api: &ApiClient, config: &mut Config, data: SignUpData) -> Result<()> {
    match auth::sign_up(api, &data).await {
        Ok((account, next)) => {
            config.last_email = Some(account.email);
            if let Err(e) = config.save() {
                warn!(error = %e, "Failed to save config");
            }
            println!("{} Continue at {} (run `ioms login`)", auth::REGISTERED, next);
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!(auth::signup_error_message(&e))),
    }
}

/// Ask for a password twice; both entries must match
fn new_password() -> Result<String> {
    let password = rpassword::prompt_password("Password: ")?;
    let confirm = rpassword::prompt_password("Confirm password: ")?;
    if password != confirm {
        anyhow::bail!("Passwords do not match");
    }
    Ok(password)
}

fn or_prompt(value: Option<String>, label: &str) -> Result<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => prompt(label),
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn prompt_with_default(label: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]", label, default))?;
    Ok(if input.is_empty() { default.to_string() } else { input })
}

async fn status(session: &SessionStore, follow: bool) -> Result<()> {
    let snapshot = session.snapshot();
    if !snapshot.is_authenticated() {
        println!("Not signed in");
        return Ok(());
    }

    let who = snapshot
        .user
        .as_ref()
        .map(|u| u.email.as_str())
        .unwrap_or("restored session");
    println!(
        "Signed in ({}), {} minutes remaining",
        who,
        session.minutes_until_expiry()
    );

    if follow {
        let mut updates = session.subscribe();
        let _ = updates.wait_for(|s| !s.is_authenticated()).await;
        info!("Session ended while following");
        println!("Session ended. Continue at {}", Route::SignIn);
    }
    Ok(())
}

/// Pass `route` through the auth gate, failing with the redirect target when
/// the session does not allow it.
async fn enter(gate: &mut AuthGate, route: Route) -> Result<Route> {
    match gate.navigate(&route, || route.clone()).await {
        Guarded::Rendered(route) => Ok(route),
        Guarded::Redirected(target) => {
            anyhow::bail!("Not signed in. Continue at {} (run `ioms login`)", target)
        }
        Guarded::Waiting => anyhow::bail!("Session is still loading"),
    }
}

async fn open(api: &ApiClient, gate: &mut AuthGate, route: Route) -> Result<()> {
    let route = enter(gate, route).await?;

    match &route {
        Route::SignIn => println!("Run `ioms login` to sign in"),
        Route::SignUp => println!("Run `ioms signup` to create an account"),
        Route::Dashboard => render::print_dashboard(&api.dashboard().await?),
        Route::Customers => render::print_customers(&api.customers("").await?),
        Route::CustomerDetail(id) => render::print_customer(&api.customer(*id).await?),
        Route::Products => render::print_products(&api.products(1).await?),
        Route::ProductDetail(id) => render::print_product(&api.product(*id).await?),
        Route::Orders => render::print_orders(&api.orders(1).await?),
        Route::OrderDetail(id) => render::print_order(&api.order(id).await?),
        Route::CreateCustomer
        | Route::EditCustomer(_)
        | Route::CreateOrder
        | Route::EditOrder(_)
        | Route::CreateProduct
        | Route::EditProduct(_) => {
            anyhow::bail!(
                "{} is a form; use `ioms customer`, `ioms product` or `ioms order`",
                route
            )
        }
    }
    Ok(())
}
