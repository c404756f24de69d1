//! Bookshelf CLI - a command-line client for the bookshelf catalog API.
//!
//! Sign in, browse the catalog, and manage the display theme. The session
//! token persists across runs, so `books` and `book <id>` keep working
//! until the server rejects the token.

mod api;
mod auth;
mod config;
mod models;
mod router;
mod storage;
mod theme;
mod utils;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use api::{ApiClient, BookQuery};
use auth::AuthStore;
use config::Config;
use router::{decide, NavDecision, Route};
use storage::{FileStorage, Storage};
use theme::{ThemeChoice, ThemeMode, ThemeStore};
use utils::format::format_idr;

/// Environment hint standing in for the OS dark-mode preference
const DARK_HINT_ENV: &str = "BOOKSHELF_DARK";

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    info!("Bookshelf CLI starting");

    let mut config = Config::load()?;
    let storage: Arc<dyn Storage> = Arc::new(FileStorage::open(Config::storage_path()?));
    let auth = AuthStore::new(Arc::clone(&storage));
    let client = ApiClient::new(config.api_base(), auth.clone())?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("login") => cmd_login(&client, &auth, &mut config, args.get(1).cloned()).await,
        Some("register") => cmd_register(&client, &mut config, args.get(1).cloned()).await,
        Some("logout") => cmd_logout(&auth),
        Some("whoami") => cmd_whoami(&client, &auth).await,
        Some("books") => cmd_books(&client, args.get(1).cloned()).await,
        Some("book") => {
            let id = args
                .get(1)
                .context("usage: bookshelf-cli book <id>")?
                .parse()
                .context("book id must be a number")?;
            cmd_book(&client, id).await
        }
        Some("theme") => cmd_theme(storage, args.get(1).map(String::as_str)),
        Some("open") => {
            let path = args.get(1).context("usage: bookshelf-cli open <path>")?;
            cmd_open(&client, &auth, path).await
        }
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn print_usage() {
    println!("usage: bookshelf-cli <command>");
    println!();
    println!("  login [email]    sign in and store the session");
    println!("  register [email] create an account and sign in");
    println!("  logout           drop the stored session");
    println!("  whoami           show the signed-in user");
    println!("  books [query]    list books, optionally filtered by title/author");
    println!("  book <id>        show one book");
    println!("  theme [choice]   show or set the theme (light/dark/system)");
    println!("  open <path>      navigate to a page (/, /login, /books, /books/<id>)");
}

fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

async fn cmd_login(
    client: &ApiClient,
    auth: &AuthStore,
    config: &mut Config,
    email: Option<String>,
) -> Result<()> {
    // The login page is guest-only; a live session navigates straight to
    // the listing instead.
    if decide(&Route::Login, auth) == NavDecision::RedirectToBooks {
        println!("Already signed in, showing books instead.");
        return cmd_books(client, None).await;
    }

    let email = match email.or_else(|| config.last_email.clone()) {
        Some(email) => email,
        None => prompt("Email")?,
    };
    let password = prompt("Password")?;

    let user = client.login(&email, &password).await?;
    config.last_email = Some(email);
    config.save()?;

    println!("Signed in as {} <{}>", user.name, user.email);
    Ok(())
}

async fn cmd_register(
    client: &ApiClient,
    config: &mut Config,
    email: Option<String>,
) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt("Email")?,
    };
    let name = prompt("Name")?;
    let password = prompt("Password")?;

    let user = client.register(&email, &password, &name).await?;
    config.last_email = Some(email);
    config.save()?;

    println!("Account created, signed in as {} <{}>", user.name, user.email);
    Ok(())
}

/// Resolve a page the way the web client's router would: table redirects
/// first, then the guest-only guard, then render whatever page remains.
async fn cmd_open(client: &ApiClient, auth: &AuthStore, path: &str) -> Result<()> {
    let mut route = Route::parse(path).with_context(|| format!("no page at '{}'", path))?;

    if let Some(target) = route.redirect_target() {
        route = target;
    }
    if decide(&route, auth) == NavDecision::RedirectToBooks {
        println!("{} redirects to /books", route);
        route = Route::Books;
    }

    match route {
        Route::Books => cmd_books(client, None).await,
        Route::BookDetail(id) => cmd_book(client, id).await,
        Route::Login => {
            println!("Use 'bookshelf-cli login' to sign in.");
            Ok(())
        }
        // Home always resolves through the table redirect above.
        Route::Home => cmd_books(client, None).await,
    }
}

fn cmd_logout(auth: &AuthStore) -> Result<()> {
    auth.clear_session();
    println!("Signed out.");
    Ok(())
}

async fn cmd_whoami(client: &ApiClient, auth: &AuthStore) -> Result<()> {
    let session = auth.session();
    let user = match session.user {
        Some(user) => user,
        None => {
            println!("Not signed in.");
            return Ok(());
        }
    };

    // Verify the token server-side; a 401 here clears the session.
    let identity = client.me().await?;
    println!("{} <{}> (id {}, role {})", user.name, user.email, identity.id, identity.role);
    Ok(())
}

async fn cmd_books(client: &ApiClient, query: Option<String>) -> Result<()> {
    let query = BookQuery {
        q: query.filter(|q| !q.is_empty()),
        ..BookQuery::default()
    };
    let page = client.fetch_books(&query).await?;

    if page.items.is_empty() {
        println!("No books found.");
        return Ok(());
    }

    for book in &page.items {
        println!(
            "{:>4}  {:<40} {:<20} {:>12}  stock {}",
            book.id,
            book.title,
            book.author,
            format_idr(book.price),
            book.stock
        );
    }
    if page.total > page.items.len() as i64 {
        println!("({} of {} shown, page {})", page.items.len(), page.total, page.page);
    }
    Ok(())
}

async fn cmd_book(client: &ApiClient, id: u64) -> Result<()> {
    let book = client.fetch_book(id).await?;
    println!("{}", book.title);
    println!("  author:   {}", book.author);
    println!("  category: {}", book.category);
    println!("  price:    {}", format_idr(book.price));
    println!("  stock:    {}", book.stock);
    if !book.cover_url.is_empty() {
        println!("  cover:    {}", book.cover_url);
    }
    Ok(())
}

fn cmd_theme(storage: Arc<dyn Storage>, choice: Option<&str>) -> Result<()> {
    let mut store = ThemeStore::new(storage);

    if let Some(raw) = choice {
        let choice = ThemeChoice::parse(raw)
            .with_context(|| format!("unknown theme '{}' (expected light, dark, or system)", raw))?;
        store.set_choice(choice);
    }

    let prefers_dark = std::env::var(DARK_HINT_ENV)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let mode = match store.mode(prefers_dark) {
        ThemeMode::Light => "light",
        ThemeMode::Dark => "dark",
    };
    println!("theme: {} (effective: {})", store.choice(), mode);
    Ok(())
}
