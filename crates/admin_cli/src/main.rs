use std::{error::Error, io::Write, path::PathBuf, sync::Arc};

use chrono::Utc;
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand, ValueEnum};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal,
};
use engine::{DatabaseStore, Engine, ExpenseStore, LocalStore, MoneyCents, Summary};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use server::accounts::{self, AccountError};

#[derive(Parser, Debug)]
#[command(name = "expensify_admin")]
#[command(about = "Admin utilities for Expensify (bootstrap users, inspect spending)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./expensify.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    /// Print a user's spending summary.
    Summary(SummaryArgs),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Backend {
    Database,
    Local,
}

#[derive(Args, Debug)]
struct SummaryArgs {
    #[arg(long)]
    email: String,
    /// Where the user's expenses are stored.
    #[arg(long, value_enum, default_value = "database")]
    backend: Backend,
    /// Directory of the local backend.
    #[arg(long, default_value = "data/expenses")]
    path: PathBuf,
    #[arg(long, default_value = "₹")]
    currency: String,
    /// Zone whose calendar decides "this month", as in the server settings.
    #[arg(
        long,
        env = "EXPENSIFY_APP__TIMEZONE",
        default_value = "Asia/Kolkata",
        value_parser = parse_timezone
    )]
    timezone: Tz,
}

/// Reads a line from the terminal without echoing it.
fn read_secret(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    eprint!("{prompt}");
    std::io::stderr().flush()?;
    terminal::enable_raw_mode()?;
    let secret = read_keys();
    terminal::disable_raw_mode()?;
    eprintln!();
    secret
}

fn read_keys() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut secret = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Enter => return Ok(secret),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) => secret.push(ch),
            KeyCode::Backspace => {
                secret.pop();
            }
            _ => {}
        }
    }
}

fn parse_timezone(raw: &str) -> Result<Tz, String> {
    raw.parse().map_err(|_| format!("unknown timezone: {raw}"))
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

fn print_summary(name: &str, summary: &Summary, currency: &str) {
    let money = |amount: MoneyCents| amount.format_with(currency);

    println!("{name}: {} spent in {} transactions", money(summary.total), summary.count);
    println!("  this month ({}): {}", summary.month, money(summary.month_total));
    println!("  average: {}", money(summary.average));

    if !summary.top_categories.is_empty() {
        println!("top categories:");
        for bar in &summary.top_categories {
            println!(
                "  {} {:<20} {:>12} {:>5.1}%",
                bar.category.icon,
                bar.category.name,
                money(bar.total),
                bar.percent
            );
        }
    }

    if !summary.recent.is_empty() {
        println!("recent:");
        for expense in &summary.recent {
            let date = expense
                .date
                .map(|date| date.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {date:<10} {:<24} {:>12} {}",
                expense.title,
                money(expense.amount),
                expense.category
            );
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = read_secret("Password: ")?;
            if read_secret("Confirm password: ")? != password {
                eprintln!("passwords do not match");
                std::process::exit(1);
            }

            match accounts::register(&db, &args.name, &args.email, &password).await {
                Ok(user) => println!("created user: {} ({})", user.email, user.id),
                Err(err @ (AccountError::Form(_) | AccountError::Auth(_))) => {
                    eprintln!("{err}");
                    std::process::exit(1);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Command::Summary(args) => {
            let email = match accounts::normalize_email(&args.email) {
                Ok(email) => email,
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(2);
                }
            };
            let Some(user) = accounts::find_by_email(&db, &email).await? else {
                eprintln!("user not found: {email}");
                std::process::exit(1);
            };

            let store: Arc<dyn ExpenseStore> = match args.backend {
                Backend::Database => Arc::new(DatabaseStore::new(db.clone())),
                Backend::Local => Arc::new(LocalStore::new(args.path)),
            };
            let engine = Engine::builder().store(store).build();
            let now = Utc::now();
            let today = now.with_timezone(&args.timezone).date_naive();
            let summary = engine.summary(&user.id, today, now).await?;
            print_summary(&user.name, &summary, &args.currency);
        }
    }

    Ok(())
}
