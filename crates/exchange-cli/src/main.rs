//! Operator CLI for the campus book exchange.
//!
//! Every write goes through the same message pipeline the application uses,
//! so requests are checked against book ownership and status changes against
//! the transition table.

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use exchange_core::{BookId, MessageId, MessageType, NewMessage, RequestStatus, UserId};
use exchange_service::{ExchangeConfig, MessageService};

#[derive(Debug, Parser)]
#[command(name = "exchange")]
#[command(about = "Manage users, book listings and messages of the book exchange")]
struct Args {
    /// SQLite database URL. Falls back to EXCHANGE_DATABASE_URL.
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create or upgrade the database schema
    Migrate,

    /// Register a user
    AddUser {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
    },

    /// Show a registered user
    User {
        #[arg(long)]
        id: String,
    },

    /// List a book for an owner
    AddBook {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        title: String,
    },

    /// Show the books an owner has listed
    Books {
        #[arg(long)]
        owner: String,
    },

    /// Send a message about a book
    Send {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        book: i64,
        #[arg(long)]
        text: String,
        /// Message type, e.g. purchase_request or swap_offer (default: general)
        #[arg(long = "type")]
        message_type: Option<MessageType>,
    },

    /// Change the status of a purchase request or swap offer
    Status {
        #[arg(long)]
        message: String,
        /// New status: accepted, declined, cancelled or completed
        #[arg(long)]
        to: RequestStatus,
    },

    /// Mark a message as read
    Read {
        #[arg(long)]
        message: String,
    },

    /// Show messages received by a user
    Inbox {
        #[arg(long)]
        user: String,
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },

    /// Show the messages two users exchanged about a book
    Conversation {
        #[arg(long)]
        user: String,
        #[arg(long)]
        with: String,
        #[arg(long)]
        book: i64,
    },

    /// Show requests about a book awaiting an answer
    Pending {
        #[arg(long)]
        book: i64,
    },
}

fn print_json(value: &impl Serialize) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = ExchangeConfig::from_env()?;
    if let Some(url) = args.database_url {
        config.database_url = url;
    }

    let db = config.connect().await?;
    let service = MessageService::new(db);

    match args.command {
        Command::Migrate => {
            info!(database_url = %config.database_url, "Database is up to date");
        }
        Command::AddUser { id, name } => {
            let user = service.register_user(&UserId::new(id), &name).await?;
            print_json(&user)?;
        }
        Command::User { id } => {
            let user = service.get_user(&UserId::new(id)).await?;
            print_json(&user)?;
        }
        Command::AddBook { owner, title } => {
            let book = service.list_book(&UserId::new(owner), &title).await?;
            print_json(&book)?;
        }
        Command::Books { owner } => {
            let books = service.books_by_owner(&UserId::new(owner)).await?;
            print_json(&books)?;
        }
        Command::Send {
            from,
            to,
            book,
            text,
            message_type,
        } => {
            let mut message = NewMessage::new(from, to, BookId(book), text);
            message.message_type = message_type;
            let sent = service.send_message(message).await?;
            print_json(&sent)?;
        }
        Command::Status { message, to } => {
            let updated = service.set_status(&MessageId(message), to).await?;
            print_json(&updated)?;
        }
        Command::Read { message } => {
            let updated = service.mark_read(&MessageId(message)).await?;
            print_json(&updated)?;
        }
        Command::Inbox { user, limit } => {
            let user = UserId::new(user);
            let messages = service.inbox(&user, limit).await?;
            let unread = service.unread_count(&user).await?;
            info!(user_id = %user, unread, "Loaded inbox");
            print_json(&messages)?;
        }
        Command::Conversation { user, with, book } => {
            let messages = service
                .conversation(&UserId::new(user), &UserId::new(with), BookId(book))
                .await?;
            print_json(&messages)?;
        }
        Command::Pending { book } => {
            let messages = service.pending_requests(BookId(book)).await?;
            print_json(&messages)?;
        }
    }

    service.database().close().await;
    Ok(())
}
