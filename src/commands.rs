// Line-based bag commands read from the terminal
use crate::model::{BasketItem, Domain, UnknownDomain};
use crate::report::render_comparison;
use crate::session::BagSession;
use thiserror::Error;
use tracing::{info, warn};

pub const HELP: &str = "📋 Available commands:\n\
    add <para|retail> <sku> [title] — put an item in the bag\n\
    remove <sku> — take an item out\n\
    clear — empty the bag\n\
    list — show bag contents\n\
    compare — recompute shop totals now\n\
    show — latest comparison\n\
    json — latest comparison as JSON\n\
    help — command list\n\
    quit — exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(BasketItem),
    Remove(String),
    Clear,
    List,
    Compare,
    Show,
    Json,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}', type 'help'")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error(transparent)]
    Domain(#[from] UnknownDomain),
}

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let mut parts = line.split_whitespace();
    let name = parts.next().ok_or(CommandError::Empty)?;

    match name.trim_start_matches('/').to_lowercase().as_str() {
        "add" => {
            let domain: Domain = parts
                .next()
                .ok_or(CommandError::Usage("add <para|retail> <sku> [title]"))?
                .parse()?;
            let sku = parts
                .next()
                .ok_or(CommandError::Usage("add <para|retail> <sku> [title]"))?;
            let title = parts.collect::<Vec<_>>().join(" ");
            Ok(Command::Add(BasketItem::new(sku, domain).with_title(title)))
        }
        "remove" | "rm" => {
            let sku = parts.next().ok_or(CommandError::Usage("remove <sku>"))?;
            Ok(Command::Remove(sku.to_string()))
        }
        "clear" => Ok(Command::Clear),
        "list" | "ls" => Ok(Command::List),
        "compare" | "refresh" => Ok(Command::Compare),
        "show" => Ok(Command::Show),
        "json" => Ok(Command::Json),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

/// Result of handling one command: text for the user and what the caller should do next.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CommandOutcome {
    pub reply: String,
    pub refresh: bool,
    pub quit: bool,
}

impl CommandOutcome {
    fn reply(text: impl Into<String>) -> Self {
        Self {
            reply: text.into(),
            ..Self::default()
        }
    }

    fn changed(text: impl Into<String>) -> Self {
        Self {
            reply: text.into(),
            refresh: true,
            quit: false,
        }
    }
}

pub async fn handle_command(command: Command, session: &BagSession, currency: &str) -> CommandOutcome {
    info!("Handling command: {:?}", command);
    match command {
        Command::Add(item) => {
            let sku = item.sku.clone();
            if session.add(item).await {
                CommandOutcome::changed(format!("✅ Added {}", sku))
            } else {
                CommandOutcome::reply(format!("ℹ️ {} is already in the bag", sku))
            }
        }
        Command::Remove(sku) => {
            if session.remove(&sku).await {
                CommandOutcome::changed(format!("🗑 Removed {}", sku))
            } else {
                CommandOutcome::reply(format!("ℹ️ {} is not in the bag", sku))
            }
        }
        Command::Clear => {
            if session.clear().await {
                CommandOutcome::changed("🧹 Bag cleared")
            } else {
                CommandOutcome::reply("🛒 Bag is already empty")
            }
        }
        Command::List => {
            let snapshot = session.snapshot().await;
            if snapshot.is_empty() {
                return CommandOutcome::reply("🛒 Bag is empty.");
            }
            let mut msg = format!("🛒 Bag ({} items):\n", snapshot.items.len());
            for (i, item) in snapshot.items.iter().enumerate() {
                msg.push_str(&format!("{}. [{}] {} {}\n", i + 1, item.domain, item.sku, item.title));
            }
            CommandOutcome::reply(msg.trim_end())
        }
        Command::Compare => CommandOutcome {
            reply: "🔄 Refreshing comparison...".into(),
            refresh: true,
            quit: false,
        },
        Command::Show => match session.latest() {
            Some(comparison) => CommandOutcome::reply(render_comparison(&comparison, currency)),
            None => CommandOutcome::reply("⏳ No comparison yet for the current bag."),
        },
        Command::Json => match session.latest() {
            Some(comparison) => match serde_json::to_string_pretty(&comparison) {
                Ok(json) => CommandOutcome::reply(json),
                Err(e) => {
                    warn!("JSON encode error: {:?}", e);
                    CommandOutcome::reply(format!("❌ Error: {}", e))
                }
            },
            None => CommandOutcome::reply("null"),
        },
        Command::Help => CommandOutcome::reply(HELP),
        Command::Quit => CommandOutcome {
            reply: "👋 Bye".into(),
            refresh: false,
            quit: true,
        },
    }
}
