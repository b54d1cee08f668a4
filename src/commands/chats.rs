use crate::chat::{ChatMessage, ChatTranscript, Role};
use crate::cli::ChatsCommand;
use crate::commands::AppContext;
use crate::config::Config;
use crate::error::{PantryError, Result};
use colored::Colorize;
use prettytable::{format, Table};

/// Handle chat commands
pub async fn handle_chats(config: &Config, command: ChatsCommand) -> Result<()> {
    let ctx = AppContext::open(config)?;

    match command {
        ChatsCommand::List { json } => {
            let chats = ctx.chats.list_chats().await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&chats).map_err(PantryError::from)?);
                return Ok(());
            }

            if chats.is_empty() {
                println!("{}", "No chats found.".yellow());
                return Ok(());
            }

            print_chat_table(&chats);
            println!(
                "Use {} to read a conversation.",
                "pantrypal chats show <ID>".cyan()
            );
            println!();
        }
        ChatsCommand::Show { id, json } => {
            let chat = ctx
                .chats
                .open_chat(&id)
                .await?
                .ok_or_else(|| PantryError::InvalidInput(format!("unknown chat: {}", id)))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&chat).map_err(PantryError::from)?);
            } else {
                print_transcript(&chat);
            }
        }
        ChatsCommand::Delete { id } => {
            ctx.chats.delete_chat(&id).await?;
            println!("{}", format!("Deleted chat {}", id).green());
        }
        ChatsCommand::New { title } => {
            let chat = ctx.chats.start_chat(&title, None).await?;
            println!("{}", format!("Started chat {}", chat.id).green());
        }
        ChatsCommand::Recipe { text } => {
            let chat = ctx.chats.start_from_recipe(&text).await?;
            println!(
                "{}",
                format!("Started chat {} ({})", chat.id, chat.title).green()
            );
        }
        ChatsCommand::Send { id, message } => {
            let chat = ctx.chats.send_message(&id, &message).await?;
            if let Some(reply) = chat.messages.last() {
                print_message(reply);
            }
        }
    }

    Ok(())
}

fn print_chat_table(chats: &[ChatTranscript]) {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "ID".bold(),
        "Title".bold(),
        "Messages".bold(),
        "Last Updated".bold()
    ]);

    for chat in chats {
        let count = chat.length.unwrap_or(chat.messages.len() as u64);
        let updated = chat
            .updated_at_time()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| chat.updated_at.clone());

        table.add_row(prettytable::row![
            chat.id.cyan(),
            truncate_title(&chat.title, 40),
            count,
            updated
        ]);
    }

    println!("\nChats:");
    table.printstd();
    println!();
}

fn print_transcript(chat: &ChatTranscript) {
    println!("\n{}", chat.title.bold());
    if chat.messages.is_empty() {
        println!("{}", "(no messages cached for this chat)".yellow());
    }
    for message in &chat.messages {
        print_message(message);
    }
    println!();
}

fn print_message(message: &ChatMessage) {
    let label = match message.role {
        Role::User => "you".cyan(),
        Role::Assistant => "assistant".green(),
        Role::System => "system".dimmed(),
    };
    println!("{}: {}", label.bold(), message.content);
}

fn truncate_title(title: &str, max: usize) -> String {
    if title.chars().count() > max {
        let head: String = title.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        title.to_string()
    }
}
