/// One-shot CLI against the CareLink backend
use carelink_core::api::chat::ChatApi;
use carelink_core::api::Http;
use carelink_core::{Config, Session};
use colored::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return Ok(());
    }

    let config = Config::load();
    let session = Session::from_env()?;
    let http = Http::new(&config, &session)?;
    let chat = ChatApi::new(http);

    let command = &args[1];
    match command.as_str() {
        "conversations" => {
            list_conversations(&chat, &session).await?;
        }
        "history" => {
            if args.len() < 3 {
                eprintln!("{}", "Usage: cli history <conversation_id>".yellow());
                return Ok(());
            }
            show_history(&chat, &args[2]).await?;
        }
        "send" => {
            if args.len() < 4 {
                eprintln!(
                    "{}",
                    "Usage: cli send <conversation_id> <message>".yellow()
                );
                return Ok(());
            }
            let message = args[3..].join(" ");
            send_message(&chat, &args[2], &message).await?;
        }
        "search" => {
            if args.len() < 3 {
                eprintln!("{}", "Usage: cli search <query>".yellow());
                return Ok(());
            }
            search_users(&chat, &args[2..].join(" ")).await?;
        }
        "unread" => {
            show_unread(&chat).await?;
        }
        _ => {
            eprintln!("{} Unknown command: {}", "✗".red().bold(), command.red());
            print_usage();
        }
    }

    Ok(())
}

fn print_usage() {
    println!("{}", "CareLink CLI".bright_cyan().bold());
    println!();
    println!("{}", "Usage:".bright_white().bold());
    println!("  cli <command> [args]");
    println!();
    println!("{}", "Commands:".bright_white().bold());
    println!(
        "  {}            List conversations with unread counts",
        "conversations".cyan()
    );
    println!(
        "  {} <id>            Print a conversation's messages",
        "history".cyan()
    );
    println!(
        "  {} <id> <message>     Send a message to a conversation",
        "send".cyan()
    );
    println!(
        "  {} <query>          Search staff for a new conversation",
        "search".cyan()
    );
    println!(
        "  {}                   Show the aggregate unread badge",
        "unread".cyan()
    );
    println!();
    println!(
        "Environment: CARELINK_TOKEN (required), CARELINK_USER_ID, CARELINK_API_BASE"
    );
}

async fn list_conversations(chat: &ChatApi, session: &Session) -> anyhow::Result<()> {
    let conversations = chat.conversations().await?;
    if conversations.is_empty() {
        println!("{}", "No conversations".yellow());
        return Ok(());
    }
    println!(
        "{}",
        format!("Conversations ({})", conversations.len())
            .bright_cyan()
            .bold()
    );
    println!("{}", "─".repeat(60).dimmed());
    for conv in &conversations {
        let name = conv.resolved_name(&session.user_id);
        let unread = if conv.unread_count > 0 {
            format!(" [{}]", conv.unread_count).green().bold().to_string()
        } else {
            String::new()
        };
        let preview = conv
            .last_message_preview
            .as_deref()
            .unwrap_or("")
            .dimmed();
        println!("  {} {}{}  {}", conv.id.cyan(), name, unread, preview);
    }
    Ok(())
}

async fn show_history(chat: &ChatApi, conversation_id: &str) -> anyhow::Result<()> {
    let messages = chat.messages(conversation_id).await?;
    if messages.is_empty() {
        println!("{}", "No messages".yellow());
        return Ok(());
    }
    for msg in &messages {
        println!(
            "{} {} {}",
            msg.sent_at.format("%H:%M").to_string().dimmed(),
            format!("{}:", msg.sender_name).bright_white().bold(),
            msg.content
        );
    }
    Ok(())
}

async fn send_message(chat: &ChatApi, conversation_id: &str, message: &str) -> anyhow::Result<()> {
    match chat.send_message(conversation_id, message).await {
        Ok(sent) => {
            println!("{} Message sent! ID: {}", "✓".green().bold(), sent.id.cyan());
            Ok(())
        }
        Err(e) => {
            eprintln!("{} Error: {}", "✗".red().bold(), e.to_string().red());
            std::process::exit(1);
        }
    }
}

async fn search_users(chat: &ChatApi, query: &str) -> anyhow::Result<()> {
    let users = chat.search_users(query).await?;
    if users.is_empty() {
        println!("{}", "No matching staff".yellow());
        return Ok(());
    }
    for user in &users {
        println!(
            "  {} {} {} {}",
            user.id.cyan(),
            user.name.bright_white(),
            user.role.green(),
            user.department.dimmed()
        );
    }
    Ok(())
}

async fn show_unread(chat: &ChatApi) -> anyhow::Result<()> {
    let unread = chat.unread_count().await?;
    if unread == 0 {
        println!("{}", "✓ All caught up".green().bold());
    } else {
        println!(
            "{} {} unread message(s)",
            "●".green().bold(),
            unread.to_string().bright_white().bold()
        );
    }
    Ok(())
}
