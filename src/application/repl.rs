#[cfg(test)]
#[path = "repl_test.rs"]
mod tests;

use std::path;

use anyhow::Context;
use anyhow::Result;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;
use tokio::fs;
use tokio::task;
use yansi::Paint;

use super::app::App;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::ChatMessage;
use crate::domain::models::Role;
use crate::domain::models::SlashCommand;

pub fn help_text() -> String {
    let text = r#"
COMMANDS:
- /clear (/new) - Forget the current conversation and start a new session.
- /export (/x) [PATH?] - Save the conversation as JSON. Defaults to chat-export-<SESSION_ID>.json in the current directory.
- /history (/l) [SESSION_ID] - Replace the conversation with the stored history of a session.
- /session (/s) - Print the current session ID.
- /quit /exit (/q) - Exit SolveX.
- /help (/h) - Provides this help menu.
        "#;

    return text.trim().to_string();
}

pub fn format_message(message: &ChatMessage) -> String {
    let author = match message.role {
        Role::User => "You",
        Role::Assistant => "SolveX",
    };

    return format!("{author}: {}", message.text);
}

fn print_message(message: &ChatMessage) {
    let line = format_message(message);
    match message.role {
        Role::User => println!("{}", Paint::cyan(line)),
        Role::Assistant => println!("{line}"),
    }
}

async fn read_prompt() -> Result<String> {
    let text = task::spawn_blocking(|| {
        return Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt("You")
            .allow_empty(true)
            .interact_text();
    })
    .await??;

    return Ok(text);
}

/// Outcome of handling one line typed into the chat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

impl App {
    pub(super) async fn chat_loop(&mut self) -> Result<bool> {
        println!(
            "{}",
            Paint::new("Chat with SolveX. Type /help for commands, /quit to exit.").dimmed()
        );

        let session_id = Config::get(ConfigKey::SessionID);
        if !session_id.is_empty() {
            self.load_history(&session_id).await;
        }

        loop {
            let text = read_prompt().await?;
            if self.handle_line(&text).await? == Flow::Quit {
                return Ok(true);
            }
        }
    }

    /// Runs a slash command or sends the line as a chat message.
    pub async fn handle_line(&mut self, text: &str) -> Result<Flow> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Flow::Continue);
        }

        if let Some(cmd) = SlashCommand::parse(text) {
            return self.handle_command(&cmd).await;
        }

        if let Ok(reply) = self.chat.send_message(text).await {
            println!("SolveX: {}", reply.reply);
        }
        self.flush_notifications();

        return Ok(Flow::Continue);
    }

    async fn handle_command(&mut self, cmd: &SlashCommand) -> Result<Flow> {
        if cmd.is_quit() {
            return Ok(Flow::Quit);
        }

        if cmd.is_help() {
            println!("{}", help_text());
        } else if cmd.is_clear() {
            self.chat.clear_chat();
            self.flush_notifications();
        } else if cmd.is_session() {
            match self.chat.state().session_id {
                Some(session_id) => println!("Session: {session_id}"),
                None => println!("No session yet. Send a message to start one."),
            }
        } else if cmd.is_history() {
            let session_id = cmd
                .first_arg()
                .map(|id| return id.to_string())
                .or_else(|| return self.chat.state().session_id);
            match session_id {
                Some(session_id) => self.load_history(&session_id).await,
                None => eprintln!("{}", Paint::red("Usage: /history <SESSION_ID>")),
            }
        } else if cmd.is_export() {
            if let Err(err) = self.export(cmd.first_arg()).await {
                tracing::error!(err = ?err, "Failed to export chat");
                eprintln!("{}", Paint::red(format!("Export failed: {err}")));
            }
        }

        return Ok(Flow::Continue);
    }

    async fn load_history(&mut self, session_id: &str) {
        let res = self.chat.load_chat_history(session_id).await;
        self.flush_notifications();

        if res.is_ok() {
            for message in self.chat.state().messages.iter() {
                print_message(message);
            }
        }
    }

    async fn export(&mut self, file_path: Option<&str>) -> Result<()> {
        let export = self.chat.export_chat();
        let file_path = file_path
            .map(path::PathBuf::from)
            .unwrap_or_else(|| return path::PathBuf::from(export.file_name()));

        fs::write(&file_path, export.to_json()?)
            .await
            .with_context(|| return format!("Unable to write {}", file_path.display()))?;
        println!(
            "{}",
            Paint::green(format!(
                "Exported {} messages to {}",
                export.messages.len(),
                file_path.display()
            ))
        );

        return Ok(());
    }
}
