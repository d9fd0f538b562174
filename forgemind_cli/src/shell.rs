//! Interactive loop: routes slash commands, forwards chat text to the
//! dispatcher, and prints replies as they land in the active conversation.

use std::path::PathBuf;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use forgemind_core::{
    Author, CannedResponder, ConversationStore, ReplyDispatcher, ReplyMode, StoreError, UiEvent,
};

use crate::commands::{parse_mode, Command};
use crate::config::Config;
use crate::output::{OutputHandler, Theme};

pub struct Shell {
    store: ConversationStore,
    dispatcher: ReplyDispatcher<CannedResponder>,
    out: OutputHandler,
    mode: ReplyMode,
    config: Config,
    /// Where `config` was loaded from. Settings changes are written back
    /// to this path, not the default location.
    config_path: PathBuf,
}

impl Shell {
    pub fn new(
        store: ConversationStore,
        dispatcher: ReplyDispatcher<CannedResponder>,
        config: Config,
        config_path: PathBuf,
    ) -> Self {
        let out = OutputHandler::new(config.theme);
        let mode = config.default_mode;
        Self {
            store,
            dispatcher,
            out,
            mode,
            config,
            config_path,
        }
    }

    /// Runs until `/quit` or end of input, then cancels whatever is still
    /// in flight.
    pub async fn run(&mut self) -> Result<()> {
        let mut events = self.store.subscribe();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        self.out.print_banner()?;
        self.out.print_system(&format!(
            "Mode: {}. Type a message, or /help for commands.",
            self.mode.label()
        ))?;

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Ok(UiEvent::MessageAppended { author, text, .. }) => {
                        // The user's own lines are already on screen.
                        if author == Author::Assistant {
                            self.out.print_assistant(&text)?;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("Dropped {} UI events after falling behind", skipped);
                    }
                    Err(RecvError::Closed) => break,
                },
                line = lines.next_line() => match line? {
                    Some(line) => {
                        if !self.handle_line(line.trim()).await? {
                            break;
                        }
                    }
                    None => break,
                },
            }
        }

        let cancelled = self.dispatcher.shutdown();
        match cancelled {
            0 => {}
            1 => self.out.print_system("Cancelled 1 pending reply.")?,
            n => self.out.print_system(&format!("Cancelled {} pending replies.", n))?,
        }
        self.out.print_system("Goodbye.")?;
        Ok(())
    }

    /// Routes one trimmed input line. Returns false when the shell should
    /// exit.
    async fn handle_line(&mut self, line: &str) -> Result<bool> {
        if line.is_empty() {
            return Ok(true);
        }
        match Command::parse(line) {
            None => self.submit(line).await?,
            Some(Command::New) => self.start_conversation().await?,
            Some(Command::List) => {
                let summaries = self.store.list_conversations().await;
                let active = self.store.active_id().await;
                self.out.print_conversation_list(&summaries, active)?;
            }
            Some(Command::Switch(position)) => self.switch_to(position).await?,
            Some(Command::Mode(arg)) => self.change_mode(arg)?,
            Some(Command::Theme(arg)) => self.change_theme(arg)?,
            Some(Command::History) => self.show_history().await?,
            Some(Command::Help) => self.out.print_help()?,
            Some(Command::Quit) => return Ok(false),
            Some(Command::Unknown(name)) => {
                self.out
                    .print_error(&format!("Unknown command /{}. Try /help.", name))?;
            }
        }
        Ok(true)
    }

    async fn submit(&self, text: &str) -> Result<()> {
        let target = self.store.active_id().await;
        match self.store.append_message(target, Author::User, text).await {
            Ok(_) => {
                self.dispatcher.dispatch(target, text, self.mode);
            }
            Err(StoreError::EmptyMessage) => {}
            Err(err) => self.out.print_error(&err.to_string())?,
        }
        Ok(())
    }

    async fn start_conversation(&self) -> Result<()> {
        let id = self.store.create_conversation().await;
        let summaries = self.store.list_conversations().await;
        if let Some(summary) = summaries.iter().find(|s| s.id == id) {
            self.out.print_system(&format!("Started {}.", summary.title))?;
        }
        Ok(())
    }

    async fn switch_to(&self, position: Option<usize>) -> Result<()> {
        let summaries = self.store.list_conversations().await;
        let target = position
            .and_then(|p| p.checked_sub(1))
            .and_then(|index| summaries.get(index));
        match target {
            Some(summary) => {
                self.store.set_active(summary.id).await?;
                self.out
                    .print_system(&format!("Switched to {}.", summary.title))?;
                let messages = self.store.messages(summary.id).await?;
                self.out.print_history(&summary.title, &messages)?;
            }
            None => self
                .out
                .print_error("Usage: /switch <number> as shown by /list")?,
        }
        Ok(())
    }

    fn change_mode(&mut self, arg: Option<String>) -> Result<()> {
        match arg {
            None => self.out.print_system(&format!(
                "Current mode: {}. Options: normal, temporary, web.",
                self.mode.label()
            ))?,
            Some(name) => match parse_mode(&name) {
                Some(mode) => {
                    self.mode = mode;
                    self.config.default_mode = mode;
                    self.persist_config();
                    self.out
                        .print_system(&format!("Mode set to {}.", mode.label()))?;
                }
                None => self.out.print_error(&format!(
                    "Unknown mode '{}'. Options: normal, temporary, web.",
                    name
                ))?,
            },
        }
        Ok(())
    }

    fn change_theme(&mut self, arg: Option<String>) -> Result<()> {
        match arg {
            None => {
                let next = self.out.theme().toggled();
                self.apply_theme(next)?;
            }
            Some(name) => match Theme::from_name(&name) {
                Some(theme) => self.apply_theme(theme)?,
                None => self.out.print_error(&format!(
                    "Unknown theme '{}'. Options: dark, light.",
                    name
                ))?,
            },
        }
        Ok(())
    }

    fn apply_theme(&mut self, theme: Theme) -> Result<()> {
        self.out.set_theme(theme);
        self.config.theme = theme;
        self.persist_config();
        self.out
            .print_system(&format!("Theme set to {}.", theme.name()))?;
        Ok(())
    }

    /// A failed write only logs; the in-session setting still applies.
    fn persist_config(&self) {
        if let Err(err) = self.config.save_to_file(&self.config_path) {
            tracing::warn!(
                "Could not persist config to {}: {:#}",
                self.config_path.display(),
                err
            );
        }
    }

    async fn show_history(&self) -> Result<()> {
        let active = self.store.active_id().await;
        let summaries = self.store.list_conversations().await;
        let title = summaries
            .iter()
            .find(|s| s.id == active)
            .map(|s| s.title.clone())
            .unwrap_or_else(|| "Conversation".to_string());
        let messages = self.store.messages(active).await?;
        self.out.print_history(&title, &messages)?;
        Ok(())
    }
}
