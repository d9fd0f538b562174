//! Terminal rendering. All user-facing printing goes through here so the
//! theme is applied in one place.

use std::io::{self, Write};

use console::Style;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use forgemind_core::utils::time::coarse_age;
use forgemind_core::{Author, ConversationSummary, Message};

/// Color palette for the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn from_name(name: &str) -> Option<Theme> {
        match name.to_lowercase().as_str() {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn toggled(&self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

pub struct OutputHandler {
    theme: Theme,
}

impl OutputHandler {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    fn accent(&self) -> Style {
        match self.theme {
            Theme::Dark => Style::new().green().bold(),
            Theme::Light => Style::new().blue().bold(),
        }
    }

    fn muted(&self) -> Style {
        match self.theme {
            Theme::Dark => Style::new().dim(),
            Theme::Light => Style::new().black().dim(),
        }
    }

    fn frame(&self) -> Style {
        match self.theme {
            Theme::Dark => Style::new().cyan(),
            Theme::Light => Style::new().blue(),
        }
    }

    pub fn print_banner(&self) -> io::Result<()> {
        let frame = self.frame();
        println!();
        println!("{}", frame.apply_to("╔═══════════════════════════════════════╗"));
        println!("{}", frame.apply_to("║      Forge Mind - Project Plasma      ║"));
        println!("{}", frame.apply_to("╚═══════════════════════════════════════╝"));
        println!();
        io::stdout().flush()
    }

    /// A delivered reply. Blank lines around it keep it visually separate
    /// from whatever the user is typing.
    pub fn print_assistant(&self, text: &str) -> io::Result<()> {
        println!();
        println!("{} {}", self.accent().apply_to("▶ Forge Mind:"), text);
        println!();
        io::stdout().flush()
    }

    pub fn print_system(&self, text: &str) -> io::Result<()> {
        println!("{}", self.muted().apply_to(text));
        io::stdout().flush()
    }

    pub fn print_error(&self, text: &str) -> io::Result<()> {
        eprintln!("{} {}", Style::new().red().bold().apply_to("✗"), text);
        io::stderr().flush()
    }

    pub fn print_help(&self) -> io::Result<()> {
        let muted = self.muted();
        println!("{}", self.accent().apply_to("Commands:"));
        println!("  /new            {}", muted.apply_to("Start a new conversation"));
        println!("  /list           {}", muted.apply_to("List conversations"));
        println!("  /switch <n>     {}", muted.apply_to("Make conversation n the active one"));
        println!("  /mode [name]    {}", muted.apply_to("Show or set the reply mode (normal, temporary, web)"));
        println!("  /theme [name]   {}", muted.apply_to("Toggle or set the color theme (dark, light)"));
        println!("  /history        {}", muted.apply_to("Reprint the active conversation"));
        println!("  /help           {}", muted.apply_to("Show this reference"));
        println!("  /quit           {}", muted.apply_to("Leave the shell"));
        io::stdout().flush()
    }

    pub fn print_conversation_list(
        &self,
        summaries: &[ConversationSummary],
        active: Uuid,
    ) -> io::Result<()> {
        let frame = self.frame();
        println!("{}", frame.apply_to("┌─ Conversations"));
        for (position, summary) in summaries.iter().enumerate() {
            let marker = if summary.id == active {
                self.accent().apply_to("●").to_string()
            } else {
                " ".to_string()
            };
            let count = match summary.message_count {
                0 => "empty".to_string(),
                1 => "1 message".to_string(),
                n => format!("{} messages", n),
            };
            println!(
                "{} {} {}. {} {}",
                frame.apply_to("│"),
                marker,
                position + 1,
                summary.title,
                self.muted()
                    .apply_to(format!("({}, {})", count, coarse_age(summary.created_at)))
            );
        }
        println!("{}", frame.apply_to("└─"));
        io::stdout().flush()
    }

    pub fn print_history(&self, title: &str, messages: &[Message]) -> io::Result<()> {
        let frame = self.frame();
        println!("{}", frame.apply_to(format!("┌─ {}", title)));
        if messages.is_empty() {
            println!(
                "{} {}",
                frame.apply_to("│"),
                self.muted().apply_to("(no messages yet)")
            );
        }
        for message in messages {
            let stamp = self
                .muted()
                .apply_to(message.timestamp.format("[%H:%M:%S]").to_string());
            let speaker = match message.author {
                Author::User => self.muted().apply_to("You:").to_string(),
                Author::Assistant => self.accent().apply_to("Forge Mind:").to_string(),
            };
            println!(
                "{} {} {} {}",
                frame.apply_to("│"),
                stamp,
                speaker,
                message.text
            );
        }
        println!("{}", frame.apply_to("└─"));
        io::stdout().flush()
    }
}
