//! Terminal Dialogs and Chrome
//!
//! Modal prompts read their answer from standard input on a blocking
//! thread. Closed input resolves every prompt to its leaving choice so a
//! detached shell never hangs on a dialog.

use async_trait::async_trait;
use bridge_traits::ui::{Dialogs, MenuChoice, Prompt, PromptChoice, ShellChrome};
use std::io::{BufRead, Write};
use tracing::{debug, info, warn};

/// Dialogs rendered on the controlling terminal
#[derive(Debug, Default, Clone)]
pub struct TerminalDialogs;

impl TerminalDialogs {
    pub fn new() -> Self {
        Self
    }

    /// Print `text` and read one trimmed, lowercased line; `None` on EOF.
    async fn ask(text: String) -> Option<String> {
        let answer = tokio::task::spawn_blocking(move || {
            let mut stderr = std::io::stderr();
            let _ = write!(stderr, "{}", text);
            let _ = stderr.flush();

            let mut line = String::new();
            match std::io::stdin().lock().read_line(&mut line) {
                Ok(0) | Err(_) => None,
                Ok(_) => Some(line.trim().to_lowercase()),
            }
        })
        .await;

        match answer {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "Dialog input task failed");
                None
            }
        }
    }
}

#[async_trait]
impl Dialogs for TerminalDialogs {
    async fn retry_or_exit(&self, prompt: &Prompt) -> PromptChoice {
        let text = format!(
            "\n== {} ==\n{}\n[r]etry / [e]xit: ",
            prompt.title, prompt.message
        );
        loop {
            match Self::ask(text.clone()).await.as_deref() {
                Some("r") | Some("retry") => return PromptChoice::Retry,
                Some("e") | Some("exit") | None => return PromptChoice::Exit,
                Some(_) => continue,
            }
        }
    }

    async fn game_menu(&self) -> MenuChoice {
        let text = "\n== Menu ==\n[1] Tutorial & Help\n[2] Exit\n[enter] Cancel: ".to_string();
        match Self::ask(text).await.as_deref() {
            Some("1") => MenuChoice::Help,
            Some("2") | None => MenuChoice::Exit,
            Some(_) => MenuChoice::Cancel,
        }
    }

    async fn confirm_exit(&self) -> bool {
        let text = "\n== Exit Game ==\nAre you sure you want to exit the game?\n[y]es / [n]o: "
            .to_string();
        !matches!(Self::ask(text).await.as_deref(), Some("n") | Some("no"))
    }

    async fn alert(&self, prompt: &Prompt) {
        let text = format!("\n== {} ==\n{}\n[enter] OK: ", prompt.title, prompt.message);
        let _ = Self::ask(text).await;
    }
}

/// Shell chrome reported through `tracing`
#[derive(Debug, Default, Clone)]
pub struct TracingChrome;

impl ShellChrome for TracingChrome {
    fn show_splash(&self) {
        info!("Splash shown");
    }

    fn set_splash_progress(&self, percent: u8) {
        debug!(percent, "Splash progress");
    }

    fn set_loading_overlay(&self, visible: bool) {
        debug!(visible, "Loading overlay");
    }

    fn set_page_progress(&self, percent: Option<u8>) {
        debug!(?percent, "Page progress");
    }

    fn show_help_affordance(&self) {
        info!("Help affordance shown");
    }
}
