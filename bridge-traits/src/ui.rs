//! UI Context Abstractions
//!
//! The host has a single UI-owning execution context. Work that touches UI
//! state is queued onto it through [`UiDispatcher`]; blocking prompts go
//! through [`Dialogs`]; the shell's own affordances (splash, loading
//! overlay, help button) through [`ShellChrome`].

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::error::Result;

/// A unit of work to run on the UI context
pub type UiJob = BoxFuture<'static, ()>;

/// Posts work onto the UI-owning execution context.
///
/// Jobs run one at a time, in submission order.
pub trait UiDispatcher: Send + Sync {
    fn dispatch(&self, job: UiJob) -> Result<()>;
}

/// A blocking two-way prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub title: String,
    pub message: String,
}

impl Prompt {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Answer to a retry/exit prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptChoice {
    Retry,
    Exit,
}

/// Selection from the in-game menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Help,
    Exit,
    Cancel,
}

/// Modal dialogs. Each call resolves when the user answers; none of them
/// can be dismissed without a choice.
#[async_trait]
pub trait Dialogs: Send + Sync {
    async fn retry_or_exit(&self, prompt: &Prompt) -> PromptChoice;

    async fn game_menu(&self) -> MenuChoice;

    /// `true` when the user confirms leaving
    async fn confirm_exit(&self) -> bool;

    /// Informational dialog with a single dismiss button
    async fn alert(&self, prompt: &Prompt);
}

/// Shell-owned visual affordances around the content surface
pub trait ShellChrome: Send + Sync {
    fn show_splash(&self);

    /// Splash progress indicator, 0..=100
    fn set_splash_progress(&self, percent: u8);

    fn set_loading_overlay(&self, visible: bool);

    /// Page load indicator; `None` hides it
    fn set_page_progress(&self, percent: Option<u8>);

    fn show_help_affordance(&self);
}
