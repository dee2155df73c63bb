//! Confirmation of destructive actions.
//!
//! Deletions ask a caller-supplied [`ConfirmationProvider`] before touching
//! the server. The CLI prompts on stdin; tests use [`AutoConfirm`].

use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Phrase that must be typed to delete every product.
pub const DELETE_ALL_PHRASE: &str = "DELETE ALL";

/// Confirmation level for actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationLevel {
    /// Informational (no danger)
    Info,
    /// Warning (some risk)
    Warning,
    /// Danger (high risk, destructive)
    Danger,
}

/// How the user must answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationKind {
    /// A plain yes/no question
    YesNo,
    /// The user must type this exact phrase
    TypedPhrase(&'static str),
}

/// A pending confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRequest {
    pub title: String,
    /// Description of what will happen.
    pub description: String,
    pub level: ConfirmationLevel,
    pub kind: ConfirmationKind,
    pub reversible: bool,
}

impl ConfirmationRequest {
    /// Yes/no question for deleting one record.
    pub fn delete_one(what: &str) -> Self {
        Self {
            title: format!("Delete {}", what),
            description: format!("Are you sure you want to delete this {}?", what),
            level: ConfirmationLevel::Warning,
            kind: ConfirmationKind::YesNo,
            reversible: false,
        }
    }

    /// Typed-phrase prompt for wiping the whole catalog.
    pub fn delete_all_products() -> Self {
        Self {
            title: "Delete all products".to_string(),
            description: format!(
                "This will delete ALL products permanently. Type \"{}\" to confirm:",
                DELETE_ALL_PHRASE
            ),
            level: ConfirmationLevel::Danger,
            kind: ConfirmationKind::TypedPhrase(DELETE_ALL_PHRASE),
            reversible: false,
        }
    }

    /// Returns true if `answer` confirms this request.
    ///
    /// Typed phrases must match exactly, case included.
    pub fn is_confirmed_by(&self, answer: &ConfirmationAnswer) -> bool {
        match (&self.kind, answer) {
            (ConfirmationKind::YesNo, ConfirmationAnswer::Yes) => true,
            (ConfirmationKind::TypedPhrase(phrase), ConfirmationAnswer::Typed(text)) => {
                text == phrase
            }
            _ => false,
        }
    }
}

/// What the user answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationAnswer {
    Yes,
    No,
    Typed(String),
}

/// Asks the user to confirm an action.
#[async_trait]
pub trait ConfirmationProvider: Send + Sync {
    async fn confirm(&self, request: &ConfirmationRequest) -> ConfirmationAnswer;
}

/// Answers every confirmation without asking.
#[derive(Debug, Default)]
pub struct AutoConfirm {
    policy: AutoPolicy,
    asked: Mutex<Vec<ConfirmationRequest>>,
}

#[derive(Debug, Clone, Default)]
enum AutoPolicy {
    /// Yes to yes/no questions, the expected phrase to typed prompts
    AcceptAll,
    #[default]
    DeclineAll,
    Fixed(ConfirmationAnswer),
}

impl AutoConfirm {
    pub fn accept_all() -> Self {
        Self::with_policy(AutoPolicy::AcceptAll)
    }

    pub fn decline_all() -> Self {
        Self::with_policy(AutoPolicy::DeclineAll)
    }

    /// Give the same answer to every request.
    pub fn answering(answer: ConfirmationAnswer) -> Self {
        Self::with_policy(AutoPolicy::Fixed(answer))
    }

    fn with_policy(policy: AutoPolicy) -> Self {
        Self {
            policy,
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Requests seen so far.
    pub fn asked(&self) -> Vec<ConfirmationRequest> {
        self.asked.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl ConfirmationProvider for AutoConfirm {
    async fn confirm(&self, request: &ConfirmationRequest) -> ConfirmationAnswer {
        self.asked
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        match &self.policy {
            AutoPolicy::AcceptAll => match request.kind {
                ConfirmationKind::YesNo => ConfirmationAnswer::Yes,
                ConfirmationKind::TypedPhrase(phrase) => ConfirmationAnswer::Typed(phrase.to_string()),
            },
            AutoPolicy::DeclineAll => ConfirmationAnswer::No,
            AutoPolicy::Fixed(answer) => answer.clone(),
        }
    }
}
