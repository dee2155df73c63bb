//! Confirmation prompts on the terminal.

use std::io::{self, BufRead, Write};

use async_trait::async_trait;
use importer_tracker::{
    ConfirmationAnswer, ConfirmationKind, ConfirmationLevel, ConfirmationProvider,
    ConfirmationRequest,
};

/// Asks on stderr and reads the answer from stdin.
pub struct StdinConfirm;

impl StdinConfirm {
    fn ask(request: &ConfirmationRequest) -> ConfirmationAnswer {
        let marker = match request.level {
            ConfirmationLevel::Danger => "!!",
            _ => "?",
        };
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "{} {}", marker, request.title);
        let _ = match request.kind {
            ConfirmationKind::YesNo => write!(stderr, "{} [y/N] ", request.description),
            ConfirmationKind::TypedPhrase(_) => write!(stderr, "{} ", request.description),
        };
        let _ = stderr.flush();

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).unwrap_or(0);
        let line = line.trim();

        match request.kind {
            ConfirmationKind::YesNo if matches!(line, "y" | "Y" | "yes" | "Yes") => {
                ConfirmationAnswer::Yes
            }
            ConfirmationKind::YesNo => ConfirmationAnswer::No,
            ConfirmationKind::TypedPhrase(_) => ConfirmationAnswer::Typed(line.to_string()),
        }
    }
}

#[async_trait]
impl ConfirmationProvider for StdinConfirm {
    async fn confirm(&self, request: &ConfirmationRequest) -> ConfirmationAnswer {
        let request = request.clone();
        tokio::task::spawn_blocking(move || Self::ask(&request))
            .await
            .unwrap_or(ConfirmationAnswer::No)
    }
}
