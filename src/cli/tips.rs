//! Suno tips command.

use anyhow::{bail, Result};
use clap::Parser;

use crate::ai::AiError;
use crate::cli::{provider_failure, GlobalArgs, Session};
use crate::utils::check_ai_credentials;

/// Tips command options.
#[derive(Parser)]
pub struct TipsCommand {
    /// What to ask about, e.g. "choir outro tags".
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,
}

impl TipsCommand {
    /// Executes the tips command.
    pub async fn execute(self, global: &GlobalArgs) -> Result<()> {
        let query = self.query.join(" ");
        if query.trim().is_empty() {
            bail!("Query must not be empty");
        }
        let session = Session::open(global)?;
        check_ai_credentials(&session.settings)?;

        if !session.provider().supports_web_search() {
            eprintln!(
                "Note: {} has no live web search; answers come from the model's own knowledge and may be outdated.",
                session.provider()
            );
        }

        match session.writer.search_tips(&session.settings, &query).await {
            Ok(answer) => println!("{answer}"),
            Err(AiError::EmptyResponse { .. }) => println!("No results found."),
            Err(e) => return Err(provider_failure(session.provider())(e)),
        }
        Ok(())
    }
}
