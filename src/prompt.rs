use async_trait::async_trait;
use clap::ValueEnum;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Decides whether an existing index should be deleted and recreated.
#[async_trait]
pub trait RecreateDecision: Send + Sync {
    async fn should_recreate(&self, index: &str) -> bool;
}

/// Only an explicit `y`/`yes` (any case) counts as consent.
pub fn is_affirmative(response: &str) -> bool {
    matches!(response.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Asks the operator on stdin, defaulting to "no".
pub struct StdinPrompt;

#[async_trait]
impl RecreateDecision for StdinPrompt {
    async fn should_recreate(&self, index: &str) -> bool {
        print!("Index \"{index}\" exists. Should delete and recreate? [n|Y] ");
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        match BufReader::new(tokio::io::stdin()).read_line(&mut line).await {
            Ok(_) => is_affirmative(&line),
            Err(e) => {
                tracing::warn!("Failed to read confirmation: {e}");
                false
            }
        }
    }
}

/// Answer supplied up front, for unattended runs.
pub struct Preset(pub bool);

#[async_trait]
impl RecreateDecision for Preset {
    async fn should_recreate(&self, _index: &str) -> bool {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RecreatePolicy {
    /// Prompt on stdin
    #[default]
    Ask,
    /// Always delete and recreate an existing index
    Yes,
    /// Always keep an existing index
    No,
}

impl RecreatePolicy {
    pub fn decision(self) -> Box<dyn RecreateDecision> {
        match self {
            Self::Ask => Box::new(StdinPrompt),
            Self::Yes => Box::new(Preset(true)),
            Self::No => Box::new(Preset(false)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_y_or_yes_is_affirmative() {
        for yes in ["y", "Y", "yes", "YES", "Yes", " y\n", "yes\r\n"] {
            assert!(is_affirmative(yes), "{yes:?}");
        }
        for no in ["", "\n", "n", "no", "yeah", "ok", "1", "true", "y es"] {
            assert!(!is_affirmative(no), "{no:?}");
        }
    }

    #[tokio::test]
    async fn preset_policies_answer_without_prompting() {
        assert!(RecreatePolicy::Yes.decision().should_recreate("tracks").await);
        assert!(!RecreatePolicy::No.decision().should_recreate("tracks").await);
    }
}
