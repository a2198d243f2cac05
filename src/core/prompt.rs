use serde::{Deserialize, Serialize};

pub const DEFAULT_SYSTEM_PROMPT: &str = r#"Review the following Git diff as an experienced code reviewer.
Comment on the changes with attention to:
- Readability and maintainability
- Bugs and security risks
- Performance impact
- Design problems
- Any other improvements

Only report issues you actually find in the diff. If nothing needs attention, say so briefly."#;

/// The instruction sent as the system message to every provider.
///
/// Built once from configuration and handed to each adapter, so all
/// providers review with the same wording.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewPrompt {
    pub system_prompt: String,
}

impl Default for ReviewPrompt {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl ReviewPrompt {
    pub fn new(custom: Option<&str>) -> Self {
        match custom {
            Some(prompt) if !prompt.trim().is_empty() => Self {
                system_prompt: prompt.to_string(),
            },
            _ => Self::default(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.system_prompt
    }
}
