use thiserror::Error;

/// Every way a review run can fail. All of them are terminal.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("{env_var} environment variable is not set")]
    MissingCredential { env_var: String },

    #[error("diff is too large: {actual} characters exceeds the limit of {max}")]
    DiffTooLarge { actual: usize, max: usize },

    #[error("unknown model '{model}' (supported: {supported})")]
    UnknownModel { model: String, supported: String },

    #[error("{provider} request failed: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },
}

impl ReviewError {
    /// Keeps the outermost context and the root cause; the layers between
    /// mostly repeat the root cause's text.
    pub fn provider(provider: &'static str, err: anyhow::Error) -> Self {
        let outer = err.to_string();
        let root = err.root_cause().to_string();
        let message = if err.chain().count() > 1 && root != outer {
            format!("{}: {}", outer, root)
        } else {
            outer
        };
        ReviewError::Provider { provider, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_message_joins_outer_context_and_root_cause() {
        let err = anyhow::anyhow!("Connection refused (os error 111)")
            .context("error trying to connect: Connection refused (os error 111)")
            .context("Failed to send request to Gemini");

        let message = ReviewError::provider("Gemini", err).to_string();
        assert_eq!(
            message,
            "Gemini request failed: Failed to send request to Gemini: Connection refused (os error 111)"
        );
        assert_eq!(message.matches("Connection refused").count(), 1);
    }

    #[test]
    fn single_layer_error_is_kept_as_is() {
        let err = anyhow::anyhow!("OpenAI API error (401 Unauthorized): bad key");
        assert_eq!(
            ReviewError::provider("OpenAI", err).to_string(),
            "OpenAI request failed: OpenAI API error (401 Unauthorized): bad key"
        );
    }
}
