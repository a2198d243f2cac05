use crate::error::ReviewError;

/// Reads an API key from the process environment.
///
/// An unset or empty variable is reported as missing, so callers never
/// reach the network without a key.
pub fn resolve(env_var: &str) -> Result<String, ReviewError> {
    match std::env::var(env_var) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ReviewError::MissingCredential {
            env_var: env_var.to_string(),
        }),
    }
}
