//! Boundary validation helpers shared by the endpoint input models.

use crate::error::CoreError;

/// Maximum accepted prompt length in characters.
pub const MAX_PROMPT_CHARS: usize = 4000;

/// Validate a free-text prompt: non-blank and bounded in length.
pub fn validate_prompt(prompt: &str) -> Result<(), CoreError> {
    if prompt.trim().is_empty() {
        return Err(CoreError::Validation(
            "Prompt must not be empty".to_string(),
        ));
    }
    if prompt.chars().count() > MAX_PROMPT_CHARS {
        return Err(CoreError::Validation(format!(
            "Prompt exceeds {MAX_PROMPT_CHARS} characters"
        )));
    }
    Ok(())
}

/// Validate that an input image URL is non-empty and uses http(s).
pub fn validate_image_url(url: &str) -> Result<(), CoreError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Image URL must not be empty".to_string(),
        ));
    }
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(CoreError::Validation(format!(
            "Image URL must start with http:// or https://, got: '{trimmed}'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_prompt_accepted() {
        assert!(validate_prompt("a character in a coffee shop").is_ok());
    }

    #[test]
    fn blank_prompt_rejected() {
        assert!(validate_prompt("").is_err());
        assert!(validate_prompt("   ").is_err());
    }

    #[test]
    fn oversized_prompt_rejected() {
        assert!(validate_prompt(&"p".repeat(MAX_PROMPT_CHARS + 1)).is_err());
        assert!(validate_prompt(&"p".repeat(MAX_PROMPT_CHARS)).is_ok());
    }

    #[test]
    fn valid_urls_accepted() {
        assert!(validate_image_url("https://example.com/face.jpg").is_ok());
        assert!(validate_image_url("http://example.com/face.png").is_ok());
    }

    #[test]
    fn non_http_url_rejected() {
        assert!(validate_image_url("ftp://example.com/face.jpg").is_err());
        assert!(validate_image_url("just-a-path").is_err());
        assert!(validate_image_url("").is_err());
    }
}
