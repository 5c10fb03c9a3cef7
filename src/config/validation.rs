//! Syntactic validation of request configurations and extra headers

use crate::{
    error::{AppError, Result},
    limits::{HEADER_MAX_LEN, HEADER_MIN_LEN, MAX_SAMPLES, URL_MAX_LEN, URL_MIN_LEN},
    models::RequestConfig,
};

/// Check a request configuration before any transport interaction.
///
/// The repeat count is checked first, then the URL. The URL is only checked for
/// presence and byte length; scheme and syntax problems surface later as
/// transport errors.
pub fn validate_request(config: &RequestConfig) -> Result<()> {
    let count = config.repeat_count as usize;
    if count == 0 || count > MAX_SAMPLES {
        return Err(AppError::invalid_request_count(format!(
            "requested number of HTTP requests ({}) must be in range [1:{}]",
            config.repeat_count, MAX_SAMPLES
        )));
    }

    let url_len = config.target_url.len();
    if config.target_url.is_empty() {
        return Err(AppError::invalid_url("URL is empty"));
    }
    if !(URL_MIN_LEN..=URL_MAX_LEN).contains(&url_len) {
        return Err(AppError::invalid_url(format!(
            "URL '{}' has length {} outside [{}:{}]",
            config.target_url, url_len, URL_MIN_LEN, URL_MAX_LEN
        )));
    }

    Ok(())
}

/// Check an extra header. `None` stands for an absent header.
///
/// A colon anywhere in the text satisfies the separator rule; name and value
/// may be empty.
pub fn validate_header(text: Option<&str>) -> Result<()> {
    let text = match text {
        Some(text) if !text.is_empty() => text,
        Some(_) => return Err(AppError::invalid_header("header is empty")),
        None => return Err(AppError::invalid_header("header is missing")),
    };

    if !(HEADER_MIN_LEN..=HEADER_MAX_LEN).contains(&text.len()) {
        return Err(AppError::invalid_header(format!(
            "header '{}' has length {} outside [{}:{}]",
            text,
            text.len(),
            HEADER_MIN_LEN,
            HEADER_MAX_LEN
        )));
    }

    if !text.contains(':') {
        return Err(AppError::invalid_header(format!("missing ':' in '{}'", text)));
    }

    Ok(())
}
