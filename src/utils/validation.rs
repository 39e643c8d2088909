use crate::utils::error::{FillTripError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(FillTripError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(FillTripError::InvalidConfigValue {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(FillTripError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(FillTripError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(FillTripError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Rejects a blank user-entered field.
pub fn validate_entry_text(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(FillTripError::InvalidEntry {
            field: field_name.to_string(),
            reason: "cannot be empty".to_string(),
        });
    }
    Ok(())
}

/// Rejects a user-entered amount that is not a finite number above zero.
pub fn validate_entry_amount(field_name: &str, value: f64) -> Result<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(FillTripError::InvalidEntry {
            field: field_name.to_string(),
            reason: format!("must be a positive number, got {}", value),
        });
    }
    Ok(())
}

/// Parses a user-entered amount. `None` unless the text is a finite number above zero.
pub fn parse_positive(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("persistence.base_url", "https://example.com").is_ok());
        assert!(validate_url("persistence.base_url", "http://localhost/filltrip-db").is_ok());
        assert!(validate_url("persistence.base_url", "").is_err());
        assert!(validate_url("persistence.base_url", "invalid-url").is_err());
        assert!(validate_url("persistence.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("matcher.max_results", 10, 1).is_ok());
        assert!(validate_positive_number("matcher.max_results", 0, 1).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("persistence.timeout_seconds", 10, 1, 300).is_ok());
        assert!(validate_range("persistence.timeout_seconds", 0, 1, 300).is_err());
    }

    #[test]
    fn test_parse_positive() {
        assert_eq!(parse_positive(" 150 "), Some(150.0));
        assert_eq!(parse_positive("12.5"), Some(12.5));
        assert_eq!(parse_positive("0"), None);
        assert_eq!(parse_positive("-3"), None);
        assert_eq!(parse_positive(""), None);
        assert_eq!(parse_positive("abc"), None);
        assert_eq!(parse_positive("inf"), None);
        assert_eq!(parse_positive("NaN"), None);
    }
}
