use crate::utils::error::{EnrichError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: impl ToString, reason: impl Into<String>) -> EnrichError {
    EnrichError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Service base URLs must be absolute http(s) URLs.
pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(invalid(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(invalid(
            field_name,
            url_str,
            format!("Invalid URL format: {}", e),
        )),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }

    Ok(())
}

/// Table files are CSV or XLSX workbooks.
pub fn validate_table_extension(field_name: &str, path: &str) -> Result<()> {
    match std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(ext) if ext.eq_ignore_ascii_case("csv") || ext.eq_ignore_ascii_case("xlsx") => Ok(()),
        Some(ext) => Err(invalid(
            field_name,
            path,
            format!("Unsupported table format: .{}. Expected .csv or .xlsx", ext),
        )),
        None => Err(invalid(
            field_name,
            path,
            "File has no extension; expected .csv or .xlsx",
        )),
    }
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
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
        return Err(invalid(
            field_name,
            value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("places.endpoint", "https://maps.googleapis.com").is_ok());
        assert!(validate_url("places.endpoint", "http://127.0.0.1:8080/api").is_ok());
        assert!(validate_url("places.endpoint", "").is_err());
        assert!(validate_url("places.endpoint", "maps.googleapis.com").is_err());
        assert!(validate_url("places.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_table_extension() {
        assert!(validate_table_extension("input", "input_businesses.csv").is_ok());
        assert!(validate_table_extension("input", "data/INPUT.CSV").is_ok());
        assert!(validate_table_extension("input", "input_businesses.xlsx").is_ok());
        assert!(validate_table_extension("input", "input_businesses.xls").is_err());
        assert!(validate_table_extension("input", "input").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("generator.temperature", 0.7, 0.0, 2.0).is_ok());
        assert!(validate_range("generator.temperature", 2.5, 0.0, 2.0).is_err());
        assert!(validate_positive_number("run.checkpoint_every", 0, 1).is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("generator.model", "  ").is_err());
        assert!(validate_non_empty_string("generator.model", "gemini-2.0-flash").is_ok());
    }
}
