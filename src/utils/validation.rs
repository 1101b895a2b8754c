use crate::utils::error::{Result, SurvivalError};
use std::path::Path;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// CORS origin: http(s) scheme plus host, nothing after the authority.
pub fn validate_origin(field_name: &str, origin: &str) -> Result<()> {
    if origin.is_empty() {
        return Err(invalid_value(field_name, origin, "Origin cannot be empty"));
    }

    let url = Url::parse(origin).map_err(|e| {
        invalid_value(field_name, origin, &format!("Invalid URL format: {}", e))
    })?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(invalid_value(
                field_name,
                origin,
                &format!("Unsupported URL scheme: {}", scheme),
            ))
        }
    }

    if url.host_str().is_none() {
        return Err(invalid_value(field_name, origin, "Origin must include a host"));
    }

    // 瀏覽器送出的 Origin 標頭不含路徑，也沒有結尾斜線
    if origin.ends_with('/') || url.path() != "/" || url.query().is_some() {
        return Err(invalid_value(
            field_name,
            origin,
            "Origin must not contain a path, query or trailing slash",
        ));
    }

    Ok(())
}

pub fn validate_host(field_name: &str, host: &str) -> Result<()> {
    if host.trim().is_empty() {
        return Err(invalid_value(field_name, host, "Host cannot be empty"));
    }
    Ok(())
}

pub fn validate_port(field_name: &str, port: u16) -> Result<()> {
    if port == 0 {
        return Err(invalid_value(
            field_name,
            &port.to_string(),
            "Port must be between 1 and 65535",
        ));
    }
    Ok(())
}

pub fn validate_path(field_name: &str, path: &Path) -> Result<()> {
    let display = path.display().to_string();

    if path.as_os_str().is_empty() {
        return Err(invalid_value(field_name, &display, "Path cannot be empty"));
    }

    if display.contains('\0') {
        return Err(invalid_value(field_name, &display, "Path contains null bytes"));
    }

    Ok(())
}

fn invalid_value(field: &str, value: &str, reason: &str) -> SurvivalError {
    SurvivalError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
