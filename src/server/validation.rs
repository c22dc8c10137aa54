use crate::config::ZoneConfig;
use crate::server::response::ApiError;
use crate::types::Zone;

const GENERATE_ID_PREFIX_LEN: usize = 3;
const GENERATE_ID_DIGITS: usize = 4;

/// Checks the `AAA-0000` shape of a generate/DICOM id.
#[must_use]
pub fn is_valid_generate_id(id: &str) -> bool {
    let Some((prefix, digits)) = id.split_once('-') else {
        return false;
    };
    prefix.len() == GENERATE_ID_PREFIX_LEN
        && prefix.chars().all(|c| c.is_ascii_uppercase())
        && digits.len() == GENERATE_ID_DIGITS
        && digits.chars().all(|c| c.is_ascii_digit())
}

pub fn parse_zone(zones: &ZoneConfig, zone: &str) -> Result<Zone, ApiError> {
    zones
        .parse(zone)
        .ok_or_else(|| ApiError::bad_request("Invalid zone"))
}

/// Zone and data type checks for a pre-upload request.
pub fn validate_upload(zones: &ZoneConfig, zone: &str, data_type: &str) -> Result<Zone, ApiError> {
    let zone = zones
        .parse(zone)
        .ok_or_else(|| ApiError::bad_request("Invalid Zone"))?;
    if !matches!(data_type, "raw" | "processed") {
        return Err(ApiError::bad_request("Invalid Type"));
    }
    Ok(zone)
}

/// Parent of a file listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    Container,
    Folder,
}

impl SourceType {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SourceType::Container => "Container",
            SourceType::Folder => "Folder",
        }
    }
}

pub fn validate_list_request(source_type: &str, folder: &str) -> Result<SourceType, ApiError> {
    match source_type {
        "Container" => Ok(SourceType::Container),
        "Folder" if folder.trim_matches('/').is_empty() => {
            Err(ApiError::bad_request("missing folder name"))
        }
        "Folder" => Ok(SourceType::Folder),
        _ => Err(ApiError::bad_request("Invalid source type")),
    }
}

/// Required, non-empty manifest field.
pub fn require_field<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, ApiError> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("Missing Info {name}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_generate_id() {
        assert!(is_valid_generate_id("ABC-1234"));
        assert!(!is_valid_generate_id("abc-1234"));
        assert!(!is_valid_generate_id("ABCD-1234"));
        assert!(!is_valid_generate_id("ABC-123"));
        assert!(!is_valid_generate_id("ABC-12a4"));
        assert!(!is_valid_generate_id("ABC1234"));
        assert!(!is_valid_generate_id(""));
    }

    #[test]
    fn test_validate_upload() {
        let zones = ZoneConfig::default();
        assert_eq!(validate_upload(&zones, "greenroom", "raw").unwrap(), Zone::Greenroom);
        assert_eq!(validate_upload(&zones, "vrecore", "processed").unwrap(), Zone::Core);

        let err = validate_upload(&zones, "archive", "raw").unwrap_err();
        assert_eq!(err.message, "Invalid Zone");
        let err = validate_upload(&zones, "greenroom", "other").unwrap_err();
        assert_eq!(err.message, "Invalid Type");
    }

    #[test]
    fn test_validate_list_request() {
        assert_eq!(
            validate_list_request("Container", "").unwrap(),
            SourceType::Container
        );
        assert_eq!(
            validate_list_request("Folder", "jdoe").unwrap(),
            SourceType::Folder
        );
        let err = validate_list_request("Folder", "").unwrap_err();
        assert_eq!(err.message, "missing folder name");
        let err = validate_list_request("Dataset", "x").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Invalid source type");
    }

    #[test]
    fn test_require_field() {
        assert_eq!(require_field(&Some("x".into()), "zone").unwrap(), "x");
        let err = require_field(&Some(String::new()), "zone").unwrap_err();
        assert_eq!(err.message, "Missing Info zone");
        assert!(require_field(&None, "file_name").is_err());
    }
}
