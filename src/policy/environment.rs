//! Which zone a CLI running in a given environment may upload to or
//! download from.

use axum::http::StatusCode;
use serde::Serialize;

use super::crypto::decrypt_zone;
use crate::config::ZoneConfig;
use crate::types::Zone;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Upload,
    Download,
}

impl Action {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "upload" => Some(Action::Upload),
            "download" => Some(Action::Download),
            _ => None,
        }
    }

    fn verb(self) -> &'static str {
        match self {
            Action::Upload => "upload to",
            Action::Download => "download from",
        }
    }
}

/// Zones reachable for `action` from a CLI running in `current`.
#[must_use]
pub fn permitted_zones(current: Zone, action: Action) -> &'static [Zone] {
    match (current, action) {
        (Zone::Greenroom, Action::Upload) => &[Zone::Greenroom],
        (Zone::Greenroom, Action::Download) => &[Zone::Greenroom],
        (Zone::Core, Action::Upload) => &[Zone::Greenroom, Zone::Core],
        (Zone::Core, Action::Download) => &[Zone::Core],
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvVerdict {
    #[serde(skip)]
    pub code: StatusCode,
    pub result: &'static str,
    pub error: String,
}

impl EnvVerdict {
    fn valid() -> Self {
        Self {
            code: StatusCode::OK,
            result: "valid",
            error: String::new(),
        }
    }

    fn invalid(code: StatusCode, error: impl Into<String>) -> Self {
        Self {
            code,
            result: "Invalid",
            error: error.into(),
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.code == StatusCode::OK
    }
}

/// Checks an upload/download request against the zone matrix.
///
/// `environ` is the encrypted current zone sent by the CLI; an empty value
/// means the CLI runs in the core zone.
#[must_use]
pub fn validate_env(
    zones: &ZoneConfig,
    cli_secret: &str,
    action: &str,
    zone: &str,
    environ: &str,
) -> EnvVerdict {
    let Some(target) = zones.parse(zone) else {
        return EnvVerdict::invalid(StatusCode::BAD_REQUEST, "Invalid zone");
    };

    let Some(action) = Action::parse(action) else {
        return EnvVerdict::invalid(StatusCode::BAD_REQUEST, "Invalid action");
    };

    let current = if environ.trim().is_empty() {
        Zone::Core
    } else {
        let decrypted = match decrypt_zone(environ, cli_secret) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("Failed to decrypt current zone: {e}");
                return EnvVerdict::invalid(StatusCode::BAD_REQUEST, "Invalid variable");
            }
        };
        match zones.parse(&decrypted) {
            Some(current) => current,
            None => return EnvVerdict::invalid(StatusCode::BAD_REQUEST, "Invalid variable"),
        }
    };

    if permitted_zones(current, action).contains(&target) {
        EnvVerdict::valid()
    } else {
        EnvVerdict::invalid(
            StatusCode::FORBIDDEN,
            format!(
                "Invalid action: {} {} in {}",
                action.verb(),
                zones.label(target).to_lowercase(),
                zones.label(current).to_lowercase()
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::crypto::encrypt_zone;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    fn secret() -> String {
        STANDARD.encode("cli-shared-secret")
    }

    fn environ(zone: &str) -> String {
        encrypt_zone(zone, &secret()).unwrap()
    }

    #[test]
    fn test_permitted_zones_matrix() {
        assert_eq!(
            permitted_zones(Zone::Greenroom, Action::Upload),
            &[Zone::Greenroom]
        );
        assert_eq!(
            permitted_zones(Zone::Greenroom, Action::Download),
            &[Zone::Greenroom]
        );
        assert_eq!(
            permitted_zones(Zone::Core, Action::Upload),
            &[Zone::Greenroom, Zone::Core]
        );
        assert_eq!(permitted_zones(Zone::Core, Action::Download), &[Zone::Core]);
    }

    #[test]
    fn test_upload_to_greenroom_from_greenroom() {
        let zones = ZoneConfig::default();
        let verdict = validate_env(&zones, &secret(), "upload", "greenroom", &environ("greenroom"));
        assert_eq!(verdict, EnvVerdict::valid());
    }

    #[test]
    fn test_upload_to_core_from_greenroom_forbidden() {
        let zones = ZoneConfig::default();
        let verdict = validate_env(&zones, &secret(), "upload", "vrecore", &environ("greenroom"));
        assert_eq!(verdict.code, StatusCode::FORBIDDEN);
        assert_eq!(verdict.result, "Invalid");
        assert_eq!(verdict.error, "Invalid action: upload to vrecore in greenroom");
    }

    #[test]
    fn test_download_from_greenroom_in_core_forbidden() {
        let zones = ZoneConfig::default();
        let verdict = validate_env(&zones, &secret(), "download", "greenroom", &environ("vrecore"));
        assert_eq!(verdict.code, StatusCode::FORBIDDEN);
        assert_eq!(
            verdict.error,
            "Invalid action: download from greenroom in vrecore"
        );
    }

    #[test]
    fn test_empty_environ_means_core() {
        let zones = ZoneConfig::default();
        assert!(validate_env(&zones, &secret(), "upload", "greenroom", "").is_valid());
        assert!(validate_env(&zones, &secret(), "download", "vrecore", "").is_valid());
        assert!(!validate_env(&zones, &secret(), "download", "greenroom", "").is_valid());
    }

    #[test]
    fn test_invalid_zone() {
        let zones = ZoneConfig::default();
        let verdict = validate_env(&zones, &secret(), "upload", "archive", "");
        assert_eq!(verdict.code, StatusCode::BAD_REQUEST);
        assert_eq!(verdict.error, "Invalid zone");
        assert_eq!(verdict.result, "Invalid");
    }

    #[test]
    fn test_invalid_action() {
        let zones = ZoneConfig::default();
        let verdict = validate_env(&zones, &secret(), "delete", "greenroom", "");
        assert_eq!(verdict.code, StatusCode::BAD_REQUEST);
        assert_eq!(verdict.error, "Invalid action");
    }

    #[test]
    fn test_undecryptable_environ() {
        let zones = ZoneConfig::default();
        let other = encrypt_zone("greenroom", &STANDARD.encode("other")).unwrap();
        let verdict = validate_env(&zones, &secret(), "upload", "greenroom", &other);
        assert_eq!(verdict.code, StatusCode::BAD_REQUEST);
        assert_eq!(verdict.error, "Invalid variable");
    }

    #[test]
    fn test_environ_outside_matrix() {
        let zones = ZoneConfig::default();
        let verdict = validate_env(&zones, &secret(), "upload", "greenroom", &environ("archive"));
        assert_eq!(verdict.code, StatusCode::BAD_REQUEST);
        assert_eq!(verdict.error, "Invalid variable");
    }
}
