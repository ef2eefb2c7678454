//! Swarm secret models

use super::common::{Driver, Labels, ObjectVersion};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Secret definition. `data` is the base64-encoded payload; the engine never
/// returns it on inspect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecretSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Labels>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<Driver>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templating: Option<Driver>,
}

impl SecretSpec {
    /// Spec for a new secret holding already base64-encoded data
    pub fn new(name: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            data: Some(data.into()),
            ..Default::default()
        }
    }
}

/// A secret as returned by SecretList / SecretInspect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecretInfo {
    #[serde(rename = "ID")]
    pub id: String,
    pub version: ObjectVersion,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub spec: SecretSpec,
}

impl SecretInfo {
    pub fn name(&self) -> Option<&str> {
        self.spec.name.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_secret_decodes_engine_payload() {
        let secret: SecretInfo = serde_json::from_value(json!({
            "ID": "ktnbjxoalbkvbvedmg1urrz8h",
            "Version": {"Index": 11},
            "CreatedAt": "2016-11-05T01:20:17.327670065Z",
            "UpdatedAt": "2016-11-05T01:20:17.327670065Z",
            "Spec": {
                "Name": "app-dev.crt",
                "Labels": {"foo": "bar"},
                "Driver": {"Name": "secret-bucket", "Options": {"OptionA": "value for driver option A"}}
            }
        }))
        .unwrap();

        assert_eq!(secret.id, "ktnbjxoalbkvbvedmg1urrz8h");
        assert_eq!(secret.version.index, 11);
        assert_eq!(secret.name(), Some("app-dev.crt"));
        assert_eq!(secret.spec.data, None);
        assert_eq!(secret.spec.driver.unwrap().name, "secret-bucket");
    }

    #[test]
    fn test_secret_without_version_is_rejected() {
        let result = serde_json::from_value::<SecretInfo>(json!({"ID": "s1", "Spec": {}}));
        assert!(result.is_err());
    }

    #[test]
    fn test_create_spec_serialization() {
        let spec = SecretSpec::new("s1", "VEhJUyBJUyBBIFRFU1Q=");
        assert_eq!(
            serde_json::to_value(&spec).unwrap(),
            json!({"Name": "s1", "Data": "VEhJUyBJUyBBIFRFU1Q="})
        );
    }
}
