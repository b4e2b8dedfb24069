use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Versions, regions and node sizes available for Kubernetes clusters.
///
/// Fields are passed through exactly as received: an absent field stays
/// absent and an explicit `null` stays `null`. Unknown top-level fields are
/// kept in `other`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct KubernetesOptions {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub versions: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub regions: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub sizes: Option<Value>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Engines, versions and layouts available for managed databases.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct DatabaseOptions {
    /// Per-engine options, keyed by engine name (`pg`, `mysql`, `redis`, ...).
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub version_availability: Option<Value>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Keeps an explicit `null` as `Some(Value::Null)`; only a missing field is `None`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn round_trip<T: serde::de::DeserializeOwned + Serialize>(raw: &Value) -> Value {
        let typed: T = serde_json::from_value(raw.clone()).unwrap();
        serde_json::to_value(&typed).unwrap()
    }

    #[test]
    fn test_kubernetes_options_pass_through() {
        for raw in [
            json!({"versions": [{"slug": "1.29.1-do.0"}]}),
            json!({"versions": null, "regions": [], "sizes": null}),
            json!({}),
            json!({"regions": [{"slug": "nyc1"}], "max_nodes": 100}),
        ] {
            assert_eq!(round_trip::<KubernetesOptions>(&raw), raw);
        }
    }

    #[test]
    fn test_kubernetes_options_null_is_kept() {
        let options: KubernetesOptions =
            serde_json::from_value(json!({"versions": null})).unwrap();
        assert_eq!(options.versions, Some(Value::Null));
        assert_eq!(options.regions, None);
    }

    #[test]
    fn test_database_options_pass_through() {
        for raw in [
            json!({"options": {"pg": {"versions": ["16"]}}}),
            json!({"options": {"pg": {}}, "version_availability": null}),
            json!({"version_availability": {"pg": []}, "engines_beta": ["valkey"]}),
            json!({}),
        ] {
            assert_eq!(round_trip::<DatabaseOptions>(&raw), raw);
        }
    }
}
