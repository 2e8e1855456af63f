//! Config - 環境変数からの設定読み込み
//!
//! 起動時に 1 度だけ読みます。不正な値は起動失敗（fail-fast）。
//! テストでは環境変数を書き換えずに済むよう、lookup 関数を渡せる `from_lookup` を使います。

use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";
pub const DEFAULT_COLLECTION: &str = "processed_files";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: `{value}` ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectBackend {
    Gcs,
    Local { root: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentBackend {
    Fs { root: PathBuf },
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen: SocketAddr,
    pub object_backend: ObjectBackend,
    pub document_backend: DocumentBackend,
    pub collection: String,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        // Cloud Run 形式の PORT だけが与えられた場合も受け付ける
        let listen_raw = match (lookup("INTAKE_LISTEN"), lookup("PORT")) {
            (Some(listen), _) if !listen.trim().is_empty() => listen,
            (_, Some(port)) if !port.trim().is_empty() => format!("0.0.0.0:{}", port.trim()),
            _ => DEFAULT_LISTEN.to_string(),
        };
        let listen = listen_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: "INTAKE_LISTEN",
                value: listen_raw.clone(),
                reason: e.to_string(),
            })?;

        let object_backend = match get("INTAKE_OBJECT_BACKEND", "gcs").as_str() {
            "gcs" => ObjectBackend::Gcs,
            "local" => ObjectBackend::Local {
                root: PathBuf::from(get("INTAKE_LOCAL_ROOT", "./data/objects")),
            },
            other => {
                return Err(ConfigError::Invalid {
                    key: "INTAKE_OBJECT_BACKEND",
                    value: other.to_string(),
                    reason: "expected gcs or local".to_string(),
                });
            }
        };

        let document_backend = match get("INTAKE_DOCUMENT_BACKEND", "fs").as_str() {
            "fs" => DocumentBackend::Fs {
                root: PathBuf::from(get("INTAKE_DOCUMENT_ROOT", "./data/documents")),
            },
            "memory" => DocumentBackend::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    key: "INTAKE_DOCUMENT_BACKEND",
                    value: other.to_string(),
                    reason: "expected fs or memory".to_string(),
                });
            }
        };

        let collection = get("INTAKE_COLLECTION", DEFAULT_COLLECTION);
        if collection.contains(['/', '\\']) || collection == "." || collection == ".." {
            return Err(ConfigError::Invalid {
                key: "INTAKE_COLLECTION",
                value: collection,
                reason: "must be a single path segment".to_string(),
            });
        }

        let log_format = match get("INTAKE_LOG_FORMAT", "text").as_str() {
            "text" => LogFormat::Text,
            "json" => LogFormat::Json,
            other => {
                return Err(ConfigError::Invalid {
                    key: "INTAKE_LOG_FORMAT",
                    value: other.to_string(),
                    reason: "expected text or json".to_string(),
                });
            }
        };

        Ok(Self {
            listen,
            object_backend,
            document_backend,
            collection,
            log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.listen, DEFAULT_LISTEN.parse().unwrap());
        assert_eq!(config.object_backend, ObjectBackend::Gcs);
        assert_eq!(
            config.document_backend,
            DocumentBackend::Fs {
                root: PathBuf::from("./data/documents")
            }
        );
        assert_eq!(config.collection, "processed_files");
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn port_alone_binds_all_interfaces() {
        let config = load(&[("PORT", "9000")]).unwrap();
        assert_eq!(config.listen, "0.0.0.0:9000".parse().unwrap());
    }

    #[test]
    fn explicit_listen_wins_over_port() {
        let config = load(&[("INTAKE_LISTEN", "127.0.0.1:7000"), ("PORT", "9000")]).unwrap();
        assert_eq!(config.listen, "127.0.0.1:7000".parse().unwrap());
    }

    #[test]
    fn local_backends() {
        let config = load(&[
            ("INTAKE_OBJECT_BACKEND", "local"),
            ("INTAKE_LOCAL_ROOT", "/srv/objects"),
            ("INTAKE_DOCUMENT_BACKEND", "memory"),
            ("INTAKE_LOG_FORMAT", "json"),
        ])
        .unwrap();
        assert_eq!(
            config.object_backend,
            ObjectBackend::Local {
                root: PathBuf::from("/srv/objects")
            }
        );
        assert_eq!(config.document_backend, DocumentBackend::Memory);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[rstest]
    #[case::listen("INTAKE_LISTEN", "not-an-addr")]
    #[case::port("PORT", "eighty")]
    #[case::object_backend("INTAKE_OBJECT_BACKEND", "s3")]
    #[case::memory_objects("INTAKE_OBJECT_BACKEND", "memory")]
    #[case::document_backend("INTAKE_DOCUMENT_BACKEND", "firestore")]
    #[case::collection("INTAKE_COLLECTION", "a/b")]
    #[case::log_format("INTAKE_LOG_FORMAT", "xml")]
    fn invalid_values_fail_fast(#[case] key: &str, #[case] value: &str) {
        assert!(matches!(
            load(&[(key, value)]),
            Err(ConfigError::Invalid { .. })
        ));
    }
}
