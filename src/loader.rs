//! JSON loading from files, strings and HTTP URLs.
//!
//! Used for both declarative schema definitions and the objects to serialize.

use std::path::Path;

use serde_json::Value;

use crate::definition::SchemaDefinition;
use crate::error::LoadError;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Load a JSON document from a file path.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// or `LoadError::InvalidJson` if the file isn't valid JSON.
pub fn load_json(path: &Path) -> Result<Value, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    load_json_str(&content)
}

/// Load a JSON document from a string.
///
/// # Errors
///
/// Returns `LoadError::InvalidJson` if the string isn't valid JSON.
pub fn load_json_str(content: &str) -> Result<Value, LoadError> {
    serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })
}

/// Load a JSON document from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
///
/// # Errors
///
/// Returns `LoadError::NetworkError` if the request fails or the response
/// isn't valid JSON.
#[cfg(feature = "remote")]
pub fn load_json_url(url: &str) -> Result<Value, LoadError> {
    let network = |source| LoadError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network)?;

    tracing::debug!(url, "fetching JSON document");
    client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.json())
        .map_err(network)
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Load a JSON document from a file path or URL.
///
/// # Errors
///
/// As [`load_json`] or [`load_json_url`]. Without the `remote` feature a URL
/// is reported as `LoadError::FileNotFound`.
pub fn load_json_auto(source: &str) -> Result<Value, LoadError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_json_url(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(LoadError::FileNotFound {
                path: std::path::PathBuf::from(source),
            })
        }
    } else {
        load_json(Path::new(source))
    }
}

/// Load and parse a declarative definition from a file path or URL.
///
/// # Errors
///
/// As [`load_json_auto`] and [`SchemaDefinition::from_json`].
pub fn load_definition(source: &str) -> Result<SchemaDefinition, LoadError> {
    let value = load_json_auto(source)?;
    SchemaDefinition::from_json(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn load_json_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"type": "objs"}}"#).unwrap();

        let value = load_json(file.path()).unwrap();
        assert_eq!(value["type"], "objs");
    }

    #[test]
    fn load_json_file_not_found() {
        let result = load_json(Path::new("/nonexistent/path.json"));
        assert!(matches!(result, Err(LoadError::FileNotFound { .. })));
    }

    #[test]
    fn load_json_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let result = load_json(file.path());
        assert!(matches!(result, Err(LoadError::InvalidJson { .. })));
    }

    #[test]
    fn load_json_str_invalid() {
        let result = load_json_str("not json");
        assert!(matches!(result, Err(LoadError::InvalidJson { .. })));
    }

    #[test]
    fn is_url_schemes() {
        assert!(is_url("https://example.com/schema.json"));
        assert!(is_url("http://example.com/schema.json"));
        assert!(!is_url("/path/to/schema.json"));
        assert!(!is_url("schema.json"));
    }

    #[test]
    fn load_definition_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"type": "objs", "id": "ID"}}"#).unwrap();

        let definition = load_definition(file.path().to_str().unwrap()).unwrap();
        assert_eq!(definition.kind.as_deref(), Some("objs"));
        assert_eq!(definition.id.unwrap().field_name(), Some("ID"));
    }

    #[test]
    fn load_definition_null_is_missing() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "null").unwrap();

        let result = load_definition(file.path().to_str().unwrap());
        assert!(matches!(result, Err(LoadError::Configuration(_))));
    }

    #[cfg(feature = "remote")]
    mod remote {
        use super::*;

        #[test]
        fn load_json_url_valid() {
            let mut server = mockito::Server::new();
            let mock = server
                .mock("GET", "/schemas/articles.json")
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(r#"{"type": "articles"}"#)
                .create();

            let url = format!("{}/schemas/articles.json", server.url());
            let value = load_json_auto(&url).unwrap();
            assert_eq!(value["type"], "articles");
            mock.assert();
        }

        #[test]
        fn load_json_url_404() {
            let mut server = mockito::Server::new();
            let _mock = server.mock("GET", "/missing.json").with_status(404).create();

            let url = format!("{}/missing.json", server.url());
            let result = load_json_url(&url);
            assert!(matches!(result, Err(LoadError::NetworkError { .. })));
        }

        #[test]
        fn load_json_url_invalid_body() {
            let mut server = mockito::Server::new();
            let _mock = server
                .mock("GET", "/broken.json")
                .with_status(200)
                .with_body("not json")
                .create();

            let url = format!("{}/broken.json", server.url());
            let result = load_json_url(&url);
            assert!(matches!(result, Err(LoadError::NetworkError { .. })));
        }
    }
}
