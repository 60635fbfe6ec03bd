//! Per-invocation options for the `process` action

use crate::error::{Error, Result};
use crate::format::{FormatTag, validate_formats};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A database connection parameter understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionKey {
    /// Database type (`postgres`, `mysql`, `csv`, `json`, ...)
    Driver,
    /// Database user
    Username,
    /// Database password
    Password,
    /// Database host
    Host,
    /// Database name
    Database,
    /// Database port
    Port,
    /// JDBC driver class
    JdbcDriver,
    /// Full JDBC url
    JdbcUrl,
    /// Directory holding JDBC driver jars
    JdbcDir,
    /// Oracle SID
    DbSid,
    /// XPath for XML data sources
    XmlXpath,
    /// Data file for file based data sources
    DataFile,
    /// Query for JSON data sources
    JsonQuery,
}

/// Connection key to engine flag, in the engine's documented order
const CONNECTION_FLAGS: [(ConnectionKey, &str, &str); 13] = [
    (ConnectionKey::Driver, "driver", "-t"),
    (ConnectionKey::Username, "username", "-u"),
    (ConnectionKey::Password, "password", "-p"),
    (ConnectionKey::Host, "host", "-H"),
    (ConnectionKey::Database, "database", "-n"),
    (ConnectionKey::Port, "port", "--db-port"),
    (ConnectionKey::JdbcDriver, "jdbc_driver", "--db-driver"),
    (ConnectionKey::JdbcUrl, "jdbc_url", "--db-url"),
    (ConnectionKey::JdbcDir, "jdbc_dir", "--jdbc-dir"),
    (ConnectionKey::DbSid, "db_sid", "-db-sid"),
    (ConnectionKey::XmlXpath, "xml_xpath", "--xml-xpath"),
    (ConnectionKey::DataFile, "data_file", "--data-file"),
    (ConnectionKey::JsonQuery, "json_query", "--json-query"),
];

impl ConnectionKey {
    /// Every connection key, in table order
    pub fn all() -> impl Iterator<Item = ConnectionKey> {
        CONNECTION_FLAGS.iter().map(|(key, _, _)| *key)
    }

    fn entry(&self) -> &'static (ConnectionKey, &'static str, &'static str) {
        // Table rows follow variant declaration order
        &CONNECTION_FLAGS[*self as usize]
    }

    /// The key's name in option maps
    pub fn as_str(&self) -> &'static str {
        self.entry().1
    }

    /// The engine flag this key maps to
    pub fn flag(&self) -> &'static str {
        self.entry().2
    }
}

impl fmt::Display for ConnectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        CONNECTION_FLAGS
            .iter()
            .find(|(_, name, _)| *name == s)
            .map(|(key, _, _)| *key)
            .ok_or_else(|| Error::InvalidConnectionKey { key: s.to_string() })
    }
}

/// Untyped process options as a caller or config file supplies them.
///
/// Every field is optional; missing fields take the built-in defaults when
/// [`ProcessOptions::resolve`] turns them into an [`OptionSet`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessOptions {
    /// Requested output formats
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Vec<String>>,
    /// Template parameter overrides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<IndexMap<String, String>>,
    /// Report locale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// Database connection parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_connection: Option<IndexMap<String, String>>,
}

impl ProcessOptions {
    /// Fill missing fields from `defaults`.
    ///
    /// Fields set here always win. Params merge per key, with entries from `self`
    /// overriding entries of the same name in `defaults`.
    pub fn with_defaults(self, defaults: &ProcessOptions) -> ProcessOptions {
        let params = match (self.params, &defaults.params) {
            (Some(own), Some(base)) => {
                let mut merged = base.clone();
                merged.extend(own);
                Some(merged)
            }
            (own, base) => own.or_else(|| base.clone()),
        };

        ProcessOptions {
            format: self.format.or_else(|| defaults.format.clone()),
            params,
            locale: self.locale.or_else(|| defaults.locale.clone()),
            db_connection: self.db_connection.or_else(|| defaults.db_connection.clone()),
        }
    }

    /// Apply built-in defaults and validate into an [`OptionSet`]
    pub fn resolve(&self) -> Result<OptionSet> {
        let formats = match &self.format {
            Some(formats) => validate_formats(formats)?,
            None => IndexSet::from([FormatTag::Pdf]),
        };

        let mut db_connection = IndexMap::new();
        for (key, value) in self.db_connection.iter().flatten() {
            db_connection.insert(key.parse::<ConnectionKey>()?, value.clone());
        }

        Ok(OptionSet {
            formats,
            locale: self.locale.clone(),
            params: self.params.clone().unwrap_or_default(),
            db_connection,
        })
    }
}

/// Validated options for one `process` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSet {
    formats: IndexSet<FormatTag>,
    locale: Option<String>,
    params: IndexMap<String, String>,
    db_connection: IndexMap<ConnectionKey, String>,
}

impl Default for OptionSet {
    fn default() -> Self {
        Self {
            formats: IndexSet::from([FormatTag::Pdf]),
            locale: None,
            params: IndexMap::new(),
            db_connection: IndexMap::new(),
        }
    }
}

impl OptionSet {
    /// Options with every default applied (`pdf`, no locale, no params, no connection)
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the output formats. An empty iterator leaves the current formats in place.
    pub fn formats<I: IntoIterator<Item = FormatTag>>(mut self, formats: I) -> Self {
        let formats: IndexSet<FormatTag> = formats.into_iter().collect();
        if !formats.is_empty() {
            self.formats = formats;
        }
        self
    }

    /// Set the report locale
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Add a template parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Add a database connection parameter
    pub fn connection(mut self, key: ConnectionKey, value: impl Into<String>) -> Self {
        self.db_connection.insert(key, value.into());
        self
    }

    /// Requested output formats, in request order
    pub fn get_formats(&self) -> &IndexSet<FormatTag> {
        &self.formats
    }

    /// Report locale, if any
    pub fn get_locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    /// Template parameters, in insertion order
    pub fn get_params(&self) -> &IndexMap<String, String> {
        &self.params
    }

    /// Database connection parameters, in insertion order
    pub fn get_db_connection(&self) -> &IndexMap<ConnectionKey, String> {
        &self.db_connection
    }
}

impl TryFrom<&ProcessOptions> for OptionSet {
    type Error = Error;

    fn try_from(options: &ProcessOptions) -> Result<Self> {
        options.resolve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_flags() {
        assert_eq!(ConnectionKey::Driver.flag(), "-t");
        assert_eq!(ConnectionKey::Host.flag(), "-H");
        assert_eq!(ConnectionKey::Port.flag(), "--db-port");
        assert_eq!(ConnectionKey::DbSid.flag(), "-db-sid");
        assert_eq!(ConnectionKey::JsonQuery.flag(), "--json-query");
        assert_eq!(ConnectionKey::all().count(), 13);
        for (index, key) in ConnectionKey::all().enumerate() {
            assert_eq!(key as usize, index);
        }
    }

    #[test]
    fn test_connection_key_names_round_trip() {
        for key in ConnectionKey::all() {
            assert_eq!(key.as_str().parse::<ConnectionKey>().unwrap(), key);
        }
        assert!(matches!(
            "schema".parse::<ConnectionKey>(),
            Err(Error::InvalidConnectionKey { key }) if key == "schema"
        ));
    }

    #[test]
    fn test_resolve_defaults() {
        let options = ProcessOptions::default().resolve().unwrap();
        assert_eq!(options, OptionSet::new());
        assert_eq!(
            options.get_formats().iter().copied().collect::<Vec<_>>(),
            vec![FormatTag::Pdf]
        );
        assert!(options.get_locale().is_none());
        assert!(options.get_params().is_empty());
        assert!(options.get_db_connection().is_empty());
    }

    #[test]
    fn test_resolve_keeps_connection_order() {
        let options = ProcessOptions {
            db_connection: Some(IndexMap::from([
                ("host".to_string(), "localhost".to_string()),
                ("driver".to_string(), "postgres".to_string()),
            ])),
            ..Default::default()
        };
        let resolved = options.resolve().unwrap();
        let keys: Vec<_> = resolved.get_db_connection().keys().copied().collect();
        assert_eq!(keys, vec![ConnectionKey::Host, ConnectionKey::Driver]);
    }

    #[test]
    fn test_resolve_rejects_bad_format() {
        let options = ProcessOptions {
            format: Some(vec!["pdf".to_string(), "svg".to_string()]),
            ..Default::default()
        };
        assert!(matches!(options.resolve(), Err(Error::InvalidFormat { .. })));
    }

    #[test]
    fn test_with_defaults_request_wins() {
        let defaults = ProcessOptions {
            format: Some(vec!["xlsx".to_string()]),
            locale: Some("de_DE".to_string()),
            params: Some(IndexMap::from([
                ("company".to_string(), "ACME".to_string()),
                ("title".to_string(), "Default".to_string()),
            ])),
            db_connection: None,
        };
        let request = ProcessOptions {
            locale: Some("en_US".to_string()),
            params: Some(IndexMap::from([("title".to_string(), "Q3".to_string())])),
            ..Default::default()
        };

        let merged = request.with_defaults(&defaults);
        assert_eq!(merged.format, Some(vec!["xlsx".to_string()]));
        assert_eq!(merged.locale.as_deref(), Some("en_US"));
        let params = merged.params.unwrap();
        assert_eq!(params["company"], "ACME");
        assert_eq!(params["title"], "Q3");
    }

    #[test]
    fn test_typed_builder() {
        let options = OptionSet::new()
            .formats([FormatTag::Csv, FormatTag::Html])
            .locale("pt_BR")
            .param("year", "2024")
            .connection(ConnectionKey::Driver, "json")
            .connection(ConnectionKey::DataFile, "data.json");

        assert_eq!(options.get_formats().len(), 2);
        assert_eq!(options.get_locale(), Some("pt_BR"));
        assert_eq!(options.get_params()["year"], "2024");
        assert_eq!(options.get_db_connection()[&ConnectionKey::DataFile], "data.json");
    }

    #[test]
    fn test_empty_formats_keep_default() {
        let options = OptionSet::new().formats([]);
        assert!(options.get_formats().contains(&FormatTag::Pdf));
    }

    #[test]
    fn test_deserialize_from_yaml() {
        let yaml = r#"
format: [pdf, xlsx]
locale: en_US
params:
  date: "2024-01-01"
db_connection:
  driver: postgres
  port: "5432"
"#;
        let options: ProcessOptions = serde_yaml::from_str(yaml).unwrap();
        let resolved = options.resolve().unwrap();
        assert_eq!(resolved.get_formats().len(), 2);
        assert_eq!(resolved.get_db_connection()[&ConnectionKey::Port], "5432");
    }
}
