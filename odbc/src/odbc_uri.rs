//! Parses `Key=Value;` connection strings into `ConnectionOptions` (spec
//! §4.2, §6). Grounded on the same brace/semicolon scanning state machine
//! the driver manager feeds us, but the keyword set and the attributes we
//! resolve into are specific to a TDS connection: no mongo URI, no
//! telemetry app name.

use crate::errors::ODBCError;
use furball_core::ConnectionOptions;
use lazy_static::lazy_static;
use regex::RegexSetBuilder;
use std::collections::HashMap;

const EMPTY_URI_ERROR: &str = "connection string must not be empty";
const INVALID_ATTR_FORMAT_ERROR: &str = "all connection string attributes must be of the form keyword=value";
const MISSING_CLOSING_BRACE_ERROR: &str = "attribute value beginning with '{' must end with '}'";

pub const SERVER: &str = "server";
pub const DATABASE: &str = "database";
pub const INITIAL_CATALOG: &str = "initial catalog";
pub const UID: &str = "uid";
pub const USER_ID: &str = "user id";
pub const PWD: &str = "pwd";
pub const PASSWORD: &str = "password";
pub const TRUST_SERVER_CERTIFICATE: &str = "trustservercertificate";
pub const DSN: &str = "dsn";
pub const DRIVER: &str = "driver";

const KEYWORD_LIST: &[&str] = &[
    SERVER,
    DATABASE,
    INITIAL_CATALOG,
    UID,
    USER_ID,
    PWD,
    PASSWORD,
    TRUST_SERVER_CERTIFICATE,
    DSN,
    DRIVER,
];

lazy_static! {
    static ref KEYWORDS: regex::RegexSet = RegexSetBuilder::new(
        KEYWORD_LIST
            .iter()
            .map(|kw| format!("^{}$", regex::escape(kw)))
            .collect::<Vec<_>>()
    )
    .case_insensitive(true)
    .build()
    .unwrap();
}

fn transform_keyword(keyword: &str) -> String {
    let lower = keyword.to_lowercase();
    match lower.as_str() {
        INITIAL_CATALOG => DATABASE.to_string(),
        USER_ID => UID.to_string(),
        PASSWORD => PWD.to_string(),
        _ => lower,
    }
}

/// A parsed, but not yet validated, bag of connection string attributes.
#[derive(Debug, PartialEq, Eq, Default)]
pub struct ODBCUri(HashMap<String, String>);

impl std::ops::Deref for ODBCUri {
    type Target = HashMap<String, String>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ODBCUri {
    pub fn new(connection_string: &str) -> Result<ODBCUri, ODBCError> {
        if connection_string.is_empty() {
            return Err(ODBCError::InvalidUriFormat(EMPTY_URI_ERROR.to_string()));
        }
        let mut ret = ODBCUri(HashMap::new());
        let mut input = connection_string.to_string();
        while let Some((keyword, value, rest)) = ODBCUri::get_next_attribute(input)? {
            // if attributes are repeated, the first is the one that is kept.
            ret.0.entry(transform_keyword(&keyword)).or_insert(value);
            match rest {
                None => break,
                Some(r) => input = r,
            }
        }
        Ok(ret)
    }

    fn get_next_attribute(
        connection_string: String,
    ) -> Result<Option<(String, String, Option<String>)>, ODBCError> {
        // clean up any extra leading semi-colons
        let index = connection_string.find(|c| c != ';');
        if index.is_none() {
            return Ok(None);
        }
        let connection_string = connection_string.get(index.unwrap()..).unwrap();
        let (keyword, rest) = connection_string.split_at(
            connection_string
                .find('=')
                .ok_or_else(|| ODBCError::InvalidUriFormat(INVALID_ATTR_FORMAT_ERROR.to_string()))?,
        );
        let rest = rest.get(1..).unwrap();
        if !KEYWORDS.is_match(keyword) {
            return Err(ODBCError::InvalidUriFormat(format!(
                "'{keyword}' is not a recognized connection string keyword"
            )));
        }
        let (value, rest) = if rest.starts_with('{') {
            let rest = rest
                .get(1..)
                .ok_or_else(|| ODBCError::InvalidUriFormat(MISSING_CLOSING_BRACE_ERROR.to_string()))?;
            ODBCUri::handle_braced_value(rest)?
        } else {
            ODBCUri::handle_unbraced_value(rest)
        };
        Ok(Some((keyword.to_string(), value, rest)))
    }

    fn handle_braced_value(input: &str) -> Result<(String, Option<String>), ODBCError> {
        let mut after_brace = false;
        for (i, c) in input.chars().enumerate() {
            if after_brace && c == ';' {
                let rest = input.get(i + 1..).filter(|s| !s.is_empty());
                return Ok((input.get(0..i - 1).unwrap().to_string(), rest.map(String::from)));
            }
            if c == '}' {
                if i + 1 == input.len() {
                    return Ok((input.get(0..i).unwrap().to_string(), None));
                }
                after_brace = true;
            } else {
                after_brace = false;
            }
        }
        Err(ODBCError::InvalidUriFormat(MISSING_CLOSING_BRACE_ERROR.to_string()))
    }

    fn handle_unbraced_value(input: &str) -> (String, Option<String>) {
        match input.find(';') {
            None => (input.to_string(), None),
            Some(index) => {
                let (value, rest) = input.split_at(index);
                if rest.len() == 1 {
                    (value.to_string(), None)
                } else {
                    (value.to_string(), rest.get(1..).map(String::from))
                }
            }
        }
    }

    fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }

    /// Splits an optional `host,port` server value into its parts.
    fn split_host_port(server: &str) -> (String, Option<u16>) {
        match server.split_once(',') {
            Some((host, port)) => (host.to_string(), port.trim().parse().ok()),
            None => (server.to_string(), None),
        }
    }

    /// Resolves this bag of attributes into `ConnectionOptions`. UID/PWD
    /// passed in as overrides (from an explicit DSN connect call) take
    /// precedence over whatever the string itself carried for those keys.
    pub fn into_connection_options(
        mut self,
        uid_override: Option<String>,
        pwd_override: Option<String>,
    ) -> Result<ConnectionOptions, ODBCError> {
        let server = self
            .remove(SERVER)
            .ok_or_else(|| ODBCError::InvalidUriFormat("Server is required".to_string()))?;
        let (host, port) = Self::split_host_port(&server);
        let database = self.remove(DATABASE);
        let user = uid_override.or_else(|| self.remove(UID));
        let password = pwd_override.or_else(|| self.remove(PWD));
        let trust_server_certificate = self
            .remove(TRUST_SERVER_CERTIFICATE)
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "yes" | "true"))
            .unwrap_or(false);

        Ok(ConnectionOptions {
            host,
            port,
            database,
            user,
            password,
            trust_server_certificate,
        })
    }
}

#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn empty_string_is_an_error() {
        assert!(ODBCUri::new("").is_err());
    }

    #[test]
    fn basic_attributes_parse() {
        let uri = ODBCUri::new("Server=localhost;Database=mydb;UID=sa;PWD=secret").unwrap();
        assert_eq!(uri.get(SERVER), Some(&"localhost".to_string()));
        assert_eq!(uri.get(DATABASE), Some(&"mydb".to_string()));
        assert_eq!(uri.get(UID), Some(&"sa".to_string()));
        assert_eq!(uri.get(PWD), Some(&"secret".to_string()));
    }

    #[test]
    fn synonym_keywords_collapse_to_the_canonical_key() {
        let uri = ODBCUri::new("Server=localhost;Initial Catalog=mydb;User ID=sa;Password=secret").unwrap();
        assert_eq!(uri.get(DATABASE), Some(&"mydb".to_string()));
        assert_eq!(uri.get(UID), Some(&"sa".to_string()));
        assert_eq!(uri.get(PWD), Some(&"secret".to_string()));
    }

    #[test]
    fn repeated_attribute_keeps_the_first() {
        let uri = ODBCUri::new("Server=one;Server=two").unwrap();
        assert_eq!(uri.get(SERVER), Some(&"one".to_string()));
    }

    #[test]
    fn braced_value_can_contain_semicolons() {
        let uri = ODBCUri::new("Server=localhost;PWD={a;b}").unwrap();
        assert_eq!(uri.get(PWD), Some(&"a;b".to_string()));
    }

    #[test]
    fn unrecognized_keyword_is_rejected() {
        assert!(ODBCUri::new("Banana=1").is_err());
    }

    #[test]
    fn host_and_port_split_on_comma() {
        let opts = ODBCUri::new("Server=localhost,1434;UID=sa;PWD=x")
            .unwrap()
            .into_connection_options(None, None)
            .unwrap();
        assert_eq!(opts.host, "localhost");
        assert_eq!(opts.port, Some(1434));
    }

    #[test]
    fn missing_server_is_an_error() {
        let err = ODBCUri::new("UID=sa;PWD=x")
            .unwrap()
            .into_connection_options(None, None)
            .unwrap_err();
        assert!(matches!(err, ODBCError::InvalidUriFormat(_)));
    }

    #[test]
    fn uid_pwd_overrides_win_over_string_values() {
        let opts = ODBCUri::new("Server=localhost;UID=sa;PWD=x")
            .unwrap()
            .into_connection_options(Some("override_user".to_string()), Some("override_pwd".to_string()))
            .unwrap();
        assert_eq!(opts.user, Some("override_user".to_string()));
        assert_eq!(opts.password, Some("override_pwd".to_string()));
    }

    #[test]
    fn trust_server_certificate_recognizes_truthy_values() {
        let opts = ODBCUri::new("Server=localhost;UID=sa;PWD=x;TrustServerCertificate=yes")
            .unwrap()
            .into_connection_options(None, None)
            .unwrap();
        assert!(opts.trust_server_certificate);
    }
}
