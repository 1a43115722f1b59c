//! DSN file discovery (spec §6). Reads `$HOME/.odbc.ini` then
//! `/etc/odbc.ini`, first match wins; the section named by the DSN becomes
//! a connection string. This is a deliberately minimal INI reader: it does
//! not touch `odbcinst`, the system registry, or any native DSN management
//! API, since DSN configuration file discovery beyond this documented
//! lookup is out of scope.

use crate::errors::ODBCError;
use std::path::PathBuf;

fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(home) = std::env::var("HOME") {
        paths.push(PathBuf::from(home).join(".odbc.ini"));
    }
    paths.push(PathBuf::from("/etc/odbc.ini"));
    paths
}

/// Finds the `[dsn_name]` section in the first INI file that has one, and
/// returns its key/value lines joined into a `Key=Value;...` connection
/// string fragment.
pub fn lookup(dsn_name: &str) -> Result<String, ODBCError> {
    for path in candidate_paths() {
        let Ok(contents) = std::fs::read_to_string(&path) else {
            continue;
        };
        if let Some(section) = find_section(&contents, dsn_name) {
            return Ok(section_to_connection_string(&section));
        }
    }
    Err(ODBCError::InvalidUriFormat(format!(
        "data source name '{dsn_name}' not found in .odbc.ini or /etc/odbc.ini"
    )))
}

/// Extracts the key/value lines of `[section_name]` from an INI file's
/// text, case-insensitively matching the section header.
fn find_section(contents: &str, section_name: &str) -> Option<Vec<(String, String)>> {
    let mut lines = contents.lines();
    loop {
        let header = lines.find(|l| l.trim().starts_with('['))?;
        let name = header.trim().trim_start_matches('[').trim_end_matches(']');
        if !name.eq_ignore_ascii_case(section_name) {
            continue;
        }
        let mut entries = Vec::new();
        for line in lines.by_ref() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }
            if line.starts_with('[') {
                break;
            }
            if let Some((key, value)) = line.split_once('=') {
                entries.push((key.trim().to_string(), value.trim().to_string()));
            }
        }
        return Some(entries);
    }
}

fn section_to_connection_string(entries: &[(String, String)]) -> String {
    entries
        .iter()
        .map(|(k, v)| format!("{k}={v};"))
        .collect::<String>()
}

#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn finds_named_section_case_insensitively() {
        let ini = "[OtherDsn]\nServer=wrong\n\n[MyDsn]\nServer=localhost\nDatabase=mydb\n";
        let section = find_section(ini, "mydsn").unwrap();
        assert_eq!(section, vec![
            ("Server".to_string(), "localhost".to_string()),
            ("Database".to_string(), "mydb".to_string()),
        ]);
    }

    #[test]
    fn missing_section_returns_none() {
        let ini = "[OtherDsn]\nServer=wrong\n";
        assert!(find_section(ini, "mydsn").is_none());
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let ini = "[MyDsn]\n; a comment\n\nServer=localhost\n# also a comment\nDatabase=mydb\n";
        let section = find_section(ini, "MyDsn").unwrap();
        assert_eq!(section.len(), 2);
    }

    #[test]
    fn section_renders_as_connection_string_fragment() {
        let entries = vec![
            ("Server".to_string(), "localhost".to_string()),
            ("Database".to_string(), "mydb".to_string()),
        ];
        assert_eq!(section_to_connection_string(&entries), "Server=localhost;Database=mydb;");
    }
}
