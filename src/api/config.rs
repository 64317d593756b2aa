// Copyright 2025 Stoolap Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Connection configuration
//!
//! Supported DSN forms:
//!
//! ```text
//! memory://                         in-memory SQLite
//! sqlite:///path/to/file.db         SQLite file
//! file:///path/to/file.db           same as sqlite://
//! mysql://user@host/db              dialect only, see Database::with_connection
//! postgres://user@host/db           dialect only, see Database::with_connection
//! ```
//!
//! Every form accepts `?mode=auto|manual` to pick the transaction mode.

use std::fmt;
use std::str::FromStr;

use crate::core::{Dialect, Error, Result};

const MEMORY_SCHEME: &str = "memory";
const SQLITE_SCHEME: &str = "sqlite";
const FILE_SCHEME: &str = "file";
const MYSQL_SCHEME: &str = "mysql";
const POSTGRES_SCHEMES: &[&str] = &["postgres", "postgresql"];

/// Which database family a DSN points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Sqlite,
    MySql,
    Postgres,
}

impl BackendKind {
    /// SQL dialect spoken by this backend
    pub fn dialect(&self) -> Dialect {
        match self {
            BackendKind::Sqlite => Dialect::Sqlite,
            BackendKind::MySql => Dialect::MySql,
            BackendKind::Postgres => Dialect::Postgres,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Sqlite => write!(f, "sqlite"),
            BackendKind::MySql => write!(f, "mysql"),
            BackendKind::Postgres => write!(f, "postgres"),
        }
    }
}

/// When table writes are committed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionMode {
    /// Commit right after every insert, update, remove or truncate
    Auto,
    /// The caller commits
    #[default]
    Manual,
}

impl FromStr for TransactionMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(TransactionMode::Auto),
            "manual" => Ok(TransactionMode::Manual),
            _ => Err(Error::config(format!(
                "invalid transaction mode '{}', expected auto or manual",
                s
            ))),
        }
    }
}

/// Parsed DSN
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub backend: BackendKind,
    /// File path for SQLite, `user@host/db` for network backends,
    /// `None` for in-memory
    pub path: Option<String>,
    pub transaction_mode: TransactionMode,
}

impl Config {
    /// In-memory SQLite
    pub fn in_memory() -> Self {
        Self {
            backend: BackendKind::Sqlite,
            path: None,
            transaction_mode: TransactionMode::default(),
        }
    }

    /// SQLite file at `path`
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::in_memory()
        }
    }

    pub fn with_transaction_mode(mut self, mode: TransactionMode) -> Self {
        self.transaction_mode = mode;
        self
    }

    /// Parse a DSN
    pub fn from_dsn(dsn: &str) -> Result<Self> {
        let idx = dsn
            .find("://")
            .ok_or_else(|| Error::config("invalid DSN format: expected scheme://path"))?;

        let scheme = dsn[..idx].to_lowercase();
        let rest = &dsn[idx + 3..];
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (rest, None),
        };

        let mut config = match scheme.as_str() {
            MEMORY_SCHEME => Self::in_memory(),
            SQLITE_SCHEME | FILE_SCHEME => {
                if path.is_empty() {
                    return Err(Error::config(format!(
                        "{}:// scheme requires a non-empty path",
                        scheme
                    )));
                }
                Self::with_path(path)
            }
            MYSQL_SCHEME => Self::network(BackendKind::MySql, path),
            s if POSTGRES_SCHEMES.contains(&s) => Self::network(BackendKind::Postgres, path),
            _ => {
                return Err(Error::config(format!(
                    "unsupported scheme '{}'. Use 'memory://', 'sqlite://', 'file://', 'mysql://' or 'postgres://'",
                    scheme
                )))
            }
        };

        if let Some(query) = query {
            for param in query.split('&').filter(|p| !p.is_empty()) {
                let (key, value) = param.split_once('=').unwrap_or((param, ""));
                match key {
                    // Transaction mode: mode=auto|manual
                    "mode" | "transaction_mode" => {
                        config.transaction_mode = value.parse()?;
                    }
                    _ => {} // Ignore unknown parameters
                }
            }
        }

        Ok(config)
    }

    fn network(backend: BackendKind, path: &str) -> Self {
        Self {
            backend,
            path: (!path.is_empty()).then(|| path.to_string()),
            transaction_mode: TransactionMode::default(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.backend.dialect()
    }

    pub fn is_in_memory(&self) -> bool {
        self.backend == BackendKind::Sqlite && self.path.is_none()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl FromStr for Config {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_dsn(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_dsn() {
        let config = Config::from_dsn("memory://").unwrap();
        assert!(config.is_in_memory());
        assert_eq!(config.dialect(), Dialect::Sqlite);
        assert_eq!(config.transaction_mode, TransactionMode::Manual);
    }

    #[test]
    fn test_sqlite_and_file_dsn() {
        let config = Config::from_dsn("sqlite:///tmp/app.db").unwrap();
        assert_eq!(config.path.as_deref(), Some("/tmp/app.db"));
        assert_eq!(config.backend, BackendKind::Sqlite);

        let alias = Config::from_dsn("FILE:///tmp/app.db").unwrap();
        assert_eq!(alias, config);

        assert!(matches!(
            Config::from_dsn("sqlite://"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_mode_parameter() {
        let config = Config::from_dsn("sqlite:///tmp/app.db?mode=auto").unwrap();
        assert_eq!(config.transaction_mode, TransactionMode::Auto);
        assert_eq!(config.path.as_deref(), Some("/tmp/app.db"));

        let config: Config = "memory://?cache=shared&mode=MANUAL".parse().unwrap();
        assert_eq!(config.transaction_mode, TransactionMode::Manual);

        assert!(Config::from_dsn("memory://?mode=sometimes").is_err());
    }

    #[test]
    fn test_network_dsn() {
        let config = Config::from_dsn("mysql://root@localhost/test").unwrap();
        assert_eq!(config.backend, BackendKind::MySql);
        assert_eq!(config.dialect(), Dialect::MySql);
        assert_eq!(config.path.as_deref(), Some("root@localhost/test"));

        let config = Config::from_dsn("postgresql://localhost/test?mode=auto").unwrap();
        assert_eq!(config.backend, BackendKind::Postgres);
        assert_eq!(config.transaction_mode, TransactionMode::Auto);
    }

    #[test]
    fn test_bad_dsn() {
        assert!(matches!(Config::from_dsn("memory"), Err(Error::Config(_))));
        assert!(matches!(
            Config::from_dsn("oracle://db"),
            Err(Error::Config(_))
        ));
    }
}
