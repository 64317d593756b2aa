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

//! PostgreSQL backend

use crate::api::cursor::{execute_logged, Cursor};
use crate::core::{Dialect, Error, Result};
use crate::query::encoder::quote_text;

use super::{column_strings, Backend};

/// Introspection through `information_schema`
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresBackend;

impl Backend for PostgresBackend {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn list_tables(&self, cursor: &mut dyn Cursor) -> Result<Vec<String>> {
        column_strings(
            cursor,
            "SELECT table_name FROM information_schema.tables ORDER BY table_name",
            0,
        )
    }

    fn columns_of(&self, cursor: &mut dyn Cursor, table: &str) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT column_name FROM information_schema.columns WHERE table_name={} ORDER BY ordinal_position",
            quote_text(table, self.dialect())
        );
        column_strings(cursor, &sql, 0)
    }

    fn truncate(&self, cursor: &mut dyn Cursor, table: &str) -> Result<()> {
        let sql = format!("TRUNCATE TABLE {}", self.dialect().column(table));
        execute_logged(cursor, &sql).map(|_| ())
    }

    fn set_foreign_key_checks(&self, _cursor: &mut dyn Cursor, _enabled: bool) -> Result<()> {
        // Constraint checks are per-constraint (DEFERRABLE) in PostgreSQL
        Err(Error::NotSupported(
            "session-wide foreign key switch on postgres".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::cursor::MemoryCursor;
    use crate::core::Value;

    #[test]
    fn test_statements() {
        let mut cursor = MemoryCursor::new()
            .with_rows(&["table_name"], vec![vec![Value::text("users")]])
            .with_rows(&["column_name"], vec![vec![Value::text("id")]]);
        let log = cursor.log();

        assert_eq!(
            PostgresBackend.list_tables(&mut cursor).unwrap(),
            vec!["users"]
        );
        assert_eq!(
            PostgresBackend.columns_of(&mut cursor, "o'brien").unwrap(),
            vec!["id"]
        );
        PostgresBackend.truncate(&mut cursor, "group").unwrap();

        assert_eq!(
            log.lock().as_slice(),
            [
                "SELECT table_name FROM information_schema.tables ORDER BY table_name",
                "SELECT column_name FROM information_schema.columns WHERE table_name='o''brien' ORDER BY ordinal_position",
                "TRUNCATE TABLE \"group\"",
            ]
        );
    }

    #[test]
    fn test_foreign_key_switch_is_not_supported() {
        let mut cursor = MemoryCursor::new();
        let log = cursor.log();
        assert!(matches!(
            PostgresBackend.set_foreign_key_checks(&mut cursor, false),
            Err(Error::NotSupported(_))
        ));
        assert!(log.lock().is_empty());
    }
}
