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

//! MySQL backend

use crate::api::cursor::{execute_logged, Cursor};
use crate::core::{Dialect, Result};

use super::{column_strings, Backend};

/// Introspection through `SHOW` statements
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlBackend;

impl Backend for MySqlBackend {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn list_tables(&self, cursor: &mut dyn Cursor) -> Result<Vec<String>> {
        column_strings(cursor, "SHOW TABLES", 0)
    }

    fn columns_of(&self, cursor: &mut dyn Cursor, table: &str) -> Result<Vec<String>> {
        // SHOW COLUMNS rows: Field, Type, Null, Key, Default, Extra
        let sql = format!("SHOW COLUMNS FROM {}", self.dialect().column(table));
        column_strings(cursor, &sql, 0)
    }

    fn truncate(&self, cursor: &mut dyn Cursor, table: &str) -> Result<()> {
        let sql = format!("TRUNCATE TABLE {}", self.dialect().column(table));
        execute_logged(cursor, &sql).map(|_| ())
    }

    fn set_foreign_key_checks(&self, cursor: &mut dyn Cursor, enabled: bool) -> Result<()> {
        let sql = format!("SET foreign_key_checks = {}", u8::from(enabled));
        execute_logged(cursor, &sql).map(|_| ())
    }
}
