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

//! Value literal encoder
//!
//! This is the only place a [`Value`] becomes SQL text. Statements are built
//! by interpolating these literals, so replacing this module with parameter
//! binding must not require touching the compiler or the builder.
//!
//! Text escaping depends on the dialect: MySQL treats a backslash inside a
//! string literal as an escape character, so it is doubled there as well.

use crate::core::{Dialect, Error, Result, Value, DATETIME_FORMAT, DATE_FORMAT};

/// Encode a value as an SQL literal
///
/// | Value      | Literal                     |
/// |------------|-----------------------------|
/// | Null       | `null`                      |
/// | Integer    | `42`                        |
/// | Float      | `4.5`                       |
/// | Text       | `'it''s'`, MySQL also `\\`    |
/// | DateTime   | `'2024-01-15 10:30:00'`     |
/// | Date       | `'2024-01-15'`              |
/// | FieldRef   | the expression, verbatim    |
pub fn encode(value: &Value, dialect: Dialect) -> Result<String> {
    match value {
        Value::Null => Ok("null".to_string()),
        Value::Integer(v) => Ok(v.to_string()),
        Value::Float(v) => {
            if !v.is_finite() {
                return Err(Error::unsupported_value(format!(
                    "float {} has no SQL literal",
                    v
                )));
            }
            Ok(v.to_string())
        }
        Value::Text(s) => Ok(quote_text(s, dialect)),
        Value::DateTime(dt) => Ok(format!("'{}'", dt.format(DATETIME_FORMAT))),
        Value::Date(d) => Ok(format!("'{}'", d.format(DATE_FORMAT))),
        Value::FieldRef(expr) => Ok(expr.to_string()),
    }
}

/// Single-quote a string for `dialect`
///
/// Every embedded single quote is doubled. Under MySQL every backslash is
/// doubled too, so the literal always ends at the closing quote.
pub fn quote_text(s: &str, dialect: Dialect) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push('\''),
            '\\' if dialect == Dialect::MySql => out.push('\\'),
            _ => {}
        }
        out.push(c);
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_encode_scalars() {
        assert_eq!(encode(&Value::Null, Dialect::MySql).unwrap(), "null");
        assert_eq!(encode(&Value::integer(-12), Dialect::MySql).unwrap(), "-12");
        assert_eq!(encode(&Value::float(4.33333), Dialect::MySql).unwrap(), "4.33333");
        assert_eq!(encode(&Value::float(0.5), Dialect::MySql).unwrap(), "0.5");
    }

    #[test]
    fn test_encode_text_escapes_quotes() {
        assert_eq!(encode(&Value::text("jude"), Dialect::MySql).unwrap(), "'jude'");
        assert_eq!(encode(&Value::text("it's"), Dialect::MySql).unwrap(), "'it''s'");
        assert_eq!(encode(&Value::text("''"), Dialect::MySql).unwrap(), "''''''");
        assert_eq!(encode(&Value::text(""), Dialect::MySql).unwrap(), "''");
    }

    #[test]
    fn test_encode_text_backslashes_per_dialect() {
        // MySQL reads backslash escapes inside string literals
        assert_eq!(quote_text("C:\\", Dialect::MySql), "'C:\\\\'");
        assert_eq!(quote_text("a\\b", Dialect::MySql), "'a\\\\b'");
        assert_eq!(
            quote_text("x\\' OR 1=1 -- ", Dialect::MySql),
            "'x\\\\'' OR 1=1 -- '"
        );

        // Standard literals keep backslashes as plain characters
        for dialect in [Dialect::Sqlite, Dialect::Postgres] {
            assert_eq!(quote_text("C:\\", dialect), "'C:\\'");
            assert_eq!(quote_text("a\\b", dialect), "'a\\b'");
            assert_eq!(quote_text("x\\' OR 1=1 -- ", dialect), "'x\\'' OR 1=1 -- '");
        }

        let path = Value::text("C:\\");
        assert_eq!(encode(&path, Dialect::MySql).unwrap(), "'C:\\\\'");
        assert_eq!(encode(&path, Dialect::Sqlite).unwrap(), "'C:\\'");
    }

    #[test]
    fn test_encode_dates() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let dt = d.and_hms_milli_opt(7, 5, 1, 250).unwrap();
        assert_eq!(encode(&Value::date(d), Dialect::MySql).unwrap(), "'2024-03-09'");
        // Sub-second precision is dropped by the fixed pattern
        assert_eq!(
            encode(&Value::datetime(dt), Dialect::MySql).unwrap(),
            "'2024-03-09 07:05:01'"
        );
    }

    #[test]
    fn test_encode_field_ref_is_verbatim() {
        assert_eq!(
            encode(&Value::field_ref("price * 'x'"), Dialect::MySql).unwrap(),
            "price * 'x'"
        );
    }

    #[test]
    fn test_encode_non_finite_float() {
        assert!(matches!(
            encode(&Value::float(f64::NAN), Dialect::MySql),
            Err(Error::UnsupportedValue(_))
        ));
        assert!(encode(&Value::float(f64::INFINITY), Dialect::MySql).is_err());
    }
}
