//! JSON array and newline-delimited JSON records.
//!
//! The first record fixes the column order; `serde_json` is built with
//! `preserve_order`, so that is the order its keys appear in the input.

use serde_json::{Map, Value};
use tracing::trace;

use crate::{
    core::{data::DataStore, error::ParseError},
    input::columns::{Cell, ColumnBuilder},
};

/// Column builders fed one object at a time.
#[derive(Debug, Default)]
struct Records {
    columns: Vec<ColumnBuilder>,
    seen: usize,
}

impl Records {
    /// `record` is 1-based.
    fn push(&mut self, record: usize, obj: &Map<String, Value>) -> Result<(), ParseError> {
        if self.seen == 0 {
            self.columns = obj.keys().map(ColumnBuilder::new).collect();
        } else if obj.len() != self.columns.len()
            || self.columns.iter().any(|c| !obj.contains_key(c.name()))
        {
            return Err(ParseError::InconsistentShape {
                record,
                want: self.columns.iter().map(|c| c.name().to_owned()).collect(),
                got: obj.keys().cloned().collect(),
            });
        }
        for col in &mut self.columns {
            let cell = match obj.get(col.name()) {
                Some(v) => cell(v).ok_or_else(|| ParseError::UnsupportedValue {
                    record,
                    column: col.name().to_owned(),
                })?,
                None => Cell::Null,
            };
            col.push(cell, record)?;
        }
        self.seen += 1;
        Ok(())
    }

    fn finish(self) -> Result<DataStore, ParseError> {
        if self.seen == 0 {
            return Err(ParseError::Empty);
        }
        let columns = self
            .columns
            .into_iter()
            .map(ColumnBuilder::finish)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DataStore::new(columns)?)
    }
}

/// Scalar value of one field; `None` for nested arrays and objects.
fn cell(v: &Value) -> Option<Cell> {
    Some(match v {
        Value::Null => Cell::Null,
        Value::Bool(b) => Cell::Str(b.to_string()),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Cell::Int(i),
            None => Cell::Double(n.as_f64()?),
        },
        Value::String(s) => Cell::Str(s.clone()),
        Value::Array(_) | Value::Object(_) => return None,
    })
}

/// A top-level array of objects.
pub fn parse_array(text: &str) -> Result<DataStore, ParseError> {
    let Value::Array(items) = serde_json::from_str::<Value>(text)? else {
        return Err(ParseError::NotAnArray);
    };
    let mut records = Records::default();
    for (i, item) in items.iter().enumerate() {
        let Value::Object(obj) = item else {
            return Err(ParseError::NotAnObject { record: i + 1 });
        };
        records.push(i + 1, obj)?;
    }
    trace!(records = records.seen, "json array read");
    records.finish()
}

/// One object per line; blank lines are skipped.
pub fn parse_lines(text: &str) -> Result<DataStore, ParseError> {
    let mut records = Records::default();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let value = serde_json::from_str::<Value>(line)
            .map_err(|source| ParseError::JsonLine { line: i + 1, source })?;
        let record = records.seen + 1;
        let Value::Object(obj) = value else {
            return Err(ParseError::NotAnObject { record });
        };
        records.push(record, &obj)?;
    }
    trace!(records = records.seen, "ndjson read");
    records.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::ColumnType;

    #[test]
    fn array_keeps_first_record_key_order() {
        let ds = parse_array(r#"[{"b": 1, "a": "x"}, {"a": "y", "b": 2}]"#).unwrap();
        assert_eq!(ds.names().collect::<Vec<_>>(), ["b", "a"]);
        assert_eq!(ds.column_type(0), ColumnType::Int);
        assert_eq!(ds.view(1).label(1), "y");
    }

    #[test]
    fn value_types_map_to_columns() {
        let ds = parse_array(
            r#"[{"i": 1, "d": 1, "s": true, "n": null},
                {"i": 2, "d": 0.5, "s": false, "n": 3}]"#,
        )
        .unwrap();
        assert_eq!(ds.column_type(0), ColumnType::Int);
        assert_eq!(ds.column_type(1), ColumnType::Double);
        assert_eq!(ds.column_type(2), ColumnType::Str);
        assert_eq!(ds.view(2).label(0), "true");
        assert_eq!(ds.column_type(3), ColumnType::Int);
        assert!(ds.column(3).is_null(0));
    }

    #[test]
    fn shape_errors() {
        assert!(matches!(parse_array(r#"{"a": 1}"#), Err(ParseError::NotAnArray)));
        assert!(matches!(parse_array("[]"), Err(ParseError::Empty)));
        assert!(matches!(
            parse_array(r#"[{"a": 1}, 2]"#),
            Err(ParseError::NotAnObject { record: 2 })
        ));
        assert!(matches!(
            parse_array(r#"[{"a": 1}, {"b": 1}]"#),
            Err(ParseError::InconsistentShape { record: 2, .. })
        ));
        assert!(matches!(
            parse_array(r#"[{"a": [1]}]"#),
            Err(ParseError::UnsupportedValue { record: 1, .. })
        ));
        assert!(matches!(
            parse_array(r#"[{"a": 1}, {"a": "x"}]"#),
            Err(ParseError::TypeMismatch { record: 2, .. })
        ));
    }

    #[test]
    fn lines_skip_blanks_and_report_line_numbers() {
        let ds = parse_lines("{\"a\": 1}\n\n{\"a\": 2}\n").unwrap();
        assert_eq!(ds.row_count(), 2);
        let err = parse_lines("{\"a\": 1}\n{oops\n").unwrap_err();
        assert!(matches!(err, ParseError::JsonLine { line: 2, .. }));
        assert!(matches!(parse_lines("\n  \n"), Err(ParseError::Empty)));
    }
}
