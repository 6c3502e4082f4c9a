//! Incremental, type-widening column accumulation shared by the parsers.

use crate::core::{
    data::{Column, ColumnData, ColumnType, FLAG_NULL, RowFlags},
    error::ParseError,
};

/// One scalar read from a record.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Cell {
    Null,
    Int(i64),
    Double(f64),
    Str(String),
}

impl Cell {
    fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Int(_) => ColumnType::Int.as_str(),
            Self::Double(_) => ColumnType::Double.as_str(),
            Self::Str(_) => ColumnType::Str.as_str(),
        }
    }
}

#[derive(Debug)]
enum Acc {
    /// Only nulls so far.
    Pending,
    Int(Vec<i64>),
    Double(Vec<f64>),
    Str(Vec<String>),
}

/// Accumulates one column.  Integers widen to doubles on the first
/// fractional value; strings and numbers never mix.
#[derive(Debug)]
pub(crate) struct ColumnBuilder {
    name: String,
    acc: Acc,
    flags: Vec<RowFlags>,
}

impl ColumnBuilder {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            acc: Acc::Pending,
            flags: Vec::new(),
        }
    }

    #[inline]
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Append `cell`; `record` only feeds error messages.
    pub(crate) fn push(&mut self, cell: Cell, record: usize) -> Result<(), ParseError> {
        let rows = self.flags.len();
        if matches!(self.acc, Acc::Pending) {
            self.acc = match &cell {
                Cell::Null => Acc::Pending,
                Cell::Int(_) => Acc::Int(vec![0; rows]),
                Cell::Double(_) => Acc::Double(vec![f64::NAN; rows]),
                Cell::Str(_) => Acc::Str(vec![String::new(); rows]),
            };
        }
        if let (Acc::Int(v), Cell::Double(_)) = (&self.acc, &cell) {
            #[allow(clippy::cast_precision_loss)]
            let widened = v
                .iter()
                .zip(&self.flags)
                .map(|(&x, f)| if f & FLAG_NULL == 0 { x as f64 } else { f64::NAN })
                .collect();
            self.acc = Acc::Double(widened);
        }

        let flag = if cell == Cell::Null { FLAG_NULL } else { 0 };
        match (&mut self.acc, cell) {
            (Acc::Pending, Cell::Null) => {}
            (Acc::Int(v), Cell::Null) => v.push(0),
            (Acc::Double(v), Cell::Null) => v.push(f64::NAN),
            (Acc::Str(v), Cell::Null) => v.push(String::new()),
            (Acc::Int(v), Cell::Int(x)) => v.push(x),
            #[allow(clippy::cast_precision_loss)]
            (Acc::Double(v), Cell::Int(x)) => v.push(x as f64),
            (Acc::Double(v), Cell::Double(x)) => v.push(x),
            (Acc::Str(v), Cell::Str(s)) => v.push(s),
            (acc, cell) => {
                return Err(ParseError::TypeMismatch {
                    record,
                    column: self.name.clone(),
                    want: acc.kind(),
                    got: cell.kind(),
                });
            }
        }
        self.flags.push(flag);
        Ok(())
    }

    /// Finished column.  A column that only ever saw nulls is a string
    /// column of empty cells.
    pub(crate) fn finish(self) -> Result<Column, ParseError> {
        let data = match self.acc {
            Acc::Pending => ColumnData::Str(vec![String::new(); self.flags.len()]),
            Acc::Int(v) => ColumnData::Int(v),
            Acc::Double(v) => ColumnData::Double(v),
            Acc::Str(v) => ColumnData::Str(v),
        };
        Ok(Column::with_flags(self.name, data, self.flags)?)
    }
}

impl Acc {
    fn kind(&self) -> &'static str {
        match self {
            Self::Pending => "null",
            Self::Int(_) => ColumnType::Int.as_str(),
            Self::Double(_) => ColumnType::Double.as_str(),
            Self::Str(_) => ColumnType::Str.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_widen_to_doubles() {
        let mut b = ColumnBuilder::new("x");
        b.push(Cell::Int(1), 1).unwrap();
        b.push(Cell::Null, 2).unwrap();
        b.push(Cell::Double(2.5), 3).unwrap();
        let col = b.finish().unwrap();
        assert_eq!(col.column_type(), ColumnType::Double);
        assert_eq!(col.view().value_f64(0), Some(1.0));
        assert!(col.is_null(1));
        assert_eq!(col.view().value_f64(2), Some(2.5));
    }

    #[test]
    fn leading_nulls_take_the_later_type() {
        let mut b = ColumnBuilder::new("s");
        b.push(Cell::Null, 1).unwrap();
        b.push(Cell::Str("a".into()), 2).unwrap();
        let col = b.finish().unwrap();
        assert_eq!(col.column_type(), ColumnType::Str);
        assert_eq!(col.len(), 2);
        assert!(col.is_null(0) && !col.is_null(1));
    }

    #[test]
    fn strings_and_numbers_do_not_mix() {
        let mut b = ColumnBuilder::new("s");
        b.push(Cell::Str("a".into()), 1).unwrap();
        let err = b.push(Cell::Int(3), 2).unwrap_err();
        assert!(matches!(
            err,
            ParseError::TypeMismatch { record: 2, want: "string", got: "integer", .. }
        ));
    }

    #[test]
    fn all_null_column_is_text() {
        let mut b = ColumnBuilder::new("n");
        b.push(Cell::Null, 1).unwrap();
        b.push(Cell::Null, 2).unwrap();
        let col = b.finish().unwrap();
        assert_eq!(col.column_type(), ColumnType::Str);
        assert!(col.is_null(0) && col.is_null(1));
    }
}
