//! CSV and TSV with a header row.
//!
//! Column types are decided over the whole column once every record is in:
//! all non-empty cells parse as `i64` gives an integer column, all parse as a
//! finite `f64` gives a double column, anything else stays text.  Empty cells
//! are nulls.

use std::borrow::Cow;

use csv::{ReaderBuilder, Trim};
use tracing::trace;

use crate::core::{
    data::{Column, ColumnData, DataStore, FLAG_NULL, RowFlags},
    error::ParseError,
};

/// Replace U+2212 MINUS SIGN, which spreadsheets like to emit, by `-`.
#[inline]
fn normalize_minus(s: &str) -> Cow<'_, str> {
    if s.contains('\u{2212}') {
        Cow::Owned(s.replace('\u{2212}', "-"))
    } else {
        Cow::Borrowed(s)
    }
}

#[inline]
fn parse_int(s: &str) -> Option<i64> {
    lexical_core::parse::<i64>(normalize_minus(s).as_bytes()).ok()
}

#[inline]
fn parse_double(s: &str) -> Option<f64> {
    lexical_core::parse::<f64>(normalize_minus(s).as_bytes())
        .ok()
        .filter(|v| v.is_finite())
}

/// Typed column out of raw cells.
fn infer(name: &str, cells: Vec<String>) -> Result<Column, ParseError> {
    let flags: Vec<RowFlags> = cells
        .iter()
        .map(|c| if c.is_empty() { FLAG_NULL } else { 0 })
        .collect();
    let present = || cells.iter().filter(|c| !c.is_empty());
    let any = present().next().is_some();

    let data = if any && present().all(|c| parse_int(c).is_some()) {
        ColumnData::Int(cells.iter().map(|c| parse_int(c).unwrap_or(0)).collect())
    } else if any && present().all(|c| parse_double(c).is_some()) {
        ColumnData::Double(
            cells
                .iter()
                .map(|c| parse_double(c).unwrap_or(f64::NAN))
                .collect(),
        )
    } else {
        ColumnData::Str(cells)
    };
    Ok(Column::with_flags(name, data, flags)?)
}

/// Header row plus records split on `delimiter`.
pub fn parse(text: &str, delimiter: u8) -> Result<DataStore, ParseError> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let names: Vec<String> = rdr.headers()?.iter().map(str::to_owned).collect();
    if names.is_empty() {
        return Err(ParseError::Empty);
    }
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); names.len()];
    for record in rdr.records() {
        let record = record?;
        for (col, field) in cells.iter_mut().zip(record.iter()) {
            col.push(field.to_owned());
        }
    }
    let rows = cells.first().map_or(0, Vec::len);
    if rows == 0 {
        return Err(ParseError::Empty);
    }
    trace!(rows, columns = names.len(), "delimited records read");

    let columns = names
        .iter()
        .zip(cells)
        .map(|(name, cells)| infer(name, cells))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(DataStore::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::ColumnType;

    #[test]
    fn types_are_inferred_per_column() {
        let ds = parse("name,n,x\na,1,1.5\nb,−2,2\nc,3,\n", b',').unwrap();
        assert_eq!(ds.names().collect::<Vec<_>>(), ["name", "n", "x"]);
        assert_eq!(ds.column_type(0), ColumnType::Str);
        assert_eq!(ds.column_type(1), ColumnType::Int);
        assert_eq!(ds.view(1).value_f64(1), Some(-2.0));
        assert_eq!(ds.column_type(2), ColumnType::Double);
        assert!(ds.column(2).is_null(2));
    }

    #[test]
    fn tabs_and_padding() {
        let ds = parse("a\tb\n 1 \tx y\n2\tz\n", b'\t').unwrap();
        assert_eq!(ds.column_type(0), ColumnType::Int);
        assert_eq!(ds.view(1).label(0), "x y");
    }

    #[test]
    fn mixed_cells_stay_text() {
        let ds = parse("v\n1\nn/a\n", b',').unwrap();
        assert_eq!(ds.column_type(0), ColumnType::Str);
        let ds = parse("v\nNaN\n1\n", b',').unwrap();
        assert_eq!(ds.column_type(0), ColumnType::Str);
    }

    #[test]
    fn header_only_is_empty() {
        assert!(matches!(parse("a,b\n", b','), Err(ParseError::Empty)));
        assert!(matches!(parse("", b','), Err(ParseError::Empty)));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        assert!(matches!(parse("a,b\n1,2\n3\n", b','), Err(ParseError::Csv(_))));
    }
}
