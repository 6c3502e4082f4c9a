//! Typed columnar store with per-row validity flags.
//!
//! Columns keep their original field order.  All columns (and their flag
//! vectors) always have the same length; [`DataStore::append`] grows them
//! in lockstep and refuses rows of another schema.

use std::{collections::HashMap, fmt};

use crate::core::error::DataError;

/// Per-row flag bits.  `0` means the cell is valid.
pub type RowFlags = u8;
pub const FLAG_NULL: RowFlags = 1;
pub const FLAG_OUTLIER: RowFlags = 1 << 1;

/// Element kind of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Str,
    Int,
    Double,
}

impl ColumnType {
    #[inline]
    #[must_use]
    pub fn is_arithmetic(self) -> bool {
        !matches!(self, Self::Str)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Str => "string",
            Self::Int => "integer",
            Self::Double => "double",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owned column payload.  Null cells hold a placeholder (`""`, `0`, `NaN`)
/// and are marked in the column's flags.
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnData {
    Str(Vec<String>),
    Int(Vec<i64>),
    Double(Vec<f64>),
}

impl ColumnData {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Str(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::Double(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn column_type(&self) -> ColumnType {
        match self {
            Self::Str(_) => ColumnType::Str,
            Self::Int(_) => ColumnType::Int,
            Self::Double(_) => ColumnType::Double,
        }
    }

    #[must_use]
    pub fn view(&self) -> ColumnView<'_> {
        match self {
            Self::Str(v) => ColumnView::Str(v),
            Self::Int(v) => ColumnView::Int(v),
            Self::Double(v) => ColumnView::Double(v),
        }
    }
}

/// Borrowed, tagged view into one column.
#[derive(Clone, Copy, Debug)]
pub enum ColumnView<'a> {
    Str(&'a [String]),
    Int(&'a [i64]),
    Double(&'a [f64]),
}

impl ColumnView<'_> {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Str(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::Double(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_arithmetic(&self) -> bool {
        !matches!(self, Self::Str(_))
    }

    /// Numeric value of row `i`; `None` for string columns.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn value_f64(&self, i: usize) -> Option<f64> {
        match self {
            Self::Str(_) => None,
            Self::Int(v) => v.get(i).map(|&x| x as f64),
            Self::Double(v) => v.get(i).copied(),
        }
    }

    /// Printable form of row `i`.
    #[must_use]
    pub fn label(&self, i: usize) -> String {
        match self {
            Self::Str(v) => v.get(i).cloned().unwrap_or_default(),
            Self::Int(v) => v.get(i).map(ToString::to_string).unwrap_or_default(),
            Self::Double(v) => v.get(i).map(ToString::to_string).unwrap_or_default(),
        }
    }
}

/// One named attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
    flags: Vec<RowFlags>,
}

impl Column {
    /// Column without nulls.
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        let flags = vec![0; data.len()];
        Self {
            name: name.into(),
            data,
            flags,
        }
    }

    /// Column with explicit flags; lengths must agree.
    pub fn with_flags(
        name: impl Into<String>,
        data: ColumnData,
        flags: Vec<RowFlags>,
    ) -> Result<Self, DataError> {
        let name = name.into();
        if flags.len() != data.len() {
            return Err(DataError::RaggedColumns {
                name,
                want: data.len(),
                got: flags.len(),
            });
        }
        Ok(Self { name, data, flags })
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
    #[inline]
    #[must_use]
    pub fn column_type(&self) -> ColumnType {
        self.data.column_type()
    }
    #[inline]
    #[must_use]
    pub fn data(&self) -> &ColumnData {
        &self.data
    }
    #[inline]
    #[must_use]
    pub fn view(&self) -> ColumnView<'_> {
        self.data.view()
    }
    #[inline]
    #[must_use]
    pub fn flags(&self) -> &[RowFlags] {
        &self.flags
    }
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
    #[inline]
    #[must_use]
    pub fn is_null(&self, row: usize) -> bool {
        self.flags.get(row).is_some_and(|f| f & FLAG_NULL != 0)
    }

    fn extend(&mut self, other: Column) {
        match (&mut self.data, other.data) {
            (ColumnData::Str(a), ColumnData::Str(b)) => a.extend(b),
            (ColumnData::Int(a), ColumnData::Int(b)) => a.extend(b),
            (ColumnData::Double(a), ColumnData::Double(b)) => a.extend(b),
            _ => unreachable!("schema checked before extend"),
        }
        self.flags.extend(other.flags);
    }
}

/// Ordered collection of equally long columns.
#[derive(Clone, Debug, Default)]
pub struct DataStore {
    columns: Vec<Column>,
    by_name: HashMap<String, usize>,
    rows: usize,
}

impl DataStore {
    pub fn new(columns: Vec<Column>) -> Result<Self, DataError> {
        let rows = columns.first().map_or(0, Column::len);
        let mut by_name = HashMap::with_capacity(columns.len());
        for (i, c) in columns.iter().enumerate() {
            if c.len() != rows {
                return Err(DataError::RaggedColumns {
                    name: c.name.clone(),
                    want: rows,
                    got: c.len(),
                });
            }
            if by_name.insert(c.name.clone(), i).is_some() {
                return Err(DataError::DuplicateName(c.name.clone()));
            }
        }
        Ok(Self {
            columns,
            by_name,
            rows,
        })
    }

    #[inline]
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
    #[inline]
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows
    }
    #[inline]
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }
    #[inline]
    #[must_use]
    pub fn column(&self, i: usize) -> &Column {
        &self.columns[i]
    }
    #[inline]
    #[must_use]
    pub fn view(&self, i: usize) -> ColumnView<'_> {
        self.columns[i].view()
    }
    #[inline]
    #[must_use]
    pub fn column_type(&self, i: usize) -> ColumnType {
        self.columns[i].column_type()
    }
    #[inline]
    #[must_use]
    pub fn name(&self, i: usize) -> &str {
        self.columns[i].name()
    }
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }
    /// Exact-match name lookup.
    #[inline]
    #[must_use]
    pub fn find(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Grow every column with `other`'s rows.  Column count, names, order
    /// and types must be identical; nothing changes on failure.
    pub fn append(&mut self, other: DataStore) -> Result<(), DataError> {
        if other.columns.len() != self.columns.len() {
            return Err(DataError::SchemaMismatch(format!(
                "{} columns, expected {}",
                other.columns.len(),
                self.columns.len()
            )));
        }
        for (mine, theirs) in self.columns.iter().zip(&other.columns) {
            if mine.name != theirs.name || mine.column_type() != theirs.column_type() {
                return Err(DataError::SchemaMismatch(format!(
                    "`{}` ({}) where `{}` ({}) was expected",
                    theirs.name,
                    theirs.column_type(),
                    mine.name,
                    mine.column_type()
                )));
            }
        }
        self.rows += other.rows;
        for (mine, theirs) in self.columns.iter_mut().zip(other.columns) {
            mine.extend(theirs);
        }
        Ok(())
    }

    /// Per-row inclusion mask for the selected columns.
    ///
    /// A row is excluded when any selected column is null there, or, with
    /// `sigma > 0`, when any selected numeric column deviates from its mean
    /// (over the rows not already excluded) by more than `sigma` standard
    /// deviations.
    #[must_use]
    pub fn filter_flags(&self, selected: &[usize], sigma: f64) -> Vec<bool> {
        let mut flags = vec![0 as RowFlags; self.rows];
        for &c in selected {
            for (f, own) in flags.iter_mut().zip(self.columns[c].flags()) {
                *f |= own & FLAG_NULL;
            }
        }

        if sigma > 0.0 {
            let stats: Vec<_> = selected
                .iter()
                .filter_map(|&c| {
                    let view = self.view(c);
                    mean_std(&view, &flags).map(|(m, s)| (view, m, s))
                })
                .collect();
            for (row, f) in flags.iter_mut().enumerate() {
                if *f != 0 {
                    continue;
                }
                let outlier = stats.iter().any(|(view, mean, std)| {
                    view.value_f64(row)
                        .is_some_and(|v| (v - mean).abs() > sigma * std)
                });
                if outlier {
                    *f |= FLAG_OUTLIER;
                }
            }
        }
        flags.into_iter().map(|f| f == 0).collect()
    }
}

/// Population mean / standard deviation over unflagged rows.
#[allow(clippy::cast_precision_loss)]
fn mean_std(view: &ColumnView<'_>, flags: &[RowFlags]) -> Option<(f64, f64)> {
    if !view.is_arithmetic() {
        return None;
    }
    let values: Vec<f64> = flags
        .iter()
        .enumerate()
        .filter(|(_, f)| **f == 0)
        .filter_map(|(i, _)| view.value_f64(i))
        .collect();
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some((mean, var.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> DataStore {
        DataStore::new(vec![
            Column::new(
                "name",
                ColumnData::Str(vec!["a".into(), "b".into(), "c".into()]),
            ),
            Column::with_flags("n", ColumnData::Int(vec![1, 0, 3]), vec![0, FLAG_NULL, 0])
                .unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn lookup_by_name_is_exact() {
        let ds = store();
        assert_eq!(ds.find("n"), Some(1));
        assert_eq!(ds.find("N"), None);
        assert_eq!(ds.names().collect::<Vec<_>>(), ["name", "n"]);
    }

    #[test]
    fn ragged_columns_are_rejected() {
        let err = DataStore::new(vec![
            Column::new("a", ColumnData::Int(vec![1, 2])),
            Column::new("b", ColumnData::Int(vec![1])),
        ])
        .unwrap_err();
        assert!(matches!(err, DataError::RaggedColumns { want: 2, got: 1, .. }));
    }

    #[test]
    fn append_keeps_columns_in_lockstep() {
        let mut ds = store();
        ds.append(store()).unwrap();
        assert_eq!(ds.row_count(), 6);
        for c in ds.columns() {
            assert_eq!(c.len(), 6);
            assert_eq!(c.flags().len(), 6);
        }
        assert!(ds.column(1).is_null(4));
    }

    #[test]
    fn append_with_other_schema_changes_nothing() {
        let mut ds = store();
        let other = DataStore::new(vec![
            Column::new("name", ColumnData::Str(vec!["x".into()])),
            Column::new("n", ColumnData::Double(vec![1.0])),
        ])
        .unwrap();
        assert!(matches!(ds.append(other), Err(DataError::SchemaMismatch(_))));
        assert_eq!(ds.row_count(), 3);
        assert_eq!(ds.column_type(1), ColumnType::Int);
    }

    #[test]
    fn nulls_excluded_only_for_selected_columns() {
        let ds = store();
        assert_eq!(ds.filter_flags(&[0], 0.0), [true, true, true]);
        assert_eq!(ds.filter_flags(&[0, 1], 0.0), [true, false, true]);
    }

    #[test]
    fn outliers_excluded_when_sigma_set() {
        let mut v = vec![10.0; 20];
        v.push(1000.0);
        let ds = DataStore::new(vec![Column::new("v", ColumnData::Double(v))]).unwrap();
        let keep = ds.filter_flags(&[0], 2.0);
        assert!(keep[..20].iter().all(|k| *k));
        assert!(!keep[20]);
        assert!(ds.filter_flags(&[0], 0.0).iter().all(|k| *k));
    }
}
