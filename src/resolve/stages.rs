//! The individual resolution stages, in pipeline order.

use tracing::debug;

use super::{ColumnRef, Draft, HeightPolicy, PlotKind};
use crate::core::{
    data::ColumnType,
    error::{ColumnRole, ResolveError},
};

// --- Helpers ---

fn lookup(d: &Draft<'_>, r: &ColumnRef, role: ColumnRole) -> Result<usize, ResolveError> {
    let count = d.ds.column_count();
    let by_id = match r.id {
        Some(index) if index >= count => {
            return Err(ResolveError::ColumnIndexOutOfRange { index, count });
        }
        other => other,
    };
    let by_name = match &r.name {
        Some(name) => Some(
            d.ds.find(name)
                .ok_or_else(|| ResolveError::UnknownColumnName(name.clone()))?,
        ),
        None => None,
    };
    match (by_id, by_name) {
        (Some(index), Some(named)) if index != named => {
            Err(ResolveError::ConflictingColumnReference {
                role,
                index,
                name: r.name.clone().unwrap_or_default(),
            })
        }
        (Some(i), _) | (None, Some(i)) => Ok(i),
        // an empty reference names nothing; treat like an unknown name
        (None, None) => Err(ResolveError::UnknownColumnName(String::new())),
    }
}

impl Draft<'_> {
    #[inline]
    fn is_arithmetic(&self, i: usize) -> bool {
        self.ds.column_type(i).is_arithmetic()
    }

    #[inline]
    fn is_ts(&self, i: usize) -> bool {
        self.is_arithmetic(i) && self.assessments[i].is_time_series_like
    }

    /// Arithmetic and not claimed as label or category.
    #[inline]
    fn is_useable(&self, i: usize) -> bool {
        self.is_arithmetic(i) && Some(i) != self.label && Some(i) != self.category
    }

    fn useable(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.ds.column_count()).filter(|&i| self.is_useable(i))
    }

    #[inline]
    fn kind(&self) -> PlotKind {
        self.kind.unwrap_or_else(|| unreachable!("kind stage runs first"))
    }

    fn name(&self, i: usize) -> String {
        self.ds.name(i).to_owned()
    }
}

// --- Stage 1: names to ids ---

pub(super) fn names_to_ids(d: &mut Draft<'_>) -> Result<(), ResolveError> {
    let req = d.request;
    d.label = req
        .label
        .as_ref()
        .map(|r| lookup(d, r, ColumnRole::Label))
        .transpose()?;
    d.category = req
        .category
        .as_ref()
        .map(|r| lookup(d, r, ColumnRole::Category))
        .transpose()?;
    d.values = req
        .values
        .iter()
        .map(|r| lookup(d, r, ColumnRole::Value))
        .collect::<Result<_, _>>()?;
    d.values_explicit = !d.values.is_empty();
    Ok(())
}

// --- Stage 2: plot kind ---

pub(super) fn infer_kind(d: &mut Draft<'_>) -> Result<(), ResolveError> {
    if d.kind.is_some() {
        return Ok(());
    }
    let useable: Vec<usize> = d.useable().collect();
    if useable.is_empty() {
        return Err(ResolveError::NoUseableValueColumns);
    }
    let ts_count = useable.iter().filter(|&&i| d.is_ts(i)).count();
    let wanted = if d.values_explicit {
        d.values.len()
    } else {
        useable.len()
    };

    let kind = match d.label {
        Some(l) if d.ds.column_type(l) == ColumnType::Str => {
            if d.values.len() >= 2 {
                PlotKind::BarHorizontalMulti
            } else {
                PlotKind::BarVertical
            }
        }
        Some(l) if d.is_ts(l) => PlotKind::MultiLine,
        Some(_) => PlotKind::Scatter,
        // the time column itself cannot also be the only value column
        None if ts_count > 0 && useable.len() > 1 => PlotKind::MultiLine,
        None if wanted == 1 => PlotKind::BarVertical,
        None => PlotKind::BarMultiVertical,
    };
    debug!(%kind, useable = useable.len(), ts_count, "inferred plot kind");
    d.kind = Some(kind);
    Ok(())
}

// --- Stage 3: label / time column ---

pub(super) fn select_label(d: &mut Draft<'_>) -> Result<(), ResolveError> {
    let kind = d.kind();
    if let Some(l) = d.label {
        let fits = if kind.is_bar() {
            d.ds.column_type(l) == ColumnType::Str
        } else {
            d.is_arithmetic(l)
        };
        if !fits {
            return Err(ResolveError::KindConflictsWithColumn {
                kind,
                role: ColumnRole::Label,
                name: d.name(l),
                reason: if kind.is_bar() {
                    "bar labels must be text"
                } else {
                    "the x axis must be numeric"
                },
            });
        }
        if Some(l) == d.category {
            return Err(ResolveError::ColumnAlreadyClaimed {
                name: d.name(l),
                role: ColumnRole::Category,
            });
        }
        return Ok(());
    }

    let free = |i: &usize| Some(*i) != d.category && !d.values.contains(i);
    let mut candidates = (0..d.ds.column_count()).filter(free);
    let picked = match kind {
        PlotKind::MultiLine => candidates
            .find(|&i| d.is_ts(i))
            .ok_or(ResolveError::NoTimeSeriesColumn)?,
        PlotKind::Scatter => candidates
            .find(|&i| d.is_arithmetic(i) && !d.is_ts(i))
            .ok_or(ResolveError::NoScatterXColumn)?,
        _ => candidates
            .find(|&i| d.ds.column_type(i) == ColumnType::Str)
            .ok_or(ResolveError::NoStringLabelColumn { kind })?,
    };
    debug!(label = d.ds.name(picked), "selected label column");
    d.label = Some(picked);
    Ok(())
}

// --- Stage 4: category column ---

pub(super) fn select_category(d: &mut Draft<'_>) -> Result<(), ResolveError> {
    let kind = d.kind();
    if kind != PlotKind::Scatter {
        return match d.category {
            Some(_) => Err(ResolveError::CategoryNotAllowed { kind }),
            None => Ok(()),
        };
    }

    if let Some(c) = d.category {
        if !d.assessments[c].is_category_like {
            return Err(ResolveError::NotCategoryLike(d.name(c)));
        }
        if d.values.len() > 1 {
            return Err(ResolveError::CategoryWithMultipleValues);
        }
        return Ok(());
    }

    if d.values.len() > 1 {
        return Ok(());
    }
    let candidate = (0..d.ds.column_count()).find(|&i| {
        d.assessments[i].is_category_like && Some(i) != d.label && !d.values.contains(&i)
    });
    if let Some(c) = candidate {
        // only adopt it if a value column is still left afterwards
        let value_left = d.values_explicit || d.useable().any(|i| i != c);
        if value_left {
            debug!(category = d.ds.name(c), "adopted category column");
            d.category = Some(c);
        }
    }
    Ok(())
}

// --- Stage 5: value columns ---

pub(super) fn select_values(d: &mut Draft<'_>) -> Result<(), ResolveError> {
    let kind = d.kind();
    let (min, max) = kind.value_range(d.cfg, d.category.is_some());

    for (pos, &v) in d.values.iter().enumerate() {
        if !d.is_arithmetic(v) {
            return Err(ResolveError::ValueColumnNotArithmetic(d.name(v)));
        }
        let claimed_by = if Some(v) == d.label {
            Some(ColumnRole::Label)
        } else if Some(v) == d.category {
            Some(ColumnRole::Category)
        } else if d.values[..pos].contains(&v) {
            Some(ColumnRole::Value)
        } else {
            None
        };
        if let Some(role) = claimed_by {
            return Err(ResolveError::ColumnAlreadyClaimed {
                name: d.name(v),
                role,
            });
        }
    }
    if d.values.len() > max {
        return Err(ResolveError::TooManyValueColumns {
            kind,
            max,
            got: d.values.len(),
        });
    }

    let target = if d.values_explicit { min } else { max };
    let extra: Vec<usize> = d
        .useable()
        .filter(|i| !d.values.contains(i))
        .take(target.saturating_sub(d.values.len()))
        .collect();
    d.values.extend(extra);

    if d.values.len() < min {
        return Err(ResolveError::TooFewValueColumns {
            kind,
            min,
            got: d.values.len(),
        });
    }
    Ok(())
}

// --- Stage 6: size ---

pub(super) fn resolve_size(d: &mut Draft<'_>) -> Result<(), ResolveError> {
    let cfg = d.cfg;
    let width = match d.request.width {
        Some(w) if w < cfg.min_width => {
            return Err(ResolveError::WidthTooSmall {
                min: cfg.min_width,
                got: w,
            });
        }
        Some(w) if w > cfg.max_width => {
            return Err(ResolveError::WidthTooLarge {
                max: cfg.max_width,
                got: w,
            });
        }
        Some(w) => w,
        None => cfg.derived_width(),
    };
    let height = match d.request.height {
        Some(h) if h < cfg.min_height => {
            return Err(ResolveError::HeightTooSmall {
                min: cfg.min_height,
                got: h,
            });
        }
        Some(h) => HeightPolicy::Exact(h),
        None => HeightPolicy::Derived,
    };
    d.width = Some(width);
    d.height = Some(height);
    Ok(())
}

// --- Stage 7: display flags ---

pub(super) fn default_flags(d: &mut Draft<'_>) -> Result<(), ResolveError> {
    let req = d.request;
    d.axis_names = Some(req.axis_names.unwrap_or(false));
    d.axis_labels = Some(req.axis_labels.unwrap_or(false));
    d.auto_format = Some(req.auto_format.unwrap_or(true));
    d.legend = Some(req.legend.unwrap_or(false));
    Ok(())
}

// --- Stage 8: row filter ---

pub(super) fn filter_rows(d: &mut Draft<'_>) -> Result<(), ResolveError> {
    let mut selected: Vec<usize> = d.label.into_iter().chain(d.category).collect();
    selected.extend(&d.values);
    let included = d.ds.filter_flags(&selected, d.filter_sigma.max(0.0));
    debug!(
        kept = included.iter().filter(|k| **k).count(),
        of = included.len(),
        sigma = d.filter_sigma,
        "filtered rows"
    );
    d.included = Some(included);
    Ok(())
}
