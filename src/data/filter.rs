use super::error::{DataError, Result};
use super::model::{Cell, ResultsTable};
use super::series::Series;

// ---------------------------------------------------------------------------
// Filter predicate: column = value, all terms must hold
// ---------------------------------------------------------------------------

/// Conjunction of column-equals-value constraints.
///
/// Values are compared with [`Cell::loosely_eq`], so `100`, `100.0` and
/// `"100"` select the same rows. An empty filter selects every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    terms: Vec<(String, Cell)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `column == value` term.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Cell>) -> Self {
        self.terms.push((column.into(), value.into()));
        self
    }

    /// Build a filter from parallel column and value sequences.
    pub fn zip<C, V>(columns: C, values: V) -> Result<Self>
    where
        C: IntoIterator,
        C::Item: Into<String>,
        V: IntoIterator,
        V::Item: Into<Cell>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let values: Vec<Cell> = values.into_iter().map(Into::into).collect();
        if columns.len() != values.len() {
            return Err(DataError::FilterArity {
                columns: columns.len(),
                values: values.len(),
            });
        }
        Ok(Filter {
            terms: columns.into_iter().zip(values).collect(),
        })
    }

    /// Resolve the term columns against `table` once, so row matching is a
    /// plain index lookup.
    fn bind<'a>(&'a self, table: &ResultsTable) -> Result<Vec<(usize, &'a Cell)>> {
        self.terms
            .iter()
            .map(|(col, val)| Ok((table.column_index(col)?, val)))
            .collect()
    }
}

/// Return indices of rows that satisfy every term of `filter`, in table order.
pub fn matching_rows(table: &ResultsTable, filter: &Filter) -> Result<Vec<usize>> {
    let bound = filter.bind(table)?;
    Ok(table
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| bound.iter().all(|(idx, want)| row[*idx].loosely_eq(want)))
        .map(|(i, _)| i)
        .collect())
}

/// Project the rows selected by `filter` onto an (`x_column`, `y_column`)
/// series, preserving row order.
///
/// No rows matching is not an error: the result is an empty series. A `y`
/// cell without a numeric reading is a [`DataError::NonNumeric`].
pub fn query(table: &ResultsTable, x_column: &str, y_column: &str, filter: &Filter) -> Result<Series> {
    let x_idx = table.column_index(x_column)?;
    let y_idx = table.column_index(y_column)?;
    let rows = matching_rows(table, filter)?;

    let mut series = Series::with_capacity(rows.len());
    for row_no in rows {
        let row = &table.rows()[row_no];
        let y = row[y_idx].as_f64().ok_or_else(|| DataError::NonNumeric {
            path: table.source().to_path_buf(),
            column: y_column.to_string(),
            row: row_no,
            value: row[y_idx].token(),
        })?;
        series.push(row[x_idx].clone(), y);
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn table(rows: Vec<Vec<Cell>>) -> ResultsTable {
        ResultsTable::new(
            "bench.csv",
            vec!["algo".into(), "key".into(), "u".into(), "thr".into()],
            rows,
        )
        .unwrap()
    }

    fn row(algo: &str, key: i64, u: f64, thr: f64) -> Vec<Cell> {
        vec![Cell::from(algo), Cell::Integer(key), Cell::Float(u), Cell::Float(thr)]
    }

    #[test]
    fn selects_rows_matching_every_term() {
        let t = table(vec![
            vec![Cell::from("x-a"), Cell::Integer(100), Cell::Integer(0), Cell::Integer(10)],
            vec![Cell::from("x-b"), Cell::Integer(100), Cell::Integer(0), Cell::Integer(5)],
        ]);
        let filter = Filter::zip(["algo", "key", "u"], [Cell::from("x-a"), Cell::from(100), Cell::from(0)]).unwrap();
        let s = query(&t, "thr", "thr", &filter).unwrap();
        assert_eq!(s.x, vec![Cell::Integer(10)]);
        assert_eq!(s.y, vec![10.0]);
    }

    #[test]
    fn string_filter_values_match_numeric_cells() {
        let t = table(vec![row("a", 100, 50.0, 1.0), row("a", 100, 90.0, 2.0)]);
        let filter = Filter::new().eq("u", "50.0").eq("key", "100");
        let s = query(&t, "u", "thr", &filter).unwrap();
        assert_eq!(s.y, vec![1.0]);
    }

    #[test]
    fn keeps_table_order_and_duplicates() {
        let t = table(vec![
            row("a", 1, 48.0, 3.0),
            row("a", 1, 24.0, 1.0),
            row("b", 1, 24.0, 9.0),
            row("a", 1, 48.0, 4.0),
        ]);
        let s = query(&t, "u", "thr", &Filter::new().eq("algo", "a")).unwrap();
        assert_eq!(s.x, vec![Cell::Float(48.0), Cell::Float(24.0), Cell::Float(48.0)]);
        assert_eq!(s.y, vec![3.0, 1.0, 4.0]);
    }

    #[test]
    fn non_finite_tokens_select_their_own_rows() {
        let t = table(vec![
            vec![Cell::parse("nan"), Cell::Integer(1), Cell::Integer(0), Cell::Integer(7)],
            vec![Cell::parse("inf"), Cell::Integer(1), Cell::Integer(0), Cell::Integer(8)],
        ]);
        let s = query(&t, "key", "thr", &Filter::new().eq("algo", "nan")).unwrap();
        assert_eq!(s.y, vec![7.0]);
        let s = query(&t, "key", "thr", &Filter::new().eq("algo", "inf")).unwrap();
        assert_eq!(s.y, vec![8.0]);
    }

    #[test]
    fn no_match_is_an_empty_series() {
        let t = table(vec![row("a", 1, 0.0, 1.0)]);
        let s = query(&t, "u", "thr", &Filter::new().eq("algo", "zzz")).unwrap();
        assert!(s.is_empty());
        assert!(s.x.is_empty());
    }

    #[test]
    fn empty_filter_selects_everything() {
        let t = table(vec![row("a", 1, 0.0, 1.0), row("b", 2, 0.0, 2.0)]);
        assert_eq!(query(&t, "key", "thr", &Filter::new()).unwrap().len(), 2);
    }

    #[test]
    fn non_numeric_y_is_a_format_error() {
        let t = table(vec![vec![Cell::from("a"), Cell::Integer(1), Cell::Null, Cell::from("fast")]]);
        let err = query(&t, "u", "thr", &Filter::new()).unwrap_err();
        match err {
            DataError::NonNumeric { column, row, value, .. } => {
                assert_eq!(column, "thr");
                assert_eq!(row, 0);
                assert_eq!(value, "fast");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_filter_column_is_reported() {
        let t = table(vec![row("a", 1, 0.0, 1.0)]);
        let err = query(&t, "u", "thr", &Filter::new().eq("rq_rate", 50)).unwrap_err();
        assert!(matches!(err, DataError::UnknownColumn { ref column, .. } if column == "rq_rate"));
    }

    #[test]
    fn zip_requires_parallel_sequences() {
        let err = Filter::zip(["a", "b"], [Cell::from(1)]).unwrap_err();
        assert!(matches!(err, DataError::FilterArity { columns: 2, values: 1 }));
    }

    proptest! {
        #[test]
        fn query_returns_exactly_the_matching_rows_in_order(
            rows in prop::collection::vec((0..3usize, 0..4i64, 0..1000i64), 0..40),
            want_algo in 0..3usize,
            want_key in 0..4i64,
        ) {
            let names = ["x-a", "x-b", "x-c"];
            let t = table(
                rows.iter()
                    .map(|&(a, k, thr)| row(names[a], k, 0.0, thr as f64))
                    .collect(),
            );
            let filter = Filter::new().eq("algo", names[want_algo]).eq("key", want_key);
            let s = query(&t, "key", "thr", &filter).unwrap();

            let expected: Vec<f64> = rows
                .iter()
                .filter(|&&(a, k, _)| a == want_algo && k == want_key)
                .map(|&(_, _, thr)| thr as f64)
                .collect();
            prop_assert_eq!(s.len(), expected.len());
            prop_assert_eq!(s.y, expected);
        }
    }
}
