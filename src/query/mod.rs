//! query
//!
//! Shared building blocks for the filtered listing endpoints: a typed
//! predicate list compiled into positional SQL, and pagination metadata.
//!
//! Listing queries and their paired count queries must filter identically,
//! so predicates are accumulated once as (fragment, parameter) pairs and
//! the rendered clause plus the parameter list are reused by both.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::{QueryAs, QueryScalar};
use sqlx::{FromRow, Postgres};

/// A single bound filter value.
#[derive(Debug, Clone)]
pub enum SqlParam {
    Text(String),
    Int(i64),
    Date(NaiveDate),
}

/// Accumulates WHERE predicates with their parameters. Fragments use `$?`
/// for the parameter slot; it is replaced with the next Postgres ordinal
/// at insertion time.
#[derive(Debug, Default)]
pub struct FilterSet {
    clauses: Vec<String>,
    params: Vec<SqlParam>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn params(&self) -> &[SqlParam] {
        &self.params
    }

    /// Ordinal the next bound value would get. LIMIT/OFFSET placeholders
    /// are appended after the filter parameters using this.
    pub fn next_ordinal(&self) -> usize {
        self.params.len() + 1
    }

    /// Add one `fragment AND`-combined predicate, e.g. `"b.status = $?"`.
    pub fn add(&mut self, fragment: &str, param: SqlParam) {
        let ordinal = self.next_ordinal();
        self.clauses.push(fragment.replace("$?", &format!("${ordinal}")));
        self.params.push(param);
    }

    /// Add a parenthesized OR group where every alternative matches the
    /// same value (each alternative gets its own bound copy).
    pub fn add_any(&mut self, fragments: &[&str], param: SqlParam) {
        let rendered: Vec<String> = fragments
            .iter()
            .map(|fragment| {
                let ordinal = self.next_ordinal();
                self.params.push(param.clone());
                fragment.replace("$?", &format!("${ordinal}"))
            })
            .collect();
        self.clauses.push(format!("({})", rendered.join(" OR ")));
    }

    /// ` WHERE c1 AND c2 ...`, or empty when no filter was added.
    pub fn where_clause(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    /// ` AND c1 AND c2 ...` for queries whose base already has a WHERE.
    pub fn and_clause(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" AND {}", self.clauses.join(" AND "))
        }
    }
}

/// Apply the accumulated parameters, in order, to a row query.
pub fn bind_params<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    params: &[SqlParam],
) -> QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    for param in params {
        query = match param {
            SqlParam::Text(v) => query.bind(v.clone()),
            SqlParam::Int(v) => query.bind(*v),
            SqlParam::Date(v) => query.bind(*v),
        };
    }
    query
}

/// Same as [`bind_params`], for scalar (count) queries.
pub fn bind_params_scalar<'q, O>(
    mut query: QueryScalar<'q, Postgres, O, PgArguments>,
    params: &[SqlParam],
) -> QueryScalar<'q, Postgres, O, PgArguments> {
    for param in params {
        query = match param {
            SqlParam::Text(v) => query.bind(v.clone()),
            SqlParam::Int(v) => query.bind(*v),
            SqlParam::Date(v) => query.bind(*v),
        };
    }
    query
}

/// Pagination metadata returned alongside every listing page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_records: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageMeta {
    pub fn new(page: u32, limit: u32, total_records: i64) -> Self {
        let total_pages = (total_records as u64).div_ceil(u64::from(limit)) as u32;
        PageMeta {
            current_page: page,
            total_pages,
            total_records,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

/// `(LIMIT, OFFSET)` for a 1-based page.
pub fn page_window(page: u32, limit: u32) -> (i64, i64) {
    (i64::from(limit), i64::from(page - 1) * i64::from(limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_filter_renders_no_clause() {
        let filters = FilterSet::new();
        assert!(filters.is_empty());
        assert_eq!(filters.where_clause(), "");
        assert_eq!(filters.and_clause(), "");
        assert_eq!(filters.next_ordinal(), 1);
    }

    #[test]
    fn predicates_get_sequential_ordinals() {
        let mut filters = FilterSet::new();
        filters.add("b.status = $?", SqlParam::Text("Pending".into()));
        filters.add("b.date >= $?", SqlParam::Date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
        filters.add("b.date <= $?", SqlParam::Date(NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()));

        assert_eq!(
            filters.where_clause(),
            " WHERE b.status = $1 AND b.date >= $2 AND b.date <= $3"
        );
        assert_eq!(filters.params().len(), 3);
        assert_eq!(filters.next_ordinal(), 4);
    }

    #[test]
    fn or_group_is_parenthesized_and_binds_one_copy_per_alternative() {
        let mut filters = FilterSet::new();
        filters.add("b.status = $?", SqlParam::Text("Pending".into()));
        filters.add_any(
            &["u.name ILIKE $?", "u.email ILIKE $?", "u.phone ILIKE $?", "s.brand ILIKE $?"],
            SqlParam::Text("%acer%".into()),
        );

        assert_eq!(
            filters.where_clause(),
            " WHERE b.status = $1 AND \
             (u.name ILIKE $2 OR u.email ILIKE $3 OR u.phone ILIKE $4 OR s.brand ILIKE $5)"
        );
        assert_eq!(filters.params().len(), 5);
    }

    #[test]
    fn and_clause_for_bases_with_their_own_where() {
        let mut filters = FilterSet::new();
        filters.add_any(&["u.name ILIKE $?", "u.email ILIKE $?"], SqlParam::Text("%jo%".into()));
        assert_eq!(filters.and_clause(), " AND (u.name ILIKE $1 OR u.email ILIKE $2)");
    }

    #[test]
    fn page_meta_math() {
        let meta = PageMeta::new(1, 10, 25);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_next);
        assert!(!meta.has_prev);

        let meta = PageMeta::new(3, 10, 25);
        assert!(!meta.has_next);
        assert!(meta.has_prev);

        // Page past the end is not an error: empty page, no next.
        let meta = PageMeta::new(9, 10, 25);
        assert!(!meta.has_next);
        assert!(meta.has_prev);
    }

    #[test]
    fn single_and_empty_result_sets_have_no_navigation() {
        for total in [0, 1, 10] {
            let meta = PageMeta::new(1, 10, total);
            assert!(meta.total_pages <= 1);
            assert!(!meta.has_next);
            assert!(!meta.has_prev);
        }
    }

    #[test]
    fn page_window_is_one_based() {
        assert_eq!(page_window(1, 10), (10, 0));
        assert_eq!(page_window(4, 25), (25, 75));
    }

    proptest! {
        /// Walking pages 1..=total_pages partitions the record set: every
        /// record appears exactly once and has_next is true on every page
        /// except the last.
        #[test]
        fn pages_partition_the_records(total in 0i64..500, limit in 1u32..50) {
            let records: Vec<i64> = (0..total).collect();
            let mut seen = Vec::new();
            let mut page = 1u32;
            loop {
                let meta = PageMeta::new(page, limit, total);
                prop_assert_eq!(meta.total_records, total);

                let (limit_n, offset) = page_window(page, limit);
                let chunk: Vec<i64> = records
                    .iter()
                    .skip(offset as usize)
                    .take(limit_n as usize)
                    .copied()
                    .collect();
                seen.extend(chunk);

                prop_assert_eq!(meta.has_next, page < meta.total_pages);
                prop_assert_eq!(meta.has_prev, page > 1);
                if !meta.has_next {
                    break;
                }
                page += 1;
            }
            prop_assert_eq!(seen, records);
        }
    }
}
