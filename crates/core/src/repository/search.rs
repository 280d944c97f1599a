//! Search request/response types and the filter → sort → paginate stages.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 15;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    /// SQL keyword for `ORDER BY`.
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(DomainError::validation(format!(
                "sort_dir must be 'asc' or 'desc', got '{other}'"
            ))),
        }
    }
}

/// Raw, untrusted search input (query string, use-case input).
///
/// Converted into [`SearchParams`] with normalisation; nothing here is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchInput {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub sort: Option<String>,
    pub sort_dir: Option<String>,
    pub filter: Option<String>,
}

impl SearchInput {
    pub fn with_page(mut self, page: i64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_per_page(mut self, per_page: i64) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn with_sort_dir(mut self, sort_dir: impl Into<String>) -> Self {
        self.sort_dir = Some(sort_dir.into());
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

/// Normalised search request.
///
/// - `page >= 1` (default 1), `per_page >= 1` (default 15)
/// - `sort` is never empty
/// - `sort_dir` is `None` exactly when `sort` is `None`; otherwise `asc` unless `desc` was asked
/// - `filter` is never empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchParams {
    page: u32,
    per_page: u32,
    sort: Option<String>,
    sort_dir: Option<SortDirection>,
    filter: Option<String>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
            sort: None,
            sort_dir: None,
            filter: None,
        }
    }
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn sort(&self) -> Option<&str> {
        self.sort.as_deref()
    }

    pub fn sort_dir(&self) -> Option<SortDirection> {
        self.sort_dir
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Number of items skipped before the requested page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }
}

fn positive_or(value: Option<i64>, default: u32) -> u32 {
    match value {
        Some(v) if v >= 1 => u32::try_from(v).unwrap_or(u32::MAX),
        _ => default,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

impl From<SearchInput> for SearchParams {
    fn from(input: SearchInput) -> Self {
        let sort = non_empty(input.sort);
        let sort_dir = sort.as_ref().map(|_| {
            input
                .sort_dir
                .as_deref()
                .and_then(|d| d.parse().ok())
                .unwrap_or(SortDirection::Asc)
        });

        Self {
            page: positive_or(input.page, DEFAULT_PAGE),
            per_page: positive_or(input.per_page, DEFAULT_PER_PAGE),
            sort,
            sort_dir,
            filter: non_empty(input.filter),
        }
    }
}

/// One page of a search, with the metadata of the whole filtered set.
///
/// `sort`, `sort_dir` and `filter` echo the (normalised) request; they do not
/// report a default ordering the repository may have applied.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult<E> {
    items: Vec<E>,
    total: u64,
    current_page: u32,
    per_page: u32,
    last_page: u32,
    sort: Option<String>,
    sort_dir: Option<SortDirection>,
    filter: Option<String>,
}

impl<E> SearchResult<E> {
    /// `total` is the filtered count before pagination.
    pub fn new(items: Vec<E>, total: u64, params: &SearchParams) -> Self {
        Self {
            items,
            total,
            current_page: params.page,
            per_page: params.per_page,
            last_page: last_page(total, params.per_page),
            sort: params.sort.clone(),
            sort_dir: params.sort_dir,
            filter: params.filter.clone(),
        }
    }

    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn into_items(self) -> Vec<E> {
        self.items
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn last_page(&self) -> u32 {
        self.last_page
    }

    pub fn sort(&self) -> Option<&str> {
        self.sort.as_deref()
    }

    pub fn sort_dir(&self) -> Option<SortDirection> {
        self.sort_dir
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }
}

/// `ceil(total / per_page)`, at least 1.
pub fn last_page(total: u64, per_page: u32) -> u32 {
    let per_page = u64::from(per_page.max(1));
    let pages = total.div_ceil(per_page).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Comparable projection of one entity field.
///
/// Values of the same kind use their natural order (lexicographic text,
/// chronological timestamps, numeric numbers). Mixed kinds order by kind, with
/// `Null` first.
#[derive(Debug, Clone)]
pub enum SortKey {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl SortKey {
    fn rank(&self) -> u8 {
        match self {
            SortKey::Null => 0,
            SortKey::Bool(_) => 1,
            SortKey::Integer(_) | SortKey::Float(_) => 2,
            SortKey::Text(_) => 3,
            SortKey::Timestamp(_) => 4,
        }
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Bool(a), SortKey::Bool(b)) => a.cmp(b),
            (SortKey::Integer(a), SortKey::Integer(b)) => a.cmp(b),
            (SortKey::Float(a), SortKey::Float(b)) => a.total_cmp(b),
            (SortKey::Integer(a), SortKey::Float(b)) => (*a as f64).total_cmp(b),
            (SortKey::Float(a), SortKey::Integer(b)) => a.total_cmp(&(*b as f64)),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Timestamp(a), SortKey::Timestamp(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

impl From<&str> for SortKey {
    fn from(value: &str) -> Self {
        SortKey::Text(value.to_string())
    }
}

impl From<String> for SortKey {
    fn from(value: String) -> Self {
        SortKey::Text(value)
    }
}

impl From<i64> for SortKey {
    fn from(value: i64) -> Self {
        SortKey::Integer(value)
    }
}

impl From<f64> for SortKey {
    fn from(value: f64) -> Self {
        SortKey::Float(value)
    }
}

impl From<bool> for SortKey {
    fn from(value: bool) -> Self {
        SortKey::Bool(value)
    }
}

impl From<DateTime<Utc>> for SortKey {
    fn from(value: DateTime<Utc>) -> Self {
        SortKey::Timestamp(value)
    }
}

impl<T: Into<SortKey>> From<Option<T>> for SortKey {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SortKey::Null)
    }
}

type FilterFn<E> = dyn Fn(&E, &str) -> bool + Send + Sync;
type KeyFn<E> = dyn Fn(&E) -> SortKey + Send + Sync;

/// A sortable field: its public name and how to read it from an entity.
pub struct SortField<E> {
    name: &'static str,
    key: Arc<KeyFn<E>>,
}

impl<E> SortField<E> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn key(&self, item: &E) -> SortKey {
        (self.key)(item)
    }
}

impl<E> Clone for SortField<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            key: Arc::clone(&self.key),
        }
    }
}

/// Search strategy injected into a searchable repository: the filter predicate,
/// the sortable-field allow-list and the default ordering.
pub struct SearchConfig<E> {
    filter: Arc<FilterFn<E>>,
    sortable: Vec<SortField<E>>,
    default_sort: Option<(&'static str, SortDirection)>,
}

impl<E> Clone for SearchConfig<E> {
    fn clone(&self) -> Self {
        Self {
            filter: Arc::clone(&self.filter),
            sortable: self.sortable.clone(),
            default_sort: self.default_sort,
        }
    }
}

impl<E> fmt::Debug for SearchConfig<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchConfig")
            .field("sortable", &self.sortable_fields())
            .field("default_sort", &self.default_sort)
            .finish_non_exhaustive()
    }
}

impl<E> SearchConfig<E> {
    /// `filter(item, term)` decides whether `item` matches a non-empty filter term.
    pub fn new<F>(filter: F) -> Self
    where
        F: Fn(&E, &str) -> bool + Send + Sync + 'static,
    {
        Self {
            filter: Arc::new(filter),
            sortable: Vec::new(),
            default_sort: None,
        }
    }

    /// Add `name` to the allow-list, read through `key`.
    pub fn sortable<K>(mut self, name: &'static str, key: K) -> Self
    where
        K: Fn(&E) -> SortKey + Send + Sync + 'static,
    {
        self.sortable.push(SortField {
            name,
            key: Arc::new(key),
        });
        self
    }

    /// Ordering used when no sort, or a non-sortable field, is requested.
    /// Ignored unless `field` is itself sortable.
    pub fn default_sort(mut self, field: &'static str, direction: SortDirection) -> Self {
        self.default_sort = Some((field, direction));
        self
    }

    pub fn sortable_fields(&self) -> Vec<&'static str> {
        self.sortable.iter().map(SortField::name).collect()
    }

    pub fn is_sortable(&self, field: &str) -> bool {
        self.field(field).is_some()
    }

    pub fn default_order(&self) -> Option<(&'static str, SortDirection)> {
        self.default_sort
    }

    fn field(&self, name: &str) -> Option<&SortField<E>> {
        self.sortable.iter().find(|f| f.name == name)
    }

    /// Keep the items matching `filter`. Without a filter the input is returned
    /// as is and the predicate is never called.
    pub fn apply_filter<'a>(&self, items: Vec<&'a E>, filter: Option<&str>) -> Vec<&'a E> {
        match filter {
            None | Some("") => items,
            Some(term) => items.into_iter().filter(|item| (self.filter)(*item, term)).collect(),
        }
    }

    /// Stable sort on a copy of `items`.
    ///
    /// A sortable `sort` field wins; otherwise the default ordering applies; with
    /// neither, the input order is kept.
    pub fn apply_sort<'a>(
        &self,
        items: &[&'a E],
        sort: Option<&str>,
        sort_dir: Option<SortDirection>,
    ) -> Vec<&'a E> {
        let requested = sort
            .and_then(|name| self.field(name))
            .map(|field| (field, sort_dir.unwrap_or(SortDirection::Asc)));
        let chosen = requested.or_else(|| {
            self.default_sort
                .and_then(|(name, dir)| self.field(name).map(|field| (field, dir)))
        });

        let mut sorted = items.to_vec();
        if let Some((field, direction)) = chosen {
            sorted.sort_by(|a, b| {
                let ordering = field.key(a).cmp(&field.key(b));
                match direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }
        sorted
    }

    /// Half-open slice `[(page - 1) * per_page, page * per_page)`; empty past the end.
    pub fn apply_paginate<'a>(items: &[&'a E], page: u32, per_page: u32) -> Vec<&'a E> {
        let per_page = per_page as usize;
        let start = (page.max(1) as usize - 1).saturating_mul(per_page);
        if start >= items.len() {
            return Vec::new();
        }
        let end = start.saturating_add(per_page).min(items.len());
        items[start..end].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_params() {
        let params = SearchParams::new();
        assert_eq!(params.page(), 1);
        assert_eq!(params.per_page(), 15);
        assert_eq!(params.sort(), None);
        assert_eq!(params.sort_dir(), None);
        assert_eq!(params.filter(), None);
        assert_eq!(params, SearchParams::from(SearchInput::default()));
    }

    #[test]
    fn page_falls_back_to_one() {
        for (page, expected) in [(None, 1), (Some(0), 1), (Some(-1), 1), (Some(1), 1), (Some(2), 2)] {
            let params = SearchParams::from(SearchInput { page, ..Default::default() });
            assert_eq!(params.page(), expected, "page {page:?}");
        }
    }

    #[test]
    fn per_page_falls_back_to_fifteen() {
        for (per_page, expected) in [(None, 15), (Some(0), 15), (Some(-1), 15), (Some(1), 1), (Some(10), 10)] {
            let params = SearchParams::from(SearchInput { per_page, ..Default::default() });
            assert_eq!(params.per_page(), expected, "per_page {per_page:?}");
        }
    }

    #[test]
    fn empty_sort_and_filter_become_none() {
        let params = SearchParams::from(SearchInput::default().with_sort("").with_filter(""));
        assert_eq!(params.sort(), None);
        assert_eq!(params.filter(), None);
    }

    #[test]
    fn sort_dir_depends_on_sort() {
        let cases = [
            (None, Some("desc"), None),
            (Some("field"), None, Some(SortDirection::Asc)),
            (Some("field"), Some("asc"), Some(SortDirection::Asc)),
            (Some("field"), Some("ASC"), Some(SortDirection::Asc)),
            (Some("field"), Some("desc"), Some(SortDirection::Desc)),
            (Some("field"), Some("DESC"), Some(SortDirection::Desc)),
            (Some("field"), Some("sideways"), Some(SortDirection::Asc)),
        ];
        for (sort, sort_dir, expected) in cases {
            let params = SearchParams::from(SearchInput {
                sort: sort.map(str::to_string),
                sort_dir: sort_dir.map(str::to_string),
                ..Default::default()
            });
            assert_eq!(params.sort_dir(), expected, "sort {sort:?} dir {sort_dir:?}");
        }
    }

    #[test]
    fn input_deserializes_from_partial_json() {
        let input: SearchInput = serde_json::from_value(json!({ "page": 2, "filter": "a" })).unwrap();
        let params = SearchParams::from(input);
        assert_eq!(params.page(), 2);
        assert_eq!(params.per_page(), 15);
        assert_eq!(params.filter(), Some("a"));
        assert_eq!(params.offset(), 15);
    }

    #[test]
    fn result_computes_last_page() {
        let params = SearchParams::from(SearchInput::default().with_per_page(10));
        for (total, expected) in [(0, 1), (1, 1), (10, 1), (11, 2), (101, 11)] {
            let result: SearchResult<()> = SearchResult::new(vec![], total, &params);
            assert_eq!(result.last_page(), expected, "total {total}");
        }
    }

    #[test]
    fn result_echoes_the_request() {
        let params = SearchParams::from(
            SearchInput::default().with_page(2).with_per_page(2).with_sort("name").with_filter("a"),
        );
        let result = SearchResult::new(vec!["x"], 3, &params);
        assert_eq!(result.items(), ["x"]);
        assert_eq!(result.total(), 3);
        assert_eq!(result.current_page(), 2);
        assert_eq!(result.per_page(), 2);
        assert_eq!(result.last_page(), 2);
        assert_eq!(result.sort(), Some("name"));
        assert_eq!(result.sort_dir(), Some(SortDirection::Asc));
        assert_eq!(result.filter(), Some("a"));
    }

    #[test]
    fn sort_keys_order_naturally() {
        assert!(SortKey::from("AAA") < SortKey::from("AaA"));
        assert!(SortKey::from("AaA") < SortKey::from("a"));
        assert!(SortKey::from(2_i64) < SortKey::from(10_i64));
        assert!(SortKey::from(1.5_f64) < SortKey::from(2_i64));
        assert!(SortKey::Null < SortKey::from("a"));
        assert_eq!(SortKey::from(None::<String>), SortKey::Null);
    }

    #[test]
    fn sort_direction_parses_and_displays() {
        assert_eq!("DESC".parse::<SortDirection>().unwrap(), SortDirection::Desc);
        assert!("up".parse::<SortDirection>().is_err());
        assert_eq!(SortDirection::Asc.to_string(), "asc");
        assert_eq!(SortDirection::Desc.as_sql(), "DESC");
    }
}
