//! Search parameters for the query proxy.
//!
//! `SearchQuery` is the raw URL shape; `SearchParams` is the same request
//! after defaults and clamping are applied at the boundary. Pages are
//! one-based on the wire and zero-based internally.
//!
//! Decoding never rejects a query string: repeated taxonomy parameters are
//! merged, other repeated parameters keep their last value.

use serde_json::{Map, Value};

/// Results per page when `numResults` is absent or invalid.
pub const DEFAULT_NUM_RESULTS: u32 = 9;

/// Raw query-proxy parameters exactly as they arrive on the URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    /// Comma-separated content type names (`contenttypes` or `contentTypes`)
    pub content_types: Option<String>,
    /// Comma-separated location names
    pub locations: Option<String>,
    /// Comma-separated topic names
    pub topics: Option<String>,
    /// One-based page number
    pub page: Option<String>,
    /// Page size (`numResults`)
    pub num_results: Option<String>,
    /// `field` or `field:asc|desc`
    pub sort: Option<String>,
    /// Pre-built index filter, used when no taxonomy parameter is present
    pub filter: Option<String>,
}

impl SearchQuery {
    /// Collects decoded URL pairs in order.
    ///
    /// `topics=a&topics=b` reads as `topics=a,b`. Unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut query = Self::default();

        for (key, value) in pairs {
            let value = value.into();
            match key.as_ref() {
                "contenttypes" | "contentTypes" => merge_list(&mut query.content_types, value),
                "locations" => merge_list(&mut query.locations, value),
                "topics" => merge_list(&mut query.topics, value),
                "page" => query.page = Some(value),
                "numResults" => query.num_results = Some(value),
                "sort" => query.sort = Some(value),
                "filter" => query.filter = Some(value),
                _ => {},
            }
        }

        query
    }
}

/// Appends a comma-separated value, skipping empty parts.
fn merge_list(slot: &mut Option<String>, value: String) {
    if value.is_empty() {
        slot.get_or_insert_with(String::new);
        return;
    }
    match slot {
        Some(existing) if existing.is_empty() => *existing = value,
        Some(existing) => {
            existing.push(',');
            existing.push_str(&value);
        },
        None => *slot = Some(value),
    }
}

/// Query-proxy parameters with defaults and clamping applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    /// Comma-separated content type names
    pub content_types: Option<String>,
    /// Comma-separated location names
    pub locations: Option<String>,
    /// Comma-separated topic names
    pub topics: Option<String>,
    /// Zero-based page index
    pub page: u32,
    /// Page size, at least 1
    pub num_results: u32,
    /// Optional sort order
    pub sort: Option<SortClause>,
    /// Pre-built index filter passed through verbatim
    pub filter: Option<String>,
}

impl SearchParams {
    /// Number of results requested from the index.
    pub fn limit(&self) -> u32 {
        self.num_results
    }

    /// Number of results to skip: `numResults * page`.
    pub fn offset(&self) -> u64 {
        u64::from(self.num_results) * u64::from(self.page)
    }
}

impl From<SearchQuery> for SearchParams {
    fn from(query: SearchQuery) -> Self {
        Self {
            content_types: non_empty(query.content_types),
            locations: non_empty(query.locations),
            topics: non_empty(query.topics),
            page: zero_based_page(query.page.as_deref()),
            num_results: clamp_num_results(query.num_results.as_deref()),
            sort: query.sort.as_deref().and_then(SortClause::parse),
            filter: non_empty(query.filter),
        }
    }
}

/// Maps a one-based external page to a zero-based index.
///
/// Values below 1 and non-numeric values map to page 0.
pub fn zero_based_page(raw: Option<&str>) -> u32 {
    match raw.map(str::trim).and_then(|value| value.parse::<i64>().ok()) {
        Some(page) if page >= 1 => u32::try_from(page - 1).unwrap_or(u32::MAX),
        _ => 0,
    }
}

/// Parses `numResults`, falling back to the default below 1 or when
/// non-numeric.
pub fn clamp_num_results(raw: Option<&str>) -> u32 {
    match raw.map(str::trim).and_then(|value| value.parse::<i64>().ok()) {
        Some(count) if count >= 1 => u32::try_from(count).unwrap_or(u32::MAX),
        _ => DEFAULT_NUM_RESULTS,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Sort direction understood by the index API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest first
    Ascending,
    /// Largest first
    Descending,
}

impl SortDirection {
    /// Wire name used in the `sortBy` parameter.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "ASCENDING",
            Self::Descending => "DESCENDING",
        }
    }
}

/// Single-field sort order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortClause {
    /// Index field to sort on
    pub field: String,
    /// Sort direction
    pub direction: SortDirection,
}

impl SortClause {
    /// Parses `field` or `field:asc` / `field:desc`.
    ///
    /// An unknown direction suffix falls back to ascending. Returns `None`
    /// for an empty field.
    pub fn parse(raw: &str) -> Option<Self> {
        let (field, direction) = match raw.split_once(':') {
            Some((field, direction)) => (field, direction),
            None => (raw, ""),
        };

        let field = field.trim();
        if field.is_empty() {
            return None;
        }

        let direction = if direction.trim().eq_ignore_ascii_case("desc")
            || direction.trim().eq_ignore_ascii_case("descending")
        {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };

        Some(Self { field: field.to_string(), direction })
    }

    /// Encodes the clause as the index API's `[{field: direction}]` array.
    pub fn to_json(&self) -> Value {
        let mut clause = Map::new();
        clause.insert(self.field.clone(), Value::from(self.direction.as_str()));
        Value::Array(vec![Value::Object(clause)])
    }
}
