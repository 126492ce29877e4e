//! Translation of taxonomy URL parameters into index API filters.
//!
//! Each recognized taxonomy parameter holds a comma-separated list of names.
//! A present parameter becomes one `{field: {"$in": [names]}}` clause and all
//! clauses are combined under `{"$and": [...]}`. Names are passed through
//! literally; callers must send human-readable names, not internal ids.

use serde_json::{json, Value};

use crate::search::SearchParams;

/// A filterable taxonomy: the index field and the parameter that feeds it.
#[derive(Debug, Clone, Copy)]
pub struct Taxonomy {
    /// Index API field name
    pub field: &'static str,
    value: fn(&SearchParams) -> Option<&str>,
}

impl Taxonomy {
    /// Returns the raw parameter value for this taxonomy, if non-empty.
    pub fn value<'a>(&self, params: &'a SearchParams) -> Option<&'a str> {
        (self.value)(params).filter(|value| !value.is_empty())
    }
}

fn content_types(params: &SearchParams) -> Option<&str> {
    params.content_types.as_deref()
}

fn locations(params: &SearchParams) -> Option<&str> {
    params.locations.as_deref()
}

fn topics(params: &SearchParams) -> Option<&str> {
    params.topics.as_deref()
}

/// Recognized taxonomies in clause order.
pub const TAXONOMIES: &[Taxonomy] = &[
    Taxonomy { field: "c_contentType", value: content_types },
    Taxonomy { field: "c_locations", value: locations },
    Taxonomy { field: "c_topics", value: topics },
];

/// Builds index API filters from taxonomy parameters.
#[derive(Debug, Clone, Copy)]
pub struct TaxonomyFilterBuilder {
    taxonomies: &'static [Taxonomy],
}

impl Default for TaxonomyFilterBuilder {
    fn default() -> Self {
        Self { taxonomies: TAXONOMIES }
    }
}

impl TaxonomyFilterBuilder {
    /// Creates a builder over a custom taxonomy table.
    pub const fn with_taxonomies(taxonomies: &'static [Taxonomy]) -> Self {
        Self { taxonomies }
    }

    /// Returns one `$in` clause per non-empty taxonomy parameter.
    pub fn clauses(&self, params: &SearchParams) -> Vec<Value> {
        self.taxonomies
            .iter()
            .filter_map(|taxonomy| {
                let names: Vec<&str> = taxonomy.value(params)?.split(',').collect();
                Some(json!({ taxonomy.field: { "$in": names } }))
            })
            .collect()
    }

    /// Builds the JSON-encoded filter.
    ///
    /// Returns the empty string when no taxonomy parameter is present; the
    /// caller substitutes `{}`.
    pub fn build(&self, params: &SearchParams) -> String {
        let clauses = self.clauses(params);
        if clauses.is_empty() {
            return String::new();
        }

        json!({ "$and": clauses }).to_string()
    }

    /// Filter actually sent to the index API.
    ///
    /// Taxonomy clauses win; otherwise a pre-built `filter` parameter is
    /// passed through; otherwise the match-all filter `{}`.
    pub fn effective(&self, params: &SearchParams) -> String {
        let built = self.build(params);
        if !built.is_empty() {
            return built;
        }

        params.filter.clone().unwrap_or_else(|| "{}".to_string())
    }
}

/// Builds the filter with the default taxonomy table.
pub fn build_filter(params: &SearchParams) -> String {
    TaxonomyFilterBuilder::default().build(params)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn params(
        content_types: Option<&str>,
        locations: Option<&str>,
        topics: Option<&str>,
    ) -> SearchParams {
        SearchParams {
            content_types: content_types.map(ToString::to_string),
            locations: locations.map(ToString::to_string),
            topics: topics.map(ToString::to_string),
            num_results: 9,
            ..SearchParams::default()
        }
    }

    #[test]
    fn content_types_become_in_clause_under_and() {
        let filter = build_filter(&params(Some("a,b"), None, None));

        assert_eq!(filter, r#"{"$and":[{"c_contentType":{"$in":["a","b"]}}]}"#);
    }

    #[test]
    fn no_taxonomies_yield_empty_string() {
        assert_eq!(build_filter(&params(None, None, None)), "");
        assert_eq!(build_filter(&params(Some(""), Some(""), None)), "");
    }

    #[test]
    fn clauses_follow_table_order() {
        let filter = build_filter(&params(Some("Blog"), Some("Tampa,Orlando"), Some("Savings")));
        let parsed: Value = serde_json::from_str(&filter).unwrap();

        assert_eq!(
            parsed,
            json!({
                "$and": [
                    { "c_contentType": { "$in": ["Blog"] } },
                    { "c_locations": { "$in": ["Tampa", "Orlando"] } },
                    { "c_topics": { "$in": ["Savings"] } }
                ]
            })
        );
    }

    #[test]
    fn names_are_passed_through_literally() {
        let filter = build_filter(&params(None, None, Some("Home Loans, \"Auto\"")));
        let parsed: Value = serde_json::from_str(&filter).unwrap();

        assert_eq!(parsed["$and"][0]["c_topics"]["$in"], json!(["Home Loans", " \"Auto\""]));
    }

    #[test]
    fn effective_filter_falls_back_to_raw_then_match_all() {
        let builder = TaxonomyFilterBuilder::default();

        let mut search = params(None, None, None);
        assert_eq!(builder.effective(&search), "{}");

        search.filter = Some(r#"{"c_featured":{"$eq":true}}"#.to_string());
        assert_eq!(builder.effective(&search), r#"{"c_featured":{"$eq":true}}"#);

        search.topics = Some("News".to_string());
        assert_eq!(builder.effective(&search), r#"{"$and":[{"c_topics":{"$in":["News"]}}]}"#);
    }

    #[test]
    fn custom_taxonomy_table_is_honored() {
        const ONLY_TOPICS: &[Taxonomy] = &[Taxonomy { field: "c_tags", value: super::topics }];
        let builder = TaxonomyFilterBuilder::with_taxonomies(ONLY_TOPICS);

        let filter = builder.build(&params(Some("Blog"), None, Some("News")));
        assert_eq!(filter, r#"{"$and":[{"c_tags":{"$in":["News"]}}]}"#);
    }
}
