//! Query-string construction
//!
//! A pure, deterministic mapping from [`SearchFilters`] to the platform's jobs
//! search query. No network or browser state is touched here.

use crate::search::filters::SearchFilters;
use url::form_urlencoded;

const SEARCH_BASE: &str = "https://www.linkedin.com/jobs/search/";

/// Builds the query string for a filter set.
///
/// Every non-empty field contributes exactly one parameter; multi-valued
/// fields are joined with commas through their static code tables. `AnyTime`
/// as the posting-age filter contributes nothing.
pub fn build_query(filters: &SearchFilters) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());

    if let Some(keywords) = non_empty(&filters.keywords) {
        query.append_pair("keywords", keywords);
    }

    if let Some(location) = non_empty(&filters.location) {
        query.append_pair("location", location);
    }

    if let Some(code) = filters.date_posted.and_then(|d| d.code()) {
        query.append_pair("f_TPR", code);
    }

    if !filters.experience_level.is_empty() {
        let codes: Vec<&str> = filters.experience_level.iter().map(|e| e.code()).collect();
        query.append_pair("f_E", &codes.join(","));
    }

    if !filters.job_type.is_empty() {
        let codes: Vec<&str> = filters.job_type.iter().map(|j| j.code()).collect();
        query.append_pair("f_JT", &codes.join(","));
    }

    if !filters.remote.is_empty() {
        let codes: Vec<&str> = filters.remote.iter().map(|w| w.code()).collect();
        query.append_pair("f_WT", &codes.join(","));
    }

    query.finish()
}

/// Full search URL for a filter set
pub fn search_url(filters: &SearchFilters) -> String {
    let query = build_query(filters);
    if query.is_empty() {
        SEARCH_BASE.to_string()
    } else {
        format!("{}?{}", SEARCH_BASE, query)
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
