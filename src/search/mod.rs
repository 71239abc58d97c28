//! Search definition and listing acquisition
//!
//! This module maps a structured filter set onto the platform's query string
//! and walks the paginated result list, extracting one [`crate::JobRecord`]
//! per listing.

mod filters;
mod paginator;
mod query;

pub use filters::{DatePosted, ExperienceLevel, JobType, SearchFilters, WorkArrangement};
pub use paginator::{PageTiming, Paginator, PAGE_SIZE};
pub use query::{build_query, search_url};
