//! Structured search filters
//!
//! Filters deserialize from the HTTP API body (camelCase keys, kebab-case
//! values) and map onto the platform's query-parameter codes through static
//! tables. An empty or absent field contributes nothing to the query.

use serde::{Deserialize, Serialize};

/// Filter set for one search. Immutable once handed to a search call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchFilters {
    pub keywords: Option<String>,
    pub location: Option<String>,
    pub date_posted: Option<DatePosted>,
    pub experience_level: Vec<ExperienceLevel>,
    pub job_type: Vec<JobType>,
    pub remote: Vec<WorkArrangement>,
}

/// Posting-age filter. `AnyTime` is equivalent to an absent filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatePosted {
    #[serde(rename = "any-time")]
    AnyTime,
    #[serde(rename = "past-24-hours")]
    Past24Hours,
    #[serde(rename = "past-week")]
    PastWeek,
    #[serde(rename = "past-month")]
    PastMonth,
}

impl DatePosted {
    /// Platform code (seconds-window form), or `None` for `AnyTime`
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::AnyTime => None,
            Self::Past24Hours => Some("r86400"),
            Self::PastWeek => Some("r604800"),
            Self::PastMonth => Some("r2592000"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperienceLevel {
    #[serde(rename = "internship")]
    Internship,
    #[serde(rename = "entry-level")]
    EntryLevel,
    #[serde(rename = "associate")]
    Associate,
    #[serde(rename = "mid-senior")]
    MidSenior,
    #[serde(rename = "director")]
    Director,
    #[serde(rename = "executive")]
    Executive,
}

impl ExperienceLevel {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Internship => "1",
            Self::EntryLevel => "2",
            Self::Associate => "3",
            Self::MidSenior => "4",
            Self::Director => "5",
            Self::Executive => "6",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobType {
    #[serde(rename = "full-time")]
    FullTime,
    #[serde(rename = "part-time")]
    PartTime,
    #[serde(rename = "contract")]
    Contract,
    #[serde(rename = "temporary")]
    Temporary,
    #[serde(rename = "internship")]
    Internship,
    #[serde(rename = "volunteer")]
    Volunteer,
    #[serde(rename = "other")]
    Other,
}

impl JobType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::FullTime => "F",
            Self::PartTime => "P",
            Self::Contract => "C",
            Self::Temporary => "T",
            Self::Internship => "I",
            Self::Volunteer => "V",
            Self::Other => "O",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkArrangement {
    #[serde(rename = "on-site")]
    OnSite,
    #[serde(rename = "remote")]
    Remote,
    #[serde(rename = "hybrid")]
    Hybrid,
}

impl WorkArrangement {
    pub fn code(&self) -> &'static str {
        match self {
            Self::OnSite => "1",
            Self::Remote => "2",
            Self::Hybrid => "3",
        }
    }
}
