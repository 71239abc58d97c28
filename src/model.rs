//! Record types produced by a search
//!
//! A [`JobRecord`] is created by the paginator for every listing it extracts and
//! mutated exactly once afterwards, by the enrichment merge step. [`OrgDetails`]
//! is produced by the enrichment worker and read-only once cached.

use serde::{Deserialize, Serialize};

/// A single job posting extracted from the platform.
///
/// Fields the paginator could not extract default to an empty string; partial
/// records are normal output, not errors. `org_ref` is the canonical URL of the
/// posting organization and keys the enrichment cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    /// Platform-assigned job identifier; empty if extraction failed
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub title: String,

    /// Organization display name as shown on the listing card
    #[serde(default)]
    pub company: String,

    #[serde(default)]
    pub location: String,

    /// Canonical link to the posting
    #[serde(default)]
    pub link: String,

    /// Application link; equals `link` unless an external flow was captured
    #[serde(default)]
    pub apply_link: String,

    /// Free-text relative posting time, e.g. "5 days ago"
    #[serde(default)]
    pub posted_at: String,

    #[serde(default)]
    pub description: String,

    /// Canonical URL of the posting organization, if one was extracted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_ref: Option<String>,

    #[serde(default)]
    pub org_website: String,

    #[serde(default)]
    pub org_description: String,

    #[serde(default)]
    pub org_address: String,

    #[serde(default)]
    pub org_employee_count: String,

    #[serde(default)]
    pub org_industries: String,
}

impl JobRecord {
    /// Copies cached organization details into this record.
    ///
    /// Called once per record after the enrichment queue has drained; records
    /// whose `org_ref` never produced a cache entry are left untouched.
    pub fn merge_org(&mut self, details: &OrgDetails) {
        self.org_website = details.website.clone();
        self.org_description = details.description.clone();
        self.org_address = details.address.clone();
        self.org_employee_count = details.employee_count.clone();
        self.org_industries = details.industries.clone();
    }
}

/// Supplementary organization details, keyed by `org_ref` in the enrichment
/// cache. A failed fetch still produces an (empty-valued) instance so the same
/// organization is never fetched twice in one engine lifetime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgDetails {
    #[serde(default)]
    pub website: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub employee_count: String,

    #[serde(default)]
    pub industries: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_org_copies_all_fields() {
        let mut record = JobRecord {
            title: "Backend Engineer".to_string(),
            org_ref: Some("https://www.linkedin.com/company/acme".to_string()),
            ..Default::default()
        };

        let details = OrgDetails {
            website: "https://acme.example".to_string(),
            description: "Widgets at scale".to_string(),
            address: "Pune, India".to_string(),
            employee_count: "201-500 employees".to_string(),
            industries: "Manufacturing".to_string(),
        };

        record.merge_org(&details);

        assert_eq!(record.org_website, "https://acme.example");
        assert_eq!(record.org_description, "Widgets at scale");
        assert_eq!(record.org_address, "Pune, India");
        assert_eq!(record.org_employee_count, "201-500 employees");
        assert_eq!(record.org_industries, "Manufacturing");
        // Listing fields are untouched by the merge
        assert_eq!(record.title, "Backend Engineer");
    }

    #[test]
    fn test_job_record_serializes_camel_case() {
        let record = JobRecord {
            id: "3954".to_string(),
            apply_link: "https://example.com/apply".to_string(),
            ..Default::default()
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"applyLink\""));
        assert!(json.contains("\"postedAt\""));
        // An absent org_ref is omitted entirely
        assert!(!json.contains("orgRef"));
    }
}
