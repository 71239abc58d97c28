//! Organization detail fetching
//!
//! The enrichment worker drives its own browsing surface, launched lazily on
//! the first fetch and seeded with a copy of the main surface's cookies so it
//! is authenticated independently. Field extraction uses the same ordered
//! first-match-wins chains as listing extraction.

use crate::browser::{ChromeSurface, LaunchOptions, SelectorChain, Surface};
use crate::model::OrgDetails;
use crate::session::Cookie;
use crate::ScoutError;
use async_trait::async_trait;
use scraper::Html;
use std::sync::Mutex;
use std::time::Duration;

/// Total bound on one organization fetch, navigation included
const FETCH_TIMEOUT: Duration = Duration::from_secs(25);

/// Bound on waiting for the organization page body to render
const RENDER_WAIT: Duration = Duration::from_secs(5);

const WEBSITE_SELECTORS: &[&str] = &[
    ".org-top-card-primary-actions__inner a",
    "a[href*='trk=about_website']",
    "dl a[rel='noopener noreferrer']",
];

const DESCRIPTION_SELECTORS: &[&str] = &[
    ".org-about-us-organization-description__text",
    "section.org-about-module p",
    "p.break-words",
];

const ADDRESS_SELECTORS: &[&str] = &[
    ".org-top-card-summary-info-list__info-item:nth-child(2)",
    ".org-location-card p",
    ".org-about-company-module__headquarters",
];

const EMPLOYEE_COUNT_SELECTORS: &[&str] = &[
    ".org-about-company-module__company-staff-count-range",
    "dd.org-about-company-module__company-size-definition-text",
    ".org-top-card-summary-info-list__info-item span",
];

const INDUSTRY_SELECTORS: &[&str] = &[
    ".org-top-card-summary-info-list__info-item",
    ".org-about-company-module__industry",
    "dd.org-page-details__definition-text",
];

/// Marker awaited before extracting, shared by all field chains
const PAGE_READY_SELECTOR: &str = ".org-top-card-summary-info-list__info-item";

/// Fetches supplementary details for one organization reference.
///
/// `seed` installs the cookie snapshot used to authenticate the fetcher's own
/// surface; `close` releases that surface. Both are no-ops for fetchers that
/// do not own browser state (test doubles).
#[async_trait]
pub trait OrgFetcher: Send + Sync {
    async fn fetch(&self, org_ref: &str) -> Result<OrgDetails, ScoutError>;

    async fn seed(&self, _cookies: Vec<Cookie>) {}

    async fn close(&self) {}
}

/// Production fetcher driving a lazily launched Chromium surface.
pub struct SurfaceOrgFetcher {
    options: LaunchOptions,
    seed: Mutex<Vec<Cookie>>,
    surface: tokio::sync::Mutex<Option<ChromeSurface>>,
    website: SelectorChain,
    description: SelectorChain,
    address: SelectorChain,
    employee_count: SelectorChain,
    industries: SelectorChain,
}

impl SurfaceOrgFetcher {
    pub fn new(options: LaunchOptions) -> Self {
        Self {
            options,
            seed: Mutex::new(Vec::new()),
            surface: tokio::sync::Mutex::new(None),
            website: SelectorChain::new(WEBSITE_SELECTORS),
            description: SelectorChain::new(DESCRIPTION_SELECTORS),
            address: SelectorChain::new(ADDRESS_SELECTORS),
            employee_count: SelectorChain::new(EMPLOYEE_COUNT_SELECTORS),
            industries: SelectorChain::new(INDUSTRY_SELECTORS),
        }
    }

    /// Navigates to the organization's about page and extracts the five
    /// enrichment fields from a snapshot.
    async fn fetch_details(
        &self,
        surface: &ChromeSurface,
        org_ref: &str,
    ) -> Result<OrgDetails, ScoutError> {
        let about_url = format!("{}/about/", org_ref.trim_end_matches('/'));
        surface.goto(&about_url).await?;
        surface.wait_for(PAGE_READY_SELECTOR, RENDER_WAIT).await?;

        let html = surface.content().await?;
        let doc = Html::parse_document(&html);
        let root = doc.root_element();

        Ok(OrgDetails {
            website: self
                .website
                .first_attr(root, "href")
                .or_else(|| self.website.first_text(root))
                .unwrap_or_default(),
            description: self.description.first_text(root).unwrap_or_default(),
            address: self.address.first_text(root).unwrap_or_default(),
            employee_count: self.employee_count.first_text(root).unwrap_or_default(),
            industries: self.industries.first_text(root).unwrap_or_default(),
        })
    }
}

#[async_trait]
impl OrgFetcher for SurfaceOrgFetcher {
    async fn fetch(&self, org_ref: &str) -> Result<OrgDetails, ScoutError> {
        let mut guard = self.surface.lock().await;

        if guard.is_none() {
            tracing::info!("Launching enrichment worker surface");
            let surface = ChromeSurface::launch(&self.options).await?;
            let seed = self.seed.lock().unwrap().clone();
            if !seed.is_empty() {
                surface.set_cookies(seed).await?;
            }
            *guard = Some(surface);
        }

        let surface = guard.as_ref().ok_or(ScoutError::Closed)?;

        match tokio::time::timeout(FETCH_TIMEOUT, self.fetch_details(surface, org_ref)).await {
            Ok(result) => result,
            Err(_) => Err(ScoutError::OrgFetch {
                org_ref: org_ref.to_string(),
                message: format!("timed out after {}s", FETCH_TIMEOUT.as_secs()),
            }),
        }
    }

    async fn seed(&self, cookies: Vec<Cookie>) {
        *self.seed.lock().unwrap() = cookies;
    }

    async fn close(&self) {
        let surface = { self.surface.lock().await.take() };
        if let Some(surface) = surface {
            if let Err(e) = surface.close().await {
                tracing::debug!("Failed to close enrichment surface: {}", e);
            }
        }
    }
}
