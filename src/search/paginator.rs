//! Paginated listing acquisition
//!
//! The paginator walks the jobs result list one page at a time:
//! - a fixed ordered list of container-selector strategies finds the listing
//!   cards (the first strategy that matches anything wins for that page)
//! - each card's fields come from per-field sub-selector chains
//! - clicking a card opens its detail pane for the richer fields
//! - organization references are handed to the enrichment queue as they are
//!   discovered, without blocking extraction
//!
//! A page where no strategy matches, or with no enabled next-page control, ends
//! pagination normally. Per-record failures are logged and skipped over; a
//! partially extracted record is normal output.

use crate::browser::{attr_of, SelectorChain, Surface};
use crate::enrich::EnrichmentQueue;
use crate::model::JobRecord;
use scraper::{ElementRef, Html};
use std::time::Duration;
use tokio::time::Instant;

/// Listings shown per result page, assumed fixed by the platform
pub const PAGE_SIZE: usize = 25;

const BASE_URL: &str = "https://www.linkedin.com";

/// Container strategies tried in order on every page; never mixed within one
const CONTAINER_STRATEGIES: &[&str] = &[
    "li[data-occludable-job-id]",
    ".jobs-search-results__list-item",
    ".job-card-container",
    ".scaffold-layout__list-item",
];

const TITLE_SELECTORS: &[&str] = &[
    ".job-card-list__title",
    ".job-card-container__link span[aria-hidden='true']",
    ".artdeco-entity-lockup__title",
];

const COMPANY_SELECTORS: &[&str] = &[
    ".job-card-container__primary-description",
    ".job-card-container__company-name",
    ".artdeco-entity-lockup__subtitle",
];

const LOCATION_SELECTORS: &[&str] = &[
    ".job-card-container__metadata-item",
    ".job-card-container__metadata-wrapper li",
    ".artdeco-entity-lockup__caption",
];

const LINK_SELECTORS: &[&str] = &[
    "a.job-card-list__title",
    "a.job-card-container__link",
    ".artdeco-entity-lockup__title a",
];

/// Identifier attributes carried on the card container itself
const ID_ATTRIBUTES: &[&str] = &["data-occludable-job-id", "data-job-id"];

const DETAIL_PANE_SELECTORS: &[&str] = &[
    ".jobs-search__job-details--container",
    ".jobs-details__main-content",
    ".job-view-layout",
];

const DESCRIPTION_SELECTORS: &[&str] = &[
    ".jobs-description__content",
    "#job-details",
    ".jobs-description-content__text",
    ".jobs-box__html-content",
];

const POSTED_AT_SELECTORS: &[&str] = &[
    ".jobs-unified-top-card__posted-date",
    ".job-details-jobs-unified-top-card__primary-description-container .tvm__text",
    ".jobs-details-top-card__posted-date",
];

const ORG_LINK_SELECTORS: &[&str] = &[
    ".job-details-jobs-unified-top-card__company-name a",
    ".jobs-unified-top-card__company-name a",
    "a[href*='/company/']",
];

const APPLY_BUTTON_SELECTORS: &[&str] = &[
    ".jobs-apply-button",
    ".jobs-s-apply button",
    "button[data-job-id]",
];

const NEXT_PAGE_SELECTORS: &[&str] = &[
    "button[aria-label='View next page']",
    "button[aria-label='Next']",
    ".jobs-search-pagination__button--next",
    ".artdeco-pagination__button--next",
];

/// Timing knobs for page walking; tests shrink these to milliseconds
#[derive(Debug, Clone)]
pub struct PageTiming {
    /// Bound on waiting for listing containers / detail panes to render
    pub element_wait: Duration,

    /// Fixed wait after activating a pagination control
    pub settle: Duration,

    /// Total bound on capturing an external apply destination
    pub popup_wait: Duration,

    /// Re-check interval during the apply capture
    pub popup_poll: Duration,
}

impl Default for PageTiming {
    fn default() -> Self {
        Self {
            element_wait: Duration::from_secs(5),
            settle: Duration::from_secs(2),
            popup_wait: Duration::from_secs(4),
            popup_poll: Duration::from_millis(250),
        }
    }
}

/// Walks result pages on an already-navigated surface, extracting job records
/// and feeding organization references to the enrichment queue.
pub struct Paginator<'a> {
    surface: &'a dyn Surface,
    queue: &'a EnrichmentQueue,
    timing: PageTiming,
    containers: SelectorChain,
    title: SelectorChain,
    company: SelectorChain,
    location: SelectorChain,
    link: SelectorChain,
    detail_pane: SelectorChain,
    description: SelectorChain,
    posted_at: SelectorChain,
    org_link: SelectorChain,
    apply_button: SelectorChain,
    next_page: SelectorChain,
}

impl<'a> Paginator<'a> {
    pub fn new(surface: &'a dyn Surface, queue: &'a EnrichmentQueue, timing: PageTiming) -> Self {
        Self {
            surface,
            queue,
            timing,
            containers: SelectorChain::new(CONTAINER_STRATEGIES),
            title: SelectorChain::new(TITLE_SELECTORS),
            company: SelectorChain::new(COMPANY_SELECTORS),
            location: SelectorChain::new(LOCATION_SELECTORS),
            link: SelectorChain::new(LINK_SELECTORS),
            detail_pane: SelectorChain::new(DETAIL_PANE_SELECTORS),
            description: SelectorChain::new(DESCRIPTION_SELECTORS),
            posted_at: SelectorChain::new(POSTED_AT_SELECTORS),
            org_link: SelectorChain::new(ORG_LINK_SELECTORS),
            apply_button: SelectorChain::new(APPLY_BUTTON_SELECTORS),
            next_page: SelectorChain::new(NEXT_PAGE_SELECTORS),
        }
    }

    /// Collects up to `max` job records from the current result list.
    ///
    /// Visits at most `ceil(max / PAGE_SIZE)` pages. Always returns whatever
    /// was accumulated; running out of recognizable listings or pages is
    /// normal termination, and surface failures end the walk with partial
    /// results rather than an error.
    pub async fn collect(&self, max: usize) -> Vec<JobRecord> {
        let mut records: Vec<JobRecord> = Vec::new();
        if max == 0 {
            return records;
        }

        let max_pages = max.div_ceil(PAGE_SIZE);

        'pages: for page_no in 1..=max_pages {
            if let Some(first) = self.containers.raw(0) {
                let _ = self.surface.wait_for(first, self.timing.element_wait).await;
            }

            let html = match self.surface.content().await {
                Ok(html) => html,
                Err(e) => {
                    tracing::warn!("Failed to read result page {}: {}", page_no, e);
                    break;
                }
            };

            let Some((container_selector, stubs)) = self.extract_page(&html) else {
                tracing::info!(
                    "No listing container strategy matched on page {}; stopping",
                    page_no
                );
                break;
            };
            tracing::debug!(
                "Page {}: {} listings via strategy '{}'",
                page_no,
                stubs.len(),
                container_selector
            );

            for (index, mut record) in stubs.into_iter().enumerate() {
                if records.len() >= max {
                    break 'pages;
                }

                if let Err(e) = self
                    .fill_details(&mut record, container_selector, index)
                    .await
                {
                    tracing::warn!(
                        "Detail extraction failed for listing {} on page {}: {}",
                        index,
                        page_no,
                        e
                    );
                }

                if let Some(org_ref) = record.org_ref.clone() {
                    self.queue.enqueue(&org_ref);
                    self.queue.ensure_worker_running();
                }

                records.push(record);
            }

            if records.len() >= max {
                break;
            }

            if !self.advance_page().await {
                tracing::info!("No enabled next-page control after page {}", page_no);
                break;
            }
        }

        tracing::info!("Pagination finished with {} records", records.len());
        records
    }

    /// Extracts all listing stubs from one page snapshot.
    ///
    /// Returns the winning container selector alongside the stubs; `None`
    /// when no strategy recognizes the page. Pure over the snapshot — the
    /// parsed document never outlives this call.
    fn extract_page(&self, html: &str) -> Option<(&'static str, Vec<JobRecord>)> {
        let doc = Html::parse_document(html);
        let (strategy, cards) = self.containers.first_matching(&doc)?;
        let selector = self.containers.raw(strategy)?;
        let stubs = cards.iter().map(|card| self.extract_stub(*card)).collect();
        Some((selector, stubs))
    }

    /// Extracts the card-level fields for one listing. Pure over the snapshot.
    fn extract_stub(&self, card: ElementRef<'_>) -> JobRecord {
        let link = self
            .link
            .first_attr(card, "href")
            .map(|href| absolutize(&href))
            .unwrap_or_default();

        JobRecord {
            id: attr_of(card, ID_ATTRIBUTES).unwrap_or_default(),
            title: self.title.first_text(card).unwrap_or_default(),
            company: self.company.first_text(card).unwrap_or_default(),
            location: self.location.first_text(card).unwrap_or_default(),
            apply_link: link.clone(),
            link,
            ..Default::default()
        }
    }

    /// Activates a listing's detail pane and extracts the richer fields.
    ///
    /// A missing pane degrades to default values; only surface-level failures
    /// propagate (and the caller downgrades those to a skipped enrichment).
    async fn fill_details(
        &self,
        record: &mut JobRecord,
        container_selector: &str,
        index: usize,
    ) -> crate::browser::BrowseResult<()> {
        if !self.surface.click_nth(container_selector, index).await? {
            return Ok(());
        }

        if let Some(pane) = self.detail_pane.raw(0) {
            if !self.surface.wait_for(pane, self.timing.element_wait).await? {
                tracing::debug!("Detail pane never rendered for listing {}", index);
            }
        }

        let html = self.surface.content().await?;

        // Parse in a sync scope; only owned values cross the next await
        let apply_control = {
            let doc = Html::parse_document(&html);
            let root = doc.root_element();

            if let Some(description) = self.description.first_text(root) {
                record.description = description;
            }
            if let Some(posted_at) = self.posted_at.first_text(root) {
                record.posted_at = posted_at;
            }
            if let Some(org_href) = self.org_link.first_attr(root, "href") {
                record.org_ref = normalize_org_ref(&org_href);
            }

            self.apply_button.select_first(root).map(|(matched, button)| {
                let label = button.text().collect::<String>().to_lowercase();
                (self.apply_button.raw(matched), label)
            })
        };

        if let Some((Some(button_selector), label)) = apply_control {
            self.resolve_apply_link(record, button_selector, &label)
                .await?;
        }
        Ok(())
    }

    /// Resolves the application link for a listing.
    ///
    /// An in-platform flow (recognized by the action label) keeps the apply
    /// link equal to the canonical link. Anything else is clicked, and the
    /// destination — a new tab or a same-surface navigation — is captured
    /// within a short bound, after which the original surface is restored.
    /// Capture failure leaves the canonical link in place.
    async fn resolve_apply_link(
        &self,
        record: &mut JobRecord,
        button_selector: &str,
        label: &str,
    ) -> crate::browser::BrowseResult<()> {
        if label.contains("easy apply") {
            record.apply_link = record.link.clone();
            return Ok(());
        }

        let origin = self.surface.current_url().await?;
        if !self.surface.click(button_selector).await? {
            return Ok(());
        }

        let deadline = Instant::now() + self.timing.popup_wait;
        while Instant::now() < deadline {
            if let Some(url) = self.surface.popup_url().await? {
                record.apply_link = url;
                return Ok(());
            }

            let here = self.surface.current_url().await?;
            if here != origin {
                record.apply_link = here;
                self.surface.back().await?;
                return Ok(());
            }

            tokio::time::sleep(self.timing.popup_poll).await;
        }

        tracing::debug!("No apply destination captured for '{}'", record.title);
        Ok(())
    }

    /// Clicks an enabled next-page control, if any. Returns whether paging
    /// advanced.
    async fn advance_page(&self) -> bool {
        let html = match self.surface.content().await {
            Ok(html) => html,
            Err(_) => return false,
        };
        let enabled: Vec<&'static str> = {
            let doc = Html::parse_document(&html);
            let root = doc.root_element();
            self.next_page
                .candidates()
                .filter(|(_, selector)| {
                    root.select(selector).next().is_some_and(|control| {
                        control.value().attr("disabled").is_none()
                            && control.value().attr("aria-disabled") != Some("true")
                    })
                })
                .map(|(raw, _)| raw)
                .collect()
        };

        for raw in enabled {
            match self.surface.click(raw).await {
                Ok(true) => {
                    tokio::time::sleep(self.timing.settle).await;
                    return true;
                }
                Ok(false) => continue,
                Err(e) => {
                    tracing::warn!("Next-page activation failed: {}", e);
                    return false;
                }
            }
        }

        false
    }
}

/// Resolves a possibly relative href against the platform origin
fn absolutize(href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{}{}", BASE_URL, href)
    } else {
        format!("{}/{}", BASE_URL, href)
    }
}

/// Canonicalizes an organization link into a cache key.
///
/// Tracking parameters and subpages are stripped so the same organization
/// reached through different cards keys one cache entry.
pub(crate) fn normalize_org_ref(href: &str) -> Option<String> {
    let absolute = absolutize(href);
    let parsed = url::Url::parse(&absolute).ok()?;

    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let host = parsed.host_str()?;
    if let Some(pos) = segments.iter().position(|s| *s == "company") {
        let slug = segments.get(pos + 1)?;
        return Some(format!("https://{}/company/{}", host, slug));
    }

    let mut base = parsed.clone();
    base.set_query(None);
    base.set_fragment(None);
    Some(base.to_string().trim_end_matches('/').to_string())
}
