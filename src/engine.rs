//! Search orchestration
//!
//! [`JobAcquisitionEngine`] owns one authenticated browsing session and runs
//! searches against it: ensure authentication, build the query, walk the
//! result pages, wait for background enrichment to drain, then merge cached
//! organization details into the extracted records.

use crate::browser::{ChromeSurface, LaunchOptions, Surface};
use crate::config::Config;
use crate::enrich::{EnrichmentQueue, OrgFetcher, SurfaceOrgFetcher};
use crate::model::JobRecord;
use crate::search::{search_url, PageTiming, Paginator, SearchFilters};
use crate::session::{Authenticator, MailboxCodeProvider, SessionStore};
use crate::ScoutError;
use std::sync::Arc;

pub struct JobAcquisitionEngine {
    surface: Arc<dyn Surface>,
    auth: Authenticator,
    queue: EnrichmentQueue,
    fetcher: Arc<dyn OrgFetcher>,
    timing: PageTiming,
    closed: bool,
}

impl JobAcquisitionEngine {
    /// Launches a browsing surface and assembles an engine from configuration.
    ///
    /// The configuration is assumed validated (see [`crate::config`]); nothing
    /// here re-checks credentials.
    pub async fn launch(config: &Config) -> Result<Self, ScoutError> {
        let options = LaunchOptions {
            headless: config.browser.headless,
            chrome_binary: config.browser.chrome_binary.clone(),
        };

        let surface = Arc::new(ChromeSurface::launch(&options).await?);
        let store = SessionStore::new(&config.session.cookie_path);
        let provider = config
            .mailbox
            .as_ref()
            .map(|m| Box::new(MailboxCodeProvider::new(m)) as Box<dyn crate::session::CodeProvider>);
        let auth = Authenticator::new(config.account.clone(), store, provider);
        let fetcher: Arc<dyn OrgFetcher> = Arc::new(SurfaceOrgFetcher::new(options));

        Ok(Self::assemble(surface, auth, fetcher, PageTiming::default()))
    }

    /// Assembles an engine from pre-built parts. Used directly by tests, which
    /// substitute scripted surfaces and fetchers.
    pub fn assemble(
        surface: Arc<dyn Surface>,
        auth: Authenticator,
        fetcher: Arc<dyn OrgFetcher>,
        timing: PageTiming,
    ) -> Self {
        Self {
            surface,
            auth,
            queue: EnrichmentQueue::new(Arc::clone(&fetcher)),
            fetcher,
            timing,
            closed: false,
        }
    }

    /// Runs one search, returning up to `max_jobs` records.
    ///
    /// Rejects only for authentication failures (and use after `close`); all
    /// extraction and enrichment degradation surfaces as empty record fields
    /// instead of errors.
    pub async fn search(
        &mut self,
        filters: &SearchFilters,
        max_jobs: usize,
    ) -> Result<Vec<JobRecord>, ScoutError> {
        if self.closed {
            return Err(ScoutError::Closed);
        }

        self.auth.ensure(self.surface.as_ref()).await?;

        // Seed the enrichment surface so the worker is authenticated too
        match self.surface.cookies().await {
            Ok(cookies) => self.fetcher.seed(cookies).await,
            Err(e) => tracing::warn!("Could not capture cookies for the worker surface: {}", e),
        }

        let url = search_url(filters);
        tracing::info!("Searching: {}", url);
        self.surface.goto(&url).await?;

        let paginator = Paginator::new(self.surface.as_ref(), &self.queue, self.timing.clone());
        let mut records = paginator.collect(max_jobs).await;

        tracing::info!(
            "Pagination done ({} records); waiting for enrichment to drain ({} pending)",
            records.len(),
            self.queue.pending_len()
        );
        self.queue.await_drain().await;

        let mut enriched = 0;
        for record in &mut records {
            if let Some(org_ref) = &record.org_ref {
                if let Some(details) = self.queue.cached_details(org_ref) {
                    record.merge_org(&details);
                    enriched += 1;
                }
            }
        }
        tracing::info!(
            "Search complete: {} records, {} enriched",
            records.len(),
            enriched
        );

        Ok(records)
    }

    /// Releases both browsing surfaces. Idempotent; the engine is unusable
    /// afterwards and a new instance is required for a fresh session.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        self.fetcher.close().await;
        if let Err(e) = self.surface.close().await {
            tracing::debug!("Error closing main surface: {}", e);
        }
        tracing::info!("Engine closed");
    }
}
