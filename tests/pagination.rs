//! Paginator behavior over scripted result pages

mod common;

use common::{FakeSurface, MapOrgFetcher, View};
use jobscout::enrich::EnrichmentQueue;
use jobscout::model::OrgDetails;
use jobscout::search::{PageTiming, Paginator, PAGE_SIZE};
use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::time::Duration;

fn fast_timing() -> PageTiming {
    PageTiming {
        element_wait: Duration::from_millis(20),
        settle: Duration::from_millis(1),
        popup_wait: Duration::from_millis(60),
        popup_poll: Duration::from_millis(5),
    }
}

/// One listing card in the primary container markup
fn card(id: u32, title: &str, company: &str) -> String {
    format!(
        r#"<li data-occludable-job-id="{id}">
             <a class="job-card-list__title" href="/jobs/view/{id}">{title}</a>
             <div class="job-card-container__primary-description">{company}</div>
             <div class="job-card-container__metadata-item">Bengaluru, India</div>
           </li>"#
    )
}

fn page_of(cards: &[String], next_enabled: bool) -> String {
    let next = if next_enabled {
        r#"<button aria-label="Next">Next</button>"#
    } else {
        r#"<button aria-label="Next" disabled>Next</button>"#
    };
    format!("<ul>{}</ul>{}", cards.join("\n"), next)
}

/// Detail pane markup appended next to the (unchanged) card list
fn detail_pane(description: &str, org_slug: Option<&str>, apply_label: &str) -> String {
    let org = org_slug
        .map(|slug| {
            format!(
                r#"<div class="job-details-jobs-unified-top-card__company-name">
                     <a href="/company/{slug}/?refId=tracking">Acme</a>
                   </div>"#
            )
        })
        .unwrap_or_default();
    format!(
        r#"<div class="jobs-search__job-details--container">
             {org}
             <span class="jobs-unified-top-card__posted-date">5 days ago</span>
             <div class="jobs-description__content">{description}</div>
             <button class="jobs-apply-button">{apply_label}</button>
           </div>"#
    )
}

#[tokio::test]
async fn extracts_records_in_page_order_and_respects_max() {
    let cards: Vec<String> = (1..=3)
        .map(|i| card(i, &format!("Engineer {i}"), "Acme"))
        .collect();
    let page = page_of(&cards, false);

    let surface = FakeSurface::new(|state| {
        state.url = "https://www.linkedin.com/jobs/search/?keywords=rust".to_string();
        state.html = page.clone();
    });

    let queue = EnrichmentQueue::new(MapOrgFetcher::empty());
    let paginator = Paginator::new(surface.as_ref(), &queue, fast_timing());

    let records = paginator.collect(2).await;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, "1");
    assert_eq!(records[0].title, "Engineer 1");
    assert_eq!(records[0].company, "Acme");
    assert_eq!(records[0].location, "Bengaluru, India");
    assert_eq!(records[0].link, "https://www.linkedin.com/jobs/view/1");
    assert_eq!(records[1].id, "2");
}

#[tokio::test]
async fn no_matching_container_strategy_returns_empty_without_error() {
    // Scenario B: a layout this run does not recognize
    let surface = FakeSurface::new(|state| {
        state.html = "<div class='totally-new-experiment'>nothing familiar</div>".to_string();
    });

    let queue = EnrichmentQueue::new(MapOrgFetcher::empty());
    let paginator = Paginator::new(surface.as_ref(), &queue, fast_timing());

    let records = paginator.collect(10).await;
    assert!(records.is_empty());
}

#[tokio::test]
async fn detail_extraction_fills_rich_fields_and_enqueues_org() {
    let cards = vec![card(1, "Platform Engineer", "Acme")];
    let list = page_of(&cards, false);
    let with_detail = format!(
        "{}{}",
        list,
        detail_pane("Build the platform.", Some("acme-inc"), "Easy Apply")
    );

    let surface = FakeSurface::new(|state| {
        state.html = list.clone();
        state.on_click_nth.insert(
            ("li[data-occludable-job-id]".to_string(), 0),
            View {
                url: None,
                html: Some(with_detail.clone()),
            },
        );
    });

    let org_ref = "https://www.linkedin.com/company/acme-inc";
    let fetcher = MapOrgFetcher::new(HashMap::from([(
        org_ref.to_string(),
        OrgDetails {
            website: "https://acme.example".to_string(),
            ..Default::default()
        },
    )]));
    let queue = EnrichmentQueue::new(fetcher.clone());
    let paginator = Paginator::new(surface.as_ref(), &queue, fast_timing());

    let records = paginator.collect(5).await;
    queue.await_drain().await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].description, "Build the platform.");
    assert_eq!(records[0].posted_at, "5 days ago");
    assert_eq!(records[0].org_ref.as_deref(), Some(org_ref));
    // In-platform application flow: apply link stays canonical
    assert_eq!(records[0].apply_link, records[0].link);

    // The org was fetched exactly once by the background worker
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    assert!(queue.cached_details(org_ref).is_some());
}

#[tokio::test]
async fn duplicate_org_refs_across_cards_fetch_once() {
    let cards: Vec<String> = (1..=2).map(|i| card(i, "Engineer", "Acme")).collect();
    let list = page_of(&cards, false);

    let surface = FakeSurface::new(|state| {
        state.html = list.clone();
        for index in 0..2 {
            state.on_click_nth.insert(
                ("li[data-occludable-job-id]".to_string(), index),
                View {
                    url: None,
                    html: Some(format!(
                        "{}{}",
                        list,
                        detail_pane("Same org either way.", Some("acme-inc"), "Easy Apply")
                    )),
                },
            );
        }
    });

    let fetcher = MapOrgFetcher::empty();
    let queue = EnrichmentQueue::new(fetcher.clone());
    let paginator = Paginator::new(surface.as_ref(), &queue, fast_timing());

    let records = paginator.collect(10).await;
    queue.await_drain().await;

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].org_ref, records[1].org_ref);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn external_apply_popup_is_captured() {
    let cards = vec![card(7, "Staff Engineer", "Acme")];
    let list = page_of(&cards, false);
    let with_detail = format!(
        "{}{}",
        list,
        detail_pane("External flow.", None, "Apply on company site")
    );

    let surface = FakeSurface::new(|state| {
        state.html = list.clone();
        state.popup = Some("https://jobs.acme.example/apply/7".to_string());
        state.on_click_nth.insert(
            ("li[data-occludable-job-id]".to_string(), 0),
            View {
                url: None,
                html: Some(with_detail.clone()),
            },
        );
    });

    let queue = EnrichmentQueue::new(MapOrgFetcher::empty());
    let paginator = Paginator::new(surface.as_ref(), &queue, fast_timing());

    let records = paginator.collect(1).await;
    assert_eq!(records[0].apply_link, "https://jobs.acme.example/apply/7");
    assert_ne!(records[0].apply_link, records[0].link);
}

#[tokio::test]
async fn external_apply_same_surface_navigation_is_captured_and_restored() {
    let origin = "https://www.linkedin.com/jobs/search/?keywords=rust";
    let cards = vec![card(9, "Principal Engineer", "Acme")];
    let list = page_of(&cards, false);
    let with_detail = format!(
        "{}{}",
        list,
        detail_pane("External same-tab flow.", None, "Apply now")
    );

    let surface = FakeSurface::new(|state| {
        state.url = origin.to_string();
        state.html = list.clone();
        state.on_click_nth.insert(
            ("li[data-occludable-job-id]".to_string(), 0),
            View {
                url: None,
                html: Some(with_detail.clone()),
            },
        );
        // Clicking the apply button navigates this surface away
        state.on_click.insert(
            ".jobs-apply-button".to_string(),
            View {
                url: Some("https://careers.acme.example/role/9".to_string()),
                html: None,
            },
        );
    });

    let queue = EnrichmentQueue::new(MapOrgFetcher::empty());
    let paginator = Paginator::new(surface.as_ref(), &queue, fast_timing());

    let records = paginator.collect(1).await;
    assert_eq!(records[0].apply_link, "https://careers.acme.example/role/9");
    // The original surface was restored for the rest of the walk
    assert_eq!(surface.inspect(|state| state.url.clone()), origin);
}

#[tokio::test]
async fn walks_to_next_page_until_budget_or_exhaustion() {
    let first_cards: Vec<String> = (1..=PAGE_SIZE as u32)
        .map(|i| card(i, &format!("Engineer {i}"), "Acme"))
        .collect();
    let second_cards: Vec<String> = (100..103).map(|i| card(i, "Late Engineer", "Beta")).collect();

    let page_one = page_of(&first_cards, true);
    let page_two = page_of(&second_cards, false);

    let surface = FakeSurface::new(|state| {
        state.html = page_one.clone();
        state.on_click.insert(
            "button[aria-label='Next']".to_string(),
            View {
                url: None,
                html: Some(page_two.clone()),
            },
        );
    });

    let queue = EnrichmentQueue::new(MapOrgFetcher::empty());
    let paginator = Paginator::new(surface.as_ref(), &queue, fast_timing());

    // Budget allows two pages; the second page's disabled Next ends the walk
    let records = paginator.collect(PAGE_SIZE + 10).await;
    assert_eq!(records.len(), PAGE_SIZE + 3);
    assert_eq!(records[PAGE_SIZE].id, "100");
}

#[tokio::test]
async fn disabled_next_control_stops_pagination() {
    let cards: Vec<String> = (1..=2).map(|i| card(i, "Engineer", "Acme")).collect();
    let surface = FakeSurface::new(|state| {
        state.html = page_of(&cards, false);
    });

    let queue = EnrichmentQueue::new(MapOrgFetcher::empty());
    let paginator = Paginator::new(surface.as_ref(), &queue, fast_timing());

    // Budget would allow many pages; the disabled control ends the walk early
    let records = paginator.collect(100).await;
    assert_eq!(records.len(), 2);
    assert!(!surface.inspect(|state| state
        .clicked
        .iter()
        .any(|c| c == "button[aria-label='Next']")));
}
