//! Ordered selector fallback chains
//!
//! The platform's markup changes between rendering experiments, so no single
//! CSS selector stays valid for long. Every extracted field is therefore looked
//! up through an ordered chain of candidate selectors with first-match-wins
//! semantics, evaluated as pure functions over a parsed HTML snapshot.

use scraper::{ElementRef, Html, Selector};

/// An ordered list of candidate selectors for one lookup.
///
/// Selectors are parsed once at construction; candidates that fail to parse are
/// dropped with a log line rather than aborting the chain.
#[derive(Debug, Clone)]
pub struct SelectorChain {
    raw: Vec<&'static str>,
    parsed: Vec<Selector>,
}

impl SelectorChain {
    /// Builds a chain from static candidate selectors, in priority order.
    pub fn new(candidates: &[&'static str]) -> Self {
        let mut raw = Vec::with_capacity(candidates.len());
        let mut parsed = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            match Selector::parse(candidate) {
                Ok(selector) => {
                    raw.push(*candidate);
                    parsed.push(selector);
                }
                Err(e) => {
                    tracing::debug!("Dropping unparseable selector '{}': {:?}", candidate, e);
                }
            }
        }

        Self { raw, parsed }
    }

    /// The raw selector string at `index`, for handing to a browsing surface.
    pub fn raw(&self, index: usize) -> Option<&'static str> {
        self.raw.get(index).copied()
    }

    /// Iterates candidates as `(raw, parsed)` pairs, in priority order.
    pub fn candidates(&self) -> impl Iterator<Item = (&'static str, &Selector)> {
        self.raw.iter().copied().zip(self.parsed.iter())
    }

    /// First candidate yielding at least one element, with all its matches.
    ///
    /// Candidates are never mixed: the first selector that matches anything
    /// wins outright, even if a later one would match more elements.
    pub fn first_matching<'a>(&self, doc: &'a Html) -> Option<(usize, Vec<ElementRef<'a>>)> {
        for (i, selector) in self.parsed.iter().enumerate() {
            let matches: Vec<ElementRef<'a>> = doc.select(selector).collect();
            if !matches.is_empty() {
                return Some((i, matches));
            }
        }
        None
    }

    /// First element matched by any candidate under `root`, with the index of
    /// the candidate that matched it.
    pub fn select_first<'a>(&self, root: ElementRef<'a>) -> Option<(usize, ElementRef<'a>)> {
        for (i, selector) in self.parsed.iter().enumerate() {
            if let Some(element) = root.select(selector).next() {
                return Some((i, element));
            }
        }
        None
    }

    /// First non-empty trimmed text yielded by any candidate under `root`.
    pub fn first_text(&self, root: ElementRef<'_>) -> Option<String> {
        for selector in &self.parsed {
            for element in root.select(selector) {
                let text = collapse_text(element);
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }
        None
    }

    /// First non-empty value of `attr` yielded by any candidate under `root`.
    pub fn first_attr(&self, root: ElementRef<'_>, attr: &str) -> Option<String> {
        for selector in &self.parsed {
            for element in root.select(selector) {
                if let Some(value) = element.value().attr(attr) {
                    let value = value.trim();
                    if !value.is_empty() {
                        return Some(value.to_string());
                    }
                }
            }
        }
        None
    }
}

/// First non-empty value among `names` on the element itself.
///
/// Used for identifiers carried as data attributes on listing containers.
pub fn attr_of(element: ElementRef<'_>, names: &[&str]) -> Option<String> {
    for name in names {
        if let Some(value) = element.value().attr(name) {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Joins an element's text nodes, collapsing runs of whitespace.
fn collapse_text(element: ElementRef<'_>) -> String {
    let joined = element.text().collect::<Vec<_>>().join(" ");
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}
