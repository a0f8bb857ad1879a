//! Debounced free-text place suggestions for the area-name field.
//!
//! Runs independently of pincode resolution: it owns its own debounce slot
//! and generation counter, so typing in one field never cancels the other.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use fieldops_core::{PlaceSearch, PlaceSuggestion};
use futures::FutureExt;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::debounce::Debouncer;

/// Shorter queries are not searched.
pub const MIN_QUERY_CHARS: usize = 3;
pub const MAX_SUGGESTIONS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum SuggestEvent {
    Searching { query: String },
    Suggestions { count: usize },
    Failed { message: String },
    /// A search completed after the text changed again.
    Discarded,
}

enum Signal {
    DebounceElapsed {
        token: u64,
    },
    Fetched {
        generation: u64,
        outcome: Result<Vec<PlaceSuggestion>, String>,
    },
}

pub struct AreaSuggester<S> {
    search: Arc<S>,
    text: String,
    candidates: Vec<PlaceSuggestion>,
    generation: u64,
    in_flight: usize,
    debouncer: Debouncer,
    tx: UnboundedSender<Signal>,
    rx: UnboundedReceiver<Signal>,
}

impl<S: PlaceSearch> AreaSuggester<S> {
    #[must_use]
    pub fn new(search: Arc<S>, debounce: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            search,
            text: String::new(),
            candidates: Vec::new(),
            generation: 0,
            in_flight: 0,
            debouncer: Debouncer::new(debounce),
            tx,
            rx,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn candidates(&self) -> &[PlaceSuggestion] {
        &self.candidates
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight > 0 || self.debouncer.is_pending()
    }

    /// Updates the area text and (re)arms the search timer.
    ///
    /// Text shorter than [`MIN_QUERY_CHARS`] clears the candidates instead.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text == self.text {
            return;
        }
        self.text = text;
        self.generation += 1;
        if self.text.trim().chars().count() < MIN_QUERY_CHARS {
            self.debouncer.cancel();
            self.candidates.clear();
            return;
        }
        self.debouncer
            .schedule(&self.tx, |token| Signal::DebounceElapsed { token });
    }

    /// Commits the candidate's short name as the area text and drops the list.
    ///
    /// Returns the committed name, or `None` if `id` is not a current candidate.
    pub fn choose(&mut self, id: &str) -> Option<String> {
        let chosen = self.candidates.iter().find(|c| c.id == id)?.name.clone();
        self.text.clone_from(&chosen);
        self.generation += 1;
        self.debouncer.cancel();
        self.candidates.clear();
        Some(chosen)
    }

    /// Hides the candidate list without changing the text.
    pub fn dismiss(&mut self) {
        self.generation += 1;
        self.debouncer.cancel();
        self.candidates.clear();
    }

    /// Waits for the next timer or search completion and applies it.
    ///
    /// Returns `None` immediately when nothing is pending.
    pub async fn next_event(&mut self) -> Option<SuggestEvent> {
        loop {
            if !self.is_busy() {
                return None;
            }
            let signal = self.rx.recv().await?;
            if let Some(event) = self.apply(signal) {
                return Some(event);
            }
        }
    }

    pub async fn settle(&mut self) -> Vec<SuggestEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event().await {
            events.push(event);
        }
        events
    }

    fn apply(&mut self, signal: Signal) -> Option<SuggestEvent> {
        match signal {
            Signal::DebounceElapsed { token } => {
                if !self.debouncer.acknowledge(token) {
                    return None;
                }
                let query = self.text.trim().to_owned();
                self.spawn_search(query.clone());
                Some(SuggestEvent::Searching { query })
            }
            Signal::Fetched {
                generation,
                outcome,
            } => {
                self.in_flight = self.in_flight.saturating_sub(1);
                if generation != self.generation {
                    tracing::debug!(generation, "discarding stale place search");
                    return Some(SuggestEvent::Discarded);
                }
                match outcome {
                    Ok(mut places) => {
                        places.truncate(MAX_SUGGESTIONS);
                        self.candidates = places;
                        Some(SuggestEvent::Suggestions {
                            count: self.candidates.len(),
                        })
                    }
                    Err(message) => {
                        tracing::warn!(error = %message, "place search failed");
                        self.candidates.clear();
                        Some(SuggestEvent::Failed { message })
                    }
                }
            }
        }
    }

    fn spawn_search(&mut self, query: String) {
        self.in_flight += 1;
        let generation = self.generation;
        let search = Arc::clone(&self.search);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = match AssertUnwindSafe(search.search(&query, MAX_SUGGESTIONS))
                .catch_unwind()
                .await
            {
                Ok(Ok(places)) => Ok(places),
                Ok(Err(e)) => Err(e.to_string()),
                Err(_) => Err("place search panicked".to_owned()),
            };
            let _ = tx.send(Signal::Fetched {
                generation,
                outcome,
            });
        });
    }
}
