//! Regeneration bookkeeping: request sequencing, the canvas lock, and merging
//! partial results into the live document.
//!
//! Every request gets a monotonically increasing sequence number. Only the
//! result of the request currently in flight is applied; results of requests
//! that were superseded by a newer one, or abandoned by a panic unlock, are
//! dropped.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::DesignDocument;
use crate::image_source::validate_image_reference;
use crate::layer::LayerKind;

/// Which part of the document a regeneration replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegenerationScope {
    /// Replace the whole document.
    All,
    /// Replace text/button copy only.
    TextOnly,
    /// Replace background art and image layers only.
    ArtOnly,
    /// Replace positions and sizes only.
    LayoutOnly,
}

impl fmt::Display for RegenerationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::All => "all",
            Self::TextOnly => "text-only",
            Self::ArtOnly => "art-only",
            Self::LayoutOnly => "layout-only",
        })
    }
}

impl std::str::FromStr for RegenerationScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "text-only" | "text" => Ok(Self::TextOnly),
            "art-only" | "art" => Ok(Self::ArtOnly),
            "layout-only" | "layout" => Ok(Self::LayoutOnly),
            other => Err(format!("unknown regeneration scope '{other}'")),
        }
    }
}

/// Handle for one regeneration request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegenerationTicket {
    /// Monotonic request number.
    pub seq: u64,
    /// Requested scope.
    pub scope: RegenerationScope,
}

/// What happened to a regeneration result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegenerationOutcome {
    /// The result was merged into the document.
    Applied,
    /// The request was superseded or abandoned; the result was discarded.
    DroppedStale,
    /// The request failed; the canvas was unlocked unchanged.
    Failed,
}

/// Tracks the request in flight and hands out sequence numbers.
#[derive(Debug, Clone, Default)]
pub struct RegenerationGate {
    next_seq: u64,
    in_flight: Option<RegenerationTicket>,
}

impl RegenerationGate {
    /// Start a request, superseding any request still in flight.
    pub fn begin(&mut self, scope: RegenerationScope) -> RegenerationTicket {
        self.next_seq += 1;
        let ticket = RegenerationTicket {
            seq: self.next_seq,
            scope,
        };
        if let Some(previous) = self.in_flight.replace(ticket) {
            tracing::debug!(
                "Regeneration #{} superseded by #{}",
                previous.seq,
                ticket.seq
            );
        }
        ticket
    }

    /// Whether a request is in flight (the canvas is locked).
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.in_flight.is_some()
    }

    /// The request in flight.
    #[must_use]
    pub fn in_flight(&self) -> Option<RegenerationTicket> {
        self.in_flight
    }

    /// Settle `ticket`. Returns `true` if it was the request in flight, in
    /// which case the lock is released.
    pub fn settle(&mut self, ticket: RegenerationTicket) -> bool {
        if self.in_flight.is_some_and(|t| t.seq == ticket.seq) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }

    /// Release the lock without settling, abandoning the request in flight.
    pub fn panic_unlock(&mut self) -> Option<RegenerationTicket> {
        let abandoned = self.in_flight.take();
        if let Some(ticket) = abandoned {
            tracing::warn!("Panic unlock abandoned regeneration #{}", ticket.seq);
        }
        abandoned
    }
}

/// Merge a regeneration result into `current` according to `scope`.
///
/// Partial scopes match layers by id; layers present on only one side are
/// left alone. Image references that fail validation keep their previous
/// value.
#[must_use]
pub fn merge_regeneration(
    scope: RegenerationScope,
    current: &DesignDocument,
    result: DesignDocument,
) -> DesignDocument {
    match scope {
        RegenerationScope::All => sanitize_images(result, Some(current)),
        RegenerationScope::TextOnly => {
            let mut merged = current.clone();
            for layer in merged
                .layers
                .iter_mut()
                .filter(|l| l.kind.is_text_editable())
            {
                if let Some(content) = result.layer(&layer.id).and_then(|r| r.content.clone()) {
                    layer.content = Some(content);
                }
            }
            merged
        }
        RegenerationScope::ArtOnly => {
            let mut merged = current.clone();
            merged.background_color = result.background_color.clone();
            merged.background_image = result.background_image.clone();
            merged.overlay_color = result.overlay_color.clone();
            merged.overlay_opacity = result.overlay_opacity;
            if result.palette.is_some() {
                merged.palette = result.palette.clone();
            }
            for layer in merged
                .layers
                .iter_mut()
                .filter(|l| l.kind == LayerKind::Image)
            {
                if let Some(content) = result.layer(&layer.id).and_then(|r| r.content.clone()) {
                    layer.content = Some(content);
                }
            }
            sanitize_images(merged, Some(current))
        }
        RegenerationScope::LayoutOnly => {
            let mut merged = current.clone();
            for layer in &mut merged.layers {
                if let Some(generated) = result.layer(&layer.id) {
                    if generated.position.is_some() {
                        layer.position = generated.position;
                    }
                    if generated.size.is_some() {
                        layer.size = generated.size;
                    }
                }
            }
            merged
        }
    }
}

/// Replace invalid image references with the previous value (or drop them).
fn sanitize_images(
    mut document: DesignDocument,
    previous: Option<&DesignDocument>,
) -> DesignDocument {
    if let Some(image) = &document.background_image {
        if let Err(e) = validate_image_reference(image) {
            tracing::warn!("Discarding generated background image: {e}");
            document.background_image = previous.and_then(|p| p.background_image.clone());
        }
    }
    for layer in document
        .layers
        .iter_mut()
        .filter(|l| l.kind == LayerKind::Image)
    {
        let Some(content) = &layer.content else {
            continue;
        };
        if let Err(e) = validate_image_reference(content) {
            tracing::warn!("Discarding generated image for {}: {e}", layer.id);
            layer.content = previous
                .and_then(|p| p.layer(&layer.id))
                .filter(|l| l.kind == LayerKind::Image)
                .and_then(|l| l.content.clone());
        }
    }
    document
}
