//! Background decoding of inline image payloads in generated documents.
//!
//! Generated documents often carry `data:` URIs several megabytes long.
//! Decoding them to learn their pixel size happens on the blocking pool,
//! before the editor lock is taken.

use adcanvas_core::{DesignDocument, LayerKind};
use adcanvas_renderer::{measure_source, IntrinsicSize};

use crate::error::StudioResult;

/// What decoding learned about a document's images.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedImages {
    /// Intrinsic sizes of inline payloads that decoded.
    pub sizes: Vec<(String, IntrinsicSize)>,
    /// Inline payloads that failed to decode.
    pub rejected: Vec<String>,
}

/// Decode every inline image reference in `document`.
///
/// URL references are left for the host to fetch and are not reported.
#[must_use]
pub fn decode_images(document: &DesignDocument) -> DecodedImages {
    let layer_images = document
        .layers
        .iter()
        .filter(|layer| layer.kind == LayerKind::Image)
        .filter_map(|layer| layer.content.as_deref());
    let mut decoded = DecodedImages::default();
    for content in document.background_image.as_deref().into_iter().chain(layer_images) {
        match measure_source(content) {
            Ok(Some(size)) => decoded.sizes.push((content.to_string(), size)),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("Discarding undecodable image payload: {e}");
                decoded.rejected.push(content.to_string());
            }
        }
    }
    decoded
}

/// Run [`decode_images`] on the blocking pool.
///
/// # Errors
///
/// Returns an error if the blocking task panicked.
pub async fn decode_images_in_background(
    document: DesignDocument,
) -> StudioResult<(DesignDocument, DecodedImages)> {
    let result = tokio::task::spawn_blocking(move || {
        let decoded = decode_images(&document);
        (document, decoded)
    })
    .await?;
    Ok(result)
}

/// Put back the current value wherever `result` carries a rejected payload.
///
/// Image layers that were not images in `current` have their content cleared.
pub fn restore_rejected(result: &mut DesignDocument, current: &DesignDocument, rejected: &[String]) {
    if rejected.is_empty() {
        return;
    }
    let is_rejected = |content: &str| rejected.iter().any(|r| r == content);

    if result
        .background_image
        .as_deref()
        .is_some_and(is_rejected)
    {
        result.background_image.clone_from(&current.background_image);
    }
    for layer in &mut result.layers {
        if layer.kind != LayerKind::Image || !layer.content.as_deref().is_some_and(is_rejected) {
            continue;
        }
        layer.content = current
            .layer(&layer.id)
            .filter(|previous| previous.kind == LayerKind::Image)
            .and_then(|previous| previous.content.clone());
        tracing::debug!("Restored image content of layer {}", layer.id);
    }
}
