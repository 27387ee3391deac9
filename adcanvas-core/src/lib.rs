//! # AdCanvas Core
//!
//! Direct-manipulation editing for ad creatives: a layer model in
//! percentage space, a selection/drag/resize/text-edit state machine with
//! centreline snapping, snapshot history, and the document editor API that
//! ties them together.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               DocumentEditor                │
//! ├─────────────────────────────────────────────┤
//! │  Interaction     │  Editing API             │
//! │  - Pointer/keys  │  - Patches, toggles      │
//! │  - Snap engine   │  - Restacking            │
//! │  - Text drafts   │  - Regeneration gate     │
//! ├─────────────────────────────────────────────┤
//! │  DesignDocument  │  History                 │
//! │  - Layers        │  - Snapshots + cursor    │
//! │  - Background    │  - Depth cap             │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The crate has no async runtime and no rendering; hosts feed it input
//! events and read back the document, the interaction state and the
//! [`EditorEvent`] stream.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod document;
pub mod editor;
pub mod error;
pub mod event;
pub mod geometry;
pub mod history;
pub mod image_source;
pub mod interaction;
pub mod layer;
pub mod regeneration;
pub mod snap;
pub mod style;

pub use document::{BackgroundPatch, DesignDocument, Palette, DEFAULT_BACKGROUND};
pub use editor::{CommitCallback, DocumentEditor, EditorConfig, EditorEvent};
pub use error::{CanvasError, CanvasResult};
pub use event::{InputEvent, KeyCommand, KeyModifiers, PointerEvent, PointerPhase, PointerTarget};
pub use geometry::{CanvasSize, Dimensions, Position, Rect, CANVAS_WIDTH, CENTRE};
pub use history::{History, DEFAULT_HISTORY_DEPTH};
pub use image_source::{validate_image_reference, ImageSource};
pub use interaction::{Effect, InteractionConfig, InteractionMode, InteractionState};
pub use layer::{Layer, LayerId, LayerKind, LayerPatch, LayerSize, ResolvedLayer, BACKGROUND_ID};
pub use regeneration::{
    merge_regeneration, RegenerationGate, RegenerationOutcome, RegenerationScope,
    RegenerationTicket,
};
pub use snap::{SnapEngine, SnapGuides, SnapResult};
pub use style::{
    CssLength, FontWeight, Insets, LayerStyle, ObjectFit, ResolvedStyle, TextAlign, TextTransform,
    ROOT_FONT_PX,
};

/// Canvas core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
