//! Core data model for the canvas.
//!
//! A canvas is an ordered sequence of blocks. Each block is one pasted or
//! dropped item (text or an image) with a position on the free-form
//! surface, a size, and creation / modification timestamps. Grid mode
//! ignores positions and presents blocks in sequence order.
//!
//! Blocks are immutable-by-replacement: a mutation builds a new `Block`
//! and a new `BlockSeq`, so history snapshots can share every block that a
//! mutation did not touch.

use crate::clock::Millis;
use crate::id::BlockId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ─── Geometry ────────────────────────────────────────────────────────────

/// Canvas coordinates. Only meaningful in free-form mode.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// This position shifted by `(dx, dy)`.
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Smallest size the UI lets a text block be resized to.
pub const MIN_TEXT_SIZE: Size = Size::new(50.0, 30.0);
/// Smallest size the UI lets an image block be resized to.
pub const MIN_IMAGE_SIZE: Size = Size::new(50.0, 50.0);

// ─── Viewport ────────────────────────────────────────────────────────────

/// Lower bound on viewport scale.
pub const MIN_SCALE: f64 = 0.1;
/// Upper bound on viewport scale.
pub const MAX_SCALE: f64 = 5.0;

/// Pan offset and zoom of the free-form surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
        }
    }
}

/// Partial viewport update; `None` fields keep their current value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub scale: Option<f64>,
}

impl Viewport {
    /// Shallow-merge `patch` into this viewport.
    pub fn merge(&mut self, patch: ViewportPatch) {
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(scale) = patch.scale {
            self.scale = scale;
        }
    }

    /// Zoom one wheel step around a screen-space `pointer`, keeping the
    /// canvas point under the pointer fixed. Scale is clamped to
    /// `[MIN_SCALE, MAX_SCALE]`.
    pub fn zoom_at(&self, pointer: Position, zoom_in: bool) -> ViewportPatch {
        let anchor_x = (pointer.x - self.x) / self.scale;
        let anchor_y = (pointer.y - self.y) / self.scale;
        let factor = if zoom_in { 1.1 } else { 0.9 };
        let scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        ViewportPatch {
            x: Some(pointer.x - anchor_x * scale),
            y: Some(pointer.y - anchor_y * scale),
            scale: Some(scale),
        }
    }
}

// ─── Blocks ──────────────────────────────────────────────────────────────

/// Variant-specific payload of a block, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BlockKind {
    #[serde(rename_all = "camelCase")]
    Text {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        font_size: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        font_family: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Image {
        /// Self-describing payload, normally a `data:` URI.
        image_data: String,
        /// Source encoding tag, e.g. `png`.
        original_format: String,
    },
}

impl BlockKind {
    /// Plain text variant with no styling overrides.
    pub fn text(content: impl Into<String>) -> Self {
        BlockKind::Text {
            content: content.into(),
            font_size: None,
            font_family: None,
            color: None,
        }
    }

    pub fn image(image_data: impl Into<String>, original_format: impl Into<String>) -> Self {
        BlockKind::Image {
            image_data: image_data.into(),
            original_format: original_format.into(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            BlockKind::Text { .. } => "text",
            BlockKind::Image { .. } => "image",
        }
    }
}

/// One content unit on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: BlockId,
    pub position: Position,
    pub size: Size,
    pub created_at: Millis,
    pub updated_at: Millis,
    #[serde(flatten)]
    pub kind: BlockKind,
}

impl Block {
    /// Construct a block with both timestamps set to `now`.
    pub fn new(id: BlockId, kind: BlockKind, position: Position, size: Size, now: Millis) -> Self {
        Self {
            id,
            position,
            size,
            created_at: now,
            updated_at: now,
            kind,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, BlockKind::Text { .. })
    }

    pub fn is_image(&self) -> bool {
        matches!(self.kind, BlockKind::Image { .. })
    }

    /// Text content, or `None` for image blocks.
    pub fn text_content(&self) -> Option<&str> {
        match &self.kind {
            BlockKind::Text { content, .. } => Some(content),
            BlockKind::Image { .. } => None,
        }
    }

    /// Image payload, or `None` for text blocks.
    pub fn image_data(&self) -> Option<&str> {
        match &self.kind {
            BlockKind::Image { image_data, .. } => Some(image_data),
            BlockKind::Text { .. } => None,
        }
    }

    /// Smallest size the UI allows when resizing this block.
    pub fn min_size(&self) -> Size {
        match self.kind {
            BlockKind::Text { .. } => MIN_TEXT_SIZE,
            BlockKind::Image { .. } => MIN_IMAGE_SIZE,
        }
    }

    /// Shallow-merge `patch` into this block and stamp `updated_at = now`.
    ///
    /// Fields belonging to the other variant are dropped; returns `false`
    /// if any were supplied so the caller can report it.
    pub fn apply_patch(&mut self, patch: &BlockPatch, now: Millis) -> bool {
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(size) = patch.size {
            self.size = size;
        }
        if let Some(created_at) = patch.created_at {
            self.created_at = created_at;
        }

        let consistent = match &mut self.kind {
            BlockKind::Text {
                content,
                font_size,
                font_family,
                color,
            } => {
                if let Some(c) = &patch.content {
                    *content = c.clone();
                }
                if patch.font_size.is_some() {
                    *font_size = patch.font_size;
                }
                if patch.font_family.is_some() {
                    *font_family = patch.font_family.clone();
                }
                if patch.color.is_some() {
                    *color = patch.color.clone();
                }
                patch.image_data.is_none() && patch.original_format.is_none()
            }
            BlockKind::Image {
                image_data,
                original_format,
            } => {
                if let Some(d) = &patch.image_data {
                    *image_data = d.clone();
                }
                if let Some(f) = &patch.original_format {
                    *original_format = f.clone();
                }
                patch.content.is_none()
                    && patch.font_size.is_none()
                    && patch.font_family.is_none()
                    && patch.color.is_none()
            }
        };

        // Store-controlled: any caller-supplied value is overridden.
        self.updated_at = now;
        consistent
    }
}

/// Partial block update. `updated_at` is accepted for wire compatibility
/// but always overridden by the store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlockPatch {
    pub position: Option<Position>,
    pub size: Option<Size>,
    pub created_at: Option<Millis>,
    pub updated_at: Option<Millis>,
    pub content: Option<String>,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub color: Option<String>,
    pub image_data: Option<String>,
    pub original_format: Option<String>,
}

impl BlockPatch {
    pub fn position(position: Position) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn size(size: Size) -> Self {
        Self {
            size: Some(size),
            ..Self::default()
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Timestamp correction, as done from the grid view.
    pub fn created_at(created_at: Millis) -> Self {
        Self {
            created_at: Some(created_at),
            ..Self::default()
        }
    }
}

// ─── Sequences ───────────────────────────────────────────────────────────

/// An immutable, reference-counted block sequence.
///
/// Cloning is O(1); building a new sequence after a mutation copies only
/// the `Arc` pointers, so image payloads are never duplicated by history.
pub type BlockSeq = Arc<[Arc<Block>]>;

/// The empty sequence.
pub fn empty_seq() -> BlockSeq {
    Arc::from(Vec::<Arc<Block>>::new())
}

/// Build a sequence from owned blocks.
pub fn seq_from_blocks(blocks: impl IntoIterator<Item = Block>) -> BlockSeq {
    blocks.into_iter().map(Arc::new).collect()
}
