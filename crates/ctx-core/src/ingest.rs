//! Block construction for clipboard pastes and file drops.
//!
//! The host reads the system clipboard or dropped files (async, outside the
//! store) and hands the resolved payload here. These helpers turn it into a
//! fully-formed `Block` with a fresh id and a pre-computed size, ready for
//! `BlockStore::add_block`.

use crate::clock::Millis;
use crate::id::BlockId;
use crate::model::{Block, BlockKind, Position, Size};
use thiserror::Error;

/// Where a paste lands when the user has not clicked on the canvas yet.
pub const DEFAULT_PASTE_POSITION: Position = Position::new(100.0, 100.0);

/// Images larger than this are shown scaled down.
pub const MAX_IMAGE_SIZE: Size = Size::new(800.0, 600.0);

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IngestError {
    #[error("not a data URI")]
    NotDataUri,
    #[error("unsupported content type `{0}`")]
    UnsupportedMime(String),
}

// ─── Data URIs ───────────────────────────────────────────────────────────

/// A borrowed view of `data:<mime>[;base64],<payload>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUri<'a> {
    pub mime: &'a str,
    pub base64: bool,
    pub payload: &'a str,
}

impl<'a> DataUri<'a> {
    /// MIME subtype, e.g. `png` for `image/png`.
    pub fn subtype(&self) -> &'a str {
        self.mime.split_once('/').map(|(_, sub)| sub).unwrap_or(self.mime)
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }
}

pub fn parse_data_uri(uri: &str) -> Result<DataUri<'_>, IngestError> {
    let rest = uri.strip_prefix("data:").ok_or(IngestError::NotDataUri)?;
    let (meta, payload) = rest.split_once(',').ok_or(IngestError::NotDataUri)?;
    let (mime, base64) = match meta.strip_suffix(";base64") {
        Some(mime) => (mime, true),
        None => (meta, false),
    };
    // Drop parameters such as `;charset=utf-8`.
    let mime = mime.split(';').next().unwrap_or_default();
    Ok(DataUri {
        mime,
        base64,
        payload,
    })
}

// ─── Sizing ──────────────────────────────────────────────────────────────

/// Initial size of a pasted text block, derived from its line shape.
pub fn text_block_size(content: &str) -> Size {
    let lines: Vec<&str> = content.split('\n').collect();
    let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let width = (longest as f64 * 8.0).clamp(300.0, 600.0);
    let height = (lines.len() as f64 * 20.0 + 20.0).clamp(100.0, 400.0);
    Size::new(width, height)
}

/// Initial size of an image block: natural size, capped per axis.
pub fn image_block_size(natural: Size) -> Size {
    Size::new(
        natural.width.min(MAX_IMAGE_SIZE.width),
        natural.height.min(MAX_IMAGE_SIZE.height),
    )
}

// ─── Constructors ────────────────────────────────────────────────────────

/// Build a text block from pasted text. Whitespace-only text yields `None`.
pub fn text_block(content: &str, position: Position, now: Millis) -> Option<Block> {
    if content.trim().is_empty() {
        return None;
    }
    Some(Block::new(
        BlockId::generate(now),
        BlockKind::text(content),
        position,
        text_block_size(content),
        now,
    ))
}

/// Build an image block from a `data:` URI and the decoded natural size.
pub fn image_block(
    data_uri: &str,
    natural: Size,
    position: Position,
    now: Millis,
) -> Result<Block, IngestError> {
    let parsed = parse_data_uri(data_uri)?;
    if !parsed.is_image() {
        return Err(IngestError::UnsupportedMime(parsed.mime.to_string()));
    }
    Ok(Block::new(
        BlockId::generate(now),
        BlockKind::image(data_uri, parsed.subtype()),
        position,
        image_block_size(natural),
        now,
    ))
}

// ─── File drops ──────────────────────────────────────────────────────────

/// Lays out a batch of dropped images left to right, wrapping into a new
/// row once the cursor passes `x = 1000`.
#[derive(Debug, Clone)]
pub struct DropPlacer {
    cursor: Position,
}

impl Default for DropPlacer {
    fn default() -> Self {
        Self::new()
    }
}

impl DropPlacer {
    const ORIGIN: Position = Position::new(100.0, 100.0);
    const GAP: f64 = 20.0;
    const WRAP_X: f64 = 1000.0;
    const ROW_HEIGHT: f64 = 400.0;

    pub fn new() -> Self {
        Self {
            cursor: Self::ORIGIN,
        }
    }

    /// Position for the next dropped item of the given (displayed) width,
    /// then advance the cursor past it.
    pub fn place(&mut self, width: f64) -> Position {
        let at = self.cursor;
        self.cursor.x += width + Self::GAP;
        if self.cursor.x > Self::WRAP_X {
            self.cursor.x = Self::ORIGIN.x;
            self.cursor.y += Self::ROW_HEIGHT;
        }
        at
    }

    /// Build image blocks for every dropped file, skipping non-images.
    pub fn place_images<'a>(
        &mut self,
        files: impl IntoIterator<Item = (&'a str, Size)>,
        now: Millis,
    ) -> Vec<Block> {
        let mut blocks = Vec::new();
        for (data_uri, natural) in files {
            let size = image_block_size(natural);
            match parse_data_uri(data_uri) {
                Ok(parsed) if parsed.is_image() => {
                    let position = self.place(size.width);
                    blocks.push(Block::new(
                        BlockId::generate(now),
                        BlockKind::image(data_uri, parsed.subtype()),
                        position,
                        size,
                        now,
                    ));
                }
                Ok(parsed) => log::debug!("skipping dropped file of type {}", parsed.mime),
                Err(e) => log::debug!("skipping dropped file: {e}"),
            }
        }
        blocks
    }
}
