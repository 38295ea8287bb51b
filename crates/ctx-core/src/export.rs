//! Export planning for PDF and Word documents.
//!
//! Produces the ordered, sized list of items a document writer lays out,
//! plus the standard export filename. Byte-level document generation is the
//! host's job; nothing here mutates the canvas.

use crate::clock::Millis;
use crate::model::{Block, BlockKind, Size};
use crate::order::{READING_ROW_TOLERANCE, reading_order};
use chrono::{Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Font size used for text blocks without an explicit one.
pub const DEFAULT_FONT_SIZE: f64 = 14.0;
/// Text colour used for blocks without an explicit one.
pub const DEFAULT_TEXT_COLOR: &str = "#000000";

/// Pixels → millimetres at 96 dpi.
const PX_TO_MM: f64 = 0.264583;
/// A4 content box with 15 mm margins, in millimetres.
const PDF_CONTENT: Size = Size::new(180.0, 267.0);
/// Widest image the Word export emits, in pixels.
const WORD_MAX_IMAGE_WIDTH: f64 = 600.0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("the canvas is empty; nothing to export")]
    EmptyCanvas,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Word,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Word => "docx",
        }
    }

    /// Row band for reading order. The Word export has always used a
    /// tighter band than the PDF export.
    pub fn row_tolerance(self) -> f64 {
        match self {
            ExportFormat::Pdf => READING_ROW_TOLERANCE,
            ExportFormat::Word => 50.0,
        }
    }

    /// Scale an on-canvas pixel size into the format's output units.
    pub fn fit_image(self, size: Size) -> Size {
        match self {
            ExportFormat::Pdf => fit_within(
                Size::new(size.width * PX_TO_MM, size.height * PX_TO_MM),
                PDF_CONTENT,
            ),
            ExportFormat::Word => fit_within(size, Size::new(WORD_MAX_IMAGE_WIDTH, f64::INFINITY)),
        }
    }
}

/// Shrink `size` proportionally until it fits in `bounds`. Never enlarges.
pub fn fit_within(size: Size, bounds: Size) -> Size {
    let mut out = size;
    if out.width > bounds.width {
        let ratio = bounds.width / out.width;
        out.width = bounds.width;
        out.height *= ratio;
    }
    if out.height > bounds.height {
        let ratio = bounds.height / out.height;
        out.height = bounds.height;
        out.width *= ratio;
    }
    out
}

// ─── Plan ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ExportItem {
    Paragraph {
        text: String,
        font_size: f64,
        font_family: Option<String>,
        color: String,
    },
    Image {
        data: String,
        format: String,
        width: f64,
        height: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportPlan {
    pub format: ExportFormat,
    pub items: Vec<ExportItem>,
}

impl ExportPlan {
    pub fn build(blocks: &[Arc<Block>], format: ExportFormat) -> Result<Self, ExportError> {
        if blocks.is_empty() {
            return Err(ExportError::EmptyCanvas);
        }
        let items = reading_order(blocks, format.row_tolerance())
            .iter()
            .map(|b| export_item(b, format))
            .collect();
        Ok(Self { format, items })
    }
}

fn export_item(block: &Block, format: ExportFormat) -> ExportItem {
    match &block.kind {
        BlockKind::Text {
            content,
            font_size,
            font_family,
            color,
        } => ExportItem::Paragraph {
            text: content.clone(),
            font_size: font_size.unwrap_or(DEFAULT_FONT_SIZE),
            font_family: font_family.clone(),
            color: color.clone().unwrap_or_else(|| DEFAULT_TEXT_COLOR.to_string()),
        },
        BlockKind::Image {
            image_data,
            original_format,
        } => {
            let fitted = format.fit_image(block.size);
            ExportItem::Image {
                data: image_data.clone(),
                format: original_format.clone(),
                width: fitted.width,
                height: fitted.height,
            }
        }
    }
}

// ─── Filenames ───────────────────────────────────────────────────────────

/// `AI_context_YYMMDD###.<ext>`, where `###` is the day's export counter.
pub fn export_filename(format: ExportFormat, date: NaiveDate, counter: u32) -> String {
    format!(
        "AI_context_{}{counter:03}.{}",
        date.format("%y%m%d"),
        format.extension()
    )
}

/// Local calendar date of an epoch-millisecond instant.
pub fn local_date(now: Millis) -> NaiveDate {
    Local
        .timestamp_millis_opt(now)
        .single()
        .map(|dt| dt.date_naive())
        .unwrap_or_default()
}

/// Per-day export counters, keyed by `YYMMDD`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExportCounter {
    days: BTreeMap<String, u32>,
}

impl ExportCounter {
    /// Bump the counter for `date` and return the filename to use.
    pub fn next_filename(&mut self, format: ExportFormat, date: NaiveDate) -> String {
        let key = date.format("%y%m%d").to_string();
        let n = self.days.entry(key).or_insert(0);
        *n += 1;
        export_filename(format, date, *n)
    }

    /// Exports made on `date` so far.
    pub fn count(&self, date: NaiveDate) -> u32 {
        self.days
            .get(&date.format("%y%m%d").to_string())
            .copied()
            .unwrap_or(0)
    }
}
