//! Ordering rules over block sequences.
//!
//! - **Chronological**: grid-mode auto-layout, ascending `created_at`.
//! - **Reading order**: export, top-to-bottom then left-to-right, with blocks
//!   whose `y` falls inside a tolerance band treated as one row.
//!
//! Both are stable and never touch `position` or `size`.

use crate::model::Block;
use std::sync::Arc;

/// Row band used by the PDF export and the default reading order.
pub const READING_ROW_TOLERANCE: f64 = 100.0;

/// Sort by ascending `created_at`. Ties keep their prior relative order.
pub fn chronological(blocks: &[Arc<Block>]) -> Vec<Arc<Block>> {
    let mut sorted = blocks.to_vec();
    sorted.sort_by_key(|b| b.created_at);
    sorted
}

/// Sort into reading order.
///
/// Blocks are sorted by `y`; a row opens at the first unplaced block and
/// absorbs every following block whose `y` is less than `tolerance` below
/// that opener. Each row is then sorted by `x`. Rows are anchored on their
/// first block rather than chained, so the result is a total order.
pub fn reading_order(blocks: &[Arc<Block>], tolerance: f64) -> Vec<Arc<Block>> {
    let mut by_y = blocks.to_vec();
    by_y.sort_by(|a, b| a.position.y.total_cmp(&b.position.y));

    let mut out = Vec::with_capacity(by_y.len());
    let mut row: Vec<Arc<Block>> = Vec::new();
    let mut row_top = f64::NEG_INFINITY;

    for block in by_y {
        if !row.is_empty() && block.position.y - row_top >= tolerance {
            flush_row(&mut row, &mut out);
        }
        if row.is_empty() {
            row_top = block.position.y;
        }
        row.push(block);
    }
    flush_row(&mut row, &mut out);
    out
}

fn flush_row(row: &mut Vec<Arc<Block>>, out: &mut Vec<Arc<Block>>) {
    row.sort_by(|a, b| a.position.x.total_cmp(&b.position.x));
    out.append(row);
}

/// Axis-aligned bounds in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Smallest rectangle containing every block, or `None` for an empty canvas.
pub fn content_bounds(blocks: &[Arc<Block>]) -> Option<Bounds> {
    let first = blocks.first()?;
    let mut min_x = first.position.x;
    let mut min_y = first.position.y;
    let mut max_x = first.position.x + first.size.width;
    let mut max_y = first.position.y + first.size.height;

    for b in &blocks[1..] {
        min_x = min_x.min(b.position.x);
        min_y = min_y.min(b.position.y);
        max_x = max_x.max(b.position.x + b.size.width);
        max_y = max_y.max(b.position.y + b.size.height);
    }

    Some(Bounds {
        x: min_x,
        y: min_y,
        width: max_x - min_x,
        height: max_y - min_y,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::BlockId;
    use crate::model::{BlockKind, Position, Size};
    use pretty_assertions::assert_eq;

    fn at(id: &str, x: f64, y: f64, created_at: i64) -> Arc<Block> {
        Arc::new(Block::new(
            BlockId::intern(id),
            BlockKind::text(id),
            Position::new(x, y),
            Size::new(100.0, 50.0),
            created_at,
        ))
    }

    fn ids(blocks: &[Arc<Block>]) -> Vec<&str> {
        blocks.iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn chronological_sorts_by_created_at() {
        let blocks = vec![at("c", 0.0, 0.0, 300), at("a", 5.0, 5.0, 100), at("b", 9.0, 9.0, 200)];
        let sorted = chronological(&blocks);
        assert_eq!(ids(&sorted), vec!["a", "b", "c"]);
        // Positions untouched.
        assert_eq!(sorted[0].position, Position::new(5.0, 5.0));
    }

    #[test]
    fn chronological_is_stable_on_ties() {
        let blocks = vec![at("x", 0.0, 0.0, 100), at("y", 0.0, 0.0, 50), at("z", 0.0, 0.0, 100)];
        assert_eq!(ids(&chronological(&blocks)), vec!["y", "x", "z"]);
    }

    #[test]
    fn reading_order_groups_rows_within_tolerance() {
        let blocks = vec![
            at("bottom", 0.0, 400.0, 0),
            at("right", 500.0, 10.0, 0),
            at("left", 20.0, 60.0, 0),
            at("middle", 300.0, 200.0, 0),
        ];
        let sorted = reading_order(&blocks, READING_ROW_TOLERANCE);
        assert_eq!(ids(&sorted), vec!["left", "right", "middle", "bottom"]);
    }

    #[test]
    fn reading_order_rows_anchor_on_first_block() {
        // 0 → 90 → 180: the third block is 180 below the row opener, so it
        // starts a new row even though it is within 100 of the second.
        let blocks = vec![
            at("a", 300.0, 0.0, 0),
            at("b", 200.0, 90.0, 0),
            at("c", 100.0, 180.0, 0),
        ];
        assert_eq!(ids(&reading_order(&blocks, 100.0)), vec!["b", "a", "c"]);
    }

    #[test]
    fn content_bounds_spans_all_blocks() {
        assert_eq!(content_bounds(&[]), None);
        let blocks = vec![at("a", -10.0, 0.0, 0), at("b", 200.0, 300.0, 0)];
        assert_eq!(
            content_bounds(&blocks),
            Some(Bounds {
                x: -10.0,
                y: 0.0,
                width: 310.0,
                height: 350.0
            })
        );
    }
}
