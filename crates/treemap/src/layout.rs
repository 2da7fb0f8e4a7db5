// In crates/treemap/src/layout.rs

use crate::Share;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolution of the ratio constraints handed to the layout solver.
const RATIO_SCALE: u32 = 10_000;

/// A placed rectangle for the child at `index` of the current node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub rect: Rect,
    pub index: usize,
}

/// Lays `shares` out inside `area`, largest first.
///
/// The sorted shares are split into two groups of roughly equal weight, the
/// area is cut across its longer side in that ratio, and each half recurses.
/// Zero shares get no tile, and a share that ends up with no cells is dropped.
pub fn layout(shares: &[Share], area: Rect) -> Vec<Tile> {
    let mut items: Vec<(usize, f64)> = shares
        .iter()
        .filter(|s| s.percent > 0.0)
        .map(|s| (s.index, s.percent))
        .collect();
    items.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut tiles = Vec::with_capacity(items.len());
    split(&items, area, &mut tiles);
    tiles
}

fn split(items: &[(usize, f64)], area: Rect, out: &mut Vec<Tile>) {
    if items.is_empty() || area.width == 0 || area.height == 0 {
        return;
    }
    if let [(index, _)] = items {
        out.push(Tile { rect: area, index: *index });
        return;
    }

    let total: f64 = items.iter().map(|(_, w)| w).sum();
    let mut running = 0.0;
    let mut cut = items.len() - 1;
    for (i, (_, weight)) in items.iter().enumerate() {
        running += weight;
        if running >= total / 2.0 {
            cut = i + 1;
            break;
        }
    }
    let cut = cut.clamp(1, items.len() - 1);
    let (head, tail) = items.split_at(cut);

    let head_weight: f64 = head.iter().map(|(_, w)| w).sum();
    let scale = f64::from(RATIO_SCALE);
    let head_ratio = ((head_weight / total) * scale).round().clamp(1.0, scale - 1.0) as u32;

    // Terminal cells are roughly twice as tall as they are wide.
    let direction = if area.width >= area.height.saturating_mul(2) {
        Direction::Horizontal
    } else {
        Direction::Vertical
    };

    let parts = Layout::default()
        .direction(direction)
        .constraints([
            Constraint::Ratio(head_ratio, RATIO_SCALE),
            Constraint::Ratio(RATIO_SCALE - head_ratio, RATIO_SCALE),
        ])
        .split(area);

    split(head, parts[0], out);
    split(tail, parts[1], out);
}

/// The tile under terminal cell (`column`, `row`), if any.
pub fn tile_at(tiles: &[Tile], column: u16, row: u16) -> Option<&Tile> {
    tiles.iter().find(|t| {
        let r = t.rect;
        column >= r.x && column < r.x + r.width && row >= r.y && row < r.y + r.height
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn share(index: usize, percent: f64) -> Share {
        Share {
            name: format!("S{index}"),
            percent,
            index,
            leaf: true,
        }
    }

    fn overlaps(a: Rect, b: Rect) -> bool {
        a.x < b.x + b.width && b.x < a.x + a.width && a.y < b.y + b.height && b.y < a.y + a.height
    }

    fn contained(inner: Rect, outer: Rect) -> bool {
        inner.x >= outer.x
            && inner.y >= outer.y
            && inner.x + inner.width <= outer.x + outer.width
            && inner.y + inner.height <= outer.y + outer.height
    }

    #[test]
    fn test_tiles_are_disjoint_and_inside_the_area() {
        let area = Rect::new(0, 0, 120, 40);
        let input: Vec<Share> = [35.0, 25.0, 15.0, 10.0, 8.0, 7.0]
            .iter()
            .enumerate()
            .map(|(i, p)| share(i, *p))
            .collect();

        let tiles = layout(&input, area);
        assert_eq!(tiles.len(), input.len());

        for (i, a) in tiles.iter().enumerate() {
            assert!(contained(a.rect, area), "{:?}", a.rect);
            for b in &tiles[i + 1..] {
                assert!(!overlaps(a.rect, b.rect), "{:?} overlaps {:?}", a.rect, b.rect);
            }
        }
    }

    #[test]
    fn test_larger_share_gets_larger_tile() {
        let tiles = layout(&[share(0, 25.0), share(1, 75.0)], Rect::new(0, 0, 100, 20));
        let big = tiles.iter().find(|t| t.index == 1).unwrap().rect;
        let small = tiles.iter().find(|t| t.index == 0).unwrap().rect;
        assert!(big.area() > small.area() * 2);
    }

    #[test]
    fn test_single_share_fills_area() {
        let area = Rect::new(2, 3, 50, 10);
        assert_eq!(layout(&[share(4, 100.0)], area), vec![Tile { rect: area, index: 4 }]);
    }

    #[test]
    fn test_zero_shares_and_empty_area_produce_no_tiles() {
        assert!(layout(&[share(0, 0.0), share(1, 0.0)], Rect::new(0, 0, 80, 24)).is_empty());
        assert!(layout(&[share(0, 100.0)], Rect::new(0, 0, 0, 24)).is_empty());

        let tiles = layout(&[share(0, 0.0), share(1, 100.0)], Rect::new(0, 0, 80, 24));
        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles[0].index, 1);
    }

    #[test]
    fn test_tile_at_hit_test() {
        let tiles = vec![
            Tile { rect: Rect::new(0, 0, 10, 5), index: 0 },
            Tile { rect: Rect::new(10, 0, 10, 5), index: 1 },
        ];
        assert_eq!(tile_at(&tiles, 3, 2).map(|t| t.index), Some(0));
        assert_eq!(tile_at(&tiles, 10, 0).map(|t| t.index), Some(1));
        assert_eq!(tile_at(&tiles, 20, 0), None);
    }
}
