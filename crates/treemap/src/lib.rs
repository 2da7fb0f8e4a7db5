// In crates/treemap/src/lib.rs

//! Projection of one hierarchy level into sized, coloured tiles, plus the
//! drill-down navigation state the dashboard keeps on top of it.

pub mod layout;
pub mod navigator;
pub mod palette;
pub mod shares;

pub use layout::{Tile, layout, tile_at};
pub use navigator::{Crumb, Drill, Navigator};
pub use palette::{PALETTE, color_for, hex_for};
pub use shares::{Share, shares};
