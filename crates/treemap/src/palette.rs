// In crates/treemap/src/palette.rs

use ratatui::style::Color;

const HEX: [&str; 10] = [
    "#2196F3", "#FF9800", "#4CAF50", "#9C27B0", "#F44336",
    "#607D8B", "#795548", "#FF5722", "#00BCD4", "#E91E63",
];

/// Sector colours, cycled by sibling index.
pub const PALETTE: [Color; 10] = [
    Color::Rgb(0x21, 0x96, 0xF3),
    Color::Rgb(0xFF, 0x98, 0x00),
    Color::Rgb(0x4C, 0xAF, 0x50),
    Color::Rgb(0x9C, 0x27, 0xB0),
    Color::Rgb(0xF4, 0x43, 0x36),
    Color::Rgb(0x60, 0x7D, 0x8B),
    Color::Rgb(0x79, 0x55, 0x48),
    Color::Rgb(0xFF, 0x57, 0x22),
    Color::Rgb(0x00, 0xBC, 0xD4),
    Color::Rgb(0xE9, 0x1E, 0x63),
];

pub fn color_for(index: usize) -> Color {
    PALETTE[index % PALETTE.len()]
}

pub fn hex_for(index: usize) -> &'static str {
    HEX[index % HEX.len()]
}
