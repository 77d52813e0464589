//! The intermediate cell model shared by the decoders.
//!
//! Decoders do not paint pixels directly; they append positioned, colored
//! character cells to a [`CellBuffer`] while tracking how much of the grid
//! was actually touched. The render pass then walks the cells in append
//! order, so later writes to the same position paint over earlier ones.

use image::Rgba;

/// A single character cell: glyph, palette indices, optional 24-bit
/// overrides and the text attributes the ANSi interpreter tracks.
///
/// Positions are signed: cursor-motion sequences with empty parameters can
/// move above row 0, and those cells simply fall outside the image.
/// An RGB override, when present, wins over the palette index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub column: i32,
    pub row: i32,
    pub glyph: u8,
    pub fg: u8,
    pub bg: u8,
    pub fg_rgb: Option<Rgba<u8>>,
    pub bg_rgb: Option<Rgba<u8>>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl Cell {
    /// A plain palette-indexed cell, as produced by the binary formats.
    pub fn indexed(column: i32, row: i32, glyph: u8, fg: u8, bg: u8) -> Self {
        Self {
            column,
            row,
            glyph,
            fg,
            bg,
            fg_rgb: None,
            bg_rgb: None,
            bold: false,
            italic: false,
            underline: false,
        }
    }
}

/// Append-only sequence of cells plus the maximum extents observed.
#[derive(Debug, Default)]
pub struct CellBuffer {
    cells: Vec<Cell>,
    max_column: i32,
    max_row: i32,
}

impl CellBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the cursor printed at a position without necessarily
    /// appending a cell (Amiga fonts suppress some glyphs but the position
    /// still counts toward the extents).
    pub fn note_position(&mut self, column: i32, row: i32) {
        if column > self.max_column {
            self.max_column = column;
        }
        if row > self.max_row {
            self.max_row = row;
        }
    }

    pub fn push(&mut self, cell: Cell) {
        self.note_position(cell.column, cell.row);
        self.cells.push(cell);
    }

    /// Full clear, used by erase-display: drops every cell and resets the
    /// extent tracking.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.reset_extents();
    }

    /// Forget the extents but keep the cells. PCBoard's clear-screen code
    /// homes the cursor without unpainting anything.
    pub fn reset_extents(&mut self) {
        self.max_column = 0;
        self.max_row = 0;
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of columns touched (max column + 1).
    pub fn columns_used(&self) -> i32 {
        self.max_column + 1
    }

    /// Number of rows touched (max row + 1).
    pub fn rows_used(&self) -> i32 {
        self.max_row + 1
    }
}
