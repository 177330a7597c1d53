//! Grid placement of diagrams.
//!
//! N diagrams go into a `side x side` grid with `side = ceil(sqrt(N))`,
//! filled row by row. Cells are 1-indexed.
//!
//! The offset of a cell is `(col * frame_width / 2, row * frame_height / 2)`.
//! Spacing follows the frame size rather than the diagram footprint, so
//! diagrams overlap once the grid grows past a couple of cells. The formula
//! is kept as is for compatibility; this is not a packing solver.

use crate::geometry::{Point, Size};

/// A 1-indexed cell in the diagram grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
}

/// Number of rows and columns needed for `count` diagrams.
pub fn grid_side(count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    let mut side = (count as f64).sqrt().ceil() as usize;
    // Guard against float rounding on perfect squares.
    while side * side < count {
        side += 1;
    }
    while side > 1 && (side - 1) * (side - 1) >= count {
        side -= 1;
    }
    side
}

/// Cell of the diagram at `index` in a grid of the given side.
pub fn cell_for(index: usize, side: usize) -> GridCell {
    GridCell {
        row: 1 + index / side,
        col: 1 + index % side,
    }
}

/// Cells for `count` diagrams, in diagram order.
pub fn place(count: usize) -> Vec<GridCell> {
    let side = grid_side(count);
    (0..count).map(|i| cell_for(i, side)).collect()
}

/// Center offset of a diagram placed in `cell`, for a frame of `frame` pixels.
pub fn cell_offset(cell: GridCell, frame: Size) -> Point {
    Point::new(
        cell.col as f64 * frame.width / 2.0,
        cell.row as f64 * frame.height / 2.0,
    )
}
