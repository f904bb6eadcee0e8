//! Candidate crop-origin grids.

use crate::utils::{Error, Result};
use serde::{Deserialize, Serialize};

/// Top-left corner of a candidate crop rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

impl Position {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Generates a `grid_size x grid_size` grid of crop origins in row-major order.
///
/// Coordinates are evenly spaced over `0..=max` but never sit on the zero edge
/// when the axis can move, since edge samples pick up encoder artifacts and
/// letterboxing. With no movement on either axis the only position is `(0, 0)`.
pub fn generate_grid(max_x: u32, max_y: u32, grid_size: u32) -> Result<Vec<Position>> {
    if grid_size < 1 {
        return Err(Error::validation(format!(
            "Grid size must be at least 1, got {}",
            grid_size
        )));
    }

    if max_x == 0 && max_y == 0 {
        return Ok(vec![Position::new(0, 0)]);
    }

    let xs = axis_coordinates(max_x, grid_size);
    let ys = axis_coordinates(max_y, grid_size);

    let mut positions = Vec::with_capacity(xs.len() * ys.len());
    for &y in &ys {
        for &x in &xs {
            positions.push(Position::new(x, y));
        }
    }

    Ok(positions)
}

fn axis_coordinates(max: u32, grid_size: u32) -> Vec<u32> {
    if max == 0 {
        return vec![0; grid_size as usize];
    }
    if grid_size == 1 {
        return vec![max / 2];
    }

    let steps = (grid_size - 1) as u64;
    (0..grid_size as u64)
        .map(|i| ((max as u64 * i / steps) as u32).max(1))
        .collect()
}

/// Center of the movement range.
pub fn center_position(max_x: u32, max_y: u32) -> Position {
    Position::new(max_x / 2, max_y / 2)
}

/// The four literal corners: top-left, top-right, bottom-left, bottom-right.
pub fn corner_positions(max_x: u32, max_y: u32) -> [Position; 4] {
    [
        Position::new(0, 0),
        Position::new(max_x, 0),
        Position::new(0, max_y),
        Position::new(max_x, max_y),
    ]
}
