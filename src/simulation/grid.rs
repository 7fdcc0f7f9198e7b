//! Coordinate grid
//!
//! Maps integer grid cells onto continuous world space. Everything that
//! needs a unit length (train speed, hit radius, placement spacing) goes
//! through this type.

use anyhow::{bail, Result};

use super::types::{GridPos, Position};

/// Linear mapping between grid coordinates and world coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateGrid {
    cell_size: f64,
    width: i32,
    height: i32,
    origin: Position,
}

impl CoordinateGrid {
    /// Create a grid with an explicit cell size and extent, anchored at the world origin
    pub fn new(cell_size: f64, width: i32, height: i32) -> Result<Self> {
        Self::with_origin(cell_size, width, height, Position::default())
    }

    pub fn with_origin(cell_size: f64, width: i32, height: i32, origin: Position) -> Result<Self> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            bail!("grid cell size must be positive, got {}", cell_size);
        }
        if width <= 0 || height <= 0 {
            bail!("grid must have a positive extent, got {}x{}", width, height);
        }
        Ok(Self {
            cell_size,
            width,
            height,
            origin,
        })
    }

    /// Fit a grid inside a viewport
    ///
    /// A higher `density` gives smaller cells. `edge_buffer` cells are left
    /// empty on every side and the grid is centred in what remains.
    pub fn for_viewport(
        viewport_width: f64,
        viewport_height: f64,
        density: u32,
        edge_buffer: u32,
    ) -> Result<Self> {
        if density == 0 {
            bail!("grid density must be at least 1");
        }
        let cell_size = ((viewport_width * viewport_height).sqrt().round() / f64::from(density)).floor();
        if cell_size <= 0.0 {
            bail!(
                "viewport {}x{} is too small for grid density {}",
                viewport_width,
                viewport_height,
                density
            );
        }
        let buffer = f64::from(edge_buffer) * 2.0;
        let width = (viewport_width / cell_size - buffer).round() as i32;
        let height = (viewport_height / cell_size - buffer).round() as i32;
        let origin = Position::new(
            (viewport_width - f64::from(width) * cell_size) / 2.0,
            (viewport_height - f64::from(height) * cell_size) / 2.0,
        );
        Self::with_origin(cell_size, width, height, origin)
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Number of cells horizontally; valid x coordinates are `0..=width`
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Number of cells vertically; valid y coordinates are `0..=height`
    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn center(&self) -> GridPos {
        GridPos::new(self.width / 2, self.height / 2)
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        (0..=self.width).contains(&pos.x) && (0..=self.height).contains(&pos.y)
    }

    pub fn to_world(&self, pos: GridPos) -> Position {
        Position::new(
            self.origin.x + self.cell_size * f64::from(pos.x),
            self.origin.y + self.cell_size * f64::from(pos.y),
        )
    }

    /// Nearest grid cell to a world position
    pub fn to_grid(&self, pos: Position) -> GridPos {
        GridPos::new(
            ((pos.x - self.origin.x) / self.cell_size).round() as i32,
            ((pos.y - self.origin.y) / self.cell_size).round() as i32,
        )
    }
}
