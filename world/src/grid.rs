//! Tile grid storage, pixel/tile conversion, and windowed spatial queries.

use thiserror::Error;
use tilefall_core::{HasBoundingBox, PixelPoint, PixelRect, TileCoord, TileWindow};

/// Sample value that marks a solid tile in a world bitmap.
///
/// World bitmaps follow the original asset convention: a red channel of zero
/// denotes "place a solid tile here", every other value denotes empty.
pub const SOLID_SAMPLE: u8 = 0;

/// Errors surfaced while constructing a grid from a world bitmap.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    /// The sample buffer disagrees with the declared bitmap dimensions.
    #[error("bitmap holds {actual} samples, expected {expected}")]
    SampleCountMismatch {
        /// Number of samples implied by the declared dimensions.
        expected: usize,
        /// Number of samples actually provided.
        actual: usize,
    },
    /// The declared dimensions describe a world with no cells.
    #[error("bitmap dimensions {columns}x{rows} describe an empty world")]
    EmptyBitmap {
        /// Declared number of columns.
        columns: u32,
        /// Declared number of rows.
        rows: u32,
    },
    /// The bitmap dimensions disagree with the configured grid dimensions.
    #[error("bitmap is {columns}x{rows}, configuration expects {expected_columns}x{expected_rows}")]
    DimensionMismatch {
        /// Number of columns sampled from the bitmap.
        columns: u32,
        /// Number of rows sampled from the bitmap.
        rows: u32,
        /// Column count required by the configuration.
        expected_columns: u32,
        /// Row count required by the configuration.
        expected_rows: u32,
    },
    /// A tile size of zero pixels cannot anchor any tile.
    #[error("tile size must be a positive number of pixels")]
    ZeroTileSize,
}

/// Sampled world bitmap holding one value per grid coordinate.
///
/// Image decoding happens outside the core; this type consumes only the
/// already-sampled grid of values.
#[derive(Clone, Debug)]
pub struct BitmapSource {
    columns: u32,
    rows: u32,
    samples: Vec<u8>,
}

impl BitmapSource {
    /// Validates and wraps a row-major sample buffer.
    pub fn new(columns: u32, rows: u32, samples: Vec<u8>) -> Result<Self, LoadError> {
        if columns == 0 || rows == 0 {
            return Err(LoadError::EmptyBitmap { columns, rows });
        }
        let expected = columns as usize * rows as usize;
        if samples.len() != expected {
            return Err(LoadError::SampleCountMismatch {
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            columns,
            rows,
            samples,
        })
    }

    /// Number of sampled columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of sampled rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Sample value stored at the given grid coordinate.
    #[must_use]
    pub fn sample(&self, x: u32, y: u32) -> u8 {
        self.samples[y as usize * self.columns as usize + x as usize]
    }
}

/// Opaque appearance handle attached to a placed tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VisualHandle(u32);

impl VisualHandle {
    /// Appearance assigned to tiles sampled from the world bitmap.
    pub const ROCK: Self = Self(0);

    /// Creates a handle with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Solid unit occupying one grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    rect: PixelRect,
    visual: VisualHandle,
}

impl Tile {
    /// Appearance handle composited into the cached world layer.
    #[must_use]
    pub const fn visual(&self) -> VisualHandle {
        self.visual
    }
}

impl HasBoundingBox for Tile {
    fn bounding_box(&self) -> PixelRect {
        self.rect
    }
}

/// Cached world-visual layer mirroring the grid cell by cell.
///
/// Renderers crop this layer instead of walking every tile each frame. The
/// grid keeps it consistent: any snapshot taken after a `place` or `remove`
/// reflects the change at exactly that cell, and the revision counter lets
/// consumers detect staleness cheaply.
#[derive(Clone, Debug)]
pub struct TileLayer {
    columns: u32,
    cells: Vec<Option<VisualHandle>>,
    revision: u64,
}

impl TileLayer {
    fn new(columns: u32, rows: u32) -> Self {
        Self {
            columns,
            cells: vec![None; columns as usize * rows as usize],
            revision: 0,
        }
    }

    fn paint(&mut self, coord: TileCoord, visual: VisualHandle) {
        let index = coord.y() as usize * self.columns as usize + coord.x() as usize;
        self.cells[index] = Some(visual);
        self.revision += 1;
    }

    fn clear(&mut self, coord: TileCoord) {
        let index = coord.y() as usize * self.columns as usize + coord.x() as usize;
        self.cells[index] = None;
        self.revision += 1;
    }

    /// Appearance cached for the provided cell, if any.
    #[must_use]
    pub fn cell(&self, coord: TileCoord) -> Option<VisualHandle> {
        self.cells
            .get(coord.y() as usize * self.columns as usize + coord.x() as usize)
            .copied()
            .flatten()
    }

    /// Monotonic counter bumped by every placement or removal.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }
}

/// Dense grid of optional tile occupants indexed by integer coordinates.
///
/// The grid owns every [`Tile`] it stores; accessors hand out references, not
/// the underlying storage. Dimensions and tile size are fixed at
/// construction.
#[derive(Clone, Debug)]
pub struct TileGrid {
    columns: u32,
    rows: u32,
    tile_size: u32,
    cells: Vec<Option<Tile>>,
    layer: TileLayer,
}

impl TileGrid {
    /// Creates a grid with every cell empty.
    pub(crate) fn empty(columns: u32, rows: u32, tile_size: u32) -> Self {
        Self {
            columns,
            rows,
            tile_size,
            cells: vec![None; columns as usize * rows as usize],
            layer: TileLayer::new(columns, rows),
        }
    }

    /// Builds a grid from a sampled world bitmap, one cell per sample.
    ///
    /// Every coordinate whose sample equals [`SOLID_SAMPLE`] receives a
    /// default rock tile.
    pub fn build(source: &BitmapSource, tile_size: u32) -> Result<Self, LoadError> {
        if tile_size == 0 {
            return Err(LoadError::ZeroTileSize);
        }

        let mut grid = Self::empty(source.columns(), source.rows(), tile_size);
        for x in 0..source.columns() {
            for y in 0..source.rows() {
                if source.sample(x, y) == SOLID_SAMPLE {
                    grid.place(TileCoord::new(x, y), VisualHandle::ROCK);
                }
            }
        }
        Ok(grid)
    }

    /// Number of tile columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Pixel edge length of one square tile.
    #[must_use]
    pub const fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Read-only access to the cached world-visual layer.
    #[must_use]
    pub const fn layer(&self) -> &TileLayer {
        &self.layer
    }

    fn index(&self, coord: TileCoord) -> usize {
        // Out-of-range indices are windowing bugs in the caller; fail loudly
        // instead of wrapping.
        assert!(
            coord.x() < self.columns && coord.y() < self.rows,
            "tile coordinate ({}, {}) outside {}x{} grid",
            coord.x(),
            coord.y(),
            self.columns,
            self.rows,
        );
        coord.y() as usize * self.columns as usize + coord.x() as usize
    }

    /// Tile occupying the provided cell, if any.
    ///
    /// # Panics
    ///
    /// Panics when the coordinate lies outside the grid; callers clamp their
    /// windows to the grid extents before querying.
    #[must_use]
    pub fn tile_at(&self, coord: TileCoord) -> Option<&Tile> {
        self.cells[self.index(coord)].as_ref()
    }

    /// Tile covering the provided world-pixel location, if any.
    ///
    /// Pixels above or left of the world origin map to no cell and yield
    /// `None`; pixels beyond the far edges panic like [`Self::tile_at`].
    #[must_use]
    pub fn tile_at_pixel(&self, point: PixelPoint) -> Option<&Tile> {
        let coord = TileCoord::from_pixel(point, self.tile_size)?;
        self.tile_at(coord)
    }

    /// Places a tile at the provided cell, overwriting any occupant.
    ///
    /// Overwrites are intentional last-write-wins semantics so editing tools
    /// never observe a placement failure. The tile's bounding box is derived
    /// from the cell coordinate and the cached layer is updated at exactly
    /// that cell.
    pub fn place(&mut self, coord: TileCoord, visual: VisualHandle) {
        let index = self.index(coord);
        self.cells[index] = Some(Tile {
            rect: coord.bounding_box(self.tile_size),
            visual,
        });
        self.layer.paint(coord, visual);
    }

    /// Clears the provided cell, returning the removed tile if one existed.
    ///
    /// The corresponding region of the cached layer is cleared to fully
    /// transparent.
    pub fn remove(&mut self, coord: TileCoord) -> Option<Tile> {
        let index = self.index(coord);
        let removed = self.cells[index].take();
        if removed.is_some() {
            self.layer.clear(coord);
        }
        removed
    }

    /// Enumerates every occupied cell in the window, far edges **inclusive**.
    ///
    /// A window of extent zero still covers the single cell at its origin.
    /// Iteration runs column-outer, row-inner, which fixes the order
    /// first-match collision resolution observes.
    ///
    /// # Panics
    ///
    /// Panics when the window, including its inclusive far edges, extends
    /// beyond the grid.
    #[must_use]
    pub fn tiles_in_window(&self, window: TileWindow) -> Vec<&Tile> {
        let mut results = Vec::new();
        for x in window.left()..=window.left() + window.width() {
            for y in window.top()..=window.top() + window.height() {
                if let Some(tile) = self.tile_at(TileCoord::new(x, y)) {
                    results.push(tile);
                }
            }
        }
        results
    }

    /// Enumerates occupied cells in a pixel-space window.
    ///
    /// Each component of the rect is floor-divided by the tile size before
    /// delegating to [`Self::tiles_in_window`]; the resulting window is
    /// clamped to the grid extents.
    #[must_use]
    pub fn tiles_in_window_pixel(&self, rect: PixelRect) -> Vec<&Tile> {
        match TileWindow::from_pixel_rect(rect, self.tile_size)
            .clamped_to(self.columns, self.rows)
        {
            Some(window) => self.tiles_in_window(window),
            None => Vec::new(),
        }
    }

    /// Enumerates surface tiles in the **half-open** window.
    ///
    /// A surface tile has at least one of its four axis-neighbors empty.
    /// Neighbor indices outside the grid are clamped to the nearest valid
    /// index, so an edge tile compares against itself for the missing
    /// direction and may be classified as non-surface when its clamped
    /// neighbor is occupied.
    ///
    /// # Panics
    ///
    /// Panics when the window extends beyond the grid.
    #[must_use]
    pub fn surface_tiles(&self, window: TileWindow) -> Vec<&Tile> {
        assert!(
            window.left() + window.width() <= self.columns
                && window.top() + window.height() <= self.rows,
            "surface window ({:?}) outside {}x{} grid",
            window,
            self.columns,
            self.rows,
        );

        let mut results = Vec::new();
        for x in window.left()..window.left() + window.width() {
            for y in window.top()..window.top() + window.height() {
                let Some(tile) = self.tile_at(TileCoord::new(x, y)) else {
                    continue;
                };

                let neighbors = [
                    TileCoord::new(x, y.saturating_sub(1)),
                    TileCoord::new(x, (y + 1).min(self.rows - 1)),
                    TileCoord::new(x.saturating_sub(1), y),
                    TileCoord::new((x + 1).min(self.columns - 1), y),
                ];
                if neighbors
                    .iter()
                    .any(|neighbor| self.tile_at(*neighbor).is_none())
                {
                    results.push(tile);
                }
            }
        }
        results
    }
}
