//! ASCII rendering for terminal previews
//!
//! Surfaces are character grids with one slot per map cell. Glyph pixel
//! positions snap to the nearest cell, so the small per-terrain nudges do not
//! move a glyph out of its cell.

use crate::grid::CellSize;
use crate::map::Map;
use crate::render::{ChunkTextures, GlyphMetrics, GlyphRenderer, MapTexture, Rect};
use crate::tilemap::Tilemap;
use crate::world::World;

const BLANK: char = ' ';

pub struct AsciiRenderer {
    cell_size: CellSize,
    frame: Tilemap<char>,
}

impl AsciiRenderer {
    /// Renderer with a frame covering `viewport` pixels.
    pub fn new(cell_size: CellSize, viewport: CellSize) -> Self {
        let (rows, cols) = cells_covering(cell_size, viewport.w, viewport.h);
        Self {
            cell_size,
            frame: Tilemap::new_with(rows, cols, BLANK),
        }
    }

    pub fn clear_frame(&mut self) {
        self.frame.fill(BLANK);
    }

    pub fn frame(&self) -> &Tilemap<char> {
        &self.frame
    }

    pub fn frame_string(&self) -> String {
        surface_to_string(&self.frame)
    }

    /// Cell coordinate nearest to a pixel coordinate.
    fn snap(&self, x: i32, y: i32) -> (i32, i32) {
        let w = self.cell_size.w;
        let h = self.cell_size.h;
        ((y + h / 2).div_euclid(h), (x + w / 2).div_euclid(w))
    }
}

impl GlyphMetrics for AsciiRenderer {
    fn measure_glyph(&self, _symbol: &str, _font: &str) -> CellSize {
        self.cell_size
    }
}

impl GlyphRenderer for AsciiRenderer {
    type Surface = Tilemap<char>;

    fn create_surface(&mut self, width: i32, height: i32) -> Self::Surface {
        let (rows, cols) = cells_covering(self.cell_size, width, height);
        Tilemap::new_with(rows, cols, BLANK)
    }

    fn paint_glyph(&mut self, surface: &mut Self::Surface, symbol: &str, x: i32, y: i32, _color: [u8; 3], _font: &str) {
        let Some(ch) = symbol.chars().next() else {
            return;
        };
        let (row, col) = self.snap(x, y);
        put(surface, row, col, ch);
    }

    fn draw_surface(&mut self, surface: &Self::Surface, src: Rect, dst: Rect) {
        let (src_row, src_col) = self.snap(src.x, src.y);
        let (dst_row, dst_col) = self.snap(dst.x, dst.y);
        let (rows, cols) = cells_covering(self.cell_size, src.w, src.h);

        for dr in 0..rows as i32 {
            for dc in 0..cols as i32 {
                let (r, c) = (src_row + dr, src_col + dc);
                if r < 0 || c < 0 || r as usize >= surface.rows || c as usize >= surface.cols {
                    continue;
                }
                let ch = *surface.get(r as usize, c as usize);
                put(&mut self.frame, dst_row + dr, dst_col + dc, ch);
            }
        }
    }
}

fn cells_covering(cell_size: CellSize, width: i32, height: i32) -> (usize, usize) {
    let rows = (height.max(0) + cell_size.h - 1) / cell_size.h;
    let cols = (width.max(0) + cell_size.w - 1) / cell_size.w;
    (rows as usize, cols as usize)
}

fn put(surface: &mut Tilemap<char>, row: i32, col: i32, ch: char) {
    if row >= 0 && col >= 0 && (row as usize) < surface.rows && (col as usize) < surface.cols {
        surface.set(row as usize, col as usize, ch);
    }
}

/// One line per row.
pub fn surface_to_string(surface: &Tilemap<char>) -> String {
    let mut result = String::with_capacity((surface.cols + 1) * surface.rows);
    for row in 0..surface.rows {
        for col in 0..surface.cols {
            result.push(*surface.get(row, col));
        }
        result.push('\n');
    }
    result
}

/// Render the whole map, one glyph per cell.
pub fn render_map_ascii(map: &Map) -> String {
    let mut renderer = AsciiRenderer::new(map.cell_size(), map.size());
    let texture = MapTexture::paint(map, &mut renderer, "mono");
    surface_to_string(texture.surface())
}

/// Render what the viewport currently shows of the chunked world.
pub fn render_view_ascii(world: &World, font: &str) -> String {
    let mut renderer = AsciiRenderer::new(world.map().cell_size(), world.viewport());
    ChunkTextures::new(font).draw_in_view(world, &mut renderer);
    renderer.frame_string()
}
