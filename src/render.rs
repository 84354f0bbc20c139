//! Rendering capability and texture caches
//!
//! Generation never draws anything itself. Backends implement
//! [`GlyphRenderer`]; the map is painted once into a [`MapTexture`] and each
//! chunk once into [`ChunkTextures`], after which frames are pure blits.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::chunk::MapChunk;
use crate::grid::{CellSize, WorldPos};
use crate::map::Map;
use crate::terrain::Terrain;
use crate::tilemap::Tilemap;
use crate::world::World;

/// Pixel rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn at(pos: WorldPos, size: CellSize) -> Self {
        Self::new(pos.x, pos.y, size.w, size.h)
    }
}

/// Text measurement. The map's cell size is the extent of one glyph.
pub trait GlyphMetrics {
    fn measure_glyph(&self, symbol: &str, font: &str) -> CellSize;
}

/// Fixed-pitch measurer: every glyph in every font has the same extent.
#[derive(Clone, Copy, Debug)]
pub struct MonoMetrics {
    size: CellSize,
}

impl MonoMetrics {
    pub fn new(size: CellSize) -> Self {
        Self { size }
    }
}

impl GlyphMetrics for MonoMetrics {
    fn measure_glyph(&self, _symbol: &str, _font: &str) -> CellSize {
        self.size
    }
}

/// A drawing backend: offscreen surfaces, glyph painting and blitting to the frame.
pub trait GlyphRenderer: GlyphMetrics {
    type Surface;

    fn create_surface(&mut self, width: i32, height: i32) -> Self::Surface;

    /// Paint `symbol` with its top-left at `(x, y)` on `surface`.
    fn paint_glyph(&mut self, surface: &mut Self::Surface, symbol: &str, x: i32, y: i32, color: [u8; 3], font: &str);

    /// Copy the `src` part of `surface` to `dst` in the frame.
    fn draw_surface(&mut self, surface: &Self::Surface, src: Rect, dst: Rect);
}

/// Paint one terrain glyph for the cell whose corner is `origin`.
pub fn paint_cell<R: GlyphRenderer>(
    renderer: &mut R,
    surface: &mut R::Surface,
    terrain: Terrain,
    origin: WorldPos,
    font: &str,
) {
    let info = terrain.info();
    renderer.paint_glyph(
        surface,
        info.symbol,
        origin.x + info.x_mod,
        origin.y + info.y_mod,
        info.color,
        font,
    );
}

fn paint_terrain<R: GlyphRenderer>(
    renderer: &mut R,
    surface: &mut R::Surface,
    terrain: &Tilemap<Terrain>,
    cell_size: CellSize,
    font: &str,
) {
    for (row, col, t) in terrain.iter() {
        let origin = WorldPos::new(col as i32 * cell_size.w, row as i32 * cell_size.h);
        paint_cell(renderer, surface, *t, origin, font);
    }
}

/// The whole map painted once onto a single surface.
pub struct MapTexture<S> {
    surface: S,
    size: CellSize,
}

impl<S> MapTexture<S> {
    pub fn paint<R>(map: &Map, renderer: &mut R, font: &str) -> Self
    where
        R: GlyphRenderer<Surface = S>,
    {
        let size = map.size();
        let mut surface = renderer.create_surface(size.w, size.h);
        paint_terrain(renderer, &mut surface, &map.terrain, map.cell_size(), font);
        Self { surface, size }
    }

    pub fn draw<R>(&self, renderer: &mut R, src: Rect, dst: Rect)
    where
        R: GlyphRenderer<Surface = S>,
    {
        renderer.draw_surface(&self.surface, src, dst);
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn size(&self) -> CellSize {
        self.size
    }
}

/// One surface per chunk position. Surfaces are painted on first draw and kept.
pub struct ChunkTextures<S> {
    font: String,
    textures: HashMap<WorldPos, S>,
    painted: usize,
}

impl<S> ChunkTextures<S> {
    pub fn new(font: impl Into<String>) -> Self {
        Self {
            font: font.into(),
            textures: HashMap::new(),
            painted: 0,
        }
    }

    /// Blit every in-view chunk at its position relative to the viewport.
    /// Returns the number of chunks drawn.
    pub fn draw_in_view<R>(&mut self, world: &World, renderer: &mut R) -> usize
    where
        R: GlyphRenderer<Surface = S>,
    {
        let top_left = world.top_left();
        for chunk in world.chunks_in_view() {
            let size = chunk.size();
            let surface = match self.textures.entry(chunk.world_pos()) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    self.painted += 1;
                    entry.insert(paint_chunk(renderer, chunk, &self.font))
                }
            };
            let src = Rect::new(0, 0, size.w, size.h);
            let dst = Rect::at(chunk.world_pos() - top_left, size);
            renderer.draw_surface(surface, src, dst);
        }
        world.chunks_in_view().len()
    }

    pub fn get(&self, chunk_pos: WorldPos) -> Option<&S> {
        self.textures.get(&chunk_pos)
    }

    /// Number of chunk surfaces painted so far.
    pub fn painted_count(&self) -> usize {
        self.painted
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

fn paint_chunk<R: GlyphRenderer>(renderer: &mut R, chunk: &MapChunk, font: &str) -> R::Surface {
    let size = chunk.size();
    let mut surface = renderer.create_surface(size.w, size.h);
    for cell in chunk.grid().cells() {
        if let Some(terrain) = chunk.terrain_at(cell.grid_pos()) {
            paint_cell(renderer, &mut surface, terrain, cell.world_pos(), font);
        }
    }
    surface
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridPos;
    use crate::map::MapGen;

    const SIZE: CellSize = CellSize::new(8, 14);

    /// Records every call instead of drawing.
    #[derive(Default)]
    struct Recorder {
        surfaces: usize,
        draws: Vec<(Rect, Rect)>,
    }

    impl GlyphMetrics for Recorder {
        fn measure_glyph(&self, _symbol: &str, _font: &str) -> CellSize {
            SIZE
        }
    }

    impl GlyphRenderer for Recorder {
        type Surface = Vec<(String, i32, i32)>;

        fn create_surface(&mut self, _width: i32, _height: i32) -> Self::Surface {
            self.surfaces += 1;
            Vec::new()
        }

        fn paint_glyph(&mut self, surface: &mut Self::Surface, symbol: &str, x: i32, y: i32, _color: [u8; 3], _font: &str) {
            surface.push((symbol.to_string(), x, y));
        }

        fn draw_surface(&mut self, _surface: &Self::Surface, src: Rect, dst: Rect) {
            self.draws.push((src, dst));
        }
    }

    #[test]
    fn test_paint_cell_applies_nudge() {
        let mut r = Recorder::default();
        let mut surface = r.create_surface(8, 14);
        paint_cell(&mut r, &mut surface, Terrain::Water, WorldPos::new(16, 28), "mono");
        paint_cell(&mut r, &mut surface, Terrain::Grass, WorldPos::new(0, 14), "mono");
        assert_eq!(surface[0], ("~".to_string(), 17, 32));
        assert_eq!(surface[1], (",".to_string(), 0, 11));
    }

    #[test]
    fn test_map_texture_paints_every_cell() {
        let map = MapGen::new(3, 6, 9, SIZE).generate_map();
        let mut r = Recorder::default();
        let texture = MapTexture::paint(&map, &mut r, "mono");

        assert_eq!(r.surfaces, 1);
        assert_eq!(texture.surface().len(), 54);
        assert_eq!(texture.size(), CellSize::new(72, 84));

        let full = Rect::new(0, 0, 72, 84);
        texture.draw(&mut r, full, full);
        assert_eq!(r.draws, vec![(full, full)]);
    }

    #[test]
    fn test_chunk_textures_paint_once() {
        let map = MapGen::new(11, 12, 12, SIZE).generate_map();
        let mut world = World::new(map, 2, 2, 1, CellSize::new(160, 112));
        let center = world.map().get_cell_from_grid(GridPos::new(6, 6)).unwrap();
        world.generate_world(&center, true);

        let mut r = Recorder::default();
        let mut textures = ChunkTextures::new("mono");
        assert_eq!(textures.draw_in_view(&world, &mut r), 9);
        assert_eq!(textures.draw_in_view(&world, &mut r), 9);
        assert_eq!(textures.painted_count(), 9);
        assert_eq!(r.surfaces, 9);
        assert_eq!(r.draws.len(), 18);

        // Each chunk surface holds one glyph per chunk cell.
        let pos = world.center_chunk().unwrap().world_pos();
        assert_eq!(textures.get(pos).unwrap().len(), 4);
    }

    #[test]
    fn test_chunks_drawn_relative_to_viewport() {
        let map = MapGen::new(11, 12, 12, SIZE).generate_map();
        let mut world = World::new(map, 2, 2, 0, CellSize::new(160, 112));
        let center = world.map().get_cell_from_grid(GridPos::new(6, 6)).unwrap();
        world.generate_world(&center, true);

        let mut r = Recorder::default();
        ChunkTextures::new("mono").draw_in_view(&world, &mut r);

        // chunk 16x28 at (96, 168); top_left = (96 - 80 + 8, 168 - 56 + 14)
        let (src, dst) = r.draws[0];
        assert_eq!(src, Rect::new(0, 0, 16, 28));
        assert_eq!(dst, Rect::new(72, 42, 16, 28));
    }
}
