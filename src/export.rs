//! PNG and JSON export
//!
//! `ImageRenderer` paints each glyph as a solid block in the terrain colour,
//! giving a one-block-per-cell picture of the map.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::{ImageBuffer, Rgb, RgbImage};
use serde::Serialize;
use tracing::info;

use crate::error::ExportError;
use crate::grid::{CellSize, GridPos};
use crate::groups::{GroupId, GroupKind};
use crate::map::Map;
use crate::render::{GlyphMetrics, GlyphRenderer, MapTexture, Rect};

pub struct ImageRenderer {
    cell_size: CellSize,
    frame: RgbImage,
}

impl ImageRenderer {
    pub fn new(cell_size: CellSize, viewport: CellSize) -> Self {
        Self {
            cell_size,
            frame: ImageBuffer::new(viewport.w.max(0) as u32, viewport.h.max(0) as u32),
        }
    }

    pub fn frame(&self) -> &RgbImage {
        &self.frame
    }

    pub fn into_frame(self) -> RgbImage {
        self.frame
    }
}

impl GlyphMetrics for ImageRenderer {
    fn measure_glyph(&self, _symbol: &str, _font: &str) -> CellSize {
        self.cell_size
    }
}

impl GlyphRenderer for ImageRenderer {
    type Surface = RgbImage;

    fn create_surface(&mut self, width: i32, height: i32) -> RgbImage {
        ImageBuffer::new(width.max(0) as u32, height.max(0) as u32)
    }

    fn paint_glyph(&mut self, surface: &mut RgbImage, _symbol: &str, x: i32, y: i32, color: [u8; 3], _font: &str) {
        let w = self.cell_size.w;
        let h = self.cell_size.h;
        // Snap to the cell the glyph sits in so blocks tile without gaps.
        let x0 = (x + w / 2).div_euclid(w) * w;
        let y0 = (y + h / 2).div_euclid(h) * h;
        fill_rect(surface, Rect::new(x0, y0, w, h), Rgb(color));
    }

    fn draw_surface(&mut self, surface: &RgbImage, src: Rect, dst: Rect) {
        let w = src.w.min(dst.w);
        let h = src.h.min(dst.h);
        for dy in 0..h {
            for dx in 0..w {
                let (sx, sy) = (src.x + dx, src.y + dy);
                let (fx, fy) = (dst.x + dx, dst.y + dy);
                if !in_image(surface, sx, sy) || !in_image(&self.frame, fx, fy) {
                    continue;
                }
                let pixel = *surface.get_pixel(sx as u32, sy as u32);
                self.frame.put_pixel(fx as u32, fy as u32, pixel);
            }
        }
    }
}

fn in_image(img: &RgbImage, x: i32, y: i32) -> bool {
    x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height()
}

fn fill_rect(img: &mut RgbImage, rect: Rect, color: Rgb<u8>) {
    let x_start = rect.x.max(0);
    let y_start = rect.y.max(0);
    let x_end = (rect.x + rect.w).min(img.width() as i32);
    let y_end = (rect.y + rect.h).min(img.height() as i32);
    for y in y_start..y_end {
        for x in x_start..x_end {
            img.put_pixel(x as u32, y as u32, color);
        }
    }
}

/// Paint the whole map at full pixel size.
pub fn render_map_image(map: &Map) -> RgbImage {
    let mut renderer = ImageRenderer::new(map.cell_size(), CellSize::default());
    let texture = MapTexture::paint(map, &mut renderer, "mono");
    texture.surface().clone()
}

pub fn export_map_png(map: &Map, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let path = path.as_ref();
    let img = render_map_image(map);
    img.save(path)?;
    info!(path = %path.display(), width = img.width(), height = img.height(), "exported map image");
    Ok(())
}

/// Serializable view of one group.
#[derive(Clone, Debug, Serialize)]
pub struct GroupSummary {
    pub id: GroupId,
    pub kind: GroupKind,
    pub name: String,
    pub size: usize,
    /// Top-left and bottom-right member cells of the bounding box.
    pub bounds: Option<(GridPos, GridPos)>,
}

pub fn group_summaries(map: &Map) -> Vec<GroupSummary> {
    map.groups
        .iter()
        .map(|group| GroupSummary {
            id: group.id,
            kind: group.kind,
            name: group.name.clone(),
            size: group.len(),
            bounds: group
                .bounds()
                .map(|(r0, c0, r1, c1)| (GridPos::new(r0, c0), GridPos::new(r1, c1))),
        })
        .collect()
}

pub fn export_groups_json(map: &Map, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let path = path.as_ref();
    let summaries = group_summaries(map);
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, &summaries)?;
    info!(path = %path.display(), groups = summaries.len(), "exported group summary");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::WorldPos;
    use crate::map::MapGen;
    use crate::terrain::Terrain;

    const SIZE: CellSize = CellSize::new(8, 14);

    #[test]
    fn test_map_image_uses_terrain_colors() {
        let map = MapGen::new(42, 10, 10, SIZE).generate_map();
        let img = render_map_image(&map);
        assert_eq!(img.dimensions(), (80, 140));

        for (row, col, terrain) in map.terrain.iter() {
            let expected = Rgb(terrain.info().color);
            let (x, y) = (col as u32 * 8, row as u32 * 14);
            assert_eq!(*img.get_pixel(x, y), expected);
            assert_eq!(*img.get_pixel(x + 7, y + 13), expected);
        }
    }

    #[test]
    fn test_draw_surface_clips() {
        let mut r = ImageRenderer::new(SIZE, CellSize::new(16, 14));
        let mut surface = r.create_surface(16, 14);
        r.paint_glyph(&mut surface, "▲", 0, 0, Terrain::Mountain.info().color, "mono");

        r.draw_surface(&surface, Rect::new(0, 0, 16, 14), Rect::at(WorldPos::new(8, 0), CellSize::new(16, 14)));
        assert_eq!(*r.frame().get_pixel(0, 0), Rgb([0, 0, 0]));
        assert_eq!(*r.frame().get_pixel(8, 0), Rgb([128, 128, 128]));
        assert_eq!(*r.frame().get_pixel(15, 13), Rgb([128, 128, 128]));
    }

    #[test]
    fn test_group_summaries_cover_map() {
        let map = MapGen::new(8, 24, 24, SIZE).generate_map();
        let summaries = group_summaries(&map);
        assert_eq!(summaries.len(), map.groups.len());
        assert_eq!(summaries.iter().map(|s| s.size).sum::<usize>(), 24 * 24);
        assert_eq!(summaries.iter().filter(|s| s.kind == GroupKind::Ocean).count(), 1);
    }

    #[test]
    fn test_export_groups_json_writes_file() {
        let map = MapGen::new(8, 12, 12, SIZE).generate_map();
        let path = std::env::temp_dir().join(format!("island_worldgen_groups_{}.json", std::process::id()));
        export_groups_json(&map, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value.as_array().map(|a| a.len()), Some(map.groups.len()));
        assert_eq!(value[0]["id"], 0);
        std::fs::remove_file(&path).ok();
    }
}
