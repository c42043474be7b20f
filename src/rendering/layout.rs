//! Composite layout: one optional anchor at native size, then a row of
//! equally sized square tiles.

use crate::{Error, RasterImage, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementKind {
    Anchor,
    /// Index into the selection, in input order
    Tile(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub kind: PlacementKind,
    pub rect: Rect,
}

/// Canvas extents plus where everything goes, left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeLayout {
    pub width: u32,
    pub height: u32,
    pub tile_size: u32,
    pub placements: Vec<Placement>,
}

/// The shared square tile edge: the largest width or height among the
/// selection, or 0 for an empty selection.
pub fn standard_tile_size(selection: &[RasterImage]) -> u32 {
    selection
        .iter()
        .map(|img| img.width().max(img.height()))
        .max()
        .unwrap_or(0)
}

/// Compute canvas extents and placements.
/// - Anchor (if any) at x=0, vertically centred, native size
/// - Tiles at y=0, starting right after the anchor, `tile_size` apart
pub fn compute_layout(tile_size: u32, tile_count: usize, anchor: Option<(u32, u32)>) -> Result<CompositeLayout> {
    let too_large = || Error::GeometryError("composite dimensions overflow".into());

    let (anchor_w, anchor_h) = anchor.unwrap_or((0, 0));
    let count = u32::try_from(tile_count).map_err(|_| too_large())?;
    let tiles_w = tile_size.checked_mul(count).ok_or_else(too_large)?;
    let width = anchor_w.checked_add(tiles_w).ok_or_else(too_large)?;
    let height = if tile_count == 0 { anchor_h } else { anchor_h.max(tile_size) };
    if width == 0 || height == 0 {
        return Err(Error::GeometryError(format!(
            "composite would be {}x{}",
            width, height
        )));
    }

    let mut placements = Vec::with_capacity(tile_count + 1);
    if anchor.is_some() {
        placements.push(Placement {
            kind: PlacementKind::Anchor,
            rect: Rect {
                x: 0,
                y: ((height - anchor_h) / 2) as i32,
                width: anchor_w,
                height: anchor_h,
            },
        });
    }
    let mut x = anchor_w;
    for i in 0..tile_count {
        placements.push(Placement {
            kind: PlacementKind::Tile(i),
            rect: Rect {
                x: x as i32,
                y: 0,
                width: tile_size,
                height: tile_size,
            },
        });
        x += tile_size;
    }

    Ok(CompositeLayout {
        width,
        height,
        tile_size,
        placements,
    })
}
