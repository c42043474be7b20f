//! Rendering pipeline: tile sizing, layout, painting and PNG encoding.
//!
//! `tile` scales one image into a letterboxed square, `layout` decides where
//! every tile and the anchor go, `paint` executes draw commands on a surface
//! and `raster` turns the finished surface into PNG bytes.

pub mod layout;
pub mod paint;
pub mod raster;
pub mod tile;

pub use layout::{compute_layout, standard_tile_size, CompositeLayout, Placement, PlacementKind, Rect};
pub use paint::{PaintCommand, Surface};
pub use raster::{encode_png, CompositeResult};
pub use tile::{fit_content, resize, ContentFit, Tile};
