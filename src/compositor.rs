//! The compositor: owns the drawing surface and the single "current result"
//! slot, and serialises composite requests with a busy/idle state.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};

use crate::loader::{load_all, ImageLoader};
use crate::rendering::{self, CompositeResult, PaintCommand, PlacementKind, Surface};
use crate::{CompositorConfig, Error, ImageSource, RasterImage, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositorState {
    Idle,
    Compositing,
}

struct Output {
    result: Option<CompositeResult>,
    surface: Surface,
}

/// Composites badge selections and keeps the most recent successful result.
///
/// All methods take `&self`, so one compositor can be shared between tasks
/// (e.g. behind an `Arc`). A request that arrives while another is in flight
/// is rejected with `Error::Busy` rather than queued. A failed request never
/// touches the previous result or surface.
pub struct Compositor {
    config: CompositorConfig,
    state: Mutex<CompositorState>,
    output: Mutex<Output>,
    // bumped by reset(); an in-flight composite started under an older
    // generation must not publish its result
    generation: AtomicU64,
}

/// Returns the compositor to `Idle` when dropped, including when the owning
/// future is cancelled mid-load.
struct BusyGuard<'a> {
    state: &'a Mutex<CompositorState>,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        *lock(self.state) = CompositorState::Idle;
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Compositor {
    pub fn new(config: CompositorConfig) -> Self {
        Self {
            config,
            state: Mutex::new(CompositorState::Idle),
            output: Mutex::new(Output {
                result: None,
                surface: Surface::empty(),
            }),
            generation: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    pub fn state(&self) -> CompositorState {
        *lock(&self.state)
    }

    fn begin(&self) -> Result<BusyGuard<'_>> {
        let mut state = lock(&self.state);
        if *state == CompositorState::Compositing {
            warn!("Rejected composite request: another composite is in progress");
            return Err(Error::Busy);
        }
        *state = CompositorState::Compositing;
        Ok(BusyGuard { state: &self.state })
    }

    /// Composite already-decoded images.
    ///
    /// On success the returned result also becomes the current result.
    pub fn composite(&self, selected: &[RasterImage], anchor: Option<&RasterImage>) -> Result<CompositeResult> {
        let _busy = self.begin()?;
        let generation = self.generation.load(Ordering::SeqCst);
        self.render_and_store(selected, anchor, generation)
    }

    /// Load every source (selection and anchor in a single join), then
    /// composite. Any load failure aborts before anything is drawn.
    pub async fn composite_sources<L: ImageLoader>(
        &self,
        loader: &L,
        selected: &[ImageSource],
        anchor: Option<&ImageSource>,
    ) -> Result<CompositeResult> {
        let _busy = self.begin()?;
        let generation = self.generation.load(Ordering::SeqCst);
        if selected.is_empty() && anchor.is_none() {
            return Err(nothing_selected());
        }

        let mut sources = selected.to_vec();
        sources.extend(anchor.cloned());
        let mut images = load_all(loader, &sources).await?;
        let anchor_img = match anchor {
            Some(_) => images.pop(),
            None => None,
        };

        self.render_and_store(&images, anchor_img.as_ref(), generation)
    }

    fn render_and_store(
        &self,
        selected: &[RasterImage],
        anchor: Option<&RasterImage>,
        generation: u64,
    ) -> Result<CompositeResult> {
        let (surface, result) = render(selected, anchor, &self.config)?;

        let mut out = lock(&self.output);
        if self.generation.load(Ordering::SeqCst) != generation {
            warn!("Discarding composite: selection was reset while compositing");
            return Err(Error::SelectionError(
                "selection was reset while compositing".into(),
            ));
        }
        out.result = Some(result.clone());
        out.surface = surface;
        info!(
            "Composited {} image(s){} into {}x{} PNG ({} bytes, sha256 {})",
            selected.len(),
            if anchor.is_some() { " + anchor" } else { "" },
            result.width,
            result.height,
            result.png_data.len(),
            result.digest()
        );
        Ok(result)
    }

    pub fn current_result(&self) -> Option<CompositeResult> {
        lock(&self.output).result.clone()
    }

    /// Whether a composite has succeeded since construction or the last reset.
    pub fn has_result(&self) -> bool {
        lock(&self.output).result.is_some()
    }

    pub fn surface_dimensions(&self) -> (u32, u32) {
        let out = lock(&self.output);
        (out.surface.width(), out.surface.height())
    }

    /// Save the current result as `config.output_filename` inside `dir`.
    ///
    /// Returns `Ok(None)` without touching the filesystem when there is no
    /// result yet.
    pub fn export_as_download(&self, dir: impl AsRef<Path>) -> Result<Option<PathBuf>> {
        let Some(result) = self.current_result() else {
            debug!("Export requested before any composite succeeded; ignoring");
            return Ok(None);
        };
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.config.output_filename);
        std::fs::write(&path, &result.png_data)?;
        info!("Saved composite to {}", path.display());
        Ok(Some(path))
    }

    /// Drop the current result, shrink the surface to 0x0 and invalidate any
    /// composite still in flight. Safe to call at any time.
    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let mut out = lock(&self.output);
        out.result = None;
        out.surface = Surface::empty();
        debug!("Compositor reset");
    }
}

fn nothing_selected() -> Error {
    Error::SelectionError("nothing selected".into())
}

/// Build the composite surface and its PNG without touching any state.
pub fn render(
    selected: &[RasterImage],
    anchor: Option<&RasterImage>,
    config: &CompositorConfig,
) -> Result<(Surface, CompositeResult)> {
    if selected.is_empty() && anchor.is_none() {
        return Err(nothing_selected());
    }
    if let Some(a) = anchor {
        if a.has_zero_dimension() {
            return Err(Error::GeometryError(format!(
                "anchor image is {}x{}",
                a.width(),
                a.height()
            )));
        }
    }

    let tile_size = rendering::standard_tile_size(selected);
    let tiles = selected
        .iter()
        .map(|img| rendering::resize(img, tile_size, tile_size, config.resize_filter, config.background))
        .collect::<Result<Vec<_>>>()?;

    let layout = rendering::compute_layout(tile_size, tiles.len(), anchor.map(|a| (a.width(), a.height())))?;
    debug!(
        "Layout: tile {}px x{}, canvas {}x{}",
        layout.tile_size,
        tiles.len(),
        layout.width,
        layout.height
    );

    let mut commands = Vec::with_capacity(layout.placements.len() + 1);
    commands.push(PaintCommand::SolidRect {
        x: 0,
        y: 0,
        width: layout.width,
        height: layout.height,
        rgba: config.background,
    });
    for placement in &layout.placements {
        let image = match (placement.kind, anchor) {
            (PlacementKind::Anchor, Some(a)) => a.pixels(),
            (PlacementKind::Tile(i), _) => &tiles[i].image,
            (PlacementKind::Anchor, None) => continue,
        };
        commands.push(PaintCommand::Image {
            x: placement.rect.x,
            y: placement.rect.y,
            image,
        });
    }

    let mut surface = Surface::new(layout.width, layout.height);
    surface.paint(&commands);
    let result = rendering::encode_png(surface.pixels())?;
    Ok((surface, result))
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: [u8; 4] = [255, 255, 255, 255];
    const BRONZE: [u8; 4] = [205, 127, 50, 255];
    const BLUE: [u8; 4] = [33, 150, 243, 255];
    const LOGO: [u8; 4] = [10, 20, 30, 255];

    fn decode(result: &CompositeResult) -> image::RgbaImage {
        image::load_from_memory(&result.png_data).unwrap().to_rgba8()
    }

    #[test]
    fn two_badges_without_anchor() {
        let c = Compositor::new(CompositorConfig::default());
        let bronze = RasterImage::solid(100, 100, BRONZE);
        let empathize = RasterImage::solid(150, 100, BLUE);
        let res = c.composite(&[bronze, empathize], None).unwrap();
        assert_eq!((res.width, res.height), (300, 150));

        let px = decode(&res);
        assert_eq!(px.get_pixel(75, 75).0, BRONZE);
        assert_eq!(px.get_pixel(0, 0).0, BRONZE);
        // empathize tile: 25px white bands above and below
        assert_eq!(px.get_pixel(225, 10).0, WHITE);
        assert_eq!(px.get_pixel(225, 75).0, BLUE);
        assert_eq!(px.get_pixel(225, 140).0, WHITE);
        assert!(c.has_result());
        assert_eq!(c.surface_dimensions(), (300, 150));
    }

    #[test]
    fn anchor_keeps_native_size_and_is_centred() {
        let c = Compositor::new(CompositorConfig::default());
        let logo = RasterImage::solid(40, 40, LOGO);
        let badge = RasterImage::solid(100, 100, BRONZE);
        let res = c.composite(&[badge], Some(&logo)).unwrap();
        assert_eq!((res.width, res.height), (140, 100));

        let px = decode(&res);
        assert_eq!(px.get_pixel(20, 29).0, WHITE);
        assert_eq!(px.get_pixel(20, 30).0, LOGO);
        assert_eq!(px.get_pixel(20, 69).0, LOGO);
        assert_eq!(px.get_pixel(20, 70).0, WHITE);
        assert_eq!(px.get_pixel(40, 0).0, BRONZE);
    }

    #[test]
    fn anchor_alone_is_a_valid_selection() {
        let c = Compositor::new(CompositorConfig::default());
        let res = c.composite(&[], Some(&RasterImage::solid(40, 30, LOGO))).unwrap();
        assert_eq!((res.width, res.height), (40, 30));
    }

    #[test]
    fn nothing_selected_is_a_selection_error() {
        let c = Compositor::new(CompositorConfig::default());
        assert!(matches!(c.composite(&[], None), Err(Error::SelectionError(_))));
        assert_eq!(c.state(), CompositorState::Idle);
    }

    #[test]
    fn zero_sized_input_fails_without_clobbering_previous_result() {
        let c = Compositor::new(CompositorConfig::default());
        let first = c.composite(&[RasterImage::solid(10, 10, BRONZE)], None).unwrap();

        let bad = RasterImage::solid(0, 10, BRONZE);
        let err = c.composite(&[RasterImage::solid(10, 10, BLUE), bad], None);
        assert!(matches!(err, Err(Error::GeometryError(_))));
        let zero_anchor = RasterImage::solid(10, 0, LOGO);
        let err = c.composite(&[RasterImage::solid(10, 10, BLUE)], Some(&zero_anchor));
        assert!(matches!(err, Err(Error::GeometryError(_))));

        assert_eq!(c.current_result(), Some(first));
        assert_eq!(c.surface_dimensions(), (10, 10));
        assert_eq!(c.state(), CompositorState::Idle);
    }

    #[test]
    fn same_selection_gives_identical_bytes() {
        let c = Compositor::new(CompositorConfig::default());
        let sel = [RasterImage::solid(64, 20, BLUE), RasterImage::solid(30, 50, BRONZE)];
        let a = c.composite(&sel, None).unwrap();
        let b = c.composite(&sel, None).unwrap();
        assert_eq!(a.png_data, b.png_data);
    }

    #[test]
    fn busy_compositor_rejects_new_requests() {
        let c = Compositor::new(CompositorConfig::default());
        let guard = c.begin().unwrap();
        assert_eq!(c.state(), CompositorState::Compositing);
        assert!(matches!(
            c.composite(&[RasterImage::solid(1, 1, WHITE)], None),
            Err(Error::Busy)
        ));
        drop(guard);
        assert_eq!(c.state(), CompositorState::Idle);
        assert!(c.composite(&[RasterImage::solid(1, 1, WHITE)], None).is_ok());
    }

    #[test]
    fn reset_clears_result_and_surface() {
        let c = Compositor::new(CompositorConfig::default());
        c.reset();
        assert!(!c.has_result());
        c.composite(&[RasterImage::solid(8, 8, BLUE)], None).unwrap();
        c.reset();
        assert!(!c.has_result());
        assert_eq!(c.surface_dimensions(), (0, 0));
    }

    #[test]
    fn reset_during_composite_discards_its_result() {
        let c = Compositor::new(CompositorConfig::default());
        let generation = c.generation.load(Ordering::SeqCst);
        c.reset();
        let err = c.render_and_store(&[RasterImage::solid(4, 4, BLUE)], None, generation);
        assert!(matches!(err, Err(Error::SelectionError(_))));
        assert!(!c.has_result());
    }
}
