use crate::error::Result;
use crate::frame::{resample, PixelBuffer, ResizeFilter};
use parking_lot::RwLock;
use std::borrow::Cow;
use std::sync::Arc;

/// Selected background plus its copy stretched to the last frame size.
///
/// Both live in one value so they are always swapped together.
#[derive(Clone)]
struct BackgroundState {
    asset: Arc<PixelBuffer>,
    resized: Option<Arc<PixelBuffer>>,
}

/// Holds the user-selected background for the lifetime of a session.
///
/// Frames take a snapshot under the read lock and resample outside it, so a
/// background change arriving mid-frame never mixes the old asset with the
/// new cache (or the reverse).
#[derive(Default)]
pub struct BackgroundSlot {
    state: RwLock<Option<BackgroundState>>,
}

impl BackgroundSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the background and drop any cached resize
    pub fn set(&self, asset: impl Into<Arc<PixelBuffer>>) {
        let asset = asset.into();
        tracing::info!(
            "Background set to {}x{} image",
            asset.width(),
            asset.height()
        );
        *self.state.write() = Some(BackgroundState {
            asset,
            resized: None,
        });
    }

    pub fn clear(&self) {
        tracing::info!("Background cleared");
        *self.state.write() = None;
    }

    pub fn is_set(&self) -> bool {
        self.state.read().is_some()
    }

    /// The background as supplied, without resizing
    pub fn asset(&self) -> Option<Arc<PixelBuffer>> {
        self.state.read().as_ref().map(|state| Arc::clone(&state.asset))
    }

    /// Dimensions of the cached resize, if one exists
    pub fn cached_dimensions(&self) -> Option<(u32, u32)> {
        self.state
            .read()
            .as_ref()
            .and_then(|state| state.resized.as_ref())
            .map(|resized| resized.dimensions())
    }

    /// Background stretched to `width` x `height`, or `None` when no
    /// background is set.
    ///
    /// The result is cached for the next frame of the same size. A resize
    /// computed against an asset that has since been replaced is returned to
    /// the caller but not cached.
    pub fn fitted(
        &self,
        width: u32,
        height: u32,
        filter: ResizeFilter,
    ) -> Result<Option<Arc<PixelBuffer>>> {
        let Some(state) = self.snapshot() else {
            return Ok(None);
        };

        if let Some(resized) = &state.resized {
            if resized.dimensions() == (width, height) {
                return Ok(Some(Arc::clone(resized)));
            }
        }

        let resized = stretch(&state.asset, width, height, filter)?;
        self.store(&state.asset, &resized);

        Ok(Some(resized))
    }

    fn snapshot(&self) -> Option<BackgroundState> {
        self.state.read().clone()
    }

    /// Cache `resized` if `source` is still the current asset.
    ///
    /// Returns whether the cache was updated.
    fn store(&self, source: &Arc<PixelBuffer>, resized: &Arc<PixelBuffer>) -> bool {
        let mut guard = self.state.write();
        match guard.as_mut() {
            Some(current) if Arc::ptr_eq(&current.asset, source) => {
                current.resized = Some(Arc::clone(resized));
                true
            }
            _ => {
                tracing::debug!("Background changed while resampling, not caching");
                false
            }
        }
    }
}

fn stretch(
    asset: &Arc<PixelBuffer>,
    width: u32,
    height: u32,
    filter: ResizeFilter,
) -> Result<Arc<PixelBuffer>> {
    Ok(match resample(asset, width, height, filter)? {
        Cow::Borrowed(_) => Arc::clone(asset),
        Cow::Owned(image) => Arc::new(image),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(width: u32, height: u32, value: u8) -> PixelBuffer {
        PixelBuffer::from_pixel(width, height, Rgba([value, value, value, 255]))
    }

    #[test]
    fn test_empty_slot() {
        let slot = BackgroundSlot::new();

        assert!(!slot.is_set());
        assert!(slot.asset().is_none());
        assert!(slot
            .fitted(4, 4, ResizeFilter::Bilinear)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_fitted_is_cached_per_size() {
        let slot = BackgroundSlot::new();
        slot.set(solid(8, 8, 50));

        let first = slot.fitted(4, 2, ResizeFilter::Bilinear).unwrap().unwrap();
        let second = slot.fitted(4, 2, ResizeFilter::Bilinear).unwrap().unwrap();

        assert_eq!(first.dimensions(), (4, 2));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(slot.cached_dimensions(), Some((4, 2)));

        let third = slot.fitted(6, 6, ResizeFilter::Bilinear).unwrap().unwrap();
        assert_eq!(third.dimensions(), (6, 6));
        assert_eq!(slot.cached_dimensions(), Some((6, 6)));
    }

    #[test]
    fn test_matching_asset_is_shared_not_copied() {
        let slot = BackgroundSlot::new();
        slot.set(solid(3, 3, 9));

        let fitted = slot.fitted(3, 3, ResizeFilter::Nearest).unwrap().unwrap();
        let asset = slot.asset().unwrap();

        assert!(Arc::ptr_eq(&fitted, &asset));
    }

    #[test]
    fn test_set_invalidates_cache() {
        let slot = BackgroundSlot::new();
        slot.set(solid(8, 8, 50));
        slot.fitted(4, 4, ResizeFilter::Bilinear).unwrap();
        assert_eq!(slot.cached_dimensions(), Some((4, 4)));

        slot.set(solid(2, 2, 200));
        assert_eq!(slot.cached_dimensions(), None);

        let fitted = slot.fitted(4, 4, ResizeFilter::Bilinear).unwrap().unwrap();
        assert!(fitted.pixels().all(|p| *p == Rgba([200, 200, 200, 255])));
    }

    #[test]
    fn test_resize_of_replaced_asset_is_not_cached() {
        let slot = BackgroundSlot::new();
        slot.set(solid(8, 8, 50));

        let stale = slot.snapshot().unwrap();
        slot.set(solid(2, 2, 200));
        let resized = stretch(&stale.asset, 4, 4, ResizeFilter::Bilinear).unwrap();

        assert!(!slot.store(&stale.asset, &resized));
        assert_eq!(slot.cached_dimensions(), None);

        let fitted = slot.fitted(4, 4, ResizeFilter::Bilinear).unwrap().unwrap();
        assert!(fitted.pixels().all(|p| *p == Rgba([200, 200, 200, 255])));
        assert_eq!(slot.cached_dimensions(), Some((4, 4)));
    }

    #[test]
    fn test_resize_of_current_asset_is_cached() {
        let slot = BackgroundSlot::new();
        slot.set(solid(8, 8, 50));

        let current = slot.snapshot().unwrap();
        let resized = stretch(&current.asset, 4, 2, ResizeFilter::Nearest).unwrap();

        assert!(slot.store(&current.asset, &resized));
        assert_eq!(slot.cached_dimensions(), Some((4, 2)));
        let fitted = slot.fitted(4, 2, ResizeFilter::Nearest).unwrap().unwrap();
        assert!(Arc::ptr_eq(&fitted, &resized));
    }

    #[test]
    fn test_resize_after_clear_is_not_cached() {
        let slot = BackgroundSlot::new();
        slot.set(solid(8, 8, 50));

        let stale = slot.snapshot().unwrap();
        slot.clear();
        let resized = stretch(&stale.asset, 4, 4, ResizeFilter::Nearest).unwrap();

        assert!(!slot.store(&stale.asset, &resized));
        assert!(!slot.is_set());
    }

    #[test]
    fn test_clear_removes_background() {
        let slot = BackgroundSlot::new();
        slot.set(solid(2, 2, 1));
        slot.clear();

        assert!(!slot.is_set());
        assert_eq!(slot.cached_dimensions(), None);
    }

    #[test]
    fn test_concurrent_readers_see_whole_assets() {
        let slot = Arc::new(BackgroundSlot::new());
        slot.set(solid(5, 5, 10));

        let writer = {
            let slot = Arc::clone(&slot);
            std::thread::spawn(move || {
                for i in 0..50u8 {
                    slot.set(solid(5 + u32::from(i % 3), 5, 10 + i));
                }
            })
        };

        for _ in 0..200 {
            let fitted = slot.fitted(7, 3, ResizeFilter::Nearest).unwrap().unwrap();
            let first = *fitted.get_pixel(0, 0);
            assert_eq!(fitted.dimensions(), (7, 3));
            assert!(fitted.pixels().all(|p| *p == first));
        }

        writer.join().unwrap();
    }
}
