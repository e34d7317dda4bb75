//! Slicing the tall canvas into page-sized bands

/// Heights within this distance of a page multiple do not start a new page
const EPSILON: f32 = 1e-3;

/// One page worth of the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBand {
    pub index: usize,
    /// Canvas y where the band starts
    pub top: f32,
    /// Canvas y where the band ends, never past the canvas bottom
    pub bottom: f32,
    /// Vertical translation applied to canvas content drawn on this page
    pub offset: f32,
}

impl PageBand {
    /// Whether content spanning `[top, bottom]` shows on this page
    pub fn intersects(&self, top: f32, bottom: f32) -> bool {
        bottom > self.top && top < self.bottom
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

/// Number of pages a canvas of `canvas_height` needs, at least one
pub fn page_count(canvas_height: f32, page_height: f32) -> usize {
    let positive = |value: f32| value > 0.0 && value.is_finite();
    if !positive(canvas_height) || !positive(page_height) {
        return 1;
    }
    let pages = (canvas_height - EPSILON) / page_height;
    (pages.ceil() as usize).max(1)
}

/// Consecutive bands covering `[0, canvas_height]` without gaps or overlaps
pub fn paginate(canvas_height: f32, page_height: f32) -> Vec<PageBand> {
    let count = page_count(canvas_height, page_height);
    let canvas_height = canvas_height.max(0.0);

    (0..count)
        .map(|index| {
            let top = index as f32 * page_height;
            let bottom = if index + 1 == count {
                canvas_height.max(top)
            } else {
                (index + 1) as f32 * page_height
            };
            PageBand {
                index,
                top,
                bottom,
                offset: -top,
            }
        })
        .collect()
}
