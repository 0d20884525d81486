//! Pure calculation functions for thumbnail dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Fit `source` inside a square of side `max_edge`, preserving aspect ratio.
///
/// The longer edge becomes `max_edge`; the shorter edge is scaled by the same
/// ratio and rounded. Sources already within bounds are returned unchanged,
/// so small images are never upscaled. Neither output edge drops below 1.
///
/// # Examples
/// ```
/// # use gallery_sync::imaging::fit_within;
/// assert_eq!(fit_within((2000, 1000), 800), (800, 400));
/// assert_eq!(fit_within((300, 200), 800), (300, 200));
/// ```
pub fn fit_within(source: (u32, u32), max_edge: u32) -> (u32, u32) {
    let (src_w, src_h) = source;
    let longer_edge = src_w.max(src_h);

    if longer_edge <= max_edge || longer_edge == 0 {
        return source;
    }

    let ratio = max_edge as f64 / longer_edge as f64;
    if src_w >= src_h {
        // Landscape or square
        let h = (src_h as f64 * ratio).round() as u32;
        (max_edge, h.max(1))
    } else {
        // Portrait
        let w = (src_w as f64 * ratio).round() as u32;
        (w.max(1), max_edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landscape_caps_width() {
        assert_eq!(fit_within((2000, 1000), 800), (800, 400));
    }

    #[test]
    fn portrait_caps_height() {
        assert_eq!(fit_within((1500, 2000), 800), (600, 800));
    }

    #[test]
    fn square_caps_both() {
        assert_eq!(fit_within((1200, 1200), 600), (600, 600));
    }

    #[test]
    fn small_source_is_not_upscaled() {
        assert_eq!(fit_within((640, 480), 800), (640, 480));
    }

    #[test]
    fn exact_fit_is_unchanged() {
        assert_eq!(fit_within((800, 533), 800), (800, 533));
    }

    #[test]
    fn aspect_ratio_within_one_pixel() {
        let (w, h) = fit_within((4000, 2667), 800);
        assert_eq!(w, 800);
        let expected = 2667.0 * 800.0 / 4000.0;
        assert!((h as f64 - expected).abs() <= 1.0);
    }

    #[test]
    fn extreme_panorama_keeps_one_pixel_edge() {
        assert_eq!(fit_within((10000, 2), 800), (800, 1));
    }
}
