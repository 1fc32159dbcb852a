//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Scale `source` so its height becomes `height`, preserving the aspect ratio.
///
/// The width is rounded to the nearest pixel and never drops below 1. Small
/// sources are scaled up.
///
/// # Examples
/// ```
/// # use picsite::imaging::scale_to_height;
/// assert_eq!(scale_to_height((4000, 3000), 750), (1000, 750));
/// assert_eq!(scale_to_height((300, 200), 750), (1125, 750));
/// ```
pub fn scale_to_height(source: (u32, u32), height: u32) -> (u32, u32) {
    let (src_w, src_h) = source;
    if src_h == 0 {
        return (1, height);
    }
    let width = (src_w as f64 * height as f64 / src_h as f64).round();
    (width.max(1.0) as u32, height)
}

/// Calculate dimensions needed to fill a target area (resize before crop).
///
/// Returns dimensions that completely cover the target area while maintaining
/// the source aspect ratio. One dimension will match exactly, the other may exceed.
pub fn fill_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let src_aspect = src_w as f64 / src_h as f64;
    let tgt_aspect = tgt_w as f64 / tgt_h as f64;

    if src_aspect > tgt_aspect {
        // Source is wider: height will match, width will exceed
        let h = tgt_h;
        let w = (h as f64 * src_aspect).round().max(tgt_w as f64) as u32;
        (w, h)
    } else {
        // Source is taller: width will match, height will exceed
        let w = tgt_w;
        let h = (w as f64 / src_aspect).round().max(tgt_h as f64) as u32;
        (w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_landscape_to_height() {
        assert_eq!(scale_to_height((1600, 1000), 750), (1200, 750));
    }

    #[test]
    fn scale_portrait_to_height() {
        assert_eq!(scale_to_height((600, 800), 750), (563, 750));
    }

    #[test]
    fn scale_upscales_small_sources() {
        assert_eq!(scale_to_height((40, 30), 750), (1000, 750));
    }

    #[test]
    fn scale_keeps_at_least_one_pixel() {
        assert_eq!(scale_to_height((1, 10_000), 750), (1, 750));
    }

    #[test]
    fn fill_wider_source_matches_height() {
        // 16:9 into 360x225 (1.6) → height matches
        assert_eq!(fill_dimensions((1920, 1080), (360, 225)), (400, 225));
    }

    #[test]
    fn fill_taller_source_matches_width() {
        assert_eq!(fill_dimensions((1000, 1000), (360, 225)), (360, 360));
    }

    #[test]
    fn fill_same_aspect_is_exact() {
        assert_eq!(fill_dimensions((720, 450), (360, 225)), (360, 225));
    }
}
