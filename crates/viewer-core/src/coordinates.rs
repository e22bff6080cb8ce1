//! Conversion between scaled (persisted) and viewport (pixel) geometry.
//!
//! Scaled rectangles carry the dimensions of the viewport they were captured in.
//! Rendering them at another zoom level is a proportional rescale against the
//! current viewport. Positions flagged with `use_pdf_coordinates` instead hold
//! native PDF points (bottom-left origin) and go through the page transform.

use doc_model::{Position, Rect, ScaledPosition, ScaledRect};

/// Render transform of a single page at its current zoom and rotation.
///
/// Mirrors the page viewport handed out by the document renderer: a view box in
/// PDF points, a scale factor, a rotation and the resulting affine transform
/// from PDF space into viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageViewport {
    pub view_box: [f64; 4],
    pub scale: f64,
    pub rotation: u16,
    pub width: f64,
    pub height: f64,
    transform: [f64; 6],
}

impl PageViewport {
    /// Build a viewport for `view_box` (x0, y0, x1, y1 in points).
    ///
    /// Rotation is normalized into 0..360; values that are not a multiple of 90
    /// fall back to 0.
    pub fn new(view_box: [f64; 4], scale: f64, rotation: i32) -> Self {
        let mut rotation = rotation.rem_euclid(360);
        if rotation % 90 != 0 {
            log::warn!("unsupported page rotation {rotation}, using 0");
            rotation = 0;
        }

        let center_x = (view_box[2] + view_box[0]) / 2.0;
        let center_y = (view_box[3] + view_box[1]) / 2.0;

        let (a, b, c, d) = match rotation {
            90 => (0.0, 1.0, 1.0, 0.0),
            180 => (-1.0, 0.0, 0.0, 1.0),
            270 => (0.0, -1.0, -1.0, 0.0),
            _ => (1.0, 0.0, 0.0, -1.0),
        };

        let (offset_x, offset_y, width, height) = if a == 0.0 {
            (
                (center_y - view_box[1]).abs() * scale,
                (center_x - view_box[0]).abs() * scale,
                (view_box[3] - view_box[1]).abs() * scale,
                (view_box[2] - view_box[0]).abs() * scale,
            )
        } else {
            (
                (center_x - view_box[0]).abs() * scale,
                (center_y - view_box[1]).abs() * scale,
                (view_box[2] - view_box[0]).abs() * scale,
                (view_box[3] - view_box[1]).abs() * scale,
            )
        };

        let transform = [
            a * scale,
            b * scale,
            c * scale,
            d * scale,
            offset_x - a * scale * center_x - c * scale * center_y,
            offset_y - b * scale * center_x - d * scale * center_y,
        ];

        Self {
            view_box,
            scale,
            rotation: rotation as u16,
            width,
            height,
            transform,
        }
    }

    /// Unrotated viewport for a page of `width_pt` x `height_pt` points.
    pub fn for_page(width_pt: f64, height_pt: f64, scale: f64) -> Self {
        Self::new([0.0, 0.0, width_pt, height_pt], scale, 0)
    }

    pub fn transform(&self) -> [f64; 6] {
        self.transform
    }

    /// Same page rendered at another scale.
    pub fn rescaled(&self, scale: f64) -> Self {
        Self::new(self.view_box, scale, i32::from(self.rotation))
    }

    pub fn convert_to_viewport_point(&self, x: f64, y: f64) -> (f64, f64) {
        let m = &self.transform;
        (x * m[0] + y * m[2] + m[4], x * m[1] + y * m[3] + m[5])
    }

    pub fn convert_to_pdf_point(&self, x: f64, y: f64) -> (f64, f64) {
        let m = &self.transform;
        let det = m[0] * m[3] - m[1] * m[2];
        if det == 0.0 {
            return (0.0, 0.0);
        }

        (
            (x * m[3] - y * m[2] + m[2] * m[5] - m[4] * m[3]) / det,
            (-x * m[1] + y * m[0] + m[4] * m[1] - m[5] * m[0]) / det,
        )
    }

    /// Convert the two corners of a PDF-space rectangle into viewport space.
    ///
    /// The returned corners are not normalized: axis flips can swap them.
    pub fn convert_to_viewport_rectangle(&self, rect: [f64; 4]) -> [f64; 4] {
        let (x1, y1) = self.convert_to_viewport_point(rect[0], rect[1]);
        let (x2, y2) = self.convert_to_viewport_point(rect[2], rect[3]);
        [x1, y1, x2, y2]
    }
}

/// Divisor for a stored reference dimension; zero or NaN becomes 1.
fn reference_dimension(value: f64) -> f64 {
    if value == 0.0 || value.is_nan() {
        1.0
    } else {
        value
    }
}

fn pdf_to_viewport(scaled: &ScaledRect, viewport: &PageViewport) -> Rect {
    let [x1, y1, x2, y2] =
        viewport.convert_to_viewport_rectangle([scaled.x1, scaled.y1, scaled.x2, scaled.y2]);

    Rect {
        left: x1.min(x2),
        top: y1.min(y2),
        width: (x2 - x1).abs(),
        height: (y1 - y2).abs(),
        page_number: scaled.page_number,
    }
}

/// Project a scaled rectangle into the page's current viewport.
pub fn to_viewport(
    scaled: &ScaledRect,
    viewport: &PageViewport,
    use_pdf_coordinates: bool,
) -> Rect {
    if use_pdf_coordinates {
        return pdf_to_viewport(scaled, viewport);
    }

    let sx = viewport.width / reference_dimension(scaled.width);
    let sy = viewport.height / reference_dimension(scaled.height);

    let x1 = scaled.x1 * sx;
    let y1 = scaled.y1 * sy;
    let x2 = scaled.x2 * sx;
    let y2 = scaled.y2 * sy;

    Rect {
        left: x1,
        top: y1,
        width: x2 - x1,
        height: y2 - y1,
        page_number: scaled.page_number,
    }
}

/// Normalize a viewport rectangle against the page's current viewport.
pub fn to_scaled(rect: &Rect, viewport: &PageViewport) -> ScaledRect {
    ScaledRect {
        x1: rect.left,
        y1: rect.top,
        x2: rect.left + rect.width,
        y2: rect.top + rect.height,
        width: viewport.width,
        height: viewport.height,
        page_number: rect.page_number,
    }
}

pub fn scaled_position_to_viewport(position: &ScaledPosition, viewport: &PageViewport) -> Position {
    let use_pdf = position.use_pdf_coordinates;

    Position {
        bounding_rect: to_viewport(&position.bounding_rect, viewport, use_pdf),
        rects: position.rects.iter().map(|rect| to_viewport(rect, viewport, use_pdf)).collect(),
        page_number: position.page_number,
    }
}

/// Captured positions always use the top-left origin.
pub fn viewport_position_to_scaled(position: &Position, viewport: &PageViewport) -> ScaledPosition {
    ScaledPosition {
        bounding_rect: to_scaled(&position.bounding_rect, viewport),
        rects: position.rects.iter().map(|rect| to_scaled(rect, viewport)).collect(),
        page_number: position.page_number,
        use_pdf_coordinates: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPSILON: f64 = 1e-6;

    fn assert_rect_close(actual: &Rect, expected: &Rect) {
        assert!((actual.left - expected.left).abs() < EPSILON, "{actual:?} vs {expected:?}");
        assert!((actual.top - expected.top).abs() < EPSILON, "{actual:?} vs {expected:?}");
        assert!((actual.width - expected.width).abs() < EPSILON, "{actual:?} vs {expected:?}");
        assert!((actual.height - expected.height).abs() < EPSILON, "{actual:?} vs {expected:?}");
        assert_eq!(actual.page_number, expected.page_number);
    }

    #[test]
    fn unrotated_viewport_flips_y_axis() {
        let viewport = PageViewport::for_page(612.0, 792.0, 1.0);
        assert_eq!(viewport.width, 612.0);
        assert_eq!(viewport.height, 792.0);
        assert_eq!(viewport.transform(), [1.0, 0.0, 0.0, -1.0, 0.0, 792.0]);

        let (x, y) = viewport.convert_to_viewport_point(100.0, 700.0);
        assert!((x - 100.0).abs() < EPSILON);
        assert!((y - 92.0).abs() < EPSILON);
    }

    #[test]
    fn quarter_rotation_swaps_dimensions() {
        let viewport = PageViewport::new([0.0, 0.0, 612.0, 792.0], 2.0, 90);
        assert_eq!(viewport.rotation, 90);
        assert_eq!(viewport.width, 792.0 * 2.0);
        assert_eq!(viewport.height, 612.0 * 2.0);
    }

    #[test]
    fn negative_rotation_is_normalized() {
        let viewport = PageViewport::new([0.0, 0.0, 100.0, 100.0], 1.0, -90);
        assert_eq!(viewport.rotation, 270);
    }

    #[test]
    fn pdf_point_conversion_inverts_viewport_point() {
        for rotation in [0, 90, 180, 270] {
            let viewport = PageViewport::new([0.0, 0.0, 612.0, 792.0], 1.5, rotation);
            let (vx, vy) = viewport.convert_to_viewport_point(123.0, 456.0);
            let (px, py) = viewport.convert_to_pdf_point(vx, vy);
            assert!((px - 123.0).abs() < EPSILON, "rotation {rotation}");
            assert!((py - 456.0).abs() < EPSILON, "rotation {rotation}");
        }
    }

    #[test]
    fn pdf_coordinates_are_normalized_with_min_max() {
        let viewport = PageViewport::for_page(600.0, 800.0, 1.0);
        let scaled = ScaledRect {
            x1: 100.0,
            y1: 700.0,
            x2: 300.0,
            y2: 650.0,
            width: 600.0,
            height: 800.0,
            page_number: Some(1),
        };

        let rect = to_viewport(&scaled, &viewport, true);
        assert_rect_close(&rect, &Rect::new(100.0, 100.0, 200.0, 50.0).on_page(1));
    }

    #[test]
    fn scaled_rect_rescales_with_zoom() {
        let captured_at = PageViewport::for_page(800.0, 1000.0, 1.0);
        let rect = Rect::new(80.0, 100.0, 160.0, 20.0).on_page(2);
        let scaled = to_scaled(&rect, &captured_at);

        let zoomed = captured_at.rescaled(1.5);
        let projected = to_viewport(&scaled, &zoomed, false);

        assert_rect_close(&projected, &Rect::new(120.0, 150.0, 240.0, 30.0).on_page(2));
    }

    #[test]
    fn zero_reference_dimensions_do_not_divide_by_zero() {
        let viewport = PageViewport::for_page(800.0, 1000.0, 1.0);
        let degenerate = ScaledRect {
            x1: 0.0,
            y1: 0.0,
            x2: 0.0,
            y2: 0.0,
            width: 0.0,
            height: 0.0,
            page_number: None,
        };

        let rect = to_viewport(&degenerate, &viewport, false);
        assert!(rect.left.is_finite() && rect.top.is_finite());
        assert_eq!(rect.width, 0.0);
        assert_eq!(rect.height, 0.0);
    }

    #[test]
    fn normalized_presets_scale_to_page_size() {
        let viewport = PageViewport::for_page(800.0, 1000.0, 1.0);
        let preset = ScaledRect {
            x1: 0.12,
            y1: 0.18,
            x2: 0.6,
            y2: 0.23,
            width: 1.0,
            height: 1.0,
            page_number: Some(1),
        };

        let rect = to_viewport(&preset, &viewport, false);
        assert_rect_close(&rect, &Rect::new(96.0, 180.0, 384.0, 50.0).on_page(1));
    }

    #[test]
    fn capture_always_stores_top_left_origin() {
        let viewport = PageViewport::for_page(800.0, 1000.0, 1.0);
        let position = Position {
            bounding_rect: Rect::new(10.0, 20.0, 30.0, 40.0).on_page(1),
            rects: vec![Rect::new(10.0, 20.0, 30.0, 40.0).on_page(1)],
            page_number: 1,
        };

        let scaled = viewport_position_to_scaled(&position, &viewport);
        assert!(!scaled.use_pdf_coordinates);
        assert_eq!(scaled.bounding_rect.width, 800.0);
        assert_eq!(scaled.bounding_rect.height, 1000.0);

        let back = scaled_position_to_viewport(&scaled, &viewport);
        assert_rect_close(&back.bounding_rect, &position.bounding_rect);
        assert_eq!(back.rects.len(), 1);
    }

    proptest! {
        #[test]
        fn viewport_round_trip(
            left in -500.0f64..2000.0,
            top in -500.0f64..2000.0,
            width in 0.0f64..1000.0,
            height in 0.0f64..1000.0,
            page_width in 1.0f64..2000.0,
            page_height in 1.0f64..2000.0,
            scale in 0.25f64..4.0,
        ) {
            let viewport = PageViewport::for_page(page_width, page_height, scale);
            let rect = Rect::new(left, top, width, height).on_page(1);

            let back = to_viewport(&to_scaled(&rect, &viewport), &viewport, false);

            let tolerance = 1e-9 * (1.0 + left.abs() + top.abs() + width + height);
            prop_assert!((back.left - rect.left).abs() <= tolerance);
            prop_assert!((back.top - rect.top).abs() <= tolerance);
            prop_assert!((back.width - rect.width).abs() <= tolerance);
            prop_assert!((back.height - rect.height).abs() <= tolerance);
            prop_assert_eq!(back.page_number, rect.page_number);
        }
    }
}
