use crate::model::{DisplayRect, NaturalSize, Point, SelectionRect, ViewportSize};

/// Uniform scale that fits `natural` inside `viewport` while preserving aspect ratio.
///
/// Returns 0 when either surface has a zero or non-finite dimension.
pub fn scale_to_fit(natural: NaturalSize, viewport: ViewportSize) -> f64 {
    let dims = [natural.width, natural.height, viewport.width, viewport.height];
    if dims.iter().any(|value| !value.is_finite() || *value <= 0.0) {
        return 0.0;
    }
    (viewport.width / natural.width).min(viewport.height / natural.height)
}

/// Offset that centers the scaled content inside the viewport.
pub fn letterbox_offset(natural: NaturalSize, viewport: ViewportSize, scale: f64) -> Point {
    if scale <= 0.0 {
        return Point::default();
    }
    Point::new(
        (viewport.width - natural.width * scale) / 2.0,
        (viewport.height - natural.height * scale) / 2.0,
    )
}

/// Scale-to-fit, centered, letterboxed mapping between natural and display space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportMapping {
    pub natural: NaturalSize,
    pub viewport: ViewportSize,
    pub scale: f64,
    pub offset: Point,
}

impl ViewportMapping {
    pub fn new(natural: NaturalSize, viewport: ViewportSize) -> Self {
        let scale = scale_to_fit(natural, viewport);
        let offset = letterbox_offset(natural, viewport, scale);
        Self {
            natural,
            viewport,
            scale,
            offset,
        }
    }

    /// False until the surface has been laid out with a usable size.
    pub fn is_valid(&self) -> bool {
        self.scale > 0.0 && self.scale.is_finite()
    }

    pub fn to_natural(&self, display: Point) -> Option<Point> {
        if !self.is_valid() {
            return None;
        }
        Some(Point::new(
            (display.x - self.offset.x) / self.scale,
            (display.y - self.offset.y) / self.scale,
        ))
    }

    pub fn to_display(&self, natural: Point) -> Option<Point> {
        if !self.is_valid() {
            return None;
        }
        Some(Point::new(
            natural.x * self.scale + self.offset.x,
            natural.y * self.scale + self.offset.y,
        ))
    }

    pub fn to_display_rect(&self, rect: SelectionRect) -> Option<DisplayRect> {
        let origin = self.to_display(Point::new(rect.x, rect.y))?;
        Some(DisplayRect {
            left: origin.x,
            top: origin.y,
            width: rect.width * self.scale,
            height: rect.height * self.scale,
        })
    }

    /// Display-space bounds of the whole slide.
    pub fn image_rect(&self) -> Option<DisplayRect> {
        self.to_display_rect(SelectionRect {
            x: 0.0,
            y: 0.0,
            width: self.natural.width,
            height: self.natural.height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ViewportMapping, letterbox_offset, scale_to_fit};
    use crate::model::{NaturalSize, Point, SelectionRect, ViewportSize};

    const EPS: f64 = 1e-9;

    fn slide() -> NaturalSize {
        NaturalSize::new(1024.0, 768.0).expect("natural size")
    }

    #[test]
    fn scale_uses_limiting_axis() {
        let scale = scale_to_fit(slide(), ViewportSize::new(512.0, 768.0));
        assert!((scale - 0.5).abs() < EPS);
        let offset = letterbox_offset(slide(), ViewportSize::new(512.0, 768.0), scale);
        assert!(offset.x.abs() < EPS);
        assert!((offset.y - 192.0).abs() < EPS);
    }

    #[test]
    fn round_trip_is_identity() {
        let viewports = [
            ViewportSize::new(800.0, 600.0),
            ViewportSize::new(333.0, 901.0),
            ViewportSize::new(1920.0, 217.5),
        ];
        let points = [
            Point::new(0.0, 0.0),
            Point::new(17.25, 403.5),
            Point::new(799.0, 12.0),
        ];
        for viewport in viewports {
            let mapping = ViewportMapping::new(slide(), viewport);
            for point in points {
                let natural = mapping.to_natural(point).expect("natural");
                let back = mapping.to_display(natural).expect("display");
                assert!((back.x - point.x).abs() < 1e-6);
                assert!((back.y - point.y).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn fitted_image_stays_inside_viewport() {
        for (width, height) in [(800.0, 600.0), (100.0, 900.0), (1500.0, 40.0), (1.0, 1.0)] {
            let mapping = ViewportMapping::new(slide(), ViewportSize::new(width, height));
            let rect = mapping.image_rect().expect("image rect");
            assert!(rect.left >= -EPS && rect.top >= -EPS);
            assert!(rect.right() <= width + EPS);
            assert!(rect.bottom() <= height + EPS);
        }
    }

    #[test]
    fn rect_is_scaled_and_offset() {
        let mapping = ViewportMapping::new(slide(), ViewportSize::new(512.0, 768.0));
        let rect = SelectionRect::new(100.0, 100.0, 200.0, 150.0).expect("rect");
        let display = mapping.to_display_rect(rect).expect("display rect");
        assert!((display.left - 50.0).abs() < EPS);
        assert!((display.top - 242.0).abs() < EPS);
        assert!((display.width - 100.0).abs() < EPS);
        assert!((display.height - 75.0).abs() < EPS);
    }

    #[test]
    fn zero_viewport_is_degenerate() {
        let mapping = ViewportMapping::new(slide(), ViewportSize::new(0.0, 600.0));
        assert_eq!(mapping.scale, 0.0);
        assert_eq!(mapping.offset, Point::default());
        assert!(!mapping.is_valid());
        assert!(mapping.to_natural(Point::new(10.0, 10.0)).is_none());
        assert!(mapping.image_rect().is_none());
    }

    #[test]
    fn oversized_content_yields_negative_offset_without_panicking() {
        let offset = letterbox_offset(slide(), ViewportSize::new(100.0, 100.0), 1.0);
        assert!(offset.x < 0.0 && offset.y < 0.0);
    }
}
