//! Desktop-space geometry
//!
//! Positions and sizes live in the shared layout coordinate space, where every
//! output occupies its own rectangle. Values are `f64` and never rounded here.

use cgmath::Vector2;

use crate::output::Output;

/// A 2D vector in layout coordinates (used for both positions and sizes)
pub type Vector2D = Vector2<f64>;

/// Axis-aligned rectangle in layout coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    pub origin: Vector2D,
    pub size: Vector2D,
}

impl Rectangle {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Vector2D::new(x, y),
            size: Vector2D::new(width, height),
        }
    }

    /// Bottom-right corner
    pub fn extent(&self) -> Vector2D {
        self.origin + self.size
    }

    pub fn contains_point(&self, point: Vector2D) -> bool {
        let extent = self.extent();
        point.x >= self.origin.x && point.y >= self.origin.y && point.x < extent.x && point.y < extent.y
    }

    /// Whether the two rectangles share any area
    pub fn intersects(&self, other: &Rectangle) -> bool {
        let a = self.extent();
        let b = other.extent();
        self.origin.x < b.x && other.origin.x < a.x && self.origin.y < b.y && other.origin.y < a.y
    }

    /// Shared area of both rectangles, if any
    pub fn intersection(&self, other: &Rectangle) -> Option<Rectangle> {
        if !self.intersects(other) {
            return None;
        }

        let a = self.extent();
        let b = other.extent();
        let origin = Vector2D::new(self.origin.x.max(other.origin.x), self.origin.y.max(other.origin.y));
        let extent = Vector2D::new(a.x.min(b.x), a.y.min(b.y));
        Some(Rectangle {
            origin,
            size: extent - origin,
        })
    }
}

/// Computes the rectangle covering every output.
///
/// The origin is the component-wise minimum of all output positions and the
/// size is the component-wise maximum of `position + size` minus that origin.
/// Returns `None` for an empty output set so callers can skip placement
/// instead of working with a degenerate rectangle.
pub fn bounding_box<'a, I>(outputs: I) -> Option<Rectangle>
where
    I: IntoIterator<Item = &'a Output>,
{
    let mut outputs = outputs.into_iter();
    let first = outputs.next()?;

    let mut min = first.position;
    let mut max = first.position + first.size;

    for output in outputs {
        let extent = output.position + output.size;
        min.x = min.x.min(output.position.x);
        min.y = min.y.min(output.position.y);
        max.x = max.x.max(extent.x);
        max.y = max.y.max(extent.y);
    }

    Some(Rectangle {
        origin: min,
        size: max - min,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputId;
    use crate::workspace::WorkspaceId;
    use proptest::prelude::*;

    fn output(id: u64, x: f64, y: f64, w: f64, h: f64) -> Output {
        Output::new(OutputId(id), format!("OUT-{}", id), Vector2D::new(x, y), Vector2D::new(w, h), WorkspaceId(id))
    }

    #[test]
    fn test_empty_output_set_has_no_bounding_box() {
        let outputs: Vec<Output> = Vec::new();
        assert_eq!(bounding_box(&outputs), None);
    }

    #[test]
    fn test_single_output() {
        let outputs = vec![output(1, 100.0, 50.0, 1920.0, 1080.0)];
        let bbox = bounding_box(&outputs).unwrap();
        assert_eq!(bbox, Rectangle::new(100.0, 50.0, 1920.0, 1080.0));
    }

    #[test]
    fn test_landscape_and_portrait_side_by_side() {
        let outputs = vec![
            output(1, 0.0, 0.0, 1920.0, 1080.0),
            output(2, 1920.0, 0.0, 1080.0, 1920.0),
        ];
        let bbox = bounding_box(&outputs).unwrap();
        assert_eq!(bbox.origin, Vector2D::new(0.0, 0.0));
        assert_eq!(bbox.size, Vector2D::new(3000.0, 1920.0));
    }

    #[test]
    fn test_bounding_box_is_anchored_at_minimum_origin() {
        let outputs = vec![
            output(1, 2560.0, 400.0, 1920.0, 1080.0),
            output(2, 640.0, 0.0, 1920.0, 1080.0),
        ];
        let bbox = bounding_box(&outputs).unwrap();
        assert_eq!(bbox.origin, Vector2D::new(640.0, 0.0));
        assert_eq!(bbox.size, Vector2D::new(3840.0, 1480.0));
    }

    #[test]
    fn test_fractional_values_are_not_rounded() {
        let outputs = vec![output(1, 0.5, 0.25, 1366.5, 767.75)];
        let bbox = bounding_box(&outputs).unwrap();
        assert_eq!(bbox.extent(), Vector2D::new(1367.0, 768.0));
    }

    #[test]
    fn test_rectangle_intersection() {
        let a = Rectangle::new(0.0, 0.0, 100.0, 100.0);
        assert!(a.intersects(&Rectangle::new(50.0, 50.0, 100.0, 100.0)));
        assert!(!a.intersects(&Rectangle::new(100.0, 0.0, 100.0, 100.0)));
        assert!(a.contains_point(Vector2D::new(99.0, 0.0)));
        assert!(!a.contains_point(Vector2D::new(100.0, 0.0)));

        assert_eq!(
            a.intersection(&Rectangle::new(50.0, -20.0, 100.0, 100.0)),
            Some(Rectangle::new(50.0, 0.0, 50.0, 80.0))
        );
        assert_eq!(a.intersection(&Rectangle::new(100.0, 0.0, 10.0, 10.0)), None);
    }

    prop_compose! {
        fn arbitrary_output()(
            id in 0u64..1000,
            x in 0.0f64..10_000.0,
            y in 0.0f64..10_000.0,
            w in 1.0f64..8_000.0,
            h in 1.0f64..8_000.0,
        ) -> Output {
            output(id, x, y, w, h)
        }
    }

    proptest! {
        #[test]
        fn prop_bounding_box_matches_component_extremes(outputs in prop::collection::vec(arbitrary_output(), 1..8)) {
            let bbox = bounding_box(&outputs).unwrap();

            let min_x = outputs.iter().map(|o| o.position.x).fold(f64::INFINITY, f64::min);
            let min_y = outputs.iter().map(|o| o.position.y).fold(f64::INFINITY, f64::min);
            let max_x = outputs.iter().map(|o| o.position.x + o.size.x).fold(f64::NEG_INFINITY, f64::max);
            let max_y = outputs.iter().map(|o| o.position.y + o.size.y).fold(f64::NEG_INFINITY, f64::max);

            prop_assert_eq!(bbox.origin, Vector2D::new(min_x, min_y));
            prop_assert_eq!(bbox.size, Vector2D::new(max_x - min_x, max_y - min_y));
        }

        #[test]
        fn prop_bounding_box_covers_every_output(outputs in prop::collection::vec(arbitrary_output(), 1..8)) {
            let bbox = bounding_box(&outputs).unwrap();
            let extent = bbox.extent();
            for o in &outputs {
                prop_assert!(o.position.x >= bbox.origin.x && o.position.y >= bbox.origin.y);
                prop_assert!(o.position.x + o.size.x <= extent.x + 1e-6);
                prop_assert!(o.position.y + o.size.y <= extent.y + 1e-6);
            }
        }
    }
}
