//! Study area boundary

use geo::{Area, BoundingRect, Contains, MultiPolygon, Point, Polygon, Rect};

use crate::Error;

/// Boundary polygon of the analysed city together with its bounding box.
#[derive(Debug, Clone)]
pub struct StudyArea {
    pub name: String,
    boundary: MultiPolygon<f64>,
    bbox: Rect<f64>,
}

impl StudyArea {
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for boundaries without area.
    pub fn new(name: impl Into<String>, boundary: MultiPolygon<f64>) -> Result<Self, Error> {
        let name = name.into();
        let area = boundary.unsigned_area();
        if !area.is_finite() || area <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "boundary of '{name}' has zero area"
            )));
        }
        let bbox = boundary
            .bounding_rect()
            .ok_or_else(|| Error::InvalidInput(format!("boundary of '{name}' is empty")))?;

        Ok(Self {
            name,
            boundary,
            bbox,
        })
    }

    /// # Errors
    ///
    /// Same as [`StudyArea::new`].
    pub fn from_polygon(name: impl Into<String>, polygon: Polygon<f64>) -> Result<Self, Error> {
        Self::new(name, MultiPolygon::new(vec![polygon]))
    }

    pub fn boundary(&self) -> &MultiPolygon<f64> {
        &self.boundary
    }

    pub fn bbox(&self) -> Rect<f64> {
        self.bbox
    }

    pub fn contains(&self, point: &Point<f64>) -> bool {
        self.boundary.contains(point)
    }

    /// Share of the bounding box covered by the boundary.
    /// Rejection sampling accepts roughly this fraction of its draws.
    pub fn fill_ratio(&self) -> f64 {
        let bbox_area = self.bbox.width() * self.bbox.height();
        if bbox_area <= 0.0 {
            return 0.0;
        }
        self.boundary.unsigned_area() / bbox_area
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    #[test]
    fn square_has_full_fill_ratio() {
        let square = polygon![(x: 0.0, y: 0.0), (x: 2.0, y: 0.0), (x: 2.0, y: 2.0), (x: 0.0, y: 2.0)];
        let area = StudyArea::from_polygon("square", square).unwrap();
        assert!((area.fill_ratio() - 1.0).abs() < 1e-12);
        assert!(area.contains(&Point::new(1.0, 1.0)));
        assert!(!area.contains(&Point::new(3.0, 1.0)));
    }

    #[test]
    fn degenerate_boundary_is_rejected() {
        let line = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0), (x: 2.0, y: 2.0)];
        assert!(matches!(
            StudyArea::from_polygon("flat", line),
            Err(Error::InvalidInput(_))
        ));
    }
}
