use super::GateError;

/// Axis-aligned rectangle, bounds inclusive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
}

impl Rectangle {
    /// Build from two opposite corners in any order
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Result<Self, GateError> {
        if ![x0, y0, x1, y1].iter().all(|v| v.is_finite()) {
            return Err(GateError::InvalidGeometry(
                "rectangle corners must be finite".to_string(),
            ));
        }
        let (x0, x1) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let (y0, y1) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        if x0 == x1 || y0 == y1 {
            return Err(GateError::InvalidGeometry(format!(
                "rectangle ({x0}, {y0})-({x1}, {y1}) has zero area"
            )));
        }
        Ok(Self { x0, y0, x1, y1 })
    }

    /// Lower-left corner
    pub fn min(&self) -> (f64, f64) {
        (self.x0, self.y0)
    }

    /// Upper-right corner
    pub fn max(&self) -> (f64, f64) {
        (self.x1, self.y1)
    }

    /// Inclusive containment test
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }
}

/// Closed polygon; the last vertex connects back to the first
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<(f64, f64)>,
}

impl Polygon {
    /// Build from at least three finite vertices
    pub fn new(vertices: Vec<(f64, f64)>) -> Result<Self, GateError> {
        if vertices.len() < 3 {
            return Err(GateError::InvalidGeometry(format!(
                "polygon needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        if !vertices.iter().all(|(x, y)| x.is_finite() && y.is_finite()) {
            return Err(GateError::InvalidGeometry(
                "polygon vertices must be finite".to_string(),
            ));
        }
        Ok(Self { vertices })
    }

    /// Vertices in drawing order
    pub fn vertices(&self) -> &[(f64, f64)] {
        &self.vertices
    }

    /// Even-odd (ray casting) containment test
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let mut inside = false;
        let mut j = self.vertices.len() - 1;
        for (i, &(xi, yi)) in self.vertices.iter().enumerate() {
            let (xj, yj) = self.vertices[j];
            if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

/// Shape of a two-dimensional gate
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Axis-aligned rectangle
    Rectangle(Rectangle),
    /// Arbitrary closed polygon
    Polygon(Polygon),
}

impl Geometry {
    /// Rectangle geometry from two corners
    pub fn rectangle(x0: f64, y0: f64, x1: f64, y1: f64) -> Result<Self, GateError> {
        Rectangle::new(x0, y0, x1, y1).map(Geometry::Rectangle)
    }

    /// Polygon geometry from its vertices
    pub fn polygon(vertices: Vec<(f64, f64)>) -> Result<Self, GateError> {
        Polygon::new(vertices).map(Geometry::Polygon)
    }

    /// Membership of a single point; NaN coordinates are never members
    pub fn contains(&self, x: f64, y: f64) -> bool {
        match self {
            Geometry::Rectangle(r) => r.contains(x, y),
            Geometry::Polygon(p) => p.contains(x, y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_normalizes_corners() {
        let r = Rectangle::new(10.0, 20.0, 0.0, 5.0).unwrap();
        assert_eq!(r.min(), (0.0, 5.0));
        assert_eq!(r.max(), (10.0, 20.0));
        assert!(r.contains(0.0, 20.0));
        assert!(!r.contains(10.0001, 10.0));
    }

    #[test]
    fn test_rectangle_rejects_zero_area() {
        assert!(Rectangle::new(1.0, 0.0, 1.0, 5.0).is_err());
        assert!(Rectangle::new(0.0, f64::NAN, 1.0, 5.0).is_err());
    }

    #[test]
    fn test_polygon_even_odd() {
        // a "U" shape: the notch is outside
        let u = Polygon::new(vec![
            (0.0, 0.0),
            (30.0, 0.0),
            (30.0, 30.0),
            (20.0, 30.0),
            (20.0, 10.0),
            (10.0, 10.0),
            (10.0, 30.0),
            (0.0, 30.0),
        ])
        .unwrap();
        assert!(u.contains(5.0, 25.0));
        assert!(u.contains(25.0, 25.0));
        assert!(u.contains(15.0, 5.0));
        assert!(!u.contains(15.0, 20.0));
        assert!(!u.contains(-1.0, 5.0));
        assert!(!u.contains(f64::NAN, 5.0));
    }

    #[test]
    fn test_polygon_needs_three_vertices() {
        assert!(Polygon::new(vec![(0.0, 0.0), (1.0, 1.0)]).is_err());
    }
}
