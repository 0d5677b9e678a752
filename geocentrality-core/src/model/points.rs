use geo::Point;

/// Sampled location, optionally carrying the population value read at it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    pub geometry: Point<f64>,
    pub weight: Option<f64>,
}

impl SamplePoint {
    pub fn new(geometry: Point<f64>) -> Self {
        Self {
            geometry,
            weight: None,
        }
    }

    pub fn with_weight(geometry: Point<f64>, weight: f64) -> Self {
        Self {
            geometry,
            weight: Some(weight),
        }
    }
}

/// Collection of sampled locations. Order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSet {
    points: Vec<SamplePoint>,
}

impl PointSet {
    pub fn new(points: Vec<SamplePoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SamplePoint> {
        self.points.iter()
    }

    pub fn get(&self, index: usize) -> Option<&SamplePoint> {
        self.points.get(index)
    }

    pub fn as_slice(&self) -> &[SamplePoint] {
        &self.points
    }
}

impl FromIterator<SamplePoint> for PointSet {
    fn from_iter<I: IntoIterator<Item = SamplePoint>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl FromIterator<Point<f64>> for PointSet {
    fn from_iter<I: IntoIterator<Item = Point<f64>>>(iter: I) -> Self {
        iter.into_iter().map(SamplePoint::new).collect()
    }
}

impl<'a> IntoIterator for &'a PointSet {
    type Item = &'a SamplePoint;
    type IntoIter = std::slice::Iter<'a, SamplePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
