use nalgebra::{Point3, Vector3};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Box3D {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Box3D {
    /// The "inverted" box that contains nothing and grows to fit anything.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn size(&self) -> Vector3<f64> {
        if self.is_empty() {
            Vector3::zeros()
        } else {
            self.max - self.min
        }
    }

    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn include(&mut self, position: &Point3<f64>, radius: f64) {
        self.min.x = self.min.x.min(position.x - radius);
        self.min.y = self.min.y.min(position.y - radius);
        self.min.z = self.min.z.min(position.z - radius);
        self.max.x = self.max.x.max(position.x + radius);
        self.max.y = self.max.y.max(position.y + radius);
        self.max.z = self.max.z.max(position.z + radius);
    }

    pub fn contains_point(&self, point: &Point3<f64>) -> bool {
        (0..3).all(|i| point[i] >= self.min[i] && point[i] <= self.max[i])
    }

    /// True when `other` lies entirely inside `self`. An empty box is
    /// contained by anything.
    pub fn contains_box(&self, other: &Box3D) -> bool {
        other.is_empty() || (self.contains_point(&other.min) && self.contains_point(&other.max))
    }
}

/// Bounding sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere3D {
    pub center: Point3<f64>,
    pub radius: f64,
}

impl Sphere3D {
    pub fn empty() -> Self {
        Self {
            center: Point3::origin(),
            radius: 0.0,
        }
    }

    pub fn contains_point(&self, point: &Point3<f64>) -> bool {
        (point - self.center).norm() <= self.radius + 1e-9
    }
}

/// Two-pass accumulator for a box and a sphere enclosing a set of balls.
///
/// The include pass collects the axis-aligned extent; its center becomes the
/// provisional sphere center. The extend pass then grows the radius until
/// every ball is enclosed. Feeding both passes the same positions yields a
/// sphere that always contains every ball.
#[derive(Debug, Clone)]
pub struct BoundaryHelper {
    bounds: Box3D,
    center: Point3<f64>,
    radius: f64,
    count: usize,
}

impl Default for BoundaryHelper {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundaryHelper {
    pub fn new() -> Self {
        Self {
            bounds: Box3D::empty(),
            center: Point3::origin(),
            radius: 0.0,
            count: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn include_position_radius(&mut self, position: &Point3<f64>, radius: f64) {
        self.bounds.include(position, radius);
        self.count += 1;
    }

    pub fn finished_include_step(&mut self) {
        self.center = if self.count == 0 {
            Point3::origin()
        } else {
            self.bounds.center()
        };
        self.radius = 0.0;
    }

    pub fn extend_position_radius(&mut self, position: &Point3<f64>, radius: f64) {
        let distance = (position - self.center).norm() + radius;
        if distance > self.radius {
            self.radius = distance;
        }
    }

    pub fn get_box(&self) -> Box3D {
        self.bounds
    }

    pub fn get_sphere(&self) -> Sphere3D {
        if self.count == 0 {
            return Sphere3D::empty();
        }
        Sphere3D {
            center: self.center,
            radius: self.radius,
        }
    }
}
