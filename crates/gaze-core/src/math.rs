use nalgebra::{Point2, Vector2};

pub type Real = f64;

pub type Pt2 = Point2<Real>;
pub type Vec2 = Vector2<Real>;
