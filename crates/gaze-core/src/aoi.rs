//! Area-of-interest polygon and point-in-polygon hit testing.

use serde::{Deserialize, Serialize};

use crate::math::{Pt2, Real};
use crate::types::GazePoint;

/// Tolerance for the on-edge test. Points within this distance of a
/// polygon edge count as inside, so the boundary is never ambiguous.
const EDGE_EPS: Real = 1e-9;

/// Closed polygon in normalized screen coordinates.
///
/// Fewer than 3 vertices is a degenerate region that contains nothing;
/// malformed configuration degrades rather than crashing the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaOfInterest {
    vertices: Vec<Pt2>,
}

impl AreaOfInterest {
    pub fn new(vertices: Vec<Pt2>) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Pt2] {
        &self.vertices
    }

    pub fn is_degenerate(&self) -> bool {
        self.vertices.len() < 3
    }

    /// Even-odd ray-casting hit test. Points on an edge are inside.
    pub fn contains(&self, p: GazePoint) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }

        for i in 0..n {
            if on_segment(&self.vertices[i], &self.vertices[(i + 1) % n], p) {
                return true;
            }
        }

        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let vi = &self.vertices[i];
            let vj = &self.vertices[j];
            if (vi.y > p.y) != (vj.y > p.y) {
                let x_cross = vi.x + (p.y - vi.y) / (vj.y - vi.y) * (vj.x - vi.x);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}

/// Whether `p` lies on the segment `a`-`b`, within [`EDGE_EPS`].
fn on_segment(a: &Pt2, b: &Pt2, p: GazePoint) -> bool {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let apx = p.x - a.x;
    let apy = p.y - a.y;

    let cross = abx * apy - aby * apx;
    if cross.abs() > EDGE_EPS {
        return false;
    }
    let dot = apx * abx + apy * aby;
    let len_sq = abx * abx + aby * aby;
    dot >= -EDGE_EPS && dot <= len_sq + EDGE_EPS
}
