use foundation::math::{Ecef, Geodetic, ecef_to_geodetic};

/// Placement of a point-like entity (label anchor, marker, vehicle).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub position: Ecef,
}

impl Transform {
    pub fn translate(position: Ecef) -> Self {
        Self { position }
    }

    pub fn geodetic(&self) -> Geodetic {
        ecef_to_geodetic(self.position)
    }
}
