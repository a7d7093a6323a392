use bevy_math::{DVec2, DVec3, IVec3};

// Basis: +Y up. A ship at yaw 0 faces +Z; positive yaw turns the bow toward -X.

/// Wrap an angle in degrees into `[-180, 180)`.
#[inline]
pub fn wrap_degrees(deg: f64) -> f64 {
    let d = deg % 360.0;
    if d >= 180.0 {
        d - 360.0
    } else if d < -180.0 {
        d + 360.0
    } else {
        d
    }
}

/// Planar forward direction for a yaw in degrees, as `(x, z)`.
#[inline]
pub fn forward_xz(yaw_deg: f64) -> DVec2 {
    let (s, c) = yaw_deg.to_radians().sin_cos();
    DVec2::new(-s, c)
}

/// Precomputed yaw rotation about +Y.
///
/// `rotate` maps ship-local XZ into world XZ; `unrotate` is its inverse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YawBasis {
    pub cos: f64,
    pub sin: f64,
}

impl YawBasis {
    pub fn from_degrees(yaw_deg: f64) -> Self {
        let (sin, cos) = yaw_deg.to_radians().sin_cos();
        Self { cos, sin }
    }

    #[inline]
    pub fn rotate(self, x: f64, z: f64) -> DVec2 {
        DVec2::new(x * self.cos - z * self.sin, x * self.sin + z * self.cos)
    }

    #[inline]
    pub fn unrotate(self, x: f64, z: f64) -> DVec2 {
        DVec2::new(x * self.cos + z * self.sin, -x * self.sin + z * self.cos)
    }

    /// World position of a point given in a frame rooted at `origin`.
    #[inline]
    pub fn to_world(self, local: DVec3, origin: DVec3) -> DVec3 {
        let r = self.rotate(local.x, local.z);
        DVec3::new(origin.x + r.x, origin.y + local.y, origin.z + r.y)
    }

    /// Inverse of [`YawBasis::to_world`].
    #[inline]
    pub fn to_local(self, world: DVec3, origin: DVec3) -> DVec3 {
        let r = self.unrotate(world.x - origin.x, world.z - origin.z);
        DVec3::new(r.x, world.y - origin.y, r.y)
    }
}

const PACK_BIAS: i64 = 1 << 20;
const PACK_MASK: u64 = 0x1F_FFFF;

/// Pack a local cell into a single key (21 bits per axis, layout x|z|y).
#[inline]
pub(crate) fn pack_cell(p: IVec3) -> u64 {
    let x = ((p.x as i64 + PACK_BIAS) as u64) & PACK_MASK;
    let z = ((p.z as i64 + PACK_BIAS) as u64) & PACK_MASK;
    let y = ((p.y as i64 + PACK_BIAS) as u64) & PACK_MASK;
    (x << 42) | (z << 21) | y
}

/// Cell containing a world-space point.
#[inline]
pub fn cell_of(p: DVec3) -> IVec3 {
    p.floor().as_ivec3()
}
