use crate::Vec3;

/// Orthonormal basis `(u, v, w)` built around a given `w` axis.
///
/// Used to carry directions sampled in a local frame (where `+Z` is the
/// surface normal or the axis toward a light) into world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Onb {
    axis: [Vec3; 3],
}

impl Onb {
    /// Build a basis whose `w` axis points along `n` (need not be unit length).
    pub fn from_w(n: Vec3) -> Self {
        let w = n.normalize();
        let a = if w.x.abs() > 0.9 { Vec3::Y } else { Vec3::X };
        let v = w.cross(a).normalize();
        let u = w.cross(v);
        Self { axis: [u, v, w] }
    }

    #[inline]
    pub fn u(&self) -> Vec3 {
        self.axis[0]
    }

    #[inline]
    pub fn v(&self) -> Vec3 {
        self.axis[1]
    }

    #[inline]
    pub fn w(&self) -> Vec3 {
        self.axis[2]
    }

    /// Transform local coordinates into world space.
    #[inline]
    pub fn local(&self, a: Vec3) -> Vec3 {
        a.x * self.u() + a.y * self.v() + a.z * self.w()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_basis_is_orthonormal() {
        for n in [
            Vec3::Y,
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(3.0, -4.0, 12.0),
            Vec3::new(-0.2, 0.1, -5.0),
        ] {
            let onb = Onb::from_w(n);

            assert!((onb.u().length() - 1.0).abs() < EPS);
            assert!((onb.v().length() - 1.0).abs() < EPS);
            assert!((onb.w().length() - 1.0).abs() < EPS);
            assert!(onb.u().dot(onb.v()).abs() < EPS);
            assert!(onb.v().dot(onb.w()).abs() < EPS);
            assert!(onb.w().dot(onb.u()).abs() < EPS);
            assert!((onb.w() - n.normalize()).length() < EPS);
        }
    }

    #[test]
    fn test_local_z_maps_to_w() {
        let n = Vec3::new(0.0, 2.0, 2.0);
        let onb = Onb::from_w(n);

        assert!((onb.local(Vec3::Z) - n.normalize()).length() < EPS);
    }
}
