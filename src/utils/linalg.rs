// src/utils/linalg.rs

use nalgebra::{Matrix3, Vector3};

/// Row matrix [[ax, ay, az], [bx, by, bz], [cx, cy, cz]] as a nalgebra matrix
pub fn lattice_matrix(lattice: &[[f64; 3]; 3]) -> Matrix3<f64> {
  Matrix3::from_fn(|i, j| lattice[i][j])
}

/// Convert fractional coordinates to Cartesian using lattice matrix
///
/// # Formula
/// ```text
/// Cartesian = Lattice^T × Fractional
/// ```
pub fn frac_to_cart(frac: [f64; 3], lattice: &[[f64; 3]; 3]) -> [f64; 3] {
  let cart_vec = lattice_matrix(lattice).transpose() * Vector3::from(frac);
  [cart_vec.x, cart_vec.y, cart_vec.z]
}

pub fn norm(v: [f64; 3]) -> f64 {
  Vector3::from(v).norm()
}

/// Angle between two vectors in degrees
pub fn angle_deg(u: [f64; 3], v: [f64; 3]) -> f64 {
  let (u, v) = (Vector3::from(u), Vector3::from(v));
  let denom = u.norm() * v.norm();
  if denom == 0.0 {
    return 0.0;
  }
  (u.dot(&v) / denom).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Lattice lengths (a, b, c)
pub fn lattice_abc(lattice: &[[f64; 3]; 3]) -> [f64; 3] {
  [norm(lattice[0]), norm(lattice[1]), norm(lattice[2])]
}

/// Lattice angles (alpha, beta, gamma) in degrees
pub fn lattice_angles(lattice: &[[f64; 3]; 3]) -> [f64; 3] {
  let [a, b, c] = *lattice;
  [angle_deg(b, c), angle_deg(a, c), angle_deg(a, b)]
}

/// Unsigned cell volume |det(L)|
pub fn cell_volume(lattice: &[[f64; 3]; 3]) -> f64 {
  lattice_matrix(lattice).determinant().abs()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_cubic_lattice() {
    let lattice = [[5.0, 0.0, 0.0], [0.0, 5.0, 0.0], [0.0, 0.0, 5.0]];
    let cart = frac_to_cart([0.5, 0.5, 0.5], &lattice);

    assert!((cart[0] - 2.5).abs() < 1e-10);
    assert!((cart[1] - 2.5).abs() < 1e-10);
    assert!((cart[2] - 2.5).abs() < 1e-10);
    assert!((cell_volume(&lattice) - 125.0).abs() < 1e-10);
  }

  #[test]
  fn test_oblique_lattice() {
    let lattice = [[4.0, 0.0, 0.0], [2.0, 3.46, 0.0], [0.0, 0.0, 5.0]];
    let cart = frac_to_cart([0.5, 0.5, 0.0], &lattice);
    assert!((cart[0] - 3.0).abs() < 1e-10);
    assert!((cart[1] - 1.73).abs() < 1e-10);

    let abc = lattice_abc(&lattice);
    assert!((abc[1] - (4.0 + 3.46f64 * 3.46).sqrt()).abs() < 1e-10);
    let [alpha, beta, gamma] = lattice_angles(&lattice);
    assert!((alpha - 90.0).abs() < 1e-10);
    assert!((beta - 90.0).abs() < 1e-10);
    assert!((gamma - 60.0).abs() < 0.1);
  }

  #[test]
  fn test_angles() {
    assert!((angle_deg([1.0, 0.0, 0.0], [0.0, 2.0, 0.0]) - 90.0).abs() < 1e-10);
    assert!((angle_deg([1.0, 0.0, 0.0], [0.5, 0.5 * 3f64.sqrt(), 0.0]) - 60.0).abs() < 1e-10);
    assert_eq!(angle_deg([0.0; 3], [1.0, 0.0, 0.0]), 0.0);
  }
}
