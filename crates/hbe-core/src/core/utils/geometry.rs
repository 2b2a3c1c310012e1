use nalgebra::{Point3, Rotation3, Unit, Vector3};

/// Half of the ideal tetrahedral angle, in degrees.
const HALF_TETRAHEDRAL_ANGLE: f64 = 109.5 / 2.0;

/// Squared Euclidean distance between two points.
pub fn distance_squared(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    (a - b).norm_squared()
}

/// Places the hydrogens that complete a tetrahedral centre at `base_pos`.
///
/// One neighbour yields three hydrogens, two neighbours yield two and three neighbours
/// yield one. Any other neighbour count yields no hydrogens.
pub fn generate_sp3_hydrogens(
    base_pos: &Point3<f64>,
    neighbors: &[Point3<f64>],
    bond_length: f64,
) -> Vec<Point3<f64>> {
    let neighbor_vecs: Vec<Vector3<f64>> = neighbors
        .iter()
        .map(|p| (p - base_pos).normalize())
        .collect();

    match neighbor_vecs.as_slice() {
        [n1] => {
            let n1 = *n1;
            let mut temp_vec = if n1.x.abs() < 0.9 {
                Vector3::x()
            } else {
                Vector3::y()
            };
            temp_vec = (temp_vec - n1 * n1.dot(&temp_vec)).normalize();

            let rot_axis = Unit::new_normalize(n1);
            let rot = Rotation3::from_axis_angle(&rot_axis, 120.0f64.to_radians());

            let h1_dir = Rotation3::from_axis_angle(
                &Unit::new_normalize(n1.cross(&temp_vec)),
                109.5f64.to_radians(),
            ) * n1;
            let h1 = base_pos + h1_dir.normalize() * bond_length;
            let h2 = base_pos + (rot * (h1 - base_pos));
            let h3 = base_pos + (rot * (h2 - base_pos));
            vec![h1, h2, h3]
        }
        [n1, n2] => {
            let bisector = (n1 + n2).normalize();
            let normal = n1.cross(n2).normalize();
            let half = HALF_TETRAHEDRAL_ANGLE.to_radians();

            let h1_dir = -bisector * half.cos() + normal * half.sin();
            let h2_dir = -bisector * half.cos() - normal * half.sin();
            vec![
                base_pos + h1_dir.normalize() * bond_length,
                base_pos + h2_dir.normalize() * bond_length,
            ]
        }
        [n1, n2, n3] => {
            let h_dir = -(n1 + n2 + n3).normalize();
            vec![base_pos + h_dir * bond_length]
        }
        _ => Vec::new(),
    }
}

/// Places the second oxygen of a carboxyl group bonded to `c_pos`.
///
/// The new atom lies in the CA–C–O plane, on the far side of the bisector of the
/// existing C–CA and C–O bonds.
pub fn calculate_carboxyl_oxygen(
    c_pos: &Point3<f64>,
    ca_pos: &Point3<f64>,
    o_pos: &Point3<f64>,
    bond_length: f64,
) -> Point3<f64> {
    let c_ca = (ca_pos - c_pos).normalize();
    let c_o = (o_pos - c_pos).normalize();
    let direction = -(c_ca + c_o).normalize();
    c_pos + direction * bond_length
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn angle_between(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
        a.angle(b).to_degrees()
    }

    #[test]
    fn distance_squared_matches_manual_computation() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 2.0, 2.0);
        assert!((distance_squared(&a, &b) - 9.0).abs() < TOLERANCE);
    }

    #[test]
    fn one_neighbor_yields_three_hydrogens_at_bond_length() {
        let base = Point3::new(0.0, 0.0, 0.0);
        let neighbor = Point3::new(1.5, 0.0, 0.0);
        let hydrogens = generate_sp3_hydrogens(&base, &[neighbor], 1.01);

        assert_eq!(hydrogens.len(), 3);
        for h in &hydrogens {
            assert!(((h - base).norm() - 1.01).abs() < 1e-6);
            let angle = angle_between(&(h - base), &(neighbor - base));
            assert!((angle - 109.5).abs() < 1e-6);
        }
    }

    #[test]
    fn two_neighbors_yield_two_hydrogens_away_from_neighbors() {
        let base = Point3::new(0.0, 0.0, 0.0);
        let n1 = Point3::new(1.47, 0.0, 0.0);
        let n2 = Point3::new(-0.5, 1.4, 0.0);
        let hydrogens = generate_sp3_hydrogens(&base, &[n1, n2], 1.01);

        assert_eq!(hydrogens.len(), 2);
        let bisector = ((n1 - base).normalize() + (n2 - base).normalize()).normalize();
        for h in &hydrogens {
            assert!(((h - base).norm() - 1.01).abs() < 1e-6);
            assert!((h - base).dot(&bisector) < 0.0);
        }
        let between = angle_between(&(hydrogens[0] - base), &(hydrogens[1] - base));
        assert!((between - 109.5).abs() < 1e-6);
    }

    #[test]
    fn unsupported_neighbor_count_yields_no_hydrogens() {
        let base = Point3::origin();
        assert!(generate_sp3_hydrogens(&base, &[], 1.0).is_empty());
    }

    #[test]
    fn carboxyl_oxygen_lies_in_plane_at_bond_length() {
        let c = Point3::new(0.0, 0.0, 0.0);
        let ca = Point3::new(-1.0, 1.2, 0.0);
        let o = Point3::new(1.2, 0.7, 0.0);
        let ot2 = calculate_carboxyl_oxygen(&c, &ca, &o, 1.25);

        assert!(((ot2 - c).norm() - 1.25).abs() < 1e-9);
        assert!(ot2.z.abs() < 1e-9);
        assert!(distance_squared(&ot2, &o) > 1.0);
        assert!(distance_squared(&ot2, &ca) > 1.0);
    }
}
