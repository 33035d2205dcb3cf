use crate::core::models::connectivity::Connectivity;
use nalgebra::{DMatrix, Point3, Vector3};

/// Displacement `b - a`, folded into the nearest periodic image when a cell is given.
#[inline]
pub fn displacement(a: &Point3<f64>, b: &Point3<f64>, cell: Option<&Vector3<f64>>) -> Vector3<f64> {
    let mut d = b - a;
    if let Some(lengths) = cell {
        for k in 0..3 {
            d[k] -= lengths[k] * (d[k] / lengths[k]).round();
        }
    }
    d
}

pub fn pairwise_distances(positions: &[Point3<f64>], cell: Option<&Vector3<f64>>) -> DMatrix<f64> {
    let n = positions.len();
    let mut distances = DMatrix::zeros(n, n);
    for i in 0..n {
        for j in (i + 1)..n {
            let r = displacement(&positions[i], &positions[j], cell).norm();
            distances[(i, j)] = r;
            distances[(j, i)] = r;
        }
    }
    distances
}

/// Angle in radians at `vertex` between the bonds to `a` and `b`.
pub fn bond_angle(
    a: &Point3<f64>,
    vertex: &Point3<f64>,
    b: &Point3<f64>,
    cell: Option<&Vector3<f64>>,
) -> f64 {
    let u = displacement(vertex, a, cell);
    let v = displacement(vertex, b, cell);
    u.angle(&v)
}

/// One representative bond angle per molecule: the angle at the first atom (in index order)
/// that has at least two bonded neighbours, or 0 for molecules without such an atom.
pub fn molecule_bond_angles(
    positions: &[Point3<f64>],
    molecules: &[Vec<usize>],
    connectivity: &Connectivity,
    cell: Option<&Vector3<f64>>,
) -> Vec<f64> {
    molecules
        .iter()
        .map(|atoms| {
            atoms
                .iter()
                .find_map(|&vertex| {
                    let mut neighbors = connectivity.neighbors(vertex);
                    let a = neighbors.next()?;
                    let b = neighbors.next()?;
                    Some(bond_angle(&positions[a], &positions[vertex], &positions[b], cell))
                })
                .unwrap_or(0.0)
        })
        .collect()
}
