use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectivityError {
    #[error("Atom {0} cannot be bonded to itself")]
    SelfBond(usize),
    #[error("Bond ({0}, {1}) references an atom outside 0..{2}")]
    AtomOutOfRange(usize, usize, usize),
    #[error("Connectivity matrix must be square with {expected} rows, got a row of length {found}")]
    NotSquare { expected: usize, found: usize },
    #[error("Connectivity matrix entry ({0}, {1}) lies on or below the diagonal")]
    NotUpperTriangular(usize, usize),
}

/// The bonded relation over the atoms of an ensemble.
///
/// Each unordered bonded pair is stored exactly once as `(i, j)` with `i < j`, in ascending
/// order, which is the order bond-length series are reported in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Connectivity {
    num_atoms: usize,
    bonds: Vec<(usize, usize)>,
}

impl Connectivity {
    pub fn empty(num_atoms: usize) -> Self {
        Self {
            num_atoms,
            bonds: Vec::new(),
        }
    }

    pub fn from_pairs(
        num_atoms: usize,
        pairs: impl IntoIterator<Item = (usize, usize)>,
    ) -> Result<Self, ConnectivityError> {
        let mut bonds = Vec::new();
        for (a, b) in pairs {
            if a == b {
                return Err(ConnectivityError::SelfBond(a));
            }
            if a >= num_atoms || b >= num_atoms {
                return Err(ConnectivityError::AtomOutOfRange(a, b, num_atoms));
            }
            bonds.push((a.min(b), a.max(b)));
        }
        bonds.sort_unstable();
        bonds.dedup();
        Ok(Self { num_atoms, bonds })
    }

    /// Builds the relation from a boolean upper-triangular matrix.
    pub fn from_matrix(matrix: &[Vec<bool>]) -> Result<Self, ConnectivityError> {
        let n = matrix.len();
        let mut bonds = Vec::new();
        for (i, row) in matrix.iter().enumerate() {
            if row.len() != n {
                return Err(ConnectivityError::NotSquare {
                    expected: n,
                    found: row.len(),
                });
            }
            for (j, &bonded) in row.iter().enumerate() {
                if !bonded {
                    continue;
                }
                if j <= i {
                    return Err(ConnectivityError::NotUpperTriangular(i, j));
                }
                bonds.push((i, j));
            }
        }
        Ok(Self {
            num_atoms: n,
            bonds,
        })
    }

    pub fn num_atoms(&self) -> usize {
        self.num_atoms
    }

    pub fn bonds(&self) -> &[(usize, usize)] {
        &self.bonds
    }

    pub fn num_bonds(&self) -> usize {
        self.bonds.len()
    }

    pub fn are_bonded(&self, a: usize, b: usize) -> bool {
        self.bonds.binary_search(&(a.min(b), a.max(b))).is_ok()
    }

    pub fn neighbors(&self, atom: usize) -> impl Iterator<Item = usize> + '_ {
        self.bonds.iter().filter_map(move |&(a, b)| {
            if a == atom {
                Some(b)
            } else if b == atom {
                Some(a)
            } else {
                None
            }
        })
    }

    pub fn to_matrix(&self) -> Vec<Vec<bool>> {
        let mut matrix = vec![vec![false; self.num_atoms]; self.num_atoms];
        for &(a, b) in &self.bonds {
            matrix[a][b] = true;
        }
        matrix
    }
}
