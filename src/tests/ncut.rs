use super::macros::*;
use crate::ncut::*;
use crate::record::MalformedInput;
use nalgebra::DMatrix;

#[test]
fn one_hot_rows() {
    let discrete = DMatrix::from_row_slice(3, 3, &[0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
    assert_eq!(assignment_to_ids(&discrete, 3, 3), Ok(vec![1, 0, 2]));
}

#[test]
fn bad_rows() {
    let doubled = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 1.0, 1.0]);
    assert_eq!(
        assignment_to_ids(&doubled, 2, 2),
        Err(MalformedInput::AssignmentRow { row: 1, nonzero: 2 }.into())
    );
    let empty = DMatrix::from_row_slice(2, 2, &[0.0, 0.0, 0.0, 1.0]);
    assert_eq!(
        assignment_to_ids(&empty, 2, 2),
        Err(MalformedInput::AssignmentRow { row: 0, nonzero: 0 }.into())
    );
    let scaled = DMatrix::from_row_slice(1, 2, &[0.0, 2.0]);
    assert_eq!(
        assignment_to_ids(&scaled, 1, 2),
        Err(MalformedInput::AssignmentRow { row: 0, nonzero: 1 }.into())
    );
}

#[test]
fn bad_inputs() {
    let adj = DMatrix::<f64>::zeros(2, 3);
    assert_eq!(
        compute_ncut(&adj, 1),
        Err(MalformedInput::NotSquare { rows: 2, cols: 3 }.into())
    );
    let adj = DMatrix::<f64>::identity(3, 3);
    assert_eq!(
        compute_ncut(&adj, 0),
        Err(MalformedInput::ClusterCount {
            clusters: 0,
            nodes: 3
        }
        .into())
    );
    assert_eq!(
        compute_ncut(&adj, 4),
        Err(MalformedInput::ClusterCount {
            clusters: 4,
            nodes: 3
        }
        .into())
    );
}

/// Always answers with the same assignment
struct Fixed(DMatrix<f64>);
impl SpectralOracle for Fixed {
    fn eigenvectors(
        &self,
        adj: &DMatrix<f64>,
        clusters: usize,
    ) -> Result<DMatrix<f64>, NcutError> {
        Ok(DMatrix::zeros(adj.nrows(), clusters))
    }
    fn discretise(&self, _eigenvectors: &DMatrix<f64>) -> Result<DMatrix<f64>, NcutError> {
        Ok(self.0.clone())
    }
}

#[test]
fn oracle_output_checked() {
    let adj = DMatrix::<f64>::identity(2, 2);
    let good = Fixed(DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 1.0, 0.0]));
    assert_eq!(compute_ncut_with(&good, &adj, 2), Ok(vec![1, 0]));
    let bad = Fixed(DMatrix::from_row_slice(2, 2, &[0.5, 0.5, 1.0, 0.0]));
    assert_eq!(
        compute_ncut_with(&bad, &adj, 2),
        Err(MalformedInput::AssignmentRow { row: 0, nonzero: 2 }.into())
    );
    let narrow = Fixed(DMatrix::from_row_slice(2, 1, &[1.0, 1.0]));
    assert!(matches!(
        compute_ncut_with(&narrow, &adj, 2),
        Err(NcutError::Malformed(MalformedInput::Length { .. }))
    ));

    let adj = DMatrix::<f64>::identity(3, 3);
    let short = Fixed(DMatrix::from_row_slice(1, 2, &[1.0, 0.0]));
    assert_eq!(
        compute_ncut_with(&short, &adj, 2),
        Err(MalformedInput::Length {
            what: "assignment matrix",
            expected: 3,
            found: 1
        }
        .into())
    );
}

#[test]
fn two_triangles() {
    trace_capture!();
    // two triangles joined by a weak edge between nodes 2 and 3
    let mut adj = DMatrix::<f64>::zeros(6, 6);
    for (a, b, w) in [
        (0, 1, 1.0),
        (0, 2, 1.0),
        (1, 2, 1.0),
        (3, 4, 1.0),
        (3, 5, 1.0),
        (4, 5, 1.0),
        (2, 3, 0.01),
    ] {
        adj[(a, b)] = w;
        adj[(b, a)] = w;
    }
    let ids = compute_ncut(&adj, 2).unwrap();
    assert_eq!(ids.len(), 6);
    assert!(ids.iter().all(|&id| id < 2));
    assert_eq!(ids[0], ids[1]);
    assert_eq!(ids[0], ids[2]);
    assert_eq!(ids[3], ids[4]);
    assert_eq!(ids[3], ids[5]);
    assert_ne!(ids[0], ids[3]);
}

#[test]
fn single_cluster() {
    let adj = DMatrix::from_element(4, 4, 1.0);
    assert_eq!(compute_ncut(&adj, 1), Ok(vec![0; 4]));
}
