// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
/// CSV output of the Euler family results
use crate::numerical::Euler_comparison::{ComparisonReport, SingleMethodReport};
use csv::Writer;
use nalgebra::{DMatrix, DVector};
use std::error::Error;
use std::fs::File;

/// writes x_mesh as the first column named `arg`, then one column per matrix column
pub fn save_matrix_to_csv(
    matrix: &DMatrix<f64>,
    headers: &[String],
    filename: &str,
    x_mesh: &DVector<f64>,
    arg: &str,
) -> Result<(), Box<dyn Error>> {
    if matrix.nrows() != x_mesh.len() || matrix.ncols() != headers.len() {
        return Err(format!(
            "cannot save {}x{} matrix with {} headers on a mesh of {} points",
            matrix.nrows(),
            matrix.ncols(),
            headers.len(),
            x_mesh.len()
        )
        .into());
    }
    let file = File::create(filename)?;
    let mut writer = Writer::from_writer(file);

    let mut headers_with_x = vec![arg.to_string()];
    headers_with_x.extend(headers.iter().cloned());
    writer.write_record(&headers_with_x)?;

    for (i, row) in matrix.row_iter().enumerate() {
        let mut row_data = vec![x_mesh[i].to_string()];
        row_data.extend(row.iter().map(|val| val.to_string()));
        writer.write_record(&row_data)?;
    }

    writer.flush()?;
    Ok(())
}

fn columns_to_matrix(columns: &[&DVector<f64>], nrows: usize) -> DMatrix<f64> {
    DMatrix::from_fn(nrows, columns.len(), |i, j| columns[j][i])
}

/// x | y of every successful method | reference | error of every method
pub fn save_report_to_csv(report: &ComparisonReport, filename: &str) -> Result<(), Box<dyn Error>> {
    let x_mesh = report.grid.nodes();
    let mut headers = Vec::new();
    let mut columns = Vec::new();
    for (method, trajectory) in report.trajectories.iter() {
        if let Ok(t) = trajectory {
            headers.push(method.to_string());
            columns.push(t.y());
        }
    }
    if let Ok(reference) = &report.reference {
        headers.push(reference.source().to_string());
        columns.push(reference.y());
    }
    for (method, series) in report.errors.iter() {
        headers.push(format!("{} Error", method));
        columns.push(series.error());
    }
    let matrix = columns_to_matrix(&columns, x_mesh.len());
    save_matrix_to_csv(&matrix, &headers, filename, &x_mesh, "x")
}

/// x | y | exact | absolute error (the last two only when the exact solution is known)
pub fn save_single_to_csv(report: &SingleMethodReport, filename: &str) -> Result<(), Box<dyn Error>> {
    let x_mesh = report.trajectory.x();
    let mut headers = vec![report.trajectory.method().to_string()];
    let mut columns = vec![report.trajectory.y()];
    if let (Some(exact), Some(errors)) = (&report.exact, &report.errors) {
        headers.push("Exact".to_string());
        columns.push(exact.y());
        headers.push("Absolute Error".to_string());
        columns.push(errors.error());
    }
    let matrix = columns_to_matrix(&columns, x_mesh.len());
    save_matrix_to_csv(&matrix, &headers, filename, x_mesh, "x")
}
