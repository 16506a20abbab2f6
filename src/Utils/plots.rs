// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
/// PNG plots of the Euler family results
use crate::numerical::Euler_comparison::{ComparisonReport, ReferenceSource, SingleMethodReport};
use crate::numerical::Euler_family::EulerMethod;
use itertools::{Itertools, MinMaxResult};
use plotters::prelude::*;
use std::error::Error;

/// zero errors cannot be drawn on a logarithmic axis
pub const LOG_FLOOR: f64 = 1e-16;

/// [min, max] of the finite values with a 5% margin; a flat series gets a unit window
pub fn axis_range<'a>(values: impl Iterator<Item = &'a f64>) -> (f64, f64) {
    let (lo, hi) = match values
        .copied()
        .filter(|v| v.is_finite())
        .minmax_by(|a, b| a.total_cmp(b))
    {
        MinMaxResult::NoElements => return (0.0, 1.0),
        MinMaxResult::OneElement(v) => (v, v),
        MinMaxResult::MinMax(lo, hi) => (lo, hi),
    };
    if hi - lo < f64::EPSILON * hi.abs().max(1.0) {
        return (lo - 0.5, hi + 0.5);
    }
    let margin = 0.05 * (hi - lo);
    (lo - margin, hi + margin)
}

fn log_error(e: f64) -> f64 {
    e.max(LOG_FLOOR).log10()
}

/// y of every successful method against x, reference curve in black
pub fn plot_solutions(report: &ComparisonReport, filename: &str) -> Result<(), Box<dyn Error>> {
    let x = report.grid.nodes();
    let mut all_y: Vec<f64> = report
        .trajectories
        .values()
        .filter_map(|t| t.as_ref().ok())
        .flat_map(|t| t.y().iter().copied())
        .collect();
    if let Ok(reference) = &report.reference {
        all_y.extend(reference.y().iter());
    }
    let (x_min, x_max) = axis_range(x.iter());
    let (y_min, y_max) = axis_range(all_y.iter());

    let root_area = BitMapBackend::new(filename, (1000, 700)).into_drawing_area();
    root_area.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root_area)
        .caption("Euler family solutions", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;
    chart.configure_mesh().x_desc("x").y_desc("y").draw()?;

    for (col, (method, trajectory)) in report.trajectories.iter().enumerate() {
        let Ok(trajectory) = trajectory else { continue };
        let style = Palette99::pick(col).stroke_width(2);
        chart
            .draw_series(LineSeries::new(trajectory.points(), style))?
            .label(method.to_string())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], Palette99::pick(col).stroke_width(2))
            });
        chart.draw_series(
            trajectory
                .points()
                .map(|p| Circle::new(p, 3, Palette99::pick(col).filled())),
        )?;
    }
    if let Ok(reference) = &report.reference {
        let points: Vec<(f64, f64)> = reference
            .x()
            .iter()
            .copied()
            .zip(reference.y().iter().copied())
            .collect();
        chart
            .draw_series(LineSeries::new(points, BLACK.stroke_width(3)))?
            .label(reference.source().to_string())
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK.stroke_width(3)));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root_area.present()?;
    Ok(())
}

/// absolute error of every method; with `log_scale` the axis shows log10 of the error.
/// AIME is left out when it is itself the reference.
pub fn plot_errors(
    report: &ComparisonReport,
    filename: &str,
    log_scale: bool,
) -> Result<(), Box<dyn Error>> {
    let reference_is_aime = matches!(
        &report.reference,
        Ok(r) if r.source() == ReferenceSource::AIME
    );
    let transform = |e: f64| if log_scale { log_error(e) } else { e };
    let series: Vec<(String, Vec<(f64, f64)>)> = report
        .errors
        .iter()
        .filter(|(method, _)| {
            !(reference_is_aime && **method == EulerMethod::AIME)
        })
        .map(|(method, s)| {
            let points = s
                .x()
                .iter()
                .zip(s.error().iter())
                .map(|(x, e)| (*x, transform(*e)))
                .collect();
            (method.to_string(), points)
        })
        .collect();
    if series.is_empty() {
        return Err("no error series to plot".into());
    }
    let (x_min, x_max) = axis_range(report.grid.nodes().iter());
    let all_errors: Vec<f64> = series.iter().flat_map(|(_, p)| p.iter().map(|(_, e)| *e)).collect();
    let (y_min, y_max) = axis_range(all_errors.iter());
    let y_desc = if log_scale {
        "log10(Absolute Error)"
    } else {
        "Absolute Error"
    };

    let root_area = BitMapBackend::new(filename, (1000, 700)).into_drawing_area();
    root_area.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root_area)
        .caption("Absolute errors", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;
    chart.configure_mesh().x_desc("x").y_desc(y_desc).draw()?;

    for (col, (name, points)) in series.into_iter().enumerate() {
        chart
            .draw_series(LineSeries::new(points, Palette99::pick(col).stroke_width(2)))?
            .label(name)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], Palette99::pick(col).stroke_width(2))
            });
    }
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root_area.present()?;
    Ok(())
}

/// numerical and exact solution of one method
pub fn plot_single(report: &SingleMethodReport, filename: &str) -> Result<(), Box<dyn Error>> {
    let trajectory = &report.trajectory;
    let mut all_y: Vec<f64> = trajectory.y().iter().copied().collect();
    if let Some(exact) = &report.exact {
        all_y.extend(exact.y().iter());
    }
    let (x_min, x_max) = axis_range(trajectory.x().iter());
    let (y_min, y_max) = axis_range(all_y.iter());

    let root_area = BitMapBackend::new(filename, (1000, 700)).into_drawing_area();
    root_area.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root_area)
        .caption(trajectory.method().to_string(), ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;
    chart.configure_mesh().x_desc("x").y_desc("y").draw()?;

    chart
        .draw_series(LineSeries::new(trajectory.points(), BLUE.stroke_width(2)))?
        .label(trajectory.method().to_string())
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));
    if let Some(exact) = &report.exact {
        let points: Vec<(f64, f64)> = exact
            .x()
            .iter()
            .copied()
            .zip(exact.y().iter().copied())
            .collect();
        chart
            .draw_series(LineSeries::new(points, BLACK.stroke_width(2)))?
            .label("Exact Solution")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK.stroke_width(2)));
    }
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root_area.present()?;
    Ok(())
}
