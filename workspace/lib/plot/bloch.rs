//! Bloch-sphere rendering of a single qubit state.

use std::f64::consts::TAU;
use plotters::{ coord::Shift, prelude::* };
use super::{ PlotResult, FONT };

const RES: usize = 72;

// Bloch (x, y, z) to chart coordinates, with z vertical
fn to_chart([x, y, z]: [f64; 3]) -> (f64, f64, f64) { (x, z, y) }

fn circle<F>(f: F) -> impl Iterator<Item = (f64, f64, f64)>
where F: Fn(f64) -> [f64; 3]
{
    (0..=RES).map(move |k| to_chart(f(TAU * k as f64 / RES as f64)))
}

/// Draw a Bloch sphere with `vector` as the current state and `trace` as the
/// sequence of earlier Bloch vectors.
pub fn bloch_sphere<DB>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    vector: [f64; 3],
    trace: &[[f64; 3]],
) -> PlotResult<DB>
where DB: DrawingBackend
{
    let r = -1.2..1.2;
    let mut chart
        = ChartBuilder::on(area)
        .caption(title, (FONT, 18))
        .margin(10)
        .build_cartesian_3d(r.clone(), r.clone(), r)?;
    chart.with_projection(|mut pb| {
        pb.yaw = 0.6;
        pb.pitch = 0.25;
        pb.scale = 0.9;
        pb.into_matrix()
    });

    let wire = BLACK.mix(0.25);
    let frame = [
        circle(|p| [p.cos(), p.sin(), 0.0]).collect::<Vec<_>>(),
        circle(|p| [p.cos(), 0.0, p.sin()]).collect(),
        circle(|p| [0.0, p.cos(), p.sin()]).collect(),
    ];
    for ring in frame {
        chart.draw_series(LineSeries::new(ring, wire))?;
    }
    for axis in [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]] {
        let neg = axis.map(|a: f64| -a);
        chart.draw_series(LineSeries::new([to_chart(neg), to_chart(axis)], wire))?;
    }
    let labels = [
        ("x", [1.15, 0.0, 0.0]),
        ("y", [0.0, 1.15, 0.0]),
        ("|0⟩", [0.0, 0.0, 1.15]),
        ("|1⟩", [0.0, 0.0, -1.2]),
    ];
    chart.draw_series(
        labels.iter()
        .map(|(text, at)| Text::new(*text, to_chart(*at), (FONT, 14)))
    )?;

    chart.draw_series(
        trace.iter()
        .map(|b| Circle::new(to_chart(*b), 2, BLUE.mix(0.6).filled()))
    )?;
    let tip = to_chart(vector);
    chart.draw_series(LineSeries::new([(0.0, 0.0, 0.0), tip], RED.stroke_width(3)))?;
    chart.draw_series(std::iter::once(Circle::new(tip, 4, RED.filled())))?;
    Ok(())
}
