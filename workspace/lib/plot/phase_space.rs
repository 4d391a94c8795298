//! Filled-contour and surface renderings of quasi-probability distributions.

use ndarray as nd;
use plotters::{ coord::Shift, prelude::* };
use super::{ data_range, rdbu, Labels, PlotResult, FONT };

// n + 1 cell boundaries around n sample points
fn cell_edges(v: &[f64]) -> Vec<f64> {
    match v.len() {
        0 => Vec::new(),
        1 => vec![v[0] - 0.5, v[0] + 0.5],
        n => {
            let mut edges: Vec<f64> = Vec::with_capacity(n + 1);
            edges.push(v[0] - (v[1] - v[0]) / 2.0);
            edges.extend(v.windows(2).map(|w| (w[0] + w[1]) / 2.0));
            edges.push(v[n - 1] + (v[n - 1] - v[n - 2]) / 2.0);
            edges
        },
    }
}

// index of the discrete level holding `z`, in 0..levels
fn level(z: f64, (lo, hi): (f64, f64), levels: usize) -> usize {
    let t = (z - lo) / (hi - lo);
    ((t * levels as f64).floor().max(0.0) as usize).min(levels - 1)
}

fn level_color(k: usize, levels: usize) -> RGBColor {
    rdbu((k as f64 + 0.5) / levels as f64)
}

/// Draw `z` (shaped `(yvec.len(), xvec.len())`) as a filled-contour map with
/// `levels` discrete color levels and a color bar.
pub fn heatmap<DB>(
    area: &DrawingArea<DB, Shift>,
    labels: Labels,
    xvec: &[f64],
    yvec: &[f64],
    z: &nd::Array2<f64>,
    levels: usize,
) -> PlotResult<DB>
where DB: DrawingBackend
{
    let levels = levels.max(1);
    let zrange = data_range(z.iter().copied());
    let xe = cell_edges(xvec);
    let ye = cell_edges(yvec);
    if xe.is_empty() || ye.is_empty() { return Ok(()); }
    let (width, _) = area.dim_in_pixel();
    let (main, bar) = area.split_horizontally((width as i32 - 110).max(0));

    let mut chart
        = ChartBuilder::on(&main)
        .caption(labels.title, (FONT, 18))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(
            xe[0]..xe[xe.len() - 1],
            ye[0]..ye[ye.len() - 1],
        )?;
    chart.configure_mesh()
        .disable_mesh()
        .x_desc(labels.x)
        .y_desc(labels.y)
        .draw()?;
    chart.draw_series(
        z.indexed_iter()
        .filter(|((iy, ix), zyx)| {
            *iy < yvec.len() && *ix < xvec.len() && zyx.is_finite()
        })
        .map(|((iy, ix), zyx)| {
            let color = level_color(level(*zyx, zrange, levels), levels);
            Rectangle::new(
                [(xe[ix], ye[iy]), (xe[ix + 1], ye[iy + 1])],
                color.filled(),
            )
        })
    )?;

    let mut cbar
        = ChartBuilder::on(&bar)
        .margin_top(40)
        .margin_bottom(50)
        .margin_right(10)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..1.0, zrange.0..zrange.1)?;
    cbar.configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .draw()?;
    let dz = (zrange.1 - zrange.0) / levels as f64;
    cbar.draw_series(
        (0..levels).map(|k| {
            let z0 = zrange.0 + k as f64 * dz;
            Rectangle::new([(0.0, z0), (1.0, z0 + dz)], level_color(k, levels).filled())
        })
    )?;
    Ok(())
}

/// Draw `z` (shaped `(yvec.len(), xvec.len())`) as a 3D surface, with height
/// `z` along the vertical axis.
pub fn surface<DB>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    xvec: &[f64],
    yvec: &[f64],
    z: &nd::Array2<f64>,
) -> PlotResult<DB>
where DB: DrawingBackend
{
    let xr = data_range(xvec.iter().copied());
    let yr = data_range(yvec.iter().copied());
    let zr = data_range(z.iter().copied());
    let mut chart
        = ChartBuilder::on(area)
        .caption(title, (FONT, 18))
        .margin(20)
        .build_cartesian_3d(xr.0..xr.1, zr.0..zr.1, yr.0..yr.1)?;
    chart.with_projection(|mut pb| {
        pb.yaw = 0.7;
        pb.pitch = 0.45;
        pb.scale = 0.85;
        pb.into_matrix()
    });
    chart.configure_axes()
        .light_grid_style(BLACK.mix(0.1))
        .max_light_lines(3)
        .draw()?;

    let ny = z.nrows().min(yvec.len());
    let nx = z.ncols().min(xvec.len());
    let zspan = zr.1 - zr.0;
    // far rows first so that nearer facets are painted over them
    let facets
        = (0..ny.saturating_sub(1)).rev()
        .flat_map(|iy| (0..nx.saturating_sub(1)).map(move |ix| (iy, ix)))
        .filter_map(|(iy, ix)| {
            let corners = [
                z[[iy, ix]], z[[iy, ix + 1]], z[[iy + 1, ix + 1]], z[[iy + 1, ix]],
            ];
            if corners.iter().any(|c| !c.is_finite()) { return None; }
            let mean = corners.iter().sum::<f64>() / 4.0;
            let color = rdbu((mean - zr.0) / zspan);
            Some(Polygon::new(
                vec![
                    (xvec[ix], corners[0], yvec[iy]),
                    (xvec[ix + 1], corners[1], yvec[iy]),
                    (xvec[ix + 1], corners[2], yvec[iy + 1]),
                    (xvec[ix], corners[3], yvec[iy + 1]),
                ],
                color.mix(0.9).filled(),
            ))
        });
    chart.draw_series(facets)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::plot::{ split_panels, Layout };

    #[test]
    fn cells_and_levels() {
        assert_eq!(cell_edges(&[0.0, 1.0, 3.0]), vec![-0.5, 0.5, 2.0, 4.0]);
        assert_eq!(cell_edges(&[2.0]), vec![1.5, 2.5]);
        assert_eq!(level(-1.0, (-1.0, 1.0), 10), 0);
        assert_eq!(level(1.0, (-1.0, 1.0), 10), 9);
        assert_eq!(level(0.05, (-1.0, 1.0), 10), 5);
    }

    #[test]
    fn phase_space_renders() {
        let x: Vec<f64> = (0..11).map(|k| -1.0 + 0.2 * k as f64).collect();
        let y: Vec<f64> = x[..7].to_vec();
        let z = nd::Array2::from_shape_fn((y.len(), x.len()), |(iy, ix)| {
            (-(x[ix].powi(2) + y[iy].powi(2))).exp()
        });
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (900, 400))
                .into_drawing_area();
            let panels = split_panels(&root, Layout::Row, 2);
            let labels = Labels { title: "flat map", x: "Re[α]", y: "Im[α]" };
            heatmap(&panels[0], labels, &x, &y, &z, 20).unwrap();
            surface(&panels[1], "surface map", &x, &y, &z).unwrap();
            root.present().unwrap();
        }
        assert!(svg.contains("flat map"));
        assert!(svg.contains("surface map"));
        assert!(svg.contains("<rect"));
        assert!(svg.contains("<polygon"));
    }
}
