//! Static Chart Renderer
//! Paints a `ChartFigure` into an RGB pixel buffer with plotters.
//!
//! Encodings:
//! 1. Line: one polyline per series over the date axis
//! 2. Grouped bar: one bar per series inside each category slot
//! 3. Radar: fixed axes, concentric rings, one filled polygon per series
//! 4. Heatmap: unit cells shaded by value

use crate::charts::policy::{AxisBounds, ChartFigure, Encoding, Rgb, PINK};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{FontDesc, FontFamily, FontStyle};
use std::f64::consts::{FRAC_PI_2, TAU};

const GRID: RGBColor = RGBColor(200, 200, 200);

fn title_font() -> FontDesc<'static> {
    FontDesc::new(FontFamily::SansSerif, 20.0, FontStyle::Normal)
}

type DrawResult = Result<(), Box<dyn std::error::Error>>;

pub struct FigureRenderer;

impl FigureRenderer {
    /// Paint `figure` into `buffer`, which must hold `width * height * 3` bytes.
    pub fn draw(buffer: &mut [u8], size: (u32, u32), figure: &ChartFigure) -> DrawResult {
        let root = BitMapBackend::with_buffer(buffer, size).into_drawing_area();
        root.fill(&WHITE)?;

        match figure.encoding {
            Encoding::Line => Self::draw_line(&root, figure)?,
            Encoding::GroupedBar => Self::draw_grouped_bar(&root, figure)?,
            Encoding::Radar => Self::draw_radar(&root, figure)?,
            Encoding::Heatmap => Self::draw_heatmap(&root, figure)?,
        }

        root.present()?;
        Ok(())
    }

    fn draw_line<DB>(root: &DrawingArea<DB, Shift>, figure: &ChartFigure) -> DrawResult
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let n = figure.categories.len();
        let x_max = n.saturating_sub(1).max(1) as f64;

        let mut chart = ChartBuilder::on(root)
            .caption(figure.title, title_font())
            .margin(12)
            .x_label_area_size(32)
            .y_label_area_size(40)
            .build_cartesian_2d(0f64..x_max, figure.bounds.min..figure.bounds.max)?;

        let categories = &figure.categories;
        let x_fmt = |x: &f64| Self::category_label(categories, *x);
        chart
            .configure_mesh()
            .x_labels(n.clamp(2, 8))
            .x_label_formatter(&x_fmt)
            .draw()?;

        for series in &figure.series {
            let color = Self::rgb(series.color);
            let points: Vec<(f64, f64)> = series
                .values
                .iter()
                .enumerate()
                .filter_map(|(i, v)| v.map(|v| (i as f64, v)))
                .collect();

            chart
                .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))?
                .label(series.label.clone())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            chart.draw_series(points.into_iter().map(|p| Circle::new(p, 3, color.filled())))?;
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
        Ok(())
    }

    fn draw_grouped_bar<DB>(root: &DrawingArea<DB, Shift>, figure: &ChartFigure) -> DrawResult
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let n = figure.categories.len().max(1);
        let groups = figure.series.len().max(1);
        let bounds = figure.bounds;
        let slot = 0.8 / groups as f64;

        let mut chart = ChartBuilder::on(root)
            .caption(figure.title, title_font())
            .margin(12)
            .x_label_area_size(32)
            .y_label_area_size(40)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), bounds.min..bounds.max)?;

        let categories = &figure.categories;
        let x_fmt = |x: &f64| Self::category_label(categories, *x);
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n + 1)
            .x_label_formatter(&x_fmt)
            .draw()?;

        for (j, series) in figure.series.iter().enumerate() {
            let color = Self::rgb(series.color);
            let offset = -0.4 + j as f64 * slot;
            let bars = series
                .values
                .iter()
                .enumerate()
                .filter_map(|(i, v)| v.map(|v| (i, v.clamp(bounds.min, bounds.max))))
                .map(|(i, v)| {
                    let x0 = i as f64 + offset;
                    Rectangle::new(
                        [(x0, bounds.min), (x0 + slot * 0.9, v)],
                        color.mix(0.6).filled(),
                    )
                });

            chart
                .draw_series(bars)?
                .label(series.label.clone())
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled())
                });
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
        Ok(())
    }

    fn draw_radar<DB>(root: &DrawingArea<DB, Shift>, figure: &ChartFigure) -> DrawResult
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let area = root.titled(figure.title, title_font())?;
        let axes = figure.categories.len();
        if axes < 3 {
            return Ok(());
        }

        let (w, h) = area.dim_in_pixel();
        let center = (w as i32 / 2, h as i32 / 2);
        let radius = (w.min(h) as f64 / 2.0 - 40.0).max(10.0);
        let bounds = figure.bounds;

        // rings at every fifth of the range
        for step in 1..=5 {
            let level = bounds.min + (bounds.max - bounds.min) * step as f64 / 5.0;
            let mut ring = radar_vertices(center, radius, bounds, &vec![Some(level); axes]);
            ring.push(ring[0]);
            area.draw(&PathElement::new(ring, GRID))?;
        }

        let outer = radar_vertices(center, radius, bounds, &vec![Some(bounds.max); axes]);
        for (label, &vertex) in figure.categories.iter().zip(&outer) {
            area.draw(&PathElement::new(vec![center, vertex], GRID))?;
            let dx = if vertex.0 < center.0 - 5 { -60 } else { 6 };
            area.draw(&Text::new(
                label.clone(),
                (vertex.0 + dx, vertex.1 - 8),
                FontDesc::new(FontFamily::SansSerif, 14.0, FontStyle::Normal),
            ))?;
        }

        for series in &figure.series {
            let color = Self::rgb(series.color);
            let shape = radar_vertices(center, radius, bounds, &series.values);
            area.draw(&Polygon::new(shape.clone(), color.mix(0.2).filled()))?;

            let mut outline = shape.clone();
            outline.push(shape[0]);
            area.draw(&PathElement::new(outline, color.stroke_width(2)))?;
            for vertex in shape {
                area.draw(&Circle::new(vertex, 3, color.filled()))?;
            }
        }
        Ok(())
    }

    fn draw_heatmap<DB>(root: &DrawingArea<DB, Shift>, figure: &ChartFigure) -> DrawResult
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let (x_min, x_max) = extent(figure.cells.iter().map(|c| c.x));
        let (y_min, y_max) = extent(figure.cells.iter().map(|c| c.y));

        let mut chart = ChartBuilder::on(root)
            .caption(figure.title, title_font())
            .margin(12)
            .x_label_area_size(32)
            .y_label_area_size(40)
            .build_cartesian_2d(x_min..(x_max + 1.0), y_min..(y_max + 1.0))?;

        chart.configure_mesh().disable_mesh().draw()?;

        let base = Self::rgb(PINK);
        let bounds = figure.bounds;
        chart.draw_series(figure.cells.iter().map(|cell| {
            let t = normalized(cell.value, bounds);
            Rectangle::new(
                [(cell.x, cell.y), (cell.x + 1.0, cell.y + 1.0)],
                base.mix(0.15 + 0.85 * t).filled(),
            )
        }))?;
        Ok(())
    }

    fn category_label(categories: &[String], x: f64) -> String {
        let idx = x.round();
        if (x - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        categories.get(idx as usize).cloned().unwrap_or_default()
    }

    fn rgb((r, g, b): Rgb) -> RGBColor {
        RGBColor(r, g, b)
    }
}

fn normalized(value: f64, bounds: AxisBounds) -> f64 {
    let span = bounds.max - bounds.min;
    if span <= 0.0 {
        return 0.0;
    }
    ((value - bounds.min) / span).clamp(0.0, 1.0)
}

fn extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if lo.is_finite() {
        (lo, hi)
    } else {
        (0.0, 0.0)
    }
}

/// Pixel positions of one radar polygon. Axis 0 points straight up and the
/// rest follow clockwise; missing values sit at the center.
pub(crate) fn radar_vertices(
    center: (i32, i32),
    radius: f64,
    bounds: AxisBounds,
    values: &[Option<f64>],
) -> Vec<(i32, i32)> {
    let n = values.len().max(1);
    values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let t = value.map(|v| normalized(v, bounds)).unwrap_or(0.0);
            let angle = -FRAC_PI_2 + TAU * i as f64 / n as f64;
            (
                center.0 + (radius * t * angle.cos()).round() as i32,
                center.1 + (radius * t * angle.sin()).round() as i32,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::policy::PERCENT_AXIS;

    #[test]
    fn radar_first_axis_points_up() {
        let vertices = radar_vertices(
            (100, 100),
            50.0,
            PERCENT_AXIS,
            &[Some(100.0), None, Some(50.0), Some(100.0)],
        );
        assert_eq!(vertices[0], (100, 50));
        assert_eq!(vertices[1], (100, 100));
        assert_eq!(vertices[2], (100, 125));
        assert_eq!(vertices[3], (50, 100));
    }

    #[test]
    fn values_outside_bounds_are_clamped() {
        assert_eq!(normalized(150.0, PERCENT_AXIS), 1.0);
        assert_eq!(normalized(-3.0, PERCENT_AXIS), 0.0);
        assert_eq!(normalized(25.0, PERCENT_AXIS), 0.25);
    }

    #[test]
    fn only_integer_ticks_get_category_labels() {
        let categories = vec!["d1".to_string(), "d2".to_string()];
        assert_eq!(FigureRenderer::category_label(&categories, 1.0), "d2");
        assert_eq!(FigureRenderer::category_label(&categories, 0.5), "");
        assert_eq!(FigureRenderer::category_label(&categories, 2.0), "");
        assert_eq!(FigureRenderer::category_label(&categories, -1.0), "");
    }

    #[test]
    fn extent_of_nothing_is_zero() {
        assert_eq!(extent(std::iter::empty()), (0.0, 0.0));
        assert_eq!(extent([3.0, -1.0, 2.0].into_iter()), (-1.0, 3.0));
    }
}
