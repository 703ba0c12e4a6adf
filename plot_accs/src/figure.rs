//! Chart assembly on top of plotters.
//!
//! The driver describes the figure first (line series, text annotations,
//! legend markers, axis configuration) and [`Figure::save`] renders the whole
//! description in one pass, choosing the backend from the output path's
//! extension.

use std::iter;
use std::ops::Range;
use std::path::Path;

use anyhow::{Context, Result};
use plotters::coord::Shift;
use plotters::element::{Cross, DynElement, IntoDynElement};
use plotters::prelude::*;
use plotters::style::FontTransform;

/// Palette the line series cycle through, in insertion order
static SERIES_COLORS: [RGBColor; 6] = [BLUE, RED, GREEN, MAGENTA, CYAN, BLACK];

/// Chart appearance knobs
#[derive(Debug, Clone)]
pub struct ChartOptions {
    /// Output image width in pixels
    pub width: u32,
    /// Output image height in pixels
    pub height: u32,
    /// Caption drawn above the plot area
    pub title: String,
    /// Description of the x axis
    pub x_label: String,
    /// Description of the y axis
    pub y_label: String,
    /// Fixed y-axis range
    pub y_range: Range<f64>,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            title: "DreamCoder's Learning Curves on Rule List Tasks".to_string(),
            x_label: "Number of iterations".to_string(),
            y_label: "Percentage of tasks solved".to_string(),
            y_range: 0.0..0.4,
        }
    }
}

/// Shape drawn at each data point of a line series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Small filled circle
    Dot,
    /// Diagonal cross
    Cross,
}

/// Orientation of an annotation's text.
///
/// The backend only supports quarter-turn font transforms, so slanted labels
/// are drawn with a full quarter turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRotation {
    Horizontal,
    Clockwise,
}

impl TextRotation {
    fn font_transform(self) -> FontTransform {
        match self {
            TextRotation::Horizontal => FontTransform::None,
            TextRotation::Clockwise => FontTransform::Rotate90,
        }
    }
}

struct LineSpec {
    points: Vec<(f64, f64)>,
    marker: Marker,
    label: String,
}

struct Annotation {
    position: (f64, f64),
    text: String,
    rotation: TextRotation,
    color: RGBColor,
}

struct LegendSpec {
    label: String,
    color: RGBColor,
}

/// Chart description accumulated by the driver and rendered on save
pub struct Figure {
    options: ChartOptions,
    x_range: Range<f64>,
    series: Vec<LineSpec>,
    annotations: Vec<Annotation>,
    legend_markers: Vec<LegendSpec>,
}

impl Figure {
    /// Creates an empty figure with the given appearance
    pub fn new(options: ChartOptions) -> Self {
        Self {
            options,
            x_range: 0.0..1.0,
            series: Vec::new(),
            annotations: Vec::new(),
            legend_markers: Vec::new(),
        }
    }

    /// Adds a line series with per-point markers and a legend label
    pub fn add_line_series(
        &mut self,
        points: Vec<(f64, f64)>,
        marker: Marker,
        label: impl Into<String>,
    ) {
        self.series.push(LineSpec {
            points,
            marker,
            label: label.into(),
        });
    }

    /// Adds a text annotation at data coordinates
    pub fn annotate(
        &mut self,
        position: (f64, f64),
        text: impl Into<String>,
        rotation: TextRotation,
        color: RGBColor,
    ) {
        self.annotations.push(Annotation {
            position,
            text: text.into(),
            rotation,
            color,
        });
    }

    /// Adds a legend entry with no data series behind it
    pub fn add_legend_marker(&mut self, label: impl Into<String>, color: RGBColor) {
        self.legend_markers.push(LegendSpec {
            label: label.into(),
            color,
        });
    }

    /// Replaces the x-axis range, which depends on the number of iterations
    /// rather than on fixed chart appearance
    pub fn set_x_range(&mut self, x_range: Range<f64>) {
        self.x_range = x_range;
    }

    /// Renders the figure and writes it to `path`.
    ///
    /// A `.svg` extension selects the SVG backend; any other extension goes
    /// through the bitmap backend, which encodes the image format matching
    /// the extension (e.g. `.png`). The drawing area is presented before
    /// returning, so the file is complete on success.
    pub fn save(&self, path: &Path) -> Result<()> {
        let size = (self.options.width, self.options.height);
        if wants_svg(path) {
            let root = SVGBackend::new(path, size).into_drawing_area();
            self.render(&root)?;
            root.present()
                .with_context(|| format!("Failed to write chart to {}", path.display()))?;
        } else {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            self.render(&root)?;
            root.present()
                .with_context(|| format!("Failed to write chart to {}", path.display()))?;
        }
        Ok(())
    }

    fn render<DB>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        root.fill(&WHITE).context("Failed to fill drawing area")?;

        let x_formatter = |x: &f64| -> String { format!("{}", (*x).round()) };

        let mut chart = ChartBuilder::on(root)
            .caption(&self.options.title, ("sans-serif", 30).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(self.x_range.clone(), self.options.y_range.clone())
            .context("Failed to build chart")?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_label_formatter(&x_formatter)
            .x_desc(self.options.x_label.as_str())
            .y_desc(self.options.y_label.as_str())
            .draw()
            .context("Failed to draw mesh")?;

        for (index, line) in self.series.iter().enumerate() {
            let color = &SERIES_COLORS[index % SERIES_COLORS.len()];
            chart
                .draw_series(LineSeries::new(line.points.iter().copied(), color))
                .context("Failed to draw line series")?
                .label(line.label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            chart
                .draw_series(
                    line.points
                        .iter()
                        .map(|&point| marker_element(point, line.marker, color)),
                )
                .context("Failed to draw series markers")?;
        }

        for note in &self.annotations {
            let style = ("sans-serif", 14)
                .into_font()
                .transform(note.rotation.font_transform())
                .color(&note.color);
            chart
                .draw_series(iter::once(Text::new(
                    note.text.clone(),
                    note.position,
                    style,
                )))
                .context("Failed to draw annotation")?;
        }

        for marker in &self.legend_markers {
            let color = marker.color;
            chart
                .draw_series(iter::empty::<Circle<(f64, f64), i32>>())
                .context("Failed to add legend marker")?
                .label(marker.label.as_str())
                .legend(move |(x, y)| Circle::new((x, y), 3, color.filled()));
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .margin(10)
            .draw()
            .context("Failed to draw legend")?;

        Ok(())
    }
}

/// True when the output path asks for SVG rendering
fn wants_svg(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case("svg"))
}

fn marker_element<DB: DrawingBackend>(
    point: (f64, f64),
    marker: Marker,
    color: &'static RGBColor,
) -> DynElement<'static, DB, (f64, f64)> {
    match marker {
        Marker::Dot => Circle::new(point, 3, color.filled()).into_dyn(),
        Marker::Cross => Cross::new(point, 4, color.stroke_width(1)).into_dyn(),
    }
}
