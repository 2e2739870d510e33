//! Chart renderers.
//!
//! Pages describe charts as data and hand them to an injected [`Visuals`]
//! implementation chosen once at startup: [`SvgVisuals`] draws inline SVG,
//! [`PlainVisuals`] falls back to tables.

use std::fmt::{self, Write};
use std::sync::Arc;

use tracing::warn;

use super::html::{count, decimal, escape, money, percent, table_end, table_row, table_start};

const CHART_WIDTH: f64 = 640.0;
const CHART_HEIGHT: f64 = 260.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 16.0;
const MARGIN_TOP: f64 = 16.0;
const MARGIN_BOTTOM: f64 = 70.0;
const PRIMARY: &str = "#2e7d32";
const PALETTE: [&str; 6] = ["#388e3c", "#bdbdbd", "#7cb342", "#fbc02d", "#8d6e63", "#0288d1"];

/// How chart values are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// US dollars.
    Dollars,
    /// Whole counts.
    Count,
    /// Tonnes of CO2 equivalent.
    Tonnes,
}

impl Unit {
    /// Formats a value in this unit.
    #[must_use]
    pub fn format(self, value: f64) -> String {
        match self {
            Self::Dollars => money(value),
            Self::Count => count(value),
            Self::Tonnes => format!("{} t", decimal(value)),
        }
    }
}

/// One labelled value.
#[derive(Debug, Clone, PartialEq)]
pub struct Datum {
    /// Category or x-axis label.
    pub label: String,
    /// Value.
    pub value: f64,
}

impl Datum {
    /// Builds a datum.
    #[must_use]
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// A chart description handed to a renderer.
#[derive(Debug, Clone, Copy)]
pub struct Chart<'a> {
    /// Heading.
    pub title: &'a str,
    /// Name of the value axis or column.
    pub value_label: &'a str,
    /// Value formatting.
    pub unit: Unit,
    /// Data in display order.
    pub data: &'a [Datum],
}

/// A labelled map position.
#[derive(Debug, Clone, PartialEq)]
pub struct MapPoint {
    /// Marker label.
    pub label: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Draw the marker in the accent colour.
    pub highlight: bool,
}

/// Renders charts into an HTML buffer.
pub trait Visuals: Send + Sync {
    /// Renderer name as configured.
    fn name(&self) -> &'static str;

    /// Vertical bars, one per datum.
    ///
    /// # Errors
    ///
    /// Propagates formatter failures.
    fn bar_chart(&self, out: &mut String, chart: &Chart<'_>) -> fmt::Result;

    /// A line through the data in order.
    ///
    /// # Errors
    ///
    /// Propagates formatter failures.
    fn line_chart(&self, out: &mut String, chart: &Chart<'_>) -> fmt::Result;

    /// Parts of a whole.
    ///
    /// # Errors
    ///
    /// Propagates formatter failures.
    fn share_chart(&self, out: &mut String, chart: &Chart<'_>) -> fmt::Result;

    /// Positions on a map.
    ///
    /// # Errors
    ///
    /// Propagates formatter failures.
    fn location_map(&self, out: &mut String, title: &str, points: &[MapPoint]) -> fmt::Result;
}

/// Picks the renderer named in configuration.
///
/// Unknown names fall back to [`PlainVisuals`] with a warning.
///
/// # Examples
/// ```
/// use dashboard::render::select_visuals;
///
/// assert_eq!(select_visuals("svg").name(), "svg");
/// assert_eq!(select_visuals("Plain").name(), "plain");
/// assert_eq!(select_visuals("3d-pie").name(), "plain");
/// ```
#[must_use]
pub fn select_visuals(name: &str) -> Arc<dyn Visuals> {
    match name.trim().to_ascii_lowercase().as_str() {
        "svg" => Arc::new(SvgVisuals),
        "plain" => Arc::new(PlainVisuals),
        _ => {
            warn!(visuals = name, "unknown chart renderer; falling back to plain tables");
            Arc::new(PlainVisuals)
        }
    }
}

fn empty_chart(out: &mut String, title: &str) -> fmt::Result {
    write!(
        out,
        r#"<figure class="chart"><figcaption>{}</figcaption><p class="note">No data to chart.</p></figure>"#,
        escape(title)
    )
}

fn ratio(value: f64, total: f64) -> f64 {
    if total > 0.0 { value / total } else { 0.0 }
}

/// Inline SVG charts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgVisuals;

impl SvgVisuals {
    fn open(out: &mut String, title: &str) -> fmt::Result {
        write!(
            out,
            r#"<figure class="chart"><figcaption>{title}</figcaption><svg viewBox="0 0 {CHART_WIDTH} {CHART_HEIGHT}" role="img" aria-label="{title}" xmlns="http://www.w3.org/2000/svg">"#,
            title = escape(title)
        )
    }

    fn close(out: &mut String) -> fmt::Result {
        out.write_str("</svg></figure>")
    }

    fn plot_width() -> f64 {
        CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT
    }

    fn plot_height() -> f64 {
        CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM
    }

    fn axes(out: &mut String, chart: &Chart<'_>, max: f64) -> fmt::Result {
        let baseline = MARGIN_TOP + Self::plot_height();
        write!(
            out,
            r##"<line class="axis" x1="{MARGIN_LEFT}" y1="{MARGIN_TOP}" x2="{MARGIN_LEFT}" y2="{baseline}" stroke="#9e9e9e"/><line class="axis" x1="{MARGIN_LEFT}" y1="{baseline}" x2="{right}" y2="{baseline}" stroke="#9e9e9e"/>"##,
            right = CHART_WIDTH - MARGIN_RIGHT,
        )?;
        write!(
            out,
            r#"<text x="{x}" y="{top}" text-anchor="end" font-size="10">{max}</text><text x="{x}" y="{baseline}" text-anchor="end" font-size="10">{zero}</text><text x="12" y="{mid}" font-size="10" transform="rotate(-90 12 {mid})" text-anchor="middle">{label}</text>"#,
            x = MARGIN_LEFT - 4.0,
            top = MARGIN_TOP + 4.0,
            max = escape(&chart.unit.format(max)),
            zero = escape(&chart.unit.format(0.0)),
            mid = MARGIN_TOP + Self::plot_height() / 2.0,
            label = escape(chart.value_label),
        )
    }

    fn x_label(out: &mut String, x: f64, label: &str) -> fmt::Result {
        let y = MARGIN_TOP + Self::plot_height() + 12.0;
        write!(
            out,
            r#"<text x="{x:.1}" y="{y:.1}" font-size="10" text-anchor="end" transform="rotate(-45 {x:.1} {y:.1})">{}</text>"#,
            escape(label)
        )
    }

    fn scale_max(data: &[Datum]) -> f64 {
        let max = data.iter().map(|datum| datum.value).fold(0.0_f64, f64::max);
        if max > 0.0 { max } else { 1.0 }
    }
}

impl Visuals for SvgVisuals {
    fn name(&self) -> &'static str {
        "svg"
    }

    fn bar_chart(&self, out: &mut String, chart: &Chart<'_>) -> fmt::Result {
        if chart.data.is_empty() {
            return empty_chart(out, chart.title);
        }
        let max = Self::scale_max(chart.data);
        let slots = f64::from(u32::try_from(chart.data.len()).unwrap_or(u32::MAX));
        let slot = Self::plot_width() / slots;
        let baseline = MARGIN_TOP + Self::plot_height();
        Self::open(out, chart.title)?;
        Self::axes(out, chart, max)?;
        let mut x = MARGIN_LEFT;
        for datum in chart.data {
            let height = ratio(datum.value.max(0.0), max) * Self::plot_height();
            write!(
                out,
                r#"<rect class="bar" x="{bx:.1}" y="{by:.1}" width="{w:.1}" height="{height:.1}" fill="{PRIMARY}"><title>{label}: {value}</title></rect>"#,
                bx = x + slot * 0.1,
                by = baseline - height,
                w = slot * 0.8,
                label = escape(&datum.label),
                value = escape(&chart.unit.format(datum.value)),
            )?;
            Self::x_label(out, x + slot / 2.0, &datum.label)?;
            x += slot;
        }
        Self::close(out)
    }

    fn line_chart(&self, out: &mut String, chart: &Chart<'_>) -> fmt::Result {
        if chart.data.is_empty() {
            return empty_chart(out, chart.title);
        }
        let max = Self::scale_max(chart.data);
        let slots = f64::from(u32::try_from(chart.data.len()).unwrap_or(u32::MAX));
        let step = Self::plot_width() / slots;
        let baseline = MARGIN_TOP + Self::plot_height();
        let label_every = chart.data.len().div_ceil(12).max(1);
        Self::open(out, chart.title)?;
        Self::axes(out, chart, max)?;
        let points: Vec<(f64, f64, &Datum)> = chart
            .data
            .iter()
            .scan(MARGIN_LEFT + step / 2.0, |x, datum| {
                let point = (
                    *x,
                    baseline - ratio(datum.value.max(0.0), max) * Self::plot_height(),
                    datum,
                );
                *x += step;
                Some(point)
            })
            .collect();
        out.write_str(r#"<polyline class="line" fill="none" stroke=""#)?;
        out.write_str(PRIMARY)?;
        out.write_str(r#"" stroke-width="2" points=""#)?;
        for (x, y, _) in &points {
            write!(out, "{x:.1},{y:.1} ")?;
        }
        out.write_str(r#""/>"#)?;
        for (index, (x, y, datum)) in points.iter().enumerate() {
            write!(
                out,
                r#"<circle class="marker" cx="{x:.1}" cy="{y:.1}" r="3" fill="{PRIMARY}"><title>{}: {}</title></circle>"#,
                escape(&datum.label),
                escape(&chart.unit.format(datum.value)),
            )?;
            if index % label_every == 0 {
                Self::x_label(out, *x, &datum.label)?;
            }
        }
        Self::close(out)
    }

    fn share_chart(&self, out: &mut String, chart: &Chart<'_>) -> fmt::Result {
        let total: f64 = chart.data.iter().map(|datum| datum.value.max(0.0)).sum();
        if chart.data.is_empty() || total <= 0.0 {
            return empty_chart(out, chart.title);
        }
        let radius = 80.0_f64;
        let circumference = 2.0 * std::f64::consts::PI * radius;
        let (cx, cy) = (130.0, CHART_HEIGHT / 2.0);
        Self::open(out, chart.title)?;
        let mut offset = 0.0;
        for (datum, colour) in chart.data.iter().zip(PALETTE.iter().cycle()) {
            let length = ratio(datum.value.max(0.0), total) * circumference;
            write!(
                out,
                r#"<circle class="slice" cx="{cx}" cy="{cy}" r="{radius}" fill="none" stroke="{colour}" stroke-width="40" stroke-dasharray="{length:.2} {circumference:.2}" stroke-dashoffset="{dash:.2}" transform="rotate(-90 {cx} {cy})"><title>{label}: {value}</title></circle>"#,
                dash = -offset,
                label = escape(&datum.label),
                value = escape(&chart.unit.format(datum.value)),
            )?;
            offset += length;
        }
        let lead = chart.data.first().map_or(0.0, |datum| ratio(datum.value, total));
        write!(
            out,
            r#"<text x="{cx}" y="{cy}" text-anchor="middle" dominant-baseline="middle" font-size="20">{}</text>"#,
            percent(lead)
        )?;
        let mut y = 40.0;
        for (datum, colour) in chart.data.iter().zip(PALETTE.iter().cycle()) {
            write!(
                out,
                r#"<rect x="280" y="{ry}" width="12" height="12" fill="{colour}"/><text x="300" y="{y}" font-size="12">{label} ({share})</text>"#,
                ry = y - 10.0,
                label = escape(&datum.label),
                share = percent(ratio(datum.value, total)),
            )?;
            y += 22.0;
        }
        Self::close(out)
    }

    fn location_map(&self, out: &mut String, title: &str, points: &[MapPoint]) -> fmt::Result {
        if points.is_empty() {
            return empty_chart(out, title);
        }
        let (mut min_lat, mut max_lat) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_lon, mut max_lon) = (f64::INFINITY, f64::NEG_INFINITY);
        for point in points {
            min_lat = min_lat.min(point.latitude);
            max_lat = max_lat.max(point.latitude);
            min_lon = min_lon.min(point.longitude);
            max_lon = max_lon.max(point.longitude);
        }
        let lat_span = (max_lat - min_lat).max(0.01);
        let lon_span = (max_lon - min_lon).max(0.01);
        Self::open(out, title)?;
        out.write_str(r##"<rect class="map" x="0" y="0" width="640" height="260" fill="#f1f8e9"/>"##)?;
        for point in points {
            let x = 20.0 + (point.longitude - min_lon) / lon_span * (CHART_WIDTH - 40.0);
            let y = 20.0 + (max_lat - point.latitude) / lat_span * (CHART_HEIGHT - 40.0);
            let (colour, radius) = if point.highlight {
                ("#d32f2f", 7)
            } else {
                (PRIMARY, 5)
            };
            write!(
                out,
                r#"<circle class="pin" cx="{x:.1}" cy="{y:.1}" r="{radius}" fill="{colour}"><title>{label}</title></circle><text x="{tx:.1}" y="{y:.1}" font-size="10">{label}</text>"#,
                tx = x + 8.0,
                label = escape(&point.label),
            )?;
        }
        Self::close(out)
    }
}

/// Table-only rendering for environments without SVG.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainVisuals;

impl PlainVisuals {
    fn value_table(out: &mut String, chart: &Chart<'_>) -> fmt::Result {
        if chart.data.is_empty() {
            return empty_chart(out, chart.title);
        }
        table_start(out, Some(chart.title), &["", chart.value_label])?;
        for datum in chart.data {
            table_row(out, &[datum.label.clone(), chart.unit.format(datum.value)])?;
        }
        table_end(out)
    }
}

impl Visuals for PlainVisuals {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn bar_chart(&self, out: &mut String, chart: &Chart<'_>) -> fmt::Result {
        Self::value_table(out, chart)
    }

    fn line_chart(&self, out: &mut String, chart: &Chart<'_>) -> fmt::Result {
        Self::value_table(out, chart)
    }

    fn share_chart(&self, out: &mut String, chart: &Chart<'_>) -> fmt::Result {
        let total: f64 = chart.data.iter().map(|datum| datum.value.max(0.0)).sum();
        if chart.data.is_empty() || total <= 0.0 {
            return empty_chart(out, chart.title);
        }
        table_start(out, Some(chart.title), &["", chart.value_label, "Share"])?;
        for datum in chart.data {
            table_row(
                out,
                &[
                    datum.label.clone(),
                    chart.unit.format(datum.value),
                    percent(ratio(datum.value, total)),
                ],
            )?;
        }
        table_end(out)
    }

    fn location_map(&self, out: &mut String, title: &str, points: &[MapPoint]) -> fmt::Result {
        if points.is_empty() {
            return empty_chart(out, title);
        }
        table_start(out, Some(title), &["Location", "Latitude", "Longitude"])?;
        for point in points {
            table_row(
                out,
                &[
                    point.label.clone(),
                    format!("{:.4}", point.latitude),
                    format!("{:.4}", point.longitude),
                ],
            )?;
        }
        table_end(out)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn sample() -> Vec<Datum> {
        vec![
            Datum::new("Kale & Chard", 120.0),
            Datum::new("Honey", 80.0),
            Datum::new("Eggs", 0.0),
        ]
    }

    fn chart(data: &[Datum]) -> Chart<'_> {
        Chart {
            title: "Revenue <by product>",
            value_label: "Revenue ($)",
            unit: Unit::Dollars,
            data,
        }
    }

    #[rstest]
    fn svg_bar_chart_draws_one_bar_per_datum() {
        let data = sample();
        let mut out = String::new();
        SvgVisuals.bar_chart(&mut out, &chart(&data)).expect("render");
        assert_eq!(out.matches(r#"class="bar""#).count(), 3);
        assert!(out.contains("Kale &amp; Chard: $120.00"));
        assert!(out.contains("Revenue &lt;by product&gt;"));
    }

    #[rstest]
    fn svg_line_chart_plots_every_point() {
        let data = sample();
        let mut out = String::new();
        SvgVisuals.line_chart(&mut out, &chart(&data)).expect("render");
        assert_eq!(out.matches(r#"class="marker""#).count(), 3);
        assert!(out.contains("<polyline"));
    }

    #[rstest]
    fn svg_share_chart_labels_the_leading_slice() {
        let data = vec![Datum::new("Sustainable", 6.0), Datum::new("Conventional", 4.0)];
        let mut out = String::new();
        SvgVisuals.share_chart(&mut out, &chart(&data)).expect("render");
        assert_eq!(out.matches(r#"class="slice""#).count(), 2);
        assert!(out.contains(">60.0%<"));
        assert!(out.contains("Conventional (40.0%)"));
    }

    #[rstest]
    fn svg_map_highlights_points() {
        let points = vec![
            MapPoint {
                label: "You".to_owned(),
                latitude: 37.77,
                longitude: -122.42,
                highlight: true,
            },
            MapPoint {
                label: "Farm".to_owned(),
                latitude: 38.1,
                longitude: -122.0,
                highlight: false,
            },
        ];
        let mut out = String::new();
        SvgVisuals
            .location_map(&mut out, "Producer locations", &points)
            .expect("render");
        assert_eq!(out.matches(r#"class="pin""#).count(), 2);
        assert!(out.contains("#d32f2f"));
    }

    #[rstest]
    fn plain_renderer_uses_tables() {
        let data = sample();
        let mut out = String::new();
        PlainVisuals.bar_chart(&mut out, &chart(&data)).expect("render");
        assert!(!out.contains("<svg"));
        assert_eq!(out.matches("<tr>").count(), 4);
        assert!(out.contains("<td>$80.00</td>"));
    }

    #[rstest]
    fn plain_share_chart_adds_percentages() {
        let data = vec![Datum::new("A", 1.0), Datum::new("B", 3.0)];
        let mut out = String::new();
        PlainVisuals.share_chart(&mut out, &chart(&data)).expect("render");
        assert!(out.contains("<td>75.0%</td>"));
    }

    #[rstest]
    #[case::svg(&SvgVisuals as &dyn Visuals)]
    #[case::plain(&PlainVisuals as &dyn Visuals)]
    fn empty_data_renders_a_note(#[case] visuals: &dyn Visuals) {
        let mut out = String::new();
        visuals.bar_chart(&mut out, &chart(&[])).expect("render");
        visuals.share_chart(&mut out, &chart(&[])).expect("render");
        visuals.location_map(&mut out, "Map", &[]).expect("render");
        assert_eq!(out.matches("No data to chart.").count(), 3);
    }

    #[rstest]
    #[case("svg", "svg")]
    #[case(" SVG ", "svg")]
    #[case("plain", "plain")]
    #[case("canvas", "plain")]
    #[case("", "plain")]
    fn selects_renderer_by_name(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(select_visuals(name).name(), expected);
    }

    #[rstest]
    fn units_format_values() {
        assert_eq!(Unit::Dollars.format(1500.0), "$1,500.00");
        assert_eq!(Unit::Count.format(1500.0), "1,500");
        assert_eq!(Unit::Tonnes.format(4.56), "4.6 t");
    }
}
