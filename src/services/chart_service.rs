use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use thiserror::Error;
use tracing::debug;

use crate::models::{Annotation, PricePoint, PriceSeries, RenderedChart, YieldResult};

/// Length of the trailing window shown in the lower panel
pub const RECENT_WINDOW_DAYS: i64 = 90;

const CHART_WIDTH: u32 = 1000;
const CHART_HEIGHT: u32 = 1000;
const FOOTER_HEIGHT: u32 = 40;

// Callout geometry, counted back from the last bar
const CALLOUT_TIP_OFFSET: usize = 20;
const CALLOUT_TEXT_PRICE_OFFSET: usize = 40;
const CALLOUT_TEXT_DATE_OFFSET: usize = 60;

/// Chart rendering errors
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("No price data to chart for {0}")]
    EmptySeries(String),
    #[error("Chart I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Drawing(String),
}

fn drawing_error<E: std::fmt::Display>(step: &'static str) -> impl FnOnce(E) -> RenderError {
    move |e| RenderError::Drawing(format!("Failed to {}: {}", step, e))
}

/// Everything needed to chart one instrument
#[derive(Debug, Clone, Copy)]
pub struct ChartRequest<'a> {
    pub symbol: &'a str,
    pub description: &'a str,
    pub series: &'a PriceSeries,
    pub annotation: Option<&'a Annotation>,
    pub yields: Option<&'a YieldResult>,
    pub today: NaiveDate,
}

/// Turns a chart request into an image on disk
pub trait ChartRenderer: Send + Sync {
    fn render(&self, request: &ChartRequest<'_>) -> Result<RenderedChart, RenderError>;
}

/// Horizontal line at the purchase price
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLine {
    pub price: f64,
    pub label: String,
}

/// Annotation note with an arrow pointing at a recent bar
#[derive(Debug, Clone, PartialEq)]
pub struct Callout {
    pub text: String,
    pub tip: PricePoint,
    pub anchor: PricePoint,
}

/// One panel of the chart, ready to draw
#[derive(Debug, Clone, PartialEq)]
pub struct PanelPlan {
    pub title: String,
    pub legend: &'static str,
    pub points: Vec<PricePoint>,
    pub reference: Option<ReferenceLine>,
    pub callout: Option<Callout>,
    pub x_range: (NaiveDate, NaiveDate),
    pub y_range: (f64, f64),
}

/// Layout of the two-panel chart and its footer.
///
/// `recent` is `None` when no bars fall in the trailing window; that panel is
/// then left blank.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPlan {
    pub full: PanelPlan,
    pub recent: Option<PanelPlan>,
    pub footer: Option<String>,
}

impl ChartPlan {
    pub fn build(request: &ChartRequest<'_>) -> Result<Self, RenderError> {
        let series = request.series;
        if series.is_empty() {
            return Err(RenderError::EmptySeries(request.symbol.to_string()));
        }

        let reference = request.yields.map(|y| ReferenceLine {
            price: y.purchase_price,
            label: format!("Bought at {:.2} on {}", y.purchase_price, y.purchase_date),
        });

        // The callout only accompanies a computed yield
        let callout = match (request.annotation, request.yields) {
            (Some(annotation), Some(_)) => callout_for(series, &annotation.note),
            _ => None,
        };

        let full = PanelPlan::new(
            format!("{} Stock Price (Full Period)", request.description),
            "Full Period",
            series.points().to_vec(),
            reference.clone(),
            callout,
        );

        let window_start = request.today - Duration::days(RECENT_WINDOW_DAYS);
        let recent_points = series.since(window_start);
        let recent = if recent_points.is_empty() {
            debug!("No bars for {} since {}", request.symbol, window_start);
            None
        } else {
            Some(PanelPlan::new(
                format!("{} Stock Price (Last 3 Months)", request.symbol),
                "Last 3 Months",
                recent_points.to_vec(),
                reference,
                None,
            ))
        };

        Ok(Self {
            full,
            recent,
            footer: request.yields.map(footer_caption),
        })
    }
}

impl PanelPlan {
    fn new(
        title: String,
        legend: &'static str,
        points: Vec<PricePoint>,
        reference: Option<ReferenceLine>,
        callout: Option<Callout>,
    ) -> Self {
        let x_range = date_range(&points);
        let y_range = price_range(&points, reference.as_ref().map(|r| r.price));
        Self {
            title,
            legend,
            points,
            reference,
            callout,
            x_range,
            y_range,
        }
    }
}

/// Footer text for a computed yield; a missing yearly yield reads `N/A`
pub fn footer_caption(yields: &YieldResult) -> String {
    let yearly = yields
        .yearly_yield_pct
        .map(|pct| format!("{:.2}%", pct))
        .unwrap_or_else(|| "N/A".to_string());
    format!(
        "Yield since purchase: {:.2}%  |  Yearly yield: {}",
        yields.yield_since_purchase_pct, yearly
    )
}

fn callout_for(series: &PriceSeries, note: &str) -> Option<Callout> {
    let tip = *series.nth_from_end(CALLOUT_TIP_OFFSET)?;
    let anchor_date = series.nth_from_end(CALLOUT_TEXT_DATE_OFFSET)?.date;
    let anchor_price = series.nth_from_end(CALLOUT_TEXT_PRICE_OFFSET)?.close;
    Some(Callout {
        text: note.to_string(),
        tip,
        anchor: PricePoint::new(anchor_date, anchor_price),
    })
}

/// First and last date, widened by a day each side for a single-day series
fn date_range(points: &[PricePoint]) -> (NaiveDate, NaiveDate) {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if first.date < last.date => (first.date, last.date),
        (Some(only), _) => (only.date - Duration::days(1), only.date + Duration::days(1)),
        _ => {
            let today = Utc::now().date_naive();
            (today - Duration::days(1), today)
        }
    }
}

/// Price bounds with 10% padding, always including `reference`
fn price_range(points: &[PricePoint], reference: Option<f64>) -> (f64, f64) {
    let prices = points.iter().map(|p| p.close).chain(reference);
    let min_price = prices.clone().fold(f64::INFINITY, f64::min);
    let max_price = prices.fold(f64::NEG_INFINITY, f64::max);
    if !min_price.is_finite() || !max_price.is_finite() {
        return (0.0, 1.0);
    }

    let span = max_price - min_price;
    let padding = if span > 0.0 {
        span * 0.1
    } else {
        (max_price.abs() * 0.05).max(1.0)
    };

    ((min_price - padding).max(0.0), max_price + padding)
}

fn to_utc(date: NaiveDate) -> DateTime<Utc> {
    DateTime::<Utc>::from_naive_utc_and_offset(date.and_time(NaiveTime::default()), Utc)
}

/// Renders chart plans to PNG with plotters
pub struct PlottersRenderer {
    output_dir: PathBuf,
    width: u32,
    height: u32,
}

impl PlottersRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            width: CHART_WIDTH,
            height: CHART_HEIGHT,
        }
    }

    /// Deterministic output path, overwritten on every run
    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.output_dir.join(format!("{}.png", symbol))
    }

    fn draw(&self, path: &Path, plan: &ChartPlan) -> Result<(), RenderError> {
        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(drawing_error("fill canvas"))?;

        let plot_height = self.height.saturating_sub(FOOTER_HEIGHT) as i32;
        let (plots, footer) = root.split_vertically(plot_height);
        let panels = plots.split_evenly((2, 1));

        draw_panel(&panels[0], &plan.full)?;
        if let Some(recent) = &plan.recent {
            draw_panel(&panels[1], recent)?;
        }

        if let Some(caption) = &plan.footer {
            let (w, h) = footer.dim_in_pixel();
            let style = TextStyle::from(("sans-serif", 20).into_font())
                .pos(Pos::new(HPos::Center, VPos::Center));
            footer
                .draw(&Text::new(caption.as_str(), ((w / 2) as i32, (h / 2) as i32), style))
                .map_err(drawing_error("draw footer"))?;
        }

        root.present().map_err(drawing_error("render chart"))?;
        Ok(())
    }
}

impl ChartRenderer for PlottersRenderer {
    fn render(&self, request: &ChartRequest<'_>) -> Result<RenderedChart, RenderError> {
        let plan = ChartPlan::build(request)?;

        fs::create_dir_all(&self.output_dir)?;
        let path = self.path_for(request.symbol);
        self.draw(&path, &plan)?;

        debug!("Rendered {} to {}", request.symbol, path.display());
        Ok(RenderedChart {
            symbol: request.symbol.to_string(),
            path,
        })
    }
}

fn draw_panel(area: &DrawingArea<BitMapBackend<'_>, Shift>, panel: &PanelPlan) -> Result<(), RenderError> {
    let x_min = to_utc(panel.x_range.0);
    let x_max = to_utc(panel.x_range.1);

    let mut chart = ChartBuilder::on(area)
        .caption(&panel.title, ("sans-serif", 24).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, panel.y_range.0..panel.y_range.1)
        .map_err(drawing_error("build chart"))?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Price")
        .x_label_formatter(&|d: &DateTime<Utc>| d.format("%Y-%m-%d").to_string())
        .draw()
        .map_err(drawing_error("draw mesh"))?;

    chart
        .draw_series(LineSeries::new(
            panel.points.iter().map(|p| (to_utc(p.date), p.close)),
            BLUE.stroke_width(2),
        ))
        .map_err(drawing_error("draw price line"))?
        .label(panel.legend)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    if let Some(reference) = &panel.reference {
        // Dashed: every other segment of the x span
        let segment = (x_max - x_min) / 80;
        let dashes = (0..80).step_by(2).map(|i| {
            let start = x_min + segment * i;
            PathElement::new(
                vec![(start, reference.price), (start + segment, reference.price)],
                RED.stroke_width(2),
            )
        });
        chart
            .draw_series(dashes)
            .map_err(drawing_error("draw purchase line"))?
            .label(reference.label.as_str())
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));
    }

    if let Some(callout) = &panel.callout {
        let tip = (to_utc(callout.tip.date), callout.tip.close);
        let anchor = (to_utc(callout.anchor.date), callout.anchor.close);

        chart
            .draw_series(std::iter::once(PathElement::new(vec![anchor, tip], BLACK)))
            .map_err(drawing_error("draw callout arrow"))?;
        chart
            .draw_series(std::iter::once(Circle::new(tip, 4, BLACK.filled())))
            .map_err(drawing_error("draw callout tip"))?;
        chart
            .draw_series(std::iter::once(Text::new(
                callout.text.clone(),
                anchor,
                ("sans-serif", 16).into_font(),
            )))
            .map_err(drawing_error("draw callout text"))?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(drawing_error("draw legend"))?;

    Ok(())
}
