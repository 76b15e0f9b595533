//! Batch orchestration
//!
//! One run walks the instrument list in order: fetch, compute the yield for
//! annotated holdings, render. A failure on one symbol is logged and the run
//! moves on. Once every symbol has been processed the rendered charts are
//! mailed in a single message.

use chrono::NaiveDate;
use tracing::{info, warn};

use super::chart_service::{ChartRenderer, ChartRequest};
use super::email_service::{self, DeliveryError, EmailDispatcher};
use super::price_service::PriceSource;
use super::yield_service;
use crate::models::{AnnotationConfig, Instrument, RenderedChart};

/// Why an instrument produced no chart
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    DataUnavailable(String),
    RenderFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedInstrument {
    pub symbol: String,
    pub reason: SkipReason,
}

/// Outcome of one batch run
#[derive(Debug)]
pub struct BatchReport {
    pub rendered: Vec<RenderedChart>,
    pub skipped: Vec<SkippedInstrument>,
    pub attached: usize,
    pub delivery: Result<u16, DeliveryError>,
}

pub struct BatchOrchestrator<S, R, E> {
    source: S,
    renderer: R,
    dispatcher: E,
    prefer_cache: bool,
    today: NaiveDate,
}

impl<S, R, E> BatchOrchestrator<S, R, E>
where
    S: PriceSource,
    R: ChartRenderer,
    E: EmailDispatcher,
{
    pub fn new(source: S, renderer: R, dispatcher: E, prefer_cache: bool, today: NaiveDate) -> Self {
        Self {
            source,
            renderer,
            dispatcher,
            prefer_cache,
            today,
        }
    }

    /// Chart every instrument, then send exactly one email with whatever rendered
    pub async fn run(&self, instruments: &[Instrument], annotations: &AnnotationConfig) -> BatchReport {
        let mut rendered = Vec::new();
        let mut skipped = Vec::new();

        for instrument in instruments {
            match self.process_instrument(instrument, annotations).await {
                Ok(chart) => rendered.push(chart),
                Err(reason) => skipped.push(SkippedInstrument {
                    symbol: instrument.symbol.clone(),
                    reason,
                }),
            }
        }

        info!(
            "Rendered {} of {} chart(s), {} skipped",
            rendered.len(),
            instruments.len(),
            skipped.len()
        );

        let attachments = email_service::load_attachments(&rendered);
        let delivery = self.dispatcher.send(&attachments).await;

        BatchReport {
            rendered,
            skipped,
            attached: attachments.len(),
            delivery,
        }
    }

    async fn process_instrument(
        &self,
        instrument: &Instrument,
        annotations: &AnnotationConfig,
    ) -> Result<RenderedChart, SkipReason> {
        let symbol = instrument.symbol.as_str();

        let series = self.source.fetch(symbol, self.prefer_cache).await.map_err(|e| {
            warn!("Skipping {}: {}", symbol, e);
            SkipReason::DataUnavailable(e.to_string())
        })?;

        let annotation = annotations.get(symbol);
        let yields = annotation.and_then(|a| {
            let result = yield_service::compute(&series, a.purchase_date, self.today);
            if result.is_none() {
                warn!(
                    "No price for {} on purchase date {}, chart left unannotated",
                    symbol, a.purchase_date
                );
            }
            result
        });

        let request = ChartRequest {
            symbol,
            description: &instrument.description,
            series: &series,
            annotation,
            yields: yields.as_ref(),
            today: self.today,
        };

        let chart = self.renderer.render(&request).map_err(|e| {
            warn!("Failed to render {}: {}", symbol, e);
            SkipReason::RenderFailed(e.to_string())
        })?;

        info!("📈 Chart ready for {} at {}", symbol, chart.path.display());
        Ok(chart)
    }
}
