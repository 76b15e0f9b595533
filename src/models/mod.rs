//! Data models shared by the digest pipeline
//!
//! Each model is plain data passed between the source, the yield calculator,
//! the renderer and the dispatcher. None of them carry behaviour that reaches
//! outside the process.

pub mod chart;
pub mod email;
pub mod instrument;
pub mod series;
pub mod yields;

// Re-export commonly used types for convenience
pub use chart::RenderedChart;
pub use email::Attachment;
pub use instrument::{Annotation, AnnotationConfig, Instrument, InstrumentConfig};
pub use series::{PricePoint, PriceSeries};
pub use yields::YieldResult;
