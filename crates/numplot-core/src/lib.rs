pub mod analysis;
pub mod error;
pub mod method;
pub mod numeric;
pub mod samples;
pub mod store;

pub use analysis::{analyze, Analysis, AnalysisOptions, Marker, Outcome, Series, SeriesStyle};
pub use error::{NumError, NumResult};
pub use method::Method;
pub use samples::{parse_samples, Samples};
pub use store::{PlotRecord, PlotStore};
