pub use crate::error::{CapacityError, InvariantError};
pub use crate::map::{FifoMap, IntoIter, Iter, Keys, Values};
pub use crate::order::OrderQueue;

#[cfg(feature = "metrics")]
pub use crate::metrics::{FifoMapMetricsSnapshot, PrometheusTextExporter};
