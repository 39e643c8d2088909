pub mod catalog;
pub mod fuel_cost;
pub mod log_aggregator;
pub mod matcher;
pub mod trip_recorder;
pub mod units;

pub use crate::domain::model::{CalculationInput, CalculationResult, RouteContext, TripRecord};
pub use crate::domain::ports::{ConfigProvider, LogSource, RouteProvider, TripStore};
pub use crate::utils::error::Result;
