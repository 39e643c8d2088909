use std::fmt;
use thiserror::Error;

/// Numeric form fields that must be present and positive before a calculation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    Distance,
    Efficiency,
    FuelPrice,
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputField::Distance => "Distance",
            InputField::Efficiency => "Efficiency",
            InputField::FuelPrice => "Fuel Price",
        };
        f.write_str(name)
    }
}

fn join_fields(fields: &[InputField]) -> String {
    fields
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Error, Debug)]
pub enum FillTripError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error! status: {status}")]
    HttpStatus { status: u16 },

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Please fill in: {}", join_fields(.missing))]
    InvalidInput { missing: Vec<InputField> },

    #[error("Unrecognized {kind}: '{value}'")]
    UnrecognizedUnit { kind: &'static str, value: String },

    #[error("Invalid {field}: {reason}")]
    InvalidEntry { field: String, reason: String },

    #[error("Persistence service error: {message}")]
    Persistence { message: String },

    #[error("Routing error: {message}")]
    Routing { message: String },

    #[error("Geocoding error: {message}")]
    Geocoding { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfig { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },
}

impl FillTripError {
    pub fn user_friendly_message(&self) -> String {
        match self {
            FillTripError::Http(_) | FillTripError::HttpStatus { .. } => {
                "Could not reach the FillTrip service.".to_string()
            }
            FillTripError::InvalidInput { missing } => {
                format!("Please fill in: {}", join_fields(missing))
            }
            FillTripError::UnrecognizedUnit { kind, value } => {
                format!("'{}' is not a supported {}.", value, kind)
            }
            FillTripError::Routing { .. } => {
                "Unable to calculate route. Please try again.".to_string()
            }
            FillTripError::Geocoding { .. } => {
                "Unable to search for places. Please try again.".to_string()
            }
            FillTripError::Config { .. }
            | FillTripError::MissingConfig { .. }
            | FillTripError::InvalidConfigValue { .. } => {
                format!("Configuration problem: {}", self)
            }
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            FillTripError::Http(_) | FillTripError::HttpStatus { .. } => {
                "Check persistence.base_url and that the service is running"
            }
            FillTripError::Persistence { .. } => "Check that you are logged in (auth_token)",
            FillTripError::InvalidInput { .. } => {
                "Distance, efficiency and fuel price must be positive numbers"
            }
            FillTripError::UnrecognizedUnit { .. } => {
                "Use km or miles, km/L or mpg, and PHP or USD"
            }
            FillTripError::InvalidEntry { .. } => {
                "Odometer, liters and price must be positive numbers; names cannot be blank"
            }
            FillTripError::Routing { .. } => "Check routing.access_token and the coordinates",
            FillTripError::Geocoding { .. } => "Check geocoding.endpoint and try a longer place name",
            FillTripError::Csv(_) => "Check the catalog CSV header and rows",
            FillTripError::Config { .. }
            | FillTripError::MissingConfig { .. }
            | FillTripError::InvalidConfigValue { .. } => "Fix the configuration file and retry",
            _ => "Retry the operation",
        }
    }
}

pub type Result<T> = std::result::Result<T, FillTripError>;
