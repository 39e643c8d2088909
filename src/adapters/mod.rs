// Adapters layer: concrete clients for the external collaborators.

pub mod geocoding;
pub mod http;
pub mod routing;

pub use geocoding::NominatimClient;
pub use http::HttpPersistence;
pub use routing::DirectionsClient;
