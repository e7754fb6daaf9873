//! Price transport for pricelight.

pub mod http;
pub mod source;

pub use http::{HttpPriceSource, PriceEndpoint};
pub use source::{FetchError, FetchRequest, FetchResponse, MockPriceSource, PriceSource};
