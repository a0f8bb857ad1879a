pub mod client;
pub mod envelope;
pub mod error;
pub mod pincode;
pub mod places;
pub(crate) mod retry;

pub use client::{Ack, FieldOpsClient, ListEndpoint};
pub use error::ApiError;
pub use pincode::PincodeClient;
pub use places::PlaceSearchClient;
