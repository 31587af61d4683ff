pub mod extract;
pub mod pagination;
pub mod payloads;
pub mod validate;

pub use extract::ApiJson;
pub use pagination::PageQuery;
pub use validate::{required, validate_payload, Payload};
