// api - request extractors shared by every handler

pub mod context;
pub mod params;
pub mod payload;

pub use context::RequestContext;
pub use params::QueryParams;
pub use payload::Payload;
