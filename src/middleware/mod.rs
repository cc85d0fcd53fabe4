/// Middleware module
///
/// Cross-cutting request handling: access logging and file server hit
/// counting. Authentication lives in `auth` as request extractors.

mod hit_counter;
mod request_logger;

pub use hit_counter::HitCounterMiddleware;
pub use request_logger::RequestLogger;
