pub mod fixtures;
pub mod mock;
pub mod tracing;

pub use mock::{MockResponse, MockServer, RecordedRequest};
pub use self::tracing::{CapturedEvent, init_test_tracing};
