pub mod analysis;
pub mod cloud;
pub mod conf;
pub mod ingest;
pub mod logging;
pub mod parse;
pub mod pipeline;
pub mod record;
pub mod report;
