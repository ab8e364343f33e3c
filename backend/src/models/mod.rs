pub mod log;
pub mod query;

pub use log::{LogRecord, MongoDate, RecordMetadata};
pub use query::{QueryDataset, QueryResult};
