pub mod error;
pub mod http;
pub mod memory;
pub mod ports;
pub mod types;

pub use error::StoreError;
pub use http::HttpRecordStore;
pub use memory::InMemoryRecordStore;
pub use ports::RecordStore;
pub use types::StoreConfig;
