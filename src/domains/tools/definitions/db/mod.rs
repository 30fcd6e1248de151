pub mod query;
pub mod store;

pub use query::{QueryResult, SqliteQueryTool};
pub use store::{StoreDeleteTool, StoreGetTool, StoreListTool, StorePutTool};
