pub mod execute;

pub use execute::{handle, QueryRequest};
