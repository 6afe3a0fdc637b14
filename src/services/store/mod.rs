pub mod client;
pub mod records;

pub use client::{PracticeStore, StoreError, Table};
pub use records::Record;
