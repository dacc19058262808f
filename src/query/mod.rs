pub mod catalog;

pub use catalog::{QueryCatalog, Report};
