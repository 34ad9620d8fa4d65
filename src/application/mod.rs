// Application layer: input validation, mutations with persistence, reports.

pub mod error;
pub mod reporting;
pub mod service;
pub mod validation;

pub use error::*;
pub use reporting::*;
pub use service::*;
pub use validation::*;
