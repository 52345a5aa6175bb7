// Library root for the runcast binary: table boundary, run summary and the
// run pipeline, exposed for integration tests.

pub mod run;
pub mod summary;
pub mod tables;
