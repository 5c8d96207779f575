//! Getting granules into the raw-data directory: running the external
//! download script and moving its output out of the staging directory.

pub mod retrieval;
pub mod stager;

pub use retrieval::RetrievalRunner;
pub use stager::{Stager, StagingReport};
