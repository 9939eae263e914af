pub mod ingest;
pub mod scheduler;
pub mod sync;
pub mod youtube;
