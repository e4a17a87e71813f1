pub mod ingest_worker;
pub mod mpsc_ingest_queue;

pub use ingest_worker::IngestWorkerPool;
pub use mpsc_ingest_queue::MpscIngestQueue;
