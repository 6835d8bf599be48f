// Resume ingestion: file validation, text extraction, LLM structuring, persistence.
// All LLM calls go through llm_client; all persistence goes through store.

pub mod extract;
pub mod handlers;
pub mod ingest;
pub mod prompts;
pub mod recovery;
pub mod structured;
pub mod uploads;
