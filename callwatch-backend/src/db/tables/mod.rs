//! Database model modules - extends Database with domain-specific methods
//!
//! Each module adds `impl Database` blocks with methods for one table.

mod call_stats; // call_stats (aggregated snapshot, delete-then-insert)
mod call_summaries; // call_summaries (one per call)
mod calls; // calls (+ denormalized transcript/summary flags)
mod contacts; // contacts (natural-keyed by phone number)
mod insights; // insights (advisory notes)
mod spam_rules; // spam_rules (detection heuristics)
mod transcripts; // transcripts (one per call)

pub use calls::CallFlagRow;
