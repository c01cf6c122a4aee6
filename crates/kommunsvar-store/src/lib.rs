//! Supabase/PostgREST client for the municipal assistant.
//!
//! All heavy lifting (vector similarity, SQL) happens inside the remote
//! datastore; this crate only builds the filters and decodes the rows.
//! Every table is scoped by `tenant_id`.

pub mod rows;
pub mod supabase;

pub use rows::{
    ChunkMatch, MatchRequest, NewChunk, NewPage, Page, PageMeta, QueryLogRow,
};
pub use supabase::{StoreError, SupabaseClient};
