//! Data layer: core types and the per-stage transforms.
//!
//! Architecture:
//! ```text
//!  sensor*.binetflow (one per source)
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → FlowFrame (partial records)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  encode   │  fit EncoderTable once over ALL sources
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐     ┌──────────┐
//!   │  label    │ ──▶ │  split    │  simplify labels, stratified 70/30
//!   └──────────┘     └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐     ┌──────────┐
//!   │  schema   │ ──▶ │  writer   │  reconcile to Final Schema, emit CSV
//!   └──────────┘     └──────────┘
//! ```

pub mod encode;
pub mod label;
pub mod loader;
pub mod model;
pub mod schema;
pub mod split;
pub mod writer;
