//! flowprep — NetFlow capture preprocessing for intrusion-detection
//! datasets.
//!
//! Ingests raw `.binetflow` captures from multiple sensor sources, fits
//! categorical encoders jointly across all of them, simplifies free-text
//! labels to a 3-way class, performs per-source class-stratified train/test
//! splits, and writes one merged training CSV plus one test CSV per source,
//! all on a single fixed output schema.

pub mod config;
pub mod data;
pub mod pipeline;
