//! Logic Module - Business Logic & Engines
//!
//! ## Architecture
//! - `sensitivity/` - PHI / PII detection over free text
//! - `features/` - Event feature extraction (fixed layout)
//! - `model/` - Isolation forest outlier model + scorer service
//! - `index/` - Policy similarity index and its on-disk generations
//! - `ai_bridge/` - Embedding / text-generation capabilities
//! - `rag/` - Retrieval, prompting, parsing, grounding
//! - `risk/` - Compliance risk and review priority scoring
//! - `report/` - Audit report assembly and JSONL hand-off
//! - `escalation/` - Per-event triage orchestration

pub mod config;
pub mod events;
pub mod math;

pub mod ai_bridge;
pub mod escalation;
pub mod features;
pub mod index;
pub mod model;
pub mod rag;
pub mod report;
pub mod risk;
pub mod sensitivity;
