//! # vgroup Grouping
//!
//! Groups ranked search and recommendation hits by a payload field.
//!
//! Instead of the plain top-N hits, a grouped request returns at most
//! `limit` groups of at most `per_group` hits, where a group is every hit
//! sharing the value of the `group_by` field. The engine repeatedly asks a
//! [`CandidateSource`] for larger pools of candidates, skipping points it
//! has already seen, until the best `limit` groups are full or the source
//! has nothing more to give.
//!
//! - [`GroupRequest`] - What to search for and how to group it
//! - [`CandidateSource`] - The ranking primitive being grouped
//! - [`GroupsAggregator`] - Per-request group accumulation
//! - [`ExpansionController`] - Round-by-round pool expansion
//! - [`GroupingEngine`] - Validation, expansion, hydration and assembly
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use vgroup_core::{Collection, CollectionConfig, Distance, Point, PointId, Vector};
//! use vgroup_grouping::{GroupRequest, GroupingEngine};
//!
//! let collection = Collection::new(CollectionConfig {
//!     name: "chunks".to_string(),
//!     vector_dim: 2,
//!     distance: Distance::Dot,
//! });
//! for i in 0..9u64 {
//!     let payload = json!({ "docId": format!("doc_{}", i % 3) });
//!     collection
//!         .upsert(Point::new(PointId::Integer(i), Vector::new(vec![i as f32, 1.0]), Some(payload)))
//!         .unwrap();
//! }
//!
//! let request = GroupRequest::search(Vector::new(vec![1.0, 0.0]), "docId", 2, 2);
//! let result = GroupingEngine::default().search_groups(&collection, &request).unwrap();
//!
//! assert_eq!(result.groups.len(), 2);
//! assert_eq!(result.groups[0].group_id["docId"], json!("doc_2"));
//! assert_eq!(result.groups[0].hits.len(), 2);
//! ```

pub mod aggregator;
pub mod assemble;
pub mod cancel;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod key;
pub mod request;
pub mod source;
pub mod types;

pub use aggregator::{Group, GroupsAggregator, Offer, RejectReason};
pub use assemble::assemble;
pub use cancel::Cancellation;
pub use config::GroupingConfig;
pub use controller::{ExpansionController, ExpansionState, GroupingSession, SessionStats};
pub use engine::GroupingEngine;
pub use error::{GroupingError, Result};
pub use key::GroupKey;
pub use request::{GroupRequest, RecommendQuery, SearchQuery, SourceQuery};
pub use source::{CandidateSource, CollectionSource, FetchRequest, KeyScope, PreparedQuery, ShardedSource};
pub use types::{GroupsResult, PointGroup, ScoredCandidate};
