//! # vgroup Core
//!
//! Core library for the vgroup grouped-search engine.
//!
//! This crate provides the data structures the grouping engine reads:
//!
//! - [`Vector`] - Dense vector representation
//! - [`Point`] - A vector with ID and optional JSON payload
//! - [`payload`] - Dotted payload paths and payload selection
//! - [`PayloadFilter`] - Filtering by payload conditions
//! - [`Collection`] - Container for points, searched by exact scan
//!
//! ## Example
//!
//! ```rust
//! use vgroup_core::{Vector, Point, PointId, Collection, CollectionConfig, Distance};
//!
//! let config = CollectionConfig {
//!     name: "test".to_string(),
//!     vector_dim: 3,
//!     distance: Distance::Cosine,
//! };
//! let collection = Collection::new(config);
//!
//! let vector = Vector::new(vec![1.0, 0.0, 0.0]);
//! let point = Point::new(PointId::String("p1".to_string()), vector, None);
//! collection.upsert(point).unwrap();
//!
//! let query = Vector::new(vec![1.0, 0.0, 0.0]);
//! let results = collection.search(&query, 10, None).unwrap();
//! assert_eq!(results.len(), 1);
//! ```

pub mod collection;
pub mod vector;
pub mod error;
pub mod point;
pub mod payload;
pub mod filter;

pub use collection::{recommend_query, Collection, CollectionConfig, Distance};
pub use vector::Vector;
pub use error::{Error, Result};
pub use point::{rank_cmp, Point, PointId, Record};
pub use payload::WithPayload;
pub use filter::{Filter, PayloadFilter, FilterCondition};
