//! flatgraph — shared-buffer adjacency engine for typed directed
//! multigraphs.
//!
//! The whole graph lives in two flat, fixed-width word buffers (one for
//! node records, one for edge records), each packing a header, an
//! open-addressed bucket table with collision chains, and intrusive
//! doubly-linked per-(node, type) adjacency lists into a single
//! contiguous region. Growth, shrinking and tombstone compaction happen
//! under a load-factor policy without ever leaving the flat layout, so a
//! snapshot is nothing more than the raw buffers and can cross thread or
//! process boundaries by reference.
//!
//! Mutation is single-writer; see [`AdjacencyList`] for the operation
//! surface and `Serialized`/`SerializedOwned` for snapshot handoff.
//!
//! ```
//! use flatgraph::{AdjacencyList, TypeFilter};
//!
//! let mut graph: AdjacencyList = AdjacencyList::new();
//! let a = graph.add_node()?;
//! let b = graph.add_node()?;
//! graph.add_edge(a, b, 1)?;
//! assert!(graph.has_edge(a, b, 1));
//! assert_eq!(graph.get_node_ids_connected_from(a, TypeFilter::All), vec![b]);
//! # Ok::<(), flatgraph::GraphError>(())
//! ```

pub mod adjacency;
pub mod error;
pub mod traversal;
pub mod word;

mod map;

pub use adjacency::{
    AdjacencyList, AdjacencyListOptions, AllEdges, Edge, InboundEdge, NodeId, OutboundEdge,
    Serialized, SerializedOwned, Stats, TypeFilter, ALL_EDGE_TYPES, NULL_EDGE_TYPE,
};
pub use error::{GraphError, Result};
pub use map::MIN_CAPACITY;
pub use word::Word;
