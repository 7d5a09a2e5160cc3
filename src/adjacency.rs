//! AdjacencyList — the engine composing the node and edge maps.
//!
//! Owns the capacity policy (growth, shrink, tombstone compaction), the
//! add/remove/query surface, snapshot serialization and distribution
//! stats. Mutation is single-writer; snapshots hand the raw word buffers
//! across thread or process boundaries without reshaping them.

use std::io::Write;

use serde::Serialize;
use tracing::debug;

use crate::error::{GraphError, Result};
use crate::map::edge::{EdgeTypeMap, PEAK_CAPACITY};
use crate::map::node::NodeTypeMap;
use crate::map::shared::LiveItems;
use crate::map::{BUCKET_SIZE, MIN_CAPACITY};
use crate::word::Word;

/// Node identifier minted by [`AdjacencyList::add_node`].
pub type NodeId = u32;

/// Default edge type when a caller has no type taxonomy. Type 0 is the
/// reserved null tag, so untyped graphs use 1.
pub const NULL_EDGE_TYPE: u32 = 1;

/// Signed sentinel requesting a wildcard match across all edge types.
/// Converts to [`TypeFilter::All`].
pub const ALL_EDGE_TYPES: i32 = -1;

// ── Capacity policy constants ──────────────────────────────────────

const LOAD_FACTOR: f64 = 0.7;
const UNLOAD_FACTOR: f64 = 0.3;
const MAX_GROW_FACTOR: f64 = 8.0;
const MIN_GROW_FACTOR: f64 = 2.0;
const SHRINK_FACTOR: f64 = 0.5;

// ── Snapshot byte format ───────────────────────────────────────────
//
// ```text
// [magic: b"FGS1"]          4
// [version: u16 LE = 1]     2
// [word_bits: u8]           1
// [reserved: u8 = 0]        1
// [node_words: u32 LE]      4
// [edge_words: u32 LE]      4
// [node buffer, words LE]
// [edge buffer, words LE]
// ```

const SNAPSHOT_MAGIC: [u8; 4] = *b"FGS1";
const SNAPSHOT_VERSION: u16 = 1;
const SNAPSHOT_HEADER_SIZE: usize = 16;

// ── Type filters ───────────────────────────────────────────────────

/// Edge-type selector for neighborhood queries: a single type, a set of
/// types, or the wildcard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeFilter {
    /// Match every edge type.
    All,
    /// Match exactly one type.
    One(u32),
    /// Match any type in the set.
    Any(Vec<u32>),
}

impl TypeFilter {
    pub fn matches(&self, edge_type: u32) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::One(t) => *t == edge_type,
            TypeFilter::Any(ts) => ts.contains(&edge_type),
        }
    }
}

impl From<u32> for TypeFilter {
    fn from(t: u32) -> Self {
        TypeFilter::One(t)
    }
}

/// Signed types support the [`ALL_EDGE_TYPES`] sentinel: any negative
/// value selects the wildcard.
impl From<i32> for TypeFilter {
    fn from(t: i32) -> Self {
        if t < 0 {
            TypeFilter::All
        } else {
            TypeFilter::One(t as u32)
        }
    }
}

impl From<&[u32]> for TypeFilter {
    fn from(ts: &[u32]) -> Self {
        TypeFilter::Any(ts.to_vec())
    }
}

impl From<Vec<u32>> for TypeFilter {
    fn from(ts: Vec<u32>) -> Self {
        TypeFilter::Any(ts)
    }
}

// ── Public record types ────────────────────────────────────────────

/// A live edge triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub edge_type: u32,
}

/// One inbound edge of a node, as (source, type).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct InboundEdge {
    pub from: NodeId,
    pub edge_type: u32,
}

/// One outbound edge of a node, as (target, type).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct OutboundEdge {
    pub to: NodeId,
    pub edge_type: u32,
}

// ── Construction options ───────────────────────────────────────────

/// Initial capacities for a fresh list. Both default to the minimum and
/// grow on demand.
#[derive(Debug, Clone)]
pub struct AdjacencyListOptions {
    pub node_capacity: u32,
    pub edge_capacity: u32,
}

impl Default for AdjacencyListOptions {
    fn default() -> Self {
        Self {
            node_capacity: MIN_CAPACITY,
            edge_capacity: MIN_CAPACITY,
        }
    }
}

// ── Snapshots ──────────────────────────────────────────────────────

/// Borrowed view of both word buffers. The slices alias live map memory:
/// they are the map, not a copy of it.
#[derive(Debug, Clone, Copy)]
pub struct Serialized<'a, W: Word> {
    pub nodes: &'a [W],
    pub edges: &'a [W],
}

impl<W: Word> Serialized<'_, W> {
    /// Detach an owned snapshot, e.g. to hand to another thread.
    pub fn to_owned(self) -> SerializedOwned<W> {
        SerializedOwned {
            nodes: self.nodes.to_vec(),
            edges: self.edges.to_vec(),
        }
    }
}

/// Owned snapshot of both word buffers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SerializedOwned<W: Word> {
    pub nodes: Vec<W>,
    pub edges: Vec<W>,
}

// ── Stats ──────────────────────────────────────────────────────────

/// Point-in-time observability snapshot.
///
/// Bucket metrics cover the edge map: `collisions` counts items beyond
/// the first per occupied bucket, `uniformity` is the chained-probe
/// estimator that sits near 1.0 for a Poisson-uniform hash.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub nodes: u32,
    pub node_edge_types: u32,
    pub node_capacity: u32,
    pub node_buffer_size: usize,
    pub node_load: f64,
    pub edges: u32,
    pub deleted: u32,
    pub edge_capacity: u32,
    pub edge_buffer_size: usize,
    pub edge_load: f64,
    pub edge_load_with_deletes: f64,
    pub collisions: u32,
    pub max_collisions: u32,
    pub avg_collisions: f64,
    pub uniformity: f64,
}

// ── AdjacencyList ──────────────────────────────────────────────────

/// Typed directed multigraph over two flat shared-buffer maps.
///
/// Parametric over the storage word width: `u32` (default), `u16` or
/// `u8`. Narrower widths shrink the buffer footprint and proportionally
/// cap capacity; the logical behavior is identical at every width.
#[derive(Debug, Clone)]
pub struct AdjacencyList<W: Word = u32> {
    nodes: NodeTypeMap<W>,
    edges: EdgeTypeMap<W>,
}

impl<W: Word> Default for AdjacencyList<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Word> AdjacencyList<W> {
    // ── Constructors ────────────────────────────────────────────────

    /// Fresh list at minimum capacity.
    pub fn new() -> Self {
        Self {
            nodes: NodeTypeMap::with_capacity(MIN_CAPACITY),
            edges: EdgeTypeMap::with_capacity(MIN_CAPACITY),
        }
    }

    /// Fresh list with explicit initial capacities.
    pub fn with_options(options: AdjacencyListOptions) -> Result<Self> {
        Self::with_capacities(options.node_capacity, options.edge_capacity)
    }

    fn with_capacities(node_capacity: u32, edge_capacity: u32) -> Result<Self> {
        let node_max = NodeTypeMap::<W>::max_capacity();
        if node_capacity > node_max {
            return Err(GraphError::CapacityOverflow {
                map: "node",
                max: node_max,
            });
        }
        let edge_max = EdgeTypeMap::<W>::max_capacity();
        if edge_capacity > edge_max {
            return Err(GraphError::CapacityOverflow {
                map: "edge",
                max: edge_max,
            });
        }
        Ok(Self {
            nodes: NodeTypeMap::with_capacity(node_capacity.max(MIN_CAPACITY)),
            edges: EdgeTypeMap::with_capacity(edge_capacity.max(MIN_CAPACITY)),
        })
    }

    /// Adopt previously serialized buffers. Each buffer's length must
    /// match the length implied by its own capacity header.
    pub fn deserialize(snapshot: SerializedOwned<W>) -> Result<Self> {
        Ok(Self {
            nodes: NodeTypeMap::from_words(snapshot.nodes)?,
            edges: EdgeTypeMap::from_words(snapshot.edges)?,
        })
    }

    // ── Mutation ────────────────────────────────────────────────────

    /// Mint a new node id. No record is allocated until an edge first
    /// touches the id.
    pub fn add_node(&mut self) -> Result<NodeId> {
        let id = self.nodes.mint_id();
        if self.nodes.load(self.nodes.count()) > LOAD_FACTOR {
            let target = Self::next_node_capacity(self.nodes.capacity());
            self.resize_nodes(target)?;
        }
        if id >= self.nodes.capacity() {
            return Err(GraphError::CapacityOverflow {
                map: "node",
                max: NodeTypeMap::<W>::max_capacity(),
            });
        }
        Ok(id)
    }

    /// Add the edge (from, to, edge_type). Returns `false` if the triple
    /// is already present (the map is unchanged). Both endpoints must be
    /// minted ids and the type must be a nonzero word value.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, edge_type: u32) -> Result<bool> {
        if edge_type == 0 || edge_type > W::MAX_VALUE {
            return Err(GraphError::InvalidEdgeType);
        }
        let next_id = self.nodes.next_id();
        if from >= next_id {
            return Err(GraphError::InvalidNodeId { id: from, next_id });
        }
        if to >= next_id {
            return Err(GraphError::InvalidNodeId { id: to, next_id });
        }

        let mut hash = self.edges.hash(from, to, edge_type);
        if self.edges.address_of(hash, from, to, edge_type) != 0 {
            return Ok(false);
        }

        let count = self.edges.count();
        let deletes = self.edges.deletes();
        let total = count + 1 + deletes;
        if self.edges.load(total) > LOAD_FACTOR {
            let capacity = self.edges.capacity();
            let target = if self.edges.load(deletes) > UNLOAD_FACTOR {
                // Enough holes for a rebuild to pay for itself: size for
                // the live records only and drop the tombstones.
                self.next_edge_capacity(capacity, count + 1, self.edges.load(count + 1))?
            } else {
                self.next_edge_capacity(capacity, total, self.edges.load(total))?
            };
            self.rebuild_edges(target)?;
            hash = self.edges.hash(from, to, edge_type);
        }

        let mut to_rec = self.nodes.address_of(to, edge_type);
        let mut from_rec = self.nodes.address_of(from, edge_type);
        if (to_rec == 0 || from_rec == 0) && self.nodes.load(self.nodes.count()) >= LOAD_FACTOR {
            let target = Self::next_node_capacity(self.nodes.capacity());
            self.resize_nodes(target)?;
            to_rec = self.nodes.address_of(to, edge_type);
            from_rec = self.nodes.address_of(from, edge_type);
        }
        if to_rec == 0 {
            to_rec = self.nodes.add(to, edge_type)?;
        }
        if from_rec == 0 {
            // A self-loop just created its record under the `to` lookup.
            from_rec = if from == to {
                to_rec
            } else {
                self.nodes.add(from, edge_type)?
            };
        }

        let edge = self.edges.add(hash, from, to, edge_type);

        let prev_in = self.nodes.link_in(to_rec, edge);
        if prev_in != 0 {
            self.edges.link_in(prev_in, edge);
        }
        let prev_out = self.nodes.link_out(from_rec, edge);
        if prev_out != 0 {
            self.edges.link_out(prev_out, edge);
        }
        Ok(true)
    }

    /// Remove the edge (from, to, edge_type). Returns `false` if absent.
    /// The slot becomes a tombstone until the next rebuild.
    pub fn remove_edge(&mut self, from: NodeId, to: NodeId, edge_type: u32) -> Result<bool> {
        if edge_type == 0 || edge_type > W::MAX_VALUE {
            return Ok(false);
        }
        let hash = self.edges.hash(from, to, edge_type);
        let edge = self.edges.address_of(hash, from, to, edge_type);
        if edge == 0 {
            return Ok(false);
        }
        let to_rec = self.nodes.address_of(to, edge_type);
        if to_rec == 0 {
            return Err(GraphError::Inconsistent(
                "live edge without a (to, type) node record",
            ));
        }
        let from_rec = self.nodes.address_of(from, edge_type);
        if from_rec == 0 {
            return Err(GraphError::Inconsistent(
                "live edge without a (from, type) node record",
            ));
        }

        self.nodes
            .unlink_in(to_rec, edge, self.edges.prev_in(edge), self.edges.next_in(edge));
        self.nodes.unlink_out(
            from_rec,
            edge,
            self.edges.prev_out(edge),
            self.edges.next_out(edge),
        );
        self.edges.unlink(hash, edge);
        self.edges.unlink_in(edge);
        self.edges.unlink_out(edge);
        self.edges.delete(edge);
        Ok(true)
    }

    /// Reset to a freshly constructed list at minimum capacity.
    pub fn clear(&mut self) {
        self.nodes = NodeTypeMap::with_capacity(MIN_CAPACITY);
        self.edges = EdgeTypeMap::with_capacity(MIN_CAPACITY);
    }

    // ── Capacity policy ─────────────────────────────────────────────

    fn next_node_capacity(capacity: u32) -> u32 {
        let target = (capacity as f64 * MIN_GROW_FACTOR).round() as u32;
        target.clamp(MIN_CAPACITY, NodeTypeMap::<W>::max_capacity())
    }

    /// Target edge capacity for a prospective live count at a given load.
    ///
    /// The grow factor decays linearly from 8x at small capacities to 2x
    /// at `PEAK_CAPACITY`, so young maps grow in big cheap steps and
    /// mature maps stop doubling their (large) footprint eightfold.
    fn next_edge_capacity(&self, capacity: u32, count: u32, load: f64) -> Result<u32> {
        let target = if load > LOAD_FACTOR {
            let pct = (capacity as f64 / PEAK_CAPACITY as f64).clamp(0.0, 1.0);
            let grow = MAX_GROW_FACTOR + (MIN_GROW_FACTOR - MAX_GROW_FACTOR) * pct;
            (capacity as f64 * grow).round() as u32
        } else if load < UNLOAD_FACTOR {
            (capacity as f64 * SHRINK_FACTOR).round() as u32
        } else {
            capacity
        };
        let target = target.clamp(MIN_CAPACITY, EdgeTypeMap::<W>::max_capacity());
        if count > target * BUCKET_SIZE {
            return Err(GraphError::CapacityOverflow {
                map: "edge",
                max: EdgeTypeMap::<W>::max_capacity(),
            });
        }
        Ok(target)
    }

    /// Rebuild the edge map at the given capacity (clamped to the width's
    /// valid range). Live edges are re-added into fresh buffers, which
    /// rebuilds every hash chain and adjacency list and drops tombstones.
    pub fn resize_edges(&mut self, capacity: u32) -> Result<()> {
        let capacity = capacity.clamp(MIN_CAPACITY, EdgeTypeMap::<W>::max_capacity());
        if capacity == self.edges.capacity() && self.edges.deletes() == 0 {
            return Ok(());
        }
        self.rebuild_edges(capacity)
    }

    fn rebuild_edges(&mut self, new_capacity: u32) -> Result<()> {
        let live = self.edges.count();
        debug!(
            old_capacity = self.edges.capacity(),
            new_capacity,
            live,
            tombstones = self.edges.deletes(),
            "rebuilding edge map"
        );
        let mut next = Self::with_capacities(self.nodes.capacity(), new_capacity)?;
        next.nodes.set_next_id(self.nodes.next_id());
        for edge in self.edges.live_items() {
            let from = self.edges.from_of(edge);
            let to = self.edges.to_of(edge);
            let ty = self.edges.type_of(edge);
            next.add_edge(from, to, ty)?;
        }
        debug_assert_eq!(next.edges.count(), live);
        *self = next;
        Ok(())
    }

    /// Rebase the node map into a wider table. Bucket heads and record
    /// chains shift with the item region; the stored in/out list heads
    /// address the edge buffer and stay put.
    fn resize_nodes(&mut self, new_capacity: u32) -> Result<()> {
        if new_capacity == self.nodes.capacity() {
            return Ok(());
        }
        debug!(
            old_capacity = self.nodes.capacity(),
            new_capacity,
            next_id = self.nodes.next_id(),
            "rebuilding node map"
        );
        let mut next = NodeTypeMap::with_capacity(new_capacity);
        next.copy_rebased(&self.nodes)?;
        self.nodes = next;
        Ok(())
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Number of node ids minted so far.
    pub fn node_count(&self) -> u32 {
        self.nodes.next_id()
    }

    /// Number of live edges.
    pub fn edge_count(&self) -> u32 {
        self.edges.count()
    }

    pub fn node_capacity(&self) -> u32 {
        self.nodes.capacity()
    }

    pub fn edge_capacity(&self) -> u32 {
        self.edges.capacity()
    }

    fn probe(&self, from: NodeId, to: NodeId, edge_type: u32) -> bool {
        edge_type != 0
            && self
                .edges
                .address_of(self.edges.hash(from, to, edge_type), from, to, edge_type)
                != 0
    }

    /// True if an edge matching the filter connects `from` to `to`.
    pub fn has_edge(&self, from: NodeId, to: NodeId, filter: impl Into<TypeFilter>) -> bool {
        match filter.into() {
            TypeFilter::One(ty) => self.probe(from, to, ty),
            TypeFilter::Any(ts) => ts.iter().any(|&ty| self.probe(from, to, ty)),
            TypeFilter::All => {
                let mut rec = self.nodes.head(from);
                while rec != 0 {
                    if self.probe(from, to, self.nodes.type_of(rec)) {
                        return true;
                    }
                    rec = self.nodes.next_of(rec);
                }
                false
            }
        }
    }

    /// True if any edge of any type points at `to`.
    pub fn has_inbound_edges(&self, to: NodeId) -> bool {
        let mut rec = self.nodes.head(to);
        while rec != 0 {
            if self.nodes.first_in(rec) != 0 {
                return true;
            }
            rec = self.nodes.next_of(rec);
        }
        false
    }

    /// Every inbound edge of `to`, grouped by the node's type records.
    pub fn get_inbound_edges_by_type(&self, to: NodeId) -> Vec<InboundEdge> {
        let mut out = Vec::new();
        let mut rec = self.nodes.head(to);
        while rec != 0 {
            let edge_type = self.nodes.type_of(rec);
            let mut edge = self.nodes.first_in(rec);
            while edge != 0 {
                out.push(InboundEdge {
                    from: self.edges.from_of(edge),
                    edge_type,
                });
                edge = self.edges.next_in(edge);
            }
            rec = self.nodes.next_of(rec);
        }
        out
    }

    /// Every outbound edge of `from`, grouped by the node's type records.
    pub fn get_outbound_edges_by_type(&self, from: NodeId) -> Vec<OutboundEdge> {
        let mut out = Vec::new();
        let mut rec = self.nodes.head(from);
        while rec != 0 {
            let edge_type = self.nodes.type_of(rec);
            let mut edge = self.nodes.first_out(rec);
            while edge != 0 {
                out.push(OutboundEdge {
                    to: self.edges.to_of(edge),
                    edge_type,
                });
                edge = self.edges.next_out(edge);
            }
            rec = self.nodes.next_of(rec);
        }
        out
    }

    /// Ids with an edge into `to` matching the filter, de-duplicated,
    /// first occurrence in edge-insertion order.
    pub fn get_node_ids_connected_to(
        &self,
        to: NodeId,
        filter: impl Into<TypeFilter>,
    ) -> Vec<NodeId> {
        self.connected(to, &filter.into(), true)
    }

    /// Ids reachable over one edge out of `from` matching the filter,
    /// de-duplicated, first occurrence in edge-insertion order.
    pub fn get_node_ids_connected_from(
        &self,
        from: NodeId,
        filter: impl Into<TypeFilter>,
    ) -> Vec<NodeId> {
        self.connected(from, &filter.into(), false)
    }

    fn connected(&self, node: NodeId, filter: &TypeFilter, inbound: bool) -> Vec<NodeId> {
        // Collect (slot, neighbor) per matching type record. Slot offsets
        // grow with insertion, so sorting merges the per-type lists back
        // into one insertion-ordered sequence.
        let mut hits: Vec<(u32, NodeId)> = Vec::new();
        let mut matched_records = 0;
        let mut rec = self.nodes.head(node);
        while rec != 0 {
            if filter.matches(self.nodes.type_of(rec)) {
                matched_records += 1;
                let mut edge = if inbound {
                    self.nodes.first_in(rec)
                } else {
                    self.nodes.first_out(rec)
                };
                while edge != 0 {
                    let neighbor = if inbound {
                        self.edges.from_of(edge)
                    } else {
                        self.edges.to_of(edge)
                    };
                    hits.push((edge, neighbor));
                    edge = if inbound {
                        self.edges.next_in(edge)
                    } else {
                        self.edges.next_out(edge)
                    };
                }
            }
            rec = self.nodes.next_of(rec);
        }
        if matched_records > 1 {
            hits.sort_unstable_by_key(|&(slot, _)| slot);
        }
        let mut out = Vec::with_capacity(hits.len());
        for (_, neighbor) in hits {
            if !out.contains(&neighbor) {
                out.push(neighbor);
            }
        }
        out
    }

    /// Iterate every live edge in buffer-scan order (insertion order with
    /// tombstones skipped). Snapshot semantics: do not mutate while
    /// holding the iterator.
    pub fn get_all_edges(&self) -> AllEdges<'_, W> {
        AllEdges {
            edges: &self.edges,
            inner: self.edges.live_items(),
        }
    }

    // ── Snapshots ───────────────────────────────────────────────────

    /// Borrow both raw word buffers. The slices alias live map memory.
    pub fn serialize(&self) -> Serialized<'_, W> {
        Serialized {
            nodes: self.nodes.words(),
            edges: self.edges.words(),
        }
    }

    /// Write the snapshot byte format (header + both buffers, LE words).
    pub fn write_to<Wr: Write>(&self, writer: &mut Wr) -> Result<()> {
        writer.write_all(&SNAPSHOT_MAGIC)?;
        writer.write_all(&SNAPSHOT_VERSION.to_le_bytes())?;
        writer.write_all(&[W::BITS as u8, 0])?;
        writer.write_all(&(self.nodes.words().len() as u32).to_le_bytes())?;
        writer.write_all(&(self.edges.words().len() as u32).to_le_bytes())?;
        for &w in self.nodes.words() {
            writer.write_all(&w.to_u32().to_le_bytes()[..W::BYTES])?;
        }
        for &w in self.edges.words() {
            writer.write_all(&w.to_u32().to_le_bytes()[..W::BYTES])?;
        }
        Ok(())
    }

    /// Parse the snapshot byte format produced by [`Self::write_to`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < SNAPSHOT_HEADER_SIZE {
            return Err(GraphError::Corrupt("snapshot too small for header".into()));
        }
        if bytes[0..4] != SNAPSHOT_MAGIC {
            return Err(GraphError::Corrupt(format!(
                "bad snapshot magic {:?}",
                &bytes[0..4]
            )));
        }
        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != SNAPSHOT_VERSION {
            return Err(GraphError::Corrupt(format!(
                "unsupported snapshot version {version}"
            )));
        }
        let bits = bytes[6] as u32;
        if bits != W::BITS {
            return Err(GraphError::Corrupt(format!(
                "snapshot word width {} does not match expected {}",
                bits,
                W::BITS
            )));
        }
        let node_words = u32::from_le_bytes(bytes[8..12].try_into().unwrap()) as usize;
        let edge_words = u32::from_le_bytes(bytes[12..16].try_into().unwrap()) as usize;
        let expected = SNAPSHOT_HEADER_SIZE + (node_words + edge_words) * W::BYTES;
        if bytes.len() != expected {
            return Err(GraphError::Corrupt(format!(
                "snapshot length {} does not match header-implied length {}",
                bytes.len(),
                expected
            )));
        }
        let node_start = SNAPSHOT_HEADER_SIZE;
        let edge_start = node_start + node_words * W::BYTES;
        Self::deserialize(SerializedOwned {
            nodes: read_words::<W>(&bytes[node_start..edge_start]),
            edges: read_words::<W>(&bytes[edge_start..]),
        })
    }

    // ── Stats ───────────────────────────────────────────────────────

    pub fn stats(&self) -> Stats {
        let live = self.edges.count();
        let deleted = self.edges.deletes();
        let capacity = self.edges.capacity();

        let mut collisions = 0u32;
        let mut max_collisions = 0u32;
        let mut occupied = 0u32;
        let mut chain_sum = 0.0f64;
        for len in self.edges.bucket_lens() {
            if len > 0 {
                occupied += 1;
                collisions += len - 1;
                max_collisions = max_collisions.max(len - 1);
            }
            chain_sum += f64::from(len * (len + 1)) / 2.0;
        }

        let n = f64::from(live);
        let c = f64::from(capacity);
        let uniformity = if live == 0 {
            1.0
        } else {
            chain_sum / ((n / (2.0 * c)) * (n + 2.0 * c - 1.0))
        };
        let avg_collisions = if occupied == 0 {
            0.0
        } else {
            f64::from(collisions) / f64::from(occupied)
        };

        Stats {
            nodes: self.nodes.next_id(),
            node_edge_types: self.nodes.count(),
            node_capacity: self.nodes.capacity(),
            node_buffer_size: self.nodes.byte_len(),
            node_load: self.nodes.load(self.nodes.count()),
            edges: live,
            deleted,
            edge_capacity: capacity,
            edge_buffer_size: self.edges.byte_len(),
            edge_load: self.edges.load(live),
            edge_load_with_deletes: self.edges.load(live + deleted),
            collisions,
            max_collisions,
            avg_collisions,
            uniformity,
        }
    }
}

/// Decode a little-endian word run.
fn read_words<W: Word>(bytes: &[u8]) -> Vec<W> {
    bytes
        .chunks_exact(W::BYTES)
        .map(|chunk| {
            let mut padded = [0u8; 4];
            padded[..W::BYTES].copy_from_slice(chunk);
            W::from_u32(u32::from_le_bytes(padded))
        })
        .collect()
}

/// Iterator over live edges. See [`AdjacencyList::get_all_edges`].
pub struct AllEdges<'a, W: Word> {
    edges: &'a EdgeTypeMap<W>,
    inner: LiveItems<'a, W>,
}

impl<W: Word> Iterator for AllEdges<'_, W> {
    type Item = Edge;

    fn next(&mut self) -> Option<Edge> {
        let addr = self.inner.next()?;
        Some(Edge {
            from: self.edges.from_of(addr),
            to: self.edges.to_of(addr),
            edge_type: self.edges.type_of(addr),
        })
    }
}
