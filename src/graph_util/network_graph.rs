use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use super::{
    Edge, EdgeID, Node, NodeID, NodeKind, DEFAULT_BANDWIDTH, DEVICE_LINK_RANGE, ROUTER_LINK_RANGE,
};
use crate::error::{RoutingError, RoutingResult};
use crate::network_struct::Graph;

pub fn distance(a: &Node, b: &Node) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

fn edge_key(a: NodeID, b: NodeID) -> (NodeID, NodeID) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// 路由器與裝置組成的無向圖。邊只會新增、不會單獨刪除，全部清除請用 `clear`。
#[derive(Clone, Debug, Default)]
pub struct NetworkGraph {
    nodes: BTreeMap<NodeID, Node>,
    edges: Vec<Edge>,
    edge_index: HashMap<(NodeID, NodeID), EdgeID>,
    adjacency: HashMap<NodeID, Vec<NodeID>>,
}

impl NetworkGraph {
    pub fn new() -> Self {
        NetworkGraph::default()
    }
    fn check_exist(&self, id: NodeID) -> RoutingResult<&Node> {
        self.nodes.get(&id).ok_or(RoutingError::UnknownNode(id))
    }
    /// 取同前綴標籤中最大的編號再加一，手動給的標籤也算在內
    fn next_label(&self, kind: NodeKind) -> String {
        let prefix = kind.label_prefix();
        let max = self
            .nodes
            .values()
            .filter_map(|n| n.label.strip_prefix(prefix))
            .filter_map(|suffix| suffix.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        format!("{}{}", prefix, max + 1)
    }

    /// 插入節點，不自動連線。
    pub fn add_node(&mut self, mut node: Node) -> RoutingResult<NodeID> {
        if self.nodes.contains_key(&node.id) {
            return Err(RoutingError::DuplicateId(node.id));
        }
        if node.label.is_empty() {
            node.label = self.next_label(node.kind);
        }
        let id = node.id;
        self.nodes.insert(id, node);
        self.adjacency.insert(id, vec![]);
        Ok(id)
    }

    /// 插入節點並依距離自動連線：
    /// 路由器連到 `ROUTER_LINK_RANGE` 內的所有節點，裝置只連到 `DEVICE_LINK_RANGE` 內的路由器。
    pub fn place_node(&mut self, node: Node) -> RoutingResult<Vec<EdgeID>> {
        let id = self.add_node(node)?;
        let placed = self.check_exist(id)?.clone();
        let candidates: Vec<(NodeID, f64)> = self
            .nodes
            .values()
            .filter(|other| other.id != id)
            .filter_map(|other| {
                let dist = distance(&placed, other);
                let in_range = match placed.kind {
                    NodeKind::Router => dist <= ROUTER_LINK_RANGE,
                    NodeKind::Device => other.kind.is_router() && dist <= DEVICE_LINK_RANGE,
                };
                if in_range {
                    Some((other.id, dist))
                } else {
                    None
                }
            })
            .collect();
        let mut created = Vec::with_capacity(candidates.len());
        for (other, dist) in candidates {
            created.push(self.add_edge((id, other), dist)?);
        }
        debug!(node = id.0, edges = created.len(), "placed node");
        Ok(created)
    }

    pub fn add_edge(&mut self, id_pair: (NodeID, NodeID), weight: f64) -> RoutingResult<EdgeID> {
        self.add_link(id_pair, weight, DEFAULT_BANDWIDTH)
    }

    /// 以兩端點目前的歐氏距離作為權重加入邊
    pub fn connect(&mut self, id_pair: (NodeID, NodeID)) -> RoutingResult<EdgeID> {
        let dist = distance(self.check_exist(id_pair.0)?, self.check_exist(id_pair.1)?);
        self.add_edge(id_pair, dist)
    }

    pub fn add_link(
        &mut self,
        id_pair: (NodeID, NodeID),
        weight: f64,
        bandwidth: f64,
    ) -> RoutingResult<EdgeID> {
        let (a, b) = id_pair;
        let source_kind = self.check_exist(a)?.kind;
        let target_kind = self.check_exist(b)?.kind;
        if a == b {
            return Err(RoutingError::SelfLoop(a));
        }
        if source_kind == NodeKind::Device && target_kind == NodeKind::Device {
            return Err(RoutingError::DeviceLink {
                device: a,
                other: b,
            });
        }
        if !(weight >= 0.0 && weight.is_finite()) {
            return Err(RoutingError::InvalidParameter {
                name: "weight",
                value: weight,
            });
        }
        if !(bandwidth > 0.0 && bandwidth.is_finite()) {
            return Err(RoutingError::InvalidParameter {
                name: "bandwidth",
                value: bandwidth,
            });
        }
        let key = edge_key(a, b);
        if self.edge_index.contains_key(&key) {
            return Err(RoutingError::DuplicateEdge(a, b));
        }
        let id = EdgeID(self.edges.len());
        self.edges.push(Edge {
            id,
            source: a,
            target: b,
            weight,
            source_kind,
            target_kind,
            traffic_load: 0.0,
            bandwidth,
            utilization: 0.0,
        });
        self.edge_index.insert(key, id);
        self.adjacency.entry(a).or_default().push(b);
        self.adjacency.entry(b).or_default().push(a);
        Ok(id)
    }

    /// 只移動節點，連接邊的權重要由呼叫端另外以 `recompute_incident_weights` 更新
    pub fn update_node_position(&mut self, id: NodeID, x: f64, y: f64) -> RoutingResult<()> {
        let node = self.nodes.get_mut(&id).ok_or(RoutingError::UnknownNode(id))?;
        node.x = x;
        node.y = y;
        Ok(())
    }

    pub fn recompute_weight(&mut self, edge_id: EdgeID) -> RoutingResult<f64> {
        let edge = self.edge(edge_id).ok_or(RoutingError::UnknownEdge(edge_id))?;
        let dist = distance(self.check_exist(edge.source)?, self.check_exist(edge.target)?);
        self.edges[edge_id.0].weight = dist;
        Ok(dist)
    }

    pub fn recompute_incident_weights(&mut self, id: NodeID) -> RoutingResult<()> {
        self.check_exist(id)?;
        let incident: Vec<EdgeID> = self.incident_edges(id).map(|e| e.id).collect();
        for edge_id in incident {
            self.recompute_weight(edge_id)?;
        }
        Ok(())
    }

    pub fn set_weight(&mut self, edge_id: EdgeID, weight: f64) -> RoutingResult<()> {
        if !(weight >= 0.0 && weight.is_finite()) {
            return Err(RoutingError::InvalidParameter {
                name: "weight",
                value: weight,
            });
        }
        let edge = self
            .edges
            .get_mut(edge_id.0)
            .ok_or(RoutingError::UnknownEdge(edge_id))?;
        edge.weight = weight;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.edge_index.clear();
        self.adjacency.clear();
    }

    pub fn node(&self, id: NodeID) -> Option<&Node> {
        self.nodes.get(&id)
    }
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }
    pub fn edge(&self, id: EdgeID) -> Option<&Edge> {
        self.edges.get(id.0)
    }
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }
    pub fn edge_between(&self, a: NodeID, b: NodeID) -> Option<&Edge> {
        self.edge_index
            .get(&edge_key(a, b))
            .and_then(|id| self.edges.get(id.0))
    }
    pub fn neighbors(&self, id: NodeID) -> &[NodeID] {
        self.adjacency.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }
    pub fn adjacency(&self) -> &HashMap<NodeID, Vec<NodeID>> {
        &self.adjacency
    }
    pub fn incident_edges(&self, id: NodeID) -> impl Iterator<Item = &Edge> + '_ {
        self.neighbors(id).iter().filter_map(move |&next| {
            let edge = self.edge_between(id, next);
            debug_assert!(edge.is_some(), "鄰接表與邊集合不一致");
            edge
        })
    }
    /// 路徑上每一段對應的邊，路徑不連通時回傳 None
    pub fn get_edge_ids(&self, path: &[NodeID]) -> Option<Vec<EdgeID>> {
        path.windows(2)
            .map(|pair| self.edge_index.get(&edge_key(pair[0], pair[1])).copied())
            .collect()
    }
    pub fn get_node_cnt(&self) -> usize {
        self.nodes.len()
    }
    pub fn get_edge_cnt(&self) -> usize {
        self.edges.len()
    }
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn node_mut(&mut self, id: NodeID) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }
    pub(crate) fn edges_mut(&mut self) -> &mut [Edge] {
        &mut self.edges
    }
}

impl Graph<NodeID> for NetworkGraph {
    fn contains_node(&self, id: NodeID) -> bool {
        self.nodes.contains_key(&id)
    }
    fn foreach_edge(&self, id: NodeID, mut callback: impl FnMut(NodeID, f64)) {
        for edge in self.incident_edges(id) {
            if let Some(next) = edge.other(id) {
                callback(next, edge.weight);
            }
        }
    }
    fn foreach_node(&self, mut callback: impl FnMut(NodeID)) {
        for &id in self.nodes.keys() {
            callback(id);
        }
    }
    fn get_weight(&self, id_pair: (NodeID, NodeID)) -> Option<f64> {
        self.edge_between(id_pair.0, id_pair.1).map(|e| e.weight)
    }
}
