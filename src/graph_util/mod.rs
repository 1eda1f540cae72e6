use serde::{Deserialize, Serialize};

mod network_graph;
pub use network_graph::{distance, NetworkGraph};

mod memorizing_graph;
pub use memorizing_graph::LoadMemory;

/// 放置路由器時，連到此距離內的所有節點
pub const ROUTER_LINK_RANGE: f64 = 500.0;
/// 放置裝置時，只連到此距離內的路由器
pub const DEVICE_LINK_RANGE: f64 = 200.0;
pub const DEFAULT_BANDWIDTH: f64 = 100.0;

#[derive(Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeID(pub u64);
impl From<u64> for NodeID {
    fn from(i: u64) -> Self {
        NodeID(i)
    }
}
impl From<NodeID> for u64 {
    fn from(id: NodeID) -> Self {
        id.0
    }
}

#[derive(Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Debug)]
pub struct EdgeID(pub(crate) usize);
impl From<usize> for EdgeID {
    fn from(i: usize) -> Self {
        EdgeID(i)
    }
}
impl From<EdgeID> for usize {
    fn from(id: EdgeID) -> Self {
        id.0
    }
}

#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Router,
    Device,
}
impl NodeKind {
    pub fn is_router(&self) -> bool {
        matches!(self, NodeKind::Router)
    }
    fn label_prefix(&self) -> &'static str {
        match self {
            NodeKind::Router => "R",
            NodeKind::Device => "D",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: NodeID,
    pub x: f64,
    pub y: f64,
    /// 空字串代表由圖自動命名
    pub label: String,
    pub kind: NodeKind,
    /// 平均連接邊的使用率，由流量傳播計算
    pub congestion: f64,
}

impl Node {
    pub fn new(id: impl Into<NodeID>, kind: NodeKind, x: f64, y: f64) -> Self {
        Node {
            id: id.into(),
            x,
            y,
            label: String::new(),
            kind,
            congestion: 0.0,
        }
    }
    pub fn router(id: impl Into<NodeID>, x: f64, y: f64) -> Self {
        Node::new(id, NodeKind::Router, x, y)
    }
    pub fn device(id: impl Into<NodeID>, x: f64, y: f64) -> Self {
        Node::new(id, NodeKind::Device, x, y)
    }
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub id: EdgeID,
    pub source: NodeID,
    pub target: NodeID,
    pub weight: f64,
    pub source_kind: NodeKind,
    pub target_kind: NodeKind,
    pub traffic_load: f64,
    pub bandwidth: f64,
    /// traffic_load / bandwidth，限制在 [0, 1]
    pub utilization: f64,
}

impl Edge {
    pub fn connects(&self, a: NodeID, b: NodeID) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
    pub fn touches(&self, id: NodeID) -> bool {
        self.source == id || self.target == id
    }
    pub fn other(&self, id: NodeID) -> Option<NodeID> {
        if self.source == id {
            Some(self.target)
        } else if self.target == id {
            Some(self.source)
        } else {
            None
        }
    }
    pub(crate) fn set_load(&mut self, load: f64) {
        self.traffic_load = load;
        self.utilization = f64::min(1.0, load / self.bandwidth);
    }
}
