use std::path::Path;

use serde::{Deserialize, Serialize};

pub mod collaborator;
pub mod config;
pub mod demand;
pub mod error;
pub mod graph_util;
pub mod network_struct;
pub mod recorder;
pub mod routing_algos;
pub mod simulation;
pub mod traffic;
pub mod util;

pub use config::Config;
pub use error::{ConfigError, RoutingError, RoutingResult};
pub use simulation::{Phase, SimulationEngine};

use demand::RawDemand;
use graph_util::{distance, NetworkGraph, Node, NodeID, NodeKind, DEFAULT_BANDWIDTH};

pub fn read_topo_from_file(file_name: impl AsRef<Path>) -> Result<NetworkGraph, ConfigError> {
    let json: TopologyJSON = config::read_json(file_name.as_ref())?;
    Ok(json.build()?)
}

pub fn read_demands_from_file(file_name: impl AsRef<Path>) -> Result<Vec<RawDemand>, ConfigError> {
    let json: AllDemands = config::read_json(file_name.as_ref())?;
    Ok(json.demands)
}

#[derive(Serialize, Deserialize)]
struct AllDemands {
    demands: Vec<RawDemand>,
}

#[derive(Serialize, Deserialize)]
struct RawNode {
    id: NodeID,
    x: f64,
    y: f64,
    kind: NodeKind,
    #[serde(default)]
    label: String,
}

#[derive(Serialize, Deserialize)]
struct RawEdge {
    source: NodeID,
    target: NodeID,
    /// 省略時取兩端點的距離
    weight: Option<f64>,
    bandwidth: Option<f64>,
}

#[derive(Serialize, Deserialize)]
struct TopologyJSON {
    nodes: Vec<RawNode>,
    #[serde(default)]
    edges: Vec<RawEdge>,
    /// 依序放置節點並套用自動連線規則
    #[serde(default)]
    auto_wire: bool,
}

impl TopologyJSON {
    fn build(self) -> RoutingResult<NetworkGraph> {
        let mut g = NetworkGraph::new();
        for raw in self.nodes.into_iter() {
            let node = Node::new(raw.id, raw.kind, raw.x, raw.y).with_label(raw.label);
            if self.auto_wire {
                g.place_node(node)?;
            } else {
                g.add_node(node)?;
            }
        }
        for edge in self.edges.into_iter() {
            let pair = (edge.source, edge.target);
            let bandwidth = edge.bandwidth.unwrap_or(DEFAULT_BANDWIDTH);
            let weight = match edge.weight {
                Some(weight) => weight,
                None => {
                    let a = g.node(pair.0).ok_or(RoutingError::UnknownNode(pair.0))?;
                    let b = g.node(pair.1).ok_or(RoutingError::UnknownNode(pair.1))?;
                    distance(a, b)
                }
            };
            g.add_link(pair, weight, bandwidth)?;
        }
        Ok(g)
    }
}
