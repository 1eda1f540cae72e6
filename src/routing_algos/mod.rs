use serde::Serialize;

use crate::graph_util::{NetworkGraph, NodeID};
use crate::util::aco::AntPath;

/// 一條從起點到終點的路徑與其成本
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Route {
    pub nodes: Vec<NodeID>,
    pub cost: f64,
}

impl From<AntPath> for Route {
    fn from(path: AntPath) -> Self {
        Route {
            nodes: path.nodes,
            cost: path.cost,
        }
    }
}

pub trait RoutingAlgo {
    /// 找不到路徑時回傳 None，這不是錯誤
    fn compute_route(&mut self, g: &NetworkGraph, src: NodeID, dst: NodeID) -> Option<Route>;
    /// 上一次 `compute_route` 花費的微秒數
    fn get_last_compute_time(&self) -> u128;
    fn name(&self) -> &'static str;
}

mod shortest_path;
pub use shortest_path::SPF;

mod ant_routing;
pub use ant_routing::AntRouting;

pub mod compare;
