use serde::Serialize;

use crate::graph_util::{NetworkGraph, NodeID};
use crate::network_struct::Graph;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RouteMetrics {
    pub route: Vec<NodeID>,
    /// 以圖上目前的權重計算
    pub cost: f64,
    pub hops: usize,
    /// 路徑上經過的路由器數，不含端點
    pub routers: usize,
    pub mean_congestion: f64,
}

/// 路徑為空或不連通時回傳 None
pub fn route_metrics(g: &NetworkGraph, route: &[NodeID]) -> Option<RouteMetrics> {
    if route.is_empty() {
        return None;
    }
    let cost = g.get_dist(route);
    if cost.is_infinite() {
        return None;
    }
    let mut congestion_sum = 0.0;
    for id in route {
        congestion_sum += g.node(*id)?.congestion;
    }
    let routers = crate::traffic::routers_in_path(g, route).len();
    Some(RouteMetrics {
        route: route.to_vec(),
        cost,
        hops: route.len() - 1,
        routers,
        mean_congestion: congestion_sum / route.len() as f64,
    })
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RouteComparison {
    pub aco: Option<RouteMetrics>,
    pub dijkstra: Option<RouteMetrics>,
}

impl RouteComparison {
    /// dijkstra 成本 / aco 成本，1.0 代表蟻群找到了最短路徑
    pub fn efficiency(&self) -> Option<f64> {
        let (aco, dijkstra) = (self.aco.as_ref()?, self.dijkstra.as_ref()?);
        if aco.cost == 0.0 {
            return Some(if dijkstra.cost == 0.0 { 1.0 } else { 0.0 });
        }
        Some(dijkstra.cost / aco.cost)
    }
    pub fn matches_optimum(&self) -> bool {
        match (&self.aco, &self.dijkstra) {
            (Some(aco), Some(dijkstra)) => aco.cost <= dijkstra.cost + 1e-9,
            _ => false,
        }
    }
}

pub fn compare_routes(g: &NetworkGraph, aco_route: &[NodeID], dijkstra_route: &[NodeID]) -> RouteComparison {
    RouteComparison {
        aco: route_metrics(g, aco_route),
        dijkstra: route_metrics(g, dijkstra_route),
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct NetworkSummary {
    pub total_routers: usize,
    pub total_devices: usize,
    pub total_edges: usize,
    pub average_congestion: f64,
    pub average_utilization: f64,
}

pub fn summarize(g: &NetworkGraph) -> NetworkSummary {
    let mut summary = NetworkSummary {
        total_edges: g.get_edge_cnt(),
        ..Default::default()
    };
    let mut congestion_sum = 0.0;
    for node in g.nodes() {
        if node.kind.is_router() {
            summary.total_routers += 1;
        } else {
            summary.total_devices += 1;
        }
        congestion_sum += node.congestion;
    }
    if !g.is_empty() {
        summary.average_congestion = congestion_sum / g.get_node_cnt() as f64;
    }
    if summary.total_edges > 0 {
        let util_sum: f64 = g.edges().iter().map(|e| e.utilization).sum();
        summary.average_utilization = util_sum / summary.total_edges as f64;
    }
    summary
}
