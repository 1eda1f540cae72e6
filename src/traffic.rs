use std::collections::BTreeMap;

use tracing::debug;

use crate::demand::DemandID;
use crate::graph_util::{EdgeID, LoadMemory, NetworkGraph, NodeID};
use crate::recorder::DemandTable;
use crate::util::Dijkstra;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeLoad {
    pub edge: EdgeID,
    pub traffic_load: f64,
    pub utilization: f64,
}

/// 一次流量傳播的結果，圖上的邊與節點也已同步更新
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrafficSnapshot {
    pub edge_loads: Vec<EdgeLoad>,
    pub node_congestion: BTreeMap<NodeID, f64>,
    /// 每個有效需求實際走的路徑，無法連通的需求不在其中
    pub routes: BTreeMap<DemandID, Vec<NodeID>>,
    pub memory: LoadMemory,
}

impl TrafficSnapshot {
    pub fn utilization(&self, edge: EdgeID) -> Option<f64> {
        self.edge_loads.get(usize::from(edge)).map(|load| load.utilization)
    }
    pub fn congestion(&self, id: NodeID) -> Option<f64> {
        self.node_congestion.get(&id).copied()
    }
    pub fn total_load(&self) -> f64 {
        self.edge_loads.iter().map(|load| load.traffic_load).sum()
    }
}

/// 從頭重算所有邊的流量：清空後，每個有效需求沿著目前權重下的最短路徑加上 volume。
/// 路由不考慮擁塞，所以流量不會影響權重。
pub fn propagate(g: &mut NetworkGraph, demands: &DemandTable) -> TrafficSnapshot {
    let mut memory = LoadMemory::new(g);
    let mut routes = BTreeMap::new();
    let mut edge_routes: Vec<(f64, Vec<EdgeID>)> = vec![];
    {
        let mut dijkstra = Dijkstra::new(&*g);
        for demand in demands.iter_active() {
            let route = match dijkstra.get_route(demand.source, demand.target) {
                Some((_, route)) => route,
                None => {
                    debug!(demand = ?demand.id, "no route for traffic demand");
                    continue;
                }
            };
            if let Some(edge_ids) = g.get_edge_ids(&route) {
                memory.record(demand.id, &edge_ids);
                edge_routes.push((demand.volume, edge_ids));
            }
            routes.insert(demand.id, route);
        }
    }

    let mut loads = vec![0.0; g.get_edge_cnt()];
    for (volume, edge_ids) in edge_routes.iter() {
        for edge_id in edge_ids {
            loads[usize::from(*edge_id)] += volume;
        }
    }
    for (edge, &load) in g.edges_mut().iter_mut().zip(loads.iter()) {
        edge.set_load(load);
    }

    let mut node_congestion = BTreeMap::new();
    let ids: Vec<NodeID> = g.nodes().map(|n| n.id).collect();
    for id in ids {
        let (sum, cnt) = g
            .incident_edges(id)
            .fold((0.0, 0usize), |(sum, cnt), e| (sum + e.utilization, cnt + 1));
        let congestion = if cnt > 0 { sum / cnt as f64 } else { 0.0 };
        if let Some(node) = g.node_mut(id) {
            node.congestion = congestion;
        }
        node_congestion.insert(id, congestion);
    }

    let edge_loads = g
        .edges()
        .iter()
        .map(|e| EdgeLoad {
            edge: e.id,
            traffic_load: e.traffic_load,
            utilization: e.utilization,
        })
        .collect();
    debug!(demands = routes.len(), "traffic recomputed");
    TrafficSnapshot {
        edge_loads,
        node_congestion,
        routes,
        memory,
    }
}

/// 路徑上不含兩端點的路由器
pub fn routers_in_path(g: &NetworkGraph, route: &[NodeID]) -> Vec<NodeID> {
    if route.len() <= 2 {
        return vec![];
    }
    route[1..route.len() - 1]
        .iter()
        .copied()
        .filter(|&id| g.node(id).map_or(false, |n| n.kind.is_router()))
        .collect()
}
