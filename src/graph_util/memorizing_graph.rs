use std::collections::{BTreeSet, HashMap};

use super::{EdgeID, NetworkGraph};
use crate::demand::DemandID;

/// 每條邊上記憶了經過它的流量需求識別碼。兩個方向視為同一條邊。
/// 每次流量傳播都重新建立，不做增減。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadMemory {
    edge_info: HashMap<EdgeID, BTreeSet<DemandID>>,
}

impl LoadMemory {
    pub fn new(graph: &NetworkGraph) -> Self {
        let edge_info = graph
            .edges()
            .iter()
            .map(|edge| (edge.id, BTreeSet::new()))
            .collect();
        LoadMemory { edge_info }
    }
    /// 確定一個需求的路徑時，將它的 ID 記在經過的邊上
    pub fn record(&mut self, demand_id: DemandID, route: &[EdgeID]) {
        for edge_id in route {
            self.edge_info.entry(*edge_id).or_default().insert(demand_id);
        }
    }
    pub fn demands_on(&self, edge_id: EdgeID) -> Vec<DemandID> {
        self.edge_info
            .get(&edge_id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }
}
