use std::time::Instant;

use super::{Route, RoutingAlgo};
use crate::graph_util::{NetworkGraph, NodeID};
use crate::util::shortest_route;

/// 以 Dijkstra 求出的確定性基準
#[derive(Default)]
pub struct SPF {
    compute_time: u128,
}

impl SPF {
    pub fn new() -> Self {
        SPF::default()
    }
}

impl RoutingAlgo for SPF {
    fn compute_route(&mut self, g: &NetworkGraph, src: NodeID, dst: NodeID) -> Option<Route> {
        let init_time = Instant::now();
        let route = shortest_route(g, src, dst).map(|(cost, nodes)| Route { nodes, cost });
        self.compute_time = init_time.elapsed().as_micros();
        route
    }
    fn get_last_compute_time(&self) -> u128 {
        self.compute_time
    }
    fn name(&self) -> &'static str {
        "spf"
    }
}
