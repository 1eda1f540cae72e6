use std::collections::BTreeSet;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{
    check_ant_speed, check_evaporation_rate, check_num_ants, check_pheromone_deposit,
    check_traffic_weight, Config,
};
use crate::demand::{DemandID, DemandUpdate, RawDemand, TrafficDemand};
use crate::error::{RoutingError, RoutingResult};
use crate::graph_util::{EdgeID, NetworkGraph, Node, NodeID};
use crate::recorder::DemandTable;
use crate::routing_algos::compare::{compare_routes, summarize, NetworkSummary, RouteComparison};
use crate::traffic::{propagate, routers_in_path, TrafficSnapshot};
use crate::util::aco::{AntColony, EpochResult, PheromoneMap, RoutingMode};
use crate::util::{shortest_path, shortest_route};

/// 每一單位 ant_speed 讓顯示中的螞蟻前進的比例
const TOKEN_STEP: f64 = 0.002;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Exploration,
    Convergence,
    Complete,
}

impl Phase {
    pub fn is_running(&self) -> bool {
        matches!(self, Phase::Exploration | Phase::Convergence)
    }
}

/// 畫面上沿著最佳路徑移動的螞蟻，progress 為 0~1
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LiveToken {
    pub from: NodeID,
    pub to: NodeID,
    pub progress: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RunState {
    pub phase: Phase,
    pub iteration_count: usize,
    pub best_path: Vec<NodeID>,
    /// 尚未找到路徑時為無限大
    pub best_path_cost: f64,
    pub live_tokens: Vec<LiveToken>,
    /// 螞蟻所在的有向邊，兩個方向都會列入
    pub active_edges: BTreeSet<(NodeID, NodeID)>,
    /// 開始時以 Dijkstra 算出的基準
    pub baseline_path: Vec<NodeID>,
    pub baseline_cost: f64,
    pub source: Option<NodeID>,
    pub target: Option<NodeID>,
}

impl Default for RunState {
    fn default() -> Self {
        RunState {
            phase: Phase::Idle,
            iteration_count: 0,
            best_path: vec![],
            best_path_cost: f64::INFINITY,
            live_tokens: vec![],
            active_edges: BTreeSet::new(),
            baseline_path: vec![],
            baseline_cost: f64::INFINITY,
            source: None,
            target: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct IterationReport {
    pub iteration: usize,
    /// 本輪結束、轉換後的階段
    pub phase: Phase,
    pub epoch: EpochResult,
    pub best_path_cost: f64,
}

/// 持有圖、流量需求、費洛蒙與執行狀態的模擬器。
/// 由外部排程每 `tick_period()` 呼叫一次 `step()`。
pub struct SimulationEngine<R: Rng = StdRng> {
    graph: NetworkGraph,
    demands: DemandTable,
    traffic: TrafficSnapshot,
    config: Config,
    source: Option<NodeID>,
    target: Option<NodeID>,
    colony: AntColony,
    run: RunState,
    /// 執行期間使用的圖，於 `start()` 時複製
    snapshot: Option<NetworkGraph>,
    rng: R,
}

impl SimulationEngine<StdRng> {
    pub fn new(config: Config) -> RoutingResult<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        SimulationEngine::with_rng(config, rng)
    }
}

impl<R: Rng> SimulationEngine<R> {
    pub fn with_rng(config: Config, rng: R) -> RoutingResult<Self> {
        config.validate()?;
        Ok(SimulationEngine {
            graph: NetworkGraph::new(),
            demands: DemandTable::new(),
            traffic: TrafficSnapshot::default(),
            colony: AntColony::new(config.aco_params()),
            config,
            source: None,
            target: None,
            run: RunState::default(),
            snapshot: None,
            rng,
        })
    }

    fn refresh_traffic(&mut self) {
        self.traffic = propagate(&mut self.graph, &self.demands);
    }

    // ---- 圖的修改 ----

    /// 加入節點並依距離自動連線，回傳新建立的邊
    pub fn add_node(&mut self, node: Node) -> RoutingResult<Vec<EdgeID>> {
        let created = self.graph.place_node(node)?;
        self.refresh_traffic();
        Ok(created)
    }
    /// 加入節點，不自動連線
    pub fn insert_node(&mut self, node: Node) -> RoutingResult<NodeID> {
        let id = self.graph.add_node(node)?;
        self.refresh_traffic();
        Ok(id)
    }
    pub fn add_edge(&mut self, id_pair: (NodeID, NodeID), weight: f64) -> RoutingResult<EdgeID> {
        let id = self.graph.add_edge(id_pair, weight)?;
        self.refresh_traffic();
        Ok(id)
    }
    pub fn add_link(
        &mut self,
        id_pair: (NodeID, NodeID),
        weight: f64,
        bandwidth: f64,
    ) -> RoutingResult<EdgeID> {
        let id = self.graph.add_link(id_pair, weight, bandwidth)?;
        self.refresh_traffic();
        Ok(id)
    }
    pub fn connect(&mut self, id_pair: (NodeID, NodeID)) -> RoutingResult<EdgeID> {
        let id = self.graph.connect(id_pair)?;
        self.refresh_traffic();
        Ok(id)
    }
    /// 只移動節點。拖曳結束後由呼叫端呼叫 `recompute_incident_weights`。
    pub fn update_node_position(&mut self, id: NodeID, x: f64, y: f64) -> RoutingResult<()> {
        self.graph.update_node_position(id, x, y)
    }
    pub fn recompute_weight(&mut self, edge_id: EdgeID) -> RoutingResult<f64> {
        let weight = self.graph.recompute_weight(edge_id)?;
        self.refresh_traffic();
        Ok(weight)
    }
    pub fn recompute_incident_weights(&mut self, id: NodeID) -> RoutingResult<()> {
        self.graph.recompute_incident_weights(id)?;
        self.refresh_traffic();
        Ok(())
    }
    pub fn set_edge_weight(&mut self, edge_id: EdgeID, weight: f64) -> RoutingResult<()> {
        self.graph.set_weight(edge_id, weight)?;
        self.refresh_traffic();
        Ok(())
    }
    /// 換上整張新圖，原本的流量需求、選取與執行狀態一併清除
    pub fn load_graph(&mut self, g: NetworkGraph) {
        self.clear();
        self.graph = g;
        self.refresh_traffic();
        info!(
            nodes = self.graph.get_node_cnt(),
            edges = self.graph.get_edge_cnt(),
            "topology loaded"
        );
    }
    /// 清空圖、流量需求、費洛蒙、選取與執行狀態
    pub fn clear(&mut self) {
        self.graph.clear();
        self.demands.clear();
        self.traffic = TrafficSnapshot::default();
        self.colony.reset();
        self.run = RunState::default();
        self.snapshot = None;
        self.source = None;
        self.target = None;
        info!("simulation cleared");
    }

    // ---- 查詢 ----

    pub fn graph(&self) -> &NetworkGraph {
        &self.graph
    }
    pub fn config(&self) -> &Config {
        &self.config
    }
    pub fn demands(&self) -> &DemandTable {
        &self.demands
    }
    pub fn traffic(&self) -> &TrafficSnapshot {
        &self.traffic
    }
    pub fn edge_utilization(&self, edge_id: EdgeID) -> Option<f64> {
        self.graph.edge(edge_id).map(|e| e.utilization)
    }
    pub fn node_congestion(&self, id: NodeID) -> Option<f64> {
        self.graph.node(id).map(|n| n.congestion)
    }
    pub fn pheromone(&self) -> &PheromoneMap {
        self.colony.pheromone()
    }
    pub fn run_state(&self) -> &RunState {
        &self.run
    }
    pub fn phase(&self) -> Phase {
        self.run.phase
    }
    pub fn iteration_count(&self) -> usize {
        self.run.iteration_count
    }
    pub fn best_path(&self) -> (&[NodeID], f64) {
        (&self.run.best_path, self.run.best_path_cost)
    }
    pub fn live_tokens(&self) -> &[LiveToken] {
        &self.run.live_tokens
    }
    pub fn active_edges(&self) -> &BTreeSet<(NodeID, NodeID)> {
        &self.run.active_edges
    }
    pub fn selection(&self) -> (Option<NodeID>, Option<NodeID>) {
        (self.source, self.target)
    }
    /// 一輪之間的間隔，由 ant_speed 決定
    pub fn tick_period(&self) -> Duration {
        self.config.tick_period()
    }

    // ---- 參數 ----

    fn sync_params(&mut self) {
        self.colony.set_params(self.config.aco_params());
    }
    pub fn set_evaporation_rate(&mut self, rate: f64) -> RoutingResult<()> {
        self.config.evaporation_rate = check_evaporation_rate(rate)?;
        self.sync_params();
        Ok(())
    }
    pub fn set_pheromone_deposit(&mut self, amount: f64) -> RoutingResult<()> {
        self.config.pheromone_deposit = check_pheromone_deposit(amount)?;
        self.sync_params();
        Ok(())
    }
    pub fn set_num_ants(&mut self, num: usize) -> RoutingResult<()> {
        self.config.num_ants = check_num_ants(num)?;
        self.sync_params();
        Ok(())
    }
    pub fn set_ant_speed(&mut self, speed: f64) -> RoutingResult<()> {
        self.config.ant_speed = check_ant_speed(speed)?;
        Ok(())
    }
    pub fn set_routing_mode(&mut self, mode: RoutingMode) {
        self.config.routing_mode = mode;
        self.sync_params();
    }
    pub fn set_traffic_weight(&mut self, weight: f64) -> RoutingResult<()> {
        self.config.traffic_weight = check_traffic_weight(weight)?;
        self.sync_params();
        Ok(())
    }

    // ---- 流量需求 ----

    pub fn add_demand(
        &mut self,
        source: NodeID,
        target: NodeID,
        volume: f64,
        priority: u8,
    ) -> RoutingResult<DemandID> {
        for id in [source, target] {
            if self.graph.node(id).is_none() {
                return Err(RoutingError::UnknownNode(id));
            }
        }
        let route = shortest_path(&self.graph, source, target);
        let routers = routers_in_path(&self.graph, &route);
        let id = self
            .demands
            .insert(source, target, volume, priority, routers)?;
        self.refresh_traffic();
        Ok(id)
    }
    pub fn load_demands(&mut self, raw: Vec<RawDemand>) -> RoutingResult<Vec<DemandID>> {
        let mut ids = Vec::with_capacity(raw.len());
        for demand in raw {
            let id = self.add_demand(demand.source, demand.target, demand.volume, demand.priority)?;
            if !demand.active {
                self.update_demand(id, DemandUpdate::activate(false))?;
            }
            ids.push(id);
        }
        Ok(ids)
    }
    pub fn update_demand(&mut self, id: DemandID, update: DemandUpdate) -> RoutingResult<()> {
        self.demands.update(id, update)?;
        self.refresh_traffic();
        Ok(())
    }
    pub fn remove_demand(&mut self, id: DemandID) -> RoutingResult<TrafficDemand> {
        let demand = self.demands.remove(id)?;
        self.refresh_traffic();
        Ok(demand)
    }

    // ---- 控制 ----

    pub fn select_source(&mut self, id: NodeID) -> RoutingResult<()> {
        if self.graph.node(id).is_none() {
            return Err(RoutingError::UnknownNode(id));
        }
        self.source = Some(id);
        Ok(())
    }
    pub fn select_target(&mut self, id: NodeID) -> RoutingResult<()> {
        if self.graph.node(id).is_none() {
            return Err(RoutingError::UnknownNode(id));
        }
        self.target = Some(id);
        Ok(())
    }
    pub fn start_route(&mut self, src: NodeID, dst: NodeID) -> RoutingResult<()> {
        self.select_source(src)?;
        self.select_target(dst)?;
        self.start()
    }

    /// 以目前選取的起點與終點開始新的一次執行。已在執行中時會重新開始。
    /// 失敗時執行狀態維持不變。
    pub fn start(&mut self) -> RoutingResult<()> {
        let (src, dst) = match (self.source, self.target) {
            (Some(src), Some(dst)) if src != dst => (src, dst),
            (Some(_), Some(_)) => {
                return Err(RoutingError::InvalidSelection(
                    "source and target must be different nodes",
                ))
            }
            _ => {
                return Err(RoutingError::InvalidSelection(
                    "both source and target must be selected",
                ))
            }
        };
        for id in [src, dst] {
            if self.graph.node(id).is_none() {
                return Err(RoutingError::UnknownNode(id));
            }
        }
        if self.graph.get_edge_cnt() == 0 {
            return Err(RoutingError::DegenerateRun("graph has no edges"));
        }
        let (baseline_cost, baseline_path) = shortest_route(&self.graph, src, dst)
            .ok_or(RoutingError::DegenerateRun("source and target are not connected"))?;

        self.refresh_traffic();
        let routed = self.traffic.routes.len();
        if routed < self.demands.iter_active().count() {
            warn!(
                routed,
                "some active traffic demands have no route and carry no load"
            );
        }
        let snapshot = self.graph.clone();
        self.sync_params();
        self.colony.init_pheromone(&snapshot);
        self.run = RunState {
            phase: if self.config.exploration_iterations > 0 {
                Phase::Exploration
            } else {
                Phase::Convergence
            },
            baseline_path,
            baseline_cost,
            source: Some(src),
            target: Some(dst),
            ..RunState::default()
        };
        self.snapshot = Some(snapshot);
        info!(
            source = src.0,
            target = dst.0,
            baseline_cost,
            ants = self.config.num_ants,
            "simulation started"
        );
        Ok(())
    }

    /// 執行一輪蟻群演算法。不在執行中時回傳 None。
    pub fn step(&mut self) -> Option<IterationReport> {
        let weights = match self.run.phase {
            Phase::Exploration => self.config.exploration,
            Phase::Convergence => self.config.convergence,
            Phase::Idle | Phase::Complete => return None,
        };
        let (src, dst) = (self.run.source?, self.run.target?);
        let g = self.snapshot.as_ref()?;
        let epoch = self
            .colony
            .do_single_epoch(g, src, dst, weights, &mut self.rng);
        self.run.iteration_count += 1;
        if let Some(best) = self.colony.best() {
            self.run.best_path = best.nodes.clone();
            self.run.best_path_cost = best.cost;
        }
        self.sample_tokens();

        let count = self.run.iteration_count;
        if count >= self.config.total_iterations {
            self.run.phase = Phase::Complete;
            self.run.live_tokens.clear();
            self.run.active_edges.clear();
            info!(
                iterations = count,
                cost = self.run.best_path_cost,
                "simulation complete"
            );
        } else if self.run.phase == Phase::Exploration && count >= self.config.exploration_iterations
        {
            self.run.phase = Phase::Convergence;
            info!(iteration = count, "entering convergence phase");
        }
        Some(IterationReport {
            iteration: count,
            phase: self.run.phase,
            epoch,
            best_path_cost: self.run.best_path_cost,
        })
    }

    /// 跑到結束為止，回傳本次呼叫執行的輪數
    pub fn run_to_completion(&mut self) -> usize {
        let mut cnt = 0;
        while self.step().is_some() {
            cnt += 1;
        }
        cnt
    }

    /// 中止執行，保留費洛蒙與最佳路徑
    pub fn stop(&mut self) {
        if !self.run.phase.is_running() {
            return;
        }
        self.run.phase = Phase::Idle;
        self.run.live_tokens.clear();
        self.run.active_edges.clear();
        self.snapshot = None;
        info!(iterations = self.run.iteration_count, "simulation stopped");
    }

    /// 清除費洛蒙與執行狀態，選取的起點終點保留
    pub fn reset(&mut self) {
        self.colony.reset();
        self.run = RunState::default();
        self.snapshot = None;
        info!("simulation reset");
    }

    // ---- 顯示 ----

    /// 從最佳路徑上隨機挑選幾條邊放上螞蟻
    fn sample_tokens(&mut self) {
        self.run.live_tokens.clear();
        let path = &self.run.best_path;
        if path.len() >= 2 {
            let cnt = self.config.num_ants.min(self.config.max_visual_tokens);
            for _ in 0..cnt {
                let i = self.rng.gen_range(0..path.len() - 1);
                self.run.live_tokens.push(LiveToken {
                    from: path[i],
                    to: path[i + 1],
                    progress: 0.0,
                });
            }
        }
        self.refresh_active_edges();
    }
    fn refresh_active_edges(&mut self) {
        self.run.active_edges = self
            .run
            .live_tokens
            .iter()
            .flat_map(|t| [(t.from, t.to), (t.to, t.from)])
            .collect();
    }

    /// 讓螞蟻沿著最佳路徑前進 `0.002 * ant_speed`；走完一條邊就換到下一條，抵達終點則移除
    pub fn advance_tokens(&mut self) {
        if !self.run.phase.is_running() {
            return;
        }
        let delta = TOKEN_STEP * self.config.ant_speed;
        let path = &self.run.best_path;
        let mut moved = Vec::with_capacity(self.run.live_tokens.len());
        for token in self.run.live_tokens.iter() {
            let mut token = *token;
            token.progress += delta;
            let mut alive = true;
            while token.progress >= 1.0 {
                let next = path
                    .windows(3)
                    .find(|w| w[0] == token.from && w[1] == token.to)
                    .map(|w| w[2]);
                match next {
                    Some(next) => {
                        token.from = token.to;
                        token.to = next;
                        token.progress -= 1.0;
                    }
                    None => {
                        alive = false;
                        break;
                    }
                }
            }
            if alive {
                moved.push(token);
            }
        }
        self.run.live_tokens = moved;
        self.refresh_active_edges();
    }

    // ---- 比較 ----

    /// 以執行中的圖（沒有執行時以目前的圖）比較蟻群最佳路徑與 Dijkstra 基準
    pub fn compare(&self) -> RouteComparison {
        let g = self.snapshot.as_ref().unwrap_or(&self.graph);
        compare_routes(g, &self.run.best_path, &self.run.baseline_path)
    }
    pub fn summary(&self) -> NetworkSummary {
        summarize(&self.graph)
    }
}

#[cfg(test)]
mod test;
