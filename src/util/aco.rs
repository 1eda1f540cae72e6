use std::collections::{HashMap, HashSet};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graph_util::{Edge, NetworkGraph, NodeID};

pub const DEFAULT_INITIAL_PHEROMONE: f64 = 0.1;
const NUM_ANTS: usize = 10;
const RHO: f64 = 0.1; // 蒸發率
const DEPOSIT: f64 = 1.0;
const CONGESTION_BIAS: f64 = 0.5;
const TRAFFIC_WEIGHT: f64 = 2.0;
/// 權重為 0 的邊以此值計算能見度與沉積量
const MIN_WEIGHT: f64 = 1e-6;
/// 打折後的初始費洛蒙下限，以 tao0 的比例表示
const MIN_PHEROMONE_FRACTION: f64 = 0.01;

/// alpha 為費洛蒙的重要性，beta 為距離（能見度）的重要性
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseWeights {
    pub alpha: f64,
    pub beta: f64,
}

impl PhaseWeights {
    pub const EXPLORATION: PhaseWeights = PhaseWeights {
        alpha: 0.5,
        beta: 2.0,
    };
    pub const CONVERGENCE: PhaseWeights = PhaseWeights {
        alpha: 1.5,
        beta: 1.0,
    };
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingMode {
    #[default]
    Standard,
    /// 螞蟻看到的權重會隨使用率放大
    CongestionAware,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AcoParams {
    pub num_ants: usize,
    pub evaporation_rate: f64,
    pub pheromone_deposit: f64,
    pub initial_pheromone: f64,
    /// 0~1，使用率高的邊初始費洛蒙打折的程度
    pub congestion_bias: f64,
    pub mode: RoutingMode,
    pub traffic_weight: f64,
}

impl Default for AcoParams {
    fn default() -> Self {
        AcoParams {
            num_ants: NUM_ANTS,
            evaporation_rate: RHO,
            pheromone_deposit: DEPOSIT,
            initial_pheromone: DEFAULT_INITIAL_PHEROMONE,
            congestion_bias: CONGESTION_BIAS,
            mode: RoutingMode::Standard,
            traffic_weight: TRAFFIC_WEIGHT,
        }
    }
}

impl AcoParams {
    pub fn effective_weight(&self, edge: &Edge) -> f64 {
        match self.mode {
            RoutingMode::Standard => edge.weight,
            RoutingMode::CongestionAware => {
                edge.weight * (1.0 + self.traffic_weight * edge.utilization)
            }
        }
    }
}

/// 有向邊 (from, to) 上的費洛蒙
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PheromoneMap {
    trails: HashMap<(NodeID, NodeID), f64>,
}

impl PheromoneMap {
    pub fn new() -> Self {
        PheromoneMap::default()
    }
    /// 每條邊的兩個方向都放入 tao0，使用率高的邊依 `congestion_bias` 打折，
    /// 但不低於 tao0 * MIN_PHEROMONE_FRACTION
    pub fn init(g: &NetworkGraph, tao0: f64, congestion_bias: f64) -> Self {
        let mut trails = HashMap::with_capacity(g.get_edge_cnt() * 2);
        for edge in g.edges() {
            let ph = (tao0 * (1.0 - congestion_bias * edge.utilization))
                .max(tao0 * MIN_PHEROMONE_FRACTION);
            trails.insert((edge.source, edge.target), ph);
            trails.insert((edge.target, edge.source), ph);
        }
        PheromoneMap { trails }
    }
    pub fn get(&self, from: NodeID, to: NodeID) -> f64 {
        self.trails.get(&(from, to)).copied().unwrap_or(0.0)
    }
    pub fn evaporate(&mut self, rho: f64) {
        debug_assert!((0.0..=1.0).contains(&rho));
        for ph in self.trails.values_mut() {
            *ph *= 1.0 - rho;
        }
    }
    /// 路徑經過的每條邊，兩個方向都加上 `amount`
    pub fn deposit(&mut self, path: &[NodeID], amount: f64) {
        debug_assert!(amount >= 0.0);
        for pair in path.windows(2) {
            *self.trails.entry((pair[0], pair[1])).or_insert(0.0) += amount;
            *self.trails.entry((pair[1], pair[0])).or_insert(0.0) += amount;
        }
    }
    pub fn iter(&self) -> impl Iterator<Item = (&(NodeID, NodeID), &f64)> {
        self.trails.iter()
    }
    pub fn len(&self) -> usize {
        self.trails.len()
    }
    pub fn is_empty(&self) -> bool {
        self.trails.is_empty()
    }
    pub fn clear(&mut self) {
        self.trails.clear();
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AntPath {
    pub nodes: Vec<NodeID>,
    pub cost: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EpochResult {
    pub successful: usize,
    /// 走進死路的螞蟻，這一輪不留下費洛蒙
    pub dead_ends: usize,
    pub epoch_best: Option<AntPath>,
    pub improved: bool,
}

/// 依 desirability 比例抽選下一個節點（輪盤法）。全部為 0 時均勻抽選。
fn select_next<R: Rng>(candidates: &[(NodeID, f64)], rng: &mut R) -> Option<NodeID> {
    if candidates.is_empty() {
        return None;
    }
    let sum: f64 = candidates.iter().map(|c| c.1).sum();
    if !(sum > 0.0 && sum.is_finite()) {
        return Some(candidates[rng.gen_range(0..candidates.len())].0);
    }
    let rand_f = rng.gen::<f64>() * sum;
    let mut accumulation = 0.0;
    for &(id, desire) in candidates {
        accumulation += desire;
        if accumulation >= rand_f {
            return Some(id);
        }
    }
    candidates.last().map(|c| c.0)
}

pub struct AntColony {
    pheromone: PheromoneMap,
    params: AcoParams,
    best: Option<AntPath>,
}

impl AntColony {
    pub fn new(params: AcoParams) -> Self {
        AntColony {
            pheromone: PheromoneMap::new(),
            params,
            best: None,
        }
    }
    pub fn params(&self) -> &AcoParams {
        &self.params
    }
    pub fn set_params(&mut self, params: AcoParams) {
        self.params = params;
    }
    /// 依圖重新放置費洛蒙，並忘掉目前最佳解
    pub fn init_pheromone(&mut self, g: &NetworkGraph) {
        self.pheromone = PheromoneMap::init(
            g,
            self.params.initial_pheromone,
            self.params.congestion_bias,
        );
        self.best = None;
    }
    pub fn reset(&mut self) {
        self.pheromone.clear();
        self.best = None;
    }
    pub fn pheromone(&self) -> &PheromoneMap {
        &self.pheromone
    }
    pub fn best(&self) -> Option<&AntPath> {
        self.best.as_ref()
    }
    pub fn best_cost(&self) -> f64 {
        self.best.as_ref().map_or(f64::INFINITY, |p| p.cost)
    }

    /// 一隻螞蟻從 `src` 出發走到 `dst`，每一步只考慮未走過的鄰居。
    /// 卡在死路時回傳 None。
    pub fn construct_path<R: Rng>(
        &self,
        g: &NetworkGraph,
        src: NodeID,
        dst: NodeID,
        weights: PhaseWeights,
        rng: &mut R,
    ) -> Option<AntPath> {
        let mut visited = HashSet::new();
        visited.insert(src);
        let mut nodes = vec![src];
        let mut cost = 0.0;
        let mut cur = src;
        while cur != dst {
            let candidates: Vec<(NodeID, f64)> = g
                .neighbors(cur)
                .iter()
                .filter(|next| !visited.contains(*next))
                .filter_map(|&next| {
                    let edge = g.edge_between(cur, next)?;
                    let weight = self.params.effective_weight(edge).max(MIN_WEIGHT);
                    let desire = self.pheromone.get(cur, next).powf(weights.alpha)
                        * (1.0 / weight).powf(weights.beta);
                    Some((next, desire))
                })
                .collect();
            let next = select_next(&candidates, rng)?;
            let edge = g.edge_between(cur, next)?;
            cost += self.params.effective_weight(edge);
            visited.insert(next);
            nodes.push(next);
            cur = next;
        }
        Some(AntPath { nodes, cost })
    }

    /// 一輪：先全面蒸發，再放出 `num_ants` 隻螞蟻，成功的螞蟻依 deposit / cost 沉積費洛蒙
    pub fn do_single_epoch<R: Rng>(
        &mut self,
        g: &NetworkGraph,
        src: NodeID,
        dst: NodeID,
        weights: PhaseWeights,
        rng: &mut R,
    ) -> EpochResult {
        self.pheromone.evaporate(self.params.evaporation_rate);

        let mut paths = Vec::with_capacity(self.params.num_ants);
        let mut dead_ends = 0;
        for _ in 0..self.params.num_ants {
            match self.construct_path(g, src, dst, weights, rng) {
                Some(path) => paths.push(path),
                None => dead_ends += 1,
            }
        }
        if dead_ends > 0 {
            debug!(dead_ends, "ants stuck in dead ends");
        }

        for path in paths.iter() {
            let amount = self.params.pheromone_deposit / path.cost.max(MIN_WEIGHT);
            self.pheromone.deposit(&path.nodes, amount);
        }

        let epoch_best = paths
            .iter()
            .min_by(|a, b| a.cost.total_cmp(&b.cost))
            .cloned();
        let improved = match &epoch_best {
            Some(path) if path.cost < self.best_cost() => {
                debug!(cost = path.cost, hops = path.nodes.len() - 1, "found better path");
                self.best = Some(path.clone());
                true
            }
            _ => false,
        };
        EpochResult {
            successful: paths.len(),
            dead_ends,
            epoch_best,
            improved,
        }
    }
}
