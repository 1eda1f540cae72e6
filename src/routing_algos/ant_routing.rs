use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::{Route, RoutingAlgo};
use crate::config::Config;
use crate::error::RoutingResult;
use crate::graph_util::{NetworkGraph, NodeID};
use crate::util::aco::AntColony;

/// 一次跑完探索與收斂兩個階段的蟻群路由，不受排程節奏限制
pub struct AntRouting<R: Rng = StdRng> {
    colony: AntColony,
    config: Config,
    rng: R,
    /// 每一輪結束後的最佳成本
    cost_history: Vec<f64>,
    compute_time: u128,
}

impl AntRouting<StdRng> {
    pub fn new(config: Config) -> RoutingResult<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        AntRouting::with_rng(config, rng)
    }
}

impl<R: Rng> AntRouting<R> {
    pub fn with_rng(config: Config, rng: R) -> RoutingResult<Self> {
        config.validate()?;
        Ok(AntRouting {
            colony: AntColony::new(config.aco_params()),
            config,
            rng,
            cost_history: vec![],
            compute_time: 0,
        })
    }
    pub fn colony(&self) -> &AntColony {
        &self.colony
    }
    pub fn cost_history(&self) -> &[f64] {
        &self.cost_history
    }
}

impl<R: Rng> RoutingAlgo for AntRouting<R> {
    fn compute_route(&mut self, g: &NetworkGraph, src: NodeID, dst: NodeID) -> Option<Route> {
        let init_time = Instant::now();
        self.colony.init_pheromone(g);
        self.cost_history.clear();
        for iteration in 0..self.config.total_iterations {
            let weights = if iteration < self.config.exploration_iterations {
                self.config.exploration
            } else {
                self.config.convergence
            };
            self.colony
                .do_single_epoch(g, src, dst, weights, &mut self.rng);
            self.cost_history.push(self.colony.best_cost());
        }
        self.compute_time = init_time.elapsed().as_micros();
        debug!(
            iterations = self.config.total_iterations,
            cost = self.colony.best_cost(),
            "offline ant routing finished"
        );
        self.colony.best().cloned().map(Route::from)
    }
    fn get_last_compute_time(&self) -> u128 {
        self.compute_time
    }
    fn name(&self) -> &'static str {
        "aco"
    }
}
