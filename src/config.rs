use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, RoutingError, RoutingResult};
use crate::util::aco::{AcoParams, PhaseWeights, RoutingMode, DEFAULT_INITIAL_PHEROMONE};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// 每輪蒸發的比例，(0, 1)
    pub evaporation_rate: f64,
    /// 成功的螞蟻留下 pheromone_deposit / 路徑成本
    pub pheromone_deposit: f64,
    /// 每輪放出的螞蟻數
    pub num_ants: usize,
    /// 每秒執行的輪數，決定排程週期
    pub ant_speed: f64,
    pub initial_pheromone: f64,
    /// 探索階段的輪數上限
    pub exploration_iterations: usize,
    /// 整個執行的輪數上限
    pub total_iterations: usize,
    pub exploration: PhaseWeights,
    pub convergence: PhaseWeights,
    /// 0~1，使用率高的邊初始費洛蒙打折的程度
    pub congestion_bias: f64,
    pub routing_mode: RoutingMode,
    /// 擁塞感知模式下使用率對權重的放大倍數
    pub traffic_weight: f64,
    /// 每輪最多顯示幾隻螞蟻
    pub max_visual_tokens: usize,
    /// 給定時可重現整個執行
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        let aco = AcoParams::default();
        Config {
            evaporation_rate: aco.evaporation_rate,
            pheromone_deposit: aco.pheromone_deposit,
            num_ants: aco.num_ants,
            ant_speed: 5.0,
            initial_pheromone: DEFAULT_INITIAL_PHEROMONE,
            exploration_iterations: 20,
            total_iterations: 100,
            exploration: PhaseWeights::EXPLORATION,
            convergence: PhaseWeights::CONVERGENCE,
            congestion_bias: aco.congestion_bias,
            routing_mode: aco.mode,
            traffic_weight: aco.traffic_weight,
            max_visual_tokens: 5,
            seed: None,
        }
    }
}

fn invalid(name: &'static str, value: f64) -> RoutingError {
    RoutingError::InvalidParameter { name, value }
}

pub fn check_evaporation_rate(rate: f64) -> RoutingResult<f64> {
    if rate > 0.0 && rate < 1.0 {
        Ok(rate)
    } else {
        Err(invalid("evaporation_rate", rate))
    }
}
pub fn check_pheromone_deposit(amount: f64) -> RoutingResult<f64> {
    if amount > 0.0 && amount.is_finite() {
        Ok(amount)
    } else {
        Err(invalid("pheromone_deposit", amount))
    }
}
pub fn check_num_ants(num: usize) -> RoutingResult<usize> {
    if num >= 1 {
        Ok(num)
    } else {
        Err(invalid("num_ants", num as f64))
    }
}
pub fn check_ant_speed(speed: f64) -> RoutingResult<f64> {
    if speed > 0.0 && speed.is_finite() {
        Ok(speed)
    } else {
        Err(invalid("ant_speed", speed))
    }
}
pub fn check_traffic_weight(weight: f64) -> RoutingResult<f64> {
    if weight >= 0.0 && weight.is_finite() {
        Ok(weight)
    } else {
        Err(invalid("traffic_weight", weight))
    }
}

/// 讀取並解析 JSON 檔
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let txt = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&txt).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: Config = read_json(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }
    pub fn validate(&self) -> RoutingResult<()> {
        check_evaporation_rate(self.evaporation_rate)?;
        check_pheromone_deposit(self.pheromone_deposit)?;
        check_num_ants(self.num_ants)?;
        check_ant_speed(self.ant_speed)?;
        check_traffic_weight(self.traffic_weight)?;
        if !(self.initial_pheromone > 0.0 && self.initial_pheromone.is_finite()) {
            return Err(invalid("initial_pheromone", self.initial_pheromone));
        }
        if !(0.0..=1.0).contains(&self.congestion_bias) {
            return Err(invalid("congestion_bias", self.congestion_bias));
        }
        if self.total_iterations == 0 {
            return Err(invalid("total_iterations", 0.0));
        }
        if self.exploration_iterations > self.total_iterations {
            return Err(invalid(
                "exploration_iterations",
                self.exploration_iterations as f64,
            ));
        }
        for weights in [self.exploration, self.convergence] {
            if !(weights.alpha >= 0.0 && weights.alpha.is_finite()) {
                return Err(invalid("alpha", weights.alpha));
            }
            if !(weights.beta >= 0.0 && weights.beta.is_finite()) {
                return Err(invalid("beta", weights.beta));
            }
        }
        Ok(())
    }
    pub fn aco_params(&self) -> AcoParams {
        AcoParams {
            num_ants: self.num_ants,
            evaporation_rate: self.evaporation_rate,
            pheromone_deposit: self.pheromone_deposit,
            initial_pheromone: self.initial_pheromone,
            congestion_bias: self.congestion_bias,
            mode: self.routing_mode,
            traffic_weight: self.traffic_weight,
        }
    }
    /// 每一輪之間的間隔：1000 / ant_speed 毫秒
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.ant_speed)
    }
}
