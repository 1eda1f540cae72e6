//! 外部服務的介面。聊天建議與網路分析都由外部服務處理，
//! 這裡只定義送出與收回的資料，核心本身從不呼叫它們。

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph_util::NodeID;
use crate::routing_algos::compare::RouteMetrics;

/// 一條已走過的路徑的紀錄
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    pub source: NodeID,
    pub target: NodeID,
    pub path: Vec<NodeID>,
    pub hops: usize,
    pub cost: f64,
    pub congestion: f64,
}

impl RouteRecord {
    /// 空路徑沒有起點終點，回傳 None
    pub fn from_metrics(metrics: &RouteMetrics) -> Option<Self> {
        Some(RouteRecord {
            source: *metrics.route.first()?,
            target: *metrics.route.last()?,
            path: metrics.route.clone(),
            hops: metrics.hops,
            cost: metrics.cost,
            congestion: metrics.mean_congestion,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdvisorRequest {
    pub routes: Vec<RouteRecord>,
    pub prompt: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdvisorResponse {
    pub text: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkMetrics {
    pub total_routers: usize,
    pub total_devices: usize,
    pub average_latency: f64,
    pub network_efficiency: f64,
    pub average_congestion: f64,
    pub number_of_hops: usize,
    pub topology_used: String,
    pub packet_drop_rate: f64,
    pub aco_score: f64,
}

#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("service unavailable: {0}")]
    Unavailable(String),
    #[error("service rejected the request: {0}")]
    Rejected(String),
}

/// 依路徑紀錄回答使用者的問題
pub trait RouteAdvisor {
    fn advise(&self, request: &AdvisorRequest) -> Result<AdvisorResponse, CollaboratorError>;
}

pub trait NetworkAnalyzer {
    fn analyze(&self, routes: &[RouteRecord]) -> Result<NetworkMetrics, CollaboratorError>;
}
