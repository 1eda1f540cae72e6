use serde::{Deserialize, Serialize};

use crate::graph_util::NodeID;

#[derive(Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DemandID(pub(crate) usize);
impl From<usize> for DemandID {
    fn from(i: usize) -> Self {
        DemandID(i)
    }
}
impl From<DemandID> for usize {
    fn from(id: DemandID) -> Self {
        id.0
    }
}

/// 一筆從 source 到 target 的流量需求
#[derive(Clone, Debug, PartialEq)]
pub struct TrafficDemand {
    pub id: DemandID,
    pub source: NodeID,
    pub target: NodeID,
    /// 0~1 之間的正規化流量
    pub volume: f64,
    /// 1~10，僅供顯示
    pub priority: u8,
    pub active: bool,
    /// 建立當下最短路徑上經過的路由器（不含端點）
    pub routers_in_path: Vec<NodeID>,
}

/// 局部更新，`None` 的欄位保持不變
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DemandUpdate {
    pub volume: Option<f64>,
    pub priority: Option<u8>,
    pub active: Option<bool>,
}

impl DemandUpdate {
    pub fn activate(active: bool) -> Self {
        DemandUpdate {
            active: Some(active),
            ..Default::default()
        }
    }
    pub fn volume(volume: f64) -> Self {
        DemandUpdate {
            volume: Some(volume),
            ..Default::default()
        }
    }
}

/// 檔案中的需求格式，ID 由需求表配發
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawDemand {
    pub source: NodeID,
    pub target: NodeID,
    pub volume: f64,
    #[serde(default = "default_priority")]
    pub priority: u8,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_priority() -> u8 {
    5
}
fn default_active() -> bool {
    true
}
