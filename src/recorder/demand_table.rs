use crate::demand::{DemandID, DemandUpdate, TrafficDemand};
use crate::error::{RoutingError, RoutingResult};
use crate::graph_util::NodeID;

fn check_volume(volume: f64) -> RoutingResult<f64> {
    if volume >= 0.0 && volume.is_finite() {
        Ok(volume)
    } else {
        Err(RoutingError::InvalidParameter {
            name: "volume",
            value: volume,
        })
    }
}

/// 流量需求的存放處。ID 即陣列索引，刪除後留下空位，不會重複配發。
#[derive(Clone, Debug, Default)]
pub struct DemandTable {
    demand_list: Vec<Option<TrafficDemand>>,
    demand_cnt: usize,
}

impl DemandTable {
    pub fn new() -> Self {
        DemandTable::default()
    }
    pub fn insert(
        &mut self,
        source: NodeID,
        target: NodeID,
        volume: f64,
        priority: u8,
        routers_in_path: Vec<NodeID>,
    ) -> RoutingResult<DemandID> {
        let volume = check_volume(volume)?;
        let id = DemandID(self.demand_list.len());
        self.demand_list.push(Some(TrafficDemand {
            id,
            source,
            target,
            volume,
            priority,
            active: true,
            routers_in_path,
        }));
        self.demand_cnt += 1;
        Ok(id)
    }
    pub fn update(&mut self, id: DemandID, update: DemandUpdate) -> RoutingResult<&TrafficDemand> {
        if let Some(volume) = update.volume {
            check_volume(volume)?;
        }
        let demand = self
            .demand_list
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(RoutingError::UnknownDemand(id))?;
        if let Some(volume) = update.volume {
            demand.volume = volume;
        }
        if let Some(priority) = update.priority {
            demand.priority = priority;
        }
        if let Some(active) = update.active {
            demand.active = active;
        }
        Ok(demand)
    }
    pub fn remove(&mut self, id: DemandID) -> RoutingResult<TrafficDemand> {
        let demand = self
            .demand_list
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(RoutingError::UnknownDemand(id))?;
        self.demand_cnt -= 1;
        Ok(demand)
    }
    pub fn get(&self, id: DemandID) -> Option<&TrafficDemand> {
        self.demand_list.get(id.0).and_then(Option::as_ref)
    }
    pub fn check_exist(&self, id: DemandID) -> bool {
        self.get(id).is_some()
    }
    /// 依 ID 順序遍歷
    pub fn iter(&self) -> impl Iterator<Item = &TrafficDemand> {
        self.demand_list.iter().flatten()
    }
    pub fn iter_active(&self) -> impl Iterator<Item = &TrafficDemand> {
        self.iter().filter(|demand| demand.active)
    }
    pub fn get_demand_cnt(&self) -> usize {
        self.demand_cnt
    }
    pub fn is_empty(&self) -> bool {
        self.demand_cnt == 0
    }
    pub fn clear(&mut self) {
        self.demand_list.clear();
        self.demand_cnt = 0;
    }
}
