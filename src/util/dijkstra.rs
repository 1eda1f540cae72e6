use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use super::MyMinHeap;
use crate::network_struct::Graph;

/// 從 `src_id` 出發的 Dijkstra，回傳已確定節點的 (距離, 前一個節點)。
/// 給定 `stop_at` 時，該節點一確定就提早結束。
/// 權重相同時以先找到者為準，鄰居的遍歷順序固定，所以結果是確定的。
fn search<K: Hash + Eq + Copy, G: Graph<K>>(
    g: &G,
    src_id: K,
    stop_at: Option<K>,
) -> HashMap<K, (f64, K)> {
    let mut settled: HashMap<K, (f64, K)> = HashMap::new();
    if !g.contains_node(src_id) {
        return settled;
    }
    let mut min_heap: MyMinHeap<f64, K, K> = MyMinHeap::new();
    min_heap.push(src_id, 0.0, src_id);
    // 從優先權佇列中移除，並塞進最終 dist map
    while let Some((cur_id, cur_dist, backtrace)) = min_heap.pop() {
        settled.insert(cur_id, (cur_dist, backtrace));
        if Some(cur_id) == stop_at {
            break;
        }
        g.foreach_edge(cur_id, |next_id, weight| {
            if settled.contains_key(&next_id) {
                return;
            }
            let next_dist = cur_dist + weight;
            if let Some((&og_dist, _)) = min_heap.get(&next_id) {
                if og_dist > next_dist {
                    min_heap.decrease_priority(&next_id, next_dist);
                    if let Some(prev) = min_heap.get_mut(&next_id) {
                        *prev = cur_id;
                    }
                }
            } else {
                min_heap.push(next_id, next_dist, cur_id);
            }
        });
    }
    settled
}

fn backtrace_route<K: Hash + Eq + Copy>(
    settled: impl Fn(K) -> Option<K>,
    src_id: K,
    dst_id: K,
) -> Vec<K> {
    let mut path = vec![dst_id];
    let mut cur = dst_id;
    while cur != src_id {
        match settled(cur) {
            Some(prev) => {
                path.push(prev);
                cur = prev;
            }
            None => {
                debug_assert!(false, "回溯時斷線");
                return vec![];
            }
        }
    }
    path.reverse();
    path
}

/// 單次查詢，找到目標即停止。回傳 (距離, 路徑)，無法連通時回傳 None。
pub fn shortest_route<K: Hash + Eq + Copy, G: Graph<K>>(
    g: &G,
    src_id: K,
    dst_id: K,
) -> Option<(f64, Vec<K>)> {
    let settled = search(g, src_id, Some(dst_id));
    let &(dist, _) = settled.get(&dst_id)?;
    let route = backtrace_route(|id| settled.get(&id).map(|e| e.1), src_id, dst_id);
    Some((dist, route))
}

/// 最短路徑的節點序列，無法連通時為空
pub fn shortest_path<K: Hash + Eq + Copy, G: Graph<K>>(g: &G, src_id: K, dst_id: K) -> Vec<K> {
    shortest_route(g, src_id, dst_id)
        .map(|(_, route)| route)
        .unwrap_or_default()
}

/// 記住每個起點算過的整棵最短路徑樹，同一起點的多次查詢只算一次
pub struct Dijkstra<'a, K: Hash + Eq + Copy, G: Graph<K>> {
    g: &'a G,
    final_dist_map: HashMap<(K, K), (f64, K)>,
    routed_node_table: HashSet<K>,
}

impl<'a, K: Hash + Eq + Copy, G: Graph<K>> Dijkstra<'a, K, G> {
    pub fn new(g: &'a G) -> Self {
        Dijkstra {
            g,
            final_dist_map: HashMap::new(),
            routed_node_table: HashSet::new(),
        }
    }
    pub fn compute_route(&mut self, src_id: K) {
        if !self.routed_node_table.insert(src_id) {
            return;
        }
        for (id, entry) in search(self.g, src_id, None) {
            self.final_dist_map.insert((src_id, id), entry);
        }
    }
    pub fn get_dist(&mut self, src_id: K, dst_id: K) -> f64 {
        self.compute_route(src_id);
        match self.final_dist_map.get(&(src_id, dst_id)) {
            Some(entry) => entry.0,
            // NOTE: 路徑無法連通
            None => f64::INFINITY,
        }
    }
    pub fn get_route(&mut self, src_id: K, dst_id: K) -> Option<(f64, Vec<K>)> {
        self.compute_route(src_id);
        let &(dist, _) = self.final_dist_map.get(&(src_id, dst_id))?;
        let table = &self.final_dist_map;
        let route = backtrace_route(|id| table.get(&(src_id, id)).map(|e| e.1), src_id, dst_id);
        Some((dist, route))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::RoutingResult;
    use crate::graph_util::{NetworkGraph, Node, NodeID};
    use proptest::prelude::*;

    fn routers(cnt: u64) -> RoutingResult<NetworkGraph> {
        let mut g = NetworkGraph::new();
        for i in 0..cnt {
            g.add_node(Node::router(i, 0.0, 0.0))?;
        }
        Ok(g)
    }
    fn ids(v: Vec<u64>) -> Vec<NodeID> {
        v.into_iter().map(NodeID).collect()
    }

    /// D1=1, R1=2, R2=3, D2=4 組成的菱形
    fn diamond() -> RoutingResult<NetworkGraph> {
        let mut g = NetworkGraph::new();
        g.add_node(Node::device(1, 0.0, 0.0))?;
        g.add_node(Node::router(2, 5.0, 5.0))?;
        g.add_node(Node::router(3, 5.0, -5.0))?;
        g.add_node(Node::device(4, 10.0, 0.0))?;
        g.add_edge((NodeID(1), NodeID(2)), 5.0)?;
        g.add_edge((NodeID(2), NodeID(4)), 5.0)?;
        g.add_edge((NodeID(1), NodeID(3)), 2.0)?;
        g.add_edge((NodeID(3), NodeID(4)), 3.0)?;
        Ok(g)
    }

    #[test]
    fn test_diamond_prefers_cheaper_branch() -> RoutingResult<()> {
        let g = diamond()?;
        let (dist, route) = shortest_route(&g, NodeID(1), NodeID(4)).unwrap();
        assert_eq!(ids(vec![1, 3, 4]), route);
        assert_eq!(5.0, dist);
        Ok(())
    }

    #[test]
    fn test_dijkstra_memorized() -> RoutingResult<()> {
        let mut g = routers(6)?;
        g.add_edge((NodeID(0), NodeID(1)), 1.0)?;
        g.add_edge((NodeID(1), NodeID(2)), 1.0)?;
        g.add_edge((NodeID(0), NodeID(2)), 5.0)?;
        g.add_edge((NodeID(1), NodeID(3)), 1.0)?;
        g.add_edge((NodeID(0), NodeID(3)), 3.0)?;
        g.add_edge((NodeID(3), NodeID(4)), 3.0)?;

        let mut algo = Dijkstra::new(&g);
        assert_eq!(ids(vec![0, 1, 3, 4]), algo.get_route(NodeID(0), NodeID(4)).unwrap().1);
        assert_eq!(ids(vec![2, 1, 3, 4]), algo.get_route(NodeID(2), NodeID(4)).unwrap().1);
        assert_eq!(2.0, algo.get_dist(NodeID(0), NodeID(2)));
        assert!(algo.get_route(NodeID(0), NodeID(5)).is_none());
        assert_eq!(f64::INFINITY, algo.get_dist(NodeID(0), NodeID(5)));
        Ok(())
    }

    #[test]
    fn test_unreachable_is_empty() -> RoutingResult<()> {
        let mut g = routers(4)?;
        g.add_edge((NodeID(0), NodeID(1)), 1.0)?;
        g.add_edge((NodeID(2), NodeID(3)), 1.0)?;
        assert!(shortest_path(&g, NodeID(0), NodeID(3)).is_empty());
        assert!(shortest_path(&g, NodeID(0), NodeID(99)).is_empty());
        assert_eq!(ids(vec![2]), shortest_path(&g, NodeID(2), NodeID(2)));
        Ok(())
    }

    /// 窮舉所有簡單路徑的最小成本
    fn brute_force(g: &NetworkGraph, cur: NodeID, dst: NodeID, visited: &mut Vec<NodeID>) -> f64 {
        if cur == dst {
            return 0.0;
        }
        let mut best = f64::INFINITY;
        for &next in g.neighbors(cur) {
            if visited.contains(&next) {
                continue;
            }
            let w = g.get_weight((cur, next)).unwrap();
            visited.push(next);
            best = best.min(w + brute_force(g, next, dst, visited));
            visited.pop();
        }
        best
    }

    proptest! {
        #[test]
        fn prop_matches_brute_force(
            cnt in 2u64..=8,
            raw_edges in prop::collection::vec((0u64..8, 0u64..8, 0u32..50), 0..20),
            src in 0u64..8,
            dst in 0u64..8,
        ) {
            let mut g = routers(cnt).unwrap();
            for (a, b, w) in raw_edges {
                // 超出範圍、自環、重複的邊直接略過
                let _ = g.add_edge((NodeID(a % cnt), NodeID(b % cnt)), w as f64);
            }
            let (src, dst) = (NodeID(src % cnt), NodeID(dst % cnt));
            let expected = brute_force(&g, src, dst, &mut vec![src]);
            match shortest_route(&g, src, dst) {
                Some((dist, route)) => {
                    prop_assert!((dist - expected).abs() < 1e-9);
                    prop_assert!((g.get_dist(&route) - dist).abs() < 1e-9);
                    prop_assert_eq!(Some(&src), route.first());
                    prop_assert_eq!(Some(&dst), route.last());
                }
                None => prop_assert!(expected.is_infinite()),
            }
        }
    }
}
