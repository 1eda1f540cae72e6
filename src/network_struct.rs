use std::hash::Hash;

/// 無向加權圖的唯讀介面，供各種路徑演算法共用
pub trait Graph<K: Hash + Eq + Copy> {
    fn contains_node(&self, id: K) -> bool;
    /// 走訪 `id` 的每個鄰居與連接邊的權重，順序固定
    fn foreach_edge(&self, id: K, callback: impl FnMut(K, f64));
    fn foreach_node(&self, callback: impl FnMut(K));
    fn get_weight(&self, id_pair: (K, K)) -> Option<f64>;
    /// 路徑上的權重總和，相鄰兩點不相連時為 `INFINITY`
    fn get_dist(&self, path: &[K]) -> f64 {
        let mut dist = 0.0;
        for pair in path.windows(2) {
            match self.get_weight((pair[0], pair[1])) {
                Some(w) => dist += w,
                None => return f64::INFINITY,
            }
        }
        dist
    }
}
