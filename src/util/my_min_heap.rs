use std::collections::HashMap;
use std::hash::Hash;

/// 可以依鍵查詢、調降權重的最小堆積
pub struct MyMinHeap<P: PartialOrd, K: Hash + Eq + Clone, V = ()> {
    vec: Vec<(K, P, V)>,
    table: HashMap<K, usize>,
}

impl<P: PartialOrd, K: Hash + Eq + Clone, V> Default for MyMinHeap<P, K, V> {
    fn default() -> Self {
        MyMinHeap {
            vec: vec![],
            table: HashMap::new(),
        }
    }
}

impl<P: PartialOrd, K: Hash + Eq + Clone, V> MyMinHeap<P, K, V> {
    pub fn new() -> Self {
        MyMinHeap::default()
    }
    fn swap(&mut self, i1: usize, i2: usize) {
        if i1 != i2 {
            self.vec.swap(i1, i2);
            self.table.insert(self.vec[i1].0.clone(), i1);
            self.table.insert(self.vec[i2].0.clone(), i2);
        }
    }
    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.vec[index].1 < self.vec[parent].1 {
                self.swap(index, parent);
                index = parent;
            } else {
                break;
            }
        }
    }
    fn sift_down(&mut self, mut index: usize) {
        loop {
            let (left, right) = (index * 2 + 1, index * 2 + 2);
            let mut smallest = index;
            if left < self.vec.len() && self.vec[left].1 < self.vec[smallest].1 {
                smallest = left;
            }
            if right < self.vec.len() && self.vec[right].1 < self.vec[smallest].1 {
                smallest = right;
            }
            if smallest == index {
                break;
            }
            self.swap(index, smallest);
            index = smallest;
        }
    }
    pub fn push(&mut self, id: K, priority: P, value: V) {
        debug_assert!(!self.contains_key(&id), "MyMinHeap: 欲加入已存在的鍵");
        let index = self.vec.len();
        self.table.insert(id.clone(), index);
        self.vec.push((id, priority, value));
        self.sift_up(index);
    }
    pub fn pop(&mut self) -> Option<(K, P, V)> {
        if self.vec.is_empty() {
            return None;
        }
        let last = self.vec.len() - 1;
        self.swap(0, last);
        let head = self.vec.pop()?;
        self.table.remove(&head.0);
        if !self.vec.is_empty() {
            self.sift_down(0);
        }
        Some(head)
    }
    pub fn contains_key(&self, id: &K) -> bool {
        self.table.contains_key(id)
    }
    pub fn len(&self) -> usize {
        self.vec.len()
    }
    pub fn is_empty(&self) -> bool {
        self.vec.is_empty()
    }
    /// 新權重不比原本小時不做任何事
    pub fn decrease_priority(&mut self, id: &K, new_priority: P) {
        if let Some(&index) = self.table.get(id) {
            if new_priority < self.vec[index].1 {
                self.vec[index].1 = new_priority;
                self.sift_up(index);
            }
        }
    }
    pub fn peek(&self) -> Option<&(K, P, V)> {
        self.vec.first()
    }
    pub fn get(&self, id: &K) -> Option<(&P, &V)> {
        self.table.get(id).map(|&index| {
            let entry = &self.vec[index];
            (&entry.1, &entry.2)
        })
    }
    pub fn get_mut(&mut self, id: &K) -> Option<&mut V> {
        let index = *self.table.get(id)?;
        Some(&mut self.vec[index].2)
    }
}
