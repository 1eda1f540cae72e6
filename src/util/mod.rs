mod my_min_heap;
pub use my_min_heap::MyMinHeap;

mod dijkstra;
pub use dijkstra::{shortest_path, shortest_route, Dijkstra};

pub mod aco;
