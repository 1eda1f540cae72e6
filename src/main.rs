use std::path::PathBuf;
use std::thread;

use ant_routing::graph_util::NodeID;
use ant_routing::routing_algos::compare::RouteMetrics;
use ant_routing::routing_algos::{RoutingAlgo, SPF};
use ant_routing::{read_demands_from_file, read_topo_from_file, Config, SimulationEngine};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum AlgoType {
    Aco,
    Spf,
    Both,
}

#[derive(Debug, Parser)]
#[command(name = "ant_routing", version, about = "蟻群演算法與最短路徑的路由模擬")]
struct Args {
    /// 拓撲檔 (JSON)
    #[arg(long, default_value = "test_topo.json")]
    topo: PathBuf,
    /// 流量需求檔 (JSON)
    #[arg(long)]
    demands: Option<PathBuf>,
    /// 參數檔 (JSON)，省略時使用預設值
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    source: u64,
    #[arg(long)]
    target: u64,
    #[arg(long, value_enum, default_value_t = AlgoType::Both)]
    algo: AlgoType,
    /// 依 ant_speed 的節奏逐輪執行，而不是一次跑完
    #[arg(long)]
    realtime: bool,
}

fn show_route(name: &str, metrics: Option<&RouteMetrics>) {
    match metrics {
        Some(m) => println!(
            "{}: route = {:?}, cost = {:.3}, hops = {}, routers = {}, congestion = {:.4}",
            name,
            m.route.iter().map(|id| id.0).collect::<Vec<_>>(),
            m.cost,
            m.hops,
            m.routers,
            m.mean_congestion
        ),
        None => println!("{}: no route", name),
    }
}

fn main() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path).map_err(|e| e.to_string())?,
        None => Config::default(),
    };
    let g = read_topo_from_file(&args.topo).map_err(|e| e.to_string())?;
    let (src, dst) = (NodeID(args.source), NodeID(args.target));

    let mut engine = SimulationEngine::new(config).map_err(|e| e.to_string())?;
    engine.load_graph(g);
    if let Some(path) = &args.demands {
        let demands = read_demands_from_file(path).map_err(|e| e.to_string())?;
        engine.load_demands(demands).map_err(|e| e.to_string())?;
    }

    if args.algo != AlgoType::Spf {
        engine.start_route(src, dst).map_err(|e| e.to_string())?;
        if args.realtime {
            let period = engine.tick_period();
            while let Some(report) = engine.step() {
                engine.advance_tokens();
                println!(
                    "iteration {} ({:?}): best cost = {:.3}, ants arrived = {}",
                    report.iteration, report.phase, report.best_path_cost, report.epoch.successful
                );
                thread::sleep(period);
            }
        } else {
            engine.run_to_completion();
        }
        let cmp = engine.compare();
        show_route("aco", cmp.aco.as_ref());
        if args.algo == AlgoType::Both {
            show_route("dijkstra", cmp.dijkstra.as_ref());
            match cmp.efficiency() {
                Some(eff) => println!("efficiency = {:.4}", eff),
                None => println!("efficiency = n/a"),
            }
        }
    } else {
        let mut algo = SPF::new();
        match algo.compute_route(engine.graph(), src, dst) {
            Some(route) => println!(
                "{}: route = {:?}, cost = {:.3}",
                algo.name(),
                route.nodes.iter().map(|id| id.0).collect::<Vec<_>>(),
                route.cost
            ),
            None => println!("{}: no route", algo.name()),
        }
        println!("compute time = {} us", algo.get_last_compute_time());
    }

    let summary = engine.summary();
    println!(
        "routers = {}, devices = {}, edges = {}, mean congestion = {:.4}, mean utilization = {:.4}",
        summary.total_routers,
        summary.total_devices,
        summary.total_edges,
        summary.average_congestion,
        summary.average_utilization
    );
    Ok(())
}
