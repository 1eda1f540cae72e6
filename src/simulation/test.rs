use rand::rngs::StdRng;
use rand::SeedableRng;

use super::*;

/**
 * 菱形拓撲，權重標在邊上
 *      R1(2)
 *   5 /    \ 5
 * D1(1)    D2(4)
 *   2 \    / 3
 *      R2(3)
 *
 * 最短路徑為 [1, 3, 4]，成本 5
 */
fn diamond_engine(config: Config) -> RoutingResult<SimulationEngine> {
    let mut engine = SimulationEngine::with_rng(config, StdRng::seed_from_u64(7))?;
    engine.insert_node(Node::device(1, 0.0, 0.0))?;
    engine.insert_node(Node::router(2, 5.0, 5.0))?;
    engine.insert_node(Node::router(3, 5.0, -5.0))?;
    engine.insert_node(Node::device(4, 10.0, 0.0))?;
    engine.add_edge((NodeID(1), NodeID(2)), 5.0)?;
    engine.add_edge((NodeID(2), NodeID(4)), 5.0)?;
    engine.add_edge((NodeID(1), NodeID(3)), 2.0)?;
    engine.add_edge((NodeID(3), NodeID(4)), 3.0)?;
    Ok(engine)
}

fn small_config() -> Config {
    Config {
        num_ants: 5,
        evaporation_rate: 0.1,
        exploration_iterations: 5,
        total_iterations: 10,
        ..Config::default()
    }
}

fn ids(v: Vec<u64>) -> Vec<NodeID> {
    v.into_iter().map(NodeID).collect()
}

#[test]
fn test_converges_on_diamond() -> RoutingResult<()> {
    let mut engine = diamond_engine(small_config())?;
    engine.start_route(NodeID(1), NodeID(4))?;
    assert_eq!(Phase::Exploration, engine.phase());
    assert_eq!(ids(vec![1, 3, 4]), engine.run_state().baseline_path);
    assert_eq!(5.0, engine.run_state().baseline_cost);

    assert_eq!(10, engine.run_to_completion());
    assert_eq!(Phase::Complete, engine.phase());
    assert_eq!(10, engine.iteration_count());
    let (path, cost) = engine.best_path();
    assert_eq!(&ids(vec![1, 3, 4])[..], path);
    assert_eq!(5.0, cost);
    assert!(engine.live_tokens().is_empty());
    assert!(engine.active_edges().is_empty());

    let cmp = engine.compare();
    assert!(cmp.matches_optimum());
    assert_eq!(Some(1.0), cmp.efficiency());
    // 結束後不再執行
    assert!(engine.step().is_none());
    Ok(())
}

#[test]
fn test_phase_transitions() -> RoutingResult<()> {
    let config = Config {
        exploration_iterations: 2,
        total_iterations: 4,
        ..small_config()
    };
    let mut engine = diamond_engine(config)?;
    engine.start_route(NodeID(1), NodeID(4))?;
    let phases: Vec<Phase> = (0..5)
        .map(|_| engine.step().map(|report| report.phase))
        .map(|phase| phase.unwrap_or(Phase::Idle))
        .collect();
    assert_eq!(
        vec![
            Phase::Exploration,
            Phase::Convergence,
            Phase::Convergence,
            Phase::Complete,
            Phase::Idle
        ],
        phases
    );
    assert_eq!(Phase::Complete, engine.phase());
    Ok(())
}

#[test]
fn test_no_exploration_starts_in_convergence() -> RoutingResult<()> {
    let config = Config {
        exploration_iterations: 0,
        ..small_config()
    };
    let mut engine = diamond_engine(config)?;
    engine.start_route(NodeID(1), NodeID(4))?;
    assert_eq!(Phase::Convergence, engine.phase());
    Ok(())
}

#[test]
fn test_best_cost_is_monotonic() -> RoutingResult<()> {
    let config = Config {
        num_ants: 1,
        ..small_config()
    };
    let mut engine = diamond_engine(config)?;
    engine.start_route(NodeID(1), NodeID(4))?;
    let mut last = f64::INFINITY;
    while let Some(report) = engine.step() {
        assert!(report.best_path_cost <= last);
        last = report.best_path_cost;
    }
    Ok(())
}

#[test]
fn test_same_source_and_target_rejected() -> RoutingResult<()> {
    let mut engine = diamond_engine(small_config())?;
    assert_eq!(
        Err(RoutingError::InvalidSelection(
            "source and target must be different nodes"
        )),
        engine.start_route(NodeID(1), NodeID(1))
    );
    assert_eq!(Phase::Idle, engine.phase());
    assert_eq!(RunState::default(), *engine.run_state());
    assert!(engine.pheromone().is_empty());
    Ok(())
}

#[test]
fn test_missing_selection_rejected() -> RoutingResult<()> {
    let mut engine = diamond_engine(small_config())?;
    engine.select_source(NodeID(1))?;
    assert!(matches!(
        engine.start(),
        Err(RoutingError::InvalidSelection(_))
    ));
    assert_eq!(
        Err(RoutingError::UnknownNode(NodeID(9))),
        engine.select_target(NodeID(9))
    );
    assert_eq!((Some(NodeID(1)), None), engine.selection());
    assert_eq!(Phase::Idle, engine.phase());
    Ok(())
}

#[test]
fn test_degenerate_runs_rejected() -> RoutingResult<()> {
    let mut engine = SimulationEngine::with_rng(small_config(), StdRng::seed_from_u64(1))?;
    engine.insert_node(Node::router(1, 0.0, 0.0))?;
    engine.insert_node(Node::router(2, 0.0, 0.0))?;
    engine.insert_node(Node::router(3, 0.0, 0.0))?;
    assert!(matches!(
        engine.start_route(NodeID(1), NodeID(2)),
        Err(RoutingError::DegenerateRun(_))
    ));

    engine.add_edge((NodeID(1), NodeID(2)), 1.0)?;
    assert!(matches!(
        engine.start_route(NodeID(1), NodeID(3)),
        Err(RoutingError::DegenerateRun(_))
    ));
    assert_eq!(Phase::Idle, engine.phase());
    assert!(engine.step().is_none());
    Ok(())
}

#[test]
fn test_stop_keeps_best_and_pheromone() -> RoutingResult<()> {
    let mut engine = diamond_engine(small_config())?;
    engine.start_route(NodeID(1), NodeID(4))?;
    for _ in 0..3 {
        engine.step();
    }
    let best = engine.best_path().0.to_vec();
    let pheromone = engine.pheromone().clone();
    assert!(!best.is_empty());

    engine.stop();
    assert_eq!(Phase::Idle, engine.phase());
    assert!(engine.live_tokens().is_empty());
    assert!(engine.step().is_none());
    assert_eq!(3, engine.iteration_count());
    assert_eq!(&best[..], engine.best_path().0);
    assert_eq!(&pheromone, engine.pheromone());

    // 不在執行中時 stop 不做任何事
    engine.stop();
    assert_eq!(3, engine.iteration_count());
    Ok(())
}

#[test]
fn test_reset_is_idempotent() -> RoutingResult<()> {
    let mut engine = diamond_engine(small_config())?;
    engine.start_route(NodeID(1), NodeID(4))?;
    engine.run_to_completion();

    engine.reset();
    let once = engine.run_state().clone();
    let pheromone_once = engine.pheromone().clone();
    engine.reset();
    assert_eq!(once, *engine.run_state());
    assert_eq!(pheromone_once, *engine.pheromone());
    assert_eq!(RunState::default(), once);
    assert!(engine.pheromone().is_empty());
    // 選取保留，可以直接再跑一次
    assert_eq!((Some(NodeID(1)), Some(NodeID(4))), engine.selection());
    engine.start()?;
    assert_eq!(Phase::Exploration, engine.phase());
    Ok(())
}

#[test]
fn test_tokens_follow_best_path() -> RoutingResult<()> {
    let config = Config {
        max_visual_tokens: 3,
        ..small_config()
    };
    let mut engine = diamond_engine(config)?;
    engine.start_route(NodeID(1), NodeID(4))?;
    engine.step();
    let path = engine.best_path().0.to_vec();
    assert_eq!(3, engine.live_tokens().len());
    for token in engine.live_tokens() {
        assert!(path.windows(2).any(|w| w[0] == token.from && w[1] == token.to));
        assert!(engine.active_edges().contains(&(token.from, token.to)));
        assert!(engine.active_edges().contains(&(token.to, token.from)));
    }
    Ok(())
}

#[test]
fn test_advance_tokens() -> RoutingResult<()> {
    let mut engine = diamond_engine(small_config())?;
    engine.start_route(NodeID(1), NodeID(4))?;
    // 前幾輪最佳路徑可能還不是 [1, 3, 4]，跑到找到為止
    while engine.best_path().0 != &ids(vec![1, 3, 4])[..] {
        engine.step().unwrap();
    }
    let before = engine.live_tokens().len();
    let on_first_edge = engine
        .live_tokens()
        .iter()
        .filter(|t| t.from == NodeID(1))
        .count();

    // 每次前進約 1.5 條邊：第一條邊上的移到第二條邊中間，第二條邊上的抵達終點
    engine.set_ant_speed(750.0)?;
    engine.advance_tokens();
    assert!(before > 0);
    assert_eq!(on_first_edge, engine.live_tokens().len());
    for token in engine.live_tokens() {
        assert_eq!((NodeID(3), NodeID(4)), (token.from, token.to));
        assert!((token.progress - 0.5).abs() < 1e-9);
    }
    Ok(())
}

#[test]
fn test_run_uses_graph_snapshot() -> RoutingResult<()> {
    let mut engine = diamond_engine(small_config())?;
    engine.start_route(NodeID(1), NodeID(4))?;
    // 執行中加入捷徑不影響本次執行
    engine.insert_node(Node::router(5, 1.0, 1.0))?;
    engine.add_edge((NodeID(1), NodeID(5)), 0.1)?;
    engine.add_edge((NodeID(5), NodeID(4)), 0.1)?;
    engine.run_to_completion();
    assert_eq!(5.0, engine.best_path().1);

    engine.start()?;
    engine.run_to_completion();
    assert_eq!(ids(vec![1, 5, 4]), engine.run_state().baseline_path);
    assert!(engine.best_path().1 < 1.0);
    Ok(())
}

#[test]
fn test_demands_drive_utilization() -> RoutingResult<()> {
    let mut engine = diamond_engine(small_config())?;
    let id = engine.add_demand(NodeID(1), NodeID(4), 0.4, 5)?;
    assert_eq!(ids(vec![3]), engine.demands().get(id).unwrap().routers_in_path);

    let r2_d2 = engine.graph().edge_between(NodeID(3), NodeID(4)).unwrap().id;
    assert_eq!(Some(0.4 / 100.0), engine.edge_utilization(r2_d2));
    assert_eq!(Some(0.4 / 100.0), engine.node_congestion(NodeID(3)));

    engine.update_demand(id, DemandUpdate::volume(20.0))?;
    assert_eq!(Some(0.2), engine.edge_utilization(r2_d2));
    engine.update_demand(id, DemandUpdate::activate(false))?;
    assert_eq!(Some(0.0), engine.edge_utilization(r2_d2));
    engine.update_demand(id, DemandUpdate::activate(true))?;

    engine.remove_demand(id)?;
    assert_eq!(Some(0.0), engine.edge_utilization(r2_d2));
    assert!(engine.traffic().routes.is_empty());
    assert_eq!(
        Err(RoutingError::UnknownNode(NodeID(8))),
        engine.add_demand(NodeID(1), NodeID(8), 0.1, 5)
    );
    assert!(engine.add_demand(NodeID(1), NodeID(4), -1.0, 5).is_err());
    Ok(())
}

#[test]
fn test_congestion_aware_avoids_loaded_branch() -> RoutingResult<()> {
    let mut engine = diamond_engine(small_config())?;
    // 塞滿 [1, 3, 4]
    engine.add_demand(NodeID(1), NodeID(4), 100.0, 5)?;
    engine.set_routing_mode(RoutingMode::CongestionAware);
    engine.start_route(NodeID(1), NodeID(4))?;
    engine.run_to_completion();
    let (path, cost) = engine.best_path();
    assert_eq!(&ids(vec![1, 2, 4])[..], path);
    assert_eq!(10.0, cost);
    // 基準仍以原始權重計算
    assert_eq!(ids(vec![1, 3, 4]), engine.run_state().baseline_path);
    Ok(())
}

/**
 * 1 -- 2 是死路，唯一的路徑 1 -- 3 -- 4 的第一段被流量塞滿
 *      2
 *   10 |
 *      1 --1-- 3 --1-- 4
 */
#[test]
fn test_full_congestion_bias_still_finds_only_route() -> RoutingResult<()> {
    let config = Config {
        congestion_bias: 1.0,
        ..small_config()
    };
    let mut engine = SimulationEngine::with_rng(config, StdRng::seed_from_u64(5))?;
    for id in 1..=4u64 {
        engine.insert_node(Node::router(id, id as f64, 0.0))?;
    }
    engine.add_edge((NodeID(1), NodeID(2)), 10.0)?;
    engine.add_edge((NodeID(1), NodeID(3)), 1.0)?;
    engine.add_edge((NodeID(3), NodeID(4)), 1.0)?;
    engine.add_demand(NodeID(1), NodeID(3), 100.0, 5)?;
    let e13 = engine.graph().edge_between(NodeID(1), NodeID(3)).unwrap().id;
    assert_eq!(Some(1.0), engine.edge_utilization(e13));

    engine.start_route(NodeID(1), NodeID(4))?;
    assert!(engine.pheromone().get(NodeID(1), NodeID(3)) > 0.0);
    engine.run_to_completion();
    let (path, cost) = engine.best_path();
    assert_eq!(&ids(vec![1, 3, 4])[..], path);
    assert_eq!(2.0, cost);
    Ok(())
}

#[test]
fn test_parameter_setters_validate() -> RoutingResult<()> {
    let mut engine = diamond_engine(small_config())?;
    assert!(engine.set_evaporation_rate(1.5).is_err());
    assert!(engine.set_pheromone_deposit(0.0).is_err());
    assert!(engine.set_num_ants(0).is_err());
    assert!(engine.set_ant_speed(-1.0).is_err());
    assert!(engine.set_traffic_weight(f64::NAN).is_err());
    assert_eq!(&small_config(), engine.config());

    engine.set_evaporation_rate(0.3)?;
    engine.set_ant_speed(10.0)?;
    assert_eq!(0.3, engine.config().evaporation_rate);
    assert_eq!(Duration::from_millis(100), engine.tick_period());
    Ok(())
}

#[test]
fn test_place_and_clear() -> RoutingResult<()> {
    let mut engine = SimulationEngine::new(Config {
        seed: Some(3),
        ..Config::default()
    })?;
    engine.add_node(Node::router(1, 0.0, 0.0))?;
    engine.add_node(Node::router(2, 300.0, 0.0))?;
    // 兩台路由器都在裝置的 200 範圍內
    assert_eq!(2, engine.add_node(Node::device(3, 100.0, 0.0))?.len());
    engine.add_demand(NodeID(3), NodeID(2), 0.5, 5)?;
    engine.start_route(NodeID(3), NodeID(2))?;
    engine.step();

    engine.clear();
    assert!(engine.graph().is_empty());
    assert!(engine.demands().is_empty());
    assert!(engine.pheromone().is_empty());
    assert_eq!(RunState::default(), *engine.run_state());
    assert_eq!((None, None), engine.selection());
    assert_eq!(NetworkSummary::default(), engine.summary());
    Ok(())
}
