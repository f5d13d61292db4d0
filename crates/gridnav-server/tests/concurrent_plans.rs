use gridnav_core::{GridBounds, LocalPosition, Obstacle, SearchMode};
use gridnav_server::config::Config;
use gridnav_server::route_planner::{plan_route, RoutePlanRequest};

fn slalom() -> RoutePlanRequest {
    let obstacles = (0..4)
        .map(|i| {
            let east = if i % 2 == 0 { 12.0 } else { 28.0 };
            Obstacle::new(8.0 + 10.0 * i as f64, east, 15.0, 2.0, 12.0, 15.0)
        })
        .collect();
    RoutePlanRequest {
        safety_distance: Some(1.0),
        bounds: Some(GridBounds::new(0.0, 50.0, 0.0, 40.0)),
        ..RoutePlanRequest::new(
            obstacles,
            LocalPosition::new(0.0, 20.0),
            LocalPosition::new(49.0, 20.0),
        )
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_do_not_interfere() {
    let config = Config::default();
    let baseline = plan_route(&config, slalom()).await.unwrap();
    assert!(baseline.ok, "{:?}", baseline.errors);
    let expected = baseline.plan.unwrap();

    let mut handles = Vec::new();
    for _ in 0..16 {
        let config = config.clone();
        handles.push(tokio::spawn(async move {
            plan_route(&config, slalom()).await.unwrap()
        }));
    }

    for handle in handles {
        let response = handle.await.unwrap();
        let plan = response.plan.expect("plan");
        assert_eq!(plan.path, expected.path);
        assert_eq!(plan.cost, expected.cost);
    }
}

#[tokio::test]
async fn relaxing_mode_is_no_more_expensive() {
    let config = Config::default();
    let first = plan_route(&config, slalom()).await.unwrap().plan.unwrap();
    let relaxed = plan_route(
        &config,
        RoutePlanRequest {
            mode: Some(SearchMode::Relaxing),
            ..slalom()
        },
    )
    .await
    .unwrap()
    .plan
    .unwrap();
    assert!(relaxed.cost <= first.cost + 1e-9);
}
