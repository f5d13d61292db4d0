use std::time::Instant;

use gridnav_core::{
    build_grid, has_line_of_sight, GridBounds, LocalPosition, Obstacle, PlannerConfig, SearchMode,
};
use gridnav_server::config::Config;
use gridnav_server::route_planner::{plan_route, planner_config, RoutePlanRequest};

struct StressScenario {
    name: &'static str,
    request: RoutePlanRequest,
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    let scenarios = vec![
        StressScenario {
            name: "Downtown blocks 200m",
            request: city_blocks(200.0, 20.0),
        },
        StressScenario {
            name: "Downtown blocks 600m",
            request: city_blocks(600.0, 25.0),
        },
        StressScenario {
            name: "Walled yard (no route)",
            request: walled_yard(),
        },
    ];

    for scenario in scenarios {
        println!("\n=== {} ===", scenario.name);
        for mode in [SearchMode::FirstDiscovery, SearchMode::Relaxing] {
            let request = RoutePlanRequest {
                mode: Some(mode),
                ..scenario.request.clone()
            };
            let started = Instant::now();
            let response = match plan_route(&config, request.clone()).await {
                Ok(response) => response,
                Err(err) => {
                    println!("{:?}: worker failed: {}", mode, err);
                    continue;
                }
            };
            let elapsed = started.elapsed();

            let Some(plan) = response.plan else {
                println!(
                    "{:?}: FAIL in {:.1?} | failure={:?} errors={:?}",
                    mode, elapsed, response.failure, response.errors
                );
                continue;
            };
            println!(
                "{:?}: OK in {:.1?} | cost={:.2} nodes={} raw={} pruned={}",
                mode,
                elapsed,
                plan.cost,
                plan.nodes_expanded,
                plan.raw_path.len(),
                plan.path.len()
            );

            let Ok(resolved) = planner_config(&config, &request) else {
                continue;
            };
            let blocked = count_blocked_segments(&request, &resolved, &plan.path);
            if blocked == 0 {
                println!("Line-of-sight check: PASS");
            } else {
                println!("Line-of-sight check: FAIL ({} segments)", blocked);
            }
        }
    }
}

/// Square blocks on a regular street grid, every third block too low to matter.
fn city_blocks(extent: f64, block: f64) -> RoutePlanRequest {
    let pitch = block * 2.0;
    let mut obstacles = Vec::new();
    let mut index = 0usize;
    let mut north = pitch;
    while north < extent - pitch {
        let mut east = pitch;
        while east < extent - pitch {
            let height = if index % 3 == 0 { 2.0 } else { 40.0 };
            obstacles.push(Obstacle::new(
                north,
                east,
                height / 2.0,
                block / 2.0,
                block / 2.0,
                height / 2.0,
            ));
            index += 1;
            east += pitch;
        }
        north += pitch;
    }

    RoutePlanRequest {
        altitude: Some(10.0),
        safety_distance: Some(3.0),
        bounds: Some(GridBounds::new(0.0, extent, 0.0, extent)),
        ..RoutePlanRequest::new(
            obstacles,
            LocalPosition::new(1.0, 1.0),
            LocalPosition::new(extent - 2.0, extent - 2.0),
        )
    }
}

fn walled_yard() -> RoutePlanRequest {
    let obstacles = vec![
        Obstacle::new(30.0, 50.0, 20.0, 1.0, 21.0, 20.0),
        Obstacle::new(70.0, 50.0, 20.0, 1.0, 21.0, 20.0),
        Obstacle::new(50.0, 30.0, 20.0, 21.0, 1.0, 20.0),
        Obstacle::new(50.0, 70.0, 20.0, 21.0, 1.0, 20.0),
    ];
    RoutePlanRequest {
        altitude: Some(10.0),
        safety_distance: Some(1.0),
        bounds: Some(GridBounds::new(0.0, 100.0, 0.0, 100.0)),
        ..RoutePlanRequest::new(
            obstacles,
            LocalPosition::new(5.0, 5.0),
            LocalPosition::new(50.0, 50.0),
        )
    }
}

fn count_blocked_segments(
    request: &RoutePlanRequest,
    planner_config: &PlannerConfig,
    path: &[gridnav_core::Cell],
) -> usize {
    let Ok(grid) = build_grid(&request.obstacles, &planner_config.grid_config()) else {
        return 0;
    };
    path.windows(2)
        .filter(|pair| !has_line_of_sight(&grid, pair[0], pair[1]))
        .count()
}
