//! Tether reference host
//!
//! Places one anchor on a line of nodes, powers the network, cuts power half
//! way through and prints what the anchor holds.

use std::str::FromStr;
use std::time::Duration;

use tether_sim::{SimEvent, World, WorldConfig};
use tether_topology::NodePos;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tether_sim=info,tether_anchor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = WorldConfig::from_env()?;
    let nodes: i64 = env_or("TETHER_NODES", 8)?;
    let ticks: u64 = env_or("TETHER_TICKS", 600)?;
    let tick_ms: u64 = env_or("TETHER_TICK_MS", 0)?;

    println!("Tether reference host");
    println!("=====================");
    println!();

    let mut world = World::new(config);
    let anchor = world.place_anchor(NodePos::new(0, 64, 0))?;
    for i in 1..=nodes {
        world.add_node(NodePos::new(i * 12, 64, 0))?;
    }
    world.set_powered(true);

    let mut pacing = tokio::time::interval(Duration::from_millis(tick_ms.max(1)));
    let mut peak = 0;
    for t in 0..ticks {
        if tick_ms > 0 {
            pacing.tick().await;
        }
        if t == ticks / 2 {
            world.set_powered(false);
        }
        world.step()?;

        if let Some(held) = world.anchor(&anchor).map(|a| a.count_loaded_regions()) {
            peak = peak.max(held);
        }
    }

    let ticked = world
        .events()
        .iter()
        .filter(|e| matches!(e, SimEvent::AnchorTicked { .. }))
        .count();

    println!("Ran {} ticks:", world.tick());
    println!("  Nodes: {}", world.node_count());
    println!("  Required regions: {}", world.network().region_count(world.config().level));
    println!("  Peak held regions: {}", peak);
    if let Some(state) = world.anchor(&anchor) {
        println!("  Held regions now: {}", state.count_loaded_regions());
        println!("  Powerless ticks: {}", state.power().powerless_ticks);
    }
    println!("  Anchor invocations: {}", ticked);
    println!("  Idle draw: {}", world.energy().total());

    Ok(())
}

fn env_or<T>(key: &str, default: T) -> Result<T, Box<dyn std::error::Error>>
where
    T: FromStr,
    T::Err: std::error::Error + 'static,
{
    match std::env::var(key) {
        Ok(raw) => Ok(raw.trim().parse()?),
        Err(_) => Ok(default),
    }
}
