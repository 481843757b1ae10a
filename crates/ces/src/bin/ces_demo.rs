//! # CES Demo
//!
//! Three entities, two systems, each system owning the components it acts on:
//!
//! - entity 1: position
//! - entity 2: name
//! - entity 3: position + name
//!
//! Runs two ticks with a despawn in between so the orphan pruning and the
//! despawn event show up in the log, then shuts down in reverse order.
//!
//! Run with: `RUST_LOG=debug cargo run --bin ces_demo [-- world.toml]`

use std::process::ExitCode;

use bytemuck::{Pod, Zeroable};
use ces::{
    typed, ComponentStore, EntityDespawned, EventKind, System, SystemContext, TypedEvent,
    World, WorldConfig, WorldResult,
};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Position {
    x: f32,
    y: f32,
    z: f32,
}

/// Published by the position system for every entity it visits.
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
#[repr(C)]
struct PositionSampled {
    entity: u64,
    xyz: [f32; 3],
    _pad: u32,
}

impl TypedEvent for PositionSampled {
    const KIND: EventKind = EventKind(1);
}

struct PositionSystem {
    positions: ComponentStore<Position>,
}

impl System for PositionSystem {
    fn name(&self) -> &str {
        "position"
    }

    fn update(&mut self, ctx: &mut SystemContext<'_>) {
        self.positions.prune_orphans(ctx.entities());
        for (_, record) in self.positions.iter() {
            let Position { x, y, z } = record.value;
            tracing::info!(entity = %record.owner, "{x} {y} {z}");
            ctx.events.publish(&PositionSampled {
                entity: record.owner.to_bits(),
                xyz: [x, y, z],
                _pad: 0,
            });
        }
    }
}

struct NameSystem {
    names: ComponentStore<String>,
}

impl System for NameSystem {
    fn name(&self) -> &str {
        "name"
    }

    fn init(&mut self, ctx: &mut SystemContext<'_>) {
        ctx.events.register(typed(|sampled: PositionSampled| {
            tracing::debug!(entity = sampled.entity, xyz = ?sampled.xyz, "position sampled");
            true
        }));
        ctx.events.register(typed(|despawned: EntityDespawned| {
            tracing::info!(entity = %despawned.handle(), "entity despawned");
            true
        }));
    }

    fn update(&mut self, ctx: &mut SystemContext<'_>) {
        self.names.prune_orphans(ctx.entities());
        for (_, record) in self.names.iter() {
            tracing::info!(entity = %record.owner, "{}", record.value);
        }
    }

    fn shutdown(&mut self, _ctx: &mut SystemContext<'_>) {
        tracing::info!(remaining = self.names.len(), "dropping names");
    }
}

fn run() -> WorldResult<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => WorldConfig::from_toml_file(path)?,
        None => WorldConfig {
            publish_despawn_events: true,
            ..WorldConfig::default()
        },
    };
    let mut world = World::new(config);

    let entity_with_pos = world.spawn();
    let entity_with_name = world.spawn();
    let entity_with_both = world.spawn();

    let mut positions = ComponentStore::new();
    positions.attach(
        world.entities(),
        entity_with_pos,
        Position { x: 1.0, y: 2.0, z: 3.0 },
    )?;
    positions.attach(
        world.entities(),
        entity_with_both,
        Position { x: 4.0, y: 5.0, z: 6.0 },
    )?;

    let mut names = ComponentStore::new();
    names.attach(world.entities(), entity_with_name, "hello world".to_owned())?;
    names.attach(
        world.entities(),
        entity_with_both,
        "world hello lolwut?".to_owned(),
    )?;

    world.add_system(Box::new(PositionSystem { positions }));
    world.add_system(Box::new(NameSystem { names }));

    world.init();
    world.tick();

    world.despawn(entity_with_both)?;
    world.tick();

    world.shutdown();

    let totals = world.totals();
    tracing::info!(
        ticks = totals.ticks,
        consumed = totals.consumed,
        peak_pending = totals.peak_pending,
        "done"
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "demo failed");
            ExitCode::FAILURE
        }
    }
}
