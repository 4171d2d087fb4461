//! Headless Quarry client.
//!
//! Runs the interaction core against an in-memory world for a fixed number
//! of frames: a scripted player digs and places while a simulated server
//! thread streams presentation events.

mod script;
mod server;
mod world;

use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::path::Path;

use clap::Parser;
use quarry_config::{CliArgs, Config, Settings, defaults_for};
use quarry_interact::{
    DigOutcome, FocusState, FrameClock, FrameContext, FrameLimits, FrameReport, InteractionCore,
    InteractionKind, PointedTarget, SelectionSink, StatusText,
};
use quarry_voxel::{ItemDef, ItemRegistry, NodeRegistry, ToolCapabilities, ToolGroupCap};
use tracing::{debug, error, info, warn};

use crate::script::Script;
use crate::world::{MemoryWorld, ServerLink, register_nodes};

/// Logs highlight changes the way a renderer would redraw them.
#[derive(Default)]
struct Highlight {
    current: PointedTarget,
}

impl SelectionSink for Highlight {
    fn set_selection(&mut self, target: &PointedTarget) {
        if *target != self.current {
            debug!(?target, "Selection moved");
            self.current = *target;
        }
    }
}

#[derive(Debug, Default)]
struct Summary {
    frames: u32,
    digs_completed: u32,
    placed: u32,
    events: usize,
    particles: usize,
    status_messages: u32,
}

fn register_items() -> Result<ItemRegistry, quarry_voxel::RegistryError> {
    let mut items = ItemRegistry::new();
    items.register(ItemDef {
        tool_capabilities: Some(
            ToolCapabilities {
                full_punch_interval: 1.2,
                ..ToolCapabilities::default()
            }
            .with_group_cap(
                "cracky",
                ToolGroupCap {
                    times: BTreeMap::from([(2, 2.0), (3, 0.6)]),
                    uses: 20,
                    max_level: 1,
                },
            )
            .with_damage("fleshy", 3),
        ),
        ..ItemDef::new(script::PICK)
    })?;
    items.register(ItemDef::placing(script::STONE, script::STONE))?;
    Ok(items)
}

fn run(args: &CliArgs, config: &Config, config_dir: &Path) -> Result<Summary, Box<dyn Error>> {
    let profile = config.client.profile;
    let mut settings = Settings::load_layered(config_dir, profile).unwrap_or_else(|e| {
        warn!("Failed to load settings: {e}, using {profile:?} defaults");
        defaults_for(profile)
    });

    let mut nodes = NodeRegistry::new();
    let content = register_nodes(&mut nodes)?;
    let items = register_items()?;
    info!(nodes = nodes.len(), items = items.len(), "Registered content");

    let mut core = InteractionCore::new(&config.interaction, nodes, items);
    core.set_show_entity_selectionbox(config.debug.show_entity_selectionbox);
    let mut world = MemoryWorld::flat(&content);
    let mut link = ServerLink::default();
    let privileges: HashSet<String> = ["interact", "shout"].map(String::from).into_iter().collect();
    let mut highlight = Highlight::default();
    let mut status = StatusText::new();

    let (mut events, server) = server::spawn(server::scripted_events())?;
    info!(
        server = %config.network.server_address,
        port = config.network.server_port,
        timeout_seconds = config.network.timeout_seconds,
        player = %config.client.player_name,
        frames = args.frames,
        "Starting scripted session"
    );

    let mut script = Script::new();
    let mut clock = FrameClock::new();
    let focus = FocusState {
        paused: false,
        focused: true,
    };
    let mut summary = Summary::default();
    let mut last: Option<FrameReport> = None;
    let mut last_status = String::new();
    let mut dt = 0.0;

    for _ in 0..args.frames {
        let input = script.next_input(dt, last.as_ref());
        let report = {
            let mut ctx = FrameContext {
                world: &mut world,
                network: &mut link,
                privileges: &privileges,
                settings: &mut settings,
                events: &mut events,
                selection: &mut highlight,
                status: &mut status,
            };
            core.tick(input, &mut ctx)
        };

        if matches!(report.dig, DigOutcome::Completed { .. }) {
            summary.digs_completed += 1;
        }
        if let Some(placed) = &report.placed {
            info!(pos = ?placed.pos, param2 = placed.param2, "Placed node");
            summary.placed += 1;
        }
        summary.events += report.events;
        summary.particles += core.presentation_mut().take_particles().len();

        if let Some(message) = status.current()
            && message.text != last_status
        {
            info!(text = %message.text, "Status");
            last_status.clone_from(&message.text);
            summary.status_messages += 1;
        }
        status.advance(dt);

        summary.frames += 1;
        last = Some(report);
        dt = clock
            .limit(FrameLimits::from_settings(&settings), focus, false)
            .dt;
    }

    // Stop the server before collecting what it managed to send.
    drop(events);
    if server.join().is_err() {
        error!("Server thread panicked");
    }

    if !script.is_done() {
        warn!("Session ended before the script finished; raise --frames");
    }
    info!(
        start_dig = link.sent(InteractionKind::StartDig),
        finish_dig = link.sent(InteractionKind::FinishDig),
        place = link.sent(InteractionKind::Place),
        total = link.total(),
        "Interactions sent"
    );
    let presentation = core.presentation();
    info!(
        hud = presentation.hud.len(),
        sky = ?presentation.sky,
        damage_flash = presentation.damage_flash,
        ignored = core.dispatcher().ignored(),
        "Presentation state"
    );
    info!(solid_nodes = world.solid_count(), "World state");

    if let Err(e) = settings.save(config_dir) {
        warn!("Failed to save settings: {e}");
    }
    Ok(summary)
}

fn main() {
    let args = CliArgs::parse();

    let config_dir = match args.config.clone().map_or_else(Config::default_dir, Ok) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Failed to resolve config directory: {e}");
            std::process::exit(1);
        }
    };

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    quarry_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    match run(&args, &config, &config_dir) {
        Ok(summary) => info!(?summary, "Session complete"),
        Err(e) => {
            error!("Client failed: {e}");
            std::process::exit(1);
        }
    }
}
