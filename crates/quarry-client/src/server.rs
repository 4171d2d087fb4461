//! Simulated server feeding events to the frame thread.

use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, unbounded};
use glam::{IVec2, Vec2, Vec3};
use quarry_interact::{
    CloudParams, HudChange, HudElement, HudElementType, ParticleSpawnerSpec, ParticleSpec, ServerEvent,
};
use tracing::{debug, info};

/// Pause between two scripted server events.
const EVENT_INTERVAL: Duration = Duration::from_millis(40);

/// Events the simulated server sends, in order.
pub fn scripted_events() -> Vec<ServerEvent> {
    vec![
        ServerEvent::HudAdd {
            id: 0,
            element: HudElement {
                kind: HudElementType::Statbar,
                pos: Vec2::new(0.5, 1.0),
                name: "health".into(),
                text: "heart.png".into(),
                number: 20,
                size: IVec2::new(24, 24),
                ..HudElement::default()
            },
        },
        ServerEvent::HudAdd {
            id: 1,
            element: HudElement {
                kind: HudElementType::Text,
                pos: Vec2::new(0.02, 0.02),
                name: "welcome".into(),
                text: "Welcome to the quarry".into(),
                ..HudElement::default()
            },
        },
        ServerEvent::SetSky {
            bgcolor: [120, 160, 220, 255],
            kind: "plain".into(),
            params: Vec::new(),
            clouds: true,
        },
        ServerEvent::CloudParams(CloudParams {
            density: 0.6,
            speed: Vec2::new(1.0, -1.0),
            ..CloudParams::default()
        }),
        ServerEvent::OverrideDayNightRatio {
            do_override: true,
            ratio: 0.8,
        },
        ServerEvent::AddParticleSpawner {
            id: 3,
            spawner: ParticleSpawnerSpec {
                amount: 16,
                spawn_time: 1.0,
                min_pos: Vec3::new(-1.0, 1.0, -1.0),
                max_pos: Vec3::new(1.0, 2.0, 1.0),
                texture: "smoke.png".into(),
                ..ParticleSpawnerSpec::default()
            },
        },
        ServerEvent::PlayerDamage { amount: 2 },
        ServerEvent::HudChange {
            id: 0,
            change: HudChange::Number(18),
        },
        ServerEvent::SpawnParticle(ParticleSpec {
            pos: Vec3::new(0.5, 1.0, 0.5),
            velocity: Vec3::Y,
            expiration: 0.5,
            size: 1.0,
            texture: "dust.png".into(),
            ..ParticleSpec::default()
        }),
        ServerEvent::Unrecognized {
            kind: 0x4f,
            payload: vec![0; 32],
        },
        ServerEvent::HudRemove { id: 1 },
        ServerEvent::DeleteParticleSpawner { id: 3 },
    ]
}

/// Starts the server thread. The returned receiver yields its events.
///
/// The thread stops early once the receiver is dropped.
pub fn spawn(events: Vec<ServerEvent>) -> std::io::Result<(Receiver<ServerEvent>, JoinHandle<()>)> {
    let (sender, receiver) = unbounded();
    let handle = std::thread::Builder::new()
        .name("server-sim".into())
        .spawn(move || run(events, &sender))?;
    Ok((receiver, handle))
}

fn run(events: Vec<ServerEvent>, sender: &Sender<ServerEvent>) {
    let total = events.len();
    for (sent, event) in events.into_iter().enumerate() {
        std::thread::sleep(EVENT_INTERVAL);
        debug!(kind = event.kind_name(), "Server sends");
        if sender.send(event).is_err() {
            info!(sent, total, "Client went away");
            return;
        }
    }
    info!(total, "Server script finished");
}
