//! Verlet Arena demo
//!
//! Builds a small scene (a player chain hanging from a post, a pile of balls and
//! a floor), runs it through the fixed timestep for a few seconds of simulated
//! frames and logs what happened. Pass `--dump` to print the final snapshot as
//! JSON, `--frames N` to change the run length.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Verlet Arena (native) starting...");

    if let Err(e) = demo::run(demo::Options::from_args(std::env::args().skip(1))) {
        log::error!("Demo failed: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use glam::Vec2;

    use verlet_arena::consts::SIM_DT;
    use verlet_arena::sim::{Body, BoxCollider, ContactEvent, ContactResponse, EntityId, World};
    use verlet_arena::{FixedTimestep, PhysicsError, SimSettings};

    const DEFAULT_FRAMES: u32 = 600;
    const SEED: u64 = 0xC0FFEE;

    pub struct Options {
        pub frames: u32,
        pub dump: bool,
    }

    impl Options {
        pub fn from_args(mut args: impl Iterator<Item = String>) -> Self {
            let mut options = Options {
                frames: DEFAULT_FRAMES,
                dump: false,
            };
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--dump" => options.dump = true,
                    "--frames" => match args.next().map(|n| n.parse()) {
                        Some(Ok(n)) => options.frames = n,
                        _ => log::warn!("--frames expects a number, keeping {}", options.frames),
                    },
                    other => log::warn!("Ignoring unknown argument {other:?}"),
                }
            }
            options
        }
    }

    struct Scene {
        world: World,
        player: EntityId,
        floor: EntityId,
    }

    fn build_scene() -> Result<Scene, PhysicsError> {
        let mut world = World::new(SimSettings::with_seed(SEED));
        let gravity = world.settings().restore_gravity * 5.0;

        let floor = world.add_box(BoxCollider::new(-400.0, 300.0, 800.0, 40.0));
        world.add_box(BoxCollider::new(-420.0, -200.0, 20.0, 540.0).with_pattern("wall"));
        world.add_box(BoxCollider::new(400.0, -200.0, 20.0, 540.0).with_pattern("wall"));

        // Player: a short chain hanging from a post, not persisted
        let post = world.add_body(Body::fixed(Vec2::new(-200.0, -150.0)).with_radius(8.0))?;
        let mut prev = post;
        let mut player = post;
        for i in 1..=4 {
            let link = Body::dynamic(Vec2::new(-200.0 + i as f32 * 30.0, -150.0))
                .with_radius(10.0)
                .with_acceleration(gravity)
                .transient();
            player = world.add_body(link)?;
            world.connect(prev, player)?;
            prev = player;
        }

        // A pile of balls dropped onto the floor
        for row in 0..4 {
            for col in 0..6 {
                let x = 60.0 + col as f32 * 42.0 + (row % 2) as f32 * 20.0;
                let y = 100.0 - row as f32 * 45.0;
                let ball = Body::dynamic(Vec2::new(x, y))
                    .with_acceleration(gravity)
                    .with_restitution(0.2)
                    .with_friction(0.4);
                world.add_body(ball)?;
            }
        }

        log::info!(
            "Scene built: {} bodies, {} boxes, {} sticks",
            world.body_count(),
            world.box_count(),
            world.constraint_count()
        );
        Ok(Scene { world, player, floor })
    }

    pub fn run(options: Options) -> Result<(), PhysicsError> {
        let Scene {
            mut world,
            player,
            floor,
        } = build_scene()?;
        let mut timestep = FixedTimestep::default();

        let mut floor_hits = 0u32;
        let mut total_contacts = 0usize;
        let mut listener = |event: &ContactEvent| {
            if event.involves(floor) {
                floor_hits += 1;
            }
            ContactResponse::NONE
        };

        let mut ticks = 0u32;
        for frame in 0..options.frames {
            // Jittery host frame times around the target rate
            let elapsed = SIM_DT + if frame % 3 == 0 { 1.5 } else { -0.75 };
            ticks += timestep.advance(elapsed, |dt| {
                world.step_with(dt, &mut listener);
                total_contacts += world.contacts().len();
            });
        }

        let resting = world
            .bodies()
            .filter(|body| !body.is_static() && body.can_jump)
            .count();
        log::info!(
            "Ran {} ticks over {} frames: {} contacts, {} floor hits, {} bodies grounded",
            ticks,
            options.frames,
            total_contacts,
            floor_hits,
            resting
        );
        if let Some(end) = world.body(player) {
            log::info!("Chain end at ({:.1}, {:.1})", end.pos.x, end.pos.y);
        }

        if options.dump {
            println!("{}", world.snapshot().to_json_pretty()?);
        }
        Ok(())
    }
}
