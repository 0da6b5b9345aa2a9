//! Print one frame as a JSON element list, the way a page overlay would
//! consume it.
//!
//! Run with: `cargo run --example scene_json`

use constellation::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() {
    let config = FieldConfig::preset("constellation")
        .expect("built-in preset")
        .with_viewport(400.0, 300.0)
        .with_count(12);

    let mut field = ParticleField::new();
    field
        .initialize(config, &mut StdRng::seed_from_u64(1))
        .expect("valid config");

    let mut frames = FrameLoop::new(field, Clock::default());
    let _subscription = frames.subscribe();
    let mut target = SceneTarget::new();
    frames.tick_with(1.0 / 60.0, &mut target);

    println!("{}", target.to_json().expect("scene serializes"));
}
