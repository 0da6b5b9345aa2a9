//! Render each preset headless and save a PNG per preset.
//!
//! Run with: `cargo run --example render_png`

use constellation::prelude::*;
use constellation::PRESETS;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() {
    for name in PRESETS {
        let config = FieldConfig::preset(name)
            .expect("built-in preset")
            .with_viewport(960.0, 540.0);

        let mut field = ParticleField::new();
        field
            .initialize(config.clone(), &mut StdRng::seed_from_u64(2024))
            .expect("presets are valid");

        let mut frames = FrameLoop::new(field, Clock::new(config.step));
        let subscription = frames.subscribe();
        let mut target = RasterTarget::new(960, 540);
        for _ in 0..90 {
            frames.tick_with(1.0 / 60.0, &mut target);
        }
        drop(subscription);

        let path = format!("{name}.png");
        target.save_png(&path).expect("failed to write PNG");
        println!("wrote {path}");
    }
}
