//! WGSL for the window renderer.
//!
//! Every draw command is one instance of a six-vertex quad. Circles expand
//! the quad around their center; lines stretch it from `start` to `end`
//! and widen it along the segment normal. Edges are anti-aliased in the
//! fragment stage by pixel coverage, matching the software rasterizer.

/// Instance `kind` for filled circles.
pub const KIND_CIRCLE: u32 = 0;
/// Instance `kind` for line segments.
pub const KIND_LINE: u32 = 1;

pub const SHADER_SOURCE: &str = r#"
struct Viewport {
    size: vec2<f32>,
    _pad: vec2<f32>,
};

@group(0) @binding(0) var<uniform> viewport: Viewport;

struct InstanceInput {
    @location(0) start: vec2<f32>,
    @location(1) end: vec2<f32>,
    @location(2) color: vec4<f32>,
    // circle radius, or half the line width
    @location(3) radius: f32,
    @location(4) kind: u32,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) local: vec2<f32>,
    @location(2) @interpolate(flat) kind: u32,
    @location(3) @interpolate(flat) extent: f32,
};

// pixel space (origin top-left, y down) to clip space
fn to_clip(p: vec2<f32>) -> vec4<f32> {
    let ndc = p / viewport.size * 2.0 - vec2<f32>(1.0, 1.0);
    return vec4<f32>(ndc.x, -ndc.y, 0.0, 1.0);
}

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    instance: InstanceInput,
) -> VertexOutput {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, 1.0),
    );
    let corner = corners[vertex_index % 6u];

    var out: VertexOutput;
    out.color = instance.color;
    out.kind = instance.kind;
    out.local = corner;

    if instance.kind == 0u {
        // one pixel of padding for the soft edge
        let extent = instance.radius + 1.0;
        out.extent = extent;
        out.clip_position = to_clip(instance.start + corner * extent);
    } else {
        let delta = instance.end - instance.start;
        let len = length(delta);
        var dir = vec2<f32>(1.0, 0.0);
        if len > 0.0 {
            dir = delta / len;
        }
        let normal = vec2<f32>(-dir.y, dir.x);
        let extent = instance.radius + 0.5;
        out.extent = extent;
        let base = select(instance.start, instance.end, corner.x > 0.0);
        out.clip_position = to_clip(base + normal * corner.y * extent);
    }
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    var coverage: f32;
    if in.kind == 0u {
        let d = length(in.local) * in.extent;
        let radius = in.extent - 1.0;
        coverage = clamp(radius + 0.5 - d, 0.0, 1.0);
    } else {
        let d = abs(in.local.y) * in.extent;
        coverage = clamp(in.extent - d, 0.0, 1.0);
    }
    let alpha = in.color.a * coverage;
    if alpha <= 0.0 {
        discard;
    }
    return vec4<f32>(in.color.rgb, alpha);
}
"#;
