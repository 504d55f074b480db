//! Post-processing chain for screen-space effects.
//!
//! The scene renders into an HDR offscreen texture. Each pass is a fullscreen
//! triangle that samples one or two textures and writes the next target:
//!
//! ```text
//! scene ─ bright ─ blur H ─ blur V ─┐              (half resolution)
//!   └──────────────────────────── composite ─ vignette ─ output ─▶ surface
//! ```
//!
//! [`PostChain::BloomOnly`] skips the vignette; [`PostChain::None`] goes
//! straight from the scene to the output pass.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::{linear_sampler, sampler_entry, texture_entry, uniform_entry, HDR_FORMAT};
use crate::config::{PostChain, PostConfig};

/// Uniforms shared by every pass.
///
/// `settings` carries the pass-specific parameters (threshold, spread,
/// strength, vignette range, or the manual-gamma flag for the output).
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct PassParams {
    pub texel_size: [f32; 2],
    pub direction: [f32; 2],
    pub settings: [f32; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PassKind {
    Bright,
    Blur,
    Composite,
    Vignette,
    Output,
}

/// Texture slots a pass reads from or writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    Scene,
    BloomA,
    BloomB,
    Composite,
    Vignette,
    Surface,
}

impl Slot {
    fn is_half_res(self) -> bool {
        matches!(self, Slot::BloomA | Slot::BloomB)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Step {
    pub kind: PassKind,
    pub source: Slot,
    /// Second input; only the composite reads it.
    pub base: Slot,
    pub target: Slot,
    pub direction: [f32; 2],
}

impl Step {
    fn new(kind: PassKind, source: Slot, target: Slot) -> Self {
        Self {
            kind,
            source,
            base: source,
            target,
            direction: [0.0, 0.0],
        }
    }
}

/// Ordered passes for `chain`. The last step always writes the surface.
pub(crate) fn plan(chain: PostChain) -> Vec<Step> {
    let bloom = || {
        vec![
            Step::new(PassKind::Bright, Slot::Scene, Slot::BloomA),
            Step {
                direction: [1.0, 0.0],
                ..Step::new(PassKind::Blur, Slot::BloomA, Slot::BloomB)
            },
            Step {
                direction: [0.0, 1.0],
                ..Step::new(PassKind::Blur, Slot::BloomB, Slot::BloomA)
            },
            Step {
                base: Slot::Scene,
                ..Step::new(PassKind::Composite, Slot::BloomA, Slot::Composite)
            },
        ]
    };

    match chain {
        PostChain::None => vec![Step::new(PassKind::Output, Slot::Scene, Slot::Surface)],
        PostChain::BloomOnly => {
            let mut steps = bloom();
            steps.push(Step::new(PassKind::Output, Slot::Composite, Slot::Surface));
            steps
        }
        PostChain::BloomVignette => {
            let mut steps = bloom();
            steps.push(Step::new(PassKind::Vignette, Slot::Composite, Slot::Vignette));
            steps.push(Step::new(PassKind::Output, Slot::Vignette, Slot::Surface));
            steps
        }
    }
}

const PASS_HEADER: &str = r#"
struct PassParams {
    texel_size: vec2<f32>,
    direction: vec2<f32>,
    settings: vec4<f32>,
};

@group(0) @binding(0) var source_texture: texture_2d<f32>;
@group(0) @binding(1) var base_texture: texture_2d<f32>;
@group(0) @binding(2) var source_sampler: sampler;
@group(0) @binding(3) var<uniform> params: PassParams;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    // one triangle covering the screen
    let x = f32(i32(vertex_index & 1u) * 4 - 1);
    let y = f32(i32(vertex_index >> 1u) * 4 - 1);
    var out: VertexOutput;
    out.clip_position = vec4<f32>(x, y, 0.0, 1.0);
    out.uv = vec2<f32>((x + 1.0) * 0.5, (1.0 - y) * 0.5);
    return out;
}
"#;

const BRIGHT_FS: &str = r#"
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let color = textureSample(source_texture, source_sampler, in.uv);
    let luma = dot(color.rgb, vec3<f32>(0.2126, 0.7152, 0.0722));
    let threshold = params.settings.x;
    let weight = smoothstep(threshold, threshold + 0.01, luma);
    return vec4<f32>(color.rgb * weight, 1.0);
}
"#;

const BLUR_FS: &str = r#"
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    var weights = array<f32, 5>(0.227027, 0.1945946, 0.1216216, 0.054054, 0.016216);
    let stride = params.direction * params.texel_size * (1.0 + params.settings.x * 4.0);
    var color = textureSample(source_texture, source_sampler, in.uv).rgb * weights[0];
    for (var i = 1; i < 5; i = i + 1) {
        let offset = stride * f32(i);
        color += textureSample(source_texture, source_sampler, in.uv + offset).rgb * weights[i];
        color += textureSample(source_texture, source_sampler, in.uv - offset).rgb * weights[i];
    }
    return vec4<f32>(color, 1.0);
}
"#;

const COMPOSITE_FS: &str = r#"
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let scene = textureSample(base_texture, source_sampler, in.uv);
    let bloom = textureSample(source_texture, source_sampler, in.uv).rgb;
    return vec4<f32>(scene.rgb + bloom * params.settings.x, scene.a);
}
"#;

const VIGNETTE_FS: &str = r#"
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let color = textureSample(source_texture, source_sampler, in.uv);
    let dist = length(in.uv - vec2<f32>(0.5));
    let shade = 1.0 - smoothstep(params.settings.x, params.settings.y, dist);
    return vec4<f32>(color.rgb * shade, color.a);
}
"#;

const OUTPUT_FS: &str = r#"
fn aces(x: vec3<f32>) -> vec3<f32> {
    let a = 2.51;
    let b = 0.03;
    let c = 2.43;
    let d = 0.59;
    let e = 0.14;
    return clamp((x * (a * x + b)) / (x * (c * x + d) + e), vec3<f32>(0.0), vec3<f32>(1.0));
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let color = textureSample(source_texture, source_sampler, in.uv);
    var mapped = aces(color.rgb);
    if params.settings.x > 0.5 {
        mapped = pow(mapped, vec3<f32>(1.0 / 2.2));
    }
    return vec4<f32>(mapped, 1.0);
}
"#;

pub(crate) fn pass_shader(kind: PassKind) -> String {
    let fragment = match kind {
        PassKind::Bright => BRIGHT_FS,
        PassKind::Blur => BLUR_FS,
        PassKind::Composite => COMPOSITE_FS,
        PassKind::Vignette => VIGNETTE_FS,
        PassKind::Output => OUTPUT_FS,
    };
    format!("{}{}", PASS_HEADER, fragment)
}

/// Per-pass uniform values.
pub(crate) fn pass_params(step: &Step, post: &PostConfig, size: (u32, u32), manual_gamma: bool) -> PassParams {
    let settings = match step.kind {
        PassKind::Bright => [post.bloom.threshold, 0.0, 0.0, 0.0],
        PassKind::Blur => [post.bloom.radius, 0.0, 0.0, 0.0],
        PassKind::Composite => [post.bloom.strength, 0.0, 0.0, 0.0],
        PassKind::Vignette => [post.vignette.offset, post.vignette.darkness, 0.0, 0.0],
        PassKind::Output => [if manual_gamma { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
    };
    let (width, height) = if step.source.is_half_res() { half(size) } else { size };
    PassParams {
        texel_size: [1.0 / width as f32, 1.0 / height as f32],
        direction: step.direction,
        settings,
    }
}

fn half((width, height): (u32, u32)) -> (u32, u32) {
    ((width / 2).max(1), (height / 2).max(1))
}

struct Pipelines {
    bright: wgpu::RenderPipeline,
    blur: wgpu::RenderPipeline,
    composite: wgpu::RenderPipeline,
    vignette: wgpu::RenderPipeline,
    output: wgpu::RenderPipeline,
}

impl Pipelines {
    fn get(&self, kind: PassKind) -> &wgpu::RenderPipeline {
        match kind {
            PassKind::Bright => &self.bright,
            PassKind::Blur => &self.blur,
            PassKind::Composite => &self.composite,
            PassKind::Vignette => &self.vignette,
            PassKind::Output => &self.output,
        }
    }
}

/// Offscreen render targets, recreated on resize.
struct Targets {
    scene: wgpu::TextureView,
    depth: wgpu::TextureView,
    bloom_a: wgpu::TextureView,
    bloom_b: wgpu::TextureView,
    composite: wgpu::TextureView,
    vignette: wgpu::TextureView,
}

impl Targets {
    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let (half_w, half_h) = half((width, height));
        Self {
            scene: hdr_target(device, "Scene Texture", width, height),
            depth: super::create_depth_texture(device, width, height),
            bloom_a: hdr_target(device, "Bloom Texture A", half_w, half_h),
            bloom_b: hdr_target(device, "Bloom Texture B", half_w, half_h),
            composite: hdr_target(device, "Composite Texture", width, height),
            vignette: hdr_target(device, "Vignette Texture", width, height),
        }
    }

    /// View for an offscreen slot. `Surface` has no offscreen view.
    fn view(&self, slot: Slot) -> Option<&wgpu::TextureView> {
        match slot {
            Slot::Scene => Some(&self.scene),
            Slot::BloomA => Some(&self.bloom_a),
            Slot::BloomB => Some(&self.bloom_b),
            Slot::Composite => Some(&self.composite),
            Slot::Vignette => Some(&self.vignette),
            Slot::Surface => None,
        }
    }
}

fn hdr_target(device: &wgpu::Device, label: &str, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: HDR_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

struct Pass {
    step: Step,
    bind_group: wgpu::BindGroup,
}

/// GPU resources for the post-processing chain.
pub struct PostChainState {
    config: PostConfig,
    steps: Vec<Step>,
    manual_gamma: bool,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    pipelines: Pipelines,
    targets: Targets,
    passes: Vec<Pass>,
    size: (u32, u32),
}

impl PostChainState {
    pub fn new(
        device: &wgpu::Device,
        config: &PostConfig,
        width: u32,
        height: u32,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Post Process Bind Group Layout"),
            entries: &[
                texture_entry(0),
                texture_entry(1),
                sampler_entry(2),
                uniform_entry(3, wgpu::ShaderStages::FRAGMENT),
            ],
        });
        let sampler = linear_sampler(device, "Post Process Sampler");

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Post Process Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let pipeline = |kind: PassKind, format: wgpu::TextureFormat| {
            let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Post Process Shader"),
                source: wgpu::ShaderSource::Wgsl(pass_shader(kind).into()),
            });
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Post Process Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };
        let pipelines = Pipelines {
            bright: pipeline(PassKind::Bright, HDR_FORMAT),
            blur: pipeline(PassKind::Blur, HDR_FORMAT),
            composite: pipeline(PassKind::Composite, HDR_FORMAT),
            vignette: pipeline(PassKind::Vignette, HDR_FORMAT),
            output: pipeline(PassKind::Output, surface_format),
        };

        let mut state = Self {
            config: config.clone(),
            steps: plan(config.chain),
            manual_gamma: !surface_format.is_srgb(),
            bind_group_layout,
            sampler,
            pipelines,
            targets: Targets::new(device, width, height),
            passes: Vec::new(),
            size: (width, height),
        };
        state.passes = state.build_passes(device);
        state
    }

    fn build_passes(&self, device: &wgpu::Device) -> Vec<Pass> {
        self.steps
            .iter()
            .filter_map(|step| {
                let source = self.targets.view(step.source)?;
                let base = self.targets.view(step.base)?;
                let params = pass_params(step, &self.config, self.size, self.manual_gamma);
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Post Process Params"),
                    contents: bytemuck::bytes_of(&params),
                    usage: wgpu::BufferUsages::UNIFORM,
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("Post Process Bind Group"),
                    layout: &self.bind_group_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(source),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(base),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::Sampler(&self.sampler),
                        },
                        wgpu::BindGroupEntry {
                            binding: 3,
                            resource: buffer.as_entire_binding(),
                        },
                    ],
                });
                Some(Pass { step: *step, bind_group })
            })
            .collect()
    }

    /// Recreate every target and bind group at the new size.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.size = (width, height);
        self.targets = Targets::new(device, width, height);
        self.passes = self.build_passes(device);
    }

    /// HDR colour target the scene renders into.
    pub fn scene_view(&self) -> &wgpu::TextureView {
        &self.targets.scene
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.targets.depth
    }

    /// Run every pass, ending in `surface_view`.
    pub fn run(&self, encoder: &mut wgpu::CommandEncoder, surface_view: &wgpu::TextureView) {
        for pass in &self.passes {
            let target = self.targets.view(pass.step.target).unwrap_or(surface_view);
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Post Process Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            render_pass.set_pipeline(self.pipelines.get(pass.step.kind));
            render_pass.set_bind_group(0, &pass.bind_group, &[]);
            render_pass.draw(0..3, 0..1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader_utils::validate::assert_valid;

    #[test]
    fn test_every_pass_is_valid_wgsl() {
        for kind in [
            PassKind::Bright,
            PassKind::Blur,
            PassKind::Composite,
            PassKind::Vignette,
            PassKind::Output,
        ] {
            assert_valid(&pass_shader(kind));
        }
    }

    #[test]
    fn test_plans_end_at_surface() {
        for chain in [PostChain::BloomVignette, PostChain::BloomOnly, PostChain::None] {
            let steps = plan(chain);
            assert_eq!(steps.last().map(|s| (s.kind, s.target)), Some((PassKind::Output, Slot::Surface)));
            assert_eq!(steps.iter().filter(|s| s.target == Slot::Surface).count(), 1);
        }
    }

    #[test]
    fn test_plan_reads_only_written_slots() {
        for chain in [PostChain::BloomVignette, PostChain::BloomOnly, PostChain::None] {
            let mut written = vec![Slot::Scene];
            for step in plan(chain) {
                assert!(written.contains(&step.source), "{:?} reads unwritten {:?}", chain, step.source);
                assert!(written.contains(&step.base));
                assert_ne!(step.source, step.target);
                written.push(step.target);
            }
        }
    }

    #[test]
    fn test_bloom_vignette_order() {
        let kinds: Vec<PassKind> = plan(PostChain::BloomVignette).iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            [
                PassKind::Bright,
                PassKind::Blur,
                PassKind::Blur,
                PassKind::Composite,
                PassKind::Vignette,
                PassKind::Output
            ]
        );
        let none: Vec<PassKind> = plan(PostChain::None).iter().map(|s| s.kind).collect();
        assert_eq!(none, [PassKind::Output]);
    }

    #[test]
    fn test_blur_runs_at_half_resolution() {
        let steps = plan(PostChain::BloomOnly);
        let post = PostConfig::default();
        let blur = pass_params(&steps[1], &post, (1920, 1080), false);
        assert_eq!(blur.texel_size, [1.0 / 960.0, 1.0 / 540.0]);
        assert_eq!(blur.direction, [1.0, 0.0]);
        assert_eq!(pass_params(&steps[2], &post, (1920, 1080), false).direction, [0.0, 1.0]);

        let bright = pass_params(&steps[0], &post, (1920, 1080), false);
        assert_eq!(bright.texel_size, [1.0 / 1920.0, 1.0 / 1080.0]);
        assert_eq!(bright.settings[0], 0.85);
    }

    #[test]
    fn test_output_gamma_flag() {
        let step = Step::new(PassKind::Output, Slot::Scene, Slot::Surface);
        let post = PostConfig::default();
        assert_eq!(pass_params(&step, &post, (10, 10), true).settings[0], 1.0);
        assert_eq!(pass_params(&step, &post, (10, 10), false).settings[0], 0.0);
    }

    #[test]
    fn test_params_size() {
        assert_eq!(std::mem::size_of::<PassParams>(), 32);
    }
}
