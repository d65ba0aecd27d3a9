use crate::mesh::{MeshKey, Vertex};
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};
use std::collections::BTreeMap;
use std::ops::Range;
use villascape_common::Rgba;
use villascape_kernel::Scene;
use villascape_render::{RenderView, Renderer};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    light_dir: [f32; 4],
    light_color: [f32; 4],
    ambient: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    normal_0: [f32; 4],
    normal_1: [f32; 4],
    normal_2: [f32; 4],
    color: [f32; 4],
}

/// One instanced draw: every part sharing a mesh and a blend mode.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DrawBatch {
    pub key: MeshKey,
    pub instances: Range<u32>,
    pub transparent: bool,
}

/// Per-frame instance data grouped into draws, opaque first.
#[derive(Debug, Default)]
pub(crate) struct FrameBatches {
    pub instances: Vec<InstanceData>,
    pub draws: Vec<DrawBatch>,
}

/// Convert an sRGB-encoded color to linear for an sRGB render target.
fn linear(c: Rgba) -> [f32; 4] {
    let channel = |v: f32| {
        if v <= 0.04045 {
            v / 12.92
        } else {
            ((v + 0.055) / 1.055).powf(2.4)
        }
    };
    [channel(c.r), channel(c.g), channel(c.b), c.a]
}

/// Group the scene's parts by mesh, opaque draws before transparent ones.
pub(crate) fn batch_scene(scene: &Scene, max_instances: usize) -> FrameBatches {
    let mut groups: BTreeMap<(bool, MeshKey), Vec<InstanceData>> = BTreeMap::new();
    for part in scene.parts() {
        let (key, scale) = MeshKey::for_shape(&part.shape);
        let t = &part.transform;
        let model = Mat4::from_scale_rotation_translation(t.scale * scale, t.rotation, t.position);
        let normal = Mat3::from_mat4(model).inverse().transpose();
        let cols = model.to_cols_array_2d();
        let n = |c: Vec3| [c.x, c.y, c.z, 0.0];

        groups
            .entry((part.material.is_transparent(), key))
            .or_default()
            .push(InstanceData {
                model_0: cols[0],
                model_1: cols[1],
                model_2: cols[2],
                model_3: cols[3],
                normal_0: n(normal.x_axis),
                normal_1: n(normal.y_axis),
                normal_2: n(normal.z_axis),
                color: linear(part.material.color),
            });
    }

    let mut batches = FrameBatches::default();
    for ((transparent, key), instances) in groups {
        let start = batches.instances.len();
        let room = max_instances.saturating_sub(start);
        if room == 0 {
            tracing::warn!(max_instances, "instance buffer full, dropping parts");
            break;
        }
        let take = instances.len().min(room);
        batches.instances.extend_from_slice(&instances[..take]);
        batches.draws.push(DrawBatch {
            key,
            instances: start as u32..(start + take) as u32,
            transparent,
        });
    }
    batches
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// wgpu-based scene renderer.
pub struct WgpuRenderer {
    opaque_pipeline: wgpu::RenderPipeline,
    transparent_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    meshes: BTreeMap<MeshKey, GpuMesh>,
    instance_buffer: wgpu::Buffer,
    max_instances: u32,
    depth_texture: wgpu::TextureView,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                light_dir: [0.0, 1.0, 0.0, 1.0],
                light_color: [1.0; 4],
                ambient: [0.0; 4],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SCENE_SHADER.into()),
        });

        let opaque_pipeline = Self::create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            surface_format,
            "opaque_pipeline",
            wgpu::BlendState::REPLACE,
            true,
        );
        let transparent_pipeline = Self::create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            surface_format,
            "transparent_pipeline",
            wgpu::BlendState::ALPHA_BLENDING,
            false,
        );

        // Instance buffer (pre-allocated)
        let max_instances = 4_096u32;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (max_instances as u64) * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_texture = Self::create_depth_texture(device, width, height);

        Self {
            opaque_pipeline,
            transparent_pipeline,
            uniform_buffer,
            uniform_bind_group,
            meshes: BTreeMap::new(),
            instance_buffer,
            max_instances,
            depth_texture,
        }
    }

    fn create_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        label: &str,
        blend: wgpu::BlendState,
        depth_write_enabled: bool,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x3,
                            1 => Float32x3,
                        ],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            2 => Float32x4,
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                            6 => Float32x4,
                            7 => Float32x4,
                            8 => Float32x4,
                            9 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // Planes (ground, cloud, painting) are seen from both sides.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        })
    }

    /// Upload a unit mesh for every shape in the scene that lacks one.
    ///
    /// The scene's set of shapes is fixed once it is built, so this only
    /// does work on the first call.
    pub fn prepare(&mut self, device: &wgpu::Device, scene: &Scene) {
        for part in scene.parts() {
            let (key, _) = MeshKey::for_shape(&part.shape);
            if self.meshes.contains_key(&key) {
                continue;
            }
            let (vertices, indices) = key.build();
            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_vertex_buffer"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_index_buffer"),
                contents: bytemuck::cast_slice(&indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            tracing::debug!(?key, vertices = vertices.len(), "uploaded mesh");
            self.meshes.insert(
                key,
                GpuMesh {
                    vertex_buffer,
                    index_buffer,
                    index_count: indices.len() as u32,
                },
            );
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    /// Render one frame of the scene into `target`.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        view: &RenderView,
        scene: &Scene,
    ) {
        let light = scene.sun_light;
        let toward_light = light.position.try_normalize().unwrap_or(Vec3::Y);
        let ambient = linear(scene.ambient.color);
        let intensity = scene.ambient.intensity;
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                view_proj: view.view_projection().to_cols_array_2d(),
                light_dir: [toward_light.x, toward_light.y, toward_light.z, light.intensity],
                light_color: linear(light.color),
                ambient: [
                    ambient[0] * intensity,
                    ambient[1] * intensity,
                    ambient[2] * intensity,
                    1.0,
                ],
            }),
        );

        let batches = batch_scene(scene, self.max_instances as usize);
        if !batches.instances.is_empty() {
            queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&batches.instances),
            );
        }

        let sky = linear(scene.sky);
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: sky[0] as f64,
                            g: sky[1] as f64,
                            b: sky[2] as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            for draw in &batches.draws {
                let Some(mesh) = self.meshes.get(&draw.key) else {
                    tracing::warn!(key = ?draw.key, "mesh not prepared, skipping draw");
                    continue;
                };
                pass.set_pipeline(if draw.transparent {
                    &self.transparent_pipeline
                } else {
                    &self.opaque_pipeline
                });
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..mesh.index_count, 0, draw.instances.clone());
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

/// A frame target bound to a device, so the wgpu backend can sit behind the
/// [`Renderer`] trait used by the frame driver.
pub struct WgpuFrame<'a> {
    pub renderer: &'a WgpuRenderer,
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub target: &'a wgpu::TextureView,
}

impl Renderer for WgpuFrame<'_> {
    type Output = ();

    fn render(&self, scene: &Scene, view: &RenderView) {
        self.renderer
            .render(self.device, self.queue, self.target, view, scene);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use villascape_common::Transform;
    use villascape_kernel::{Material, Shape};

    fn scene_with_pool() -> Scene {
        let mut scene = Scene::new();
        let cube = Shape::Cuboid {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
        };
        scene.add(cube, Transform::default(), Material::translucent(0x1e90ff, 0.8));
        scene.add(cube, Transform::default(), Material::solid(0x8b4513));
        scene.add(cube, Transform::default(), Material::solid(0x8b4513));
        scene.add(Shape::Sphere { radius: 0.8 }, Transform::default(), Material::solid(0x228b22));
        scene
    }

    #[test]
    fn opaque_batches_come_first() {
        let batches = batch_scene(&scene_with_pool(), 100);
        assert_eq!(batches.instances.len(), 4);
        assert_eq!(batches.draws.len(), 3);
        assert!(!batches.draws[0].transparent);
        assert!(!batches.draws[1].transparent);
        assert!(batches.draws[2].transparent);
        assert_eq!(batches.draws[0].key, MeshKey::Cuboid);
        assert_eq!(batches.draws[0].instances, 0..2);
    }

    #[test]
    fn instance_cap_is_respected() {
        let batches = batch_scene(&scene_with_pool(), 3);
        assert_eq!(batches.instances.len(), 3);
        let drawn: u32 = batches.draws.iter().map(|d| d.instances.len() as u32).sum();
        assert_eq!(drawn, 3);
    }

    #[test]
    fn model_matrix_includes_shape_size() {
        let mut scene = Scene::new();
        scene.add(
            Shape::Cuboid {
                width: 3.0,
                height: 2.0,
                depth: 4.0,
            },
            Transform::at(Vec3::new(5.0, 0.0, -1.0)),
            Material::solid(0xffffff),
        );
        let batches = batch_scene(&scene, 10);
        let inst = batches.instances[0];
        assert_eq!(inst.model_0[0], 3.0);
        assert_eq!(inst.model_1[1], 2.0);
        assert_eq!(inst.model_2[2], 4.0);
        assert_eq!(&inst.model_3[..3], &[5.0, 0.0, -1.0]);
    }

    #[test]
    fn srgb_to_linear_endpoints() {
        assert_eq!(linear(Rgba::new(0.0, 1.0, 0.0, 0.5)), [0.0, 1.0, 0.0, 0.5]);
        let mid = linear(Rgba::new(0.5, 0.5, 0.5, 1.0));
        assert!((mid[0] - 0.214).abs() < 1e-3);
    }
}
