use std::collections::{HashMap, HashSet};

use wgpu::util::DeviceExt;

use crate::asset::{ImageHandle, ImageId, ImageState};
use crate::material::{Material, MaterialId, RenderSide};
use crate::render::{RenderCtx, RenderTarget};
use crate::scene::{Camera, Mesh, MeshId, Stage, Vertex};

use super::common::{
    premul_alpha_blend, uniform_min_binding_size, MaterialUniform, MatrixUniform, DEPTH_FORMAT,
};
use super::program::ProgramKind;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
struct PipelineKey {
    program: ProgramKind,
    side: RenderSide,
}

struct GpuMesh {
    vbo: wgpu::Buffer,
    ibo: wgpu::Buffer,
    index_count: u32,
}

struct GpuMaterial {
    ubo: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    /// Per layer: whether the real image (rather than the placeholder) is bound.
    bound_ready: Vec<bool>,
}

struct ObjectBinding {
    ubo: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// One resolved draw call.
struct DrawCall {
    key: PipelineKey,
    mesh: MeshId,
    material: MaterialId,
    object: usize,
}

/// Renders every visible drawable of a [`Stage`] with its material's program.
///
/// Pipelines are cached per `(program, side)` for the current surface format.
/// Bind groups are cached per material and rebuilt once when a pending
/// distance-field image finishes loading. Caches for meshes and materials no
/// longer on the stage are dropped at the end of each frame.
#[derive(Default)]
pub struct MeshRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,

    camera_layout: Option<wgpu::BindGroupLayout>,
    object_layout: Option<wgpu::BindGroupLayout>,
    material_layouts: HashMap<ProgramKind, wgpu::BindGroupLayout>,

    camera_ubo: Option<wgpu::Buffer>,
    camera_bind_group: Option<wgpu::BindGroup>,
    objects: Vec<ObjectBinding>,

    meshes: HashMap<MeshId, GpuMesh>,
    materials: HashMap<MaterialId, GpuMaterial>,
    textures: HashMap<ImageId, wgpu::TextureView>,
    placeholder: Option<wgpu::TextureView>,
    sampler: Option<wgpu::Sampler>,

    warned_images: HashSet<ImageId>,
}

impl MeshRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every GPU object this renderer created.
    pub fn release(&mut self) {
        let stats = (self.pipelines.len(), self.meshes.len(), self.materials.len(), self.textures.len());
        *self = Self::default();
        log::debug!(
            "MeshRenderer: released {} pipelines, {} meshes, {} materials, {} textures",
            stats.0,
            stats.1,
            stats.2,
            stats.3
        );
    }

    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        camera: &Camera,
        stage: &Stage,
    ) {
        self.ensure_layouts(ctx);
        self.ensure_static_bindings(ctx);

        // Mutating preparation happens before any immutable borrow for the pass.
        let mut calls = Vec::with_capacity(stage.len());
        let mut live_meshes = HashSet::new();
        let mut live_materials = HashSet::new();

        for (object, (_, drawable)) in stage.iter_in_paint_order().enumerate() {
            let material = &drawable.material;
            let key = PipelineKey { program: material.program(), side: material.side() };

            self.ensure_pipeline(ctx, key);
            self.ensure_mesh(ctx, &drawable.mesh);
            self.ensure_material(ctx, material);
            self.ensure_object(ctx, object);

            if let Some(obj) = self.objects.get(object) {
                let u = MatrixUniform::new(drawable.transform);
                ctx.queue.write_buffer(&obj.ubo, 0, bytemuck::bytes_of(&u));
            }
            if let Some(gpu) = self.materials.get(&material.id()) {
                let u = MaterialUniform::from_material(material);
                ctx.queue.write_buffer(&gpu.ubo, 0, bytemuck::bytes_of(&u));
            }

            live_meshes.insert(drawable.mesh.id());
            live_materials.insert(material.id());
            calls.push(DrawCall { key, mesh: drawable.mesh.id(), material: material.id(), object });
        }

        self.meshes.retain(|id, _| live_meshes.contains(id));
        self.materials.retain(|id, _| live_materials.contains(id));

        if calls.is_empty() {
            return;
        }

        let Some(camera_ubo) = self.camera_ubo.as_ref() else { return };
        let view_proj = MatrixUniform::new(camera.view_projection());
        ctx.queue.write_buffer(camera_ubo, 0, bytemuck::bytes_of(&view_proj));

        let Some(camera_bind_group) = self.camera_bind_group.as_ref() else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("washi mesh pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_bind_group(0, camera_bind_group, &[]);

        for call in &calls {
            let Some(pipeline) = self.pipelines.get(&call.key) else { continue };
            let Some(mesh) = self.meshes.get(&call.mesh) else { continue };
            let Some(material) = self.materials.get(&call.material) else { continue };
            let Some(object) = self.objects.get(call.object) else { continue };

            rpass.set_pipeline(pipeline);
            rpass.set_bind_group(1, &object.bind_group, &[]);
            rpass.set_bind_group(2, &material.bind_group, &[]);
            rpass.set_vertex_buffer(0, mesh.vbo.slice(..));
            rpass.set_index_buffer(mesh.ibo.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }

    fn ensure_layouts(&mut self, ctx: &RenderCtx<'_>) {
        if self.camera_layout.is_some() && self.object_layout.is_some() {
            return;
        }

        let matrix_layout = |label: &'static str| {
            ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(label),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: uniform_min_binding_size::<MatrixUniform>(),
                    },
                    count: None,
                }],
            })
        };

        self.camera_layout = Some(matrix_layout("washi camera bgl"));
        self.object_layout = Some(matrix_layout("washi object bgl"));
    }

    fn material_layout(&mut self, ctx: &RenderCtx<'_>, program: ProgramKind) -> &wgpu::BindGroupLayout {
        self.material_layouts.entry(program).or_insert_with(|| {
            let mut entries = vec![wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: uniform_min_binding_size::<MaterialUniform>(),
                },
                count: None,
            }];

            let layers = program.texture_layers();
            for i in 0..layers {
                entries.push(wgpu::BindGroupLayoutEntry {
                    binding: 1 + i as u32,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                });
            }
            if layers > 0 {
                entries.push(wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                });
            }

            ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(&format!("washi {} material bgl", program.name())),
                entries: &entries,
            })
        })
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>, key: PipelineKey) {
        if self.pipeline_format != Some(ctx.surface_format) {
            self.pipelines.clear();
            self.pipeline_format = Some(ctx.surface_format);
        }
        if self.pipelines.contains_key(&key) {
            return;
        }

        self.material_layout(ctx, key.program);
        let (Some(camera_layout), Some(object_layout), Some(material_layout)) = (
            self.camera_layout.as_ref(),
            self.object_layout.as_ref(),
            self.material_layouts.get(&key.program),
        ) else {
            return;
        };

        let name = key.program.name();
        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("washi {name} shader")),
            source: wgpu::ShaderSource::Wgsl(key.program.source().into()),
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("washi {name} pipeline layout")),
            bind_group_layouts: &[camera_layout, object_layout, material_layout],
            immediate_size: 0,
        });

        let transparent = key.program.texture_layers() > 0;
        let cull_mode = match key.side {
            RenderSide::Front => Some(wgpu::Face::Back),
            RenderSide::Back => Some(wgpu::Face::Front),
            RenderSide::Both => None,
        };

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("washi {name} {:?} pipeline", key.side)),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(premul_alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            // Transparent layers test against depth but never occlude what follows.
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: !transparent,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),

            multiview_mask: None,
            cache: None,
        });

        log::debug!("MeshRenderer: built {name} pipeline ({:?}, {:?})", key.side, ctx.surface_format);
        self.pipelines.insert(key, pipeline);
    }

    fn ensure_static_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.camera_bind_group.is_none() {
            if let Some(layout) = self.camera_layout.as_ref() {
                let ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("washi camera ubo"),
                    size: std::mem::size_of::<MatrixUniform>() as u64,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                self.camera_bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("washi camera bind group"),
                    layout,
                    entries: &[wgpu::BindGroupEntry { binding: 0, resource: ubo.as_entire_binding() }],
                }));
                self.camera_ubo = Some(ubo);
            }
        }

        if self.sampler.is_none() {
            self.sampler = Some(ctx.device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("washi msdf sampler"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                mipmap_filter: wgpu::MipmapFilterMode::Nearest,
                ..Default::default()
            }));
        }

        if self.placeholder.is_none() {
            // Transparent black: a pending layer has zero coverage.
            self.placeholder = Some(upload_rgba8(ctx, "washi placeholder layer", 1, 1, &[0, 0, 0, 0]));
        }
    }

    fn ensure_object(&mut self, ctx: &RenderCtx<'_>, index: usize) {
        let Some(layout) = self.object_layout.as_ref() else { return };
        while self.objects.len() <= index {
            let ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("washi object ubo"),
                size: std::mem::size_of::<MatrixUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("washi object bind group"),
                layout,
                entries: &[wgpu::BindGroupEntry { binding: 0, resource: ubo.as_entire_binding() }],
            });
            self.objects.push(ObjectBinding { ubo, bind_group });
        }
    }

    fn ensure_mesh(&mut self, ctx: &RenderCtx<'_>, mesh: &Mesh) {
        if self.meshes.contains_key(&mesh.id()) {
            return;
        }

        let vbo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("washi mesh vbo"),
            contents: bytemuck::cast_slice(mesh.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let ibo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("washi mesh ibo"),
            contents: bytemuck::cast_slice(mesh.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });

        self.meshes.insert(
            mesh.id(),
            GpuMesh { vbo, ibo, index_count: mesh.indices().len() as u32 },
        );
    }

    /// Uploads the image if it just became ready; returns whether it is bound for real.
    fn ensure_texture(&mut self, ctx: &RenderCtx<'_>, image: &ImageHandle) -> bool {
        if self.textures.contains_key(&image.id()) {
            return true;
        }

        match image.state() {
            ImageState::Pending => false,
            ImageState::Failed(err) => {
                if self.warned_images.insert(image.id()) {
                    log::debug!("MeshRenderer: layer '{}' unavailable ({err}); drawing transparent", image.label());
                }
                false
            }
            ImageState::Ready(data) => {
                let view = upload_rgba8(ctx, image.label(), data.width(), data.height(), data.pixels());
                log::debug!("MeshRenderer: uploaded '{}' ({}x{})", image.label(), data.width(), data.height());
                self.textures.insert(image.id(), view);
                true
            }
        }
    }

    fn ensure_material(&mut self, ctx: &RenderCtx<'_>, material: &Material) {
        let images = material.images();
        let ready: Vec<bool> = images.iter().map(|img| self.ensure_texture(ctx, img)).collect();

        if let Some(existing) = self.materials.get(&material.id()) {
            if existing.bound_ready == ready {
                return;
            }
        }

        let program = material.program();
        self.material_layout(ctx, program);
        let (Some(layout), Some(placeholder), Some(sampler)) = (
            self.material_layouts.get(&program),
            self.placeholder.as_ref(),
            self.sampler.as_ref(),
        ) else {
            return;
        };

        // Keep the uniform buffer across rebinds.
        let ubo = match self.materials.remove(&material.id()) {
            Some(old) => old.ubo,
            None => ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("washi material ubo"),
                size: std::mem::size_of::<MaterialUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }),
        };

        let views: Vec<&wgpu::TextureView> = images
            .iter()
            .map(|img| self.textures.get(&img.id()).unwrap_or(placeholder))
            .collect();

        let mut entries = vec![wgpu::BindGroupEntry { binding: 0, resource: ubo.as_entire_binding() }];
        for (i, view) in views.iter().enumerate() {
            entries.push(wgpu::BindGroupEntry {
                binding: 1 + i as u32,
                resource: wgpu::BindingResource::TextureView(*view),
            });
        }
        if !views.is_empty() {
            entries.push(wgpu::BindGroupEntry {
                binding: 4,
                resource: wgpu::BindingResource::Sampler(sampler),
            });
        }

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("washi {} material bind group", program.name())),
            layout,
            entries: &entries,
        });

        self.materials.insert(material.id(), GpuMaterial { ubo, bind_group, bound_ready: ready });
    }
}

fn upload_rgba8(ctx: &RenderCtx<'_>, label: &str, width: u32, height: u32, pixels: &[u8]) -> wgpu::TextureView {
    let size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };
    let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        // Distance data, not color: no sRGB decode.
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    ctx.queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        size,
    );

    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
