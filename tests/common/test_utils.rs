#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use cgmath::{Deg, Matrix4, Point3, Vector3, Vector4};
use render_technique::{
    camera::{Camera, Viewport},
    context::RenderEventArgs,
    data_structures::{
        material::SharedMaterial,
        mesh::{BufferBinding, Mesh},
    },
    device::{
        Buffer, ClearFlags, ConstantBuffer, PipelineState, Query, RenderDevice, RenderTarget,
        Shader, ShaderParameterType, ShaderType, Texture,
    },
    passes::{LightParams, PerObject, RenderPass},
};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Everything the passes asked the GPU to do, in order.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    CreateConstantBuffer { id: usize, size: usize },
    DestroyConstantBuffer { id: usize },
    UploadConstantBuffer { id: usize, data: Vec<u8> },
    AssignConstantBuffer { shader: String, name: String },
    BindPipeline(String),
    UnbindPipeline(String),
    BindShader(String),
    UnbindShader(String),
    Dispatch(String, [u32; 3]),
    BindBuffer { buffer: String, slot: u32 },
    UnbindBuffer { buffer: String, slot: u32 },
    CopyBuffer { destination: String, source: String },
    BindTexture { texture: String, slot: u32, stage: ShaderType },
    UnbindTexture { texture: String, slot: u32, stage: ShaderType },
    ClearTexture { texture: String, flags: ClearFlags },
    GenerateMipMaps(String),
    CopyTexture { destination: String, source: String },
    ClearRenderTarget { target: String, flags: ClearFlags, stencil: u8 },
    Draw { vertex_count: u32 },
    DrawIndexed { index_count: u32 },
    BeginQuery(u64),
    EndQuery(u64),
}

pub type CommandLog = Rc<RefCell<Vec<Command>>>;

pub struct RecordingDevice {
    log: CommandLog,
    next_id: Cell<usize>,
    constant_buffers: RefCell<Vec<Rc<MockConstantBuffer>>>,
}

impl RecordingDevice {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            log: Rc::new(RefCell::new(Vec::new())),
            next_id: Cell::new(0),
            constant_buffers: RefCell::new(Vec::new()),
        })
    }

    pub fn log(&self) -> CommandLog {
        self.log.clone()
    }

    pub fn commands(&self) -> Vec<Command> {
        self.log.borrow().clone()
    }

    pub fn clear_log(&self) {
        self.log.borrow_mut().clear();
    }

    /// Draw and indexed draw commands only.
    pub fn draws(&self) -> Vec<Command> {
        self.commands()
            .into_iter()
            .filter(|c| matches!(c, Command::Draw { .. } | Command::DrawIndexed { .. }))
            .collect()
    }

    /// Index counts of all indexed draws.
    pub fn indexed_draws(&self) -> Vec<u32> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                Command::DrawIndexed { index_count } => Some(index_count),
                _ => None,
            })
            .collect()
    }

    /// Contents of every constant buffer upload of `size` bytes, in order.
    pub fn uploads_of_size(&self, size: usize) -> Vec<Vec<u8>> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                Command::UploadConstantBuffer { data, .. } if data.len() == size => Some(data),
                _ => None,
            })
            .collect()
    }

    pub fn per_object_uploads(&self) -> Vec<PerObject> {
        self.uploads_of_size(size_of::<PerObject>())
            .iter()
            .map(|data| bytemuck::pod_read_unaligned(data))
            .collect()
    }

    pub fn light_index_uploads(&self) -> Vec<u32> {
        self.uploads_of_size(size_of::<LightParams>())
            .iter()
            .map(|data| bytemuck::pod_read_unaligned::<LightParams>(data).light_index)
            .collect()
    }

    pub fn live_constant_buffers(&self) -> usize {
        let commands = self.commands();
        let created = commands
            .iter()
            .filter(|c| matches!(c, Command::CreateConstantBuffer { .. }))
            .count();
        let destroyed = commands
            .iter()
            .filter(|c| matches!(c, Command::DestroyConstantBuffer { .. }))
            .count();
        created - destroyed
    }

    fn next_id(&self) -> usize {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    fn push(&self, command: Command) {
        self.log.borrow_mut().push(command);
    }
}

impl RenderDevice for RecordingDevice {
    fn create_constant_buffer(&self, data: &[u8]) -> anyhow::Result<Rc<dyn ConstantBuffer>> {
        let id = self.next_id();
        self.push(Command::CreateConstantBuffer {
            id,
            size: data.len(),
        });
        let buffer = Rc::new(MockConstantBuffer {
            id,
            log: self.log.clone(),
        });
        self.constant_buffers.borrow_mut().push(buffer.clone());
        Ok(buffer)
    }

    fn destroy_constant_buffer(&self, buffer: Rc<dyn ConstantBuffer>) {
        let address = Rc::as_ptr(&buffer) as *const ();
        let mut buffers = self.constant_buffers.borrow_mut();
        let position = buffers
            .iter()
            .position(|mock| Rc::as_ptr(mock) as *const () == address)
            .expect("destroyed a constant buffer this device did not create");
        let mock = buffers.remove(position);
        self.push(Command::DestroyConstantBuffer { id: mock.id });
    }

    fn create_vertex_buffer(
        &self,
        _data: &[u8],
        vertex_count: u32,
        _stride: u32,
    ) -> anyhow::Result<Rc<dyn Buffer>> {
        let name = format!("vertex{}", self.next_id());
        Ok(MockBuffer::new(&name, vertex_count, &self.log))
    }

    fn create_index_buffer(
        &self,
        _data: &[u8],
        index_count: u32,
        _stride: u32,
    ) -> anyhow::Result<Rc<dyn Buffer>> {
        let name = format!("index{}", self.next_id());
        Ok(MockBuffer::new(&name, index_count, &self.log))
    }

    fn draw(&self, vertex_count: u32, _first_vertex: u32) {
        self.push(Command::Draw { vertex_count });
    }

    fn draw_indexed(&self, index_count: u32, _first_index: u32) {
        self.push(Command::DrawIndexed { index_count });
    }
}

pub struct MockConstantBuffer {
    id: usize,
    log: CommandLog,
}

impl ConstantBuffer for MockConstantBuffer {
    fn set(&self, data: &[u8]) {
        self.log.borrow_mut().push(Command::UploadConstantBuffer {
            id: self.id,
            data: data.to_vec(),
        });
    }

    fn bind(&self, _id: u32, _stage: ShaderType) -> bool {
        true
    }

    fn unbind(&self, _id: u32, _stage: ShaderType) {}
}

pub struct MockBuffer {
    name: String,
    count: u32,
    log: CommandLog,
}

impl MockBuffer {
    pub fn new(name: &str, count: u32, log: &CommandLog) -> Rc<dyn Buffer> {
        Rc::new(Self {
            name: name.to_string(),
            count,
            log: log.clone(),
        })
    }

    pub fn named(name: &str, log: &CommandLog) -> Rc<Self> {
        Rc::new(Self {
            name: name.to_string(),
            count: 0,
            log: log.clone(),
        })
    }
}

impl Buffer for MockBuffer {
    fn bind(&self, id: u32, _stage: ShaderType, _parameter: ShaderParameterType) -> bool {
        self.log.borrow_mut().push(Command::BindBuffer {
            buffer: self.name.clone(),
            slot: id,
        });
        true
    }

    fn unbind(&self, id: u32, _stage: ShaderType, _parameter: ShaderParameterType) {
        self.log.borrow_mut().push(Command::UnbindBuffer {
            buffer: self.name.clone(),
            slot: id,
        });
    }

    fn copy(&self, other: &dyn Buffer) {
        self.log.borrow_mut().push(Command::CopyBuffer {
            destination: self.name.clone(),
            source: format!("{} elements", other.element_count()),
        });
    }

    fn element_count(&self) -> u32 {
        self.count
    }
}

pub struct MockTexture {
    name: String,
    transparent: bool,
    log: CommandLog,
}

impl MockTexture {
    pub fn new(name: &str, log: &CommandLog) -> Rc<Self> {
        Rc::new(Self {
            name: name.to_string(),
            transparent: false,
            log: log.clone(),
        })
    }

    pub fn transparent(name: &str, log: &CommandLog) -> Rc<Self> {
        Rc::new(Self {
            name: name.to_string(),
            transparent: true,
            log: log.clone(),
        })
    }
}

impl Texture for MockTexture {
    fn bind(&self, id: u32, stage: ShaderType, _parameter: ShaderParameterType) {
        self.log.borrow_mut().push(Command::BindTexture {
            texture: self.name.clone(),
            slot: id,
            stage,
        });
    }

    fn unbind(&self, id: u32, stage: ShaderType, _parameter: ShaderParameterType) {
        self.log.borrow_mut().push(Command::UnbindTexture {
            texture: self.name.clone(),
            slot: id,
            stage,
        });
    }

    fn clear(&self, flags: ClearFlags, _color: Vector4<f32>, _depth: f32, _stencil: u8) {
        self.log.borrow_mut().push(Command::ClearTexture {
            texture: self.name.clone(),
            flags,
        });
    }

    fn generate_mipmaps(&self) {
        self.log
            .borrow_mut()
            .push(Command::GenerateMipMaps(self.name.clone()));
    }

    fn copy(&self, other: &dyn Texture) {
        self.log.borrow_mut().push(Command::CopyTexture {
            destination: self.name.clone(),
            source: if other.is_transparent() {
                "transparent".to_string()
            } else {
                "opaque".to_string()
            },
        });
    }

    fn is_transparent(&self) -> bool {
        self.transparent
    }
}

pub struct MockRenderTarget {
    name: String,
    log: CommandLog,
}

impl MockRenderTarget {
    pub fn new(name: &str, log: &CommandLog) -> Rc<Self> {
        Rc::new(Self {
            name: name.to_string(),
            log: log.clone(),
        })
    }
}

impl RenderTarget for MockRenderTarget {
    fn clear(&self, flags: ClearFlags, _color: Vector4<f32>, _depth: f32, stencil: u8) {
        self.log.borrow_mut().push(Command::ClearRenderTarget {
            target: self.name.clone(),
            flags,
            stencil,
        });
    }
}

pub struct MockShader {
    name: String,
    stage: ShaderType,
    log: CommandLog,
}

impl MockShader {
    pub fn new(name: &str, stage: ShaderType, log: &CommandLog) -> Rc<Self> {
        Rc::new(Self {
            name: name.to_string(),
            stage,
            log: log.clone(),
        })
    }
}

impl Shader for MockShader {
    fn shader_type(&self) -> ShaderType {
        self.stage
    }

    fn set_constant_buffer(&self, name: &str, _buffer: &Rc<dyn ConstantBuffer>) {
        self.log.borrow_mut().push(Command::AssignConstantBuffer {
            shader: self.name.clone(),
            name: name.to_string(),
        });
    }

    fn input_slot(&self, binding: &BufferBinding) -> Option<u32> {
        match binding.name.as_str() {
            "POSITION" => Some(0),
            "NORMAL" => Some(1),
            "TEXCOORD" => Some(2),
            _ => None,
        }
    }

    fn bind(&self) {
        self.log
            .borrow_mut()
            .push(Command::BindShader(self.name.clone()));
    }

    fn unbind(&self) {
        self.log
            .borrow_mut()
            .push(Command::UnbindShader(self.name.clone()));
    }

    fn dispatch(&self, groups: Vector3<u32>) {
        self.log
            .borrow_mut()
            .push(Command::Dispatch(self.name.clone(), groups.into()));
    }
}

pub struct MockPipeline {
    name: String,
    vertex: Rc<MockShader>,
    pixel: Rc<MockShader>,
    target: Option<Rc<MockRenderTarget>>,
    log: CommandLog,
}

impl MockPipeline {
    pub fn new(name: &str, log: &CommandLog) -> Rc<Self> {
        Rc::new(Self {
            name: name.to_string(),
            vertex: MockShader::new(&format!("{name}.vs"), ShaderType::Vertex, log),
            pixel: MockShader::new(&format!("{name}.ps"), ShaderType::Pixel, log),
            target: None,
            log: log.clone(),
        })
    }

    pub fn with_target(name: &str, target: Rc<MockRenderTarget>, log: &CommandLog) -> Rc<Self> {
        Rc::new(Self {
            name: name.to_string(),
            vertex: MockShader::new(&format!("{name}.vs"), ShaderType::Vertex, log),
            pixel: MockShader::new(&format!("{name}.ps"), ShaderType::Pixel, log),
            target: Some(target),
            log: log.clone(),
        })
    }
}

impl PipelineState for MockPipeline {
    fn bind(&self) {
        self.log
            .borrow_mut()
            .push(Command::BindPipeline(self.name.clone()));
    }

    fn unbind(&self) {
        self.log
            .borrow_mut()
            .push(Command::UnbindPipeline(self.name.clone()));
    }

    fn shader(&self, stage: ShaderType) -> Option<Rc<dyn Shader>> {
        match stage {
            ShaderType::Vertex => Some(self.vertex.clone()),
            ShaderType::Pixel => Some(self.pixel.clone()),
            _ => None,
        }
    }

    fn render_target(&self) -> Option<Rc<dyn RenderTarget>> {
        self.target
            .clone()
            .map(|target| target as Rc<dyn RenderTarget>)
    }
}

pub struct MockQuery {
    log: CommandLog,
}

impl MockQuery {
    pub fn new(log: &CommandLog) -> Rc<Self> {
        Rc::new(Self { log: log.clone() })
    }
}

impl Query for MockQuery {
    fn begin(&self, frame: u64) {
        self.log.borrow_mut().push(Command::BeginQuery(frame));
    }

    fn end(&self, frame: u64) {
        self.log.borrow_mut().push(Command::EndQuery(frame));
    }
}

/// A mesh that draws `index_count` indices, so draws can be told apart in the log.
pub fn indexed_mesh(index_count: u32, material: Option<SharedMaterial>, log: &CommandLog) -> Rc<Mesh> {
    let mut mesh = Mesh::new();
    mesh.add_vertex_buffer(
        BufferBinding::new("POSITION", 0),
        MockBuffer::new(&format!("positions{index_count}"), 4, log),
    );
    mesh.set_index_buffer(Some(MockBuffer::new(
        &format!("indices{index_count}"),
        index_count,
        log,
    )));
    mesh.set_material(material);
    Rc::new(mesh)
}

pub fn test_camera() -> Camera {
    let mut camera = Camera::new(Viewport::new(800.0, 600.0));
    camera.look_at(
        Point3::new(0.0, 2.0, 5.0),
        Point3::new(0.0, 0.0, 0.0),
        Vector3::unit_y(),
    );
    camera.set_perspective(Deg(60.0), 0.1, 100.0);
    camera
}

/// Run all three phases of `pass` once, the way a technique does.
pub fn run_pass(pass: &mut dyn RenderPass, args: &RenderEventArgs) {
    pass.pre_render(args);
    pass.render(args);
    pass.post_render(args);
}

pub fn assert_matrix_eq(actual: [[f32; 4]; 4], expected: Matrix4<f32>) {
    let expected: [[f32; 4]; 4] = expected.into();
    for column in 0..4 {
        for row in 0..4 {
            let (a, e) = (actual[column][row], expected[column][row]);
            assert!(
                (a - e).abs() < 1e-4,
                "matrices differ at [{column}][{row}]: {a} != {e}\nactual: {actual:?}\nexpected: {expected:?}"
            );
        }
    }
}
