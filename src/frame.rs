//! Frame driver.
//!
//! [`Renderer`] ties a device, a technique and the render configuration
//! together. Every call to [`Renderer::render`] advances the [`FrameClock`],
//! builds the [`RenderEventArgs`] of the frame and runs the technique once.

use std::rc::Rc;

use instant::{Duration, Instant};

use crate::{
    camera::Camera,
    context::{RenderConfig, RenderEventArgs},
    device::RenderDevice,
    render::RenderTechnique,
};

/// Initialise `env_logger` from `RUST_LOG`. Calling it twice only prints a warning.
pub fn init_logger() {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };
}

/// Timing of a single frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTiming {
    pub elapsed: Duration,
    pub total: Duration,
    pub frame_counter: u64,
}

/// Measures frame times and counts frames, starting at frame 0.
pub struct FrameClock {
    start: Instant,
    last_time: Option<Instant>,
    frame_counter: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            last_time: None,
            frame_counter: 0,
        }
    }

    /// Start a new frame. The first frame has an elapsed time of zero.
    pub fn tick(&mut self) -> FrameTiming {
        let now = Instant::now();
        let elapsed = self
            .last_time
            .map_or(Duration::from_millis(0), |last_time| now - last_time);
        self.last_time = Some(now);

        let timing = FrameTiming {
            elapsed,
            total: now - self.start,
            frame_counter: self.frame_counter,
        };
        self.frame_counter += 1;
        timing
    }

    /// Number of frames ticked so far.
    pub fn frames(&self) -> u64 {
        self.frame_counter
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Renderer {
    device: Rc<dyn RenderDevice>,
    technique: RenderTechnique,
    clock: FrameClock,
    config: RenderConfig,
}

impl Renderer {
    pub fn new(device: Rc<dyn RenderDevice>) -> Self {
        Self::with_technique(device, RenderTechnique::new())
    }

    pub fn with_technique(device: Rc<dyn RenderDevice>, technique: RenderTechnique) -> Self {
        Self {
            device,
            technique,
            clock: FrameClock::new(),
            config: RenderConfig::default(),
        }
    }

    pub fn device(&self) -> &Rc<dyn RenderDevice> {
        &self.device
    }

    pub fn technique(&self) -> &RenderTechnique {
        &self.technique
    }

    pub fn technique_mut(&mut self) -> &mut RenderTechnique {
        &mut self.technique
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Change the configuration, e.g. `renderer.configure(|cfg| cfg.clear_stencil = 1)`.
    ///
    /// Passes copy what they need when they are built, so changes apply to
    /// passes created afterwards.
    pub fn configure(&mut self, f: impl FnOnce(&mut RenderConfig)) {
        f(&mut self.config);
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Render one frame and return its frame counter.
    pub fn render(&mut self, camera: Option<&Camera>) -> u64 {
        let timing = self.clock.tick();
        let args = RenderEventArgs::new(self.device.as_ref(), camera).with_timing(
            timing.elapsed.as_secs_f32(),
            timing.total.as_secs_f32(),
            timing.frame_counter,
        );
        log::trace!("Rendering frame {}", timing.frame_counter);
        self.technique.render(&args);
        timing.frame_counter
    }
}
