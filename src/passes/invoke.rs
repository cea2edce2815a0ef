use crate::{context::RenderEventArgs, data_structures::scene_graph::Visitor, passes::RenderPass};

pub type PassFunction = Box<dyn FnMut(&RenderEventArgs)>;

/// Runs an arbitrary callback as a step of a technique.
pub struct InvokeFunctionPass {
    enabled: bool,
    function: PassFunction,
}

impl InvokeFunctionPass {
    pub fn new(function: impl FnMut(&RenderEventArgs) + 'static) -> Self {
        Self {
            enabled: true,
            function: Box::new(function),
        }
    }
}

impl Visitor for InvokeFunctionPass {}

impl RenderPass for InvokeFunctionPass {
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn render(&mut self, args: &RenderEventArgs) {
        (self.function)(args);
    }
}
