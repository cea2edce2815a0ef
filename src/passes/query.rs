//! Passes bracketing a section of a technique with a GPU query.
//!
//! Put a [`BeginQueryPass`] before and an [`EndQueryPass`] after the passes
//! to measure. Both use the frame counter of the frame so the query can keep
//! results of several frames in flight apart.

use std::rc::Rc;

use crate::{
    context::RenderEventArgs, data_structures::scene_graph::Visitor, device::Query,
    passes::RenderPass,
};

pub struct BeginQueryPass {
    enabled: bool,
    query: Option<Rc<dyn Query>>,
}

impl BeginQueryPass {
    pub fn new(query: Option<Rc<dyn Query>>) -> Self {
        Self {
            enabled: true,
            query,
        }
    }
}

impl Visitor for BeginQueryPass {}

impl RenderPass for BeginQueryPass {
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn render(&mut self, args: &RenderEventArgs) {
        if let Some(query) = &self.query {
            query.begin(args.frame_counter);
        }
    }
}

pub struct EndQueryPass {
    enabled: bool,
    query: Option<Rc<dyn Query>>,
}

impl EndQueryPass {
    pub fn new(query: Option<Rc<dyn Query>>) -> Self {
        Self {
            enabled: true,
            query,
        }
    }
}

impl Visitor for EndQueryPass {}

impl RenderPass for EndQueryPass {
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn render(&mut self, args: &RenderEventArgs) {
        if let Some(query) = &self.query {
            query.end(args.frame_counter);
        }
    }
}
