//! Render technique: an ordered sequence of passes.
//!
//! A [`RenderTechnique`] is what a frame renders. It owns its passes through
//! [`SharedPass`] handles, so the application can keep a handle to toggle a
//! pass at runtime and the same pass can appear more than once.
//!
//! Each frame every enabled pass runs `pre_render`, `render` and
//! `post_render` back to back, in the order the passes were added. Disabled
//! passes are skipped entirely.

use log::{trace, warn};

use crate::{context::RenderEventArgs, passes::SharedPass};

#[derive(Default)]
pub struct RenderTechnique {
    passes: Vec<SharedPass>,
}

impl RenderTechnique {
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    /// Append a pass and return its index. Duplicates are allowed.
    pub fn add_pass(&mut self, pass: SharedPass) -> usize {
        self.passes.push(pass);
        self.passes.len() - 1
    }

    /// The pass at `index`, or `None` if there is no such pass.
    pub fn get_pass(&self, index: usize) -> Option<SharedPass> {
        let pass = self.passes.get(index).cloned();
        if pass.is_none() {
            warn!(
                "Requested pass {} but the technique only has {} passes.",
                index,
                self.passes.len()
            );
        }
        pass
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Run every enabled pass through pre-render, render and post-render.
    ///
    /// Each pass stays mutably borrowed for all three phases, so a pass must
    /// not borrow its own `SharedPass` handle while it runs (an
    /// `InvokeFunctionPass` closure toggling itself would panic). Other
    /// passes may be toggled freely.
    pub fn render(&self, args: &RenderEventArgs) {
        for (index, pass) in self.passes.iter().enumerate() {
            let mut pass = pass.borrow_mut();
            if !pass.is_enabled() {
                trace!("Skipping disabled pass {}", index);
                continue;
            }
            pass.pre_render(args);
            pass.render(args);
            pass.post_render(args);
        }
    }
}
