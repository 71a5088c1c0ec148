//! One request cycle for one project
//!
//! A [`Cycle`] owns the proposed model and a fresh handler. Nothing in it is
//! shared with other cycles, so projects can be processed in parallel.

use crate::models::Project;
use crate::transport::Transport;
use modelkit::{Document, Handler, Model, Result, modify_plan};
#[cfg(test)]
use modelkit::KeyMinter;

pub struct Cycle {
    pub project: Project,
    pub handler: Handler,
}

impl Cycle {
    /// Start a cycle for a freshly loaded configuration
    pub fn new(mut project: Project) -> Self {
        project.mark_computed();
        Self {
            project,
            handler: Handler::new(),
        }
    }

    #[cfg(test)]
    pub fn with_minter(project: Project, minter: KeyMinter) -> Self {
        let mut cycle = Self::new(project);
        cycle.handler = Handler::with_minter(minter);
        cycle
    }

    pub fn name(&self) -> &str {
        self.project.name.value_str()
    }

    /// Stabilize the proposal against the last applied state
    pub fn stabilize(&mut self, prior: Option<&Project>) -> bool {
        modify_plan(&mut self.handler, Some(&mut self.project), prior)
    }

    /// The request document that apply would send
    pub fn request(&mut self) -> Result<Document> {
        modelkit::serialize(&self.project, &mut self.handler)
    }

    /// Entities that get their identifier from this apply
    pub fn pending(&self) -> Vec<String> {
        self.project.pending_identities()
    }

    /// Send the project and populate it from the response
    pub fn apply(&mut self, transport: &dyn Transport) -> Result<Document> {
        let name = self.project.name.value_str().to_string();
        modelkit::exchange(&mut self.project, &mut self.handler, |request| {
            transport.send(&name, request)
        })
    }
}

/// Render the prior state the way it would be sent, for diffing
pub fn render(project: &Project) -> Document {
    let mut h = Handler::new();
    match modelkit::serialize(project, &mut h) {
        Ok(document) => document,
        Err(e) => {
            // validation rules may have changed since the last apply
            log::warn!("Stored state no longer validates: {e}");
            project.values(&mut h)
        }
    }
}
