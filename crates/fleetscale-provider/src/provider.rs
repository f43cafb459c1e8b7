//! Fleet provider: the set of node groups served to the autoscaler.

use std::sync::Arc;

use fleetscale_client::FleetClient;
use fleetscale_core::NodeGroupSpec;
use fleetscale_manager::{Manager, NodeResolver};
use tracing::{info, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::node_group::NodeGroup;

pub const PROVIDER_NAME: &str = "juju";

/// Owns every configured node group.
///
/// Groups are fixed at construction; the units inside them change on
/// every refresh.
#[derive(Debug, Default)]
pub struct FleetProvider {
    node_groups: Vec<NodeGroup>,
}

impl FleetProvider {
    pub fn new(node_groups: Vec<NodeGroup>) -> Self {
        Self { node_groups }
    }

    /// Initialize one manager per spec. `connect` supplies the fleet client
    /// for each group's model.
    ///
    /// Fails on the first group whose initial status read fails.
    pub fn build<F>(
        specs: &[NodeGroupSpec],
        resolver: Arc<dyn NodeResolver>,
        mut connect: F,
    ) -> ProviderResult<Self>
    where
        F: FnMut(&NodeGroupSpec) -> Arc<dyn FleetClient>,
    {
        let mut node_groups = Vec::with_capacity(specs.len());
        for spec in specs {
            let manager = Manager::init(connect(spec), resolver.clone(), &spec.model, &spec.application)
                .map_err(|source| ProviderError::Init {
                    group: spec.id(),
                    source,
                })?;
            let group = NodeGroup::new(spec, manager);
            info!(group = %group.debug(), "node group registered");
            node_groups.push(group);
        }
        Ok(Self::new(node_groups))
    }

    pub fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    pub fn node_groups(&self) -> &[NodeGroup] {
        &self.node_groups
    }

    pub fn node_group(&self, id: &str) -> ProviderResult<&NodeGroup> {
        self.node_groups
            .iter()
            .find(|g| g.id() == id)
            .ok_or_else(|| ProviderError::NodeGroupNotFound(id.to_string()))
    }

    pub fn node_group_mut(&mut self, id: &str) -> ProviderResult<&mut NodeGroup> {
        self.node_groups
            .iter_mut()
            .find(|g| g.id() == id)
            .ok_or_else(|| ProviderError::NodeGroupNotFound(id.to_string()))
    }

    /// The group owning `node`, or `None` if no group tracks it.
    pub fn node_group_for_node(&self, node: &str) -> Option<&NodeGroup> {
        self.node_groups.iter().find(|g| g.contains_node(node))
    }

    /// Reconcile every group with the fleet and reset targets to actual
    /// sizes.
    ///
    /// A failing group does not stop the others; the first error is returned
    /// once all groups were attempted.
    pub fn refresh(&mut self) -> ProviderResult<()> {
        let mut first_error = None;
        for group in &mut self.node_groups {
            if let Err(e) = group.refresh() {
                warn!(group = %group.id(), error = %e, "node group refresh failed");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
