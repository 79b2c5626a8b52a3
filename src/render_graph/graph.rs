//! Render graph definition: node registration, dependency derivation and ordering

use crate::backend::types::{NodePipelineDescriptor, SampleCount, TextureFormat};
use crate::render_graph::error::{GraphError, GraphResult};
use crate::render_graph::node::{RenderNode, RenderNodeHandle};
use crate::render_graph::resource::*;
use crate::render_graph::shader::ShaderPack;
use crate::RendererConfig;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Node handle -> handles of the nodes it depends on
pub type DependencyGraph = BTreeMap<RenderNodeHandle, BTreeSet<RenderNodeHandle>>;

/// Deferred state change run once at the start of the next frame
pub type FrameBeginAction = Box<dyn FnOnce() + Send>;

/// The main render graph structure.
///
/// Resources are registered first, then nodes are added one at a time. Every
/// successful [`add_node`](Self::add_node) leaves the graph acyclic, so
/// [`get_topo_sorted`](Self::get_topo_sorted) always succeeds. The graph only
/// grows; when the pass structure changes a new graph is built.
pub struct RenderGraph {
    registry: ResourceRegistry,
    nodes: BTreeMap<RenderNodeHandle, RenderNode>,
    dependency_graph: DependencyGraph,
    next_node_handle: u32,
    frame_begin_actions: Mutex<VecDeque<FrameBeginAction>>,
}

impl RenderGraph {
    pub fn new() -> Self {
        Self {
            registry: ResourceRegistry::new(),
            nodes: BTreeMap::new(),
            dependency_graph: BTreeMap::new(),
            next_node_handle: 0,
            frame_begin_actions: Mutex::new(VecDeque::new()),
        }
    }

    /// Register a resource description and return its handle
    pub fn add_resource<R: GraphResource>(&mut self, resource: R) -> ResourceHandle {
        self.registry.add(resource)
    }

    /// Register a shader pack so nodes can reference it
    pub fn add_pipeline(&mut self, pack: ShaderPack) -> ResourceHandle {
        self.registry.add(pack)
    }

    /// Add a render node.
    ///
    /// Fails if one of the node's targets is also read by its shaders, if a
    /// shader pack is not registered, or if the node closes a dependency cycle.
    /// On failure the graph is left exactly as it was.
    pub fn add_node(&mut self, node: RenderNode) -> GraphResult<RenderNodeHandle> {
        let shader_resources = match self.get_all_shader_resources_set(&node) {
            Ok(resources) => resources,
            Err(err) => {
                log::warn!("Rejected render node '{}': {}", node.name, err);
                return Err(err);
            }
        };
        let targets = node.get_all_targets_set();

        let aliased: Vec<_> = targets.intersection(&shader_resources).copied().collect();
        if !aliased.is_empty() {
            let err = GraphError::TargetUsedAsShaderResource {
                node: node.name.clone(),
                resources: aliased,
            };
            log::warn!("{err}");
            return Err(err);
        }

        let handle = self.new_node_handle();

        // Edges in both directions against every existing node
        let mut dependencies = BTreeSet::new();
        let mut dependents = Vec::new();
        for (&other_handle, other) in &self.nodes {
            let other_resources = self.get_all_shader_resources_set(other)?;
            if !targets.is_disjoint(&other_resources) {
                log::trace!("'{}' depends on '{}'", other.name, node.name);
                dependents.push(other_handle);
            }
            if !other.get_all_targets_set().is_disjoint(&shader_resources) {
                log::trace!("'{}' depends on '{}'", node.name, other.name);
                dependencies.insert(other_handle);
            }
        }

        let name = node.name.clone();
        let dependency_count = dependencies.len();
        self.nodes.insert(handle, node);
        self.dependency_graph.insert(handle, dependencies);
        for dependent in &dependents {
            if let Some(deps) = self.dependency_graph.get_mut(dependent) {
                deps.insert(handle);
            }
        }

        if let Err(err) = self.check_dependency_cycles() {
            self.nodes.remove(&handle);
            self.dependency_graph.remove(&handle);
            for dependent in &dependents {
                if let Some(deps) = self.dependency_graph.get_mut(dependent) {
                    deps.remove(&handle);
                }
            }
            log::warn!("Rejected render node '{name}': {err}");
            return Err(err);
        }

        log::debug!(
            "Added render node '{}' as {} ({} dependencies, {} dependents)",
            name,
            handle,
            dependency_count,
            dependents.len()
        );
        Ok(handle)
    }

    fn new_node_handle(&mut self) -> RenderNodeHandle {
        let handle = RenderNodeHandle(self.next_node_handle);
        self.next_node_handle += 1;
        handle
    }

    /// Union of the resources bound by the node's vertex and fragment shaders
    pub fn get_all_shader_resources_set(
        &self,
        node: &RenderNode,
    ) -> GraphResult<BTreeSet<ResourceHandle>> {
        let vertex = self.registry.try_get::<ShaderPack>(node.vertex_shader)?;
        let fragment = self.registry.try_get::<ShaderPack>(node.fragment_shader)?;

        let mut resources = vertex.get_bound_resources_set();
        resources.extend(fragment.get_bound_resources_set());
        Ok(resources)
    }

    /// Run a full cycle check over every node
    pub fn check_dependency_cycles(&self) -> GraphResult<()> {
        let mut discovered = BTreeSet::new();
        let mut finished = BTreeSet::new();

        for &handle in self.dependency_graph.keys() {
            if discovered.contains(&handle) || finished.contains(&handle) {
                continue;
            }
            visit_for_cycles(
                &self.dependency_graph,
                handle,
                &mut discovered,
                &mut finished,
            )
            .map_err(|(node, dependency)| GraphError::CyclicDependency {
                node: self.node_name(node),
                dependency: self.node_name(dependency),
            })?;
        }
        Ok(())
    }

    fn node_name(&self, handle: RenderNodeHandle) -> String {
        self.nodes
            .get(&handle)
            .map(|node| node.name.clone())
            .unwrap_or_else(|| handle.to_string())
    }

    /// Every node exactly once, each after all of its dependencies.
    ///
    /// Among nodes that are ready at the same time the smallest handle goes first.
    pub fn get_topo_sorted(&self) -> Vec<RenderNodeHandle> {
        let mut remaining: BTreeSet<_> = self.nodes.keys().copied().collect();
        let mut sorted = Vec::with_capacity(remaining.len());

        while let Some(ready) = remaining.iter().copied().find(|handle| {
            self.dependency_graph
                .get(handle)
                .map_or(true, |deps| deps.iter().all(|dep| !remaining.contains(dep)))
        }) {
            remaining.remove(&ready);
            sorted.push(ready);
        }

        debug_assert!(remaining.is_empty(), "dependency graph has a cycle");
        sorted
    }

    /// # Panics
    ///
    /// If `handle` does not belong to this graph.
    #[track_caller]
    pub fn node(&self, handle: RenderNodeHandle) -> &RenderNode {
        match self.try_node(handle) {
            Ok(node) => node,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_node(&self, handle: RenderNodeHandle) -> GraphResult<&RenderNode> {
        self.nodes
            .get(&handle)
            .ok_or(GraphError::UnknownNode { handle })
    }

    pub fn nodes(&self) -> impl Iterator<Item = (RenderNodeHandle, &RenderNode)> {
        self.nodes.iter().map(|(&handle, node)| (handle, node))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes that must execute before `handle`
    #[track_caller]
    pub fn dependencies(&self, handle: RenderNodeHandle) -> &BTreeSet<RenderNodeHandle> {
        match self.dependency_graph.get(&handle) {
            Some(deps) => deps,
            None => panic!("{}", GraphError::UnknownNode { handle }),
        }
    }

    /// Nodes that must execute after `handle`
    pub fn dependents(&self, handle: RenderNodeHandle) -> Vec<RenderNodeHandle> {
        self.dependency_graph
            .iter()
            .filter(|(_, deps)| deps.contains(&handle))
            .map(|(&dependent, _)| dependent)
            .collect()
    }

    pub fn dependency_graph(&self) -> &DependencyGraph {
        &self.dependency_graph
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    #[track_caller]
    pub fn uniform_buffer(&self, handle: ResourceHandle) -> &UniformBufferResource {
        self.registry.get(handle)
    }

    pub fn try_uniform_buffer(
        &self,
        handle: ResourceHandle,
    ) -> GraphResult<&UniformBufferResource> {
        self.registry.try_get(handle)
    }

    #[track_caller]
    pub fn external_texture(&self, handle: ResourceHandle) -> &ExternalTextureResource {
        self.registry.get(handle)
    }

    pub fn try_external_texture(
        &self,
        handle: ResourceHandle,
    ) -> GraphResult<&ExternalTextureResource> {
        self.registry.try_get(handle)
    }

    #[track_caller]
    pub fn empty_texture(&self, handle: ResourceHandle) -> &EmptyTextureResource {
        self.registry.get(handle)
    }

    pub fn try_empty_texture(&self, handle: ResourceHandle) -> GraphResult<&EmptyTextureResource> {
        self.registry.try_get(handle)
    }

    #[track_caller]
    pub fn model(&self, handle: ResourceHandle) -> &ModelResource {
        self.registry.get(handle)
    }

    pub fn try_model(&self, handle: ResourceHandle) -> GraphResult<&ModelResource> {
        self.registry.try_get(handle)
    }

    #[track_caller]
    pub fn pipeline(&self, handle: ResourceHandle) -> &ShaderPack {
        self.registry.get(handle)
    }

    pub fn try_pipeline(&self, handle: ResourceHandle) -> GraphResult<&ShaderPack> {
        self.registry.try_get(handle)
    }

    /// Format of a render target; targets are always empty (transient) textures
    #[track_caller]
    pub fn target_format(&self, handle: ResourceHandle) -> TextureFormat {
        self.empty_texture(handle).format
    }

    /// Pipeline state of a node, resolved against its targets and `config`
    pub fn pipeline_descriptor(
        &self,
        handle: RenderNodeHandle,
        config: &RendererConfig,
    ) -> GraphResult<NodePipelineDescriptor> {
        let node = self.try_node(handle)?;

        let color_formats = node
            .color_targets
            .iter()
            .map(|&target| self.try_empty_texture(target).map(|tex| tex.format))
            .collect::<GraphResult<Vec<_>>>()?;
        let depth_format = node
            .depth_target
            .map(|target| self.try_empty_texture(target).map(|tex| tex.format))
            .transpose()?;

        Ok(NodePipelineDescriptor {
            label: node.name.clone(),
            vertex_shader: self.try_pipeline(node.vertex_shader)?.path.clone(),
            fragment_shader: self.try_pipeline(node.fragment_shader)?.path.clone(),
            color_formats,
            depth_format,
            cull_mode: node.custom_config.cull_mode,
            samples: if node.custom_config.use_msaa {
                config.msaa_samples
            } else {
                SampleCount::X1
            },
        })
    }

    /// Queue `action` to run once, before any node of the next frame is recorded
    pub fn add_frame_begin_action<F>(&self, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.frame_begin_actions.lock().push_back(Box::new(action));
    }

    /// Run queued frame-begin actions in enqueue order and clear the queue.
    ///
    /// Actions queued while this runs are kept for the next frame.
    pub fn run_frame_begin_actions(&self) -> usize {
        let actions = std::mem::take(&mut *self.frame_begin_actions.lock());
        let count = actions.len();
        for action in actions {
            action();
        }
        count
    }

    pub fn pending_frame_begin_actions(&self) -> usize {
        self.frame_begin_actions.lock().len()
    }
}

impl Default for RenderGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Three-color depth-first search from `handle`.
///
/// Nodes in `discovered` are on the current traversal stack; nodes in
/// `finished` are fully explored. Returns the back-edge `(node, dependency)`
/// if a cycle is reachable from `handle`.
pub fn visit_for_cycles(
    graph: &DependencyGraph,
    handle: RenderNodeHandle,
    discovered: &mut BTreeSet<RenderNodeHandle>,
    finished: &mut BTreeSet<RenderNodeHandle>,
) -> Result<(), (RenderNodeHandle, RenderNodeHandle)> {
    discovered.insert(handle);

    if let Some(deps) = graph.get(&handle) {
        for &dep in deps {
            if discovered.contains(&dep) {
                return Err((handle, dep));
            }
            if !finished.contains(&dep) {
                visit_for_cycles(graph, dep, discovered, finished)?;
            }
        }
    }

    discovered.remove(&handle);
    finished.insert(handle);
    Ok(())
}
