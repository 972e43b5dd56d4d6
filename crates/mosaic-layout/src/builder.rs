//! Turns component descriptions into layout nodes.

use std::sync::Arc;

use mosaic_core::{
    Component, Element, ElementKind, LayoutError, Map, RenderContext, SizeSpec, StateScope, Style,
};

use crate::node::{LayoutNode, NestedHolder, NodeKey, NodeTree};
use crate::output_id::MAX_LEVEL;

/// Hands out global keys for the components rendered by one parent.
struct KeyScope {
    parent: Option<Arc<str>>,
    used: Map<String, u32>,
}

impl KeyScope {
    fn root() -> Self {
        Self {
            parent: None,
            used: Map::default(),
        }
    }

    fn child_of(parent: &str) -> Self {
        Self {
            parent: Some(Arc::from(parent)),
            used: Map::default(),
        }
    }

    /// `parent,key` where `key` is the explicit key or the lifecycle type
    /// id. Repeats among siblings get a `!n` suffix.
    fn global_key_for(&mut self, component: &Component) -> Arc<str> {
        let local = match component.key() {
            Some(key) => key.to_owned(),
            None => component.type_id().raw().to_string(),
        };
        let seen = self.used.entry(local.clone()).or_insert(0);
        let unique = if *seen == 0 {
            local
        } else {
            format!("{local}!{seen}")
        };
        *seen += 1;
        match &self.parent {
            Some(parent) => Arc::from(format!("{parent},{unique}")),
            None => Arc::from(unique),
        }
    }
}

/// Components collected on the way down to one node.
#[derive(Default)]
struct Chain {
    components: Vec<Component>,
    state_updated: bool,
}

/// Deepest node the builder creates. Any node may add a host one level
/// below its parent's, so deeper trees could not be given ids.
const MAX_DEPTH: u32 = MAX_LEVEL;

fn check_depth(depth: u32) -> Result<(), LayoutError> {
    if depth > MAX_DEPTH {
        return Err(LayoutError::LevelOverflow { level: depth });
    }
    Ok(())
}

pub(crate) struct TreeBuilder<'a> {
    tree: &'a mut NodeTree,
    state: &'a mut StateScope,
}

impl<'a> TreeBuilder<'a> {
    pub(crate) fn new(tree: &'a mut NodeTree, state: &'a mut StateScope) -> Self {
        Self { tree, state }
    }

    pub(crate) fn build_root(&mut self, root: &Component) -> Result<NodeKey, LayoutError> {
        let mut scope = KeyScope::root();
        let global_key = scope.global_key_for(root);
        self.resolve_component(root.with_global_key(global_key), None, Chain::default(), 0)
    }

    /// Renders the content of a holder under the given specs and returns
    /// the root of the nested tree. The nested root takes the holder's place,
    /// so it sits at the holder's depth. The holder itself is left untouched.
    pub(crate) fn build_nested(
        &mut self,
        holder: &NestedHolder,
        width: SizeSpec,
        height: SizeSpec,
    ) -> Result<NodeKey, LayoutError> {
        let component = holder.component.clone();
        let global_key: Arc<str> = Arc::from(component.global_key().unwrap_or_default());
        let state = self.state.resolve(&global_key, component.spec());
        let rendered = {
            let mut cx = RenderContext::new(&global_key, state.as_ref());
            component.spec().render_with_size_spec(&mut cx, width, height)
        };
        let chain = Chain {
            state_updated: self.state.was_updated(&global_key),
            components: vec![component],
        };
        let props = holder.props.as_ref().map(without_layout_props);
        let Some(mut element) = rendered else {
            return Ok(self.insert_node(chain, props.as_ref()));
        };
        if let Some(props) = &props {
            element.merge_common_props(props);
        }
        let mut scope = KeyScope::child_of(&global_key);
        match &element.kind {
            ElementKind::Container(_) => {
                self.build_container(&element, chain, &mut scope, holder.depth)
            }
            ElementKind::Component(next) => {
                let next = next.with_global_key(scope.global_key_for(next));
                self.resolve_component(next, Some(&element), chain, holder.depth)
            }
        }
    }

    /// Resolves `component` and whatever component it renders in turn, until
    /// one renders a container or nothing. The whole chain lands in one node.
    fn resolve_component(
        &mut self,
        mut component: Component,
        props: Option<&Element>,
        mut chain: Chain,
        depth: u32,
    ) -> Result<NodeKey, LayoutError> {
        check_depth(depth)?;
        // Props set by the previous link of the chain on its reference to
        // the current component.
        let mut rendered_props: Option<Box<Element>> = None;
        loop {
            let current = rendered_props.as_deref().or(props);
            let global_key: Arc<str> = Arc::from(component.global_key().unwrap_or_default());
            let state = self.state.resolve(&global_key, component.spec());
            chain.state_updated |= self.state.was_updated(&global_key);

            if component.spec().resolves_with_size_spec() {
                return Ok(self.insert_holder(component, current, chain, depth));
            }

            let rendered = {
                let mut cx = RenderContext::new(&global_key, state.as_ref());
                component.spec().render(&mut cx).map(Box::new)
            };
            chain.components.push(component);

            let Some(mut element) = rendered else {
                return Ok(self.insert_node(chain, current));
            };
            if let Some(current) = current {
                element.merge_common_props(current);
            }
            let mut scope = KeyScope::child_of(&global_key);
            component = match &element.kind {
                ElementKind::Container(_) => {
                    return self.build_container(&element, chain, &mut scope, depth);
                }
                ElementKind::Component(next) => next.with_global_key(scope.global_key_for(next)),
            };
            rendered_props = Some(element);
        }
    }

    fn build_element(
        &mut self,
        element: &Element,
        scope: &mut KeyScope,
        depth: u32,
    ) -> Result<NodeKey, LayoutError> {
        match &element.kind {
            ElementKind::Component(component) => {
                let global_key = scope.global_key_for(component);
                self.resolve_component(
                    component.with_global_key(global_key),
                    Some(element),
                    Chain::default(),
                    depth,
                )
            }
            ElementKind::Container(_) => {
                self.build_container(element, Chain::default(), scope, depth)
            }
        }
    }

    fn build_container(
        &mut self,
        element: &Element,
        chain: Chain,
        scope: &mut KeyScope,
        depth: u32,
    ) -> Result<NodeKey, LayoutError> {
        check_depth(depth)?;
        let key = self.insert_node(chain, Some(element));
        for child in &element.children {
            let child_key = self.build_element(child, scope, depth + 1)?;
            self.tree.append_child(key, child_key)?;
        }
        Ok(key)
    }

    fn insert_holder(
        &mut self,
        component: Component,
        props: Option<&Element>,
        mut chain: Chain,
        depth: u32,
    ) -> NodeKey {
        let mut node = LayoutNode::new(Style::default());
        if let Some(props) = props {
            node.style.merge_from(&props.style);
        }
        node.nested = Some(NestedHolder {
            component: component.clone(),
            props: props.cloned(),
            root: None,
            measurement: None,
            depth,
        });
        chain.components.push(component);
        node.components = chain.components;
        node.state_updated = chain.state_updated;
        self.tree.insert(node)
    }

    /// Inserts a container or leaf node carrying the chain and `props`.
    fn insert_node(&mut self, chain: Chain, props: Option<&Element>) -> NodeKey {
        let mut node = LayoutNode::new(Style::default());
        if let Some(props) = props {
            node.apply_props(props);
        }
        node.components = chain.components;
        node.state_updated = chain.state_updated;
        self.tree.insert(node)
    }
}

/// The props of a holder reference that belong to its rendered content.
/// Flex placement stays with the holder node in the outer tree.
fn without_layout_props(props: &Element) -> Element {
    let mut content = props.clone();
    content.style = Style::default();
    content.children.clear();
    content
}
