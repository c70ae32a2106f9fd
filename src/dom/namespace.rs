//! Namespace Resolution
//!
//! Stack-based namespace resolver, per-element prefix allocation, and the
//! reconciliation pass that keeps moved subtrees self-describing.
//!
//! There is no ambient "current scope": every operation that needs to know
//! the bindings of enclosing elements takes a `NamespaceResolver` built for
//! that position.

use super::attributes::{AttributeStore, NamespaceDecl};
use super::node::{split_qualified, Element, MarkupNode, QName};
use crate::core::scanner::is_ncname;
use crate::error::{Result, ValueError};
use std::collections::HashSet;
use tracing::debug;

/// Well-known namespace URIs
pub mod ns {
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
    pub const XMLNS: &str = "http://www.w3.org/2000/xmlns/";
}

/// Namespace binding (prefix -> URI); `None` prefix is the default namespace
#[derive(Debug, Clone)]
struct NsBinding {
    prefix: Option<String>,
    uri: String,
    depth: u16,
}

/// Stack-based namespace resolver
#[derive(Debug, Clone)]
pub struct NamespaceResolver {
    /// Stack of namespace bindings
    bindings: Vec<NsBinding>,
    /// Current element depth
    depth: u16,
}

impl Default for NamespaceResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceResolver {
    /// Create a new namespace resolver with pre-declared xml and xmlns namespaces
    pub fn new() -> Self {
        let mut bindings = Vec::with_capacity(16);
        bindings.push(NsBinding {
            prefix: Some("xml".to_string()),
            uri: ns::XML.to_string(),
            depth: 0,
        });
        bindings.push(NsBinding {
            prefix: Some("xmlns".to_string()),
            uri: ns::XMLNS.to_string(),
            depth: 0,
        });
        NamespaceResolver { bindings, depth: 0 }
    }

    /// Scope enclosing the node at `path` below `root`
    ///
    /// Declarations of `root` and every element between it and the target are
    /// in effect; the target's own declarations are not.
    pub fn for_path(root: &MarkupNode, path: &[usize]) -> Self {
        let mut resolver = NamespaceResolver::new();
        let mut node = root;
        for &index in path {
            let Some(element) = node.as_element() else { break };
            resolver.enter(&element.attributes);
            match element.children.get(index) {
                Some(child) => node = child,
                None => break,
            }
        }
        resolver
    }

    /// Enter a new element scope
    pub fn push_scope(&mut self) {
        self.depth += 1;
    }

    /// Leave an element scope, removing any bindings declared in it
    pub fn pop_scope(&mut self) {
        while let Some(binding) = self.bindings.last() {
            if binding.depth < self.depth {
                break;
            }
            self.bindings.pop();
        }
        self.depth = self.depth.saturating_sub(1);
    }

    /// Enter a scope holding every declaration of `store`
    pub fn enter(&mut self, store: &AttributeStore) {
        self.push_scope();
        for decl in store.declarations() {
            match &decl.prefix {
                Some(p) => self.declare(p, &decl.uri),
                None => self.declare_default(&decl.uri),
            }
        }
    }

    /// Declare a namespace binding for the current scope
    pub fn declare(&mut self, prefix: &str, uri: &str) {
        // Don't allow redeclaring xml or xmlns
        if prefix == "xml" || prefix == "xmlns" {
            return;
        }

        self.bindings.push(NsBinding {
            prefix: Some(prefix.to_string()),
            uri: uri.to_string(),
            depth: self.depth,
        });
    }

    /// Declare the default namespace for current scope (empty undeclares it)
    pub fn declare_default(&mut self, uri: &str) {
        self.bindings.push(NsBinding {
            prefix: None,
            uri: uri.to_string(),
            depth: self.depth,
        });
    }

    fn lookup(&self, prefix: Option<&str>) -> Option<&str> {
        // Search from most recent to oldest
        self.bindings
            .iter()
            .rev()
            .find(|b| b.prefix.as_deref() == prefix)
            .map(|b| b.uri.as_str())
    }

    /// Resolve a prefix to a namespace URI
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        self.lookup(Some(prefix))
    }

    /// Resolve the default namespace; `None` when undeclared
    pub fn resolve_default(&self) -> Option<&str> {
        self.lookup(None).filter(|uri| !uri.is_empty())
    }

    /// Get current depth
    pub fn depth(&self) -> u16 {
        self.depth
    }

    /// Get all active namespace bindings at current scope
    pub fn active_bindings(&self) -> impl Iterator<Item = (Option<&str>, &str)> + '_ {
        // Return unique bindings (most recent for each prefix)
        let mut seen_prefixes = HashSet::new();
        self.bindings.iter().rev().filter_map(move |b| {
            if seen_prefixes.insert(b.prefix.as_deref()) {
                Some((b.prefix.as_deref(), b.uri.as_str()))
            } else {
                None
            }
        })
    }
}

// ============================================================================
// Per-element namespace operations
// ============================================================================

impl Element {
    /// Declare `prefix` (or the default namespace) on this element
    ///
    /// Fails when a name inside this element already relies on a different
    /// binding for the same prefix.
    pub fn declare_namespace(&mut self, prefix: Option<&str>, uri: &str) -> Result<()> {
        match prefix {
            Some("xml") if uri == ns::XML => return Ok(()),
            Some(p @ ("xml" | "xmlns")) => {
                return Err(ValueError::invalid_name(format!(
                    "prefix '{}' cannot be redeclared",
                    p
                )))
            }
            Some(p) if !is_ncname(p) => {
                return Err(ValueError::invalid_name(format!("'{}' is not a valid prefix", p)))
            }
            Some(p) if uri.is_empty() => {
                return Err(ValueError::invalid_name(format!(
                    "prefix '{}' cannot be bound to an empty namespace",
                    p
                )))
            }
            _ => {}
        }

        if let Some(bound) = find_conflict(self, prefix, uri, true) {
            return Err(ValueError::PrefixCollision {
                attribute: declaration_name(prefix),
                prefix: prefix.unwrap_or_default().to_string(),
                bound,
                requested: uri.to_string(),
            });
        }
        self.attributes.declare(prefix, uri);
        Ok(())
    }

    /// `add_attribute_in` for an element that is not nested in any other
    pub fn add_attribute(&mut self, name: &str, value: &str, namespace: Option<&str>) -> Result<()> {
        self.add_attribute_in(&NamespaceResolver::new(), name, value, namespace)
    }

    /// Add or update an attribute
    ///
    /// `scope` holds the bindings of the enclosing elements; it is only read,
    /// to resolve a prefix written in `name` when no namespace is given.
    /// Declarations are only ever added to this element.
    pub fn add_attribute_in(
        &mut self,
        scope: &NamespaceResolver,
        name: &str,
        value: &str,
        namespace: Option<&str>,
    ) -> Result<()> {
        let (prefix, local) = split_qualified(name);
        if local.is_empty() {
            return Err(ValueError::invalid_name("localname of the attribute cannot be empty"));
        }

        match namespace.filter(|uri| !uri.is_empty()) {
            None => match prefix {
                None if local == "xmlns" => self.declare_namespace(None, value),
                Some("xmlns") => self.declare_namespace(Some(local), value),
                None => {
                    check_local(local)?;
                    self.attributes.set(QName::local(local), value);
                    Ok(())
                }
                Some(p) => {
                    check_local(local)?;
                    let uri = self
                        .attributes
                        .declared(Some(p))
                        .or_else(|| scope.resolve(p))
                        .ok_or_else(|| {
                            ValueError::invalid_name(format!(
                                "prefix '{}' of attribute '{}' is not bound to a namespace",
                                p, name
                            ))
                        })?
                        .to_string();
                    self.attributes.set(QName::new(local, Some(&uri), Some(p)), value);
                    Ok(())
                }
            },
            Some(uri) if uri == ns::XMLNS => self.declare_namespace(Some(local), value),
            Some(uri) => {
                check_local(local)?;
                if let Some(existing) = self.attributes.get_mut(local, Some(uri)) {
                    existing.value = value.to_string();
                    return Ok(());
                }
                let prefix = self.prefix_for_attribute(scope, name, prefix, uri)?;
                self.attributes.set(QName::new(local, Some(uri), Some(&prefix)), value);
                Ok(())
            }
        }
    }

    /// Pick the prefix a new attribute in `uri` is written with
    fn prefix_for_attribute(
        &mut self,
        scope: &NamespaceResolver,
        name: &str,
        requested: Option<&str>,
        uri: &str,
    ) -> Result<String> {
        if let Some(p) = requested {
            if p == "xml" && uri == ns::XML {
                return Ok(p.to_string());
            }
            let collision = match self.attributes.declared(Some(p)) {
                Some(bound) if bound == uri => return Ok(p.to_string()),
                Some(bound) => Some(bound.to_string()),
                None if p == "xml" || p == "xmlns" => scope.resolve(p).map(str::to_string),
                // Shadowing an outer binding is only safe if nothing here uses it
                None => find_conflict(self, Some(p), uri, true),
            };
            if let Some(bound) = collision {
                return Err(ValueError::PrefixCollision {
                    attribute: name.to_string(),
                    prefix: p.to_string(),
                    bound,
                    requested: uri.to_string(),
                });
            }
            self.attributes.declare(Some(p), uri);
            return Ok(p.to_string());
        }

        if uri == ns::XML {
            return Ok("xml".to_string());
        }
        if let Some(p) = self.attributes.prefix_for(uri) {
            return Ok(p.to_string());
        }
        let p = self.allocate_prefix();
        self.attributes.declare(Some(&p), uri);
        Ok(p)
    }

    /// `get_attribute_in` for an element that is not nested in any other
    pub fn get_attribute(&self, name: &str, namespace: Option<&str>) -> String {
        self.get_attribute_in(&NamespaceResolver::new(), name, namespace)
    }

    /// Attribute value, or `""` when there is no such attribute
    ///
    /// `xmlns` and `xmlns:prefix` read the declarations made on this element.
    pub fn get_attribute_in(&self, scope: &NamespaceResolver, name: &str, namespace: Option<&str>) -> String {
        let (prefix, local) = split_qualified(name);
        if local.is_empty() {
            return String::new();
        }

        let found = match namespace.filter(|uri| !uri.is_empty()) {
            Some(uri) if uri == ns::XMLNS => self.attributes.declared(Some(local)),
            Some(uri) => self.attributes.get(local, Some(uri)).map(|a| a.value.as_str()),
            None => match prefix {
                None if local == "xmlns" => self.attributes.declared(None),
                None => self.attributes.get(local, None).map(|a| a.value.as_str()),
                Some("xmlns") => self.attributes.declared(Some(local)),
                Some(p) => self
                    .attributes
                    .declared(Some(p))
                    .or_else(|| scope.resolve(p))
                    .and_then(|uri| self.attributes.get(local, Some(uri)))
                    .map(|a| a.value.as_str()),
            },
        };
        found.unwrap_or_default().to_string()
    }

    /// Remove an attribute by local name and namespace, returning its value
    pub fn remove_attribute(&mut self, local: &str, namespace: Option<&str>) -> Option<String> {
        let namespace = namespace.filter(|uri| !uri.is_empty());
        if namespace == Some(ns::XMLNS) {
            return self.attributes.remove_declaration(Some(local)).map(|d| d.uri);
        }
        let index = self
            .attributes
            .attributes()
            .iter()
            .position(|a| a.name.local_name() == local && a.name.namespace() == namespace)?;
        self.attributes.remove_at(index).map(|a| a.value)
    }

    /// Synthesize a prefix not yet used anywhere in this subtree
    ///
    /// Candidates are `ns0`, `ns1`, ... drawn from this element's own counter,
    /// so the sequence depends only on what was done to this element.
    pub(crate) fn allocate_prefix(&mut self) -> String {
        let mut used = HashSet::new();
        collect_prefixes(self, &mut used);
        loop {
            let candidate = format!("ns{}", self.next_prefix);
            self.next_prefix += 1;
            if !used.contains(&candidate) {
                debug!(element = %self.name, prefix = %candidate, "synthesized namespace prefix");
                return candidate;
            }
        }
    }

    /// `set_children_in` for an element that is not nested in any other
    pub fn set_children(&mut self, children: Vec<MarkupNode>) {
        self.set_children_in(&NamespaceResolver::new(), children);
    }

    /// Replace all children
    ///
    /// Prefixes the new children use but that are not bound in `scope` or on
    /// this element are declared on this element. A prefix already bound to a
    /// different namespace is redeclared on the child that needs it, and a
    /// child whose default namespace differs from the one in effect declares
    /// its own.
    pub fn set_children_in(&mut self, scope: &NamespaceResolver, mut children: Vec<MarkupNode>) {
        let hoisted = reconcile(&mut children, scope, &self.attributes);
        for decl in hoisted {
            self.attributes.declare(decl.prefix.as_deref(), &decl.uri);
        }
        self.children = children;
    }

    /// Append children with the same namespace handling as `set_children_in`
    pub fn append_children_in(&mut self, scope: &NamespaceResolver, mut children: Vec<MarkupNode>) {
        let hoisted = reconcile(&mut children, scope, &self.attributes);
        for decl in hoisted {
            self.attributes.declare(decl.prefix.as_deref(), &decl.uri);
        }
        self.children.extend(children);
    }
}

fn declaration_name(prefix: Option<&str>) -> String {
    match prefix {
        Some(p) => format!("xmlns:{}", p),
        None => "xmlns".to_string(),
    }
}

fn check_local(local: &str) -> Result<()> {
    if is_ncname(local) {
        Ok(())
    } else {
        Err(ValueError::invalid_name(format!("'{}' is not a valid attribute name", local)))
    }
}

/// Namespace that a name in this subtree binds `prefix` to, if it is not `uri`
///
/// Descendants that declare the prefix themselves are not affected by a
/// declaration here and are skipped.
fn find_conflict(element: &Element, prefix: Option<&str>, uri: &str, top: bool) -> Option<String> {
    if !top && element.attributes.declared(prefix).is_some() {
        return None;
    }
    let conflicts = |name: &QName| name.prefix() == prefix && name.namespace().unwrap_or("") != uri;

    if conflicts(&element.name) {
        return Some(element.name.namespace().unwrap_or("").to_string());
    }
    if prefix.is_some() {
        if let Some(a) = element.attributes.attributes().iter().find(|a| conflicts(&a.name)) {
            return Some(a.name.namespace().unwrap_or("").to_string());
        }
    }
    element
        .children
        .iter()
        .filter_map(MarkupNode::as_element)
        .find_map(|child| find_conflict(child, prefix, uri, false))
}

fn collect_prefixes(element: &Element, used: &mut HashSet<String>) {
    if let Some(p) = element.name.prefix() {
        used.insert(p.to_string());
    }
    for decl in element.attributes.declarations() {
        if let Some(p) = &decl.prefix {
            used.insert(p.clone());
        }
    }
    for attr in element.attributes.attributes() {
        if let Some(p) = attr.name.prefix() {
            used.insert(p.to_string());
        }
    }
    for child in element.children.iter().filter_map(MarkupNode::as_element) {
        collect_prefixes(child, used);
    }
}

// ============================================================================
// Reconciliation
// ============================================================================

/// Walks a subtree and adds the declarations its names need
struct Reconciler {
    scope: NamespaceResolver,
    /// Bindings for prefixes that were unbound, to be declared on the parent
    hoisted: Vec<NamespaceDecl>,
}

impl Reconciler {
    fn lookup(&self, prefix: Option<&str>) -> Option<&str> {
        self.scope.lookup(prefix).or_else(|| {
            self.hoisted
                .iter()
                .find(|d| d.prefix.as_deref() == prefix)
                .map(|d| d.uri.as_str())
        })
    }

    fn element(&mut self, element: &mut Element) {
        self.scope.enter(&element.attributes);

        let namespace = element.name.namespace().unwrap_or("").to_string();
        match element.name.prefix().map(str::to_string) {
            Some(_) if namespace.is_empty() => element.name.set_prefix(None),
            Some(p) => {
                if let Some(replacement) = self.bind(element, &p, &namespace) {
                    element.name.set_prefix(Some(&replacement));
                }
            }
            None => {}
        }
        if element.name.prefix().is_none() && self.lookup(None).unwrap_or("") != namespace {
            debug!(element = %element.name, namespace = %namespace, "declaring default namespace on element");
            element.attributes.declare(None, &namespace);
            self.scope.declare_default(&namespace);
        }

        for index in 0..element.attributes.attributes().len() {
            let name = &element.attributes.attributes()[index].name;
            let (prefix, namespace) = (name.prefix().map(str::to_string), name.namespace().map(str::to_string));
            let replacement = match (prefix, namespace) {
                (_, None) => None,
                (Some(p), Some(uri)) => self.bind(element, &p, &uri),
                (None, Some(uri)) => Some(self.fresh_binding(element, &uri)),
            };
            let name = &mut element.attributes.attributes_mut()[index].name;
            if name.namespace().is_none() {
                name.set_prefix(None);
            } else if let Some(p) = replacement {
                name.set_prefix(Some(&p));
            }
        }

        for child in element.children.iter_mut() {
            if let MarkupNode::Element(child) = child {
                self.element(child);
            }
        }

        self.scope.pop_scope();
    }

    /// Make `prefix` resolve to `uri` at `element`; returns a replacement
    /// prefix when `prefix` cannot be used there
    fn bind(&mut self, element: &mut Element, prefix: &str, uri: &str) -> Option<String> {
        if prefix == "xml" || prefix == "xmlns" {
            return match self.scope.resolve(prefix) {
                Some(bound) if bound == uri => None,
                _ => Some(self.fresh_binding(element, uri)),
            };
        }

        match self.lookup(Some(prefix)) {
            Some(bound) if bound == uri => None,
            None => {
                debug!(prefix, namespace = uri, "attaching namespace declaration to parent");
                self.hoisted.push(NamespaceDecl {
                    prefix: Some(prefix.to_string()),
                    uri: uri.to_string(),
                });
                None
            }
            Some(_) if element.attributes.declared(Some(prefix)).is_none() => {
                debug!(element = %element.name, prefix, namespace = uri, "shadowing outer prefix binding");
                element.attributes.declare(Some(prefix), uri);
                self.scope.declare(prefix, uri);
                None
            }
            Some(_) => Some(self.fresh_binding(element, uri)),
        }
    }

    /// A prefix declared on `element` for `uri`, reusing an existing one
    fn fresh_binding(&mut self, element: &mut Element, uri: &str) -> String {
        if let Some(p) = element.attributes.prefix_for(uri) {
            return p.to_string();
        }
        let p = element.allocate_prefix();
        element.attributes.declare(Some(&p), uri);
        self.scope.declare(&p, uri);
        p
    }
}

/// Add the declarations `nodes` need to resolve under `outer` plus `parent`
///
/// Returns the declarations that belong on the parent itself.
fn reconcile(nodes: &mut [MarkupNode], outer: &NamespaceResolver, parent: &AttributeStore) -> Vec<NamespaceDecl> {
    let mut reconciler = Reconciler {
        scope: outer.clone(),
        hoisted: Vec::new(),
    };
    reconciler.scope.enter(parent);
    for node in nodes.iter_mut() {
        if let MarkupNode::Element(element) = node {
            reconciler.element(element);
        }
    }
    reconciler.hoisted
}

/// Copy of `node` that carries every declaration its names need
pub(crate) fn detach(node: &MarkupNode) -> MarkupNode {
    let mut copy = node.clone();
    if let MarkupNode::Element(element) = &mut copy {
        // Nothing encloses the copy, so undeclaring the default is a no-op
        if element.attributes.declared(None) == Some("") {
            element.attributes.remove_declaration(None);
        }
        let mut reconciler = Reconciler {
            scope: NamespaceResolver::new(),
            hoisted: Vec::new(),
        };
        reconciler.element(element);
        for decl in reconciler.hoisted {
            element.attributes.declare(decl.prefix.as_deref(), &decl.uri);
        }
    }
    copy
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> Element {
        Element::new(QName::local("root"))
    }

    #[test]
    fn test_default_namespaces() {
        let resolver = NamespaceResolver::new();
        assert_eq!(resolver.resolve("xml"), Some(ns::XML));
        assert_eq!(resolver.resolve_default(), None);
    }

    #[test]
    fn test_scope_pop() {
        let mut resolver = NamespaceResolver::new();
        resolver.push_scope();
        resolver.declare("foo", "http://example.com/foo");
        assert_eq!(resolver.resolve("foo"), Some("http://example.com/foo"));

        resolver.pop_scope();
        assert_eq!(resolver.resolve("foo"), None);
    }

    #[test]
    fn test_shadow_binding() {
        let mut resolver = NamespaceResolver::new();
        resolver.push_scope();
        resolver.declare("ns", "http://example.com/ns1");
        resolver.declare_default("http://example.com/d");

        resolver.push_scope();
        resolver.declare("ns", "http://example.com/ns2");
        resolver.declare_default("");
        assert_eq!(resolver.resolve("ns"), Some("http://example.com/ns2"));
        assert_eq!(resolver.resolve_default(), None);

        resolver.pop_scope();
        assert_eq!(resolver.resolve("ns"), Some("http://example.com/ns1"));
        assert_eq!(resolver.resolve_default(), Some("http://example.com/d"));
        assert_eq!(resolver.active_bindings().count(), 4);
    }

    #[test]
    fn test_xml_prefix_not_redeclared() {
        let mut resolver = NamespaceResolver::new();
        resolver.push_scope();
        resolver.declare("xml", "http://other");
        assert_eq!(resolver.resolve("xml"), Some(ns::XML));
    }

    #[test]
    fn test_plain_attribute() {
        let mut e = root();
        e.add_attribute("foo", "bar", None).unwrap();
        assert_eq!(e.get_attribute("foo", None), "bar");
        assert_eq!(e.get_attribute("missing", None), "");
        assert!(e.attributes().declarations().is_empty());
    }

    #[test]
    fn test_empty_localname() {
        let mut e = root();
        let err = e.add_attribute("", "bar", None).unwrap_err();
        assert_eq!(err.to_string(), "invalid name: localname of the attribute cannot be empty");
        let err = e.add_attribute("p:", "bar", Some("http://x")).unwrap_err();
        assert!(matches!(err, ValueError::InvalidName { .. }));
        assert_eq!(e.get_attribute("", None), "");
    }

    #[test]
    fn test_fresh_root_synthesizes_one_prefix() {
        let mut e = root();
        e.add_attribute("foo", "bar", Some("http://example.com")).unwrap();
        let decls = e.attributes().declarations();
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].prefix.as_deref(), Some("ns0"));
        assert_eq!(e.attributes().attributes()[0].name.lexical(), "ns0:foo");
        assert_eq!(e.get_attribute("foo", Some("http://example.com")), "bar");
        assert_eq!(e.get_attribute("xmlns:ns0", None), "http://example.com");
    }

    #[test]
    fn test_reuses_bound_prefix() {
        let mut e = root();
        e.declare_namespace(Some("ns4"), "http://f").unwrap();
        e.declare_namespace(Some("ns5"), "http://f").unwrap();
        e.add_attribute("foo", "bar", Some("http://f")).unwrap();
        assert_eq!(e.attributes().attributes()[0].name.lexical(), "ns4:foo");
        assert_eq!(e.attributes().declarations().len(), 2);
    }

    #[test]
    fn test_requested_prefix_collision() {
        let mut e = root();
        e.declare_namespace(Some("a"), "yyy").unwrap();
        let err = e.add_attribute("a:text", "hello", Some("zzz")).unwrap_err();
        match err {
            ValueError::PrefixCollision { prefix, bound, requested, .. } => {
                assert_eq!(prefix, "a");
                assert_eq!(bound, "yyy");
                assert_eq!(requested, "zzz");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        // Nothing changed
        assert!(e.attributes().attributes().is_empty());
    }

    #[test]
    fn test_requested_prefix_declared() {
        let mut e = root();
        e.add_attribute("pre:foo", "bar", Some("http://x")).unwrap();
        assert_eq!(e.attributes().declared(Some("pre")), Some("http://x"));
        assert_eq!(e.get_attribute("pre:foo", None), "bar");
    }

    #[test]
    fn test_synthesized_prefixes_distinct() {
        let mut e = root();
        e.declare_namespace(Some("ns1"), "http://taken").unwrap();
        e.add_attribute("a", "1", Some("http://one")).unwrap();
        e.add_attribute("b", "2", Some("http://two")).unwrap();
        e.add_attribute("c", "3", Some("http://three")).unwrap();
        let prefixes: Vec<_> = e
            .attributes()
            .attributes()
            .iter()
            .map(|a| a.name.prefix().unwrap().to_string())
            .collect();
        assert_eq!(prefixes, ["ns0", "ns2", "ns3"]);
    }

    #[test]
    fn test_update_existing_attribute() {
        let mut e = root();
        e.add_attribute("foo", "1", Some("http://x")).unwrap();
        e.add_attribute("foo", "2", Some("http://x")).unwrap();
        e.add_attribute("foo", "3", Some("http://y")).unwrap();
        assert_eq!(e.attributes().attributes().len(), 2);
        assert_eq!(e.get_attribute("foo", Some("http://x")), "2");
        assert_eq!(e.get_attribute("foo", Some("http://y")), "3");
    }

    #[test]
    fn test_namespace_declaration_as_attribute() {
        let mut e = root();
        e.add_attribute("xmlns:ns4", "http://wso2.com", None).unwrap();
        e.add_attribute("foo1", "http://other", Some(ns::XMLNS)).unwrap();
        assert_eq!(e.attributes().declared(Some("ns4")), Some("http://wso2.com"));
        assert_eq!(e.attributes().declared(Some("foo1")), Some("http://other"));
        assert!(e.attributes().attributes().is_empty());
    }

    #[test]
    fn test_rebinding_used_prefix_fails() {
        let mut e = root();
        e.add_attribute("p:foo", "bar", Some("http://one")).unwrap();
        assert!(e.add_attribute("xmlns:p", "http://two", None).is_err());
        e.declare_namespace(Some("q"), "http://unused").unwrap();
        e.add_attribute("xmlns:q", "http://rebound", None).unwrap();
        assert_eq!(e.get_attribute("xmlns:q", None), "http://rebound");
    }

    #[test]
    fn test_prefixed_name_resolves_through_scope() {
        let mut scope = NamespaceResolver::new();
        scope.push_scope();
        scope.declare("ns0", "http://outer");
        let mut e = root();
        e.add_attribute_in(&scope, "ns0:foo", "bar", None).unwrap();
        assert_eq!(e.get_attribute("foo", Some("http://outer")), "bar");
        assert_eq!(e.get_attribute_in(&scope, "ns0:foo", None), "bar");
        assert!(e.add_attribute("zz:foo", "bar", None).is_err());
    }

    #[test]
    fn test_shadowing_used_outer_prefix_fails() {
        let mut scope = NamespaceResolver::new();
        scope.push_scope();
        scope.declare("p", "http://outer");
        let mut e = Element::new(QName::new("root", Some("http://outer"), Some("p")));
        let err = e.add_attribute_in(&scope, "p:foo", "bar", Some("http://inner")).unwrap_err();
        assert!(matches!(err, ValueError::PrefixCollision { .. }));
    }

    #[test]
    fn test_remove_attribute() {
        let mut e = root();
        e.add_attribute("a", "1", None).unwrap();
        assert_eq!(e.remove_attribute("a", None), Some("1".to_string()));
        assert_eq!(e.remove_attribute("a", None), None);
    }

    #[test]
    fn test_set_children_hoists_unbound_prefix() {
        let mut parent = Element::new(QName::new("name", Some("http://test"), Some("ns0")));
        parent.declare_namespace(Some("ns0"), "http://test").unwrap();
        let child = Element::new(QName::new("residency", Some("http://code"), Some("pre")));
        parent.set_children(vec![child.into()]);
        assert_eq!(parent.attributes().declared(Some("pre")), Some("http://code"));
        let child = parent.children()[0].as_element().unwrap();
        assert!(child.attributes().declarations().is_empty());
    }

    #[test]
    fn test_set_children_shadows_rebound_prefix() {
        let mut parent = Element::new(QName::new("name", Some("http://test"), Some("ns0")));
        parent.declare_namespace(Some("ns0"), "http://test").unwrap();
        let mut child = Element::new(QName::new("residency", Some("http://code"), Some("ns0")));
        child.attributes.set(QName::new("citizen", Some("http://code"), Some("ns0")), "true");
        parent.set_children(vec![child.into()]);
        assert_eq!(parent.attributes().declarations().len(), 1);
        let child = parent.children()[0].as_element().unwrap();
        assert_eq!(child.attributes().declared(Some("ns0")), Some("http://code"));
    }

    #[test]
    fn test_set_children_default_namespace() {
        let mut parent = Element::new(QName::new("root", Some("http://test"), None));
        parent.declare_namespace(None, "http://test").unwrap();
        let same = Element::new(QName::new("fname", Some("http://test"), None));
        let plain = Element::new(QName::local("residency"));
        parent.set_children(vec![same.into(), plain.into()]);
        let children: Vec<&Element> = parent.children().iter().filter_map(MarkupNode::as_element).collect();
        assert!(children[0].attributes().declarations().is_empty());
        assert_eq!(children[1].attributes().declared(None), Some(""));
    }

    #[test]
    fn test_detach_carries_declarations() {
        let inner = Element::new(QName::new("b", Some("http://b"), Some("p")))
            .with_child(MarkupNode::Element(Element::new(QName::new("c", Some("http://d"), None))));
        let node = detach(&MarkupNode::Element(inner));
        let element = node.as_element().unwrap();
        assert_eq!(element.attributes().declared(Some("p")), Some("http://b"));
        let child = element.children()[0].as_element().unwrap();
        assert_eq!(child.attributes().declared(None), Some("http://d"));
    }

    #[test]
    fn test_detach_drops_empty_default_at_top() {
        let plain = Element::new(QName::local("plain"))
            .with_child(MarkupNode::Element(Element::new(QName::new("d", Some("http://d"), None))));
        let mut outer = Element::new(QName::new("r", Some("http://d"), None));
        outer.declare_namespace(None, "http://d").unwrap();
        outer.set_children(vec![plain.into()]);
        let parsed = &outer.children()[0];
        assert_eq!(parsed.as_element().unwrap().attributes().declared(None), Some(""));

        let node = detach(parsed);
        let element = node.as_element().unwrap();
        assert!(element.attributes().declarations().is_empty());
        let child = element.children()[0].as_element().unwrap();
        assert_eq!(child.attributes().declared(None), Some("http://d"));
    }

    #[test]
    fn test_for_path() {
        let mut outer = root();
        outer.declare_namespace(Some("a"), "http://a").unwrap();
        let mut middle = Element::new(QName::local("middle"));
        middle.declare_namespace(Some("b"), "http://b").unwrap();
        let mut leaf = Element::new(QName::local("leaf"));
        leaf.declare_namespace(Some("c"), "http://c").unwrap();
        let tree = MarkupNode::Element(outer.with_child(MarkupNode::Element(middle.with_child(leaf.into()))));

        let scope = NamespaceResolver::for_path(&tree, &[0, 0]);
        assert_eq!(scope.resolve("a"), Some("http://a"));
        assert_eq!(scope.resolve("b"), Some("http://b"));
        assert_eq!(scope.resolve("c"), None);
    }
}
