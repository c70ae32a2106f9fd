//! Attribute Store
//!
//! Ordered attributes of one element, together with the namespace
//! declarations made on it. Declarations are kept apart from ordinary
//! attributes and always come first when iterated or serialized.

use super::namespace::ns;
use super::node::QName;
use indexmap::IndexMap;

/// An attribute with its resolved name
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

/// A namespace declaration: `xmlns="uri"` or `xmlns:prefix="uri"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    /// `None` for the default namespace
    pub prefix: Option<String>,
    /// Empty when the default namespace is undeclared (`xmlns=""`)
    pub uri: String,
}

impl NamespaceDecl {
    /// Attribute name this declaration is written as
    pub fn attribute_name(&self) -> String {
        match &self.prefix {
            Some(p) => format!("xmlns:{}", p),
            None => "xmlns".to_string(),
        }
    }
}

/// One entry of the store, in iteration order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StoreEntry<'a> {
    Declaration(&'a NamespaceDecl),
    Attribute(&'a Attribute),
}

/// Ordered qualified-name to string mapping of one element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeStore {
    declarations: Vec<NamespaceDecl>,
    attributes: Vec<Attribute>,
}

impl AttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attributes plus declarations
    pub fn len(&self) -> usize {
        self.declarations.len() + self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty() && self.attributes.is_empty()
    }

    pub fn declarations(&self) -> &[NamespaceDecl] {
        &self.declarations
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Declarations first, then attributes, each in insertion order
    pub fn iter(&self) -> impl Iterator<Item = StoreEntry<'_>> {
        self.declarations
            .iter()
            .map(StoreEntry::Declaration)
            .chain(self.attributes.iter().map(StoreEntry::Attribute))
    }

    /// URI declared on this element for `prefix` (`None` = default namespace)
    pub fn declared(&self, prefix: Option<&str>) -> Option<&str> {
        self.declarations
            .iter()
            .find(|d| d.prefix.as_deref() == prefix)
            .map(|d| d.uri.as_str())
    }

    /// First non-default prefix declared on this element for `uri`
    pub fn prefix_for(&self, uri: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|d| d.prefix.is_some() && d.uri == uri)
            .and_then(|d| d.prefix.as_deref())
    }

    /// Add or rebind a declaration, keeping its position when it already exists
    pub(crate) fn declare(&mut self, prefix: Option<&str>, uri: &str) {
        match self.declarations.iter_mut().find(|d| d.prefix.as_deref() == prefix) {
            Some(existing) => existing.uri = uri.to_string(),
            None => self.declarations.push(NamespaceDecl {
                prefix: prefix.map(str::to_string),
                uri: uri.to_string(),
            }),
        }
    }

    pub(crate) fn remove_declaration(&mut self, prefix: Option<&str>) -> Option<NamespaceDecl> {
        let index = self
            .declarations
            .iter()
            .position(|d| d.prefix.as_deref() == prefix)?;
        Some(self.declarations.remove(index))
    }

    /// Attribute identified by local name and namespace
    pub fn get(&self, local: &str, namespace: Option<&str>) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|a| a.name.local_name() == local && a.name.namespace() == namespace)
    }

    pub(crate) fn get_mut(&mut self, local: &str, namespace: Option<&str>) -> Option<&mut Attribute> {
        self.attributes
            .iter_mut()
            .find(|a| a.name.local_name() == local && a.name.namespace() == namespace)
    }

    /// Update the value of the attribute with the same identity, or append it
    pub(crate) fn set(&mut self, name: QName, value: &str) {
        match self.get_mut(name.local_name(), name.namespace()) {
            Some(existing) => existing.value = value.to_string(),
            None => self.attributes.push(Attribute {
                name,
                value: value.to_string(),
            }),
        }
    }

    pub(crate) fn remove_at(&mut self, index: usize) -> Option<Attribute> {
        if index < self.attributes.len() {
            Some(self.attributes.remove(index))
        } else {
            None
        }
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut [Attribute] {
        &mut self.attributes
    }

    /// Whether any attribute on this element is written with `prefix`
    pub fn uses_prefix(&self, prefix: &str) -> bool {
        self.attributes.iter().any(|a| a.name.prefix() == Some(prefix))
    }

    /// Attributes and declarations keyed by expanded name
    ///
    /// Declarations appear as `{http://www.w3.org/2000/xmlns/}prefix`, the
    /// default declaration as `{http://www.w3.org/2000/xmlns/}xmlns`.
    pub fn to_map(&self) -> IndexMap<String, String> {
        let mut map = IndexMap::with_capacity(self.len());
        for entry in self.iter() {
            match entry {
                StoreEntry::Declaration(d) => {
                    let local = d.prefix.as_deref().unwrap_or("xmlns");
                    map.insert(format!("{{{}}}{}", ns::XMLNS, local), d.uri.clone());
                }
                StoreEntry::Attribute(a) => {
                    map.insert(a.name.expanded(), a.value.clone());
                }
            }
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declarations_come_first() {
        let mut store = AttributeStore::new();
        store.set(QName::local("test"), "5");
        store.declare(Some("ns0"), "http://example.com");
        let names: Vec<String> = store
            .iter()
            .map(|entry| match entry {
                StoreEntry::Declaration(d) => d.attribute_name(),
                StoreEntry::Attribute(a) => a.name.lexical(),
            })
            .collect();
        assert_eq!(names, ["xmlns:ns0", "test"]);
    }

    #[test]
    fn test_set_updates_in_place() {
        let mut store = AttributeStore::new();
        store.set(QName::local("a"), "1");
        store.set(QName::local("b"), "2");
        store.set(QName::local("a"), "3");
        assert_eq!(store.attributes().len(), 2);
        assert_eq!(store.attributes()[0].value, "3");
    }

    #[test]
    fn test_identity_includes_namespace() {
        let mut store = AttributeStore::new();
        store.set(QName::local("a"), "plain");
        store.set(QName::new("a", Some("http://x"), Some("p")), "qualified");
        assert_eq!(store.get("a", None).unwrap().value, "plain");
        assert_eq!(store.get("a", Some("http://x")).unwrap().value, "qualified");
        assert!(store.uses_prefix("p"));
    }

    #[test]
    fn test_declare_rebinds_in_place() {
        let mut store = AttributeStore::new();
        store.declare(Some("a"), "http://one");
        store.declare(None, "http://default");
        store.declare(Some("a"), "http://two");
        assert_eq!(store.declarations().len(), 2);
        assert_eq!(store.declared(Some("a")), Some("http://two"));
        assert_eq!(store.declared(None), Some("http://default"));
        assert_eq!(store.prefix_for("http://two"), Some("a"));
        assert_eq!(store.prefix_for("http://default"), None);
    }

    #[test]
    fn test_to_map() {
        let mut store = AttributeStore::new();
        store.declare(Some("ns0"), "http://x");
        store.set(QName::new("a", Some("http://x"), Some("ns0")), "1");
        store.set(QName::local("b"), "2");
        let map = store.to_map();
        let keys: Vec<&String> = map.keys().collect();
        assert_eq!(keys, ["{http://www.w3.org/2000/xmlns/}ns0", "{http://x}a", "b"]);
    }
}
