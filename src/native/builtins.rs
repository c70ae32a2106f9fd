//! Standard Library Operations
//!
//! Markup, document and string operations registered by
//! `NativeRegistry::with_builtins`. Operations that change markup return the
//! changed value and leave the argument untouched.

use super::function::{NativeArgs, NativeFunction, NativeResult};
use super::registry::NativeRegistry;
use crate::convert::{to_document, to_markup, ToDocumentOptions, ToMarkupOptions};
use crate::dom::{ElementFilter, Markup};
use crate::error::{Result, ValueError};
use crate::value::{Value, ValueKind, ValueMap};
use crate::xpath::{Selector, SelectorCache};
use std::sync::Arc;

use ValueKind::{Array, Boolean, Document, Integer, Markup as MarkupKind, String as Str, Struct};

const XML: &str = "lang.xml";
const JSON: &str = "lang.json";
const STRING: &str = "lang.string";

pub(super) fn register_all(registry: &mut NativeRegistry) {
    register_conversions(registry);
    register_structure(registry);
    register_attributes(registry);
    register_selectors(registry);
    register_strings(registry);
}

fn register(
    registry: &mut NativeRegistry,
    namespace: &str,
    name: &str,
    params: Vec<ValueKind>,
    returns: ValueKind,
    f: impl Fn(&NativeArgs<'_>) -> NativeResult + Send + Sync + 'static,
) {
    registry.register(NativeFunction::new(namespace, name, params, returns, f));
}

/// Copy of the markup argument at `index` with `edit` applied
fn edited(args: &NativeArgs<'_>, index: usize, edit: impl FnOnce(&mut Markup) -> Result<()>) -> NativeResult {
    let mut markup = args.markup(index)?.clone();
    edit(&mut markup)?;
    Ok(Value::markup(markup))
}

/// `""` stands for "no namespace"
fn namespace_arg<'a>(args: &NativeArgs<'a>, index: usize) -> Result<Option<&'a str>> {
    let namespace = args.string(index)?;
    Ok((!namespace.is_empty()).then_some(namespace))
}

/// `""` and `*` match every element
fn filter_arg(args: &NativeArgs<'_>, index: usize) -> Result<ElementFilter> {
    let filter = args.string(index)?;
    Ok(if filter.is_empty() {
        ElementFilter::any()
    } else {
        ElementFilter::parse(filter)
    })
}

fn selector_arg(cache: &SelectorCache, args: &NativeArgs<'_>, index: usize) -> Result<Arc<Selector>> {
    cache.get_or_compile(args.string(index)?)
}

// ============================================================================
// Conversions
// ============================================================================

fn register_conversions(registry: &mut NativeRegistry) {
    let document_defaults = registry.config().to_document.clone();
    register(registry, XML, "toDocument", vec![MarkupKind], Document, move |args| {
        Ok(Value::document(to_document(args.markup(0)?, &document_defaults)))
    });
    register(registry, XML, "toDocument", vec![MarkupKind, Struct], Document, |args| {
        let options = ToDocumentOptions::from_struct(args.structure(1)?)?;
        Ok(Value::document(to_document(args.markup(0)?, &options)))
    });

    let markup_defaults = registry.config().to_markup.clone();
    register(registry, JSON, "toXml", vec![Document], MarkupKind, move |args| {
        Ok(Value::markup(to_markup(args.document(0)?, &markup_defaults)?))
    });
    register(registry, JSON, "toXml", vec![Document, Struct], MarkupKind, |args| {
        let options = ToMarkupOptions::from_struct(args.structure(1)?)?;
        Ok(Value::markup(to_markup(args.document(0)?, &options)?))
    });
}

// ============================================================================
// Structure
// ============================================================================

fn register_structure(registry: &mut NativeRegistry) {
    register(registry, XML, "isSingleton", vec![MarkupKind], Boolean, |args| {
        Ok(Value::Boolean(args.markup(0)?.is_singleton()))
    });
    register(registry, XML, "isEmpty", vec![MarkupKind], Boolean, |args| {
        Ok(Value::Boolean(args.markup(0)?.is_empty()))
    });
    register(registry, XML, "getItemType", vec![MarkupKind], Str, |args| {
        Ok(Value::from(args.markup(0)?.item_type()))
    });
    register(registry, XML, "getElementName", vec![MarkupKind], Str, |args| {
        Ok(Value::from(args.markup(0)?.element_name()?))
    });
    register(registry, XML, "getTextValue", vec![MarkupKind], Str, |args| {
        Ok(Value::from(args.markup(0)?.text_value()?))
    });
    register(registry, XML, "setTextValue", vec![MarkupKind, Str], MarkupKind, |args| {
        let text = args.string(1)?;
        edited(args, 0, |markup| markup.set_text(text))
    });
    register(registry, XML, "children", vec![MarkupKind], MarkupKind, |args| {
        Ok(Value::markup(args.markup(0)?.children()))
    });
    register(registry, XML, "elements", vec![MarkupKind, Str], MarkupKind, |args| {
        Ok(Value::markup(args.markup(0)?.elements(&filter_arg(args, 1)?)))
    });
    register(registry, XML, "selectChildren", vec![MarkupKind, Str], MarkupKind, |args| {
        Ok(Value::markup(args.markup(0)?.select_children(&filter_arg(args, 1)?)))
    });
    register(registry, XML, "selectDescendants", vec![MarkupKind, Str], MarkupKind, |args| {
        Ok(Value::markup(args.markup(0)?.select_descendants(&filter_arg(args, 1)?)))
    });
    register(registry, XML, "setChildren", vec![MarkupKind, MarkupKind], MarkupKind, |args| {
        let children = args.markup(1)?.clone();
        edited(args, 0, |markup| markup.set_children(children))
    });
    register(registry, XML, "slice", vec![MarkupKind, Integer, Integer], MarkupKind, |args| {
        let sliced = args.markup(0)?.slice(args.integer(1)?, args.integer(2)?)?;
        Ok(Value::markup(sliced))
    });
    register(registry, XML, "strip", vec![MarkupKind, Boolean, Boolean], MarkupKind, |args| {
        let stripped = args.markup(0)?.strip(args.boolean(1)?, args.boolean(2)?);
        Ok(Value::markup(stripped))
    });
    register(registry, XML, "copy", vec![MarkupKind], MarkupKind, |args| {
        Ok(Value::markup(args.markup(0)?.clone()))
    });
    register(registry, XML, "concat", vec![Array], MarkupKind, |args| {
        let mut parts = Vec::new();
        for (position, item) in args.array(0)?.iter().enumerate() {
            match item {
                Value::Markup(markup) => parts.push(markup.as_ref().clone()),
                other => {
                    return Err(ValueError::mismatch(
                        format!("concatenate item {} of", position),
                        other.kind().name(),
                    )
                    .into())
                }
            }
        }
        Ok(Value::markup(Markup::concat(parts)))
    });
}

// ============================================================================
// Attributes
// ============================================================================

fn register_attributes(registry: &mut NativeRegistry) {
    register(registry, XML, "getAttribute", vec![MarkupKind, Str, Str], Str, |args| {
        let value = args.markup(0)?.get_attribute(args.string(1)?, namespace_arg(args, 2)?)?;
        Ok(Value::from(value))
    });
    register(registry, XML, "setAttribute", vec![MarkupKind, Str, Str, Str], MarkupKind, |args| {
        let name = args.string(1)?;
        let namespace = namespace_arg(args, 2)?;
        let value = args.string(3)?;
        edited(args, 0, |markup| markup.add_attribute(name, value, namespace))
    });
    register(registry, XML, "getAttributes", vec![MarkupKind], ValueKind::Map, |args| {
        let map: ValueMap = args
            .markup(0)?
            .attributes_map()?
            .into_iter()
            .map(|(name, value)| (name, Value::from(value)))
            .collect();
        Ok(Value::map(map))
    });
}

// ============================================================================
// Selectors
// ============================================================================

fn register_selectors(registry: &mut NativeRegistry) {
    let cache = Arc::clone(registry.selectors());
    register(registry, XML, "select", vec![MarkupKind, Str], MarkupKind, move |args| {
        let selector = selector_arg(&cache, args, 1)?;
        Ok(Value::markup(args.markup(0)?.select(&selector)?))
    });

    let cache = Arc::clone(registry.selectors());
    register(registry, XML, "getString", vec![MarkupKind, Str], Str, move |args| {
        let selector = selector_arg(&cache, args, 1)?;
        Ok(Value::from(args.markup(0)?.select_string(&selector)?))
    });

    let cache = Arc::clone(registry.selectors());
    register(registry, XML, "setString", vec![MarkupKind, Str, Str], MarkupKind, move |args| {
        let selector = selector_arg(&cache, args, 1)?;
        let text = args.string(2)?;
        edited(args, 0, |markup| markup.set_text_at(&selector, text))
    });

    let cache = Arc::clone(registry.selectors());
    register(registry, XML, "getXml", vec![MarkupKind, Str], MarkupKind, move |args| {
        let selector = selector_arg(&cache, args, 1)?;
        Ok(Value::markup(args.markup(0)?.select_markup(&selector)?))
    });

    let cache = Arc::clone(registry.selectors());
    register(registry, XML, "setXml", vec![MarkupKind, Str, MarkupKind], MarkupKind, move |args| {
        let selector = selector_arg(&cache, args, 1)?;
        let children = args.markup(2)?;
        edited(args, 0, |markup| markup.set_children_at(&selector, children))
    });

    let cache = Arc::clone(registry.selectors());
    register(registry, XML, "addElement", vec![MarkupKind, Str, MarkupKind], MarkupKind, move |args| {
        let selector = selector_arg(&cache, args, 1)?;
        let children = args.markup(2)?;
        edited(args, 0, |markup| markup.add_element_at(&selector, children))
    });

    let cache = Arc::clone(registry.selectors());
    register(
        registry,
        XML,
        "addAttribute",
        vec![MarkupKind, Str, Str, Str, Str],
        MarkupKind,
        move |args| {
            let selector = selector_arg(&cache, args, 1)?;
            let name = args.string(2)?;
            let value = args.string(3)?;
            let namespace = namespace_arg(args, 4)?;
            edited(args, 0, |markup| markup.add_attribute_at(&selector, name, value, namespace))
        },
    );

    let cache = Arc::clone(registry.selectors());
    register(registry, XML, "remove", vec![MarkupKind, Str], MarkupKind, move |args| {
        let selector = selector_arg(&cache, args, 1)?;
        edited(args, 0, |markup| markup.remove_at(&selector))
    });
}

// ============================================================================
// Strings
// ============================================================================

fn register_strings(registry: &mut NativeRegistry) {
    register(registry, STRING, "toLowerCase", vec![Str], Str, |args| {
        Ok(Value::from(args.string(0)?.to_lowercase()))
    });
    register(registry, STRING, "toUpperCase", vec![Str], Str, |args| {
        Ok(Value::from(args.string(0)?.to_uppercase()))
    });
}
