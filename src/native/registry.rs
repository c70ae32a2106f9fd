//! Native Operation Registry
//!
//! Built explicitly at startup: every operation is registered under its
//! namespace, name and arity. Invocation is the single boundary where host
//! failures, including panics, turn into `ValueError::Native`.

use super::function::{NativeArgs, NativeFunction};
use crate::config::RuntimeConfig;
use crate::error::{Result, ValueError};
use crate::value::Value;
use crate::xpath::SelectorCache;
use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, trace, warn};

type FunctionKey = (String, String, usize);

/// Registry of native operations
pub struct NativeRegistry {
    functions: HashMap<FunctionKey, NativeFunction>,
    selectors: Arc<SelectorCache>,
    config: RuntimeConfig,
}

impl Default for NativeRegistry {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

impl NativeRegistry {
    /// Empty registry
    pub fn new(config: RuntimeConfig) -> Self {
        NativeRegistry {
            functions: HashMap::new(),
            selectors: Arc::new(SelectorCache::new(config.selector_cache_capacity)),
            config,
        }
    }

    /// Registry holding the standard library with default configuration
    pub fn with_builtins() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Registry holding the standard library
    pub fn with_config(config: RuntimeConfig) -> Self {
        let mut registry = Self::new(config);
        super::builtins::register_all(&mut registry);
        debug!(count = registry.len(), "registered builtin native operations");
        registry
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Selector cache shared by every operation of this registry
    pub fn selectors(&self) -> &Arc<SelectorCache> {
        &self.selectors
    }

    /// Add an operation, replacing one with the same namespace, name and arity
    pub fn register(&mut self, function: NativeFunction) {
        let key = (function.namespace.clone(), function.name.clone(), function.arity());
        if self.functions.insert(key, function).is_some() {
            debug!("replaced a registered native operation");
        }
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn contains(&self, namespace: &str, name: &str, arity: usize) -> bool {
        self.functions
            .contains_key(&(namespace.to_string(), name.to_string(), arity))
    }

    /// Registered operation for a call with `arity` arguments
    pub fn lookup(&self, namespace: &str, name: &str, arity: usize) -> Result<&NativeFunction> {
        let key = (namespace.to_string(), name.to_string(), arity);
        if let Some(function) = self.functions.get(&key) {
            return Ok(function);
        }

        let mut arities: Vec<usize> = self
            .functions
            .values()
            .filter(|f| f.namespace == namespace && f.name == name)
            .map(NativeFunction::arity)
            .collect();
        if arities.is_empty() {
            return Err(ValueError::schema(format!(
                "unknown native operation '{}:{}'",
                namespace, name
            )));
        }
        arities.sort_unstable();
        let expected: Vec<String> = arities.iter().map(usize::to_string).collect();
        Err(ValueError::schema(format!(
            "'{}:{}' takes {} argument(s), got {}",
            namespace,
            name,
            expected.join(" or "),
            arity
        )))
    }

    /// Call an operation with positional arguments
    pub fn invoke(&self, namespace: &str, name: &str, args: &[Value]) -> Result<Value> {
        let function = self.lookup(namespace, name, args.len())?;
        let operation = function.qualified_name();
        trace!(operation = %operation, arity = args.len(), "native call");

        let call_args = NativeArgs::new(&operation, args);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| (function.func)(&call_args)));
        match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => {
                warn!(operation = %operation, error = %source, "native call failed");
                Err(ValueError::Native {
                    message: source.to_string(),
                    operation,
                    source: Some(source),
                })
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(operation = %operation, error = %message, "native call panicked");
                Err(ValueError::Native {
                    operation,
                    message,
                    source: None,
                })
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {}", message)
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueKind;

    fn registry() -> NativeRegistry {
        let mut registry = NativeRegistry::default();
        registry.register(NativeFunction::new(
            "lang.test",
            "double",
            vec![ValueKind::Integer],
            ValueKind::Integer,
            |args| Ok(Value::Integer(args.integer(0)? * 2)),
        ));
        registry.register(NativeFunction::new("lang.test", "fail", vec![], ValueKind::Any, |_| {
            Err("host exploded".into())
        }));
        registry.register(NativeFunction::new("lang.test", "panic", vec![], ValueKind::Any, |_| {
            panic!("boom")
        }));
        registry
    }

    #[test]
    fn test_invoke() {
        let registry = registry();
        assert_eq!(
            registry.invoke("lang.test", "double", &[Value::Integer(21)]).unwrap(),
            Value::Integer(42)
        );
    }

    #[test]
    fn test_unknown_and_arity() {
        let registry = registry();
        let err = registry.invoke("lang.test", "nope", &[]).unwrap_err();
        assert!(matches!(err, ValueError::Schema { .. }));

        let err = registry.invoke("lang.test", "double", &[]).unwrap_err();
        assert_eq!(err.to_string(), "schema error: 'lang.test:double' takes 1 argument(s), got 0");
    }

    #[test]
    fn test_host_error_wrapped() {
        let registry = registry();
        let err = registry.invoke("lang.test", "fail", &[]).unwrap_err();
        match &err {
            ValueError::Native { operation, message, source } => {
                assert_eq!(operation, "lang.test:fail");
                assert_eq!(message, "host exploded");
                assert!(source.is_some());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().starts_with("native operation 'lang.test:fail' failed"));
    }

    #[test]
    fn test_value_error_is_the_cause() {
        let registry = registry();
        let err = registry.invoke("lang.test", "double", &[Value::from("x")]).unwrap_err();
        assert!(matches!(err.native_cause(), Some(ValueError::TypeMismatch { .. })));
    }

    #[test]
    fn test_panic_caught() {
        let registry = registry();
        let err = registry.invoke("lang.test", "panic", &[]).unwrap_err();
        assert!(matches!(&err, ValueError::Native { message, .. } if message == "panicked: boom"));
    }
}
