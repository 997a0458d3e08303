//! Interface name to binding factory mapping.

use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use ton_abi_codegen::{build_model, BindingModel};
use ton_abi_resolver::InterfaceGraph;
use ton_abi_schema::SchemaDocument;

use crate::address::Address;
use crate::binding::ContractBinding;
use crate::runtime::ContractRuntime;
use crate::target::ConformanceTarget;

type Factory =
    Arc<dyn Fn(Address, Arc<dyn ContractRuntime>) -> Box<dyn ConformanceTarget> + Send + Sync>;

/// Built once, then only read. Iteration follows registration order, which
/// is the order detection tries interfaces in.
#[derive(Clone, Default)]
pub struct BindingRegistry {
    factories: IndexMap<String, Factory>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory. Registering an existing name replaces its factory
    /// and keeps its position.
    pub fn register<F>(&mut self, interface: &str, factory: F)
    where
        F: Fn(Address, Arc<dyn ContractRuntime>) -> Box<dyn ConformanceTarget>
            + Send
            + Sync
            + 'static,
    {
        if self
            .factories
            .insert(interface.to_string(), Arc::new(factory))
            .is_some()
        {
            debug!(interface, "replaced binding factory");
        }
    }

    /// Interpreted bindings for every class, most derived first.
    pub fn from_model(model: &BindingModel) -> Self {
        let mut registry = Self::new();
        for interface in &model.registration_order {
            let Some(class) = model.class(interface) else {
                continue;
            };
            let class = Arc::new(class.clone());
            registry.register(interface, move |address, runtime| {
                Box::new(ContractBinding::new(class.clone(), address, runtime))
            });
        }
        registry
    }

    pub fn from_schema(doc: &SchemaDocument, graph: &InterfaceGraph) -> Self {
        Self::from_model(&build_model(doc, graph))
    }

    pub fn create(
        &self,
        interface: &str,
        address: Address,
        runtime: Arc<dyn ContractRuntime>,
    ) -> Option<Box<dyn ConformanceTarget>> {
        self.factories
            .get(interface)
            .map(|factory| factory(address, runtime))
    }

    pub fn contains(&self, interface: &str) -> bool {
        self.factories.contains_key(interface)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl fmt::Debug for BindingRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingRegistry")
            .field("interfaces", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
