//! Validation context
//!
//! A [`ValidationContext`] describes what is being validated: the object
//! instance, optionally one of its members, the name to show in messages,
//! an item bag shared with attributes, an optional service provider and
//! the culture used to resolve localized text.
//!
//! Contexts are cheap to build and are created per validation call. The
//! engine derives a fresh context per property, copying items, services
//! and culture from the caller's context.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::descriptor::{PropertyDescriptor, TypeDescriptor};
use crate::error::{Error, Result};
use crate::resource::Culture;
use crate::value::{ObjectRef, Value};

/// A type-erased shared value.
pub type SharedAny = Arc<dyn Any + Send + Sync>;

// ============================================================================
// ITEMS
// ============================================================================

/// A keyed bag of typed values attached to a context.
///
/// Cloning copies the map; values themselves are shared.
#[derive(Clone, Default)]
pub struct Items {
    entries: IndexMap<String, SharedAny>,
}

impl Items {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, returning true when it replaced an existing entry.
    pub fn insert<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) -> bool {
        self.entries.insert(key.into(), Arc::new(value)).is_some()
    }

    /// Looks up a value by key and type.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.entries.get(key)?.downcast_ref::<T>()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.shift_remove(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Items {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

// ============================================================================
// SERVICES
// ============================================================================

/// Resolves services by type.
pub trait ServiceProvider: Send + Sync {
    fn get_service(&self, service_type: TypeId) -> Option<SharedAny>;
}

type ServiceCallback = Arc<dyn Fn(&ServiceContainer) -> SharedAny + Send + Sync>;

#[derive(Clone)]
enum ServiceEntry {
    Instance(SharedAny),
    Callback(ServiceCallback),
}

/// A service provider that can be populated at runtime.
///
/// Services added with `promote` are forwarded to the parent container when
/// one exists. Callback services are created on first request and cached.
#[derive(Default)]
pub struct ServiceContainer {
    parent: Option<Arc<ServiceContainer>>,
    services: RwLock<HashMap<TypeId, ServiceEntry>>,
}

impl ServiceContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(parent: Arc<ServiceContainer>) -> Self {
        Self {
            parent: Some(parent),
            services: RwLock::default(),
        }
    }

    /// Adds a service instance, promoting it to the parent when one exists.
    pub fn add_service<T: Any + Send + Sync>(&self, service: T) -> Result<()> {
        self.add_service_promoted(service, true)
    }

    pub fn add_service_promoted<T: Any + Send + Sync>(&self, service: T, promote: bool) -> Result<()> {
        self.add_entry::<T>(ServiceEntry::Instance(Arc::new(service)), promote)
    }

    /// Adds a service created by `callback` on first request.
    pub fn add_service_callback<T, F>(&self, callback: F, promote: bool) -> Result<()>
    where
        T: Any + Send + Sync,
        F: Fn(&ServiceContainer) -> T + Send + Sync + 'static,
    {
        let callback: ServiceCallback =
            Arc::new(move |c: &ServiceContainer| -> SharedAny { Arc::new(callback(c)) });
        self.add_entry::<T>(ServiceEntry::Callback(callback), promote)
    }

    fn add_entry<T: Any>(&self, entry: ServiceEntry, promote: bool) -> Result<()> {
        if promote && let Some(parent) = &self.parent {
            return parent.add_entry::<T>(entry, promote);
        }
        let mut services = self.services.write();
        if services.contains_key(&TypeId::of::<T>()) {
            return Err(Error::argument(
                "serviceType",
                format!(
                    "The service {} already exists in the service container.",
                    std::any::type_name::<T>()
                ),
            ));
        }
        services.insert(TypeId::of::<T>(), entry);
        Ok(())
    }

    /// Removes a service, from the parent as well when promoting.
    pub fn remove_service<T: Any>(&self, promote: bool) {
        if promote && let Some(parent) = &self.parent {
            parent.remove_service::<T>(promote);
            return;
        }
        self.services.write().remove(&TypeId::of::<T>());
    }

    /// Typed lookup through this container and its parents.
    pub fn service<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.get_service(TypeId::of::<T>())?.downcast::<T>().ok()
    }
}

impl ServiceProvider for ServiceContainer {
    fn get_service(&self, service_type: TypeId) -> Option<SharedAny> {
        let entry = self.services.read().get(&service_type).cloned();
        match entry {
            Some(ServiceEntry::Instance(service)) => Some(service),
            Some(ServiceEntry::Callback(create)) => {
                // the lock is released while the callback runs; it may query us
                let service = create(self);
                self.services
                    .write()
                    .insert(service_type, ServiceEntry::Instance(Arc::clone(&service)));
                Some(service)
            }
            None => self
                .parent
                .as_ref()
                .and_then(|parent| parent.get_service(service_type)),
        }
    }
}

impl fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceContainer")
            .field("services", &self.services.read().len())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}

// ============================================================================
// VALIDATION CONTEXT
// ============================================================================

/// Describes the object (and optionally the member) under validation.
#[derive(Clone)]
pub struct ValidationContext {
    instance: ObjectRef,
    object_type: Arc<TypeDescriptor>,
    member_name: Option<String>,
    display_name: Option<String>,
    items: Items,
    services: Option<Arc<dyn ServiceProvider>>,
    culture: Culture,
}

impl ValidationContext {
    /// Creates a context for `instance` with no services and empty items.
    pub fn new(instance: ObjectRef) -> Self {
        Self::with_services(instance, None, None)
    }

    /// Creates a context, copying `items` when provided.
    pub fn with_services(
        instance: ObjectRef,
        services: Option<Arc<dyn ServiceProvider>>,
        items: Option<&Items>,
    ) -> Self {
        let object_type = instance.type_descriptor();
        Self {
            instance,
            object_type,
            member_name: None,
            display_name: None,
            items: items.cloned().unwrap_or_default(),
            services,
            culture: Culture::invariant(),
        }
    }

    /// Creates a context from a dynamic value, which must be an object.
    pub fn for_value(value: &Value) -> Result<Self> {
        match value {
            Value::Object(instance) => Ok(Self::new(Arc::clone(instance))),
            Value::Null => Err(Error::argument_null("instance")),
            other => Err(Error::argument(
                "instance",
                format!("A value of type '{}' cannot be validated as an object.", other.type_name()),
            )),
        }
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_culture(mut self, culture: Culture) -> Self {
        self.culture = culture;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_member_name(mut self, member_name: impl Into<String>) -> Self {
        self.member_name = Some(member_name.into());
        self
    }

    pub fn object_instance(&self) -> &ObjectRef {
        &self.instance
    }

    pub fn object_type(&self) -> &Arc<TypeDescriptor> {
        &self.object_type
    }

    pub fn member_name(&self) -> Option<&str> {
        self.member_name.as_deref()
    }

    pub fn set_member_name(&mut self, member_name: Option<impl Into<String>>) {
        self.member_name = member_name.map(Into::into);
    }

    /// The name shown in messages.
    ///
    /// Falls back from an explicit name to the member's display attribute,
    /// then to the member name, then to the type name.
    pub fn display_name(&self) -> Result<String> {
        if let Some(name) = &self.display_name {
            return Ok(name.clone());
        }
        let Some(member) = &self.member_name else {
            return Ok(self.object_type.name().to_owned());
        };
        if let Some(display) = self.object_type.property(member).and_then(PropertyDescriptor::display)
            && let Some(name) = display.get_name(&self.culture)?
            && !name.is_empty()
        {
            return Ok(name);
        }
        Ok(member.clone())
    }

    /// Overrides the display name. Empty names are rejected.
    pub fn set_display_name(&mut self, display_name: impl Into<String>) -> Result<()> {
        let display_name = display_name.into();
        if display_name.is_empty() {
            return Err(Error::argument("value", "The argument cannot be null or empty."));
        }
        self.display_name = Some(display_name);
        Ok(())
    }

    pub fn items(&self) -> &Items {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut Items {
        &mut self.items
    }

    pub fn service_provider(&self) -> Option<&Arc<dyn ServiceProvider>> {
        self.services.as_ref()
    }

    /// Resolves a service of type `T` through the service provider.
    pub fn service<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.services
            .as_ref()?
            .get_service(TypeId::of::<T>())?
            .downcast::<T>()
            .ok()
    }

    pub fn culture(&self) -> &Culture {
        &self.culture
    }

    pub fn set_culture(&mut self, culture: Culture) {
        self.culture = culture;
    }

    /// A fresh context for one property of the same instance.
    pub(crate) fn for_member(&self, property: &PropertyDescriptor) -> Self {
        Self {
            instance: Arc::clone(&self.instance),
            object_type: Arc::clone(&self.object_type),
            member_name: Some(property.name().to_owned()),
            display_name: None,
            items: self.items.clone(),
            services: self.services.clone(),
            culture: self.culture.clone(),
        }
    }
}

impl fmt::Debug for ValidationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationContext")
            .field("object_type", &self.object_type.full_name())
            .field("member_name", &self.member_name)
            .field("display_name", &self.display_name)
            .field("items", &self.items)
            .field("culture", &self.culture)
            .finish_non_exhaustive()
    }
}
