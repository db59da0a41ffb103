//! Managed fields: per-attribute descriptors for tracked classes.
//!
//! A [`TrackedClass`] is built once from a list of attribute declarations.
//! Each declaration whose kind is registered when the class is built gets a
//! tracked descriptor; every other one gets a plain descriptor with ordinary
//! get/set semantics. Instances hold one [`FieldSlot`] per attribute.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use hooksett_core::error::HookError;
use hooksett_core::result::TrackResult;
use hooksett_core::types::{InstanceId, Payload, TrackedValue};

use crate::hooks::definitions::{Declaration, Provenance, Resolution, from_tracked, to_tracked};
use crate::manager::{HookManager, hook_manager};

/// Per-instance storage backing one attribute.
#[derive(Debug, Default)]
pub struct FieldSlot {
    cached: OnceLock<Resolution>,
}

impl FieldSlot {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached resolution, if any.
    pub fn resolution(&self) -> Option<&Resolution> {
        self.cached.get()
    }

    /// Returns the cached value, if any.
    pub fn value(&self) -> Option<&TrackedValue> {
        self.cached.get().map(|r| &r.value)
    }

    /// Returns where the cached value came from, if any.
    pub fn provenance(&self) -> Option<&Provenance> {
        self.cached.get().map(|r| &r.provenance)
    }

    /// Caches a lazily computed resolution. The first fill wins.
    pub fn fill(&self, resolution: Resolution) -> &Resolution {
        self.cached.get_or_init(|| resolution)
    }

    /// Replaces the cached value.
    pub fn store(&mut self, resolution: Resolution) {
        self.cached = OnceLock::from(resolution);
    }
}

/// Get/set capability over a [`FieldSlot`].
pub trait ManagedField: Send + Sync + fmt::Debug {
    /// Returns the attribute declaration.
    fn declaration(&self) -> &Declaration;

    /// Returns the attribute name.
    fn name(&self) -> &str {
        self.declaration().name()
    }

    /// Returns whether reads resolve through input hooks and writes dispatch.
    fn is_tracked(&self) -> bool;

    /// Reads the attribute, resolving it on first access if needed.
    fn read(&self, slot: &FieldSlot) -> TrackResult<TrackedValue>;

    /// Writes the attribute.
    fn write(&self, slot: &mut FieldSlot, value: TrackedValue) -> TrackResult<()>;
}

/// Descriptor for one declared attribute.
pub struct FieldDescriptor {
    /// Owning class name.
    owner: Arc<str>,
    /// Attribute declaration.
    decl: Declaration,
    /// Whether the kind was registered at build time.
    tracked: bool,
    /// Manager the attribute resolves and dispatches through.
    manager: Arc<HookManager>,
}

impl FieldDescriptor {
    /// Builds the descriptor, deciding tracked-ness from `manager`'s types.
    pub fn new(owner: Arc<str>, decl: Declaration, manager: Arc<HookManager>) -> Self {
        let tracked = manager.types().is_tracked(decl.kind());
        if !tracked {
            debug!(
                class = %owner,
                attribute = %decl.name(),
                kind = %decl.kind(),
                "Kind not registered, attribute is untracked"
            );
        }

        Self {
            owner,
            decl,
            tracked,
            manager,
        }
    }

    /// Returns the owning class name.
    pub fn owner(&self) -> &str {
        &self.owner
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("owner", &self.owner)
            .field("decl", &self.decl)
            .field("tracked", &self.tracked)
            .finish()
    }
}

impl ManagedField for FieldDescriptor {
    fn declaration(&self) -> &Declaration {
        &self.decl
    }

    fn is_tracked(&self) -> bool {
        self.tracked
    }

    fn read(&self, slot: &FieldSlot) -> TrackResult<TrackedValue> {
        if let Some(value) = slot.value() {
            return Ok(value.clone());
        }

        let resolution = if self.tracked {
            self.manager
                .resolve(self.decl.name(), self.decl.hint(), self.decl.default_value())?
        } else {
            match self.decl.default_value() {
                Some(default) => Resolution {
                    value: default.clone(),
                    provenance: Provenance::Default,
                },
                None => {
                    return Err(HookError::AttributeUnset {
                        name: self.decl.name().to_string(),
                    });
                }
            }
        };

        Ok(slot.fill(resolution).value.clone())
    }

    fn write(&self, slot: &mut FieldSlot, value: TrackedValue) -> TrackResult<()> {
        if !self.tracked {
            slot.store(Resolution {
                value,
                provenance: Provenance::Explicit,
            });
            return Ok(());
        }

        let name = self.decl.name();
        let hint = self.decl.hint();
        self.manager.validate_value(name, &value, hint)?;
        slot.store(Resolution {
            value: value.clone(),
            provenance: Provenance::Explicit,
        });
        self.manager.dispatch(name, &value, hint)
    }
}

enum PendingField {
    Declared(Declaration),
    Custom(Arc<dyn ManagedField>),
}

/// Builder for [`TrackedClass`].
pub struct TrackedClassBuilder {
    name: String,
    fields: Vec<PendingField>,
    error: Option<HookError>,
}

impl TrackedClassBuilder {
    /// Declares an attribute of payload type `T` under `kind`.
    pub fn attribute<T: Payload>(mut self, name: &str, kind: &str) -> Self {
        self.fields
            .push(PendingField::Declared(Declaration::new::<T>(name, kind)));
        self
    }

    /// Declares an attribute with a source-level default.
    pub fn attribute_with_default<T: Payload>(mut self, name: &str, kind: &str, default: T) -> Self {
        match Declaration::with_default(name, kind, default) {
            Ok(decl) => self.fields.push(PendingField::Declared(decl)),
            Err(e) => {
                self.error.get_or_insert(e);
            }
        }
        self
    }

    /// Adds a prebuilt declaration.
    pub fn declaration(mut self, decl: Declaration) -> Self {
        self.fields.push(PendingField::Declared(decl));
        self
    }

    /// Adds a custom managed field.
    pub fn field(mut self, field: Arc<dyn ManagedField>) -> Self {
        self.fields.push(PendingField::Custom(field));
        self
    }

    /// Builds the class against the process-wide manager.
    pub fn build(self) -> TrackResult<TrackedClass> {
        self.build_with(&hook_manager())
    }

    /// Builds the class against a specific manager.
    pub fn build_with(self, manager: &Arc<HookManager>) -> TrackResult<TrackedClass> {
        if let Some(e) = self.error {
            return Err(e);
        }

        let owner: Arc<str> = Arc::from(self.name.as_str());
        let mut fields: Vec<Arc<dyn ManagedField>> = Vec::with_capacity(self.fields.len());
        let mut index = HashMap::with_capacity(self.fields.len());

        for pending in self.fields {
            let field: Arc<dyn ManagedField> = match pending {
                PendingField::Declared(decl) => {
                    Arc::new(FieldDescriptor::new(owner.clone(), decl, manager.clone()))
                }
                PendingField::Custom(field) => field,
            };

            // A redeclared name replaces the earlier declaration in place.
            match index.get(field.name()) {
                Some(&position) => fields[position] = field,
                None => {
                    index.insert(field.name().to_string(), fields.len());
                    fields.push(field);
                }
            }
        }

        let tracked = fields.iter().filter(|f| f.is_tracked()).count();
        debug!(
            class = %owner,
            attributes = fields.len(),
            tracked = tracked,
            "Tracked class built"
        );

        Ok(TrackedClass {
            inner: Arc::new(ClassInner {
                name: owner,
                fields,
                index,
            }),
        })
    }
}

struct ClassInner {
    name: Arc<str>,
    fields: Vec<Arc<dyn ManagedField>>,
    index: HashMap<String, usize>,
}

/// A class whose attributes are managed fields.
#[derive(Clone)]
pub struct TrackedClass {
    inner: Arc<ClassInner>,
}

impl TrackedClass {
    /// Starts a builder for a class called `name`.
    pub fn builder(name: impl Into<String>) -> TrackedClassBuilder {
        TrackedClassBuilder {
            name: name.into(),
            fields: Vec::new(),
            error: None,
        }
    }

    /// Returns the class name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns the attribute names, in declaration order.
    pub fn attribute_names(&self) -> Vec<&str> {
        self.inner.fields.iter().map(|f| f.name()).collect()
    }

    /// Returns whether `name` is a tracked attribute.
    pub fn is_tracked(&self, name: &str) -> bool {
        self.descriptor(name).is_ok_and(|f| f.is_tracked())
    }

    /// Returns the descriptor for `name`.
    pub fn descriptor(&self, name: &str) -> TrackResult<&Arc<dyn ManagedField>> {
        self.position(name).map(|i| &self.inner.fields[i])
    }

    /// Returns a typed handle to the attribute `name`.
    ///
    /// `T` must fit the payload type the attribute was declared with.
    pub fn field<T: Payload>(&self, name: &str) -> TrackResult<Field<T>> {
        let index = self.position(name)?;
        self.inner.fields[index].declaration().check_payload::<T>()?;
        Ok(Field {
            owner: self.inner.clone(),
            index,
            _marker: PhantomData,
        })
    }

    /// Creates an instance with every attribute unresolved.
    pub fn instantiate(&self) -> TrackedInstance {
        let slots = self.inner.fields.iter().map(|_| FieldSlot::new()).collect();
        TrackedInstance {
            id: InstanceId::new(),
            class: self.clone(),
            slots,
        }
    }

    fn position(&self, name: &str) -> TrackResult<usize> {
        self.inner
            .index
            .get(name)
            .copied()
            .ok_or_else(|| HookError::UnknownAttribute {
                owner: self.name().to_string(),
                name: name.to_string(),
            })
    }
}

impl fmt::Debug for TrackedClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackedClass")
            .field("name", &self.inner.name)
            .field("fields", &self.inner.fields)
            .finish()
    }
}

/// One instance of a [`TrackedClass`].
#[derive(Debug)]
pub struct TrackedInstance {
    id: InstanceId,
    class: TrackedClass,
    slots: Vec<FieldSlot>,
}

impl TrackedInstance {
    /// Returns the instance id.
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Returns the class this instance belongs to.
    pub fn class(&self) -> &TrackedClass {
        &self.class
    }

    /// Reads an attribute as `T`.
    pub fn get<T: Payload>(&self, name: &str) -> TrackResult<T> {
        let value = self.get_value(name)?;
        from_tracked(name, value)
    }

    /// Reads an attribute as a raw value.
    pub fn get_value(&self, name: &str) -> TrackResult<TrackedValue> {
        let index = self.class.position(name)?;
        self.read_at(index)
    }

    /// Writes an attribute as `T`, which must fit its declared payload type.
    pub fn set<T: Payload>(&mut self, name: &str, value: T) -> TrackResult<()> {
        let index = self.class.position(name)?;
        self.class.inner.fields[index]
            .declaration()
            .check_payload::<T>()?;
        let value = to_tracked(name, &value)?;
        self.write_at(index, value)
    }

    /// Writes an attribute from a raw value.
    pub fn set_value(&mut self, name: &str, value: TrackedValue) -> TrackResult<()> {
        let index = self.class.position(name)?;
        self.write_at(index, value)
    }

    /// Returns where the attribute's current value came from.
    ///
    /// `None` until the attribute is first read or written.
    pub fn provenance(&self, name: &str) -> TrackResult<Option<Provenance>> {
        let index = self.class.position(name)?;
        Ok(self.slots[index].provenance().cloned())
    }

    fn read_at(&self, index: usize) -> TrackResult<TrackedValue> {
        self.class.inner.fields[index].read(&self.slots[index])
    }

    fn write_at(&mut self, index: usize, value: TrackedValue) -> TrackResult<()> {
        let field = self.class.inner.fields[index].clone();
        field.write(&mut self.slots[index], value)
    }
}

/// Typed handle to one attribute of a [`TrackedClass`].
pub struct Field<T> {
    owner: Arc<ClassInner>,
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Payload> Field<T> {
    /// Returns the attribute name.
    pub fn name(&self) -> &str {
        self.owner.fields[self.index].name()
    }

    /// Reads the attribute on `instance`.
    pub fn get(&self, instance: &TrackedInstance) -> TrackResult<T> {
        self.check(instance)?;
        let value = instance.read_at(self.index)?;
        from_tracked(self.name(), value)
    }

    /// Writes the attribute on `instance`.
    pub fn set(&self, instance: &mut TrackedInstance, value: T) -> TrackResult<()> {
        self.check(instance)?;
        let value = to_tracked(self.name(), &value)?;
        instance.write_at(self.index, value)
    }

    /// Returns where the attribute's current value on `instance` came from.
    pub fn provenance(&self, instance: &TrackedInstance) -> TrackResult<Option<Provenance>> {
        self.check(instance)?;
        Ok(instance.slots[self.index].provenance().cloned())
    }

    fn check(&self, instance: &TrackedInstance) -> TrackResult<()> {
        if Arc::ptr_eq(&self.owner, &instance.class.inner) {
            Ok(())
        } else {
            Err(HookError::UnknownAttribute {
                owner: instance.class.name().to_string(),
                name: self.name().to_string(),
            })
        }
    }
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        Self {
            owner: self.owner.clone(),
            index: self.index,
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("class", &self.owner.name)
            .field("attribute", &self.owner.fields[self.index].name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{TRACED, TagKind};
    use hooksett_core::traits::{InputHook, OutputHook, Verdict};
    use hooksett_core::types::TypeHint;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct Fixed {
        values: HashMap<String, TrackedValue>,
    }

    impl InputHook for Fixed {
        fn id(&self) -> &str {
            "fixed"
        }

        fn get(
            &self,
            name: &str,
            _hint: &TypeHint,
            _default: Option<&TrackedValue>,
        ) -> Option<TrackedValue> {
            self.values.get(name).cloned()
        }

        fn validate(&self, _name: &str, value: &TrackedValue, _hint: &TypeHint) -> Verdict {
            if value.as_f64().is_some_and(|v| v < 0.0) {
                Verdict::reject("negative")
            } else {
                Verdict::Accept
            }
        }
    }

    #[derive(Debug, Default)]
    struct Capture {
        saves: Mutex<Vec<(String, TrackedValue)>>,
    }

    impl OutputHook for Capture {
        fn id(&self) -> &str {
            "capture"
        }

        fn save(&self, name: &str, value: &TrackedValue, _hint: &TypeHint) -> Result<(), HookError> {
            self.saves
                .lock()
                .unwrap()
                .push((name.to_string(), value.clone()));
            Ok(())
        }
    }

    fn setup() -> (Arc<HookManager>, Arc<Capture>) {
        let manager = Arc::new(HookManager::new());
        let mut values = HashMap::new();
        values.insert("learning_rate".to_string(), json!(0.01));
        manager.add_input_hook(Arc::new(Fixed { values }));
        let capture = Arc::new(Capture::default());
        manager.add_output_hook(capture.clone());
        (manager, capture)
    }

    #[test]
    fn test_lazy_resolution_and_cache() {
        let (manager, capture) = setup();
        let class = TrackedClass::builder("Model")
            .attribute::<f64>("learning_rate", TRACED)
            .attribute_with_default("epochs", TRACED, 10u32)
            .build_with(&manager)
            .expect("build");

        let model = class.instantiate();
        assert_eq!(model.provenance("learning_rate").expect("known"), None);
        assert_eq!(model.get::<f64>("learning_rate").expect("read"), 0.01);
        assert_eq!(model.get::<u32>("epochs").expect("read"), 10);
        assert_eq!(
            model.provenance("learning_rate").expect("known"),
            Some(Provenance::Hook("fixed".into()))
        );
        assert_eq!(model.provenance("epochs").expect("known"), Some(Provenance::Default));
        assert!(capture.saves.lock().unwrap().is_empty());
    }

    #[test]
    fn test_every_write_dispatches() {
        let (manager, capture) = setup();
        let class = TrackedClass::builder("Model")
            .attribute_with_default("accuracy", TRACED, 0.0f64)
            .build_with(&manager)
            .expect("build");

        let mut model = class.instantiate();
        model.set("accuracy", 0.9).expect("write");
        model.set("accuracy", 0.9).expect("write");

        assert_eq!(
            *capture.saves.lock().unwrap(),
            vec![
                ("accuracy".to_string(), json!(0.9)),
                ("accuracy".to_string(), json!(0.9)),
            ]
        );
        assert_eq!(model.provenance("accuracy").expect("known"), Some(Provenance::Explicit));
    }

    #[test]
    fn test_rejected_write_keeps_old_value() {
        let (manager, capture) = setup();
        let class = TrackedClass::builder("Model")
            .attribute_with_default("accuracy", TRACED, 0.5f64)
            .build_with(&manager)
            .expect("build");

        let mut model = class.instantiate();
        let err = model.set("accuracy", -1.0).unwrap_err();
        assert!(matches!(err, HookError::ValidationRejected { .. }));
        assert_eq!(model.get::<f64>("accuracy").expect("read"), 0.5);
        assert!(capture.saves.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unregistered_kind_is_plain() {
        let (manager, capture) = setup();
        let class = TrackedClass::builder("Model")
            .attribute::<String>("notes", "Annotation")
            .build_with(&manager)
            .expect("build");
        assert!(!class.is_tracked("notes"));

        let mut model = class.instantiate();
        let err = model.get::<String>("notes").unwrap_err();
        assert!(matches!(err, HookError::AttributeUnset { .. }));

        model.set("notes", "baseline".to_string()).expect("write");
        assert_eq!(model.get::<String>("notes").expect("read"), "baseline");
        assert!(capture.saves.lock().unwrap().is_empty());
    }

    #[test]
    fn test_kind_registered_before_build_is_tracked() {
        let (manager, capture) = setup();
        manager.register_tracked_type("Metric", TagKind::new("Metric"));
        let class = TrackedClass::builder("Run")
            .attribute_with_default("loss", "Metric", 1.0f64)
            .build_with(&manager)
            .expect("build");

        let mut run = class.instantiate();
        run.set("loss", 0.25).expect("write");
        assert_eq!(capture.saves.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_attribute() {
        let (manager, _) = setup();
        let class = TrackedClass::builder("Model")
            .build_with(&manager)
            .expect("build");
        let model = class.instantiate();
        match model.get_value("missing") {
            Err(HookError::UnknownAttribute { owner, name }) => {
                assert_eq!(owner, "Model");
                assert_eq!(name, "missing");
            }
            other => panic!("Expected UnknownAttribute, got: {:?}", other),
        }
    }

    #[test]
    fn test_handles_must_fit_declared_payload() {
        let (manager, capture) = setup();
        let class = TrackedClass::builder("Model")
            .attribute_with_default("accuracy", TRACED, 0.5f64)
            .build_with(&manager)
            .expect("build");

        match class.field::<String>("accuracy") {
            Err(HookError::PayloadMismatch { name, declared, requested }) => {
                assert_eq!(name, "accuracy");
                assert_eq!(declared, "Traced[f64]");
                assert_eq!(requested, "String");
            }
            other => panic!("Expected PayloadMismatch, got: {:?}", other),
        }

        let mut model = class.instantiate();
        let err = model.set("accuracy", "high".to_string()).unwrap_err();
        assert!(matches!(err, HookError::PayloadMismatch { .. }));
        assert_eq!(model.get::<f64>("accuracy").expect("read"), 0.5);
        assert!(capture.saves.lock().unwrap().is_empty());
    }

    #[test]
    fn test_typed_field_handle() {
        let (manager, capture) = setup();
        let class = TrackedClass::builder("Model")
            .attribute::<f64>("learning_rate", TRACED)
            .build_with(&manager)
            .expect("build");
        let lr = class.field::<f64>("learning_rate").expect("field");

        let mut model = class.instantiate();
        assert_eq!(lr.get(&model).expect("read"), 0.01);
        lr.set(&mut model, 0.02).expect("write");
        assert_eq!(lr.get(&model).expect("read"), 0.02);
        assert_eq!(lr.provenance(&model).expect("known"), Some(Provenance::Explicit));
        assert_eq!(capture.saves.lock().unwrap().len(), 1);

        let other = TrackedClass::builder("Model")
            .attribute::<f64>("learning_rate", TRACED)
            .build_with(&manager)
            .expect("build")
            .instantiate();
        assert!(lr.get(&other).is_err());
    }

    #[test]
    fn test_unresolved_tracked_attribute() {
        let (manager, _) = setup();
        let class = TrackedClass::builder("Model")
            .attribute::<u32>("batch_size", TRACED)
            .build_with(&manager)
            .expect("build");
        let err = class.instantiate().get::<u32>("batch_size").unwrap_err();
        assert!(matches!(err, HookError::UnresolvedRequiredValue { .. }));
    }
}
