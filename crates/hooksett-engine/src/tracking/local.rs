//! Tracked local variables.
//!
//! A [`LocalScope`] owns the tagged locals of one function body or block.
//! Locals may be rebound any number of times; hooks only ever see the value
//! held when the scope ends. The scope ends either through [`LocalScope::finish`]
//! or, if the body unwinds before reaching it, through `Drop`. Either path
//! persists each bound tracked local exactly once. A local never bound is
//! never persisted.

use std::marker::PhantomData;
use std::sync::Arc;
use std::{fmt, thread};

use tracing::{debug, error, warn};

use hooksett_core::error::HookError;
use hooksett_core::result::TrackResult;
use hooksett_core::types::{CallId, Payload, TrackedValue};

use crate::hooks::definitions::{Declaration, from_tracked, to_tracked};
use crate::manager::{HookManager, hook_manager};

#[derive(Debug)]
struct LocalSlot {
    decl: Declaration,
    tracked: bool,
    value: Option<TrackedValue>,
}

/// Owner of the tagged locals of one scope lifecycle.
pub struct LocalScope {
    /// Scope name, usually the enclosing function or method.
    scope: String,
    /// Lifecycle id.
    call_id: CallId,
    /// Manager locals dispatch through.
    manager: Arc<HookManager>,
    /// Declared locals, in declaration order.
    locals: Vec<LocalSlot>,
    /// Set once the locals have been persisted.
    finished: bool,
}

impl LocalScope {
    /// Opens a scope bound to the process-wide manager.
    pub fn new(scope: impl Into<String>) -> Self {
        Self::with_manager(scope, hook_manager())
    }

    /// Opens a scope bound to a specific manager.
    pub fn with_manager(scope: impl Into<String>, manager: Arc<HookManager>) -> Self {
        Self::with_call_id(scope, CallId::new(), manager)
    }

    pub(crate) fn with_call_id(
        scope: impl Into<String>,
        call_id: CallId,
        manager: Arc<HookManager>,
    ) -> Self {
        Self {
            scope: scope.into(),
            call_id,
            manager,
            locals: Vec::new(),
            finished: false,
        }
    }

    /// Returns the scope name.
    pub fn name(&self) -> &str {
        &self.scope
    }

    /// Returns the lifecycle id.
    pub fn call_id(&self) -> CallId {
        self.call_id
    }

    /// Declares a local of payload type `T` under `kind`.
    ///
    /// Redeclaring a name keeps its position and drops its current binding.
    pub fn declare<T: Payload>(&mut self, name: &str, kind: &str) -> LocalVar<T> {
        let decl = Declaration::new::<T>(name, kind);
        let tracked = self.manager.types().is_tracked(decl.kind());
        if !tracked {
            debug!(
                scope = %self.scope,
                local = %decl.name(),
                kind = %decl.kind(),
                "Kind not registered, local is untracked"
            );
        }

        let index = self.declare_slot(decl, tracked);
        LocalVar::new(self.call_id, index)
    }

    pub(crate) fn declare_slot(&mut self, decl: Declaration, tracked: bool) -> usize {
        let slot = LocalSlot {
            decl,
            tracked,
            value: None,
        };
        match self.position(slot.decl.name()) {
            Some(index) => {
                self.locals[index] = slot;
                index
            }
            None => {
                self.locals.push(slot);
                self.locals.len() - 1
            }
        }
    }

    /// Returns a handle to the declared local `name`.
    ///
    /// `T` must fit the payload type the local was declared with.
    pub fn var<T: Payload>(&self, name: &str) -> TrackResult<LocalVar<T>> {
        let index = self.position(name).ok_or_else(|| self.undeclared(name))?;
        self.locals[index].decl.check_payload::<T>()?;
        Ok(LocalVar::new(self.call_id, index))
    }

    /// Binds a local to a new value.
    pub fn bind<T: Payload>(&mut self, var: LocalVar<T>, value: T) -> TrackResult<()> {
        let index = self.check(var.call_id, var.index)?;
        let slot = &mut self.locals[index];
        slot.value = Some(to_tracked(slot.decl.name(), &value)?);
        Ok(())
    }

    /// Returns a local's current value, or `None` if it was never bound.
    pub fn get<T: Payload>(&self, var: LocalVar<T>) -> TrackResult<Option<T>> {
        let index = self.check(var.call_id, var.index)?;
        let slot = &self.locals[index];
        slot.value
            .clone()
            .map(|value| from_tracked(slot.decl.name(), value))
            .transpose()
    }

    /// Returns whether a local has been bound.
    pub fn is_bound<T>(&self, var: LocalVar<T>) -> bool {
        self.check(var.call_id, var.index)
            .is_ok_and(|index| self.locals[index].value.is_some())
    }

    /// Returns whether this scope's locals were already persisted.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Ends the scope, persisting each bound tracked local.
    pub fn finish(mut self) -> TrackResult<()> {
        self.persist()
    }

    /// Persists each bound tracked local once. Later calls are no-ops.
    ///
    /// Every local gets its own dispatch pass; a failing pass does not stop
    /// the remaining locals. The first failure is returned.
    pub(crate) fn persist(&mut self) -> TrackResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;

        let mut first_error: Option<HookError> = None;
        for slot in &self.locals {
            let Some(value) = slot.value.as_ref() else {
                continue;
            };
            if !slot.tracked {
                continue;
            }

            if let Err(e) = self.manager.dispatch(slot.decl.name(), value, slot.decl.hint()) {
                first_error.get_or_insert(e);
            }
        }

        debug!(scope = %self.scope, call_id = %self.call_id, "Local scope persisted");

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.locals.iter().position(|slot| slot.decl.name() == name)
    }

    fn check(&self, call_id: CallId, index: usize) -> TrackResult<usize> {
        if call_id == self.call_id && index < self.locals.len() {
            Ok(index)
        } else {
            Err(self.undeclared("<foreign handle>"))
        }
    }

    fn undeclared(&self, name: &str) -> HookError {
        HookError::UndeclaredLocal {
            scope: self.scope.clone(),
            name: name.to_string(),
        }
    }
}

impl Drop for LocalScope {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        if thread::panicking() {
            warn!(scope = %self.scope, call_id = %self.call_id, "Scope unwinding, persisting tracked locals");
        }
        if let Err(e) = self.persist() {
            error!(
                scope = %self.scope,
                call_id = %self.call_id,
                error = %e,
                "Failed to persist tracked locals on scope exit"
            );
        }
    }
}

impl fmt::Debug for LocalScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalScope")
            .field("scope", &self.scope)
            .field("call_id", &self.call_id)
            .field("locals", &self.locals)
            .field("finished", &self.finished)
            .finish()
    }
}

/// Typed handle to a local declared in a [`LocalScope`].
pub struct LocalVar<T> {
    call_id: CallId,
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> LocalVar<T> {
    fn new(call_id: CallId, index: usize) -> Self {
        Self {
            call_id,
            index,
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for LocalVar<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for LocalVar<T> {}

impl<T> fmt::Debug for LocalVar<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalVar")
            .field("call_id", &self.call_id)
            .field("index", &self.index)
            .finish()
    }
}
