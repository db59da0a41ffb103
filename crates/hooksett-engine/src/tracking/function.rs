//! Tracked functions.
//!
//! [`track_function`] wraps a body with a [`Signature`] captured at wrap
//! time. Each call:
//!
//! 1. Rejects arguments the signature does not declare.
//! 2. Binds parameters in declaration order. An explicit value is only
//!    validated; an omitted or [`Args::unset`] value is resolved through
//!    the input hooks with the parameter's default as fallback.
//! 3. Runs the body with a [`CallFrame`].
//! 4. On every exit path, dispatches each resolved tracked parameter and
//!    then each bound tracked local exactly once, with the last value the
//!    body left in the frame.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::{fmt, thread};

use serde::Serialize;
use tracing::{debug, error, warn};

use hooksett_core::error::HookError;
use hooksett_core::result::TrackResult;
use hooksett_core::types::{CallId, Payload, TrackedValue};

use super::local::{LocalScope, LocalVar};
use crate::hooks::definitions::{Declaration, Provenance, Resolution, from_tracked, to_tracked};
use crate::manager::{HookManager, hook_manager};

/// Kind carried by ordinary, untagged parameters.
const UNTAGGED: &str = "";

/// A declared parameter or local, with tracked-ness fixed at wrap time.
#[derive(Debug, Clone)]
pub struct Param {
    decl: Declaration,
    tracked: bool,
}

impl Param {
    /// Returns the declaration.
    pub fn declaration(&self) -> &Declaration {
        &self.decl
    }

    /// Returns the declared name.
    pub fn name(&self) -> &str {
        self.decl.name()
    }

    /// Returns whether the parameter resolves and dispatches through hooks.
    pub fn is_tracked(&self) -> bool {
        self.tracked
    }
}

/// Parameter and local metadata for a tracked function.
#[derive(Debug)]
pub struct Signature {
    name: String,
    params: Vec<Declaration>,
    locals: Vec<Declaration>,
    error: Option<HookError>,
}

impl Signature {
    /// Starts a signature for the function `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            locals: Vec::new(),
            error: None,
        }
    }

    /// Declares a tagged parameter with no default.
    pub fn param<T: Payload>(mut self, name: &str, kind: &str) -> Self {
        self.params.push(Declaration::new::<T>(name, kind));
        self
    }

    /// Declares a tagged parameter with a default.
    pub fn param_with_default<T: Payload>(mut self, name: &str, kind: &str, default: T) -> Self {
        self.push_with_default(name, kind, default);
        self
    }

    /// Declares an ordinary parameter with no default.
    pub fn arg<T: Payload>(self, name: &str) -> Self {
        self.param::<T>(name, UNTAGGED)
    }

    /// Declares an ordinary parameter with a default.
    pub fn arg_with_default<T: Payload>(self, name: &str, default: T) -> Self {
        self.param_with_default(name, UNTAGGED, default)
    }

    /// Declares a tagged local variable of the body.
    pub fn local<T: Payload>(mut self, name: &str, kind: &str) -> Self {
        self.locals.push(Declaration::new::<T>(name, kind));
        self
    }

    /// Returns the function name.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn push_with_default<T: Payload>(&mut self, name: &str, kind: &str, default: T) {
        match Declaration::with_default(name, kind, default) {
            Ok(decl) => self.params.push(decl),
            Err(e) => {
                self.error.get_or_insert(e);
            }
        }
    }

    fn compile(self, manager: &HookManager) -> TrackResult<CompiledSignature> {
        if let Some(e) = self.error {
            return Err(e);
        }

        let classify = |decl: Declaration| {
            let tracked = !decl.kind().is_empty() && manager.types().is_tracked(decl.kind());
            Param { decl, tracked }
        };

        let mut params: Vec<Param> = Vec::with_capacity(self.params.len());
        for param in self.params.into_iter().map(classify) {
            // A redeclared name replaces the earlier declaration in place.
            match params.iter().position(|p| p.name() == param.name()) {
                Some(index) => params[index] = param,
                None => params.push(param),
            }
        }

        Ok(CompiledSignature {
            name: Arc::from(self.name.as_str()),
            params,
            locals: self.locals.into_iter().map(classify).collect(),
        })
    }
}

#[derive(Debug)]
struct CompiledSignature {
    name: Arc<str>,
    params: Vec<Param>,
    locals: Vec<Param>,
}

impl CompiledSignature {
    fn position(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name() == name)
    }
}

#[derive(Debug, Clone)]
enum ArgValue {
    Value(TrackedValue),
    Unset,
}

/// Named call arguments.
#[derive(Debug, Default)]
pub struct Args {
    values: BTreeMap<String, ArgValue>,
    error: Option<HookError>,
}

impl Args {
    /// Creates an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Passes `value` for `name`.
    pub fn with<T: Serialize>(mut self, name: &str, value: T) -> Self {
        match to_tracked(name, &value) {
            Ok(value) => {
                self.values.insert(name.to_string(), ArgValue::Value(value));
            }
            Err(e) => {
                self.error.get_or_insert(e);
            }
        }
        self
    }

    /// Passes a raw value for `name`.
    pub fn with_value(mut self, name: &str, value: TrackedValue) -> Self {
        self.values.insert(name.to_string(), ArgValue::Value(value));
        self
    }

    /// Passes the unset sentinel for `name`, as if it were omitted.
    pub fn unset(mut self, name: &str) -> Self {
        self.values.insert(name.to_string(), ArgValue::Unset);
        self
    }

    /// Returns the number of arguments passed.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether no arguments were passed.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Runtime state of one tracked call.
pub struct CallFrame {
    signature: Arc<CompiledSignature>,
    call_id: CallId,
    manager: Arc<HookManager>,
    params: Vec<Option<Resolution>>,
    locals: LocalScope,
    finished: bool,
}

impl CallFrame {
    fn open(signature: Arc<CompiledSignature>, manager: Arc<HookManager>) -> Self {
        let call_id = CallId::new();
        let mut locals = LocalScope::with_call_id(signature.name.as_ref(), call_id, manager.clone());
        for local in &signature.locals {
            locals.declare_slot(local.decl.clone(), local.tracked);
        }

        Self {
            params: vec![None; signature.params.len()],
            signature,
            call_id,
            manager,
            locals,
            finished: false,
        }
    }

    fn bind_args(&mut self, mut args: Args) -> TrackResult<()> {
        if let Some(e) = args.error.take() {
            return Err(e);
        }

        if let Some(name) = args
            .values
            .keys()
            .find(|name| self.signature.position(name).is_none())
        {
            return Err(HookError::UnknownArgument {
                function: self.function().to_string(),
                name: name.clone(),
            });
        }

        let signature = self.signature.clone();
        for (index, param) in signature.params.iter().enumerate() {
            let decl = &param.decl;
            let resolution = match args.values.remove(decl.name()) {
                Some(ArgValue::Value(value)) if param.tracked => {
                    self.manager.accept_explicit(decl.name(), value, decl.hint())?
                }
                Some(ArgValue::Value(value)) => Resolution {
                    value,
                    provenance: Provenance::Explicit,
                },
                Some(ArgValue::Unset) | None if param.tracked => {
                    self.manager
                        .resolve(decl.name(), decl.hint(), decl.default_value())?
                }
                Some(ArgValue::Unset) | None => match decl.default_value() {
                    Some(default) => Resolution {
                        value: default.clone(),
                        provenance: Provenance::Default,
                    },
                    None => {
                        return Err(HookError::MissingArgument {
                            function: self.function().to_string(),
                            name: decl.name().to_string(),
                        });
                    }
                },
            };
            self.params[index] = Some(resolution);
        }

        debug!(function = %self.function(), call_id = %self.call_id, "Arguments bound");
        Ok(())
    }

    /// Returns the function name.
    pub fn function(&self) -> &str {
        &self.signature.name
    }

    /// Returns the call id.
    pub fn call_id(&self) -> CallId {
        self.call_id
    }

    /// Reads parameter `name` as `T`.
    pub fn param<T: Payload>(&self, name: &str) -> TrackResult<T> {
        let value = self.param_value(name)?.clone();
        from_tracked(name, value)
    }

    /// Reads parameter `name` as a raw value.
    pub fn param_value(&self, name: &str) -> TrackResult<&TrackedValue> {
        self.resolution(name).map(|r| &r.value)
    }

    /// Returns where parameter `name`'s current value came from.
    pub fn provenance(&self, name: &str) -> TrackResult<&Provenance> {
        self.resolution(name).map(|r| &r.provenance)
    }

    /// Reassigns parameter `name`. The last value is the one dispatched.
    ///
    /// `T` must fit the payload type the parameter was declared with.
    pub fn set_param<T: Payload>(&mut self, name: &str, value: T) -> TrackResult<()> {
        let index = self.position(name)?;
        self.signature.params[index].decl.check_payload::<T>()?;
        let value = to_tracked(name, &value)?;
        self.params[index] = Some(Resolution {
            value,
            provenance: Provenance::Explicit,
        });
        Ok(())
    }

    /// Returns a handle to the declared local `name`.
    pub fn local<T: Payload>(&self, name: &str) -> TrackResult<LocalVar<T>> {
        self.locals.var(name)
    }

    /// Binds a local to a new value.
    pub fn bind<T: Payload>(&mut self, var: LocalVar<T>, value: T) -> TrackResult<()> {
        self.locals.bind(var, value)
    }

    /// Returns a local's current value, or `None` if never bound.
    pub fn read<T: Payload>(&self, var: LocalVar<T>) -> TrackResult<Option<T>> {
        self.locals.get(var)
    }

    /// Returns the frame's local scope.
    pub fn locals(&self) -> &LocalScope {
        &self.locals
    }

    /// Returns the frame's local scope mutably.
    pub fn locals_mut(&mut self) -> &mut LocalScope {
        &mut self.locals
    }

    fn finish(mut self) -> TrackResult<()> {
        self.persist()
    }

    /// Dispatches every resolved tracked parameter, then every bound
    /// tracked local. Later calls are no-ops.
    fn persist(&mut self) -> TrackResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;

        let mut first_error: Option<HookError> = None;
        for (param, resolution) in self.signature.params.iter().zip(&self.params) {
            let Some(resolution) = resolution else {
                continue;
            };
            if !param.tracked {
                continue;
            }

            if let Err(e) = self
                .manager
                .dispatch(param.name(), &resolution.value, param.decl.hint())
            {
                first_error.get_or_insert(e);
            }
        }

        if let Err(e) = self.locals.persist() {
            first_error.get_or_insert(e);
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn position(&self, name: &str) -> TrackResult<usize> {
        self.signature
            .position(name)
            .ok_or_else(|| HookError::UnknownArgument {
                function: self.function().to_string(),
                name: name.to_string(),
            })
    }

    fn resolution(&self, name: &str) -> TrackResult<&Resolution> {
        let index = self.position(name)?;
        self.params[index]
            .as_ref()
            .ok_or_else(|| HookError::MissingArgument {
                function: self.function().to_string(),
                name: name.to_string(),
            })
    }
}

impl Drop for CallFrame {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        if thread::panicking() {
            warn!(function = %self.function(), call_id = %self.call_id, "Call unwinding, persisting tracked values");
        }
        if let Err(e) = self.persist() {
            error!(
                function = %self.function(),
                call_id = %self.call_id,
                error = %e,
                "Failed to persist tracked values on call exit"
            );
        }
    }
}

impl fmt::Debug for CallFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallFrame")
            .field("function", &self.signature.name)
            .field("call_id", &self.call_id)
            .field("params", &self.params)
            .field("locals", &self.locals)
            .finish()
    }
}

/// A function body wrapped with tracked parameters and locals.
pub struct TrackedFn<F> {
    signature: Arc<CompiledSignature>,
    manager: Arc<HookManager>,
    body: F,
}

impl<F> TrackedFn<F> {
    /// Returns the function name.
    pub fn name(&self) -> &str {
        &self.signature.name
    }

    /// Returns the declared parameters, in order.
    pub fn params(&self) -> &[Param] {
        &self.signature.params
    }

    /// Returns the declared locals, in order.
    pub fn locals(&self) -> &[Param] {
        &self.signature.locals
    }

    /// Calls the function with `args`.
    ///
    /// When the body fails and dispatch also fails, the body's error is
    /// returned and the dispatch error is logged.
    pub fn call<R, E>(&self, args: Args) -> Result<R, E>
    where
        F: Fn(&mut CallFrame) -> Result<R, E>,
        E: From<HookError>,
    {
        let mut frame = CallFrame::open(self.signature.clone(), self.manager.clone());
        frame.bind_args(args)?;

        let outcome = (self.body)(&mut frame);
        let persisted = frame.finish();

        match (outcome, persisted) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e.into()),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(dispatch_error)) => {
                error!(
                    function = %self.name(),
                    error = %dispatch_error,
                    "Dispatch failed after body error"
                );
                Err(e)
            }
        }
    }

    /// Calls the function with no arguments.
    pub fn call_default<R, E>(&self) -> Result<R, E>
    where
        F: Fn(&mut CallFrame) -> Result<R, E>,
        E: From<HookError>,
    {
        self.call(Args::new())
    }
}

impl<F> fmt::Debug for TrackedFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackedFn")
            .field("signature", &self.signature)
            .finish()
    }
}

/// Wraps `body` against the process-wide manager.
pub fn track_function<F, R, E>(signature: Signature, body: F) -> TrackResult<TrackedFn<F>>
where
    F: Fn(&mut CallFrame) -> Result<R, E>,
    E: From<HookError>,
{
    track_function_with(&hook_manager(), signature, body)
}

/// Wraps `body` against a specific manager.
///
/// Tracked-ness of every parameter and local is decided here, from the
/// kinds registered on `manager` at this moment.
pub fn track_function_with<F, R, E>(
    manager: &Arc<HookManager>,
    signature: Signature,
    body: F,
) -> TrackResult<TrackedFn<F>>
where
    F: Fn(&mut CallFrame) -> Result<R, E>,
    E: From<HookError>,
{
    let signature = signature.compile(manager)?;
    debug!(
        function = %signature.name,
        params = signature.params.len(),
        locals = signature.locals.len(),
        "Function wrapped"
    );

    Ok(TrackedFn {
        signature: Arc::new(signature),
        manager: manager.clone(),
        body,
    })
}
