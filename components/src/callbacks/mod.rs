//! Lifecycle hooks fired around component executions.
//!
//! A [`Context`] carries the registered [`Handler`]s and the [`RunInfo`] of the
//! component currently running. Components call [`on_start`], [`on_end`] and
//! [`on_error`]; each handler may hand back a new context for the handlers after
//! it, or `None` to stop its own context from propagating.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

pub mod log;

pub use self::log::{log_callback, new_log_callback, new_log_callback_in, LogCallbackConfig};

/// Opaque payload handed to handlers when a component starts.
pub type CallbackInput = serde_json::Value;

/// Opaque payload handed to handlers when a component ends.
pub type CallbackOutput = serde_json::Value;

/// Identifies the component a hook fires for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub component_type: String,
    pub component: String,
}

/// A handler bound to the start, end and error hook points.
pub trait Handler: Send + Sync {
    fn on_start(&self, ctx: Context, _info: &RunInfo, _input: &CallbackInput) -> Option<Context> {
        Some(ctx)
    }

    fn on_end(&self, ctx: Context, _info: &RunInfo, _output: &CallbackOutput) -> Option<Context> {
        Some(ctx)
    }

    fn on_error(
        &self,
        ctx: Context,
        _info: &RunInfo,
        _err: &(dyn Error + Send + Sync),
    ) -> Option<Context> {
        Some(ctx)
    }
}

/// Per-run state threaded through component calls.
#[derive(Clone, Default)]
pub struct Context {
    handlers: Vec<Arc<dyn Handler>>,
    run_info: Option<RunInfo>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handlers(handlers: Vec<Arc<dyn Handler>>) -> Self {
        Self {
            handlers,
            run_info: None,
        }
    }

    pub fn with_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn with_run_info(mut self, info: RunInfo) -> Self {
        self.run_info = Some(info);
        self
    }

    pub fn run_info(&self) -> Option<&RunInfo> {
        self.run_info.as_ref()
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("handlers", &self.handlers.len())
            .field("run_info", &self.run_info)
            .finish()
    }
}

/// Sets a run info for `component_type`/`component` unless the context already has one.
pub fn ensure_run_info(ctx: Context, component_type: &str, component: &str) -> Context {
    if ctx.run_info.is_some() {
        return ctx;
    }
    ctx.with_run_info(RunInfo {
        name: String::new(),
        component_type: component_type.to_string(),
        component: component.to_string(),
    })
}

/// Fires the start hook on every handler, in registration order.
pub fn on_start(ctx: Context, input: &CallbackInput) -> Context {
    dispatch(ctx, false, |handler, ctx, info| handler.on_start(ctx, info, input))
}

/// Fires the end hook on every handler, in reverse registration order.
pub fn on_end(ctx: Context, output: &CallbackOutput) -> Context {
    dispatch(ctx, true, |handler, ctx, info| handler.on_end(ctx, info, output))
}

/// Fires the error hook on every handler, in reverse registration order.
pub fn on_error(ctx: Context, err: &(dyn Error + Send + Sync)) -> Context {
    dispatch(ctx, true, |handler, ctx, info| handler.on_error(ctx, info, err))
}

fn dispatch<F>(ctx: Context, reverse: bool, fire: F) -> Context
where
    F: Fn(&dyn Handler, Context, &RunInfo) -> Option<Context>,
{
    let info = match ctx.run_info.clone() {
        Some(info) => info,
        None => return ctx,
    };

    let mut handlers = ctx.handlers.clone();
    if reverse {
        handlers.reverse();
    }

    let mut current = ctx;
    for handler in handlers {
        match fire(handler.as_ref(), current.clone(), &info) {
            Some(next) => current = next,
            None => warn!(
                "callback handler stopped context propagation for [{}:{}:{}]",
                info.component, info.component_type, info.name
            ),
        }
    }
    current
}

type StartFn = dyn Fn(Context, &RunInfo, &CallbackInput) -> Option<Context> + Send + Sync;
type EndFn = dyn Fn(Context, &RunInfo, &CallbackOutput) -> Option<Context> + Send + Sync;
type ErrorFn = dyn Fn(Context, &RunInfo, &(dyn Error + Send + Sync)) -> Option<Context> + Send + Sync;

/// Assembles a [`Handler`] from closures. Hook points left unset pass the context through.
#[derive(Default)]
pub struct HandlerBuilder {
    start: Option<Box<StartFn>>,
    end: Option<Box<EndFn>>,
    error: Option<Box<ErrorFn>>,
}

impl HandlerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_start_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(Context, &RunInfo, &CallbackInput) -> Option<Context> + Send + Sync + 'static,
    {
        self.start = Some(Box::new(f));
        self
    }

    pub fn on_end_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(Context, &RunInfo, &CallbackOutput) -> Option<Context> + Send + Sync + 'static,
    {
        self.end = Some(Box::new(f));
        self
    }

    pub fn on_error_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(Context, &RunInfo, &(dyn Error + Send + Sync)) -> Option<Context>
            + Send
            + Sync
            + 'static,
    {
        self.error = Some(Box::new(f));
        self
    }

    pub fn build(self) -> Arc<dyn Handler> {
        Arc::new(BuiltHandler {
            start: self.start,
            end: self.end,
            error: self.error,
        })
    }
}

struct BuiltHandler {
    start: Option<Box<StartFn>>,
    end: Option<Box<EndFn>>,
    error: Option<Box<ErrorFn>>,
}

impl Handler for BuiltHandler {
    fn on_start(&self, ctx: Context, info: &RunInfo, input: &CallbackInput) -> Option<Context> {
        match &self.start {
            Some(f) => f(ctx, info, input),
            None => Some(ctx),
        }
    }

    fn on_end(&self, ctx: Context, info: &RunInfo, output: &CallbackOutput) -> Option<Context> {
        match &self.end {
            Some(f) => f(ctx, info, output),
            None => Some(ctx),
        }
    }

    fn on_error(
        &self,
        ctx: Context,
        info: &RunInfo,
        err: &(dyn Error + Send + Sync),
    ) -> Option<Context> {
        match &self.error {
            Some(f) => f(ctx, info, err),
            None => Some(ctx),
        }
    }
}
