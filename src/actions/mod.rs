//! Action invocation bridge
//!
//! Dispatches action nodes to host-registered callbacks. Handlers are
//! organized into a global scope plus named per-conversation scopes; each
//! scope holds synchronous bindings (exact action-id match) and waitable
//! [`ActionHandler`]s (first `can_handle` match). Lookup prefers the
//! conversation scope and falls back to the global scope when enabled.
//!
//! # Usage
//!
//! ```
//! use dialograph::actions::ActionRunner;
//!
//! let mut runner = ActionRunner::new();
//! runner.global_mut().bind("OpenDoor", |payload| {
//!     println!("opening: {payload}");
//!     Ok(())
//! });
//! runner.conversation_mut("intro").bind("OpenDoor", |_| {
//!     // takes precedence while the "intro" conversation plays
//!     Ok(())
//! });
//! ```

mod handler;

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;

pub use handler::{ActionHandler, Completion};

use crate::graph::ActionNode;

/// Synchronous binding callback. Receives the action payload.
pub type BindingFn = Box<dyn FnMut(&str) -> anyhow::Result<()> + Send>;

struct ActionBinding {
    action_id: String,
    callback: BindingFn,
}

/// Bindings and handlers for one scope (global or a single conversation).
#[derive(Default)]
pub struct ActionSet {
    bindings: Vec<ActionBinding>,
    handlers: Vec<Box<dyn ActionHandler>>,
}

impl ActionSet {
    /// Register a synchronous binding for an exact action id.
    ///
    /// Within a scope the first binding whose id matches wins; later
    /// bindings for the same id never fire.
    pub fn bind(
        &mut self,
        action_id: impl Into<String>,
        callback: impl FnMut(&str) -> anyhow::Result<()> + Send + 'static,
    ) {
        self.bindings.push(ActionBinding {
            action_id: action_id.into(),
            callback: Box::new(callback),
        });
    }

    /// Register a waitable handler. Handlers are consulted in registration
    /// order.
    pub fn add_handler(&mut self, handler: impl ActionHandler + 'static) {
        self.handlers.push(Box::new(handler));
    }

    /// Number of registered bindings.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Fire the first binding matching `action_id`. Returns whether one
    /// matched. A binding that fails still counts as matched; the failure
    /// is logged and swallowed.
    fn fire_binding(&mut self, action_id: &str, payload: &str) -> bool {
        for binding in &mut self.bindings {
            if binding.action_id == action_id {
                if let Err(err) = (binding.callback)(payload) {
                    tracing::warn!(action = action_id, "binding failed: {err:#}");
                }
                return true;
            }
        }
        false
    }

    /// Start the first handler that can service `action_id`. A handler that
    /// fails to start is logged and treated as absent.
    fn begin_handler(&mut self, action_id: &str, payload: &str) -> Option<Completion> {
        let handler = self.handlers.iter_mut().find(|h| h.can_handle(action_id))?;
        match handler.handle(action_id, payload) {
            Ok(completion) => Some(completion),
            Err(err) => {
                tracing::warn!(action = action_id, "handler failed to start: {err:#}");
                None
            }
        }
    }
}

impl fmt::Debug for ActionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionSet")
            .field("bindings", &self.bindings.len())
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// Which scopes an invocation consults.
#[derive(Debug, Clone, PartialEq, Eq)]
enum InvokeScope {
    /// Global scope only, regardless of the fallback setting.
    GlobalOnly,
    /// The named conversation scope (if any), falling back to global when
    /// fallback is enabled.
    Conversation(Option<String>),
}

/// Registry of action bindings and handlers, global and per-conversation.
pub struct ActionRunner {
    global: ActionSet,
    conversations: IndexMap<String, ActionSet>,
    use_global_fallback: bool,
    warned_unhandled: HashSet<String>,
}

impl Default for ActionRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionRunner {
    #[must_use]
    pub fn new() -> Self {
        Self {
            global: ActionSet::default(),
            conversations: IndexMap::new(),
            use_global_fallback: true,
            warned_unhandled: HashSet::new(),
        }
    }

    /// The global scope, shared across conversations.
    #[must_use]
    pub fn global(&self) -> &ActionSet {
        &self.global
    }

    /// Mutable access to the global scope.
    pub fn global_mut(&mut self) -> &mut ActionSet {
        &mut self.global
    }

    /// The scope for a conversation key, if one was registered.
    #[must_use]
    pub fn conversation(&self, key: &str) -> Option<&ActionSet> {
        self.conversations.get(key)
    }

    /// Mutable access to a conversation scope, creating it if absent.
    pub fn conversation_mut(&mut self, key: impl Into<String>) -> &mut ActionSet {
        self.conversations.entry(key.into()).or_default()
    }

    /// Whether unmatched conversation lookups fall back to the global scope
    /// (enabled by default).
    pub fn set_global_fallback(&mut self, enabled: bool) {
        self.use_global_fallback = enabled;
    }

    /// Invoke an [`ActionNode`] under a conversation scope.
    ///
    /// Returns an [`Invocation`] honoring the node's pre-delay and wait
    /// flag; drive it with [`Invocation::tick`] until it reports done.
    #[must_use]
    pub fn run_node(&self, node: &ActionNode, conversation_key: Option<&str>) -> Invocation {
        Invocation::new(
            InvokeScope::Conversation(conversation_key.map(str::to_string)),
            &node.action_id,
            &node.payload,
            node.wait_for_completion,
            node.wait_seconds,
        )
    }

    /// Invoke an action against the global scope only.
    #[must_use]
    pub fn run_global(
        &self,
        action_id: &str,
        payload: &str,
        wait_for_completion: bool,
        wait_seconds: f32,
    ) -> Invocation {
        Invocation::new(
            InvokeScope::GlobalOnly,
            action_id,
            payload,
            wait_for_completion,
            wait_seconds,
        )
    }

    /// Invoke an action for a specific conversation, with global fallback
    /// when enabled.
    #[must_use]
    pub fn run_for_conversation(
        &self,
        conversation_key: &str,
        action_id: &str,
        payload: &str,
        wait_for_completion: bool,
        wait_seconds: f32,
    ) -> Invocation {
        Invocation::new(
            InvokeScope::Conversation(Some(conversation_key.to_string())),
            action_id,
            payload,
            wait_for_completion,
            wait_seconds,
        )
    }

    fn fire_bindings(&mut self, scope: &InvokeScope, action_id: &str, payload: &str) -> bool {
        match scope {
            InvokeScope::GlobalOnly => self.global.fire_binding(action_id, payload),
            InvokeScope::Conversation(key) => {
                let mut invoked = false;
                if let Some(set) = key.as_deref().and_then(|k| self.conversations.get_mut(k)) {
                    invoked = set.fire_binding(action_id, payload);
                }
                if !invoked && self.use_global_fallback {
                    invoked = self.global.fire_binding(action_id, payload);
                }
                invoked
            }
        }
    }

    fn begin_wait(
        &mut self,
        scope: &InvokeScope,
        action_id: &str,
        payload: &str,
    ) -> Option<Completion> {
        match scope {
            InvokeScope::GlobalOnly => self.global.begin_handler(action_id, payload),
            InvokeScope::Conversation(key) => {
                if let Some(set) = key.as_deref().and_then(|k| self.conversations.get_mut(k))
                    && let Some(completion) = set.begin_handler(action_id, payload)
                {
                    return Some(completion);
                }
                if self.use_global_fallback {
                    self.global.begin_handler(action_id, payload)
                } else {
                    None
                }
            }
        }
    }

    fn note_unhandled(&mut self, action_id: &str) {
        if self.warned_unhandled.insert(action_id.to_string()) {
            tracing::warn!(action = action_id, "no binding or handler registered for action id");
        }
    }
}

impl fmt::Debug for ActionRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRunner")
            .field("global", &self.global)
            .field("conversations", &self.conversations.len())
            .field("use_global_fallback", &self.use_global_fallback)
            .finish()
    }
}

/// One in-flight action invocation: pre-delay, binding fire, optional wait.
///
/// Drive with [`tick`](Invocation::tick) until it returns true. Passing
/// `dt = 0.0` lets delay-free, immediately-complete actions finish within
/// a single call.
#[derive(Debug)]
pub struct Invocation {
    scope: InvokeScope,
    action_id: String,
    payload: String,
    wait_for_completion: bool,
    delay_remaining: f32,
    invoked: bool,
    completion: Option<Completion>,
}

impl Invocation {
    fn new(
        scope: InvokeScope,
        action_id: &str,
        payload: &str,
        wait_for_completion: bool,
        wait_seconds: f32,
    ) -> Self {
        Self {
            scope,
            action_id: action_id.to_string(),
            payload: payload.to_string(),
            wait_for_completion,
            delay_remaining: wait_seconds.max(0.0),
            invoked: false,
            completion: None,
        }
    }

    /// The action id being invoked.
    #[must_use]
    pub fn action_id(&self) -> &str {
        &self.action_id
    }

    /// Advance by `dt` seconds. Returns true once the invocation (pre-delay,
    /// binding, and any awaited handler) has fully finished.
    pub fn tick(&mut self, runner: &mut ActionRunner, dt: f32) -> bool {
        let mut dt = dt;

        if self.delay_remaining > 0.0 {
            self.delay_remaining -= dt;
            if self.delay_remaining > 0.0 {
                return false;
            }
            // Leftover time past the delay flows into the completion poll.
            dt = -self.delay_remaining;
            self.delay_remaining = 0.0;
        }

        if !self.invoked {
            self.invoked = true;
            let bound = runner.fire_bindings(&self.scope, &self.action_id, &self.payload);
            if self.wait_for_completion {
                self.completion = runner.begin_wait(&self.scope, &self.action_id, &self.payload);
                if !bound && self.completion.is_none() {
                    runner.note_unhandled(&self.action_id);
                }
            } else if !bound {
                runner.note_unhandled(&self.action_id);
            }
        }

        match &mut self.completion {
            None => true,
            Some(completion) => {
                if completion.poll(dt) {
                    self.completion = None;
                    true
                } else {
                    false
                }
            }
        }
    }
}
