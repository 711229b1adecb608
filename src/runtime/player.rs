//! Conversation playback runtime
//!
//! [`DialogPlayer`] walks a read-only [`Graph`] snapshot node by node:
//! typewriter reveal, auto-advance timers, choice selection, and inline
//! action chains. It is passive - the host owns the loop, feeding elapsed
//! time through [`tick`](DialogPlayer::tick) and input through
//! [`advance`](DialogPlayer::advance) / [`select_choice`](DialogPlayer::select_choice).
//!
//! All timers are cooperative suspensions inside `tick`; there are no
//! threads and no async runtime.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::actions::ActionRunner;
use crate::graph::{Graph, resolve};

use super::chain::{ChainPurpose, ChainStep, ChainWalk};
use super::config::PlayerConfig;
use super::event::{EndCallback, EventSink, PlaybackEvent};

/// Kind of the node currently being presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Presented {
    None,
    Dialog,
    Choice,
}

/// Typewriter reveal progress over the current line.
#[derive(Debug, Clone)]
struct Typing {
    revealed: usize,
    total: usize,
    carry: f32,
}

/// Pending auto-advance (or auto-end, when `next` is `None`).
#[derive(Debug, Clone)]
struct AutoTimer {
    remaining: f32,
    next: Option<String>,
}

/// Central runtime controller for conversation playback.
pub struct DialogPlayer {
    config: PlayerConfig,
    runner: ActionRunner,
    library: IndexMap<String, Arc<Graph>>,
    sinks: Vec<EventSink>,
    pending_events: Vec<PlaybackEvent>,
    on_ended: Option<EndCallback>,

    graph: Option<Arc<Graph>>,
    conversation_key: Option<String>,
    active: bool,
    paused: bool,
    autoplay: bool,

    current_id: Option<String>,
    presented: Presented,
    typing: Option<Typing>,
    /// Set while the current dialog line's post-reveal resolution has not
    /// run yet (entry, or a pause that force-revealed the line).
    needs_post_reveal: bool,
    pending_next: Option<String>,
    pending_choice: Option<String>,
    chain: Option<ChainWalk>,
    auto_timer: Option<AutoTimer>,
}

impl Default for DialogPlayer {
    fn default() -> Self {
        Self::new(PlayerConfig::default())
    }
}

impl DialogPlayer {
    #[must_use]
    pub fn new(config: PlayerConfig) -> Self {
        let autoplay = config.autoplay;
        Self {
            config,
            runner: ActionRunner::new(),
            library: IndexMap::new(),
            sinks: Vec::new(),
            pending_events: Vec::new(),
            on_ended: None,
            graph: None,
            conversation_key: None,
            active: false,
            paused: false,
            autoplay,
            current_id: None,
            presented: Presented::None,
            typing: None,
            needs_post_reveal: false,
            pending_next: None,
            pending_choice: None,
            chain: None,
            auto_timer: None,
        }
    }

    // ==================== Wiring ====================

    /// The action bridge this player dispatches action nodes through.
    #[must_use]
    pub fn actions(&self) -> &ActionRunner {
        &self.runner
    }

    /// Mutable access to the action bridge for registering bindings and
    /// handlers.
    pub fn actions_mut(&mut self) -> &mut ActionRunner {
        &mut self.runner
    }

    /// Playback settings.
    #[must_use]
    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Mutable access to playback settings.
    pub fn config_mut(&mut self) -> &mut PlayerConfig {
        &mut self.config
    }

    /// Subscribe to the playback event feed.
    pub fn subscribe(&mut self, sink: impl FnMut(&PlaybackEvent) + Send + 'static) {
        self.sinks.push(Box::new(sink));
    }

    /// Register a graph under an id for [`play_by_id`](Self::play_by_id).
    pub fn add_graph(&mut self, id: impl Into<String>, graph: impl Into<Arc<Graph>>) {
        self.library.insert(id.into(), graph.into());
    }

    // ==================== Conversation control ====================

    /// Start a conversation on the given graph.
    pub fn start(&mut self, graph: impl Into<Arc<Graph>>) {
        self.start_with(graph, None, None);
    }

    /// Start a conversation with an optional action scope key and an
    /// optional end callback.
    ///
    /// The key selects the per-conversation action scope consulted before
    /// the global one. The callback fires once when the conversation ends,
    /// after the exit event.
    pub fn start_with(
        &mut self,
        graph: impl Into<Arc<Graph>>,
        conversation_key: Option<&str>,
        on_ended: Option<EndCallback>,
    ) {
        let graph: Arc<Graph> = graph.into();

        // Starting over a running conversation replaces it outright; the
        // old end callback is discarded without firing.
        self.on_ended = None;
        self.clear_transients();
        self.conversation_key = conversation_key.map(str::to_string);
        self.on_ended = on_ended;
        self.autoplay = self.config.autoplay;
        self.active = true;
        self.paused = false;

        let entry = resolve::entry(&graph).map(String::from);
        tracing::debug!(entry = ?entry, "starting conversation");
        self.graph = Some(graph);

        self.emit(PlaybackEvent::ConversationReset);
        self.emit(PlaybackEvent::ConversationEntered);

        self.go_to(entry);
        self.flush_events();
    }

    /// Start the conversation registered under `id`.
    ///
    /// The id doubles as the action scope key. Returns false (with a
    /// warning logged) when no graph was registered under that id.
    pub fn play_by_id(&mut self, id: &str, on_ended: Option<EndCallback>) -> bool {
        let Some(graph) = self.library.get(id).cloned() else {
            tracing::warn!(id, "no graph registered for id");
            return false;
        };
        self.start_with(graph, Some(id), on_ended);
        true
    }

    /// Advance playback timers by `dt` seconds.
    ///
    /// Call once per host frame. Does nothing while idle or paused.
    pub fn tick(&mut self, dt: f32) {
        if !self.active || self.paused {
            return;
        }

        if self.chain.is_some() {
            self.drive_chain(dt);
        } else if self.typing.is_some() {
            self.advance_typing(dt);
        } else if let Some(timer) = &mut self.auto_timer {
            timer.remaining -= dt;
            if timer.remaining <= 0.0 {
                let next = self.auto_timer.take().and_then(|t| t.next);
                match next {
                    Some(next) => self.go_to(Some(next)),
                    None => self.end_conversation(),
                }
            }
        }

        self.flush_events();
    }

    /// Generic "user wants to proceed" input.
    ///
    /// During typing (when line-skipping is allowed) this reveals the full
    /// line; with a pending next node it advances; while awaiting a choice
    /// or while actions are resolving it is ignored; otherwise it ends the
    /// conversation.
    pub fn advance(&mut self) {
        if !self.active || self.paused {
            return;
        }

        if self.typing.is_some() {
            if !self.config.allow_skip_line {
                return;
            }
            self.typing = None;
            self.cancel_auto_timer();
            self.run_post_reveal();
            self.flush_events();
            return;
        }

        // Actions still resolving; transitions stay strictly sequential.
        if self.chain.is_some() {
            return;
        }

        // A choice (current or overlaid) only advances via select_choice.
        if self.pending_choice.is_some() || self.presented == Presented::Choice {
            return;
        }

        if self.presented == Presented::Dialog {
            if let Some(next) = self.pending_next.take() {
                self.go_to(Some(next));
                self.flush_events();
                return;
            }

            if self.needs_post_reveal {
                // A pause force-revealed this line before resolution ran;
                // resolve directly off the link table now.
                self.needs_post_reveal = false;
                let next = self.with_graph(|g, id| resolve::next_from_dialog(g, id).map(String::from));
                self.go_to(next);
                self.flush_events();
                return;
            }
        }

        self.end_conversation();
        self.flush_events();
    }

    /// Select the answer at `index` on the awaited choice node.
    ///
    /// Silent no-op outside the awaiting-choice state or with an
    /// out-of-range index.
    pub fn select_choice(&mut self, index: usize) {
        if !self.active || self.typing.is_some() || self.chain.is_some() {
            return;
        }

        let choice_id = match (&self.pending_choice, self.presented) {
            (Some(id), _) => id.clone(),
            (None, Presented::Choice) => match &self.current_id {
                Some(id) => id.clone(),
                None => return,
            },
            _ => return,
        };

        let Some(graph) = self.graph.clone() else {
            return;
        };
        let Some(node) = graph.choice(&choice_id) else {
            return;
        };
        let Some(picked) = node.choices.get(index) else {
            return;
        };

        self.emit(PlaybackEvent::ChoicePicked {
            node_id: choice_id.clone(),
            answer: picked.answer_text.clone(),
        });
        if let Some(hook) = &picked.on_selected {
            hook();
        }

        let next = resolve::next_from_choice(&graph, &choice_id, index).map(String::from);

        self.cancel_auto_timer();
        self.pending_choice = None;

        match next {
            Some(next) => self.go_to(Some(next)),
            None => self.end_conversation(),
        }
        self.flush_events();
    }

    /// Toggle autoplay, returning the new state.
    ///
    /// Affects only future post-reveal scheduling; an already-running timer
    /// keeps running, and explicit choices always wait for selection.
    pub fn toggle_autoplay(&mut self) -> bool {
        self.autoplay = !self.autoplay;
        self.autoplay
    }

    /// Whether autoplay is currently enabled.
    #[must_use]
    pub fn autoplay(&self) -> bool {
        self.autoplay
    }

    /// Skip and end the entire conversation, if allowed by configuration.
    pub fn skip_all(&mut self) {
        if !self.active || !self.config.allow_skip_all {
            return;
        }
        self.stop();
    }

    /// Immediately cancel all pending work and end the conversation.
    ///
    /// Safe to call from any state; fires the exit event exactly once per
    /// conversation and is a no-op while idle.
    pub fn stop(&mut self) {
        if !self.active {
            return;
        }
        self.end_conversation();
        self.flush_events();
    }

    /// Pause playback for an external view (e.g. a history overlay).
    ///
    /// Force-reveals the current line and freezes every timer until
    /// [`resume_from_external_view`](Self::resume_from_external_view).
    pub fn pause_for_external_view(&mut self) {
        self.paused = true;
        if self.typing.is_some() {
            // Reveal in place; post-reveal resolution stays deferred until
            // resume (the needs_post_reveal flag set at node entry).
            self.typing = None;
        }
        self.cancel_auto_timer();
    }

    /// Resume playback after an external view closes.
    ///
    /// Does not reschedule autoplay unless
    /// [`PlayerConfig::resume_restores_autoplay`] is set.
    pub fn resume_from_external_view(&mut self) {
        self.paused = false;

        if self.config.resume_restores_autoplay && self.autoplay {
            if self.needs_post_reveal {
                self.run_post_reveal();
            } else if let Some(next) = self.pending_next.clone() {
                self.schedule_auto_timer(Some(next));
            }
            self.flush_events();
        }
    }

    // ==================== Queries ====================

    /// Whether a conversation is currently active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the current line is still being revealed.
    #[must_use]
    pub fn is_typing(&self) -> bool {
        self.typing.is_some()
    }

    /// Whether playback is paused for an external view.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether an action chain is still resolving (pre-delays or waitable
    /// handlers pending). Advance input is ignored while this holds.
    #[must_use]
    pub fn is_resolving(&self) -> bool {
        self.chain.is_some()
    }

    /// Whether playback is waiting for a choice selection.
    #[must_use]
    pub fn is_awaiting_choice(&self) -> bool {
        self.active
            && self.typing.is_none()
            && self.chain.is_none()
            && (self.pending_choice.is_some() || self.presented == Presented::Choice)
    }

    /// Id of the node currently being presented.
    #[must_use]
    pub fn current_node_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    /// Full text of the current line (dialog or choice prompt), regardless
    /// of reveal progress. Empty when idle.
    #[must_use]
    pub fn current_line_text(&self) -> String {
        self.with_graph(|g, id| match self.presented {
            Presented::Dialog => g.dialog(id).map(|n| n.text.clone()),
            Presented::Choice => g.choice(id).map(|n| n.text.clone()),
            Presented::None => None,
        })
        .unwrap_or_default()
    }

    /// The portion of the current line revealed by the typewriter so far.
    #[must_use]
    pub fn revealed_text(&self) -> String {
        let full = self.current_line_text();
        match &self.typing {
            None => full,
            Some(typing) => full.chars().take(typing.revealed).collect(),
        }
    }

    /// Answer texts of the awaited choice node, in port order. Empty when
    /// not awaiting a choice.
    #[must_use]
    pub fn current_choices(&self) -> Vec<String> {
        if !self.is_awaiting_choice() {
            return Vec::new();
        }
        let choice_id = self
            .pending_choice
            .as_deref()
            .or_else(|| self.current_id.as_deref());
        let Some(graph) = &self.graph else {
            return Vec::new();
        };
        choice_id
            .and_then(|id| graph.choice(id))
            .map(|node| node.choices.iter().map(|c| c.answer_text.clone()).collect())
            .unwrap_or_default()
    }

    // ==================== Core flow ====================

    /// Move to `target`, first cancelling typing, timers, and pending
    /// transitions so resolutions never race.
    fn go_to(&mut self, target: Option<String>) {
        self.clear_transients();

        let Some(id) = target else {
            self.end_conversation();
            return;
        };
        let Some(graph) = self.graph.clone() else {
            self.end_conversation();
            return;
        };

        if graph.action(&id).is_some() {
            self.chain = Some(ChainWalk::new(Some(id), ChainPurpose::Enter));
            self.drive_chain(0.0);
        } else if graph.dialog(&id).is_some() {
            self.enter_dialog(&graph, id);
        } else if graph.choice(&id).is_some() {
            self.enter_choice(&graph, id);
        } else {
            // Dangling link, End marker, or unknown id.
            self.end_conversation();
        }
    }

    fn enter_dialog(&mut self, graph: &Graph, id: String) {
        let Some(node) = graph.dialog(&id) else {
            self.end_conversation();
            return;
        };
        let (speaker, text) = (node.speaker.clone(), node.text.clone());

        self.presented = Presented::Dialog;
        self.current_id = Some(id.clone());
        self.needs_post_reveal = true;

        self.emit(PlaybackEvent::LineShown {
            node_id: id,
            speaker,
            text: text.clone(),
        });
        self.start_typing(&text);
    }

    fn enter_choice(&mut self, graph: &Graph, id: String) {
        let Some(node) = graph.choice(&id) else {
            self.end_conversation();
            return;
        };
        let text = node.text.clone();

        self.presented = Presented::Choice;
        self.current_id = Some(id.clone());
        self.needs_post_reveal = false;

        self.emit(PlaybackEvent::LineShown {
            node_id: id,
            speaker: String::new(),
            text: text.clone(),
        });
        self.start_typing(&text);
    }

    fn start_typing(&mut self, text: &str) {
        let total = text.chars().count();
        if self.config.types_instantly() || total == 0 {
            self.typing = None;
            self.run_post_reveal();
            return;
        }
        self.typing = Some(Typing {
            revealed: 0,
            total,
            carry: 0.0,
        });
    }

    fn advance_typing(&mut self, dt: f32) {
        let speed = self.config.typing_speed;
        let Some(typing) = &mut self.typing else {
            return;
        };

        typing.carry += dt;
        while typing.carry >= speed && typing.revealed < typing.total {
            typing.revealed += 1;
            typing.carry -= speed;
        }

        if typing.revealed >= typing.total {
            self.typing = None;
            self.run_post_reveal();
        }
    }

    /// Post-reveal resolution: decide what follows the fully shown line.
    fn run_post_reveal(&mut self) {
        if self.paused {
            return;
        }
        self.needs_post_reveal = false;

        match self.presented {
            // A choice node waits for an explicit selection.
            Presented::Choice | Presented::None => {}
            Presented::Dialog => {
                let next = self.with_graph(|g, id| resolve::next_from_dialog(g, id).map(String::from));
                self.chain = Some(ChainWalk::new(next, ChainPurpose::Sequel));
                self.drive_chain(0.0);
            }
        }
    }

    fn drive_chain(&mut self, dt: f32) {
        let Some(graph) = self.graph.clone() else {
            return;
        };
        let key = self.conversation_key.clone();

        let status = match &mut self.chain {
            None => return,
            Some(chain) => chain.step(&graph, &mut self.runner, key.as_deref(), dt),
        };

        match status {
            ChainStep::Pending => {}
            ChainStep::Resolved(target) => {
                if let Some(chain) = self.chain.take() {
                    self.finish_chain(chain.purpose(), target);
                }
            }
        }
    }

    fn finish_chain(&mut self, purpose: ChainPurpose, target: Option<String>) {
        match purpose {
            ChainPurpose::Enter => self.enter_resolved(target),
            ChainPurpose::Sequel => self.sequel_resolved(target),
        }
    }

    fn enter_resolved(&mut self, target: Option<String>) {
        let Some(id) = target else {
            self.end_conversation();
            return;
        };
        let Some(graph) = self.graph.clone() else {
            self.end_conversation();
            return;
        };

        if graph.dialog(&id).is_some() {
            self.enter_dialog(&graph, id);
        } else if graph.choice(&id).is_some() {
            self.enter_choice(&graph, id);
        } else {
            self.end_conversation();
        }
    }

    fn sequel_resolved(&mut self, target: Option<String>) {
        let Some(graph) = self.graph.clone() else {
            self.end_conversation();
            return;
        };

        match target {
            None => {
                // Terminal line: wait for input, or auto-end under autoplay.
                if self.autoplay {
                    self.schedule_auto_timer(None);
                }
            }
            Some(id) if graph.choice(&id).is_some() => {
                // Choice overlaid on top of the current dialog line.
                self.pending_choice = Some(id);
            }
            Some(id) => {
                self.pending_next = Some(id.clone());
                if self.autoplay {
                    self.schedule_auto_timer(Some(id));
                }
            }
        }
    }

    fn schedule_auto_timer(&mut self, next: Option<String>) {
        let display_time = self
            .with_graph(|g, id| g.dialog(id).map(|n| n.display_time))
            .unwrap_or(0.0);
        let wait = if display_time < 1.0 {
            self.config.delay_before_auto_next
        } else {
            display_time
        };
        self.auto_timer = Some(AutoTimer {
            remaining: wait,
            next,
        });
    }

    fn end_conversation(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.clear_transients();
        self.current_id = None;
        self.presented = Presented::None;
        self.graph = None;
        self.conversation_key = None;

        self.emit(PlaybackEvent::ConversationReset);
        self.emit(PlaybackEvent::ConversationExited);
        if let Some(on_ended) = self.on_ended.take() {
            on_ended();
        }
    }

    // ==================== Helpers ====================

    fn clear_transients(&mut self) {
        self.typing = None;
        self.chain = None;
        self.auto_timer = None;
        self.pending_next = None;
        self.pending_choice = None;
        self.needs_post_reveal = false;
    }

    fn cancel_auto_timer(&mut self) {
        self.auto_timer = None;
    }

    fn with_graph<T>(&self, f: impl FnOnce(&Graph, &str) -> Option<T>) -> Option<T> {
        let graph = self.graph.as_ref()?;
        let id = self.current_id.as_deref()?;
        f(graph, id)
    }

    fn emit(&mut self, event: PlaybackEvent) {
        self.pending_events.push(event);
    }

    fn flush_events(&mut self) {
        if self.pending_events.is_empty() {
            return;
        }
        let events = std::mem::take(&mut self.pending_events);
        for event in &events {
            for sink in &mut self.sinks {
                sink(event);
            }
        }
    }
}

impl std::fmt::Debug for DialogPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogPlayer")
            .field("active", &self.active)
            .field("paused", &self.paused)
            .field("autoplay", &self.autoplay)
            .field("current_id", &self.current_id)
            .field("presented", &self.presented)
            .field("typing", &self.typing)
            .field("pending_next", &self.pending_next)
            .field("pending_choice", &self.pending_choice)
            .finish_non_exhaustive()
    }
}
