//! Debate orchestration logic.
//!
//! [`DebateOrchestrator`] owns the turn-taking state machine:
//!
//! ```text
//! Idle ──start──▶ Running ──stop / timeout / error──▶ Summarizing ──▶ Ended
//!   ▲                                                                   │
//!   └───────────────────────── change_topic_or_styles ──────────────────┘
//! ```
//!
//! Each run is a spawned task alternating turns between two sessions plus
//! a countdown task. Both share a [`RunContext`] whose cancellation tokens
//! are checked before a new turn starts and before a turn is committed.
//! All state mutations go through a generation check so that a torn-down
//! run can never touch the state of its successor.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, interval_at, sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::config::{Config, DebateSettings};
use crate::error::DebateError;
use crate::participant::{DebaterId, Debaters};
use crate::persona::DebateStyles;
use crate::session::{ChatSession, LanguageModel};
use crate::summarizer::{SUMMARY_FALLBACK, Summarizer};
use crate::topic::Topic;
use crate::transcript::{
    DebatePhase, DebateRunState, DebateSummary, Message, StopReason, transcript_text,
};

/// Text of the synthetic message appended when a turn fails.
pub const TURN_ERROR_MESSAGE: &str = "An error occurred. The debate has ended.";

/// The environment's invitation that opens every debate. Never rendered
/// as a transcript message.
pub fn opening_prompt(question: &str) -> String {
    format!(
        "Let's begin the debate on: {}. Please provide your opening statement in a concise and impactful manner.",
        question
    )
}

/// Orchestrates debates between two AI debaters.
pub struct DebateOrchestrator {
    model: Arc<dyn LanguageModel>,
    summarizer: Summarizer,
    settings: DebateSettings,
    debaters: Debaters,
    state: Arc<watch::Sender<DebateRunState>>,
    run: Option<RunHandle>,
}

struct RunHandle {
    generation: u64,
    teardown: CancellationToken,
    stop: CancellationToken,
}

impl DebateOrchestrator {
    /// Create an idle orchestrator.
    pub fn new(model: Arc<dyn LanguageModel>, settings: DebateSettings, debaters: Debaters) -> Self {
        let (state, _) = watch::channel(DebateRunState::default());
        Self {
            summarizer: Summarizer::new(model.clone()),
            model,
            settings,
            debaters,
            state: Arc::new(state),
            run: None,
        }
    }

    /// Create an orchestrator from a loaded configuration.
    pub fn from_config(model: Arc<dyn LanguageModel>, config: &Config) -> Self {
        Self::new(model, config.debate.clone(), config.debaters.debaters())
    }

    /// Subscribe to state changes. Every transition is published.
    pub fn subscribe(&self) -> watch::Receiver<DebateRunState> {
        self.state.subscribe()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> DebateRunState {
        self.state.borrow().clone()
    }

    pub fn debaters(&self) -> &Debaters {
        &self.debaters
    }

    pub fn settings(&self) -> &DebateSettings {
        &self.settings
    }

    /// Start a new debate. Must be called from within a tokio runtime.
    ///
    /// Fails with [`DebateError::InvalidState`] while a debate is running;
    /// call [`change_topic_or_styles`](Self::change_topic_or_styles) first.
    /// Fails with [`DebateError::ConfigError`] if the debaters' names are
    /// blank or identical. Any finished or summarizing run is torn down.
    pub fn start_debate(
        &mut self,
        topic: Topic,
        styles: DebateStyles,
        time_budget_secs: u64,
    ) -> Result<(), DebateError> {
        if self.state.borrow().is_running() {
            return Err(DebateError::InvalidState(
                "a debate is already running; reset it before starting another".to_string(),
            ));
        }
        if topic.question.trim().is_empty() {
            return Err(DebateError::InvalidTopic(
                "topic question cannot be empty".to_string(),
            ));
        }
        self.debaters.validate()?;

        self.teardown();

        let (persona_a, persona_b) = styles.personas(&self.debaters, &topic.question);
        let sessions = DebaterSessions {
            a: self.model.create_session(&persona_a),
            b: self.model.create_session(&persona_b),
        };
        let opening = opening_prompt(&topic.question);

        let teardown = CancellationToken::new();
        let stop = teardown.child_token();
        let mut generation = 0;
        self.state.send_modify(|s| {
            generation = s.generation + 1;
            *s = DebateRunState {
                generation,
                phase: DebatePhase::Running,
                is_debating: true,
                has_started: true,
                time_left: time_budget_secs,
                topic: Some(topic.clone()),
                styles: Some(styles),
                ..DebateRunState::default()
            };
        });

        let ctx = RunContext {
            generation,
            state: self.state.clone(),
            teardown: teardown.clone(),
            stop: stop.clone(),
        };
        let span = info_span!("debate", generation, topic = %topic.title);
        info!(parent: &span, question = %topic.question, a = %styles.a, b = %styles.b, time_budget_secs, "debate started");

        tokio::spawn(
            run_countdown(
                ctx.clone(),
                self.settings.tick(),
                self.settings.countdown_during_summary,
            )
            .instrument(span.clone()),
        );
        tokio::spawn(
            run_debate(
                ctx,
                sessions,
                self.summarizer.clone(),
                self.debaters.clone(),
                opening,
                self.settings.clone(),
            )
            .instrument(span),
        );

        self.run = Some(RunHandle {
            generation,
            teardown,
            stop,
        });
        Ok(())
    }

    /// Ask the running debate to stop. A turn already in flight still
    /// completes and is appended; no further turn starts. Repeated calls
    /// are harmless.
    pub fn stop_debate(&self) {
        if let Some(run) = &self.run {
            let ctx = RunContext {
                generation: run.generation,
                state: self.state.clone(),
                teardown: run.teardown.clone(),
                stop: run.stop.clone(),
            };
            ctx.request_stop(StopReason::User);
        }
    }

    /// Discard the current run, if any, and return to `Idle` with an empty
    /// transcript, no summary and no timer.
    pub fn change_topic_or_styles(&mut self) {
        self.teardown();
        self.state.send_modify(|s| {
            let generation = s.generation + 1;
            *s = DebateRunState {
                generation,
                ..DebateRunState::default()
            };
        });
    }

    /// Wait until the current run has ended (or been reset) and return the
    /// final state.
    pub async fn wait_for_end(&self) -> Result<DebateRunState, DebateError> {
        let mut rx = self.subscribe();
        let state = rx
            .wait_for(|s| matches!(s.phase, DebatePhase::Ended | DebatePhase::Idle))
            .await
            .map_err(|e| DebateError::InvalidState(format!("state channel closed: {}", e)))?;
        Ok(state.clone())
    }

    fn teardown(&mut self) {
        if let Some(run) = self.run.take() {
            debug!(generation = run.generation, "tearing down debate run");
            run.teardown.cancel();
        }
    }
}

impl Drop for DebateOrchestrator {
    fn drop(&mut self) {
        self.teardown();
    }
}

struct DebaterSessions {
    a: Box<dyn ChatSession>,
    b: Box<dyn ChatSession>,
}

impl DebaterSessions {
    fn get_mut(&mut self, id: DebaterId) -> &mut dyn ChatSession {
        match id {
            DebaterId::A => self.a.as_mut(),
            DebaterId::B => self.b.as_mut(),
        }
    }
}

/// Handles shared by the tasks of one run.
#[derive(Clone)]
struct RunContext {
    generation: u64,
    state: Arc<watch::Sender<DebateRunState>>,
    /// Cancelled when the run is superseded or its owner goes away.
    teardown: CancellationToken,
    /// Child of `teardown`; cancelled when the debate should stop.
    stop: CancellationToken,
}

impl RunContext {
    /// Apply `f` if this run is still the live one. Returns whether `f`
    /// reported a change; `false` also means the run is gone.
    fn mutate(&self, f: impl FnOnce(&mut DebateRunState) -> bool) -> bool {
        if self.teardown.is_cancelled() {
            return false;
        }
        self.state.send_if_modified(|s| {
            if s.generation != self.generation {
                return false;
            }
            f(s)
        })
    }

    fn update(&self, f: impl FnOnce(&mut DebateRunState)) -> bool {
        self.mutate(|s| {
            f(s);
            true
        })
    }

    /// Record `reason` unless the run already stopped, then cancel.
    fn request_stop(&self, reason: StopReason) {
        let recorded = self.mutate(|s| {
            if s.phase != DebatePhase::Running || s.stop_reason.is_some() {
                return false;
            }
            s.stop_reason = Some(reason);
            s.is_debating = false;
            true
        });
        if recorded {
            info!(reason = ?reason, "debate stopping");
        }
        self.stop.cancel();
    }

    fn time_left(&self) -> u64 {
        self.state.borrow().time_left
    }
}

/// Sleep for `delay`, returning early if the debate stops.
async fn pause(ctx: &RunContext, delay: Duration) {
    tokio::select! {
        _ = ctx.stop.cancelled() => {}
        _ = sleep(delay) => {}
    }
}

async fn send_turn(
    session: &mut dyn ChatSession,
    prompt: &str,
    limit: Option<Duration>,
) -> Result<String, DebateError> {
    match limit {
        Some(limit) => timeout(limit, session.send(prompt)).await.map_err(|_| {
            DebateError::Provider(format!("no reply within {} seconds", limit.as_secs()))
        })?,
        None => session.send(prompt).await,
    }
}

async fn run_debate(
    ctx: RunContext,
    mut sessions: DebaterSessions,
    summarizer: Summarizer,
    debaters: Debaters,
    opening: String,
    settings: DebateSettings,
) {
    if !run_turns(&ctx, &mut sessions, opening, &settings).await {
        return;
    }
    // Sessions are not needed past this point.
    drop(sessions);
    summarize(&ctx, &summarizer, &debaters).await;
}

/// Alternate turns until the debate stops. Returns `false` if the run was
/// torn down.
async fn run_turns(
    ctx: &RunContext,
    sessions: &mut DebaterSessions,
    opening: String,
    settings: &DebateSettings,
) -> bool {
    let mut current = DebaterId::A;
    let mut prompt = opening;

    pause(ctx, settings.opening_delay()).await;

    loop {
        if ctx.stop.is_cancelled() {
            break;
        }
        if !ctx.update(|s| s.is_thinking = Some(current)) {
            return false;
        }

        debug!(debater = %current, "turn started");
        let outcome = tokio::select! {
            biased;
            _ = ctx.teardown.cancelled() => return false,
            outcome = send_turn(sessions.get_mut(current), &prompt, settings.turn_timeout()) => outcome,
        };

        match outcome {
            Ok(reply) => {
                let message = Message::new(current, reply.clone());
                let committed = ctx.update(|s| {
                    s.messages.push(message);
                    s.is_thinking = None;
                });
                if !committed {
                    return false;
                }
                info!(debater = %current, chars = reply.len(), "turn committed");

                if ctx.stop.is_cancelled() {
                    break;
                }
                prompt = reply;
                current = current.opponent();
                pause(ctx, settings.pacing_delay()).await;
            }
            Err(err) => {
                warn!(debater = %current, error = %err, "turn failed, ending debate");
                let appended = ctx.update(|s| {
                    s.messages.push(Message::new(DebaterId::A, TURN_ERROR_MESSAGE));
                    s.is_thinking = None;
                });
                if !appended {
                    return false;
                }
                ctx.request_stop(StopReason::Error);
                break;
            }
        }
    }

    ctx.update(|s| {
        s.is_thinking = None;
        s.is_debating = false;
    })
}

/// Summarize the finished transcript, once, or end without a summary if
/// nothing was said.
async fn summarize(ctx: &RunContext, summarizer: &Summarizer, debaters: &Debaters) {
    let messages = {
        let state = ctx.state.borrow();
        if state.generation != ctx.generation {
            return;
        }
        state.messages.clone()
    };

    if messages.is_empty() {
        info!("debate ended with an empty transcript, skipping summary");
        ctx.update(|s| s.phase = DebatePhase::Ended);
        return;
    }

    if !ctx.update(|s| {
        s.phase = DebatePhase::Summarizing;
        s.is_summarizing = true;
    }) {
        return;
    }

    let text = transcript_text(&messages, debaters);
    let result = tokio::select! {
        biased;
        _ = ctx.teardown.cancelled() => return,
        result = summarizer.summarize(&text, &debaters.a.name, &debaters.b.name) => result,
    };

    let summary = result.unwrap_or_else(|err| {
        warn!(error = %err, "summary failed, using fallback");
        DebateSummary {
            a: SUMMARY_FALLBACK.to_string(),
            b: SUMMARY_FALLBACK.to_string(),
        }
    });

    if ctx.update(|s| {
        s.summary = Some(summary);
        s.is_summarizing = false;
        s.phase = DebatePhase::Ended;
    }) {
        info!(messages = messages.len(), "debate ended");
    }
}

/// Tick the countdown once per `tick` until it reaches zero, the debate
/// stops (unless `during_summary`), or the run ends.
async fn run_countdown(ctx: RunContext, tick: Duration, during_summary: bool) {
    if ctx.time_left() == 0 {
        ctx.request_stop(StopReason::Timeout);
        return;
    }

    let mut ticks = interval_at(Instant::now() + tick, tick);
    loop {
        tokio::select! {
            biased;
            _ = ctx.teardown.cancelled() => return,
            _ = ctx.stop.cancelled(), if !during_summary => return,
            _ = ticks.tick() => {}
        }

        let mut remaining = 0;
        let counted = ctx.mutate(|s| {
            if s.phase == DebatePhase::Ended {
                return false;
            }
            s.time_left = s.time_left.saturating_sub(1);
            remaining = s.time_left;
            true
        });
        if !counted {
            return;
        }
        if remaining == 0 {
            ctx.request_stop(StopReason::Timeout);
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::Style;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Scripted {
        Reply(&'static str),
        Fail,
        Stall,
    }

    #[derive(Default)]
    struct Script {
        replies: Mutex<VecDeque<Scripted>>,
        latency: Duration,
        summary_latency: Duration,
        fail_summary: bool,
        /// (persona, prompt) for every send, in call order.
        sends: Mutex<Vec<(String, String)>>,
        summary_calls: AtomicUsize,
        turns: AtomicUsize,
    }

    struct ScriptedModel {
        script: Arc<Script>,
    }

    struct ScriptedSession {
        persona: String,
        script: Arc<Script>,
    }

    #[async_trait]
    impl ChatSession for ScriptedSession {
        async fn send(&mut self, message: &str) -> Result<String, DebateError> {
            self.script
                .sends
                .lock()
                .unwrap()
                .push((self.persona.clone(), message.to_string()));
            let n = self.script.turns.fetch_add(1, Ordering::SeqCst) + 1;
            let next = self.script.replies.lock().unwrap().pop_front();
            sleep(self.script.latency).await;
            match next {
                Some(Scripted::Reply(text)) => Ok(text.to_string()),
                Some(Scripted::Fail) => Err(DebateError::Provider("connection reset".into())),
                Some(Scripted::Stall) => std::future::pending().await,
                None => Ok(format!("turn {}", n)),
            }
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        fn create_session(&self, persona: &str) -> Box<dyn ChatSession> {
            Box::new(ScriptedSession {
                persona: persona.to_string(),
                script: self.script.clone(),
            })
        }

        async fn generate_structured(
            &self,
            _prompt: &str,
            _schema_name: &str,
            _schema: &Value,
        ) -> Result<Value, DebateError> {
            self.script.summary_calls.fetch_add(1, Ordering::SeqCst);
            sleep(self.script.summary_latency).await;
            if self.script.fail_summary {
                return Err(DebateError::Provider("summary service unavailable".into()));
            }
            Ok(json!({ "Logos": "Argued in favor.", "Pathos": "Argued against." }))
        }
    }

    fn script(replies: Vec<Scripted>) -> Script {
        Script {
            replies: Mutex::new(replies.into()),
            latency: Duration::from_secs(1),
            ..Script::default()
        }
    }

    fn orchestrator(script: Script, settings: DebateSettings) -> (DebateOrchestrator, Arc<Script>) {
        orchestrator_with(script, settings, Debaters::default())
    }

    fn orchestrator_with(
        script: Script,
        settings: DebateSettings,
        debaters: Debaters,
    ) -> (DebateOrchestrator, Arc<Script>) {
        let script = Arc::new(script);
        let model = Arc::new(ScriptedModel {
            script: script.clone(),
        });
        (DebateOrchestrator::new(model, settings, debaters), script)
    }

    fn topic() -> Topic {
        Topic::new("Remote Work", "Should remote work be the default?", "💻")
    }

    fn assert_alternates(messages: &[Message]) {
        for (i, message) in messages.iter().enumerate() {
            let expected = if i % 2 == 0 { DebaterId::A } else { DebaterId::B };
            assert_eq!(message.debater_id, expected, "message {} out of turn", i);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_scripted_replies_alternate_starting_with_a() {
        let (mut debate, script) = orchestrator(
            script(vec![
                Scripted::Reply("r1"),
                Scripted::Reply("r2"),
                Scripted::Reply("r3"),
            ]),
            DebateSettings::default(),
        );

        // r3 commits at 6.5s; the 7s budget expires during the next pause.
        debate
            .start_debate(topic(), DebateStyles::default(), 7)
            .unwrap();
        let end = debate.wait_for_end().await.unwrap();

        let turns: Vec<(DebaterId, &str)> = end
            .messages
            .iter()
            .map(|m| (m.debater_id, m.text.as_str()))
            .collect();
        assert_eq!(
            turns,
            vec![(DebaterId::A, "r1"), (DebaterId::B, "r2"), (DebaterId::A, "r3")]
        );
        assert_eq!(end.stop_reason, Some(StopReason::Timeout));
        assert_eq!(end.phase, DebatePhase::Ended);
        assert!(end.summary.is_some());
        assert!(end.is_thinking.is_none());

        let sends = script.sends.lock().unwrap();
        assert_eq!(sends[0].1, opening_prompt("Should remote work be the default?"));
        assert!(sends[0].0.contains("'Logos'"));
        assert_eq!(sends[1].1, "r1");
        assert!(sends[1].0.contains("'Pathos'"));
        assert_eq!(sends[2].1, "r2");
        assert!(sends[2].0.contains("'Logos'"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_stops_within_budget() {
        let (mut debate, _script) = orchestrator(script(vec![]), DebateSettings::default());
        let started = Instant::now();

        debate
            .start_debate(topic(), DebateStyles::default(), 10)
            .unwrap();
        let mut rx = debate.subscribe();
        rx.wait_for(|s| s.stop_reason.is_some()).await.unwrap();

        // Ten ticks, allowing for timer granularity but not an eleventh tick.
        assert!(started.elapsed() < Duration::from_millis(10_500));
        let state = debate.state();
        assert_eq!(state.stop_reason, Some(StopReason::Timeout));
        assert_eq!(state.time_left, 0);
        assert!(!state.is_debating);

        let end = debate.wait_for_end().await.unwrap();
        assert!(!end.messages.is_empty());
        assert_alternates(&end.messages);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_lets_in_flight_turn_commit() {
        let mut slow = script(vec![]);
        slow.latency = Duration::from_secs(2);
        let (mut debate, script) = orchestrator(slow, DebateSettings::default());

        debate
            .start_debate(topic(), DebateStyles::default(), 60)
            .unwrap();
        sleep(Duration::from_secs(1)).await;
        assert_eq!(debate.state().is_thinking, Some(DebaterId::A));

        debate.stop_debate();
        debate.stop_debate();
        assert!(!debate.state().is_debating);

        let end = debate.wait_for_end().await.unwrap();
        assert_eq!(end.messages.len(), 1);
        assert_eq!(end.messages[0].debater_id, DebaterId::A);
        assert_eq!(end.stop_reason, Some(StopReason::User));
        assert_eq!(script.turns.load(Ordering::SeqCst), 1);
        assert_eq!(script.summary_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_before_first_reply_skips_summary() {
        let (mut debate, script) = orchestrator(script(vec![]), DebateSettings::default());

        debate
            .start_debate(topic(), DebateStyles::default(), 60)
            .unwrap();
        sleep(Duration::from_millis(200)).await;
        debate.stop_debate();

        let end = debate.wait_for_end().await.unwrap();
        assert!(end.messages.is_empty());
        assert!(end.summary.is_none());
        assert!(!end.is_summarizing);
        assert_eq!(end.phase, DebatePhase::Ended);
        assert_eq!(script.turns.load(Ordering::SeqCst), 0);
        assert_eq!(script.summary_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_racing_manual_stop_summarizes_once() {
        let (mut debate, script) = orchestrator(script(vec![]), DebateSettings::default());

        debate
            .start_debate(topic(), DebateStyles::default(), 2)
            .unwrap();
        sleep(Duration::from_secs(2)).await;
        debate.stop_debate();
        debate.stop_debate();

        let end = debate.wait_for_end().await.unwrap();
        assert!(end.stop_reason.is_some());
        assert!(end.summary.is_some());
        assert_eq!(script.summary_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_provider_error_appends_terminal_message() {
        let (mut debate, script) = orchestrator(
            script(vec![Scripted::Reply("r1"), Scripted::Fail]),
            DebateSettings::default(),
        );

        debate
            .start_debate(topic(), DebateStyles::default(), 60)
            .unwrap();
        let end = debate.wait_for_end().await.unwrap();

        assert_eq!(end.messages.len(), 2);
        assert_eq!(end.messages[0].text, "r1");
        assert_eq!(end.messages[1].debater_id, DebaterId::A);
        assert_eq!(end.messages[1].text, TURN_ERROR_MESSAGE);
        assert_eq!(end.stop_reason, Some(StopReason::Error));
        assert_eq!(script.turns.load(Ordering::SeqCst), 2);
        assert_eq!(script.summary_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_turn_timeout_ends_stalled_debate() {
        let settings = DebateSettings {
            turn_timeout_secs: Some(5),
            ..DebateSettings::default()
        };
        let (mut debate, _script) = orchestrator(script(vec![Scripted::Stall]), settings);

        debate
            .start_debate(topic(), DebateStyles::default(), 60)
            .unwrap();
        let end = debate.wait_for_end().await.unwrap();

        assert_eq!(end.messages.len(), 1);
        assert_eq!(end.messages[0].text, TURN_ERROR_MESSAGE);
        assert_eq!(end.stop_reason, Some(StopReason::Error));
        assert_eq!(end.time_left, 55);
    }

    #[tokio::test(start_paused = true)]
    async fn test_summary_failure_uses_fallback() {
        let mut failing = script(vec![]);
        failing.fail_summary = true;
        let (mut debate, script) = orchestrator(failing, DebateSettings::default());

        debate
            .start_debate(topic(), DebateStyles::default(), 5)
            .unwrap();
        let end = debate.wait_for_end().await.unwrap();

        assert_eq!(
            end.summary,
            Some(DebateSummary {
                a: SUMMARY_FALLBACK.to_string(),
                b: SUMMARY_FALLBACK.to_string(),
            })
        );
        assert!(!end.is_summarizing);
        assert_eq!(script.summary_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_summarizing_flag_and_result() {
        let mut slow_summary = script(vec![]);
        slow_summary.summary_latency = Duration::from_secs(3);
        let (mut debate, _script) = orchestrator(slow_summary, DebateSettings::default());

        debate
            .start_debate(topic(), DebateStyles::default(), 60)
            .unwrap();
        sleep(Duration::from_millis(1200)).await;
        debate.stop_debate();

        let mut rx = debate.subscribe();
        rx.wait_for(|s| s.phase == DebatePhase::Summarizing)
            .await
            .unwrap();
        assert!(debate.state().is_summarizing);

        let end = debate.wait_for_end().await.unwrap();
        assert!(!end.is_summarizing);
        let summary = end.summary.unwrap();
        assert_eq!(summary.get(DebaterId::A), "Argued in favor.");
        assert_eq!(summary.get(DebaterId::B), "Argued against.");
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_pauses_during_summary_by_default() {
        let mut slow_summary = script(vec![]);
        slow_summary.latency = Duration::from_millis(500);
        slow_summary.summary_latency = Duration::from_secs(3);
        let (mut debate, _script) = orchestrator(slow_summary, DebateSettings::default());

        debate
            .start_debate(topic(), DebateStyles::default(), 10)
            .unwrap();
        sleep(Duration::from_millis(1200)).await;
        debate.stop_debate();

        let end = debate.wait_for_end().await.unwrap();
        assert_eq!(end.time_left, 9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_can_continue_during_summary() {
        let mut slow_summary = script(vec![]);
        slow_summary.latency = Duration::from_millis(500);
        slow_summary.summary_latency = Duration::from_secs(3);
        let settings = DebateSettings {
            countdown_during_summary: true,
            ..DebateSettings::default()
        };
        let (mut debate, _script) = orchestrator(slow_summary, settings);

        debate
            .start_debate(topic(), DebateStyles::default(), 10)
            .unwrap();
        sleep(Duration::from_millis(1200)).await;
        debate.stop_debate();

        let end = debate.wait_for_end().await.unwrap();
        assert_eq!(end.time_left, 6);

        // The countdown halts once the run has ended.
        sleep(Duration::from_secs(5)).await;
        assert_eq!(debate.state().time_left, 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_while_running_clears_state() {
        let (mut debate, script) = orchestrator(script(vec![]), DebateSettings::default());

        debate
            .start_debate(topic(), DebateStyles::default(), 60)
            .unwrap();
        sleep(Duration::from_secs(4)).await;
        assert!(!debate.state().messages.is_empty());

        debate.change_topic_or_styles();
        let state = debate.state();
        assert_eq!(state.phase, DebatePhase::Idle);
        assert!(!state.is_debating);
        assert!(state.messages.is_empty());
        assert!(state.summary.is_none());

        // The abandoned run must not touch the state any more.
        sleep(Duration::from_secs(30)).await;
        let state = debate.state();
        assert!(state.messages.is_empty());
        assert_eq!(state.time_left, 0);
        assert_eq!(script.summary_calls.load(Ordering::SeqCst), 0);

        let styles = DebateStyles::new(Style::Witty, Style::Philosophical);
        debate.start_debate(topic(), styles, 5).unwrap();
        let end = debate.wait_for_end().await.unwrap();
        assert_eq!(end.styles, Some(styles));
        assert_alternates(&end.messages);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_while_running_is_rejected() {
        let (mut debate, _script) = orchestrator(script(vec![]), DebateSettings::default());

        debate
            .start_debate(topic(), DebateStyles::default(), 60)
            .unwrap();
        let err = debate
            .start_debate(topic(), DebateStyles::default(), 60)
            .unwrap_err();
        assert!(matches!(err, DebateError::InvalidState(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_budget_ends_without_turns() {
        let (mut debate, script) = orchestrator(script(vec![]), DebateSettings::default());

        debate
            .start_debate(topic(), DebateStyles::default(), 0)
            .unwrap();
        let end = debate.wait_for_end().await.unwrap();

        assert!(end.messages.is_empty());
        assert_eq!(end.stop_reason, Some(StopReason::Timeout));
        assert_eq!(script.turns.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_question_rejected() {
        let (mut debate, _script) = orchestrator(script(vec![]), DebateSettings::default());
        let err = debate
            .start_debate(Topic::new("Blank", "  ", "?"), DebateStyles::default(), 10)
            .unwrap_err();
        assert!(matches!(err, DebateError::InvalidTopic(_)));
        assert_eq!(debate.state().phase, DebatePhase::Idle);
    }

    #[tokio::test]
    async fn test_identical_names_rejected_before_any_call() {
        let (mut debate, script) = orchestrator_with(
            script(vec![]),
            DebateSettings::default(),
            Debaters::new("Sam", "Sam"),
        );

        let err = debate
            .start_debate(topic(), DebateStyles::default(), 10)
            .unwrap_err();
        assert!(matches!(err, DebateError::ConfigError(_)));
        assert_eq!(debate.state().phase, DebatePhase::Idle);
        assert_eq!(script.turns.load(Ordering::SeqCst), 0);
        assert_eq!(script.summary_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let (mut debate, _script) = orchestrator_with(
            script(vec![]),
            DebateSettings::default(),
            Debaters::new("Logos", "   "),
        );

        let err = debate
            .start_debate(topic(), DebateStyles::default(), 10)
            .unwrap_err();
        assert!(matches!(err, DebateError::ConfigError(_)));
    }
}
