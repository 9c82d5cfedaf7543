//! The client-side poll/decide/submit cycle for one game instance.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::gate::{AutoConfirm, ConfirmationGate, PendingSubmission, PlannedAction};
use crate::api::GameApi;
use crate::domain::{GameId, GameState};
use crate::error::ClientError;
use crate::strategy::ActionStrategy;

static AUTO_CONFIRM: AutoConfirm = AutoConfirm;

const DEFAULT_IDLE_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Most recent phases kept by `ActionLoop::phases`.
pub const PHASE_HISTORY: usize = 32;

/// How a round's decisions are sent to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionMode {
    /// All active players' choices in a single request
    #[default]
    Combined,
    /// One request per active player, in ascending player order
    PerPlayer,
}

/// Where the loop is in its cycle.
///
/// `Created -> Polling -> [AwaitingConfirmation ->] Submitting -> Polling`
/// until the server reports the game has ended (`Ended`) or a call fails
/// (`Aborted`). Both are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    Created,
    Polling,
    AwaitingConfirmation,
    Submitting,
    Ended,
    Aborted,
}

impl LoopPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, LoopPhase::Ended | LoopPhase::Aborted)
    }
}

/// Summary of a game that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOutcome {
    pub game_id: GameId,
    /// Polls that had players to move
    pub rounds: u32,
    /// Submission requests sent
    pub submissions: u32,
    pub final_state_name: String,
}

/// Drives a single game instance: poll, pick an action per active player,
/// submit, repeat until the game ends.
///
/// Strictly sequential. Every error from the game client aborts the run;
/// nothing is retried.
pub struct ActionLoop<'a, A: GameApi + ?Sized> {
    api: &'a A,
    strategy: &'a dyn ActionStrategy,
    gate: &'a dyn ConfirmationGate,
    mode: SubmissionMode,
    idle_poll_interval: Duration,
    phase: LoopPhase,
    phases: Vec<LoopPhase>,
    game_id: Option<GameId>,
}

impl<'a, A: GameApi + ?Sized> ActionLoop<'a, A> {
    pub fn new(api: &'a A, strategy: &'a dyn ActionStrategy) -> Self {
        Self {
            api,
            strategy,
            gate: &AUTO_CONFIRM,
            mode: SubmissionMode::default(),
            idle_poll_interval: DEFAULT_IDLE_POLL_INTERVAL,
            phase: LoopPhase::Created,
            phases: vec![LoopPhase::Created],
            game_id: None,
        }
    }

    pub fn with_gate(mut self, gate: &'a dyn ConfirmationGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_submission_mode(mut self, mode: SubmissionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Pause before re-polling a running game that has nobody to move.
    pub fn with_idle_poll_interval(mut self, interval: Duration) -> Self {
        self.idle_poll_interval = interval;
        self
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    /// The last `PHASE_HISTORY` phases entered, oldest first.
    pub fn phases(&self) -> &[LoopPhase] {
        &self.phases
    }

    /// The game being driven, once known.
    pub fn game_id(&self) -> Option<GameId> {
        self.game_id
    }

    /// Create a new game and play it to the end.
    pub async fn run(&mut self) -> Result<GameOutcome, ClientError> {
        self.ensure_not_finished()?;
        let game_id = self.api.create_game().await.map_err(|e| self.abort(e))?;
        info!(game_id = %game_id, strategy = self.strategy.name(), "game created");
        self.drive(game_id).await
    }

    /// Play an already created game to the end.
    pub async fn run_existing(&mut self, game_id: GameId) -> Result<GameOutcome, ClientError> {
        self.ensure_not_finished()?;
        info!(game_id = %game_id, strategy = self.strategy.name(), "joining game");
        self.drive(game_id).await
    }

    /// A loop drives one game; once it has ended or aborted it stays put.
    fn ensure_not_finished(&self) -> Result<(), ClientError> {
        if self.phase.is_terminal() {
            return Err(ClientError::finished(format!("{:?}", self.phase)));
        }
        Ok(())
    }

    async fn drive(&mut self, game_id: GameId) -> Result<GameOutcome, ClientError> {
        self.game_id = Some(game_id);

        let mut rounds = 0u32;
        let mut submissions = 0u32;

        loop {
            self.transition(LoopPhase::Polling);
            let state = self
                .api
                .fetch_state(game_id)
                .await
                .map_err(|e| self.abort(e))?;

            if state.has_ended {
                self.transition(LoopPhase::Ended);
                info!(
                    game_id = %game_id,
                    rounds,
                    submissions,
                    state = %state.state_name,
                    "game ended"
                );
                return Ok(GameOutcome {
                    game_id,
                    rounds,
                    submissions,
                    final_state_name: state.state_name,
                });
            }

            let pending = plan_round(game_id, &state, self.strategy).map_err(|e| self.abort(e))?;
            if pending.is_empty() {
                debug!(
                    game_id = %game_id,
                    state = %state.state_name,
                    "nobody to move yet, polling again"
                );
                tokio::time::sleep(self.idle_poll_interval).await;
                continue;
            }

            rounds += 1;
            info!(
                game_id = %game_id,
                round = rounds,
                state = %state.state_name,
                players = ?state.active_players,
                "players to move"
            );
            for line in pending.summary_lines() {
                debug!(game_id = %game_id, decision = %line, "action selected");
            }

            if self.gate.is_interactive() {
                self.transition(LoopPhase::AwaitingConfirmation);
                self.gate.confirm(&pending).await.map_err(|e| self.abort(e))?;
            }

            self.transition(LoopPhase::Submitting);
            let submission = pending.to_submission();
            let batches = match self.mode {
                SubmissionMode::Combined => vec![submission],
                SubmissionMode::PerPlayer => submission.split_per_player(),
            };
            for batch in &batches {
                self.api
                    .submit_actions(game_id, batch)
                    .await
                    .map_err(|e| self.abort(e))?;
                submissions += 1;
            }
        }
    }

    fn transition(&mut self, next: LoopPhase) {
        debug!(from = ?self.phase, to = ?next, game_id = ?self.game_id, "loop phase");
        self.phase = next;
        if self.phases.len() == PHASE_HISTORY {
            self.phases.remove(0);
        }
        self.phases.push(next);
    }

    fn abort(&mut self, err: ClientError) -> ClientError {
        warn!(
            game_id = ?self.game_id,
            phase = ?self.phase,
            code = err.code(),
            error = %err,
            "action loop aborted"
        );
        self.transition(LoopPhase::Aborted);
        err
    }
}

/// Ask `strategy` for one action per active player of `state`.
///
/// Fails with `ClientError::Strategy` if the strategy errors or returns an
/// id the player was not offered.
pub fn plan_round(
    game_id: GameId,
    state: &GameState,
    strategy: &dyn ActionStrategy,
) -> Result<PendingSubmission, ClientError> {
    let mut choices = Vec::new();

    for player in state.players_to_act() {
        let view = state.players.get(&player).ok_or_else(|| {
            ClientError::strategy(game_id, format!("no view for active player {player}"))
        })?;

        let action = strategy
            .choose_action(player, &view.actions)
            .map_err(|e| ClientError::strategy(game_id, format!("player {player}: {e}")))?;

        let description = view.describe(action).ok_or_else(|| {
            ClientError::strategy(
                game_id,
                format!(
                    "{} chose action {action} which player {player} was not offered",
                    strategy.name()
                ),
            )
        })?;

        choices.push(PlannedAction {
            player,
            action,
            description: description.to_string(),
        });
    }

    Ok(PendingSubmission {
        game_id,
        state_name: state.state_name.clone(),
        choices,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet, VecDeque};

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::*;
    use crate::domain::{ActionId, ActionSubmission, AvailableActions, PlayerId, PlayerView};
    use crate::strategy::{PickFirst, StrategyError};

    fn menu(entries: &[(u32, &str)]) -> AvailableActions {
        entries
            .iter()
            .map(|(id, text)| (ActionId(*id), text.to_string()))
            .collect()
    }

    fn running(name: &str, active: &[u32], actions: &[(u32, &str)]) -> GameState {
        let players = active
            .iter()
            .map(|p| (PlayerId(*p), PlayerView::with_actions(menu(actions))))
            .collect::<BTreeMap<_, _>>();
        let active = active.iter().map(|p| PlayerId(*p)).collect::<BTreeSet<_>>();
        GameState::new(name, active, false, players).unwrap()
    }

    fn ended() -> GameState {
        GameState::new("ended", BTreeSet::new(), true, BTreeMap::new()).unwrap()
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Create,
        Fetch(GameId),
        Submit(GameId, ActionSubmission),
    }

    /// In-memory game that hands out a fixed sequence of states.
    struct ScriptedApi {
        states: Mutex<VecDeque<Result<GameState, ClientError>>>,
        submit_failure: Option<u16>,
        calls: Mutex<Vec<Call>>,
    }

    impl ScriptedApi {
        fn new(states: Vec<GameState>) -> Self {
            Self {
                states: Mutex::new(states.into_iter().map(Ok).collect()),
                submit_failure: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().clone()
        }

        fn submissions(&self) -> Vec<ActionSubmission> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    Call::Submit(_, s) => Some(s),
                    _ => None,
                })
                .collect()
        }
    }

    #[async_trait]
    impl GameApi for ScriptedApi {
        async fn create_game(&self) -> Result<GameId, ClientError> {
            self.calls.lock().push(Call::Create);
            Ok(GameId(1))
        }

        async fn fetch_state(&self, id: GameId) -> Result<GameState, ClientError> {
            self.calls.lock().push(Call::Fetch(id));
            self.states
                .lock()
                .pop_front()
                .unwrap_or_else(|| Ok(ended()))
        }

        async fn submit_actions(
            &self,
            id: GameId,
            actions: &ActionSubmission,
        ) -> Result<(), ClientError> {
            self.calls.lock().push(Call::Submit(id, actions.clone()));
            match self.submit_failure {
                Some(status) => Err(ClientError::protocol("submit_actions", status, None)),
                None => Ok(()),
            }
        }
    }

    struct AlwaysNine;

    impl ActionStrategy for AlwaysNine {
        fn name(&self) -> &'static str {
            "always-nine"
        }

        fn choose_action(
            &self,
            _player: PlayerId,
            _actions: &AvailableActions,
        ) -> Result<ActionId, StrategyError> {
            Ok(ActionId(9))
        }
    }

    struct CountingGate {
        seen: Mutex<Vec<Vec<String>>>,
        decline: bool,
    }

    #[async_trait]
    impl ConfirmationGate for CountingGate {
        async fn confirm(&self, pending: &PendingSubmission) -> Result<(), ClientError> {
            self.seen.lock().push(pending.summary_lines());
            if self.decline {
                Err(ClientError::interaction("declined"))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn plays_until_server_reports_end() {
        let api = ScriptedApi::new(vec![
            running("preflop", &[1, 2], &[(0, "check")]),
            running("flop", &[2], &[(0, "fold"), (1, "call")]),
            ended(),
        ]);
        let mut game = ActionLoop::new(&api, &PickFirst);

        let outcome = game.run().await.unwrap();

        assert_eq!(
            outcome,
            GameOutcome {
                game_id: GameId(1),
                rounds: 2,
                submissions: 2,
                final_state_name: "ended".into(),
            }
        );
        assert_eq!(game.phase(), LoopPhase::Ended);
        assert_eq!(
            api.calls(),
            vec![
                Call::Create,
                Call::Fetch(GameId(1)),
                Call::Submit(
                    GameId(1),
                    [(PlayerId(1), ActionId(0)), (PlayerId(2), ActionId(0))]
                        .into_iter()
                        .collect()
                ),
                Call::Fetch(GameId(1)),
                Call::Submit(GameId(1), ActionSubmission::single(PlayerId(2), ActionId(0))),
                Call::Fetch(GameId(1)),
            ]
        );
    }

    #[tokio::test]
    async fn ended_on_first_poll_submits_nothing() {
        let api = ScriptedApi::new(vec![ended()]);
        let mut game = ActionLoop::new(&api, &PickFirst);

        let outcome = game.run_existing(GameId(5)).await.unwrap();

        assert_eq!(outcome.rounds, 0);
        assert!(api.submissions().is_empty());
        assert_eq!(
            game.phases(),
            &[LoopPhase::Created, LoopPhase::Polling, LoopPhase::Ended]
        );
    }

    #[tokio::test]
    async fn per_player_mode_sends_one_request_per_player() {
        let api = ScriptedApi::new(vec![running("preflop", &[3, 1, 2], &[(0, "check")]), ended()]);
        let mut game = ActionLoop::new(&api, &PickFirst).with_submission_mode(SubmissionMode::PerPlayer);

        let outcome = game.run().await.unwrap();

        assert_eq!(outcome.rounds, 1);
        assert_eq!(outcome.submissions, 3);
        assert_eq!(
            api.submissions(),
            vec![
                ActionSubmission::single(PlayerId(1), ActionId(0)),
                ActionSubmission::single(PlayerId(2), ActionId(0)),
                ActionSubmission::single(PlayerId(3), ActionId(0)),
            ]
        );
    }

    #[tokio::test]
    async fn rejected_submission_aborts_without_further_calls() {
        let mut api = ScriptedApi::new(vec![
            running("preflop", &[1], &[(0, "check")]),
            running("flop", &[1], &[(0, "check")]),
        ]);
        api.submit_failure = Some(400);
        let mut game = ActionLoop::new(&api, &PickFirst);

        let err = game.run().await.unwrap_err();

        assert!(err.is_rejection());
        assert_eq!(game.phase(), LoopPhase::Aborted);
        assert_eq!(api.submissions().len(), 1);
        assert_eq!(api.calls().last(), Some(&Call::Submit(GameId(1), ActionSubmission::single(PlayerId(1), ActionId(0)))));
    }

    #[tokio::test]
    async fn fetch_failure_aborts() {
        let api = ScriptedApi {
            states: Mutex::new(VecDeque::from([Err(ClientError::decode(
                "fetch_state",
                "expected value",
            ))])),
            submit_failure: None,
            calls: Mutex::new(Vec::new()),
        };
        let mut game = ActionLoop::new(&api, &PickFirst);

        let err = game.run().await.unwrap_err();

        assert!(matches!(err, ClientError::Decode { .. }));
        assert_eq!(
            game.phases(),
            &[LoopPhase::Created, LoopPhase::Polling, LoopPhase::Aborted]
        );
        assert!(api.submissions().is_empty());
    }

    #[tokio::test]
    async fn strategy_choosing_unoffered_action_aborts() {
        let api = ScriptedApi::new(vec![running("preflop", &[1], &[(0, "check")])]);
        let mut game = ActionLoop::new(&api, &AlwaysNine);

        let err = game.run().await.unwrap_err();

        match err {
            ClientError::Strategy { game_id, detail } => {
                assert_eq!(game_id, GameId(1));
                assert!(detail.contains("not offered"), "unexpected: {detail}");
            }
            other => panic!("expected strategy error, got {other:?}"),
        }
        assert!(api.submissions().is_empty());
        assert_eq!(game.phase(), LoopPhase::Aborted);
    }

    #[tokio::test]
    async fn interactive_gate_sees_every_round() {
        let api = ScriptedApi::new(vec![
            running("preflop", &[1, 2], &[(0, "check")]),
            running("flop", &[1], &[(0, "bet")]),
            ended(),
        ]);
        let gate = CountingGate {
            seen: Mutex::new(Vec::new()),
            decline: false,
        };
        let mut game = ActionLoop::new(&api, &PickFirst).with_gate(&gate);

        game.run().await.unwrap();

        assert_eq!(
            *gate.seen.lock(),
            vec![
                vec!["Player 1: check".to_string(), "Player 2: check".to_string()],
                vec!["Player 1: bet".to_string()],
            ]
        );
        assert_eq!(
            &game.phases()[..5],
            &[
                LoopPhase::Created,
                LoopPhase::Polling,
                LoopPhase::AwaitingConfirmation,
                LoopPhase::Submitting,
                LoopPhase::Polling,
            ]
        );
    }

    #[tokio::test]
    async fn declined_confirmation_aborts_before_submitting() {
        let api = ScriptedApi::new(vec![running("preflop", &[1], &[(0, "check")])]);
        let gate = CountingGate {
            seen: Mutex::new(Vec::new()),
            decline: true,
        };
        let mut game = ActionLoop::new(&api, &PickFirst).with_gate(&gate);

        let err = game.run().await.unwrap_err();

        assert!(matches!(err, ClientError::Interaction { .. }));
        assert!(api.submissions().is_empty());
        assert_eq!(game.phase(), LoopPhase::Aborted);
    }

    #[tokio::test]
    async fn auto_confirm_skips_awaiting_confirmation() {
        let api = ScriptedApi::new(vec![running("preflop", &[1], &[(0, "check")]), ended()]);
        let mut game = ActionLoop::new(&api, &PickFirst);

        game.run().await.unwrap();

        assert!(!game.phases().contains(&LoopPhase::AwaitingConfirmation));
    }

    #[tokio::test]
    async fn idle_state_is_polled_again_without_submitting() {
        let idle = GameState::new("dealing", BTreeSet::new(), false, BTreeMap::new()).unwrap();
        let api = ScriptedApi::new(vec![idle, running("preflop", &[1], &[(0, "check")]), ended()]);
        let mut game =
            ActionLoop::new(&api, &PickFirst).with_idle_poll_interval(Duration::from_millis(1));

        let outcome = game.run().await.unwrap();

        assert_eq!(outcome.rounds, 1);
        assert_eq!(outcome.submissions, 1);
    }

    #[tokio::test]
    async fn finished_loop_cannot_be_reused() {
        let api = ScriptedApi::new(vec![ended()]);
        let mut game = ActionLoop::new(&api, &PickFirst);
        game.run().await.unwrap();

        let err = game.run_existing(GameId(1)).await.unwrap_err();
        assert!(matches!(err, ClientError::Finished { .. }));
        assert_eq!(game.phase(), LoopPhase::Ended);
    }

    #[tokio::test]
    async fn second_run_does_not_create_another_game() {
        let api = ScriptedApi::new(vec![ended()]);
        let mut game = ActionLoop::new(&api, &PickFirst);
        game.run().await.unwrap();

        let err = game.run().await.unwrap_err();

        assert_eq!(err.code(), "LOOP_FINISHED");
        assert_eq!(api.calls(), vec![Call::Create, Call::Fetch(GameId(1))]);
    }

    #[tokio::test]
    async fn aborted_loop_cannot_be_rerun() {
        let mut api = ScriptedApi::new(vec![running("preflop", &[1], &[(0, "check")])]);
        api.submit_failure = Some(500);
        let mut game = ActionLoop::new(&api, &PickFirst);
        game.run().await.unwrap_err();
        let calls_after_abort = api.calls().len();

        let err = game.run().await.unwrap_err();

        assert!(matches!(err, ClientError::Finished { .. }));
        assert_eq!(api.calls().len(), calls_after_abort);
    }

    #[tokio::test]
    async fn long_idle_wait_keeps_phase_history_bounded() {
        let idle = GameState::new("dealing", BTreeSet::new(), false, BTreeMap::new()).unwrap();
        let mut states = vec![idle; 3 * PHASE_HISTORY];
        states.push(running("preflop", &[1], &[(0, "check")]));
        let api = ScriptedApi::new(states);
        let mut game = ActionLoop::new(&api, &PickFirst).with_idle_poll_interval(Duration::ZERO);

        game.run().await.unwrap();

        assert_eq!(game.phases().len(), PHASE_HISTORY);
        assert_eq!(game.phases().last(), Some(&LoopPhase::Ended));
        assert_eq!(
            api.calls().iter().filter(|c| matches!(c, Call::Fetch(_))).count(),
            3 * PHASE_HISTORY + 2
        );
    }

    #[test]
    fn plan_round_uses_descriptions_from_state() {
        let state = running("preflop", &[1, 2], &[(0, "fold"), (1, "call"), (2, "raise")]);

        let pending = plan_round(GameId(1), &state, &PickFirst).unwrap();

        assert_eq!(pending.state_name, "preflop");
        assert_eq!(
            pending.summary_lines(),
            vec!["Player 1: fold".to_string(), "Player 2: fold".to_string()]
        );
    }

    #[test]
    fn terminal_phases() {
        assert!(LoopPhase::Ended.is_terminal());
        assert!(LoopPhase::Aborted.is_terminal());
        assert!(!LoopPhase::Polling.is_terminal());
        assert!(!LoopPhase::AwaitingConfirmation.is_terminal());
    }
}
