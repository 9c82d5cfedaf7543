//! Driving a game from creation to completion.

mod action_loop;
mod gate;

pub use action_loop::{
    plan_round, ActionLoop, GameOutcome, LoopPhase, SubmissionMode, PHASE_HISTORY,
};
pub use gate::{AutoConfirm, ConfirmationGate, PendingSubmission, PlannedAction, PromptGate};
