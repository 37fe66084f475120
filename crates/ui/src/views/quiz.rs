use dioxus::prelude::*;
use tokio::sync::mpsc;
use tracing::debug;

use quiz_core::model::{AttemptResult, ContentId};
use services::{AttemptPhase, QuizAttemptController};

use crate::context::AppContext;
use crate::views::ViewError;
use crate::vm::{QuestionVm, QuizCommand, QuizVm, apply_command};

#[derive(Clone, Debug, PartialEq)]
enum Screen {
    Loading,
    LoadFailed,
    Saved,
    Result(AttemptResult),
    Attempt,
}

impl Screen {
    fn of(vm: &QuizVm) -> Self {
        if let Some(result) = vm.result() {
            return Self::Result(result.clone());
        }
        match vm.phase() {
            AttemptPhase::Uninitialized | AttemptPhase::Loading => Self::Loading,
            AttemptPhase::Failed => Self::LoadFailed,
            AttemptPhase::Suspended => Self::Saved,
            AttemptPhase::InProgress | AttemptPhase::Submitting | AttemptPhase::Submitted => {
                Self::Attempt
            }
        }
    }
}

fn option_class(selected: bool) -> &'static str {
    if selected {
        "quiz-option quiz-option--selected"
    } else {
        "quiz-option"
    }
}

/// Owns the controller for the lifetime of the page. Commands and countdown
/// ticks are applied one at a time, then mirrored into `vm`.
async fn drive_attempt(
    mut controller: QuizAttemptController,
    content_id: ContentId,
    mut commands: mpsc::UnboundedReceiver<QuizCommand>,
    mut vm: Signal<QuizVm>,
) {
    let begun = controller.begin(&content_id).await;
    vm.with_mut(|vm| {
        vm.refresh(&controller);
        if let Err(err) = &begun {
            vm.record_error(err);
        }
    });

    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else { break };
                let result = apply_command(&mut controller, command).await;
                vm.with_mut(|vm| vm.record_command(&controller, &result));
            }
            () = controller.tick_due() => {
                let result = controller.tick().await;
                vm.with_mut(|vm| vm.record_tick(&controller, &result));
            }
        }
    }
    controller.close().await;
}

#[component]
pub fn QuizView() -> Element {
    let ctx = use_context::<AppContext>();
    let mut vm = use_signal(QuizVm::default);

    let commands = use_hook(|| {
        let (tx, rx) = mpsc::unbounded_channel();
        spawn(drive_attempt(ctx.new_controller(), ctx.content_id(), rx, vm));
        tx
    });
    let send = use_callback(move |command: QuizCommand| {
        if commands.send(command).is_err() {
            debug!(?command, "attempt task stopped; command dropped");
            return;
        }
        vm.with_mut(|vm| vm.note_sent(command));
    });

    let state = vm.read().clone();
    let screen = Screen::of(&state);

    rsx! {
        div { class: "page quiz-page",
            match screen {
                Screen::Loading => rsx! {
                    p { "Loading..." }
                },
                Screen::LoadFailed => rsx! {
                    p { class: "quiz-error", "{ViewError::LoadFailed.message()}" }
                },
                Screen::Saved => rsx! {
                    p { class: "quiz-saved", "Progress saved. You can close this page and continue later." }
                },
                Screen::Result(result) => rsx! {
                    ResultPanel { result }
                },
                Screen::Attempt => rsx! {
                    AttemptPanel { state: state.clone(), vm, send }
                },
            }
        }
    }
}

#[component]
fn ResultPanel(result: AttemptResult) -> Element {
    let score = format!("{:.0}", result.score);
    let incorrect = result.incorrect_answers();
    rsx! {
        section { class: "quiz-result",
            h2 { "Quiz submitted" }
            p { class: "quiz-result__score", "Score: {score}%" }
            p { "Correct: {result.correct_answers} of {result.total_questions}" }
            p { "Incorrect: {incorrect}" }
        }
    }
}

#[component]
fn AttemptPanel(state: QuizVm, vm: Signal<QuizVm>, send: Callback<QuizCommand>) -> Element {
    let mut vm = vm;
    let can_edit = state.can_edit();
    let timer_class = if state.is_low_time() {
        "quiz-timer quiz-timer--low"
    } else {
        "quiz-timer"
    };
    let timer_label = state.timer_label();
    let answered = state.answered_count();
    let total = state.total_questions();
    let unanswered = total.saturating_sub(answered);
    let show_only_flagged = state.show_only_flagged();
    let has_previous = state.has_previous();
    let has_next = state.has_next();
    let position_label = state
        .position()
        .map(|(at, len)| format!("Question {at} of {len}"));
    let flagged = state.flagged_count();
    let submitting = state.is_submitting();
    let error = state.error();
    let current = state.current_question().cloned();

    rsx! {
        div { class: "quiz-toolbar",
            span { class: "{timer_class}", id: "quiz-timer", "{timer_label}" }
            span { class: "quiz-progress", "Answered {answered} of {total}" }
            span { class: "quiz-flagged", "Flagged {flagged}" }
            label { class: "quiz-filter",
                input {
                    r#type: "checkbox",
                    checked: show_only_flagged,
                    onchange: move |_| {
                        vm.with_mut(|vm| {
                            let next = !vm.show_only_flagged();
                            vm.set_show_only_flagged(next);
                        });
                    },
                }
                "Show only flagged"
            }
        }

        if let Some(err) = error {
            div { class: "quiz-error", role: "alert",
                p { "{err.message()}" }
                if err == ViewError::SubmitFailed && can_edit {
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| send.call(QuizCommand::Submit { confirmed: true }),
                        "Retry"
                    }
                }
            }
        }

        match current {
            Some(question) => rsx! {
                QuestionCard { question, can_edit, send }
            },
            None => rsx! {
                p { class: "quiz-empty", "No flagged questions." }
            },
        }

        div { class: "quiz-nav",
            button {
                class: "btn",
                r#type: "button",
                disabled: !has_previous,
                onclick: move |_| vm.with_mut(QuizVm::previous),
                "Previous"
            }
            if let Some(label) = position_label {
                span { class: "quiz-position", "{label}" }
            }
            button {
                class: "btn",
                r#type: "button",
                disabled: !has_next,
                onclick: move |_| vm.with_mut(QuizVm::next),
                "Next"
            }
        }

        div { class: "quiz-actions",
            button {
                class: "btn",
                r#type: "button",
                disabled: !can_edit,
                onclick: move |_| send.call(QuizCommand::SaveForLater),
                "Continue later"
            }
            button {
                class: "btn btn-primary",
                id: "quiz-submit",
                r#type: "button",
                disabled: !can_edit,
                onclick: move |_| send.call(QuizCommand::Submit { confirmed: false }),
                if submitting { "Submitting..." } else { "Submit" }
            }
        }

        if state.confirm_open() {
            div { class: "quiz-dialog", role: "dialog", aria_modal: "true",
                div { class: "quiz-dialog__panel",
                    p { "Submit your answers? You won't be able to change them afterwards." }
                    if unanswered > 0 {
                        p { class: "quiz-dialog__warning", "{unanswered} question(s) still unanswered." }
                    }
                    button {
                        class: "btn",
                        r#type: "button",
                        onclick: move |_| vm.with_mut(QuizVm::cancel_submit),
                        "Cancel"
                    }
                    button {
                        class: "btn btn-primary",
                        id: "quiz-confirm",
                        r#type: "button",
                        disabled: submitting,
                        onclick: move |_| send.call(QuizCommand::Submit { confirmed: true }),
                        "Yes, submit"
                    }
                }
            }
        }
    }
}

#[component]
fn QuestionCard(question: QuestionVm, can_edit: bool, send: Callback<QuizCommand>) -> Element {
    let index = question.index;
    let number = index + 1;
    let flag_label = if question.flagged { "Unflag" } else { "Flag for review" };
    let has_answer = question.selected.is_some();

    rsx! {
        section { class: "quiz-question",
            p { class: "quiz-question__number", "Question {number}" }
            p { class: "quiz-question__prompt", "{question.prompt}" }
            for (option, text) in question.options.iter().cloned().enumerate() {
                button {
                    key: "{option}",
                    class: option_class(question.selected == Some(option)),
                    r#type: "button",
                    disabled: !can_edit,
                    onclick: move |_| send.call(QuizCommand::Select { index, option }),
                    "{text}"
                }
            }
            div { class: "quiz-question__actions",
                button {
                    class: "btn",
                    r#type: "button",
                    disabled: !can_edit,
                    onclick: move |_| send.call(QuizCommand::ToggleFlag { index }),
                    "{flag_label}"
                }
                button {
                    class: "btn",
                    r#type: "button",
                    disabled: !can_edit || !has_answer,
                    onclick: move |_| send.call(QuizCommand::Clear { index }),
                    "Clear answer"
                }
            }
        }
    }
}
