use crate::components::ui::{FormField, Input, NativeSelect, Spinner, TextArea};
use crate::drawer::{DrawerEvent, WidgetDrawer};
use crate::forms::{validate_poll, FieldErrors};
use crate::models::{Poll, PollAnswer, PollStatus, Widget};
use crate::state::AppContext;
use crate::widgets::{field_error, field_invalid, select_options, SaveCancel, GHOST_SM, OUTLINE_SM};
use leptos::prelude::*;
use leptos::task::spawn_local;

pub(crate) fn poll_status_label(s: PollStatus) -> &'static str {
    match s {
        PollStatus::Active => "Active",
        PollStatus::Inactive => "Inactive",
    }
}

/// One editable answer row. `key` is local and only identifies the row.
#[derive(Clone, Copy)]
struct AnswerRow {
    key: usize,
    id: i64,
    text: RwSignal<String>,
}

/// Answers worth saving: trimmed, blanks dropped, ids kept.
pub(crate) fn collect_answers(rows: &[(i64, String)]) -> Vec<PollAnswer> {
    rows.iter()
        .map(|(id, text)| (*id, text.trim()))
        .filter(|(_, text)| !text.is_empty())
        .map(|(id, text)| PollAnswer {
            id,
            answer_text: text.to_string(),
        })
        .collect()
}

#[component]
pub fn PollForm(widget: Widget, drawer: WidgetDrawer) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let notifier = app_state.0.notifier;
    let widget_id = widget.id;

    let loading: RwSignal<bool> = RwSignal::new(true);
    let saving: RwSignal<bool> = RwSignal::new(false);
    let errors: RwSignal<FieldErrors> = RwSignal::new(FieldErrors::default());
    let record: RwSignal<Poll> = RwSignal::new(Poll {
        widget_id,
        ..Default::default()
    });

    let title = RwSignal::new(String::new());
    let description = RwSignal::new(String::new());
    let status = RwSignal::new(<&'static str>::from(PollStatus::default()).to_string());
    let answers: RwSignal<Vec<AnswerRow>> = RwSignal::new(vec![]);
    let next_key = StoredValue::new(0usize);

    let push_row = move |id: i64, text: String| {
        let key = next_key.get_value();
        next_key.set_value(key + 1);
        answers.update(|rows| {
            rows.push(AnswerRow {
                key,
                id,
                text: RwSignal::new(text),
            })
        });
    };

    let api_client = app_state.0.api_client.get_untracked();
    spawn_local(async move {
        match api_client.get_poll(widget_id).await {
            Ok(Some(poll)) => {
                title.set(poll.title.clone());
                description.set(poll.description.clone());
                status.set(<&'static str>::from(poll.status).to_string());
                for a in &poll.answers {
                    push_row(a.id, a.answer_text.clone());
                }
                record.set(poll);
            }
            Ok(None) => {
                // Start with the two answers every poll needs.
                push_row(0, String::new());
                push_row(0, String::new());
            }
            Err(e) => notifier.error(format!("Could not load the poll: {e}")),
        }
        loading.set(false);
    });

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if saving.get_untracked() {
            return;
        }

        let rows: Vec<(i64, String)> = answers
            .get_untracked()
            .iter()
            .map(|r| (r.id, r.text.get_untracked()))
            .collect();
        let original = record.get_untracked();
        let poll = Poll {
            title: title.get_untracked().trim().to_string(),
            description: description.get_untracked(),
            status: status.get_untracked().parse().unwrap_or_default(),
            answers: collect_answers(&rows),
            ..original.clone()
        };

        if let Err(e) = validate_poll(&poll) {
            errors.set(e);
            return;
        }
        errors.set(FieldErrors::default());

        let api_client = app_state.0.api_client.get_untracked();
        saving.set(true);
        spawn_local(async move {
            match api_client.save_poll(&original, &poll).await {
                Ok(saved) => {
                    record.set(saved);
                    notifier.success("Poll saved");
                    drawer.dispatch(DrawerEvent::SaveAndClose);
                }
                Err(e) => notifier.error(format!("Could not save the poll: {e}")),
            }
            saving.set(false);
        });
    };

    view! {
        <Show when=move || !loading.get() fallback=|| view! { <Spinner /> }>
            <form class="flex flex-col gap-4" on:submit=on_submit>
                <FormField label="Question" html_for="poll-title" error=field_error(errors, "title")>
                    <Input id="poll-title" bind_value=title invalid=field_invalid(errors, "title") />
                </FormField>
                <FormField label="Description" html_for="poll-description" error=field_error(errors, "description")>
                    <TextArea id="poll-description" bind_value=description />
                </FormField>
                <FormField label="Status" html_for="poll-status" error=field_error(errors, "status")>
                    <NativeSelect id="poll-status" options={select_options::<PollStatus>(poll_status_label)} bind_value=status />
                </FormField>

                <FormField label="Answers" html_for="poll-answers" error=field_error(errors, "answers")>
                    <div id="poll-answers" class="flex flex-col gap-2">
                        <For
                            each=move || answers.get()
                            key=|row| row.key
                            children=move |row| {
                                view! {
                                    <div class="flex items-center gap-2">
                                        <Input bind_value=row.text placeholder="Answer" invalid=field_invalid(errors, "answers") />
                                        <button
                                            type="button"
                                            class=format!("{GHOST_SM} text-destructive")
                                            on:click=move |_| answers.update(|rows| rows.retain(|r| r.key != row.key))
                                        >
                                            "Remove"
                                        </button>
                                    </div>
                                }
                            }
                        />
                        <div>
                            <button type="button" class=OUTLINE_SM on:click=move |_| push_row(0, String::new())>
                                "Add answer"
                            </button>
                        </div>
                    </div>
                </FormField>

                <SaveCancel saving=saving drawer=drawer />
            </form>
        </Show>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_answers_drops_blanks_and_keeps_ids() {
        let rows = vec![
            (4, " Yes ".to_string()),
            (0, "   ".to_string()),
            (0, "Not sure".to_string()),
        ];
        let answers = collect_answers(&rows);
        assert_eq!(
            answers,
            vec![
                PollAnswer { id: 4, answer_text: "Yes".to_string() },
                PollAnswer { id: 0, answer_text: "Not sure".to_string() },
            ]
        );
    }
}
