use crate::api::{ApiClient, ApiResult};
use crate::components::sortable_list::SortableList;
use crate::components::ui::{Button, ButtonSize, ButtonVariant, ConfirmDialog, FormField, Input, Spinner, TextArea};
use crate::drawer::{DrawerEvent, WidgetDrawer};
use crate::forms::{patch_diff, validate_contact, FieldErrors};
use crate::models::{sorted_by_index, Contact, Widget, WidgetItem};
use crate::ordering::{remove_by_id, DragEnd, OrderedItem};
use crate::state::{handle_drag_end, use_sort_sync, AppContext, ListStore, SortableEntity};
use crate::widgets::{field_error, field_invalid, SaveCancel, NEW_ITEM_ID};
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::future::Future;

/// Contacts are shared records; a widget orders them through its item links.
impl SortableEntity for Contact {
    const LABEL: &'static str = "contact";

    fn persist_order(
        api: ApiClient,
        scope_id: i64,
        items: Vec<Self>,
    ) -> impl Future<Output = ApiResult<()>> + 'static {
        async move {
            api.set_widget_items(scope_id, &widget_items_for(scope_id, &items))
                .await
        }
    }
}

/// Item links for `contacts` in their current order.
pub(crate) fn widget_items_for(widget_id: i64, contacts: &[Contact]) -> Vec<WidgetItem> {
    contacts
        .iter()
        .enumerate()
        .map(|(idx, c)| WidgetItem {
            id: 0,
            widget_id,
            widget_data_id: c.id,
            sort_index: idx as i64 + 1,
        })
        .collect()
}

/// The contacts linked to a widget, in link order. Dangling links are skipped.
pub(crate) fn contacts_in_widget(all: &[Contact], links: &[WidgetItem]) -> Vec<Contact> {
    sorted_by_index(links, |l| l.sort_index)
        .iter()
        .filter_map(|link| all.iter().find(|c| c.id == link.widget_data_id).cloned())
        .collect()
}

fn relinked(widget: &Widget, contacts: &[Contact]) -> Widget {
    Widget {
        items: widget_items_for(widget.id, contacts),
        ..widget.clone()
    }
}

#[component]
pub fn ContactsBlock(widget: Widget, widgets: ListStore<Widget>, drawer: WidgetDrawer) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let widget_id = widget.id;
    let widget = StoredValue::new(widget);

    let store = ListStore::<Contact>::new();
    let sync = use_sort_sync::<Contact>(&app_state.0, store, widget_id);

    {
        let api_client = app_state.0.api_client.get_untracked();
        let links = widget.with_value(|w| w.items.clone());
        store.load(async move {
            api_client
                .list_contacts()
                .await
                .map(|all| contacts_in_widget(&all, &links))
        });
    }

    // Keep the widget's own links in step so reopening it shows the latest order.
    let sync_links = move || {
        let next = widget.with_value(|w| relinked(w, &store.get_untracked()));
        widget.set_value(next.clone());
        widgets.upsert(next);
    };

    let drag_sync = sync.clone();
    let on_drag_end = Callback::new(move |drag: DragEnd| {
        handle_drag_end(&drag_sync, drag);
        sync_links();
    });

    let pending_delete: RwSignal<Option<Contact>> = RwSignal::new(None);
    let delete_open: RwSignal<bool> = RwSignal::new(false);
    let deleting: RwSignal<bool> = RwSignal::new(false);

    let on_confirm_delete = Callback::new(move |_: ()| {
        let Some(contact) = pending_delete.get_untracked() else {
            return;
        };
        if deleting.get_untracked() {
            return;
        }

        let next = remove_by_id(&store.get_untracked(), contact.id);
        let links = widget_items_for(widget_id, &next);
        let api_client = app_state.0.api_client.get_untracked();
        let notifier = app_state.0.notifier;
        // The link list below already carries the current order.
        let had_queued_order = sync.discard();
        let sync = sync.clone();

        deleting.set(true);
        spawn_local(async move {
            match api_client.set_widget_items(widget_id, &links).await {
                Ok(()) => {
                    store.set(next);
                    sync_links();
                    notifier.success(format!("Removed {} from this widget", contact.name));
                }
                Err(e) => {
                    if had_queued_order {
                        sync.schedule();
                    }
                    notifier.error(format!("Could not remove the contact: {e}"));
                }
            }
            deleting.set(false);
            delete_open.set(false);
            pending_delete.set(None);
        });
    });

    let editing = Memo::new(move |_| drawer.state().editing_item());

    let on_saved = Callback::new(move |(contact, is_new): (Contact, bool)| {
        store.upsert(contact);
        if is_new {
            sync_links();
        }
    });

    view! {
        <Show
            when=move || editing.get().is_none()
            fallback=move || {
                editing.get().map(|item_id| {
                    let contact = if item_id == NEW_ITEM_ID {
                        Contact::default()
                    } else {
                        store.find(item_id).unwrap_or_default()
                    };
                    view! { <ContactForm contact=contact widget_id=widget_id linked=store drawer=drawer on_saved=on_saved /> }
                })
            }
        >
            <div class="flex flex-col gap-3" data-name="ContactsBlock">
                <div class="flex justify-end">
                    <Button
                        size=ButtonSize::Sm
                        on:click=move |_| drawer.dispatch(DrawerEvent::EditItem { item_id: NEW_ITEM_ID })
                    >
                        "Add contact"
                    </Button>
                </div>

                <Show when=move || store.loading.get() fallback=|| ().into_view()>
                    <Spinner />
                </Show>
                {move || store.error.get().map(|e| view! { <p class="text-xs text-destructive">{e}</p> })}

                <SortableList
                    items=Signal::derive(move || store.get())
                    on_drag_end=on_drag_end
                    render_item=move |c: Contact| view! {
                        <ContactPaper
                            contact=c
                            drawer=drawer
                            on_delete=Callback::new(move |c: Contact| {
                                pending_delete.set(Some(c));
                                delete_open.set(true);
                            })
                        />
                    }
                    empty_text="No contacts yet."
                />
            </div>
        </Show>

        <ConfirmDialog
            open=delete_open
            title="Remove contact?"
            message=Signal::derive(move || {
                pending_delete
                    .get()
                    .map(|c| format!("{} will no longer be listed on this widget.", c.name))
                    .unwrap_or_default()
            })
            confirm_label="Remove"
            busy=deleting
            on_confirm=on_confirm_delete
        />
    }
}

#[component]
fn ContactPaper(contact: Contact, drawer: WidgetDrawer, on_delete: Callback<Contact>) -> impl IntoView {
    let id = contact.item_id();
    let details = [contact.title.clone(), contact.email.clone(), contact.phone_number.clone()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" · ");
    let name = contact.name.clone();

    view! {
        <div class="flex items-center justify-between gap-2">
            <div class="min-w-0">
                <div class="truncate text-sm font-medium">{name}</div>
                <div class="truncate text-xs text-muted-foreground">{details}</div>
            </div>
            <div class="flex shrink-0 items-center gap-1">
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Sm
                    on:click=move |_| drawer.dispatch(DrawerEvent::EditItem { item_id: id })
                >
                    "Edit"
                </Button>
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Sm
                    class="text-destructive"
                    on:click=move |_| on_delete.run(contact.clone())
                >
                    "Remove"
                </Button>
            </div>
        </div>
    }
}

#[component]
fn ContactForm(
    contact: Contact,
    widget_id: i64,
    linked: ListStore<Contact>,
    drawer: WidgetDrawer,
    on_saved: Callback<(Contact, bool)>,
) -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    let name = RwSignal::new(contact.name.clone());
    let title = RwSignal::new(contact.title.clone());
    let email = RwSignal::new(contact.email.clone());
    let phone_number = RwSignal::new(contact.phone_number.clone());
    let address = RwSignal::new(contact.address.clone());
    let bio = RwSignal::new(contact.bio.clone());

    let errors: RwSignal<FieldErrors> = RwSignal::new(FieldErrors::default());
    let saving: RwSignal<bool> = RwSignal::new(false);
    let original = StoredValue::new(contact);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if saving.get_untracked() {
            return;
        }

        let before = original.get_value();
        let edited = Contact {
            id: before.id,
            name: name.get_untracked().trim().to_string(),
            title: title.get_untracked().trim().to_string(),
            email: email.get_untracked().trim().to_string(),
            phone_number: phone_number.get_untracked().trim().to_string(),
            address: address.get_untracked().trim().to_string(),
            bio: bio.get_untracked(),
        };

        if let Err(e) = validate_contact(&edited) {
            errors.set(e);
            return;
        }
        errors.set(FieldErrors::default());

        let is_new = before.id == NEW_ITEM_ID;
        let patch = patch_diff(&before, &edited);
        if !is_new && patch.is_none() {
            drawer.dispatch(DrawerEvent::SaveAndClose);
            return;
        }

        let api_client = app_state.0.api_client.get_untracked();
        let notifier = app_state.0.notifier;
        let current = linked.get_untracked();

        saving.set(true);
        spawn_local(async move {
            let result = match patch {
                Some(patch) if !is_new => api_client.update_contact(before.id, &patch).await,
                _ => match api_client.create_contact(&edited).await {
                    Ok(created) => {
                        let mut next = current;
                        next.push(created.clone());
                        api_client
                            .set_widget_items(widget_id, &widget_items_for(widget_id, &next))
                            .await
                            .map(|()| created)
                    }
                    Err(e) => Err(e),
                },
            };

            match result {
                Ok(saved) => {
                    notifier.success(format!("Saved {}", saved.name));
                    on_saved.run((saved, is_new));
                    drawer.dispatch(DrawerEvent::SaveAndClose);
                }
                Err(e) => notifier.error(format!("Could not save the contact: {e}")),
            }
            saving.set(false);
        });
    };

    view! {
        <form class="flex flex-col gap-4" on:submit=on_submit>
            <FormField label="Name" html_for="contact-name" error=field_error(errors, "name")>
                <Input id="contact-name" bind_value=name invalid=field_invalid(errors, "name") />
            </FormField>
            <FormField label="Title" html_for="contact-title" error=field_error(errors, "title")>
                <Input id="contact-title" bind_value=title invalid=field_invalid(errors, "title") />
            </FormField>
            <FormField label="Email" html_for="contact-email" error=field_error(errors, "email")>
                <Input id="contact-email" r#type="email" bind_value=email invalid=field_invalid(errors, "email") />
            </FormField>
            <FormField label="Phone" html_for="contact-phone" error=field_error(errors, "phone_number")>
                <Input id="contact-phone" r#type="tel" bind_value=phone_number invalid=field_invalid(errors, "phone_number") />
            </FormField>
            <FormField label="Address" html_for="contact-address" error=field_error(errors, "address")>
                <Input id="contact-address" bind_value=address />
            </FormField>
            <FormField label="Bio" html_for="contact-bio" error=field_error(errors, "bio")>
                <TextArea id="contact-bio" rows=4 bind_value=bio invalid=field_invalid(errors, "bio") />
            </FormField>
            <SaveCancel saving=saving drawer=drawer />
        </form>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(id: i64, name: &str) -> Contact {
        Contact {
            id,
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn link(widget_data_id: i64, sort_index: i64) -> WidgetItem {
        WidgetItem {
            id: 0,
            widget_id: 3,
            widget_data_id,
            sort_index,
        }
    }

    #[test]
    fn test_contacts_follow_link_order() {
        let all = vec![contact(1, "Ana"), contact(2, "Ben"), contact(3, "Cy")];
        let links = vec![link(3, 2), link(1, 1), link(99, 3)];
        let ordered = contacts_in_widget(&all, &links);
        let names: Vec<_> = ordered.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Cy"]);
    }

    #[test]
    fn test_widget_items_payload() {
        let contacts = vec![contact(8, "Ana"), contact(5, "Ben")];
        let v = serde_json::to_value(widget_items_for(3, &contacts)).expect("should serialize");
        assert_eq!(
            v,
            serde_json::json!([
                {"id": 0, "widget_id": 3, "widget_data_id": 8, "sort_index": 1},
                {"id": 0, "widget_id": 3, "widget_data_id": 5, "sort_index": 2}
            ])
        );
    }

    #[test]
    fn test_relinked_keeps_widget_fields() {
        let w = Widget {
            id: 3,
            engagement_id: 1,
            widget_type: crate::models::WidgetType::WhoIsListening,
            title: "Who is Listening".to_string(),
            sort_index: 2,
            items: vec![link(1, 1)],
        };
        let next = relinked(&w, &[contact(5, "Ben"), contact(1, "Ana")]);
        assert_eq!(next.title, w.title);
        assert_eq!(next.items[0].widget_data_id, 5);
        assert_eq!(next.items[1].sort_index, 2);
    }
}
