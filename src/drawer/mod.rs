use crate::models::WidgetType;
use leptos::prelude::*;

/// Where the widget editor drawer currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DrawerState {
    Closed,
    /// Picking which widget type to add.
    Options,
    /// Editing a widget as a whole (its list, its settings).
    Form {
        widget_type: WidgetType,
        widget_id: i64,
    },
    /// Editing one item inside a widget's list.
    EditingItem {
        widget_type: WidgetType,
        widget_id: i64,
        item_id: i64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DrawerEvent {
    /// Open the drawer. With an existing widget it goes straight to its form.
    Open {
        existing: Option<(WidgetType, i64)>,
    },
    /// A type was picked from the options. `widget_id` is the backing widget, if it exists.
    Select {
        widget_type: WidgetType,
        widget_id: Option<i64>,
    },
    EditItem {
        item_id: i64,
    },
    Close,
    SaveAndClose,
}

impl DrawerState {
    /// Next state for `event`. Pairs not listed here leave the state unchanged.
    pub fn apply(self, event: DrawerEvent) -> DrawerState {
        use DrawerEvent as E;
        use DrawerState as S;

        match (self, event) {
            (S::Closed, E::Open { existing: None }) => S::Options,
            (S::Closed, E::Open { existing: Some((widget_type, widget_id)) }) => S::Form {
                widget_type,
                widget_id,
            },
            (
                S::Options,
                E::Select {
                    widget_type,
                    widget_id: Some(widget_id),
                },
            ) => S::Form {
                widget_type,
                widget_id,
            },
            (
                S::Form {
                    widget_type,
                    widget_id,
                },
                E::EditItem { item_id },
            ) => S::EditingItem {
                widget_type,
                widget_id,
                item_id,
            },
            (S::Form { .. } | S::EditingItem { .. }, E::Close | E::SaveAndClose) => S::Closed,
            (S::Options, E::Close) => S::Closed,
            (state, _) => state,
        }
    }

    pub fn is_open(self) -> bool {
        self != DrawerState::Closed
    }

    pub fn widget(self) -> Option<(WidgetType, i64)> {
        match self {
            DrawerState::Form {
                widget_type,
                widget_id,
            }
            | DrawerState::EditingItem {
                widget_type,
                widget_id,
                ..
            } => Some((widget_type, widget_id)),
            _ => None,
        }
    }

    pub fn editing_item(self) -> Option<i64> {
        match self {
            DrawerState::EditingItem { item_id, .. } => Some(item_id),
            _ => None,
        }
    }
}

/// Drawer state shared by the widget list and the drawer itself.
#[derive(Clone, Copy)]
pub(crate) struct WidgetDrawer {
    state: RwSignal<DrawerState>,
}

impl WidgetDrawer {
    pub fn new() -> Self {
        Self {
            state: RwSignal::new(DrawerState::Closed),
        }
    }

    pub fn state(&self) -> DrawerState {
        self.state.get()
    }

    pub fn state_untracked(&self) -> DrawerState {
        self.state.get_untracked()
    }

    pub fn dispatch(&self, event: DrawerEvent) {
        let prev = self.state.get_untracked();
        let next = prev.apply(event);
        if next == prev {
            tracing::debug!(?prev, ?event, "drawer event ignored");
            return;
        }
        tracing::debug!(?prev, ?next, "drawer transition");
        self.state.set(next);
    }
}

impl Default for WidgetDrawer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use DrawerEvent as E;
    use DrawerState as S;

    const FORM: S = S::Form {
        widget_type: WidgetType::Documents,
        widget_id: 7,
    };

    const EDITING: S = S::EditingItem {
        widget_type: WidgetType::Documents,
        widget_id: 7,
        item_id: 3,
    };

    fn all_events() -> Vec<E> {
        vec![
            E::Open { existing: None },
            E::Open {
                existing: Some((WidgetType::Map, 2)),
            },
            E::Select {
                widget_type: WidgetType::Poll,
                widget_id: Some(5),
            },
            E::Select {
                widget_type: WidgetType::Poll,
                widget_id: None,
            },
            E::EditItem { item_id: 9 },
            E::Close,
            E::SaveAndClose,
        ]
    }

    #[test]
    fn test_open_goes_to_options_or_existing_form() {
        assert_eq!(S::Closed.apply(E::Open { existing: None }), S::Options);
        assert_eq!(
            S::Closed.apply(E::Open {
                existing: Some((WidgetType::Documents, 7))
            }),
            FORM
        );
    }

    #[test]
    fn test_select_requires_backing_widget() {
        let no_widget = E::Select {
            widget_type: WidgetType::Documents,
            widget_id: None,
        };
        assert_eq!(S::Options.apply(no_widget), S::Options);

        let with_widget = E::Select {
            widget_type: WidgetType::Documents,
            widget_id: Some(7),
        };
        assert_eq!(S::Options.apply(with_widget), FORM);
    }

    #[test]
    fn test_edit_item_only_from_form() {
        assert_eq!(FORM.apply(E::EditItem { item_id: 3 }), EDITING);
        assert_eq!(S::Options.apply(E::EditItem { item_id: 3 }), S::Options);
        assert_eq!(S::Closed.apply(E::EditItem { item_id: 3 }), S::Closed);
        assert_eq!(EDITING.apply(E::EditItem { item_id: 4 }), EDITING);
    }

    #[test]
    fn test_close_and_save_close() {
        for s in [FORM, EDITING] {
            assert_eq!(s.apply(E::Close), S::Closed);
            assert_eq!(s.apply(E::SaveAndClose), S::Closed);
        }
        assert_eq!(S::Options.apply(E::Close), S::Closed);
        assert_eq!(S::Options.apply(E::SaveAndClose), S::Options);
    }

    #[test]
    fn test_closed_ignores_everything_but_open() {
        for e in all_events() {
            let next = S::Closed.apply(e);
            match e {
                E::Open { .. } => assert!(next.is_open()),
                _ => assert_eq!(next, S::Closed),
            }
        }
    }

    #[test]
    fn test_open_is_ignored_when_already_open() {
        for s in [S::Options, FORM, EDITING] {
            assert_eq!(s.apply(E::Open { existing: None }), s);
        }
    }

    #[test]
    fn test_accessors() {
        assert_eq!(EDITING.widget(), Some((WidgetType::Documents, 7)));
        assert_eq!(EDITING.editing_item(), Some(3));
        assert_eq!(FORM.editing_item(), None);
        assert_eq!(S::Options.widget(), None);
        assert!(!S::Closed.is_open());
    }
}
