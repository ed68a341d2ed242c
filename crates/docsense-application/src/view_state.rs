//! Transient view state of the chat screen.
//!
//! Nothing here talks to the backend; everything is plain data the front-end
//! reads to render and mutates in response to input.

use docsense_core::document::ChatSummary;
use docsense_core::identity::Identity;

const DEFAULT_USER_LABEL: &str = "User";
const DEFAULT_INITIALS: &str = "U";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub sidebar_collapsed: bool,
    pub search: String,
    pub active_chat_id: Option<String>,
    pub profile_menu_open: bool,
    /// Draft text of the composer
    pub composer: String,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_collapsed = !self.sidebar_collapsed;
    }

    pub fn expand_sidebar(&mut self) {
        self.sidebar_collapsed = false;
    }

    pub fn toggle_profile_menu(&mut self) {
        self.profile_menu_open = !self.profile_menu_open;
    }

    /// Any interaction outside the menu closes it.
    pub fn close_profile_menu(&mut self) {
        self.profile_menu_open = false;
    }

    /// Takes the composer text, leaving the composer empty.
    pub fn take_composer(&mut self) -> String {
        std::mem::take(&mut self.composer)
    }

    /// Chats whose title contains the search text, ignoring case.
    pub fn filter_chats<'a>(&self, chats: &'a [ChatSummary]) -> Vec<&'a ChatSummary> {
        let needle = self.search.trim().to_lowercase();
        chats
            .iter()
            .filter(|chat| needle.is_empty() || chat.title.to_lowercase().contains(&needle))
            .collect()
    }

    /// Selects the first chat when nothing is selected yet.
    pub fn ensure_active_chat(&mut self, chats: &[ChatSummary]) {
        if self.active_chat_id.is_none() {
            self.active_chat_id = chats.first().map(|chat| chat.id.clone());
        }
    }
}

/// Label of the profile button: email, then id, then "User".
pub fn user_label(identity: Option<&Identity>) -> String {
    identity
        .map(|identity| identity.display_label().to_string())
        .unwrap_or_else(|| DEFAULT_USER_LABEL.to_string())
}

/// Avatar initials, `"U"` when the identity has no usable email.
pub fn avatar_initials(identity: Option<&Identity>) -> String {
    identity
        .and_then(Identity::initials)
        .unwrap_or_else(|| DEFAULT_INITIALS.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chats() -> Vec<ChatSummary> {
        vec![
            ChatSummary::new("d1", "Quarterly Report"),
            ChatSummary::new("d2", "Employee Handbook"),
            ChatSummary::new("d3", "report-draft.pdf"),
        ]
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let chats = chats();
        let view = ViewState {
            search: " REPORT ".to_string(),
            ..Default::default()
        };
        let ids: Vec<_> = view.filter_chats(&chats).iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["d1", "d3"]);
    }

    #[test]
    fn test_empty_search_shows_everything() {
        let chats = chats();
        assert_eq!(ViewState::new().filter_chats(&chats).len(), 3);
    }

    #[test]
    fn test_sidebar_and_menu_toggles() {
        let mut view = ViewState::new();
        view.toggle_sidebar();
        assert!(view.sidebar_collapsed);
        view.expand_sidebar();
        assert!(!view.sidebar_collapsed);

        view.toggle_profile_menu();
        assert!(view.profile_menu_open);
        view.close_profile_menu();
        assert!(!view.profile_menu_open);
    }

    #[test]
    fn test_take_composer_clears_draft() {
        let mut view = ViewState {
            composer: "hello".to_string(),
            ..Default::default()
        };
        assert_eq!(view.take_composer(), "hello");
        assert!(view.composer.is_empty());
        assert_eq!(view.take_composer(), "");
    }

    #[test]
    fn test_ensure_active_chat_keeps_selection() {
        let chats = chats();
        let mut view = ViewState::new();
        view.ensure_active_chat(&chats);
        assert_eq!(view.active_chat_id.as_deref(), Some("d1"));

        view.active_chat_id = Some("d2".to_string());
        view.ensure_active_chat(&chats);
        assert_eq!(view.active_chat_id.as_deref(), Some("d2"));
    }

    #[test]
    fn test_user_label_and_initials_fallbacks() {
        assert_eq!(user_label(None), "User");
        assert_eq!(avatar_initials(None), "U");

        let anonymous = Identity::new("uid-9", None);
        assert_eq!(user_label(Some(&anonymous)), "uid-9");
        assert_eq!(avatar_initials(Some(&anonymous)), "U");

        let ada = Identity::new("uid-1", Some("ada.lovelace@example.com".to_string()));
        assert_eq!(user_label(Some(&ada)), "ada.lovelace@example.com");
        assert_eq!(avatar_initials(Some(&ada)), "AL");
    }
}
