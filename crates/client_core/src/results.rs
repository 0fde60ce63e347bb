//! Reducer for the story results list: fetch lifecycle, page accumulation,
//! local removal.

use shared::{domain::StoryId, protocol::Story};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoriesState {
    pub data: Vec<Story>,
    pub page: u32,
    pub is_loading: bool,
    pub is_error: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoriesAction {
    FetchInit,
    FetchSuccess { hits: Vec<Story>, page: u32 },
    FetchFailure,
    RemoveStory { object_id: StoryId },
}

/// Pure transition function. Callers apply actions serially per state owner;
/// the owning client keeps the state behind a mutex for exactly that reason.
///
/// A page-0 success replaces the accumulated data wholesale (a fresh search);
/// later pages append in arrival order. Appending does not dedup: avoiding
/// overlapping page requests is the caller's contract.
pub fn reduce(state: &StoriesState, action: StoriesAction) -> StoriesState {
    match action {
        StoriesAction::FetchInit => StoriesState {
            is_loading: true,
            is_error: false,
            ..state.clone()
        },
        StoriesAction::FetchSuccess { hits, page } => {
            let data = if page == 0 {
                hits
            } else {
                let mut merged = state.data.clone();
                merged.extend(hits);
                merged
            };
            StoriesState {
                data,
                page,
                is_loading: false,
                is_error: false,
            }
        }
        StoriesAction::FetchFailure => StoriesState {
            is_loading: false,
            is_error: true,
            ..state.clone()
        },
        StoriesAction::RemoveStory { object_id } => StoriesState {
            data: state
                .data
                .iter()
                .filter(|story| story.object_id != object_id)
                .cloned()
                .collect(),
            ..state.clone()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story(id: &str, title: &str) -> Story {
        Story {
            object_id: StoryId::from(id),
            url: format!("https://example.com/{id}"),
            title: title.into(),
            author: "author".into(),
            num_comments: 2,
            points: 5,
        }
    }

    fn loaded(stories: Vec<Story>) -> StoriesState {
        StoriesState {
            data: stories,
            page: 0,
            is_loading: false,
            is_error: false,
        }
    }

    #[test]
    fn fetch_init_sets_loading_and_clears_error() {
        let state = StoriesState {
            data: vec![story("1", "React")],
            page: 3,
            is_loading: false,
            is_error: true,
        };

        let next = reduce(&state, StoriesAction::FetchInit);

        assert!(next.is_loading);
        assert!(!next.is_error);
        assert_eq!(next.data, state.data);
        assert_eq!(next.page, 3);
    }

    #[test]
    fn first_page_success_replaces_data() {
        let state = loaded(vec![story("1", "React"), story("2", "Redux")]);
        let fresh = vec![story("9", "JavaScript")];

        let next = reduce(
            &state,
            StoriesAction::FetchSuccess {
                hits: fresh.clone(),
                page: 0,
            },
        );

        assert_eq!(next.data, fresh);
        assert_eq!(next.page, 0);
        assert!(!next.is_loading);
        assert!(!next.is_error);
    }

    #[test]
    fn later_page_success_appends_in_arrival_order() {
        let state = loaded(vec![story("1", "React"), story("2", "Redux")]);

        let next = reduce(
            &state,
            StoriesAction::FetchSuccess {
                hits: vec![story("3", "Remix")],
                page: 1,
            },
        );

        assert_eq!(next.data.len(), 3);
        assert_eq!(next.data[2].object_id, StoryId::from("3"));
        assert_eq!(next.page, 1);
    }

    #[test]
    fn fetch_failure_flags_error_and_keeps_last_known_data() {
        let state = loaded(vec![story("1", "React")]);

        let next = reduce(&state, StoriesAction::FetchFailure);

        assert!(next.is_error);
        assert!(!next.is_loading);
        assert_eq!(next.data, state.data);
        assert_eq!(next.page, state.page);
    }

    #[test]
    fn remove_story_drops_exactly_the_matching_id() {
        let state = loaded(vec![story("1", "React"), story("2", "Redux")]);

        let next = reduce(
            &state,
            StoriesAction::RemoveStory {
                object_id: StoryId::from("1"),
            },
        );

        assert_eq!(next.data.len(), state.data.len() - 1);
        assert!(next.data.iter().all(|s| s.object_id != StoryId::from("1")));
    }

    #[test]
    fn remove_story_with_absent_id_is_a_noop() {
        let state = loaded(vec![story("1", "React")]);

        let next = reduce(
            &state,
            StoriesAction::RemoveStory {
                object_id: StoryId::from("missing"),
            },
        );

        assert_eq!(next, state);
    }
}
