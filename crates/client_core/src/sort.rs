//! Pure sorted view over fetched stories. Only the key and direction are
//! state; the sorted sequence is recomputed from the items on every view,
//! never stored.

use std::str::FromStr;

use anyhow::anyhow;
use shared::protocol::Story;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    None,
    Title,
    Author,
    Comments,
    Points,
}

impl FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(SortKey::None),
            "title" => Ok(SortKey::Title),
            "author" => Ok(SortKey::Author),
            "comments" => Ok(SortKey::Comments),
            "points" => Ok(SortKey::Points),
            other => Err(anyhow!("unknown sort key '{other}'")),
        }
    }
}

/// Textual keys sort ascending, numeric keys descending (highest first), as
/// the listing presents them; `reverse` flips whichever direction applies.
pub fn sorted_view(items: &[Story], key: SortKey, reverse: bool) -> Vec<Story> {
    let mut view: Vec<Story> = items.to_vec();
    match key {
        SortKey::None => {}
        SortKey::Title => {
            view.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
        }
        SortKey::Author => {
            view.sort_by(|a, b| a.author.to_lowercase().cmp(&b.author.to_lowercase()))
        }
        SortKey::Comments => view.sort_by(|a, b| b.num_comments.cmp(&a.num_comments)),
        SortKey::Points => view.sort_by(|a, b| b.points.cmp(&a.points)),
    }
    if reverse && key != SortKey::None {
        view.reverse();
    }
    view
}
