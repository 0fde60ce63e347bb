use serde::{Deserialize, Serialize};

use crate::domain::StoryId;

/// One search hit. Immutable once fetched; identity is `object_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    #[serde(rename = "objectID")]
    pub object_id: StoryId,
    pub url: String,
    pub title: String,
    pub author: String,
    pub num_comments: u32,
    pub points: i64,
}

/// JSON body of `GET <base>/search?query=<term>&page=<n>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub hits: Vec<Story>,
    pub page: u32,
}
