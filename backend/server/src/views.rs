//! # Project Views
//!
//! Two keys per project:
//! - `project_views_<id>`: integer counter, bumped atomically
//! - `project_info_<id>`: `{id, title, firstViewed, lastViewed}`
//!
//! The info record is only created once a title is known. The two keys are
//! independent; a counter without info shows up as "Unknown Project".
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wire::models::parse_timestamp;

use crate::{
    error::AppError,
    store::{KvStore, StoreError},
};

pub const VIEWS_PREFIX: &str = "project_views_";
pub const INFO_PREFIX: &str = "project_info_";

const LAST_VIEWED: &str = "lastViewed";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    pub id: String,
    pub title: String,
    pub first_viewed: DateTime<Utc>,
    pub last_viewed: DateTime<Utc>,
}

pub fn views_key(project_id: &str) -> String {
    format!("{VIEWS_PREFIX}{project_id}")
}

pub fn info_key(project_id: &str) -> String {
    format!("{INFO_PREFIX}{project_id}")
}

/// Counts one view of `project_id` and returns the updated total.
pub async fn record_view(
    store: &dyn KvStore,
    project_id: &str,
    project_title: Option<&str>,
) -> Result<i64, AppError> {
    if project_id.is_empty() {
        return Err(AppError::Validation("Project ID is required"));
    }

    let views = store.increment(&views_key(project_id), 1).await?;

    touch_info(store, project_id, project_title.filter(|t| !t.is_empty())).await?;

    Ok(views)
}

async fn touch_info(
    store: &dyn KvStore,
    project_id: &str,
    project_title: Option<&str>,
) -> Result<(), StoreError> {
    let key = info_key(project_id);
    let now = Utc::now();

    match store.get(&key).await? {
        // keep every stored field, only move lastViewed forward
        Some(Value::Object(mut info)) => {
            let first_viewed = info
                .get("firstViewed")
                .and_then(Value::as_str)
                .and_then(parse_timestamp);
            let last_viewed = first_viewed.map_or(now, |first| first.max(now));

            info.insert(LAST_VIEWED.to_string(), serde_json::to_value(last_viewed)?);
            store.set(&key, &Value::Object(info)).await
        }
        Some(_) | None => match project_title {
            Some(title) => {
                let info = ProjectInfo {
                    id: project_id.to_string(),
                    title: title.to_string(),
                    first_viewed: now,
                    last_viewed: now,
                };
                store.set(&key, &serde_json::to_value(info)?).await
            }
            None => Ok(()),
        },
    }
}
