//! # Admin Listings
//!
//! Read-only views over the store for the admin dashboard. Both listings are
//! all-or-nothing: a failed store read aborts the whole listing.
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};
use wire::{
    ContactSubmission, ProjectAnalytics,
    models::{UNKNOWN_PROJECT, parse_timestamp},
};

use crate::{
    store::{KvStore, StoreError},
    submissions::SUBMISSIONS_INDEX,
    views::{INFO_PREFIX, VIEWS_PREFIX, info_key},
};

/// Info records may predate the typed schema. Each field is read on its own
/// so a bad date never costs the title.
#[derive(Default)]
struct StoredInfo {
    title: Option<String>,
    first_viewed: Option<DateTime<Utc>>,
    last_viewed: Option<DateTime<Utc>>,
}

impl StoredInfo {
    fn from_value(value: &Value) -> Self {
        let text = |field: &str| value.get(field).and_then(Value::as_str);

        Self {
            title: text("title").map(str::to_string),
            first_viewed: text("firstViewed").and_then(parse_timestamp),
            last_viewed: text("lastViewed").and_then(parse_timestamp),
        }
    }
}

/// All submissions, newest first. Ties keep index order.
pub async fn list_submissions(store: &dyn KvStore) -> Result<Vec<ContactSubmission>, StoreError> {
    let ids = store.index_members(SUBMISSIONS_INDEX).await?;
    let mut submissions = Vec::with_capacity(ids.len());

    for id in ids {
        match store.get(&id).await? {
            Some(record) => submissions.push(serde_json::from_value::<ContactSubmission>(record)?),
            None => debug!("Indexed submission {id} has no record, skipping"),
        }
    }

    submissions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    Ok(submissions)
}

/// One row per counted project, most viewed first, ties by project id.
pub async fn list_project_analytics(
    store: &dyn KvStore,
) -> Result<Vec<ProjectAnalytics>, StoreError> {
    let counters = store.get_by_prefix(VIEWS_PREFIX).await?;
    let infos: HashMap<String, Value> = store
        .get_by_prefix(INFO_PREFIX)
        .await?
        .into_iter()
        .map(|entry| (entry.key, entry.value))
        .collect();

    let mut analytics = Vec::with_capacity(counters.len());

    for counter in counters {
        let Some(project_id) = counter.key.strip_prefix(VIEWS_PREFIX) else {
            continue;
        };

        let Some(views) = counter.value.as_i64() else {
            warn!("Counter {} holds {}, not a count", counter.key, counter.value);
            continue;
        };

        let info = infos
            .get(&info_key(project_id))
            .map(StoredInfo::from_value)
            .unwrap_or_default();

        analytics.push(ProjectAnalytics {
            project_id: project_id.to_string(),
            title: info
                .title
                .filter(|title| !title.is_empty())
                .unwrap_or_else(|| UNKNOWN_PROJECT.to_string()),
            views,
            first_viewed: info.first_viewed,
            last_viewed: info.last_viewed,
        });
    }

    analytics.sort_by(|a, b| {
        b.views
            .cmp(&a.views)
            .then_with(|| a.project_id.cmp(&b.project_id))
    });

    Ok(analytics)
}
