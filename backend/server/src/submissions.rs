//! # Contact Submissions
//!
//! Each submission is one JSON record under its own id. The ids are also
//! appended to the `contact_submissions` index, which is how the admin view
//! enumerates them; the store has no other way to list records.
//!
//! Record and index entry are written together through
//! [`KvStore::insert_indexed`]. Submissions are never updated or deleted.
use chrono::Utc;
use tracing::info;
use wire::{ContactForm, ContactSubmission, models::STATUS_NEW};

use crate::{
    error::AppError,
    store::{KvStore, StoreError},
    utils::new_submission_id,
};

pub const SUBMISSIONS_INDEX: &str = "contact_submissions";

/// Stores a contact form and returns the new submission id.
///
/// Incomplete forms are rejected before anything is written.
pub async fn record_submission(store: &dyn KvStore, form: ContactForm) -> Result<String, AppError> {
    if !form.is_complete() {
        return Err(AppError::Validation("All fields are required"));
    }

    let timestamp = Utc::now();
    let id = new_submission_id(timestamp);

    let ContactForm {
        name,
        email,
        subject,
        message,
    } = form;

    let submission = ContactSubmission {
        id: id.clone(),
        name,
        email,
        subject,
        message,
        timestamp,
        status: STATUS_NEW.to_string(),
    };

    let record = serde_json::to_value(&submission).map_err(StoreError::from)?;
    store.insert_indexed(&id, &record, SUBMISSIONS_INDEX).await?;

    info!("Contact form submission received from {}", submission.email);

    Ok(id)
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, sync::Arc};

    use super::*;
    use crate::{
        analytics::list_submissions,
        store::{
            MemoryStore,
            testing::{CountingStore, FailingStore},
        },
    };

    fn jane() -> ContactForm {
        ContactForm {
            name: "Jane".to_string(),
            email: "jane@x.com".to_string(),
            subject: "Hi".to_string(),
            message: "Test".to_string(),
        }
    }

    #[tokio::test]
    async fn test_recorded_submission_is_listed() {
        let store = CountingStore::default();

        let id = record_submission(&store, jane()).await.unwrap();
        let listed = list_submissions(&store).await.unwrap();

        assert_eq!(listed.len(), 1);
        let submission = &listed[0];
        assert_eq!(submission.id, id);
        assert_eq!(submission.name, "Jane");
        assert_eq!(submission.email, "jane@x.com");
        assert_eq!(submission.subject, "Hi");
        assert_eq!(submission.message, "Test");
        assert_eq!(submission.status, "new");
    }

    #[tokio::test]
    async fn test_ids_are_fresh() {
        let store = CountingStore::default();
        let mut seen = HashSet::new();

        for _ in 0..20 {
            let id = record_submission(&store, jane()).await.unwrap();
            assert!(seen.insert(id));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submissions_are_all_listed() {
        let store = Arc::new(MemoryStore::new());

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { record_submission(store.as_ref(), jane()).await })
            })
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap().unwrap());
        }

        assert_eq!(ids.len(), 50);
        assert_eq!(store.index_members(SUBMISSIONS_INDEX).await.unwrap().len(), 50);

        let listed: HashSet<String> = list_submissions(store.as_ref())
            .await
            .unwrap()
            .into_iter()
            .map(|submission| submission.id)
            .collect();
        assert_eq!(listed, ids);
    }

    #[tokio::test]
    async fn test_incomplete_form_writes_nothing() {
        let store = CountingStore::default();

        for blank in 0..4 {
            let mut form = jane();
            match blank {
                0 => form.name.clear(),
                1 => form.email.clear(),
                2 => form.subject.clear(),
                _ => form.message.clear(),
            }

            let result = record_submission(&store, form).await;
            assert!(matches!(result, Err(AppError::Validation(_))));
        }

        assert_eq!(store.writes(), 0);
        assert!(list_submissions(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_surfaces() {
        let result = record_submission(&FailingStore, jane()).await;

        assert!(matches!(result, Err(AppError::Store(_))));
    }
}
