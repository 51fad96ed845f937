//! Job store integration tests: enqueue dedup, claim semantics, and stats.

mod test_utils;

use anyhow::Result;
use chrono::Duration;

use soletrack::models::sync_job::{JobStatus, Provider};
use soletrack::repositories::SyncJobRepository;
use test_utils::{fetch_job, make_due, set_job_state, setup_test_db};

#[tokio::test]
async fn enqueue_deduplicates_active_jobs() -> Result<()> {
    let db = setup_test_db().await?;
    let repo = SyncJobRepository::new(db.clone());

    let first = repo.enqueue("DD1391-100", Provider::Stockx, 5).await?;
    assert!(first.is_some());

    // Same (style, provider) while pending is a no-op.
    let second = repo.enqueue("DD1391-100", Provider::Stockx, 5).await?;
    assert!(second.is_none());

    // Other provider and other style are unaffected.
    assert!(repo.enqueue("DD1391-100", Provider::Alias, 5).await?.is_some());
    assert!(repo.enqueue("CW2288-111", Provider::Stockx, 5).await?.is_some());

    // Once the active job reaches a terminal state, enqueue works again.
    repo.mark_failed(first.unwrap().id, "stockx returned 500")
        .await?;
    assert!(repo.enqueue("DD1391-100", Provider::Stockx, 5).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn claim_marks_processing_and_increments_attempts() -> Result<()> {
    let db = setup_test_db().await?;
    let repo = SyncJobRepository::new(db.clone());
    let job = repo
        .enqueue("DD1391-100", Provider::Stockx, 5)
        .await?
        .expect("job enqueued");
    assert_eq!(job.attempts, 0);

    let claimed = repo.claim_eligible(10, None).await?;
    assert_eq!(claimed.len(), 1);
    assert_eq!(claimed[0].status, JobStatus::Processing);
    assert_eq!(claimed[0].attempts, 1);
    assert!(claimed[0].last_attempt_at.is_some());
    Ok(())
}

#[tokio::test]
async fn concurrent_claims_never_overlap() -> Result<()> {
    let db = setup_test_db().await?;
    let repo = SyncJobRepository::new(db.clone());
    for i in 0..6 {
        repo.enqueue(&format!("SKU-{i:03}"), Provider::Stockx, 5)
            .await?;
    }

    let (a, b) = tokio::join!(repo.claim_eligible(4, None), repo.claim_eligible(4, None));
    let a = a?;
    let b = b?;

    assert_eq!(a.len() + b.len(), 6);
    for job in &a {
        assert!(
            !b.iter().any(|other| other.id == job.id),
            "job {} claimed twice",
            job.id
        );
    }
    Ok(())
}

#[tokio::test]
async fn same_instant_claims_stay_disjoint() -> Result<()> {
    let db = setup_test_db().await?;
    let repo = SyncJobRepository::new(db.clone());
    for i in 0..4 {
        repo.enqueue(&format!("SKU-{i:03}"), Provider::Stockx, 5)
            .await?;
    }

    // Back-to-back claims routinely share a wall-clock timestamp; ownership
    // must come from the row updates, not from the claim time.
    let first = repo.claim_eligible(2, None).await?;
    let second = repo.claim_eligible(2, None).await?;

    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 2);
    for job in &first {
        assert!(!second.iter().any(|other| other.id == job.id));
    }
    Ok(())
}

#[tokio::test]
async fn scheduled_retries_are_invisible_until_due() -> Result<()> {
    let db = setup_test_db().await?;
    let repo = SyncJobRepository::new(db.clone());
    let job = repo
        .enqueue("DD1391-100", Provider::Stockx, 5)
        .await?
        .expect("job enqueued");
    set_job_state(
        &db,
        job.id,
        JobStatus::Pending,
        1,
        Some(Duration::minutes(10)),
    )
    .await?;

    assert!(repo.claim_eligible(10, None).await?.is_empty());

    make_due(&db, job.id).await?;
    assert_eq!(repo.claim_eligible(10, None).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn mark_completed_clears_error_state() -> Result<()> {
    let db = setup_test_db().await?;
    let repo = SyncJobRepository::new(db.clone());
    let job = repo
        .enqueue("DD1391-100", Provider::Stockx, 5)
        .await?
        .expect("job enqueued");
    repo.mark_retrying(
        job.id,
        "stockx returned 500",
        (chrono::Utc::now() + Duration::minutes(2)).fixed_offset(),
    )
    .await?;

    repo.mark_completed(job.id).await?;

    let reloaded = fetch_job(&db, job.id).await?;
    assert_eq!(reloaded.status, JobStatus::Completed);
    assert!(reloaded.last_error.is_none());
    assert!(reloaded.next_retry_at.is_none());
    assert!(reloaded.completed_at.is_some());
    Ok(())
}

#[tokio::test]
async fn queue_stats_groups_by_status() -> Result<()> {
    let db = setup_test_db().await?;
    let repo = SyncJobRepository::new(db.clone());

    let a = repo
        .enqueue("AAA-111", Provider::Stockx, 5)
        .await?
        .expect("job enqueued");
    let b = repo
        .enqueue("BBB-222", Provider::Stockx, 5)
        .await?
        .expect("job enqueued");
    repo.enqueue("CCC-333", Provider::Alias, 5).await?;
    repo.mark_completed(a.id).await?;
    repo.mark_failed(b.id, "stockx returned 500").await?;

    let stats = repo.queue_stats().await?;
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.processing, 0);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.failed, 1);
    Ok(())
}
