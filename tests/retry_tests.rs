//! Retry controller integration tests.

mod test_utils;

use anyhow::Result;
use sea_orm::DatabaseConnection;

use soletrack::models::sync_job::{JobStatus, Provider};
use soletrack::repositories::SyncJobRepository;
use soletrack::sync::RetryController;
use test_utils::{StyleFixture, set_job_state, setup_test_db};

fn controller(db: &DatabaseConnection) -> RetryController {
    RetryController::new(db.clone(), 5)
}

#[tokio::test]
async fn retry_enqueues_all_syncable_providers() -> Result<()> {
    let db = setup_test_db().await?;
    StyleFixture::new("DD1391-100")
        .alias_catalog_id("cat-1")
        .insert(&db)
        .await?;

    let outcome = controller(&db).retry_sync("dd1391-100", None).await?;

    assert_eq!(outcome.jobs_created.len(), 2);
    assert!(outcome.errors.is_empty());
    let providers: Vec<Provider> = outcome.jobs_created.iter().map(|j| j.provider).collect();
    assert!(providers.contains(&Provider::Stockx));
    assert!(providers.contains(&Provider::Alias));
    Ok(())
}

#[tokio::test]
async fn retry_is_idempotent_while_jobs_are_in_flight() -> Result<()> {
    let db = setup_test_db().await?;
    StyleFixture::new("DD1391-100")
        .alias_catalog_id("cat-1")
        .insert(&db)
        .await?;

    let first = controller(&db).retry_sync("DD1391-100", None).await?;
    assert_eq!(first.jobs_created.len(), 2);

    let second = controller(&db).retry_sync("DD1391-100", None).await?;
    assert!(second.jobs_created.is_empty());
    assert!(second.errors.is_empty());
    Ok(())
}

#[tokio::test]
async fn alias_without_catalog_id_reports_an_error() -> Result<()> {
    let db = setup_test_db().await?;
    StyleFixture::new("CW2288-111").insert(&db).await?;

    let outcome = controller(&db).retry_sync("CW2288-111", None).await?;

    // StockX proceeds via SKU search; Alias cannot.
    assert_eq!(outcome.jobs_created.len(), 1);
    assert_eq!(outcome.jobs_created[0].provider, Provider::Stockx);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("no catalog id"));
    Ok(())
}

#[tokio::test]
async fn alias_skip_is_silent_after_a_failed_attempt() -> Result<()> {
    let db = setup_test_db().await?;
    StyleFixture::new("CW2288-111").insert(&db).await?;
    let repo = SyncJobRepository::new(db.clone());
    let job = repo
        .enqueue("CW2288-111", Provider::Alias, 5)
        .await?
        .expect("job enqueued");
    repo.mark_failed(job.id, "style CW2288-111 has no alias catalog id")
        .await?;

    let outcome = controller(&db)
        .retry_sync("CW2288-111", Some(Provider::Alias))
        .await?;

    // A prior job means the style is no longer "not mapped", so the missing
    // catalog id is neither a fresh job nor a repeated error.
    assert!(outcome.jobs_created.is_empty());
    assert!(outcome.errors.is_empty());
    Ok(())
}

#[tokio::test]
async fn alias_only_retry_of_an_unmapped_style_creates_nothing() -> Result<()> {
    let db = setup_test_db().await?;
    StyleFixture::new("CW2288-111").insert(&db).await?;

    let outcome = controller(&db)
        .retry_sync("CW2288-111", Some(Provider::Alias))
        .await?;

    assert!(outcome.jobs_created.is_empty());
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("no catalog id, cannot sync"));
    Ok(())
}

#[tokio::test]
async fn completed_provider_is_left_alone() -> Result<()> {
    let db = setup_test_db().await?;
    StyleFixture::new("DD1391-100")
        .alias_catalog_id("cat-1")
        .insert(&db)
        .await?;
    let repo = SyncJobRepository::new(db.clone());
    let job = repo
        .enqueue("DD1391-100", Provider::Stockx, 5)
        .await?
        .expect("job enqueued");
    set_job_state(&db, job.id, JobStatus::Completed, 1, None).await?;

    let outcome = controller(&db).retry_sync("DD1391-100", None).await?;

    assert_eq!(outcome.jobs_created.len(), 1);
    assert_eq!(outcome.jobs_created[0].provider, Provider::Alias);
    Ok(())
}

#[tokio::test]
async fn failed_provider_gets_a_fresh_job() -> Result<()> {
    let db = setup_test_db().await?;
    StyleFixture::new("DD1391-100").insert(&db).await?;
    let repo = SyncJobRepository::new(db.clone());
    let job = repo
        .enqueue("DD1391-100", Provider::Stockx, 5)
        .await?
        .expect("job enqueued");
    repo.mark_failed(job.id, "stockx returned 500").await?;

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let outcome = controller(&db).retry_sync("DD1391-100", None).await?;

    assert_eq!(outcome.jobs_created.len(), 1);
    assert_ne!(outcome.jobs_created[0].job_id, job.id);
    Ok(())
}

#[tokio::test]
async fn provider_filter_limits_the_retry() -> Result<()> {
    let db = setup_test_db().await?;
    StyleFixture::new("DD1391-100")
        .alias_catalog_id("cat-1")
        .insert(&db)
        .await?;

    let outcome = controller(&db)
        .retry_sync("DD1391-100", Some(Provider::Stockx))
        .await?;

    assert_eq!(outcome.jobs_created.len(), 1);
    assert_eq!(outcome.jobs_created[0].provider, Provider::Stockx);
    Ok(())
}

#[test]
fn goat_parses_as_the_alias_provider() {
    assert_eq!("goat".parse::<Provider>(), Ok(Provider::Alias));
    assert_eq!("StockX".parse::<Provider>(), Ok(Provider::Stockx));
    assert!("ebay".parse::<Provider>().is_err());
}
