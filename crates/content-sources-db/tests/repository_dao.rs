//! PostgreSQL tests for the repository DAO.
//!
//! These run against the database named by `DATABASE_URL` and are skipped
//! when it is not set. Every test uses its own organization ids and URLs, so
//! they can share one database and run in parallel.

use content_sources_core::{FilterData, PaginationData, RepositoryRequest};
use content_sources_db::{DbError, PgRepositoryDao, RepositoryDao, create_pool, run_migrations};
use uuid::Uuid;

async fn setup() -> Option<PgRepositoryDao> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping");
        return None;
    };
    let pool = create_pool(&url, 5).await.expect("connect to database");
    run_migrations(&pool).await.expect("run migrations");
    Some(PgRepositoryDao::new(pool))
}

fn unique_org() -> String {
    format!("org-{}", Uuid::new_v4())
}

fn unique_url() -> String {
    format!("https://{}.example.com/repo/", Uuid::new_v4())
}

fn request(org_id: &str, name: &str, url: &str) -> RepositoryRequest {
    RepositoryRequest {
        name: Some(name.to_string()),
        url: Some(url.to_string()),
        ..Default::default()
    }
    .with_owner("acct", org_id)
}

fn constrained(org_id: &str, url: &str, arch: &str, versions: &[&str]) -> RepositoryRequest {
    RepositoryRequest {
        distribution_arch: Some(arch.to_string()),
        distribution_versions: Some(versions.iter().map(|v| v.to_string()).collect()),
        ..request(org_id, &format!("repo-{arch}-{}", versions.join("-")), url)
    }
}

#[tokio::test]
async fn test_same_url_in_two_orgs_shares_one_repository() {
    let Some(dao) = setup().await else { return };
    let (org_a, org_b, url) = (unique_org(), unique_org(), unique_url());

    let a = dao.create(request(&org_a, "a", &url)).await.unwrap();
    let b = dao.create(request(&org_b, "b", &url)).await.unwrap();

    assert_ne!(a.uuid, b.uuid);
    assert_eq!(a.url, url);
    assert_eq!(b.url, url);
    assert_eq!(dao.fetch(&org_a, a.uuid).await.unwrap().org_id, org_a);
    assert_eq!(dao.fetch(&org_b, b.uuid).await.unwrap().org_id, org_b);

    let repository = dao.fetch_repository_by_url(&url).await.unwrap().unwrap();
    assert!(!repository.public);

    // Configurations are never visible across organizations.
    assert!(matches!(
        dao.fetch(&org_a, b.uuid).await,
        Err(DbError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_same_url_twice_in_one_org_is_bad_validation() {
    let Some(dao) = setup().await else { return };
    let (org, url) = (unique_org(), unique_url());

    dao.create(request(&org, "first", &url)).await.unwrap();
    let err = dao.create(request(&org, "second", &url)).await.unwrap_err();
    assert!(matches!(err, DbError::BadValidation(_)), "{err:?}");
}

#[tokio::test]
async fn test_blank_fields_are_rejected() {
    let Some(dao) = setup().await else { return };
    let org = unique_org();

    let err = dao.create(request(&org, "", &unique_url())).await.unwrap_err();
    assert!(matches!(err, DbError::BadValidation(_)));

    let err = dao.create(request(&org, "name", "")).await.unwrap_err();
    assert!(matches!(err, DbError::BadValidation(_)));
}

#[tokio::test]
async fn test_delete_keeps_shared_repository() {
    let Some(dao) = setup().await else { return };
    let (org, url) = (unique_org(), unique_url());

    let created = dao.create(request(&org, "doomed", &url)).await.unwrap();
    dao.delete(&org, created.uuid).await.unwrap();

    assert!(matches!(
        dao.fetch(&org, created.uuid).await,
        Err(DbError::NotFound(_))
    ));
    assert!(dao.fetch_repository_by_url(&url).await.unwrap().is_some());
    assert!(matches!(
        dao.delete(&org, created.uuid).await,
        Err(DbError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_delete_is_scoped_to_org() {
    let Some(dao) = setup().await else { return };
    let (org, other) = (unique_org(), unique_org());

    let created = dao.create(request(&org, "mine", &unique_url())).await.unwrap();
    assert!(matches!(
        dao.delete(&other, created.uuid).await,
        Err(DbError::NotFound(_))
    ));
    assert!(dao.fetch(&org, created.uuid).await.is_ok());
}

#[tokio::test]
async fn test_list_available_for_arch() {
    let Some(dao) = setup().await else { return };
    let org = unique_org();

    dao.create(constrained(&org, &unique_url(), "x86_64", &[])).await.unwrap();
    dao.create(constrained(&org, &unique_url(), "", &[])).await.unwrap();
    dao.create(constrained(&org, &unique_url(), "aarch64", &[])).await.unwrap();

    let filters = FilterData {
        available_for_arch: "x86_64".to_string(),
        ..Default::default()
    };
    let (page, total) = dao
        .list(&org, PaginationData::default(), &filters)
        .await
        .unwrap();

    assert_eq!(total, 2);
    let mut arches: Vec<&str> = page.data.iter().map(|r| r.distribution_arch.as_str()).collect();
    arches.sort_unstable();
    assert_eq!(arches, vec!["", "x86_64"]);
}

#[tokio::test]
async fn test_list_available_for_version() {
    let Some(dao) = setup().await else { return };
    let org = unique_org();

    dao.create(constrained(&org, &unique_url(), "", &["8"])).await.unwrap();
    dao.create(constrained(&org, &unique_url(), "", &[])).await.unwrap();
    dao.create(constrained(&org, &unique_url(), "", &["9"])).await.unwrap();

    let filters = FilterData {
        available_for_version: "8".to_string(),
        ..Default::default()
    };
    let (_, total) = dao
        .list(&org, PaginationData::default(), &filters)
        .await
        .unwrap();
    assert_eq!(total, 2);
}

#[tokio::test]
async fn test_list_version_allow_list() {
    let Some(dao) = setup().await else { return };
    let org = unique_org();

    dao.create(constrained(&org, &unique_url(), "", &["7"])).await.unwrap();
    dao.create(constrained(&org, &unique_url(), "", &["8", "9"])).await.unwrap();
    dao.create(constrained(&org, &unique_url(), "", &["9"])).await.unwrap();
    dao.create(constrained(&org, &unique_url(), "", &[])).await.unwrap();

    let filters = FilterData {
        version: "7,8".to_string(),
        ..Default::default()
    };
    let (page, total) = dao
        .list(&org, PaginationData::default(), &filters)
        .await
        .unwrap();

    assert_eq!(total, 2);
    for repo in &page.data {
        assert!(
            repo.distribution_versions
                .iter()
                .any(|v| v == "7" || v == "8")
        );
    }
}

#[tokio::test]
async fn test_list_search_and_arch_allow_list() {
    let Some(dao) = setup().await else { return };
    let org = unique_org();

    dao.create(constrained(&org, "https://mirror.example.com/epel-search/", "x86_64", &[]))
        .await
        .unwrap();
    dao.create(request(&org, "epel-search-name", &unique_url()))
        .await
        .unwrap();
    dao.create(constrained(&org, &unique_url(), "s390x", &[])).await.unwrap();

    let search = FilterData {
        search: "epel-search".to_string(),
        ..Default::default()
    };
    let (_, total) = dao.list(&org, PaginationData::default(), &search).await.unwrap();
    assert_eq!(total, 2);

    let arches = FilterData {
        arch: "x86_64,s390x".to_string(),
        ..Default::default()
    };
    let (_, total) = dao.list(&org, PaginationData::default(), &arches).await.unwrap();
    assert_eq!(total, 2);
}

#[tokio::test]
async fn test_list_counts_before_paging() {
    let Some(dao) = setup().await else { return };
    let org = unique_org();

    let requests: Vec<RepositoryRequest> = (0..250)
        .map(|i| request(&org, &format!("repo-{i}"), &unique_url()))
        .collect();
    let result = dao.bulk_create(requests).await.unwrap();
    assert!(result.error.is_none());

    let (page, total) = dao
        .list(&org, PaginationData::new(Some(100), Some(0)), &FilterData::default())
        .await
        .unwrap();
    assert_eq!(total, 250);
    assert_eq!(page.data.len(), 100);

    let (page, total) = dao
        .list(&org, PaginationData::new(Some(300), None), &FilterData::default())
        .await
        .unwrap();
    assert_eq!(total, 250);
    assert_eq!(page.data.len(), 200);

    let (page, _) = dao
        .list(&org, PaginationData::new(Some(100), Some(200)), &FilterData::default())
        .await
        .unwrap();
    assert_eq!(page.data.len(), 50);
}

#[tokio::test]
async fn test_bulk_create_blanks_payloads_on_any_failure() {
    let Some(dao) = setup().await else { return };
    let org = unique_org();
    let shared = unique_url();
    let third = unique_url();

    let result = dao
        .bulk_create(vec![
            request(&org, "one", &shared),
            request(&org, "two", &shared),
            request(&org, "three", &third),
        ])
        .await
        .unwrap();

    assert_eq!(result.items.len(), 3);
    assert!(matches!(result.error, Some(DbError::BadValidation(_))));
    assert!(result.items[0].error.is_none());
    assert!(result.items[1].error.is_some());
    assert!(result.items[2].error.is_none());
    assert!(result.items.iter().all(|item| item.repository.is_none()));

    // Nothing from a failed batch is stored.
    let (page, total) = dao
        .list(&org, PaginationData::default(), &FilterData::default())
        .await
        .unwrap();
    assert_eq!(total, 0);
    assert!(page.data.is_empty());
    assert!(dao.fetch_repository_by_url(&shared).await.unwrap().is_none());
    assert!(dao.fetch_repository_by_url(&third).await.unwrap().is_none());
}

#[tokio::test]
async fn test_bulk_create_success_returns_payloads() {
    let Some(dao) = setup().await else { return };
    let org = unique_org();

    let result = dao
        .bulk_create(vec![
            request(&org, "one", &unique_url()),
            request(&org, "two", &unique_url()),
        ])
        .await
        .unwrap();

    assert!(result.error.is_none());
    let names: Vec<String> = result
        .items
        .iter()
        .map(|item| item.repository.as_ref().unwrap().name.clone())
        .collect();
    assert_eq!(names, vec!["one", "two"]);

    let empty = dao.bulk_create(Vec::new()).await.unwrap();
    assert!(empty.items.is_empty());
    assert!(empty.error.is_none());
}

#[tokio::test]
async fn test_save_public_repos_is_idempotent() {
    let Some(dao) = setup().await else { return };
    let (first, second, third) = (unique_url(), unique_url(), unique_url());

    dao.save_public_repos(&[first.clone(), second.clone()])
        .await
        .unwrap();
    dao.save_public_repos(&[second.clone(), third.clone(), third.clone()])
        .await
        .unwrap();

    for url in [&first, &second, &third] {
        let repository = dao.fetch_repository_by_url(url).await.unwrap().unwrap();
        assert!(repository.public);
    }
    dao.save_public_repos(&[]).await.unwrap();
}

#[tokio::test]
async fn test_public_repository_is_reused_by_orgs() {
    let Some(dao) = setup().await else { return };
    let (org, url) = (unique_org(), unique_url());

    dao.save_public_repos(std::slice::from_ref(&url)).await.unwrap();
    let seeded = dao.fetch_repository_by_url(&url).await.unwrap().unwrap();

    dao.create(request(&org, "public", &url)).await.unwrap();
    let after = dao.fetch_repository_by_url(&url).await.unwrap().unwrap();
    assert_eq!(seeded.uuid, after.uuid);
    assert!(after.public);
}

#[tokio::test]
async fn test_update_name_only_leaves_other_fields() {
    let Some(dao) = setup().await else { return };
    let (org, url) = (unique_org(), unique_url());

    let created = dao
        .create(constrained(&org, &url, "x86_64", &["8", "9"]))
        .await
        .unwrap();
    let updated = dao
        .update(
            &org,
            created.uuid,
            RepositoryRequest {
                name: Some("renamed".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "renamed");
    let stored = dao.fetch(&org, created.uuid).await.unwrap();
    assert_eq!(stored.name, "renamed");
    assert_eq!(stored.url, url);
    assert_eq!(stored.distribution_arch, "x86_64");
    assert_eq!(stored.distribution_versions, vec!["8", "9"]);
}

#[tokio::test]
async fn test_update_url_repoints_configuration() {
    let Some(dao) = setup().await else { return };
    let (org, old_url, new_url) = (unique_org(), unique_url(), unique_url());

    let created = dao.create(request(&org, "moving", &old_url)).await.unwrap();
    let updated = dao
        .update(
            &org,
            created.uuid,
            RepositoryRequest {
                url: Some(new_url.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.url, new_url);
    assert_eq!(updated.name, "moving");
    assert!(dao.fetch_repository_by_url(&old_url).await.unwrap().is_some());
    assert!(dao.fetch_repository_by_url(&new_url).await.unwrap().is_some());
}

#[tokio::test]
async fn test_update_missing_configuration_is_not_found() {
    let Some(dao) = setup().await else { return };

    let err = dao
        .update(&unique_org(), Uuid::now_v7(), RepositoryRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound(_)));
}

#[tokio::test]
async fn test_update_racing_delete_is_not_found() {
    let Some(dao) = setup().await else { return };
    let org = unique_org();

    for i in 0..20 {
        let created = dao
            .create(request(&org, &format!("race-{i}"), &unique_url()))
            .await
            .unwrap();
        let rename = RepositoryRequest {
            name: Some("renamed".to_string()),
            ..Default::default()
        };

        let (updated, deleted) = tokio::join!(
            dao.update(&org, created.uuid, rename),
            dao.delete(&org, created.uuid)
        );

        deleted.unwrap();
        match updated {
            Ok(repository) => assert_eq!(repository.name, "renamed"),
            Err(err) => assert!(matches!(err, DbError::NotFound(_)), "{err:?}"),
        }
    }
}

#[tokio::test]
async fn test_full_replace_with_defaults_is_bad_validation() {
    let Some(dao) = setup().await else { return };
    let org = unique_org();

    let created = dao.create(request(&org, "full", &unique_url())).await.unwrap();
    let mut replacement = RepositoryRequest {
        name: Some("full".to_string()),
        ..Default::default()
    };
    replacement.fill_defaults();

    let err = dao.update(&org, created.uuid, replacement).await.unwrap_err();
    assert!(matches!(err, DbError::BadValidation(_)));
}
