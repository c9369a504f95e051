//! Bucket lifecycle scenarios: create, upsert, fetch, delete.

#[cfg(test)]
mod tests {
    use silo_core::SiloError;
    use silo_core::error::{BucketPutPhase, RecursiveDeletePhase};
    use silo_model::request::{
        CreateBucketRequest, GetTagsRequest, ListBucketsRequest, PutObjectRequest,
        UpsertBucketRequest,
    };
    use silo_model::{BucketName, TagSet, WireCode};

    use crate::{make_client, test_bucket_name};

    #[tokio::test]
    async fn test_should_walk_full_bucket_lifecycle() {
        let (_backend, client) = make_client();
        let name = test_bucket_name("lifecycle");

        assert!(!client.bucket_exists(name.as_str().into()).await.unwrap());

        let bucket = client
            .create_bucket(name.as_str().into())
            .await
            .unwrap_or_else(|e| panic!("create failed: {e}"));
        assert_eq!(bucket.name().as_str(), name);
        assert!(bucket.info().created_at.is_some());
        assert!(client.bucket_exists(name.as_str().into()).await.unwrap());

        let fetched = client
            .get_bucket(name.as_str().into())
            .await
            .unwrap_or_else(|e| panic!("get failed: {e}"));
        assert_eq!(fetched.info(), bucket.info());

        let existed = client.delete_bucket(name.as_str().into()).await.unwrap();
        assert!(existed);
        assert!(!client.bucket_exists(name.as_str().into()).await.unwrap());
    }

    #[tokio::test]
    async fn test_should_apply_initial_tags_on_create() {
        let (_backend, client) = make_client();
        let tags = TagSet::try_from_pairs([("env", "staging"), ("team", "infra")])
            .unwrap_or_else(|e| panic!("bad tags: {e}"));

        let bucket = client
            .create_bucket(
                CreateBucketRequest::builder()
                    .name("tagged-at-birth")
                    .tags(tags)
                    .build(),
            )
            .await
            .unwrap_or_else(|e| panic!("create failed: {e}"));

        let read_back = bucket.tags(GetTagsRequest::default()).await.unwrap();
        assert_eq!(read_back.get("env"), Some("staging"));
        assert_eq!(read_back.get("team"), Some("infra"));
    }

    #[tokio::test]
    async fn test_should_distinguish_collision_owners() {
        let (backend, client) = make_client();

        client.create_bucket("mine".into()).await.unwrap();
        let err = client.create_bucket("mine".into()).await.unwrap_err();
        assert!(matches!(err, SiloError::BucketAlreadyOwnedByYou { .. }));

        let foreign = BucketName::new("theirs").unwrap();
        backend.seed_foreign_bucket(&foreign);
        let err = client.create_bucket("theirs".into()).await.unwrap_err();
        assert!(matches!(
            err,
            SiloError::BucketAlreadyExists { bucket } if bucket == "theirs"
        ));
    }

    #[tokio::test]
    async fn test_should_upsert_idempotently() {
        let (backend, client) = make_client();

        let first = client.upsert_bucket("cache".into()).await.unwrap();
        let second = client.upsert_bucket("cache".into()).await.unwrap();
        assert_eq!(first.info().created_at, second.info().created_at);
        assert_eq!(backend.call_count("create_bucket"), 2);

        let buckets = client
            .list_buckets(ListBucketsRequest::default())
            .await
            .unwrap();
        assert_eq!(buckets.len(), 1);
    }

    #[tokio::test]
    async fn test_should_skip_tags_on_upsert_collision_by_default() {
        let (backend, client) = make_client();
        client.create_bucket("existing".into()).await.unwrap();
        backend.reset_counts();

        let tags =
            TagSet::try_from_pairs([("late", "yes")]).unwrap_or_else(|e| panic!("bad tags: {e}"));
        client
            .upsert_bucket(
                UpsertBucketRequest::builder()
                    .name("existing")
                    .tags(tags)
                    .build(),
            )
            .await
            .unwrap();
        assert_eq!(backend.call_count("put_bucket_tags"), 0);
    }

    #[tokio::test]
    async fn test_should_refuse_plain_delete_of_loaded_bucket() {
        let (_backend, client) = make_client();
        let bucket = client.create_bucket("loaded".into()).await.unwrap();
        bucket
            .put_object(PutObjectRequest::builder().key("blocker").body("x").build())
            .await
            .unwrap();

        let err = client.delete_bucket("loaded".into()).await.unwrap_err();
        assert!(matches!(err, SiloError::BucketNotEmpty { .. }));

        let existed = client.delete_bucket_recursive("loaded".into()).await.unwrap();
        assert!(existed);
        assert!(!client.bucket_exists("loaded".into()).await.unwrap());
    }

    #[tokio::test]
    async fn test_should_tolerate_recursive_delete_of_missing_bucket() {
        let (_backend, client) = make_client();
        let existed = client
            .delete_bucket_recursive("never-was".into())
            .await
            .unwrap();
        assert!(!existed);
    }

    #[tokio::test]
    async fn test_should_tag_recursive_delete_failures_with_phase() {
        let (backend, client) = make_client();
        let bucket = client.create_bucket("stubborn".into()).await.unwrap();
        bucket
            .put_object(PutObjectRequest::builder().key("x").body("data").build())
            .await
            .unwrap();

        backend.fail_next("delete_bucket", WireCode::AccessDenied);
        let err = client
            .delete_bucket_recursive("stubborn".into())
            .await
            .unwrap_err();
        match err {
            SiloError::RecursiveDeleteFailed { phase, .. } => {
                assert_eq!(phase, RecursiveDeletePhase::DeleteBucket);
            }
            other => panic!("expected RecursiveDeleteFailed, got {other}"),
        }
        // The purge ran before the failing delete.
        assert_eq!(backend.call_count("delete_objects"), 1);
    }

    #[tokio::test]
    async fn test_should_tag_create_tagging_failures_with_phase() {
        let (backend, client) = make_client();
        backend.fail_next("put_bucket_tags", WireCode::AccessDenied);

        let tags =
            TagSet::try_from_pairs([("k", "v")]).unwrap_or_else(|e| panic!("bad tags: {e}"));
        let err = client
            .create_bucket(
                CreateBucketRequest::builder()
                    .name("half-made")
                    .tags(tags)
                    .build(),
            )
            .await
            .unwrap_err();
        match err {
            SiloError::BucketPutFailed { phase, .. } => {
                assert_eq!(phase, BucketPutPhase::PutTags);
            }
            other => panic!("expected BucketPutFailed, got {other}"),
        }
        // The bucket itself was created before tagging failed.
        assert!(client.bucket_exists("half-made".into()).await.unwrap());
    }
}
