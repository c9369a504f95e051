//! Tag reconciliation scenarios against buckets and objects.

#[cfg(test)]
mod tests {
    use silo_core::SiloError;
    use silo_core::error::TagDeletePhase;
    use silo_model::request::{DeleteTagsRequest, GetTagsRequest, PutTagsRequest};
    use silo_model::{TagSet, WireCode};

    use crate::make_client;

    fn make_tags(pairs: &[(&str, &str)]) -> TagSet {
        TagSet::try_from_pairs(pairs.iter().copied())
            .unwrap_or_else(|e| panic!("bad tags: {e}"))
    }

    #[tokio::test]
    async fn test_should_remove_only_targeted_bucket_tags() {
        let (_backend, client) = make_client();
        let bucket = client.create_bucket("inventory".into()).await.unwrap();
        bucket
            .put_tags(PutTagsRequest::from(make_tags(&[
                ("env", "prod"),
                ("team", "data"),
                ("tier", "gold"),
            ])))
            .await
            .unwrap();

        let removed = bucket
            .delete_tags(DeleteTagsRequest::from_iter(["env", "tier", "absent"]))
            .await
            .unwrap_or_else(|e| panic!("delete tags failed: {e}"));

        assert_eq!(removed.len(), 2);
        assert_eq!(removed.get("env"), Some("prod"));
        assert_eq!(removed.get("tier"), Some("gold"));

        let remaining = bucket.tags(GetTagsRequest::default()).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining.get("team"), Some("data"));
    }

    #[tokio::test]
    async fn test_should_skip_mutations_when_nothing_overlaps() {
        let (backend, client) = make_client();
        let bucket = client.create_bucket("untouched".into()).await.unwrap();
        bucket
            .put_tags(PutTagsRequest::from(make_tags(&[("keep", "me")])))
            .await
            .unwrap();
        backend.reset_counts();

        let removed = bucket
            .delete_tags(DeleteTagsRequest::from_iter(["other"]))
            .await
            .unwrap();
        assert!(removed.is_empty());
        // Read-only reconcile: a fetch happened, no clear or restore.
        assert_eq!(backend.call_count("get_bucket_tags"), 1);
        assert_eq!(backend.call_count("delete_bucket_tags"), 0);
        assert_eq!(backend.call_count("put_bucket_tags"), 0);
    }

    #[tokio::test]
    async fn test_should_skip_restore_when_all_tags_are_targeted() {
        let (backend, client) = make_client();
        let bucket = client.create_bucket("swept".into()).await.unwrap();
        bucket
            .put_tags(PutTagsRequest::from(make_tags(&[("a", "1"), ("b", "2")])))
            .await
            .unwrap();
        backend.reset_counts();

        let removed = bucket
            .delete_tags(DeleteTagsRequest::from_iter(["a", "b"]))
            .await
            .unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(backend.call_count("delete_bucket_tags"), 1);
        assert_eq!(backend.call_count("put_bucket_tags"), 0);

        let remaining = bucket.tags(GetTagsRequest::default()).await.unwrap();
        assert!(remaining.is_empty());
    }

    #[tokio::test]
    async fn test_should_report_clear_failure_with_tags_intact() {
        let (backend, client) = make_client();
        let bucket = client.create_bucket("guarded".into()).await.unwrap();
        bucket
            .put_tags(PutTagsRequest::from(make_tags(&[("a", "1"), ("b", "2")])))
            .await
            .unwrap();

        backend.fail_next("delete_bucket_tags", WireCode::AccessDenied);
        let err = bucket
            .delete_tags(DeleteTagsRequest::from_iter(["a"]))
            .await
            .unwrap_err();
        match err {
            SiloError::TagDeleteFailed { phase, .. } => {
                assert_eq!(phase, TagDeletePhase::Clear);
            }
            other => panic!("expected TagDeleteFailed, got {other}"),
        }

        // The clear never happened, so nothing was lost.
        let tags = bucket.tags(GetTagsRequest::default()).await.unwrap();
        assert_eq!(tags.len(), 2);
    }

    #[tokio::test]
    async fn test_should_report_restore_failure_after_clear() {
        let (backend, client) = make_client();
        let bucket = client.create_bucket("exposed".into()).await.unwrap();
        bucket
            .put_tags(PutTagsRequest::from(make_tags(&[("a", "1"), ("b", "2")])))
            .await
            .unwrap();

        backend.fail_next("put_bucket_tags", WireCode::AccessDenied);
        let err = bucket
            .delete_tags(DeleteTagsRequest::from_iter(["a"]))
            .await
            .unwrap_err();
        match err {
            SiloError::TagDeleteFailed { phase, .. } => {
                assert_eq!(phase, TagDeletePhase::Restore);
            }
            other => panic!("expected TagDeleteFailed, got {other}"),
        }

        // Cleared but never restored: the survivors are gone too.
        let tags = bucket.tags(GetTagsRequest::default()).await.unwrap();
        assert!(tags.is_empty());
    }

    #[tokio::test]
    async fn test_should_reconcile_object_tags_end_to_end() {
        let (_backend, client) = make_client();
        let bucket = client.create_bucket("objects".into()).await.unwrap();
        let object = bucket.object("asset.bin").unwrap();
        object.upload("payload").await.unwrap();
        object
            .put_tags(make_tags(&[("stage", "raw"), ("owner", "etl")]))
            .await
            .unwrap();

        let removed = object.delete_tags(["stage"]).await.unwrap();
        assert_eq!(removed.get("stage"), Some("raw"));

        let remaining = object.tags().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining.get("owner"), Some("etl"));
    }

    #[tokio::test]
    async fn test_should_return_prior_set_from_delete_all() {
        let (_backend, client) = make_client();
        let bucket = client.create_bucket("cleared".into()).await.unwrap();
        bucket
            .put_tags(PutTagsRequest::from(make_tags(&[("x", "1")])))
            .await
            .unwrap();

        let prior = bucket
            .delete_all_tags(silo_model::request::DeleteAllTagsRequest::default())
            .await
            .unwrap();
        assert_eq!(prior.get("x"), Some("1"));
        assert!(bucket.tags(GetTagsRequest::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_should_treat_empty_put_as_no_op_everywhere() {
        let (backend, client) = make_client();
        let bucket = client.create_bucket("quiet".into()).await.unwrap();
        let object = bucket.object("thing").unwrap();
        object.upload("x").await.unwrap();
        backend.reset_counts();

        bucket.put_tags(PutTagsRequest::from(TagSet::new())).await.unwrap();
        object.put_tags(TagSet::new()).await.unwrap();

        assert_eq!(backend.call_count("put_bucket_tags"), 0);
        assert_eq!(backend.call_count("put_object_tags"), 0);
    }
}
