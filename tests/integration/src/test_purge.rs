//! Bulk delete scenarios: prefix purges and explicit-key deletes.

#[cfg(test)]
mod tests {
    use futures::TryStreamExt;
    use silo_core::{Bucket, SiloError};
    use silo_model::request::{
        DeleteObjectsRequest, ListObjectsRequest, PurgePrefixRequest, PutObjectRequest,
    };
    use silo_model::WireCode;

    use crate::make_client;

    async fn seed(bucket: &Bucket, keys: &[&str]) {
        for key in keys {
            bucket
                .put_object(PutObjectRequest::builder().key(*key).body("x").build())
                .await
                .unwrap_or_else(|e| panic!("put {key} failed: {e}"));
        }
    }

    async fn remaining_keys(bucket: &Bucket) -> Vec<String> {
        bucket
            .list(ListObjectsRequest::default())
            .map_ok(|e| e.key.to_string())
            .try_collect()
            .await
            .unwrap_or_else(|e| panic!("list failed: {e}"))
    }

    #[tokio::test]
    async fn test_should_purge_whole_bucket_with_empty_prefix() {
        let (_backend, client) = make_client();
        let bucket = client.create_bucket("scratch".into()).await.unwrap();
        seed(&bucket, &["a", "b", "c"]).await;

        let purged = bucket
            .purge_prefix(PurgePrefixRequest::builder().build())
            .await
            .unwrap_or_else(|e| panic!("purge failed: {e}"));
        assert_eq!(purged, 3);
        assert!(remaining_keys(&bucket).await.is_empty());
    }

    #[tokio::test]
    async fn test_should_purge_in_bounded_batches() {
        let (backend, client) = make_client();
        let bucket = client.create_bucket("batched".into()).await.unwrap();
        seed(&bucket, &["t/1", "t/2", "t/3", "t/4", "t/5", "keep"]).await;
        backend.reset_counts();

        let purged = bucket
            .purge_prefix(
                PurgePrefixRequest::builder()
                    .prefix("t/")
                    .page_size(2)
                    .build(),
            )
            .await
            .unwrap_or_else(|e| panic!("purge failed: {e}"));

        assert_eq!(purged, 5);
        assert_eq!(backend.call_count("delete_objects"), 3);
        assert_eq!(remaining_keys(&bucket).await, ["keep"]);
    }

    #[tokio::test]
    async fn test_should_aggregate_stuck_keys_into_one_failure() {
        let (backend, client) = make_client();
        let bucket = client.create_bucket("sticky".into()).await.unwrap();
        seed(&bucket, &["ok-1", "stuck", "ok-2"]).await;
        backend.fail_key("stuck", WireCode::AccessDenied);

        let err = bucket
            .purge_prefix(PurgePrefixRequest::builder().build())
            .await
            .unwrap_err();
        match err {
            SiloError::MultiObjectDeleteFailed { bucket, failures } => {
                assert_eq!(bucket, "sticky");
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].key.as_str(), "stuck");
                assert_eq!(failures[0].code, WireCode::AccessDenied);
            }
            other => panic!("expected MultiObjectDeleteFailed, got {other}"),
        }
        // The deletable keys went through despite the failure.
        assert_eq!(remaining_keys(&bucket).await, ["stuck"]);
    }

    #[tokio::test]
    async fn test_should_count_already_missing_keys_as_deleted() {
        let (_backend, client) = make_client();
        let bucket = client.create_bucket("racing".into()).await.unwrap();
        seed(&bucket, &["here"]).await;

        let deleted = bucket
            .delete_objects(
                DeleteObjectsRequest::builder()
                    .keys(vec!["here".to_owned(), "vanished".to_owned()])
                    .build(),
            )
            .await
            .unwrap_or_else(|e| panic!("bulk delete failed: {e}"));
        assert_eq!(deleted, 2);
    }

    #[tokio::test]
    async fn test_should_surface_listing_failure_during_purge() {
        let (backend, client) = make_client();
        let bucket = client.create_bucket("opaque".into()).await.unwrap();
        seed(&bucket, &["a"]).await;
        backend.fail_next("list_objects", WireCode::AccessDenied);

        let err = bucket
            .purge_prefix(PurgePrefixRequest::builder().build())
            .await
            .unwrap_err();
        assert!(matches!(err, SiloError::Generic { .. }), "got {err}");
        // Nothing was deleted off a failed listing.
        assert_eq!(remaining_keys(&bucket).await, ["a"]);
    }

    #[tokio::test]
    async fn test_should_leave_markers_alone_while_purging() {
        let (backend, client) = make_client();
        let bucket = client.create_bucket("marked".into()).await.unwrap();
        seed(&bucket, &["real"]).await;
        let name = silo_model::BucketName::new("marked").unwrap();
        let ghost = silo_model::ObjectKey::new("ghost").unwrap();
        backend.seed_delete_marker(&name, &ghost);

        let purged = bucket
            .purge_prefix(PurgePrefixRequest::builder().build())
            .await
            .unwrap_or_else(|e| panic!("purge failed: {e}"));
        assert_eq!(purged, 1);

        // The marker row survives; only live objects are purge targets.
        let with_markers: Vec<String> = bucket
            .list(
                ListObjectsRequest::builder()
                    .include_delete_markers(true)
                    .build(),
            )
            .map_ok(|e| e.key.to_string())
            .try_collect()
            .await
            .unwrap_or_else(|e| panic!("list failed: {e}"));
        assert_eq!(with_markers, ["ghost"]);
    }
}
