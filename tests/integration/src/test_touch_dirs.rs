//! Touch and directory scenarios.

#[cfg(test)]
mod tests {
    use futures::TryStreamExt;
    use silo_core::SiloError;
    use silo_model::request::{
        DeleteDirRequest, ListObjectsRequest, PutObjectRequest, TouchObjectRequest,
    };

    use crate::make_client;

    #[tokio::test]
    async fn test_should_create_zero_byte_object_on_first_touch() {
        let (_backend, client) = make_client();
        let bucket = client.create_bucket("markers".into()).await.unwrap();

        let meta = bucket
            .touch_object("state/.keep".into())
            .await
            .unwrap_or_else(|e| panic!("touch failed: {e}"));
        assert_eq!(meta.size, 0);
        assert!(bucket.object("state/.keep").unwrap().exists().await.unwrap());
    }

    #[tokio::test]
    async fn test_should_preserve_existing_object_on_touch() {
        let (backend, client) = make_client();
        let bucket = client.create_bucket("careful".into()).await.unwrap();
        let uploaded = bucket
            .put_object(PutObjectRequest::builder().key("data.bin").body("content").build())
            .await
            .unwrap();
        backend.reset_counts();

        let touched = bucket
            .touch_object("data.bin".into())
            .await
            .unwrap_or_else(|e| panic!("touch failed: {e}"));
        assert_eq!(touched.etag, uploaded.etag);
        assert_eq!(touched.size, 7);
        // The existing object short-circuits the write.
        assert_eq!(backend.call_count("put_object"), 0);
    }

    #[tokio::test]
    async fn test_should_replace_object_when_touch_overwrites() {
        let (_backend, client) = make_client();
        let bucket = client.create_bucket("reset".into()).await.unwrap();
        bucket
            .put_object(PutObjectRequest::builder().key("counter").body("999").build())
            .await
            .unwrap();

        let meta = bucket
            .touch_object(
                TouchObjectRequest::builder()
                    .key("counter")
                    .overwrite(true)
                    .build(),
            )
            .await
            .unwrap_or_else(|e| panic!("touch failed: {e}"));
        assert_eq!(meta.size, 0);

        let download = bucket
            .get_object("counter".into())
            .await
            .unwrap()
            .unwrap_or_else(|| panic!("object missing"));
        assert!(download.body.is_empty());
    }

    #[tokio::test]
    async fn test_should_delete_empty_dir_marker() {
        let (_backend, client) = make_client();
        let bucket = client.create_bucket("tidy".into()).await.unwrap();
        bucket.touch_object("drafts/".into()).await.unwrap();

        let existed = bucket
            .delete_dir("drafts/".into())
            .await
            .unwrap_or_else(|e| panic!("delete dir failed: {e}"));
        assert!(existed);
        assert!(!bucket.object("drafts/").unwrap().exists().await.unwrap());
    }

    #[tokio::test]
    async fn test_should_refuse_non_recursive_delete_of_populated_dir() {
        let (_backend, client) = make_client();
        let bucket = client.create_bucket("guarded".into()).await.unwrap();
        bucket
            .put_object(PutObjectRequest::builder().key("docs/a.txt").body("x").build())
            .await
            .unwrap();

        let err = bucket.delete_dir("docs/".into()).await.unwrap_err();
        assert!(
            matches!(err, SiloError::DirectoryNotEmpty { .. }),
            "got {err}"
        );
        // Nothing was removed.
        assert!(bucket.object("docs/a.txt").unwrap().exists().await.unwrap());
    }

    #[tokio::test]
    async fn test_should_delete_dir_recursively_keeping_siblings() {
        let (_backend, client) = make_client();
        let bucket = client.create_bucket("pruned".into()).await.unwrap();
        for key in ["old/a", "old/deep/b", "new/c"] {
            bucket
                .put_object(PutObjectRequest::builder().key(key).body("x").build())
                .await
                .unwrap();
        }

        let existed = bucket
            .delete_dir(DeleteDirRequest::builder().path("old").recursive(true).build())
            .await
            .unwrap_or_else(|e| panic!("delete dir failed: {e}"));
        assert!(existed);

        let keys: Vec<String> = bucket
            .list(ListObjectsRequest::default())
            .map_ok(|e| e.key.to_string())
            .try_collect()
            .await
            .unwrap();
        assert_eq!(keys, ["new/c"]);
    }

    #[tokio::test]
    async fn test_should_report_missing_dir_as_not_existed() {
        let (_backend, client) = make_client();
        let bucket = client.create_bucket("bare".into()).await.unwrap();

        let existed = bucket
            .delete_dir("phantom/".into())
            .await
            .unwrap_or_else(|e| panic!("delete dir failed: {e}"));
        assert!(!existed);

        let existed = bucket
            .delete_dir(
                DeleteDirRequest::builder()
                    .path("phantom/")
                    .recursive(true)
                    .build(),
            )
            .await
            .unwrap_or_else(|e| panic!("delete dir failed: {e}"));
        assert!(!existed);
    }
}
