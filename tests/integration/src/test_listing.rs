//! Listing scenarios: lazy pagination, delimiter grouping, markers.

#[cfg(test)]
mod tests {
    use futures::TryStreamExt;
    use silo_core::Bucket;
    use silo_model::request::{ListDirRequest, ListObjectsRequest, PutObjectRequest};
    use silo_model::{BucketName, ObjectEntry, ObjectKey};

    use crate::make_client;

    async fn seed(bucket: &Bucket, keys: &[&str]) {
        for key in keys {
            bucket
                .put_object(PutObjectRequest::builder().key(*key).body("x").build())
                .await
                .unwrap_or_else(|e| panic!("put {key} failed: {e}"));
        }
    }

    #[tokio::test]
    async fn test_should_stream_across_page_boundaries_in_order() {
        let (backend, client) = make_client();
        let bucket = client.create_bucket("paged".into()).await.unwrap();
        seed(&bucket, &["e", "c", "a", "d", "b"]).await;
        backend.reset_counts();

        let keys: Vec<String> = bucket
            .list(ListObjectsRequest::builder().page_size(2).build())
            .map_ok(|entry| entry.key.to_string())
            .try_collect()
            .await
            .unwrap_or_else(|e| panic!("list failed: {e}"));

        assert_eq!(keys, ["a", "b", "c", "d", "e"]);
        assert_eq!(backend.call_count("list_objects"), 3);
    }

    #[tokio::test]
    async fn test_should_fetch_pages_lazily() {
        let (backend, client) = make_client();
        let bucket = client.create_bucket("lazy".into()).await.unwrap();
        seed(&bucket, &["a", "b", "c", "d"]).await;
        backend.reset_counts();

        let mut stream = bucket.list(ListObjectsRequest::builder().page_size(2).build());
        // Nothing is fetched until the stream is polled.
        assert_eq!(backend.call_count("list_objects"), 0);

        let first = stream
            .try_next()
            .await
            .unwrap_or_else(|e| panic!("list failed: {e}"));
        assert_eq!(first.map(|e| e.key.to_string()).as_deref(), Some("a"));
        assert_eq!(backend.call_count("list_objects"), 1);
    }

    #[tokio::test]
    async fn test_should_group_one_directory_level() {
        let (_backend, client) = make_client();
        let bucket = client.create_bucket("tree".into()).await.unwrap();
        seed(
            &bucket,
            &[
                "photos/2023/jan.jpg",
                "photos/2023/feb.jpg",
                "photos/2024/mar.jpg",
                "photos/index.txt",
                "readme.md",
            ],
        )
        .await;

        let entries: Vec<ObjectEntry> = bucket
            .list_dir(ListDirRequest::builder().prefix("photos/").build())
            .try_collect()
            .await
            .unwrap_or_else(|e| panic!("list failed: {e}"));

        let prefixes: Vec<&str> = entries
            .iter()
            .filter(|e| e.is_prefix)
            .map(|e| e.key.as_str())
            .collect();
        let objects: Vec<&str> = entries
            .iter()
            .filter(|e| !e.is_prefix)
            .map(|e| e.key.as_str())
            .collect();
        assert_eq!(prefixes, ["photos/2023/", "photos/2024/"]);
        assert_eq!(objects, ["photos/index.txt"]);
    }

    #[tokio::test]
    async fn test_should_emit_one_prefix_row_per_directory_across_pages() {
        let (_backend, client) = make_client();
        let bucket = client.create_bucket("straddled".into()).await.unwrap();
        // With two rows per page the boundary falls inside the d/ group.
        seed(&bucket, &["a", "b", "d/1", "d/2", "e"]).await;

        let entries: Vec<ObjectEntry> = bucket
            .list_dir(ListDirRequest::builder().page_size(2).build())
            .try_collect()
            .await
            .unwrap_or_else(|e| panic!("list failed: {e}"));

        let prefixes: Vec<&str> = entries
            .iter()
            .filter(|e| e.is_prefix)
            .map(|e| e.key.as_str())
            .collect();
        let objects: Vec<&str> = entries
            .iter()
            .filter(|e| !e.is_prefix)
            .map(|e| e.key.as_str())
            .collect();
        assert_eq!(prefixes, ["d/"]);
        assert_eq!(objects, ["a", "b", "e"]);

        let dirs = bucket
            .count_dirs(ListDirRequest::builder().page_size(2).build())
            .await
            .unwrap_or_else(|e| panic!("count failed: {e}"));
        assert_eq!(dirs, 1);
    }

    #[tokio::test]
    async fn test_should_list_bucket_root_one_level_deep() {
        let (_backend, client) = make_client();
        let bucket = client.create_bucket("root-level".into()).await.unwrap();
        seed(&bucket, &["top.txt", "dir/nested.txt"]).await;

        let entries: Vec<ObjectEntry> = bucket
            .list_dir(ListDirRequest::default())
            .try_collect()
            .await
            .unwrap_or_else(|e| panic!("list failed: {e}"));

        let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, ["dir/", "top.txt"]);
    }

    #[tokio::test]
    async fn test_should_hide_delete_markers_unless_asked() {
        let (backend, client) = make_client();
        let bucket = client.create_bucket("versioned".into()).await.unwrap();
        seed(&bucket, &["live.txt"]).await;

        let name = BucketName::new("versioned").unwrap();
        let gone = ObjectKey::new("gone.txt").unwrap();
        backend.seed_delete_marker(&name, &gone);

        let plain: Vec<ObjectEntry> = bucket
            .list(ListObjectsRequest::default())
            .try_collect()
            .await
            .unwrap_or_else(|e| panic!("list failed: {e}"));
        assert_eq!(plain.len(), 1);
        assert_eq!(plain[0].key.as_str(), "live.txt");

        let with_markers: Vec<ObjectEntry> = bucket
            .list(
                ListObjectsRequest::builder()
                    .include_delete_markers(true)
                    .build(),
            )
            .try_collect()
            .await
            .unwrap_or_else(|e| panic!("list failed: {e}"));
        assert_eq!(with_markers.len(), 2);
        let marker = with_markers
            .iter()
            .find(|e| e.is_delete_marker)
            .unwrap_or_else(|| panic!("marker row missing"));
        assert_eq!(marker.key.as_str(), "gone.txt");
        assert!(!marker.is_live());
    }

    #[tokio::test]
    async fn test_should_filter_by_prefix() {
        let (_backend, client) = make_client();
        let bucket = client.create_bucket("filtered".into()).await.unwrap();
        seed(&bucket, &["logs/app.log", "logs/db.log", "data/x.bin"]).await;

        let keys: Vec<String> = bucket
            .list(ListObjectsRequest::builder().prefix("logs/").build())
            .map_ok(|e| e.key.to_string())
            .try_collect()
            .await
            .unwrap_or_else(|e| panic!("list failed: {e}"));
        assert_eq!(keys, ["logs/app.log", "logs/db.log"]);
    }
}
