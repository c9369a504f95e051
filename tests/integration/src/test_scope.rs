//! Scope cascade scenarios: regions, headers, and query parameters
//! flowing from client, bucket, and call layers into backend calls.

#[cfg(test)]
mod tests {
    use silo_model::request::{
        CreateBucketRequest, GetTagsRequest, PutObjectRequest, StatObjectRequest,
    };
    use silo_model::{ParamMap, ScopeConfig};

    use crate::{make_client, make_regional_client};

    #[tokio::test]
    async fn test_should_flow_client_region_into_every_call() {
        let (backend, client) = make_regional_client("us-east-2");

        client.create_bucket("regional".into()).await.unwrap();
        client.bucket_exists("regional".into()).await.unwrap();

        for op in ["create_bucket", "bucket_exists"] {
            let scope = backend
                .last_scope(op)
                .unwrap_or_else(|| panic!("no scope recorded for {op}"));
            assert_eq!(scope.region.as_deref(), Some("us-east-2"), "op {op}");
        }
    }

    #[tokio::test]
    async fn test_should_pin_bucket_handle_to_its_creation_region() {
        let (backend, client) = make_regional_client("us-east-2");

        let bucket = client
            .create_bucket(
                CreateBucketRequest::builder()
                    .name("pinned")
                    .scope(ScopeConfig::builder().region("eu-west-3").build())
                    .build(),
            )
            .await
            .unwrap();
        assert_eq!(bucket.info().region.as_deref(), Some("eu-west-3"));

        // Object calls through the handle carry the bucket's region, not
        // the client default.
        bucket
            .put_object(PutObjectRequest::builder().key("x").body("data").build())
            .await
            .unwrap();
        let scope = backend
            .last_scope("put_object")
            .unwrap_or_else(|| panic!("no scope recorded"));
        assert_eq!(scope.region.as_deref(), Some("eu-west-3"));
    }

    #[tokio::test]
    async fn test_should_let_call_region_override_bucket_and_client() {
        let (backend, client) = make_regional_client("us-east-2");
        let bucket = client
            .create_bucket(
                CreateBucketRequest::builder()
                    .name("pinned")
                    .scope(ScopeConfig::builder().region("eu-west-3").build())
                    .build(),
            )
            .await
            .unwrap();

        bucket
            .stat_object(
                StatObjectRequest::builder()
                    .key("x")
                    .scope(ScopeConfig::builder().region("ap-northeast-1").build())
                    .build(),
            )
            .await
            .unwrap();
        let scope = backend
            .last_scope("stat_object")
            .unwrap_or_else(|| panic!("no scope recorded"));
        assert_eq!(scope.region.as_deref(), Some("ap-northeast-1"));
    }

    #[tokio::test]
    async fn test_should_union_headers_across_layers() {
        let (backend, client) = make_client();
        let bucket = client
            .create_bucket("layered".into())
            .await
            .unwrap()
            .with_scope(
                ScopeConfig::builder()
                    .headers(ParamMap::from([("x-resource", "bucket")]))
                    .build(),
            );

        bucket
            .tags(
                GetTagsRequest::builder()
                    .scope(
                        ScopeConfig::builder()
                            .headers(ParamMap::from([("x-call", "here")]))
                            .build(),
                    )
                    .build(),
            )
            .await
            .unwrap();

        let scope = backend
            .last_scope("get_bucket_tags")
            .unwrap_or_else(|| panic!("no scope recorded"));
        assert_eq!(scope.headers.first("x-resource"), Some("bucket"));
        assert_eq!(scope.headers.first("x-call"), Some("here"));
    }

    #[tokio::test]
    async fn test_should_replace_contested_header_keys_wholesale() {
        let (backend, client) = make_client();
        let bucket = client
            .create_bucket("contested".into())
            .await
            .unwrap()
            .with_scope(
                ScopeConfig::builder()
                    .headers(ParamMap::from([("x-shared", "res-1"), ("x-shared", "res-2")]))
                    .build(),
            );

        bucket
            .tags(
                GetTagsRequest::builder()
                    .scope(
                        ScopeConfig::builder()
                            .headers(ParamMap::from([("x-shared", "call")]))
                            .build(),
                    )
                    .build(),
            )
            .await
            .unwrap();

        let scope = backend
            .last_scope("get_bucket_tags")
            .unwrap_or_else(|| panic!("no scope recorded"));
        assert_eq!(
            scope.headers.get("x-shared"),
            Some(["call".to_owned()].as_slice())
        );
    }

    #[tokio::test]
    async fn test_should_carry_query_parameters_into_calls() {
        let (backend, client) = make_client();
        let bucket = client.create_bucket("queried".into()).await.unwrap();

        bucket
            .stat_object(
                StatObjectRequest::builder()
                    .key("x")
                    .scope(
                        ScopeConfig::builder()
                            .query(ParamMap::from([("versionId", "v17")]))
                            .build(),
                    )
                    .build(),
            )
            .await
            .unwrap();

        let scope = backend
            .last_scope("stat_object")
            .unwrap_or_else(|| panic!("no scope recorded"));
        assert_eq!(scope.query.first("versionId"), Some("v17"));
        assert!(scope.headers.is_empty());
    }

    #[tokio::test]
    async fn test_should_resolve_scope_before_first_backend_call() {
        let (backend, client) = make_regional_client("us-east-2");
        let bucket = client.create_bucket("staged".into()).await.unwrap();
        backend.reset_counts();

        // A multi-call flow resolves once; both calls see the same scope.
        bucket
            .delete_tags(silo_model::request::DeleteTagsRequest::from_iter(["k"]))
            .await
            .unwrap();
        let fetch_scope = backend
            .last_scope("get_bucket_tags")
            .unwrap_or_else(|| panic!("no scope recorded"));
        assert_eq!(fetch_scope.region.as_deref(), Some("us-east-2"));
    }
}
