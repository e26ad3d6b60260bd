use config::Credentials;
use config::credentials::*;
use mockito::Matcher;
use research_core::{SearchAugmenter, SearchEngine};

#[tokio::test]
async fn test_serpapi_request_and_mapping() {
    let mut server = mockito::Server::new_async().await;
    let url = server.url();
    let mock = server
        .mock("GET", "/search.json")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("engine".into(), "google".into()),
            Matcher::UrlEncoded("q".into(), "rust async".into()),
            Matcher::UrlEncoded("api_key".into(), "serp-key".into()),
            Matcher::UrlEncoded("num".into(), "5".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{"organic_results":[
                {"title":"Async Book","link":"https://rust-lang.github.io/async-book/","snippet":"Futures and tasks"},
                {"title":"No snippet","link":"https://example.org"}
            ]}"#,
        )
        .create_async()
        .await;

    let creds = Credentials::from_pairs([(SERPAPI_API_KEY, "serp-key"), (SERPAPI_BASE_URL, url.as_str())]);
    let augmenter = SearchAugmenter::from_credentials(&creds);
    let results = augmenter.search("rust async").await;

    mock.assert_async().await;
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].title, "Async Book");
    assert_eq!(results[0].source, "SerpAPI");
    assert_eq!(results[1].snippet, "");
}

#[tokio::test]
async fn test_google_pse_fallback_after_serpapi_failure() {
    let mut server = mockito::Server::new_async().await;
    let url = server.url();
    server
        .mock("GET", "/search.json")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("upstream down")
        .create_async()
        .await;
    let pse = server
        .mock("GET", "/customsearch/v1")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("key".into(), "g-key".into()),
            Matcher::UrlEncoded("cx".into(), "engine-id".into()),
            Matcher::UrlEncoded("q".into(), "tides".into()),
            Matcher::UrlEncoded("num".into(), "5".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"items":[{"title":"Tides","link":"https://example.org/tides","snippet":"The moon"}]}"#)
        .create_async()
        .await;

    let creds = Credentials::from_pairs([
        (SERPAPI_API_KEY, "serp-key"),
        (SERPAPI_BASE_URL, url.as_str()),
        (GOOGLE_API_KEY, "g-key"),
        (GOOGLE_PSE_ID, "engine-id"),
        (GOOGLE_PSE_BASE_URL, url.as_str()),
    ]);
    let results = SearchAugmenter::from_credentials(&creds).search("tides").await;

    pse.assert_async().await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].source, "Google PSE");
    assert_eq!(results[0].snippet, "The moon");
}

#[tokio::test]
async fn test_unconfigured_search_is_unavailable() {
    let augmenter = SearchAugmenter::from_credentials(&Credentials::default());
    assert!(!augmenter.is_available());
    assert!(augmenter.search_with("anything", SearchEngine::Auto).await.is_empty());
}
