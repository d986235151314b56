use anyhow::{Context, Result};
use log::{debug, info};
use reqwest::Method;

use crate::http::{BatchResult, HttpClient, HttpRequest, Transport};

pub mod config;

/// Sends one request and prints its status and effective URL.
#[tracing::instrument(skip(client))]
pub async fn send<T: Transport>(client: &HttpClient<T>, method: &str, url: &str) -> Result<()> {
    let mut request = HttpRequest::new(parse_method(method)?, url)?;
    client.send(&mut request).await?;

    let status = request.status().map(|s| s.as_u16()).unwrap_or_default();
    let effective_url = request
        .effective_url()
        .map(|u| u.to_string())
        .unwrap_or_else(|| url.to_string());
    println!("OK {} {}", status, effective_url);
    Ok(())
}

/// Sends one request per URL, each URL being its own correlated object.
#[tracing::instrument(skip(client, urls))]
pub async fn run_batch<T: Transport>(
    client: &HttpClient<T>,
    method: &str,
    urls: &[String],
) -> Result<BatchResult<String>> {
    let method = parse_method(method)?;
    let requests = urls
        .iter()
        .map(|url| HttpRequest::new(method.clone(), url))
        .collect::<Result<Vec<_>>>()?;

    debug!("Checking {} URLs...", requests.len());
    let result = client.send_many(&requests, urls.to_vec()).await;
    info!("{} ok, {} failed", result.ok.len(), result.failed.len());
    Ok(result)
}

/// Runs a batch, prints the result as JSON and fails if any item failed.
pub async fn batch<T: Transport>(
    client: &HttpClient<T>,
    method: &str,
    urls: &[String],
) -> Result<()> {
    let result = run_batch(client, method, urls).await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&result).context("Failed to serialize batch result")?
    );

    if !result.is_all_ok() {
        anyhow::bail!("{} of {} requests failed", result.failed.len(), result.total());
    }
    Ok(())
}

fn parse_method(method: &str) -> Result<Method> {
    Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("Invalid HTTP method '{}'", method))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{BatchFailure, UnexpectedStatusError};
    use mockito::Server;
    use reqwest::Client;

    fn client() -> HttpClient {
        HttpClient::new(Client::new()).with_good_status_codes([200, 204])
    }

    #[test]
    fn test_parse_method() {
        assert_eq!(parse_method("head").unwrap(), Method::HEAD);
        assert_eq!(parse_method("DELETE").unwrap(), Method::DELETE);
        assert!(parse_method("GE T").is_err());
    }

    #[tokio::test]
    async fn test_send_ok() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("HEAD", "/container/object")
            .with_status(204)
            .create_async()
            .await;

        let result = send(&client(), "head", &format!("{}/container/object", server.url())).await;

        mock.assert_async().await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_send_unexpected_status() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/container/object")
            .with_status(403)
            .create_async()
            .await;

        let err = send(&client(), "GET", &format!("{}/container/object", server.url()))
            .await
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<UnexpectedStatusError>()
                .map(|e| e.status_code),
            Some(403)
        );
    }

    #[tokio::test]
    async fn test_send_invalid_url() {
        let err = send(&client(), "GET", "not a url").await.unwrap_err();
        assert!(err.to_string().contains("Invalid request URL"));
    }

    #[tokio::test]
    async fn test_run_batch_correlates_urls() {
        let mut server = Server::new_async().await;
        let _a = server
            .mock("HEAD", "/a")
            .with_status(200)
            .create_async()
            .await;
        let _b = server
            .mock("HEAD", "/b")
            .with_status(404)
            .create_async()
            .await;

        let urls = vec![
            format!("{}/a", server.url()),
            format!("{}/b", server.url()),
        ];
        let result = run_batch(&client(), "HEAD", &urls).await.unwrap();

        assert_eq!(result.ok, vec![urls[0].clone()]);
        assert_eq!(result.failed.len(), 1);
        assert!(matches!(
            &result.failed[0],
            BatchFailure::Http(f) if f.object == urls[1] && f.status_code == 404
        ));
    }

    #[tokio::test]
    async fn test_batch_fails_when_any_item_fails() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/a")
            .with_status(500)
            .create_async()
            .await;

        let urls = vec![format!("{}/a", server.url())];
        let err = batch(&client(), "GET", &urls).await.unwrap_err();

        assert!(err.to_string().contains("1 of 1 requests failed"));
    }

    #[tokio::test]
    async fn test_batch_all_ok() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/a")
            .with_status(200)
            .create_async()
            .await;

        let urls = vec![format!("{}/a", server.url())];
        assert!(batch(&client(), "GET", &urls).await.is_ok());
    }
}
