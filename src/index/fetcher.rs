use crate::config::AppConfig;
use crate::index::traits::PriceIndex;
use crate::model::{BasketItem, Domain, IndexError, ShopQuote};
use crate::normalizer::normalize_all;
use crate::parser::{JsonQuoteParser, Parser};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

pub struct HttpPriceIndex {
    client: Client,
    base_url: String,
    para_path: String,
    retail_path: String,
    parser: JsonQuoteParser,
}

impl HttpPriceIndex {
    pub fn new(config: &AppConfig) -> Result<Self, IndexError> {
        let client = Client::builder()
            .user_agent("BagComparator/0.1")
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| IndexError::HttpError(e.to_string()))?;

        Ok(Self::with_client(client, config))
    }

    fn with_client(client: Client, config: &AppConfig) -> Self {
        Self {
            client,
            base_url: config.api_base_url.clone(),
            para_path: config.domain_path(Domain::Para).to_string(),
            retail_path: config.domain_path(Domain::Retail).to_string(),
            parser: JsonQuoteParser::new(),
        }
    }

    fn build_url(&self, item: &BasketItem) -> String {
        let path = match item.domain {
            Domain::Para => &self.para_path,
            Domain::Retail => &self.retail_path,
        };
        format!(
            "{}/{}/{}",
            self.base_url,
            path.trim_matches('/'),
            urlencoding::encode(&item.sku)
        )
    }
}

#[async_trait::async_trait]
impl PriceIndex for HttpPriceIndex {
    async fn fetch_quotes(&self, item: &BasketItem) -> Result<Vec<ShopQuote>, IndexError> {
        let url = self.build_url(item);
        debug!("Fetching quotes: {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                IndexError::Timeout
            } else {
                IndexError::HttpError(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(IndexError::InvalidResponse(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                IndexError::Timeout
            } else {
                IndexError::HttpError(e.to_string())
            }
        })?;

        let quotes = self.parser.parse(&body)?;
        Ok(normalize_all(quotes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn config() -> AppConfig {
        serde_json::from_str(r#"{ "api_base_url": "https://api.example.com/api/v1" }"#).unwrap()
    }

    /// Index client pointed at `addr` with a one second request timeout.
    fn local_index(addr: SocketAddr) -> HttpPriceIndex {
        let config: AppConfig = serde_json::from_str(&format!(
            r#"{{ "api_base_url": "http://{}/api/v1" }}"#,
            addr
        ))
        .unwrap();
        let client = Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(1))
            .build()
            .unwrap();
        HttpPriceIndex::with_client(client, &config)
    }

    /// Answers a single request with `status` and `body`, after `delay`.
    async fn serve_once(status: &'static str, body: &'static str, delay: Duration) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            tokio::time::sleep(delay).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });
        addr
    }

    fn item() -> BasketItem {
        BasketItem::new("SKU-1", Domain::Retail)
    }

    #[test]
    fn builds_domain_specific_urls() {
        let index = HttpPriceIndex::new(&config()).unwrap();
        assert_eq!(
            index.build_url(&BasketItem::new("SKU-1", Domain::Para)),
            "https://api.example.com/api/v1/para/products/SKU-1"
        );
        assert_eq!(
            index.build_url(&BasketItem::new("a b/c", Domain::Retail)),
            "https://api.example.com/api/v1/products/a%20b%2Fc"
        );
    }

    #[tokio::test]
    async fn success_returns_normalized_quotes() {
        let body = r#"{ "shopPrices": [ { "shop": " MyTek ", "price": 12.5, "available": true } ] }"#;
        let addr = serve_once("200 OK", body, Duration::ZERO).await;

        let quotes = local_index(addr).fetch_quotes(&item()).await.unwrap();
        assert_eq!(quotes, vec![ShopQuote::new("mytek", rust_decimal::Decimal::new(125, 1), true)]);
    }

    #[tokio::test]
    async fn not_found_means_no_quotes() {
        let addr = serve_once("404 Not Found", "{}", Duration::ZERO).await;

        let quotes = local_index(addr).fetch_quotes(&item()).await.unwrap();
        assert!(quotes.is_empty());
    }

    #[tokio::test]
    async fn server_error_is_invalid_response() {
        let addr = serve_once("500 Internal Server Error", "oops", Duration::ZERO).await;

        let err = local_index(addr).fetch_quotes(&item()).await.unwrap_err();
        assert!(matches!(err, IndexError::InvalidResponse(500)));
    }

    #[tokio::test]
    async fn malformed_body_is_reported() {
        let addr = serve_once("200 OK", "<html>maintenance</html>", Duration::ZERO).await;

        let err = local_index(addr).fetch_quotes(&item()).await.unwrap_err();
        assert!(matches!(err, IndexError::Malformed(_)));
    }

    #[tokio::test]
    async fn slow_index_times_out() {
        let addr = serve_once("200 OK", "[]", Duration::from_secs(3)).await;

        let err = local_index(addr).fetch_quotes(&item()).await.unwrap_err();
        assert!(matches!(err, IndexError::Timeout));
    }
}
