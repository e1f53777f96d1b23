use crate::provider::error::ProviderError;
use crate::provider::response::{PastWeatherResponse, RawDay};
use crate::provider::WeatherProvider;
use chrono::NaiveDate;
use log::{info, warn};
use reqwest::{Client, StatusCode};
use std::time::Duration;

pub const PAST_WEATHER_URL: &str = "https://api.worldweatheronline.com/premium/v1/past-weather.ashx";

/// Oldest date the past-weather endpoint serves.
pub fn earliest_available_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2008, 7, 1).unwrap_or(NaiveDate::MIN)
}

/// Client for the WorldWeatherOnline premium past-weather API.
#[derive(Clone)]
pub struct WorldWeatherOnline {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl std::fmt::Debug for WorldWeatherOnline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldWeatherOnline")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl WorldWeatherOnline {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ProviderError::ClientBuild)?;
        Ok(Self {
            client,
            base_url: PAST_WEATHER_URL.to_string(),
            api_key: api_key.into(),
            timeout,
        })
    }

    /// Points the client at a different endpoint, e.g. a local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl WeatherProvider for WorldWeatherOnline {
    fn name(&self) -> &str {
        "worldweatheronline"
    }

    async fn fetch_history(
        &self,
        location: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawDay>, ProviderError> {
        let start = start.format("%Y-%m-%d").to_string();
        let end = end.format("%Y-%m-%d").to_string();
        // Never include the key: this string ends up in logs and errors.
        let request = format!("{} {}..{}", self.base_url, start, end);
        info!("Requesting {} for '{}'", request, location);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", location),
                ("date", start.as_str()),
                ("enddate", end.as_str()),
                ("tp", "24"),
                ("format", "json"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(self.timeout)
                } else {
                    ProviderError::Network(request.clone(), e.without_url())
                }
            })?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited {
                request,
                message: "HTTP 429 Too Many Requests".to_string(),
            });
        }

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", request, e.status());
                let e = e.without_url();
                return Err(if let Some(status) = e.status() {
                    ProviderError::HttpStatus {
                        request,
                        status,
                        source: e,
                    }
                } else {
                    ProviderError::Network(request, e)
                });
            }
        };

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(request.clone(), e.without_url()))?;
        parse_past_weather(&request, &body)
    }
}

/// Extracts the daily entries from a response body, mapping in-band error messages
/// to [`ProviderError::RateLimited`] or [`ProviderError::Api`].
pub fn parse_past_weather(request: &str, body: &str) -> Result<Vec<RawDay>, ProviderError> {
    let parsed: PastWeatherResponse = serde_json::from_str(body)?;
    let data = parsed
        .data
        .ok_or_else(|| ProviderError::InvalidResponse("missing 'data' object".to_string()))?;

    if let Some(errors) = data.error.filter(|errors| !errors.is_empty()) {
        let message = errors
            .into_iter()
            .map(|e| e.msg)
            .collect::<Vec<_>>()
            .join("; ");
        let lowered = message.to_lowercase();
        return Err(if lowered.contains("limit") || lowered.contains("too many") {
            ProviderError::RateLimited {
                request: request.to_string(),
                message,
            }
        } else {
            ProviderError::Api {
                request: request.to_string(),
                message,
            }
        });
    }

    data.weather
        .ok_or_else(|| ProviderError::InvalidResponse("missing 'data.weather' array".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUEST: &str = "test 2024-03-01..2024-03-31";

    #[test]
    fn test_parse_days() -> Result<(), ProviderError> {
        let body = r#"{"data": {"request": [{"type": "City", "query": "Digby"}],
            "weather": [
                {"date": "2024-03-01", "maxtempC": "5", "mintempC": "-2", "hourly": []},
                {"date": "2024-03-02", "maxtempC": "6", "mintempC": "0", "hourly": []}
            ]}}"#;
        let days = parse_past_weather(REQUEST, body)?;
        assert_eq!(days.len(), 2);
        assert_eq!(days[1].date, "2024-03-02");
        Ok(())
    }

    #[test]
    fn test_parse_rate_limit_message() {
        let body = r#"{"data": {"error": [{"msg": "API key has reached calls per day allowed limit."}]}}"#;
        let err = parse_past_weather(REQUEST, body).unwrap_err();
        assert!(err.is_rate_limited(), "got {err:?}");
    }

    #[test]
    fn test_parse_other_api_error() {
        let body = r#"{"data": {"error": [{"msg": "Unable to find any matching weather location."}]}}"#;
        match parse_past_weather(REQUEST, body) {
            Err(ProviderError::Api { message, .. }) => {
                assert!(message.contains("matching weather location"))
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_malformed_bodies() {
        assert!(matches!(
            parse_past_weather(REQUEST, r#"{"results": []}"#),
            Err(ProviderError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_past_weather(REQUEST, r#"{"data": {}}"#),
            Err(ProviderError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_past_weather(REQUEST, "<html>502</html>"),
            Err(ProviderError::Decode(_))
        ));
    }

    mod http {
        use super::*;
        use std::error::Error as _;
        use wiremock::matchers::{method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        const KEY: &str = "secret-key-123";

        fn d(y: i32, m: u32, day: u32) -> NaiveDate {
            NaiveDate::from_ymd_opt(y, m, day).unwrap()
        }

        fn client(server: &MockServer, timeout: Duration) -> WorldWeatherOnline {
            WorldWeatherOnline::new(KEY, timeout)
                .unwrap()
                .with_base_url(format!("{}/past-weather.ashx", server.uri()))
        }

        async fn respond_with(server: &MockServer, response: ResponseTemplate) {
            Mock::given(method("GET"))
                .and(path("/past-weather.ashx"))
                .respond_with(response)
                .mount(server)
                .await;
        }

        async fn fetch_march(client: &WorldWeatherOnline) -> Result<Vec<RawDay>, ProviderError> {
            client
                .fetch_history("Digby,Nova Scotia,Canada", d(2024, 3, 1), d(2024, 3, 31))
                .await
        }

        fn assert_key_hidden(err: &ProviderError) {
            let mut text = format!("{err} {err:?}");
            let mut source = std::error::Error::source(err);
            while let Some(cause) = source {
                text.push_str(&format!(" {cause} {cause:?}"));
                source = cause.source();
            }
            assert!(!text.contains(KEY), "API key leaked: {text}");
        }

        #[tokio::test]
        async fn test_sends_window_query_and_parses_days() -> Result<(), ProviderError> {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/past-weather.ashx"))
                .and(query_param("q", "Digby,Nova Scotia,Canada"))
                .and(query_param("date", "2024-03-01"))
                .and(query_param("enddate", "2024-03-31"))
                .and(query_param("tp", "24"))
                .and(query_param("format", "json"))
                .and(query_param("key", KEY))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "data": {"weather": [
                        {"date": "2024-03-01", "maxtempC": "5", "mintempC": "-2", "uvIndex": "1",
                         "hourly": [{"windspeedKmph": "14", "winddir16Point": "NW", "WindGustKmph": "22"}]}
                    ]}
                })))
                .expect(1)
                .mount(&server)
                .await;

            let days = fetch_march(&client(&server, Duration::from_secs(5))).await?;

            assert_eq!(days.len(), 1);
            assert_eq!(days[0].max_temp_c.as_deref(), Some("5"));
            assert_eq!(days[0].hourly[0].wind_direction.as_deref(), Some("NW"));
            Ok(())
        }

        #[tokio::test]
        async fn test_http_429_is_rate_limited() {
            let server = MockServer::start().await;
            respond_with(&server, ResponseTemplate::new(429).set_body_string("slow down")).await;

            let err = fetch_march(&client(&server, Duration::from_secs(5)))
                .await
                .unwrap_err();

            assert!(err.is_rate_limited(), "got {err:?}");
            assert_key_hidden(&err);
        }

        #[tokio::test]
        async fn test_server_error_is_http_status() {
            let server = MockServer::start().await;
            respond_with(&server, ResponseTemplate::new(503).set_body_string("down")).await;

            let err = fetch_march(&client(&server, Duration::from_secs(5)))
                .await
                .unwrap_err();

            match &err {
                ProviderError::HttpStatus { status, request, .. } => {
                    assert_eq!(*status, StatusCode::SERVICE_UNAVAILABLE);
                    assert!(request.contains("2024-03-01..2024-03-31"));
                }
                other => panic!("expected HttpStatus, got {other:?}"),
            }
            assert_key_hidden(&err);
        }

        #[tokio::test]
        async fn test_slow_response_times_out() {
            let server = MockServer::start().await;
            respond_with(
                &server,
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"data": {"weather": []}}))
                    .set_delay(Duration::from_secs(3)),
            )
            .await;

            let timeout = Duration::from_millis(100);
            let err = fetch_march(&client(&server, timeout)).await.unwrap_err();

            assert!(
                matches!(err, ProviderError::Timeout(t) if t == timeout),
                "got {err:?}"
            );
            assert_key_hidden(&err);
        }

        #[tokio::test]
        async fn test_in_band_error_keeps_key_out_of_message() {
            let server = MockServer::start().await;
            respond_with(
                &server,
                ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "data": {"error": [{"msg": "Unable to find any matching weather location."}]}
                })),
            )
            .await;

            let err = fetch_march(&client(&server, Duration::from_secs(5)))
                .await
                .unwrap_err();

            assert!(matches!(err, ProviderError::Api { .. }), "got {err:?}");
            assert_key_hidden(&err);
        }

        #[test]
        fn test_debug_redacts_key() {
            let client = WorldWeatherOnline::new(KEY, Duration::from_secs(1)).unwrap();
            assert!(!format!("{client:?}").contains(KEY));
        }
    }

    #[test]
    fn test_earliest_available_date() {
        assert_eq!(
            earliest_available_date(),
            NaiveDate::from_ymd_opt(2008, 7, 1).unwrap()
        );
    }
}
