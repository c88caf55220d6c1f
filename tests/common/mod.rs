//! Local stub servers for the upstream HTTP services.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::Query,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use weather_agent::config::WeatherConfig;

pub type Recorded = Arc<Mutex<Vec<HashMap<String, String>>>>;

/// Serve `app` on an ephemeral loopback port and return its base URL.
pub async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server");
    });
    format!("http://{}", addr)
}

/// Canned answers for the geocoding and forecast endpoints.
pub struct WeatherStub {
    pub geocode: (StatusCode, Value),
    pub forecast: (StatusCode, Value),
}

impl WeatherStub {
    /// Paris resolves and the forecast returns the given `current` block.
    pub fn paris(current: Value) -> Self {
        Self {
            geocode: (
                StatusCode::OK,
                json!({
                    "results": [{
                        "id": 2988507,
                        "name": "Paris",
                        "latitude": 48.85341,
                        "longitude": 2.3488,
                        "country": "France"
                    }],
                    "generationtime_ms": 0.7
                }),
            ),
            forecast: (StatusCode::OK, json!({ "latitude": 48.86, "longitude": 2.35, "current": current })),
        }
    }

    /// Start the stub. Returns the config pointing at it plus the recorded
    /// query strings of geocoding and forecast calls.
    pub async fn start(self) -> (WeatherConfig, Recorded, Recorded) {
        let geo_calls: Recorded = Arc::default();
        let forecast_calls: Recorded = Arc::default();

        let app = Router::new()
            .route("/v1/search", responder(self.geocode, geo_calls.clone()))
            .route("/v1/forecast", responder(self.forecast, forecast_calls.clone()));

        let base = spawn(app).await;
        let config = WeatherConfig {
            geocoding_url: format!("{}/v1/search", base),
            forecast_url: format!("{}/v1/forecast", base),
        };
        (config, geo_calls, forecast_calls)
    }
}

fn responder(
    (status, body): (StatusCode, Value),
    calls: Recorded,
) -> axum::routing::MethodRouter {
    get(move |Query(params): Query<HashMap<String, String>>| {
        let body = body.clone();
        let calls = calls.clone();
        async move {
            calls.lock().unwrap().push(params);
            (status, Json(body))
        }
    })
}

pub fn sample_current() -> Value {
    json!({
        "time": "2024-05-01T12:00",
        "interval": 900,
        "temperature_2m": 21.5,
        "relative_humidity_2m": 60,
        "precipitation": 0,
        "weather_code": 2
    })
}
