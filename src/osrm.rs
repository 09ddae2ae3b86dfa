//! OSRM HTTP adapter for distance/duration tables.

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::traits::{CostMatrixProvider, LatLng, MatrixCell};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "car".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// Table request for origins followed by destinations.
    ///
    /// OSRM takes a single coordinate list; `sources` and `destinations`
    /// select which positions act as each.
    fn table_url(&self, origins: &[LatLng], destinations: &[LatLng]) -> String {
        let coords = origins
            .iter()
            .chain(destinations)
            .map(|(lat, lng)| format!("{:.6},{:.6}", lng, lat))
            .collect::<Vec<_>>()
            .join(";");
        let sources = index_list(0..origins.len());
        let targets = index_list(origins.len()..origins.len() + destinations.len());

        format!(
            "{}/table/v1/{}/{}?sources={}&destinations={}&annotations=duration,distance",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile,
            coords,
            sources,
            targets
        )
    }

    fn transport_error(url: &str, err: &reqwest::Error) -> ProviderError {
        ProviderError::Transport {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

impl CostMatrixProvider for OsrmClient {
    fn table(
        &self,
        origins: &[LatLng],
        destinations: &[LatLng],
    ) -> Result<Vec<Vec<MatrixCell>>, ProviderError> {
        if origins.is_empty() || destinations.is_empty() {
            return Ok(vec![Vec::new(); origins.len()]);
        }

        let url = self.table_url(origins, destinations);
        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|err| Self::transport_error(&url, &err))?;

        // OSRM answers 4xx with a JSON body carrying its own error code.
        let status = resp.status();
        let body = match resp.json::<OsrmTableResponse>() {
            Ok(body) => body,
            Err(_) if !status.is_success() => {
                return Err(ProviderError::Transport {
                    url,
                    message: format!("HTTP {}", status),
                });
            }
            Err(err) => return Err(ProviderError::MalformedResponse(err.to_string())),
        };

        convert_response(body, origins.len(), destinations.len())
    }

    fn name(&self) -> &str {
        "osrm"
    }
}

fn index_list(range: std::ops::Range<usize>) -> String {
    range.map(|i| i.to_string()).collect::<Vec<_>>().join(";")
}

fn convert_response(
    body: OsrmTableResponse,
    rows: usize,
    cols: usize,
) -> Result<Vec<Vec<MatrixCell>>, ProviderError> {
    if body.code != "Ok" {
        return Err(ProviderError::Service {
            code: body.code,
            message: body.message.unwrap_or_default(),
        });
    }

    let durations = body
        .durations
        .ok_or_else(|| ProviderError::MalformedResponse("missing durations".to_string()))?;
    let distances = body
        .distances
        .ok_or_else(|| ProviderError::MalformedResponse("missing distances".to_string()))?;

    let shape_ok = |table: &[Vec<Option<f64>>]| table.len() == rows && table.iter().all(|row| row.len() == cols);
    if !shape_ok(&durations) || !shape_ok(&distances) {
        return Err(ProviderError::MalformedResponse(format!(
            "expected a {}x{} table",
            rows, cols
        )));
    }

    Ok(durations
        .into_iter()
        .zip(distances)
        .map(|(duration_row, distance_row)| {
            duration_row
                .into_iter()
                .zip(distance_row)
                .map(|(duration, distance)| match (valid(duration), valid(distance)) {
                    (Some(duration_s), Some(distance_m)) => MatrixCell::Ok {
                        distance_m,
                        duration_s,
                    },
                    _ => MatrixCell::Unreachable,
                })
                .collect()
        })
        .collect())
}

/// Null, negative and non-finite cells mean "no route".
fn valid(cell: Option<f64>) -> Option<f64> {
    cell.filter(|value| value.is_finite() && *value >= 0.0)
}

#[derive(Debug, Deserialize)]
struct OsrmTableResponse {
    code: String,
    message: Option<String>,
    durations: Option<Vec<Vec<Option<f64>>>>,
    distances: Option<Vec<Vec<Option<f64>>>>,
}
