//! Where the dashboard numbers come from.
//!
//! `SampleSource` serves the reference figures after a simulated load;
//! `ApiSource` assembles a snapshot from the census backend.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};

use crate::api::ApiClient;
use crate::models::DashboardSnapshot;

#[async_trait]
pub trait DashboardSource: Send + Sync {
    async fn load(&self) -> Result<DashboardSnapshot>;

    /// Short name for logs and the status bar
    fn name(&self) -> &'static str;
}

pub struct SampleSource {
    delay: Duration,
}

impl SampleSource {
    /// Simulated load time shown as "Carregando..."
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl Default for SampleSource {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY)
    }
}

#[async_trait]
impl DashboardSource for SampleSource {
    async fn load(&self) -> Result<DashboardSnapshot> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        debug!("Loaded sample dashboard");
        Ok(DashboardSnapshot::sample())
    }

    fn name(&self) -> &'static str {
        "sample"
    }
}

pub struct ApiSource {
    api: ApiClient,
}

impl ApiSource {
    /// `api` should already carry the session token
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl DashboardSource for ApiSource {
    async fn load(&self) -> Result<DashboardSnapshot> {
        let (summary, lab_internet, computers, lan, tablets) = tokio::try_join!(
            self.api.fetch_summary(),
            self.api.fetch_lab_internet_count(),
            self.api.fetch_computers_per_student(),
            self.api.fetch_lan_without_broadband(),
            self.api.fetch_tablets_without_lab(),
        )
        .with_context(|| format!("Failed to load dashboard from {}", self.api.base_url()))?;

        info!(
            rural_schools = summary.total_rural_schools,
            lan_rows = lan.len(),
            tablet_rows = tablets.len(),
            "Loaded dashboard from API"
        );

        Ok(DashboardSnapshot::from_responses(
            summary,
            lab_internet,
            computers,
            lan,
            tablets,
        ))
    }

    fn name(&self) -> &'static str {
        "api"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::test_server::serve_routes;
    use crate::api::ApiError;
    use crate::models::NORTHEAST_TOTAL_SCHOOLS;

    fn census_routes(summary_status: u16) -> Vec<(&'static str, u16, String)> {
        vec![
            (
                "/dashboard/resumo-geral",
                summary_status,
                r#"{"total_escolas_rurais": 200, "escolas_com_internet": 120, "escolas_com_laboratorio": 40, "escolas_com_tablets": 30}"#.to_string(),
            ),
            (
                "/dashboard/escolas-lab-internet",
                200,
                r#"{"escolas_rurais_com_lab_e_internet": 35}"#.to_string(),
            ),
            (
                "/dashboard/media-computadores",
                200,
                r#"{"media_computadores_por_aluno": 0.08}"#.to_string(),
            ),
            (
                "/dashboard/escolas-lan-sem-banda-larga",
                200,
                r#"[{"nome_escola": "EM Lagoa Seca", "possui_banda_larga": false, "possui_rede_local": true}]"#.to_string(),
            ),
            (
                "/dashboard/escolas-tablet-sem-lab",
                200,
                r#"[{"nome_escola": "EM Riacho", "quantidade_tablets": 3}, {"nome_escola": "EM Serra", "quantidade_tablets": 18}]"#.to_string(),
            ),
        ]
    }

    #[tokio::test]
    async fn test_sample_source() {
        let source = SampleSource::instant();
        assert_eq!(source.name(), "sample");
        assert_eq!(source.load().await.unwrap(), DashboardSnapshot::sample());
    }

    #[tokio::test]
    async fn test_api_source_assembles_snapshot() {
        let base_url = serve_routes(census_routes(200)).await;
        let source = ApiSource::new(ApiClient::new(&base_url).unwrap().with_token("t"));

        let snapshot = source.load().await.unwrap();

        assert_eq!(snapshot.cards.total_northeast_schools, NORTHEAST_TOTAL_SCHOOLS);
        assert_eq!(snapshot.cards.rural_schools, 200);
        assert_eq!(snapshot.cards.lab_and_internet_schools, 35);
        assert_eq!(snapshot.cards.computers_per_student, Some(0.08));

        let bars: Vec<u64> = snapshot.infrastructure.iter().map(|p| p.value).collect();
        assert_eq!(bars, vec![35, 1, 2]);

        let names: Vec<&str> = snapshot.schools.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["EM Lagoa Seca", "EM Serra", "EM Riacho"]);
        assert_eq!(snapshot.computer_evolution, DashboardSnapshot::sample().computer_evolution);
    }

    #[tokio::test]
    async fn test_api_source_fails_when_any_endpoint_fails() {
        let base_url = serve_routes(census_routes(500)).await;
        let source = ApiSource::new(ApiClient::new(&base_url).unwrap());

        let err = source.load().await.unwrap_err();

        assert!(err.to_string().contains("Failed to load dashboard"));
        assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::ServerError(_))));
    }
}
