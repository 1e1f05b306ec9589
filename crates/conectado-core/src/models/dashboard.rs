//! Aggregated school census statistics.
//!
//! The response types mirror the JSON returned by the `/dashboard/*`
//! endpoints (field names are the Portuguese column aliases of the backend
//! queries). `DashboardSnapshot` is the screen-ready aggregate.

use serde::{Deserialize, Serialize};

// ============================================================================
// Endpoint responses
// ============================================================================

/// `GET /dashboard/escolas-lab-internet`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct LabInternetCount {
    #[serde(rename = "escolas_rurais_com_lab_e_internet")]
    pub schools: u64,
}

/// `GET /dashboard/media-computadores`
///
/// The backend divides by enrollment with `NULLIF`, so the average is null
/// when no school qualifies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ComputersPerStudent {
    #[serde(rename = "media_computadores_por_aluno")]
    pub average: Option<f64>,
}

/// One row of `GET /dashboard/escolas-lan-sem-banda-larga`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct LanWithoutBroadband {
    #[serde(rename = "nome_escola")]
    pub school_name: String,
    #[serde(rename = "possui_banda_larga")]
    pub has_broadband: bool,
    #[serde(rename = "possui_rede_local")]
    pub has_local_network: bool,
}

/// One row of `GET /dashboard/escolas-tablet-sem-lab`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct TabletWithoutLab {
    #[serde(rename = "nome_escola")]
    pub school_name: String,
    #[serde(rename = "quantidade_tablets")]
    pub tablets: u64,
}

/// Sort tablet rows by tablet count, largest first. Ties keep their order.
pub fn sort_by_tablets_desc(rows: &mut [TabletWithoutLab]) {
    rows.sort_by(|a, b| b.tablets.cmp(&a.tablets));
}

/// `GET /dashboard/resumo-geral`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct DashboardSummary {
    #[serde(rename = "total_escolas_rurais")]
    pub total_rural_schools: u64,
    #[serde(rename = "escolas_com_internet")]
    pub with_internet: u64,
    #[serde(rename = "escolas_com_laboratorio")]
    pub with_lab: u64,
    #[serde(rename = "escolas_com_tablets")]
    pub with_tablets: u64,
}

// ============================================================================
// Screen aggregate
// ============================================================================

/// Headline numbers shown as cards at the top of the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryCards {
    pub total_northeast_schools: u64,
    pub rural_schools: u64,
    pub lab_and_internet_schools: u64,
    pub computers_per_student: Option<f64>,
}

/// A labelled value in a chart series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: u64,
}

impl ChartPoint {
    pub fn new(label: impl Into<String>, value: u64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// A row of the school list. `None` means the source did not report it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolRow {
    pub name: String,
    pub has_internet: Option<bool>,
    pub has_lab: Option<bool>,
}

impl SchoolRow {
    pub fn new(name: impl Into<String>, has_internet: Option<bool>, has_lab: Option<bool>) -> Self {
        Self {
            name: name.into(),
            has_internet,
            has_lab,
        }
    }
}

/// Everything the dashboard screen renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub cards: SummaryCards,
    /// Schools per infrastructure profile (bar chart)
    pub infrastructure: Vec<ChartPoint>,
    /// Internet access distribution (share chart)
    pub internet_distribution: Vec<ChartPoint>,
    /// Computers over the years (line chart)
    pub computer_evolution: Vec<ChartPoint>,
    pub schools: Vec<SchoolRow>,
}

/// Schools in the Northeast region across all locations. No endpoint reports it.
pub const NORTHEAST_TOTAL_SCHOOLS: u64 = 45_892;

pub const LABEL_LAB_INTERNET: &str = "Lab + Internet";
pub const LABEL_LAN_NO_BROADBAND: &str = "LAN sem Banda";
pub const LABEL_TABLETS_NO_LAB: &str = "Tablets sem Lab";
pub const LABEL_WITH_INTERNET: &str = "Com Internet";
pub const LABEL_WITHOUT_INTERNET: &str = "Sem Internet";

impl DashboardSnapshot {
    /// The reference figures displayed while the backend is unavailable.
    pub fn sample() -> Self {
        Self {
            cards: SummaryCards {
                total_northeast_schools: NORTHEAST_TOTAL_SCHOOLS,
                rural_schools: 18_456,
                lab_and_internet_schools: 1_247,
                computers_per_student: Some(0.12),
            },
            infrastructure: vec![
                ChartPoint::new(LABEL_LAB_INTERNET, 1_247),
                ChartPoint::new(LABEL_LAN_NO_BROADBAND, 871),
                ChartPoint::new(LABEL_TABLETS_NO_LAB, 2_005),
            ],
            internet_distribution: vec![
                ChartPoint::new(LABEL_WITH_INTERNET, 1_247),
                ChartPoint::new(LABEL_LAN_NO_BROADBAND, 871),
                ChartPoint::new(LABEL_WITHOUT_INTERNET, 1_882),
            ],
            computer_evolution: sample_computer_evolution(),
            schools: vec![
                SchoolRow::new("Escola Rural 1", Some(true), Some(true)),
                SchoolRow::new("Escola Rural 2", Some(false), Some(true)),
                SchoolRow::new("Escola Rural 3", Some(true), Some(false)),
                SchoolRow::new("Escola Rural 4", Some(true), Some(true)),
                SchoolRow::new("Escola Rural 5", Some(false), Some(false)),
            ],
        }
    }

    /// Assemble a snapshot from the endpoint responses.
    ///
    /// Series the backend does not serve (regional total, yearly evolution)
    /// keep their reference values. The internet distribution derives the
    /// "without internet" share from the summary, never going below zero.
    pub fn from_responses(
        summary: DashboardSummary,
        lab_internet: LabInternetCount,
        computers: ComputersPerStudent,
        lan_without_broadband: Vec<LanWithoutBroadband>,
        mut tablets_without_lab: Vec<TabletWithoutLab>,
    ) -> Self {
        sort_by_tablets_desc(&mut tablets_without_lab);

        let lan_count = lan_without_broadband.len() as u64;
        let tablet_count = tablets_without_lab.len() as u64;
        let without_internet = summary
            .total_rural_schools
            .saturating_sub(summary.with_internet)
            .saturating_sub(lan_count);

        // Neither endpoint reports internet access for its rows
        let schools = lan_without_broadband
            .into_iter()
            .map(|s| SchoolRow::new(s.school_name, None, None))
            .chain(
                tablets_without_lab
                    .into_iter()
                    .map(|s| SchoolRow::new(s.school_name, None, Some(false))),
            )
            .collect();

        Self {
            cards: SummaryCards {
                total_northeast_schools: NORTHEAST_TOTAL_SCHOOLS,
                rural_schools: summary.total_rural_schools,
                lab_and_internet_schools: lab_internet.schools,
                computers_per_student: computers.average,
            },
            infrastructure: vec![
                ChartPoint::new(LABEL_LAB_INTERNET, lab_internet.schools),
                ChartPoint::new(LABEL_LAN_NO_BROADBAND, lan_count),
                ChartPoint::new(LABEL_TABLETS_NO_LAB, tablet_count),
            ],
            internet_distribution: vec![
                ChartPoint::new(LABEL_WITH_INTERNET, summary.with_internet),
                ChartPoint::new(LABEL_LAN_NO_BROADBAND, lan_count),
                ChartPoint::new(LABEL_WITHOUT_INTERNET, without_internet),
            ],
            computer_evolution: sample_computer_evolution(),
            schools,
        }
    }

    /// Percentage of each distribution slice, in series order.
    pub fn distribution_shares(&self) -> Vec<(String, f64)> {
        let total: u64 = self.internet_distribution.iter().map(|p| p.value).sum();
        self.internet_distribution
            .iter()
            .map(|p| {
                let share = if total == 0 {
                    0.0
                } else {
                    p.value as f64 * 100.0 / total as f64
                };
                (p.label.clone(), share)
            })
            .collect()
    }
}

fn sample_computer_evolution() -> Vec<ChartPoint> {
    [("2019", 800), ("2020", 950), ("2021", 1_050), ("2022", 1_150), ("2023", 1_247)]
        .into_iter()
        .map(|(year, value)| ChartPoint::new(year, value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_endpoint_responses() {
        let count: LabInternetCount =
            serde_json::from_str(r#"{"escolas_rurais_com_lab_e_internet": 1247}"#).unwrap();
        assert_eq!(count.schools, 1247);

        let avg: ComputersPerStudent =
            serde_json::from_str(r#"{"media_computadores_por_aluno": 0.12}"#).unwrap();
        assert_eq!(avg.average, Some(0.12));

        let null_avg: ComputersPerStudent =
            serde_json::from_str(r#"{"media_computadores_por_aluno": null}"#).unwrap();
        assert_eq!(null_avg.average, None);

        let lan: Vec<LanWithoutBroadband> = serde_json::from_str(
            r#"[{"nome_escola": "EM Sitio Novo", "possui_banda_larga": false, "possui_rede_local": true}]"#,
        )
        .unwrap();
        assert_eq!(lan[0].school_name, "EM Sitio Novo");
        assert!(!lan[0].has_broadband);
        assert!(lan[0].has_local_network);

        let summary: DashboardSummary = serde_json::from_str(
            r#"{"total_escolas_rurais": 10, "escolas_com_internet": 4, "escolas_com_laboratorio": 3, "escolas_com_tablets": 2}"#,
        )
        .unwrap();
        assert_eq!(summary.total_rural_schools, 10);
        assert_eq!(summary.with_tablets, 2);
    }

    #[test]
    fn test_sort_by_tablets_desc_is_stable() {
        let mut rows = vec![
            TabletWithoutLab { school_name: "A".into(), tablets: 5 },
            TabletWithoutLab { school_name: "B".into(), tablets: 30 },
            TabletWithoutLab { school_name: "C".into(), tablets: 5 },
            TabletWithoutLab { school_name: "D".into(), tablets: 12 },
        ];
        sort_by_tablets_desc(&mut rows);

        let names: Vec<&str> = rows.iter().map(|r| r.school_name.as_str()).collect();
        assert_eq!(names, vec!["B", "D", "A", "C"]);
    }

    #[test]
    fn test_sample_snapshot_values() {
        let snapshot = DashboardSnapshot::sample();
        assert_eq!(snapshot.cards.total_northeast_schools, 45_892);
        assert_eq!(snapshot.cards.rural_schools, 18_456);
        assert_eq!(snapshot.cards.lab_and_internet_schools, 1_247);
        assert_eq!(snapshot.cards.computers_per_student, Some(0.12));

        let bars: Vec<u64> = snapshot.infrastructure.iter().map(|p| p.value).collect();
        assert_eq!(bars, vec![1247, 871, 2005]);

        let years: Vec<&str> = snapshot.computer_evolution.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(years, vec!["2019", "2020", "2021", "2022", "2023"]);
        assert_eq!(snapshot.schools.len(), 5);
    }

    #[test]
    fn test_from_responses_builds_series() {
        let summary = DashboardSummary {
            total_rural_schools: 100,
            with_internet: 60,
            with_lab: 20,
            with_tablets: 15,
        };
        let lan = vec![LanWithoutBroadband {
            school_name: "Escola LAN".into(),
            has_broadband: false,
            has_local_network: true,
        }];
        let tablets = vec![
            TabletWithoutLab { school_name: "Poucos".into(), tablets: 2 },
            TabletWithoutLab { school_name: "Muitos".into(), tablets: 40 },
        ];

        let snapshot = DashboardSnapshot::from_responses(
            summary,
            LabInternetCount { schools: 7 },
            ComputersPerStudent { average: None },
            lan,
            tablets,
        );

        assert_eq!(snapshot.cards.rural_schools, 100);
        assert_eq!(snapshot.cards.lab_and_internet_schools, 7);
        assert_eq!(snapshot.cards.computers_per_student, None);

        let bars: Vec<u64> = snapshot.infrastructure.iter().map(|p| p.value).collect();
        assert_eq!(bars, vec![7, 1, 2]);

        let dist: Vec<u64> = snapshot.internet_distribution.iter().map(|p| p.value).collect();
        assert_eq!(dist, vec![60, 1, 39]);

        assert_eq!(snapshot.schools[0].name, "Escola LAN");
        assert_eq!(snapshot.schools[0].has_internet, None);
        assert_eq!(snapshot.schools[1].name, "Muitos");
        assert_eq!(snapshot.schools[2].name, "Poucos");
    }

    #[test]
    fn test_lan_rows_do_not_report_internet_from_broadband() {
        let lan = vec![
            LanWithoutBroadband {
                school_name: "EM Lagoa".into(),
                has_broadband: false,
                has_local_network: true,
            },
            LanWithoutBroadband {
                school_name: "EM Serra".into(),
                has_broadband: true,
                has_local_network: true,
            },
        ];
        let snapshot = DashboardSnapshot::from_responses(
            DashboardSummary { total_rural_schools: 2, ..Default::default() },
            LabInternetCount { schools: 0 },
            ComputersPerStudent { average: None },
            lan,
            vec![],
        );

        let dist: Vec<u64> = snapshot.internet_distribution.iter().map(|p| p.value).collect();
        assert_eq!(dist, vec![0, 2, 0]);
        for row in &snapshot.schools {
            assert_eq!(row.has_internet, None, "{}", row.name);
            assert_eq!(row.has_lab, None);
        }
    }

    #[test]
    fn test_from_responses_without_internet_saturates() {
        let summary = DashboardSummary {
            total_rural_schools: 5,
            with_internet: 10,
            ..Default::default()
        };
        let snapshot = DashboardSnapshot::from_responses(
            summary,
            LabInternetCount { schools: 0 },
            ComputersPerStudent { average: Some(0.0) },
            vec![],
            vec![],
        );
        assert_eq!(snapshot.internet_distribution[2].value, 0);
    }

    #[test]
    fn test_distribution_shares() {
        let shares = DashboardSnapshot::sample().distribution_shares();
        assert_eq!(shares.len(), 3);
        // 1247 / 4000
        assert!((shares[0].1 - 31.175).abs() < 1e-9);
        let total: f64 = shares.iter().map(|(_, s)| s).sum();
        assert!((total - 100.0).abs() < 1e-9);

        let empty = DashboardSnapshot::default().distribution_shares();
        assert!(empty.is_empty());
    }
}
