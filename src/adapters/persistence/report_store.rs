//! File Report Store - Concrete Adapter for the ReportStore Port
//!
//! Trend results and gap reports go to `data_dir` as one CSV per day;
//! gap reports are also rendered as HTML into `reports_dir`.
//!
//! This is the hexagonal architecture glue: the usecases layer only
//! knows about the `ReportStore` trait, never about files or CSV.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::fs;
use tracing::{info, instrument};

use super::atomic::{is_writable, write_atomic};
use super::csv::{decode_gaps, decode_trend, encode_gaps, encode_trend};
use super::html::render_gap_report;
use crate::config::PersistenceConfig;
use crate::domain::{GapReport, SessionResult, TrendEntry};
use crate::ports::repository::{ReportStore, SaveOutcome, StoreError};

/// CSV + HTML report store on the local filesystem.
pub struct FileReportStore {
    /// Directory for per-day CSV files.
    data_dir: PathBuf,
    /// Directory for HTML pages.
    reports_dir: PathBuf,
}

impl FileReportStore {
    /// Create a store, creating both directories if needed.
    pub async fn new(cfg: &PersistenceConfig) -> Result<Self, StoreError> {
        Self::with_dirs(&cfg.data_dir, &cfg.reports_dir).await
    }

    pub async fn with_dirs(
        data_dir: impl AsRef<Path>,
        reports_dir: impl AsRef<Path>,
    ) -> Result<Self, StoreError> {
        let data_dir = data_dir.as_ref().to_path_buf();
        let reports_dir = reports_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir).await?;
        fs::create_dir_all(&reports_dir).await?;
        Ok(Self {
            data_dir,
            reports_dir,
        })
    }

    /// `<data_dir>/trend_YYYY-MM-DD.csv`
    pub fn trend_path(&self, date: NaiveDate) -> PathBuf {
        self.data_dir.join(format!("trend_{}.csv", date.format("%Y-%m-%d")))
    }

    /// `<data_dir>/breakouts_YYYY-MM-DD.csv`
    pub fn gap_path(&self, date: NaiveDate) -> PathBuf {
        self.data_dir.join(format!("breakouts_{}.csv", date.format("%Y-%m-%d")))
    }

    async fn read_existing(path: &Path) -> Result<Option<String>, StoreError> {
        if !fs::try_exists(path).await? {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path).await?))
    }

    /// `<reports_dir>/YYYY-MM-DD.html`
    pub fn gap_html_path(&self, date: NaiveDate) -> PathBuf {
        self.reports_dir.join(format!("{}.html", date.format("%Y-%m-%d")))
    }
}

/// Date encoded in a report file name written by this store.
fn report_date(file_name: &str) -> Option<NaiveDate> {
    let stem = file_name.strip_suffix(".csv")?;
    let date = stem
        .strip_prefix("trend_")
        .or_else(|| stem.strip_prefix("breakouts_"))?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

#[async_trait]
impl ReportStore for FileReportStore {
    #[instrument(skip(self, result), fields(date = %result.session_date))]
    async fn save_session(
        &self,
        result: &SessionResult,
        overwrite: bool,
    ) -> Result<SaveOutcome, StoreError> {
        let path = self.trend_path(result.session_date);
        let outcome = write_atomic(&path, &encode_trend(result), overwrite).await?;
        info!(
            path = %outcome.path().display(),
            entries = result.entries.len(),
            "Trend report saved"
        );
        Ok(outcome)
    }

    async fn existing_session(&self, date: NaiveDate) -> Result<Option<PathBuf>, StoreError> {
        let path = self.trend_path(date);
        Ok(fs::try_exists(&path).await?.then_some(path))
    }

    async fn load_session(&self, date: NaiveDate) -> Result<Option<Vec<TrendEntry>>, StoreError> {
        let path = self.trend_path(date);
        match Self::read_existing(&path).await? {
            Some(content) => decode_trend(&path, &content).map(Some),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, report), fields(date = %report.date))]
    async fn save_gap_report(
        &self,
        report: &GapReport,
        overwrite: bool,
    ) -> Result<SaveOutcome, StoreError> {
        let outcome = write_atomic(&self.gap_path(report.date), &encode_gaps(report), overwrite).await?;
        // The CSV is the record; the page follows it.
        let html = self.gap_html_path(report.date);
        write_atomic(&html, &render_gap_report(report), true).await?;
        info!(html = %html.display(), "Gap report page rendered");
        Ok(outcome)
    }

    async fn load_gap_report(&self, date: NaiveDate) -> Result<Option<GapReport>, StoreError> {
        let path = self.gap_path(date);
        let Some(content) = Self::read_existing(&path).await? else {
            return Ok(None);
        };
        let signals = decode_gaps(&path, &content)?;
        Ok(Some(GapReport { date, signals }))
    }

    async fn stored_dates(&self) -> Result<Vec<NaiveDate>, StoreError> {
        let mut dates = BTreeSet::new();
        let mut dir = fs::read_dir(&self.data_dir).await?;
        while let Some(entry) = dir.next_entry().await? {
            if let Some(date) = entry.file_name().to_str().and_then(report_date) {
                dates.insert(date);
            }
        }
        Ok(dates.into_iter().rev().collect())
    }

    async fn is_healthy(&self) -> bool {
        is_writable(&self.data_dir).await && is_writable(&self.reports_dir).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TrendEntry, TrendState};
    use chrono::Utc;
    use uuid::Uuid;

    async fn store() -> (FileReportStore, PathBuf) {
        let root = std::env::temp_dir().join(format!("ntt-store-{}", Uuid::new_v4()));
        let store = FileReportStore::with_dirs(root.join("data"), root.join("reports"))
            .await
            .unwrap();
        (store, root)
    }

    fn result(date: NaiveDate) -> SessionResult {
        SessionResult {
            session_id: Uuid::new_v4(),
            session_date: date,
            finalized_at: Utc::now(),
            entries: vec![TrendEntry {
                symbol: "RELIANCE.NS".to_string(),
                baseline: 2900.0,
                price: 2929.0,
                change_pct: 1.0,
                state: TrendState::Rising,
            }],
        }
    }

    #[tokio::test]
    async fn test_save_then_load_session() {
        let (store, root) = store().await;
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();

        assert!(store.load_session(date).await.unwrap().is_none());
        assert!(store.existing_session(date).await.unwrap().is_none());
        let saved = store.save_session(&result(date), false).await.unwrap();
        assert!(matches!(saved, SaveOutcome::Created(_)));
        assert!(saved.path().ends_with("trend_2026-03-02.csv"));

        let entries = store.load_session(date).await.unwrap().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].symbol, "RELIANCE");
        assert_eq!(store.existing_session(date).await.unwrap(), Some(store.trend_path(date)));
        assert!(store.is_healthy().await);

        std::fs::remove_dir_all(root).unwrap();
    }

    #[tokio::test]
    async fn test_second_save_same_day_requires_overwrite() {
        let (store, root) = store().await;
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();

        store.save_session(&result(date), false).await.unwrap();
        let err = store.save_session(&result(date), false).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
        let again = store.save_session(&result(date), true).await.unwrap();
        assert!(matches!(again, SaveOutcome::Overwritten(_)));

        std::fs::remove_dir_all(root).unwrap();
    }

    #[tokio::test]
    async fn test_stored_dates_newest_first() {
        let (store, root) = store().await;
        let monday = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2026, 3, 3).unwrap();

        store.save_session(&result(monday), false).await.unwrap();
        store.save_session(&result(tuesday), false).await.unwrap();
        let report = GapReport { date: tuesday, signals: Vec::new() };
        store.save_gap_report(&report, false).await.unwrap();
        std::fs::write(root.join("data").join("notes.txt"), "x").unwrap();

        assert_eq!(store.stored_dates().await.unwrap(), vec![tuesday, monday]);
        assert!(store.load_gap_report(monday).await.unwrap().is_none());

        std::fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn test_report_date_from_file_name() {
        assert_eq!(report_date("trend_2026-03-02.csv"), NaiveDate::from_ymd_opt(2026, 3, 2));
        assert_eq!(report_date("breakouts_2026-03-03.csv"), NaiveDate::from_ymd_opt(2026, 3, 3));
        assert_eq!(report_date("trend_2026-03-02.csv.tmp"), None);
        assert_eq!(report_date("other.csv"), None);
    }

    #[tokio::test]
    async fn test_gap_report_writes_csv_and_html() {
        let (store, root) = store().await;
        let date = NaiveDate::from_ymd_opt(2026, 3, 3).unwrap();
        let report = GapReport { date, signals: Vec::new() };

        store.save_gap_report(&report, false).await.unwrap();
        assert!(store.gap_path(date).exists());
        assert!(store.gap_html_path(date).exists());
        assert_eq!(store.load_gap_report(date).await.unwrap(), Some(report));

        std::fs::remove_dir_all(root).unwrap();
    }
}
