//! `reqwest` implementation of the backend contract.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;
use tracing::instrument;

use crate::{
    backend::{Backend, BackendError, ReportKind},
    domain::{Config, Review, ReviewSummary},
};

/// HTTP client for the extraction backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Creates a client for the backend named in the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying `reqwest::Client` fails to build.
    pub fn new(config: &Config) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("review-extraction/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url().trim_end_matches('/').to_string(),
        })
    }

    /// The backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn reviews_url(&self) -> String {
        format!("{}/reviews", self.base_url)
    }

    fn review_url(&self, id: &str) -> String {
        format!("{}/reviews/{}", self.base_url, urlencoding::encode(id))
    }

    /// The download URL of a report.
    #[must_use]
    pub fn report_url(&self, kind: ReportKind) -> String {
        format!("{}/reports/{}", self.base_url, kind.path())
    }

    /// Downloads a report into `dir`, returning the path written.
    ///
    /// The file is named after the report and today's date, e.g.
    /// `effect_sizes-2024-03-01.csv`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the backend rejects it, or the
    /// file cannot be written.
    #[instrument(skip(self))]
    pub async fn download_report(
        &self,
        kind: ReportKind,
        dir: &Path,
    ) -> Result<PathBuf, BackendError> {
        let mut resp = check_response(self.http.get(self.report_url(kind)).send().await?).await?;

        let path = dir.join(report_file_name(kind, chrono::Local::now().date_naive()));
        let io_error = |source| BackendError::Io {
            path: path.clone(),
            source,
        };
        let mut file = tokio::fs::File::create(&path).await.map_err(io_error)?;
        while let Some(chunk) = resp.chunk().await? {
            file.write_all(&chunk).await.map_err(io_error)?;
        }
        file.flush().await.map_err(io_error)?;

        tracing::info!(path = %path.display(), "report downloaded");
        Ok(path)
    }
}

fn report_file_name(kind: ReportKind, date: chrono::NaiveDate) -> String {
    format!("{}-{}.csv", kind.path(), date.format("%Y-%m-%d"))
}

impl Backend for HttpBackend {
    #[instrument(skip(self))]
    async fn list_reviews(&self) -> Result<Vec<ReviewSummary>, BackendError> {
        let resp = check_response(self.http.get(self.reviews_url()).send().await?).await?;
        decode(resp).await
    }

    #[instrument(skip(self))]
    async fn fetch_review(&self, id: &str) -> Result<Review, BackendError> {
        let resp = check_response(self.http.get(self.review_url(id)).send().await?).await?;
        decode(resp).await
    }

    #[instrument(skip_all, fields(review = %review.id))]
    async fn create_review(&self, review: &Review) -> Result<(), BackendError> {
        let request = self.http.post(self.reviews_url()).json(review);
        check_response(request.send().await?).await?;
        Ok(())
    }

    #[instrument(skip_all, fields(review = %review.id))]
    async fn save_review(&self, review: &Review) -> Result<(), BackendError> {
        let request = self.http.put(self.review_url(&review.id)).json(review);
        check_response(request.send().await?).await?;
        Ok(())
    }
}

/// Returns the response unchanged on success, or its status and body as a
/// [`BackendError::Status`].
async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().await.unwrap_or_default();
    tracing::warn!(status = status.as_u16(), %message, "backend rejected request");
    Err(BackendError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, BackendError> {
    let body = resp.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_response(status: u16, body: &'static str) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .body(body)
                .unwrap(),
        )
    }

    fn backend(base_url: &str) -> HttpBackend {
        let mut config = Config::default();
        config.set("base_url", base_url).unwrap();
        HttpBackend::new(&config).unwrap()
    }

    #[test]
    fn urls_are_built_from_base() {
        let backend = backend("http://localhost:5000/");

        assert_eq!(backend.reviews_url(), "http://localhost:5000/reviews");
        assert_eq!(
            backend.report_url(ReportKind::EffectSizes),
            "http://localhost:5000/reports/effect_sizes"
        );
    }

    #[test]
    fn review_ids_are_percent_encoded() {
        let backend = backend("http://localhost:5000");
        assert_eq!(
            backend.review_url("a b/c"),
            "http://localhost:5000/reviews/a%20b%2Fc"
        );
    }

    #[test]
    fn report_file_names_carry_the_date() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(
            report_file_name(ReportKind::Reviews, date),
            "reviews-2024-03-01.csv"
        );
    }

    #[tokio::test]
    async fn check_response_success() {
        assert!(check_response(mock_response(204, "")).await.is_ok());
    }

    #[tokio::test]
    async fn check_response_reports_status_and_body() {
        let err = check_response(mock_response(500, "database locked"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BackendError::Status { status: 500, ref message } if message == "database locked"
        ));
    }

    #[tokio::test]
    async fn decode_accepts_numeric_columns() {
        let resp = mock_response(
            200,
            r#"[{"id": "r1", "extractor_name": "Ann", "extraction_date": null,
                "first_author": "Smith", "year_of_publication": 2015}]"#,
        );

        let summaries: Vec<ReviewSummary> = decode(resp).await.unwrap();

        assert_eq!(summaries[0].year_of_publication, "2015");
        assert_eq!(summaries[0].extraction_date, "");
    }

    #[tokio::test]
    async fn decode_reports_malformed_bodies() {
        let err = decode::<Review>(mock_response(200, "<html>"))
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Decode(_)));
    }
}
