/// Radiology and interventional-radiology worklists
use crate::api::http::Http;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorklistEntry {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    /// Imaging modality ("XR", "CT", "US", ...)
    pub modality: String,
    pub status: String,
    pub ordered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyDetail {
    #[serde(flatten)]
    pub entry: WorklistEntry,
    #[serde(default)]
    pub clinical_notes: Option<String>,
    #[serde(default)]
    pub report: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSubmission {
    pub findings: String,
    pub impression: String,
}

#[derive(Debug, Deserialize)]
struct WorklistResponse {
    studies: Vec<WorklistEntry>,
}

#[derive(Debug, Deserialize)]
struct StudyResponse {
    study: StudyDetail,
}

#[derive(Clone)]
pub struct RadiologyApi {
    http: Http,
}

impl RadiologyApi {
    pub fn new(http: Http) -> Self {
        Self { http }
    }

    pub async fn worklist(&self) -> Result<Vec<WorklistEntry>> {
        let resp: WorklistResponse = self.http.get_json("/api/radiology/worklist").await?;
        Ok(resp.studies)
    }

    /// Interventional-radiology cases share the study shape on a separate path.
    pub async fn ir_worklist(&self) -> Result<Vec<WorklistEntry>> {
        let resp: WorklistResponse = self
            .http
            .get_json("/api/interventional-radiology/worklist")
            .await?;
        Ok(resp.studies)
    }

    pub async fn study(&self, id: &str) -> Result<StudyDetail> {
        let path = format!("/api/radiology/studies/{}", urlencoding::encode(id));
        let resp: StudyResponse = self.http.get_json(&path).await?;
        Ok(resp.study)
    }

    pub async fn submit_report(&self, id: &str, report: &ReportSubmission) -> Result<StudyDetail> {
        let path = format!("/api/radiology/studies/{}/report", urlencoding::encode(id));
        let resp: StudyResponse = self.http.post_json(&path, report).await?;
        Ok(resp.study)
    }
}
