/// Patient registration namespace
use crate::api::http::Http;
use crate::error::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub surname: String,
    pub other_names: String,
    pub gender: String,
    pub date_of_birth: Option<NaiveDate>,
    pub phone: Option<String>,
    pub residential_address: Option<String>,
    pub region: Option<String>,
    pub insurance_id: Option<String>,
}

/// Registration payload; the server assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPatient {
    pub surname: String,
    pub other_names: String,
    pub gender: String,
    pub date_of_birth: Option<NaiveDate>,
    pub phone: Option<String>,
    pub residential_address: Option<String>,
    pub region: Option<String>,
    pub insurance_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PatientsResponse {
    patients: Vec<Patient>,
}

#[derive(Debug, Deserialize)]
struct PatientResponse {
    patient: Patient,
}

#[derive(Clone)]
pub struct PatientsApi {
    http: Http,
}

impl PatientsApi {
    pub fn new(http: Http) -> Self {
        Self { http }
    }

    pub async fn list(&self) -> Result<Vec<Patient>> {
        let resp: PatientsResponse = self.http.get_json("/api/patients").await?;
        Ok(resp.patients)
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Patient>> {
        let path = format!("/api/patients?query={}", urlencoding::encode(query));
        let resp: PatientsResponse = self.http.get_json(&path).await?;
        Ok(resp.patients)
    }

    pub async fn get(&self, id: &str) -> Result<Patient> {
        let path = format!("/api/patients/{}", urlencoding::encode(id));
        let resp: PatientResponse = self.http.get_json(&path).await?;
        Ok(resp.patient)
    }

    pub async fn register(&self, new: &NewPatient) -> Result<Patient> {
        let resp: PatientResponse = self.http.post_json("/api/patients", new).await?;
        Ok(resp.patient)
    }

    pub async fn update(&self, patient: &Patient) -> Result<Patient> {
        let path = format!("/api/patients/{}", urlencoding::encode(&patient.id));
        let resp: PatientResponse = self.http.put_json(&path, patient).await?;
        Ok(resp.patient)
    }
}
