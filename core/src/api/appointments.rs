/// Appointment scheduling namespace
use crate::api::http::Http;
use crate::error::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub department: String,
    pub scheduled_at: DateTime<Utc>,
    /// Server-owned vocabulary ("scheduled", "completed", "cancelled", ...)
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAppointment {
    pub patient_id: String,
    pub department: String,
    pub scheduled_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct AppointmentsResponse {
    appointments: Vec<Appointment>,
}

#[derive(Debug, Deserialize)]
struct AppointmentResponse {
    appointment: Appointment,
}

#[derive(Clone)]
pub struct AppointmentsApi {
    http: Http,
}

impl AppointmentsApi {
    pub fn new(http: Http) -> Self {
        Self { http }
    }

    /// Schedule for one day, optionally narrowed to a department.
    pub async fn list_for_date(
        &self,
        date: NaiveDate,
        department: Option<&str>,
    ) -> Result<Vec<Appointment>> {
        let mut path = format!("/api/appointments?date={}", date.format("%Y-%m-%d"));
        if let Some(dept) = department {
            path.push_str(&format!("&department={}", urlencoding::encode(dept)));
        }
        let resp: AppointmentsResponse = self.http.get_json(&path).await?;
        Ok(resp.appointments)
    }

    pub async fn book(&self, new: &NewAppointment) -> Result<Appointment> {
        let resp: AppointmentResponse = self.http.post_json("/api/appointments", new).await?;
        Ok(resp.appointment)
    }

    pub async fn cancel(&self, id: &str) -> Result<()> {
        let path = format!("/api/appointments/{}/cancel", urlencoding::encode(id));
        self.http.post_ack(&path).await
    }
}
