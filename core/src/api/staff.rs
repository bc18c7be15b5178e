/// Hospital IT administration — staff accounts
use crate::api::http::Http;
use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffAccount {
    pub id: String,
    pub name: String,
    pub role: String,
    pub department: String,
    pub email: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStaffAccount {
    pub name: String,
    pub role: String,
    pub department: String,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StaffListResponse {
    staff: Vec<StaffAccount>,
}

#[derive(Debug, Deserialize)]
struct StaffResponse {
    staff: StaffAccount,
}

#[derive(Clone)]
pub struct StaffApi {
    http: Http,
}

impl StaffApi {
    pub fn new(http: Http) -> Self {
        Self { http }
    }

    pub async fn list(&self) -> Result<Vec<StaffAccount>> {
        let resp: StaffListResponse = self.http.get_json("/api/admin/staff").await?;
        Ok(resp.staff)
    }

    pub async fn create(&self, new: &NewStaffAccount) -> Result<StaffAccount> {
        let resp: StaffResponse = self.http.post_json("/api/admin/staff", new).await?;
        Ok(resp.staff)
    }

    pub async fn update(&self, account: &StaffAccount) -> Result<StaffAccount> {
        let path = format!("/api/admin/staff/{}", urlencoding::encode(&account.id));
        let resp: StaffResponse = self.http.put_json(&path, account).await?;
        Ok(resp.staff)
    }

    pub async fn deactivate(&self, id: &str) -> Result<()> {
        let path = format!("/api/admin/staff/{}/deactivate", urlencoding::encode(id));
        self.http.post_ack(&path).await
    }
}
