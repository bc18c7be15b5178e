/// Department portal namespace
use crate::api::http::Http;
use crate::api::staff::StaffAccount;
use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: String,
    pub name: String,
    pub head: Option<String>,
    #[serde(default)]
    pub staff_count: u32,
}

#[derive(Debug, Deserialize)]
struct DepartmentsResponse {
    departments: Vec<Department>,
}

#[derive(Debug, Deserialize)]
struct DepartmentResponse {
    department: Department,
}

#[derive(Debug, Deserialize)]
struct RosterResponse {
    staff: Vec<StaffAccount>,
}

#[derive(Clone)]
pub struct DepartmentsApi {
    http: Http,
}

impl DepartmentsApi {
    pub fn new(http: Http) -> Self {
        Self { http }
    }

    pub async fn list(&self) -> Result<Vec<Department>> {
        let resp: DepartmentsResponse = self.http.get_json("/api/departments").await?;
        Ok(resp.departments)
    }

    pub async fn get(&self, id: &str) -> Result<Department> {
        let path = format!("/api/departments/{}", urlencoding::encode(id));
        let resp: DepartmentResponse = self.http.get_json(&path).await?;
        Ok(resp.department)
    }

    pub async fn roster(&self, id: &str) -> Result<Vec<StaffAccount>> {
        let path = format!("/api/departments/{}/roster", urlencoding::encode(id));
        let resp: RosterResponse = self.http.get_json(&path).await?;
        Ok(resp.staff)
    }
}
