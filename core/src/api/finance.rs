/// Finance namespace (bank-account records)
use crate::api::http::Http;
use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankAccount {
    pub id: String,
    pub bank_name: String,
    pub account_name: String,
    pub account_number: String,
    pub branch: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBankAccount {
    pub bank_name: String,
    pub account_name: String,
    pub account_number: String,
    pub branch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BankAccountsResponse {
    accounts: Vec<BankAccount>,
}

#[derive(Debug, Deserialize)]
struct BankAccountResponse {
    account: BankAccount,
}

#[derive(Clone)]
pub struct FinanceApi {
    http: Http,
}

impl FinanceApi {
    pub fn new(http: Http) -> Self {
        Self { http }
    }

    pub async fn bank_accounts(&self) -> Result<Vec<BankAccount>> {
        // This namespace predates the /api prefix convention on the backend.
        let resp: BankAccountsResponse = self.http.get_json("/finance/bank-accounts").await?;
        Ok(resp.accounts)
    }

    pub async fn create_bank_account(&self, new: &NewBankAccount) -> Result<BankAccount> {
        let resp: BankAccountResponse = self.http.post_json("/finance/bank-accounts", new).await?;
        Ok(resp.account)
    }
}
