//! Implements the `ExpenseSource` trait using `reqwest` to call the Splitwise API.

use crate::api::ExpenseSource;
use crate::config::Credentials;
use crate::error::Res;
use crate::model::{DateBounds, Expense, ExpensesResponse};
use crate::Config;
use anyhow::Context;
use tracing::{debug, trace};
use url::Url;

const GET_EXPENSES: &str = "get_expenses";

/// The service pages results by default. A limit of zero asks for every match.
const NO_LIMIT: &str = "0";

/// Calls the Splitwise `get_expenses` endpoint, authenticating with the API key as a bearer token.
pub struct SplitwiseClient {
    credentials: Credentials,
    endpoint: Url,
    client: reqwest::Client,
}

impl SplitwiseClient {
    pub fn new(config: &Config) -> Res<Self> {
        let endpoint = config
            .api_url()
            .join(GET_EXPENSES)
            .context("Unable to build the get_expenses URL")?;
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Unable to create the HTTP client")?;
        debug!(
            "Using Splitwise application {} at {}",
            config.credentials().consumer_key(),
            endpoint
        );
        Ok(Self {
            credentials: config.credentials().clone(),
            endpoint,
            client,
        })
    }

    fn url(&self, bounds: &DateBounds) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("dated_after", &bounds.dated_after)
            .append_pair("dated_before", &bounds.dated_before)
            .append_pair("limit", NO_LIMIT);
        url
    }
}

#[async_trait::async_trait]
impl ExpenseSource for SplitwiseClient {
    async fn expenses(&mut self, bounds: &DateBounds) -> Res<Vec<Expense>> {
        let url = self.url(bounds);
        trace!("GET {url}");
        let response = self
            .client
            .get(url)
            .bearer_auth(self.credentials.api_key())
            .send()
            .await
            .context("Failed to send the get_expenses request to Splitwise")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Unable to read the get_expenses response body")?;

        if !status.is_success() {
            anyhow::bail!("Splitwise get_expenses failed with status {status}: {body}");
        }

        let parsed: ExpensesResponse = serde_json::from_str(&body)
            .context("Failed to parse the Splitwise get_expenses response")?;
        trace!("Received {} expenses", parsed.expenses.len());
        Ok(parsed.expenses)
    }
}
