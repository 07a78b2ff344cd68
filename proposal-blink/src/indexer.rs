//! GraphQL client for the proposal indexer.
//!
//! One request per lookup, no retries. The indexer is a Hasura-style endpoint
//! that filters `proposal_details` by exact match on `proposal_acct`.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const PROPOSAL_DETAILS_QUERY: &str = r#"query ProposalDetails($proposalAcct: String!) {
  proposal_details(where: { proposal_acct: { _eq: $proposalAcct } }) {
    proposal_acct
    title
    description
    proposal {
      dao {
        dao_detail {
          slug
        }
      }
    }
  }
}"#;

#[derive(Debug, thiserror::Error)]
pub enum IndexerError {
    #[error("indexer request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("indexer responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("indexer returned errors: {0}")]
    GraphQl(String),

    #[error("indexer response contained no data")]
    MissingData,

    #[error("failed to decode indexer response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// One `proposal_details` row.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProposalDetails {
    #[serde(default)]
    pub proposal_acct: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub proposal: Option<ProposalRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProposalRef {
    pub dao: Option<DaoRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DaoRef {
    pub dao_detail: Option<DaoDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DaoDetail {
    pub slug: Option<String>,
}

impl ProposalDetails {
    /// Slug of the DAO owning the proposal, if the whole chain resolved to a non-empty value.
    pub fn dao_slug(&self) -> Option<&str> {
        self.proposal
            .as_ref()?
            .dao
            .as_ref()?
            .dao_detail
            .as_ref()?
            .slug
            .as_deref()
            .filter(|slug| !slug.is_empty())
    }
}

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: ProposalVariables<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProposalVariables<'a> {
    proposal_acct: &'a str,
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlErrorEntry>,
}

#[derive(Deserialize)]
struct GraphQlErrorEntry {
    message: String,
}

#[derive(Deserialize)]
struct ProposalDetailsData {
    // Absent and `null` both mean no match.
    #[serde(default)]
    proposal_details: Option<Vec<ProposalDetails>>,
}

/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct IndexerClient {
    client: Client,
    endpoint: Arc<str>,
}

impl IndexerClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, IndexerError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: Arc::from(endpoint.into()),
        })
    }

    /// Looks up a proposal by account. Only the first matching row is returned.
    pub async fn proposal_details(
        &self,
        proposal_account: &str,
    ) -> Result<Option<ProposalDetails>, IndexerError> {
        debug!(proposal_account, endpoint = %self.endpoint, "querying indexer");

        let request = GraphQlRequest {
            query: PROPOSAL_DETAILS_QUERY,
            variables: ProposalVariables {
                proposal_acct: proposal_account,
            },
        };

        let response = self
            .client
            .post(self.endpoint.as_ref())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(IndexerError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GraphQlResponse<ProposalDetailsData> = serde_json::from_str(&body)?;
        if !parsed.errors.is_empty() {
            let messages: Vec<String> = parsed.errors.into_iter().map(|e| e.message).collect();
            return Err(IndexerError::GraphQl(messages.join("; ")));
        }

        let mut rows = parsed
            .data
            .ok_or(IndexerError::MissingData)?
            .proposal_details
            .unwrap_or_default();
        if rows.len() > 1 {
            warn!(
                proposal_account,
                matches = rows.len(),
                "indexer returned several proposals for one account, using the first"
            );
        }

        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }
}
