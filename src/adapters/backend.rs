//! REST client for the triage backend. Every call takes an explicit
//! [`Session`] rather than reading identity from ambient state.

use crate::domain::model::{Session, Ticket, TicketRecord, TicketStatus};
use crate::utils::error::{Result, TriageError};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub struct TriageApi {
    client: Client,
    base_url: String,
}

/// Ticket fields on the wire, mapped 1:1 from the parsed record.
#[derive(Debug, Serialize)]
struct TicketPayload<'a> {
    conversation_id: &'a str,
    channel: &'a str,
    created_date: &'a str,
    customer_role: &'a str,
    agent_name: &'a str,
    product: &'a str,
    account_name: &'a str,
    transcript: &'a str,
    property_name: &'a str,
    property_city: &'a str,
    property_state: &'a str,
    contact_name: &'a str,
    contact_role: &'a str,
    contact_phone: &'a str,
}

impl<'a> From<&'a TicketRecord> for TicketPayload<'a> {
    fn from(record: &'a TicketRecord) -> Self {
        Self {
            conversation_id: &record.conversation_id,
            channel: &record.channel,
            created_date: &record.created_date,
            customer_role: &record.customer_role,
            agent_name: &record.agent_name,
            product: &record.product,
            account_name: &record.account_name,
            transcript: &record.transcript,
            property_name: &record.property_name,
            property_city: &record.property_city,
            property_state: &record.property_state,
            contact_name: &record.contact_name,
            contact_role: &record.contact_role,
            contact_phone: &record.contact_phone,
        }
    }
}

#[derive(Debug, Serialize)]
struct UploadRequest<'a> {
    tickets: Vec<TicketPayload<'a>>,
    submitted_by: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub tickets: Vec<Ticket>,
    #[serde(default)]
    pub total_processed: usize,
}

#[derive(Debug, Deserialize)]
struct CasesResponse {
    #[serde(default)]
    cases: Vec<Ticket>,
}

#[derive(Debug, Deserialize)]
struct TicketResponse {
    ticket: Ticket,
}

/// Body for `POST /knowledge` when an approved resolution is promoted into
/// the knowledge base.
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeEntry {
    pub ticket_id: String,
    pub issue_summary: String,
    pub resolution: String,
    pub category: String,
    pub product: String,
    pub root_cause: String,
    pub tags: String,
}

#[derive(Debug, Deserialize)]
pub struct KnowledgeResponse {
    #[serde(default)]
    pub success: bool,
}

impl TriageApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Submits parsed records for AI triage. The caller is expected to send
    /// only the valid subset; the backend assigns ticket ids and generates
    /// resolutions.
    pub async fn upload_tickets(
        &self,
        session: &Session,
        records: &[TicketRecord],
    ) -> Result<UploadResponse> {
        let request = UploadRequest {
            tickets: records.iter().map(TicketPayload::from).collect(),
            submitted_by: &session.user_id,
        };
        tracing::debug!("Uploading {} tickets to backend", request.tickets.len());

        let response = self
            .client
            .post(self.url("/tickets/upload"))
            .bearer_auth(&session.token)
            .json(&request)
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn pending_tickets(
        &self,
        session: &Session,
        agent_id: Option<&str>,
    ) -> Result<Vec<Ticket>> {
        self.list_tickets(session, "/tickets/pending", agent_id).await
    }

    pub async fn resolved_tickets(
        &self,
        session: &Session,
        agent_id: Option<&str>,
    ) -> Result<Vec<Ticket>> {
        self.list_tickets(session, "/tickets/resolved", agent_id).await
    }

    async fn list_tickets(
        &self,
        session: &Session,
        path: &str,
        agent_id: Option<&str>,
    ) -> Result<Vec<Ticket>> {
        let mut request = self.client.get(self.url(path)).bearer_auth(&session.token);
        if let Some(agent) = agent_id {
            request = request.query(&[("agent_id", agent)]);
        }
        let response = request.send().await?;
        Ok(Self::decode::<CasesResponse>(response).await?.cases)
    }

    pub async fn ticket(&self, session: &Session, ticket_id: &str) -> Result<Ticket> {
        let response = self
            .client
            .get(self.url(&format!("/tickets/{}", ticket_id)))
            .bearer_auth(&session.token)
            .send()
            .await?;
        Ok(Self::decode::<TicketResponse>(response).await?.ticket)
    }

    /// Agent review action: approve, reject, or save an edited resolution.
    pub async fn update_status(
        &self,
        session: &Session,
        ticket_id: &str,
        status: TicketStatus,
        edited_resolution: Option<&str>,
    ) -> Result<Ticket> {
        let body = serde_json::json!({
            "status": status,
            "edited_resolution": edited_resolution,
        });
        let response = self
            .client
            .patch(self.url(&format!("/tickets/{}", ticket_id)))
            .bearer_auth(&session.token)
            .json(&body)
            .send()
            .await?;
        Ok(Self::decode::<TicketResponse>(response).await?.ticket)
    }

    pub async fn add_to_knowledge_base(
        &self,
        session: &Session,
        entry: &KnowledgeEntry,
    ) -> Result<KnowledgeResponse> {
        let response = self
            .client
            .post(self.url("/knowledge"))
            .bearer_auth(&session.token)
            .json(entry)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Non-2xx responses become a structured error carrying the status and
    /// the backend's `error`/`detail` message when present.
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| {
                body.get("error")
                    .or_else(|| body.get("detail"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
        Err(TriageError::BackendError {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::TicketField;
    use httpmock::prelude::*;
    use httpmock::Method::PATCH;

    fn session() -> Session {
        Session::new("user-7", "token-abc")
    }

    fn record() -> TicketRecord {
        let cells = [
            "C-1", "Chat", "2024-01-01", "Manager", "Sam", "PropSuite", "Acme", "hello", "Bldg A",
            "Austin", "TX", "Jane", "Tenant", "555-1111",
        ]
        .map(str::to_string);
        TicketRecord::from_cells(1, cells)
    }

    fn ticket_json(id: &str) -> serde_json::Value {
        serde_json::json!({
            "id": 1,
            "ticket_id": id,
            "conversation_id": "C-1",
            "product": "PropSuite",
            "status": "pending",
            "ai_resolution": "Reset the sync flag",
            "relevancy_score": 0.91,
            "tier": "tier1",
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_upload_sends_snake_case_payload_with_auth() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/tickets/upload")
                .header("authorization", "Bearer token-abc")
                .body_contains(r#""submitted_by":"user-7""#)
                .body_contains(r#""conversation_id":"C-1""#)
                .body_contains(r#""agent_name":"Sam""#)
                .body_contains(r#""account_name":"Acme""#)
                .body_contains(r#""contact_phone":"555-1111""#);
            then.status(201).json_body(serde_json::json!({
                "tickets": [ticket_json("CS-1001")],
                "ai_processing": [],
                "total_processed": 1
            }));
        });

        let api = TriageApi::new(server.url("/api"));
        let response = api.upload_tickets(&session(), &[record()]).await.unwrap();

        mock.assert();
        assert_eq!(response.total_processed, 1);
        assert_eq!(response.tickets[0].ticket_id, "CS-1001");
        assert_eq!(response.tickets[0].status, TicketStatus::Pending);
    }

    #[tokio::test]
    async fn test_payload_covers_all_fourteen_fields() {
        let record = record();
        let payload = TicketPayload::from(&record);
        let value = serde_json::to_value(&payload).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), TicketField::COUNT);
        assert_eq!(object["created_date"], "2024-01-01");
        assert_eq!(object["property_state"], "TX");
        assert_eq!(object["contact_role"], "Tenant");
    }

    #[tokio::test]
    async fn test_pending_tickets_filters_by_agent() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/tickets/pending")
                .query_param("agent_id", "agent1");
            then.status(200)
                .json_body(serde_json::json!({ "cases": [ticket_json("CS-1002")] }));
        });

        let api = TriageApi::new(server.url("/api"));
        let tickets = api
            .pending_tickets(&session(), Some("agent1"))
            .await
            .unwrap();

        mock.assert();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].ticket_id, "CS-1002");
    }

    #[tokio::test]
    async fn test_update_status_patches_edited_resolution() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PATCH)
                .path("/api/tickets/CS-1001")
                .json_body_partial(
                    r#"{"status": "approved", "edited_resolution": "Clear the cache"}"#,
                );
            then.status(200).json_body(serde_json::json!({
                "ticket": {
                    "ticket_id": "CS-1001",
                    "status": "approved",
                    "edited_resolution": "Clear the cache"
                }
            }));
        });

        let api = TriageApi::new(server.url("/api"));
        let ticket = api
            .update_status(
                &session(),
                "CS-1001",
                TicketStatus::Approved,
                Some("Clear the cache"),
            )
            .await
            .unwrap();

        mock.assert();
        assert_eq!(ticket.status, TicketStatus::Approved);
        assert_eq!(ticket.edited_resolution.as_deref(), Some("Clear the cache"));
    }

    #[tokio::test]
    async fn test_backend_error_carries_status_and_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/tickets/upload");
            then.status(401)
                .json_body(serde_json::json!({ "error": "Token expired" }));
        });

        let api = TriageApi::new(server.url("/api"));
        let err = api
            .upload_tickets(&session(), &[record()])
            .await
            .unwrap_err();

        match err {
            TriageError::BackendError { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Token expired");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_add_to_knowledge_base() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/knowledge")
                .json_body_partial(r#"{"ticket_id": "CS-1001", "resolution": "Clear the cache"}"#);
            then.status(201)
                .json_body(serde_json::json!({ "success": true }));
        });

        let api = TriageApi::new(server.url("/api"));
        let entry = KnowledgeEntry {
            ticket_id: "CS-1001".to_string(),
            issue_summary: "Sync failures after upgrade".to_string(),
            resolution: "Clear the cache".to_string(),
            category: "Sync".to_string(),
            product: "PropSuite".to_string(),
            root_cause: "Stale cache".to_string(),
            tags: "PropSuite".to_string(),
        };
        let response = api
            .add_to_knowledge_base(&session(), &entry)
            .await
            .unwrap();

        mock.assert();
        assert!(response.success);
    }
}
