use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Raw cell grid produced by the decode step. Row 0 is the header row; a
/// zero-length row marks a blank row in the source sheet.
pub type SheetGrid = Vec<Vec<String>>;

/// Pending tickets older than this are considered SLA-breached.
pub const SLA_BREACH_DAYS: i64 = 3;

/// The fourteen semantic fields every uploaded conversation row must carry.
///
/// Order matches the canonical column order of the upload template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TicketField {
    ConversationId,
    Channel,
    CreatedDate,
    CustomerRole,
    AgentName,
    Product,
    AccountName,
    Transcript,
    PropertyName,
    PropertyCity,
    PropertyState,
    ContactName,
    ContactRole,
    ContactPhone,
}

impl TicketField {
    pub const COUNT: usize = 14;

    pub const ALL: [TicketField; TicketField::COUNT] = [
        TicketField::ConversationId,
        TicketField::Channel,
        TicketField::CreatedDate,
        TicketField::CustomerRole,
        TicketField::AgentName,
        TicketField::Product,
        TicketField::AccountName,
        TicketField::Transcript,
        TicketField::PropertyName,
        TicketField::PropertyCity,
        TicketField::PropertyState,
        TicketField::ContactName,
        TicketField::ContactRole,
        TicketField::ContactPhone,
    ];

    /// Header text expected in the spreadsheet (matched case-insensitively).
    pub fn column_header(self) -> &'static str {
        match self {
            TicketField::ConversationId => "Conversation ID",
            TicketField::Channel => "Channel",
            TicketField::CreatedDate => "Created Date",
            TicketField::CustomerRole => "Customer Role",
            TicketField::AgentName => "Agent Name",
            TicketField::Product => "Product",
            TicketField::AccountName => "Account_Name",
            TicketField::Transcript => "Transcript",
            TicketField::PropertyName => "Property_Name",
            TicketField::PropertyCity => "Property_City",
            TicketField::PropertyState => "Property_State",
            TicketField::ContactName => "Contact_Name",
            TicketField::ContactRole => "Contact_Role",
            TicketField::ContactPhone => "Contact_Phone",
        }
    }

    /// Field name as it appears in the validation report.
    pub fn report_name(self) -> &'static str {
        match self {
            TicketField::ConversationId => "conversationId",
            TicketField::Channel => "channel",
            TicketField::CreatedDate => "createdDate",
            TicketField::CustomerRole => "customerRole",
            TicketField::AgentName => "agentName",
            TicketField::Product => "product",
            TicketField::AccountName => "accountName",
            TicketField::Transcript => "transcript",
            TicketField::PropertyName => "propertyName",
            TicketField::PropertyCity => "propertyCity",
            TicketField::PropertyState => "propertyState",
            TicketField::ContactName => "contactName",
            TicketField::ContactRole => "contactRole",
            TicketField::ContactPhone => "contactPhone",
        }
    }
}

impl std::fmt::Display for TicketField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.report_name())
    }
}

/// One data row of the upload spreadsheet, normalized to the fixed schema.
///
/// `missing_fields` and `is_valid` are derived at construction and always
/// satisfy `is_valid == missing_fields.is_empty()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketRecord {
    /// 1-based data-row position in the source sheet (header row excluded).
    pub row: usize,
    pub conversation_id: String,
    pub channel: String,
    pub created_date: String,
    pub customer_role: String,
    pub agent_name: String,
    pub product: String,
    pub account_name: String,
    pub transcript: String,
    pub property_name: String,
    pub property_city: String,
    pub property_state: String,
    pub contact_name: String,
    pub contact_role: String,
    pub contact_phone: String,
    pub missing_fields: Vec<TicketField>,
    pub is_valid: bool,
}

impl TicketRecord {
    /// Builds a record from extracted cell values, ordered as
    /// [`TicketField::ALL`]. A field is missing iff its value is the empty
    /// string; cell values are never trimmed here.
    pub fn from_cells(row: usize, cells: [String; TicketField::COUNT]) -> Self {
        let [conversation_id, channel, created_date, customer_role, agent_name, product, account_name, transcript, property_name, property_city, property_state, contact_name, contact_role, contact_phone] =
            cells;

        let mut record = Self {
            row,
            conversation_id,
            channel,
            created_date,
            customer_role,
            agent_name,
            product,
            account_name,
            transcript,
            property_name,
            property_city,
            property_state,
            contact_name,
            contact_role,
            contact_phone,
            missing_fields: Vec::new(),
            is_valid: true,
        };
        record.missing_fields = TicketField::ALL
            .iter()
            .copied()
            .filter(|field| record.field(*field).is_empty())
            .collect();
        record.is_valid = record.missing_fields.is_empty();
        record
    }

    pub fn field(&self, field: TicketField) -> &str {
        match field {
            TicketField::ConversationId => &self.conversation_id,
            TicketField::Channel => &self.channel,
            TicketField::CreatedDate => &self.created_date,
            TicketField::CustomerRole => &self.customer_role,
            TicketField::AgentName => &self.agent_name,
            TicketField::Product => &self.product,
            TicketField::AccountName => &self.account_name,
            TicketField::Transcript => &self.transcript,
            TicketField::PropertyName => &self.property_name,
            TicketField::PropertyCity => &self.property_city,
            TicketField::PropertyState => &self.property_state,
            TicketField::ContactName => &self.contact_name,
            TicketField::ContactRole => &self.contact_role,
            TicketField::ContactPhone => &self.contact_phone,
        }
    }
}

/// Outcome of a successful parse: all records in source order plus the
/// valid/invalid partition counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseReport {
    pub records: Vec<TicketRecord>,
    pub total_rows: usize,
    pub valid_rows: usize,
    pub invalid_rows: usize,
}

impl ParseReport {
    pub fn from_records(records: Vec<TicketRecord>) -> Self {
        let total_rows = records.len();
        let valid_rows = records.iter().filter(|r| r.is_valid).count();
        Self {
            invalid_rows: total_rows - valid_rows,
            total_rows,
            valid_rows,
            records,
        }
    }

    pub fn valid(&self) -> impl Iterator<Item = &TicketRecord> {
        self.records.iter().filter(|r| r.is_valid)
    }

    pub fn invalid(&self) -> impl Iterator<Item = &TicketRecord> {
        self.records.iter().filter(|r| !r.is_valid)
    }
}

/// Result of one full pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub report_path: String,
    pub total_rows: usize,
    pub valid_rows: usize,
    pub invalid_rows: usize,
    pub submitted: usize,
    pub ticket_ids: Vec<String>,
}

/// Caller identity for backend calls, passed explicitly instead of read from
/// ambient storage.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub token: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            token: token.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Pending,
    Approved,
    Rejected,
    Edited,
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TicketStatus::Pending => "pending",
            TicketStatus::Approved => "approved",
            TicketStatus::Rejected => "rejected",
            TicketStatus::Edited => "edited",
        };
        f.write_str(s)
    }
}

/// A ticket row as returned by the triage backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Option<i64>,
    #[serde(alias = "ticket_number")]
    pub ticket_id: String,
    pub conversation_id: Option<String>,
    pub channel: Option<String>,
    pub customer_role: Option<String>,
    pub product: Option<String>,
    pub transcript: Option<String>,
    pub first_tier_agent: Option<String>,
    pub status: TicketStatus,
    pub ai_resolution: Option<String>,
    pub edited_resolution: Option<String>,
    pub relevancy_score: Option<f64>,
    pub tier: Option<String>,
    pub assigned_to: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Ticket {
    /// SLA rule: a pending ticket is breached once it is more than
    /// [`SLA_BREACH_DAYS`] old. Resolved tickets never breach.
    pub fn is_sla_breached(&self, now: DateTime<Utc>) -> bool {
        self.status == TicketStatus::Pending
            && self
                .created_at
                .map(|created| now - created > Duration::days(SLA_BREACH_DAYS))
                .unwrap_or(false)
    }
}

pub fn sla_breach_count(tickets: &[Ticket], now: DateTime<Utc>) -> usize {
    tickets.iter().filter(|t| t.is_sla_breached(now)).count()
}
