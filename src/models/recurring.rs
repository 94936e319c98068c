// src/models/recurring.rs

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecurringKind {
    Invoice,
    Bill,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecurringResult {
    pub kind: RecurringKind,
    pub parent_id: Uuid,
    pub new_id: Uuid,
    pub new_number: String,
    #[schema(value_type = String, format = Date)]
    pub next_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecurringFailure {
    pub kind: RecurringKind,
    pub parent_id: Uuid,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecurringRunReport {
    pub success: bool,
    pub processed: usize,
    pub results: Vec<RecurringResult>,
    pub failures: Vec<RecurringFailure>,
    /// Documentos SENT vencidos marcados como OVERDUE nesta execução
    pub overdue_marked: u64,
    /// Erro da marcação de vencidos; os clones já gerados continuam válidos
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overdue_error: Option<String>,
}
