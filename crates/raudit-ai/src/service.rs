//! The boundary the presentation layer calls: one backend round trip per operation.

use raudit_core::{ApprovedIngredient, IngredientQuery, IngredientResult, ValidationError};
use tracing::info;

use crate::approvals::{approvals_from_outcome, build_approvals_request};
use crate::backend::GenerativeBackend;
use crate::config::ServiceConfig;
use crate::normalize::normalize_outcome;
use crate::query::build_audit_request;

/// Audit and approvals operations over an injected backend.
///
/// Holds no per-request state; concurrent calls are independent.
pub struct AuditService<B> {
    backend: B,
    config: ServiceConfig,
}

impl<B: GenerativeBackend> AuditService<B> {
    pub fn new(backend: B, config: ServiceConfig) -> Self {
        Self { backend, config }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Audit an ingredient by name.
    ///
    /// Blank names are rejected without contacting the backend. Any other
    /// failure is folded into the returned result's summary.
    pub async fn search(&self, ingredient: &str) -> Result<IngredientResult, ValidationError> {
        let query = IngredientQuery::parse(ingredient)?;
        Ok(self.audit(&query).await)
    }

    /// Audit an already-validated query.
    pub async fn audit(&self, query: &IngredientQuery) -> IngredientResult {
        let request = build_audit_request(query, &self.config.audit);
        info!(
            ingredient = %query,
            model = %request.model,
            grounding = request.grounding,
            "dispatching audit"
        );
        let outcome = self.backend.generate(&request).await;
        let result = normalize_outcome(outcome, query.as_str());
        info!(
            ingredient = %query,
            records = result.details.len(),
            citations = result.grounding_sources.len(),
            "audit complete"
        );
        result
    }

    /// Fetch the latest approvals. Empty on any failure.
    pub async fn refresh_approvals(&self) -> Vec<ApprovedIngredient> {
        let request = build_approvals_request(&self.config.approvals);
        info!(model = %request.model, "refreshing approvals");
        let approvals = approvals_from_outcome(self.backend.generate(&request).await);
        info!(count = approvals.len(), "approvals refresh complete");
        approvals
    }
}
