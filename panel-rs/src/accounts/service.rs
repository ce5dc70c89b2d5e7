//! Request orchestration for limit edits

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use super::client::validate_client_limits;
use super::reseller::validate_reseller_limits;
use super::store::AccountStore;
use super::types::{ClientContext, LimitDiff, LimitsForm, Principal, ResellerContext, Role};
use crate::error::{PanelError, Result};
use crate::events::{EventManager, PanelEvent};
use crate::limits::ValidationReport;

/// Result of an edit request
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum EditOutcome {
    /// Changes were written; `changes` may be empty
    Applied { changes: Vec<LimitDiff> },
    /// Nothing was written
    Rejected { report: ValidationReport },
}

impl EditOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, EditOutcome::Applied { .. })
    }
}

/// Loads contexts, validates forms and applies the result
#[derive(Clone)]
pub struct AccountService {
    store: AccountStore,
    events: Arc<EventManager>,
}

impl AccountService {
    pub fn new(store: AccountStore, events: Arc<EventManager>) -> Self {
        Self { store, events }
    }

    pub fn store(&self) -> &AccountStore {
        &self.store
    }

    /// Reseller context as seen by an administrator
    pub async fn reseller_context(&self, principal: &Principal, reseller_id: i64) -> Result<ResellerContext> {
        principal.require(Role::Admin)?;

        let props = self
            .store
            .reseller_props(reseller_id)
            .await?
            .ok_or_else(|| PanelError::BadRequest(format!("Reseller {} does not exist", reseller_id)))?;
        let usage = self.store.reseller_usage(reseller_id).await?;
        let unlimited = self.store.unlimited_services(reseller_id).await?;

        Ok(ResellerContext { props, usage, unlimited })
    }

    /// Client context as seen by the owning reseller
    pub async fn client_context(&self, principal: &Principal, domain_id: i64) -> Result<ClientContext> {
        principal.require(Role::Reseller)?;

        let reseller = self
            .store
            .reseller_props(principal.user_id)
            .await?
            .ok_or_else(|| PanelError::BadRequest(format!("Reseller {} does not exist", principal.user_id)))?;
        let account = self
            .store
            .client_account(domain_id, principal.user_id)
            .await?
            .ok_or_else(|| PanelError::BadRequest(format!("Domain {} does not exist", domain_id)))?;
        let usage = self.store.client_usage(domain_id).await?;
        let mailboxes = self.store.mailbox_count(domain_id).await?;

        Ok(ClientContext {
            account,
            usage,
            reseller,
            mailboxes,
        })
    }

    /// Administrator edits a reseller's limits
    pub async fn edit_reseller_limits(
        &self,
        principal: &Principal,
        reseller_id: i64,
        form: &LimitsForm,
    ) -> Result<EditOutcome> {
        let ctx = self.reseller_context(principal, reseller_id).await?;
        let (report, change) = validate_reseller_limits(&ctx, form);

        if !report.is_valid() {
            debug!(reseller_id, failed = ?report.failed_fields(), "Reseller limits rejected");
            return Ok(EditOutcome::Rejected { report });
        }

        self.events.dispatch(&PanelEvent::BeforeEditUser {
            user_id: reseller_id,
            limits: *change.after(),
        });

        self.store.update_reseller_limits(reseller_id, change.after()).await?;

        self.events.dispatch(&PanelEvent::AfterEditUser {
            user_id: reseller_id,
            limits: *change.after(),
        });

        info!(
            "Reseller {} has been updated by {} ({} limit(s) changed)",
            ctx.props.name,
            principal.username,
            change.diff.len()
        );
        Ok(EditOutcome::Applied { changes: change.diff })
    }

    /// Reseller edits one of its clients
    pub async fn edit_client_limits(
        &self,
        principal: &Principal,
        domain_id: i64,
        form: &LimitsForm,
    ) -> Result<EditOutcome> {
        let ctx = self.client_context(principal, domain_id).await?;
        let (report, change) = validate_client_limits(&ctx, form);

        if !report.is_valid() {
            debug!(domain_id, failed = ?report.failed_fields(), "Client limits rejected");
            return Ok(EditOutcome::Rejected { report });
        }

        self.events.dispatch(&PanelEvent::BeforeEditDomain {
            domain_id,
            domain_name: ctx.account.domain_name.clone(),
        });

        self.store.apply_client_change(&ctx.account, &change).await?;

        self.events.dispatch(&PanelEvent::AfterEditDomain {
            domain_id,
            domain_name: ctx.account.domain_name.clone(),
        });

        if change.needs_reconfiguration() {
            info!("Domain {} scheduled for reconfiguration", ctx.account.domain_name);
        }
        info!(
            "Domain {} has been updated by {}",
            ctx.account.domain_name, principal.username
        );
        Ok(EditOutcome::Applied {
            changes: change.limits.diff,
        })
    }
}
