//! Software catalog operations.

use std::sync::Arc;

use tracing::info;

use accessgate_auth::{AccessPolicy, Action, Identity};
use accessgate_catalog::{NewSoftware, SoftwareEntry};
use accessgate_core::{Clock, DomainError, DomainResult, SoftwareId};

use crate::store::{SoftwareStore, StoreError};

#[derive(Clone)]
pub struct CatalogService {
    software: Arc<dyn SoftwareStore>,
    policy: AccessPolicy,
    clock: Arc<dyn Clock>,
}

impl CatalogService {
    pub fn new(software: Arc<dyn SoftwareStore>, policy: AccessPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            software,
            policy,
            clock,
        }
    }

    /// Register software. Admin only; the caller becomes `created_by`.
    pub async fn create_software(&self, caller: &Identity, input: NewSoftware) -> DomainResult<SoftwareEntry> {
        self.policy.require(caller.role, Action::CreateSoftware)?;

        let entry = input.into_entry(SoftwareId::new(), caller.user_id, self.clock.now())?;

        self.software.insert(entry.clone()).await.map_err(|e| match e {
            StoreError::Duplicate(_) => DomainError::conflict(format!(
                "Software \"{}\" is already registered",
                entry.name
            )),
            other => other.into(),
        })?;

        info!(software_id = %entry.id, name = %entry.name, created_by = %caller.user_id, "software registered");
        Ok(entry)
    }

    /// Lookup without an existence requirement.
    pub async fn find(&self, id: SoftwareId) -> DomainResult<Option<SoftwareEntry>> {
        Ok(self.software.get(id).await?)
    }

    pub async fn get(&self, caller: &Identity, id: SoftwareId) -> DomainResult<SoftwareEntry> {
        self.policy.require(caller.role, Action::ViewSoftware)?;
        self.find(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Software"))
    }

    /// Every entry, name ascending.
    pub async fn list(&self, caller: &Identity) -> DomainResult<Vec<SoftwareEntry>> {
        self.policy.require(caller.role, Action::ViewSoftware)?;
        Ok(self.software.list().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accessgate_auth::Role;
    use accessgate_catalog::AccessLevel;

    use crate::workflow::test_support::harness;

    fn tool(name: &str) -> NewSoftware {
        NewSoftware {
            name: name.to_string(),
            description: "Internal tool".to_string(),
            access_levels: vec![AccessLevel::Read, AccessLevel::Write],
        }
    }

    #[tokio::test]
    async fn admin_registers_software() {
        let h = harness();
        let admin = h.user("root", Role::Admin).await;

        let entry = h.workflow.catalog.create_software(&admin, tool("Tool X")).await.unwrap();

        assert_eq!(entry.created_by, admin.user_id);
        assert_eq!(h.workflow.catalog.get(&admin, entry.id).await.unwrap(), entry);
    }

    #[tokio::test]
    async fn non_admins_are_forbidden_and_nothing_is_stored() {
        let h = harness();
        for (name, role) in [("emp", Role::Employee), ("mgr", Role::Manager)] {
            let caller = h.user(name, role).await;
            let err = h.workflow.catalog.create_software(&caller, tool("Tool X")).await.unwrap_err();
            assert_eq!(err, DomainError::forbidden("Access denied. Required role: Admin"));
        }
        assert_eq!(h.stores.software.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn role_is_checked_before_validation() {
        let h = harness();
        let emp = h.user("emp", Role::Employee).await;
        let err = h
            .workflow
            .catalog
            .create_software(&emp, NewSoftware {
                name: String::new(),
                description: String::new(),
                access_levels: vec![],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn duplicate_name_is_a_conflict() {
        let h = harness();
        let admin = h.user("root", Role::Admin).await;
        h.workflow.catalog.create_software(&admin, tool("Tool X")).await.unwrap();

        let err = h.workflow.catalog.create_software(&admin, tool(" Tool X ")).await.unwrap_err();
        assert_eq!(err, DomainError::conflict("Software \"Tool X\" is already registered"));
    }

    #[tokio::test]
    async fn empty_levels_fail_validation() {
        let h = harness();
        let admin = h.user("root", Role::Admin).await;
        let mut input = tool("Tool X");
        input.access_levels.clear();

        let err = h.workflow.catalog.create_software(&admin, input).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn everyone_can_list_by_name() {
        let h = harness();
        let admin = h.user("root", Role::Admin).await;
        let emp = h.user("emp", Role::Employee).await;
        for name in ["Wiki", "CRM", "Jira"] {
            h.workflow.catalog.create_software(&admin, tool(name)).await.unwrap();
        }

        let names: Vec<_> = h
            .workflow
            .catalog
            .list(&emp)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, ["CRM", "Jira", "Wiki"]);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let h = harness();
        let emp = h.user("emp", Role::Employee).await;
        let err = h.workflow.catalog.get(&emp, SoftwareId::new()).await.unwrap_err();
        assert_eq!(err, DomainError::not_found("Software"));
    }
}
