// src/service/organization_service.rs

use crate::api::dto::organization_dto::{
    LinkChangeResponse, ServiceDto, SubsidiaryServicesResponse, SubsidiaryWithServicesDto,
};
use crate::db::DbPool;
use crate::domain::actor::Actor;
use crate::domain::subsidiary_model;
use crate::error::AppResult;
use crate::repository::organization_repository::OrganizationRepository;
use crate::utils::error_helper::{forbidden_error, not_found_error, validation_error};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// 子会社とサービスの紐付け管理
pub struct OrganizationService {
    organization_repo: Arc<OrganizationRepository>,
}

impl OrganizationService {
    pub fn new(db_pool: DbPool) -> Self {
        Self {
            organization_repo: Arc::new(OrganizationRepository::new(db_pool)),
        }
    }

    /// 有効な子会社ごとの有効なサービスと、有効なサービス全体
    pub async fn list(&self, actor: &Actor) -> AppResult<SubsidiaryServicesResponse> {
        ensure_catalog_manager(actor, "organization_service::list")?;

        let subsidiaries = self.organization_repo.active_subsidiaries().await?;
        let services = self.organization_repo.active_services().await?;

        let mut linked: BTreeMap<Uuid, BTreeSet<Uuid>> = BTreeMap::new();
        for link in self.organization_repo.active_links().await? {
            linked
                .entry(link.subsidiary_id)
                .or_default()
                .insert(link.service_id);
        }

        let subsidiaries = subsidiaries
            .into_iter()
            .map(|subsidiary| {
                let own = linked.remove(&subsidiary.id).unwrap_or_default();
                let services = services
                    .iter()
                    .filter(|s| own.contains(&s.id))
                    .cloned()
                    .map(ServiceDto::from)
                    .collect();
                SubsidiaryWithServicesDto::new(subsidiary, services)
            })
            .collect();

        Ok(SubsidiaryServicesResponse {
            subsidiaries,
            services: services.into_iter().map(ServiceDto::from).collect(),
        })
    }

    /// 紐付けを有効にする
    pub async fn attach(
        &self,
        actor: &Actor,
        subsidiary_id: Uuid,
        service_id: Uuid,
    ) -> AppResult<LinkChangeResponse> {
        ensure_catalog_manager(actor, "organization_service::attach")?;
        self.find_subsidiary(subsidiary_id, "organization_service::attach")
            .await?;
        if self.organization_repo.find_service(service_id).await?.is_none() {
            return Err(validation_error("service_id", "Service does not exist"));
        }

        self.organization_repo.attach(subsidiary_id, service_id).await?;
        info!(
            user_id = %actor.user_id,
            subsidiary_id = %subsidiary_id,
            service_id = %service_id,
            "Service attached to subsidiary"
        );
        self.link_state(subsidiary_id).await
    }

    /// 紐付けを無効にする。履歴は残す
    pub async fn detach(
        &self,
        actor: &Actor,
        subsidiary_id: Uuid,
        service_id: Uuid,
    ) -> AppResult<LinkChangeResponse> {
        ensure_catalog_manager(actor, "organization_service::detach")?;
        self.find_subsidiary(subsidiary_id, "organization_service::detach")
            .await?;

        let changed = self.organization_repo.detach(subsidiary_id, service_id).await?;
        info!(
            user_id = %actor.user_id,
            subsidiary_id = %subsidiary_id,
            service_id = %service_id,
            changed,
            "Service detached from subsidiary"
        );
        self.link_state(subsidiary_id).await
    }

    /// 紐付けを指定したサービスだけに揃える
    pub async fn sync(
        &self,
        actor: &Actor,
        subsidiary_id: Uuid,
        service_ids: Vec<Uuid>,
    ) -> AppResult<LinkChangeResponse> {
        ensure_catalog_manager(actor, "organization_service::sync")?;
        self.find_subsidiary(subsidiary_id, "organization_service::sync")
            .await?;

        let requested: BTreeSet<Uuid> = service_ids.into_iter().collect();
        let ids: Vec<Uuid> = requested.iter().copied().collect();
        let found = self.organization_repo.find_services(&ids).await?;
        if found.len() != ids.len() {
            return Err(validation_error(
                "service_ids",
                "One or more services do not exist",
            ));
        }

        self.organization_repo.sync(subsidiary_id, &ids).await?;
        info!(
            user_id = %actor.user_id,
            subsidiary_id = %subsidiary_id,
            services = ids.len(),
            "Subsidiary services synchronized"
        );
        self.link_state(subsidiary_id).await
    }

    async fn find_subsidiary(
        &self,
        subsidiary_id: Uuid,
        context: &str,
    ) -> AppResult<subsidiary_model::Model> {
        self.organization_repo
            .find_subsidiary(subsidiary_id)
            .await?
            .ok_or_else(|| not_found_error("Subsidiary", &subsidiary_id.to_string(), context))
    }

    async fn link_state(&self, subsidiary_id: Uuid) -> AppResult<LinkChangeResponse> {
        let service_ids = self
            .organization_repo
            .active_links()
            .await?
            .into_iter()
            .filter(|link| link.subsidiary_id == subsidiary_id)
            .map(|link| link.service_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Ok(LinkChangeResponse {
            subsidiary_id,
            service_ids,
        })
    }
}

fn ensure_catalog_manager(actor: &Actor, context: &str) -> AppResult<()> {
    if actor.roles.can_manage_catalog() {
        Ok(())
    } else {
        Err(forbidden_error(
            "Only managers and administrators can manage subsidiary services",
            context,
            Some(&actor.user_id.to_string()),
        ))
    }
}
