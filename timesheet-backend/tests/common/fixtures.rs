// tests/common/fixtures.rs
//! 組織データの作成ヘルパー

use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use timesheet_backend::api::dto::time_entry_dto::TimeEntryRequest;
use timesheet_backend::domain::actor::Actor;
use timesheet_backend::domain::role_name::RoleName;
use timesheet_backend::domain::{employee_model, service_model, subsidiary_model, user_model};
use timesheet_backend::repository::membership_repository::MembershipRepository;
use timesheet_backend::repository::organization_repository::OrganizationRepository;
use timesheet_backend::repository::user_repository::UserRepository;
use timesheet_backend::service::scope_service::ScopeService;
use uuid::Uuid;

/// ユーザー・従業員・呼び出し元のまとまり
#[derive(Debug, Clone)]
pub struct Member {
    pub user: user_model::Model,
    pub employee: employee_model::Model,
    pub actor: Actor,
}

impl Member {
    pub fn employee_id(&self) -> Uuid {
        self.employee.id
    }
}

/// 子会社2社・サービス2つの標準的な組織
pub struct Org {
    pub alpha: subsidiary_model::Model,
    pub beta: subsidiary_model::Model,
    pub s1: service_model::Model,
    pub s2: service_model::Model,
}

impl Org {
    pub async fn create(db: &DatabaseConnection) -> Self {
        let alpha = create_subsidiary(db, "ALPHA", "Alpha Corp").await;
        let beta = create_subsidiary(db, "BETA", "Beta Inc").await;
        let s1 = create_service(db, "Consulting").await;
        let s2 = create_service(db, "Support").await;

        let organization_repo = OrganizationRepository::new(db.clone());
        for subsidiary in [&alpha, &beta] {
            for service in [&s1, &s2] {
                organization_repo
                    .attach(subsidiary.id, service.id)
                    .await
                    .unwrap();
            }
        }

        Self {
            alpha,
            beta,
            s1,
            s2,
        }
    }
}

pub async fn create_subsidiary(
    db: &DatabaseConnection,
    code: &str,
    name: &str,
) -> subsidiary_model::Model {
    subsidiary_model::ActiveModel {
        code: Set(code.to_string()),
        name: Set(name.to_string()),
        company_id: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn create_service(db: &DatabaseConnection, name: &str) -> service_model::Model {
    service_model::ActiveModel {
        name: Set(name.to_string()),
        description: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

/// 従業員とユーザーを作り、ロールとサービス所属を付与する
pub async fn create_member(
    db: &DatabaseConnection,
    first_name: &str,
    last_name: &str,
    roles: &[RoleName],
    service_ids: &[Uuid],
    subsidiary_id: Option<Uuid>,
) -> Member {
    let email = format!(
        "{}.{}@example.com",
        first_name.to_lowercase(),
        last_name.to_lowercase()
    );
    let short = Uuid::new_v4().simple().to_string();

    let employee = employee_model::ActiveModel {
        employee_code: Set(format!("EMP-{}", &short[..8])),
        first_name: Set(first_name.to_string()),
        last_name: Set(last_name.to_string()),
        email: Set(Some(email.clone())),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();

    let user_repo = UserRepository::new(db.clone());
    let user = user_repo
        .create(
            &email,
            Some(&format!("{} {}", first_name, last_name)),
            Some(employee.id),
        )
        .await
        .unwrap();
    for role in roles {
        user_repo.assign_role(user.id, *role).await.unwrap();
    }

    let membership_repo = MembershipRepository::new(db.clone());
    for (i, service_id) in service_ids.iter().enumerate() {
        membership_repo
            .assign_service(employee.id, *service_id, i == 0)
            .await
            .unwrap();
    }
    if let Some(subsidiary_id) = subsidiary_id {
        membership_repo
            .assign_subsidiary(employee.id, subsidiary_id, true)
            .await
            .unwrap();
    }

    let actor = actor_for(db, user.id).await;
    Member {
        user,
        employee,
        actor,
    }
}

/// 従業員レコードを持たないユーザー
pub async fn create_bare_user(
    db: &DatabaseConnection,
    email: &str,
    roles: &[RoleName],
) -> (user_model::Model, Actor) {
    let user_repo = UserRepository::new(db.clone());
    let user = user_repo.create(email, None, None).await.unwrap();
    for role in roles {
        user_repo.assign_role(user.id, *role).await.unwrap();
    }
    let actor = actor_for(db, user.id).await;
    (user, actor)
}

pub async fn actor_for(db: &DatabaseConnection, user_id: Uuid) -> Actor {
    ScopeService::new(db.clone())
        .resolve_actor(user_id)
        .await
        .unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 分数指定のエントリー入力
pub fn entry_request(
    subsidiary_id: Uuid,
    service_id: Option<Uuid>,
    work_date: NaiveDate,
    minutes: i32,
) -> TimeEntryRequest {
    TimeEntryRequest {
        subsidiary_id,
        service_id,
        work_date,
        hours: None,
        minutes: Some(minutes),
        note: Some("Client workshop".to_string()),
        requester: None,
    }
}
