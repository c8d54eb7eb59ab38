// timesheet-backend/src/domain/employee_model.rs

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, DbErr, Set};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// 自動生成される従業員コードの接頭辞
pub const GENERATED_CODE_PREFIX: &str = "EMP-";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub employee_code: String,

    pub first_name: String,

    pub last_name: String,

    #[sea_orm(unique, nullable)]
    pub email: Option<String>,

    pub is_active: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::time_entry_model::Entity")]
    TimeEntries,

    #[sea_orm(has_many = "super::employee_service_model::Entity")]
    EmployeeServices,

    #[sea_orm(has_many = "super::employee_subsidiary_model::Entity")]
    EmployeeSubsidiaries,

    #[sea_orm(has_one = "super::user_model::Entity")]
    User,
}

impl Related<super::time_entry_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TimeEntries.def()
    }
}

impl Related<super::employee_service_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmployeeServices.def()
    }
}

impl Related<super::employee_subsidiary_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmployeeSubsidiaries.def()
    }
}

impl Related<super::user_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            id: Set(Uuid::new_v4()),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            ..ActiveModelTrait::default()
        }
    }

    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if !insert {
            self.updated_at = Set(Utc::now());
        }
        Ok(self)
    }
}

impl Model {
    /// "姓 名" 形式の表示名
    pub fn full_name(&self) -> String {
        format!("{} {}", self.last_name, self.first_name)
            .trim()
            .to_string()
    }
}

/// 生成コードの16進桁数。衝突したら2桁ずつ伸ばす（列幅30に収まる範囲）
const GENERATED_CODE_MIN_DIGITS: usize = 6;
const GENERATED_CODE_MAX_DIGITS: usize = 26;

/// ユーザーIDから従業員コードを導出する（"EMP-" + SHA-256 先頭6桁の16進大文字）
pub fn generated_code_for_user(user_id: Uuid) -> String {
    generated_code_with_digits(user_id, GENERATED_CODE_MIN_DIGITS)
}

/// 短い順の候補コード。先頭は generated_code_for_user と同じ
pub fn generated_code_candidates(user_id: Uuid) -> impl Iterator<Item = String> {
    (GENERATED_CODE_MIN_DIGITS..=GENERATED_CODE_MAX_DIGITS)
        .step_by(2)
        .map(move |digits| generated_code_with_digits(user_id, digits))
}

fn generated_code_with_digits(user_id: Uuid, digits: usize) -> String {
    let digest = Sha256::digest(user_id.to_string().as_bytes());
    let hex = hex::encode_upper(digest);
    format!("{}{}", GENERATED_CODE_PREFIX, &hex[..digits])
}
