// timesheet-backend/src/repository/employee_repository.rs

use crate::domain::employee_model::{
    self, generated_code_candidates, ActiveModel as EmployeeActiveModel, Entity as EmployeeEntity,
};
use crate::domain::user_model::{self, Entity as UserEntity};
use crate::types::pagination::page_offset;
use sea_orm::sea_query::Expr;
use sea_orm::{entity::*, query::*, DbConn, DbErr};
use sea_orm::{
    Condition, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::warn;
use uuid::Uuid;

pub struct EmployeeRepository {
    db: DbConn,
}

impl EmployeeRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<employee_model::Model>, DbErr> {
        EmployeeEntity::find_by_id(id).one(&self.db).await
    }

    /// 指定IDの従業員を名前順で取得
    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<employee_model::Model>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        EmployeeEntity::find()
            .filter(employee_model::Column::Id.is_in(ids.to_vec()))
            .order_by_asc(employee_model::Column::LastName)
            .order_by_asc(employee_model::Column::FirstName)
            .all(&self.db)
            .await
    }

    pub async fn find_active_ids(&self) -> Result<Vec<Uuid>, DbErr> {
        EmployeeEntity::find()
            .select_only()
            .column(employee_model::Column::Id)
            .filter(employee_model::Column::IsActive.eq(true))
            .into_tuple::<Uuid>()
            .all(&self.db)
            .await
    }

    pub async fn count_active(&self) -> Result<u64, DbErr> {
        EmployeeEntity::find()
            .filter(employee_model::Column::IsActive.eq(true))
            .count(&self.db)
            .await
    }

    /// 名前・コードで検索し、名前順にページングする
    pub async fn search(
        &self,
        ids: &[Uuid],
        search: Option<&str>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<employee_model::Model>, u64), DbErr> {
        if ids.is_empty() {
            return Ok((Vec::new(), 0));
        }

        let mut query =
            EmployeeEntity::find().filter(employee_model::Column::Id.is_in(ids.to_vec()));

        if let Some(term) = search.map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(employee_model::Column::FirstName.contains(term))
                    .add(employee_model::Column::LastName.contains(term))
                    .add(employee_model::Column::EmployeeCode.contains(term)),
            );
        }

        let total = query.clone().count(&self.db).await?;

        let employees = query
            .order_by_asc(employee_model::Column::LastName)
            .order_by_asc(employee_model::Column::FirstName)
            .offset(page_offset(page, per_page))
            .limit(per_page)
            .all(&self.db)
            .await?;

        Ok((employees, total))
    }

    /// ユーザーに従業員レコードを保証する
    ///
    /// 既に紐付いていればそれを返す。同時に別リクエストが紐付けた場合は先勝ち。
    pub async fn ensure_for_user(
        &self,
        user: &user_model::Model,
    ) -> Result<employee_model::Model, DbErr> {
        let txn = self.db.begin().await?;

        let current = UserEntity::find_by_id(user.id)
            .one(&txn)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("user {}", user.id)))?;

        if let Some(employee_id) = current.employee_id {
            let existing = EmployeeEntity::find_by_id(employee_id).one(&txn).await?;
            txn.commit().await?;
            return existing
                .ok_or_else(|| DbErr::RecordNotFound(format!("employee {}", employee_id)));
        }

        let employee = self.claim_generated_employee(&txn, &current).await?;

        let linked = UserEntity::update_many()
            .col_expr(user_model::Column::EmployeeId, Expr::value(employee.id))
            .col_expr(user_model::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(user_model::Column::Id.eq(user.id))
            .filter(user_model::Column::EmployeeId.is_null())
            .exec(&txn)
            .await?;

        if linked.rows_affected == 0 {
            // 別リクエストが先に紐付けた
            txn.rollback().await?;
            let winner = UserEntity::find_by_id(user.id)
                .one(&self.db)
                .await?
                .and_then(|u| u.employee_id)
                .ok_or_else(|| DbErr::RecordNotFound(format!("employee of user {}", user.id)))?;
            return EmployeeEntity::find_by_id(winner)
                .one(&self.db)
                .await?
                .ok_or_else(|| DbErr::RecordNotFound(format!("employee {}", winner)));
        }

        txn.commit().await?;
        Ok(employee)
    }

    /// 生成コードの従業員を確保する
    ///
    /// 同じコードの従業員が既にあれば、どのユーザーにも紐付いていない場合だけ引き取る。
    /// 他のユーザーのものなら桁数を伸ばした次の候補を試す。
    async fn claim_generated_employee<C: ConnectionTrait>(
        &self,
        conn: &C,
        user: &user_model::Model,
    ) -> Result<employee_model::Model, DbErr> {
        for code in generated_code_candidates(user.id) {
            let existing = EmployeeEntity::find()
                .filter(employee_model::Column::EmployeeCode.eq(code.clone()))
                .one(conn)
                .await?;

            match existing {
                Some(employee) => {
                    let owned = UserEntity::find()
                        .filter(user_model::Column::EmployeeId.eq(employee.id))
                        .count(conn)
                        .await?
                        > 0;
                    if !owned {
                        return Ok(employee);
                    }
                    warn!(
                        user_id = %user.id,
                        employee_code = %code,
                        "Generated employee code already linked, trying a longer one"
                    );
                }
                None => {
                    let email_taken = EmployeeEntity::find()
                        .filter(employee_model::Column::Email.eq(user.email.clone()))
                        .count(conn)
                        .await?
                        > 0;

                    return EmployeeActiveModel {
                        employee_code: Set(code),
                        first_name: Set(user.given_name()),
                        last_name: Set(String::new()),
                        email: Set((!email_taken).then(|| user.email.clone())),
                        ..Default::default()
                    }
                    .insert(conn)
                    .await;
                }
            }
        }

        Err(DbErr::Custom(format!(
            "no free employee code for user {}",
            user.id
        )))
    }
}
