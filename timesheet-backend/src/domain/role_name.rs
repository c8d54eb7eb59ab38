// timesheet-backend/src/domain/role_name.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// システムで扱うロール
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleName {
    Admin,
    Manager,
    Employee,
}

impl RoleName {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ADMIN" => Some(Self::Admin),
            "MANAGER" => Some(Self::Manager),
            "EMPLOYEE" => Some(Self::Employee),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Manager => "MANAGER",
            Self::Employee => "EMPLOYEE",
        }
    }

    /// 権限レベル（数値が大きいほど強い）
    pub fn permission_level(&self) -> u8 {
        match self {
            Self::Admin => 100,
            Self::Manager => 50,
            Self::Employee => 1,
        }
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// ユーザーが保持するロールの集合
///
/// ユーザーは複数ロールを同時に持てる。ADMIN は MANAGER の権限をすべて含む。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoleSet(BTreeSet<RoleName>);

impl RoleSet {
    pub fn new<I: IntoIterator<Item = RoleName>>(roles: I) -> Self {
        Self(roles.into_iter().collect())
    }

    /// DBのロール名一覧から生成する。未知の名前は無視する
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            names
                .into_iter()
                .filter_map(|name| RoleName::from_str(name.as_ref()))
                .collect(),
        )
    }

    pub fn contains(&self, role: RoleName) -> bool {
        self.0.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.contains(RoleName::Admin)
    }

    pub fn is_manager(&self) -> bool {
        self.contains(RoleName::Manager)
    }

    /// 提出済みエントリーを承認・却下できるか
    pub fn can_approve(&self) -> bool {
        self.is_admin() || self.is_manager()
    }

    /// 作成・編集したエントリーが即時承認されるか
    pub fn auto_approves_own_entries(&self) -> bool {
        self.can_approve()
    }

    /// 子会社とサービスの紐付けを変更できるか
    pub fn can_manage_catalog(&self) -> bool {
        self.can_approve()
    }

    /// 最も強いロール
    pub fn highest(&self) -> RoleName {
        self.0
            .iter()
            .copied()
            .max_by_key(RoleName::permission_level)
            .unwrap_or(RoleName::Employee)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.0.iter().map(RoleName::as_str).collect()
    }
}
