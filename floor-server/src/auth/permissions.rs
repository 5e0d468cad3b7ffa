//! 角色分组
//!
//! 路由守卫按角色集合放行，admin 出现在每个集合中。

use shared::models::UserRole;

/// 管理后台: 菜单、桌台、用户管理，统计
pub const ADMIN_ROLES: &[UserRole] = &[UserRole::Admin];

/// 厨房: 明细出餐状态
pub const KITCHEN_ROLES: &[UserRole] = &[UserRole::Kitchen, UserRole::Admin];

/// 服务员: 收款
pub const SERVER_ROLES: &[UserRole] = &[UserRole::Server, UserRole::Admin];

/// 所有员工: 订单列表、状态修改、分配服务员
pub const STAFF_ROLES: &[UserRole] = &[
    UserRole::Admin,
    UserRole::Staff,
    UserRole::Server,
    UserRole::Kitchen,
];

/// 任意已登录用户
pub const ANY_ROLE: &[UserRole] = STAFF_ROLES;
