//! 认证授权模块
//!
//! 提供 JWT 认证、密码哈希和角色守卫：
//! - [`JwtService`] - JWT 令牌服务
//! - [`CurrentUser`] - 当前用户上下文
//! - [`require_auth`] - 令牌解析中间件
//! - [`require_admin`] / [`require_kitchen`] / [`require_server`] / [`require_staff`] - 角色守卫

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod permissions;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{
    AuthRejection, require_admin, require_auth, require_kitchen, require_login, require_server,
    require_staff,
};
pub use password::{hash_password, verify_password};
