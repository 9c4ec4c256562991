//! Mailprobe JSON API
//!
//! 邮件诊断与 IP 地区判定的 HTTP 接口层。客户端语言按其 IP 所属地区选择，
//! 探测错误原样透传。

pub mod client;
pub mod config;
pub mod dto;
pub mod handlers;
pub mod i18n;
pub mod logging;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::AppConfig;
pub use state::AppState;
