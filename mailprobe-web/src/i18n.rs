//! Response language chosen per request from the client's region.

use std::fmt;
use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use mailprobe_toolbox::SpfAnalysis;
use serde::Serialize;

/// 响应语言：目标地区客户端用中文，其余用英文。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    Zh,
    #[default]
    En,
}

impl Lang {
    pub fn for_region(in_target_region: bool) -> Self {
        if in_target_region {
            Self::Zh
        } else {
            Self::En
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Zh => "zh",
            Self::En => "en",
        }
    }

    fn pick(self, zh: &'static str, en: &'static str) -> &'static str {
        match self {
            Self::Zh => zh,
            Self::En => en,
        }
    }

    pub fn missing_target(self) -> &'static str {
        self.pick("缺少目标域名", "Missing target domain")
    }

    pub fn missing_host(self) -> &'static str {
        self.pick("缺少目标主机或域名", "Missing target host or domain")
    }

    /// Include-count and policy notes for an SPF result.
    pub fn spf_issues(self, analysis: &SpfAnalysis) -> Vec<String> {
        match self {
            Self::Zh => vec![
                format!("include 链 {}", analysis.includes),
                format!("策略: {}", analysis.policy),
            ],
            Self::En => analysis.issues(),
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reads the language stored by the client-context middleware; English when absent.
impl FromRequest for Lang {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(req.extensions().get::<Self>().copied().unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use mailprobe_toolbox::SpfPolicy;

    use super::*;

    fn analysis() -> SpfAnalysis {
        SpfAnalysis {
            record: "v=spf1 include:a.com include:b.com -all".to_string(),
            includes: 2,
            policy: SpfPolicy::Fail,
        }
    }

    #[test]
    fn test_for_region() {
        assert_eq!(Lang::for_region(true), Lang::Zh);
        assert_eq!(Lang::for_region(false), Lang::En);
        assert_eq!(Lang::default(), Lang::En);
    }

    #[test]
    fn test_missing_input_messages() {
        assert_eq!(Lang::Zh.missing_target(), "缺少目标域名");
        assert_eq!(Lang::En.missing_target(), "Missing target domain");
        assert_eq!(Lang::Zh.missing_host(), "缺少目标主机或域名");
        assert_eq!(Lang::En.missing_host(), "Missing target host or domain");
    }

    #[test]
    fn test_spf_issues() {
        assert_eq!(
            Lang::Zh.spf_issues(&analysis()),
            ["include 链 2", "策略: -all"]
        );
        assert_eq!(
            Lang::En.spf_issues(&analysis()),
            ["include chain 2", "policy: -all"]
        );
    }
}
