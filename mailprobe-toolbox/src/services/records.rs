//! 邮件相关 DNS 记录检查: MX, SPF, DKIM, DMARC

use futures::future::join_all;
use log::debug;

use super::resolver::MailResolver;
use crate::error::{ToolboxError, ToolboxResult};
use crate::types::{DkimSelectorResult, MxHost, SpfAnalysis, SpfPolicy};

/// Selector probed when the caller supplies none.
pub const DEFAULT_DKIM_SELECTOR: &str = "default";

const SPF_PREFIX: &str = "v=spf1";

/// MX records exactly as answered; no re-sorting by preference.
pub async fn mx_lookup(resolver: &dyn MailResolver, domain: &str) -> ToolboxResult<Vec<MxHost>> {
    let hosts = resolver.mx(domain).await?;
    debug!("[MX] {domain}: {} host(s)", hosts.len());
    Ok(hosts)
}

/// Locate the SPF record among the TXT records of `domain` and summarise it.
pub async fn spf_check(resolver: &dyn MailResolver, domain: &str) -> ToolboxResult<SpfAnalysis> {
    let records = resolver.txt(domain).await?;
    let record = records
        .iter()
        .find(|txt| txt.starts_with(SPF_PREFIX))
        .ok_or_else(|| ToolboxError::RecordNotFound("SPF record not found".to_string()))?;
    Ok(analyze_spf(record))
}

/// Count `include:` occurrences and pick the `all` qualifier.
///
/// This is a substring scan: `include:` inside a macro or quoted text is
/// counted too.
pub(crate) fn analyze_spf(record: &str) -> SpfAnalysis {
    let includes = record.matches("include:").count();
    let policy = if record.contains("-all") {
        SpfPolicy::Fail
    } else if record.contains("~all") {
        SpfPolicy::SoftFail
    } else {
        SpfPolicy::Neutral
    };
    SpfAnalysis {
        record: record.to_string(),
        includes,
        policy,
    }
}

/// Fetch the DKIM key records of each selector.
///
/// Selectors are queried concurrently; results keep the order of `selectors`
/// and a failing selector only produces its own error entry.
pub async fn dkim_lookup(
    resolver: &dyn MailResolver,
    domain: &str,
    selectors: &[String],
) -> Vec<DkimSelectorResult> {
    let futures = selectors.iter().map(|selector| async move {
        let name = format!("{selector}._domainkey.{domain}");
        match resolver.txt(&name).await {
            Ok(pubkey) => DkimSelectorResult::Found {
                selector: selector.clone(),
                pubkey,
            },
            Err(e) => {
                debug!("[DKIM] {name}: {e}");
                DkimSelectorResult::Failed {
                    selector: selector.clone(),
                    error: e.to_string(),
                }
            }
        }
    });
    join_all(futures).await
}

/// First TXT record at `_dmarc.<domain>`; additional records are ignored.
pub async fn dmarc_lookup(resolver: &dyn MailResolver, domain: &str) -> ToolboxResult<String> {
    let name = format!("_dmarc.{domain}");
    resolver
        .txt(&name)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ToolboxError::RecordNotFound("DMARC record not found".to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::test_support::MockResolver;

    // ==================== analyze_spf tests ====================

    #[test]
    fn test_analyze_spf_counts_includes_and_hard_fail() {
        let spf = analyze_spf("v=spf1 include:a.com include:b.com -all");
        assert_eq!(spf.includes, 2);
        assert_eq!(spf.policy, SpfPolicy::Fail);
    }

    #[test]
    fn test_analyze_spf_soft_fail() {
        let spf = analyze_spf("v=spf1 ip4:192.0.2.0/24 ~all");
        assert_eq!(spf.includes, 0);
        assert_eq!(spf.policy, SpfPolicy::SoftFail);
    }

    #[test]
    fn test_analyze_spf_defaults_to_neutral() {
        assert_eq!(analyze_spf("v=spf1 mx").policy, SpfPolicy::Neutral);
        assert_eq!(analyze_spf("v=spf1 mx ?all").policy, SpfPolicy::Neutral);
    }

    #[test]
    fn test_analyze_spf_hard_fail_wins_over_soft_fail() {
        assert_eq!(analyze_spf("v=spf1 ~all -all").policy, SpfPolicy::Fail);
    }

    // ==================== probe tests ====================

    #[tokio::test]
    async fn test_spf_check_picks_spf_record() {
        let resolver = MockResolver::default()
            .with_txt(
                "example.com",
                &[
                    "google-site-verification=abc",
                    "v=spf1 include:a.com include:b.com -all",
                ],
            );
        let spf = spf_check(&resolver, "example.com").await.unwrap();
        assert_eq!(spf.record, "v=spf1 include:a.com include:b.com -all");
        assert_eq!(spf.includes, 2);
        assert_eq!(spf.policy.as_str(), "-all");
    }

    #[tokio::test]
    async fn test_spf_check_not_found() {
        let resolver = MockResolver::default().with_txt("example.com", &["hello world"]);
        let err = spf_check(&resolver, "example.com").await.unwrap_err();
        assert!(matches!(err, ToolboxError::RecordNotFound(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_spf_check_resolution_failure_passes_through() {
        let resolver = MockResolver::default();
        let err = spf_check(&resolver, "missing.example").await.unwrap_err();
        assert!(matches!(err, ToolboxError::ResolutionError(_)));
    }

    #[tokio::test]
    async fn test_mx_lookup_preserves_answer_order() {
        let resolver = MockResolver::default().with_mx(
            "example.com",
            &[("mx2.example.com", 20), ("mx1.example.com", 10)],
        );
        let hosts = mx_lookup(&resolver, "example.com").await.unwrap();
        let order: Vec<_> = hosts.iter().map(|h| (h.host.as_str(), h.preference)).collect();
        assert_eq!(order, vec![("mx2.example.com", 20), ("mx1.example.com", 10)]);
    }

    #[tokio::test]
    async fn test_dkim_partial_failure() {
        let resolver = MockResolver::default().with_txt(
            "default._domainkey.example.com",
            &["v=DKIM1; k=rsa; p=MIIBIjAN"],
        );
        let selectors = vec!["default".to_string(), "bad".to_string()];
        let results = dkim_lookup(&resolver, "example.com", &selectors).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].selector(), "default");
        assert!(matches!(
            &results[0],
            DkimSelectorResult::Found { pubkey, .. } if pubkey == &vec!["v=DKIM1; k=rsa; p=MIIBIjAN".to_string()]
        ));
        assert_eq!(results[1].selector(), "bad");
        assert!(matches!(&results[1], DkimSelectorResult::Failed { error, .. } if !error.is_empty()));
    }

    #[tokio::test]
    async fn test_dkim_no_selectors() {
        let resolver = MockResolver::default();
        assert!(dkim_lookup(&resolver, "example.com", &[]).await.is_empty());
    }

    #[tokio::test]
    async fn test_dmarc_returns_first_record_only() {
        let resolver = MockResolver::default().with_txt(
            "_dmarc.example.com",
            &["v=DMARC1; p=reject", "v=DMARC1; p=none"],
        );
        let record = dmarc_lookup(&resolver, "example.com").await.unwrap();
        assert_eq!(record, "v=DMARC1; p=reject");
    }

    #[tokio::test]
    async fn test_dmarc_missing() {
        let resolver = MockResolver::default();
        assert!(dmarc_lookup(&resolver, "example.com").await.is_err());
    }
}
