//! Terminal cards for audit results, the approvals feed, alerts and portals.
//!
//! Audit records are grouped by region in the order regions first appear;
//! records within a region keep their response order.

use std::io::{self, Write};

use raudit_core::reference::Portal;
use raudit_core::{Alert, ApprovalFeed, IngredientResult, RegionDetail};

const LABEL_WIDTH: usize = 18;

/// Records sharing one region, in response order.
#[derive(Debug)]
pub struct RegionGroup<'a> {
    pub region: &'a str,
    pub details: Vec<&'a RegionDetail>,
}

/// Group records by region, preserving first-appearance order of regions.
pub fn group_by_region(details: &[RegionDetail]) -> Vec<RegionGroup<'_>> {
    let mut groups: Vec<RegionGroup<'_>> = Vec::new();
    for detail in details {
        match groups.iter_mut().find(|g| g.region == detail.region) {
            Some(group) => group.details.push(detail),
            None => groups.push(RegionGroup {
                region: &detail.region,
                details: vec![detail],
            }),
        }
    }
    groups
}

// ── Public API ──

pub fn print_result(result: &IngredientResult) -> io::Result<()> {
    render_result(&mut io::stdout().lock(), result)
}

pub fn print_feed(feed: &ApprovalFeed) -> io::Result<()> {
    render_feed(&mut io::stdout().lock(), feed)
}

pub fn print_alerts(alerts: &[Alert]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    for alert in alerts {
        writeln!(
            out,
            "[{:<6}] {}  {:<4} {}: {}",
            alert.severity.as_str(),
            alert.date,
            alert.region,
            alert.kind,
            alert.title
        )?;
    }
    Ok(())
}

pub fn print_portals(portals: &[Portal]) -> io::Result<()> {
    render_portals(&mut io::stdout().lock(), portals)
}

// ── Rendering ──

fn render_portals(out: &mut impl Write, portals: &[Portal]) -> io::Result<()> {
    for portal in portals {
        writeln!(
            out,
            "{:<18} {:<3} {:<5} {:<40} {}",
            portal.key,
            portal.region.code(),
            portal.agency,
            portal.description,
            portal.url
        )?;
    }
    Ok(())
}

fn render_result(out: &mut impl Write, result: &IngredientResult) -> io::Result<()> {
    match &result.cas {
        Some(cas) => writeln!(out, "=== {} (CAS {}) ===", result.name, cas)?,
        None => writeln!(out, "=== {} ===", result.name)?,
    }
    writeln!(out, "{}", result.summary)?;

    if result.has_details() {
        for group in group_by_region(&result.details) {
            writeln!(out)?;
            let count = group.details.len();
            writeln!(out, "{} ({} record{})", group.region, count, plural(count))?;
            for detail in group.details {
                render_detail(out, detail)?;
            }
        }
    }

    if !result.grounding_sources.is_empty() {
        writeln!(out)?;
        writeln!(out, "Sources")?;
        for link in &result.grounding_sources {
            writeln!(out, "  - {} <{}>", link.title, link.uri)?;
        }
    }
    Ok(())
}

fn render_detail(out: &mut impl Write, detail: &RegionDetail) -> io::Result<()> {
    writeln!(out, "  [{}] {}", detail.status, detail.regulatory_id)?;
    let rows = [
        ("approval date", detail.approval_date.as_str()),
        ("applicant", detail.applicant.as_str()),
        ("dosage form", detail.dosage_form.as_str()),
        ("material source", detail.material_source.as_str()),
        ("limit", detail.usage_limit.as_str()),
        ("notes", detail.notes.as_str()),
    ];
    for (label, value) in rows {
        writeln!(out, "    {:<LABEL_WIDTH$} {}", label, value)?;
    }
    for source in &detail.sources {
        writeln!(out, "    {:<LABEL_WIDTH$} {}", "source", source)?;
    }
    Ok(())
}

fn render_feed(out: &mut impl Write, feed: &ApprovalFeed) -> io::Result<()> {
    match feed.refreshed_at() {
        Some(ts) => writeln!(
            out,
            "Recent approvals (refreshed {})",
            ts.format("%Y-%m-%d %H:%M UTC")
        )?,
        None => writeln!(out, "Recent approvals")?,
    }
    for item in feed.items() {
        writeln!(out)?;
        writeln!(out, "{}  {}  {}", item.region, item.date, item.name)?;
        writeln!(out, "    {} | {} | {}", item.agency, item.category, item.regulatory_id)?;
        if let Some(cas) = &item.cas {
            writeln!(out, "    CAS {cas}")?;
        }
        if let Some(url) = &item.url {
            writeln!(out, "    {url}")?;
        }
    }
    Ok(())
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raudit_core::{ComplianceStatus, GroundingLink};

    fn detail(region: &str, id: &str) -> RegionDetail {
        RegionDetail {
            region: region.into(),
            status: ComplianceStatus::Passed,
            regulatory_id: id.into(),
            approval_date: "N/A".into(),
            applicant: "N/A".into(),
            dosage_form: "N/A".into(),
            material_source: "N/A".into(),
            usage_limit: "N/A".into(),
            notes: "N/A".into(),
            sources: vec![],
        }
    }

    fn render(result: &IngredientResult) -> String {
        let mut buf = Vec::new();
        render_result(&mut buf, result).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn grouping_preserves_order() {
        let details = vec![
            detail("US", "GRN 1051"),
            detail("CN", "A-1"),
            detail("US", "GRN 1100"),
            detail("EU", "(EU) 2017/2470"),
            detail("CN", "A-2"),
        ];
        let groups = group_by_region(&details);
        let regions: Vec<&str> = groups.iter().map(|g| g.region).collect();
        assert_eq!(regions, vec!["US", "CN", "EU"]);
        let us: Vec<&str> = groups[0].details.iter().map(|d| d.regulatory_id.as_str()).collect();
        assert_eq!(us, vec!["GRN 1051", "GRN 1100"]);
        let cn: Vec<&str> = groups[1].details.iter().map(|d| d.regulatory_id.as_str()).collect();
        assert_eq!(cn, vec!["A-1", "A-2"]);
    }

    #[test]
    fn grouping_empty() {
        assert!(group_by_region(&[]).is_empty());
    }

    #[test]
    fn card_shows_groups_and_sources() {
        let result = IngredientResult {
            name: "L-Ergothioneine".into(),
            cas: Some("497-30-3".into()),
            summary: "GRAS in the US.".into(),
            details: vec![detail("US", "GRN 1051"), detail("US", "GRN 1100")],
            grounding_sources: vec![GroundingLink {
                title: "FDA".into(),
                uri: "https://www.fda.gov/".into(),
            }],
        };
        let text = render(&result);
        assert!(text.starts_with("=== L-Ergothioneine (CAS 497-30-3) ==="));
        assert!(text.contains("US (2 records)"));
        assert!(text.contains("[Passed] GRN 1051"));
        assert!(text.contains("  - FDA <https://www.fda.gov/>"));
    }

    #[test]
    fn floor_result_renders_summary_only() {
        let result = IngredientResult::empty("X", "The compliance service could not be reached.");
        let text = render(&result);
        assert_eq!(text, "=== X ===\nThe compliance service could not be reached.\n");
    }

    #[test]
    fn portals_listed_by_key() {
        let mut buf = Vec::new();
        render_portals(&mut buf, raudit_core::reference::PORTALS).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), raudit_core::reference::PORTALS.len());
        let gras = text.lines().find(|l| l.starts_with("US_FDA_GRAS ")).unwrap();
        assert!(gras.contains(raudit_core::reference::US_FDA_GRAS));
    }

    #[test]
    fn feed_lists_items() {
        let mut buf = Vec::new();
        render_feed(&mut buf, &ApprovalFeed::seeded()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("Recent approvals\n"));
        assert!(text.contains("Blue California GRN 1051"));
    }
}
