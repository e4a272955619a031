//! Static reference tables: official portals, search anchors, seed feed, alerts.

use crate::approval::{Alert, ApprovedIngredient, Region, Severity};

/// An official regulatory portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Portal {
    pub key: &'static str,
    pub region: Region,
    pub agency: &'static str,
    pub description: &'static str,
    pub url: &'static str,
}

pub const CN_NMPA_COSMETIC: &str = "https://hzpsys.nifdc.org.cn/hzpGS/ysyhzpylml#";
pub const CN_NHC_FOOD: &str =
    "http://www.nhc.gov.cn/sps/s7891/202310/7c4f1c9c0f914b188c6e2646d5f782c5.shtml";
pub const CN_SAMR_HEALTH: &str = "https://www.samr.gov.cn/fgs/index.html";
pub const US_FDA_GRAS: &str = "https://www.cfsanappsexternal.fda.gov/scripts/fdcc/?set=GRASNotices";
pub const US_FDA_NDI: &str =
    "https://www.fda.gov/food/new-dietary-ingredient-ndi-notification-process";
pub const EU_NOVEL_FOOD: &str =
    "https://ec.europa.eu/food/food-feed-portal/screen/novel-food-catalogue/search";
pub const EU_EFSA_OPINIONS: &str = "https://www.efsa.europa.eu/en/publications";

pub const PORTALS: &[Portal] = &[
    Portal {
        key: "CN_NMPA_COSMETIC",
        region: Region::Cn,
        agency: "NMPA",
        description: "Cosmetic new raw material filings",
        url: CN_NMPA_COSMETIC,
    },
    Portal {
        key: "CN_NHC_FOOD",
        region: Region::Cn,
        agency: "NHC",
        description: "New food raw material announcements",
        url: CN_NHC_FOOD,
    },
    Portal {
        key: "CN_SAMR_HEALTH",
        region: Region::Cn,
        agency: "SAMR",
        description: "Health food regulations",
        url: CN_SAMR_HEALTH,
    },
    Portal {
        key: "US_FDA_GRAS",
        region: Region::Us,
        agency: "FDA",
        description: "GRAS notice inventory",
        url: US_FDA_GRAS,
    },
    Portal {
        key: "US_FDA_NDI",
        region: Region::Us,
        agency: "FDA",
        description: "New dietary ingredient notifications",
        url: US_FDA_NDI,
    },
    Portal {
        key: "EU_NOVEL_FOOD",
        region: Region::Eu,
        agency: "EC",
        description: "Novel food catalogue",
        url: EU_NOVEL_FOOD,
    },
    Portal {
        key: "EU_EFSA_OPINIONS",
        region: Region::Eu,
        agency: "EFSA",
        description: "Scientific opinions",
        url: EU_EFSA_OPINIONS,
    },
];

/// Domains the audit prompt restricts retrieval to.
pub const MANDATORY_SITES: &[&str] = &[
    "fda.gov",
    "nifdc.org.cn",
    "nhc.gov.cn",
    "samr.gov.cn",
    "efsa.europa.eu",
    "europa.eu",
];

/// The approvals feed shown before the first successful refresh.
pub fn seed_approvals() -> Vec<ApprovedIngredient> {
    vec![
        seed(
            "ap_2026_01_10",
            "重组人源化胶原蛋白 (Recombinant humanized collagen)",
            None,
            "2026-01-10",
            Region::Cn,
            "NMPA",
            "Cosmetic new raw material",
            "国妆原备字20260002",
            CN_NMPA_COSMETIC,
        ),
        seed(
            "ap_2025_12_15",
            "2'-岩藻糖基乳糖 (2'-FL)",
            Some("41263-94-9"),
            "2025-12-15",
            Region::Cn,
            "NHC",
            "Nutrition fortifier",
            "公告 2025-12 批次",
            CN_NHC_FOOD,
        ),
        seed(
            "ap_2025_11_20",
            "麦角硫因 (L-Ergothioneine)",
            Some("497-30-3"),
            "2025-11-20",
            Region::Us,
            "FDA",
            "GRAS",
            "Blue California GRN 1051",
            US_FDA_GRAS,
        ),
        seed(
            "ap_2025_09_10",
            "Monomethylsilanetriol",
            Some("2445-53-6"),
            "2025-09-10",
            Region::Eu,
            "EFSA",
            "Novel Food",
            "(EU) 2017/2470",
            EU_NOVEL_FOOD,
        ),
        seed(
            "ap_2025_07_15",
            "D-阿洛酮糖 (Psicose)",
            Some("551-68-8"),
            "2025-07-15",
            Region::Cn,
            "NHC",
            "New food raw material",
            "2025年第4号公告",
            CN_NHC_FOOD,
        ),
    ]
}

/// Alerts shown on the dashboard. Curated by hand; the backend does not produce these.
pub fn mock_alerts() -> Vec<Alert> {
    vec![
        Alert {
            id: "al_01".into(),
            date: "2026-01-11".into(),
            region: "CN".into(),
            kind: "Compliance review".into(),
            title: "NHC reiterates L-ergothioneine is not approved for food; oral products under inspection".into(),
            severity: Severity::High,
        },
        Alert {
            id: "al_02".into(),
            date: "2026-01-08".into(),
            region: "US".into(),
            kind: "FDA".into(),
            title: "FDA tightens GRAS review of synthetic-biology derived ingredients".into(),
            severity: Severity::Medium,
        },
    ]
}

#[allow(clippy::too_many_arguments)]
fn seed(
    id: &str,
    name: &str,
    cas: Option<&str>,
    date: &str,
    region: Region,
    agency: &str,
    category: &str,
    regulatory_id: &str,
    url: &str,
) -> ApprovedIngredient {
    ApprovedIngredient {
        id: id.to_string(),
        name: name.to_string(),
        cas: cas.map(str::to_string),
        date: date.to_string(),
        region,
        agency: agency.to_string(),
        category: category.to_string(),
        regulatory_id: regulatory_id.to_string(),
        url: Some(url.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn seed_ids_are_unique() {
        let seeds = seed_approvals();
        let ids: HashSet<&str> = seeds.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids.len(), seeds.len());
    }

    #[test]
    fn seeds_are_newest_first() {
        let seeds = seed_approvals();
        assert!(seeds.windows(2).all(|w| w[0].date >= w[1].date));
    }

    #[test]
    fn every_mandatory_site_backs_a_portal() {
        for site in MANDATORY_SITES {
            assert!(
                PORTALS.iter().any(|p| p.url.contains(site)),
                "no portal under {site}"
            );
        }
    }
}
