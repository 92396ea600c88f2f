use std::collections::HashMap;

/// Lowercase + trim. Pure and total; never fails.
#[inline]
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Curated lookup tables used by the fuzzy-match primitives.
///
/// These are heuristics for recall, not authoritative vocabularies or
/// geodata. They are injected rather than inlined so deployments can extend
/// them without touching the matching logic.
#[derive(Debug, Clone)]
pub struct CompatTables {
    /// Canonical key -> concrete material phrases that belong together.
    pub synonyms: HashMap<String, Vec<String>>,
    /// Region anchor city -> neighboring city/region phrases.
    pub regions: HashMap<String, Vec<String>>,
    /// Material -> materials a processing line can usually substitute.
    /// Drives the 75-point tier of the gated blend scorer.
    pub affinity: HashMap<String, Vec<String>>,
}

impl Default for CompatTables {
    fn default() -> Self {
        fn table(entries: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
            entries
                .iter()
                .map(|(k, v)| {
                    (
                        k.to_string(),
                        v.iter().map(|s| s.to_string()).collect(),
                    )
                })
                .collect()
        }

        Self {
            synonyms: table(&[
                ("steel", &["steel slag", "metal shavings"]),
                ("textile", &["cotton waste", "textile offcuts"]),
                ("pharma", &["chemical effluents", "organic waste"]),
                ("electronics", &["e-waste", "battery scrap"]),
                ("plastic", &["plastic scrap"]),
                ("ceramic", &["ceramic waste"]),
            ]),
            regions: table(&[
                ("mumbai", &["pune", "thane", "navi mumbai"]),
                ("bangalore", &["bengaluru", "mysore"]),
                ("delhi", &["noida", "gurgaon", "gurugram", "faridabad"]),
                ("chennai", &["tamil nadu"]),
                ("hyderabad", &["secunderabad"]),
                ("surat", &["gujarat"]),
                ("ahmedabad", &["gujarat"]),
                ("pune", &["mumbai", "maharashtra"]),
                ("coimbatore", &["tamil nadu"]),
                ("jamshedpur", &["jharkhand"]),
                ("raipur", &["chhattisgarh"]),
            ]),
            affinity: table(&[
                ("steel slag", &["metal shavings", "metal scrap", "fly ash"]),
                ("metal shavings", &["steel slag", "metal scrap"]),
                ("metal scrap", &["steel slag", "metal shavings", "aluminum scrap"]),
                ("cotton waste", &["textile offcuts", "textile waste"]),
                ("textile offcuts", &["cotton waste", "textile waste"]),
                ("e-waste (processed)", &["battery scrap"]),
                ("battery scrap", &["e-waste (processed)"]),
                ("fly ash", &["ceramic waste", "concrete waste", "steel slag"]),
                ("ceramic waste", &["fly ash", "concrete waste"]),
                ("plastic scrap", &["rubber scrap"]),
                ("organic waste", &["food waste", "biomass"]),
            ]),
        }
    }
}

/// Substring-based material matching with synonym recall.
///
/// Exact after normalization, containment either direction, or both labels
/// hit phrases under the same synonym key. Boolean only; graded similarity
/// belongs to the scoring layer.
pub fn materials_match(a: &str, b: &str, tables: &CompatTables) -> bool {
    let x = normalize(a);
    let y = normalize(b);
    if x.is_empty() || y.is_empty() {
        return false;
    }
    if x == y || x.contains(&y) || y.contains(&x) {
        return true;
    }
    for phrases in tables.synonyms.values() {
        let hits = |s: &str| {
            phrases
                .iter()
                .any(|p| s.contains(p.as_str()) || p.contains(s))
        };
        if hits(&x) && hits(&y) {
            return true;
        }
    }
    false
}

/// Symmetric quantity tolerance band: true when either side is within
/// [0.5x, 2x] of the other, boundaries inclusive. Intentionally generous;
/// partial fulfillment is assumed negotiable.
pub fn quantity_matches(required: f64, available: f64) -> bool {
    if !required.is_finite() || !available.is_finite() || required <= 0.0 || available <= 0.0 {
        return false;
    }
    if available >= required * 0.5 && available <= required * 2.0 {
        return true;
    }
    required >= available * 0.5 && required <= available * 2.0
}

/// City match: exact after normalization, or both cities resolve into the
/// same region entry (anchor equality or neighbor-phrase containment).
pub fn location_matches(city_a: &str, city_b: &str, tables: &CompatTables) -> bool {
    let a = normalize(city_a);
    let b = normalize(city_b);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }
    for (anchor, neighbors) in &tables.regions {
        let in_region = |s: &str| {
            s == anchor.as_str() || neighbors.iter().any(|c| s.contains(c.as_str()))
        };
        if in_region(&a) && in_region(&b) {
            return true;
        }
    }
    false
}

/// Graded material compatibility for the gated blend scorer:
/// 100 exact, 75 via the curated affinity table, 0 otherwise.
pub fn material_affinity(a: &str, b: &str, tables: &CompatTables) -> u8 {
    let x = normalize(a);
    let y = normalize(b);
    if x.is_empty() || y.is_empty() {
        return 0;
    }
    if x == y {
        return 100;
    }
    let listed = |from: &str, to: &str| {
        tables
            .affinity
            .get(from)
            .map(|l| l.iter().any(|m| m == to))
            .unwrap_or(false)
    };
    if listed(&x, &y) || listed(&y, &x) {
        75
    } else {
        0
    }
}
