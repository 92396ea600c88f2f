use crate::models::ImpactEstimate;

/// Linear sustainability proxy derived from quantity alone: 0.5 kg CO2 and
/// 0.3 kWh per kg diverted, rounded to one decimal. An estimate, not a
/// physically modeled guarantee.
pub fn estimate_impact(quantity_kg: f64) -> ImpactEstimate {
    let qty = if quantity_kg.is_finite() && quantity_kg > 0.0 {
        quantity_kg
    } else {
        0.0
    };
    ImpactEstimate {
        co2_saved: round1(qty * 0.5),
        waste_diverted: qty,
        energy_saved: round1(qty * 0.3),
    }
}

#[inline]
fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
