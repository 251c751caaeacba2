use semdex_core::types::Metric;

/// Map a raw query measure to a bounded relevance score in [0,1].
///
/// Distances shrink toward zero as similarity grows, so `1 / (1 + d)` keeps
/// the user-facing score monotonic with true similarity regardless of the
/// distance scale. Normalized inner products already live in [-1,1] and only
/// need clamping.
pub fn to_score(metric: Metric, raw: f32) -> f32 {
    match metric {
        Metric::SquaredL2 => 1.0 / (1.0 + raw.max(0.0)),
        Metric::NormalizedDot => raw.clamp(0.0, 1.0),
    }
}
