use rand::Rng;

use crate::schema::{BurndownPoint, SprintBurndown};

/// Days charted, inclusive of day 0.
pub const BURNDOWN_DAYS: u32 = 14;

/// Ideal line against a simulated actual burn of one to three points per day.
pub fn simulate_burndown<R: Rng + ?Sized>(
    sprint_id: &str,
    total_points: u32,
    rng: &mut R,
) -> SprintBurndown {
    let total = f64::from(total_points);
    let burndown_data = (0..=BURNDOWN_DAYS)
        .map(|day| {
            let ideal = total * (1.0 - f64::from(day) / f64::from(BURNDOWN_DAYS));
            let burned = day * rng.gen_range(1..=3);
            let actual_remaining = total_points.saturating_sub(burned);
            BurndownPoint {
                day,
                ideal_remaining: (ideal * 10.0).round() / 10.0,
                actual_remaining,
                completed: total_points - actual_remaining,
            }
        })
        .collect();
    SprintBurndown {
        sprint_id: sprint_id.to_string(),
        burndown_data,
    }
}
