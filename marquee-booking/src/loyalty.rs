/// Points earned for a paid amount at a given earn rate, rounded down.
/// Business policy: fractional points are never awarded.
pub fn points_earned(total_price_amount: i64, points_per_unit: f64) -> i64 {
    if total_price_amount <= 0 || points_per_unit <= 0.0 {
        return 0;
    }
    (total_price_amount as f64 * points_per_unit).floor() as i64
}
