use super::params::CoolingParameters;

/// Energy and water used by a conventional cooling-tower system over the same horizon
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConventionalBaseline {
    pub energy_kwh: f64,
    pub water_m3: f64,
    /// Running totals per period; empty when no per-period data is known
    pub cumulative_energy_kwh: Vec<f64>,
    pub cumulative_water_m3: Vec<f64>,
}

impl ConventionalBaseline {
    /// Totals only, no per-period trajectory
    pub fn totals(energy_kwh: f64, water_m3: f64) -> Self {
        Self {
            energy_kwh,
            water_m3,
            ..Self::default()
        }
    }

    /// Spread annual totals evenly over `periods`
    pub fn evenly_spread(energy_kwh: f64, water_m3: f64, periods: usize) -> Self {
        let n = periods.max(1) as f64;
        let cumulative = |total: f64| (1..=periods).map(|k| total / n * k as f64).collect();
        Self {
            energy_kwh,
            water_m3,
            cumulative_energy_kwh: cumulative(energy_kwh),
            cumulative_water_m3: cumulative(water_m3),
        }
    }

    /// Build from per-period readings
    pub fn from_periods(energy_kwh: &[f64], water_m3: &[f64]) -> Self {
        let running = |values: &[f64]| {
            values
                .iter()
                .scan(0.0, |acc, v| {
                    *acc += v;
                    Some(*acc)
                })
                .collect::<Vec<f64>>()
        };
        let cumulative_energy_kwh = running(energy_kwh);
        let cumulative_water_m3 = running(water_m3);
        Self {
            energy_kwh: cumulative_energy_kwh.last().copied().unwrap_or(0.0),
            water_m3: cumulative_water_m3.last().copied().unwrap_or(0.0),
            cumulative_energy_kwh,
            cumulative_water_m3,
        }
    }

    pub fn cost(&self, params: &CoolingParameters) -> f64 {
        self.energy_kwh * params.energy_cost + self.water_m3 * params.water_cost
    }

    /// Running operating cost, empty if the per-period trajectory is unknown
    pub fn cumulative_cost(&self, params: &CoolingParameters) -> Vec<f64> {
        self.cumulative_energy_kwh
            .iter()
            .zip(&self.cumulative_water_m3)
            .map(|(energy, water)| energy * params.energy_cost + water * params.water_cost)
            .collect()
    }

    /// First period whose cumulative water reaches `initial_volume`
    ///
    /// The point where the conventional system has used as much water as the
    /// well's initial fill. `None` if it never does within the trajectory.
    pub fn break_even_period(&self, initial_volume: f64) -> Option<usize> {
        self.cumulative_water_m3
            .iter()
            .position(|&water| water >= initial_volume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cooling::params::fixtures::yearly_params;
    use approx::assert_relative_eq;

    #[test]
    fn even_spread_ends_at_totals() {
        let baseline = ConventionalBaseline::evenly_spread(500_000.0, 10_000.0, 12);
        assert_eq!(baseline.cumulative_energy_kwh.len(), 12);
        assert_relative_eq!(baseline.cumulative_water_m3[0], 10_000.0 / 12.0);
        assert_relative_eq!(baseline.cumulative_energy_kwh[11], 500_000.0, max_relative = 1e-12);
    }

    #[test]
    fn annual_cost_uses_request_prices() {
        let baseline = ConventionalBaseline::evenly_spread(500_000.0, 10_000.0, 12);
        let params = yearly_params();
        assert_relative_eq!(baseline.cost(&params), 70_000.0, max_relative = 1e-12);
        let cumulative = baseline.cumulative_cost(&params);
        assert_relative_eq!(cumulative[11], 70_000.0, max_relative = 1e-12);
    }

    #[test]
    fn from_periods_accumulates_readings() {
        let baseline = ConventionalBaseline::from_periods(&[1.0, 2.0, 3.0], &[0.5, 0.5, 1.0]);
        assert_eq!(baseline.cumulative_energy_kwh, vec![1.0, 3.0, 6.0]);
        assert_eq!(baseline.energy_kwh, 6.0);
        assert_eq!(baseline.water_m3, 2.0);
    }

    #[test]
    fn break_even_is_first_period_reaching_initial_fill() {
        let baseline = ConventionalBaseline::from_periods(&[0.0; 4], &[40.0, 40.0, 40.0, 40.0]);
        assert_eq!(baseline.break_even_period(100.0), Some(2));
        assert_eq!(baseline.break_even_period(80.0), Some(1));
        assert_eq!(baseline.break_even_period(0.0), Some(0));
    }

    #[test]
    fn break_even_not_reached_within_horizon() {
        let baseline = ConventionalBaseline::from_periods(&[0.0; 3], &[10.0, 10.0, 10.0]);
        assert_eq!(baseline.break_even_period(100.0), None);
        assert_eq!(ConventionalBaseline::totals(500.0, 500.0).break_even_period(100.0), None);
    }

    #[test]
    fn totals_have_no_trajectory() {
        let baseline = ConventionalBaseline::totals(10.0, 2.0);
        assert!(baseline.cumulative_cost(&yearly_params()).is_empty());
    }
}
