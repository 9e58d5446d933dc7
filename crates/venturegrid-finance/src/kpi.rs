use crate::time_value::{irr, npv};
use crate::types::{Assumptions, CalculatedKpis, FinancialProjectionsAdjusted, Money};

/// Aggregate adjusted projections into portfolio KPIs using default assumptions.
///
/// Gross profit and EBITDA are straight sums. The quarterly free cash flows
/// feed NPV discounted from period 1, and IRR with a leading zero so the
/// series reads `[0, q1, q2, q3, q4]` from period 0.
pub fn calculate_all_kpis(
    adjusted: &FinancialProjectionsAdjusted,
    initial_investment: Money,
) -> CalculatedKpis {
    calculate_all_kpis_with(adjusted, initial_investment, &Assumptions::default())
}

/// [`calculate_all_kpis`] with explicit discount rate and IRR guess.
pub fn calculate_all_kpis_with(
    adjusted: &FinancialProjectionsAdjusted,
    initial_investment: Money,
    assumptions: &Assumptions,
) -> CalculatedKpis {
    let quarters = adjusted.quarters();
    let gross_profit = quarters.iter().map(|q| q.gross_profit).sum();
    let ebitda = quarters.iter().map(|q| q.ebitda).sum();

    let fcf = adjusted.free_cash_flows();
    let mut irr_series = Vec::with_capacity(fcf.len() + 1);
    irr_series.push(0.0);
    irr_series.extend_from_slice(&fcf);

    CalculatedKpis {
        gross_profit,
        ebitda,
        npv: npv(&fcf, assumptions.discount_rate, initial_investment),
        irr: irr(&irr_series, assumptions.irr_guess),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensitivity::apply_sensitivity;
    use crate::types::{FinancialProjections, QuarterProjection, StartupFinancials};

    fn plan(q1_opex: f64) -> StartupFinancials {
        let q = |revenue, cogs, opex| QuarterProjection {
            revenue,
            cogs,
            opex,
        };
        StartupFinancials {
            financial_projections: FinancialProjections {
                q1: q(0.0, 0.0, q1_opex),
                q2: q(100.0, 30.0, 20.0),
                q3: q(100.0, 30.0, 20.0),
                q4: q(100.0, 30.0, 20.0),
            },
        }
    }

    #[test]
    fn test_sums_across_quarters() {
        let kpis = calculate_all_kpis(&apply_sensitivity(&plan(10.0), 0.0, 0.0), 0.0);
        assert_eq!(kpis.gross_profit, 210.0);
        assert_eq!(kpis.ebitda, 140.0);
    }

    #[test]
    fn test_npv_uses_fcf_from_period_one() {
        let adjusted = apply_sensitivity(&plan(10.0), 0.0, 0.0);
        let kpis = calculate_all_kpis(&adjusted, -25.0);
        let expected = -25.0 - 10.0 / 1.15 + 50.0 / 1.15f64.powi(2)
            + 50.0 / 1.15f64.powi(3)
            + 50.0 / 1.15f64.powi(4);
        assert!((kpis.npv - expected).abs() < 1e-9);
    }

    #[test]
    fn test_irr_uses_leading_zero_series() {
        let adjusted = apply_sensitivity(&plan(100.0), 0.0, 0.0);
        let kpis = calculate_all_kpis(&adjusted, 0.0);
        // [0, -100, 50, 50, 50]: the leading zero does not move the root.
        let direct = irr(&[-100.0, 50.0, 50.0, 50.0], 0.1);
        assert!(kpis.irr.is_finite());
        assert!((kpis.irr - direct).abs() < 1e-6);
        assert!((kpis.irr - 0.2338).abs() < 1e-3);
    }

    #[test]
    fn test_all_positive_fcf_has_no_irr() {
        let adjusted = apply_sensitivity(&plan(0.0), 0.0, 0.0);
        let kpis = calculate_all_kpis(&adjusted, -500.0);
        // The initial investment only reaches NPV, never the IRR series.
        assert!(kpis.irr.is_nan());
        assert!(kpis.npv.is_finite());
    }

    #[test]
    fn test_custom_discount_rate() {
        let adjusted = apply_sensitivity(&plan(10.0), 0.0, 0.0);
        let assumptions = Assumptions {
            discount_rate: 0.0,
            ..Assumptions::default()
        };
        let kpis = calculate_all_kpis_with(&adjusted, 0.0, &assumptions);
        assert_eq!(kpis.npv, 140.0);
    }
}
