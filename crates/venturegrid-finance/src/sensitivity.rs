use crate::types::{
    AdjustedQuarter, FinancialProjectionsAdjusted, Percent, QuarterProjection, Rate,
    StartupFinancials,
};

/// Flat corporate tax rate applied to EBITDA.
pub const TAX_RATE: Rate = 0.25;

/// Shift revenue and cost of goods sold by whole-number percentages and
/// derive each quarter's profit figures.
///
/// `revenue_pct = 10` means revenue is 110% of plan. Opex is not shifted.
pub fn apply_sensitivity(
    financials: &StartupFinancials,
    revenue_pct: Percent,
    cost_pct: Percent,
) -> FinancialProjectionsAdjusted {
    apply_sensitivity_with(financials, revenue_pct, cost_pct, TAX_RATE)
}

/// [`apply_sensitivity`] with an explicit tax rate.
pub fn apply_sensitivity_with(
    financials: &StartupFinancials,
    revenue_pct: Percent,
    cost_pct: Percent,
    tax_rate: Rate,
) -> FinancialProjectionsAdjusted {
    let p = &financials.financial_projections;
    let adjust = |q: &QuarterProjection| adjust_quarter(q, revenue_pct, cost_pct, tax_rate);
    FinancialProjectionsAdjusted {
        q1: adjust(&p.q1),
        q2: adjust(&p.q2),
        q3: adjust(&p.q3),
        q4: adjust(&p.q4),
    }
}

fn adjust_quarter(
    q: &QuarterProjection,
    revenue_pct: Percent,
    cost_pct: Percent,
    tax_rate: Rate,
) -> AdjustedQuarter {
    let adjusted_revenue = q.revenue * (1.0 + revenue_pct / 100.0);
    let adjusted_cogs = q.cogs * (1.0 + cost_pct / 100.0);
    let gross_profit = adjusted_revenue - adjusted_cogs;
    let ebitda = gross_profit - q.opex;

    AdjustedQuarter {
        revenue: q.revenue,
        cogs: q.cogs,
        opex: q.opex,
        adjusted_revenue,
        adjusted_cogs,
        gross_profit,
        ebitda,
        net_income: ebitda * (1.0 - tax_rate),
        // Simplified proxy: ignores tax on purpose.
        free_cash_flow: adjusted_revenue - adjusted_cogs - q.opex,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FinancialProjections;
    use pretty_assertions::assert_eq;

    fn quarter(revenue: f64, cogs: f64, opex: f64) -> QuarterProjection {
        QuarterProjection {
            revenue,
            cogs,
            opex,
        }
    }

    fn plan() -> StartupFinancials {
        StartupFinancials {
            financial_projections: FinancialProjections {
                q1: quarter(100.0, 40.0, 10.0),
                q2: quarter(200.0, 80.0, 20.0),
                q3: quarter(0.0, 0.0, 50.0),
                q4: quarter(400.0, 100.0, 40.0),
            },
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_revenue_shift_on_q1() {
        let adjusted = apply_sensitivity(&plan(), 10.0, 0.0);
        let q1 = adjusted.q1;
        assert!(close(q1.adjusted_revenue, 110.0));
        assert_eq!(q1.adjusted_cogs, 40.0);
        assert!(close(q1.gross_profit, 70.0));
        assert!(close(q1.ebitda, 60.0));
        assert!(close(q1.net_income, 45.0));
        assert!(close(q1.free_cash_flow, 70.0));
        assert_eq!((q1.revenue, q1.cogs, q1.opex), (100.0, 40.0, 10.0));
    }

    #[test]
    fn test_zero_shift_is_plan() {
        let adjusted = apply_sensitivity(&plan(), 0.0, 0.0);
        assert_eq!(
            adjusted.q2,
            AdjustedQuarter {
                revenue: 200.0,
                cogs: 80.0,
                opex: 20.0,
                adjusted_revenue: 200.0,
                adjusted_cogs: 80.0,
                gross_profit: 120.0,
                ebitda: 100.0,
                net_income: 75.0,
                free_cash_flow: 100.0,
            }
        );
    }

    #[test]
    fn test_cost_shift_and_negative_quarter() {
        let adjusted = apply_sensitivity(&plan(), -50.0, 20.0);
        assert!(close(adjusted.q4.adjusted_revenue, 200.0));
        assert!(close(adjusted.q4.adjusted_cogs, 120.0));
        assert!(close(adjusted.q4.ebitda, 40.0));
        assert!(close(adjusted.q3.ebitda, -50.0));
        assert!(close(adjusted.q3.net_income, -37.5));
        assert!(close(adjusted.q3.free_cash_flow, -50.0));
    }

    #[test]
    fn test_custom_tax_rate_only_touches_net_income() {
        let base = apply_sensitivity(&plan(), 5.0, 5.0);
        let taxed = apply_sensitivity_with(&plan(), 5.0, 5.0, 0.5);
        assert!(close(taxed.q1.net_income, base.q1.ebitda * 0.5));
        assert_eq!(taxed.q1.free_cash_flow, base.q1.free_cash_flow);
        assert_eq!(taxed.q1.ebitda, base.q1.ebitda);
    }
}
