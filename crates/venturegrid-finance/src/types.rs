use serde::{Deserialize, Serialize};

/// Monetary amounts.
pub type Money = f64;

/// Rates expressed as decimals (0.15 = 15%).
pub type Rate = f64;

/// Sensitivity shifts expressed as whole percents (10 = +10%).
pub type Percent = f64;

/// Caller-supplied figures for one quarter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QuarterProjection {
    pub revenue: Money,
    pub cogs: Money,
    pub opex: Money,
}

/// The four quarterly projections of a startup's financial plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialProjections {
    pub q1: QuarterProjection,
    pub q2: QuarterProjection,
    pub q3: QuarterProjection,
    pub q4: QuarterProjection,
}

impl FinancialProjections {
    pub fn quarters(&self) -> [&QuarterProjection; 4] {
        [&self.q1, &self.q2, &self.q3, &self.q4]
    }
}

/// A startup's financial record as supplied by the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StartupFinancials {
    pub financial_projections: FinancialProjections,
}

/// One quarter after sensitivity adjustment: the inputs plus engine-derived figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustedQuarter {
    pub revenue: Money,
    pub cogs: Money,
    pub opex: Money,
    pub adjusted_revenue: Money,
    pub adjusted_cogs: Money,
    pub gross_profit: Money,
    pub ebitda: Money,
    pub net_income: Money,
    pub free_cash_flow: Money,
}

/// Adjusted projections, exactly one entry per quarter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialProjectionsAdjusted {
    pub q1: AdjustedQuarter,
    pub q2: AdjustedQuarter,
    pub q3: AdjustedQuarter,
    pub q4: AdjustedQuarter,
}

impl FinancialProjectionsAdjusted {
    pub fn quarters(&self) -> [&AdjustedQuarter; 4] {
        [&self.q1, &self.q2, &self.q3, &self.q4]
    }

    /// Free cash flow per quarter, q1 first.
    pub fn free_cash_flows(&self) -> [Money; 4] {
        self.quarters().map(|q| q.free_cash_flow)
    }
}

/// Portfolio-level figures aggregated over the four quarters.
///
/// `npv` and `irr` are `NaN` when undefined; they serialize as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedKpis {
    pub gross_profit: Money,
    pub ebitda: Money,
    pub npv: Money,
    pub irr: Rate,
}

/// Fixed assumptions behind the calculations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assumptions {
    pub tax_rate: Rate,
    pub discount_rate: Rate,
    pub irr_guess: Rate,
}

impl Default for Assumptions {
    fn default() -> Self {
        Assumptions {
            tax_rate: crate::sensitivity::TAX_RATE,
            discount_rate: crate::time_value::DEFAULT_DISCOUNT_RATE,
            irr_guess: crate::time_value::DEFAULT_IRR_GUESS,
        }
    }
}
