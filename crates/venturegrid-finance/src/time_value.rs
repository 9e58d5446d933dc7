use crate::error::{FinanceError, FinanceResult};
use crate::types::{Money, Rate};

/// Default discount rate (WACC) for NPV.
pub const DEFAULT_DISCOUNT_RATE: Rate = 0.15;

/// Starting estimate for IRR.
pub const DEFAULT_IRR_GUESS: Rate = 0.1;

/// Newton-Raphson step budget for IRR.
pub const MAX_IRR_ITERATIONS: u32 = 1000;

/// Convergence threshold between successive IRR estimates, and the smallest
/// derivative magnitude IRR will divide by.
pub const IRR_TOLERANCE: f64 = 1e-7;

/// Net Present Value of periodic cash flows.
///
/// The first flow is discounted one full period; `initial_investment` is added
/// undiscounted. A negative `initial_investment` models an up-front outlay.
pub fn npv(cash_flows: &[Money], discount_rate: Rate, initial_investment: Money) -> Money {
    let one_plus_r = 1.0 + discount_rate;
    let mut discount = 1.0;
    let mut total = initial_investment;

    for cf in cash_flows {
        discount *= one_plus_r;
        total += cf / discount;
    }

    total
}

/// Internal Rate of Return using Newton-Raphson, or `NaN` when none is found.
///
/// Unlike [`npv`], the first element is period 0 (undiscounted).
pub fn irr(cash_flows: &[Money], guess: Rate) -> Rate {
    match try_irr(cash_flows, guess) {
        Ok(rate) => rate,
        Err(err) => {
            tracing::debug!(error = %err, flows = cash_flows.len(), "IRR undefined");
            f64::NAN
        }
    }
}

/// Internal Rate of Return using Newton-Raphson, keeping the failure reason.
///
/// There is no bracketing fallback: flows with a real IRR can still fail to
/// converge from `guess`.
pub fn try_irr(cash_flows: &[Money], guess: Rate) -> FinanceResult<Rate> {
    newton_irr(cash_flows, guess, MAX_IRR_ITERATIONS)
}

fn newton_irr(cash_flows: &[Money], guess: Rate, max_iterations: u32) -> FinanceResult<Rate> {
    let has_positive = cash_flows.iter().any(|&cf| cf > 0.0);
    let has_negative = cash_flows.iter().any(|&cf| cf < 0.0);
    if !has_positive || !has_negative {
        return Err(FinanceError::NoSignChange);
    }

    let mut rate = guess;

    for i in 0..max_iterations {
        let (npv_val, dnpv) = npv_and_derivative(cash_flows, rate);

        if !dnpv.is_finite() || dnpv.abs() < IRR_TOLERANCE {
            return Err(FinanceError::FlatDerivative { iteration: i });
        }

        let next = rate - npv_val / dnpv;
        if !next.is_finite() {
            return Err(FinanceError::Diverged { iteration: i });
        }

        if (next - rate).abs() < IRR_TOLERANCE {
            return Ok(next);
        }
        rate = next;
    }

    Err(FinanceError::NoConvergence {
        iterations: max_iterations,
        last_rate: rate,
    })
}

/// NPV at `rate` with period-0 indexing, and its derivative with respect to `rate`.
fn npv_and_derivative(cash_flows: &[Money], rate: Rate) -> (f64, f64) {
    let one_plus_r = 1.0 + rate;
    let mut npv_val = 0.0;
    let mut dnpv = 0.0;

    for (t, &cf) in cash_flows.iter().enumerate() {
        let discount = one_plus_r.powi(t as i32);
        npv_val += cf / discount;
        if t > 0 {
            dnpv -= (t as f64) * cf / (discount * one_plus_r);
        }
    }

    (npv_val, dnpv)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period0_npv(cash_flows: &[f64], rate: f64) -> f64 {
        npv_and_derivative(cash_flows, rate).0
    }

    #[test]
    fn test_npv_three_flows_at_ten_percent() {
        let result = npv(&[100.0, 100.0, 100.0], 0.10, 0.0);
        // 100/1.1 + 100/1.21 + 100/1.331
        assert!((result - 248.685).abs() < 0.001);
    }

    #[test]
    fn test_npv_adds_initial_investment_undiscounted() {
        let base = npv(&[50.0, 50.0], DEFAULT_DISCOUNT_RATE, 0.0);
        let with = npv(&[50.0, 50.0], DEFAULT_DISCOUNT_RATE, -80.0);
        assert!((with - (base - 80.0)).abs() < 1e-12);
    }

    #[test]
    fn test_npv_zero_rate_is_sum() {
        assert_eq!(npv(&[-100.0, 50.0, 50.0, 50.0], 0.0, 0.0), 50.0);
    }

    #[test]
    fn test_npv_empty_is_initial_investment() {
        assert_eq!(npv(&[], 0.15, 12.0), 12.0);
    }

    #[test]
    fn test_irr_basic() {
        let cfs = [-1000.0, 400.0, 400.0, 400.0];
        let rate = irr(&cfs, DEFAULT_IRR_GUESS);
        // IRR should be ~9.7%
        assert!((rate - 0.097).abs() < 0.001);
        assert!(period0_npv(&cfs, rate).abs() < 1e-6);
    }

    #[test]
    fn test_irr_single_period_doubling() {
        let rate = irr(&[-100.0, 200.0], DEFAULT_IRR_GUESS);
        assert!((rate - 1.0).abs() < 1e-7);
    }

    #[test]
    fn test_irr_requires_both_signs() {
        assert!(irr(&[5.0, 5.0, 5.0], DEFAULT_IRR_GUESS).is_nan());
        assert!(irr(&[-5.0, -5.0, -5.0], DEFAULT_IRR_GUESS).is_nan());
        assert!(irr(&[], DEFAULT_IRR_GUESS).is_nan());
        assert!(irr(&[0.0, 0.0], DEFAULT_IRR_GUESS).is_nan());
        assert_eq!(try_irr(&[5.0, 5.0, 5.0], 0.1), Err(FinanceError::NoSignChange));
    }

    #[test]
    fn test_irr_flat_derivative() {
        // Only the period-0 flow is non-zero in the derivative's terms.
        assert_eq!(
            try_irr(&[-10.0, 0.0, 0.0], 0.1),
            Err(FinanceError::NoSignChange)
        );
        assert!(matches!(
            try_irr(&[10.0, -1e-12], 0.1),
            Err(FinanceError::FlatDerivative { iteration: 0 })
        ));
    }

    #[test]
    fn test_irr_guess_at_minus_one_diverges() {
        assert!(irr(&[-100.0, 110.0], -1.0).is_nan());
    }

    #[test]
    fn test_irr_budget_exhausted() {
        // One Newton step from 10% moves by about 0.3 points, far above tolerance.
        let flows = [-1000.0, 400.0, 400.0, 400.0];
        match newton_irr(&flows, 0.1, 1) {
            Err(FinanceError::NoConvergence {
                iterations,
                last_rate,
            }) => {
                assert_eq!(iterations, 1);
                assert!(last_rate > 0.09 && last_rate < 0.1, "{}", last_rate);
            }
            other => panic!("expected NoConvergence, got {:?}", other),
        }
        // The same flows settle well inside the real budget.
        assert!((try_irr(&flows, 0.1).unwrap() - 0.0970).abs() < 1e-4);
    }
}
