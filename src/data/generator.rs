//! Synthetic monthly data generation
//!
//! Produces a seeded, fully deterministic series in which revenue is driven by
//! attendance volume and ticket, satisfaction, handling time and recurrence,
//! with a calendar-month seasonal offset and a linear growth term. Loss ratios
//! are drawn around a budget and cost is back-computed from them.

use super::{MonthlyRecord, MonthlyTable};
use crate::config::GeneratorConfig;
use crate::error::{Result, RevenueError};
use chrono::{Datelike, Months, NaiveDate};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal, Uniform};
use std::f64::consts::PI;
use tracing::debug;

/// Additive revenue offset per calendar month (January first)
pub const SEASONAL_REVENUE_OFFSET: [f64; 12] = [
    -25_000.0, -20_000.0, 0.0, 10_000.0, 15_000.0, 20_000.0, 25_000.0, 20_000.0, 10_000.0,
    5_000.0, -10_000.0, -15_000.0,
];

/// Share of months that receive an extra loss-ratio shock
const OUTLIER_SHARE: f64 = 0.15;

/// Seeded generator of [`MonthlyTable`]s
#[derive(Debug, Clone)]
pub struct SyntheticGenerator {
    config: GeneratorConfig,
}

impl SyntheticGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate the table; identical configs give bit-identical tables
    pub fn generate(&self) -> Result<MonthlyTable> {
        self.config.validate()?;
        let n = self.config.months;
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);

        let dates = month_axis(self.config.start, n)?;
        let months: Vec<u32> = dates.iter().map(|d| d.month()).collect();
        let t: Vec<f64> = (1..=n).map(|i| i as f64).collect();

        // Operational drivers
        let attendance_noise = draw_normal(&mut rng, 0.0, 50.0, n)?;
        let attendance: Vec<u32> = (0..n)
            .map(|i| {
                let seasonal = 1.0 + 0.3 * ((months[i] as f64 - 1.0) * (2.0 * PI / 12.0)).sin();
                let raw = 800.0 + t[i] * 5.0 + seasonal * 150.0 + attendance_noise[i];
                raw.round().clamp(500.0, 1500.0) as u32
            })
            .collect();

        let pct_with_parts: Vec<f64> = draw_normal(&mut rng, 45.0, 5.0, n)?
            .into_iter()
            .map(|v| v.clamp(30.0, 65.0))
            .collect();
        let handling_hours: Vec<f64> = draw_normal(&mut rng, 2.5, 0.4, n)?
            .into_iter()
            .map(|v| v.clamp(1.5, 4.5))
            .collect();
        let recurrence_rate: Vec<f64> = draw_normal(&mut rng, 8.0, 2.0, n)?
            .into_iter()
            .map(|v| v.clamp(3.0, 15.0))
            .collect();

        let ticket_noise = draw_normal(&mut rng, 0.0, 50.0, n)?;
        let average_ticket: Vec<f64> = (0..n)
            .map(|i| (450.0 + t[i] * 3.0 + ticket_noise[i]).clamp(300.0, 700.0))
            .collect();

        // Satisfaction drives revenue before it is published as NPS
        let nps_noise = draw_normal(&mut rng, 0.0, 2.0, n)?;
        let nps: Vec<f64> = (0..n)
            .map(|i| {
                (75.0 - (handling_hours[i] - 2.5) * 5.0 - recurrence_rate[i] * 0.8 + nps_noise[i])
                    .clamp(55.0, 90.0)
            })
            .collect();

        let revenue_noise = draw_normal(&mut rng, 1.0, 0.02, n)?;
        let revenue: Vec<f64> = (0..n)
            .map(|i| {
                let mut value = attendance[i] as f64 * average_ticket[i];
                value += pct_with_parts[i] * 1_800.0;
                value += nps[i] * 850.0;
                value -= handling_hours[i] * 15_000.0;
                value -= recurrence_rate[i] * 3_500.0;
                value += SEASONAL_REVENUE_OFFSET[(months[i] - 1) as usize];
                value += t[i] * 1_200.0;
                (value * revenue_noise[i]).clamp(350_000.0, 1_100_000.0)
            })
            .collect();

        // Loss ratios
        let budgeted_loss_ratio: Vec<f64> = draw_normal(&mut rng, 50.0, 1.5, n)?
            .into_iter()
            .map(|v| v.clamp(47.0, 53.0))
            .collect();
        let deviation = draw_normal(&mut rng, 0.0, 3.0, n)?;
        let mut realized_loss_ratio: Vec<f64> = budgeted_loss_ratio
            .iter()
            .zip(&deviation)
            .map(|(b, d)| b + d)
            .collect();

        let n_outliers = (n as f64 * OUTLIER_SHARE) as usize;
        if n_outliers > 0 {
            let shock = Uniform::new(-4.0, 7.0);
            let picked = rand::seq::index::sample(&mut rng, n, n_outliers).into_vec();
            for idx in picked {
                realized_loss_ratio[idx] += shock.sample(&mut rng);
            }
        }
        for value in realized_loss_ratio.iter_mut() {
            *value = value.clamp(42.0, 65.0);
        }

        let cost: Vec<f64> = revenue
            .iter()
            .zip(&realized_loss_ratio)
            .map(|(r, lr)| r * lr / 100.0)
            .collect();

        // External factors
        let interest_noise = draw_normal(&mut rng, 0.0, 0.3, n)?;
        let interest_rate: Vec<f64> = (0..n)
            .map(|i| 11.5 + (t[i] / 8.0).sin() * 2.0 + interest_noise[i])
            .collect();
        let accident_noise = draw_normal(&mut rng, 0.0, 5.0, n)?;
        let accident_index: Vec<f64> = (0..n)
            .map(|i| {
                100.0
                    + 15.0 * ((months[i] as f64 - 6.0) * (2.0 * PI / 12.0)).sin()
                    + accident_noise[i]
            })
            .collect();

        let prev_revenue = lag_with_mean_fill(&revenue);
        let prev_loss_ratio = lag_with_mean_fill(&realized_loss_ratio);
        let prev_budgeted_loss_ratio = lag_with_mean_fill(&budgeted_loss_ratio);

        let records = (0..n)
            .map(|i| MonthlyRecord {
                date: dates[i],
                month: months[i],
                quarter: (months[i] - 1) / 3 + 1,
                month_index: (i + 1) as u32,
                attendance: attendance[i],
                average_ticket: average_ticket[i],
                pct_with_parts: pct_with_parts[i],
                handling_hours: handling_hours[i],
                recurrence_rate: recurrence_rate[i],
                revenue: revenue[i],
                cost: cost[i],
                budgeted_loss_ratio: budgeted_loss_ratio[i],
                realized_loss_ratio: realized_loss_ratio[i],
                interest_rate: interest_rate[i],
                accident_index: accident_index[i],
                nps: nps[i],
                prev_revenue: prev_revenue[i],
                prev_loss_ratio: prev_loss_ratio[i],
                prev_budgeted_loss_ratio: prev_budgeted_loss_ratio[i],
            })
            .collect();

        debug!(months = n, seed = self.config.seed, "generated synthetic table");
        MonthlyTable::new(records)
    }
}

/// Generate `months` rows with the default seed and anchor date
pub fn generate(months: usize) -> Result<MonthlyTable> {
    SyntheticGenerator::new(GeneratorConfig::new(months)).generate()
}

fn month_axis(start: NaiveDate, n: usize) -> Result<Vec<NaiveDate>> {
    let anchor = start.with_day(1).unwrap_or(start);
    (0..n)
        .map(|i| {
            anchor.checked_add_months(Months::new(i as u32)).ok_or_else(|| {
                RevenueError::ConfigError(format!("date axis overflows after {} months", i))
            })
        })
        .collect()
}

fn draw_normal(rng: &mut ChaCha8Rng, mean: f64, std_dev: f64, n: usize) -> Result<Vec<f64>> {
    let dist = Normal::new(mean, std_dev)
        .map_err(|e| RevenueError::ConfigError(format!("invalid normal({mean}, {std_dev}): {e}")))?;
    Ok((0..n).map(|_| dist.sample(&mut *rng)).collect())
}

/// Shift by one month; the first slot takes the series mean
pub(crate) fn lag_with_mean_fill(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    std::iter::once(mean)
        .chain(values[..values.len() - 1].iter().copied())
        .collect()
}
