//! Monthly revenue and the chart axis derived from it.

use serde::{Deserialize, Serialize};

/// Axis step for the revenue chart, in dollars.
const AXIS_STEP: u64 = 1_000;

/// Revenue total for one month, as stored in the `revenue` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revenue {
    /// Month label, e.g. `Jan`.
    pub month: String,
    /// Revenue total in dollars.
    pub revenue: f64,
}

/// Revenue rows with the y-axis labels used to plot them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueChart {
    /// Rows in stored order.
    pub revenue: Vec<Revenue>,
    /// Labels from the top of the axis down to `$0K`.
    pub y_axis_labels: Vec<String>,
    /// Highest axis value in dollars.
    pub top_label: u64,
}

impl RevenueChart {
    /// Build the chart axis for `revenue`.
    ///
    /// The top of the axis is the highest monthly total rounded up to the next
    /// thousand; labels step down by a thousand to `$0K`.
    pub fn new(revenue: Vec<Revenue>) -> Self {
        let highest = revenue
            .iter()
            .map(|row| row.revenue)
            .filter(|value| value.is_finite())
            .fold(0.0_f64, f64::max);
        let steps = (highest / AXIS_STEP as f64).ceil().max(0.0) as u64;
        let top_label = steps * AXIS_STEP;
        let y_axis_labels = (0..=steps).rev().map(|k| format!("${k}K")).collect();
        Self {
            revenue,
            y_axis_labels,
            top_label,
        }
    }
}
