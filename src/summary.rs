//! Headline figures for a parsed flight
//!
//! The summary grades GPS and battery state on the same scale an analyst would use when
//! reading the anomaly report, and records whether the numbers come from real telemetry.

use crate::analysis::stats;
use crate::types::{DataSource, TelemetryTable};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Fix quality graded from mean HDop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GpsQuality {
    Excellent,
    Good,
    Fair,
    Poor,
    Unknown,
}

impl GpsQuality {
    pub fn from_mean_hdop(mean_hdop: Option<f64>) -> Self {
        match mean_hdop {
            None => GpsQuality::Unknown,
            Some(h) if h < 1.5 => GpsQuality::Excellent,
            Some(h) if h < 2.0 => GpsQuality::Good,
            Some(h) if h < 3.0 => GpsQuality::Fair,
            Some(_) => GpsQuality::Poor,
        }
    }
}

/// Pack health graded from minimum voltage (3S LiPo)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BatteryHealth {
    Excellent,
    Good,
    Fair,
    Critical,
    Unknown,
}

impl BatteryHealth {
    pub fn from_min_voltage(min_voltage: Option<f64>) -> Self {
        match min_voltage {
            None => BatteryHealth::Unknown,
            Some(v) if v > 12.0 => BatteryHealth::Excellent,
            Some(v) if v > 11.5 => BatteryHealth::Good,
            Some(v) if v > 11.1 => BatteryHealth::Fair,
            Some(_) => BatteryHealth::Critical,
        }
    }
}

/// Density of the recovered data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DataQuality {
    High,
    Medium,
    Basic,
}

impl DataQuality {
    pub fn from_row_count(rows: usize) -> Self {
        if rows > 1000 {
            DataQuality::High
        } else if rows > 100 {
            DataQuality::Medium
        } else {
            DataQuality::Basic
        }
    }
}

macro_rules! impl_display_debug {
    ($($t:ty),*) => {
        $(impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(self, f)
            }
        })*
    };
}

impl_display_debug!(GpsQuality, BatteryHealth, DataQuality);

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlightSummary {
    pub flight_duration_sec: Option<f64>,
    pub flight_duration_min: Option<f64>,
    pub max_altitude_m: Option<f64>,
    pub min_altitude_m: Option<f64>,
    pub altitude_range_m: Option<f64>,
    pub gps_quality: GpsQuality,
    pub battery_health: BatteryHealth,
    pub total_data_points: usize,
    pub available_sensors: Vec<String>,
    pub data_quality: DataQuality,
    pub source: DataSource,
}

impl FlightSummary {
    pub fn from_table(table: &TelemetryTable) -> Self {
        let time_us = table.numeric_column("TimeUS");
        let alt = table.numeric_column("Alt");
        let volt = table.numeric_column("Volt");

        let duration_sec = stats::max(&time_us).map(|t| t / 1e6);
        let max_alt = stats::max(&alt);
        let min_alt = stats::min(&alt);

        Self {
            flight_duration_sec: duration_sec,
            flight_duration_min: duration_sec.map(|d| (d / 60.0 * 10.0).round() / 10.0),
            max_altitude_m: max_alt,
            min_altitude_m: min_alt,
            altitude_range_m: max_alt.zip(min_alt).map(|(hi, lo)| hi - lo),
            gps_quality: GpsQuality::from_mean_hdop(stats::mean(&table.numeric_column("HDop"))),
            battery_health: BatteryHealth::from_min_voltage(stats::min(&volt)),
            total_data_points: table.len(),
            available_sensors: table.column_names().to_vec(),
            data_quality: DataQuality::from_row_count(table.len()),
            source: table.source(),
        }
    }
}
