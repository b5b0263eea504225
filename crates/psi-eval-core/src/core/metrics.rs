// crates/psi-eval-core/src/core/metrics.rs
// ============================================================================
// Module: Derived Metrics
// Description: Unit-normalized, network-aware metrics for one grid cell.
// Purpose: Provide the record shapes shared by the deriver, store, and reports.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every grid cell yields one [`DerivedMetrics`] value holding six
//! [`MetricRecord`]s. Each record splits the cost per actor (sender, receiver,
//! total) into a one-time and a recurrent part. Values are stored unrounded;
//! rounding only happens when a report is rendered.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Units
// ============================================================================

/// Bytes per MiB.
pub const BYTES_PER_MIB: f64 = 1_048_576.0;
/// Milliseconds per second.
pub const MILLIS_PER_SECOND: f64 = 1_000.0;

/// Converts a byte count to MiB.
#[must_use]
#[allow(clippy::cast_precision_loss, reason = "Artifact sizes stay far below 2^53 bytes.")]
pub fn bytes_to_mib(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MIB
}

/// Converts milliseconds to seconds.
#[must_use]
pub fn millis_to_seconds(millis: f64) -> f64 {
    millis / MILLIS_PER_SECOND
}

// ============================================================================
// SECTION: Network Profiles
// ============================================================================

/// A fixed network link used to estimate communication time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetworkProfile {
    /// Link bandwidth in megabits per second.
    pub bandwidth_mbps: f64,
    /// Round-trip time in milliseconds.
    pub rtt_ms: f64,
}

impl NetworkProfile {
    /// 10 Gbps link with a 0.2 ms round trip.
    pub const TEN_GBPS: Self = Self {
        bandwidth_mbps: 10_000.0,
        rtt_ms: 0.2,
    };
    /// 100 Mbps link with an 80 ms round trip.
    pub const HUNDRED_MBPS: Self = Self {
        bandwidth_mbps: 100.0,
        rtt_ms: 80.0,
    };

    /// Returns the payload throughput in MiB per second.
    ///
    /// Megabits are divided by eight without a decimal-to-binary correction,
    /// matching how the reported figures have always been computed.
    #[must_use]
    pub fn throughput_mib_per_second(&self) -> f64 {
        self.bandwidth_mbps / 8.0
    }

    /// Returns the round-trip time in seconds.
    #[must_use]
    pub fn rtt_seconds(&self) -> f64 {
        millis_to_seconds(self.rtt_ms)
    }

    /// Returns the time to push `payload_mib` through the link, in seconds.
    #[must_use]
    pub fn transfer_seconds(&self, payload_mib: f64) -> f64 {
        payload_mib / self.throughput_mib_per_second()
    }
}

// ============================================================================
// SECTION: Records
// ============================================================================

/// A cost split into its one-time and recurrent parts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Split {
    /// Cost paid once per setup.
    pub one_time: f64,
    /// Average cost per intersection.
    pub recurrent: f64,
}

impl Split {
    /// Creates a split.
    #[must_use]
    pub const fn new(one_time: f64, recurrent: f64) -> Self {
        Self {
            one_time,
            recurrent,
        }
    }

    /// Creates a split with no one-time part.
    #[must_use]
    pub const fn recurrent_only(recurrent: f64) -> Self {
        Self::new(0.0, recurrent)
    }

    /// Returns the component-wise sum of two splits.
    #[must_use]
    pub fn plus(self, other: Self) -> Self {
        Self::new(self.one_time + other.one_time, self.recurrent + other.recurrent)
    }
}

/// Per-actor costs for one metric category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Sender-side cost.
    pub sender: Split,
    /// Receiver-side cost. The one-time part is always zero.
    pub receiver: Split,
    /// Combined cost.
    pub total: Split,
}

impl MetricRecord {
    /// Returns the actor-wise sum of two records.
    #[must_use]
    pub fn plus(self, other: Self) -> Self {
        Self {
            sender: self.sender.plus(other.sender),
            receiver: self.receiver.plus(other.receiver),
            total: self.total.plus(other.total),
        }
    }

    /// Returns the split for an actor.
    #[must_use]
    pub const fn actor(&self, actor: Actor) -> Split {
        match actor {
            Actor::Sender => self.sender,
            Actor::Receiver => self.receiver,
            Actor::Total => self.total,
        }
    }
}

/// Row selector within a [`MetricRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// The set owner that answers intersections.
    Sender,
    /// The querying party.
    Receiver,
    /// Both parties combined.
    Total,
}

impl Actor {
    /// All actors in summary order.
    pub const ALL: [Self; 3] = [Self::Sender, Self::Receiver, Self::Total];

    /// Returns the row label used in text summaries.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sender => "Sender",
            Self::Receiver => "Receiver",
            Self::Total => "Total",
        }
    }
}

// ============================================================================
// SECTION: Categories
// ============================================================================

/// The six metric categories reported per cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricCategory {
    /// Computation time in seconds.
    CompTime,
    /// Communication volume in MiB.
    CommCost,
    /// Communication time over 10 Gbps, in seconds.
    CommTime10g,
    /// Communication time over 100 Mbps, in seconds.
    CommTime100m,
    /// Computation plus communication over 10 Gbps, in seconds.
    TotalTime10g,
    /// Computation plus communication over 100 Mbps, in seconds.
    TotalTime100m,
}

impl MetricCategory {
    /// All categories in summary order.
    pub const ALL: [Self; 6] = [
        Self::CompTime,
        Self::CommCost,
        Self::CommTime10g,
        Self::CommTime100m,
        Self::TotalTime10g,
        Self::TotalTime100m,
    ];

    /// Returns the stable key for the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CompTime => "comp_time",
            Self::CommCost => "comm_cost",
            Self::CommTime10g => "comm_time_10g",
            Self::CommTime100m => "comm_time_100m",
            Self::TotalTime10g => "total_time_10g",
            Self::TotalTime100m => "total_time_100m",
        }
    }

    /// Returns the heading used in text summaries.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::CompTime => "Computation time (s)",
            Self::CommCost => "Communication cost (MiB)",
            Self::CommTime10g => "Communication time for 10 Gbps network (s)",
            Self::CommTime100m => "Communication time for 100 Mbps network (s)",
            Self::TotalTime10g => "Total time for 10 Gbps network (s)",
            Self::TotalTime100m => "Total time for 100 Mbps network (s)",
        }
    }
}

impl fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All metrics derived for one grid cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// Computation time (s).
    pub comp_time: MetricRecord,
    /// Communication cost (MiB).
    pub comm_cost: MetricRecord,
    /// Communication time over 10 Gbps (s).
    pub comm_time_10g: MetricRecord,
    /// Communication time over 100 Mbps (s).
    pub comm_time_100m: MetricRecord,
    /// Total time over 10 Gbps (s).
    pub total_time_10g: MetricRecord,
    /// Total time over 100 Mbps (s).
    pub total_time_100m: MetricRecord,
}

impl DerivedMetrics {
    /// Returns the record for a category.
    #[must_use]
    pub const fn get(&self, category: MetricCategory) -> &MetricRecord {
        match category {
            MetricCategory::CompTime => &self.comp_time,
            MetricCategory::CommCost => &self.comm_cost,
            MetricCategory::CommTime10g => &self.comm_time_10g,
            MetricCategory::CommTime100m => &self.comm_time_100m,
            MetricCategory::TotalTime10g => &self.total_time_10g,
            MetricCategory::TotalTime100m => &self.total_time_100m,
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
