// crates/psi-eval-core/src/runtime/deriver.rs
// ============================================================================
// Module: Metrics Deriver
// Description: Unit conversion and communication-time models.
// Purpose: Turn raw measurements into the six per-cell metric records.
// Dependencies: crate::core, serde
// ============================================================================

//! ## Overview
//! Bytes become MiB and milliseconds become seconds. Recurrent values are
//! averaged over `m`. Communication time is estimated by a
//! [`CommunicationModel`]; two models exist and they disagree on how setup
//! costs and round trips scale with `m`:
//!
//! - [`AdditiveRttModel`] averages one-time values over `m` as well and
//!   charges `RTT / m` per direction.
//! - [`TcpOverheadConstantModel`] keeps one-time values whole and charges a
//!   flat 4% overhead plus a constant `2 × RTT`.
//!
//! Total time is computation plus communication, per actor. Nothing here
//! rounds.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::DerivedMetrics;
use crate::core::MetricRecord;
use crate::core::NetworkProfile;
use crate::core::RawMeasurements;
use crate::core::Split;
use crate::core::bytes_to_mib;
use crate::core::millis_to_seconds;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Payload multiplier applied by [`TcpOverheadConstantModel`].
pub const TCP_OVERHEAD_FACTOR: f64 = 1.04;

// ============================================================================
// SECTION: Models
// ============================================================================

/// Strategy for estimating communication time from communication cost.
pub trait CommunicationModel {
    /// Returns the stable model name.
    fn name(&self) -> &'static str;

    /// Returns true when one-time measurements are averaged over `m` too.
    fn averages_one_time(&self) -> bool;

    /// Estimates per-actor communication time in seconds for `cost` (MiB,
    /// already normalized) over `profile`.
    fn communication_time(
        &self,
        cost: &MetricRecord,
        recurrences: u32,
        profile: NetworkProfile,
    ) -> MetricRecord;
}

/// Per-direction transfers with an RTT amortized over the recurrences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdditiveRttModel;

impl CommunicationModel for AdditiveRttModel {
    fn name(&self) -> &'static str {
        ModelKind::AdditiveRtt.as_str()
    }

    fn averages_one_time(&self) -> bool {
        true
    }

    fn communication_time(
        &self,
        cost: &MetricRecord,
        recurrences: u32,
        profile: NetworkProfile,
    ) -> MetricRecord {
        let rtt = profile.rtt_seconds() / f64::from(recurrences.max(1));
        let setup = profile.transfer_seconds(cost.sender.one_time);
        let sender = profile.transfer_seconds(cost.sender.recurrent) + rtt;
        let receiver = profile.transfer_seconds(cost.receiver.recurrent) + rtt;
        MetricRecord {
            sender: Split::new(setup, sender),
            receiver: Split::recurrent_only(receiver),
            total: Split::new(setup + rtt, sender + receiver),
        }
    }
}

/// Whole-payload transfers with a fixed overhead and a constant round trip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TcpOverheadConstantModel;

impl TcpOverheadConstantModel {
    /// Time to move `payload_mib` including overhead and a full round trip.
    fn transfer(payload_mib: f64, profile: NetworkProfile) -> f64 {
        profile.transfer_seconds(payload_mib * TCP_OVERHEAD_FACTOR) + 2.0 * profile.rtt_seconds()
    }

    /// Time for one direction: overhead plus a single RTT.
    fn direction(payload_mib: f64, profile: NetworkProfile) -> f64 {
        profile.transfer_seconds(payload_mib * TCP_OVERHEAD_FACTOR) + profile.rtt_seconds()
    }
}

impl CommunicationModel for TcpOverheadConstantModel {
    fn name(&self) -> &'static str {
        ModelKind::TcpOverheadConstant.as_str()
    }

    fn averages_one_time(&self) -> bool {
        false
    }

    fn communication_time(
        &self,
        cost: &MetricRecord,
        _recurrences: u32,
        profile: NetworkProfile,
    ) -> MetricRecord {
        let setup = Self::transfer(cost.sender.one_time, profile);
        MetricRecord {
            sender: Split::new(setup, Self::direction(cost.sender.recurrent, profile)),
            receiver: Split::recurrent_only(Self::direction(cost.receiver.recurrent, profile)),
            total: Split::new(setup, Self::transfer(cost.total.recurrent, profile)),
        }
    }
}

// ============================================================================
// SECTION: Model Selection
// ============================================================================

/// Named selector for the built-in communication models.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// [`AdditiveRttModel`].
    #[default]
    AdditiveRtt,
    /// [`TcpOverheadConstantModel`].
    TcpOverheadConstant,
}

impl ModelKind {
    /// Both models.
    pub const ALL: [Self; 2] = [Self::AdditiveRtt, Self::TcpOverheadConstant];

    /// Returns the stable model name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AdditiveRtt => "additive_rtt",
            Self::TcpOverheadConstant => "tcp_overhead_constant",
        }
    }

    /// Parses a stable model name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Returns the model implementation.
    #[must_use]
    pub fn model(self) -> &'static dyn CommunicationModel {
        match self {
            Self::AdditiveRtt => &AdditiveRttModel,
            Self::TcpOverheadConstant => &TcpOverheadConstantModel,
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Deriver
// ============================================================================

/// Derives [`DerivedMetrics`] from [`RawMeasurements`] with a chosen model.
#[derive(Clone, Copy)]
pub struct MetricsDeriver<'a> {
    /// Communication model in use.
    model: &'a dyn CommunicationModel,
}

impl fmt::Debug for MetricsDeriver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsDeriver").field("model", &self.model.name()).finish()
    }
}

impl MetricsDeriver<'static> {
    /// Creates a deriver for a built-in model.
    #[must_use]
    pub fn for_kind(kind: ModelKind) -> Self {
        Self::new(kind.model())
    }
}

impl<'a> MetricsDeriver<'a> {
    /// Creates a deriver for any model.
    #[must_use]
    pub fn new(model: &'a dyn CommunicationModel) -> Self {
        Self {
            model,
        }
    }

    /// Returns the model name.
    #[must_use]
    pub fn model_name(&self) -> &'static str {
        self.model.name()
    }

    /// Derives all six metric records for one cell.
    #[must_use]
    pub fn derive(&self, raw: &RawMeasurements) -> DerivedMetrics {
        let m = f64::from(raw.recurrences.max(1));
        let setup_divisor = if self.model.averages_one_time() { m } else { 1.0 };

        let comp_time = actor_record(
            millis_to_seconds(raw.runtime.sender_one_time_ms) / setup_divisor,
            millis_to_seconds(raw.runtime.sender_recurrent_ms) / m,
            millis_to_seconds(raw.runtime.receiver_recurrent_ms) / m,
        );
        let comm_cost = actor_record(
            bytes_to_mib(raw.manifest.sender_one_time) / setup_divisor,
            bytes_to_mib(raw.manifest.sender_recurrent) / m,
            bytes_to_mib(raw.manifest.receiver_recurrent) / m,
        );
        let comm_time_10g =
            self.model.communication_time(&comm_cost, raw.recurrences, NetworkProfile::TEN_GBPS);
        let comm_time_100m =
            self.model.communication_time(&comm_cost, raw.recurrences, NetworkProfile::HUNDRED_MBPS);

        DerivedMetrics {
            comp_time,
            comm_cost,
            comm_time_10g,
            comm_time_100m,
            total_time_10g: comp_time.plus(comm_time_10g),
            total_time_100m: comp_time.plus(comm_time_100m),
        }
    }
}

/// Builds a record where only the sender has a one-time part and the total
/// is the actor sum.
fn actor_record(sender_one_time: f64, sender_recurrent: f64, receiver_recurrent: f64) -> MetricRecord {
    let sender = Split::new(sender_one_time, sender_recurrent);
    let receiver = Split::recurrent_only(receiver_recurrent);
    MetricRecord {
        sender,
        receiver,
        total: sender.plus(receiver),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
