use metrics::{describe_counter, describe_gauge, gauge};

pub fn component_info_metric(name: &'static str) {
    static NAME: &str = "itscan_component_info";

    describe_gauge!(NAME, "Basic information about the component");

    let git_rev = option_env!("GIT_VERSION").unwrap_or("unknown");
    gauge!(NAME, "component" => name, "git_version" => git_rev).set(1);
}

/// Registers help text for every counter the scan emits.
pub fn describe_scan_metrics() {
    describe_counter!(names::CHANNELS_PROCESSED, "Sensors run through the curve pipeline");
    describe_counter!(names::CHANNELS_EXCLUDED, "Sensors left out of the run");
    describe_counter!(names::PLATEAUS_DETECTED, "Plateaus surviving the merge step");
    describe_counter!(names::POINTS_DROPPED, "Aligned points removed by the curve filter");
    describe_counter!(names::FAILURES, "Failures raised while processing");
}

pub mod names {
    use const_format::concatcp;

    pub const METRIC_NAME_PREFIX: &str = "itscan_";

    pub const CHANNELS_PROCESSED: &str = concatcp!(METRIC_NAME_PREFIX, "channels_processed");
    pub const CHANNELS_EXCLUDED: &str = concatcp!(METRIC_NAME_PREFIX, "channels_excluded");
    pub const PLATEAUS_DETECTED: &str = concatcp!(METRIC_NAME_PREFIX, "plateaus_detected");
    pub const POINTS_DROPPED: &str = concatcp!(METRIC_NAME_PREFIX, "points_dropped");
    pub const FAILURES: &str = concatcp!(METRIC_NAME_PREFIX, "failures");
}

pub mod channels_excluded {
    use serde::Serialize;

    #[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, Serialize, strum::Display)]
    #[serde(rename_all = "snake_case")]
    #[strum(serialize_all = "snake_case")]
    pub enum ExclusionKind {
        DenyListed,
        Failed,
        NoCurrentSeries,
        NoPlateaus,
        Unregistered,
    }

    // Label building function
    pub fn get_label(kind: ExclusionKind) -> (&'static str, &'static str) {
        (
            "reason",
            match kind {
                ExclusionKind::DenyListed => "deny_listed",
                ExclusionKind::Failed => "failed",
                ExclusionKind::NoCurrentSeries => "no_current_series",
                ExclusionKind::NoPlateaus => "no_plateaus",
                ExclusionKind::Unregistered => "unregistered",
            },
        )
    }
}

pub mod points_dropped {
    #[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
    pub enum DropKind {
        Duplicate,
        Leakage,
        Monotonicity,
    }

    // Label building function
    pub fn get_label(kind: DropKind) -> (&'static str, &'static str) {
        (
            "step",
            match kind {
                DropKind::Duplicate => "duplicate",
                DropKind::Leakage => "leakage",
                DropKind::Monotonicity => "monotonicity",
            },
        )
    }
}

pub mod failures {
    #[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
    pub enum FailureKind {
        DecodeFailed,
        FileWriteFailed,
        NoPlateaus,
    }

    // Label building function
    pub fn get_label(failure_kind: FailureKind) -> (&'static str, &'static str) {
        (
            "failure_kind",
            match failure_kind {
                FailureKind::DecodeFailed => "decode_failed",
                FailureKind::FileWriteFailed => "file_write_failed",
                FailureKind::NoPlateaus => "no_plateaus",
            },
        )
    }
}
