//! Static registry of the VELO high-voltage channels.
//!
//! Maps the hardware id reported by the HV archive (`maXX/chXX`) onto the
//! sensor it biases.
use serde::Serialize;
use strum::Display;

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize)]
pub enum SensorType {
    R,
    Phi,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SensorInfo {
    pub hardware_id: &'static str,
    pub label: &'static str,
    pub number: u16,
    /// Position along the beam axis, in mm.
    pub z: f64,
    pub sensor_type: SensorType,
}

const fn sensor(
    hardware_id: &'static str,
    label: &'static str,
    number: u16,
    z: f64,
    sensor_type: SensorType,
) -> SensorInfo {
    SensorInfo {
        hardware_id,
        label,
        number,
        z,
        sensor_type,
    }
}

static SENSORS: &[SensorInfo] = &[
    sensor("ma06/ch00", "PU01_CT", 129, -300.0, SensorType::R),
    sensor("ma06/ch01", "PU02_CB", 131, -220.0, SensorType::R),
    sensor("ma06/ch02", "VL01_CT", 65, -160.0, SensorType::Phi),
    sensor("ma06/ch03", "VL01_CB", 1, -160.0, SensorType::R),
    sensor("ma06/ch04", "VL02_CT", 3, -130.0, SensorType::R),
    sensor("ma06/ch05", "VL02_CB", 67, -130.0, SensorType::Phi),
    sensor("ma06/ch06", "VL03_CT", 69, -100.0, SensorType::Phi),
    sensor("ma06/ch07", "VL03_CB", 5, -100.0, SensorType::R),
    sensor("ma07/ch00", "VL04_CT", 7, 70.0, SensorType::R),
    sensor("ma07/ch01", "VL04_CB", 71, -70.0, SensorType::Phi),
    sensor("ma07/ch02", "VL05_CT", 73, -40.0, SensorType::Phi),
    sensor("ma07/ch03", "VL05_CB", 9, -40.0, SensorType::R),
    sensor("ma07/ch04", "VL06_CT", 11, -10.0, SensorType::R),
    sensor("ma07/ch05", "VL06_CB", 75, -10.0, SensorType::Phi),
    sensor("ma07/ch06", "VL07_CT", 77, 20.0, SensorType::Phi),
    sensor("ma07/ch07", "VL07_CB", 13, 20.0, SensorType::R),
    sensor("ma08/ch00", "VL08_CT", 15, 50.0, SensorType::R),
    sensor("ma08/ch01", "VL08_CB", 79, 50.0, SensorType::Phi),
    sensor("ma08/ch02", "VL09_CT", 81, 80.0, SensorType::Phi),
    sensor("ma08/ch03", "VL09_CB", 17, 80.0, SensorType::R),
    sensor("ma08/ch04", "VL10_CT", 19, 80.0, SensorType::R),
    sensor("ma08/ch05", "VL10_CB", 83, 110.0, SensorType::Phi),
    sensor("ma08/ch06", "VL11_CT", 85, 140.0, SensorType::Phi),
    sensor("ma08/ch07", "VL11_CB", 21, 140.0, SensorType::R),
    sensor("ma09/ch00", "VL12_CT", 23, 170.0, SensorType::R),
    sensor("ma09/ch01", "VL12_CB", 87, 170.0, SensorType::Phi),
    sensor("ma09/ch02", "VL13_CT", 89, 200.0, SensorType::Phi),
    sensor("ma09/ch03", "VL13_CB", 25, 200.0, SensorType::R),
    sensor("ma09/ch04", "VL14_CT", 27, 230.0, SensorType::R),
    sensor("ma09/ch05", "VL14_CB", 91, 230.0, SensorType::Phi),
    sensor("ma09/ch06", "VL15_CT", 93, 260.0, SensorType::Phi),
    sensor("ma09/ch07", "VL15_CB", 29, 260.0, SensorType::R),
    sensor("ma10/ch00", "VL16_CT", 31, 290.0, SensorType::R),
    sensor("ma10/ch01", "VL16_CB", 95, 290.0, SensorType::Phi),
    sensor("ma10/ch02", "VL19_CT", 97, 450.0, SensorType::Phi),
    sensor("ma10/ch03", "VL19_CB", 33, 450.0, SensorType::R),
    sensor("ma10/ch04", "VL22_CT", 35, 600.0, SensorType::R),
    sensor("ma10/ch05", "VL22_CB", 99, 600.0, SensorType::Phi),
    sensor("ma10/ch06", "VL23_CT", 101, 650.0, SensorType::Phi),
    sensor("ma10/ch07", "VL23_CB", 37, 650.0, SensorType::R),
    sensor("ma11/ch00", "VL24_CT", 39, 700.0, SensorType::R),
    sensor("ma11/ch01", "VL24_CB", 103, 700.0, SensorType::Phi),
    sensor("ma11/ch02", "VL25_CT", 105, 750.0, SensorType::Phi),
    sensor("ma11/ch03", "VL25_CB", 41, 750.0, SensorType::R),
    sensor("ma00/ch00", "PU01_AT", 130, -315.0, SensorType::R),
    sensor("ma00/ch01", "PU02_AB", 128, -235.0, SensorType::R),
    sensor("ma00/ch02", "VL01_AT", 64, -175.0, SensorType::Phi),
    sensor("ma00/ch03", "VL01_AB", 0, -175.0, SensorType::R),
    sensor("ma00/ch04", "VL02_AT", 2, -145.0, SensorType::R),
    sensor("ma00/ch05", "VL02_AB", 66, -145.0, SensorType::Phi),
    sensor("ma00/ch06", "VL03_AT", 68, -115.0, SensorType::Phi),
    sensor("ma00/ch07", "VL03_AB", 4, -115.0, SensorType::R),
    sensor("ma01/ch00", "VL04_AT", 6, -85.0, SensorType::R),
    sensor("ma01/ch01", "VL04_AB", 70, -85.0, SensorType::Phi),
    sensor("ma01/ch02", "VL05_AT", 72, -55.0, SensorType::Phi),
    sensor("ma01/ch03", "VL05_AB", 8, -55.0, SensorType::R),
    sensor("ma01/ch04", "VL06_AT", 10, -25.0, SensorType::R),
    sensor("ma01/ch05", "VL06_AB", 74, -25.0, SensorType::Phi),
    sensor("ma01/ch06", "VL07_AT", 76, 5.0, SensorType::Phi),
    sensor("ma01/ch07", "VL07_AB", 12, 5.0, SensorType::R),
    sensor("ma02/ch00", "VL08_AT", 14, 35.0, SensorType::R),
    sensor("ma02/ch01", "VL08_AB", 78, 35.0, SensorType::Phi),
    sensor("ma02/ch02", "VL09_AT", 80, 65.0, SensorType::Phi),
    sensor("ma02/ch03", "VL09_AB", 16, 65.0, SensorType::R),
    sensor("ma02/ch04", "VL10_AT", 18, 95.0, SensorType::R),
    sensor("ma02/ch05", "VL10_AB", 82, 95.0, SensorType::Phi),
    sensor("ma02/ch06", "VL11_AT", 84, 125.0, SensorType::Phi),
    sensor("ma02/ch07", "VL11_AB", 20, 125.0, SensorType::R),
    sensor("ma03/ch00", "VL12_AT", 22, 155.0, SensorType::R),
    sensor("ma03/ch01", "VL12_AB", 86, 155.0, SensorType::Phi),
    sensor("ma03/ch02", "VL13_AT", 88, 185.0, SensorType::Phi),
    sensor("ma03/ch03", "VL13_AB", 24, 185.0, SensorType::R),
    sensor("ma03/ch04", "VL14_AT", 26, 215.0, SensorType::R),
    sensor("ma03/ch05", "VL14_AB", 90, 215.0, SensorType::Phi),
    sensor("ma03/ch06", "VL15_AT", 92, 245.0, SensorType::Phi),
    sensor("ma03/ch07", "VL15_AB", 28, 245.0, SensorType::R),
    sensor("ma04/ch00", "VL16_AT", 30, 275.0, SensorType::R),
    sensor("ma04/ch01", "VL16_AB", 94, 305.0, SensorType::Phi),
    sensor("ma04/ch02", "VL19_AT", 96, 435.0, SensorType::Phi),
    sensor("ma04/ch03", "VL19_AB", 32, 435.0, SensorType::R),
    sensor("ma04/ch04", "VL22_AT", 34, 585.0, SensorType::R),
    sensor("ma04/ch05", "VL22_AB", 98, 585.0, SensorType::Phi),
    sensor("ma04/ch06", "VL23_AT", 100, 635.0, SensorType::Phi),
    sensor("ma04/ch07", "VL23_AB", 36, 635.0, SensorType::R),
    sensor("ma05/ch00", "VL24_AT", 38, 685.0, SensorType::R),
    sensor("ma05/ch01", "VL24_AB", 102, 685.0, SensorType::Phi),
    sensor("ma05/ch02", "VL25_AT", 104, 735.0, SensorType::Phi),
    sensor("ma05/ch03", "VL25_AB", 40, 735.0, SensorType::R),
];

/// All registered channels, in hardware order.
pub fn sensors() -> &'static [SensorInfo] {
    SENSORS
}

/// Looks up the sensor biased by the given hardware channel.
pub fn resolve(hardware_id: &str) -> Option<&'static SensorInfo> {
    SENSORS.iter().find(|s| s.hardware_id == hardware_id)
}

pub fn by_label(label: &str) -> Option<&'static SensorInfo> {
    SENSORS.iter().find(|s| s.label == label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_hardware_id_resolves_uniquely_and_back() {
        let mut labels = HashSet::new();
        let mut ids = HashSet::new();
        for info in sensors() {
            assert!(ids.insert(info.hardware_id));
            assert!(labels.insert(info.label));
            let resolved = resolve(info.hardware_id).unwrap();
            assert_eq!(resolved.label, info.label);
            assert_eq!(by_label(resolved.label).unwrap().hardware_id, info.hardware_id);
        }
        assert_eq!(sensors().len(), 88);
    }

    #[test]
    fn known_channel() {
        let info = resolve("ma06/ch00").unwrap();
        assert_eq!(info.label, "PU01_CT");
        assert_eq!(info.number, 129);
        assert_eq!(info.sensor_type, SensorType::R);
    }

    #[test]
    fn unknown_channel() {
        assert!(resolve("ma99/ch99").is_none());
        assert!(by_label("VL99_CT").is_none());
    }

    #[test]
    fn sensor_types_are_balanced() {
        let phi = sensors()
            .iter()
            .filter(|s| s.sensor_type == SensorType::Phi)
            .count();
        assert_eq!(phi, 42);
    }
}
