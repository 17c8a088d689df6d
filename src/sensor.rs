//! Motion sensor access
//!
//! The logger only needs two reads from a sensor: orientation in degrees and
//! raw acceleration in g. [`IioMotionSensor`] provides both for the Sense HAT's
//! LSM9DS1 through the Linux IIO sysfs interface.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{LoggerError, Result};

/// Standard gravity in m/s²
pub const STANDARD_GRAVITY: f64 = 9.80665;

/// IIO device name of the LSM9DS1 accelerometer
pub const ACCEL_DEVICE_NAME: &str = "lsm9ds1_accel";

/// IIO device name of the LSM9DS1 magnetometer
pub const MAGN_DEVICE_NAME: &str = "lsm9ds1_magn";

/// Orientation angles in degrees, each in [0, 360)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Orientation {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

/// Raw linear acceleration in g
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Acceleration {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Source of orientation and acceleration samples
pub trait MotionSensor {
    fn orientation_degrees(&mut self) -> Result<Orientation>;

    fn accelerometer_raw(&mut self) -> Result<Acceleration>;
}

impl<S: MotionSensor + ?Sized> MotionSensor for Box<S> {
    fn orientation_degrees(&mut self) -> Result<Orientation> {
        (**self).orientation_degrees()
    }

    fn accelerometer_raw(&mut self) -> Result<Acceleration> {
        (**self).accelerometer_raw()
    }
}

/// Wrap an angle in degrees into [0, 360)
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Orientation from a gravity vector and a magnetic field vector
///
/// Roll and pitch come from the direction of gravity; yaw is the
/// tilt-compensated magnetic heading. Both vectors are in sensor axes and
/// only their directions matter.
pub fn orientation_from_vectors(accel: [f64; 3], magn: [f64; 3]) -> Orientation {
    let [ax, ay, az] = accel;
    let [mx, my, mz] = magn;

    let roll = ay.atan2(az);
    let pitch = (-ax).atan2((ay * ay + az * az).sqrt());

    let (sin_r, cos_r) = roll.sin_cos();
    let (sin_p, cos_p) = pitch.sin_cos();
    let level_x = mx * cos_p + mz * sin_p;
    let level_y = mx * sin_r * sin_p + my * cos_r - mz * sin_r * cos_p;
    let yaw = (-level_y).atan2(level_x);

    Orientation {
        roll: normalize_degrees(roll.to_degrees()),
        pitch: normalize_degrees(pitch.to_degrees()),
        yaw: normalize_degrees(yaw.to_degrees()),
    }
}

/// One IIO device directory under `/sys/bus/iio/devices`
#[derive(Debug, Clone)]
struct IioDevice {
    dir: PathBuf,
}

impl IioDevice {
    fn read_value(&self, attribute: &str) -> Result<f64> {
        let path = self.dir.join(attribute);
        let text = fs::read_to_string(&path).map_err(|e| {
            LoggerError::Sensor(format!("Failed to read {}: {}", path.display(), e))
        })?;
        text.trim().parse::<f64>().map_err(|e| {
            LoggerError::Sensor(format!(
                "Bad value {:?} in {}: {}",
                text.trim(),
                path.display(),
                e
            ))
        })
    }

    /// Raw x/y/z readings for a channel type such as `accel`
    fn read_axes(&self, channel: &str) -> Result<[f64; 3]> {
        Ok([
            self.read_value(&format!("in_{}_x_raw", channel))?,
            self.read_value(&format!("in_{}_y_raw", channel))?,
            self.read_value(&format!("in_{}_z_raw", channel))?,
        ])
    }
}

/// Find the IIO device whose `name` attribute matches
fn find_iio_device(root: &Path, name: &str) -> Result<IioDevice> {
    let entries = fs::read_dir(root).map_err(|e| {
        LoggerError::Sensor(format!("Failed to list {}: {}", root.display(), e))
    })?;

    for entry in entries {
        let dir = entry?.path();
        match fs::read_to_string(dir.join("name")) {
            Ok(found) if found.trim() == name => return Ok(IioDevice { dir }),
            _ => continue,
        }
    }

    Err(LoggerError::Sensor(format!(
        "No IIO device named '{}' under {}",
        name,
        root.display()
    )))
}

/// Sense HAT accelerometer and magnetometer via IIO sysfs
pub struct IioMotionSensor {
    accel: IioDevice,
    magn: IioDevice,
    accel_scale: f64,
}

impl IioMotionSensor {
    /// Locate the LSM9DS1 devices under an IIO device root
    ///
    /// # Arguments
    /// * `root` - Normally `/sys/bus/iio/devices`
    pub fn find<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        let accel = find_iio_device(root, ACCEL_DEVICE_NAME)?;
        let magn = find_iio_device(root, MAGN_DEVICE_NAME)?;
        // Scale is fixed by the configured full-scale range
        let accel_scale = accel.read_value("in_accel_scale")?;

        log::debug!(
            "Using accelerometer at {} (scale {} m/s² per LSB), magnetometer at {}",
            accel.dir.display(),
            accel_scale,
            magn.dir.display()
        );

        Ok(Self {
            accel,
            magn,
            accel_scale,
        })
    }

    fn accel_g(&self) -> Result<[f64; 3]> {
        let raw = self.accel.read_axes("accel")?;
        Ok(raw.map(|v| v * self.accel_scale / STANDARD_GRAVITY))
    }
}

impl MotionSensor for IioMotionSensor {
    fn orientation_degrees(&mut self) -> Result<Orientation> {
        let accel = self.accel_g()?;
        let magn = self.magn.read_axes("magn")?;
        Ok(orientation_from_vectors(accel, magn))
    }

    fn accelerometer_raw(&mut self) -> Result<Acceleration> {
        let [x, y, z] = self.accel_g()?;
        Ok(Acceleration { x, y, z })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPS,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    fn write_device(root: &Path, dir: &str, attrs: &[(&str, &str)]) {
        let dir = root.join(dir);
        fs::create_dir_all(&dir).unwrap();
        for (name, value) in attrs {
            fs::write(dir.join(name), format!("{}\n", value)).unwrap();
        }
    }

    fn fake_sense_hat(root: &Path, accel: [&str; 3], magn: [&str; 3]) {
        write_device(root, "iio:device0", &[("name", "hts221")]);
        write_device(
            root,
            "iio:device1",
            &[
                ("name", ACCEL_DEVICE_NAME),
                ("in_accel_scale", "0.009806650"),
                ("in_accel_x_raw", accel[0]),
                ("in_accel_y_raw", accel[1]),
                ("in_accel_z_raw", accel[2]),
            ],
        );
        write_device(
            root,
            "iio:device2",
            &[
                ("name", MAGN_DEVICE_NAME),
                ("in_magn_x_raw", magn[0]),
                ("in_magn_y_raw", magn[1]),
                ("in_magn_z_raw", magn[2]),
            ],
        );
    }

    #[test]
    fn test_normalize_degrees() {
        assert_close(normalize_degrees(-90.0), 270.0);
        assert_close(normalize_degrees(360.0), 0.0);
        assert_close(normalize_degrees(725.0), 5.0);
        assert!(normalize_degrees(-1e-15) < 360.0);
    }

    #[test]
    fn test_level_and_facing_north() {
        let o = orientation_from_vectors([0.0, 0.0, 1.0], [0.3, 0.0, -0.5]);
        assert_close(o.roll, 0.0);
        assert_close(o.pitch, 0.0);
        assert_close(o.yaw, 0.0);
    }

    #[test]
    fn test_heading_quarter_turn() {
        let o = orientation_from_vectors([0.0, 0.0, 1.0], [0.0, -0.3, 0.2]);
        assert_close(o.yaw, 90.0);
    }

    #[test]
    fn test_roll_and_pitch_from_gravity() {
        let rolled = orientation_from_vectors([0.0, 1.0, 0.0], [1.0, 0.0, 0.0]);
        assert_close(rolled.roll, 90.0);
        assert_close(rolled.pitch, 0.0);

        let pitched = orientation_from_vectors([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0]);
        assert_close(pitched.pitch, 90.0);

        let pitched_down = orientation_from_vectors([1.0, 0.0, 0.0], [0.0, 0.0, 1.0]);
        assert_close(pitched_down.pitch, 270.0);
    }

    #[test]
    fn test_iio_sensor_reads_g() {
        let dir = tempfile::tempdir().unwrap();
        fake_sense_hat(dir.path(), ["0", "-500", "1000"], ["100", "0", "0"]);

        let mut sensor = IioMotionSensor::find(dir.path()).unwrap();
        let accel = sensor.accelerometer_raw().unwrap();
        assert_close(accel.x, 0.0);
        assert_close(accel.y, -0.5);
        assert_close(accel.z, 1.0);
    }

    #[test]
    fn test_iio_sensor_orientation() {
        let dir = tempfile::tempdir().unwrap();
        fake_sense_hat(dir.path(), ["0", "0", "1000"], ["0", "-100", "0"]);

        let mut sensor = IioMotionSensor::find(dir.path()).unwrap();
        let o = sensor.orientation_degrees().unwrap();
        assert_close(o.roll, 0.0);
        assert_close(o.pitch, 0.0);
        assert_close(o.yaw, 90.0);
    }

    #[test]
    fn test_missing_magnetometer() {
        let dir = tempfile::tempdir().unwrap();
        write_device(
            dir.path(),
            "iio:device0",
            &[("name", ACCEL_DEVICE_NAME), ("in_accel_scale", "0.01")],
        );
        assert!(matches!(
            IioMotionSensor::find(dir.path()),
            Err(LoggerError::Sensor(_))
        ));
    }

    #[test]
    fn test_unparsable_reading_is_sensor_error() {
        let dir = tempfile::tempdir().unwrap();
        fake_sense_hat(dir.path(), ["0", "zz", "1000"], ["1", "0", "0"]);

        let mut sensor = IioMotionSensor::find(dir.path()).unwrap();
        match sensor.accelerometer_raw() {
            Err(LoggerError::Sensor(msg)) => assert!(msg.contains("in_accel_y_raw")),
            other => panic!("expected sensor error, got {:?}", other),
        }
    }
}
