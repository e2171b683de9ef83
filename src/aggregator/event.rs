//! Typed sensor events delivered by the telemetry bus

/// Numeric id of a vehicle / system on the bus
pub type SourceId = u16;

/// Numeric id of a sub-unit (battery, sensor, ...) of a system
pub type EntityId = u8;

/// Addressing and timing common to every event
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EventHeader {
    /// Emitting system
    pub source: SourceId,
    /// Emitting sub-unit
    pub entity: EntityId,
    /// Seconds since the Unix epoch
    pub timestamp: f64,
}

impl EventHeader {
    pub fn new(source: SourceId, entity: EntityId, timestamp: f64) -> Self {
        Self {
            source,
            entity,
            timestamp,
        }
    }

    /// Timestamp in milliseconds
    pub fn millis(&self) -> f64 {
        self.timestamp * 1000.0
    }
}

/// One navigation solution: position, attitude and velocity
///
/// `x`, `y`, `z` are North/East/Down offsets (m) from the reference point
/// `lat`/`lon`/`height`; the actual position is the reference point moved by
/// that offset.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StateFix {
    /// Reference latitude (rad)
    pub lat: f64,
    /// Reference longitude (rad)
    pub lon: f64,
    /// Reference height above the ellipsoid (m)
    pub height: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Depth below the surface (m), non-positive when unavailable
    pub depth: f64,
    /// Altitude above the bottom (m), non-positive when unavailable
    pub alt: f64,
    /// Roll (rad)
    pub phi: f64,
    /// Pitch (rad)
    pub theta: f64,
    /// Yaw (rad)
    pub psi: f64,
    /// Velocity components (m/s)
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,
}

impl StateFix {
    /// A fix at the given reference position with everything else zeroed
    pub fn at(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            ..Self::default()
        }
    }

    /// Horizontal speed `sqrt(vx² + vy²)`
    pub fn horizontal_speed(&self) -> f64 {
        self.vx.hypot(self.vy)
    }

    /// Direction of travel over ground (rad)
    pub fn course(&self) -> f64 {
        self.vy.atan2(self.vx)
    }
}

/// Event payloads
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    StateFix(StateFix),
    /// Volts
    Voltage(f64),
    /// Amperes
    Current(f64),
    /// Degrees Celsius
    Temperature(f64),
    /// Vertical displacement (m)
    DisplacementZ(f64),
    /// Human-readable system name
    NameAnnounce(String),
}

/// A timestamped event from one system/entity
#[derive(Clone, Debug, PartialEq)]
pub struct SensorEvent {
    pub header: EventHeader,
    pub payload: Payload,
}

impl SensorEvent {
    pub fn new(header: EventHeader, payload: Payload) -> Self {
        Self { header, payload }
    }

    pub fn state(source: SourceId, timestamp: f64, fix: StateFix) -> Self {
        Self::new(EventHeader::new(source, 0, timestamp), Payload::StateFix(fix))
    }

    pub fn voltage(source: SourceId, entity: EntityId, timestamp: f64, volts: f64) -> Self {
        Self::new(EventHeader::new(source, entity, timestamp), Payload::Voltage(volts))
    }

    pub fn current(source: SourceId, entity: EntityId, timestamp: f64, amps: f64) -> Self {
        Self::new(EventHeader::new(source, entity, timestamp), Payload::Current(amps))
    }

    pub fn temperature(source: SourceId, entity: EntityId, timestamp: f64, celsius: f64) -> Self {
        Self::new(
            EventHeader::new(source, entity, timestamp),
            Payload::Temperature(celsius),
        )
    }

    pub fn displacement_z(source: SourceId, entity: EntityId, timestamp: f64, z: f64) -> Self {
        Self::new(
            EventHeader::new(source, entity, timestamp),
            Payload::DisplacementZ(z),
        )
    }

    pub fn announce(source: SourceId, timestamp: f64, name: impl Into<String>) -> Self {
        Self::new(
            EventHeader::new(source, 0, timestamp),
            Payload::NameAnnounce(name.into()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_millis() {
        let h = EventHeader::new(0x2001, 3, 1.5);
        assert_eq!(h.millis(), 1500.0);
    }

    #[test]
    fn test_horizontal_speed_and_course() {
        let fix = StateFix {
            vx: 3.0,
            vy: 4.0,
            ..StateFix::default()
        };
        assert_eq!(fix.horizontal_speed(), 5.0);
        assert!((fix.course() - (4.0f64).atan2(3.0)).abs() < 1e-15);
    }

    #[test]
    fn test_constructors() {
        let ev = SensorEvent::voltage(0x2001, 7, 10.0, 24.1);
        assert_eq!(ev.header.entity, 7);
        assert_eq!(ev.payload, Payload::Voltage(24.1));

        let ev = SensorEvent::announce(0x2001, 0.0, "auv-1");
        assert_eq!(ev.payload, Payload::NameAnnounce("auv-1".to_string()));
    }
}
