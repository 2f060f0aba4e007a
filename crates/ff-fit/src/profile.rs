//! Compact FIT profile: friendly message names, field names, and units.
//!
//! Only the messages most activity files carry are listed. Anything else
//! decodes under a synthesized name so no data is dropped.

/// Field number of the timestamp field shared by most messages.
pub const TIMESTAMP_FIELD: u8 = 253;

/// Name and unit of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldProfile {
    pub num: u8,
    pub name: &'static str,
    pub units: &'static str,
}

/// Name and known fields of one global message.
#[derive(Debug, Clone, Copy)]
pub struct MessageProfile {
    pub num: u16,
    pub name: &'static str,
    pub fields: &'static [FieldProfile],
}

const fn f(num: u8, name: &'static str, units: &'static str) -> FieldProfile {
    FieldProfile { num, name, units }
}

/// Fields valid on every message.
const COMMON_FIELDS: &[FieldProfile] = &[
    f(250, "part_index", ""),
    f(253, "timestamp", "s"),
    f(254, "message_index", ""),
];

const FILE_ID: &[FieldProfile] = &[
    f(0, "type", ""),
    f(1, "manufacturer", ""),
    f(2, "product", ""),
    f(3, "serial_number", ""),
    f(4, "time_created", "s"),
    f(5, "number", ""),
    f(8, "product_name", ""),
];

const SPORT: &[FieldProfile] = &[f(0, "sport", ""), f(1, "sub_sport", ""), f(3, "name", "")];

const SESSION: &[FieldProfile] = &[
    f(0, "event", ""),
    f(1, "event_type", ""),
    f(2, "start_time", "s"),
    f(3, "start_position_lat", "semicircles"),
    f(4, "start_position_long", "semicircles"),
    f(5, "sport", ""),
    f(6, "sub_sport", ""),
    f(7, "total_elapsed_time", "s"),
    f(8, "total_timer_time", "s"),
    f(9, "total_distance", "m"),
    f(11, "total_calories", "kcal"),
    f(14, "avg_speed", "m/s"),
    f(15, "max_speed", "m/s"),
    f(16, "avg_heart_rate", "bpm"),
    f(17, "max_heart_rate", "bpm"),
    f(18, "avg_cadence", "rpm"),
    f(19, "max_cadence", "rpm"),
    f(20, "avg_power", "watts"),
    f(21, "max_power", "watts"),
    f(22, "total_ascent", "m"),
    f(23, "total_descent", "m"),
    f(25, "first_lap_index", ""),
    f(26, "num_laps", ""),
];

const LAP: &[FieldProfile] = &[
    f(0, "event", ""),
    f(1, "event_type", ""),
    f(2, "start_time", "s"),
    f(3, "start_position_lat", "semicircles"),
    f(4, "start_position_long", "semicircles"),
    f(5, "end_position_lat", "semicircles"),
    f(6, "end_position_long", "semicircles"),
    f(7, "total_elapsed_time", "s"),
    f(8, "total_timer_time", "s"),
    f(9, "total_distance", "m"),
    f(11, "total_calories", "kcal"),
    f(13, "avg_speed", "m/s"),
    f(14, "max_speed", "m/s"),
    f(15, "avg_heart_rate", "bpm"),
    f(16, "max_heart_rate", "bpm"),
    f(17, "avg_cadence", "rpm"),
    f(18, "max_cadence", "rpm"),
    f(19, "avg_power", "watts"),
    f(20, "max_power", "watts"),
    f(21, "total_ascent", "m"),
    f(22, "total_descent", "m"),
];

const RECORD: &[FieldProfile] = &[
    f(0, "position_lat", "semicircles"),
    f(1, "position_long", "semicircles"),
    f(2, "altitude", "m"),
    f(3, "heart_rate", "bpm"),
    f(4, "cadence", "rpm"),
    f(5, "distance", "m"),
    f(6, "speed", "m/s"),
    f(7, "power", "watts"),
    f(9, "grade", "%"),
    f(13, "temperature", "C"),
    f(29, "accumulated_power", "watts"),
    f(53, "fractional_cadence", "rpm"),
    f(73, "enhanced_speed", "m/s"),
    f(78, "enhanced_altitude", "m"),
];

const EVENT: &[FieldProfile] = &[
    f(0, "event", ""),
    f(1, "event_type", ""),
    f(3, "data", ""),
    f(4, "event_group", ""),
];

const DEVICE_INFO: &[FieldProfile] = &[
    f(0, "device_index", ""),
    f(1, "device_type", ""),
    f(2, "manufacturer", ""),
    f(3, "serial_number", ""),
    f(4, "product", ""),
    f(5, "software_version", ""),
    f(6, "hardware_version", ""),
    f(10, "battery_voltage", "V"),
    f(11, "battery_status", ""),
];

const ACTIVITY: &[FieldProfile] = &[
    f(0, "total_timer_time", "s"),
    f(1, "num_sessions", ""),
    f(2, "type", ""),
    f(3, "event", ""),
    f(4, "event_type", ""),
    f(5, "local_timestamp", "s"),
];

const FILE_CREATOR: &[FieldProfile] = &[f(0, "software_version", ""), f(1, "hardware_version", "")];

const HRV: &[FieldProfile] = &[f(0, "time", "s")];

const MESSAGES: &[MessageProfile] = &[
    MessageProfile { num: 0, name: "file_id", fields: FILE_ID },
    MessageProfile { num: 12, name: "sport", fields: SPORT },
    MessageProfile { num: 18, name: "session", fields: SESSION },
    MessageProfile { num: 19, name: "lap", fields: LAP },
    MessageProfile { num: 20, name: "record", fields: RECORD },
    MessageProfile { num: 21, name: "event", fields: EVENT },
    MessageProfile { num: 23, name: "device_info", fields: DEVICE_INFO },
    MessageProfile { num: 34, name: "activity", fields: ACTIVITY },
    MessageProfile { num: 49, name: "file_creator", fields: FILE_CREATOR },
    MessageProfile { num: 78, name: "hrv", fields: HRV },
];

/// Look up a global message.
pub fn message(num: u16) -> Option<&'static MessageProfile> {
    MESSAGES.iter().find(|m| m.num == num)
}

/// Friendly name of a global message; unknown messages become
/// `unknown_<num>`.
pub fn message_name(num: u16) -> String {
    match message(num) {
        Some(m) => m.name.to_string(),
        None => format!("unknown_{num}"),
    }
}

/// Name and unit of a field; unknown fields become `field_<num>` with no
/// unit.
pub fn field_info(mesg_num: u16, field_num: u8) -> (String, String) {
    let known = message(mesg_num)
        .and_then(|m| m.fields.iter().find(|fp| fp.num == field_num))
        .or_else(|| COMMON_FIELDS.iter().find(|fp| fp.num == field_num));

    match known {
        Some(fp) => (fp.name.to_string(), fp.units.to_string()),
        None => (format!("field_{field_num}"), String::new()),
    }
}
