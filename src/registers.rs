//! AQT560 register command table
//!
//! Read commands for the transmitter's holding registers, keyed by a
//! human-readable parameter name. Each command is the hex-encoded request
//! body (unit address, function code 0x03, register address, register
//! count) without the CRC; [`crate::build_frame`] appends that.

/// Parameter name to command hex, in register-address order.
pub const COMMANDS: &[(&str, &str)] = &[
    ("NO2 (ppb, LC)", "010300000001"),
    ("SO2 (ppb, LC)", "010300010001"),
    ("CO (ppb, LC)", "010300020001"),
    ("H2S (ppb, LC)", "010300040001"),
    ("O3 (ppb, LC)", "010300050001"),
    ("NO (ppb, LC)", "010300060001"),
    ("PM2.5 (ug/m3, LC)", "010300080001"),
    ("PM10 (ug/m3, LC)", "010300090001"),
    ("Temperature (C, LC)", "0103000A0001"),
    ("Humidity (%RH, LC)", "0103000B0001"),
    ("Pressure (hPa, LC)", "0103000C0001"),
    ("Device health (%)", "0103001F0001"),
    ("AQI", "010300290001"),
    ("AQI criteria pollutant", "0103002A0001"),
    ("Stabilization flag", "010300330001"),
    ("Temp invalid flag", "010300340001"),
    ("Humidity compensation", "010300360001"),
    ("PM1 (ug/m3, LC)", "010300370001"),
    ("LPC data state", "010300760001"),
    ("LPC fog present", "0103007B0001"),
    ("Fog flag PM1", "0103007C0001"),
    ("Fog flag PM2.5", "0103007D0001"),
    ("Fog flag PM10", "0103007E0001"),
    ("LPC interval (min)", "0103007F0001"),
    ("Uptime (s, 32-bit)", "010300980002"),
    ("AQT serial (8-char)", "010300B40004"),
    ("HMP110 serial (8-char)", "010300B80004"),
    ("LPC serial (8-char)", "010300BC0004"),
];

/// Look up the command hex for a parameter name.
pub fn command_for(name: &str) -> Option<&'static str> {
    COMMANDS
        .iter()
        .find(|(param, _)| *param == name)
        .map(|(_, hex)| *hex)
}

/// All known parameter names, in register-address order.
pub fn parameter_names() -> impl Iterator<Item = &'static str> {
    COMMANDS.iter().map(|(param, _)| *param)
}
