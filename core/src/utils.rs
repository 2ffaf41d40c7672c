use std::fmt;
use num_enum::TryFromPrimitive;

use crate::compression::{
    CompressionError, LevelPreset, MAX_LEVEL, MAX_WINDOW_LOG, MIN_LEVEL, MIN_WINDOW_LOG,
};

/// Render a primitive as its enum variant name, or as a plain number if it
/// does not name a variant.
pub fn enum_name_or_raw<T>(raw: T::Primitive) -> String
where
    T: TryFromPrimitive + fmt::Debug,
    T::Primitive: fmt::Display,
{
    match T::try_from_primitive(raw) {
        Ok(variant) => format!("{:?}", variant),
        Err(_) => format!("{}", raw),
    }
}

/// Human label for a level, e.g. `Default` or `7`.
pub fn level_label(level: i32) -> String {
    enum_name_or_raw::<LevelPreset>(level)
}

pub fn validate_level(level: i32) -> Result<(), CompressionError> {
    if !(MIN_LEVEL..=MAX_LEVEL).contains(&level) {
        return Err(CompressionError::InvalidParameter(format!(
            "invalid compression level: {} (must be {}-{})",
            level, MIN_LEVEL, MAX_LEVEL
        )));
    }
    Ok(())
}

pub fn validate_window_log(window_log: u32) -> Result<(), CompressionError> {
    if !(MIN_WINDOW_LOG..=MAX_WINDOW_LOG).contains(&window_log) {
        return Err(CompressionError::InvalidParameter(format!(
            "invalid window size: {} (must be {}-{})",
            window_log, MIN_WINDOW_LOG, MAX_WINDOW_LOG
        )));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), CompressionError> {
    if name.is_empty() {
        return Err(CompressionError::InvalidParameter(
            "compressor name must not be empty".into(),
        ));
    }
    Ok(())
}
