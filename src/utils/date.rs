use chrono::{DateTime, NaiveDateTime};

pub const DATE_FMT: &str = "%Y-%m-%dT%H:%M:%S%.f";

// accepts RFC 3339 (normalised to UTC) or a naive `DATE_FMT` timestamp
pub fn parse_date(str_time: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(str_time) {
        Ok(time) => Ok(time.naive_utc()),
        Err(_) => NaiveDateTime::parse_from_str(str_time, DATE_FMT),
    }
}

pub mod serializer {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde::de::Error;
    use crate::utils::date::parse_date;

    pub fn serialize<S: Serializer>(time: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        time_to_json(*time).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let str_time: String = Deserialize::deserialize(deserializer)?;
        parse_date(str_time.as_str()).map_err(D::Error::custom)
    }

    pub(crate) fn time_to_json(t: NaiveDateTime) -> String {
        t.and_utc().to_rfc3339()
    }
}

pub mod opt_serializer {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde::de::Error;
    use crate::utils::date::parse_date;
    use crate::utils::date::serializer::time_to_json;

    pub fn serialize<S: Serializer>(time: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error> {
        time.map(time_to_json).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error> {
        let str_time: Option<String> = Deserialize::deserialize(deserializer)?;
        match str_time {
            Some(str_time) => parse_date(str_time.as_str()).map(Some).map_err(D::Error::custom),
            None => Ok(None),
        }
    }
}
