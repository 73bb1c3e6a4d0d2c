use std::fmt;

use ::time::{format_description::well_known::Rfc3339, OffsetDateTime};

/// Unix timestamp with second precision.
///
/// [`Timestamp::ZERO`] doubles as "never happened", e.g. for the
/// edit time of a comment that has not been edited yet.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const ZERO: Self = Self(0);

    pub fn now() -> Self {
        OffsetDateTime::now_utc().into()
    }

    pub const fn from_secs(secs: i64) -> Self {
        Self(secs)
    }

    pub const fn as_secs(self) -> i64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// `None` if the value is outside of the range supported by [`OffsetDateTime`].
    pub fn to_datetime(self) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp(self.0).ok()
    }
}

impl From<i64> for Timestamp {
    fn from(from: i64) -> Self {
        Self(from)
    }
}

impl From<Timestamp> for i64 {
    fn from(from: Timestamp) -> Self {
        from.0
    }
}

impl From<OffsetDateTime> for Timestamp {
    fn from(from: OffsetDateTime) -> Self {
        Self(from.unix_timestamp())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self.to_datetime().and_then(|dt| dt.format(&Rfc3339).ok()) {
            Some(formatted) => f.write_str(&formatted),
            None => write!(f, "{}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::time::macros::datetime;

    #[test]
    fn convert_from_into_secs() {
        let t1 = Timestamp::now();
        let secs = t1.as_secs();
        let t2 = Timestamp::from_secs(secs);
        assert_eq!(t1, t2);
        assert!(!t1.is_zero());
        assert!(Timestamp::ZERO.is_zero());
    }

    #[test]
    fn convert_to_datetime() {
        let t = Timestamp::from_secs(1_234_567_890);
        assert_eq!(Some(datetime!(2009-02-13 23:31:30 UTC)), t.to_datetime());
        assert_eq!("2009-02-13T23:31:30Z", t.to_string());
        assert_eq!(t, Timestamp::from(datetime!(2009-02-13 23:31:30 UTC)));
    }

    #[test]
    fn display_out_of_range_as_seconds() {
        assert_eq!(i64::MAX.to_string(), Timestamp::from(i64::MAX).to_string());
    }
}
