use std::time::SystemTime;

use time::OffsetDateTime;
use time::macros::format_description;

pub trait SystemTimeExt {
    /// Calendar date in UTC, `YYYY-MM-DD`.
    fn to_date_string(&self) -> String;
}

impl SystemTimeExt for SystemTime {
    fn to_date_string(&self) -> String {
        OffsetDateTime::from(*self)
            .format(format_description!("[year]-[month]-[day]"))
            .unwrap_or_else(|_| String::from("????-??-??"))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_epoch_date() {
        assert_eq!(SystemTime::UNIX_EPOCH.to_date_string(), "1970-01-01");
    }

    #[test]
    fn test_known_date() {
        let moment = SystemTime::UNIX_EPOCH + Duration::from_secs(1_722_556_740);
        assert_eq!(moment.to_date_string(), "2024-08-01");
    }
}
