use chrono::{DateTime, Utc};
use mockall::mock;

// Mock clock for testing
mock! {
    pub Clock {}

    impl crate::clock::Clock for Clock {
        fn now(&self) -> DateTime<Utc>;
    }
}
