mod time_of_day;

pub use time_of_day::TimeOfDayClassifier;
